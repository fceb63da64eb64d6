//! Process-wide share policy, persisted as a single row.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use kb_core::error::AppError;

/// Default link lifetime in hours.
pub const DEFAULT_EXPIRY_HOURS: u32 = 24;
/// Default cap on simultaneously valid links per target.
pub const DEFAULT_MAX_SHARES_PER_ITEM: u32 = 100;
/// Longest lifetime a link may be given (one year).
pub const MAX_EXPIRY_HOURS: u32 = 8760;

/// Share policy.
///
/// Created with defaults on first access and changed only through an
/// administrative update. There is no delete operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSettings {
    /// Lifetime of a new link when no valid custom expiry is requested.
    pub expiry_hours: u32,
    /// Maximum simultaneously valid links per share target.
    pub max_shares_per_item: u32,
    /// Whether anonymous visitors must log in before a link resolves.
    pub require_auth: bool,
    /// Whether successful resolutions are counted and logged.
    pub track_views: bool,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl ShareSettings {
    /// The row written on first access.
    pub fn with_defaults(now: DateTime<Utc>) -> Self {
        Self {
            expiry_hours: DEFAULT_EXPIRY_HOURS,
            max_shares_per_item: DEFAULT_MAX_SHARES_PER_ITEM,
            require_auth: false,
            track_views: true,
            updated_at: now,
        }
    }

    /// Lifetime for a new link.
    ///
    /// A custom value is honored only inside `(0, MAX_EXPIRY_HOURS]`;
    /// anything else silently falls back to `expiry_hours`.
    pub fn effective_expiry_hours(&self, custom: Option<i64>) -> u32 {
        match custom {
            Some(hours) if hours > 0 && hours <= i64::from(MAX_EXPIRY_HOURS) => hours as u32,
            _ => self.expiry_hours,
        }
    }

    /// Expiry timestamp for a link created at `now`.
    pub fn expires_at(&self, now: DateTime<Utc>, custom: Option<i64>) -> DateTime<Utc> {
        now + Duration::hours(i64::from(self.effective_expiry_hours(custom)))
    }
}

/// Partial administrative update of the share policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateShareSettings {
    /// New default lifetime in hours.
    pub expiry_hours: Option<u32>,
    /// New per-target cap.
    pub max_shares_per_item: Option<u32>,
    /// New login requirement.
    pub require_auth: Option<bool>,
    /// New view-tracking flag.
    pub track_views: Option<bool>,
}

impl UpdateShareSettings {
    /// Reject values the policy cannot honor.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(hours) = self.expiry_hours {
            if hours == 0 || hours > MAX_EXPIRY_HOURS {
                return Err(AppError::validation(format!(
                    "expiry_hours must be between 1 and {MAX_EXPIRY_HOURS}"
                )));
            }
        }
        if self.max_shares_per_item == Some(0) {
            return Err(AppError::validation(
                "max_shares_per_item must be at least 1",
            ));
        }
        Ok(())
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.expiry_hours.is_none()
            && self.max_shares_per_item.is_none()
            && self.require_auth.is_none()
            && self.track_views.is_none()
    }

    /// Apply the update onto existing settings.
    pub fn apply(&self, current: &ShareSettings, now: DateTime<Utc>) -> ShareSettings {
        ShareSettings {
            expiry_hours: self.expiry_hours.unwrap_or(current.expiry_hours),
            max_shares_per_item: self
                .max_shares_per_item
                .unwrap_or(current.max_shares_per_item),
            require_auth: self.require_auth.unwrap_or(current.require_auth),
            track_views: self.track_views.unwrap_or(current.track_views),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ShareSettings::with_defaults(Utc::now());
        assert_eq!(settings.expiry_hours, 24);
        assert_eq!(settings.max_shares_per_item, 100);
        assert!(!settings.require_auth);
        assert!(settings.track_views);
    }

    #[test]
    fn test_custom_expiry_within_range_is_honored() {
        let settings = ShareSettings::with_defaults(Utc::now());
        assert_eq!(settings.effective_expiry_hours(Some(1)), 1);
        assert_eq!(settings.effective_expiry_hours(Some(8760)), 8760);
    }

    #[test]
    fn test_custom_expiry_out_of_range_falls_back() {
        let settings = ShareSettings::with_defaults(Utc::now());
        assert_eq!(settings.effective_expiry_hours(Some(9000)), 24);
        assert_eq!(settings.effective_expiry_hours(Some(0)), 24);
        assert_eq!(settings.effective_expiry_hours(Some(-5)), 24);
        assert_eq!(settings.effective_expiry_hours(None), 24);
    }

    #[test]
    fn test_expires_after_creation() {
        let now = Utc::now();
        let settings = ShareSettings::with_defaults(now);
        assert!(settings.expires_at(now, None) > now);
        assert_eq!(settings.expires_at(now, Some(2)), now + Duration::hours(2));
    }

    #[test]
    fn test_update_validation() {
        let zero_cap = UpdateShareSettings {
            max_shares_per_item: Some(0),
            ..Default::default()
        };
        assert!(zero_cap.validate().is_err());

        let too_long = UpdateShareSettings {
            expiry_hours: Some(MAX_EXPIRY_HOURS + 1),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());

        let ok = UpdateShareSettings {
            expiry_hours: Some(48),
            track_views: Some(false),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_apply_keeps_untouched_fields() {
        let now = Utc::now();
        let current = ShareSettings::with_defaults(now);
        let update = UpdateShareSettings {
            require_auth: Some(true),
            ..Default::default()
        };

        let next = update.apply(&current, now);
        assert!(next.require_auth);
        assert_eq!(next.expiry_hours, current.expiry_hours);
        assert_eq!(next.max_shares_per_item, current.max_shares_per_item);
    }
}
