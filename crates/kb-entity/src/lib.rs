//! # kb-entity
//!
//! Domain entity models for the knowledge base. Structs in this crate
//! represent database rows or domain value objects. Row-shaped entities
//! derive `sqlx::FromRow`; share links and share settings are converted
//! from dedicated row types in `kb-database` because their domain shape
//! (tagged target, unsigned counters) differs from the table layout.

pub mod article;
pub mod engagement;
pub mod share;
pub mod user;
