//! Identity value objects supplied by the authentication layer.

pub mod model;
pub mod role;

pub use model::AuthenticatedUser;
pub use role::UserRole;
