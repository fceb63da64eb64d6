//! Route handlers organized by domain.

pub mod admin;
pub mod article;
pub mod engagement;
pub mod health;
pub mod share;
