//! HTTP handlers for the admin menu and its resources.

pub mod admin;
pub use admin::*;
