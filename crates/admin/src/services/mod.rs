//! Business services for the admin.

pub mod auth;
