//! Helpers shared by the HTTP surfaces

pub mod auth;
