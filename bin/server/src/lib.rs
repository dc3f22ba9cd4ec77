//! Passerelle server: HTTP surface of the Google OAuth bridge.

pub mod auth;
pub mod config;
pub mod pages;
