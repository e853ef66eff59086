//! Brave Search API client (web vertical).

pub mod client;
pub mod error;
pub mod params;
pub mod request;
pub mod types;
