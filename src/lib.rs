pub mod api;
pub mod artifacts;
pub mod config;
pub mod evalscript;
pub mod geometry;
pub mod observability;
pub mod provider;
