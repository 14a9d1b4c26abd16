// Library exports for bullpen-server
// The binary and the integration tests both build on these modules

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;
pub mod state;
pub mod ticker;
