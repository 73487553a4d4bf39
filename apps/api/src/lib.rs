pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod map;
pub mod models;
pub mod places;
pub mod routes;
pub mod state;
pub mod tracking;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub const VERSION: &str = "0.1.0";
