pub mod app;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod controllers;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod models;
pub mod openapi;
pub mod store;
pub mod testing;

pub use app::App;
pub use config::Config;
pub use error::EmsError;
pub use logging::{init_logging, init_logging_json, init_logging_with_level};
pub use testing::{TestApp, TestClient, TestResponse};
