pub mod error;
pub mod refresh_config;
pub mod settings;
