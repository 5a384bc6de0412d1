//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CorsConfig, LlmConfig, LogFormat, LoggingConfig, RetrievalConfig, ServerConfig,
    StagingConfig, StoreBackend, StoreConfig,
};
