pub mod configuration;
pub mod hardware;
pub mod mapping;
pub mod midi;

pub use mapping::model::MappingConfig;
pub use mapping::user_config::user_config;
pub use mapping::validation::ConfigError;
