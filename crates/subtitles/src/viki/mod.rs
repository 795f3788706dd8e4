mod builder;
pub mod config;
pub mod episodes;
pub mod media_info;
pub mod models;
pub mod orchestrator;
pub mod selector;

pub use builder::URL_REGEX;
pub use builder::Viki;
pub use config::VikiConfig;
