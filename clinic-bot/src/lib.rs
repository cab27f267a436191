pub mod audio;
pub mod config;
pub mod error;
pub mod format;
pub mod gateway;
pub mod menus;
pub mod models;
pub mod service;
pub mod tasks;
pub mod voice;
pub mod workflow;

pub use config::Config;
pub use error::{ConfigError, GatewayError, TranscodeError};
pub use gateway::{Backend, BackendExt, BackendGateway, QueryEndpoint};
pub use service::{AppState, create_app};
pub use workflow::{build_clinic_dialogue, create_flow_runner};
