// ripmate-api: Async Rust client for the ripmate download-server HTTP API

pub mod client;
pub mod error;
pub mod settings;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use settings::Settings;
pub use transport::TransportConfig;
