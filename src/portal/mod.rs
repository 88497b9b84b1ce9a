pub mod client;
pub mod types;

pub use client::PortalClient;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("portal request failed: {0}")]
    Transport(String),
    #[error("portal reported failure: {msg}")]
    Application {
        msg: String,
        debug_info: Option<String>,
    },
    #[error("failed to decode portal response: {0}")]
    Decode(String),
    #[error("portal response carried no data for {0}")]
    MissingData(&'static str),
}
