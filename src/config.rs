use std::time::Duration;

use crate::Args;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_upload_size: usize,
    pub recognition_endpoint: String,
    pub recognition_api_key: String,
    pub recognition_timeout: Duration,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_upload_size: args.max_upload_size,
            recognition_endpoint: args.recognition_endpoint,
            recognition_api_key: args.recognition_api_key,
            recognition_timeout: Duration::from_secs(args.recognition_timeout_secs),
        }
    }
}
