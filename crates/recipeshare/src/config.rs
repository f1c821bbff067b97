use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the single table holding all records (default: "recipeshare")
    pub table_name: String,
    /// Endpoint override for the store, e.g. a local DynamoDB on
    /// "http://localhost:8000" (default: none, use the SDK's resolution)
    pub endpoint_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RECIPESHARE_TABLE_NAME` - table name (default: "recipeshare")
    /// - `RECIPESHARE_ENDPOINT_URL` - store endpoint override (default: unset)
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("RECIPESHARE_TABLE_NAME")
                .unwrap_or_else(|_| "recipeshare".to_string()),
            endpoint_url: env::var("RECIPESHARE_ENDPOINT_URL").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
