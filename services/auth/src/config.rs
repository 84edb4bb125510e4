//! Service configuration from environment variables

/// Listen address configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to
    pub listen_addr: String,
}

impl ServiceConfig {
    /// Create a new ServiceConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_SERVICE_ADDR`: bind address (default: "0.0.0.0:3000")
    pub fn from_env() -> Self {
        let listen_addr =
            std::env::var("AUTH_SERVICE_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        ServiceConfig { listen_addr }
    }
}
