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
    /// - `INVENTORY_SERVICE_ADDR`: bind address (default: "0.0.0.0:3001")
    pub fn from_env() -> Self {
        let listen_addr =
            std::env::var("INVENTORY_SERVICE_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());

        ServiceConfig { listen_addr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_listen_addr() {
        unsafe {
            std::env::remove_var("INVENTORY_SERVICE_ADDR");
        }
        assert_eq!(ServiceConfig::from_env().listen_addr, "0.0.0.0:3001");
    }

    #[test]
    #[serial]
    fn test_listen_addr_override() {
        unsafe {
            std::env::set_var("INVENTORY_SERVICE_ADDR", "127.0.0.1:9090");
        }
        assert_eq!(ServiceConfig::from_env().listen_addr, "127.0.0.1:9090");
        unsafe {
            std::env::remove_var("INVENTORY_SERVICE_ADDR");
        }
    }
}
