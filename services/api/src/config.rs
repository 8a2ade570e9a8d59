//! Server configuration

use anyhow::Result;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the server binds to
    pub host: String,
    /// Port the server listens on
    pub port: u16,
    /// Allowed CORS origin for the frontend
    pub cors_origin: String,
    /// Directory where uploaded profile photos are stored
    pub upload_dir: String,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HOST`: Bind address (default: 0.0.0.0)
    /// - `PORT`: Listen port (default: 5000)
    /// - `CORS_ORIGIN`: Allowed frontend origin (default: http://localhost:5173)
    /// - `UPLOAD_DIR`: Upload directory (default: uploads)
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        Ok(ServerConfig {
            host,
            port,
            cors_origin,
            upload_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        unsafe {
            std::env::remove_var("HOST");
            std::env::remove_var("PORT");
            std::env::remove_var("CORS_ORIGIN");
            std::env::remove_var("UPLOAD_DIR");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.upload_dir, "uploads");
    }

    #[test]
    #[serial]
    fn test_server_config_custom_values() {
        unsafe {
            std::env::set_var("HOST", "127.0.0.1");
            std::env::set_var("PORT", "8080");
            std::env::set_var("CORS_ORIGIN", "https://heartlink.example");
            std::env::set_var("UPLOAD_DIR", "/var/lib/heartlink/uploads");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origin, "https://heartlink.example");
        assert_eq!(config.upload_dir, "/var/lib/heartlink/uploads");

        unsafe {
            std::env::remove_var("HOST");
            std::env::remove_var("PORT");
            std::env::remove_var("CORS_ORIGIN");
            std::env::remove_var("UPLOAD_DIR");
        }
    }
}
