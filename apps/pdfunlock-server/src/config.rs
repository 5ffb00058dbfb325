//! Server configuration
//!
//! Everything the request handlers need from the outside world lives in one
//! [`AppConfig`], built once at startup and handed to the router as state.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default upload limit in MiB
pub const DEFAULT_MAX_UPLOAD_MB: usize = 100;

/// Slack on top of the file limit for multipart boundaries and headers
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory served for every path that isn't an API route
    pub public_dir: PathBuf,
    /// Directory holding in-flight uploads
    pub upload_dir: PathBuf,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Limit for the whole request body, multipart framing included
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)
    }

    /// Create the upload directory if it doesn't exist yet
    pub fn ensure_upload_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limit_is_100_mib() {
        assert_eq!(AppConfig::default().max_upload_bytes, 104_857_600);
    }

    #[test]
    fn bind_addr_parses_host_and_port() {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            ..AppConfig::default()
        };
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn bind_addr_rejects_bad_host() {
        let config = AppConfig {
            host: "not a host".into(),
            ..AppConfig::default()
        };
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn ensure_upload_dir_creates_nested_dirs() {
        let root = tempfile::tempdir().unwrap();
        let config = AppConfig {
            upload_dir: root.path().join("a").join("uploads"),
            ..AppConfig::default()
        };

        config.ensure_upload_dir().unwrap();
        assert!(config.upload_dir.is_dir());

        // Second call is a no-op
        config.ensure_upload_dir().unwrap();
    }
}
