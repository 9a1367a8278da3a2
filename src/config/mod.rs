use std::time::Duration;

use serde::Deserialize;

const DEFAULT_SESSION_FILE: &str = "./session.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub image_base_url: Option<String>,
    pub session_file: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn from_file(file_name: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(file_name)?;
        let config: AppConfig = serde_json::from_str(&contents)?;

        Ok(config)
    }

    #[allow(dead_code)]
    pub fn from_str(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: AppConfig = serde_json::from_str(contents)?;

        Ok(config)
    }

    /// Base for relative image paths; the API's `/images` folder unless overridden
    pub fn get_image_base_url(&self) -> String {
        self.image_base_url.clone().unwrap_or_else(|| {
            format!("{}/images", self.api_base_url.trim_end_matches('/'))
        })
    }

    pub fn get_session_file(&self) -> String {
        self.session_file
            .clone()
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string())
    }

    pub fn get_request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::from_str(r#"{"api_base_url": "http://localhost:9000/"}"#).unwrap();

        assert_eq!(config.get_image_base_url(), "http://localhost:9000/images");
        assert_eq!(config.get_session_file(), "./session.json");
        assert_eq!(config.get_request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_overrides() {
        let config = AppConfig::from_str(
            r#"{
                "api_base_url": "http://localhost:9000",
                "image_base_url": "https://cdn.example.com/img",
                "session_file": "/tmp/wanderlist-session.json",
                "request_timeout_secs": 3
            }"#,
        )
        .unwrap();

        assert_eq!(config.get_image_base_url(), "https://cdn.example.com/img");
        assert_eq!(config.get_session_file(), "/tmp/wanderlist-session.json");
        assert_eq!(config.get_request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_config_requires_api_base_url() {
        assert!(AppConfig::from_str("{}").is_err());
    }
}
