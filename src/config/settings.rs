//! Settings structures for SmartSearch-RS configuration

use crate::engines::EngineName;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub security: SecuritySettings,
    pub limiter: LimiterSettings,
    pub routing: RoutingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (SMARTSEARCH_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("SMARTSEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("SMARTSEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("SMARTSEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("SMARTSEARCH_BASE_URL") {
            self.server.base_url = Some(val);
        }
        if let Ok(val) = std::env::var("SMARTSEARCH_ALLOWED_ORIGINS") {
            self.security.allowed_origins =
                val.split(',').map(|o| o.trim().to_string()).collect();
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug mode
    pub debug: bool,
    /// Instance name used in logs and the health endpoint
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "SmartSearch".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// Base URL for the instance
    pub base_url: Option<String>,
    /// Method to determine real IP
    pub real_ip_method: RealIpMethod,
    /// Header carrying the inbound geolocation country signal
    pub geo_header: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8788,
            bind_address: "127.0.0.1".to_string(),
            base_url: None,
            real_ip_method: RealIpMethod::default(),
            geo_header: "cf-ipcountry".to_string(),
        }
    }
}

/// Method to determine real client IP
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealIpMethod {
    /// Use X-Forwarded-For header
    XForwardedFor,
    /// Use X-Real-IP header
    XRealIp,
    /// Use connection IP directly
    #[default]
    Connection,
}

/// Response hardening settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Origins granted CORS headers, matched exactly (not prefix, not
    /// substring). Empty list means no origin is ever granted CORS.
    pub allowed_origins: Vec<String>,
}

/// Abuse-control settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterSettings {
    /// Enable the rate limiter
    pub enabled: bool,
    /// Requests allowed per window before blocking
    pub max_requests: usize,
    /// Sliding window length in seconds
    pub window_secs: u64,
    /// Block lifetime in seconds once the threshold is exceeded
    pub block_secs: u64,
    /// Expiry for the stored timestamp list in seconds
    pub window_ttl_secs: u64,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 60,
            block_secs: 3600,
            window_ttl_secs: 120,
        }
    }
}

/// Default engines per detected intent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// Engine for keyword queries when the selector is absent or unknown
    pub keyword_engine: EngineName,
    /// Engine for question queries when the selector is absent or unknown
    pub question_engine: EngineName,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            keyword_engine: EngineName::Google,
            question_engine: EngineName::Perplexity,
        }
    }
}
