//! Server configuration

use std::time::Duration;

/// Where the embedded directory routes get their data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySource {
    Sample,
    File(String),
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Base URL of the backend data API; proxy routes answer 503 without it
    pub upstream_api_url: Option<String>,
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub anthropic_model: Option<String>,
    pub ai_timeout: Duration,
    pub catalog_timeout: Duration,
    pub upstream_timeout: Duration,
    pub directory: Option<DirectorySource>,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_secs(name: &str, default: u64) -> Duration {
    let secs = env_opt(name)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: env_opt("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".into()),
            upstream_api_url: env_opt("AWS_API_URL")
                .or_else(|| env_opt("NEXT_PUBLIC_API_URL"))
                .map(|url| url.trim_end_matches('/').to_string()),
            api_key: env_opt("API_KEY"),
            cors_origins: env_opt("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),
            rate_limit_rps: env_opt("RATE_LIMIT_RPS")
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(100),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            anthropic_base_url: env_opt("ANTHROPIC_BASE_URL"),
            anthropic_model: env_opt("ANTHROPIC_MODEL"),
            ai_timeout: env_secs("AI_TIMEOUT_SECS", 30),
            catalog_timeout: env_secs("CATALOG_TIMEOUT_SECS", 10),
            upstream_timeout: env_secs("UPSTREAM_TIMEOUT_SECS", 15),
            directory: env_opt("DIRECTORY_DATA").map(|v| {
                if v.eq_ignore_ascii_case("sample") {
                    DirectorySource::Sample
                } else {
                    DirectorySource::File(v)
                }
            }),
        }
    }
}

impl Default for Config {
    /// Local defaults with every external integration switched off
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            upstream_api_url: None,
            api_key: None,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 100,
            anthropic_api_key: None,
            anthropic_base_url: None,
            anthropic_model: None,
            ai_timeout: Duration::from_secs(30),
            catalog_timeout: Duration::from_secs(10),
            upstream_timeout: Duration::from_secs(15),
            directory: None,
        }
    }
}
