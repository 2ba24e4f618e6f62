use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_USERNAME: &str = "Administrator";
pub const DEFAULT_PASSWORD: &str = "admin";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base endpoint of the CRM under test
    pub base_url: String,

    pub username: String,

    pub password: String,

    /// Bound for every HTTP call
    pub timeout: Duration,

    /// Run the browser without a window (UI suite)
    pub headless: bool,

    /// Pause after browser navigation before inspecting the page
    pub settle: Duration,

    /// Directory for JSON/JUnit exports, none when not requested
    pub report_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl HarnessConfig {
    /// Defaults overridden by the `CRM_*` variables `lookup` resolves.
    /// Unparsable values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("CRM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let username = lookup("CRM_USERNAME").unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let password = lookup("CRM_PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.to_string());

        let timeout_secs = lookup("CRM_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let headless = lookup("CRM_HEADLESS")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            base_url,
            username,
            password,
            timeout: Duration::from_secs(timeout_secs),
            headless,
            settle: Duration::from_secs(2),
            report_dir: None,
        }
    }

    /// Configuration pointing at `base_url` with the stock credentials
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::from_lookup(|_| None)
        }
    }
}
