use anyhow::Result;
use async_trait::async_trait;

/// Operations the UI suite needs from a browser page.
///
/// Selectors are Playwright selectors: plain CSS, or `xpath=` prefixed XPath.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Get browser name for logging
    fn name(&self) -> &str;

    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// Full HTML of the current page
    async fn page_source(&self) -> Result<String>;

    /// Check whether an element matching `selector` exists right now
    async fn is_present(&self, selector: &str) -> Result<bool>;

    /// Wait for an element to appear, returning whether it did
    async fn wait_for(&self, selector: &str, timeout_ms: u64) -> Result<bool>;

    /// Replace the value of an input
    async fn fill(&self, selector: &str, text: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Focus an element and press a key on it (e.g. "Enter")
    async fn press(&self, selector: &str, key: &str) -> Result<()>;

    async fn set_viewport(&self, width: u32, height: u32) -> Result<()>;

    /// Evaluate a JavaScript function expression that yields a number
    async fn eval_number(&self, expression: &str) -> Result<f64>;

    /// Shut the browser down
    async fn close(&self) -> Result<()>;
}
