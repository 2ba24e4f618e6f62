//! Browser implementation using Playwright

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use playwright::api::{Browser as PwBrowser, BrowserContext, Page, Viewport};
use playwright::Playwright;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::driver::traits::Browser;

/// Focus the element behind a Playwright selector, CSS or `xpath=`
const FOCUS_JS: &str = r#"sel => {
    const el = sel.startsWith('xpath=')
        ? document.evaluate(sel.slice(6), document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue
        : document.querySelector(sel);
    if (!el) return false;
    el.focus();
    return true;
}"#;

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Explicit browser binary, discovered when unset
    pub executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            executable: std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")
                .ok()
                .map(PathBuf::from),
        }
    }
}

/// Chromium page driven through Playwright
pub struct PlaywrightBrowser {
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    browser: Arc<PwBrowser>,
    #[allow(dead_code)]
    context: Arc<BrowserContext>,
    page: Arc<Mutex<Page>>,
}

impl PlaywrightBrowser {
    /// Launch Chromium and open a single page
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let browser = launch_chromium(&playwright.chromium(), &config).await?;
        let context = browser.context_builder().build().await?;
        let page = context.new_page().await?;

        page.set_viewport_size(Viewport {
            width: config.viewport_width as i32,
            height: config.viewport_height as i32,
        })
        .await?;

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            page: Arc::new(Mutex::new(page)),
        })
    }
}

#[async_trait]
impl Browser for PlaywrightBrowser {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let page = self.page.lock().await;
        page.goto_builder(url)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let page = self.page.lock().await;
        let url: String = page.evaluate("() => window.location.href", ()).await?;
        Ok(url)
    }

    async fn title(&self) -> Result<String> {
        let page = self.page.lock().await;
        let title: String = page.evaluate("() => document.title", ()).await?;
        Ok(title)
    }

    async fn page_source(&self) -> Result<String> {
        let page = self.page.lock().await;
        Ok(page.content().await?)
    }

    async fn is_present(&self, selector: &str) -> Result<bool> {
        let page = self.page.lock().await;
        Ok(page.query_selector(selector).await?.is_some())
    }

    async fn wait_for(&self, selector: &str, timeout_ms: u64) -> Result<bool> {
        let page = self.page.lock().await;
        let result = page
            .wait_for_selector_builder(selector)
            .timeout(timeout_ms as f64)
            .wait_for_selector()
            .await;
        Ok(result.is_ok())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        let page = self.page.lock().await;
        let element = page
            .query_selector(selector)
            .await?
            .with_context(|| format!("No element matches {}", selector))?;
        element.fill_builder(text).fill().await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let page = self.page.lock().await;
        page.click_builder(selector).click().await?;
        Ok(())
    }

    async fn press(&self, selector: &str, key: &str) -> Result<()> {
        let page = self.page.lock().await;
        let focused: bool = page.evaluate(FOCUS_JS, selector).await?;
        if !focused {
            anyhow::bail!("No element matches {}", selector);
        }
        page.keyboard.down(key).await?;
        page.keyboard.up(key).await?;
        Ok(())
    }

    async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
        let page = self.page.lock().await;
        page.set_viewport_size(Viewport {
            width: width as i32,
            height: height as i32,
        })
        .await?;
        Ok(())
    }

    async fn eval_number(&self, expression: &str) -> Result<f64> {
        let page = self.page.lock().await;
        let value: f64 = page.evaluate(expression, ()).await?;
        Ok(value)
    }

    async fn close(&self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

async fn launch_chromium(
    chromium: &playwright::api::BrowserType,
    config: &BrowserConfig,
) -> Result<PwBrowser> {
    let executable = config.executable.clone().or_else(find_system_browser);
    let args = launch_args();

    let mut launcher = chromium.launcher().headless(config.headless);
    if let Some(ref path) = executable {
        println!("{} Using browser: {}", "🌐".blue(), path.display());
        launcher = launcher.executable(path);
    } else {
        log::info!("no browser executable found, using the Playwright default");
    }
    launcher = launcher.args(&args);

    Ok(launcher.launch().await?)
}

fn launch_args() -> Vec<String> {
    ["--no-sandbox", "--disable-dev-shm-usage", "--disable-gpu"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn find_system_browser() -> Option<PathBuf> {
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    let common_paths = [
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/snap/bin/chromium",
    ];
    common_paths
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}
