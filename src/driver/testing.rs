//! Scripted in-memory browser for unit tests

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use super::traits::Browser;

pub(crate) struct FakeBrowser {
    pub present: Mutex<HashSet<String>>,
    pub url: Mutex<String>,
    pub title: String,
    pub source: String,
    /// Whether pressing Enter on the password field leaves the login page
    pub login_accepted: bool,
    pub mobile_width: f64,
    pub actions: Mutex<Vec<String>>,
    viewport_width: Mutex<u32>,
}

impl FakeBrowser {
    /// A page set that looks like a healthy Frappe CRM
    pub fn crm() -> Self {
        let present = [
            "[name=\"usr\"]",
            "[name=\"pwd\"]",
            "[name=\"first_name\"]",
            "input[data-field=\"last_name\"]",
            "[name=\"email\"]",
            "xpath=//button[contains(text(), 'New')]",
            "xpath=//button[contains(text(), 'Create')]",
            "input[type='search']",
            "body",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            present: Mutex::new(present),
            url: Mutex::new("about:blank".to_string()),
            title: "Frappe CRM".to_string(),
            source: format!("<html><body>{}</body></html>", "x".repeat(2000)),
            login_accepted: true,
            mobile_width: 375.0,
            actions: Mutex::new(Vec::new()),
            viewport_width: Mutex::new(1920),
        }
    }

    pub fn without(self, selector: &str) -> Self {
        self.present.lock().unwrap().remove(selector);
        self
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn act(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    fn name(&self) -> &str {
        "fake"
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.act(format!("goto {}", url));
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.title.clone())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.source.clone())
    }

    async fn is_present(&self, selector: &str) -> Result<bool> {
        Ok(self.present.lock().unwrap().contains(selector))
    }

    async fn wait_for(&self, selector: &str, _timeout_ms: u64) -> Result<bool> {
        self.is_present(selector).await
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        self.act(format!("fill {} {}", selector, text));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.act(format!("click {}", selector));
        Ok(())
    }

    async fn press(&self, selector: &str, key: &str) -> Result<()> {
        self.act(format!("press {} {}", selector, key));
        if self.login_accepted && selector.contains("pwd") {
            let mut url = self.url.lock().unwrap();
            *url = url.replace("/login", "/crm");
        }
        Ok(())
    }

    async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
        self.act(format!("viewport {}x{}", width, height));
        *self.viewport_width.lock().unwrap() = width;
        Ok(())
    }

    async fn eval_number(&self, _expression: &str) -> Result<f64> {
        let width = *self.viewport_width.lock().unwrap();
        if width < 400 {
            Ok(self.mobile_width)
        } else {
            Ok(width as f64)
        }
    }

    async fn close(&self) -> Result<()> {
        self.act("close".to_string());
        Ok(())
    }
}
