//! Resolution of logical form controls to concrete selectors.
//!
//! Frappe UI renders the same control with different markup depending on the
//! page, so a control is located by trying an ordered list of strategies.

use crate::error::{HarnessError, HarnessResult};
use std::fmt;
use std::time::{Duration, Instant};

use super::traits::Browser;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRole {
    TextInput,
    Button,
    SearchBox,
}

/// A control described by what it is, not by its markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub role: ControlRole,
    /// Field names for inputs, visible labels for buttons
    pub names: Vec<String>,
}

impl Control {
    pub fn input(field: &str) -> Self {
        Self {
            role: ControlRole::TextInput,
            names: vec![field.to_string()],
        }
    }

    /// A button showing any of `labels`
    pub fn button(labels: &[&str]) -> Self {
        Self {
            role: ControlRole::Button,
            names: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn search() -> Self {
        Self {
            role: ControlRole::SearchBox,
            names: Vec::new(),
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .names
            .iter()
            .map(|n| format!("'{}'", n))
            .collect::<Vec<_>>()
            .join(" or ");
        match self.role {
            ControlRole::TextInput => write!(f, "input {}", names),
            ControlRole::Button => write!(f, "button {}", names),
            ControlRole::SearchBox => write!(f, "search box"),
        }
    }
}

/// One way of turning a control into candidate selectors
pub trait LocatorStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Candidate selectors, most specific first. Empty when the strategy does
    /// not apply to the control.
    fn candidates(&self, control: &Control) -> Vec<String>;
}

/// `<input name="...">`
pub struct NameAttribute;

impl LocatorStrategy for NameAttribute {
    fn name(&self) -> &'static str {
        "name attribute"
    }

    fn candidates(&self, control: &Control) -> Vec<String> {
        match control.role {
            ControlRole::TextInput => control
                .names
                .iter()
                .map(|n| format!("[name=\"{}\"]", n))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// `<input data-field="...">` as rendered by Frappe UI forms
pub struct DataFieldAttribute;

impl LocatorStrategy for DataFieldAttribute {
    fn name(&self) -> &'static str {
        "data-field attribute"
    }

    fn candidates(&self, control: &Control) -> Vec<String> {
        match control.role {
            ControlRole::TextInput => control
                .names
                .iter()
                .map(|n| format!("input[data-field=\"{}\"]", n))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Buttons whose text contains the label
pub struct ButtonText;

impl LocatorStrategy for ButtonText {
    fn name(&self) -> &'static str {
        "button text"
    }

    fn candidates(&self, control: &Control) -> Vec<String> {
        match control.role {
            ControlRole::Button => control
                .names
                .iter()
                .map(|n| format!("xpath=//button[contains(text(), '{}')]", n))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Search inputs in list views
pub struct SearchInput;

const SEARCH_SELECTORS: [&str; 4] = [
    "input[placeholder*='Search']",
    "input[type='search']",
    ".search input",
    "[data-testid='search']",
];

impl LocatorStrategy for SearchInput {
    fn name(&self) -> &'static str {
        "search input"
    }

    fn candidates(&self, control: &Control) -> Vec<String> {
        match control.role {
            ControlRole::SearchBox => SEARCH_SELECTORS.iter().map(|s| s.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Ordered set of strategies
pub struct ControlLocator {
    strategies: Vec<Box<dyn LocatorStrategy>>,
}

impl Default for ControlLocator {
    fn default() -> Self {
        Self::frappe_ui()
    }
}

impl ControlLocator {
    pub fn new(strategies: Vec<Box<dyn LocatorStrategy>>) -> Self {
        Self { strategies }
    }

    /// Strategies matching the markup Frappe CRM renders
    pub fn frappe_ui() -> Self {
        Self::new(vec![
            Box::new(NameAttribute),
            Box::new(DataFieldAttribute),
            Box::new(ButtonText),
            Box::new(SearchInput),
        ])
    }

    pub fn with_strategy(mut self, strategy: Box<dyn LocatorStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// All candidate selectors in strategy order, without duplicates
    pub fn candidates(&self, control: &Control) -> Vec<String> {
        self.sourced_candidates(control)
            .into_iter()
            .map(|(_, candidate)| candidate)
            .collect()
    }

    /// Candidates paired with the name of the strategy that produced them
    pub fn sourced_candidates(&self, control: &Control) -> Vec<(&'static str, String)> {
        let mut out: Vec<(&'static str, String)> = Vec::new();
        for strategy in &self.strategies {
            for candidate in strategy.candidates(control) {
                if !out.iter().any(|(_, seen)| *seen == candidate) {
                    out.push((strategy.name(), candidate));
                }
            }
        }
        out
    }

    /// First candidate present on the page
    pub async fn locate(&self, browser: &dyn Browser, control: &Control) -> HarnessResult<String> {
        for (strategy, candidate) in self.sourced_candidates(control) {
            match browser.is_present(&candidate).await {
                Ok(true) => {
                    log::debug!("located {} via {} ({})", control, candidate, strategy);
                    return Ok(candidate);
                }
                Ok(false) => {}
                Err(e) => log::debug!("probe of {} failed: {}", candidate, e),
            }
        }
        Err(HarnessError::ElementNotFound(control.to_string()))
    }

    /// Poll [`Self::locate`] until the control shows up or `timeout` passes
    pub async fn wait_locate(
        &self,
        browser: &dyn Browser,
        control: &Control,
        timeout: Duration,
    ) -> HarnessResult<String> {
        let start = Instant::now();
        loop {
            match self.locate(browser, control).await {
                Ok(selector) => return Ok(selector),
                Err(e) if start.elapsed() >= timeout => return Err(e),
                Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }
}
