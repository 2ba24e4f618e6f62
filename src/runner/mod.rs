pub mod console;
pub mod state;

use crate::driver::{Browser, BrowserConfig, ControlLocator, PlaywrightBrowser};
use crate::error::{HarnessError, HarnessResult};
use crate::report::summary::{aggregate, ExitPolicy, Summary};
use crate::scenarios::{FeatureCheck, SmokeCheck, UiCheck, UiContext};
use crate::session::{self, LoginPolicy, SessionConfig};
use crate::utils::config::HarnessConfig;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub use state::*;

/// Body marker a successful interactive login carries
pub const LOGGED_IN_MARKER: &str = "logged in";

/// The runnable suites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    Features,
    Smoke,
    Ui,
}

impl Suite {
    pub fn name(self) -> &'static str {
        match self {
            Suite::Features => "features",
            Suite::Smoke => "smoke",
            Suite::Ui => "ui",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Suite::Features => "Comprehensive CRM Feature Tests",
            Suite::Smoke => "CRM Smoke Tests",
            Suite::Ui => "CRM UI Tests",
        }
    }

    pub fn exit_policy(self) -> ExitPolicy {
        match self {
            Suite::Features | Suite::Ui => ExitPolicy::Strict,
            Suite::Smoke => ExitPolicy::Lenient,
        }
    }

    pub fn login_policy(self) -> LoginPolicy {
        match self {
            Suite::Features => LoginPolicy::RequireMarker(LOGGED_IN_MARKER),
            Suite::Smoke | Suite::Ui => LoginPolicy::StatusOnly,
        }
    }
}

/// Suites that run over the HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSuite {
    Features,
    Smoke,
}

impl From<ApiSuite> for Suite {
    fn from(api: ApiSuite) -> Self {
        match api {
            ApiSuite::Features => Suite::Features,
            ApiSuite::Smoke => Suite::Smoke,
        }
    }
}

/// Everything a finished suite produced
#[derive(Debug, Clone)]
pub struct SuiteRun {
    pub suite: Suite,
    pub session_id: String,
    pub reports: Vec<ScenarioReport>,
    pub summary: Summary,
    pub duration: Duration,
}

impl SuiteRun {
    pub fn exit_code(&self) -> u8 {
        self.suite.exit_policy().exit_code(&self.summary)
    }
}

/// Run a suite end to end against `config.base_url`.
///
/// Returns an error only when the suite could not start: a failed login or a
/// browser that would not launch. Scenario failures end up in the reports.
pub async fn run_suite(suite: Suite, config: &HarnessConfig) -> HarnessResult<SuiteRun> {
    console::suite_started(suite.title(), &config.base_url);

    match suite {
        Suite::Features => run_http_suite(ApiSuite::Features, config).await,
        Suite::Smoke => run_http_suite(ApiSuite::Smoke, config).await,
        Suite::Ui => {
            let browser = PlaywrightBrowser::launch(BrowserConfig {
                headless: config.headless,
                ..BrowserConfig::default()
            })
            .await
            .map_err(HarnessError::browser)?;

            run_in_browser(&browser, config).await
        }
    }
}

/// Log in over HTTP, then run every scenario of an API suite in order
pub async fn run_http_suite(api: ApiSuite, config: &HarnessConfig) -> HarnessResult<SuiteRun> {
    let suite = Suite::from(api);
    let started_at = Instant::now();
    let session = session::authenticate(SessionConfig::from(config), suite.login_policy()).await?;
    console::step_passed(&format!("Logged in as {}", config.username));

    let mut reports = Vec::new();
    match api {
        ApiSuite::Features => {
            for check in FeatureCheck::ALL {
                reports.push(check.run(&session).await);
            }
        }
        ApiSuite::Smoke => {
            for check in SmokeCheck::ALL {
                reports.push(check.run(&session).await);
            }
        }
    }

    Ok(summarize(suite, reports, started_at))
}

/// Run the UI suite in `browser`, then close it whatever the outcome
pub async fn run_in_browser(browser: &dyn Browser, config: &HarnessConfig) -> HarnessResult<SuiteRun> {
    let result = run_ui_suite(browser, config).await;
    if let Err(e) = browser.close().await {
        log::warn!("failed to close browser: {:#}", e);
    }
    result
}

/// Log in through `browser`, then run the UI scenarios in order
pub async fn run_ui_suite(browser: &dyn Browser, config: &HarnessConfig) -> HarnessResult<SuiteRun> {
    let started_at = Instant::now();
    let locator = ControlLocator::frappe_ui();
    let ctx = UiContext {
        browser,
        locator: &locator,
        base_url: config.base_url.clone(),
        settle: config.settle,
    };

    log::info!("running ui suite in {}", browser.name());
    let login = crate::scenarios::ui::login(&ctx, &config.username, &config.password).await?;

    let mut reports = Vec::with_capacity(UiCheck::ALL.len() + 1);
    reports.push(login);
    for check in UiCheck::ALL {
        reports.push(check.run(&ctx).await);
    }

    Ok(summarize(Suite::Ui, reports, started_at))
}

fn summarize(suite: Suite, reports: Vec<ScenarioReport>, started_at: Instant) -> SuiteRun {
    let duration = started_at.elapsed();
    let summary = aggregate(&reports);
    console::print_summary(&reports, &summary, duration);

    SuiteRun {
        suite,
        session_id: uuid::Uuid::new_v4().to_string(),
        reports,
        summary,
        duration,
    }
}
