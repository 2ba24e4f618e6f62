//! Browser-driven suite against the CRM web interface

use crate::driver::{Browser, Control, ControlLocator};
use crate::error::{HarnessError, HarnessResult};
use crate::runner::console;
use crate::runner::state::{Chain, Outcome, ProbeSet, ScenarioReport};
use crate::utils::data::TestRecord;
use std::time::{Duration, Instant};

/// Bound for waiting on a single element
pub const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// A page whose source is not longer than this did not render
pub const MIN_PAGE_SOURCE: usize = 1000;

pub const MOBILE_VIEWPORT: (u32, u32) = (375, 667);
pub const DESKTOP_VIEWPORT: (u32, u32) = (1920, 1080);
pub const MAX_MOBILE_WIDTH: f64 = 400.0;

pub const FAST_LOAD: Duration = Duration::from_secs(5);
pub const SLOW_LOAD: Duration = Duration::from_secs(10);

const NAVIGATION_ROUTES: [&str; 4] = [
    "/crm/leads",
    "/crm/deals",
    "/crm/contacts",
    "/crm/organizations",
];

/// Everything a UI scenario needs
pub struct UiContext<'a> {
    pub browser: &'a dyn Browser,
    pub locator: &'a ControlLocator,
    pub base_url: String,
    /// Pause after navigation
    pub settle: Duration,
}

impl<'a> UiContext<'a> {
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), route)
    }

    /// Navigate to a route and let the page settle
    pub async fn open(&self, route: &str) -> HarnessResult<()> {
        self.browser
            .goto(&self.url(route))
            .await
            .map_err(HarnessError::browser)?;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }

    async fn locate(&self, control: &Control) -> HarnessResult<String> {
        self.locator.locate(self.browser, control).await
    }

    async fn click(&self, control: &Control) -> HarnessResult<()> {
        let selector = self
            .locator
            .wait_locate(self.browser, control, ELEMENT_TIMEOUT)
            .await?;
        self.browser
            .click(&selector)
            .await
            .map_err(HarnessError::browser)?;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}

/// Log in through the web form and open the CRM application.
///
/// Every failure here is an [`HarnessError::Auth`].
pub async fn login(
    ctx: &UiContext<'_>,
    username: &str,
    password: &str,
) -> HarnessResult<ScenarioReport> {
    let started_at = Instant::now();
    console::scenario_started("ui_login");

    ctx.open("/login")
        .await
        .map_err(|e| HarnessError::Auth(format!("login page unreachable: {}", e)))?;

    let usr_selector = ctx
        .locator
        .wait_locate(ctx.browser, &Control::input("usr"), ELEMENT_TIMEOUT)
        .await
        .map_err(|_| HarnessError::Auth("login form did not appear".to_string()))?;
    let pwd_selector = ctx
        .locate(&Control::input("pwd"))
        .await
        .map_err(|e| HarnessError::Auth(e.to_string()))?;

    let submitted: anyhow::Result<()> = async {
        ctx.browser.fill(&usr_selector, username).await?;
        ctx.browser.fill(&pwd_selector, password).await?;
        ctx.browser.press(&pwd_selector, "Enter").await
    }
    .await;
    submitted.map_err(|e| HarnessError::Auth(format!("{:#}", e)))?;
    tokio::time::sleep(ctx.settle).await;

    let url = ctx
        .browser
        .current_url()
        .await
        .map_err(|e| HarnessError::Auth(format!("{:#}", e)))?;
    if !(url.contains("/app") || url.contains("/crm")) {
        return Err(HarnessError::Auth(format!(
            "still on {} after submitting credentials",
            url
        )));
    }
    console::step_passed("login form submitted");

    ctx.open("/crm")
        .await
        .map_err(|e| HarnessError::Auth(format!("CRM application unreachable: {}", e)))?;
    let title = ctx.browser.title().await.unwrap_or_default();
    let url = ctx.browser.current_url().await.unwrap_or_default();
    if !(title.contains("CRM") || url.contains("crm")) {
        return Err(HarnessError::Auth(format!(
            "CRM application not loaded (title '{}', url {})",
            title, url
        )));
    }
    console::step_passed("CRM application loaded");

    Ok(ScenarioReport::new("ui_login", Outcome::Passed)
        .with_detail("landing_url", url)
        .with_duration(started_at))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCheck {
    Navigation,
    LeadCreation,
    DealCreation,
    Search,
    MobileResponsiveness,
    Performance,
}

impl UiCheck {
    /// Execution order, after the login
    pub const ALL: [UiCheck; 6] = [
        UiCheck::Navigation,
        UiCheck::LeadCreation,
        UiCheck::DealCreation,
        UiCheck::Search,
        UiCheck::MobileResponsiveness,
        UiCheck::Performance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UiCheck::Navigation => "navigation_ui",
            UiCheck::LeadCreation => "lead_creation_ui",
            UiCheck::DealCreation => "deal_creation_ui",
            UiCheck::Search => "search_functionality",
            UiCheck::MobileResponsiveness => "mobile_responsiveness",
            UiCheck::Performance => "performance_metrics",
        }
    }

    pub async fn run(self, ctx: &UiContext<'_>) -> ScenarioReport {
        console::scenario_started(self.name());
        match self {
            UiCheck::Navigation => navigation(ctx).await,
            UiCheck::LeadCreation => lead_creation(ctx).await,
            UiCheck::DealCreation => deal_creation(ctx).await,
            UiCheck::Search => search(ctx).await,
            UiCheck::MobileResponsiveness => mobile_responsiveness(ctx).await,
            UiCheck::Performance => performance(ctx).await,
        }
    }
}

async fn navigation(ctx: &UiContext<'_>) -> ScenarioReport {
    let mut probes = ProbeSet::new("navigation_ui");

    for route in NAVIGATION_ROUTES {
        let loaded = async {
            ctx.open(route).await?;
            let source = ctx
                .browser
                .page_source()
                .await
                .map_err(HarnessError::browser)?;
            if source.len() > MIN_PAGE_SOURCE {
                Ok::<_, HarnessError>(())
            } else {
                Err(HarnessError::Browser(format!(
                    "{} rendered only {} characters",
                    route,
                    source.len()
                )))
            }
        }
        .await;
        probes.record(route, loaded);
    }

    probes.finish()
}

async fn lead_creation(ctx: &UiContext<'_>) -> ScenarioReport {
    let record = TestRecord::generate("UI");
    let mut chain = Chain::new(
        "lead_creation_ui",
        &["open leads page", "open new lead form", "fill and save lead"],
    );

    if chain.step(ctx.open("/crm/leads")).await.is_none() {
        return chain.finish();
    }
    if chain
        .step(ctx.click(&Control::button(&["New", "+"])))
        .await
        .is_none()
    {
        return chain.finish();
    }

    let fields = [
        ("first_name", record.first_name.as_str()),
        ("email", record.email.as_str()),
        ("mobile_no", record.mobile_no.as_str()),
    ];
    let saved = chain
        .step(async {
            let mut filled = 0;
            for (field, value) in fields {
                match ctx.locate(&Control::input(field)).await {
                    Ok(selector) => {
                        ctx.browser
                            .fill(&selector, value)
                            .await
                            .map_err(HarnessError::browser)?;
                        filled += 1;
                    }
                    Err(e) => console::note(&format!("skipped {}", e)),
                }
            }
            ctx.click(&Control::button(&["Save", "Create"])).await?;
            Ok::<_, HarnessError>(filled)
        })
        .await;
    if let Some(filled) = saved {
        chain.detail("fields_filled", filled);
        chain.detail("first_name", &record.first_name);
    }

    chain.finish()
}

async fn deal_creation(ctx: &UiContext<'_>) -> ScenarioReport {
    let mut chain = Chain::new(
        "deal_creation_ui",
        &["open deals page", "open new deal form"],
    );

    if chain.step(ctx.open("/crm/deals")).await.is_none() {
        return chain.finish();
    }
    chain
        .step(ctx.click(&Control::button(&["New", "+"])))
        .await;

    chain.finish()
}

async fn search(ctx: &UiContext<'_>) -> ScenarioReport {
    let mut chain = Chain::new(
        "search_functionality",
        &["open leads page", "search leads"],
    );

    if chain.step(ctx.open("/crm/leads")).await.is_none() {
        return chain.finish();
    }
    chain
        .step(async {
            let selector = ctx.locate(&Control::search()).await?;
            ctx.browser
                .fill(&selector, "test")
                .await
                .map_err(HarnessError::browser)?;
            ctx.browser
                .press(&selector, "Enter")
                .await
                .map_err(HarnessError::browser)?;
            tokio::time::sleep(ctx.settle).await;
            Ok::<_, HarnessError>(())
        })
        .await;

    chain.finish()
}

async fn mobile_responsiveness(ctx: &UiContext<'_>) -> ScenarioReport {
    let mut chain = Chain::new(
        "mobile_responsiveness",
        &["open CRM at mobile size", "layout fits mobile width"],
    );

    let (width, height) = MOBILE_VIEWPORT;
    let opened = chain
        .step(async {
            ctx.browser
                .set_viewport(width, height)
                .await
                .map_err(HarnessError::browser)?;
            ctx.open("/crm").await
        })
        .await;

    if opened.is_some() {
        let measured = chain
            .step(async {
                let body_width = ctx
                    .browser
                    .eval_number("() => document.body.scrollWidth")
                    .await
                    .map_err(HarnessError::browser)?;
                if body_width <= MAX_MOBILE_WIDTH {
                    Ok(body_width)
                } else {
                    Err(HarnessError::Browser(format!(
                        "page is {}px wide at a {}px viewport",
                        body_width, width
                    )))
                }
            })
            .await;
        if let Some(body_width) = measured {
            chain.detail("body_width", body_width);
        }
    }

    let (width, height) = DESKTOP_VIEWPORT;
    if let Err(e) = ctx.browser.set_viewport(width, height).await {
        log::warn!("could not restore desktop viewport: {:#}", e);
    }

    chain.finish()
}

/// Outcome for a measured page load
pub fn load_outcome(load: Duration) -> Outcome {
    if load < FAST_LOAD {
        Outcome::Passed
    } else if load < SLOW_LOAD {
        Outcome::Partial
    } else {
        Outcome::Failed
    }
}

async fn performance(ctx: &UiContext<'_>) -> ScenarioReport {
    let started_at = Instant::now();

    let loaded = async {
        ctx.browser
            .goto(&ctx.url("/crm"))
            .await
            .map_err(HarnessError::browser)?;
        let present = ctx
            .browser
            .wait_for("body", SLOW_LOAD.as_millis() as u64)
            .await
            .map_err(HarnessError::browser)?;
        if present {
            Ok::<_, HarnessError>(started_at.elapsed())
        } else {
            Err(HarnessError::ElementNotFound("page body".to_string()))
        }
    }
    .await;

    match loaded {
        Ok(load) => {
            let load_time = format!("{:.2}s", load.as_secs_f64());
            console::note(&format!("Page load time: {}", load_time));
            ScenarioReport::new("performance_metrics", load_outcome(load))
                .with_detail("load_time", load_time)
                .with_duration(started_at)
        }
        Err(e) => {
            console::step_failed("page load", &e);
            ScenarioReport::new("performance_metrics", Outcome::Failed)
                .with_error(&e)
                .with_duration(started_at)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::FakeBrowser;

    fn context<'a>(browser: &'a FakeBrowser, locator: &'a ControlLocator) -> UiContext<'a> {
        UiContext {
            browser,
            locator,
            base_url: "http://crm.test".to_string(),
            settle: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_login_accepted() {
        let browser = FakeBrowser::crm();
        let locator = ControlLocator::frappe_ui();
        let ctx = context(&browser, &locator);

        let report = login(&ctx, "Administrator", "admin").await.unwrap();
        assert_eq!(report.name, "ui_login");
        assert_eq!(report.outcome, Outcome::Passed);
        assert!(browser
            .actions()
            .contains(&"press [name=\"pwd\"] Enter".to_string()));
    }

    #[tokio::test]
    async fn test_login_rejected_is_auth_error() {
        let mut browser = FakeBrowser::crm();
        browser.login_accepted = false;
        let locator = ControlLocator::frappe_ui();
        let ctx = context(&browser, &locator);

        let err = login(&ctx, "Administrator", "wrong").await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_without_form_is_auth_error() {
        let browser = FakeBrowser::crm().without("[name=\"usr\"]");
        let locator = ControlLocator::frappe_ui();
        let ctx = context(&browser, &locator);

        assert!(matches!(
            login(&ctx, "Administrator", "admin").await,
            Err(HarnessError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_lead_creation_skips_missing_fields() {
        let browser = FakeBrowser::crm();
        let locator = ControlLocator::frappe_ui();
        let ctx = context(&browser, &locator);

        let report = UiCheck::LeadCreation.run(&ctx).await;
        assert_eq!(report.outcome, Outcome::Passed);
        // mobile_no is not on the fake form
        assert_eq!(report.details.get("fields_filled").map(String::as_str), Some("2"));
        assert!(browser
            .actions()
            .contains(&"click xpath=//button[contains(text(), 'Create')]".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_new_button_is_partial() {
        let browser = FakeBrowser::crm().without("xpath=//button[contains(text(), 'New')]");
        let locator = ControlLocator::frappe_ui();
        let ctx = context(&browser, &locator);

        let report = UiCheck::DealCreation.run(&ctx).await;
        assert_eq!(report.outcome, Outcome::Partial);
        assert!(report.error.unwrap().contains("button 'New' or '+'"));
    }

    #[tokio::test]
    async fn test_navigation_requires_rendered_pages() {
        let mut browser = FakeBrowser::crm();
        browser.source = "<html></html>".to_string();
        let locator = ControlLocator::frappe_ui();
        let ctx = context(&browser, &locator);

        let report = UiCheck::Navigation.run(&ctx).await;
        assert_eq!(report.outcome, Outcome::Failed);
        assert_eq!(report.steps.len(), 4);
    }

    #[tokio::test]
    async fn test_mobile_layout_restores_viewport() {
        let mut browser = FakeBrowser::crm();
        browser.mobile_width = 900.0;
        let locator = ControlLocator::frappe_ui();
        let ctx = context(&browser, &locator);

        let report = UiCheck::MobileResponsiveness.run(&ctx).await;
        assert_eq!(report.outcome, Outcome::Partial);
        assert_eq!(
            browser.actions().last().map(String::as_str),
            Some("viewport 1920x1080")
        );
    }

    #[tokio::test]
    async fn test_search_and_performance() {
        let browser = FakeBrowser::crm();
        let locator = ControlLocator::frappe_ui();
        let ctx = context(&browser, &locator);

        assert_eq!(UiCheck::Search.run(&ctx).await.outcome, Outcome::Passed);

        let report = UiCheck::Performance.run(&ctx).await;
        assert_eq!(report.outcome, Outcome::Passed);
        assert!(report.details.contains_key("load_time"));
    }

    #[test]
    fn test_load_outcome_thresholds() {
        assert_eq!(load_outcome(Duration::from_millis(4999)), Outcome::Passed);
        assert_eq!(load_outcome(Duration::from_secs(5)), Outcome::Partial);
        assert_eq!(load_outcome(Duration::from_secs(10)), Outcome::Failed);
    }
}
