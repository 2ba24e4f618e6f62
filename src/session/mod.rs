//! Session manager
//!
//! Logs into the CRM and keeps the credential context (cookie store plus
//! anti-forgery token) that every later call is dispatched with.

pub mod token;

use crate::dispatch::{self, Request, Target};
use crate::error::{HarnessError, HarnessResult};
use crate::utils::config::HarnessConfig;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

/// Remote method used to probe the session after login
pub const LOGGED_USER_METHOD: &str = "frappe.auth.get_logged_user";

/// Immutable connection settings for one run
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl From<&HarnessConfig> for SessionConfig {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.timeout,
        }
    }
}

/// How a login answer is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPolicy {
    /// A 2xx status is enough
    StatusOnly,
    /// A 2xx status and the marker somewhere in the body
    RequireMarker(&'static str),
}

/// Credential context threaded through every dispatched call
pub struct Session {
    config: SessionConfig,
    base: Url,
    client: reqwest::Client,
    jar: Arc<Jar>,
    csrf_token: Option<String>,
}

impl Session {
    /// Unauthenticated session with an empty cookie store
    pub fn new(config: SessionConfig) -> HarnessResult<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| HarnessError::Transport {
            target: config.base_url.clone(),
            reason: format!("invalid base URL: {}", e),
        })?;

        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| HarnessError::Transport {
                target: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            config,
            base,
            client,
            jar,
            csrf_token: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Absolute URL of a target below the base endpoint
    pub fn url_for(&self, target: &Target) -> String {
        format!("{}{}", self.config.base_url, target.path())
    }

    /// Value of a cookie the target has issued for the base endpoint
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        token::cookie_value(header.to_str().ok()?, name)
    }
}

/// Log in and capture the session continuity cookie and anti-forgery token.
///
/// Any failure is fatal for the suite; there is no retry.
pub async fn authenticate(config: SessionConfig, policy: LoginPolicy) -> HarnessResult<Session> {
    let mut session = Session::new(config).map_err(|e| HarnessError::Auth(e.to_string()))?;

    let login_page = dispatch::call(&session, Request::page("/login"))
        .await
        .map_err(|e| HarnessError::Auth(format!("cannot reach login page: {}", e)))?;
    if !login_page.is_success() {
        return Err(HarnessError::Auth(format!(
            "login page answered with status {}",
            login_page.status
        )));
    }

    let username = session.config.username.clone();
    let password = session.config.password.clone();
    let login = dispatch::call(
        &session,
        Request::new(reqwest::Method::POST, Target::Route("/".to_string())).form(&[
            ("cmd", "login"),
            ("usr", username.as_str()),
            ("pwd", password.as_str()),
        ]),
    )
    .await
    .map_err(|e| HarnessError::Auth(format!("login request failed: {}", e)))?;

    if !login.is_success() {
        return Err(HarnessError::Auth(format!(
            "login rejected with status {}",
            login.status
        )));
    }
    if let LoginPolicy::RequireMarker(marker) = policy {
        if !token::has_marker(&login.body, marker) {
            return Err(HarnessError::Auth(format!(
                "login response does not confirm the session (expected '{}')",
                marker
            )));
        }
    }
    log::info!("logged in to {} as {}", session.config.base_url, username);

    // The follow-up call is only a token source; its failure is not fatal.
    let probe = dispatch::call(&session, Request::get(LOGGED_USER_METHOD))
        .await
        .ok();

    session.csrf_token = session
        .cookie("csrf_token")
        .or_else(|| token::extract_from_body(&login.body))
        .or_else(|| probe.and_then(|r| token::extract_from_body(&r.body)));

    match session.csrf_token {
        Some(_) => log::debug!("anti-forgery token captured"),
        None => log::debug!("no anti-forgery token issued; continuing without one"),
    }

    Ok(session)
}
