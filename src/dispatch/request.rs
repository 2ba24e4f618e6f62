use reqwest::Method;
use serde_json::Value;

/// Prefix under which the CRM exposes whitelisted remote methods
pub const METHOD_PREFIX: &str = "/api/method/";

/// What a request is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Remote method, e.g. `frappe.client.insert`
    Method(String),
    /// Page route, e.g. `/crm`
    Route(String),
}

impl Target {
    /// Path relative to the base endpoint
    pub fn path(&self) -> String {
        match self {
            Target::Method(name) => format!("{}{}", METHOD_PREFIX, name),
            Target::Route(route) if route.starts_with('/') => route.clone(),
            Target::Route(route) => format!("/{}", route),
        }
    }

    /// Short name used in logs and error messages
    pub fn label(&self) -> &str {
        match self {
            Target::Method(name) => name,
            Target::Route(route) => route,
        }
    }
}

/// A single call to dispatch
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub target: Target,
    pub payload: Option<Value>,
    pub query: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
}

impl Request {
    pub fn new(method: Method, target: Target) -> Self {
        Self {
            method,
            target,
            payload: None,
            query: Vec::new(),
            form: None,
        }
    }

    pub fn get(name: &str) -> Self {
        Self::new(Method::GET, Target::Method(name.to_string()))
    }

    pub fn post(name: &str, payload: Value) -> Self {
        Self::new(Method::POST, Target::Method(name.to_string())).payload(payload)
    }

    /// GET of a page route
    pub fn page(route: &str) -> Self {
        Self::new(Method::GET, Target::Route(route.to_string()))
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Form-encoded body; takes precedence over a JSON payload
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.form = Some(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn carries_body(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD)
    }
}
