use crate::error::{HarnessError, HarnessResult};
use serde_json::Value;
use std::collections::HashMap;

/// Response of one dispatched call, uninterpreted
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Label of the target the call was made to
    pub target: String,
    pub status: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx answer into a step failure
    pub fn ensure_success(self) -> HarnessResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HarnessError::Status {
                target: self.target,
                status: self.status,
            })
        }
    }

    pub fn json(&self) -> HarnessResult<Value> {
        serde_json::from_str(&self.body).map_err(|e| HarnessError::Parse {
            target: self.target.clone(),
            reason: e.to_string(),
        })
    }

    /// The `message` member every remote method wraps its result in
    pub fn message(&self) -> HarnessResult<Value> {
        let mut json = self.json()?;
        match json.get_mut("message") {
            Some(message) => Ok(message.take()),
            None => Err(self.missing("message")),
        }
    }

    /// Non-empty string at a JSON pointer below `message`, e.g. `/name`
    pub fn require_str(&self, pointer: &str) -> HarnessResult<String> {
        let message = self.message()?;
        let value = if pointer.is_empty() {
            Some(&message)
        } else {
            message.pointer(pointer)
        };
        match value {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            _ => Err(self.missing(&format!("message{}", pointer.replace('/', ".")))),
        }
    }

    /// Sequence at a JSON pointer below `message`; empty pointer means `message` itself
    pub fn require_array(&self, pointer: &str) -> HarnessResult<Vec<Value>> {
        let message = self.message()?;
        let value = if pointer.is_empty() {
            Some(message)
        } else {
            message.pointer(pointer).cloned()
        };
        match value {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(HarnessError::Parse {
                target: self.target.clone(),
                reason: format!("message{} is not a list", pointer.replace('/', ".")),
            }),
            None => Err(self.missing(&format!("message{}", pointer.replace('/', ".")))),
        }
    }

    fn missing(&self, field: &str) -> HarnessError {
        HarnessError::MissingField {
            target: self.target.clone(),
            field: field.to_string(),
        }
    }
}

/// Short rendering of a flag-like JSON value for console output
pub fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "unknown".to_string(),
        other => other.to_string(),
    }
}
