//! Method channel message types
//!
//! Host plugins forward each platform-channel invocation as a `MethodCall`
//! and expect a `MethodResult` back. Both travel as JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code for a missing or mistyped argument
pub const CODE_INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";

/// Error code for a start function that returned non-zero
pub const CODE_INIT_FAILED: &str = "INIT_FAILED";

/// Error code for call/send before initialize
pub const CODE_NOT_INITIALIZED: &str = "NOT_INITIALIZED";

/// Error code for any other call failure
pub const CODE_CALL_ERROR: &str = "CALL_ERROR";

/// An invocation received from the host plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// Create a new MethodCall without arguments
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    /// Add an argument
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.arguments.is_object() {
            self.arguments = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.arguments {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Parse a call from its JSON envelope
    pub fn from_json(json: &str) -> Result<Self, MethodError> {
        serde_json::from_str(json)
            .map_err(|e| MethodError::invalid_argument(format!("malformed method call: {}", e)))
    }

    /// Get a string argument
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// Structured failure reported to the host plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl MethodError {
    /// Create a new MethodError
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach details
    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(CODE_INVALID_ARGUMENT, message)
    }

    /// Start failure; the runtime's status code goes into `details`
    pub fn init_failed(code: i32) -> Self {
        Self::new(
            CODE_INIT_FAILED,
            format!("BEAM VM initialization failed with code: {}", code),
        )
        .with_details(code)
    }

    pub fn not_initialized() -> Self {
        Self::new(CODE_NOT_INITIALIZED, "BEAM VM is not initialized")
    }
}

/// Outcome of a dispatched method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResult {
    Success { value: Value },
    Error(MethodError),
    NotImplemented,
}

impl MethodResult {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    /// Success with no payload
    pub fn empty() -> Self {
        Self::Success { value: Value::Null }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Serialize to the JSON envelope returned to the host
    pub fn to_json(&self) -> String {
        // Value, String and Option fields only; serialization cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"status\":\"not_implemented\"}"))
    }
}

impl From<MethodError> for MethodResult {
    fn from(error: MethodError) -> Self {
        Self::Error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_call_from_json() {
        let call =
            MethodCall::from_json(r#"{"method":"initialize","arguments":{"erlangPath":"/data/erl"}}"#)
                .unwrap();
        assert_eq!(call.method, "initialize");
        assert_eq!(call.arg_str("erlangPath"), Some("/data/erl"));
    }

    #[test]
    fn test_method_call_without_arguments() {
        let call = MethodCall::from_json(r#"{"method":"isInitialized"}"#).unwrap();
        assert_eq!(call.arguments, Value::Null);
        assert_eq!(call.arg_str("anything"), None);
    }

    #[test]
    fn test_is_success() {
        assert!(MethodResult::empty().is_success());
        assert!(MethodResult::success(true).is_success());
        assert!(!MethodResult::from(MethodError::not_initialized()).is_success());
        assert!(!MethodResult::NotImplemented.is_success());
    }

    #[test]
    fn test_malformed_envelope() {
        let err = MethodCall::from_json("not json").unwrap_err();
        assert_eq!(err.code, CODE_INVALID_ARGUMENT);
    }

    #[test]
    fn test_with_arg_builds_object() {
        let call = MethodCall::new("send")
            .with_arg("processName", "logger")
            .with_arg("message", "{}");
        assert_eq!(call.arg_str("processName"), Some("logger"));
        assert_eq!(call.arg_str("message"), Some("{}"));
    }

    #[test]
    fn test_non_string_argument_is_absent() {
        let call = MethodCall::new("initialize").with_arg("erlangPath", 42);
        assert_eq!(call.arg_str("erlangPath"), None);
    }

    #[test]
    fn test_init_failed_carries_code() {
        let err = MethodError::init_failed(3);
        assert_eq!(err.code, CODE_INIT_FAILED);
        assert_eq!(err.details, Some(json!(3)));
    }

    #[test]
    fn test_result_json_shape() {
        assert_eq!(
            MethodResult::success(true).to_json(),
            r#"{"status":"success","value":true}"#
        );
        assert_eq!(
            MethodResult::NotImplemented.to_json(),
            r#"{"status":"not_implemented"}"#
        );
        let err: MethodResult = MethodError::not_initialized().into();
        assert_eq!(
            err.to_json(),
            r#"{"status":"error","code":"NOT_INITIALIZED","message":"BEAM VM is not initialized"}"#
        );
    }
}
