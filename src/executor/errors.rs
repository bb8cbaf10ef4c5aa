//! Runtime fault descriptions
//!
//! A fault stops the running context (status `Failed`). Codes are stable
//! strings so hosts and tests can match on them.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const WRONG_ARG_COUNT: &str = "WRONG_ARG_COUNT";
pub const WRONG_ARG_TYPE: &str = "WRONG_ARG_TYPE";
pub const TYPE_ERROR: &str = "TYPE_ERROR";
pub const PROPERTY_NOT_FOUND: &str = "PROPERTY_NOT_FOUND";
pub const UNDEFINED_VARIABLE: &str = "UNDEFINED_VARIABLE";
pub const FUNCTION_NOT_FOUND: &str = "FUNCTION_NOT_FOUND";
pub const NESTED_SCRIPT_CALL: &str = "NESTED_SCRIPT_CALL";
pub const STATE_FIELD_ERROR: &str = "STATE_FIELD_ERROR";
pub const LOOP_CONTROL_OUTSIDE_LOOP: &str = "LOOP_CONTROL_OUTSIDE_LOOP";
pub const HOST_ERROR: &str = "HOST_ERROR";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Error value with code and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorInfo {}
