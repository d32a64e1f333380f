//! # Query Engine Seam
//!
//! The handler never looks inside the engine. It assembles
//! [`ExecutionParams`] from the resolved request options, calls
//! [`QueryEngine::execute`] once, and serializes whatever comes back.

pub mod context;
pub mod echo;

pub use context::RequestContext;
pub use echo::{EchoEngine, EchoSchema};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::options::RequestOptions;

/// A synchronous query-execution engine
pub trait QueryEngine: Send + Sync + 'static {
    /// Schema handle, owned outside the handler
    type Schema: Send + Sync + 'static;

    /// Validate and execute one request
    fn execute(&self, params: ExecutionParams<Self::Schema>) -> ExecutionResult;
}

/// Everything the engine needs for one execution
pub struct ExecutionParams<S> {
    pub schema: Arc<S>,
    pub request_string: String,
    pub variable_values: Option<Map<String, Value>>,
    pub operation_name: String,
    pub context: RequestContext,
}

impl<S> ExecutionParams<S> {
    pub fn new(schema: Arc<S>, options: RequestOptions, context: RequestContext) -> Self {
        Self {
            schema,
            request_string: options.query,
            variable_values: options.variables,
            operation_name: options.operation_name,
            context,
        }
    }
}

impl<S> Clone for ExecutionParams<S> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            request_string: self.request_string.clone(),
            variable_values: self.variable_values.clone(),
            operation_name: self.operation_name.clone(),
            context: self.context.clone(),
        }
    }
}

impl<S> fmt::Debug for ExecutionParams<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionParams")
            .field("request_string", &self.request_string)
            .field("variable_values", &self.variable_values)
            .field("operation_name", &self.operation_name)
            .field("request_id", &self.context.request_id)
            .finish_non_exhaustive()
    }
}

/// Engine output in the standard `{data, errors}` shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ExecutionError>,
}

impl ExecutionResult {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![ExecutionError::new(message)],
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// One entry of `errors`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionError {
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }
}

/// Source position of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}
