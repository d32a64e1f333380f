//! Diagnostic engine that reflects the resolved request back as `data`.
//!
//! Used by the `serve` command so the adapter can be exercised without a
//! real engine behind it.

use serde_json::{json, Value};

use super::{ExecutionParams, ExecutionResult, QueryEngine};

/// Schema handle for [`EchoEngine`]; carries only a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoSchema {
    pub name: String,
}

impl EchoSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoEngine;

impl QueryEngine for EchoEngine {
    type Schema = EchoSchema;

    fn execute(&self, params: ExecutionParams<EchoSchema>) -> ExecutionResult {
        if params.context.is_expired() {
            return ExecutionResult::error("Deadline exceeded");
        }

        if params.request_string.trim().is_empty() {
            return ExecutionResult::error("Must provide an operation.");
        }

        ExecutionResult::data(json!({
            "echo": {
                "schema": params.schema.name,
                "query": params.request_string,
                "variables": params.variable_values.map(Value::Object),
                "operationName": params.operation_name,
                "requestId": params.context.request_id.to_string(),
            }
        }))
    }
}
