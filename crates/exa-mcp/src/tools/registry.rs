//! Tool registration and dispatch.

use serde_json::Value;

use crate::session::CapabilitySession;
use crate::types::{ToolCallResult, ToolDefinition, ToolError, ToolResult};

use super::search;

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![search::definition()]
    }

    /// Run a tool and report the tagged outcome.
    ///
    /// The tool name is resolved before anything else, so an unknown name is
    /// reported whether or not the session is authenticated.
    pub async fn dispatch(
        name: &str,
        arguments: Option<Value>,
        session: &CapabilitySession,
    ) -> ToolResult<Value> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            search::TOOL_NAME => search::execute(args, session).await,
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }

    /// Run a tool and fold the outcome into the result envelope.
    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        session: &CapabilitySession,
    ) -> ToolCallResult {
        let outcome = Self::dispatch(name, arguments, session).await;
        if let Err(e) = &outcome {
            tracing::warn!("Tool '{name}' failed: {e}");
        }
        ToolCallResult::from_outcome(outcome)
    }
}
