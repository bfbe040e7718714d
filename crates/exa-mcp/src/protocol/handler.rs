//! Main request dispatcher — receives JSON-RPC messages, routes to handlers.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::Value;

use crate::session::CapabilitySession;
use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::validator::validate_request;

/// The main protocol handler that dispatches incoming JSON-RPC messages.
///
/// Requests are independent: nothing here serializes `tools/call` handling,
/// so concurrent calls each resolve the upstream client and run on their own.
pub struct ProtocolHandler {
    session: Arc<CapabilitySession>,
    capabilities: Mutex<NegotiatedCapabilities>,
}

impl ProtocolHandler {
    pub fn new(session: Arc<CapabilitySession>) -> Self {
        Self {
            session,
            capabilities: Mutex::new(NegotiatedCapabilities::default()),
        }
    }

    pub fn session(&self) -> &Arc<CapabilitySession> {
        &self.session
    }

    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return serde_json::to_value(e.to_json_rpc_error(request.id)).unwrap_or_default();
        }

        tracing::debug!("Request {}: {}", request.id, request.method);

        let id = request.id.clone();
        match self.dispatch_request(&request).await {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)).unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Request {id} ({}) failed: {e}", request.method);
                serde_json::to_value(e.to_json_rpc_error(id)).unwrap_or_default()
            }
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request).await,
            "auth" => self.handle_auth(request).await,

            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(request).await,

            "ping" => Ok(Value::Object(serde_json::Map::new())),

            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.capabilities.lock().await.mark_initialized();
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                // Upstream calls are never aborted; the notice is only logged.
                let request_id = notification
                    .params
                    .and_then(|p| serde_json::from_value::<CancelledParams>(p).ok())
                    .map(|p| p.request_id.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::info!("Received cancellation for request {request_id}");
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let init_params: InitializeParams = request.params_as()?;

        let result = self.capabilities.lock().await.negotiate(init_params);

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_auth(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let auth: AuthParams = request.params_as()?;
        self.session.authenticate(&auth.api_key).await;
        Ok(Value::Object(serde_json::Map::new()))
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: ToolRegistry::list_tools(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let call_params: ToolCallParams = request.params_as()?;

        let result =
            ToolRegistry::call(&call_params.name, call_params.arguments, &self.session).await;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}
