//! Handshake state recorded from `initialize`.

use crate::types::{
    ClientCapabilities, Implementation, InitializeParams, InitializeResult, MCP_VERSION,
};

/// What the client declared during the handshake.
///
/// Nothing here gates `auth` or tool calls; clients that skip `initialize`
/// are still served.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    pub client: ClientCapabilities,
    pub client_info: Option<Implementation>,
    pub requested_version: Option<String>,
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    /// Record the client's declaration and answer with the server's.
    ///
    /// A version mismatch is logged; the server always answers with
    /// [`MCP_VERSION`].
    pub fn negotiate(&mut self, params: InitializeParams) -> InitializeResult {
        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                requested = %params.protocol_version,
                supported = MCP_VERSION,
                "Protocol version mismatch; answering with server version"
            );
        }

        tracing::info!(
            "Client connected: {} v{}",
            params.client_info.name,
            params.client_info.version
        );

        self.client = params.capabilities;
        self.client_info = Some(params.client_info);
        self.requested_version = Some(params.protocol_version);

        InitializeResult::default_result()
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
        tracing::debug!("Handshake complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(version: &str) -> InitializeParams {
        InitializeParams {
            protocol_version: version.to_string(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "inspector".to_string(),
                version: "0.1".to_string(),
            },
        }
    }

    #[test]
    fn test_answers_with_server_version() {
        let mut negotiated = NegotiatedCapabilities::default();
        let result = negotiated.negotiate(params("1999-01-01"));

        assert_eq!(result.protocol_version, MCP_VERSION);
        assert_eq!(negotiated.requested_version.as_deref(), Some("1999-01-01"));
        assert_eq!(negotiated.client_info.unwrap().name, "inspector");
        assert!(!negotiated.initialized);
    }

    #[test]
    fn test_mark_initialized() {
        let mut negotiated = NegotiatedCapabilities::default();
        negotiated.mark_initialized();
        assert!(negotiated.initialized);
    }
}
