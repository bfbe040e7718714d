//! Exa MCP Server — semantic web search as an MCP tool.

pub mod config;
pub mod protocol;
pub mod repl;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use protocol::ProtocolHandler;
pub use session::CapabilitySession;
pub use transport::StdioTransport;
