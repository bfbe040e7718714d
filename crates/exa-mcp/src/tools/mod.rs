//! MCP tool implementations.

pub mod registry;
pub mod schema;
pub mod search;

pub use registry::ToolRegistry;
