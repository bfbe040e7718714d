//! Authentication state and the bound upstream client.

pub mod manager;

pub use manager::{CapabilitySession, ExaConnector, ProviderFactory};
