//! Themekit Server: per-request tenant theming over HTTP.
//!
//! Resolves the tenant from the `Host` header, loads the tenant's design
//! tokens from storage and serves the derived CSS variable block.

pub mod network;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use network::{NetworkConfig, NetworkModule};
pub use storage::{FileTokenStore, MemoryTokenStore};
