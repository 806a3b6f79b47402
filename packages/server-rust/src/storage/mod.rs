//! Token storage backends for the Themekit server.
//!
//! Both backends implement [`TokenSource`](themekit_core::TokenSource), the
//! read-only, tenant-keyed interface consumed by the token reader:
//!
//! - [`FileTokenStore`]: `<tokens_dir>/<tenant>.tokens.json` files on disk
//! - [`MemoryTokenStore`]: records held in a concurrent map, for tests and
//!   embedding

pub mod backends;

pub use backends::file::FileTokenStore;
pub use backends::memory::MemoryTokenStore;
