//! Page acquisition: the fetch collaborator contract and its implementations.
//!
//! The extraction engine never talks to the network itself; it receives a
//! [`RawDocument`] from whichever [`Fetcher`] the caller wires in.

pub mod browser;
pub mod fetcher;
pub mod http_client;
pub mod memory;

pub use browser::BrowserFetcher;
pub use fetcher::{fetch_with_timeout, FetchError, Fetcher, RawDocument};
pub use http_client::HttpClient;
pub use memory::{Failure, MemoryFetcher};
