//! Catalog build-metadata requests over a pluggable HTTP client.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable request, payload and configuration types
//! - `core` - Pure transformations (URL templating, backoff timing)
//! - `effects` - I/O behind the [`HttpClient`] trait
//!
//! # Key Features
//!
//! - **One request per call**: [`Fetcher::fetch`] issues a single GET and parses the body
//! - **Mechanism-only**: no retries here; callers decide what to retry and when
//! - **Classified failures**: transport, status and parse failures are distinct
//!   [`FetchError`] variants

pub mod data;

mod core;
mod effects;
mod error;

pub use self::core::{backoff_delay, build_url, parse_base_url};
pub use data::{ClientOptions, DEFAULT_BASE_URL, FetchRequest, ItemId, Payload};
pub use effects::{Fetcher, HttpClient, HttpResponse};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, Result, error_chain};
