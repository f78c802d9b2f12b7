//! I/O: the HTTP client seam and the fetcher built on it.

mod fetcher;
mod http;

pub use fetcher::Fetcher;
pub use http::{HttpClient, HttpResponse};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
