use std::future::Future;

use bytes::Bytes;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body:   Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self { Self::new(200, body) }

    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

/// Asynchronous HTTP client abstraction.
///
/// This trait provides the minimal interface the fetcher needs. Implementations
/// handle their own redirects and timeouts. A non-2xx status is *not* an error
/// at this layer; only transport failures are.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Fakes in tests
pub trait HttpClient: Send + Sync {
    /// Transport error type.
    type Error: std::error::Error + Send + 'static;

    /// Issue a GET and buffer the full response body.
    fn get(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<HttpResponse, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::data::ClientOptions;
    use crate::error::{FetchError, Result};

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> { Self::with_options(&ClientOptions::default()) }

        pub fn with_options(options: &ClientOptions) -> Result<Self> {
            let mut builder = reqwest::Client::builder()
                .timeout(options.timeout)
                .connect_timeout(options.connect_timeout)
                .user_agent(options.user_agent.as_str());

            let (secure, insecure) = options.partition_proxies();
            for url in secure {
                let proxy = reqwest::Proxy::https(url.as_str())
                    .map_err(|e| FetchError::Client(format!("invalid proxy {url}: {e}")))?;
                builder = builder.proxy(proxy);
            }
            for url in insecure {
                let proxy = reqwest::Proxy::http(url.as_str())
                    .map_err(|e| FetchError::Client(format!("invalid proxy {url}: {e}")))?;
                builder = builder.proxy(proxy);
            }

            let client = builder
                .build()
                .map_err(|e| FetchError::Client(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(&self, url: &str) -> std::result::Result<HttpResponse, Self::Error> {
            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok(HttpResponse { status, body })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
