use std::time::Duration;

use url::Url;

/// Catalog endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://content-system.gog.com";

/// Configuration for the production HTTP client.
///
/// # Examples
///
/// ```
/// use buildsync_fetch::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::default()
///     .timeout(Duration::from_secs(10))
///     .user_agent("mirror-bot/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whole-request timeout, connect through body.
    ///
    /// Default: 30s
    pub timeout: Duration,

    /// Timeout for establishing the TCP/TLS connection.
    ///
    /// Default: 10s
    pub connect_timeout: Duration,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Proxies, routed by scheme: `https` entries proxy HTTPS traffic, all others HTTP.
    pub proxies: Vec<Url>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout:         Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent:      concat!("buildsync/", env!("CARGO_PKG_VERSION")).to_string(),
            proxies:         Vec::new(),
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: Url) -> Self {
        self.proxies.push(proxy);
        self
    }

    /// Split proxies into `(https, http)` by scheme.
    pub fn partition_proxies(&self) -> (Vec<&Url>, Vec<&Url>) {
        self.proxies.iter().partition(|u| u.scheme() == "https")
    }
}
