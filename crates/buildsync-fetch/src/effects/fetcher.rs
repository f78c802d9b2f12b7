use url::Url;

use crate::core::{build_url, parse_base_url};
use crate::data::{FetchRequest, Payload};
use crate::effects::http::HttpClient;
use crate::error::{FetchError, Result, error_chain};

/// Issues one catalog request per call and parses the body.
///
/// There is no retry logic here; callers own retry orchestration.
pub struct Fetcher<C: HttpClient> {
    client:   C,
    base_url: Url,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C { &self.client }

    /// Fetch and parse the build listing for `request`.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Payload> {
        let url = build_url(&self.base_url, request)?;
        tracing::debug!(item = request.id, %url, "fetching");

        let response = self
            .client
            .get(url.as_str())
            .await
            .map_err(|e| FetchError::Network {
                url:     url.to_string(),
                message: error_chain(&e),
            })?;

        if !response.is_success() {
            return Err(FetchError::Status {
                url:    url.to_string(),
                status: response.status,
            });
        }

        Payload::from_slice(&response.body).map_err(|source| FetchError::Malformed {
            url: url.to_string(),
            source,
        })
    }
}
