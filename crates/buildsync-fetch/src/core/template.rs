use url::Url;

use crate::data::FetchRequest;
use crate::error::{FetchError, Result};

/// Parse and normalize a catalog base URL.
///
/// A trailing slash is added so that joining keeps any path prefix the base carries.
pub fn parse_base_url(base: &str) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(FetchError::InvalidUrl(format!("{base}: not a base URL")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    Ok(url)
}

/// `{base}/products/{id}/os/{platform}/builds?generation={gen}`
pub fn build_url(base: &Url, request: &FetchRequest) -> Result<Url> {
    if request.platform.is_empty() || request.platform.contains(['/', '?', '#']) {
        return Err(FetchError::InvalidRequest(format!(
            "platform {:?} is not a single path segment",
            request.platform
        )));
    }

    let relative = format!(
        "products/{}/os/{}/builds",
        request.id, request.platform
    );
    let mut url = base
        .join(&relative)
        .map_err(|e| FetchError::InvalidUrl(format!("{base}{relative}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("generation", &request.generation.to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let base = parse_base_url("https://content-system.gog.com").unwrap();
        let url = build_url(&base, &FetchRequest::new(1207658924, "windows", 2)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://content-system.gog.com/products/1207658924/os/windows/builds?generation=2"
        );
    }

    #[test]
    fn test_build_url_keeps_base_path() {
        let base = parse_base_url("http://127.0.0.1:8080/mirror").unwrap();
        let url = build_url(&base, &FetchRequest::new(5, "osx", 1)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/mirror/products/5/os/osx/builds?generation=1"
        );
    }

    #[test]
    fn test_build_url_rejects_bad_platform() {
        let base = parse_base_url("https://example.com/").unwrap();
        for platform in ["", "win/dows", "a?b"] {
            let err = build_url(&base, &FetchRequest::new(1, platform, 1)).unwrap_err();
            assert!(matches!(err, FetchError::InvalidRequest(_)));
        }
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(parse_base_url("mailto:someone@example.com").is_err());
    }
}
