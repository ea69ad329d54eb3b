use hyper::header::{AUTHORIZATION, HeaderMap};
use tracing::debug;

/// Extract a header value as a string
pub fn get_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(|s| {
        debug!("Retrieved header: {}", name);
        s.to_string()
    })
}

/// Bearer token from the `Authorization` header.
///
/// The scheme word is not checked: the token is whatever follows the first
/// space, or the whole value when there is no space.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = get_header_value(headers, AUTHORIZATION.as_str())?;
    let token = match value.split_once(' ') {
        Some((_scheme, token)) => token,
        None => value.as_str(),
    };
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn token_follows_first_space() {
        assert_eq!(
            extract_token(&headers_with_auth("Bearer abc.def.ghi")).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(
            extract_token(&headers_with_auth("Token abc")).as_deref(),
            Some("abc")
        );
        assert_eq!(
            extract_token(&headers_with_auth("Bearer a b")).as_deref(),
            Some("a b")
        );
    }

    #[test]
    fn header_without_space_is_the_token() {
        assert_eq!(
            extract_token(&headers_with_auth("abc.def.ghi")).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn missing_header_has_no_token() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let headers = headers_with_auth("Bearer x");
        assert_eq!(get_header_value(&headers, "Authorization").as_deref(), Some("Bearer x"));
        assert_eq!(get_header_value(&headers, "x-missing"), None);
    }
}
