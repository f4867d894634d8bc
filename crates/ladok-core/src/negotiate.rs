//! Content negotiation: `Accept` and `Content-Type` per service

use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::error::{ApiError, ApiResult};
use crate::link::{HttpMethod, Link};
use crate::profile::{service_for_uri, ApiProfile};

/// Headers for fetching a service index
pub fn headers_for_index_fetch(profile: &ApiProfile, service: &str) -> ApiResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value(&profile.default_content_type(service))?);
    Ok(headers)
}

/// Headers for following a link
///
/// GET and DELETE get `Accept`; POST and PUT get `Accept` and `Content-Type`.
/// Caller headers are kept and win over the defaults. The service is only
/// derived from the link URI when a default is actually needed.
pub fn headers_for_link(
    profile: &ApiProfile,
    link: &Link,
    overrides: &HeaderMap,
) -> ApiResult<HeaderMap> {
    let negotiated: &[HeaderName] = match link.method {
        HttpMethod::Get | HttpMethod::Delete => &[ACCEPT],
        HttpMethod::Post | HttpMethod::Put => &[ACCEPT, CONTENT_TYPE],
        HttpMethod::Other(ref method) => return Err(ApiError::unsupported_method(method)),
    };

    let mut headers = overrides.clone();
    let mut default: Option<HeaderValue> = None;
    for name in negotiated {
        if headers.contains_key(name) {
            continue;
        }
        let value = match &default {
            Some(value) => value.clone(),
            None => {
                let service = service_for_uri(&link.uri)?;
                let value = header_value(&profile.default_content_type(&service))?;
                default = Some(value.clone());
                value
            }
        };
        headers.insert(name.clone(), value);
    }
    Ok(headers)
}

fn header_value(value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ApiError::new(format!("invalid header value: {}", value)))
}
