use std::time::Duration;

use bytes::Bytes;

use crate::header_mapping::HeaderMapping;
use crate::identity::ProxyIdentity;
use crate::query_params::QueryParams;

/// Per-call switches. `None` means "not given" and falls back to the process defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
  /// Sets `Host` and `X-Forwarded-Host` on the outbound request.
  pub host: Option<String>,
  /// Replaces the detected caller address in `X-Real-Ip` and `X-Forwarded-For`.
  pub ip: Option<String>,
  pub no_redirect: Option<bool>,
  pub allow_request_content_headers: Option<bool>,
  pub allow_response_content_headers: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentPassthrough {
  /// Keep the caller's `Accept-Encoding`.
  pub request: bool,
  /// Keep the origin's `Content-Encoding` and `Content-Length`.
  pub response: bool,
}

impl Directives {
  pub fn follow_redirects(&self) -> bool {
    !self.no_redirect.unwrap_or(false)
  }

  pub fn passthrough(&self, identity: &ProxyIdentity) -> ContentPassthrough {
    ContentPassthrough {
      request: self
        .allow_request_content_headers
        .unwrap_or(identity.allow_request_content_headers),
      response: self
        .allow_response_content_headers
        .unwrap_or(identity.allow_response_content_headers),
    }
  }
}

/// Caller supplied pieces of the outbound request, merged over what is derived from the inbound one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideBundle {
  pub headers: HeaderMapping,
  pub query: QueryParams,
  /// Replaces the inbound body when set.
  pub body: Option<Bytes>,
  /// Overrides the client wide request timeout.
  pub timeout: Option<Duration>,
}
