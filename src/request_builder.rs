use std::time::Duration;

use actix_web::http::Method;
use actix_web::HttpRequest;
use bytes::Bytes;

use crate::client_ip::ClientIpChain;
use crate::directives::{ContentPassthrough, Directives, OverrideBundle};
use crate::header_mapping::HeaderMapping;
use crate::header_translator::translate_headers;
use crate::identity::ProxyIdentity;
use crate::query_params::QueryParams;

/// The parts of an inbound request the proxy cares about.
#[derive(Debug, Clone)]
pub struct InboundRequest {
  pub method: Method,
  pub headers: HeaderMapping,
  pub query: QueryParams,
  pub body: Bytes,
  pub client_ip: String,
}

impl InboundRequest {
  pub fn from_http(request: &HttpRequest, body: Bytes, ip_source: &ClientIpChain) -> InboundRequest {
    InboundRequest {
      method: request.method().clone(),
      headers: translate_headers(request.headers()),
      query: QueryParams::parse(request.query_string()),
      body,
      client_ip: ip_source.resolve(request),
    }
  }
}

#[derive(Debug, Clone)]
pub struct OutboundRequest {
  pub method: Method,
  pub url: String,
  pub headers: HeaderMapping,
  pub query: QueryParams,
  pub body: Option<Bytes>,
  pub follow_redirects: bool,
  pub timeout: Option<Duration>,
  pub passthrough: ContentPassthrough,
  /// Detected caller address, reported in `Forwarded` even when an ip directive is given.
  pub client_ip: String,
}

pub fn build_request(
  inbound: InboundRequest,
  target_url: &str,
  overrides: &OverrideBundle,
  directives: &Directives,
  identity: &ProxyIdentity,
) -> OutboundRequest {
  let InboundRequest { method, mut headers, mut query, body, client_ip } = inbound;

  headers.insert("X-Real-Ip", client_ip.as_str());
  headers.insert("X-Forwarded-For", client_ip.as_str());

  if let Some(host) = &directives.host {
    headers.insert("Host", host.as_str());
    headers.insert("X-Forwarded-Host", host.as_str());
  }

  if let Some(ip) = &directives.ip {
    headers.insert("X-Real-Ip", ip.as_str());
    headers.insert("X-Forwarded-For", ip.as_str());
  }

  headers.merge(&overrides.headers);
  query.merge(&overrides.query);

  // transport recomputes it from the actual body
  headers.remove("Content-Length");

  let passthrough = directives.passthrough(identity);
  if !passthrough.request {
    headers.remove("Accept-Encoding");
  }

  // an empty POST/PUT still goes out with `Content-Length: 0`
  let body = match &overrides.body {
    Some(body) => Some(body.clone()),
    None if body.is_empty() && (method == Method::GET || method == Method::HEAD) => None,
    None => Some(body),
  };

  OutboundRequest {
    method,
    url: target_url.to_string(),
    headers,
    query,
    body,
    follow_redirects: directives.follow_redirects(),
    timeout: overrides.timeout,
    passthrough,
    client_ip,
  }
}
