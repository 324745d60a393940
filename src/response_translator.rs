use actix_web::body::BoxBody;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::HttpResponse;
use log::warn;
use reqwest::Url;

use crate::forwarder::OriginResponse;
use crate::header_mapping::{canonical_name, HeaderMapping};
use crate::identity::ProxyIdentity;
use crate::location::make_absolute_location;
use crate::request_builder::OutboundRequest;

/// Headers that only make sense on a single connection.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
  "Connection",
  "Keep-Alive",
  "Proxy-Authenticate",
  "Proxy-Authorization",
  "Te",
  "Trailers",
  "Transfer-Encoding",
  "Upgrade",
];

/// Dropped unless response content passthrough is enabled.
pub const CONTENT_HEADERS: [&str; 2] = ["Content-Encoding", "Content-Length"];

const FALLBACK_HOSTNAME: &str = "localhost";

pub fn is_excluded(name: &str, allow_content_headers: bool) -> bool {
  let name = canonical_name(name);
  HOP_BY_HOP_HEADERS.contains(&name.as_str()) || (!allow_content_headers && CONTENT_HEADERS.contains(&name.as_str()))
}

/// Applies the exclusion set. Applying it twice changes nothing.
pub fn filter_headers(headers: &HeaderMapping, allow_content_headers: bool) -> HeaderMapping {
  headers
    .iter()
    .filter(|(name, _)| !is_excluded(name, allow_content_headers))
    .collect()
}

pub fn local_hostname() -> String {
  hostname::get()
    .ok()
    .and_then(|name| name.into_string().ok())
    .filter(|name| !name.is_empty())
    .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string())
}

pub fn via_header(identity: &ProxyIdentity, hostname: &str) -> String {
  format!("{} {} {}", identity.version, identity.module, hostname)
}

pub fn forwarded_header(identity: &ProxyIdentity, client_ip: &str, hostname: &str, target_url: &str) -> String {
  let proto = Url::parse(target_url)
    .map(|url| url.scheme().to_string())
    .unwrap_or_default();

  format!(
    "by={},{};for={};host={};proto={}",
    identity.version, identity.module, client_ip, hostname, proto
  )
}

/// Builds the caller facing headers: filtered origin headers, absolute `Location`, `Via` and `Forwarded`.
pub fn response_headers(origin: &OriginResponse, request: &OutboundRequest, identity: &ProxyIdentity) -> HeaderMapping {
  let mut headers = filter_headers(&origin.headers, request.passthrough.response);

  if let Some(location) = headers.get("Location") {
    let absolute = make_absolute_location(&origin.url, location);
    headers.insert("Location", absolute);
  }

  let hostname = local_hostname();
  headers.insert("Via", via_header(identity, &hostname));
  headers.insert(
    "Forwarded",
    forwarded_header(identity, &request.client_ip, &hostname, &request.url),
  );

  headers
}

pub fn translate_response(origin: OriginResponse, request: &OutboundRequest, identity: &ProxyIdentity) -> HttpResponse {
  let headers = response_headers(&origin, request, identity);
  let mut response = HttpResponse::new(origin.status);
  let wire_headers = response.headers_mut();

  for (name, value) in headers.iter() {
    match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
      (Ok(name), Ok(value)) => {
        wire_headers.insert(name, value);
      }
      _ => warn!("Dropping malformed origin header '{}'", name),
    }
  }

  response.set_body(BoxBody::new(origin.body))
}
