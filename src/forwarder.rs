use bytes::Bytes;
use log::debug;
use reqwest::header::{CONTENT_LENGTH, LOCATION};
use reqwest::{Client, StatusCode};

use crate::error::ProxyError;
use crate::header_mapping::HeaderMapping;
use crate::identity::ProxyIdentity;
use crate::location::make_absolute_location;
use crate::request_builder::OutboundRequest;

#[derive(Debug, Clone)]
pub struct OriginResponse {
  pub status: StatusCode,
  pub headers: HeaderMapping,
  pub body: Bytes,
  /// URL that produced this response.
  pub url: String,
  /// Where the origin points next: the absolutized `Location` of a redirect, otherwise `url`.
  pub resolved_url: String,
}

fn is_chased_redirect(status: StatusCode) -> bool {
  matches!(status.as_u16(), 301 | 302 | 303 | 304)
}

/// Sends the outbound request, chasing at most one redirect hop.
pub async fn forward(
  client: &Client,
  identity: &ProxyIdentity,
  request: &OutboundRequest,
) -> Result<OriginResponse, ProxyError> {
  let response = send(client, request, &request.url).await?;

  if identity.allow_redirect
    && request.follow_redirects
    && is_chased_redirect(response.status)
    && response.resolved_url != request.url
  {
    debug!(
      "Following {} from '{}' to '{}'",
      response.status, request.url, response.resolved_url
    );
    return send(client, request, &response.resolved_url).await;
  }

  Ok(response)
}

async fn send(client: &Client, request: &OutboundRequest, url: &str) -> Result<OriginResponse, ProxyError> {
  let mut builder = client
    .request(request.method.clone(), url)
    .headers(request.headers.to_header_map());

  if !request.query.is_empty() {
    builder = builder.query(&request.query.pairs());
  }

  // hyper leaves out the length of an empty body; origins expect `Content-Length: 0`
  if let Some(body) = &request.body {
    builder = builder
      .header(CONTENT_LENGTH, body.len())
      .body(body.clone());
  }

  if let Some(timeout) = request.timeout {
    builder = builder.timeout(timeout);
  }

  let response = builder.send().await?;
  let status = response.status();
  let headers = HeaderMapping::from_header_map(response.headers());
  let resolved_url = match headers.get(LOCATION.as_str()) {
    Some(location) if status.is_redirection() => make_absolute_location(url, location),
    _ => url.to_string(),
  };
  let body = response.bytes().await?;

  Ok(OriginResponse {
    status,
    headers,
    body,
    url: url.to_string(),
    resolved_url,
  })
}
