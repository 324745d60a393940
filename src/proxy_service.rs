use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use log::warn;
use reqwest::header::{HeaderName, HeaderValue};

use crate::directives::{Directives, OverrideBundle};
use crate::header_mapping::HeaderMapping;
use crate::proxy_service::proxy_config::ProxyConfig;
use crate::query_params::QueryParams;
use crate::route_config::{NameValuePair, RouteConfig};

pub mod proxy_config;
pub mod proxy_factory;
pub mod proxy_route_service;

impl From<RouteConfig> for ProxyConfig {
  fn from(rule: RouteConfig) -> ProxyConfig {
    let overrides = OverrideBundle {
      headers: extract_headers(&rule),
      query: extract_query_params(&rule),
      body: extract_body(&rule),
      timeout: rule.timeout_secs.map(Duration::from_secs),
    };

    let RouteConfig {
      path,
      url,
      pass_path,
      host,
      ip,
      no_redirect,
      allow_request_content_headers,
      allow_response_content_headers,
      ..
    } = rule;

    ProxyConfig {
      path: Box::from(path.as_str()),
      url: Box::from(url.as_str()),
      pass_path,
      directives: Directives {
        host,
        ip,
        no_redirect,
        allow_request_content_headers,
        allow_response_content_headers,
      },
      overrides,
    }
  }
}

/// Converts routes in registration order: longer paths first so a `/` catch-all never shadows a prefix.
pub fn ordered_configs(routes: Vec<RouteConfig>) -> Vec<Arc<ProxyConfig>> {
  let mut configs: Vec<Arc<ProxyConfig>> = routes
    .into_iter()
    .map(|route| Arc::new(ProxyConfig::from(route)))
    .collect();
  configs.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
  configs
}

#[inline]
fn extract_body(rule: &RouteConfig) -> Option<Bytes> {
  rule
    .body
    .as_ref()
    .map(|content| Bytes::copy_from_slice(content.as_bytes()))
}

#[inline]
fn extract_query_params(rule: &RouteConfig) -> QueryParams {
  match &rule.query {
    Some(values) => values
      .iter()
      .map(|pair| (pair.name.as_str(), pair.value.as_str()))
      .collect(),
    None => QueryParams::new(),
  }
}

#[inline]
fn extract_headers(rule: &RouteConfig) -> HeaderMapping {
  let mut headers = HeaderMapping::new();

  for pair in rule.headers.iter().flatten() {
    match validate_header(pair) {
      Ok(()) => {
        headers.insert(&pair.name, pair.value.as_str());
      }
      Err(InvalidHeaderError::InvalidHeaderName(err)) => {
        warn!("Ignoring header '{}' of route '{}': {}", pair.name, rule.path, err)
      }
      Err(InvalidHeaderError::InvalidHeaderValue(err)) => {
        warn!("Ignoring value of header '{}' on route '{}': {}", pair.name, rule.path, err)
      }
    }
  }

  headers
}

pub enum InvalidHeaderError {
  InvalidHeaderValue(String),
  InvalidHeaderName(String),
}

fn validate_header(pair: &NameValuePair) -> Result<(), InvalidHeaderError> {
  HeaderName::try_from(pair.name.as_str())
    .map_err(|e| InvalidHeaderError::InvalidHeaderName(e.to_string()))?;

  HeaderValue::try_from(pair.value.as_str())
    .map_err(|e| InvalidHeaderError::InvalidHeaderValue(e.to_string()))?;

  Ok(())
}
