use serde::{Deserialize, Serialize};

/// Process wide proxy settings. Built once at startup and shared read-only.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(default)]
pub struct ProxyIdentity {
  pub version: String,
  pub module: String,
  pub allow_redirect: bool,
  pub allow_request_content_headers: bool,
  pub allow_response_content_headers: bool,
}

impl Default for ProxyIdentity {
  fn default() -> Self {
    ProxyIdentity {
      version: env!("CARGO_PKG_VERSION").to_string(),
      module: env!("CARGO_PKG_NAME").replace('_', "-"),
      allow_redirect: true,
      allow_request_content_headers: true,
      allow_response_content_headers: true,
    }
  }
}
