use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::ErrorKind;

use crate::identity::ProxyIdentity;

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct NameValuePair {
  pub name: String,
  pub value: String,
}

/// One forwarding entry point.
///
/// With `pass_path` the route path is a prefix and the rest of the inbound path is appended to `url`,
/// otherwise every matching request goes to `url` as is.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct RouteConfig {
  pub path: String,
  pub url: String,
  #[serde(default)]
  pub pass_path: bool,
  pub host: Option<String>,
  pub ip: Option<String>,
  pub no_redirect: Option<bool>,
  pub allow_request_content_headers: Option<bool>,
  pub allow_response_content_headers: Option<bool>,
  pub query: Option<Vec<NameValuePair>>,
  pub headers: Option<Vec<NameValuePair>>,
  pub body: Option<String>,
  pub timeout_secs: Option<u64>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct ProxyConfigFile {
  #[serde(default)]
  pub identity: ProxyIdentity,
  pub timeout_secs: Option<u64>,
  pub trust_forwarded_for: Option<bool>,
  #[serde(default)]
  pub routes: Vec<RouteConfig>,
}

impl RouteConfig {
  /// Catch-all route used when the target is given on the command line.
  pub fn pass_through(url: &str) -> RouteConfig {
    RouteConfig {
      path: "/".into(),
      url: url.into(),
      pass_path: true,
      host: None,
      ip: None,
      no_redirect: None,
      allow_request_content_headers: None,
      allow_response_content_headers: None,
      query: None,
      headers: None,
      body: None,
      timeout_secs: None,
    }
  }
}

impl ProxyConfigFile {
  pub fn load_from_file(file: &File) -> Result<ProxyConfigFile, std::io::Error> {
    let config: ProxyConfigFile =
      serde_yaml::from_reader(file).map_err(|err| std::io::Error::new(ErrorKind::Other, err))?;

    Ok(config)
  }
}
