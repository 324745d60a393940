use crate::directives::{Directives, OverrideBundle};

/// Resolved settings of a single route.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
  pub path: Box<str>,
  pub url: Box<str>,
  pub pass_path: bool,
  pub directives: Directives,
  pub overrides: OverrideBundle,
}

impl ProxyConfig {
  /// Pattern registered with the router for this route.
  pub fn pattern(&self) -> String {
    let prefix = self.path.trim_end_matches('/');
    match (self.pass_path, prefix.is_empty()) {
      (true, true) => "/{tail:.*}".to_string(),
      (true, false) => format!("{}{{tail:(?:/.*)?}}", prefix),
      (false, _) => self.path.to_string(),
    }
  }

  /// Target URL for an inbound path, appending the part after the route prefix when paths pass through.
  ///
  /// The tail must be empty or start a new path segment, otherwise it could rewrite the
  /// target authority (`/proxy@other.host/`), so such paths yield `None`.
  pub fn target_url(&self, request_path: &str) -> Option<String> {
    if !self.pass_path {
      return Some(self.url.to_string());
    }

    let prefix = self.path.trim_end_matches('/');
    let tail = request_path.strip_prefix(prefix)?;

    if tail.is_empty() {
      Some(self.url.to_string())
    } else if tail.starts_with('/') {
      Some(format!("{}{}", self.url.trim_end_matches('/'), tail))
    } else {
      None
    }
  }
}
