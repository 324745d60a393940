use std::collections::BTreeMap;

use log::warn;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Single valued header map keyed by canonical `Dash-Separated-Capitalized` names.
///
/// Repeated headers collapse to the last value written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
  entries: BTreeMap<String, String>,
}

/// Normalizes a header key such as `x-real-ip` or `CONTENT_TYPE` into `X-Real-Ip` / `Content-Type`.
pub fn canonical_name(key: &str) -> String {
  key
    .split(|c| c == '-' || c == '_')
    .map(|part| {
      let mut chars = part.chars();
      match chars.next() {
        Some(first) => {
          let mut word = first.to_ascii_uppercase().to_string();
          word.push_str(&chars.as_str().to_ascii_lowercase());
          word
        }
        None => String::new(),
      }
    })
    .collect::<Vec<String>>()
    .join("-")
}

impl HeaderMapping {
  pub fn new() -> HeaderMapping {
    HeaderMapping::default()
  }

  pub fn insert(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
    self.entries.insert(canonical_name(name), value.into())
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.entries.get(&canonical_name(name)).map(String::as_str)
  }

  pub fn remove(&mut self, name: &str) -> Option<String> {
    self.entries.remove(&canonical_name(name))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entries.contains_key(&canonical_name(name))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
  }

  /// Copies every entry of `other` over this mapping; `other` wins on conflicts.
  pub fn merge(&mut self, other: &HeaderMapping) {
    for (name, value) in other.entries.iter() {
      self.entries.insert(name.clone(), value.clone());
    }
  }

  /// Flattens a wire header map, keeping the last value of repeated headers.
  pub fn from_header_map(headers: &HeaderMap) -> HeaderMapping {
    let mut mapping = HeaderMapping::new();

    for (name, value) in headers.iter() {
      mapping.insert(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }

    mapping
  }

  /// Builds a wire header map. Entries that are not valid HTTP tokens are dropped.
  pub fn to_header_map(&self) -> HeaderMap {
    let mut header_map = HeaderMap::with_capacity(self.entries.len());

    for (name, value) in self.entries.iter() {
      match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
        (Ok(name), Ok(value)) => {
          header_map.insert(name, value);
        }
        _ => warn!("Skipping malformed header '{}'", name),
      }
    }

    header_map
  }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderMapping {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut mapping = HeaderMapping::new();
    for (name, value) in iter {
      mapping.insert(name.as_ref(), value);
    }
    mapping
  }
}
