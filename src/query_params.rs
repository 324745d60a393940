use actix_web::web::Query;
use log::warn;

/// Ordered multi-valued query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
  entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
  pub fn new() -> QueryParams {
    QueryParams::default()
  }

  /// Parses a raw (still percent-encoded) query string. Unparseable input yields no parameters.
  pub fn parse(query_string: &str) -> QueryParams {
    let mut params = QueryParams::new();

    match Query::<Vec<(String, String)>>::from_query(query_string) {
      Ok(pairs) => {
        for (name, value) in pairs.into_inner() {
          params.append(&name, value);
        }
      }
      Err(err) => warn!("Unable to parse query parameters {}", err),
    }

    params
  }

  pub fn append(&mut self, name: &str, value: impl Into<String>) {
    match self.entries.iter_mut().find(|(key, _)| key == name) {
      Some((_, values)) => values.push(value.into()),
      None => self.entries.push((name.to_string(), vec![value.into()])),
    }
  }

  /// Replaces every value stored under `name`.
  pub fn set(&mut self, name: &str, values: Vec<String>) {
    match self.entries.iter_mut().find(|(key, _)| key == name) {
      Some((_, current)) => *current = values,
      None => self.entries.push((name.to_string(), values)),
    }
  }

  pub fn get(&self, name: &str) -> Option<&[String]> {
    self
      .entries
      .iter()
      .find(|(key, _)| key == name)
      .map(|(_, values)| values.as_slice())
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Overrides win per key; keys missing from `other` keep their values.
  pub fn merge(&mut self, other: &QueryParams) {
    for (name, values) in other.entries.iter() {
      self.set(name, values.clone());
    }
  }

  pub fn pairs(&self) -> Vec<(&str, &str)> {
    self
      .entries
      .iter()
      .flat_map(|(name, values)| values.iter().map(move |value| (name.as_str(), value.as_str())))
      .collect()
  }
}

impl<'a> FromIterator<(&'a str, &'a str)> for QueryParams {
  fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
    let mut params = QueryParams::new();
    for (name, value) in iter {
      params.append(name, value);
    }
    params
  }
}
