use actix_web::http::header::{self, HeaderMap};
use log::debug;

use crate::header_mapping::HeaderMapping;

/// Translates the inbound request headers into a canonical mapping.
///
/// The caller's `Host` is never carried over. `Content-Type` and `Content-Length`
/// are kept under their canonical names like every other header.
pub fn translate_headers(headers: &HeaderMap) -> HeaderMapping {
  let mut mapping = HeaderMapping::new();

  for (name, value) in headers.iter() {
    if name == header::HOST {
      continue;
    }

    match value.to_str() {
      Ok(value) => {
        mapping.insert(name.as_str(), value);
      }
      Err(_) => debug!("Ignoring non-text value of inbound header '{}'", name),
    }
  }

  mapping
}
