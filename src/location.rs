use log::debug;
use reqwest::Url;

/// Turns a `Location` value into an absolute URL relative to `base_url`, the URL that was fetched.
///
/// Handles absolute, protocol-relative, host-relative and path-relative locations.
/// Dot segments are left untouched.
pub fn make_absolute_location(base_url: &str, location: &str) -> String {
  if has_scheme(location) {
    return location.to_string();
  }

  let base = match Url::parse(base_url) {
    Ok(base) => base,
    Err(err) => {
      debug!("Cannot resolve location against '{}': {}", base_url, err);
      return location.to_string();
    }
  };

  if location.starts_with("//") {
    return format!("{}:{}", base.scheme(), location);
  }

  let origin = format!("{}://{}", base.scheme(), authority(&base));

  if location.starts_with('/') {
    format!("{}{}", origin, location)
  } else {
    let directory = base.path().rsplit_once('/').map_or("", |(directory, _)| directory);
    format!("{}{}/{}", origin, directory, location)
  }
}

fn has_scheme(location: &str) -> bool {
  match location.find("://") {
    Some(index) if index > 0 => location[..index].bytes().all(|b| b.is_ascii_alphabetic()),
    _ => false,
  }
}

/// Host plus explicit port. Unlike a raw netloc this omits userinfo, and `Url`
/// already drops a port equal to the scheme default (`http://h:80` yields `h`).
fn authority(url: &Url) -> String {
  let host = url.host_str().unwrap_or_default();
  match url.port() {
    Some(port) => format!("{}:{}", host, port),
    None => host.to_string(),
  }
}
