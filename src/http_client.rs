use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpClientConfig {
  pub http_proxy: Option<String>,
  pub user: Option<String>,
  pub pass: Option<String>,
  pub enable_cookies: bool,
  pub timeout: Duration,
}

impl Default for HttpClientConfig {
  fn default() -> Self {
    HttpClientConfig {
      http_proxy: None,
      user: None,
      pass: None,
      enable_cookies: false,
      timeout: DEFAULT_TIMEOUT,
    }
  }
}

impl HttpClientConfig {
  /// Redirects are never followed by the client itself; the forwarder decides.
  pub fn to_client(self) -> Result<Client, reqwest::Error> {
    let HttpClientConfig {
      http_proxy,
      user,
      pass,
      enable_cookies,
      timeout,
    } = self;
    let mut client_builder = reqwest::ClientBuilder::new();

    if let Some(proxy_url) = http_proxy {
      let mut proxy = reqwest::Proxy::all(proxy_url)?;

      if let (Some(user_name), Some(password)) = (user, pass) {
        proxy = proxy.basic_auth(&user_name, &password);
      }

      client_builder = client_builder.proxy(proxy);
    }

    if enable_cookies {
      client_builder = client_builder.cookie_store(true);
    }

    let client = client_builder
      .redirect(Policy::none())
      .timeout(timeout)
      .build()?;

    Ok(client)
  }
}
