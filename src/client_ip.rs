use actix_web::HttpRequest;

/// Literal used in identification headers when no source knows the caller.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// A single way of finding out who sent the inbound request.
pub trait ClientIpSource: Send + Sync {
  fn client_ip(&self, request: &HttpRequest) -> Option<String>;
}

/// First hop listed in `X-Forwarded-For`, as set by a trusted front proxy.
pub struct ForwardedForHeader;

impl ClientIpSource for ForwardedForHeader {
  fn client_ip(&self, request: &HttpRequest) -> Option<String> {
    request
      .headers()
      .get("x-forwarded-for")
      .and_then(|value| value.to_str().ok())
      .and_then(|value| value.split(',').next())
      .map(str::trim)
      .filter(|ip| !ip.is_empty())
      .map(String::from)
  }
}

/// Address of the TCP peer.
pub struct PeerAddress;

impl ClientIpSource for PeerAddress {
  fn client_ip(&self, request: &HttpRequest) -> Option<String> {
    request.peer_addr().map(|addr| addr.ip().to_string())
  }
}

/// Sources queried in priority order; the first answer wins.
pub struct ClientIpChain {
  sources: Vec<Box<dyn ClientIpSource>>,
}

impl ClientIpChain {
  pub fn new(sources: Vec<Box<dyn ClientIpSource>>) -> ClientIpChain {
    ClientIpChain { sources }
  }

  pub fn standard(trust_forwarded_for: bool) -> ClientIpChain {
    let mut sources: Vec<Box<dyn ClientIpSource>> = Vec::with_capacity(2);
    if trust_forwarded_for {
      sources.push(Box::new(ForwardedForHeader));
    }
    sources.push(Box::new(PeerAddress));

    ClientIpChain::new(sources)
  }

  pub fn resolve(&self, request: &HttpRequest) -> String {
    self
      .sources
      .iter()
      .find_map(|source| source.client_ip(request))
      .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
  }
}
