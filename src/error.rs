use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
  /// The outbound call failed: DNS, connect, TLS or timeout. Never retried here.
  #[error("upstream request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("unable to read request body: {0}")]
  Payload(String),
}

impl ProxyError {
  pub fn is_timeout(&self) -> bool {
    matches!(self, ProxyError::Transport(err) if err.is_timeout())
  }
}

impl ResponseError for ProxyError {
  fn status_code(&self) -> StatusCode {
    match self {
      ProxyError::Transport(_) if self.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
      ProxyError::Transport(_) => StatusCode::BAD_GATEWAY,
      ProxyError::Payload(_) => StatusCode::BAD_REQUEST,
    }
  }
}
