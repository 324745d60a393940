use std::sync::Arc;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::Error;
use futures_core::future::LocalBoxFuture;
use reqwest::Client;
use crate::client_ip::ClientIpChain;
use crate::identity::ProxyIdentity;
use crate::proxy_service::proxy_config::ProxyConfig;
use crate::proxy_service::proxy_route_service::ProxyRouteService;

pub struct ProxyRouteServiceFactory {
  pub config: Arc<ProxyConfig>,
  pub identity: Arc<ProxyIdentity>,
  pub ip_source: Arc<ClientIpChain>,
  pub http_client: Client,
}

impl ServiceFactory<ServiceRequest> for ProxyRouteServiceFactory {
  type Response = ServiceResponse;
  type Error = Error;
  type Config = ();
  type Service = ProxyRouteService;
  type InitError = ();
  type Future = LocalBoxFuture<'static, Result<Self::Service, Self::InitError>>;

  fn new_service(&self, _: Self::Config) -> Self::Future {
    let service = ProxyRouteService {
      config: self.config.clone(),
      identity: self.identity.clone(),
      ip_source: self.ip_source.clone(),
      http_client: self.http_client.clone(),
    };

    Box::pin(async move { Ok(service) })
  }
}

impl ProxyRouteServiceFactory {
  pub fn create(
    http_client: Client,
    proxy_config: Arc<ProxyConfig>,
    identity: Arc<ProxyIdentity>,
    ip_source: Arc<ClientIpChain>,
  ) -> Self {
    Self {
      config: proxy_config,
      identity,
      ip_source,
      http_client,
    }
  }
}
