use std::sync::Arc;
use actix_web::{dev, Error, HttpRequest, HttpResponse, ResponseError};
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse};
use bytes::{Bytes, BytesMut};
use futures_core::future::LocalBoxFuture;
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use reqwest::Client;
use crate::client_ip::ClientIpChain;
use crate::error::ProxyError;
use crate::forwarder::forward;
use crate::identity::ProxyIdentity;
use crate::proxy_service::proxy_config::ProxyConfig;
use crate::request_builder::{build_request, InboundRequest};
use crate::response_translator::translate_response;

#[derive(Clone)]
pub struct ProxyRouteService {
  pub(super) config: Arc<ProxyConfig>,
  pub(super) identity: Arc<ProxyIdentity>,
  pub(super) ip_source: Arc<ClientIpChain>,
  pub(super) http_client: Client,
}

impl Service<ServiceRequest> for ProxyRouteService {
  type Response = ServiceResponse;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  dev::always_ready!();

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let (http_request, payload) = req.into_parts();

    match self.config.target_url(http_request.path()) {
      Some(target_url) => Box::pin(self.clone().exec(http_request, payload, target_url)),
      None => {
        warn!("Path '{}' does not continue route '{}'", http_request.path(), self.config.path);
        let response = HttpResponse::NotFound().finish();
        Box::pin(async move { Ok(ServiceResponse::new(http_request, response)) })
      }
    }
  }
}

impl ProxyRouteService {
  /// Dropping this future (caller went away) also drops the outbound call.
  async fn exec(self, http: HttpRequest, mut payload: Payload, target_url: String) -> Result<ServiceResponse, Error> {
    let body = match ProxyRouteService::read_body(&mut payload).await {
      Ok(body) => body,
      Err(err) => {
        warn!("{}", err);
        return Ok(ServiceResponse::new(http, err.error_response()));
      }
    };

    let inbound = InboundRequest::from_http(&http, body, &self.ip_source);
    let outbound = build_request(
      inbound,
      &target_url,
      &self.config.overrides,
      &self.config.directives,
      &self.identity,
    );

    debug!("Proxy request {:?}", &outbound);

    match forward(&self.http_client, &self.identity, &outbound).await {
      Ok(origin) => {
        info!("{} {} -> {} {}", outbound.method, http.path(), origin.url, origin.status.as_u16());
        let response = translate_response(origin, &outbound, &self.identity);
        Ok(ServiceResponse::new(http, response))
      }
      Err(err) => {
        error!("Proxy request to '{}' failed {}", outbound.url, err);
        Ok(ServiceResponse::new(http, err.error_response()))
      }
    }
  }

  async fn read_body(payload: &mut Payload) -> Result<Bytes, ProxyError> {
    let mut body_buffer = BytesMut::new();

    while let Some(chunk) = payload.next().await {
      let bytes = chunk.map_err(|err| ProxyError::Payload(err.to_string()))?;
      body_buffer.extend_from_slice(&bytes);
    }

    Ok(body_buffer.freeze())
  }
}

#[cfg(test)]
mod tests {
  use std::net::SocketAddr;

  use actix_web::http::StatusCode;
  use actix_web::{test, web, App, HttpResponse};

  use super::*;
  use crate::http_client::HttpClientConfig;
  use crate::proxy_service::proxy_factory::ProxyRouteServiceFactory;
  use crate::route_config::RouteConfig;
  use crate::test_support::spawn_origin;

  fn factory(route: RouteConfig) -> (String, ProxyRouteServiceFactory) {
    config_factory(Arc::new(route.into()))
  }

  fn config_factory(config: Arc<ProxyConfig>) -> (String, ProxyRouteServiceFactory) {
    let pattern = config.pattern();
    let factory = ProxyRouteServiceFactory::create(
      HttpClientConfig::default().to_client().unwrap(),
      config,
      Arc::new(ProxyIdentity {
        version: "1.0.0".into(),
        module: "relay-test".into(),
        ..ProxyIdentity::default()
      }),
      Arc::new(ClientIpChain::standard(true)),
    );

    (pattern, factory)
  }

  fn fixed_route(path: &str, url: String) -> RouteConfig {
    let mut route = RouteConfig::pass_through(&url);
    route.path = path.into();
    route.pass_path = false;
    route
  }

  fn header(response: &ServiceResponse, name: &str) -> Option<String> {
    response
      .headers()
      .get(name)
      .and_then(|value| value.to_str().ok())
      .map(String::from)
  }

  fn caller() -> SocketAddr {
    "192.0.2.10:40000".parse().unwrap()
  }

  fn redirecting_origin() -> String {
    spawn_origin(|cfg| {
      cfg
        .route(
          "/app",
          web::get().to(|| async { HttpResponse::Found().insert_header(("location", "/login")).finish() }),
        )
        .route("/login", web::get().to(|| async { HttpResponse::Ok().body("login page") }));
    })
  }

  #[actix_web::test]
  async fn forwards_json_response_with_identification() {
    let base = spawn_origin(|cfg| {
      cfg.route(
        "/api",
        web::get().to(|req: HttpRequest| async move {
          if req.query_string() != "x=1" {
            return HttpResponse::BadRequest().finish();
          }
          HttpResponse::Ok()
            .insert_header(("content-type", "application/json"))
            .body(r#"{"ok":true}"#)
        }),
      );
    });
    let mut route = fixed_route("/api", format!("{}/api", base));
    route.allow_response_content_headers = Some(false);
    let (pattern, factory) = factory(route);
    let app = test::init_service(App::new().service(web::service(pattern).finish(factory))).await;

    let request = test::TestRequest::get().uri("/api?x=1").peer_addr(caller()).to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type").as_deref(), Some("application/json"));
    assert!(header(&response, "content-length").is_none());
    assert!(header(&response, "via").unwrap().starts_with("1.0.0 relay-test "));
    let forwarded = header(&response, "forwarded").unwrap();
    assert!(forwarded.starts_with("by=1.0.0,relay-test;for=192.0.2.10;host="));
    assert!(forwarded.ends_with(";proto=http"));
    assert_eq!(test::read_body(response).await, Bytes::from_static(br#"{"ok":true}"#));
  }

  #[actix_web::test]
  async fn follows_redirect_to_login() {
    let base = redirecting_origin();
    let (pattern, factory) = factory(fixed_route("/app", format!("{}/app", base)));
    let app = test::init_service(App::new().service(web::service(pattern).finish(factory))).await;

    let response = test::call_service(&app, test::TestRequest::get().uri("/app").to_request()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "via").is_some());
    assert_eq!(test::read_body(response).await, Bytes::from_static(b"login page"));
  }

  #[actix_web::test]
  async fn no_redirect_returns_rewritten_location() {
    let base = redirecting_origin();
    let mut route = fixed_route("/app", format!("{}/app", base));
    route.no_redirect = Some(true);
    let (pattern, factory) = factory(route);
    let app = test::init_service(App::new().service(web::service(pattern).finish(factory))).await;

    let response = test::call_service(&app, test::TestRequest::get().uri("/app").to_request()).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header(&response, "location"), Some(format!("{}/login", base)));
    assert!(header(&response, "forwarded").is_some());
  }

  #[actix_web::test]
  async fn pass_path_appends_tail_and_sets_caller_headers() {
    let base = spawn_origin(|cfg| {
      cfg.route(
        "/echo/{rest:.*}",
        web::route().to(|req: HttpRequest, body: web::Bytes| async move {
          let get = |name: &str| {
            req
              .headers()
              .get(name)
              .and_then(|v| v.to_str().ok())
              .unwrap_or("-")
              .to_owned()
          };
          HttpResponse::Ok().body(format!(
            "{} {}?{} real={} fwd-host={} enc={} body={}",
            req.method(),
            req.path(),
            req.query_string(),
            get("x-real-ip"),
            get("x-forwarded-host"),
            get("accept-encoding"),
            String::from_utf8_lossy(&body)
          ))
        }),
      );
    });
    let mut route = RouteConfig::pass_through(&base);
    route.path = "/proxy".into();
    route.allow_request_content_headers = Some(false);
    let (pattern, factory) = factory(route);
    let app = test::init_service(App::new().service(web::service(pattern).finish(factory))).await;

    let request = test::TestRequest::post()
      .uri("/proxy/echo/a/b?y=1")
      .peer_addr(caller())
      .insert_header(("host", "caller.example"))
      .insert_header(("accept-encoding", "gzip"))
      .set_payload("hello")
      .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
      test::read_body(response).await,
      Bytes::from_static(b"POST /echo/a/b?y=1 real=192.0.2.10 fwd-host=- enc=- body=hello")
    );
  }

  #[actix_web::test]
  async fn host_directive_reaches_origin() {
    let base = spawn_origin(|cfg| {
      cfg.route(
        "/",
        web::get().to(|req: HttpRequest| async move {
          let host = req.headers().get("x-forwarded-host").and_then(|v| v.to_str().ok()).unwrap_or("-").to_owned();
          HttpResponse::Ok().body(host)
        }),
      );
    });
    let mut route = fixed_route("/", format!("{}/", base));
    route.host = Some("backend.internal".into());
    let (pattern, factory) = factory(route);
    let app = test::init_service(App::new().service(web::service(pattern).finish(factory))).await;

    let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(test::read_body(response).await, Bytes::from_static(b"backend.internal"));
  }

  #[actix_web::test]
  async fn unreachable_origin_is_bad_gateway() {
    let (pattern, factory) = factory(fixed_route("/down", "http://127.0.0.1:1/".to_string()));
    let app = test::init_service(App::new().service(web::service(pattern).finish(factory))).await;

    let response = test::call_service(&app, test::TestRequest::get().uri("/down").to_request()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(header(&response, "via").is_none());
  }

  fn prefix_route(path: &str, url: &str) -> RouteConfig {
    let mut route = RouteConfig::pass_through(url);
    route.path = path.into();
    route
  }

  #[actix_web::test]
  async fn paths_sharing_only_characters_with_prefix_are_not_forwarded() {
    let base = spawn_origin(|cfg| {
      cfg.default_service(web::to(|| async { HttpResponse::Ok().body("origin") }));
    });
    let (pattern, factory) = factory(prefix_route("/proxy", &base));
    let app = test::init_service(App::new().service(web::service(pattern).finish(factory))).await;

    for path in ["/proxyfoo", "/proxy@evil.example/steal"] {
      let response = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
      assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
    }

    let response = test::call_service(&app, test::TestRequest::get().uri("/proxy/ok").to_request()).await;
    assert_eq!(test::read_body(response).await, Bytes::from_static(b"origin"));
  }

  #[actix_web::test]
  async fn catch_all_does_not_shadow_prefix_route() {
    let proxied = spawn_origin(|cfg| {
      cfg.default_service(web::to(|req: HttpRequest| async move {
        HttpResponse::Ok().body(format!("proxied {}", req.path()))
      }));
    });
    let fallback = spawn_origin(|cfg| {
      cfg.default_service(web::to(|req: HttpRequest| async move {
        HttpResponse::Ok().body(format!("fallback {}", req.path()))
      }));
    });
    let configs = crate::proxy_service::ordered_configs(vec![
      prefix_route("/", &fallback),
      prefix_route("/proxy", &proxied),
    ]);
    let mut app = App::new();
    for config in configs {
      let (pattern, factory) = config_factory(config);
      app = app.service(web::service(pattern).finish(factory));
    }
    let app = test::init_service(app).await;

    for (path, expected) in [
      ("/proxy/a", "proxied /a"),
      ("/proxy", "proxied /"),
      ("/other", "fallback /other"),
      ("/proxyfoo", "fallback /proxyfoo"),
    ] {
      let response = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
      assert_eq!(response.status(), StatusCode::OK, "{}", path);
      assert_eq!(test::read_body(response).await, Bytes::from(expected), "{}", path);
    }
  }
}
