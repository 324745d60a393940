mod client_ip;
mod directives;
mod error;
mod forwarder;
mod header_mapping;
mod header_translator;
mod http_client;
mod identity;
mod location;
mod proxy_service;
mod query_params;
mod request_builder;
mod response_translator;
mod route_config;
mod std_logger;
#[cfg(test)]
mod test_support;

use std::fs;
use std::io::{Error, ErrorKind, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::{info, LevelFilter};
use client_ip::ClientIpChain;
use http_client::{HttpClientConfig, DEFAULT_TIMEOUT};
use proxy_service::proxy_factory::ProxyRouteServiceFactory;
use route_config::{ProxyConfigFile, RouteConfig};
use std_logger::StdLogger;

#[derive(Parser, Debug)]
#[command(version, about = "Single hop HTTP forwarding proxy")]
struct Args {
  #[arg(long, env = "HTTP_BIND", default_value = "0.0.0.0")]
  bind: String,
  #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
  port: u16,
  #[arg(long, env = "HTTP_WORKER_COUNT", default_value_t = 4)]
  workers: usize,
  /// YAML file with identity settings and routes.
  #[arg(long, env = "ROUTE_CONF_LOCATION")]
  config: Option<PathBuf>,
  /// Forward every request to this base URL, appending the inbound path.
  #[arg(long, env = "PROXY_TARGET")]
  target: Option<String>,
  /// Outbound request timeout, overrides the route file.
  #[arg(long, env = "PROXY_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,
  /// Take the caller address from X-Forwarded-For before the peer address.
  #[arg(long, env = "TRUST_FORWARDED_FOR")]
  trust_forwarded_for: Option<bool>,
  #[arg(long, env = "HTTP_PROXY_URL")]
  proxy_url: Option<String>,
  #[arg(long, env = "HTTP_PROXY_USER")]
  proxy_user: Option<String>,
  #[arg(long, env = "HTTP_PROXY_PASS")]
  proxy_pass: Option<String>,
  #[arg(long, env = "HTTP_PROXY_COOKIES")]
  proxy_cookies: bool,
  #[arg(long, env = "HTTP_CORS")]
  cors: bool,
  #[arg(long, env = "LOG_LEVEL", default_value = "info")]
  log_level: String,
}

#[actix_web::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let level = LevelFilter::from_str(&args.log_level).unwrap_or(LevelFilter::Info);
  StdLogger::init(level).map_err(|err| Error::new(ErrorKind::Other, err.to_string()))?;

  let config_file = match &args.config {
    Some(path) => ProxyConfigFile::load_from_file(&fs::File::open(path)?)?,
    None => ProxyConfigFile::default(),
  };
  let ProxyConfigFile {
    identity,
    timeout_secs,
    trust_forwarded_for,
    mut routes,
  } = config_file;

  if let Some(target) = &args.target {
    routes.push(RouteConfig::pass_through(target));
  }

  if routes.is_empty() {
    return Err(Error::new(ErrorKind::InvalidInput, "no routes configured, pass --target or a route file"));
  }

  let http_client = HttpClientConfig {
    http_proxy: args.proxy_url,
    user: args.proxy_user,
    pass: args.proxy_pass,
    enable_cookies: args.proxy_cookies,
    timeout: args.timeout_secs.or(timeout_secs).map_or(DEFAULT_TIMEOUT, Duration::from_secs),
  }
    .to_client()
    .map_err(|error| Error::new(ErrorKind::Other, error))?;

  let identity = Arc::new(identity);
  let ip_source = Arc::new(ClientIpChain::standard(
    args.trust_forwarded_for.or(trust_forwarded_for).unwrap_or(true),
  ));

  let proxy_configs = proxy_service::ordered_configs(routes);

  for config in proxy_configs.iter() {
    info!("New endpoint created at '{}' -> '{}'.", config.pattern(), config.url);
  }
  info!("Proxy identity '{} {}'.", identity.version, identity.module);

  let cors = args.cors;

  HttpServer::new(move || {
    let mut app = App::new().wrap(Condition::new(cors, Cors::permissive()));

    for config in proxy_configs.iter() {
      let factory = ProxyRouteServiceFactory::create(
        http_client.clone(),
        config.clone(),
        identity.clone(),
        ip_source.clone(),
      );
      app = app.service(web::service(config.pattern()).finish(factory));
    }

    app
  })
    .workers(args.workers)
    .bind((args.bind, args.port))?
    .run()
    .await
}
