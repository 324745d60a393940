use actix_web::{web, App, HttpServer};

/// Starts a throwaway origin on an ephemeral port and returns its base URL.
pub fn spawn_origin<F>(configure: F) -> String
where
  F: Fn(&mut web::ServiceConfig) + Clone + Send + 'static,
{
  let server = HttpServer::new(move || App::new().configure(configure.clone()))
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind origin");
  let addr = server.addrs()[0];

  actix_web::rt::spawn(server.run());

  format!("http://{}", addr)
}
