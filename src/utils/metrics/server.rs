//! HTTP endpoint for Prometheus scrapes.

use actix_web::{
	dev::Server,
	middleware::{Compress, NormalizePath},
	web, App, HttpResponse, HttpServer,
};

use crate::utils::metrics::{gather_metrics, update_system_metrics};

const TEXT_EXPOSITION: &str = "text/plain; version=0.0.4; charset=utf-8";
const CONTAINER_PORT: &str = "8081";

async fn scrape() -> HttpResponse {
	update_system_metrics();

	gather_metrics().map_or_else(
		|e| {
			tracing::error!("Could not encode metrics: {}", e);
			HttpResponse::InternalServerError().finish()
		},
		|body| {
			HttpResponse::Ok().content_type(TEXT_EXPOSITION).body(body)
		},
	)
}

/// Address to bind: in a container only the port of `requested` is kept
fn listen_address(requested: &str, in_docker: bool) -> String {
	if !in_docker {
		return requested.to_string();
	}

	let port = requested
		.rsplit_once(':')
		.map(|(_, port)| port)
		.filter(|port| !port.is_empty())
		.unwrap_or(CONTAINER_PORT);
	format!("0.0.0.0:{}", port)
}

/// Binds the `/metrics` endpoint; the returned server runs once awaited
pub fn create_metrics_server(bind_address: String) -> std::io::Result<Server> {
	let in_docker = std::env::var("IN_DOCKER").is_ok_and(|value| value == "true");
	let address = listen_address(&bind_address, in_docker);
	tracing::info!("Serving metrics on {} (requested {})", address, bind_address);

	let server = HttpServer::new(|| {
		App::new()
			.wrap(Compress::default())
			.wrap(NormalizePath::trim())
			.route("/metrics", web::get().to(scrape))
	})
	.workers(2)
	.shutdown_timeout(5)
	.bind(address)?;

	Ok(server.run())
}
