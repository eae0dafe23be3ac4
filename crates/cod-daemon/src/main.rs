//! cod: an on-demand container-activation HTTP gateway.
//!
//! Loads workload declarations from `COD_CONFIG_DIR`, sweeps any
//! containers left over from a previous crash, then serves HTTP on
//! `COD_HOST`/`COD_PORT`: ambient health endpoints plus a catch-all proxy
//! that lazily activates, health-checks, and forwards to backends.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use cod_core::config::{config_dir_from_env, load_workloads};
use cod_core::engine::Engine;
use cod_core::logs::configure_logger;
use cod_core::middleware::security_headers;
use cod_core::routes::{configure_health, configure_proxy};
use cod_core::runtime::DockerRuntime;
use cod_core::services::ProxyService;
use log::{error, info, warn};
use tokio::signal;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    configure_logger();

    let config_dir = config_dir_from_env();
    info!("loading workloads from {}", config_dir.display());
    let workloads = load_workloads(&config_dir).unwrap_or_else(|e| {
        error!("failed to load workloads from {}: {e}", config_dir.display());
        std::process::exit(1);
    });
    info!("loaded {} workload(s)", workloads.len());

    let docker = DockerRuntime::connect().unwrap_or_else(|e| {
        error!("failed to connect to Docker daemon: {e}");
        std::process::exit(1);
    });
    if let Err(e) = docker.ping().await {
        error!("Docker daemon did not respond to ping: {e}");
        std::process::exit(1);
    }

    let http_client = reqwest::Client::new();
    let engine = web::Data::new(Engine::new(Arc::new(docker), http_client));

    engine.cleanup().await;

    for workload in workloads {
        let name = workload.name.clone();
        if let Err(e) = engine.add_workload(workload).await {
            error!("failed to register workload {name}: {e}");
            std::process::exit(1);
        }
    }

    let proxy = web::Data::new(ProxyService::new(engine.clone()));

    let host = std::env::var("COD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("COD_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .unwrap_or(8080);

    info!("starting server on {host}:{port}");

    let engine_for_server = engine.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(engine_for_server.clone())
            .app_data(proxy.clone())
            .wrap(security_headers())
            .wrap(actix_web::middleware::Logger::default())
            .configure(configure_health)
            .configure(configure_proxy)
    })
    .bind((host.as_str(), port))?
    .run();

    let server_handle = server.handle();

    tokio::select! {
        result = server => {
            match result {
                Ok(_) => info!("server stopped"),
                Err(e) => error!("server error: {e}"),
            }
        }
        _ = signal::ctrl_c() => {
            info!("received shutdown signal, stopping server");
            server_handle.stop(true).await;
        }
    }

    engine.shutdown().await;
    warn!("shutdown complete");
    Ok(())
}
