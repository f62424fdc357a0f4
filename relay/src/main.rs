//! Relay entry-point: receives document events over HTTP and relays them as
//! push notifications.

use std::env;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::fmt;

use notification_relay::config::RelaySettings;
use notification_relay::inbound::http::Trace;
use notification_relay::inbound::http::events::receive_event;
use notification_relay::inbound::http::health::{HealthState, live, ready};
use notification_relay::inbound::http::state::HttpState;
use notification_relay::logging::env_filter;
use notification_relay::wiring::build_trigger;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(receive_event)
        .service(ready)
        .service(live)
}

fn init_tracing(json_logs: bool) {
    let builder = fmt().with_env_filter(env_filter());
    let result = if json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = RelaySettings::load(env::args_os())?;
    init_tracing(settings.json_logs);

    let project_id = settings.project_id()?;
    let bind_addr = settings.bind_addr()?;
    let trigger = build_trigger(&settings).wrap_err("failed to assemble the relay")?;
    info!(
        project_id,
        database_id = settings.database_id(),
        pattern = trigger.pattern().as_str(),
        "relay configured"
    );

    let health_state = web::Data::new(HealthState::new());
    let http_state = web::Data::new(HttpState::new(trigger));
    // Clone for server factory so readiness probe remains accessible.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(bind_addr)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?
        .run();

    health_state.mark_ready();
    info!(%bind_addr, "notification relay listening");
    server.await?;
    Ok(())
}
