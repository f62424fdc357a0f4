#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! Replay one notification document through the fully wired relay.
//!
//! Settings come from the same `RELAY_*` environment as the service.
//!
//! # Examples
//! ```sh
//! RELAY_PROJECT_ID=shop-prod RELAY_ACCESS_TOKEN="$(gcloud auth print-access-token)" \
//!   cargo run --bin relay-dispatch -- --event notification.json
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing_subscriber::fmt;

use notification_relay::config::RelaySettings;
use notification_relay::domain::ports::EventMetadata;
use notification_relay::domain::{NOTIFICATIONS_TRIGGER_PATTERN, RelayOutcome};
use notification_relay::logging::env_filter;
use notification_relay::wire::firestore::DocumentDto;
use notification_relay::wiring::build_trigger;

/// Replay a notification document through the relay once.
#[derive(Debug, Parser)]
#[command(name = "relay-dispatch", version, about)]
struct Cli {
    /// JSON file holding a Firestore document or a document event body.
    #[arg(long)]
    event: PathBuf,
    /// Notification id; defaults to the last segment of the document name.
    #[arg(long)]
    notification_id: Option<String>,
}

fn read_event(path: &Path) -> Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("event path {} does not name a file", path.display()))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("failed to open {}", parent.display()))?;
    dir.read(file_name)
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}

fn document_path(dto: &DocumentDto, notification_id: Option<&str>) -> Result<String> {
    match (notification_id, dto.document_path()) {
        (Some(id), _) => Ok(format!("notifications/{id}")),
        (None, Some(path)) => Ok(path.to_owned()),
        (None, None) => Err(eyre!(
            "document has no name; pass --notification-id to bind it to {NOTIFICATIONS_TRIGGER_PATTERN}"
        )),
    }
}

fn describe(outcome: &RelayOutcome) -> String {
    match outcome {
        RelayOutcome::DeliveryFailed { user_id, error } => {
            format!("{} for user {user_id}: {error}", outcome.label())
        }
        _ => format!("{} for user {}", outcome.label(), outcome.user_id()),
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    if let Err(e) = fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    let body = read_event(&cli.event)?;
    let dto = DocumentDto::from_document_or_event(&body)
        .wrap_err_with(|| format!("{} is not a Firestore document", cli.event.display()))?;
    let path = document_path(&dto, cli.notification_id.as_deref())?;
    let document = dto.to_document()?;
    let metadata = EventMetadata {
        event_id: None,
        create_time: dto.create_time()?,
    };

    let settings = RelaySettings::load([OsString::from("relay-dispatch")])?;
    let trigger = build_trigger(&settings).wrap_err("failed to assemble the relay")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let outcome = runtime
        .block_on(trigger.dispatch(&path, document, metadata))
        .ok_or_else(|| eyre!("{path} does not match {}", trigger.pattern().as_str()))??;
    println!("{}", describe(&outcome));
    Ok(())
}
