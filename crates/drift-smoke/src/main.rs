//! # drift-smoke
//!
//! End-to-end wiring of the Drift pipeline against in-process fakes.
//!
//! The run drives one full session cycle: identity resolution, a text send
//! echoed back through the live subscription, a connectivity drop with a
//! blocked send, recovery, and an image + location attachment resolved
//! through the media pipeline.

mod fakes;

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use drift_core::{Author, MessageDraft, MessagePayload};
use drift_media::AttachmentPipeline;
use drift_store::KvStore;
use drift_sync::{spawn_session, SessionCommand, SessionConfig, SessionNotification};

use crate::fakes::{
    scripted_identity, scripted_monitor, EchoRemote, FixedLocation, MemoryBlobs, StaticLoader,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,drift_sync=debug,drift_media=debug")),
        )
        .init();

    info!("Starting Drift smoke run v{}", env!("CARGO_PKG_VERSION"));

    let remote = EchoRemote::new();
    let cache = KvStore::open_in_memory()?;
    let (identity, identity_tx) = scripted_identity();
    let (monitor, connectivity_tx) = scripted_monitor(true);

    let (cmd_tx, mut notif_rx) = spawn_session(
        remote.clone(),
        cache,
        &identity,
        &monitor,
        SessionConfig::from_env(),
    );

    // Print every notification the way a chat view would consume them.
    let printer = tokio::spawn(async move {
        while let Some(notification) = notif_rx.recv().await {
            match notification {
                SessionNotification::ListChanged { messages } => {
                    let newest = messages.first().map(describe).unwrap_or_default();
                    info!(count = messages.len(), newest = %newest, "list changed");
                }
                SessionNotification::ConnectivityChanged { online } => {
                    info!(online, "connectivity changed");
                }
                SessionNotification::Notice { title, body } => {
                    warn!(%title, %body, "user notice");
                }
            }
        }
    });

    let author = Author::new("smoke-user", "Smokey");
    identity_tx.send(Some(author.clone())).await?;
    sleep(Duration::from_millis(50)).await;

    cmd_tx
        .send(SessionCommand::Send(MessageDraft::text("hello from drift")))
        .await?;
    sleep(Duration::from_millis(50)).await;

    // Drop connectivity: the next send must be silently blocked.
    connectivity_tx.send(false).await?;
    sleep(Duration::from_millis(50)).await;
    cmd_tx
        .send(SessionCommand::Send(MessageDraft::text(
            "this one is blocked",
        )))
        .await?;
    sleep(Duration::from_millis(50)).await;

    connectivity_tx.send(true).await?;
    sleep(Duration::from_millis(50)).await;

    // Attachments go through the media pipeline before they reach the gate.
    let pipeline = AttachmentPipeline::new(MemoryBlobs::default(), StaticLoader::new(b"\xFF\xD8\xFFjpeg"));

    let image_draft = pipeline
        .resolve_image(Some(&author), "file:///tmp/photo.jpg")
        .await?;
    if let MessagePayload::Image(url) = &image_draft.payload {
        info!(%url, "image attachment resolved");
    }
    cmd_tx.send(SessionCommand::Send(image_draft)).await?;

    let location_draft = pipeline.resolve_location(&FixedLocation).await?;
    cmd_tx.send(SessionCommand::Send(location_draft)).await?;
    sleep(Duration::from_millis(100)).await;

    cmd_tx.send(SessionCommand::Shutdown).await?;
    printer.await?;

    info!("Smoke run complete");
    Ok(())
}

fn describe(message: &drift_core::Message) -> String {
    match &message.payload {
        MessagePayload::Text(text) => format!("text: {text}"),
        MessagePayload::Image(url) => format!("image: {url}"),
        MessagePayload::Audio(url) => format!("audio: {url}"),
        MessagePayload::Location(position) => {
            format!("location: {:.3},{:.3}", position.lat, position.lon)
        }
    }
}
