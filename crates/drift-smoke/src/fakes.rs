//! In-process fake collaborators for the smoke run.
//!
//! `EchoRemote` behaves like a hosted document store: every insert lands in
//! the collection and the full result set is re-delivered to the live
//! subscriber, newest first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use drift_core::normalize::{RemoteAuthor, RemoteRecord};
use drift_core::{Author, Coordinates, MessagePayload, OutboundRecord};
use drift_media::{BlobStore, LocationProvider, MediaError, ResourceLoader};
use drift_sync::{IdentityProvider, NetworkMonitor, RemoteStore, SessionError, Subscription};

// ---------------------------------------------------------------------------
// Remote store
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct EchoRemote {
    inner: Arc<EchoInner>,
}

struct EchoInner {
    records: Mutex<Vec<RemoteRecord>>,
    subscriber: Mutex<Option<mpsc::Sender<Vec<RemoteRecord>>>>,
    enabled: AtomicBool,
}

impl EchoRemote {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EchoInner {
                records: Mutex::new(Vec::new()),
                subscriber: Mutex::new(None),
                enabled: AtomicBool::new(true),
            }),
        }
    }

    fn snapshot(&self) -> Vec<RemoteRecord> {
        self.inner.records.lock().expect("records lock").clone()
    }

    fn broadcast(&self) {
        if !self.inner.enabled.load(Ordering::SeqCst) {
            return;
        }
        if let Some(tx) = self.inner.subscriber.lock().expect("subscriber lock").as_ref() {
            let _ = tx.try_send(self.snapshot());
        }
    }
}

impl RemoteStore for EchoRemote {
    fn subscribe(&self) -> Result<Subscription, SessionError> {
        let (tx, rx) = mpsc::channel(8);

        // A new subscription immediately receives the current result set.
        let _ = tx.try_send(self.snapshot());
        *self.inner.subscriber.lock().expect("subscriber lock") = Some(tx);

        let inner = self.inner.clone();
        Ok(Subscription::new(rx, move || {
            *inner.subscriber.lock().expect("subscriber lock") = None;
            debug!("echo remote unsubscribed");
        }))
    }

    fn insert(&self, record: OutboundRecord) -> Result<(), SessionError> {
        let mut remote = RemoteRecord {
            id: Uuid::new_v4().to_string(),
            created_at: Some(record.created_at),
            author: Some(RemoteAuthor {
                id: Some(record.author.id),
                display_name: Some(record.author.display_name),
            }),
            ..RemoteRecord::default()
        };
        match record.payload {
            MessagePayload::Text(text) => remote.text = Some(text),
            MessagePayload::Image(url) => remote.image = Some(url),
            MessagePayload::Audio(url) => remote.audio = Some(url),
            MessagePayload::Location(position) => remote.location = Some(position),
        }

        self.inner.records.lock().expect("records lock").insert(0, remote);
        self.broadcast();
        Ok(())
    }

    fn set_network_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
        debug!(enabled, "echo remote background work toggled");
    }
}

// ---------------------------------------------------------------------------
// Identity provider / network monitor
// ---------------------------------------------------------------------------

pub struct ScriptedIdentity {
    rx: Mutex<Option<mpsc::Receiver<Option<Author>>>>,
}

pub fn scripted_identity() -> (ScriptedIdentity, mpsc::Sender<Option<Author>>) {
    let (tx, rx) = mpsc::channel(8);
    (
        ScriptedIdentity {
            rx: Mutex::new(Some(rx)),
        },
        tx,
    )
}

impl IdentityProvider for ScriptedIdentity {
    fn identity_stream(&self) -> mpsc::Receiver<Option<Author>> {
        self.rx
            .lock()
            .expect("identity lock")
            .take()
            .expect("identity stream already taken")
    }
}

pub struct ScriptedMonitor {
    online: bool,
    rx: Mutex<Option<mpsc::Receiver<bool>>>,
}

pub fn scripted_monitor(online: bool) -> (ScriptedMonitor, mpsc::Sender<bool>) {
    let (tx, rx) = mpsc::channel(8);
    (
        ScriptedMonitor {
            online,
            rx: Mutex::new(Some(rx)),
        },
        tx,
    )
}

impl NetworkMonitor for ScriptedMonitor {
    fn is_online(&self) -> bool {
        self.online
    }

    fn connectivity_stream(&self) -> mpsc::Receiver<bool> {
        self.rx
            .lock()
            .expect("monitor lock")
            .take()
            .expect("connectivity stream already taken")
    }
}

// ---------------------------------------------------------------------------
// Media collaborators
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryBlobs {
    blobs: Arc<Mutex<Vec<(String, Bytes)>>>,
}

impl BlobStore for MemoryBlobs {
    async fn upload(&self, key: &str, data: Bytes) -> Result<(), MediaError> {
        self.blobs
            .lock()
            .expect("blobs lock")
            .push((key.to_owned(), data));
        Ok(())
    }

    async fn download_url_for(&self, key: &str) -> Result<String, MediaError> {
        Ok(format!("memory://blobs/{key}"))
    }
}

#[derive(Clone)]
pub struct StaticLoader {
    data: Bytes,
}

impl StaticLoader {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(data),
        }
    }
}

impl ResourceLoader for StaticLoader {
    async fn load(&self, _uri: &str) -> Result<Bytes, MediaError> {
        Ok(self.data.clone())
    }
}

pub struct FixedLocation;

impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, MediaError> {
        Ok(Coordinates {
            lat: 52.52,
            lon: 13.405,
        })
    }
}
