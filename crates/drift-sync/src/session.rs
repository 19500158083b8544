//! Session actor: single-writer ownership of the message list behind typed
//! command/notification channels.
//!
//! The engine loop runs in a dedicated tokio task. External code talks to it
//! through the command sender and listens on the notification receiver. The
//! task ends when `Shutdown` arrives or every command sender is dropped;
//! teardown drops the live subscription so no late callback can touch a
//! discarded session.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use drift_core::normalize::RemoteRecord;
use drift_core::{Message, MessageDraft};
use drift_store::{LocalCache, MessageCache};

use crate::config::SessionConfig;
use crate::engine::{SyncEngine, SyncState};
use crate::gate::{ConnectivityGate, Transition};
use crate::send::{evaluate_send, SendDecision};
use crate::traits::{IdentityProvider, NetworkMonitor, RemoteStore, Subscription};

/// Commands sent *into* the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Validate and forward an outgoing draft.
    Send(MessageDraft),
    /// Tear the session down (unsubscribe, stop the task).
    Shutdown,
}

/// Notifications sent *from* the session task to the rendering layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionNotification {
    /// The in-memory list was replaced or appended to. Carries the full
    /// list, newest first.
    ListChanged { messages: Vec<Message> },
    /// The connectivity gate observed a transition.
    ConnectivityChanged { online: bool },
    /// A user-facing notice (a blocking alert in the mobile client).
    Notice { title: String, body: String },
}

/// Spawn the session engine in a background tokio task.
///
/// The remote store and local cache are owned by the task; the identity
/// provider and network monitor are only consulted for their event streams
/// and the initial connectivity value.
///
/// Returns `(command_tx, notification_rx)`.
pub fn spawn_session<R, C, I, N>(
    remote: R,
    cache: C,
    identity: &I,
    monitor: &N,
    config: SessionConfig,
) -> (
    mpsc::Sender<SessionCommand>,
    mpsc::Receiver<SessionNotification>,
)
where
    R: RemoteStore,
    C: LocalCache + 'static,
    I: IdentityProvider + ?Sized,
    N: NetworkMonitor + ?Sized,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    let (notif_tx, notif_rx) = mpsc::channel(config.notification_buffer);

    let ident_rx = identity.identity_stream();
    let conn_rx = monitor.connectivity_stream();
    let initial_online = monitor.is_online();

    let cache = MessageCache::with_key(cache, config.cache_key.clone());
    let task = SessionTask {
        remote,
        cache,
        gate: ConnectivityGate::new(initial_online),
        engine: SyncEngine::new(),
        notif_tx,
        config,
    };

    tokio::spawn(task.run(cmd_rx, ident_rx, conn_rx));

    (cmd_tx, notif_rx)
}

struct SessionTask<R, C> {
    remote: R,
    cache: MessageCache<C>,
    gate: ConnectivityGate,
    engine: SyncEngine,
    notif_tx: mpsc::Sender<SessionNotification>,
    config: SessionConfig,
}

impl<R, C> SessionTask<R, C>
where
    R: RemoteStore,
    C: LocalCache + 'static,
{
    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<SessionCommand>,
        mut ident_rx: mpsc::Receiver<Option<drift_core::Author>>,
        mut conn_rx: mpsc::Receiver<bool>,
    ) {
        info!(online = self.gate.is_online(), "Session started");

        let mut subscription: Option<Subscription> = None;
        self.reconcile(&mut subscription).await;

        loop {
            tokio::select! {
                maybe_cmd = cmd_rx.recv() => match maybe_cmd {
                    Some(SessionCommand::Send(draft)) => self.handle_send(draft).await,
                    Some(SessionCommand::Shutdown) | None => break,
                },
                Some(online) = conn_rx.recv() => {
                    if self.handle_connectivity(online).await {
                        self.reconcile(&mut subscription).await;
                    }
                },
                Some(identity) = ident_rx.recv() => {
                    if self.engine.set_identity(identity) {
                        self.reconcile(&mut subscription).await;
                    }
                },
                batch = next_batch(&mut subscription) => match batch {
                    Some(records) => self.handle_batch(records).await,
                    None => {
                        warn!("Remote subscription stream ended");
                        subscription = None;
                    }
                },
            }
        }

        // The subscription must not outlive the session.
        drop(subscription);
        info!("Session stopped");
    }

    /// Tear down any live subscription, then re-enter the state implied by
    /// the current connectivity and identity. Teardown strictly precedes any
    /// new subscribe, so two subscriptions never race.
    async fn reconcile(&mut self, subscription: &mut Option<Subscription>) {
        *subscription = None;

        let mut changed = false;
        match self.engine.state(self.gate.is_online()) {
            SyncState::Subscribed => match self.remote.subscribe() {
                Ok(live) => {
                    info!("Remote subscription opened");
                    *subscription = Some(live);
                }
                Err(e) => warn!(error = %e, "Failed to open remote subscription"),
            },
            SyncState::CachedOnly => match self.cache.load() {
                Ok(Some(snapshot)) => {
                    info!(count = snapshot.len(), "Serving cached snapshot");
                    self.engine.apply_cached(snapshot);
                    changed = true;
                }
                Ok(None) => debug!("No cached snapshot"),
                Err(e) => warn!(error = %e, "Failed to read cached snapshot"),
            },
        }

        if self.config.welcome_notice
            && self
                .engine
                .bootstrap_welcome(&self.config.welcome_text, Utc::now())
        {
            changed = true;
        }

        if changed {
            self.notify_list().await;
        }
    }

    /// Returns true when the gate observed an actual transition.
    async fn handle_connectivity(&mut self, online: bool) -> bool {
        let Some(transition) = self.gate.observe(online) else {
            return false;
        };

        match transition {
            Transition::Offline => {
                info!("Connectivity lost");
                self.remote.set_network_enabled(false);
                self.notify(SessionNotification::Notice {
                    title: "Connection lost!".to_string(),
                    body: "Sending is unavailable until you are back online.".to_string(),
                })
                .await;
            }
            Transition::Online => {
                info!("Connectivity restored");
                self.remote.set_network_enabled(true);
            }
        }

        self.notify(SessionNotification::ConnectivityChanged { online })
            .await;
        true
    }

    async fn handle_batch(&mut self, records: Vec<RemoteRecord>) {
        debug!(count = records.len(), "Applying subscription batch");
        self.engine.apply_batch(records, Utc::now());
        self.mirror_cache();
        self.notify_list().await;
    }

    async fn handle_send(&mut self, draft: MessageDraft) {
        match evaluate_send(
            self.gate.is_online(),
            self.engine.identity(),
            draft,
            Utc::now(),
        ) {
            SendDecision::RejectedOffline => warn!("Dropping send while offline"),
            SendDecision::RejectedNoIdentity => {
                warn!("Dropping send before identity resolved")
            }
            SendDecision::Accept { record, local } => {
                // Fire-and-forget: the echo arrives through the subscription.
                if let Err(e) = self.remote.insert(record) {
                    warn!(error = %e, "Remote insert failed");
                }
                info!(msg_id = %local.id, "Message sent");
                self.engine.prepend(local);
                self.mirror_cache();
                self.notify_list().await;
            }
        }
    }

    /// Fire-and-forget write-through of the current list.
    fn mirror_cache(&self) {
        if let Err(e) = self.cache.save(self.engine.messages()) {
            warn!(error = %e, "Failed to persist message snapshot");
        }
    }

    async fn notify_list(&mut self) {
        let messages = self.engine.messages().to_vec();
        self.notify(SessionNotification::ListChanged { messages })
            .await;
    }

    async fn notify(&mut self, notification: SessionNotification) {
        if self.notif_tx.send(notification).await.is_err() {
            debug!("Notification receiver dropped");
        }
    }
}

async fn next_batch(subscription: &mut Option<Subscription>) -> Option<Vec<RemoteRecord>> {
    match subscription {
        Some(live) => live.next_batch().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::time::{sleep, timeout};

    use drift_core::normalize::RemoteAuthor;
    use drift_core::{Author, MessagePayload};
    use drift_store::KvStore;

    use crate::error::SessionError;

    // -- fakes ------------------------------------------------------------

    #[derive(Clone, Default)]
    struct FakeRemote {
        inner: Arc<RemoteInner>,
    }

    #[derive(Default)]
    struct RemoteInner {
        inserts: Mutex<Vec<drift_core::OutboundRecord>>,
        batch_tx: Mutex<Option<mpsc::Sender<Vec<RemoteRecord>>>>,
        network: Mutex<Vec<bool>>,
        events: Mutex<Vec<&'static str>>,
    }

    impl RemoteStore for FakeRemote {
        fn subscribe(&self) -> Result<Subscription, SessionError> {
            let (tx, rx) = mpsc::channel(8);
            *self.inner.batch_tx.lock().unwrap() = Some(tx);
            self.inner.events.lock().unwrap().push("subscribe");

            let inner = self.inner.clone();
            Ok(Subscription::new(rx, move || {
                inner.events.lock().unwrap().push("unsubscribe");
            }))
        }

        fn insert(&self, record: drift_core::OutboundRecord) -> Result<(), SessionError> {
            self.inner.inserts.lock().unwrap().push(record);
            Ok(())
        }

        fn set_network_enabled(&self, enabled: bool) {
            self.inner.network.lock().unwrap().push(enabled);
        }
    }

    impl FakeRemote {
        async fn push_batch(&self, batch: Vec<RemoteRecord>) {
            let tx = self
                .inner
                .batch_tx
                .lock()
                .unwrap()
                .clone()
                .expect("no live subscription");
            tx.send(batch).await.unwrap();
        }

        async fn wait_subscribed(&self, times: usize) {
            for _ in 0..200 {
                let subscribes = self
                    .inner
                    .events
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|e| **e == "subscribe")
                    .count();
                if subscribes >= times {
                    return;
                }
                sleep(Duration::from_millis(5)).await;
            }
            panic!("subscription #{times} never opened");
        }

        fn inserts(&self) -> Vec<drift_core::OutboundRecord> {
            self.inner.inserts.lock().unwrap().clone()
        }

        fn events(&self) -> Vec<&'static str> {
            self.inner.events.lock().unwrap().clone()
        }

        fn network_calls(&self) -> Vec<bool> {
            self.inner.network.lock().unwrap().clone()
        }
    }

    struct ChannelIdentity {
        rx: Mutex<Option<mpsc::Receiver<Option<Author>>>>,
    }

    fn identity_channel() -> (ChannelIdentity, mpsc::Sender<Option<Author>>) {
        let (tx, rx) = mpsc::channel(8);
        (
            ChannelIdentity {
                rx: Mutex::new(Some(rx)),
            },
            tx,
        )
    }

    impl IdentityProvider for ChannelIdentity {
        fn identity_stream(&self) -> mpsc::Receiver<Option<Author>> {
            self.rx.lock().unwrap().take().expect("stream already taken")
        }
    }

    struct ChannelMonitor {
        online: bool,
        rx: Mutex<Option<mpsc::Receiver<bool>>>,
    }

    fn monitor_channel(online: bool) -> (ChannelMonitor, mpsc::Sender<bool>) {
        let (tx, rx) = mpsc::channel(8);
        (
            ChannelMonitor {
                online,
                rx: Mutex::new(Some(rx)),
            },
            tx,
        )
    }

    impl NetworkMonitor for ChannelMonitor {
        fn is_online(&self) -> bool {
            self.online
        }

        fn connectivity_stream(&self) -> mpsc::Receiver<bool> {
            self.rx.lock().unwrap().take().expect("stream already taken")
        }
    }

    // -- helpers ----------------------------------------------------------

    fn ann() -> Author {
        Author::new("u1", "Ann")
    }

    fn record(id: &str, body: &str) -> RemoteRecord {
        RemoteRecord {
            id: id.into(),
            created_at: Some(chrono::Utc::now()),
            author: Some(RemoteAuthor {
                id: Some("u1".into()),
                display_name: Some("Ann".into()),
            }),
            text: Some(body.into()),
            ..RemoteRecord::default()
        }
    }

    fn quiet_config() -> SessionConfig {
        SessionConfig {
            welcome_notice: false,
            ..SessionConfig::default()
        }
    }

    async fn recv(rx: &mut mpsc::Receiver<SessionNotification>) -> SessionNotification {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a notification")
            .expect("notification channel closed")
    }

    async fn next_list(rx: &mut mpsc::Receiver<SessionNotification>) -> Vec<Message> {
        loop {
            if let SessionNotification::ListChanged { messages } = recv(rx).await {
                return messages;
            }
        }
    }

    /// Read every remaining notification until the session task ends.
    async fn drain(rx: &mut mpsc::Receiver<SessionNotification>) -> Vec<SessionNotification> {
        let mut seen = Vec::new();
        loop {
            match timeout(Duration::from_secs(5), rx.recv()).await {
                Ok(Some(notification)) => seen.push(notification),
                Ok(None) => return seen,
                Err(_) => panic!("session task did not stop"),
            }
        }
    }

    // -- scenarios --------------------------------------------------------

    #[tokio::test]
    async fn each_batch_replaces_the_list_exactly() {
        let remote = FakeRemote::default();
        let (identity, ident_tx) = identity_channel();
        let (monitor, _conn_tx) = monitor_channel(true);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (_cmd_tx, mut notif_rx) =
            spawn_session(remote.clone(), kv, &identity, &monitor, quiet_config());

        ident_tx.send(Some(ann())).await.unwrap();
        remote.wait_subscribed(1).await;

        remote
            .push_batch(vec![record("m2", "two"), record("m1", "one")])
            .await;
        let list = next_list(&mut notif_rx).await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "m2");

        remote.push_batch(vec![record("m3", "three")]).await;
        let list = next_list(&mut notif_rx).await;
        assert_eq!(list.len(), 1, "batch must replace, never union");
        assert_eq!(list[0].id, "m3");
    }

    #[tokio::test]
    async fn single_message_scenario_normalizes_verbatim() {
        let remote = FakeRemote::default();
        let (identity, ident_tx) = identity_channel();
        let (monitor, _conn_tx) = monitor_channel(true);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (_cmd_tx, mut notif_rx) =
            spawn_session(remote.clone(), kv, &identity, &monitor, quiet_config());

        ident_tx.send(Some(ann())).await.unwrap();
        remote.wait_subscribed(1).await;
        remote.push_batch(vec![record("m1", "hi")]).await;

        let list = next_list(&mut notif_rx).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "m1");
        assert_eq!(list[0].payload, MessagePayload::Text("hi".into()));
        assert_eq!(list[0].author, ann());
    }

    #[tokio::test]
    async fn returning_offline_rereads_the_cache() {
        let remote = FakeRemote::default();
        let (identity, ident_tx) = identity_channel();
        let (monitor, conn_tx) = monitor_channel(true);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (_cmd_tx, mut notif_rx) = spawn_session(
            remote.clone(),
            kv.clone(),
            &identity,
            &monitor,
            quiet_config(),
        );

        ident_tx.send(Some(ann())).await.unwrap();
        remote.wait_subscribed(1).await;
        remote.push_batch(vec![record("m1", "one")]).await;
        next_list(&mut notif_rx).await;

        // first offline entry serves the mirrored batch
        conn_tx.send(false).await.unwrap();
        let list = next_list(&mut notif_rx).await;
        assert_eq!(list[0].id, "m1");

        // the snapshot changes underneath the session
        let external = MessageCache::new(kv.clone());
        let replacement = vec![Message {
            id: "c1".into(),
            created_at: chrono::Utc::now(),
            author: ann(),
            payload: MessagePayload::Text("cached".into()),
            system: false,
        }];
        external.save(&replacement).unwrap();

        conn_tx.send(true).await.unwrap();
        remote.wait_subscribed(2).await;

        // no batch arrives; going offline again must re-read the cache,
        // not resurface the last-seen remote batch
        conn_tx.send(false).await.unwrap();
        let list = next_list(&mut notif_rx).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "c1");
    }

    #[tokio::test]
    async fn offline_send_is_a_complete_noop() {
        let remote = FakeRemote::default();
        let (identity, ident_tx) = identity_channel();
        let (monitor, _conn_tx) = monitor_channel(false);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (cmd_tx, mut notif_rx) =
            spawn_session(remote.clone(), kv, &identity, &monitor, quiet_config());

        ident_tx.send(Some(ann())).await.unwrap();
        cmd_tx
            .send(SessionCommand::Send(MessageDraft::text("hello")))
            .await
            .unwrap();
        drop(cmd_tx);

        let notifications = drain(&mut notif_rx).await;
        assert!(
            notifications
                .iter()
                .all(|n| !matches!(n, SessionNotification::ListChanged { .. })),
            "an offline send must not mutate the list"
        );
        assert!(remote.inserts().is_empty());
    }

    #[tokio::test]
    async fn send_before_identity_never_inserts() {
        let remote = FakeRemote::default();
        let (identity, _ident_tx) = identity_channel();
        let (monitor, _conn_tx) = monitor_channel(true);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (cmd_tx, mut notif_rx) =
            spawn_session(remote.clone(), kv, &identity, &monitor, quiet_config());

        cmd_tx
            .send(SessionCommand::Send(MessageDraft::text("too early")))
            .await
            .unwrap();
        drop(cmd_tx);

        drain(&mut notif_rx).await;
        assert!(remote.inserts().is_empty());
    }

    #[tokio::test]
    async fn accepted_send_inserts_and_prepends_optimistically() {
        let remote = FakeRemote::default();
        let (identity, ident_tx) = identity_channel();
        let (monitor, _conn_tx) = monitor_channel(true);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (cmd_tx, mut notif_rx) = spawn_session(
            remote.clone(),
            kv.clone(),
            &identity,
            &monitor,
            quiet_config(),
        );

        ident_tx.send(Some(ann())).await.unwrap();
        remote.wait_subscribed(1).await;

        cmd_tx
            .send(SessionCommand::Send(MessageDraft::text("hello")))
            .await
            .unwrap();

        let list = next_list(&mut notif_rx).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].payload, MessagePayload::Text("hello".into()));
        assert_eq!(list[0].author, ann());

        let inserts = remote.inserts();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].payload, MessagePayload::Text("hello".into()));

        // the optimistic copy is mirrored to the cache immediately
        let cached = MessageCache::new(kv).load().unwrap().unwrap();
        assert_eq!(cached, list);
    }

    #[tokio::test]
    async fn welcome_notice_bootstraps_an_empty_session() {
        let remote = FakeRemote::default();
        let (identity, _ident_tx) = identity_channel();
        let (monitor, _conn_tx) = monitor_channel(false);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (_cmd_tx, mut notif_rx) = spawn_session(
            remote.clone(),
            kv,
            &identity,
            &monitor,
            SessionConfig::default(),
        );

        let list = next_list(&mut notif_rx).await;
        assert_eq!(list.len(), 1);
        assert!(list[0].system);
        assert!(remote.inserts().is_empty(), "the notice is never persisted");
    }

    #[tokio::test]
    async fn resubscribe_always_tears_down_first() {
        let remote = FakeRemote::default();
        let (identity, ident_tx) = identity_channel();
        let (monitor, conn_tx) = monitor_channel(true);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (_cmd_tx, _notif_rx) =
            spawn_session(remote.clone(), kv, &identity, &monitor, quiet_config());

        ident_tx.send(Some(ann())).await.unwrap();
        remote.wait_subscribed(1).await;

        conn_tx.send(false).await.unwrap();
        conn_tx.send(true).await.unwrap();
        remote.wait_subscribed(2).await;

        assert_eq!(remote.events(), vec!["subscribe", "unsubscribe", "subscribe"]);
    }

    #[tokio::test]
    async fn offline_flip_serves_cache_and_blocks_sends() {
        let remote = FakeRemote::default();
        let (identity, ident_tx) = identity_channel();
        let (monitor, conn_tx) = monitor_channel(true);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let cached = vec![Message {
            id: "c1".into(),
            created_at: chrono::Utc::now(),
            author: ann(),
            payload: MessagePayload::Text("from the cache".into()),
            system: false,
        }];
        MessageCache::new(kv.clone()).save(&cached).unwrap();

        let (cmd_tx, mut notif_rx) = spawn_session(
            remote.clone(),
            kv,
            &identity,
            &monitor,
            quiet_config(),
        );

        ident_tx.send(Some(ann())).await.unwrap();
        remote.wait_subscribed(1).await;

        conn_tx.send(false).await.unwrap();
        let list = next_list(&mut notif_rx).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "c1");

        cmd_tx
            .send(SessionCommand::Send(MessageDraft::text("hello")))
            .await
            .unwrap();
        drop(cmd_tx);

        // a blocked send never mutates the list: every later snapshot is
        // still exactly the cached one
        let rest = drain(&mut notif_rx).await;
        assert!(rest.iter().all(|n| match n {
            SessionNotification::ListChanged { messages } =>
                messages.len() == 1 && messages[0].id == "c1",
            _ => true,
        }));
        assert!(remote.inserts().is_empty());
    }

    #[tokio::test]
    async fn offline_transition_notifies_and_pauses_background_work() {
        let remote = FakeRemote::default();
        let (identity, ident_tx) = identity_channel();
        let (monitor, conn_tx) = monitor_channel(true);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (_cmd_tx, mut notif_rx) =
            spawn_session(remote.clone(), kv, &identity, &monitor, quiet_config());

        ident_tx.send(Some(ann())).await.unwrap();
        remote.wait_subscribed(1).await;

        conn_tx.send(false).await.unwrap();

        let notice = recv(&mut notif_rx).await;
        assert!(matches!(notice, SessionNotification::Notice { .. }));
        let connectivity = recv(&mut notif_rx).await;
        assert!(matches!(
            connectivity,
            SessionNotification::ConnectivityChanged { online: false }
        ));

        conn_tx.send(true).await.unwrap();
        remote.wait_subscribed(2).await;
        assert_eq!(remote.network_calls(), vec![false, true]);
    }

    #[tokio::test]
    async fn duplicate_monitor_signals_cause_no_churn() {
        let remote = FakeRemote::default();
        let (identity, ident_tx) = identity_channel();
        let (monitor, conn_tx) = monitor_channel(true);
        let kv = Arc::new(KvStore::open_in_memory().unwrap());

        let (cmd_tx, mut notif_rx) =
            spawn_session(remote.clone(), kv, &identity, &monitor, quiet_config());

        ident_tx.send(Some(ann())).await.unwrap();
        remote.wait_subscribed(1).await;

        // the monitor may repeat the current value; the gate absorbs it
        conn_tx.send(true).await.unwrap();
        conn_tx.send(true).await.unwrap();
        drop(cmd_tx);

        drain(&mut notif_rx).await;
        assert_eq!(remote.events(), vec!["subscribe", "unsubscribe"]);
    }
}
