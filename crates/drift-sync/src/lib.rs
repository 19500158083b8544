//! # drift-sync
//!
//! The offline-resilient session core: a single tokio task owns the
//! in-memory message list and keeps it consistent across live-subscription
//! batches, connectivity loss and regain, and user-initiated sends.
//!
//! External code talks to the task through typed command and notification
//! channels; collaborators (remote store, identity provider, network
//! monitor, local cache) are injected as trait implementations at session
//! creation, never looked up globally.

pub mod config;
pub mod engine;
pub mod gate;
pub mod send;
pub mod session;
pub mod traits;

mod error;

pub use config::SessionConfig;
pub use error::SessionError;
pub use gate::{ConnectivityGate, Transition};
pub use session::{spawn_session, SessionCommand, SessionNotification};
pub use traits::{IdentityProvider, NetworkMonitor, RemoteStore, Subscription};
