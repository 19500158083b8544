//! Connectivity tracking for the session.

/// An observed change of the connectivity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Online,
    Offline,
}

/// Stores the latest observed connectivity value and reports transitions.
///
/// The monitor does not deduplicate consecutive identical signals; the gate
/// does, so downstream side effects fire once per actual change. Delivery is
/// best-effort; a missed event self-corrects on the next one, since only
/// the latest observed value is kept.
#[derive(Debug, Clone)]
pub struct ConnectivityGate {
    online: bool,
}

impl ConnectivityGate {
    pub fn new(initial: bool) -> Self {
        Self { online: initial }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Record a monitor event. Returns the transition when the value
    /// actually changed.
    pub fn observe(&mut self, online: bool) -> Option<Transition> {
        if online == self.online {
            return None;
        }
        self.online = online;
        Some(if online {
            Transition::Online
        } else {
            Transition::Offline
        })
    }
}
