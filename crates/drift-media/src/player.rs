//! Playback state machine for audio messages.
//!
//! Pure state tracking; the actual audio backend belongs to the rendering
//! layer. Reaching the end of a track forces a pause with the position reset
//! to zero; there is no auto-repeat.

use thiserror::Error;

/// Lifecycle of one audio message's playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Error,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("playback action '{action}' is not allowed in state {state:?}")]
    InvalidTransition {
        state: PlaybackState,
        action: &'static str,
    },
}

/// Per-message playback tracker.
#[derive(Debug, Clone)]
pub struct AudioPlayer {
    state: PlaybackState,
    duration_ms: u64,
    position_ms: u64,
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            duration_ms: 0,
            position_ms: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    /// Idle → Loading.
    pub fn begin_loading(&mut self) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Idle {
            return Err(PlaybackError::InvalidTransition {
                state: self.state,
                action: "begin_loading",
            });
        }
        self.state = PlaybackState::Loading;
        Ok(())
    }

    /// Loading → Ready with a known duration.
    pub fn loaded(&mut self, duration_ms: u64) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Loading {
            return Err(PlaybackError::InvalidTransition {
                state: self.state,
                action: "loaded",
            });
        }
        self.duration_ms = duration_ms;
        self.state = PlaybackState::Ready;
        Ok(())
    }

    /// Any state → Error. The message renders as unavailable.
    pub fn fail(&mut self) {
        self.state = PlaybackState::Error;
    }

    /// Toggle play/pause: Ready and Paused start playing, Playing pauses.
    pub fn toggle(&mut self) -> Result<PlaybackState, PlaybackError> {
        self.state = match self.state {
            PlaybackState::Ready | PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Playing => PlaybackState::Paused,
            state => {
                return Err(PlaybackError::InvalidTransition {
                    state,
                    action: "toggle",
                })
            }
        };
        Ok(self.state)
    }

    /// Position update from the playback backend.
    pub fn tick(&mut self, position_ms: u64) {
        if self.state == PlaybackState::Playing {
            self.position_ms = position_ms.min(self.duration_ms);
        }
    }

    /// End of track: force Playing → Paused and reset the position.
    pub fn finished(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            self.position_ms = 0;
        }
    }

    /// Seek to a fractional position in `[0, 1]` of the known duration.
    /// Allowed only from Ready, Paused or Playing.
    pub fn seek(&mut self, fraction: f64) -> Result<u64, PlaybackError> {
        match self.state {
            PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Playing => {
                let clamped = fraction.clamp(0.0, 1.0);
                self.position_ms = (clamped * self.duration_ms as f64) as u64;
                Ok(self.position_ms)
            }
            state => Err(PlaybackError::InvalidTransition {
                state,
                action: "seek",
            }),
        }
    }
}

/// `m:ss` display form of a millisecond position.
pub fn format_timestamp(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
