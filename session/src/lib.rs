//! Live mood engine for voice sessions.
//!
//! A [`Coordinator`] owns one event loop per session. Each loop consumes
//! speaker events through a [`SessionHandle`]:
//!
//! ```text
//! speech_start / frame / speech_end
//!        |
//!        v
//!   speaker streams --(tick)--> mood --(confirmed)--> admission --> sink
//!        |
//!        +--(chunk)--> recognizer --(result)--> router --> admission / stop
//! ```
//!
//! Everything for one session runs on that session's loop, so no session
//! state is shared across tasks.

mod config;
mod coordinator;
mod error;
mod event;
mod port;
mod session;
mod speaker;
mod timers;

pub use config::{Config, SessionConfig, SpeakerConfig, DEFAULT_BASE_DIR, DEFAULT_CONFIG_FILE};
pub use coordinator::{Coordinator, SessionHandle};
pub use error::{ConfigError, PlaybackError};
pub use event::SessionSnapshot;
pub use port::{PlaybackSink, Sound};
