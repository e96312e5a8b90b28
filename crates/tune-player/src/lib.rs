//! Streaming playback engine for a terminal audio player.
//!
//! One [`PlaybackSession`] owns the active decoder [`Backend`] and the transport state.
//! The output device pulls audio through [`fill_callback`]; the control loop drives the
//! session with [`Transport`] and reads it back for display with [`ProgressReporter`].

pub mod backend;
pub mod config;
pub mod decode;
pub mod device;
pub mod error;
pub mod format;
pub mod playback;
pub mod progress;
pub mod session;
pub mod transport;

pub use backend::{Backend, StreamFormat};
pub use config::PlaybackConfig;
pub use error::OpenError;
pub use format::SourceKind;
pub use progress::{ProgressReporter, ProgressSnapshot, render_progress};
pub use session::{FillOutcome, PlaybackSession, SharedSession, fill_callback};
pub use transport::{Transport, TransportCommand};
