//! Voice call model.
//!
//! The real-time SDK is consumed through [`VoiceClient`], injected per
//! [`CallSession`]. Its push-style events arrive as a stream of
//! [`CallEvent`] that the session consumes.

pub mod session;
pub mod transcript;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::call_relay::RelayError;

pub use session::{CallSession, CallStatus, format_duration};
pub use transcript::{Message, Role, Transcript, TranscriptSegment, TranscriptUpdate};

/// Local audio track offered to the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: String,
}

/// Remote audio stream announced by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    Connected,
    Update(TranscriptUpdate),
    Closed,
    Error(String),
    RemoteStream(RemoteStream),
}

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("A call is already active.")]
    AlreadyActive,

    #[error(transparent)]
    Token(#[from] RelayError),

    #[error("{0}")]
    Client(String),
}

/// Capability set of the real-time voice SDK
#[async_trait]
pub trait VoiceClient: Send + Sync {
    async fn start_call(&self, access_token: &str) -> Result<(), VoiceError>;

    async fn stop_call(&self) -> Result<(), VoiceError>;

    async fn publish(&self, track: &MediaTrack) -> Result<(), VoiceError>;

    /// Event subscription. Ends when the client shuts down.
    fn events(&self) -> BoxStream<'static, CallEvent>;
}

/// Source of per-call access tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self, agent_id: &str) -> Result<String, RelayError>;
}
