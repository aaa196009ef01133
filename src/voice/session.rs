use futures::StreamExt;
use std::fmt;
use std::time::{Duration, Instant};

use super::transcript::Transcript;
use super::{CallEvent, MediaTrack, RemoteStream, TokenSource, VoiceClient, VoiceError};

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Idle,
    Connecting,
    Starting,
    InCall,
    Ending,
    /// Provider closed the call
    Ended,
    /// Call could not be set up
    Failed(String),
    /// Provider reported an error mid-call
    Errored(String),
}

impl CallStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::InCall | Self::Ending)
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting..."),
            Self::Starting => write!(f, "Starting Call..."),
            Self::InCall => write!(f, "In Call"),
            Self::Ending => write!(f, "Ending call..."),
            Self::Ended => write!(f, "Call Ended"),
            Self::Failed(msg) => write!(f, "Call failed: {}", msg),
            Self::Errored(msg) => write!(f, "Call Error: {}", msg),
        }
    }
}

/// `HH:MM:SS`, hours wrapping at 24
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

// ============================================================================
// Session
// ============================================================================

/// One dashboard call: owns its client, transcript and timing
pub struct CallSession<C: VoiceClient> {
    client: C,
    local_track: MediaTrack,
    status: CallStatus,
    transcript: Transcript,
    remote_stream: Option<RemoteStream>,
    started_at: Option<Instant>,
}

impl<C: VoiceClient> CallSession<C> {
    pub fn new(client: C, local_track: MediaTrack) -> Self {
        Self {
            client,
            local_track,
            status: CallStatus::Idle,
            transcript: Transcript::new(),
            remote_stream: None,
            started_at: None,
        }
    }

    pub fn status(&self) -> &CallStatus {
        &self.status
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn remote_stream(&self) -> Option<&RemoteStream> {
        self.remote_stream.as_ref()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch a token and start the call
    pub async fn start(
        &mut self,
        tokens: &dyn TokenSource,
        agent_id: &str,
    ) -> Result<(), VoiceError> {
        if self.status.is_active() {
            return Err(VoiceError::AlreadyActive);
        }
        self.transcript.clear();
        self.status = CallStatus::Connecting;

        let token = match tokens.access_token(agent_id).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(agent_id, "Call token unavailable: {}", e);
                self.status = CallStatus::Failed(e.to_string());
                return Err(e.into());
            }
        };

        self.status = CallStatus::Starting;
        if let Err(e) = self.client.start_call(&token).await {
            tracing::warn!("Voice client failed to start call: {}", e);
            self.status = CallStatus::Failed(e.to_string());
            return Err(e);
        }

        self.status = CallStatus::InCall;
        self.started_at = Some(Instant::now());
        tracing::info!(agent_id, "Call started");
        Ok(())
    }

    /// Consume client events until the call closes or errors
    pub async fn drive(&mut self) {
        let mut events = self.client.events();
        while let Some(event) = events.next().await {
            if self.handle(event).await {
                break;
            }
        }
    }

    /// Apply one event. Returns true once the call is over.
    pub async fn handle(&mut self, event: CallEvent) -> bool {
        match event {
            CallEvent::Connected => {
                if let Err(e) = self.client.publish(&self.local_track).await {
                    tracing::warn!("Publishing local track failed: {}", e);
                }
                false
            }
            CallEvent::Update(update) => {
                self.transcript.apply_update(&update);
                false
            }
            CallEvent::RemoteStream(stream) => {
                self.remote_stream = Some(stream);
                false
            }
            CallEvent::Closed => {
                tracing::info!(duration = %self.duration_display(), "Call closed by provider");
                self.finish(CallStatus::Ended);
                true
            }
            CallEvent::Error(msg) => {
                tracing::error!("Call error: {}", msg);
                self.finish(CallStatus::Errored(msg));
                true
            }
        }
    }

    /// Stop the call and reset to `Idle`, whether or not the stop succeeds
    pub async fn end(&mut self) -> Result<(), VoiceError> {
        if !self.status.is_active() {
            return Ok(());
        }
        self.status = CallStatus::Ending;
        let result = self.client.stop_call().await;
        if let Err(e) = &result {
            tracing::warn!("Stopping call failed: {}", e);
        }
        self.finish(CallStatus::Idle);
        self.transcript.clear();
        result
    }

    pub fn duration(&self) -> Duration {
        match (self.status.is_active(), self.started_at) {
            (true, Some(at)) => at.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn duration_display(&self) -> String {
        format_duration(self.duration())
    }

    fn finish(&mut self, status: CallStatus) {
        self.status = status;
        self.started_at = None;
        self.remote_stream = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_relay::RelayError;
    use crate::voice::transcript::{Role, TranscriptSegment, TranscriptUpdate};
    use async_trait::async_trait;
    use futures::channel::mpsc;
    use futures::stream::BoxStream;
    use std::sync::Mutex;

    struct FakeClient {
        calls: Mutex<Vec<String>>,
        events: Mutex<Option<mpsc::UnboundedReceiver<CallEvent>>>,
        fail_stop: bool,
    }

    impl FakeClient {
        fn new() -> (Self, mpsc::UnboundedSender<CallEvent>) {
            let (tx, rx) = mpsc::unbounded();
            let client = Self {
                calls: Mutex::new(Vec::new()),
                events: Mutex::new(Some(rx)),
                fail_stop: false,
            };
            (client, tx)
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VoiceClient for FakeClient {
        async fn start_call(&self, access_token: &str) -> Result<(), VoiceError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("start:{}", access_token));
            Ok(())
        }

        async fn stop_call(&self) -> Result<(), VoiceError> {
            self.calls.lock().unwrap().push("stop".to_string());
            if self.fail_stop {
                return Err(VoiceError::Client("stop failed".to_string()));
            }
            Ok(())
        }

        async fn publish(&self, track: &MediaTrack) -> Result<(), VoiceError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("publish:{}", track.id));
            Ok(())
        }

        fn events(&self) -> BoxStream<'static, CallEvent> {
            match self.events.lock().unwrap().take() {
                Some(rx) => rx.boxed(),
                None => futures::stream::empty().boxed(),
            }
        }
    }

    struct FixedToken(Result<String, RelayError>);

    #[async_trait]
    impl TokenSource for FixedToken {
        async fn access_token(&self, _agent_id: &str) -> Result<String, RelayError> {
            self.0.clone()
        }
    }

    fn mic() -> MediaTrack {
        MediaTrack {
            id: "mic".to_string(),
        }
    }

    #[tokio::test]
    async fn test_start_walks_to_in_call() {
        let (client, _tx) = FakeClient::new();
        let mut session = CallSession::new(client, mic());
        assert_eq!(session.status(), &CallStatus::Idle);

        session
            .start(&FixedToken(Ok("tok".to_string())), "agent-123")
            .await
            .unwrap();
        assert_eq!(session.status(), &CallStatus::InCall);
        assert_eq!(session.client().calls(), vec!["start:tok"]);
    }

    #[tokio::test]
    async fn test_token_failure_marks_failed() {
        let (client, _tx) = FakeClient::new();
        let mut session = CallSession::new(client, mic());

        let err = session
            .start(
                &FixedToken(Err(RelayError::Upstream { status: 500 })),
                "agent-123",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::Token(_)));
        assert_eq!(
            session.status().to_string(),
            "Call failed: Call provider error (status 500)."
        );
        assert!(session.client().calls().is_empty());
        assert_eq!(session.duration_display(), "00:00:00");
    }

    #[tokio::test]
    async fn test_second_start_rejected_while_active() {
        let (client, _tx) = FakeClient::new();
        let mut session = CallSession::new(client, mic());
        let tokens = FixedToken(Ok("tok".to_string()));
        session.start(&tokens, "a").await.unwrap();

        assert!(matches!(
            session.start(&tokens, "a").await,
            Err(VoiceError::AlreadyActive)
        ));
    }

    #[tokio::test]
    async fn test_drive_merges_updates_until_closed() {
        let (client, tx) = FakeClient::new();
        let mut session = CallSession::new(client, mic());
        session
            .start(&FixedToken(Ok("tok".to_string())), "a")
            .await
            .unwrap();

        tx.unbounded_send(CallEvent::Connected).unwrap();
        tx.unbounded_send(CallEvent::RemoteStream(RemoteStream {
            id: "remote".to_string(),
        }))
        .unwrap();
        tx.unbounded_send(CallEvent::Update(TranscriptUpdate {
            transcript: vec![
                TranscriptSegment::new(Role::Agent, "Hello"),
                TranscriptSegment::new(Role::Agent, " there"),
            ],
        }))
        .unwrap();
        tx.unbounded_send(CallEvent::Update(TranscriptUpdate {
            transcript: vec![TranscriptSegment::new(Role::User, "Hi")],
        }))
        .unwrap();
        tx.unbounded_send(CallEvent::Closed).unwrap();
        // Events after close are not consumed
        tx.unbounded_send(CallEvent::Update(TranscriptUpdate {
            transcript: vec![TranscriptSegment::new(Role::User, "late")],
        }))
        .unwrap();

        session.drive().await;

        assert_eq!(session.status(), &CallStatus::Ended);
        assert_eq!(session.transcript().render(), "Agent: Hello there\nUser: Hi");
        assert_eq!(session.client().calls(), vec!["start:tok", "publish:mic"]);
        assert!(session.remote_stream().is_none());
    }

    #[tokio::test]
    async fn test_error_event_ends_call() {
        let (client, _tx) = FakeClient::new();
        let mut session = CallSession::new(client, mic());
        session
            .start(&FixedToken(Ok("tok".to_string())), "a")
            .await
            .unwrap();

        assert!(
            session
                .handle(CallEvent::Error("ice failed".to_string()))
                .await
        );
        assert_eq!(session.status().to_string(), "Call Error: ice failed");
        assert!(!session.status().is_active());
    }

    #[tokio::test]
    async fn test_end_resets_to_idle() {
        let (client, _tx) = FakeClient::new();
        let mut session = CallSession::new(client, mic());
        session
            .start(&FixedToken(Ok("tok".to_string())), "a")
            .await
            .unwrap();
        session
            .handle(CallEvent::Update(TranscriptUpdate {
                transcript: vec![TranscriptSegment::new(Role::Agent, "bye")],
            }))
            .await;

        session.end().await.unwrap();
        assert_eq!(session.status(), &CallStatus::Idle);
        assert!(session.transcript().is_empty());
        assert_eq!(session.client().calls(), vec!["start:tok", "stop"]);

        // Ending an idle session is a no-op
        session.end().await.unwrap();
        assert_eq!(session.client().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_end_resets_even_when_stop_fails() {
        let (mut client, _tx) = FakeClient::new();
        client.fail_stop = true;
        let mut session = CallSession::new(client, mic());
        session
            .start(&FixedToken(Ok("tok".to_string())), "a")
            .await
            .unwrap();

        assert!(session.end().await.is_err());
        assert_eq!(session.status(), &CallStatus::Idle);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "00:00:00");
        assert_eq!(format_duration(Duration::from_millis(61_999)), "00:01:01");
        assert_eq!(format_duration(Duration::from_secs(3 * 3600 + 7)), "03:00:07");
        assert_eq!(format_duration(Duration::from_secs(25 * 3600)), "01:00:00");
    }
}
