// Stream session lifecycle and in-flight invocation tracking

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::task::JoinHandle;

/// Lifecycle of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, capability handshake not yet delivered.
    Connecting,
    /// Handshake done; invocations accepted, any number in flight.
    Open,
    /// Disconnect or transport error observed; draining.
    Closing,
    /// Terminal. No further requests accepted.
    Closed,
}

/// One client connection and its in-flight invocations.
///
/// Owned by the connection's event loop; every mutation goes through that
/// single writer. A result frame is emitted only when `finish` returns true,
/// which keeps delivery at most once per request id even when a cancellation
/// races a completion.
pub struct Session {
    id: String,
    state: SessionState,
    started_at: DateTime<Utc>,
    in_flight: HashMap<String, JoinHandle<()>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: SessionState::Connecting,
            started_at: Utc::now(),
            in_flight: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight(&self, request_id: &str) -> bool {
        self.in_flight.contains_key(request_id)
    }

    /// Handshake delivered; start accepting invocations.
    pub fn open(&mut self) {
        if self.state == SessionState::Connecting {
            self.state = SessionState::Open;
        }
    }

    /// Track a spawned invocation task under its request id.
    ///
    /// Rejected (and the task aborted) unless the session is open and the id
    /// is not already in flight.
    pub fn begin(&mut self, request_id: String, handle: JoinHandle<()>) -> bool {
        if self.state != SessionState::Open || self.in_flight.contains_key(&request_id) {
            handle.abort();
            return false;
        }
        self.in_flight.insert(request_id, handle);
        true
    }

    /// Mark a request complete. False when the request is no longer tracked
    /// (cancelled or torn down); the caller must then discard its result.
    pub fn finish(&mut self, request_id: &str) -> bool {
        self.in_flight.remove(request_id).is_some()
    }

    /// Abort one in-flight invocation; its eventual result is discarded.
    pub fn cancel(&mut self, request_id: &str) -> bool {
        match self.in_flight.remove(request_id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Tear the session down, aborting everything still in flight.
    /// Returns the number of invocations aborted.
    pub fn close(&mut self) -> usize {
        self.state = SessionState::Closing;
        let aborted = self.in_flight.len();
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        self.state = SessionState::Closed;
        aborted
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parked_task() -> JoinHandle<()> {
        tokio::spawn(std::future::pending())
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::Connecting);

        session.open();
        assert_eq!(session.state(), SessionState::Open);

        session.close();
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_begin_requires_open_session() {
        let mut session = Session::new();
        assert!(!session.begin("r1".to_string(), parked_task()));

        session.open();
        assert!(session.begin("r1".to_string(), parked_task()));
        assert!(session.is_in_flight("r1"));
    }

    #[tokio::test]
    async fn test_duplicate_request_id_rejected() {
        let mut session = Session::new();
        session.open();

        assert!(session.begin("r1".to_string(), parked_task()));
        assert!(!session.begin("r1".to_string(), parked_task()));
        assert_eq!(session.in_flight_count(), 1);
    }

    #[tokio::test]
    async fn test_finish_is_at_most_once() {
        let mut session = Session::new();
        session.open();
        session.begin("r1".to_string(), parked_task());

        assert!(session.finish("r1"));
        assert!(!session.finish("r1"));
    }

    #[tokio::test]
    async fn test_cancel_then_finish_discards_result() {
        let mut session = Session::new();
        session.open();
        session.begin("r1".to_string(), parked_task());

        assert!(session.cancel("r1"));
        // Completion arriving after the cancel finds nothing to finish
        assert!(!session.finish("r1"));
    }

    #[tokio::test]
    async fn test_cancel_unknown_request_is_noop() {
        let mut session = Session::new();
        session.open();
        assert!(!session.cancel("ghost"));
    }

    #[tokio::test]
    async fn test_close_aborts_all_in_flight() {
        let mut session = Session::new();
        session.open();
        for id in ["a", "b", "c"] {
            session.begin(id.to_string(), parked_task());
        }

        assert_eq!(session.close(), 3);
        assert_eq!(session.in_flight_count(), 0);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_no_requests_accepted_after_close() {
        let mut session = Session::new();
        session.open();
        session.close();

        assert!(!session.begin("late".to_string(), parked_task()));
        assert_eq!(session.in_flight_count(), 0);
    }
}
