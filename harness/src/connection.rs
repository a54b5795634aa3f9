use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use messages::{msg_types::CredentialIssuanceTypeV1_0, CredentialIssuanceV1};
use tokio::sync::{mpsc, oneshot};

use crate::errors::error::{err_msg, HarnessError, HarnessErrorKind, HarnessResult};

#[derive(Debug)]
struct Waiter {
    token: u64,
    resolve: oneshot::Sender<CredentialIssuanceV1>,
}

type WaiterMap = HashMap<CredentialIssuanceTypeV1_0, Waiter>;

/// A bidirectional message channel to the agent under test.
///
/// Outbound messages are serialized onto the transport sender the
/// connection was built with. Inbound traffic is demultiplexed against
/// single-use waiters registered through [`Connection::next`]; each
/// connection owns its own waiter registry, so one scenario's wait can
/// never consume another scenario's message.
#[derive(Debug)]
pub struct Connection {
    source_id: String,
    outbound: mpsc::UnboundedSender<String>,
    waiters: Arc<Mutex<WaiterMap>>,
    next_token: AtomicU64,
}

impl Connection {
    pub fn new(source_id: &str, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            source_id: source_id.to_owned(),
            outbound,
            waiters: Arc::new(Mutex::new(HashMap::new())),
            next_token: AtomicU64::new(0),
        }
    }

    /// Two loopback-linked connections, each delivering what the other
    /// sends. Used to wire a scenario against an in-process mock agent.
    /// Must be called within a tokio runtime.
    pub fn pair(left: &str, right: &str) -> (Self, Self) {
        let (tx_lr, rx_lr) = mpsc::unbounded_channel();
        let (tx_rl, rx_rl) = mpsc::unbounded_channel();
        let left = Connection::new(left, tx_lr);
        let right = Connection::new(right, tx_rl);
        left.pump_inbound(rx_rl);
        right.pump_inbound(rx_lr);
        (left, right)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Serialize and ship a message to the agent under test.
    pub fn send(&self, msg: &CredentialIssuanceV1) -> HarnessResult<()> {
        trace!(
            "Connection[{}]::send >>> kind: {}, id: {}",
            self.source_id,
            msg.kind().as_ref(),
            msg.id()
        );
        let raw = serde_json::to_string(msg).map_err(|err| {
            err_msg(
                HarnessErrorKind::SerializationError,
                format!("cannot serialize outbound message: {err}"),
            )
        })?;
        self.outbound.send(raw).map_err(|_| {
            err_msg(
                HarnessErrorKind::Transport,
                format!("connection {} is closed", self.source_id),
            )
        })
    }

    /// Register a single-use waiter for the next inbound message of the
    /// given kind. Registering a second waiter for a kind that already has
    /// one active is a programming error and fails fast.
    pub fn next(&self, kind: CredentialIssuanceTypeV1_0) -> HarnessResult<PendingWait> {
        if kind == CredentialIssuanceTypeV1_0::CredentialPreview {
            return Err(err_msg(
                HarnessErrorKind::InvalidState,
                "credential-preview is not a standalone message kind",
            ));
        }
        let mut waiters = lock_waiters(&self.waiters)?;
        if waiters.contains_key(&kind) {
            return Err(err_msg(
                HarnessErrorKind::InvalidState,
                format!("a wait for {} is already registered", kind.as_ref()),
            ));
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (resolve, rx) = oneshot::channel();
        waiters.insert(kind, Waiter { token, resolve });
        Ok(PendingWait {
            kind,
            token,
            rx,
            waiters: Arc::clone(&self.waiters),
        })
    }

    /// Entry point for inbound wire traffic: the raw payload is parsed
    /// into a typed message and handed to the matching waiter, if any.
    pub fn handle_inbound(&self, raw: &str) -> HarnessResult<()> {
        deliver(&self.source_id, &self.waiters, raw)
    }

    /// Drain a transport receiver into this connection on a background task.
    pub fn pump_inbound(&self, mut rx: mpsc::UnboundedReceiver<String>) {
        let source_id = self.source_id.clone();
        let waiters = Arc::clone(&self.waiters);
        tokio::spawn(async move {
            while let Some(raw) = rx.recv().await {
                if let Err(err) = deliver(&source_id, &waiters, &raw) {
                    warn!("Connection[{source_id}]: dropping inbound message: {err}");
                }
            }
        });
    }
}

fn lock_waiters(waiters: &Mutex<WaiterMap>) -> HarnessResult<std::sync::MutexGuard<'_, WaiterMap>> {
    waiters
        .lock()
        .map_err(|_| err_msg(HarnessErrorKind::InvalidState, "waiter registry poisoned"))
}

fn deliver(source_id: &str, waiters: &Mutex<WaiterMap>, raw: &str) -> HarnessResult<()> {
    let msg: CredentialIssuanceV1 = serde_json::from_str(raw).map_err(|err| {
        HarnessError::from_msg(
            HarnessErrorKind::ProtocolViolation,
            format!("inbound payload is not an issue-credential 1.0 message: {err}"),
        )
    })?;
    let kind = msg.kind();
    trace!(
        "Connection[{source_id}]::deliver >>> kind: {}, id: {}",
        kind.as_ref(),
        msg.id()
    );

    let waiter = lock_waiters(waiters)?.remove(&kind);
    match waiter {
        Some(waiter) => {
            if waiter.resolve.send(msg).is_err() {
                warn!(
                    "Connection[{source_id}]: waiter for {} resolved after its scenario exited",
                    kind.as_ref()
                );
            }
            Ok(())
        }
        None => {
            warn!(
                "Connection[{source_id}]: no active waiter for {}, message {} dropped",
                kind.as_ref(),
                msg.id()
            );
            Ok(())
        }
    }
}

/// An ephemeral registration of a (message kind, deadline) predicate.
///
/// State machine per wait: Idle -> Waiting -> {Resolved, TimedOut}. The
/// wait resolves at most once; [`PendingWait::recv`] consumes it, and
/// dropping it deregisters the waiter so an aborted scenario cannot
/// consume a later scenario's traffic.
#[derive(Debug)]
pub struct PendingWait {
    kind: CredentialIssuanceTypeV1_0,
    token: u64,
    rx: oneshot::Receiver<CredentialIssuanceV1>,
    waiters: Arc<Mutex<WaiterMap>>,
}

impl PendingWait {
    pub fn kind(&self) -> CredentialIssuanceTypeV1_0 {
        self.kind
    }

    /// Wait for the matching message, bounded by `timeout`. Elapsing the
    /// bound is a distinguishable failure, never silently treated as
    /// success; the caller records the `timed-out` event before
    /// propagating.
    pub async fn recv(mut self, timeout: Duration) -> HarnessResult<CredentialIssuanceV1> {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(msg)) => Ok(msg),
            Ok(Err(_)) => Err(err_msg(
                HarnessErrorKind::Transport,
                format!("connection dropped while waiting for {}", self.kind.as_ref()),
            )),
            Err(_) => Err(err_msg(
                HarnessErrorKind::Timeout,
                format!(
                    "no {} message within {}ms",
                    self.kind.as_ref(),
                    timeout.as_millis()
                ),
            )),
        }
    }
}

impl Drop for PendingWait {
    fn drop(&mut self) {
        if let Ok(mut waiters) = self.waiters.lock() {
            // Deregister only our own registration; the slot may already
            // hold a newer waiter for the same kind.
            if waiters.get(&self.kind).map(|w| w.token) == Some(self.token) {
                waiters.remove(&self.kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;

    fn raw_ack(thid: &str) -> String {
        json!({
            "@type": "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/issue-credential/1.0/ack",
            "@id": "ack-id",
            "status": "OK",
            "~thread": { "thid": thid },
        })
        .to_string()
    }

    fn raw_request(id: &str, thid: &str) -> String {
        json!({
            "@type": "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/issue-credential/1.0/request-credential",
            "@id": id,
            "requests~attach": [],
            "~thread": { "thid": thid },
        })
        .to_string()
    }

    fn test_connection() -> Connection {
        let (tx, _rx) = mpsc::unbounded_channel();
        Connection::new("test", tx)
    }

    #[tokio::test]
    async fn test_wait_resolves_on_matching_message() {
        let conn = test_connection();
        let wait = conn.next(CredentialIssuanceTypeV1_0::Ack).unwrap();
        conn.handle_inbound(&raw_ack("thid-1")).unwrap();

        let msg = wait.recv(Duration::from_millis(100)).await.unwrap();
        assert_eq!(msg.kind(), CredentialIssuanceTypeV1_0::Ack);
        assert_eq!(msg.thread_id(), Some("thid-1"));
    }

    #[tokio::test]
    async fn test_wait_times_out_without_message() {
        let conn = test_connection();
        let wait = conn.next(CredentialIssuanceTypeV1_0::Ack).unwrap();

        let err = wait.recv(Duration::from_millis(20)).await.unwrap_err();
        assert_eq!(err.kind(), HarnessErrorKind::Timeout);

        // A late message finds no waiter and is dropped without effect.
        conn.handle_inbound(&raw_ack("thid-late")).unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_wait_registration_fails_fast() {
        let conn = test_connection();
        let _wait = conn.next(CredentialIssuanceTypeV1_0::Ack).unwrap();
        let err = conn.next(CredentialIssuanceTypeV1_0::Ack).unwrap_err();
        assert_eq!(err.kind(), HarnessErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_waits_for_different_kinds_are_independent() {
        let conn = test_connection();
        let wait_req = conn
            .next(CredentialIssuanceTypeV1_0::RequestCredential)
            .unwrap();
        let wait_ack = conn.next(CredentialIssuanceTypeV1_0::Ack).unwrap();

        conn.handle_inbound(&raw_ack("thid-1")).unwrap();
        conn.handle_inbound(&raw_request("req-1", "offer-1")).unwrap();

        let ack = wait_ack.recv(Duration::from_millis(100)).await.unwrap();
        assert_eq!(ack.kind(), CredentialIssuanceTypeV1_0::Ack);
        let req = wait_req.recv(Duration::from_millis(100)).await.unwrap();
        assert_eq!(req.id(), "req-1");
    }

    #[tokio::test]
    async fn test_dropping_wait_deregisters_it() {
        let conn = test_connection();
        let wait = conn.next(CredentialIssuanceTypeV1_0::Ack).unwrap();
        drop(wait);

        // The slot is free again for a new registration.
        let wait = conn.next(CredentialIssuanceTypeV1_0::Ack).unwrap();
        conn.handle_inbound(&raw_ack("thid-2")).unwrap();
        let msg = wait.recv(Duration::from_millis(100)).await.unwrap();
        assert_eq!(msg.thread_id(), Some("thid-2"));
    }

    #[tokio::test]
    async fn test_stale_drop_does_not_remove_newer_waiter() {
        let conn = test_connection();
        let stale = conn.next(CredentialIssuanceTypeV1_0::Ack).unwrap();
        let err = stale.recv(Duration::from_millis(10)).await.unwrap_err();
        assert_eq!(err.kind(), HarnessErrorKind::Timeout);

        let wait = conn.next(CredentialIssuanceTypeV1_0::Ack).unwrap();
        conn.handle_inbound(&raw_ack("thid-3")).unwrap();
        let msg = wait.recv(Duration::from_millis(100)).await.unwrap();
        assert_eq!(msg.thread_id(), Some("thid-3"));
    }

    #[tokio::test]
    async fn test_inbound_garbage_is_a_protocol_violation() {
        let conn = test_connection();
        let err = conn.handle_inbound("{\"not\": \"a message\"}").unwrap_err();
        assert_eq!(err.kind(), HarnessErrorKind::ProtocolViolation);
    }

    #[tokio::test]
    async fn test_loopback_pair_delivers_across_endpoints() {
        let (suite, agent) = Connection::pair("suite", "agent");
        let wait = agent.next(CredentialIssuanceTypeV1_0::Ack).unwrap();

        let raw = raw_ack("thid-pair");
        let msg: CredentialIssuanceV1 = serde_json::from_str(&raw).unwrap();
        suite.send(&msg).unwrap();

        let received = wait.recv(Duration::from_millis(200)).await.unwrap();
        assert_eq!(received, msg);
    }
}
