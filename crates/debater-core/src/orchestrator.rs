//! Request lifecycle for a single debate generation.
//!
//! ```text
//!   Idle ── submit ──▶ AwaitingResponse ── resolve ──▶ Idle
//!           │ user entry + pending entry      │ pending removed,
//!           │ appended synchronously          │ answer or failure appended
//! ```
//!
//! Single-flight: while a generation is in flight every `submit` is rejected.
//! Each accepted submission gets a [`Ticket`]; only the ticket currently in
//! flight can resolve, so a second outcome for the same submission (a late
//! response after a timeout was reported) changes nothing.

use std::future::Future;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::api::DebateClient;
use crate::error::{Rejected, RequestFailure, RequestOutcome};
use crate::state::{ConversationEntry, EntryId, Role, StatusEntry, StatusKind, TimelineEntry};
use crate::timeline::Timeline;

pub const PENDING_TEXT: &str = "Generating debate... This may take 30-60 seconds";
pub const SUCCESS_TEXT: &str = "Debate generated successfully!";

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    InFlight(Ticket),
}

/// An accepted submission, to be carried to the network and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: Ticket,
    pub topic: String,
}

/// Terminal result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Generated(EntryId),
    Failed(RequestFailure),
}

/// Published synchronously after each mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    Appended(EntryId),
    Removed(EntryId),
    StateChanged(GenerationState),
}

/// Host callback for ambient status (toast, status line).
pub type StatusHook = Box<dyn Fn(&str, StatusKind) + Send + Sync>;

/// The state an orchestrator owns: the timeline and the single-flight gate.
#[derive(Debug, Clone, Default)]
struct Session {
    timeline: Timeline,
    state: GenerationState,
}

pub struct GenerationOrchestrator {
    client: DebateClient,
    session: Session,
    next_ticket: u64,
    events: broadcast::Sender<TimelineEvent>,
    status_hook: Option<StatusHook>,
}

impl GenerationOrchestrator {
    pub fn new(client: DebateClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            session: Session::default(),
            next_ticket: 0,
            events,
            status_hook: None,
        }
    }

    pub fn on_status<F>(&mut self, hook: F)
    where
        F: Fn(&str, StatusKind) + Send + Sync + 'static,
    {
        self.status_hook = Some(Box::new(hook));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimelineEvent> {
        self.events.subscribe()
    }

    pub fn client(&self) -> &DebateClient {
        &self.client
    }

    pub fn timeline(&self) -> &Timeline {
        &self.session.timeline
    }

    pub fn snapshot(&self) -> Vec<TimelineEntry> {
        self.session.timeline.snapshot()
    }

    pub fn state(&self) -> GenerationState {
        self.session.state
    }

    pub fn is_idle(&self) -> bool {
        self.session.state == GenerationState::Idle
    }

    /// Accept `topic` and move to AwaitingResponse.
    ///
    /// Appends the user entry and the pending entry. Rejected submissions
    /// leave the session untouched.
    pub fn submit(&mut self, topic: &str) -> Result<Submission, Rejected> {
        let topic = topic.trim();
        if topic.is_empty() {
            debug!("rejecting empty topic");
            return Err(Rejected::EmptyTopic);
        }
        if let GenerationState::InFlight(ticket) = self.session.state {
            debug!(?ticket, "rejecting submission while in flight");
            return Err(Rejected::Busy);
        }

        let user_id = self.session.timeline.next_id();
        self.append(TimelineEntry::Conversation(ConversationEntry {
            id: user_id,
            role: Role::User,
            text: topic.to_string(),
            is_generated: false,
        }));
        self.append(TimelineEntry::Status(StatusEntry {
            id: EntryId::Pending,
            kind: StatusKind::Pending,
            text: PENDING_TEXT.to_string(),
        }));

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.set_state(GenerationState::InFlight(ticket));
        info!(?ticket, topic, "generation submitted");

        Ok(Submission {
            ticket,
            topic: topic.to_string(),
        })
    }

    /// The network half of a submission, detached from `self` so a host can
    /// spawn it.
    pub fn request(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = RequestOutcome<String>> + Send + 'static {
        let client = self.client.clone();
        let topic = submission.topic.clone();
        async move { client.generate(&topic).await }
    }

    /// Apply the outcome for `ticket`. Returns `None` without touching the
    /// session when `ticket` is not the one in flight.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: RequestOutcome<String>,
    ) -> Option<Resolution> {
        if self.session.state != GenerationState::InFlight(ticket) {
            warn!(?ticket, state = ?self.session.state, "dropping stale resolution");
            return None;
        }
        Some(self.finish(outcome))
    }

    /// Drop the in-flight request for `ticket` without an outcome, e.g. when
    /// the host lost the task running it. The pending entry is removed and
    /// nothing is appended. Returns `false` for a stale ticket.
    pub fn abandon(&mut self, ticket: Ticket) -> bool {
        if self.session.state != GenerationState::InFlight(ticket) {
            return false;
        }
        warn!(?ticket, "generation abandoned without an outcome");
        self.remove(EntryId::Pending);
        self.set_state(GenerationState::Idle);
        true
    }

    /// Submit, await the bounded request, and resolve, all in one call.
    pub async fn generate(&mut self, topic: &str) -> Result<Resolution, Rejected> {
        let submission = self.submit(topic)?;
        let outcome = self.request(&submission).await;
        Ok(self.finish(outcome))
    }

    fn finish(&mut self, outcome: RequestOutcome<String>) -> Resolution {
        self.remove(EntryId::Pending);

        let resolution = match outcome {
            Ok(text) => {
                let id = self.session.timeline.next_id();
                self.append(TimelineEntry::Conversation(ConversationEntry {
                    id,
                    role: Role::Assistant,
                    text,
                    is_generated: true,
                }));
                Resolution::Generated(id)
            }
            Err(failure) => {
                let id = self.session.timeline.next_id();
                self.append(TimelineEntry::Status(StatusEntry {
                    id,
                    kind: StatusKind::Failure,
                    text: failure.message.clone(),
                }));
                Resolution::Failed(failure)
            }
        };

        self.set_state(GenerationState::Idle);

        match &resolution {
            Resolution::Generated(id) => {
                info!(%id, "debate generated");
                if let Some(hook) = &self.status_hook {
                    hook(SUCCESS_TEXT, StatusKind::Success);
                }
            }
            Resolution::Failed(failure) => {
                warn!(kind = ?failure.kind, "generation failed");
            }
        }
        resolution
    }

    fn append(&mut self, entry: TimelineEntry) {
        let id = entry.id();
        self.session.timeline.append(entry);
        self.publish(TimelineEvent::Appended(id));
    }

    fn remove(&mut self, id: EntryId) {
        if self.session.timeline.remove_by_id(id).is_some() {
            self.publish(TimelineEvent::Removed(id));
        }
    }

    fn set_state(&mut self, state: GenerationState) {
        self.session.state = state;
        self.publish(TimelineEvent::StateChanged(state));
    }

    fn publish(&self, event: TimelineEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RawResponse, RequestPolicy};
    use crate::classify::GENERATION_COPY;
    use crate::error::ErrorKind;
    use crate::testing::{Script, ScriptedTransport};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn orchestrator(transport: Arc<ScriptedTransport>) -> GenerationOrchestrator {
        GenerationOrchestrator::new(DebateClient::new(transport, RequestPolicy::default()))
    }

    fn ok(result: &str) -> Script {
        Script::Respond(RawResponse::json(
            200,
            serde_json::json!({ "success": true, "result": result }).to_string(),
        ))
    }

    fn status_entries(orch: &GenerationOrchestrator) -> Vec<StatusEntry> {
        orch.snapshot()
            .iter()
            .filter_map(|e| e.as_status().cloned())
            .collect()
    }

    fn drain(rx: &mut broadcast::Receiver<TimelineEvent>) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_round_trip_success() {
        let transport = ScriptedTransport::with(vec![ok("R")]);
        let mut orch = orchestrator(transport.clone());
        let toasts = Arc::new(Mutex::new(Vec::new()));
        let sink = toasts.clone();
        orch.on_status(move |msg, kind| sink.lock().unwrap().push((msg.to_string(), kind)));

        let resolution = orch.generate("Is AI good?").await.unwrap();

        let snapshot = orch.snapshot();
        assert_eq!(snapshot.len(), 2);
        let user = snapshot[0].as_conversation().unwrap();
        assert_eq!((user.role, user.text.as_str(), user.is_generated), (Role::User, "Is AI good?", false));
        let answer = snapshot[1].as_conversation().unwrap();
        assert_eq!((answer.role, answer.text.as_str(), answer.is_generated), (Role::Assistant, "R", true));
        assert_eq!(resolution, Resolution::Generated(answer.id));
        assert!(status_entries(&orch).is_empty());
        assert!(orch.is_idle());
        assert_eq!(*transport.topics.lock().unwrap(), vec!["Is AI good?".to_string()]);
        assert_eq!(
            *toasts.lock().unwrap(),
            vec![(SUCCESS_TEXT.to_string(), StatusKind::Success)]
        );
    }

    #[tokio::test]
    async fn test_empty_topic_is_noop() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![]));
        let mut rx = orch.subscribe();

        assert_eq!(orch.submit(""), Err(Rejected::EmptyTopic));
        assert_eq!(orch.submit("   "), Err(Rejected::EmptyTopic));
        assert_eq!(orch.generate(" \t\n").await, Err(Rejected::EmptyTopic));

        assert!(orch.timeline().is_empty());
        assert!(orch.is_idle());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(Rejected::EmptyTopic.kind(), Some(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_submit_while_in_flight_is_discarded() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![]));
        let first = orch.submit("topic one").unwrap();
        let before = orch.snapshot();

        assert_eq!(orch.submit("topic two"), Err(Rejected::Busy));

        assert_eq!(orch.snapshot(), before);
        assert_eq!(orch.state(), GenerationState::InFlight(first.ticket));
        assert_eq!(orch.timeline().pending_count(), 1);
        assert!(before.iter().all(|e| e.text() != "topic two"));
    }

    #[test]
    fn test_submit_trims_topic() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![]));
        let submission = orch.submit("  why?  ").unwrap();
        assert_eq!(submission.topic, "why?");
        assert_eq!(orch.snapshot()[0].text(), "why?");
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_backend_times_out_not_network() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![Script::Hang]));
        let toasts = Arc::new(Mutex::new(0usize));
        let sink = toasts.clone();
        orch.on_status(move |_, _| *sink.lock().unwrap() += 1);

        let resolution = orch.generate("slow topic").await.unwrap();

        match resolution {
            Resolution::Failed(failure) => assert_eq!(failure.kind, ErrorKind::Timeout),
            other => panic!("expected timeout, got {other:?}"),
        }
        let statuses = status_entries(&orch);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].kind, StatusKind::Failure);
        assert_eq!(statuses[0].text, GENERATION_COPY.timeout);
        assert!(orch.timeline().pending().is_none());
        assert!(orch.is_idle());
        assert_eq!(*toasts.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bound_is_the_policy_value() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![Script::Hang]));
        let started = tokio::time::Instant::now();
        orch.generate("slow topic").await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(600));
        assert!(elapsed < Duration::from_secs(601));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![Script::Refuse]));
        let resolution = orch.generate("topic").await.unwrap();
        assert!(matches!(resolution, Resolution::Failed(ref f) if f.kind == ErrorKind::Network));
        assert_eq!(orch.timeline().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_application_error_surfaces_server_text() {
        let raw = RawResponse::json(200, r#"{"success":false,"error":"Database not found"}"#);
        let mut orch = orchestrator(ScriptedTransport::with(vec![Script::Respond(raw)]));
        orch.generate("topic").await.unwrap();
        let statuses = status_entries(&orch);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].text, "Error: Database not found");
    }

    #[test]
    fn test_late_response_after_timeout_is_noop() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![]));
        let submission = orch.submit("race").unwrap();
        let timeout = Err(RequestFailure::new(ErrorKind::Timeout, "timed out"));

        let first = orch.resolve(submission.ticket, timeout);
        assert!(matches!(first, Some(Resolution::Failed(_))));
        let after_first = orch.snapshot();

        let mut rx = orch.subscribe();
        let second = orch.resolve(submission.ticket, Ok("late".to_string()));

        assert_eq!(second, None);
        assert_eq!(orch.snapshot(), after_first);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_stale_ticket_cannot_resolve_next_submission() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![]));
        let first = orch.submit("one").unwrap();
        orch.resolve(first.ticket, Ok("A".into())).unwrap();
        let second = orch.submit("two").unwrap();
        assert_ne!(first.ticket, second.ticket);

        assert_eq!(orch.resolve(first.ticket, Ok("stale".into())), None);
        assert_eq!(orch.state(), GenerationState::InFlight(second.ticket));
        assert!(orch.timeline().pending().is_some());
    }

    #[tokio::test]
    async fn test_single_pending_across_submissions() {
        let http_500 = RawResponse::json(500, r#"{"success":false,"error":"x"}"#);
        let mut orch = orchestrator(ScriptedTransport::with(vec![
            ok("A"),
            Script::Respond(http_500),
            Script::Refuse,
            ok("B"),
        ]));

        for topic in ["a", "b", "c", "d"] {
            let submission = orch.submit(topic).unwrap();
            assert_eq!(orch.timeline().pending_count(), 1);
            assert_eq!(orch.submit("extra"), Err(Rejected::Busy));
            let outcome = orch.request(&submission).await;
            orch.resolve(submission.ticket, outcome).unwrap();
            assert_eq!(orch.timeline().pending_count(), 0);
        }

        let statuses = status_entries(&orch);
        assert_eq!(statuses.len(), 2);
        assert_ne!(statuses[0].id, statuses[1].id);
        assert_eq!(statuses[0].text, "Error: x (HTTP 500)");
        assert_eq!(orch.snapshot().len(), 8);
    }

    #[tokio::test]
    async fn test_events_follow_each_mutation() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![ok("R")]));
        let mut rx = orch.subscribe();

        let submission = orch.submit("topic").unwrap();
        let user_id = orch.snapshot()[0].id();
        assert_eq!(
            drain(&mut rx),
            vec![
                TimelineEvent::Appended(user_id),
                TimelineEvent::Appended(EntryId::Pending),
                TimelineEvent::StateChanged(GenerationState::InFlight(submission.ticket)),
            ]
        );

        let outcome = orch.request(&submission).await;
        let Some(Resolution::Generated(answer_id)) = orch.resolve(submission.ticket, outcome) else {
            panic!("expected success");
        };
        assert_eq!(
            drain(&mut rx),
            vec![
                TimelineEvent::Removed(EntryId::Pending),
                TimelineEvent::Appended(answer_id),
                TimelineEvent::StateChanged(GenerationState::Idle),
            ]
        );
    }

    #[test]
    fn test_abandon_clears_pending_only() {
        let mut orch = orchestrator(ScriptedTransport::with(vec![]));
        let toasts = Arc::new(Mutex::new(0usize));
        let sink = toasts.clone();
        orch.on_status(move |_, _| *sink.lock().unwrap() += 1);

        let submission = orch.submit("topic").unwrap();
        assert!(orch.abandon(submission.ticket));

        assert!(orch.is_idle());
        assert!(orch.timeline().pending().is_none());
        assert!(status_entries(&orch).is_empty());
        assert_eq!(orch.snapshot().len(), 1);
        assert_eq!(*toasts.lock().unwrap(), 0);

        assert!(!orch.abandon(submission.ticket));
        assert_eq!(orch.resolve(submission.ticket, Ok("late".into())), None);
        assert_eq!(orch.snapshot().len(), 1);
    }
}
