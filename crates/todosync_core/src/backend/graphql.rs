//! Note backend over an injected GraphQL transport.
//!
//! # Responsibility
//! - Map the query/mutation/realtime seams onto GraphQL operations.
//! - Decode realtime payloads before they reach the client's queue.
//!
//! # Invariants
//! - Undecodable realtime payloads are dropped and logged, never delivered.
//! - Transport failures and GraphQL `errors` both surface as `BackendError`.

use super::{
    BackendError, BackendResult, EventSink, NoteMutation, NotePatch, NoteQuery,
    RealtimeChannel, Subscription, Topic,
};
use crate::model::note::{Note, NoteId};
use crate::wire::graphql::{
    create_note_request, decode_deleted_id, decode_list_response, decode_mutation_note,
    decode_subscription_payload, delete_note_request, list_notes_request,
    subscription_document, update_note_request, WireError,
};
use log::warn;
use serde_json::Value;

/// Raw payload callback; returns `false` once the consumer is gone.
pub type PayloadCallback = Box<dyn Fn(&str) -> bool + Send>;

/// Connection to a GraphQL endpoint (HTTP + realtime socket).
pub trait GraphQlTransport {
    /// Executes one request body and returns the raw response body.
    fn execute(&self, request: &Value) -> BackendResult<String>;

    /// Starts a subscription and streams raw payload bodies to `on_payload`.
    fn subscribe(
        &self,
        topic: Topic,
        document: &str,
        on_payload: PayloadCallback,
    ) -> BackendResult<Box<dyn Subscription>>;
}

/// `NoteBackend` speaking GraphQL through `T`.
pub struct GraphQlBackend<T: GraphQlTransport> {
    transport: T,
}

impl<T: GraphQlTransport> GraphQlBackend<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: GraphQlTransport> NoteQuery for GraphQlBackend<T> {
    fn list_notes(&self) -> BackendResult<Vec<Note>> {
        let body = self.transport.execute(&list_notes_request())?;
        Ok(decode_list_response(&body)?)
    }
}

impl<T: GraphQlTransport> NoteMutation for GraphQlBackend<T> {
    fn create_note(&self, note: &Note) -> BackendResult<Note> {
        let body = self.transport.execute(&create_note_request(note)?)?;
        Ok(decode_mutation_note("createNote", &body)?)
    }

    fn update_note(&self, id: &NoteId, patch: &NotePatch) -> BackendResult<Note> {
        let body = self.transport.execute(&update_note_request(id, patch)?)?;
        Ok(decode_mutation_note("updateNote", &body)?)
    }

    fn delete_note(&self, id: &NoteId) -> BackendResult<NoteId> {
        let body = self.transport.execute(&delete_note_request(id))?;
        Ok(decode_deleted_id(&body)?)
    }
}

impl<T: GraphQlTransport> RealtimeChannel for GraphQlBackend<T> {
    fn subscribe(&self, topic: Topic, sink: EventSink) -> BackendResult<Box<dyn Subscription>> {
        let on_payload: PayloadCallback =
            Box::new(move |body: &str| match decode_subscription_payload(topic, body) {
                Ok(event) => sink.deliver(event),
                Err(err) => {
                    warn!(
                        "event=realtime_decode module=backend status=error topic={} error={}",
                        topic.field_name(),
                        err
                    );
                    true
                }
            });
        self.transport
            .subscribe(topic, &subscription_document(topic), on_payload)
    }
}

impl From<WireError> for BackendError {
    fn from(value: WireError) -> Self {
        match value {
            WireError::GraphQl(messages) => Self::Rejected(messages.join("; ")),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GraphQlBackend, GraphQlTransport, PayloadCallback};
    use crate::backend::{
        BackendError, BackendResult, EventSink, NoteMutation, NotePatch, NoteQuery,
        RealtimeChannel, RemoteEvent, Subscription, Topic,
    };
    use crate::model::note::NoteId;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::sync::mpsc::channel;

    struct NoopSubscription(Topic);

    impl Subscription for NoopSubscription {
        fn topic(&self) -> Topic {
            self.0
        }

        fn unsubscribe(self: Box<Self>) {}
    }

    #[derive(Default)]
    struct ScriptedTransport {
        responses: RefCell<VecDeque<String>>,
        requests: RefCell<Vec<Value>>,
        callbacks: RefCell<Vec<(Topic, String, PayloadCallback)>>,
    }

    impl ScriptedTransport {
        fn respond(&self, body: &str) {
            self.responses.borrow_mut().push_back(body.to_string());
        }

        fn push(&self, topic: Topic, body: &str) -> bool {
            let callbacks = self.callbacks.borrow();
            let (_, _, callback) = callbacks
                .iter()
                .find(|(candidate, _, _)| *candidate == topic)
                .expect("topic should be subscribed");
            callback(body)
        }
    }

    impl GraphQlTransport for ScriptedTransport {
        fn execute(&self, request: &Value) -> BackendResult<String> {
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| BackendError::Unavailable("no scripted response".to_string()))
        }

        fn subscribe(
            &self,
            topic: Topic,
            document: &str,
            on_payload: PayloadCallback,
        ) -> BackendResult<Box<dyn Subscription>> {
            self.callbacks
                .borrow_mut()
                .push((topic, document.to_string(), on_payload));
            Ok(Box::new(NoopSubscription(topic)))
        }
    }

    #[test]
    fn list_and_mutations_round_trip_through_transport() {
        let backend = GraphQlBackend::new(ScriptedTransport::default());
        backend.transport().respond(
            r#"{"data":{"listNotes":{"items":[{"id":"1","name":"a","description":"b"}]}}}"#,
        );
        backend.transport().respond(
            r#"{"data":{"updateNote":{"id":"1","name":"a","description":"b","completed":true}}}"#,
        );
        backend
            .transport()
            .respond(r#"{"data":{"deleteNote":{"id":"1"}}}"#);

        let notes = backend.list_notes().expect("list");
        assert_eq!(notes.len(), 1);

        let updated = backend
            .update_note(&NoteId::new("1"), &NotePatch::completed(true))
            .expect("update");
        assert!(updated.completed);

        let deleted = backend.delete_note(&NoteId::new("1")).expect("delete");
        assert_eq!(deleted, NoteId::new("1"));

        let requests = backend.transport().requests.borrow();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1]["variables"]["input"]["completed"], true);
    }

    #[test]
    fn graphql_errors_become_rejections() {
        let backend = GraphQlBackend::new(ScriptedTransport::default());
        backend
            .transport()
            .respond(r#"{"errors":[{"message":"ConditionalCheckFailed"}]}"#);
        let err = backend
            .delete_note(&NoteId::new("1"))
            .expect_err("errors should reject");
        assert_eq!(err, BackendError::Rejected("ConditionalCheckFailed".to_string()));
    }

    #[test]
    fn realtime_payloads_are_decoded_into_sink() {
        let backend = GraphQlBackend::new(ScriptedTransport::default());
        let (sender, receiver) = channel();
        let _handle = backend
            .subscribe(Topic::Deleted, EventSink::new(sender))
            .expect("subscribe");

        assert!(backend
            .transport()
            .push(Topic::Deleted, r#"{"data":{"onDeleteNote":{"id":"9"}}}"#));
        assert!(backend.transport().push(Topic::Deleted, "not json"));

        let events: Vec<RemoteEvent> = receiver.try_iter().collect();
        assert_eq!(events, vec![RemoteEvent::Deleted(NoteId::new("9"))]);

        let callbacks = backend.transport().callbacks.borrow();
        assert!(callbacks[0].1.contains("onDeleteNote"));
    }
}
