use todosync_core::{
    ActorId, Command, LoadStatus, Note, NoteId, Reconciler, ReconcilerState, SortDirection,
};

fn note(id: &str, name: &str, origin: &str) -> Note {
    Note::new(NoteId::new(id), name, "details", ActorId::new(origin))
}

fn ids(state: &ReconcilerState) -> Vec<String> {
    state.notes.iter().map(|n| n.id.to_string()).collect()
}

#[test]
fn snapshot_then_sort_orders_ascending() {
    let reconciler = Reconciler::new(ActorId::new("local"));
    let state = reconciler.apply_all(
        &reconciler.initial_state(),
        [
            Command::LoadSnapshot(vec![note("1", "B", "x"), note("2", "A", "x")]),
            Command::ToggleSort,
        ],
    );

    assert_eq!(ids(&state), vec!["2", "1"]);
    assert_eq!(state.sort_direction, SortDirection::Ascending);
    assert_eq!(state.load_status, LoadStatus::Ready);
}

#[test]
fn local_create_followed_by_its_echo_keeps_one_entry() {
    let reconciler = Reconciler::new(ActorId::new("local"));
    let created = Note::new(NoteId::new("3"), "X", "Y", ActorId::new("local"));
    let state = reconciler.apply_all(
        &reconciler.initial_state(),
        [
            Command::CreateAccepted(created.clone()),
            Command::RemoteCreated(created),
        ],
    );

    assert_eq!(ids(&state), vec!["3"]);
}

#[test]
fn deleting_unknown_id_leaves_list_unchanged() {
    let reconciler = Reconciler::new(ActorId::new("local"));
    let state = reconciler.apply(
        &reconciler.initial_state(),
        Command::LoadSnapshot(vec![
            note("1", "a", "x"),
            note("2", "b", "x"),
            note("3", "c", "x"),
        ]),
    );

    let next = reconciler.apply(&state, Command::RemoteDeleted(NoteId::new("nonexistent")));
    assert_eq!(next, state);
}

#[test]
fn distinct_actor_ids_filter_only_their_own_echoes() {
    let alice = Reconciler::new(ActorId::new("alice"));
    let bob = Reconciler::new(ActorId::new("bob"));
    let from_alice = Command::RemoteCreated(note("1", "a", "alice"));

    let alice_state = alice.apply(&alice.initial_state(), from_alice.clone());
    let bob_state = bob.apply(&bob.initial_state(), from_alice);

    assert!(alice_state.notes.is_empty());
    assert_eq!(ids(&bob_state), vec!["1"]);
}

#[test]
fn load_failure_after_ready_keeps_notes() {
    let reconciler = Reconciler::new(ActorId::new("local"));
    let state = reconciler.apply_all(
        &reconciler.initial_state(),
        [
            Command::LoadSnapshot(vec![note("1", "a", "x")]),
            Command::LoadFailed,
        ],
    );
    assert_eq!(state.load_status, LoadStatus::Failed);
    assert_eq!(ids(&state), vec!["1"]);
}

#[test]
fn delete_racing_ahead_of_create_does_not_prevent_insert() {
    let reconciler = Reconciler::new(ActorId::new("local"));
    let state = reconciler.apply_all(
        &reconciler.initial_state(),
        [
            Command::RemoteDeleted(NoteId::new("1")),
            Command::RemoteCreated(note("1", "a", "peer")),
        ],
    );
    // Known gap: the earlier delete is lost and the note stays visible.
    assert_eq!(ids(&state), vec!["1"]);
}
