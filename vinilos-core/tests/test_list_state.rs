//! Behavior of the collection-screen state machine over a scripted
//! backend.

use std::sync::Arc;

use vinilos_core::repository::AlbumRepository;
use vinilos_core::state::{ListState, ListStateMachine};
use vinilos_core::testing::{self, ScriptedApi};

fn tracing_init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true)
        .try_init();
}

fn machine_over(api: Arc<ScriptedApi>) -> ListStateMachine<vinilos_core::domain::Album> {
    let repo = AlbumRepository::new(api, None);
    ListStateMachine::new(Arc::new(repo))
}

#[tokio::test]
async fn non_empty_list_lands_in_success_preserving_remote_order() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());
    api.set_albums(vec![
        testing::album(3, "Siembra"),
        testing::album(1, "Buscando América"),
        testing::album(2, "Lo Mato"),
    ]);

    let machine = machine_over(api);
    let mut rx = machine.subscribe();
    let state = rx
        .wait_for(|s| !matches!(s, ListState::Loading))
        .await
        .unwrap()
        .clone();

    match state {
        ListState::Success(albums) => {
            let ids: Vec<i64> = albums.iter().map(|a| a.id).collect();
            assert_eq!(ids, vec![3, 1, 2]);
        }
        other => panic!("expected Success, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_remote_list_lands_in_empty_not_success() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());

    let machine = machine_over(api);
    let mut rx = machine.subscribe();
    let state = rx
        .wait_for(|s| !matches!(s, ListState::Loading))
        .await
        .unwrap()
        .clone();

    assert_eq!(state, ListState::Empty);
}

#[tokio::test]
async fn failing_list_lands_in_error_with_message() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());
    api.fail_album_list(true);

    let machine = machine_over(api);
    let mut rx = machine.subscribe();
    let state = rx
        .wait_for(|s| !matches!(s, ListState::Loading))
        .await
        .unwrap()
        .clone();

    match state {
        ListState::Error(message) => assert!(!message.is_empty()),
        other => panic!("expected Error, got {:?}", other),
    }
}

#[tokio::test]
async fn refresh_recovers_from_error_through_loading() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());
    api.fail_album_list(true);

    let machine = machine_over(api.clone());
    let mut rx = machine.subscribe();
    rx.wait_for(|s| matches!(s, ListState::Error(_)))
        .await
        .unwrap();

    api.fail_album_list(false);
    api.set_albums(vec![testing::album(1, "Buscando América")]);
    machine.refresh();

    // refresh publishes Loading synchronously, before the fetch runs
    assert_eq!(machine.current(), ListState::Loading);

    let state = rx
        .wait_for(|s| !matches!(s, ListState::Loading))
        .await
        .unwrap()
        .clone();
    match state {
        ListState::Success(albums) => assert_eq!(albums.len(), 1),
        other => panic!("expected Success after retry, got {:?}", other),
    }
}

#[tokio::test]
async fn refresh_from_success_refetches() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());
    api.set_albums(vec![testing::album(1, "Buscando América")]);

    let machine = machine_over(api.clone());
    let mut rx = machine.subscribe();
    rx.wait_for(|s| matches!(s, ListState::Success(_)))
        .await
        .unwrap();

    api.set_albums(vec![
        testing::album(1, "Buscando América"),
        testing::album(2, "Siembra"),
    ]);
    machine.refresh();

    let state = rx
        .wait_for(|s| matches!(s, ListState::Success(albums) if albums.len() == 2))
        .await
        .unwrap()
        .clone();
    assert!(matches!(state, ListState::Success(_)));
}
