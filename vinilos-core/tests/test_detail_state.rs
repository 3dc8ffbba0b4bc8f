//! Behavior of the detail-screen state machine, including the
//! stale-response guard.

use std::sync::Arc;
use std::time::Duration;

use vinilos_core::domain::Album;
use vinilos_core::repository::AlbumRepository;
use vinilos_core::state::{DetailState, DetailStateMachine};
use vinilos_core::testing::{self, ScriptedApi};

fn tracing_init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true)
        .try_init();
}

fn machine_over(api: Arc<ScriptedApi>) -> DetailStateMachine<Album> {
    let repo = AlbumRepository::new(api, None);
    DetailStateMachine::new(Arc::new(repo))
}

#[tokio::test]
async fn load_lands_in_success_for_existing_id() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());
    api.set_albums(vec![testing::album(5, "Siembra")]);

    let machine = machine_over(api);
    machine.load(5);

    let mut rx = machine.subscribe();
    let state = rx
        .wait_for(|s| !matches!(s, DetailState::Loading))
        .await
        .unwrap()
        .clone();
    match state {
        DetailState::Success(album) => assert_eq!(album.id, 5),
        other => panic!("expected Success, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_id_lands_in_error() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());

    let machine = machine_over(api);
    machine.load(99);

    let mut rx = machine.subscribe();
    let state = rx
        .wait_for(|s| !matches!(s, DetailState::Loading))
        .await
        .unwrap()
        .clone();
    assert!(matches!(state, DetailState::Error(_)));
}

#[tokio::test]
async fn repeat_load_of_same_id_passes_through_loading_again() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());
    api.set_albums(vec![testing::album(5, "Siembra")]);

    let machine = machine_over(api);
    machine.load(5);
    let mut rx = machine.subscribe();
    rx.wait_for(|s| matches!(s, DetailState::Success(_)))
        .await
        .unwrap();

    machine.load(5);
    assert_eq!(machine.current(), DetailState::Loading);

    let state = rx
        .wait_for(|s| !matches!(s, DetailState::Loading))
        .await
        .unwrap()
        .clone();
    match state {
        DetailState::Success(album) => assert_eq!(album.id, 5),
        other => panic!("expected Success after re-load, got {:?}", other),
    }
}

#[tokio::test]
async fn retry_repeats_the_last_requested_id() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());
    api.set_albums(vec![testing::album(7, "Lo Mato")]);
    api.fail_album(7);

    let machine = machine_over(api.clone());
    machine.load(7);
    let mut rx = machine.subscribe();
    rx.wait_for(|s| matches!(s, DetailState::Error(_)))
        .await
        .unwrap();

    api.clear_album_failures();
    machine.retry();

    let state = rx
        .wait_for(|s| !matches!(s, DetailState::Loading))
        .await
        .unwrap()
        .clone();
    match state {
        DetailState::Success(album) => assert_eq!(album.id, 7),
        other => panic!("expected Success after retry, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn slow_response_for_previous_id_cannot_overwrite_newer_load() {
    tracing_init();
    let api = Arc::new(ScriptedApi::new());
    api.set_albums(vec![testing::album(1, "Old"), testing::album(2, "New")]);
    api.delay_album(1, Duration::from_millis(500));

    let machine = machine_over(api);
    machine.load(1);
    machine.load(2);

    let mut rx = machine.subscribe();
    rx.wait_for(|s| matches!(s, DetailState::Success(album) if album.id == 2))
        .await
        .unwrap();

    // let the delayed response for id 1 arrive; it must be dropped
    tokio::time::sleep(Duration::from_millis(600)).await;
    match machine.current() {
        DetailState::Success(album) => assert_eq!(album.id, 2),
        other => panic!("expected Success(2) to stick, got {:?}", other),
    }
}
