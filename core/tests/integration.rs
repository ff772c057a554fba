//! Drive a `TodoStore` against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port, seeds it, and lets the
//! harness execute every request the store dispatches over real HTTP. The
//! store's list is then compared with what the server actually holds.

mod common;

use common::{block_on, pump, seed, start_server};
use todo_store::{Command, ErrorKind, Filter, StoreConfig, TodoStore};

const USER: u64 = 2148;

fn store_for(base_url: &str) -> TodoStore {
    TodoStore::new(&StoreConfig::new(base_url, USER))
}

fn titles(store: &TodoStore) -> Vec<String> {
    store.todos().iter().map(|todo| todo.title.clone()).collect()
}

#[test]
fn session_lifecycle() {
    let (base_url, db) = start_server();
    seed(&db, USER, "existing", false);
    seed(&db, 1, "not mine", false);

    let mut store = store_for(&base_url);

    // Step 1: initial load only sees this owner's items.
    store.load();
    let observed = pump(&mut store);
    assert_eq!(titles(&store), vec!["existing"]);
    assert!(observed.contains(&Command::FocusInput));

    // Step 2: create two todos; titles are normalized before sending.
    for raw in ["  buy   milk ", "walk dog"] {
        store.set_draft(raw);
        store.submit_draft();
        assert!(store.placeholder().is_some());
        pump(&mut store);
        assert!(store.placeholder().is_none());
        assert_eq!(store.draft(), "");
    }
    assert_eq!(titles(&store), vec!["existing", "buy milk", "walk dog"]);
    assert!(store.todos().iter().all(|todo| todo.id != 0));

    // Step 3: complete one.
    let milk = store.todos()[1].id;
    store.toggle(milk, true);
    assert!(store.is_pending(milk));
    pump(&mut store);
    assert!(!store.is_pending(milk));
    assert!(store.todos()[1].completed);

    // Step 4: rename through edit mode.
    let dog = store.todos()[2].id;
    store.start_edit(dog);
    store.set_edit_draft("walk  the dog");
    store.submit_edit();
    pump(&mut store);
    assert!(store.editing().is_none());
    assert_eq!(store.todos()[2].title, "walk the dog");

    // Step 5: filters are views over the same list.
    store.set_filter(Filter::Completed);
    assert_eq!(store.visible().len(), 1);
    store.set_filter(Filter::Active);
    assert_eq!(store.visible().len(), 2);
    assert_eq!(store.active_count(), 2);

    // Step 6: toggle all completes the remaining two.
    store.toggle_all();
    pump(&mut store);
    assert!(store.all_completed());

    // Step 7: clear completed empties the list.
    store.clear_completed();
    let observed = pump(&mut store);
    assert!(store.todos().is_empty());
    assert!(observed.contains(&Command::FocusInput));
    assert_eq!(store.error(), None);

    // The server agrees; the other owner's item is untouched.
    let remaining = block_on(db.snapshot());
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, 1);
}

#[test]
fn clear_completed_with_partial_failure() {
    let (base_url, db) = start_server();
    seed(&db, USER, "a", false);
    let b = seed(&db, USER, "b", true);
    let c = seed(&db, USER, "c", true);
    seed(&db, USER, "d", false);
    let e = seed(&db, USER, "e", true);
    db.fail_id(b.id);
    db.fail_id(e.id);

    let mut store = store_for(&base_url);
    store.load();
    pump(&mut store);

    store.clear_completed();
    assert_eq!(store.pending().ids(), vec![b.id, c.id, e.id]);
    pump(&mut store);

    assert_eq!(titles(&store), vec!["a", "b", "d", "e"]);
    assert!(store.pending().is_empty());
    assert_eq!(store.error(), Some(ErrorKind::Delete));

    let server_ids: Vec<u64> = block_on(db.snapshot()).iter().map(|todo| todo.id).collect();
    let store_ids: Vec<u64> = store.todos().iter().map(|todo| todo.id).collect();
    assert_eq!(server_ids, store_ids);
}

#[test]
fn load_failure_surfaces_error() {
    let (base_url, db) = start_server();
    seed(&db, USER, "hidden", false);
    db.fail_list(true);

    let mut store = store_for(&base_url);
    store.load();
    let observed = pump(&mut store);

    assert!(store.todos().is_empty());
    assert_eq!(store.error(), Some(ErrorKind::Load));
    assert!(observed
        .iter()
        .any(|command| matches!(command, Command::ScheduleErrorClear { .. })));
    assert!(!observed.contains(&Command::FocusInput));
}

#[test]
fn create_failure_leaves_list_unchanged() {
    let (base_url, db) = start_server();
    seed(&db, USER, "kept", false);

    let mut store = store_for(&base_url);
    store.load();
    pump(&mut store);

    db.fail_create(true);
    store.set_draft("doomed");
    store.submit_draft();
    pump(&mut store);

    assert_eq!(titles(&store), vec!["kept"]);
    assert!(store.placeholder().is_none());
    assert_eq!(store.draft(), "doomed");
    assert_eq!(store.error(), Some(ErrorKind::Add));
}

#[test]
fn failed_rename_keeps_edit_open_for_retry() {
    let (base_url, db) = start_server();
    let item = seed(&db, USER, "original", false);
    db.fail_id(item.id);

    let mut store = store_for(&base_url);
    store.load();
    pump(&mut store);

    store.start_edit(item.id);
    store.set_edit_draft("renamed");
    store.submit_edit();
    pump(&mut store);

    assert_eq!(store.error(), Some(ErrorKind::Update));
    assert_eq!(titles(&store), vec!["original"]);
    let edit = store.editing().unwrap();
    assert_eq!(edit.draft, "renamed");
}

#[test]
fn unreachable_server_maps_to_error_kind() {
    // Bind then drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut store = store_for(&format!("http://{addr}"));
    store.load();
    pump(&mut store);
    assert_eq!(store.error(), Some(ErrorKind::Load));
}
