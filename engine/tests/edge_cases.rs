//! Edge case tests for shelf-engine
//!
//! These tests cover the documented scenarios, boundary conditions and
//! unusual inputs.

use proptest::prelude::*;
use shelf_engine::{Error, Library, RecordKey, RestoreState, Snapshot};

fn create_test_library() -> Library {
    let mut library = Library::new();
    library.add_record("book", "Alice").unwrap();
    library.add_record("dvd", "Bob").unwrap();
    library.add_record("cd", "Carol").unwrap();
    library
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn delete_blocked_while_member() {
    let mut library = Library::new();
    assert_eq!(library.add_record("book", "Alice").unwrap().id(), 1);
    assert_eq!(library.add_record("dvd", "Bob").unwrap().id(), 2);

    library.add_collection("faves").unwrap();
    library.add_member("faves", 1u64).unwrap();

    assert_eq!(library.remove_record(1u64), Err(Error::RecordInUse(1)));

    library.remove_member("faves", 1u64).unwrap();
    library.remove_record(1u64).unwrap();
    assert!(library.find_by_id(1).is_none());
    assert_eq!(
        library.is_member("faves", 1u64),
        Err(Error::NoSuchRecord(RecordKey::Id(1)))
    );
}

#[test]
fn combine_collections_union() {
    let mut library = create_test_library();
    library.add_collection("faves").unwrap();
    library.add_member("faves", 1u64).unwrap();
    library.add_member("faves", 2u64).unwrap();
    library.add_collection("watchlist").unwrap();
    library.add_member("watchlist", 2u64).unwrap();
    library.add_member("watchlist", 3u64).unwrap();

    let merged = library
        .combine_collections("faves", "watchlist", "merged")
        .unwrap();
    assert_eq!(merged.len(), 3);

    for id in 1..=3u64 {
        assert!(library.is_member("merged", id).unwrap());
    }
    assert!(!library.is_member("faves", 3u64).unwrap());
    assert!(!library.is_member("watchlist", 1u64).unwrap());
    assert_eq!(library.collection("faves").unwrap().len(), 2);
    assert_eq!(library.collection("watchlist").unwrap().len(), 2);
}

#[test]
fn rename_then_lookup() {
    let mut library = create_test_library();
    library.rename_record(2u64, "Robert").unwrap();

    assert_eq!(library.find_by_title("Robert").unwrap().id(), 2);
    assert!(library.find_by_title("Bob").is_none());
    let record = library.find_by_id(2).unwrap();
    assert_eq!(record.title(), "Robert");
    assert_eq!(record.medium(), "dvd");
}

#[test]
fn census_across_catalog() {
    let mut library = create_test_library();
    library.add_collection("a").unwrap();
    library.add_collection("b").unwrap();
    library.add_member("a", 1u64).unwrap();
    library.add_member("a", 2u64).unwrap();
    library.add_member("b", 2u64).unwrap();

    let census = library.membership_census();
    assert_eq!(census.at_least_one, 2);
    assert_eq!(census.multiple, 1);
    assert_eq!(census.total_slots, 3);
}

// ============================================================================
// Restore Edge Cases
// ============================================================================

#[test]
fn failed_restore_leaves_live_state() {
    let mut library = create_test_library();
    library.add_collection("faves").unwrap();
    library.add_member("faves", 3u64).unwrap();

    let mut saved = Vec::new();
    library.save_text(&mut saved).unwrap();
    let counter_before = library.store().counter();

    // Valid records, then a trailing collection naming a missing title
    let text = "2\n10 book 0 X\n20 book 0 Y\n1\nbroken 2\nX\nNowhere\n";
    let result = library.restore_text(text.as_bytes());
    assert!(matches!(result, Err(Error::MalformedData(_))));
    assert_eq!(library.restore_state(), RestoreState::RolledBack);

    let mut after = Vec::new();
    library.save_text(&mut after).unwrap();
    assert_eq!(after, saved);
    assert_eq!(library.store().counter(), counter_before);
    assert!(library.find_by_title("X").is_none());
}

#[test]
fn restore_normalizes_counter_to_max_id() {
    let mut library = create_test_library();
    library.remove_record(3u64).unwrap();

    // ID 3 is gone, but the live counter still says 3
    assert_eq!(library.store().counter().last, 3);
    let text = library.snapshot().to_text();

    let mut restored = Library::new();
    restored.restore_text(text.as_bytes()).unwrap();
    assert_eq!(restored.store().counter().last, 2);
    assert_eq!(restored.add_record("book", "Dave").unwrap().id(), 3);
}

#[test]
fn add_after_restoring_highest_id() {
    let mut library = Library::new();
    library
        .restore_text("1\n18446744073709551615 book 0 Huge\n0\n".as_bytes())
        .unwrap();
    assert_eq!(library.store().counter().last, u64::MAX);

    assert_eq!(
        library.add_record("book", "Next").map(|r| r.id()),
        Err(Error::IdsExhausted)
    );
    assert!(library.find_by_title("Next").is_none());
    assert_eq!(library.store().len(), 1);
    assert!(library.store().indexes_consistent());

    // Still saveable and restorable as-is
    let text = library.snapshot().to_text();
    let mut restored = Library::new();
    restored.restore_text(text.as_bytes()).unwrap();
    assert_eq!(restored.snapshot(), library.snapshot());
}

#[test]
fn restore_out_of_order_records() {
    let text = "3\n9 book 2 Zed\n3 dvd 0 Amy\n5 cd 5 Max\n1\nall 3\nMax\nZed\nAmy\n";
    let mut library = Library::new();
    library.restore_text(text.as_bytes()).unwrap();

    let by_title: Vec<_> = library.store().iter_by_title().map(|r| r.id()).collect();
    assert_eq!(by_title, vec![3, 5, 9]);
    let by_id: Vec<_> = library.store().iter_by_id().map(|r| r.title()).collect();
    assert_eq!(by_id, vec!["Amy", "Max", "Zed"]);
    assert_eq!(library.collection("all").unwrap().len(), 3);
    assert_eq!(library.store().counter().last, 9);
}

#[test]
fn restore_truncated_file() {
    let mut library = create_test_library();
    let before = library.snapshot();

    let result = library.restore_text("5\n1 book 0 Only\n".as_bytes());
    assert!(matches!(result, Err(Error::MalformedData(_))));
    assert_eq!(library.snapshot(), before);
}

#[test]
fn restore_replaces_collections() {
    let mut library = create_test_library();
    library.add_collection("stale").unwrap();
    library.add_member("stale", 1u64).unwrap();

    let replacement = "1\n1 book 0 Alice\n1\nfresh 1\nAlice\n";
    library.restore_text(replacement.as_bytes()).unwrap();

    assert!(library.collection("stale").is_err());
    assert!(library.is_member("fresh", "Alice").unwrap());
    assert_eq!(library.store().len(), 1);
}

// ============================================================================
// String Edge Cases
// ============================================================================

#[test]
fn unicode_titles() {
    let mut library = Library::new();

    let titles = vec![
        "日本語のタイトル",
        "Привет мир",
        "مرحبا بالعالم",
        "🎉🚀💯",
        "Ω≈ç√∫",
    ];

    for title in &titles {
        let result = library.add_record("book", title);
        assert!(result.is_ok(), "Failed for: {}", title);
    }

    let text = library.snapshot().to_text();
    let mut restored = Library::new();
    restored.restore_text(text.as_bytes()).unwrap();
    for title in &titles {
        assert!(restored.find_by_title(title).is_some(), "Lost: {}", title);
    }
}

#[test]
fn very_long_title() {
    let mut library = Library::new();
    let long_title = "x".repeat(64 * 1024);

    library.add_record("book", &long_title).unwrap();
    let text = library.snapshot().to_text();

    let mut restored = Library::new();
    restored.restore_text(text.as_bytes()).unwrap();
    assert_eq!(restored.find_by_id(1).unwrap().title().len(), 64 * 1024);
}

#[test]
fn titles_differing_only_by_case_are_distinct() {
    let mut library = Library::new();
    library.add_record("book", "dune").unwrap();
    library.add_record("book", "Dune").unwrap();
    assert_eq!(library.store().len(), 2);
    assert_eq!(library.search_titles("DUNE").len(), 2);
}

// ============================================================================
// Round Trip
// ============================================================================

#[derive(Debug, Clone)]
enum Action {
    Add(u8, u8),
    Remove(u8),
    Rename(u8, u8),
    Rate(u8, i64),
    AddCollection(u8),
    AddMember(u8, u8),
    RemoveMember(u8, u8),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..3, 0u8..12).prop_map(|(m, n)| Action::Add(m, n)),
        (0u8..12).prop_map(Action::Remove),
        (0u8..12, 0u8..12).prop_map(|(a, b)| Action::Rename(a, b)),
        (0u8..12, 0i64..7).prop_map(|(a, r)| Action::Rate(a, r)),
        (0u8..4).prop_map(Action::AddCollection),
        (0u8..4, 0u8..12).prop_map(|(c, r)| Action::AddMember(c, r)),
        (0u8..4, 0u8..12).prop_map(|(c, r)| Action::RemoveMember(c, r)),
    ]
}

// Low numbers map to values the library must refuse.
fn title(n: u8) -> String {
    match n {
        0 => String::new(),
        1 => " Padded".to_string(),
        2 => "Trailing ".to_string(),
        3 => "Two\nLines".to_string(),
        _ => format!("Title  {}", n),
    }
}

fn medium(n: u8) -> &'static str {
    match n {
        0 => "audio book",
        1 => "dvd",
        _ => "book",
    }
}

fn name(n: u8) -> String {
    match n {
        0 => "my list".to_string(),
        _ => format!("c{}", n),
    }
}

fn apply(library: &mut Library, action: Action) {
    // Failures are expected here; every call must leave the library valid.
    let _ = match action {
        Action::Add(m, n) => library.add_record(medium(m), &title(n)).map(|_| ()),
        Action::Remove(n) => library.remove_record(title(n)).map(|_| ()),
        Action::Rename(a, b) => library.rename_record(title(a), &title(b)).map(|_| ()),
        Action::Rate(n, r) => library.rate(title(n), r).map(|_| ()),
        Action::AddCollection(c) => library.add_collection(&name(c)).map(|_| ()),
        Action::AddMember(c, n) => library.add_member(&name(c), title(n)).map(|_| ()),
        Action::RemoveMember(c, n) => library.remove_member(&name(c), title(n)).map(|_| ()),
    };
}

proptest! {
    #[test]
    fn save_restore_roundtrip(actions in prop::collection::vec(action(), 0..80)) {
        let mut library = Library::new();
        for action in actions {
            apply(&mut library, action);
            prop_assert!(library.store().indexes_consistent());
        }

        let mut saved = Vec::new();
        library.save_text(&mut saved).unwrap();

        let mut restored = Library::new();
        restored.restore_text(saved.as_slice()).unwrap();
        prop_assert_eq!(restored.snapshot(), library.snapshot());

        let json = library.save_json().unwrap();
        let mut from_json = Library::new();
        from_json.restore_json(&json).unwrap();
        prop_assert_eq!(from_json.snapshot(), library.snapshot());
    }

    #[test]
    fn removed_records_never_members(actions in prop::collection::vec(action(), 0..80)) {
        let mut library = Library::new();
        for action in actions {
            apply(&mut library, action);
        }

        // Any record referenced by a collection must still be live
        for collection in library.catalog().iter() {
            for handle in collection.members() {
                prop_assert!(library.store().contains(handle));
            }
        }
    }
}

#[test]
fn snapshot_text_parses_back() {
    let library = create_test_library();
    let snapshot = library.snapshot();
    assert_eq!(Snapshot::parse_text(&snapshot.to_text()).unwrap(), snapshot);
}
