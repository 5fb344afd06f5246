//! Integration tests for the task store over the JSON file backend.
//!
//! Every test works on a document in its own temporary directory and
//! checks both what the store returns and what ends up on disk.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use taskboard::{Error, JsonFileBackend, TaskId, TaskStore};
use tempfile::TempDir;

fn tasks_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("tasks.json")
}

fn open(path: &Path) -> TaskStore {
    TaskStore::open(JsonFileBackend::new(path)).expect("open store")
}

fn read_document(path: &Path) -> Value {
    let raw = std::fs::read_to_string(path).expect("read document");
    serde_json::from_str(&raw).expect("document is valid JSON")
}

#[test]
fn test_open_creates_empty_document() {
    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);

    let store = open(&path);

    assert!(store.is_empty().unwrap());
    assert!(path.exists());
    let doc = read_document(&path);
    assert_eq!(doc["tasks"], Value::Array(Vec::new()));
}

#[test]
fn test_milk_and_dog_scenario() {
    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);
    let store = open(&path);

    let (milk, meta) = store.add("Buy milk").unwrap();
    assert_eq!(meta.count, 1);
    assert!(!milk.completed);
    assert_eq!(milk.created_at, milk.updated_at);

    let (dog, meta) = store.add("Walk dog").unwrap();
    assert_eq!(meta.count, 2);
    assert_ne!(milk.id, dog.id);

    let titles: Vec<String> = store.list().unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Buy milk", "Walk dog"]);

    let (done, meta) = store.set_completed(&milk.id, true).unwrap();
    assert!(done.completed);
    assert!(done.updated_at > done.created_at);
    assert_eq!(meta.count, 2);

    let meta = store.delete(&dog.id).unwrap();
    assert_eq!(meta.count, 1);

    let remaining = store.list().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, milk.id);
    assert!(remaining[0].completed);

    let doc = read_document(&path);
    let tasks = doc["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], milk.id.as_str());
    assert_eq!(tasks[0]["completed"], true);
    assert!(doc["saved_at"].is_string());
}

#[test]
fn test_reopen_reproduces_index() {
    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);

    let before = {
        let store = open(&path);
        let (first, _) = store.add("First task").unwrap();
        store.add("Second task").unwrap();
        store.add("Third task").unwrap();
        store.set_completed(&first.id, true).unwrap();
        store.list().unwrap()
    };

    let reopened = open(&path);
    assert_eq!(reopened.list().unwrap(), before);
}

#[test]
fn test_complete_twice_keeps_flag_and_advances_timestamp() {
    let dir = TempDir::new().unwrap();
    let store = open(&tasks_path(&dir));
    let (task, _) = store.add("Idempotent").unwrap();

    let (once, _) = store.set_completed(&task.id, true).unwrap();
    let (twice, _) = store.set_completed(&task.id, true).unwrap();

    assert!(once.completed);
    assert!(twice.completed);
    assert!(twice.updated_at > once.updated_at);
    assert_eq!(twice.created_at, task.created_at);
}

#[test]
fn test_unknown_id_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);
    let store = open(&path);
    store.add("Keep me").unwrap();
    let before = std::fs::read(&path).unwrap();

    let missing = TaskId::new("does-not-exist");
    assert!(matches!(store.delete(&missing), Err(Error::NotFound(_))));
    assert!(matches!(
        store.set_completed(&missing, true),
        Err(Error::NotFound(_))
    ));

    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_corrupt_document_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{\"tasks\": [").unwrap();

    let err = TaskStore::open(JsonFileBackend::new(&path)).unwrap_err();
    assert!(matches!(err, Error::LoadFailed { .. }));
    // The corrupt file is left for inspection.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"tasks\": [");
}

#[test]
fn test_empty_file_opens_as_empty_store() {
    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "  \n").unwrap();

    let store = open(&path);
    assert!(store.is_empty().unwrap());

    store.add("After empty").unwrap();
    assert_eq!(read_document(&path)["tasks"].as_array().unwrap().len(), 1);
}

#[test]
fn test_legacy_document_loads() {
    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{
  "tasks": [
    {
      "id": "legacy-1",
      "title": "Written by an older release",
      "created_at": "2024-05-01T10:00:00.123456",
      "updated_at": "2024-05-01T10:00:00.123456"
    }
  ]
}"#,
    )
    .unwrap();

    let store = open(&path);
    let task = store.get(&TaskId::new("legacy-1")).unwrap().unwrap();
    assert!(!task.completed);
    assert_eq!(
        task.created_at.to_rfc3339(),
        "2024-05-01T10:00:00.123456+00:00"
    );

    // Saving rewrites timestamps with an explicit UTC marker.
    store.set_completed(&task.id, true).unwrap();
    let doc = read_document(&path);
    assert_eq!(doc["tasks"][0]["created_at"], "2024-05-01T10:00:00.123456Z");
}

#[test]
fn test_concurrent_adds_are_all_persisted() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 10;

    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);
    let store = Arc::new(open(&path));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..PER_THREAD {
                    store.add(&format!("Task {t}-{i}")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), THREADS * PER_THREAD);

    let doc = read_document(&path);
    assert_eq!(doc["tasks"].as_array().unwrap().len(), THREADS * PER_THREAD);

    let reopened = open(&path);
    assert_eq!(reopened.list().unwrap(), store.list().unwrap());
}

#[test]
fn test_concurrent_mixed_mutations_match_document() {
    const SEEDED: usize = 24;
    const DELETERS: usize = 3;
    const TOGGLERS: usize = 3;
    const READERS: usize = 2;

    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);
    let store = Arc::new(open(&path));

    let ids: Arc<Vec<TaskId>> = Arc::new(
        (0..SEEDED)
            .map(|i| store.add(&format!("Seeded {i}")).unwrap().0.id)
            .collect(),
    );
    // Every third id is contested by all deleters; the rest are only toggled.
    let doomed: Vec<usize> = (0..SEEDED).step_by(3).collect();
    let deleted: Arc<Vec<AtomicUsize>> =
        Arc::new((0..SEEDED).map(|_| AtomicUsize::new(0)).collect());
    let missed: Arc<Vec<AtomicUsize>> =
        Arc::new((0..SEEDED).map(|_| AtomicUsize::new(0)).collect());

    let mut handles = Vec::new();
    for _ in 0..DELETERS {
        let store = Arc::clone(&store);
        let ids = Arc::clone(&ids);
        let doomed = doomed.clone();
        let deleted = Arc::clone(&deleted);
        let missed = Arc::clone(&missed);
        handles.push(std::thread::spawn(move || {
            for &i in &doomed {
                match store.delete(&ids[i]) {
                    Ok(_) => deleted[i].fetch_add(1, Ordering::SeqCst),
                    Err(Error::NotFound(_)) => missed[i].fetch_add(1, Ordering::SeqCst),
                    Err(e) => panic!("unexpected delete error: {e}"),
                };
            }
        }));
    }
    for t in 0..TOGGLERS {
        let store = Arc::clone(&store);
        let ids = Arc::clone(&ids);
        handles.push(std::thread::spawn(move || {
            for round in 0..4 {
                for (i, id) in ids.iter().enumerate() {
                    match store.set_completed(id, (i + round + t) % 2 == 0) {
                        Ok((task, _)) => assert!(task.updated_at > task.created_at),
                        Err(Error::NotFound(_)) => assert_eq!(i % 3, 0),
                        Err(e) => panic!("unexpected toggle error: {e}"),
                    }
                }
            }
        }));
    }
    for _ in 0..READERS {
        let store = Arc::clone(&store);
        handles.push(std::thread::spawn(move || {
            for _ in 0..50 {
                let tasks = store.list().unwrap();
                let unique: HashSet<_> = tasks.iter().map(|task| &task.id).collect();
                assert_eq!(unique.len(), tasks.len());
                for pair in tasks.windows(2) {
                    assert!(pair[0].created_at <= pair[1].created_at);
                }
                for task in &tasks {
                    assert!(task.updated_at >= task.created_at);
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    for &i in &doomed {
        assert_eq!(deleted[i].load(Ordering::SeqCst), 1, "id {i} deleted once");
        assert_eq!(missed[i].load(Ordering::SeqCst), DELETERS - 1);
    }

    let remaining = store.list().unwrap();
    assert_eq!(remaining.len(), SEEDED - doomed.len());
    assert!(remaining.iter().all(|task| !doomed.iter().any(|&i| ids[i] == task.id)));

    let doc = read_document(&path);
    assert_eq!(doc["tasks"].as_array().unwrap().len(), remaining.len());

    let reopened = open(&path);
    assert_eq!(reopened.list().unwrap(), remaining);
}

#[test]
fn test_no_temp_file_left_behind() {
    let dir = TempDir::new().unwrap();
    let path = tasks_path(&dir);
    let store = open(&path);
    store.add("Atomic").unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name != "tasks.json")
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}
