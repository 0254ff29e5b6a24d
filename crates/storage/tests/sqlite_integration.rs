use hack_core::Catalog;
use hack_core::model::Score;
use hack_core::time::fixed_now;
use storage::repository::{BlobRepository, Storage};
use storage::snapshot::{PROGRESS_KEY, ProgressSnapshot};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_upserts_and_removes_values() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.read("missing").await.unwrap(), None);

    repo.write("k", "first").await.unwrap();
    repo.write("k", "second").await.unwrap();
    assert_eq!(repo.read("k").await.unwrap().as_deref(), Some("second"));

    repo.remove("k").await.unwrap();
    repo.remove("k").await.unwrap();
    assert_eq!(repo.read("k").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.write("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.read("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn progress_snapshot_survives_sqlite_round_trip() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_snapshot?mode=memory&cache=shared")
        .await
        .expect("storage");

    let mut state = Catalog::builtin().unwrap().initial_state();
    state
        .complete_module("html", "html-1", Score::new(100).unwrap())
        .unwrap();
    state.unlock_course("java").unwrap();

    let raw = ProgressSnapshot::from_state(&state, fixed_now())
        .to_json()
        .unwrap();
    storage.blobs.write(PROGRESS_KEY, &raw).await.unwrap();

    let stored = storage.blobs.read(PROGRESS_KEY).await.unwrap().unwrap();
    let snapshot = ProgressSnapshot::from_json(&stored).unwrap();
    assert_eq!(snapshot.last_saved, fixed_now());
    let restored = snapshot.into_state().unwrap();
    assert_eq!(restored, state);
    assert_eq!(restored.diamonds(), 0);
    assert!(restored.is_unlocked("java"));
}
