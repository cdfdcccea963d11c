use super::*;
use tempfile::TempDir;

fn at(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_740_830_400_000 + ms).unwrap()
}

#[tokio::test]
async fn test_append_and_list_oldest_first() {
    let store = MemoryHistoryStore::new();
    store.append(CallHistoryEntry::at("7169234121", at(0))).await.unwrap();
    store.append(CallHistoryEntry::at("8005551212", at(10))).await.unwrap();

    let entries = store.list().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].phone_number, "7169234121");
    assert_eq!(entries[1].phone_number, "8005551212");
}

#[tokio::test]
async fn test_timestamps_made_unique() {
    let store = MemoryHistoryStore::new();
    let first = store.append(CallHistoryEntry::at("7169234121", at(5))).await.unwrap();
    let second = store.append(CallHistoryEntry::at("7169234121", at(5))).await.unwrap();
    let third = store.append(CallHistoryEntry::at("7169234121", at(0))).await.unwrap();

    assert_eq!(first.timestamp, at(5));
    assert_eq!(second.timestamp, at(6));
    assert_eq!(third.timestamp, at(7));
}

#[tokio::test]
async fn test_501st_append_evicts_oldest() {
    let store = MemoryHistoryStore::new();
    for i in 0..MAX_HISTORY_ENTRIES as i64 {
        store
            .append(CallHistoryEntry::at(format!("716923{:04}", i), at(i)))
            .await
            .unwrap();
    }
    assert_eq!(store.list().await.unwrap().len(), 500);

    store
        .append(CallHistoryEntry::at("8005551212", at(1_000)))
        .await
        .unwrap();

    let entries = store.list().await.unwrap();
    assert_eq!(entries.len(), 500);
    assert_eq!(entries[0].phone_number, "7169230001");
    assert_eq!(entries[499].phone_number, "8005551212");
    assert!(entries.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[tokio::test]
async fn test_note_update_round_trip() {
    let store = MemoryHistoryStore::new();
    let stored = store
        .append(CallHistoryEntry::at("7169234121", at(0)).with_note("first"))
        .await
        .unwrap();

    let updated = store
        .update_note(&stored.phone_number, &stored.timestamp, "second")
        .await
        .unwrap();
    assert!(updated);

    let entries = store.list().await.unwrap();
    assert_eq!(entries[0].note, "second");
    assert_eq!(entries[0].phone_number, stored.phone_number);
    assert_eq!(entries[0].timestamp, stored.timestamp);
}

#[tokio::test]
async fn test_note_update_unknown_key() {
    let store = MemoryHistoryStore::new();
    store.append(CallHistoryEntry::at("7169234121", at(0))).await.unwrap();

    assert!(!store.update_note("7169234121", &at(1), "x").await.unwrap());
    assert!(!store.update_note("8005551212", &at(0), "x").await.unwrap());
}

#[tokio::test]
async fn test_clear() {
    let store = MemoryHistoryStore::new();
    store.append(CallHistoryEntry::new("7169234121")).await.unwrap();
    store.clear().await.unwrap();
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_store_persists() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");

    let stored = {
        let store = FileHistoryStore::open(&path).await.unwrap();
        let stored = store.append(CallHistoryEntry::at("7169234121", at(0))).await.unwrap();
        store
            .update_note(&stored.phone_number, &stored.timestamp, "call back Tuesday")
            .await
            .unwrap();
        stored
    };

    let store = FileHistoryStore::open(&path).await.unwrap();
    let entries = store.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].timestamp, stored.timestamp);
    assert_eq!(entries[0].note, "call back Tuesday");
}

#[tokio::test]
async fn test_file_store_open_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileHistoryStore::open(temp_dir.path().join("history.json"))
        .await
        .unwrap();
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_store_sorts_and_caps_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");
    let mut entries: Vec<_> = (0..510)
        .map(|i| CallHistoryEntry::at("7169234121", at(i)))
        .collect();
    entries.reverse();
    std::fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();

    let store = FileHistoryStore::open(&path).await.unwrap();
    let loaded = store.list().await.unwrap();
    assert_eq!(loaded.len(), 500);
    assert_eq!(loaded[0].timestamp, at(10));
    assert_eq!(loaded[499].timestamp, at(509));
}

#[tokio::test]
async fn test_file_store_clear_persists() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");
    let store = FileHistoryStore::open(&path).await.unwrap();
    store.append(CallHistoryEntry::new("7169234121")).await.unwrap();
    store.clear().await.unwrap();

    let reopened = FileHistoryStore::open(&path).await.unwrap();
    assert!(reopened.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_store_failed_write_leaves_entries_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");
    let store = FileHistoryStore::open(&path).await.unwrap();
    let stored = store
        .append(CallHistoryEntry::at("7169234121", at(0)).with_note("first"))
        .await
        .unwrap();

    // A directory where the temporary file goes makes every save fail.
    std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

    assert!(store.append(CallHistoryEntry::at("7169234122", at(1))).await.is_err());
    assert!(
        store
            .update_note(&stored.phone_number, &stored.timestamp, "second")
            .await
            .is_err()
    );
    assert!(store.clear().await.is_err());

    let entries = store.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].phone_number, "7169234121");
    assert_eq!(entries[0].note, "first");
}
