use super::*;
use oneclick_protocols::{Credentials, DEFAULT_DIAL_PREFIX, SettingKey};
use tempfile::TempDir;

#[tokio::test]
async fn test_memory_store_apply_and_load() {
    let store = MemorySettingsStore::default();
    assert_eq!(store.load().await.unwrap().dial_prefix(), DEFAULT_DIAL_PREFIX);

    store
        .apply(SettingsPatch::new().credentials(&Credentials::new("sandbox", "101", "pw")))
        .await
        .unwrap();
    let settings = store.load().await.unwrap();
    assert_eq!(settings.credentials().unwrap().extension, "101");
}

#[tokio::test]
async fn test_memory_store_notifies_changed_keys() {
    let store = MemorySettingsStore::default();
    let mut changes = store.subscribe();

    store
        .apply(SettingsPatch::new().disabled_sites(vec!["example.com".to_string()]))
        .await
        .unwrap();

    let change = changes.recv().await.unwrap();
    assert_eq!(change.keys, vec![SettingKey::ClickToCallDisabledSites]);
    assert!(change.affects_click_to_call());
}

#[tokio::test]
async fn test_memory_store_no_notification_without_change() {
    let store = MemorySettingsStore::default();
    let mut changes = store.subscribe();

    store
        .apply(SettingsPatch::new().dial_prefix(DEFAULT_DIAL_PREFIX))
        .await
        .unwrap();
    assert!(changes.try_recv().is_err());
}

#[tokio::test]
async fn test_file_store_installs_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("settings.json");

    let store = FileSettingsStore::open(&path).await.unwrap();
    assert!(path.exists());

    let settings = store.load().await.unwrap();
    assert_eq!(settings.dial_prefix(), DEFAULT_DIAL_PREFIX);
    assert!(settings.use_sidebar);
    assert!(!settings.debug_logging);
}

#[tokio::test]
async fn test_file_store_keeps_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(&path, r#"{"dialPrefix": "9", "tenant": "sandbox"}"#).unwrap();

    let store = FileSettingsStore::open(&path).await.unwrap();
    let settings = store.load().await.unwrap();
    assert_eq!(settings.dial_prefix(), "9");
    assert_eq!(settings.tenant, "sandbox");
    assert!(settings.click_to_call_enabled);
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");

    {
        let store = FileSettingsStore::open(&path).await.unwrap();
        store
            .apply(SettingsPatch::new().logged_in(true).debug_logging(true))
            .await
            .unwrap();
    }

    let store = FileSettingsStore::open(&path).await.unwrap();
    let settings = store.load().await.unwrap();
    assert!(settings.is_logged_in);
    assert!(settings.debug_logging);
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_file_store_rereads_external_edits() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    let store = FileSettingsStore::open(&path).await.unwrap();

    std::fs::write(&path, r#"{"dialPrefix": ""}"#).unwrap();
    let settings = store.load().await.unwrap();
    assert_eq!(settings.dial_prefix, Some(String::new()));
}

#[tokio::test]
async fn test_file_store_notifies_subscribers() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSettingsStore::open(temp_dir.path().join("settings.json"))
        .await
        .unwrap();
    let mut changes = store.subscribe();

    store
        .apply(SettingsPatch::new().click_to_call_enabled(false))
        .await
        .unwrap();

    let change = changes.recv().await.unwrap();
    assert!(change.touches(SettingKey::ClickToCallEnabled));
}

#[tokio::test]
async fn test_file_store_corrupt_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = FileSettingsStore::open(&path).await.unwrap();
    assert!(matches!(
        store.load().await,
        Err(StoreError::Serialization(_))
    ));
}
