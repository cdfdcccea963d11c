//! `scan`: run the number detector over a saved HTML page.

use std::path::{Path, PathBuf};

use tracing::info;

use oneclick_config::{FileSettingsStore, HostConfig};
use oneclick_detect::{MutationWatcher, Page, click_to_call_enabled};
use oneclick_protocols::SettingsStore;

/// Rewrite `file` and print the resulting document.
///
/// Each `insert` fragment is appended to `<body>` after the initial pass, the
/// way content loaded later by a page script would be.
pub(crate) async fn run_scan(
    config: &HostConfig,
    file: &Path,
    host: Option<&str>,
    inserts: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    let html = tokio::fs::read_to_string(file).await?;
    let page = Page::parse_with_limit(&html, config.detect.max_pending_mutations)?;

    if let Some(hostname) = host {
        let settings = FileSettingsStore::open(config.storage.settings_path())
            .await?
            .load()
            .await?;
        if !click_to_call_enabled(&settings, hostname) {
            info!("Click-to-call disabled for {}, page left unchanged", hostname);
            println!("{}", page.to_html()?);
            return Ok(());
        }
    }

    let watcher = MutationWatcher::new();
    let initial = watcher.start(&page);
    info!("Initial scan of {:?}: {} numbers", file, initial);

    for fragment in inserts {
        let content = tokio::fs::read_to_string(fragment).await?;
        page.insert_html(page.body(), &content);
    }
    if !inserts.is_empty() {
        let report = watcher.process(&page);
        info!(
            "Inserted content: {} subtrees scanned, {} numbers",
            report.subtrees_scanned, report.spans_created
        );
    }
    watcher.stop(&page);

    println!("{}", page.to_html()?);
    Ok(())
}
