/// Integration tests for the FocusFlow lifecycle
///
/// Drives the full install, status, and uninstall flows against a real
/// SQLite database and a staged bundle in a temp directory, covering:
/// - fresh install and post-install health
/// - double-install rejection with no side effects
/// - uninstall gating and record cleanup
/// - saga rollback when a late install step fails
use focusflow_lifecycle::db::Database;
use focusflow_lifecycle::installer::{
    delete_plugin, get_plugin_status, install_plugin, metadata, Installer,
};
use sdk::errors::LifecycleError;
use sdk::lifecycle::PluginLifecycle;
use sdk::page::PageContent;
use sdk::reports::InstallStatus;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Lay out a minimal valid bundle in `dir`
fn write_bundle(dir: &Path) {
    std::fs::write(
        dir.join("package.json"),
        r#"{"name": "focusflow", "version": "1.2.0"}"#,
    )
    .unwrap();
    std::fs::create_dir_all(dir.join("dist")).unwrap();
    std::fs::write(dir.join("dist/remoteEntry.js"), "export default {};").unwrap();
}

struct Harness {
    root: TempDir,
    db: Database,
    base: PathBuf,
    source: PathBuf,
}

impl Harness {
    async fn new() -> Self {
        let root = TempDir::new().unwrap();
        let db = Database::new(&root.path().join("focusflow.db"))
            .await
            .unwrap();
        let base = root.path().join("plugins");
        let source = root.path().join("bundle");
        std::fs::create_dir_all(&source).unwrap();
        write_bundle(&source);

        Self {
            db,
            base,
            source,
            root,
        }
    }

    fn installer(&self) -> Installer {
        Installer::new(self.db.pool().clone(), Some(&self.base))
            .with_source_dir(self.source.clone())
    }

    fn shared_dir(&self) -> PathBuf {
        self.base.join("shared/FocusFlow/v1.2.0")
    }

    async fn plugin_rows(&self, user_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM plugin WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }

    async fn module_rows(&self, user_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM module WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }

    async fn page_rows(&self, user_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM pages WHERE creator_id = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_install_creates_records_page_and_files() {
    let h = Harness::new().await;

    let report = h.installer().install_for_user("user-1").await.unwrap();

    assert!(report.success);
    assert_eq!(report.plugin_id.as_deref(), Some("user-1_FocusFlow"));
    assert_eq!(
        report.modules_created,
        vec!["user-1_FocusFlow_FocusFlow".to_string()]
    );
    assert!(report.page_created);
    assert!(report.page_id.is_some());
    assert_eq!(report.files_copied, 2);

    // Bundle staged under <base>/shared/<slug>/v<version>
    assert!(h.shared_dir().join("package.json").is_file());
    assert!(h.shared_dir().join("dist/remoteEntry.js").is_file());

    assert_eq!(h.plugin_rows("user-1").await, 1);
    assert_eq!(h.module_rows("user-1").await, 1);
    assert_eq!(h.page_rows("user-1").await, 1);
}

#[tokio::test]
async fn test_status_healthy_after_install() {
    let h = Harness::new().await;
    h.installer().install_for_user("user-1").await.unwrap();

    let status = get_plugin_status("user-1", h.db.pool(), Some(&h.base)).await;

    assert!(status.exists);
    assert_eq!(status.status, InstallStatus::Healthy);
    assert_eq!(status.plugin_id.as_deref(), Some("user-1_FocusFlow"));

    let plugin = status.plugin.unwrap();
    assert_eq!(plugin.name, "FocusFlow");
    assert_eq!(plugin.version, "1.2.0");
    assert!(plugin.enabled);
    assert!(!plugin.created_at.is_empty());

    let health = status.health.unwrap();
    assert!(health.bundle_exists);
    assert!(health.bundle_size > 0);
    assert!(health.manifest_valid);
    assert_eq!(health.bundle_digest.unwrap().len(), 64);
}

#[tokio::test]
async fn test_double_install_rejected_without_changes() {
    let h = Harness::new().await;
    let first = h.installer().install_for_user("user-1").await.unwrap();
    assert!(first.success);

    // The gate reads the plugin table, so even a fresh process (here: the
    // free function, which knows nothing about the first installer) refuses
    let second = install_plugin("user-1", h.db.pool(), Some(&h.base)).await;

    assert!(!second.success);
    assert_eq!(second.plugin_id.as_deref(), Some("user-1_FocusFlow"));
    assert!(second.error.unwrap().contains("already installed"));

    assert_eq!(h.plugin_rows("user-1").await, 1);
    assert_eq!(h.module_rows("user-1").await, 1);
    assert_eq!(h.page_rows("user-1").await, 1);
}

#[tokio::test]
async fn test_uninstall_without_install_reports_not_found() {
    let h = Harness::new().await;

    let report = delete_plugin("user-1", h.db.pool(), Some(&h.base)).await;

    assert!(!report.success);
    assert!(report.error.unwrap().contains("not installed"));
    assert!(report.plugin_id.is_none());
    assert_eq!(report.modules_deleted, 0);
    assert!(!report.page_deleted);
}

#[tokio::test]
async fn test_uninstall_removes_page_then_records() {
    let h = Harness::new().await;
    h.installer().install_for_user("user-1").await.unwrap();

    let report = delete_plugin("user-1", h.db.pool(), Some(&h.base)).await;

    assert!(report.success);
    assert_eq!(report.plugin_id.as_deref(), Some("user-1_FocusFlow"));
    assert_eq!(report.modules_deleted, 1);
    assert!(report.page_deleted);

    assert_eq!(h.plugin_rows("user-1").await, 0);
    assert_eq!(h.module_rows("user-1").await, 0);
    assert_eq!(h.page_rows("user-1").await, 0);

    // Shared files survive: the staged version is not per-user
    assert!(h.shared_dir().join("package.json").is_file());

    let status = get_plugin_status("user-1", h.db.pool(), Some(&h.base)).await;
    assert!(!status.exists);
    assert_eq!(status.status, InstallStatus::NotInstalled);
}

#[tokio::test]
async fn test_reinstall_after_uninstall() {
    let h = Harness::new().await;
    h.installer().install_for_user("user-1").await.unwrap();

    let removed = delete_plugin("user-1", h.db.pool(), Some(&h.base)).await;
    assert!(removed.success);

    let again = h.installer().install_for_user("user-1").await.unwrap();

    assert!(again.success);
    assert!(again.page_created);
    assert_eq!(h.plugin_rows("user-1").await, 1);
}

#[tokio::test]
async fn test_page_failure_rolls_back_whole_install() {
    let h = Harness::new().await;

    // Break page creation only; bundle staging and record insertion still work
    sqlx::query("DROP TABLE pages")
        .execute(h.db.pool())
        .await
        .unwrap();

    let err = h.installer().install_for_user("user-1").await.unwrap_err();
    assert!(matches!(err, LifecycleError::Database(_)));

    // The saga unwound the committed records and the staged files
    assert_eq!(h.plugin_rows("user-1").await, 0);
    assert_eq!(h.module_rows("user-1").await, 0);
    assert!(!h.shared_dir().exists());

    let status = get_plugin_status("user-1", h.db.pool(), Some(&h.base)).await;
    assert!(!status.exists);
    assert_eq!(status.status, InstallStatus::NotInstalled);
}

#[tokio::test]
async fn test_copy_failure_leaves_no_records() {
    let h = Harness::new().await;
    let installer = Installer::new(h.db.pool().clone(), Some(&h.base))
        .with_source_dir(h.root.path().join("missing"));

    let err = installer.install_for_user("user-1").await.unwrap_err();

    assert!(matches!(err, LifecycleError::Copy(_)));
    assert_eq!(h.plugin_rows("user-1").await, 0);
    assert_eq!(h.page_rows("user-1").await, 0);
}

#[tokio::test]
async fn test_existing_page_on_route_is_reused() {
    let h = Harness::new().await;

    // The user already has a page on the route, made by hand in the host
    let existing = h
        .db
        .pages()
        .insert_page(
            "user-1",
            "My own focus page",
            metadata::PAGE_ROUTE,
            &PageContent::default(),
        )
        .await
        .unwrap();

    let report = h.installer().install_for_user("user-1").await.unwrap();

    assert!(report.success);
    assert!(!report.page_created);
    assert_eq!(report.page_id.as_deref(), Some(existing.as_str()));
    assert_eq!(h.page_rows("user-1").await, 1);
}

#[tokio::test]
async fn test_users_install_independently() {
    let h = Harness::new().await;

    let a = h.installer().install_for_user("user-a").await.unwrap();
    let b = h.installer().install_for_user("user-b").await.unwrap();

    assert_eq!(a.plugin_id.as_deref(), Some("user-a_FocusFlow"));
    assert_eq!(b.plugin_id.as_deref(), Some("user-b_FocusFlow"));
    assert!(b.page_created);

    // Removing one user's installation leaves the other healthy
    let removed = delete_plugin("user-a", h.db.pool(), Some(&h.base)).await;
    assert!(removed.success);

    let status_b = get_plugin_status("user-b", h.db.pool(), Some(&h.base)).await;
    assert_eq!(status_b.status, InstallStatus::Healthy);
    assert_eq!(h.plugin_rows("user-a").await, 0);
    assert_eq!(h.plugin_rows("user-b").await, 1);
}

#[tokio::test]
async fn test_status_unhealthy_when_entry_point_missing() {
    let h = Harness::new().await;
    h.installer().install_for_user("user-1").await.unwrap();

    std::fs::remove_file(h.shared_dir().join("dist/remoteEntry.js")).unwrap();

    let status = get_plugin_status("user-1", h.db.pool(), Some(&h.base)).await;

    assert!(status.exists);
    assert_eq!(status.status, InstallStatus::Unhealthy);

    let health = status.health.unwrap();
    assert!(!health.bundle_exists);
    assert!(health.manifest_valid);
    assert!(health.bundle_digest.is_none());
}

#[tokio::test]
async fn test_generated_page_content_round_trips() {
    let h = Harness::new().await;
    h.installer().install_for_user("user-1").await.unwrap();

    let (content_json, is_published): (String, bool) = sqlx::query_as(
        "SELECT content, is_published FROM pages WHERE creator_id = ? AND route = ?",
    )
    .bind("user-1")
    .bind(metadata::PAGE_ROUTE)
    .fetch_one(h.db.pool())
    .await
    .unwrap();

    assert!(is_published);

    let content = PageContent::from_json(&content_json).unwrap();
    assert_eq!(content.layouts.desktop.len(), 1);
    assert_eq!(content.layouts.tablet.len(), 1);
    assert_eq!(content.layouts.mobile.len(), 1);

    let cell = &content.layouts.desktop[0];
    assert_eq!(cell.plugin_id, "user-1_FocusFlow");
    assert_eq!(cell.args.module_id, "user-1_FocusFlow_FocusFlow");
    assert_eq!(cell.args.display_name, "Focus Session Coach");
    assert_eq!((cell.w, cell.h), (12, 10));
    assert_eq!(
        (content.layouts.tablet[0].w, content.layouts.tablet[0].h),
        (4, 6)
    );
}

#[tokio::test]
async fn test_module_row_serializes_descriptor_json() {
    let h = Harness::new().await;
    h.installer().install_for_user("user-1").await.unwrap();

    let (config_fields, layout): (String, String) =
        sqlx::query_as("SELECT config_fields, layout FROM module WHERE id = ?")
            .bind("user-1_FocusFlow_FocusFlow")
            .fetch_one(h.db.pool())
            .await
            .unwrap();

    let config: serde_json::Value = serde_json::from_str(&config_fields).unwrap();
    assert_eq!(config["focus_minutes"]["default"], 25);
    assert_eq!(config["auto_log_sessions"]["type"], "boolean");

    let layout: serde_json::Value = serde_json::from_str(&layout).unwrap();
    assert_eq!(layout["minWidth"], 4);
    assert_eq!(layout["defaultWidth"], 8);
}
