use rusqlite::params;
use tempfile::tempdir;
use photo_core::storage::PhotoRegistry;

fn table_exists(registry: &PhotoRegistry, name: &str) -> bool {
    let conn = registry.get_conn().expect("conn");
    conn.query_row(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |row| row.get::<_, String>(0),
    )
    .map(|_| true)
    .unwrap_or(false)
}

#[test]
fn initialize_pool_creates_core_tables() {
    let temp_dir = tempdir().expect("tempdir");
    let db_path = temp_dir.path().join("photo.db");
    let registry = PhotoRegistry::new(db_path.to_string_lossy().as_ref(), 1).expect("registry");

    assert!(table_exists(&registry, "labels"));
    assert!(table_exists(&registry, "users"));
    assert!(table_exists(&registry, "sessions"));
}

#[test]
fn reopening_existing_database_keeps_rows() {
    let temp_dir = tempdir().expect("tempdir");
    let db_path = temp_dir.path().join("photo.db");
    let db_url = db_path.to_string_lossy().to_string();

    let uid = {
        let registry = PhotoRegistry::new(&db_url, 1).expect("registry");
        registry.create_label("Beach", 0).expect("label").uid
    };

    let registry = PhotoRegistry::new(&db_url, 2).expect("reopen");
    assert!(registry.label_by_uid(&uid).expect("lookup").is_some());
}

#[test]
fn reset_schema_drops_rows_and_recreates_tables() {
    let temp_dir = tempdir().expect("tempdir");
    let db_path = temp_dir.path().join("photo.db");
    let registry = PhotoRegistry::new(db_path.to_string_lossy().as_ref(), 1).expect("registry");

    let label = registry.create_label("Mountains", 5).expect("label");
    let admin = registry.init_admin("admin", "secret").expect("admin");
    registry.create_session(&admin).expect("session");

    registry.reset_schema().expect("reset");

    assert!(registry.label_by_uid(&label.uid).expect("lookup").is_none());
    assert!(registry.verify_password("admin", "secret").expect("verify").is_none());
    assert!(table_exists(&registry, "labels"));
    assert!(table_exists(&registry, "sessions"));

    // 重置后仍可正常写入
    registry.create_label("Mountains", 5).expect("label after reset");
}
