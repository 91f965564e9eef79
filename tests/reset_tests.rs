use photo_core::commands::reset::{run_reset, Prompt, ResetReport};
use photo_core::config::Settings;
use photo_core::storage::PhotoRegistry;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use tempfile::tempdir;

/// 依次返回预设答案，并记录提问内容
struct ScriptedPrompt {
    answers: RefCell<VecDeque<bool>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, question: &str) -> bool {
        self.asked.borrow_mut().push(question.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }
}

fn write(path: &Path) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, b"x").expect("write");
}

fn setup(admin_password: &str) -> (tempfile::TempDir, Settings, PhotoRegistry) {
    let temp_dir = tempdir().expect("tempdir");
    let db_path = temp_dir.path().join("photo.db");

    let mut settings = Settings::new().expect("settings");
    settings.database.url = db_path.to_string_lossy().to_string();
    settings.storage.originals_path = temp_dir.path().join("originals");
    settings.storage.sidecar_path = temp_dir.path().join("sidecar");
    settings.storage.albums_path = temp_dir.path().join("albums");
    settings.auth.admin_user = "admin".to_string();
    settings.auth.admin_password = admin_password.to_string();

    let sidecar = settings.storage.sidecar_path.clone();
    write(&sidecar.join("2021/07/IMG_0001.json"));
    write(&sidecar.join("2021/07/IMG_0001.yml"));
    write(&sidecar.join("2021/07/IMG_0001.mp4"));
    write(&sidecar.join("2021/07/IMG_0001.jpg.avc"));
    write(&sidecar.join("deep/er/still/IMG_0002.JSON"));
    write(&sidecar.join("2021/07/IMG_0001.jpg"));
    write(&settings.storage.albums_path.join("moment/holiday.yml"));
    write(&settings.storage.originals_path.join("2021/IMG_0001.json"));

    let registry = PhotoRegistry::new(&settings.database.url, 1).expect("registry");
    (temp_dir, settings, registry)
}

#[test]
fn confirming_everything_resets_index_and_removes_sidecars() {
    let (_temp_dir, settings, registry) = setup("insecure");
    let label = registry.create_label("Cat", 0).expect("label");
    let prompt = ScriptedPrompt::new(&[true, true, true, true, true]);
    let mut out = Vec::new();

    let report = run_reset(&settings, &registry, &prompt, &mut out).expect("reset");

    assert_eq!(
        report,
        ResetReport {
            index_reset: true,
            sidecar_json_removed: 2,
            sidecar_yaml_removed: 1,
            videos_removed: 2,
            album_yaml_removed: 1,
            failed: 0,
        }
    );
    assert_eq!(prompt.asked.borrow().len(), 5);

    assert!(registry.label_by_uid(&label.uid).expect("lookup").is_none());
    assert!(registry
        .verify_password("admin", "insecure")
        .expect("verify")
        .is_some());

    let sidecar = &settings.storage.sidecar_path;
    assert!(!sidecar.join("2021/07/IMG_0001.json").exists());
    assert!(!sidecar.join("2021/07/IMG_0001.jpg.avc").exists());
    assert!(sidecar.join("2021/07/IMG_0001.jpg").exists());
    // originals are never touched
    assert!(settings
        .storage
        .originals_path
        .join("2021/IMG_0001.json")
        .exists());

    let progress = String::from_utf8(out).expect("utf8");
    assert_eq!(progress.matches('.').count(), 6);
    assert!(!progress.contains('E'));
}

#[test]
fn declining_everything_keeps_all_data() {
    let (_temp_dir, settings, registry) = setup("");
    let label = registry.create_label("Cat", 0).expect("label");
    let prompt = ScriptedPrompt::new(&[false, false, false, false, false]);
    let mut out = Vec::new();

    let report = run_reset(&settings, &registry, &prompt, &mut out).expect("reset");

    assert_eq!(report, ResetReport::default());
    assert!(registry.label_by_uid(&label.uid).expect("lookup").is_some());
    assert!(settings
        .storage
        .sidecar_path
        .join("2021/07/IMG_0001.json")
        .exists());
    assert!(out.is_empty());
}

#[test]
fn index_reset_without_admin_password_leaves_no_users() {
    let (_temp_dir, settings, registry) = setup("");
    registry.init_admin("admin", "before").expect("admin");
    let prompt = ScriptedPrompt::new(&[true]);
    let mut out = Vec::new();

    let report = run_reset(&settings, &registry, &prompt, &mut out).expect("reset");

    assert!(report.index_reset);
    assert_eq!(report.sidecar_json_removed, 0);
    assert!(registry
        .verify_password("admin", "before")
        .expect("verify")
        .is_none());
}

#[test]
fn only_selected_steps_run() {
    let (_temp_dir, settings, registry) = setup("");
    // index: no, json: no, yml: no, videos: yes, albums: no
    let prompt = ScriptedPrompt::new(&[false, false, false, true, false]);
    let mut out = Vec::new();

    let report = run_reset(&settings, &registry, &prompt, &mut out).expect("reset");

    assert_eq!(report.videos_removed, 2);
    assert_eq!(report.sidecar_json_removed, 0);
    let sidecar = &settings.storage.sidecar_path;
    assert!(!sidecar.join("2021/07/IMG_0001.mp4").exists());
    assert!(sidecar.join("2021/07/IMG_0001.yml").exists());
    assert!(settings.storage.albums_path.join("moment/holiday.yml").exists());
}

#[test]
fn missing_directories_find_nothing() {
    let (temp_dir, mut settings, registry) = setup("");
    settings.storage.sidecar_path = temp_dir.path().join("does-not-exist");
    settings.storage.albums_path = temp_dir.path().join("also-missing");
    let prompt = ScriptedPrompt::new(&[false, true, true, true, true]);
    let mut out = Vec::new();

    let report = run_reset(&settings, &registry, &prompt, &mut out).expect("reset");

    assert_eq!(report, ResetReport::default());
}
