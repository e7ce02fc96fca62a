//! Integration tests for the exercise lifecycle manager
//!
//! Each test runs the manager against a temporary workspace and a mock pypas
//! service, answering confirmations from a script.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use pypas::app::{
    ClientConfig, Endpoints, ExerciseManager, ExerciseSettings, Interaction, MessageKind,
    PypasClient,
};
use pypas::errors::{AppError, AuthError, ExerciseError};

/// Interaction that records messages and answers questions from a script
#[derive(Default)]
struct Script {
    answers: RefCell<VecDeque<bool>>,
    questions: RefCell<Vec<String>>,
    messages: RefCell<Vec<(MessageKind, String)>>,
}

impl Script {
    fn answering(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            ..Default::default()
        }
    }

    fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }

    fn said(&self, text: &str) -> bool {
        self.messages
            .borrow()
            .iter()
            .any(|(_, message)| message.contains(text))
    }
}

impl Interaction for Script {
    fn notify(&self, kind: MessageKind, message: &str) {
        self.messages.borrow_mut().push((kind, message.to_string()));
    }

    fn confirm(&self, question: &str) -> bool {
        self.questions.borrow_mut().push(question.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }
}

/// Temporary workspace with a fake home directory
struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("home")).unwrap();
        fs::create_dir_all(temp_dir.path().join("work")).unwrap();
        fs::create_dir_all(temp_dir.path().join("tmp")).unwrap();
        Self { temp_dir }
    }

    fn workdir(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    /// Directory the manager uses for temporary bundles and staging trees
    fn scratch(&self) -> PathBuf {
        self.temp_dir.path().join("tmp")
    }

    fn scratch_entries(&self) -> Vec<PathBuf> {
        fs::read_dir(self.scratch())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    fn settings(&self) -> ExerciseSettings {
        ExerciseSettings {
            main_config_file: self.temp_dir.path().join("home").join(".pypas.toml"),
            temp_dir: self.scratch(),
            skip_version_check: true,
            ..Default::default()
        }
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.workdir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn write_bytes(&self, relative: &str, content: &[u8]) {
        let path = self.workdir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.workdir().join(relative)).unwrap()
    }

    fn exists(&self, relative: &str) -> bool {
        self.workdir().join(relative).exists()
    }
}

fn manager(
    server: &MockServer,
    workdir: &Path,
    settings: ExerciseSettings,
    script: Script,
) -> ExerciseManager<Script> {
    let endpoints = Endpoints::with_base(Url::parse(&server.uri()).unwrap());
    let config = ClientConfig {
        show_progress: false,
        ..Default::default()
    };
    let client = PypasClient::new(config, endpoints).unwrap();
    ExerciseManager::new(settings, client, script, workdir)
}

/// Bytes that deflate barely shrinks
fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

fn bundle_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer.into_inner()
}

async fn serve_bundle(server: &MockServer, slug: &str, files: &[(&str, &str)]) {
    Mock::given(method("POST"))
        .and(path(format!("/exercises/get/{}/", slug)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bundle_bytes(files)))
        .mount(server)
        .await;
}

async fn expect_no_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/assignments/put/hello/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_get_extracts_into_slug_folder() {
    let server = MockServer::start().await;
    serve_bundle(
        &server,
        "hello",
        &[(".pypas.toml", "slug = \"hello\"\n"), ("main.py", "print(1)\n")],
    )
    .await;
    let workspace = Workspace::new();
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let folder = manager.get("hello", "abc").await.unwrap();

    assert_eq!(folder, Some(workspace.workdir().join("hello")));
    assert_eq!(workspace.read("hello/main.py"), "print(1)\n");
    assert!(manager.interaction().questions().is_empty());
}

#[tokio::test]
async fn test_get_existing_folder_declined() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let workspace = Workspace::new();
    workspace.write("hello/main.py", "mine\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::answering(&[false]),
    );

    let result = manager.get("hello", "abc").await.unwrap();

    assert!(result.is_none());
    assert_eq!(manager.interaction().questions().len(), 1);
    assert!(manager.interaction().said("OVERWRITE"));
    assert_eq!(workspace.read("hello/main.py"), "mine\n");
}

#[tokio::test]
async fn test_get_inside_exercise_asks_before_messing() {
    let server = MockServer::start().await;
    serve_bundle(&server, "other", &[("main.py", "print(2)\n")]).await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::answering(&[true]),
    );

    let result = manager.get("other", "abc").await.unwrap();

    assert!(result.is_some());
    assert!(manager.interaction().said("MESS"));
    assert!(workspace.exists("other/main.py"));
}

#[tokio::test]
async fn test_update_backs_up_and_reports_versions() {
    let server = MockServer::start().await;
    serve_bundle(
        &server,
        "hello",
        &[
            (
                ".pypas.toml",
                "slug = \"hello\"\nversion = \"1.1.0\"\nbackup_on_update = [\"*.py\"]\n",
            ),
            ("main.py", "print('new')\n"),
            ("tests/test_main.py", "def test(): pass\n"),
        ],
    )
    .await;
    let workspace = Workspace::new();
    workspace.write(
        ".pypas.toml",
        "slug = \"hello\"\nversion = \"1.0.0\"\nbackup_on_update = [\"*.py\"]\n",
    );
    workspace.write("main.py", "print('mine')\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let report = manager.update("abc", false).await.unwrap();

    assert_eq!(workspace.read("main.py"), "print('new')\n");
    assert_eq!(workspace.read("main.py.bak"), "print('mine')\n");
    assert!(!workspace.exists("tests/test_main.py.bak"));
    assert_eq!(report.added().count(), 1);
    assert_eq!(report.updated().count(), 2);
    assert!(manager.interaction().said("[A] tests/test_main.py"));
    assert!(manager.interaction().said("Updated hello from 1.0.0 to 1.1.0"));
    assert!(workspace.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_update_twice_copies_nothing() {
    let server = MockServer::start().await;
    serve_bundle(
        &server,
        "hello",
        &[(".pypas.toml", "slug = \"hello\"\n"), ("main.py", "print(1)\n")],
    )
    .await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let first = manager.update("abc", false).await.unwrap();
    assert_eq!(first.added().count(), 1);

    let second = manager.update("abc", false).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(second.unchanged, 2);
}

#[tokio::test]
async fn test_update_force_skips_backups() {
    let server = MockServer::start().await;
    serve_bundle(
        &server,
        "hello",
        &[
            (".pypas.toml", "slug = \"hello\"\nbackup_on_update = [\"*.py\"]\n"),
            ("main.py", "print('new')\n"),
        ],
    )
    .await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\nbackup_on_update = [\"*.py\"]\n");
    workspace.write("main.py", "print('mine')\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    manager.update("abc", true).await.unwrap();

    assert!(!workspace.exists("main.py.bak"));
    assert_eq!(workspace.read("main.py"), "print('new')\n");
}

#[tokio::test]
async fn test_update_outside_exercise() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let result = manager.update("abc", false).await;
    assert!(matches!(
        result,
        Err(AppError::Exercise(ExerciseError::NotInsideExercise { .. }))
    ));
}

#[tokio::test]
async fn test_put_uploads_from_exercise_root_without_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assignments/put/hello/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "payload": "Assignment uploaded"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\n");
    workspace.write("main.py", "print(1)\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let message = manager.put(Some("abc")).await.unwrap();

    assert_eq!(message.as_deref(), Some("Assignment uploaded"));
    assert!(manager.interaction().questions().is_empty());
    assert!(manager.interaction().said("successfully uploaded"));
    assert!(workspace.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_put_rejected_upload_removes_temp_bundle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assignments/put/hello/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "payload": "Exercise is closed"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\n");
    workspace.write("main.py", "print(1)\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let result = manager.put(Some("abc")).await;

    assert!(matches!(result, Err(AppError::Transport(_))));
    assert!(workspace.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_put_after_zip_leaves_local_bundle_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assignments/put/hello/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "payload": "Assignment uploaded"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\n");
    workspace.write_bytes("main.py", &noise(3000));
    let settings = ExerciseSettings {
        large_file_size: 5000,
        ..workspace.settings()
    };
    let manager = manager(&server, &workspace.workdir(), settings, Script::default());

    let zipped = manager.zip(false).await.unwrap();
    assert!(fs::metadata(&zipped.bundle).unwrap().len() > 2000);

    let message = manager.put(Some("abc")).await.unwrap();

    assert_eq!(message.as_deref(), Some("Assignment uploaded"));
    assert!(workspace.exists("hello.zip"));
    assert!(workspace.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_put_with_nested_exercise_declined() {
    let server = MockServer::start().await;
    expect_no_upload(&server).await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\n");
    workspace.write("old/.pypas.toml", "slug = \"old\"\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::answering(&[false]),
    );

    let result = manager.put(Some("abc")).await.unwrap();

    assert!(result.is_none());
    assert_eq!(manager.interaction().questions().len(), 1);
    assert!(manager.interaction().said("./old/.pypas.toml"));
    assert!(manager.interaction().said("BREAK"));
}

#[tokio::test]
async fn test_put_requires_token() {
    let server = MockServer::start().await;
    expect_no_upload(&server).await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    for token in [None, Some("")] {
        let result = manager.put(token).await;
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::MissingToken))
        ));
    }
}

#[tokio::test]
async fn test_put_oversized_bundle_is_refused_before_any_request() {
    let server = MockServer::start().await;
    expect_no_upload(&server).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "9.9.9"})))
        .expect(0)
        .mount(&server)
        .await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\n");
    workspace.write("data.txt", &"x".repeat(4096));
    let settings = ExerciseSettings {
        large_file_size: 16,
        skip_version_check: false,
        ..workspace.settings()
    };
    let manager = manager(&server, &workspace.workdir(), settings, Script::default());

    let result = manager.put(Some("abc")).await;

    match result {
        Err(AppError::Exercise(ExerciseError::BundleTooLarge { limit, .. })) => {
            assert_eq!(limit, 16)
        }
        other => panic!("Expected BundleTooLarge, got {:?}", other),
    }
    assert!(workspace.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_size_gate_boundaries() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();
    let settings = ExerciseSettings {
        large_file_size: 100,
        ..workspace.settings()
    };
    let manager = manager(&server, &workspace.workdir(), settings, Script::default());

    workspace.write("at_limit.zip", &"x".repeat(100));
    workspace.write("over_limit.zip", &"x".repeat(101));

    assert_eq!(
        manager
            .check_bundle_size(&workspace.workdir().join("at_limit.zip"))
            .unwrap(),
        100
    );
    assert!(matches!(
        manager.check_bundle_size(&workspace.workdir().join("over_limit.zip")),
        Err(AppError::Exercise(ExerciseError::BundleTooLarge { size: 101, .. }))
    ));
}

#[tokio::test]
async fn test_put_outdated_exercise_declined() {
    let server = MockServer::start().await;
    expect_no_upload(&server).await;
    Mock::given(method("GET"))
        .and(path("/exercises/info/hello/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "1.1.0"})))
        .expect(1)
        .mount(&server)
        .await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\nversion = \"1.0.0\"\n");
    let settings = ExerciseSettings {
        skip_version_check: false,
        ..workspace.settings()
    };
    let manager = manager(
        &server,
        &workspace.workdir(),
        settings,
        Script::answering(&[false]),
    );

    let result = manager.put(Some("abc")).await.unwrap();

    assert!(result.is_none());
    assert_eq!(
        manager.interaction().questions(),
        vec!["Continue uploading?".to_string()]
    );
    assert!(manager.interaction().said("A new version of hello is available: 1.1.0"));
    assert!(manager.interaction().said("PYPAS_SKIP_VERSION_CHECK=1"));
}

#[tokio::test]
async fn test_zip_writes_named_bundle_and_reports_size() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();
    workspace.write(
        ".pypas.toml",
        "slug = \"hello\"\nexclude_from_zip = [\"*.bak\", \"__pycache__/\"]\n",
    );
    workspace.write("notes.txt", "todo\n");
    workspace.write("notes.bak", "old\n");
    workspace.write("__pycache__/main.pyc", "bytecode");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let report = manager.zip(true).await.unwrap();

    assert_eq!(report.bundle, workspace.workdir().join("hello.zip"));
    assert_eq!(report.excluded.len(), 2);
    assert!(manager.interaction().said("Ignoring notes.bak"));
    assert!(manager
        .interaction()
        .said("Compressed exercise is available at: ./hello.zip"));

    let archive = zip::ZipArchive::new(fs::File::open(&report.bundle).unwrap()).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort();
    assert_eq!(names, vec![".pypas.toml", "notes.txt"]);
}

#[tokio::test]
async fn test_pull_extracts_into_item_folder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assignments/pull/unit-1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(bundle_bytes(&[("hello/main.py", "print(1)\n")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let workspace = Workspace::new();
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let folder = manager.pull("unit-1", "abc").await.unwrap();

    assert_eq!(folder, Some(workspace.workdir().join("unit-1")));
    assert_eq!(workspace.read("unit-1/hello/main.py"), "print(1)\n");
    assert!(manager.interaction().said("Assignment(s) are available at ./unit-1"));
}

#[tokio::test]
async fn test_service_rejection_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/exercises/get/hello/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let workspace = Workspace::new();
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let result = manager.get("hello", "abc").await;

    assert!(matches!(result, Err(AppError::Transport(_))));
    assert!(!workspace.exists("hello"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_test_command_appends_arguments() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();
    workspace.write(".pypas.toml", "slug = \"hello\"\ntest_cmd = \"exit\"\n");
    let manager = manager(
        &server,
        &workspace.workdir(),
        workspace.settings(),
        Script::default(),
    );

    let status = manager.test(&["3".to_string()]).await.unwrap();

    assert_eq!(status.code(), Some(3));
    assert!(manager.interaction().said("Running tests with: exit 3"));
}
