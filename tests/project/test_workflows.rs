//! Workflow tests against a scripted executor
//!
//! No real `git`, `make` or `pros` runs here: every invocation is recorded and
//! answered by the first matching rule, or with exit code 0.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use cmapi_cli::config::{Environment, SecretMap};
use cmapi_cli::project::{CreateRepositoryRequest, copy_template, write_project_file};
use cmapi_cli::{
    AssistError, Assistant, Command, CommandOutput, Executor, Invocation, Label, RepositoryHost,
    Result, Secrets, UserInfo, Workflows,
};

type Rule = Box<dyn Fn(&Invocation) -> Option<CommandOutput> + Send + Sync>;

#[derive(Default)]
struct ScriptedExecutor {
    rules: Vec<Rule>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedExecutor {
    fn new() -> Self {
        Self::default()
    }

    /// Answer invocations whose program and leading args match `prefix`
    fn on(mut self, prefix: &[&str], output: CommandOutput) -> Self {
        let prefix: Vec<String> = prefix.iter().map(|s| (*s).to_string()).collect();
        self.rules.push(Box::new(move |inv: &Invocation| {
            let words = words(inv);
            words.starts_with(&prefix).then(|| output.clone())
        }));
        self
    }

    fn fail(self, prefix: &[&str]) -> Self {
        self.on(prefix, CommandOutput::exited(1))
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().iter().map(words).collect()
    }

    fn called(&self, prefix: &[&str]) -> bool {
        self.calls()
            .iter()
            .any(|call| call.iter().map(String::as_str).take(prefix.len()).eq(prefix.iter().copied()))
    }
}

impl Executor for ScriptedExecutor {
    async fn run(&self, invocation: Invocation) -> CommandOutput {
        let output = self
            .rules
            .iter()
            .find_map(|rule| rule(&invocation))
            .unwrap_or_default();
        self.calls.lock().push(invocation);
        output
    }
}

fn words(inv: &Invocation) -> Vec<String> {
    std::iter::once(inv.program.clone())
        .chain(inv.args.iter().cloned())
        .collect()
}

fn stdout(text: &str) -> CommandOutput {
    CommandOutput {
        stdout: text.to_string(),
        ..CommandOutput::exited(0)
    }
}

#[derive(Default)]
struct FakeHost {
    requests: Mutex<Vec<CreateRepositoryRequest>>,
    status: Option<String>,
}

impl RepositoryHost for FakeHost {
    async fn create_repository(&self, request: &CreateRepositoryRequest) -> Result<()> {
        self.requests.lock().push(request.clone());
        match &self.status {
            Some(status) => Err(AssistError::remote_status(status.clone())),
            None => Ok(()),
        }
    }
}

fn secrets(dir: &Path) -> Secrets {
    let mut values: SecretMap = Secrets::defaults(&UserInfo {
        name: "builder".to_string(),
        home: dir.to_path_buf(),
    });
    values.insert("password".to_string(), "pw".to_string());
    Secrets::new(dir.join("secret.json"), values)
}

fn pros_project(dir: &Path) -> PathBuf {
    let root = dir.join("7984-ARM");
    fs::create_dir_all(&root).unwrap();
    write_project_file(&root).unwrap();
    root
}

fn label(text: &str) -> Label {
    Label::parse(text).unwrap()
}

// ============================================================================
// Git workflows
// ============================================================================

#[tokio::test]
async fn test_backup_outside_repository() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new().fail(&["git", "rev-parse"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    let err = workflows.backup(dir.path()).await.unwrap_err();
    assert_eq!(err.code(), 102);
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_backup_commits_then_pushes() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new();
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    workflows.backup(dir.path()).await.unwrap();

    assert_eq!(
        executor.calls(),
        vec![
            vec!["git", "rev-parse"],
            vec!["git", "add", "-A"],
            vec!["git", "commit", "-m", "Backup"],
            vec!["git", "push", "-u", "origin", "master"],
        ]
    );
}

#[tokio::test]
async fn test_backup_failure_codes() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());

    let executor = ScriptedExecutor::new().fail(&["git", "commit"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    assert_eq!(workflows.backup(dir.path()).await.unwrap_err().code(), 105);
    assert!(!executor.called(&["git", "push"]));

    let executor = ScriptedExecutor::new().fail(&["git", "push"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    assert_eq!(workflows.backup(dir.path()).await.unwrap_err().code(), 106);
}

#[tokio::test]
async fn test_link_adds_origin_and_identity() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new().fail(&["git", "remote", "get-url"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    workflows.link(dir.path(), "7984-arm").await.unwrap();

    let url = "https://cmass-robotics-team-bot:pw@bitbucket.org/vex7984/7984-arm.git";
    let calls = executor.calls();
    assert!(calls.contains(&vec![
        "git".to_string(),
        "remote".to_string(),
        "add".to_string(),
        "origin".to_string(),
        url.to_string(),
    ]));
    assert!(executor.called(&["git", "config", "user.name", "builder"]));
    assert!(executor.called(&["git", "config", "user.email", "cmass-robotics-team-bot@proton.me"]));
    assert!(executor.called(&["git", "config", "commit.gpgsign", "false"]));
}

#[tokio::test]
async fn test_link_updates_existing_origin() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new()
        .on(&["git", "remote", "get-url"], stdout("https://elsewhere/repo.git\n"));
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    workflows.link(dir.path(), "7984-arm").await.unwrap();

    assert!(executor.called(&["git", "remote", "set-url", "origin"]));
    assert!(!executor.called(&["git", "remote", "add"]));
}

#[tokio::test]
async fn test_link_failure_codes() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());

    let executor = ScriptedExecutor::new()
        .fail(&["git", "remote", "get-url"])
        .fail(&["git", "remote", "add"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    assert_eq!(workflows.link(dir.path(), "x").await.unwrap_err().code(), 103);

    let executor = ScriptedExecutor::new().fail(&["git", "config"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    assert_eq!(workflows.link(dir.path(), "x").await.unwrap_err().code(), 104);
}

#[tokio::test]
async fn test_pull() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());

    let executor = ScriptedExecutor::new();
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    workflows.pull(dir.path()).await.unwrap();
    assert!(executor.called(&["git", "pull"]));

    let executor = ScriptedExecutor::new().fail(&["git", "pull"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    assert_eq!(workflows.pull(dir.path()).await.unwrap_err().code(), 112);
}

// ============================================================================
// PROS workflows
// ============================================================================

#[tokio::test]
async fn test_build_requires_project_file() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new();
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    assert_eq!(workflows.build(dir.path()).await.unwrap_err().code(), 134);
    assert_eq!(workflows.compile(dir.path(), false, 1).await.unwrap_err().code(), 134);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_build_runs_make() {
    let dir = tempfile::tempdir().unwrap();
    let root = pros_project(dir.path());
    let secrets = secrets(dir.path());

    let executor = ScriptedExecutor::new();
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    workflows.build(&root).await.unwrap();
    assert_eq!(executor.calls(), vec![vec!["make", "-j"]]);

    let executor = ScriptedExecutor::new().fail(&["make"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    assert_eq!(workflows.build(&root).await.unwrap_err().code(), 107);
}

#[tokio::test]
async fn test_compile_all_uploads_to_slot() {
    let dir = tempfile::tempdir().unwrap();
    let root = pros_project(dir.path());
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new().on(
        &["pros", "lsusb"],
        stdout("VEX EDR V5 System Port\n/dev/ttyACM0 - VEX Robotics V5 Brain\n"),
    );
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    workflows.compile(&root, true, 4).await.unwrap();

    assert_eq!(
        executor.calls(),
        vec![
            vec!["make", "all", "-j"],
            vec!["pros", "lsusb", "--target", "v5"],
            vec!["pros", "upload", "--after", "screen", "--slot", "4"],
        ]
    );
}

#[tokio::test]
async fn test_compile_waits_for_brain_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let root = pros_project(dir.path());
    let secrets = secrets(dir.path());

    let polls = AtomicUsize::new(0);
    let mut executor = ScriptedExecutor::new();
    executor.rules.push(Box::new(move |inv: &Invocation| {
        if inv.program != "pros" || inv.args.first().map(String::as_str) != Some("lsusb") {
            return None;
        }
        // Nothing plugged in on the first poll
        if polls.fetch_add(1, Ordering::SeqCst) == 0 {
            Some(stdout("VEX EDR V5 System Port\n"))
        } else {
            Some(stdout("/dev/ttyACM0 - VEX Robotics V5 Brain\n"))
        }
    }));
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    workflows.compile(&root, false, 2).await.unwrap();

    assert_eq!(
        executor.calls(),
        vec![
            vec!["make", "-j"],
            vec!["pros", "lsusb", "--target", "v5"],
            vec!["pros", "lsusb", "--target", "v5"],
            vec!["pros", "upload", "--after", "screen", "--slot", "2"],
        ]
    );
}

#[tokio::test]
async fn test_compile_gives_up_after_six_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let root = pros_project(dir.path());
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new()
        .on(&["pros", "lsusb"], stdout("/dev/ttyACM0 - V5 Brain\n"))
        .fail(&["pros", "upload"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    let err = workflows.compile(&root, false, 1).await.unwrap_err();

    assert_eq!(err.code(), 108);
    let uploads = executor
        .calls()
        .iter()
        .filter(|call| call[..2] == ["pros", "upload"])
        .count();
    assert_eq!(uploads, 6);
}

#[tokio::test]
async fn test_compile_make_failure_skips_upload() {
    let dir = tempfile::tempdir().unwrap();
    let root = pros_project(dir.path());
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new().fail(&["make"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    assert_eq!(workflows.compile(&root, false, 1).await.unwrap_err().code(), 107);
    assert!(!executor.called(&["pros"]));
}

#[tokio::test]
async fn test_init_refuses_existing_project() {
    let dir = tempfile::tempdir().unwrap();
    let root = pros_project(dir.path());
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new();
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    let err = workflows
        .init_project(&root, "latest", false, false)
        .await
        .unwrap_err();
    assert_eq!(err.code(), 109);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_init_new_repository() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new().fail(&["git", "rev-parse"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    workflows
        .init_project(dir.path(), "4.1.0", false, true)
        .await
        .unwrap();

    assert_eq!(
        executor.calls(),
        vec![
            vec!["git", "rev-parse"],
            vec!["git", "init", "--initial-branch=master"],
            vec!["git", "config", "commit.gpgsign", "false"],
            vec!["git", "add", "-A"],
            vec!["git", "commit", "--allow-empty", "-m", "Apply PROS kernel"],
            vec![
                "pros",
                "conductor",
                "install",
                "kernel@4.1.0",
                "-force-system",
                "--no-download"
            ],
            vec!["git", "reset", "--hard"],
        ]
    );

    let project: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("project.pros")).unwrap()).unwrap();
    assert_eq!(project["py/state"]["target"], "v5");
}

#[tokio::test]
async fn test_init_kernel_error_still_resets() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new().on(
        &["pros", "conductor"],
        stdout("ERROR - pros.cli.conductor:install - No templates found\n"),
    );
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    let err = workflows
        .init_project(dir.path(), "latest", true, false)
        .await
        .unwrap_err();

    assert_eq!(err.code(), 125);
    assert_eq!(
        executor.calls().last().unwrap(),
        &vec!["git", "reset", "--hard"]
    );
}

#[tokio::test]
async fn test_init_failure_codes() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());
    let cases: [(&[&str], u16); 4] = [
        (&["git", "init"], 123),
        (&["git", "config"], 104),
        (&["git", "commit"], 110),
        (&["git", "reset"], 111),
    ];

    for (failing, code) in cases {
        let executor = ScriptedExecutor::new()
            .fail(&["git", "rev-parse"])
            .fail(failing);
        let workflows = Workflows::new(&executor, &secrets, dir.path());
        let err = workflows
            .init_project(dir.path(), "latest", true, false)
            .await
            .unwrap_err();
        assert_eq!(err.code(), code, "failing {failing:?}");
    }
}

#[test]
fn test_project_file_is_named_after_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("7984-DRIVE");
    fs::create_dir(&root).unwrap();

    write_project_file(&root).unwrap();

    let project: serde_json::Value =
        serde_json::from_slice(&fs::read(root.join("project.pros")).unwrap()).unwrap();
    assert_eq!(project["py/object"], "pros.conductor.project.Project");
    assert_eq!(project["py/state"]["project_name"], "7984-DRIVE");
}

#[test]
fn test_project_file_in_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = write_project_file(&dir.path().join("absent")).unwrap_err();
    assert_eq!(err.code(), 124);
}

// ============================================================================
// Repository workflows
// ============================================================================

#[tokio::test]
async fn test_clone_project() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = dir.path().join("workspace");
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new();
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    workflows
        .clone_project(&label("ARM"), &workspace, "latest", false)
        .await
        .unwrap();

    let root = workspace.join("7984-ARM");
    assert!(root.join("project.pros").exists());
    assert_eq!(
        executor.calls(),
        vec![
            vec![
                "git",
                "clone",
                "https://cmass-robotics-team-bot:pw@bitbucket.org/vex7984/7984-arm.git",
                "7984-ARM"
            ],
            vec!["pros", "conductor", "install", "kernel@latest", "-force-system"],
            vec!["git", "reset", "--hard"],
        ]
    );
    assert_eq!(executor.calls.lock()[0].dir, workspace);
    assert_eq!(executor.calls.lock()[2].dir, root);
}

#[tokio::test]
async fn test_clone_failure_codes() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = secrets(dir.path());

    let executor = ScriptedExecutor::new().fail(&["git", "clone"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    let err = workflows
        .clone_project(&label("ARM"), dir.path(), "latest", false)
        .await
        .unwrap_err();
    assert_eq!(err.code(), 114);

    let executor = ScriptedExecutor::new().fail(&["git", "reset"]);
    let workflows = Workflows::new(&executor, &secrets, dir.path());
    let err = workflows
        .clone_project(&label("ARM"), dir.path(), "latest", false)
        .await
        .unwrap_err();
    assert_eq!(err.code(), 131);
}

#[tokio::test]
async fn test_clone_into_unwritable_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "").unwrap();
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new();
    let workflows = Workflows::new(&executor, &secrets, dir.path());

    let err = workflows
        .clone_project(&label("ARM"), &blocker, "latest", false)
        .await
        .unwrap_err();
    assert_eq!(err.code(), 113);
    assert!(executor.calls().is_empty());
}

/// Admin dir with a template tree, and a workspace next to it
fn template_fixture(dir: &Path) -> (PathBuf, PathBuf) {
    let admin = dir.join("admin");
    let template = admin.join("cmapi-build");
    fs::create_dir_all(template.join("src")).unwrap();
    fs::create_dir_all(template.join(".git")).unwrap();
    fs::write(template.join("src/main.cpp"), "int main() {}").unwrap();
    fs::write(template.join(".git/HEAD"), "ref: refs/heads/master").unwrap();
    (admin, dir.join("workspace"))
}

/// `git rev-parse` succeeds only in `repos` and in directories `git init` ran in
fn git_repo_rule(repos: Vec<PathBuf>) -> Rule {
    let repos = Mutex::new(repos);
    Box::new(move |inv: &Invocation| {
        if inv.program != "git" {
            return None;
        }
        match inv.args.first().map(String::as_str) {
            Some("init") => {
                repos.lock().push(inv.dir.clone());
                Some(CommandOutput::exited(0))
            }
            Some("rev-parse") => {
                let known = repos.lock().contains(&inv.dir);
                Some(CommandOutput::exited(if known { 0 } else { 128 }))
            }
            _ => None,
        }
    })
}

#[tokio::test]
async fn test_create_local_project_from_template() {
    let dir = tempfile::tempdir().unwrap();
    let (admin, workspace) = template_fixture(dir.path());
    let secrets = secrets(dir.path());
    let mut executor = ScriptedExecutor::new();
    executor
        .rules
        .push(git_repo_rule(vec![admin.join("cmapi-build")]));
    let workflows = Workflows::new(&executor, &secrets, &admin);
    let host = FakeHost::default();

    workflows
        .create_project(&host, &label("DRIVE"), &workspace, "latest", true, true)
        .await
        .unwrap();

    let root = workspace.join("7984-DRIVE");
    assert!(root.join("src/main.cpp").exists());
    assert!(root.join("project.pros").exists());
    assert!(!root.join(".git/HEAD").exists());
    assert!(host.requests.lock().is_empty());
    assert!(!executor.called(&["git", "pull"]));
    assert!(!executor.called(&["git", "push"]));
}

#[tokio::test]
async fn test_create_remote_project() {
    let dir = tempfile::tempdir().unwrap();
    let (admin, workspace) = template_fixture(dir.path());
    let secrets = secrets(dir.path());
    let mut executor = ScriptedExecutor::new();
    executor
        .rules
        .push(git_repo_rule(vec![admin.join("cmapi-build")]));
    let workflows = Workflows::new(&executor, &secrets, &admin);
    let host = FakeHost::default();

    workflows
        .create_project(&host, &label("DRIVE"), &workspace, "latest", false, false)
        .await
        .unwrap();

    // Template relinked and pulled before copying
    assert!(executor.called(&["git", "pull"]));

    let requests = host.requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].slug, "7984-drive");
    assert_eq!(requests[0].name, "7984 - DRIVE");
    assert_eq!(requests[0].project_key, "CURRENT");
    assert_eq!(requests[0].workspace, "vex7984");
    assert_eq!(requests[0].password, "pw");

    assert_eq!(
        executor.calls().last().unwrap(),
        &vec!["git", "push", "-u", "origin", "master"]
    );
}

#[tokio::test]
async fn test_create_clones_missing_template() {
    let dir = tempfile::tempdir().unwrap();
    let admin = dir.path().join("admin");
    fs::create_dir_all(&admin).unwrap();
    let secrets = secrets(dir.path());
    let executor = ScriptedExecutor::new().fail(&["git", "rev-parse"]);
    let workflows = Workflows::new(&executor, &secrets, &admin);
    let host = FakeHost::default();

    // The scripted clone creates nothing, so the template is still missing
    let err = workflows
        .create_project(&host, &label("DRIVE"), dir.path(), "latest", false, true)
        .await
        .unwrap_err();

    assert_eq!(err.code(), 117);
    assert!(executor.called(&[
        "git",
        "clone",
        "https://cmass-robotics-team-bot:pw@bitbucket.org/vex7984/cmapi-build.git",
        "cmapi-build"
    ]));
    assert_eq!(executor.calls.lock()[1].dir, admin);
}

#[tokio::test]
async fn test_create_failure_codes() {
    let dir = tempfile::tempdir().unwrap();
    let (admin, workspace) = template_fixture(dir.path());
    let secrets = secrets(dir.path());
    let template = admin.join("cmapi-build");

    // Existing target repository
    let mut executor = ScriptedExecutor::new();
    executor.rules.push(git_repo_rule(vec![
        template.clone(),
        workspace.join("7984-DRIVE"),
    ]));
    let workflows = Workflows::new(&executor, &secrets, &admin);
    let err = workflows
        .create_project(&FakeHost::default(), &label("DRIVE"), &workspace, "latest", true, true)
        .await
        .unwrap_err();
    assert_eq!(err.code(), 118);

    // Template relink fails
    let mut executor = ScriptedExecutor::new().fail(&["git", "config"]);
    executor
        .rules
        .push(git_repo_rule(vec![template.clone()]));
    let workflows = Workflows::new(&executor, &secrets, &admin);
    let err = workflows
        .create_project(&FakeHost::default(), &label("DRIVE"), &workspace, "latest", false, true)
        .await
        .unwrap_err();
    assert_eq!(err.code(), 116);

    // Template clone fails
    let executor = ScriptedExecutor::new()
        .fail(&["git", "rev-parse"])
        .fail(&["git", "clone"]);
    let workflows = Workflows::new(&executor, &secrets, &admin);
    let err = workflows
        .create_project(&FakeHost::default(), &label("OTHER"), &workspace, "latest", false, true)
        .await
        .unwrap_err();
    assert_eq!(err.code(), 115);
}

#[tokio::test]
async fn test_create_remote_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (admin, workspace) = template_fixture(dir.path());
    let secrets = secrets(dir.path());
    let mut executor = ScriptedExecutor::new();
    executor
        .rules
        .push(git_repo_rule(vec![admin.join("cmapi-build")]));
    let workflows = Workflows::new(&executor, &secrets, &admin);
    let host = FakeHost {
        status: Some("400 Bad Request".to_string()),
        ..FakeHost::default()
    };

    let err = workflows
        .create_project(&host, &label("DRIVE"), &workspace, "latest", true, false)
        .await
        .unwrap_err();

    assert_eq!(err.code(), 121);
    assert!(err.to_string().contains("400 Bad Request"));
    assert!(!executor.called(&["git", "push"]));
}

#[test]
fn test_copy_template_skips_git_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src-tree");
    let dest = dir.path().join("dest-tree");
    fs::create_dir_all(src.join("include/nested")).unwrap();
    fs::create_dir_all(src.join(".git/objects")).unwrap();
    fs::create_dir_all(src.join("firmware/lib.git")).unwrap();
    fs::write(src.join("include/nested/api.h"), "#pragma once").unwrap();
    fs::write(src.join("Makefile"), "all:").unwrap();
    fs::write(src.join(".git/config"), "[core]").unwrap();
    fs::write(src.join("firmware/lib.git/blob"), "x").unwrap();
    fs::write(src.join("firmware/libv5rts.a"), "x").unwrap();
    fs::create_dir(&dest).unwrap();

    copy_template(&src, &dest).unwrap();

    assert_eq!(
        fs::read_to_string(dest.join("include/nested/api.h")).unwrap(),
        "#pragma once"
    );
    assert!(dest.join("Makefile").exists());
    assert!(dest.join("firmware/libv5rts.a").exists());
    assert!(!dest.join(".git").exists());
    assert!(!dest.join("firmware/lib.git").exists());
}

// ============================================================================
// Dispatch
// ============================================================================

fn assistant(dir: &Path, executor: ScriptedExecutor) -> Assistant<ScriptedExecutor, FakeHost> {
    let working_dir = dir.join("7984-LIFT");
    fs::create_dir_all(&working_dir).unwrap();
    let user = UserInfo {
        name: "builder".to_string(),
        home: dir.to_path_buf(),
    };
    let environment = Environment::new(user, dir.join("admin"), working_dir);
    Assistant::new(executor, FakeHost::default(), environment, secrets(dir))
}

#[tokio::test]
async fn test_link_defaults_to_directory_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut assistant = assistant(dir.path(), ScriptedExecutor::new().fail(&["git", "remote", "get-url"]));

    assistant
        .execute(Command::Link { slug: None })
        .await
        .unwrap();

    assert!(assistant.executor().called(&[
        "git",
        "remote",
        "add",
        "origin",
        "https://cmass-robotics-team-bot:pw@bitbucket.org/vex7984/7984-LIFT.git"
    ]));
}

#[tokio::test]
async fn test_secret_commands() {
    let dir = tempfile::tempdir().unwrap();
    let mut assistant = assistant(dir.path(), ScriptedExecutor::new());

    assistant.execute(Command::ListSecrets).await.unwrap();

    let err = assistant
        .execute(Command::SetSecret {
            key: "colour".to_string(),
            value: "blue".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), 130);

    assistant
        .execute(Command::SetSecret {
            key: "workspace".to_string(),
            value: "vex1234".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(assistant.secrets().get("workspace"), "vex1234");
    assert!(assistant.executor().calls().is_empty());
}

#[tokio::test]
async fn test_dispatch_uses_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut assistant = assistant(dir.path(), ScriptedExecutor::new());

    let err = assistant.execute(Command::Build).await.unwrap_err();
    assert_eq!(err.code(), 134);

    write_project_file(&assistant.environment().working_dir).unwrap();
    assistant.execute(Command::Build).await.unwrap();
    assert_eq!(
        assistant.executor().calls.lock()[0].dir,
        assistant.environment().working_dir
    );

    assistant.execute(Command::Help).await.unwrap();
}
