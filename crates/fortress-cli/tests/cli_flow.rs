use std::path::PathBuf;
use std::process::{Command, Output};

use rusqlite::Connection;
use tempfile::TempDir;

const SECRET: &str = "integration-test-secret";
const DEFAULT_PIN: &str = "123456";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_fortress"))
}

/// A scratch HOME with its own XDG dirs and note store.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    /// Sandbox with `fortress init` already run.
    fn initialized() -> Self {
        let sandbox = Self::new();
        let output = sandbox.run(&["init", sandbox.store_path().to_str().unwrap()]);
        assert_success(&output);
        sandbox
    }

    fn store_path(&self) -> PathBuf {
        self.dir.path().join("data").join("notes.db")
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("fortress").join("config.toml")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env("FORTRESS_VAULT_SECRET", SECRET)
            .env("NO_COLOR", "1")
            .env_remove("FORTRESS_CONFIG")
            .env_remove("FORTRESS_STORE")
            .env_remove("FORTRESS_PIN")
            .env_remove("FORTRESS_NEW_PIN")
            .env_remove("FORTRESS_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run fortress")
    }

    fn run_with_pin(&self, pin: &str, args: &[&str]) -> Output {
        self.command()
            .env("FORTRESS_PIN", pin)
            .args(args)
            .output()
            .expect("run fortress")
    }

    fn open_store(&self) -> Connection {
        Connection::open(self.store_path()).expect("open store")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed\nstdout: {}\nstderr: {}",
        stdout(output),
        stderr(output)
    );
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "unexpected exit\nstdout: {}\nstderr: {}",
        stdout(output),
        stderr(output)
    );
}

/// Create a note quietly and return its ID.
fn create_note(sandbox: &Sandbox, pin: Option<&str>, args: &[&str]) -> String {
    let mut full = vec!["-q", "note", "new"];
    full.extend_from_slice(args);
    let output = match pin {
        Some(pin) => sandbox.run_with_pin(pin, &full),
        None => sandbox.run(&full),
    };
    assert_success(&output);
    stdout(&output).trim().to_string()
}

fn stored_content(conn: &Connection, id: &str) -> String {
    conn.query_row("SELECT content FROM notes WHERE id = ?1", [id], |row| {
        row.get(0)
    })
    .expect("note row")
}

fn is_envelope(value: &str) -> bool {
    let parts: Vec<&str> = value.split(':').collect();
    parts.len() == 3
        && hex::decode(parts[0]).map(|iv| iv.len() == 12).unwrap_or(false)
        && hex::decode(parts[1]).map(|tag| tag.len() == 16).unwrap_or(false)
        && hex::decode(parts[2]).is_ok()
}

#[test]
fn init_writes_private_config_and_store() {
    let sandbox = Sandbox::initialized();
    assert!(sandbox.store_path().exists());
    assert!(sandbox.config_path().exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(sandbox.config_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    let again = sandbox.run(&["init", sandbox.store_path().to_str().unwrap()]);
    assert_exit(&again, 4);
}

#[test]
fn commands_before_init_report_not_found() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["note", "list"]);
    assert_exit(&output, 3);
    assert!(stderr(&output).contains("fortress init"));
}

#[test]
fn general_note_round_trip() {
    let sandbox = Sandbox::initialized();
    let id = create_note(&sandbox, None, &["--title", "Groceries", "--body", "milk"]);

    let output = sandbox.run(&["note", "list", "--json"]);
    assert_success(&output);
    let notes: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["id"], id.as_str());
    assert_eq!(notes[0]["content"], "milk");
    assert_eq!(notes[0]["type"], "general");

    assert_eq!(stored_content(&sandbox.open_store(), &id), "milk");

    let show = sandbox.run(&["note", "show", &id[..8]]);
    assert_success(&show);
    assert!(stdout(&show).contains("milk"));
}

#[test]
fn secure_note_is_encrypted_at_rest_and_masked_in_listings() {
    let sandbox = Sandbox::initialized();
    let id = create_note(
        &sandbox,
        Some(DEFAULT_PIN),
        &["--type", "secure", "--title", "Bank", "--body", "acct 12345"],
    );

    let stored = stored_content(&sandbox.open_store(), &id);
    assert!(is_envelope(&stored), "not an envelope: {}", stored);
    assert!(!stored.contains("acct 12345"));

    let list = sandbox.run(&["note", "list", "--json"]);
    assert_success(&list);
    let notes: serde_json::Value = serde_json::from_str(&stdout(&list)).unwrap();
    assert_eq!(notes[0]["content"], "Locked");

    let shown = sandbox.run_with_pin(DEFAULT_PIN, &["note", "show", &id, "--json"]);
    assert_success(&shown);
    let body: serde_json::Value = serde_json::from_str(&stdout(&shown)).unwrap();
    assert_eq!(body["content"], "acct 12345");
    assert_eq!(body["locked"], false);

    let locked = sandbox.run(&["note", "show", &id]);
    assert_success(&locked);
    assert!(stdout(&locked).contains("Content Encrypted"));
    assert!(!stdout(&locked).contains("acct 12345"));
}

#[test]
fn secure_note_without_pin_is_vault_locked() {
    let sandbox = Sandbox::initialized();
    let output = sandbox.run(&["note", "new", "--type", "secure", "--body", "secret"]);
    assert_exit(&output, 7);

    let count: i64 = sandbox
        .open_store()
        .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn wrong_pin_is_auth_failure() {
    let sandbox = Sandbox::initialized();
    let id = create_note(
        &sandbox,
        Some(DEFAULT_PIN),
        &["--type", "secure", "--body", "secret"],
    );

    let output = sandbox.run_with_pin("0000", &["note", "show", &id]);
    assert_exit(&output, 5);
    assert!(stderr(&output).contains("Incorrect PIN"));
    assert!(!stdout(&output).contains("secret"));
}

#[test]
fn unknown_note_is_not_found() {
    let sandbox = Sandbox::initialized();
    let output = sandbox.run(&["note", "show", "7a2e3c0b-1234-5678-9abc-def012345678"]);
    assert_exit(&output, 3);
}

#[test]
fn invalid_note_type_is_invalid_input() {
    let sandbox = Sandbox::initialized();
    let output = sandbox.run(&["note", "new", "--type", "diary", "--body", "x"]);
    assert_exit(&output, 4);
}

#[test]
fn pin_change_replaces_default_pin() {
    let sandbox = Sandbox::initialized();

    let short = sandbox
        .command()
        .env("FORTRESS_PIN", DEFAULT_PIN)
        .env("FORTRESS_NEW_PIN", "12")
        .args(["pin", "set"])
        .output()
        .unwrap();
    assert_exit(&short, 4);

    let set = sandbox
        .command()
        .env("FORTRESS_PIN", DEFAULT_PIN)
        .env("FORTRESS_NEW_PIN", "2468")
        .args(["pin", "set"])
        .output()
        .unwrap();
    assert_success(&set);

    assert_exit(&sandbox.run_with_pin(DEFAULT_PIN, &["pin", "check"]), 5);
    assert_success(&sandbox.run_with_pin("2468", &["pin", "check"]));

    let wrong_old = sandbox
        .command()
        .env("FORTRESS_PIN", DEFAULT_PIN)
        .env("FORTRESS_NEW_PIN", "1357")
        .args(["pin", "set"])
        .output()
        .unwrap();
    assert_exit(&wrong_old, 5);
}

#[test]
fn editing_secure_note_re_encrypts_content() {
    let sandbox = Sandbox::initialized();
    let id = create_note(&sandbox, None, &["--title", "Draft", "--body", "plain text"]);

    let convert = sandbox.run_with_pin(DEFAULT_PIN, &["note", "edit", &id, "--type", "secure"]);
    assert_success(&convert);
    let stored = stored_content(&sandbox.open_store(), &id);
    assert!(is_envelope(&stored));

    let retitle = sandbox.run(&["note", "edit", &id, "--title", "Renamed"]);
    assert_success(&retitle);

    let rewrite = sandbox.run(&["note", "edit", &id, "--body", "new text"]);
    assert_exit(&rewrite, 7);

    let shown = sandbox.run_with_pin(DEFAULT_PIN, &["note", "show", &id, "--json"]);
    let body: serde_json::Value = serde_json::from_str(&stdout(&shown)).unwrap();
    assert_eq!(body["content"], "plain text");
    assert_eq!(body["title"], "Renamed");
}

#[test]
fn deleting_folder_moves_notes_to_inbox() {
    let sandbox = Sandbox::initialized();
    let folder = sandbox.run(&["-q", "folder", "new", "Work"]);
    assert_success(&folder);
    let folder_id = stdout(&folder).trim().to_string();

    let note_id = create_note(&sandbox, None, &["--folder", &folder_id[..6], "--body", "x"]);

    let in_folder = sandbox.run(&["note", "list", "--folder", &folder_id, "--json"]);
    let notes: serde_json::Value = serde_json::from_str(&stdout(&in_folder)).unwrap();
    assert_eq!(notes[0]["id"], note_id.as_str());

    let refused = sandbox.run(&["folder", "delete", &folder_id]);
    assert_exit(&refused, 4);

    assert_success(&sandbox.run(&["folder", "delete", &folder_id, "--force"]));

    let inbox = sandbox.run(&["note", "list", "--inbox", "--json"]);
    let notes: serde_json::Value = serde_json::from_str(&stdout(&inbox)).unwrap();
    assert_eq!(notes[0]["id"], note_id.as_str());
    assert!(notes[0]["folder_id"].is_null());
}

#[test]
fn session_reads_commands_from_stdin() {
    let sandbox = Sandbox::initialized();
    let id = create_note(
        &sandbox,
        Some(DEFAULT_PIN),
        &["--type", "secure", "--title", "Bank", "--body", "acct 12345"],
    );

    let mut child = sandbox
        .command()
        .arg("session")
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    {
        use std::io::Write;
        let stdin = child.stdin.as_mut().unwrap();
        writeln!(stdin, "show {}", id).unwrap();
        writeln!(stdin, "unlock {}", DEFAULT_PIN).unwrap();
        writeln!(stdin, "show {}", id).unwrap();
        writeln!(stdin, "quit").unwrap();
    }
    let output = child.wait_with_output().unwrap();
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("Content Encrypted"));
    assert_eq!(out.matches("acct 12345").count(), 1);
}
