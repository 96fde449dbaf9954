//! [`GitFetcher`]: clones a repository and reads its manifest.

use std::{
  ffi::OsString,
  io::ErrorKind,
  path::{Path, PathBuf},
  process::Stdio,
  time::Duration,
};

use drc_core::{
  fetch::{FetchFailure, FetchRequest, RepositoryFetcher},
  manifest::MANIFEST_FILE,
};
use tokio::{
  io::AsyncReadExt as _,
  process::{Child, ChildStderr, Command},
};
use tracing::{debug, warn};

use crate::workspace::workspace_dir;

/// Keep at most this much of the child's stderr in a failure.
const STDERR_TAIL: usize = 2048;

/// How long a timed-out child gets to exit after SIGTERM before it is killed.
const TERM_GRACE: Duration = Duration::from_secs(5);

/// Runs `<program> [global_args…] clone --branch=<branch> -- <location> <dir>`.
#[derive(Debug, Clone)]
pub struct GitFetcher {
  program:     PathBuf,
  global_args: Vec<OsString>,
  work_root:   PathBuf,
}

impl GitFetcher {
  pub fn new(program: impl Into<PathBuf>, work_root: impl Into<PathBuf>) -> Self {
    Self {
      program:     program.into(),
      global_args: Vec::new(),
      work_root:   work_root.into(),
    }
  }

  /// Arguments placed before `clone`, e.g. `-c http.lowSpeedTime=30`.
  pub fn with_global_args<I, A>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = A>,
    A: Into<OsString>,
  {
    self.global_args = args.into_iter().map(Into::into).collect();
    self
  }

  pub fn work_root(&self) -> &Path { &self.work_root }

  fn command(&self, request: &FetchRequest<'_>, dest: &Path) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd
      .args(&self.global_args)
      .arg("clone")
      .arg(format!("--branch={}", request.branch))
      .arg("--")
      .arg(request.location)
      .arg(dest)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::piped())
      .kill_on_drop(true);
    cmd
  }
}

/// Remove a workspace left behind by an earlier attempt.
async fn clear_workspace(dir: &Path) -> Result<(), FetchFailure> {
  match tokio::fs::remove_dir_all(dir).await {
    Ok(()) => {
      debug!(workspace = %dir.display(), "removed stale workspace");
      Ok(())
    }
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e.into()),
  }
}

async fn read_all(pipe: Option<ChildStderr>, buf: &mut Vec<u8>) -> std::io::Result<()> {
  if let Some(mut pipe) = pipe {
    pipe.read_to_end(buf).await?;
  }
  Ok(())
}

/// Ask a timed-out child to stop, then kill it if it is still running after
/// [`TERM_GRACE`]. Returns at once; the reaping happens in the background.
fn terminate(mut child: Child) {
  send_sigterm(&child);
  tokio::spawn(async move {
    if tokio::time::timeout(TERM_GRACE, child.wait()).await.is_err() {
      debug!("child ignored SIGTERM, killing");
      if let Err(e) = child.kill().await {
        warn!("failed to kill timed-out clone: {e}");
      }
    }
  });
}

#[cfg(unix)]
fn send_sigterm(child: &Child) {
  if let Some(pid) = child.id() {
    // SAFETY: `pid` is our own child and has not been reaped yet, since
    // `id()` returns `None` once it has.
    unsafe {
      libc::kill(pid as libc::pid_t, libc::SIGTERM);
    }
  }
}

// `kill_on_drop` and the grace-period kill are the only stop on other
// platforms.
#[cfg(not(unix))]
fn send_sigterm(_child: &Child) {}

fn stderr_tail(stderr: &[u8]) -> String {
  let text = String::from_utf8_lossy(stderr);
  let text = text.trim();
  match text.char_indices().rev().nth(STDERR_TAIL - 1) {
    Some((i, _)) => text[i..].to_owned(),
    None => text.to_owned(),
  }
}

impl RepositoryFetcher for GitFetcher {
  async fn fetch(&self, request: FetchRequest<'_>) -> Result<String, FetchFailure> {
    let dest = workspace_dir(&self.work_root, request.identifier)?;
    clear_workspace(&dest).await?;
    tokio::fs::create_dir_all(&self.work_root).await?;

    debug!(
      location = request.location,
      branch = request.branch,
      workspace = %dest.display(),
      "cloning repository"
    );
    let mut child = self.command(&request, &dest).spawn()?;
    let stderr = child.stderr.take();

    let waited = tokio::time::timeout(request.timeout, async {
      let mut buf = Vec::new();
      let (status, read) = tokio::join!(child.wait(), read_all(stderr, &mut buf));
      read?;
      Ok::<_, std::io::Error>((status?, buf))
    })
    .await;

    let (status, stderr) = match waited {
      Ok(finished) => finished?,
      Err(_) => {
        warn!(
          location = request.location,
          timeout = ?request.timeout,
          "clone exceeded timeout, terminating"
        );
        terminate(child);
        return Err(FetchFailure::Timeout(request.timeout));
      }
    };

    if !status.success() {
      return Err(FetchFailure::CommandFailed {
        status: status.to_string(),
        stderr: stderr_tail(&stderr),
      });
    }

    let path = dest.join(MANIFEST_FILE);
    match tokio::fs::read_to_string(&path).await {
      Ok(text) => Ok(text),
      Err(e) if e.kind() == ErrorKind::NotFound => {
        Err(FetchFailure::ManifestNotFound(path))
      }
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(all(test, unix))]
mod tests {
  use std::{sync::Arc, time::Instant};

  use drc_core::{
    linker::{GraphLinker, Outcome},
    stack::StackRef,
    vocab::ResourceUris,
  };
  use drc_store_sqlite::SqliteStore;
  use tempfile::TempDir;

  use super::*;

  /// A fetcher whose "git" is `sh <script>`, so no freshly written file is
  /// ever exec'd directly.
  fn fetcher(tmp: &TempDir, script: &str) -> GitFetcher {
    let script_path = tmp.path().join("fake-git.sh");
    std::fs::write(&script_path, script).unwrap();
    GitFetcher::new("/bin/sh", tmp.path().join("work"))
      .with_global_args([script_path])
  }

  fn request(timeout: Duration) -> FetchRequest<'static> {
    FetchRequest {
      identifier: "abc123",
      location: "https://example.test/r.git",
      branch: "main",
      timeout,
    }
  }

  const CLONE_OK: &str = r#"
for a in "$@"; do dest="$a"; done
mkdir "$dest"
echo "$*" > "$dest/args.txt"
printf 'services:\n  web:\n    image: nginx\n' > "$dest/docker-compose.yml"
"#;

  #[tokio::test]
  async fn successful_clone_returns_manifest() {
    let tmp = TempDir::new().unwrap();
    let f = fetcher(&tmp, CLONE_OK);

    let text = f.fetch(request(Duration::from_secs(10))).await.unwrap();
    assert_eq!(text, "services:\n  web:\n    image: nginx\n");

    let args =
      std::fs::read_to_string(tmp.path().join("work/abc123/args.txt")).unwrap();
    let dest = tmp.path().join("work/abc123");
    assert_eq!(
      args.trim(),
      format!(
        "clone --branch=main -- https://example.test/r.git {}",
        dest.display()
      )
    );
  }

  #[tokio::test]
  async fn stale_workspace_is_replaced() {
    let tmp = TempDir::new().unwrap();
    let stale = tmp.path().join("work/abc123");
    std::fs::create_dir_all(&stale).unwrap();
    std::fs::write(stale.join("leftover"), "x").unwrap();

    let f = fetcher(&tmp, CLONE_OK);
    f.fetch(request(Duration::from_secs(10))).await.unwrap();
    assert!(!stale.join("leftover").exists());
  }

  #[tokio::test]
  async fn missing_manifest_is_reported() {
    let tmp = TempDir::new().unwrap();
    let f = fetcher(&tmp, "for a in \"$@\"; do dest=\"$a\"; done\nmkdir \"$dest\"\n");

    let err = f.fetch(request(Duration::from_secs(10))).await.unwrap_err();
    match err {
      FetchFailure::ManifestNotFound(path) => {
        assert!(path.ends_with("abc123/docker-compose.yml"), "{path:?}")
      }
      other => panic!("expected ManifestNotFound, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn failing_command_keeps_stderr() {
    let tmp = TempDir::new().unwrap();
    let f = fetcher(&tmp, "echo 'fatal: repository not found' >&2\nexit 128\n");

    let err = f.fetch(request(Duration::from_secs(10))).await.unwrap_err();
    match err {
      FetchFailure::CommandFailed { stderr, .. } => {
        assert_eq!(stderr, "fatal: repository not found")
      }
      other => panic!("expected CommandFailed, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn slow_clone_times_out_without_waiting() {
    let tmp = TempDir::new().unwrap();
    let f = fetcher(&tmp, "sleep 5\n");

    let started = Instant::now();
    let err = f.fetch(request(Duration::from_millis(1))).await.unwrap_err();
    assert!(matches!(err, FetchFailure::Timeout(_)), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
  }

  #[tokio::test]
  async fn timed_out_clone_is_sent_sigterm() {
    let tmp = TempDir::new().unwrap();
    let mark = tmp.path().join("terminated");
    let script = format!(
      "trap 'echo term > \"{}\"; kill $! 2>/dev/null; exit 143' TERM\nsleep 5 &\nwait\n",
      mark.display()
    );
    let f = fetcher(&tmp, &script);

    let err = f.fetch(request(Duration::from_millis(500))).await.unwrap_err();
    assert!(matches!(err, FetchFailure::Timeout(_)), "got {err:?}");

    let deadline = Instant::now() + Duration::from_secs(3);
    while !mark.exists() && Instant::now() < deadline {
      tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(mark.exists(), "trap never ran");
  }

  #[tokio::test]
  async fn linker_timeout_persists_nothing() {
    let tmp = TempDir::new().unwrap();
    let uris = ResourceUris::default();
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let linker =
      GraphLinker::new(store.clone(), Arc::new(fetcher(&tmp, "sleep 5\n")), uris.clone())
        .with_fetch_timeout(Duration::from_millis(1));

    let stack = StackRef::resolved(
      &uris,
      "abc123",
      Some("https://example.test/r.git".into()),
      Some("main".into()),
    );
    let outcome = linker.ensure_and_link(&stack).await.unwrap();
    assert!(
      matches!(outcome, Outcome::FetchFailed(FetchFailure::Timeout(_))),
      "got {outcome:?}"
    );
    assert_eq!(store.count_manifests().await.unwrap(), 0);
    assert!(
      store
        .manifest_links(&uris.stack_uri("abc123"))
        .await
        .unwrap()
        .is_empty()
    );
  }

  #[tokio::test]
  async fn invalid_identifier_never_spawns() {
    let tmp = TempDir::new().unwrap();
    let f = fetcher(&tmp, CLONE_OK);

    let err = f
      .fetch(FetchRequest {
        identifier: "../escape",
        ..request(Duration::from_secs(10))
      })
      .await
      .unwrap_err();
    assert!(matches!(err, FetchFailure::InvalidWorkspace(_)), "got {err:?}");
    assert!(!tmp.path().join("work").exists());
  }

  #[test]
  fn stderr_tail_is_bounded() {
    let long = "x".repeat(STDERR_TAIL * 2);
    assert_eq!(stderr_tail(long.as_bytes()).len(), STDERR_TAIL);
    assert_eq!(stderr_tail(b"  short\n"), "short");
  }
}
