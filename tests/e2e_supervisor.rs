// Nexus Shell - tests/e2e_supervisor.rs
//
// End-to-end tests for backend supervision.
//
// These tests launch real child processes (small /bin/sh scripts written to
// temporary directories) and drive the supervisor the way the window does:
// by polling. Restart deadlines are checked with `poll_at` so no test waits
// out the real restart delay.
//
// Unix-only: the backends are shell scripts and termination is observed
// through a SIGTERM trap.

#![cfg(unix)]

use nexus_shell::app::supervisor::{Supervisor, SupervisorConfig};
use nexus_shell::core::model::{ConsoleLine, OutputStream, RestartPolicy, SupervisorState};
use nexus_shell::util::error::SupervisorError;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

/// Scripts are written and executed one test at a time: a script still open
/// for writing in one test while another test forks fails with ETXTBSY.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write an executable `#!/bin/sh` script into `dir`.
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = write_plain(dir, name, body);
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Write a script without the executable bit.
fn write_plain(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "#!/bin/sh").unwrap();
    f.write_all(body.as_bytes()).unwrap();
    f.sync_all().unwrap();
    path
}

fn config(candidates: Vec<PathBuf>, delay: Duration, max_restarts: Option<u32>) -> SupervisorConfig {
    SupervisorConfig {
        candidates,
        restart: RestartPolicy {
            delay,
            max_restarts,
        },
        shutdown_grace: Duration::ZERO,
    }
}

/// Poll until `done` holds or ten seconds pass, collecting console lines.
fn pump_until(
    sup: &mut Supervisor,
    mut done: impl FnMut(&Supervisor) -> bool,
) -> Vec<ConsoleLine> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut lines = Vec::new();
    loop {
        lines.extend(sup.poll());
        if done(sup) {
            return lines;
        }
        assert!(
            Instant::now() < deadline,
            "timed out; supervisor state {:?}",
            sup.state()
        );
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Poll until the backend prints `text`, so its signal handling is in place.
fn wait_for_line(sup: &mut Supervisor, text: &str) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if sup.poll().iter().any(|l| l.text == text) {
            return;
        }
        assert!(Instant::now() < deadline, "backend never printed {text:?}");
        std::thread::sleep(Duration::from_millis(20));
    }
}

fn texts(lines: &[ConsoleLine], stream: OutputStream) -> Vec<&str> {
    lines
        .iter()
        .filter(|l| l.stream == stream)
        .map(|l| l.text.as_str())
        .collect()
}

const IDLE_LOOP: &str = "while true; do sleep 0.1; done\n";

/// Run `f` with a subscriber that records every event as plain text.
fn capture_log(f: impl FnOnce()) -> String {
    #[derive(Clone)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Buffer {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer(Arc::new(Mutex::new(Vec::new())));
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap_or_else(|p| p.into_inner()).clone();
    String::from_utf8_lossy(&bytes).into_owned()
}

// =============================================================================
// Launch
// =============================================================================

/// The first candidate that exists is launched; later ones are ignored.
#[test]
fn e2e_launches_first_existing_candidate() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("a")).unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    let first = write_script(&dir.path().join("a"), "backend", IDLE_LOOP);
    let second = write_script(&dir.path().join("b"), "backend", IDLE_LOOP);

    let mut sup = Supervisor::new(config(
        vec![dir.path().join("missing").join("backend"), first.clone(), second],
        Duration::from_secs(5),
        None,
    ));

    let pid = sup.start().expect("backend should launch");
    assert_eq!(sup.backend_path(), Some(first.as_path()));
    assert_eq!(sup.state(), SupervisorState::Running { pid });
    assert_eq!(sup.pid(), Some(pid));
    assert_eq!(sup.launch_count(), 1);

    sup.shutdown();
}

/// The backend runs with its own directory as the working directory.
#[test]
fn e2e_backend_cwd_is_its_directory() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "backend", "pwd -P > cwd.txt\n");

    let mut sup = Supervisor::new(config(vec![script], Duration::from_secs(5), None));
    sup.start().unwrap();
    pump_until(&mut sup, |s| s.state() == SupervisorState::Stopped);

    let recorded = fs::read_to_string(dir.path().join("cwd.txt"))
        .expect("cwd.txt should be written next to the backend");
    assert_eq!(
        fs::canonicalize(recorded.trim()).unwrap(),
        fs::canonicalize(dir.path()).unwrap()
    );
}

/// A file that exists but cannot be executed is a spawn failure: nothing is
/// held and no retry is ever scheduled.
#[test]
fn e2e_unexecutable_backend_is_not_retried() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_plain(dir.path(), "backend", "exit 0\n");

    let mut sup = Supervisor::new(config(vec![script], Duration::from_millis(100), None));
    let result = sup.start();
    assert!(
        matches!(result, Err(SupervisorError::SpawnFailed { .. })),
        "expected SpawnFailed, got {result:?}"
    );
    assert_eq!(sup.pid(), None);
    assert_eq!(sup.state(), SupervisorState::Stopped);

    sup.poll_at(Instant::now() + Duration::from_secs(60));
    assert_eq!(sup.launch_count(), 0);
    assert_eq!(sup.state(), SupervisorState::Stopped);
}

// =============================================================================
// Output forwarding
// =============================================================================

/// Stderr chunks arrive verbatim and tagged as stderr; stdout as stdout.
#[test]
fn e2e_output_is_forwarded_per_stream() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "backend",
        "echo 'listening on 8000'\nprintf 'spaced  \\n' >&2\nprintf 'no newline' >&2\nexit 0\n",
    );

    let mut sup = Supervisor::new(config(vec![script], Duration::from_secs(5), None));
    sup.start().unwrap();
    let lines = pump_until(&mut sup, |s| s.state() == SupervisorState::Stopped);

    assert_eq!(texts(&lines, OutputStream::Stdout), vec!["listening on 8000"]);
    assert_eq!(
        texts(&lines, OutputStream::Stderr),
        vec!["spaced  ", "no newline"]
    );
}

// =============================================================================
// Exit handling and restart
// =============================================================================

/// A clean exit stops supervision; nothing is relaunched later.
#[test]
fn e2e_zero_exit_is_not_restarted() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "backend", "exit 0\n");

    let mut sup = Supervisor::new(config(vec![script], Duration::from_millis(100), None));
    sup.start().unwrap();
    pump_until(&mut sup, |s| s.state() == SupervisorState::Stopped);

    sup.poll_at(Instant::now() + Duration::from_secs(10));
    assert_eq!(sup.state(), SupervisorState::Stopped);
    assert_eq!(sup.launch_count(), 1);
    assert_eq!(sup.last_error(), None);
}

/// A crash schedules exactly one relaunch, no earlier than the delay.
#[test]
fn e2e_crash_restarts_after_delay() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "backend", "echo starting\nexit 1\n");

    let mut sup = Supervisor::new(config(vec![script], Duration::from_secs(5), None));
    sup.start().unwrap();
    pump_until(&mut sup, |s| {
        matches!(s.state(), SupervisorState::PendingRestart { .. })
    });

    let SupervisorState::PendingRestart { due } = sup.state() else {
        unreachable!();
    };
    assert_eq!(sup.pid(), None);
    assert!(sup.last_error().unwrap().contains("crashed"));

    sup.poll_at(due - Duration::from_millis(1));
    assert_eq!(sup.launch_count(), 1, "relaunched before the delay elapsed");

    sup.poll_at(due);
    assert_eq!(sup.launch_count(), 2);
    assert!(matches!(sup.state(), SupervisorState::Running { .. }));

    sup.shutdown();
}

/// With a restart cap, supervision stops once the cap is used up.
#[test]
fn e2e_restart_cap_stops_supervision() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "backend", "exit 2\n");

    let mut sup = Supervisor::new(config(vec![script], Duration::from_millis(50), Some(2)));
    sup.start().unwrap();
    pump_until(&mut sup, |s| s.state() == SupervisorState::Stopped);

    assert_eq!(sup.launch_count(), 3);
    assert!(sup.last_error().unwrap().contains("giving up"));
}

/// A backend that stayed up long enough before crashing gets a fresh
/// restart allowance, so the cap only counts back-to-back crashes.
#[test]
fn e2e_stable_run_resets_restart_cap() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "backend", "exit 1\n");

    let mut sup = Supervisor::new(config(vec![script], Duration::from_secs(5), Some(1)));
    sup.start().unwrap();
    pump_until(&mut sup, |s| {
        matches!(s.state(), SupervisorState::PendingRestart { .. })
    });
    let due = sup.restart_due().unwrap();
    sup.poll_at(due);
    assert_eq!(sup.launch_count(), 2);

    // Observe the second exit as if the backend had run for over a minute.
    let deadline = Instant::now() + Duration::from_secs(10);
    while matches!(sup.state(), SupervisorState::Running { .. }) {
        assert!(Instant::now() < deadline, "second launch never exited");
        std::thread::sleep(Duration::from_millis(20));
        sup.poll_at(Instant::now() + Duration::from_secs(61));
    }

    assert!(
        matches!(sup.state(), SupervisorState::PendingRestart { .. }),
        "cap was not reset: {:?}",
        sup.state()
    );
    assert_eq!(sup.launch_count(), 2);
    sup.shutdown();
}

// =============================================================================
// Shutdown
// =============================================================================

/// Shutdown sends one termination signal, however often it is called, and a
/// backend that exits non-zero in response is not restarted.
#[test]
fn e2e_shutdown_terminates_exactly_once() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("terms.txt");
    let body = format!(
        "trap 'echo term >> \"{}\"; exit 3' TERM\necho ready\n{IDLE_LOOP}",
        marker.display()
    );
    let script = write_script(dir.path(), "backend", &body);

    let mut sup = Supervisor::new(config(vec![script], Duration::from_millis(50), None));
    let pid = sup.start().unwrap();
    wait_for_line(&mut sup, "ready");

    sup.shutdown();
    assert_eq!(sup.state(), SupervisorState::Terminating { pid });
    sup.shutdown();

    pump_until(&mut sup, |s| s.state() == SupervisorState::Stopped);
    sup.poll_at(Instant::now() + Duration::from_secs(10));
    assert_eq!(sup.launch_count(), 1);
    assert_eq!(sup.state(), SupervisorState::Stopped);

    let recorded = fs::read_to_string(&marker).unwrap();
    assert_eq!(recorded.lines().count(), 1, "marker: {recorded:?}");
}

/// A backend that ignores the termination signal is killed once the grace
/// period runs out.
#[test]
fn e2e_shutdown_grace_escalates_to_kill() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "backend",
        &format!("trap '' TERM\necho ready\n{IDLE_LOOP}"),
    );

    let mut cfg = config(vec![script], Duration::from_millis(50), None);
    cfg.shutdown_grace = Duration::from_millis(300);
    let mut sup = Supervisor::new(cfg);
    sup.start().unwrap();
    wait_for_line(&mut sup, "ready");

    let started = Instant::now();
    sup.shutdown();
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(sup.state(), SupervisorState::Stopped);
    assert_eq!(sup.pid(), None);

    sup.poll_at(Instant::now() + Duration::from_secs(10));
    assert_eq!(sup.launch_count(), 1);
}

/// Quitting while a restart is pending cancels it.
#[test]
fn e2e_shutdown_cancels_pending_restart() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "backend", "exit 1\n");

    let mut sup = Supervisor::new(config(vec![script], Duration::from_secs(5), None));
    sup.start().unwrap();
    pump_until(&mut sup, |s| {
        matches!(s.state(), SupervisorState::PendingRestart { .. })
    });

    sup.shutdown();
    assert_eq!(sup.state(), SupervisorState::Stopped);

    sup.poll_at(Instant::now() + Duration::from_secs(60));
    assert_eq!(sup.launch_count(), 1);
    assert_eq!(sup.state(), SupervisorState::Stopped);
}

/// A backend that has exited, but whose exit is still held up by a
/// grandchild keeping its pipes open, is never signalled: its pid may
/// already belong to another process.
#[test]
fn e2e_shutdown_skips_signal_for_reaped_backend() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "backend", "sleep 2 &\nexit 1\n");

    let mut sup = Supervisor::new(config(vec![script], Duration::from_millis(50), None));
    let pid = sup.start().unwrap();

    // Long enough for the exit waiter to reap the child.
    let settle = Instant::now() + Duration::from_millis(800);
    while Instant::now() < settle {
        sup.poll();
        std::thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(sup.state(), SupervisorState::Running { pid });

    let log = capture_log(|| sup.shutdown());
    assert!(log.contains("Backend already exited; no signal sent"), "log: {log}");
    assert!(!log.contains("Terminating backend..."), "log: {log}");
    assert_eq!(sup.state(), SupervisorState::Terminating { pid });

    pump_until(&mut sup, |s| s.state() == SupervisorState::Stopped);
    sup.poll_at(Instant::now() + Duration::from_secs(10));
    assert_eq!(sup.launch_count(), 1);
}
