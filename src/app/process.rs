// Nexus Shell - app/process.rs
//
// Backend child process: spawn, output forwarding, exit observation.
//
// Architecture:
//   - `spawn_backend` starts the executable directly (never through a shell)
//     with its own directory as the working directory.
//   - Two reader threads, one per output stream, send each chunk to the
//     supervisor as `ProcessEvent::Output` over an mpsc channel.
//   - A waiter thread polls the child for exit every EXIT_POLL_INTERVAL_MS,
//     joins both readers so every chunk is delivered first, then sends
//     `ProcessEvent::Exited`.
//   - The `Child` lives behind `Arc<Mutex<_>>` so the supervisor can signal
//     it while the waiter is polling; the lock is never held across a sleep.
//
// Output chunks are newline-delimited, decoded as lossy UTF-8, with the
// trailing "\n" or "\r\n" removed and nothing else changed. A line longer than
// MAX_OUTPUT_CHUNK_BYTES is delivered in several chunks.

use crate::core::locate::working_dir_for;
use crate::core::model::{ExitOutcome, OutputStream, ProcessEvent};
use crate::platform;
use crate::util::constants::{EXIT_POLL_INTERVAL_MS, MAX_OUTPUT_CHUNK_BYTES};
use crate::util::error::SupervisorError;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// A running backend child and the handle used to signal it.
#[derive(Debug)]
pub struct BackendProcess {
    /// Launch generation this child belongs to.
    pub launch: u64,
    /// OS process ID.
    pub pid: u32,
    /// Executable that was launched.
    pub path: PathBuf,
    /// When the child was spawned.
    pub started: Instant,
    child: Arc<Mutex<Child>>,
}

impl BackendProcess {
    /// Send the termination signal. Does not wait for the child to exit.
    ///
    /// `Ok(false)` means the child had already exited and was not signalled.
    /// The check and the signal happen under one lock, so a child reaped by
    /// the waiter thread is never signalled by PID.
    pub fn terminate(&self) -> Result<bool, SupervisorError> {
        platform::process::terminate(&mut lock(&self.child)).map_err(|e| {
            SupervisorError::Signal {
                pid: self.pid,
                source: e,
            }
        })
    }

    /// Kill the child immediately. `Ok(false)` if it had already exited.
    pub fn force_kill(&self) -> Result<bool, SupervisorError> {
        platform::process::force_kill(&mut lock(&self.child)).map_err(|e| {
            SupervisorError::Signal {
                pid: self.pid,
                source: e,
            }
        })
    }

    /// Whether the child has exited. Errors are treated as "still running".
    pub fn has_exited(&self) -> bool {
        matches!(lock(&self.child).try_wait(), Ok(Some(_)))
    }
}

/// Spawn `path` as launch number `launch`, forwarding its output and exit
/// notification over `tx`.
pub fn spawn_backend(
    path: &Path,
    launch: u64,
    tx: mpsc::Sender<ProcessEvent>,
) -> Result<BackendProcess, SupervisorError> {
    let cwd = working_dir_for(path);

    let mut cmd = Command::new(path);
    cmd.current_dir(&cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    platform::process::configure_command(&mut cmd);

    let mut child = cmd.spawn().map_err(|e| SupervisorError::SpawnFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let pid = child.id();
    tracing::debug!(pid, launch, cwd = %cwd.display(), "Backend spawned");

    let mut readers: Vec<JoinHandle<()>> = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        let tx = tx.clone();
        readers.push(std::thread::spawn(move || {
            forward_stream(stdout, OutputStream::Stdout, launch, &tx);
        }));
    }
    if let Some(stderr) = child.stderr.take() {
        let tx = tx.clone();
        readers.push(std::thread::spawn(move || {
            forward_stream(stderr, OutputStream::Stderr, launch, &tx);
        }));
    }

    let child = Arc::new(Mutex::new(child));
    let waiter_child = Arc::clone(&child);
    std::thread::spawn(move || {
        wait_for_exit(waiter_child, readers, launch, tx);
    });

    Ok(BackendProcess {
        launch,
        pid,
        path: path.to_path_buf(),
        started: Instant::now(),
        child,
    })
}

/// Lock the child, recovering from a poisoned mutex: the `Child` itself is
/// still valid even if another thread panicked while holding it.
fn lock(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read `stream` to EOF, sending each chunk as an `Output` event.
fn forward_stream<R: Read>(
    stream: R,
    which: OutputStream,
    launch: u64,
    tx: &mpsc::Sender<ProcessEvent>,
) {
    let mut reader = BufReader::new(stream);
    let mut buf: Vec<u8> = Vec::new();

    loop {
        buf.clear();
        match read_chunk(&mut reader, &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let event = ProcessEvent::Output {
                    launch,
                    stream: which,
                    text: chunk_text(&buf),
                };
                if tx.send(event).is_err() {
                    // Supervisor gone: the shell is exiting.
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(stream = %which, launch, error = %e, "Backend stream read failed");
                break;
            }
        }
    }

    tracing::trace!(stream = %which, launch, "Backend stream closed");
}

/// Read one newline-terminated chunk, capped at `MAX_OUTPUT_CHUNK_BYTES`.
fn read_chunk<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
    reader
        .by_ref()
        .take(MAX_OUTPUT_CHUNK_BYTES as u64)
        .read_until(b'\n', buf)
}

/// Decode a chunk, dropping only the line terminator.
fn chunk_text(bytes: &[u8]) -> String {
    let mut end = bytes.len();
    if end > 0 && bytes[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && bytes[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Waiter thread body: poll for exit, drain readers, report.
fn wait_for_exit(
    child: Arc<Mutex<Child>>,
    readers: Vec<JoinHandle<()>>,
    launch: u64,
    tx: mpsc::Sender<ProcessEvent>,
) {
    let outcome = loop {
        let polled = lock(&child).try_wait();
        match polled {
            Ok(Some(status)) => break ExitOutcome::from(status),
            Ok(None) => std::thread::sleep(Duration::from_millis(EXIT_POLL_INTERVAL_MS)),
            Err(e) => {
                tracing::error!(launch, error = %e, "Waiting on backend process failed");
                let _ = tx.send(ProcessEvent::WaitFailed {
                    launch,
                    message: e.to_string(),
                });
                return;
            }
        }
    };

    // The exit notification follows all output. A grandchild that inherited
    // the pipes keeps them open and delays this until it exits too.
    for reader in readers {
        if reader.join().is_err() {
            tracing::warn!(launch, "Backend output reader thread panicked");
        }
    }

    let _ = tx.send(ProcessEvent::Exited { launch, outcome });
}
