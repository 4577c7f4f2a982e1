// Nexus Shell - platform/process.rs
//
// OS-specific process control for the backend child.
//
// Platform behaviour:
// - **Unix**: termination is `kill -TERM <pid>` so the backend can shut down
//   cleanly; the forced kill is `Child::kill` (SIGKILL).
// - **Windows**: there is no SIGTERM equivalent for console-less processes,
//   so termination is `Child::kill` (TerminateProcess). Spawned children get
//   `CREATE_NO_WINDOW` so no console window flashes up.

use std::io;
use std::process::{Child, Command};

/// Windows process creation flag that suppresses the console window.
#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Apply platform flags to a backend command before it is spawned.
pub fn configure_command(cmd: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

/// Ask the child to terminate. Does not wait for it to exit.
///
/// Returns `Ok(false)` without signalling when the child has already been
/// reaped: its PID may belong to another process by now.
#[cfg(unix)]
pub fn terminate(child: &mut Child) -> io::Result<bool> {
    if child.try_wait()?.is_some() {
        return Ok(false);
    }

    let pid = child.id();
    let status = Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()?;
    if status.success() {
        Ok(true)
    } else {
        // The child can exit between try_wait and kill.
        match child.try_wait()? {
            Some(_) => Ok(false),
            None => Err(io::Error::other(format!(
                "kill -TERM {pid} exited with {status}"
            ))),
        }
    }
}

/// Ask the child to terminate. Does not wait for it to exit.
#[cfg(not(unix))]
pub fn terminate(child: &mut Child) -> io::Result<bool> {
    force_kill(child)
}

/// Kill the child immediately. Returns `Ok(false)` if it had already exited.
pub fn force_kill(child: &mut Child) -> io::Result<bool> {
    if child.try_wait()?.is_some() {
        return Ok(false);
    }
    match child.kill() {
        Ok(()) => Ok(true),
        // Exited between try_wait and kill.
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_reaped_child_is_never_signalled() {
        let mut child = Command::new("sh").args(["-c", "exit 0"]).spawn().unwrap();
        child.wait().unwrap();

        assert!(!terminate(&mut child).unwrap());
        assert!(!force_kill(&mut child).unwrap());
    }

    #[test]
    fn test_running_child_receives_sigterm() {
        use std::os::unix::process::ExitStatusExt;

        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        assert!(terminate(&mut child).unwrap());

        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(15));
    }
}
