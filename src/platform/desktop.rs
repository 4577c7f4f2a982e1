// Nexus Shell - platform/desktop.rs
//
// Desktop-environment conventions for the window host.

/// Whether closing the last window should quit the application.
///
/// macOS applications conventionally stay resident after their last window
/// closes and quit only on an explicit Cmd+Q; every other platform quits.
pub fn quits_when_windows_closed(os: &str) -> bool {
    os != "macos"
}

/// [`quits_when_windows_closed`] for the platform the shell is running on.
pub fn host_quits_when_windows_closed() -> bool {
    quits_when_windows_closed(std::env::consts::OS)
}
