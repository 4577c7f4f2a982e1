/// build.rs - Nexus Shell build script.
///
/// On Windows targets: embeds assets/icon.ico into the compiled executable so
/// the titlebar, taskbar and Explorer show the shell's icon without any
/// runtime loading.
///
/// Uses CARGO_CFG_TARGET_OS rather than cfg!(target_os) so cross-compilation
/// picks the target, not the host.
///
/// On other targets this script is a no-op; the icon is set at runtime through
/// the eframe viewport builder.
fn main() {
    println!("cargo:rerun-if-changed=assets/icon.ico");

    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "windows" {
        let mut res = winres::WindowsResource::new();
        res.set_icon("assets/icon.ico");
        res.set("ProductName", "Nexus Shell");
        res.compile().expect(
            "Failed to compile Windows resources (winres). \
             Ensure a C compiler (MSVC or MinGW) is available.",
        );
    }
}
