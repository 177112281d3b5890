/// build.rs: Jewel build script.
///
/// Captures the version of the compiler building the crate and exposes it as
/// `JEWEL_RUSTC_VERSION`, which the platform detector reports as the runtime
/// version. Falls back to "unknown" when `rustc --version` cannot be run so
/// the build never fails on an unusual toolchain layout.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RUSTC");

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = std::process::Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .and_then(|text| text.split_whitespace().nth(1).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=JEWEL_RUSTC_VERSION={version}");
}
