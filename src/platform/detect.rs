// Jewel - platform/detect.rs
//
// Host platform detection: operating system family, version, architecture and
// the compiler/runtime version the binary was built with.
//
// The snapshot is computed once per process and cached. Callers receive an
// owned copy and thread it through the bootstrap explicitly; nothing reads
// the cache implicitly after startup.

use crate::util::constants;
use std::fmt;
use std::sync::OnceLock;

/// Closed classification of the host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    MacOs,
    Windows,
    Linux,
    OtherUnix,
    Unknown,
}

impl PlatformKind {
    /// Human-readable name used in diagnostics.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::OtherUnix => "Unix",
            Self::Unknown => "Unknown",
        }
    }

    /// True for every Unix-like family, macOS included.
    pub fn is_unix_family(self) -> bool {
        matches!(self, Self::MacOs | Self::Linux | Self::OtherUnix)
    }
}

/// Classify an OS name by case-insensitive substring match.
///
/// Priority order matters: "darwin" contains "win", so the macOS patterns are
/// checked before the Windows one.
pub fn classify(os_name: &str) -> PlatformKind {
    let name = os_name.to_lowercase();
    if name.contains("mac") || name.contains("darwin") {
        PlatformKind::MacOs
    } else if name.contains("win") {
        PlatformKind::Windows
    } else if name.contains("nux") {
        PlatformKind::Linux
    } else if ["nix", "bsd", "sunos", "solaris", "aix"]
        .iter()
        .any(|p| name.contains(p))
    {
        PlatformKind::OtherUnix
    } else {
        PlatformKind::Unknown
    }
}

/// True when the architecture string names a 64-bit ARM target.
pub fn is_aarch64(arch: &str) -> bool {
    let arch = arch.to_lowercase();
    arch.contains("aarch64") || arch.contains("arm64")
}

/// Immutable description of the host, created once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSnapshot {
    pub kind: PlatformKind,
    /// Raw OS name as reported by the host.
    pub os_name: String,
    pub os_version: String,
    pub os_arch: String,
    /// Version of the compiler that built this binary.
    pub runtime_version: String,
    /// Leading numeric component of `runtime_version` (0 if unparseable).
    pub runtime_major: u32,
    pub is_unix_family: bool,
    pub is_aarch64: bool,
}

impl PlatformSnapshot {
    /// Build a snapshot from explicit host strings. All derived fields are
    /// computed here, so two snapshots built from the same strings are equal.
    pub fn from_parts(
        os_name: impl Into<String>,
        os_version: impl Into<String>,
        os_arch: impl Into<String>,
        runtime_version: impl Into<String>,
    ) -> Self {
        let os_name = os_name.into();
        let os_arch = os_arch.into();
        let runtime_version = runtime_version.into();
        let kind = classify(&os_name);

        Self {
            kind,
            runtime_major: parse_major(&runtime_version),
            is_unix_family: kind.is_unix_family(),
            is_aarch64: is_aarch64(&os_arch),
            os_name,
            os_version: os_version.into(),
            os_arch,
            runtime_version,
        }
    }

    /// Emit the snapshot as a single structured event.
    pub fn log_system_info(&self) {
        tracing::info!(
            os = self.kind.display_name(),
            os_name = %self.os_name,
            os_version = %self.os_version,
            arch = %self.os_arch,
            aarch64 = self.is_aarch64,
            unix = self.is_unix_family,
            runtime = %self.runtime_version,
            "System information"
        );
    }
}

impl fmt::Display for PlatformSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlatformInfo[osType={}, osVersion={}, arch={}, runtime={}]",
            self.kind.display_name(),
            self.os_version,
            self.os_arch,
            self.runtime_version
        )
    }
}

fn parse_major(version: &str) -> u32 {
    version
        .split(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())
        .and_then(|part| part.parse().ok())
        .unwrap_or(0)
}

static SNAPSHOT: OnceLock<PlatformSnapshot> = OnceLock::new();

/// Detect the host platform.
///
/// The first call reads the environment; every later call returns an equal
/// copy of the cached snapshot.
pub fn detect() -> PlatformSnapshot {
    SNAPSHOT
        .get_or_init(|| {
            let snapshot = PlatformSnapshot::from_parts(
                std::env::consts::OS,
                read_os_version(),
                std::env::consts::ARCH,
                constants::RUNTIME_VERSION,
            );
            tracing::debug!(platform = %snapshot, "Platform detected");
            snapshot
        })
        .clone()
}

/// Best-effort OS version lookup. Never fails; returns "unknown" instead.
fn read_os_version() -> String {
    query_os_version()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(target_os = "linux")]
fn query_os_version() -> Option<String> {
    std::fs::read_to_string("/proc/sys/kernel/osrelease").ok()
}

#[cfg(target_os = "macos")]
fn query_os_version() -> Option<String> {
    let out = std::process::Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .ok()?;
    String::from_utf8(out.stdout).ok()
}

#[cfg(target_os = "windows")]
fn query_os_version() -> Option<String> {
    // `ver` prints e.g. "Microsoft Windows [Version 10.0.22631.3447]".
    let out = std::process::Command::new("cmd")
        .args(["/C", "ver"])
        .output()
        .ok()?;
    let text = String::from_utf8_lossy(&out.stdout).into_owned();
    let start = text.find("Version ")? + "Version ".len();
    let end = text[start..].find(']').map_or(text.len(), |i| start + i);
    Some(text[start..end].to_string())
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn query_os_version() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_table() {
        let cases = [
            ("Mac OS X", PlatformKind::MacOs),
            ("macos", PlatformKind::MacOs),
            ("Darwin", PlatformKind::MacOs),
            ("Windows 11", PlatformKind::Windows),
            ("windows", PlatformKind::Windows),
            ("Linux", PlatformKind::Linux),
            ("GNU/LINUX", PlatformKind::Linux),
            ("Unix", PlatformKind::OtherUnix),
            ("FreeBSD", PlatformKind::OtherUnix),
            ("SunOS", PlatformKind::OtherUnix),
            ("Haiku", PlatformKind::Unknown),
            ("", PlatformKind::Unknown),
        ];
        for (name, expected) in cases {
            assert_eq!(classify(name), expected, "os name {name:?}");
        }
    }

    #[test]
    fn test_aarch64_detection() {
        assert!(is_aarch64("aarch64"));
        assert!(is_aarch64("ARM64"));
        assert!(!is_aarch64("x86_64"));
        assert!(!is_aarch64("arm"));
    }

    #[test]
    fn test_unix_family_flags() {
        let cases = [
            ("Mac OS X", true),
            ("Linux", true),
            ("FreeBSD", true),
            ("Windows", false),
            ("Plan9", false),
        ];
        for (name, unix) in cases {
            let snap = PlatformSnapshot::from_parts(name, "1", "x86_64", "1.80.0");
            assert_eq!(snap.is_unix_family, unix, "os name {name:?}");
        }
    }

    #[test]
    fn test_mac_on_apple_silicon() {
        let snap = PlatformSnapshot::from_parts("Mac OS X", "14.4", "aarch64", "1.80.1");
        assert_eq!(snap.kind, PlatformKind::MacOs);
        assert!(snap.is_aarch64);
        assert!(snap.is_unix_family);
        assert_eq!(snap.runtime_major, 1);
    }

    #[test]
    fn test_runtime_major_parsing() {
        assert_eq!(parse_major("1.80.0"), 1);
        assert_eq!(parse_major("v21.0.2"), 21);
        assert_eq!(parse_major("unknown"), 0);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let first = detect();
        let second = detect();
        assert_eq!(first, second);
        assert_eq!(first.kind, classify(std::env::consts::OS));
    }

    #[test]
    fn test_display_format() {
        let snap = PlatformSnapshot::from_parts("linux", "6.8", "x86_64", "1.80.0");
        assert_eq!(
            snap.to_string(),
            "PlatformInfo[osType=Linux, osVersion=6.8, arch=x86_64, runtime=1.80.0]"
        );
    }
}
