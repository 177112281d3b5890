// Jewel - platform/properties.rs
//
// Platform-specific toolkit properties.
//
// Toolkit properties are process-level environment keys that the window host
// latches exactly once, when it builds the native window options. They must
// therefore be applied before the window is constructed; anything written
// afterwards is silently ignored for the rest of the run.
//
// Build order: baseline (all platforms) first, then the platform subset,
// then user overrides from `[toolkit]` in config.toml. Keys are unique within
// a set: an override replaces the existing value in place rather than
// appending a duplicate key.

use super::detect::{PlatformKind, PlatformSnapshot};
use crate::util::constants;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// Keys
// =============================================================================

pub const DPI_AWARE: &str = "JEWEL_DPI_AWARE";
pub const NO_ERASE_BACKGROUND: &str = "JEWEL_NO_ERASE_BACKGROUND";
pub const BUFFER_PER_WINDOW: &str = "JEWEL_BUFFER_PER_WINDOW";
pub const TEXT_ANTIALIAS: &str = "JEWEL_TEXT_ANTIALIAS";
pub const UI_SCALE_ENABLED: &str = "JEWEL_UI_SCALE_ENABLED";

pub const HW_ACCEL: &str = "JEWEL_HW_ACCEL";

pub const MACOS_SCREEN_MENU_BAR: &str = "JEWEL_MACOS_SCREEN_MENU_BAR";
pub const MACOS_APP_NAME: &str = "JEWEL_MACOS_APP_NAME";
pub const MACOS_LIVE_RESIZE: &str = "JEWEL_MACOS_LIVE_RESIZE";
pub const MACOS_FULLSCREEN_CAPTURE_ALL: &str = "JEWEL_MACOS_FULLSCREEN_CAPTURE_ALL";

pub const WIN_FORCE_VRAM: &str = "JEWEL_WIN_FORCE_VRAM";
pub const WIN_HW_SCALE: &str = "JEWEL_WIN_HW_SCALE";

pub const LINUX_OFFSCREEN_PIXMAPS: &str = "JEWEL_LINUX_OFFSCREEN_PIXMAPS";
pub const LINUX_SYSTEM_AA_FONTS: &str = "JEWEL_LINUX_SYSTEM_AA_FONTS";

// =============================================================================
// PropertySet
// =============================================================================

/// Ordered `(key, value)` pairs to apply to the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    entries: Vec<(String, String)>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing the value in place if the key is already present.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// User adjustments to the generated property set (`[toolkit]` in config.toml).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyOverrides {
    /// Extra or replacement values, applied after the platform subset.
    pub set: BTreeMap<String, String>,
    /// Keys that must not be applied at all.
    pub disable: BTreeSet<String>,
}

/// Properties applied on every platform, Unknown included.
pub fn baseline_properties() -> &'static [(&'static str, &'static str)] {
    &[
        (DPI_AWARE, "true"),
        (NO_ERASE_BACKGROUND, "true"),
        (BUFFER_PER_WINDOW, "true"),
        (TEXT_ANTIALIAS, "true"),
        (UI_SCALE_ENABLED, "true"),
    ]
}

/// Properties specific to one platform family. Empty for OtherUnix/Unknown.
pub fn platform_properties(kind: PlatformKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        PlatformKind::MacOs => &[
            (MACOS_SCREEN_MENU_BAR, "true"),
            (MACOS_APP_NAME, constants::APP_NAME),
            (HW_ACCEL, "preferred"),
            (MACOS_LIVE_RESIZE, "false"),
            (MACOS_FULLSCREEN_CAPTURE_ALL, "false"),
        ],
        PlatformKind::Windows => &[
            (HW_ACCEL, "preferred"),
            (WIN_FORCE_VRAM, "true"),
            (WIN_HW_SCALE, "true"),
        ],
        PlatformKind::Linux => &[
            (HW_ACCEL, "preferred"),
            (LINUX_OFFSCREEN_PIXMAPS, "false"),
            (LINUX_SYSTEM_AA_FONTS, "on"),
        ],
        PlatformKind::OtherUnix | PlatformKind::Unknown => &[],
    }
}

/// Build the deterministic property set for `snapshot`.
pub fn build_property_set(
    snapshot: &PlatformSnapshot,
    overrides: &PropertyOverrides,
) -> PropertySet {
    let mut set = PropertySet::new();
    for (key, value) in baseline_properties()
        .iter()
        .chain(platform_properties(snapshot.kind))
    {
        set.set(key, value);
    }
    for (key, value) in &overrides.set {
        set.set(key, value);
    }
    for key in &overrides.disable {
        set.remove(key);
    }
    set
}

// =============================================================================
// Sinks
// =============================================================================

/// Destination for toolkit properties.
pub trait PropertySink {
    fn set(&mut self, key: &str, value: &str);
}

/// Writes properties into the process environment.
///
/// Must only be used during single-threaded startup, before the window host
/// or any worker thread reads the environment.
#[derive(Debug, Default)]
pub struct EnvSink;

impl PropertySink for EnvSink {
    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

/// In-memory sink: records `(key, value)` pairs in application order
/// instead of touching the process environment, for shell runs that must
/// leave the environment alone (embedding, integration tests).
impl PropertySink for Vec<(String, String)> {
    fn set(&mut self, key: &str, value: &str) {
        self.push((key.to_string(), value.to_string()));
    }
}

/// Build and apply the property set for `snapshot`, in order.
///
/// Re-applying is harmless; the bootstrap calls it exactly once, before the
/// appearance is installed and before the window is built.
pub fn apply(
    snapshot: &PlatformSnapshot,
    overrides: &PropertyOverrides,
    sink: &mut dyn PropertySink,
) -> PropertySet {
    let set = build_property_set(snapshot, overrides);
    for (key, value) in set.iter() {
        sink.set(key, value);
        tracing::debug!(key, value, "Set toolkit property");
    }
    tracing::info!(
        platform = snapshot.kind.display_name(),
        count = set.len(),
        "Toolkit properties applied"
    );
    set
}

// =============================================================================
// Latched settings
// =============================================================================

/// Hardware-acceleration preference for the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareAcceleration {
    Preferred,
    Required,
    Off,
}

/// Toolkit properties as read once by the window host.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolkitSettings {
    pub hardware_acceleration: HardwareAcceleration,
    /// Per-window buffering maps to vsync.
    pub vsync: bool,
    pub text_antialias: bool,
    pub dpi_aware: bool,
    /// When false the window is not cleared to the panel colour before paint.
    pub erase_background: bool,
    /// Application id/name shown by the OS (macOS application menu).
    pub app_name: String,
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            hardware_acceleration: HardwareAcceleration::Preferred,
            vsync: true,
            text_antialias: true,
            dpi_aware: true,
            erase_background: true,
            app_name: constants::APP_NAME.to_string(),
        }
    }
}

impl ToolkitSettings {
    /// Read the latched property values through `lookup`.
    ///
    /// Missing or unrecognised values keep the defaults.
    pub fn latch(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(v) = lookup(HW_ACCEL) {
            match v.to_lowercase().as_str() {
                "preferred" => settings.hardware_acceleration = HardwareAcceleration::Preferred,
                "required" => settings.hardware_acceleration = HardwareAcceleration::Required,
                "off" | "false" => settings.hardware_acceleration = HardwareAcceleration::Off,
                other => {
                    tracing::warn!(key = HW_ACCEL, value = other, "Ignoring unrecognised value")
                }
            }
        }
        if let Some(b) = lookup(BUFFER_PER_WINDOW).as_deref().and_then(parse_flag) {
            settings.vsync = b;
        }
        if let Some(b) = lookup(TEXT_ANTIALIAS).as_deref().and_then(parse_flag) {
            settings.text_antialias = b;
        }
        if let Some(b) = lookup(DPI_AWARE).as_deref().and_then(parse_flag) {
            settings.dpi_aware = b;
        }
        if let Some(b) = lookup(NO_ERASE_BACKGROUND).as_deref().and_then(parse_flag) {
            settings.erase_background = !b;
        }
        if let Some(name) = lookup(MACOS_APP_NAME).filter(|n| !n.is_empty()) {
            settings.app_name = name;
        }

        settings
    }

    /// Read the latched values from the process environment.
    pub fn from_env() -> Self {
        Self::latch(|key| std::env::var(key).ok())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}
