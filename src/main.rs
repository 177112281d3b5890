// Jewel - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Platform detection and config.toml loading
// 3. Logging initialisation (debug mode support)
// 4. Handing over to the application shell, which runs the eframe window

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can use `crate::app::...`, `crate::ui::...` etc.
pub use jewel::app;
pub use jewel::platform;
pub use jewel::ui;
pub use jewel::util;

use app::shell::{ApplicationShell, ShellPaths};
use clap::Parser;
use platform::properties::EnvSink;
use std::path::PathBuf;
use ui::editor::{EditorWidget, TextEditor};

/// Jewel - lightweight cross-platform text editor.
#[derive(Parser, Debug)]
#[command(name = "Jewel", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Read configuration from this file instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Appearance for this run only: light, dark or system.
    #[arg(short = 't', long = "theme")]
    theme: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let snapshot = platform::detect::detect();
    let platform_paths = platform::config::PlatformPaths::resolve(&snapshot);

    // Config path: CLI override > platform default
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file());
    let (config, config_warnings) = platform::config::load_config(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "Jewel starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    let shell_paths = ShellPaths {
        log_root: platform_paths.log_root.clone(),
        prefs_file: Some(platform_paths.prefs_file()),
    };
    let mut shell = ApplicationShell::new(snapshot, config, shell_paths)
        .with_theme_override(cli.theme)
        .with_debug(cli.debug);

    let result = shell.start(&mut EnvSink, &mut gui::EframeHost, || {
        Box::new(TextEditor::new()) as Box<dyn EditorWidget>
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
