// Jewel - app/shell.rs
//
// Application shell: runs the bootstrap sequence in a fixed order and then
// hands control to the window host's event loop.
//
//   Uninitialized → PlatformConfigured → AppearanceApplied → LoggerOpened
//   → WindowShown → Running → ShuttingDown → Terminated
//
// The sequence is linear. Appearance and logger failures are reported on
// stderr and through tracing as `JewelError`s, then recovered locally
// (default appearance, no session log); neither aborts startup. Toolkit properties and the
// appearance are always settled before the window spec is built, because the
// host latches them when it creates the native window.

use super::appearance::{Appearance, AppearanceManager};
use super::session_log::{self, LogSettings, SessionLogger};
use super::state::AppState;
use super::termination::{ShutdownGuard, TerminationHook};
use crate::platform::config::AppConfig;
use crate::platform::detect::PlatformSnapshot;
use crate::platform::properties::{self, PropertySink, ToolkitSettings};
use crate::util::constants;
use crate::util::error::{JewelError, WindowError};
use chrono::Local;
use std::path::PathBuf;

pub use crate::platform::config::BootstrapOptions;

/// Bootstrap progress. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShellState {
    Uninitialized,
    PlatformConfigured,
    AppearanceApplied,
    LoggerOpened,
    WindowShown,
    Running,
    ShuttingDown,
    Terminated,
}

/// Everything the host needs to build the single top-level window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub min_size: [f32; 2],
    pub inner_size: [f32; 2],
    pub resizable: bool,
    pub appearance: Appearance,
    pub ui_scale: f32,
    pub toolkit: ToolkitSettings,
}

impl WindowSpec {
    pub fn new(appearance: Appearance, ui_scale: f32, toolkit: ToolkitSettings) -> Self {
        Self {
            title: constants::APP_NAME.to_string(),
            min_size: [constants::WINDOW_MIN_WIDTH, constants::WINDOW_MIN_HEIGHT],
            inner_size: [constants::WINDOW_DEFAULT_WIDTH, constants::WINDOW_DEFAULT_HEIGHT],
            resizable: true,
            appearance,
            ui_scale,
            toolkit,
        }
    }
}

/// Seam to the GUI event loop.
///
/// `run` creates the window described by `window`, embeds `editor`, and
/// returns when the window is closed.
pub trait WindowHost<E> {
    fn run(&mut self, window: WindowSpec, state: AppState, editor: E) -> Result<(), WindowError>;
}

/// Filesystem locations the shell writes to.
#[derive(Debug, Clone)]
pub struct ShellPaths {
    /// Default session log root (config.toml may override it).
    pub log_root: PathBuf,
    /// Preferences file; `None` keeps preferences in memory only.
    pub prefs_file: Option<PathBuf>,
}

/// Orchestrates the bootstrap sequence.
#[derive(Debug)]
pub struct ApplicationShell {
    snapshot: PlatformSnapshot,
    config: AppConfig,
    paths: ShellPaths,
    theme_override: Option<String>,
    install_process_hooks: bool,
    debug_mode: bool,
    state: ShellState,
    history: Vec<ShellState>,
    reported: Vec<String>,
    session_log: Option<SessionLogger>,
}

impl ApplicationShell {
    pub fn new(snapshot: PlatformSnapshot, config: AppConfig, paths: ShellPaths) -> Self {
        Self {
            snapshot,
            config,
            paths,
            theme_override: None,
            install_process_hooks: true,
            debug_mode: false,
            state: ShellState::Uninitialized,
            history: vec![ShellState::Uninitialized],
            reported: Vec::new(),
            session_log: None,
        }
    }

    /// Request an appearance for this run only (e.g. from the command line).
    /// The saved preference is not changed.
    pub fn with_theme_override(mut self, theme: Option<String>) -> Self {
        self.theme_override = theme;
        self
    }

    /// Skip registering the process-wide panic hook and signal handler (used
    /// by tests, where both would outlive the shell).
    pub fn without_process_hooks(mut self) -> Self {
        self.install_process_hooks = false;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[ShellState] {
        &self.history
    }

    /// Recovered failures reported during bootstrap.
    pub fn reported_errors(&self) -> &[String] {
        &self.reported
    }

    /// Session log opened during bootstrap, if any.
    pub fn session_log(&self) -> Option<&SessionLogger> {
        self.session_log.as_ref()
    }

    /// Run the whole sequence: configure, open the window, block in the
    /// event loop until it closes, then shut down.
    ///
    /// Only a host launch failure is returned as an error, and even then the
    /// shell still reaches `Terminated` with the session log closed.
    pub fn start<E, H>(
        &mut self,
        sink: &mut dyn PropertySink,
        host: &mut H,
        editor_factory: impl FnOnce() -> E,
    ) -> Result<(), JewelError>
    where
        H: WindowHost<E>,
    {
        println!(
            "Running on: {} ({})",
            self.snapshot.os_name,
            self.snapshot.kind.display_name()
        );

        let toolkit = self.configure_platform(sink);
        let appearance = self.apply_appearance();
        let session_log = self.open_session_log();
        let _guard = ShutdownGuard::new(session_log.clone());

        appearance.log_system_info(&self.snapshot);

        let spec = WindowSpec::new(appearance.current(), appearance.ui_scale(), toolkit);
        let editor = editor_factory();
        let mut state = AppState::new(
            self.snapshot.clone(),
            appearance,
            session_log.clone(),
            self.debug_mode,
        );
        state.warnings = self.reported.clone();
        self.advance(ShellState::WindowShown);
        tracing::info!(title = %spec.title, "Window created");

        self.advance(ShellState::Running);
        let result = host.run(spec, state, editor).map_err(JewelError::from);

        self.advance(ShellState::ShuttingDown);
        if let Err(ref e) = result {
            self.report("Window host failed", e);
            if let Some(log) = &session_log {
                log.error_with_source("Window host failed", e);
            }
        }
        if let Some(log) = &session_log {
            log.close();
        }
        self.advance(ShellState::Terminated);
        tracing::info!("Shutdown complete");

        result
    }

    /// Uninitialized → PlatformConfigured.
    fn configure_platform(&mut self, sink: &mut dyn PropertySink) -> ToolkitSettings {
        let toolkit = if self.config.bootstrap.apply_platform_tuning {
            let set = properties::apply(&self.snapshot, &self.config.toolkit_overrides, sink);
            ToolkitSettings::latch(|key| {
                set.get(key)
                    .map(str::to_string)
                    .or_else(|| std::env::var(key).ok())
            })
        } else {
            tracing::info!("Platform tuning disabled");
            ToolkitSettings::from_env()
        };
        self.advance(ShellState::PlatformConfigured);
        toolkit
    }

    /// PlatformConfigured → AppearanceApplied. Never fails.
    fn apply_appearance(&mut self) -> AppearanceManager {
        let mut manager = AppearanceManager::new(self.paths.prefs_file.clone());

        if self.config.bootstrap.install_custom_appearance {
            // An explicit request (CLI or config.toml) applies to this run
            // only; the saved preference is re-installed as it was.
            let requested = self.theme_override.as_deref().or(self.config.theme.as_deref());
            let installed = match requested {
                Some(selection) => manager.setup_transient(selection),
                None => {
                    let selection = manager.startup_selection(None);
                    manager.setup(&selection)
                }
            };
            if let Err(e) = installed {
                self.report("Failed to install appearance", &JewelError::from(e));
                manager.install_default();
            }
        } else {
            manager.install_default();
        }
        manager.init_ui_scale(self.config.ui_scale);

        self.advance(ShellState::AppearanceApplied);
        manager
    }

    /// AppearanceApplied → LoggerOpened. Never fails; a logger error leaves
    /// the run without a session log.
    fn open_session_log(&mut self) -> Option<SessionLogger> {
        let log = if self.config.bootstrap.enable_session_logging {
            let root = self
                .config
                .log_directory
                .clone()
                .unwrap_or_else(|| self.paths.log_root.clone());
            let settings = LogSettings {
                max_file_size: self.config.max_log_file_size,
                ..LogSettings::default()
            };
            match SessionLogger::open(&root, &session_log::new_session_id(), settings) {
                Ok(log) => {
                    log.info(constants::STARTUP_MESSAGE);
                    log.info(format!("Platform: {}", self.snapshot));
                    println!("Session directory is: {}", log.session_dir().display());
                    println!("Log file is located at: {}", log.log_file_path().display());

                    session_log::cleanup_old_sessions(
                        &root,
                        self.config.log_retention_days,
                        Local::now().naive_local(),
                    );
                    if self.install_process_hooks {
                        self.install_termination_hooks(&log);
                    }
                    Some(log)
                }
                Err(e) => {
                    self.report("Failed to initialize logger", &JewelError::from(e));
                    None
                }
            }
        } else {
            tracing::info!("Session logging disabled");
            None
        };

        self.session_log = log.clone();
        self.advance(ShellState::LoggerOpened);
        log
    }

    /// Panic hook plus Ctrl+C / termination signal handler. A handler that
    /// cannot be registered is logged and the run goes on without it.
    fn install_termination_hooks(&self, log: &SessionLogger) {
        TerminationHook::new(log.clone()).install();
        if let Err(e) = TerminationHook::new(log.clone()).install_signal_handler() {
            tracing::warn!(error = %e, "Could not register signal handler");
            log.warning(format!("Termination signals will not be logged: {e}"));
        }
    }

    fn advance(&mut self, next: ShellState) {
        debug_assert!(next > self.state, "shell cannot move from {:?} to {next:?}", self.state);
        tracing::debug!(from = ?self.state, to = ?next, "Shell transition");
        self.state = next;
        self.history.push(next);
    }

    fn report(&mut self, context: &str, err: &JewelError) {
        let message = format!("{context}: {err}");
        eprintln!("{message}");
        tracing::error!("{}", message);
        self.reported.push(message);
    }
}
