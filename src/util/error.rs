// Jewel - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every bootstrap failure has a documented fallback; these types carry enough
// context for the fallback path to report what went wrong.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all Jewel operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum JewelError {
    /// Session log could not be created or written.
    Logger(LoggerError),

    /// Requested appearance could not be installed.
    Appearance(AppearanceError),

    /// The window or its event loop could not be started.
    Window(WindowError),
}

impl fmt::Display for JewelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logger(e) => write!(f, "Logger error: {e}"),
            Self::Appearance(e) => write!(f, "Appearance error: {e}"),
            Self::Window(e) => write!(f, "Window error: {e}"),
        }
    }
}

impl std::error::Error for JewelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Logger(e) => Some(e),
            Self::Appearance(e) => Some(e),
            Self::Window(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger errors
// ---------------------------------------------------------------------------

/// Errors related to the session log.
#[derive(Debug)]
pub enum LoggerError {
    /// A directory on the log path could not be created.
    CreateDir { path: PathBuf, source: io::Error },

    /// The log file could not be created or opened for appending.
    CreateFile { path: PathBuf, source: io::Error },

    /// The volume holding the log has less free space than required.
    InsufficientSpace {
        path: PathBuf,
        available: u64,
        required: u64,
    },

    /// Every `-N` suffix for a session id was already taken.
    SessionIdExhausted { base: String, attempts: u32 },

    /// Writing or rotating the log file failed.
    Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(f, "Cannot create log directory '{}': {source}", path.display())
            }
            Self::CreateFile { path, source } => {
                write!(f, "Cannot create log file '{}': {source}", path.display())
            }
            Self::InsufficientSpace {
                path,
                available,
                required,
            } => write!(
                f,
                "Not enough free space for logging in '{}': {available} bytes available, \
                 {required} required",
                path.display()
            ),
            Self::SessionIdExhausted { base, attempts } => write!(
                f,
                "Session id '{base}' collided {attempts} times; giving up"
            ),
            Self::Write { path, source } => {
                write!(f, "Failed to write log file '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LoggerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::CreateFile { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LoggerError> for JewelError {
    fn from(e: LoggerError) -> Self {
        Self::Logger(e)
    }
}

// ---------------------------------------------------------------------------
// Appearance errors
// ---------------------------------------------------------------------------

/// Errors related to installing a look-and-feel.
#[derive(Debug)]
pub enum AppearanceError {
    /// The selection does not name an appearance this build supports.
    Unsupported { selection: String },
}

impl fmt::Display for AppearanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { selection } => write!(
                f,
                "Unsupported appearance '{selection}'. Expected \"light\", \"dark\" or \"system\"."
            ),
        }
    }
}

impl std::error::Error for AppearanceError {}

impl From<AppearanceError> for JewelError {
    fn from(e: AppearanceError) -> Self {
        Self::Appearance(e)
    }
}

// ---------------------------------------------------------------------------
// Preferences errors
// ---------------------------------------------------------------------------

/// Errors related to saving user preferences.
#[derive(Debug)]
pub enum PrefsError {
    /// Preferences could not be serialised.
    Serialise { source: serde_json::Error },

    /// I/O error creating, writing or renaming the preferences file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialise { source } => write!(f, "Failed to serialise preferences: {source}"),
            Self::Io { path, source } => {
                write!(f, "Preferences I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PrefsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialise { source } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Window errors
// ---------------------------------------------------------------------------

/// Errors raised by the window host.
#[derive(Debug)]
pub enum WindowError {
    /// The native window or its event loop failed to start.
    Launch {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Launch { source } => {
                write!(f, "Failed to launch the editor window: {source}")
            }
        }
    }
}

impl std::error::Error for WindowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Launch { source } => Some(source.as_ref()),
        }
    }
}

impl From<WindowError> for JewelError {
    fn from(e: WindowError) -> Self {
        Self::Window(e)
    }
}
