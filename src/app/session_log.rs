// Jewel - app/session_log.rs
//
// Per-run session log.
//
// Layout: <log_root>/<session_id>/<session_id>.log where the session id is
// the local start time formatted as YYYYMMDD'T'HHMMSS. When a directory for
// that second already exists (a second session in the same process, or a
// second instance launched in the same second) the id gains a -1, -2, ...
// suffix. Directory creation is the uniqueness check, so ids never collide.
//
// Guarantees:
// - Entries reach the file in emission order: every append holds the writer
//   mutex for the whole format/rotate/write sequence.
// - Exactly one termination entry per session. `close` is guarded by an
//   `AtomicBool` swap; the first caller writes the entry and releases the
//   file, every later caller (normal path or termination hook) is a no-op.
// - Appends after close are dropped, so the termination entry is always last.
// - Write failures never propagate to callers; they are reported on stderr
//   and through tracing, like the rest of the bootstrap's failure paths.

use crate::util::constants;
use crate::util::error::LoggerError;
use chrono::{Duration, Local, NaiveDateTime};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

// =============================================================================
// Entries
// =============================================================================

/// Severity of a session log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Debug => "DEBUG",
        };
        f.write_str(s)
    }
}

/// One appended line of the session log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            level,
            message: message.into(),
        }
    }

    /// `[YYYY-MM-DD HH:MM:SS] [LEVEL] message\n`
    pub fn format_line(&self) -> String {
        format!(
            "[{}] [{}] {}\n",
            self.timestamp.format(constants::LOG_LINE_TIMESTAMP_FORMAT),
            self.level,
            self.message
        )
    }
}

// =============================================================================
// Session ids
// =============================================================================

/// Session id for the current local time (second resolution).
pub fn new_session_id() -> String {
    Local::now().format(constants::SESSION_ID_FORMAT).to_string()
}

/// Parse the timestamp out of a session directory name, ignoring any `-N`
/// disambiguation suffix.
pub fn parse_session_timestamp(name: &str) -> Option<NaiveDateTime> {
    let base = name.split('-').next().unwrap_or(name);
    NaiveDateTime::parse_from_str(base, constants::SESSION_ID_FORMAT).ok()
}

// =============================================================================
// Logger
// =============================================================================

/// Tunables for a session log.
#[derive(Debug, Clone, Copy)]
pub struct LogSettings {
    /// Rotate once the active file would exceed this many bytes.
    pub max_file_size: u64,
    /// Refuse to open (and postpone rotation) below this much free disk space.
    pub min_free_space: u64,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            max_file_size: constants::DEFAULT_MAX_LOG_FILE_SIZE,
            min_free_space: constants::MIN_FREE_DISK_SPACE,
        }
    }
}

struct WriterState {
    file: Option<File>,
    bytes_written: u64,
}

struct Inner {
    session_id: String,
    session_dir: PathBuf,
    log_file_path: PathBuf,
    settings: LogSettings,
    closing: AtomicBool,
    writer: Mutex<WriterState>,
}

/// Handle to the open session log. Clones share the same session.
#[derive(Clone)]
pub struct SessionLogger {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLogger")
            .field("session_id", &self.inner.session_id)
            .field("log_file_path", &self.inner.log_file_path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl SessionLogger {
    /// Create the session directory and log file under `log_root`.
    ///
    /// `session_id` is normally `new_session_id()`; if a directory with that
    /// name already exists a numeric suffix is appended. Permission problems
    /// surface as `CreateDir` / `CreateFile` errors.
    pub fn open(
        log_root: &Path,
        session_id: &str,
        settings: LogSettings,
    ) -> Result<Self, LoggerError> {
        std::fs::create_dir_all(log_root).map_err(|source| LoggerError::CreateDir {
            path: log_root.to_path_buf(),
            source,
        })?;
        check_free_space(log_root, settings.min_free_space)?;

        let (session_id, session_dir) = create_unique_session_dir(log_root, session_id)?;

        let log_file_path =
            session_dir.join(format!("{session_id}.{}", constants::LOG_FILE_EXTENSION));
        let file = open_append(&log_file_path)?;
        let bytes_written = file.metadata().map(|m| m.len()).unwrap_or(0);

        tracing::info!(
            session = %session_id,
            path = %log_file_path.display(),
            "Session log opened"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                session_id,
                session_dir,
                log_file_path,
                settings,
                closing: AtomicBool::new(false),
                writer: Mutex::new(WriterState {
                    file: Some(file),
                    bytes_written,
                }),
            }),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn session_dir(&self) -> &Path {
        &self.inner.session_dir
    }

    pub fn log_file_path(&self) -> &Path {
        &self.inner.log_file_path
    }

    /// False once `close` has started.
    pub fn is_open(&self) -> bool {
        !self.inner.closing.load(Ordering::Acquire)
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message.as_ref());
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message.as_ref());
    }

    /// Log an error together with its full `source()` chain.
    pub fn error_with_source(&self, message: &str, err: &dyn std::error::Error) {
        let mut text = format!("{message}\nError: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            text.push_str(&format!("\nCaused by: {cause}"));
            source = cause.source();
        }
        self.log(LogLevel::Error, &text);
    }

    /// Append one entry. Dropped silently once the session is closing.
    pub fn log(&self, level: LogLevel, message: &str) {
        let mut state = self.lock_writer();
        if self.inner.closing.load(Ordering::Acquire) {
            return;
        }
        mirror_to_tracing(level, message);
        if let Err(e) = self.append(&mut state, &LogEntry::now(level, message)) {
            report_write_failure(&e);
        }
    }

    /// Write the termination entry, flush and release the file.
    ///
    /// Returns `true` for the call that actually closed the session and
    /// `false` for every later call.
    pub fn close(&self) -> bool {
        if self.inner.closing.swap(true, Ordering::AcqRel) {
            tracing::debug!(session = %self.inner.session_id, "Session log already closed");
            return false;
        }

        let mut state = self.lock_writer();
        mirror_to_tracing(LogLevel::Info, constants::SHUTDOWN_MESSAGE);
        let entry = LogEntry::now(LogLevel::Info, constants::SHUTDOWN_MESSAGE);
        if let Err(e) = self.append(&mut state, &entry) {
            report_write_failure(&e);
        }
        if let Some(mut file) = state.file.take() {
            if let Err(source) = file.flush().and_then(|()| file.sync_data()) {
                report_write_failure(&LoggerError::Write {
                    path: self.inner.log_file_path.clone(),
                    source,
                });
            }
        }

        tracing::info!(session = %self.inner.session_id, "Session log closed");
        true
    }

    fn lock_writer(&self) -> MutexGuard<'_, WriterState> {
        // A panic while holding the lock must not stop the termination entry.
        self.inner
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn append(&self, state: &mut WriterState, entry: &LogEntry) -> Result<(), LoggerError> {
        let line = entry.format_line();
        let len = line.len() as u64;

        if state.file.is_some()
            && state.bytes_written > 0
            && state.bytes_written + len > self.inner.settings.max_file_size
        {
            // A failed rotation keeps writing to whichever file is open.
            if let Err(e) = self.rotate(state) {
                report_write_failure(&e);
            }
        }

        let path = &self.inner.log_file_path;
        let Some(file) = state.file.as_mut() else {
            return Ok(());
        };
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| LoggerError::Write {
                path: path.clone(),
                source,
            })?;
        state.bytes_written += len;
        Ok(())
    }

    /// Rename the active file to `<id>-<YYYYMMDD-HHMMSS>[-N].log` and start a
    /// new one. Existing rotated files are never replaced.
    ///
    /// Rotation is postponed (the active file keeps growing) while the disk is
    /// below `min_free_space`, so entries are never dropped for lack of room
    /// to rotate.
    fn rotate(&self, state: &mut WriterState) -> Result<(), LoggerError> {
        check_free_space(&self.inner.session_dir, self.inner.settings.min_free_space)?;

        let path = &self.inner.log_file_path;
        let rotated = self.next_rotated_path();
        // Release the handle first; Windows refuses to rename open files.
        drop(state.file.take());
        let renamed = std::fs::rename(path, &rotated);

        // Reopen even if the rename failed so logging can continue.
        state.file = Some(open_append(path)?);
        state.bytes_written = match &renamed {
            Ok(()) => 0,
            Err(_) => state
                .file
                .as_ref()
                .and_then(|f| f.metadata().ok())
                .map_or(0, |m| m.len()),
        };

        renamed.map_err(|source| LoggerError::Write {
            path: rotated.clone(),
            source,
        })?;
        tracing::info!(rotated = %rotated.display(), "Session log rotated");
        Ok(())
    }

    /// First free rotated-file name for the current second.
    fn next_rotated_path(&self) -> PathBuf {
        let stamp = Local::now().format(constants::ROTATED_LOG_SUFFIX_FORMAT);
        let base = format!("{}-{stamp}", self.inner.session_id);
        let ext = constants::LOG_FILE_EXTENSION;

        let mut candidate = self.inner.session_dir.join(format!("{base}.{ext}"));
        let mut n = 1u32;
        while candidate.exists() {
            candidate = self.inner.session_dir.join(format!("{base}-{n}.{ext}"));
            n += 1;
        }
        candidate
    }
}

/// Fail with `InsufficientSpace` when the volume holding `dir` has less than
/// `required` bytes free. An unanswerable query is not an error.
fn check_free_space(dir: &Path, required: u64) -> Result<(), LoggerError> {
    if required == 0 {
        return Ok(());
    }
    match fs2::available_space(dir) {
        Ok(available) if available < required => Err(LoggerError::InsufficientSpace {
            path: dir.to_path_buf(),
            available,
            required,
        }),
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Cannot query free disk space");
            Ok(())
        }
    }
}

fn create_unique_session_dir(
    log_root: &Path,
    base: &str,
) -> Result<(String, PathBuf), LoggerError> {
    for attempt in 0..constants::MAX_SESSION_ID_ATTEMPTS {
        let id = if attempt == 0 {
            base.to_string()
        } else {
            format!("{base}-{attempt}")
        };
        let dir = log_root.join(&id);
        match std::fs::create_dir(&dir) {
            Ok(()) => return Ok((id, dir)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(LoggerError::CreateDir { path: dir, source }),
        }
    }
    Err(LoggerError::SessionIdExhausted {
        base: base.to_string(),
        attempts: constants::MAX_SESSION_ID_ATTEMPTS,
    })
}

fn open_append(path: &Path) -> Result<File, LoggerError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggerError::CreateFile {
            path: path.to_path_buf(),
            source,
        })
}

fn mirror_to_tracing(level: LogLevel, message: &str) {
    match level {
        LogLevel::Info => tracing::info!(target: "jewel::session", "{message}"),
        LogLevel::Warning => tracing::warn!(target: "jewel::session", "{message}"),
        LogLevel::Error => tracing::error!(target: "jewel::session", "{message}"),
        LogLevel::Debug => tracing::debug!(target: "jewel::session", "{message}"),
    }
}

fn report_write_failure(err: &LoggerError) {
    tracing::warn!(error = %err, "Session log write failed");
    eprintln!("Failed to write to log file: {err}");
}

// =============================================================================
// Retention
// =============================================================================

/// Remove session directories under `log_root` older than `retention_days`
/// relative to `now`.
///
/// Only directories whose name parses as a session id are considered; other
/// entries are left alone. Returns the number of directories removed. Never
/// fails: unreadable roots and failed deletions are logged and skipped.
pub fn cleanup_old_sessions(log_root: &Path, retention_days: i64, now: NaiveDateTime) -> usize {
    let cutoff = now - Duration::days(retention_days);
    let entries = match std::fs::read_dir(log_root) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(root = %log_root.display(), error = %e, "Cannot list log root");
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(started) = parse_session_timestamp(&name.to_string_lossy()) else {
            tracing::debug!(dir = %path.display(), "Skipping non-session directory");
            continue;
        };
        if started >= cutoff {
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                removed += 1;
                tracing::debug!(dir = %path.display(), "Removed expired session logs");
            }
            Err(e) => {
                tracing::warn!(
                    dir = %path.display(),
                    error = %e,
                    "Failed to remove expired session logs"
                );
            }
        }
    }

    if removed > 0 {
        tracing::info!(removed, retention_days, "Cleaned up old session logs");
    }
    removed
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_lines(logger: &SessionLogger) -> Vec<String> {
        std::fs::read_to_string(logger.log_file_path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn shutdown_count(lines: &[String]) -> usize {
        lines
            .iter()
            .filter(|l| l.ends_with(constants::SHUTDOWN_MESSAGE))
            .count()
    }

    #[test]
    fn test_open_creates_session_dir_and_file() {
        let dir = TempDir::new().unwrap();
        let logger =
            SessionLogger::open(dir.path(), "20240101T120000", LogSettings::default()).unwrap();

        assert_eq!(logger.session_id(), "20240101T120000");
        assert_eq!(logger.session_dir(), dir.path().join("20240101T120000"));
        assert_eq!(
            logger.log_file_path(),
            dir.path().join("20240101T120000").join("20240101T120000.log")
        );
        assert!(logger.log_file_path().is_file());
        assert!(logger.is_open());
    }

    #[test]
    fn test_entries_written_in_call_order_then_single_close() {
        let dir = TempDir::new().unwrap();
        let logger =
            SessionLogger::open(dir.path(), &new_session_id(), LogSettings::default()).unwrap();

        for i in 0..5 {
            if i % 2 == 0 {
                logger.info(format!("message {i}"));
            } else {
                logger.error(format!("message {i}"));
            }
        }
        assert!(logger.close());
        assert!(!logger.close(), "second close must be a no-op");
        logger.info("after close");

        let lines = read_lines(&logger);
        assert_eq!(lines.len(), 6);
        for (i, line) in lines.iter().take(5).enumerate() {
            let level = if i % 2 == 0 { "[INFO]" } else { "[ERROR]" };
            assert!(line.contains(level), "line {i}: {line}");
            assert!(line.ends_with(&format!("message {i}")), "line {i}: {line}");
        }
        assert_eq!(shutdown_count(&lines), 1);
        assert!(!logger.is_open());
    }

    #[test]
    fn test_line_format() {
        let entry = LogEntry {
            timestamp: NaiveDateTime::parse_from_str("2024-03-05 07:08:09", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            level: LogLevel::Warning,
            message: "disk nearly full".to_string(),
        };
        assert_eq!(entry.format_line(), "[2024-03-05 07:08:09] [WARNING] disk nearly full\n");
    }

    #[test]
    fn test_same_second_sessions_get_distinct_ids() {
        let dir = TempDir::new().unwrap();
        let id = "20240101T120000";
        let a = SessionLogger::open(dir.path(), id, LogSettings::default()).unwrap();
        let b = SessionLogger::open(dir.path(), id, LogSettings::default()).unwrap();
        let c = SessionLogger::open(dir.path(), id, LogSettings::default()).unwrap();

        assert_eq!(a.session_id(), id);
        assert_eq!(b.session_id(), "20240101T120000-1");
        assert_eq!(c.session_id(), "20240101T120000-2");
        assert_ne!(a.log_file_path(), b.log_file_path());
    }

    #[test]
    fn test_open_fails_when_root_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let result = SessionLogger::open(&blocker, "20240101T120000", LogSettings::default());
        assert!(
            matches!(result, Err(LoggerError::CreateDir { .. })),
            "expected CreateDir, got {result:?}"
        );
    }

    #[test]
    fn test_concurrent_close_writes_one_termination_entry() {
        let dir = TempDir::new().unwrap();
        let logger =
            SessionLogger::open(dir.path(), "20240101T120000", LogSettings::default()).unwrap();
        logger.info("before");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let l = logger.clone();
                std::thread::spawn(move || l.close())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|closed| *closed)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(shutdown_count(&read_lines(&logger)), 1);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let logger =
            SessionLogger::open(dir.path(), "20240101T120000", LogSettings::default()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let l = logger.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        l.info(format!("thread {t} entry {i}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        logger.close();

        let lines = read_lines(&logger);
        assert_eq!(lines.len(), 201);
        // Per-thread order is preserved.
        for t in 0..4 {
            let seq: Vec<usize> = lines
                .iter()
                .filter_map(|l| l.split(&format!("thread {t} entry ")).nth(1))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..50).collect::<Vec<_>>());
        }
        assert!(lines.last().unwrap().ends_with(constants::SHUTDOWN_MESSAGE));
    }

    #[test]
    fn test_rotation_keeps_every_entry() {
        let dir = TempDir::new().unwrap();
        let settings = LogSettings {
            max_file_size: 200,
            ..LogSettings::default()
        };
        let logger = SessionLogger::open(dir.path(), "20240101T120000", settings).unwrap();

        // Many rotations land in the same second; none may replace another.
        for i in 0..30 {
            logger.info(format!("a fairly long line that fills the file quickly {i}"));
        }
        logger.close();

        let mut seen = Vec::new();
        let mut rotated = 0;
        for entry in std::fs::read_dir(logger.session_dir()).unwrap().flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with("20240101T120000-") {
                rotated += 1;
            }
            for line in std::fs::read_to_string(entry.path()).unwrap().lines() {
                if let Some(n) = line.split("fills the file quickly ").nth(1) {
                    seen.push(n.parse::<usize>().unwrap());
                }
            }
        }
        seen.sort_unstable();

        assert_eq!(seen, (0..30).collect::<Vec<_>>());
        assert!(rotated > 1, "expected several rotated files, got {rotated}");
        let current = std::fs::metadata(logger.log_file_path()).unwrap().len();
        assert!(current <= 200, "active file is {current} bytes");
        assert_eq!(shutdown_count(&read_lines(&logger)), 1);
    }

    #[test]
    fn test_open_refuses_when_disk_space_is_below_minimum() {
        let dir = TempDir::new().unwrap();
        let settings = LogSettings {
            min_free_space: u64::MAX,
            ..LogSettings::default()
        };

        let result = SessionLogger::open(dir.path(), "20240101T120000", settings);

        assert!(
            matches!(result, Err(LoggerError::InsufficientSpace { .. })),
            "expected InsufficientSpace, got {result:?}"
        );
        assert!(!dir.path().join("20240101T120000").exists());
    }

    #[test]
    fn test_zero_minimum_skips_space_check() {
        let dir = TempDir::new().unwrap();
        let settings = LogSettings {
            min_free_space: 0,
            ..LogSettings::default()
        };
        assert!(SessionLogger::open(dir.path(), "20240101T120000", settings).is_ok());
    }

    #[test]
    fn test_error_with_source_includes_chain() {
        let dir = TempDir::new().unwrap();
        let logger =
            SessionLogger::open(dir.path(), "20240101T120000", LogSettings::default()).unwrap();
        let err = LoggerError::Write {
            path: PathBuf::from("x.log"),
            source: io::Error::new(io::ErrorKind::Other, "device gone"),
        };
        logger.error_with_source("Something failed", &err);
        logger.close();

        let content = std::fs::read_to_string(logger.log_file_path()).unwrap();
        assert!(content.contains("[ERROR] Something failed"));
        assert!(content.contains("Caused by: device gone"));
    }

    #[test]
    fn test_parse_session_timestamp_ignores_suffix() {
        let plain = parse_session_timestamp("20240101T120000").unwrap();
        let suffixed = parse_session_timestamp("20240101T120000-3").unwrap();
        assert_eq!(plain, suffixed);
        assert!(parse_session_timestamp("notes").is_none());
    }

    #[test]
    fn test_cleanup_removes_only_expired_session_dirs() {
        let dir = TempDir::new().unwrap();
        for name in ["20240101T000000", "20240101T000000-1", "20240120T000000", "keep-me"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("20230101T000000"), b"file, not dir").unwrap();

        let now =
            NaiveDateTime::parse_from_str("2024-01-25 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let removed = cleanup_old_sessions(dir.path(), 15, now);

        assert_eq!(removed, 2);
        assert!(!dir.path().join("20240101T000000").exists());
        assert!(!dir.path().join("20240101T000000-1").exists());
        assert!(dir.path().join("20240120T000000").exists());
        assert!(dir.path().join("keep-me").exists());
        assert!(dir.path().join("20230101T000000").exists());
    }

    #[test]
    fn test_cleanup_missing_root_is_harmless() {
        let dir = TempDir::new().unwrap();
        let now = Local::now().naive_local();
        assert_eq!(cleanup_old_sessions(&dir.path().join("missing"), 15, now), 0);
    }
}
