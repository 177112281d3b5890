// Jewel - app/termination.rs
//
// Termination hook: guarantees the session log receives its termination entry
// however the process ends.
//
// Exit paths covered:
// - Normal window close: the shell calls `SessionLogger::close` itself.
// - Early return or unwinding out of `start`: `ShutdownGuard` closes on drop.
// - Panic on the thread that installed the hook (the main thread), or any
//   panic in a panic = "abort" build: the chained panic hook closes the
//   session. Panics on other threads only add an error entry; the thread
//   that joins them decides whether the process goes on.
// - Ctrl+C, SIGTERM and SIGHUP (console close events on Windows): the
//   signal handler closes the session and exits with `SIGNAL_EXIT_CODE`.
//
// Every path funnels into the same idempotent `close`, so the hook firing
// after a normal shutdown writes nothing.

use super::session_log::SessionLogger;
use crate::util::constants;
use std::panic;
use std::thread::ThreadId;

/// Callback that closes the session when the process terminates abnormally.
#[derive(Debug, Clone)]
pub struct TerminationHook {
    logger: SessionLogger,
}

impl TerminationHook {
    pub fn new(logger: SessionLogger) -> Self {
        Self { logger }
    }

    /// Run the hook: record why the process is ending and close the session.
    ///
    /// Returns `true` if this call closed the session, `false` when the
    /// session was already closed by another path.
    pub fn fire(&self, reason: &str) -> bool {
        if self.logger.is_open() {
            self.logger.error(format!("Abnormal termination: {reason}"));
        }
        self.logger.close()
    }

    /// Record a panic. Only a `fatal` panic closes the session; otherwise an
    /// error entry is written and the session stays open.
    ///
    /// Returns `true` if this call closed the session.
    pub fn on_panic(&self, fatal: bool, reason: &str) -> bool {
        if fatal {
            return self.fire(reason);
        }
        self.logger.error(format!("Non-fatal {reason}"));
        false
    }

    /// Run the hook for an interrupt or termination signal.
    pub fn handle_signal(&self) -> bool {
        self.fire("received termination signal")
    }

    /// Register the hook as part of the process-wide panic hook, keeping any
    /// previously installed hook (the default one prints the panic message).
    ///
    /// The calling thread becomes the fatal thread: a panic there ends the
    /// process, so it closes the session.
    pub fn install(self) {
        let fatal_thread = std::thread::current().id();
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let reason = format!(
                "panic on thread '{}': {info}",
                thread.name().unwrap_or("<unnamed>")
            );
            self.on_panic(is_fatal(thread.id(), fatal_thread), &reason);
            previous(info);
        }));
        tracing::debug!("Termination hook installed");
    }

    /// Register the hook for Ctrl+C and termination signals. The handler
    /// closes the session, then exits the process.
    ///
    /// Only one handler can exist per process; a second call fails.
    pub fn install_signal_handler(self) -> Result<(), ctrlc::Error> {
        ctrlc::set_handler(move || {
            self.handle_signal();
            std::process::exit(constants::SIGNAL_EXIT_CODE);
        })?;
        tracing::debug!("Signal handler installed");
        Ok(())
    }
}

fn is_fatal(panicking: ThreadId, fatal_thread: ThreadId) -> bool {
    cfg!(panic = "abort") || panicking == fatal_thread
}

/// Closes the session when dropped.
///
/// Held by the shell for the duration of `start`, so any exit from it
/// (including unwinding) leaves the log closed.
#[derive(Debug)]
pub struct ShutdownGuard {
    logger: Option<SessionLogger>,
}

impl ShutdownGuard {
    pub fn new(logger: Option<SessionLogger>) -> Self {
        Self { logger }
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        if let Some(logger) = self.logger.take() {
            logger.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::session_log::LogSettings;
    use crate::util::constants::SHUTDOWN_MESSAGE;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> SessionLogger {
        SessionLogger::open(dir.path(), "20240101T120000", LogSettings::default()).unwrap()
    }

    fn shutdown_entries(logger: &SessionLogger) -> usize {
        std::fs::read_to_string(logger.log_file_path())
            .unwrap()
            .lines()
            .filter(|l| l.ends_with(SHUTDOWN_MESSAGE))
            .count()
    }

    #[test]
    fn test_hook_without_prior_close_closes_once() {
        let dir = TempDir::new().unwrap();
        let logger = open(&dir);
        logger.info("working");

        let hook = TerminationHook::new(logger.clone());
        assert!(hook.fire("simulated crash"));

        assert!(!logger.is_open());
        assert_eq!(shutdown_entries(&logger), 1);
        let content = std::fs::read_to_string(logger.log_file_path()).unwrap();
        assert!(content.contains("Abnormal termination: simulated crash"));
    }

    #[test]
    fn test_hook_after_normal_close_is_noop() {
        let dir = TempDir::new().unwrap();
        let logger = open(&dir);
        let hook = TerminationHook::new(logger.clone());

        assert!(logger.close());
        assert!(!hook.fire("late hook"));

        assert_eq!(shutdown_entries(&logger), 1);
        let content = std::fs::read_to_string(logger.log_file_path()).unwrap();
        assert!(!content.contains("late hook"));
    }

    #[test]
    fn test_hook_racing_normal_close_writes_one_entry() {
        let dir = TempDir::new().unwrap();
        let logger = open(&dir);
        let hook = TerminationHook::new(logger.clone());

        let racer = std::thread::spawn(move || hook.fire("race"));
        let normal = logger.close();
        let hooked = racer.join().unwrap();

        assert!(normal ^ hooked, "exactly one path must close the session");
        assert_eq!(shutdown_entries(&logger), 1);
    }

    #[test]
    fn test_worker_panic_keeps_session_open() {
        let dir = TempDir::new().unwrap();
        let logger = open(&dir);
        let hook = TerminationHook::new(logger.clone());

        assert!(!hook.on_panic(false, "panic on thread 'worker': boom"));
        logger.info("still running");

        assert!(logger.is_open());
        assert!(logger.close());
        let content = std::fs::read_to_string(logger.log_file_path()).unwrap();
        assert!(content.contains("[ERROR] Non-fatal panic on thread 'worker': boom"));
        assert!(content.contains("still running"));
        assert_eq!(shutdown_entries(&logger), 1);
    }

    #[test]
    fn test_installed_hook_closes_only_on_installing_thread_panic() {
        let dir = TempDir::new().unwrap();
        let logger = open(&dir);
        TerminationHook::new(logger.clone()).install();

        let worker = std::thread::Builder::new()
            .name("worker".into())
            .spawn(|| panic!("worker failed"))
            .unwrap();
        assert!(worker.join().is_err());
        assert!(logger.is_open(), "a worker panic must not close the session");
        logger.info("still running");

        let caught = std::panic::catch_unwind(|| panic!("main failed"));
        // Restore the default hook before asserting so later failures print.
        let _ = std::panic::take_hook();

        assert!(caught.is_err());
        assert!(!logger.is_open());
        let content = std::fs::read_to_string(logger.log_file_path()).unwrap();
        assert!(content.contains("Non-fatal panic on thread 'worker'"));
        assert!(content.contains("still running"));
        assert!(content.contains("Abnormal termination: panic on thread"));
        assert!(content.contains("main failed"));
        assert_eq!(shutdown_entries(&logger), 1);
    }

    #[test]
    fn test_signal_writes_abnormal_entry_and_single_shutdown() {
        let dir = TempDir::new().unwrap();
        let logger = open(&dir);
        let hook = TerminationHook::new(logger.clone());

        assert!(hook.handle_signal());
        assert!(!hook.handle_signal());

        let content = std::fs::read_to_string(logger.log_file_path()).unwrap();
        assert!(content.contains("Abnormal termination: received termination signal"));
        assert_eq!(shutdown_entries(&logger), 1);
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let dir = TempDir::new().unwrap();
        let logger = open(&dir);
        {
            let _guard = ShutdownGuard::new(Some(logger.clone()));
        }
        assert!(!logger.is_open());
        assert_eq!(shutdown_entries(&logger), 1);
    }

    #[test]
    fn test_guard_without_logger_is_harmless() {
        drop(ShutdownGuard::new(None));
    }
}
