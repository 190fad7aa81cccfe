use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::Config;
use crate::types::Action;

/// Simple file logger for a sync run with buffered writes
pub struct FileLogger {
    writer: BufWriter<File>,
}

impl FileLogger {
    /// Create a new file logger, writing to ~/logs/media-tools/putsync_<timestamp>.log
    pub(crate) fn new() -> Result<Self> {
        let log_dir = media_tools::config::LOG_DIR
            .as_deref()
            .context("Failed to get home directory")?;
        Self::in_directory(log_dir)
    }

    pub(crate) fn in_directory(log_dir: &Path) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let log_path = log_dir.join(format!("putsync_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting the program
    pub(crate) fn log_init(&mut self, config: &Config) {
        let _ = writeln!(self.writer, "[{}] INIT \"{}:\"", Self::timestamp(), config.remote);
        let _ = writeln!(self.writer, "  media_root: {}", config.media_root.display());
        let _ = writeln!(self.writer, "  blocklist: {:?}", config.blocklist);
        let _ = writeln!(self.writer, "  max_depth: {}", config.max_depth);
        let _ = writeln!(self.writer, "  dryrun: {}", config.dryrun);
        let _ = writeln!(self.writer, "  verbose: {}", config.verbose);
        let _ = self.writer.flush();
    }

    /// Log the actions planned for one root item
    pub(crate) fn log_planned(&mut self, item_path: &str, actions: &[Action]) {
        let _ = writeln!(
            self.writer,
            "[{}] PLANNED \"{}\" | {} action(s)",
            Self::timestamp(),
            item_path,
            actions.len()
        );
        for action in actions {
            let _ = writeln!(self.writer, "  {action}");
        }
        let _ = self.writer.flush();
    }

    /// Log downloads left out because the local target already exists
    pub(crate) fn log_skipped(&mut self, item_path: &str, targets: &[PathBuf]) {
        for target in targets {
            let _ = writeln!(
                self.writer,
                "[{}] SKIPPED \"{}\" | already exists: {}",
                Self::timestamp(),
                item_path,
                target.display()
            );
        }
        let _ = self.writer.flush();
    }

    /// Log a planning step that was aborted
    pub(crate) fn log_plan_error(&mut self, item_path: &str, error: &str) {
        let _ = writeln!(self.writer, "[{}] ABORTED \"{}\" | {}", Self::timestamp(), item_path, error);
        let _ = self.writer.flush();
    }

    /// Log whether the operator confirmed the queue
    pub(crate) fn log_confirmation(&mut self, confirmed: bool, count: usize) {
        let outcome = if confirmed { "CONFIRMED" } else { "DECLINED" };
        let _ = writeln!(self.writer, "[{}] {} {} action(s)", Self::timestamp(), outcome, count);
        let _ = self.writer.flush();
    }

    pub(crate) fn log_start(&mut self, index: usize, action: &Action, dryrun: bool) {
        let label = if dryrun { "DRYRUN " } else { "START  " };
        let _ = writeln!(self.writer, "[{}] {} {} - {}", Self::timestamp(), label, index, action);
        let _ = self.writer.flush();
    }

    pub(crate) fn log_success(&mut self, index: usize, action: &Action) {
        let _ = writeln!(self.writer, "[{}] SUCCESS {} - {}", Self::timestamp(), index, action);
        let _ = self.writer.flush();
    }

    pub(crate) fn log_failure(&mut self, index: usize, action: &Action, error: &str) {
        let _ = writeln!(
            self.writer,
            "[{}] ERROR   {} - {} | {}",
            Self::timestamp(),
            index,
            action,
            error
        );
        let _ = self.writer.flush();
    }

    /// Log final statistics
    pub(crate) fn log_summary(&mut self, executed: usize, total: usize) {
        let _ = writeln!(self.writer, "[{}] SUMMARY", Self::timestamp());
        let _ = writeln!(self.writer, "  Actions executed: {executed}/{total}");
        let _ = writeln!(self.writer, "[{}] END", Self::timestamp());
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod test_file_logger {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn writes_log_file_into_directory() {
        let dir = tempdir().expect("temp dir");
        let log_dir = dir.path().join("logs");
        let mut logger = FileLogger::in_directory(&log_dir).expect("logger");
        let action = Action::Delete {
            path: "Foo".to_string(),
            is_dir: true,
        };
        logger.log_planned("Foo", std::slice::from_ref(&action));
        logger.log_skipped("Foo", &[PathBuf::from("/media/Movies/Foo")]);
        logger.log_success(1, &action);
        drop(logger);

        let entries: Vec<_> = fs::read_dir(&log_dir).expect("read dir").collect();
        assert_eq!(entries.len(), 1);
        let path = entries[0].as_ref().expect("entry").path();
        let content = fs::read_to_string(path).expect("read log");
        assert!(content.contains("PLANNED \"Foo\" | 1 action(s)"));
        assert!(content.contains("SUCCESS 1 - Delete folder \"Foo\""));
        assert!(content.contains("SKIPPED \"Foo\" | already exists: /media/Movies/Foo"));
    }
}
