use crate::logging::TIMESTAMP_FORMAT;
use chrono::Local;
use log::Level;
use std::fs::File;
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Run log shared by every pipeline component.
///
/// Info, warn and debug lines go through the `log` facade to the console and
/// are copied to the run's log file. Errors are only written to the file; the
/// caller reports them on the console.
/// Without a file sink (standalone subcommands) only the console is written.
pub struct RunLog {
    path: Option<PathBuf>,
    file: Option<Mutex<LineWriter<File>>>,
}

impl RunLog {
    /// Creates the log file, truncating a log left over from a previous run.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            file: Some(Mutex::new(LineWriter::new(file))),
        })
    }

    pub fn console_only() -> Self {
        Self {
            path: None,
            file: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::info!("{}", message);
        self.write_file(Level::Info, message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::warn!("{}", message);
        self.write_file(Level::Warn, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.write_file(Level::Error, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::debug!("{}", message);
        self.write_file(Level::Debug, message);
    }

    fn write_file(&self, level: Level, message: &str) {
        let Some(file) = &self.file else {
            return;
        };
        // A poisoned or failing log sink must not abort the run.
        if let Ok(mut writer) = file.lock() {
            let _ = writeln!(
                writer,
                "{} {}: {}",
                Local::now().format(TIMESTAMP_FORMAT),
                level,
                message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn every_level_reaches_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.log");
        std::fs::write(&path, "stale contents\n").unwrap();

        let log = RunLog::create(&path).unwrap();
        log.info("Loading FASTQ Records");
        log.warn("MockBC not found in OTU table, skipping stats");
        log.debug("usearch8 -fastq_filter in.fq");
        log.error("stage 'sort' failed: exit status: 1");
        drop(log);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("stale"));
        assert!(contents.contains("INFO: Loading FASTQ Records"));
        assert!(contents.contains("WARN: MockBC not found"));
        assert!(contents.contains("DEBUG: usearch8 -fastq_filter in.fq"));
        assert!(contents.contains("ERROR: stage 'sort' failed"));
    }

    #[test]
    fn console_only_log_has_no_file() {
        let log = RunLog::console_only();
        log.info("Dereplicating");
        assert!(log.path().is_none());
    }
}
