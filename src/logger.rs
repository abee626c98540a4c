use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stderr logger with an optional plain-text file sink.
///
/// Controlled by environment: `DOCSTACK_LOG` (or `RUST_LOG`) selects the
/// level, `DOCSTACK_LOG_FILE` enables the file sink, `NO_COLOR` disables
/// ANSI colors.
pub struct Logger {
    severity: Level,
    enable_colors: bool,
    file: Option<Arc<Mutex<File>>>,
}

fn default_log_path() -> PathBuf {
    PathBuf::from(
        #[cfg(target_os = "windows")]
        "C:\\Program Files\\docstack\\docstack.log",
        #[cfg(target_os = "macos")]
        "/Library/Logs/docstack/docstack.log",
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        "/var/log/docstack/docstack.log",
    )
}

impl Logger {
    pub fn new(severity: Level, enable_colors: bool, file_path: Option<PathBuf>) -> Self {
        let file = file_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = create_dir_all(parent);
            }
            File::create(&path).ok().map(|f| Arc::new(Mutex::new(f)))
        });
        Logger { severity, enable_colors, file }
    }

    /// Install the logger as the global `log` sink.
    pub fn init() -> Result<(), log::SetLoggerError> {
        let severity = std::env::var("DOCSTACK_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string())
            .parse::<Level>()
            .unwrap_or(Level::Info);
        let enable_colors = std::env::var("NO_COLOR").is_err();
        let file_path = std::env::var("DOCSTACK_LOG_FILE")
            .ok()
            .map(|v| if v.is_empty() { default_log_path() } else { PathBuf::from(v) });

        let logger = Logger::new(severity, enable_colors, file_path);
        log::set_max_level(LevelFilter::Trace);
        log::set_logger(Box::leak(Box::new(logger)))
    }

    /// HH:MM:SS, UTC.
    fn timestamp() -> String {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        format!("{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
    }

    fn color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[36m",
            Level::Debug => "\x1b[35m",
            Level::Trace => "\x1b[37m",
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.severity
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Self::timestamp();
        let level = record.level().as_str();
        let args = record.args();

        let line = if self.enable_colors {
            let color = Self::color(record.level());
            format!("{color}[{timestamp}] {level}\x1b[0m {args}\n")
        } else {
            format!("[{timestamp}] {level} {args}\n")
        };
        let _ = std::io::stderr().write_all(line.as_bytes());

        // File sink stays color-free.
        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "[{timestamp}] {level} {args}");
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_gates_records() {
        let logger = Logger::new(Level::Warn, false, None);
        assert!(logger.enabled(&Metadata::builder().level(Level::Error).build()));
        assert!(logger.enabled(&Metadata::builder().level(Level::Warn).build()));
        assert!(!logger.enabled(&Metadata::builder().level(Level::Info).build()));
    }

    #[test]
    fn timestamp_shape() {
        let ts = Logger::timestamp();
        assert_eq!(ts.len(), 8);
        assert_eq!(ts.as_bytes()[2], b':');
        assert_eq!(ts.as_bytes()[5], b':');
    }
}
