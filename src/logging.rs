//! Diagnostic logging.
//!
//! Two layers:
//! - `tracing` to stderr for structured process logs (stdout is reserved for
//!   protocol messages).
//! - A [`DiagnosticLog`] capability injected into the dispatcher and the
//!   orchestrator. The default [`FileLog`] appends timestamped lines to a
//!   process-wide file in the temp directory and mirrors them to stderr.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};

/// File name of the diagnostic log inside the temp directory.
pub const LOG_FILE_NAME: &str = "mcp-mobsf.log";

// ─── DiagnosticLog ───────────────────────────────────────────────────────────

/// Append-only sink for diagnostic events.
///
/// Appending never fails from the caller's point of view: a sink that cannot
/// write drops the entry and the process continues.
pub trait DiagnosticLog: Send + Sync {
    fn append(&self, message: &str);
}

/// Format one log line: `[<ISO-8601 UTC>] <message>`.
pub fn format_entry(message: &str) -> String {
    let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    format!("[{ts}] {message}")
}

// ─── FileLog ─────────────────────────────────────────────────────────────────

/// Where each formatted entry is echoed besides the file.
type Mirror = Arc<Mutex<dyn Write + Send>>;

/// Appends to `<temp dir>/mcp-mobsf.log` and mirrors every entry to stderr.
///
/// The mirror is written directly, not through `tracing`, so it is not
/// subject to `RUST_LOG` filtering and carries only the entry's own
/// timestamp.
#[derive(Clone)]
pub struct FileLog {
    path: PathBuf,
    mirror: Mirror,
}

impl FileLog {
    /// Log to the process-wide default location.
    pub fn new() -> Self {
        Self::at(default_log_path())
    }

    /// Log to an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::with_mirror(path, FlushingStderr)
    }

    /// Log to `path`, echoing entries to `mirror` instead of stderr.
    pub fn with_mirror(path: impl Into<PathBuf>, mirror: impl Write + Send + 'static) -> Self {
        Self {
            path: path.into(),
            mirror: Arc::new(Mutex::new(mirror)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FileLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLog").field("path", &self.path).finish()
    }
}

impl DiagnosticLog for FileLog {
    fn append(&self, message: &str) {
        let mut line = format_entry(message);
        line.push('\n');

        // One write per line in append mode keeps concurrent writers from
        // interleaving inside an entry.
        let written = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));

        if let Err(e) = written {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to append diagnostic log entry"
            );
        }

        // A poisoned or failing mirror only loses the echo.
        if let Ok(mut mirror) = self.mirror.lock() {
            let _ = mirror.write_all(line.as_bytes()).and_then(|_| mirror.flush());
        }
    }
}

/// `<temp dir>/mcp-mobsf.log`.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

// ─── MemoryLog ───────────────────────────────────────────────────────────────

/// Captures entries in memory. Used by tests and embedders that want to
/// inspect what the server logged.
#[derive(Debug, Default, Clone)]
pub struct MemoryLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages appended so far (without timestamps).
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.contains(needle))
    }
}

impl DiagnosticLog for MemoryLog {
    fn append(&self, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(message.to_string());
        }
    }
}

// ─── tracing setup ───────────────────────────────────────────────────────────

/// Initialize the tracing subscriber on stderr.
///
/// Filter comes from `RUST_LOG`, defaulting to `mobsf_mcp=info,warn`.
/// `MOBSF_MCP_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mobsf_mcp=info,warn"));

    let json = std::env::var("MOBSF_MCP_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // try_init: a second call (tests, embedders) keeps the first subscriber.
    let _ = if json {
        fmt::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(FlushingStderr)
            .with_target(true)
            .try_init()
    } else {
        fmt::fmt()
            .with_env_filter(filter)
            .with_writer(FlushingStderr)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .try_init()
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %default_log_path().display(),
        pid = std::process::id(),
        "=== mobsf-mcp starting ==="
    );
}

/// Stderr writer that flushes after every write so log lines are not lost if
/// the client kills the process.
#[derive(Clone, Copy)]
struct FlushingStderr;

impl Write for FlushingStderr {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut err = std::io::stderr().lock();
        let n = err.write(buf)?;
        err.flush()?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().lock().flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingStderr {
    type Writer = FlushingStderr;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
