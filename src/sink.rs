//! Shared append-only file sink for the export path.
//!
//! All workers append through one [`CsvSink`]. The critical section is kept as
//! short as possible: callers serialize their rows to a buffer first, and the
//! lock covers only the cap re-check, the append, the flush, and the counter
//! bump. That guarantees one worker's full buffer lands before another's
//! begins, so concurrent appends can never interleave within a line.

use std::path::Path;
use std::sync::Arc;

use log::info;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::EXPORT_HEADER;
use crate::error_handling::SinkError;
use crate::progress::ProgressTracker;

/// Result of one append call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    /// Rows actually written (may be fewer than offered when the cap cuts the
    /// buffer short).
    pub written: u64,
    /// Whether the export cap has been reached.
    pub cap_reached: bool,
}

/// The shared export file, guarded for safe concurrent append.
///
/// The header line is written once, when the file is first created, before any
/// worker starts. The shared exported-row counter is re-checked and advanced
/// inside the same critical section as the append, so the cap (the tracker's
/// target) can never be overshot under concurrent writers.
#[derive(Debug)]
pub struct CsvSink {
    file: Mutex<File>,
    // Advanced only while holding the file lock; read lock-free for reporting.
    progress: Arc<ProgressTracker>,
}

impl CsvSink {
    /// Opens the sink in append mode, writing the header line if the file is
    /// new or empty.
    ///
    /// The tracker's target is the export cap.
    pub async fn open(path: &Path, progress: Arc<ProgressTracker>) -> Result<Self, SinkError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(SinkError::CreateError)?;

        let len = file
            .metadata()
            .await
            .map_err(SinkError::CreateError)?
            .len();
        if len == 0 {
            file.write_all(format!("{EXPORT_HEADER}\n").as_bytes())
                .await
                .map_err(SinkError::CreateError)?;
            file.flush().await.map_err(SinkError::CreateError)?;
            info!("Created export file {} with header", path.display());
        }

        Ok(Self {
            file: Mutex::new(file),
            progress,
        })
    }

    /// Appends a pre-serialized buffer of `rows` newline-terminated lines.
    ///
    /// If fewer than `rows` slots remain under the cap, only that many leading
    /// lines of the buffer are written; the rest is discarded. Returns how many
    /// rows were written and whether the cap is now reached.
    pub async fn append(&self, buf: &str, rows: u64) -> Result<Appended, SinkError> {
        let mut file = self.file.lock().await;

        let already = self.progress.count();
        let remaining = self.progress.target().saturating_sub(already);
        if remaining == 0 {
            return Ok(Appended {
                written: 0,
                cap_reached: true,
            });
        }

        let take = rows.min(remaining);
        let slice = if take == rows {
            buf
        } else {
            line_prefix(buf, take)
        };
        file.write_all(slice.as_bytes()).await?;
        file.flush().await?;
        self.progress.add(take);

        Ok(Appended {
            written: take,
            cap_reached: already + take >= self.progress.target(),
        })
    }

    /// Rows appended so far across all workers.
    pub fn exported(&self) -> u64 {
        self.progress.count()
    }

    /// Whether the export cap has been reached.
    pub fn cap_reached(&self) -> bool {
        self.progress.target_reached()
    }
}

/// Returns the prefix of `buf` containing the first `lines` newline-terminated
/// lines.
fn line_prefix(buf: &str, lines: u64) -> &str {
    let mut seen = 0u64;
    for (idx, byte) in buf.bytes().enumerate() {
        if byte == b'\n' {
            seen += 1;
            if seen == lines {
                return &buf[..=idx];
            }
        }
    }
    buf
}
