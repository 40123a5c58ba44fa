//! Day-partitioned append-only event log
//!
//! Events are written as JSON Lines, one file per UTC calendar day
//! (`logs-YYYY-MM-DD.jsonl`). Files only ever grow through appends and are
//! destroyed solely by the retention sweep. The partition key is the
//! wall-clock write day, not anything inside the event.

use crate::error::Result;
use crate::types::{LaunchTarget, LogEvent};
use chrono::{Duration, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const LOG_PREFIX: &str = "logs-";
const LOG_SUFFIX: &str = ".jsonl";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse the partition date out of a log filename.
///
/// Returns `None` for anything that does not match the naming convention;
/// such files are ignored by the retention sweep.
fn partition_date(file_name: &str) -> Option<NaiveDate> {
    file_name
        .strip_prefix(LOG_PREFIX)?
        .strip_suffix(LOG_SUFFIX)
        .and_then(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).ok())
}

/// Append-only store for captured telemetry events.
pub struct EventStore {
    dir: PathBuf,
}

impl EventStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{LOG_PREFIX}{}{LOG_SUFFIX}", date.format(DATE_FORMAT)))
    }

    async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Append one event as a single JSON line to today's partition.
    ///
    /// Opens in append mode, never read-modify-write, so sequential appends
    /// within a process land in order and each line stays independently
    /// parseable. I/O errors are surfaced; there is no retry.
    pub async fn append(&self, event: &LogEvent) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.partition_path(Utc::now().date_naive());

        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Record raw text typed into the launcher search bar.
    pub async fn log_input(&self, text: &str) -> Result<()> {
        self.append(&LogEvent::input(text)).await
    }

    /// Record a command launch through an alias.
    pub async fn log_launch(&self, alias_id: &str, target: LaunchTarget) -> Result<()> {
        self.append(&LogEvent::launch(alias_id, target)).await
    }

    /// Read the last `days` calendar days of events (today included),
    /// newest first, truncated to `limit`.
    ///
    /// Missing partition files contribute zero events. A line that fails to
    /// parse is logged and skipped without affecting the rest of the read.
    pub async fn read_recent(&self, days: u32, limit: usize) -> Result<Vec<LogEvent>> {
        let mut events = Vec::new();
        let today = Utc::now().date_naive();

        for offset in 0..days {
            let date = today - Duration::days(offset as i64);
            let path = self.partition_path(date);

            let data = match fs::read_to_string(&path).await {
                Ok(data) => data,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            for line in data.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<LogEvent>(line) {
                    Ok(event) => events.push(event),
                    Err(e) => warn!(error = %e, line, "skipping unparseable log line"),
                }
            }
        }

        events.sort_by(|a, b| b.ts().cmp(&a.ts()));
        events.truncate(limit);
        Ok(events)
    }

    /// Delete partition files strictly older than `retention_days`.
    ///
    /// Age is computed from the date in the filename, not file mtime.
    /// Best-effort: a filesystem error stops the sweep and the count
    /// accumulated so far is returned. Never errors.
    pub async fn clean_old_logs(&self, retention_days: u32) -> u32 {
        let mut deleted = 0u32;
        let today = Utc::now().date_naive();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "retention sweep could not open log directory");
                return 0;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "retention sweep aborted");
                    break;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(date) = partition_date(name) else { continue };

            let age = (today - date).num_days();
            if age > retention_days as i64 {
                match fs::remove_file(entry.path()).await {
                    Ok(()) => {
                        deleted += 1;
                        debug!(file = name, age, "deleted old log file");
                    }
                    Err(e) => {
                        warn!(error = %e, file = name, "retention sweep aborted");
                        break;
                    }
                }
            }
        }

        deleted
    }

    /// Probe write+delete capability on the storage directory.
    ///
    /// Never errors; any failure reports `false`.
    pub async fn check_access(&self) -> bool {
        let probe = self.dir.join(".access_test");
        let attempt = async {
            fs::create_dir_all(&self.dir).await?;
            fs::write(&probe, b"test").await?;
            fs::remove_file(&probe).await?;
            Ok::<_, std::io::Error>(())
        };

        match attempt.await {
            Ok(()) => {
                debug!("storage access check: ok");
                true
            }
            Err(e) => {
                warn!(error = %e, "storage access check failed");
                false
            }
        }
    }
}
