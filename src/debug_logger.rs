// Debug logging module for asynchronous per-move logging
//
// This module provides fire-and-forget async logging so the search loop never waits on disk.
// Each decision is written as one line of a JSONL file that the replay tool can read back.

use log::error;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tokio::sync::Mutex;

use crate::types::{Board, Direction};

/// Represents a single debug log entry
#[derive(Debug, Serialize)]
struct DebugLogEntry {
    move_number: u32,
    chosen_move: String,
    board: Board,
    score: u64,
    timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> so writes spawned from any thread are serialised
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    runtime: Option<Handle>,
    pending: Arc<AtomicUsize>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        // Initialize the log file
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    runtime: Some(Handle::current()),
                    pending: Arc::new(AtomicUsize::new(0)),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            runtime: None,
            pending: Arc::new(AtomicUsize::new(0)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a move decision asynchronously (fire-and-forget)
    /// The write runs on the runtime the logger was created on, so this may be called from
    /// blocking or rayon threads.
    pub fn log_move(&self, move_number: u32, board: Board, score: u64, chosen_move: Direction) {
        let runtime = match (&self.runtime, self.enabled) {
            (Some(handle), true) => handle,
            _ => return,
        };

        let file_handle = self.file.clone();
        let pending = self.pending.clone();
        let entry = DebugLogEntry {
            move_number,
            chosen_move: chosen_move.as_str().to_string(),
            board,
            score,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Spawn fire-and-forget task
        pending.fetch_add(1, Ordering::AcqRel);
        runtime.spawn(async move {
            Self::log_move_internal(file_handle, entry).await;
            pending.fetch_sub(1, Ordering::AcqRel);
        });
    }

    /// Waits until every write queued so far has reached the file
    pub async fn flush(&self) {
        while self.pending.load(Ordering::Acquire) > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let mut file_guard = self.file.lock().await;
        if let Some(file) = file_guard.as_mut() {
            if let Err(e) = file.flush().await {
                error!("Failed to flush debug log: {}", e);
            }
        }
    }

    /// Internal async function that performs the actual file write
    async fn log_move_internal(file_handle: Arc<Mutex<Option<File>>>, entry: DebugLogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
