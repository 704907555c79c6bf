use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tauri::{AppHandle, Emitter};

/// Maximum size per log file before rotation (~2 MB)
const MAX_LOG_FILE_SIZE: u64 = 2 * 1024 * 1024;
/// Number of rotated log files to keep
const MAX_LOG_FILES: usize = 3;
/// In-memory log buffer cap (shown in the Logs panel)
const MAX_MEMORY_LOGS: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

pub struct LogState {
    pub logs: Mutex<Vec<LogEntry>>,
    pub log_dir: Mutex<Option<PathBuf>>,
    pub debug_mode: AtomicBool,
}

impl LogState {
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
            log_dir: Mutex::new(None),
            debug_mode: AtomicBool::new(false),
        }
    }

    /// Initialise the persistent log directory under the platform's local
    /// data dir.
    pub fn init_log_dir(&self) {
        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("ShowPlanner/logs");

        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("[LogState] Failed to create log directory {:?}: {}", log_dir, e);
            return;
        }

        if let Ok(mut dir) = self.log_dir.lock() {
            *dir = Some(log_dir);
        }

        self.write_to_file(
            "INFO",
            &format!(
                "=== ShowPlanner session started at {} ===",
                Local::now().format("%Y-%m-%d %H:%M:%S %Z")
            ),
        );
    }

    fn current_log_path(&self) -> Option<PathBuf> {
        self.log_dir
            .lock()
            .ok()?
            .as_ref()
            .map(|d| d.join("showplanner.log"))
    }

    /// Rotate log files: showplanner.log → showplanner.1.log → …
    fn rotate_if_needed(&self) {
        let Some(current) = self.current_log_path() else {
            return;
        };
        let file_size = fs::metadata(&current).map(|m| m.len()).unwrap_or(0);
        if file_size < MAX_LOG_FILE_SIZE {
            return;
        }

        let Some(dir) = self.log_dir.lock().ok().and_then(|d| d.clone()) else {
            return;
        };

        for i in (1..MAX_LOG_FILES).rev() {
            let from = dir.join(format!("showplanner.{}.log", i));
            let to = dir.join(format!("showplanner.{}.log", i + 1));
            let _ = fs::rename(&from, &to);
        }
        let _ = fs::rename(&current, dir.join("showplanner.1.log"));
    }

    fn write_to_file(&self, level: &str, message: &str) {
        self.rotate_if_needed();
        let Some(path) = self.current_log_path() else {
            return;
        };

        let line = format!(
            "[{}] [{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            message
        );

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = file.write_all(line.as_bytes());
        }
    }

    /// Core logging method — writes to memory, file, and emits to frontend.
    pub fn add_log(&self, level: &str, message: &str, app: &AppHandle) {
        if level == "DEBUG" && !self.debug_mode.load(Ordering::Relaxed) {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            level: level.to_string(),
            message: message.to_string(),
        };

        if let Ok(mut logs) = self.logs.lock() {
            logs.push(entry.clone());
            if logs.len() > MAX_MEMORY_LOGS {
                let drain_count = MAX_MEMORY_LOGS / 5;
                logs.drain(..drain_count);
            }
        }

        self.write_to_file(level, message);

        let _ = app.emit("log-event", entry);
    }

    pub fn is_debug(&self) -> bool {
        self.debug_mode.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, enabled: bool) {
        self.debug_mode.store(enabled, Ordering::Relaxed);
    }
}

// ─── Tauri Commands ──────────────────────────────────────────────

#[tauri::command]
pub fn get_logs(state: tauri::State<'_, LogState>) -> Vec<LogEntry> {
    state.logs.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

#[tauri::command]
pub fn log_from_frontend(
    level: String,
    message: String,
    app: AppHandle,
    state: tauri::State<'_, LogState>,
) {
    let valid_level = match level.to_uppercase().as_str() {
        "ERROR" | "WARN" | "INFO" | "DEBUG" => level.to_uppercase(),
        _ => "INFO".to_string(),
    };
    state.add_log(&valid_level, &format!("[Frontend] {}", message), &app);
}

#[tauri::command]
pub fn get_debug_mode(state: tauri::State<'_, LogState>) -> bool {
    state.is_debug()
}

#[tauri::command]
pub fn set_debug_mode(enabled: bool, app: AppHandle, state: tauri::State<'_, LogState>) {
    let was = state.is_debug();
    state.set_debug(enabled);
    if was != enabled {
        state.add_log(
            "INFO",
            &format!("Debug mode {}", if enabled { "ENABLED" } else { "DISABLED" }),
            &app,
        );
    }
}
