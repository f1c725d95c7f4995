use super::now_secs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn event_log_path(state_root: &Path) -> PathBuf {
    state_root.join("logs/events.log")
}

pub fn append_event_log(state_root: &Path, level: &str, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": now_secs(),
        "level": level,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    let path = event_log_path(state_root);
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}
