//! Plain-text build log, appended to on every run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use pw_model::RunLog;

/// `ctime(3)`-style timestamp, e.g. `Mon Jun  3 14:05:09 2024`.
pub const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// A run header line followed by one line per recoverable issue.
pub fn format_build_log(started_at: NaiveDateTime, log: &RunLog) -> String {
    let mut text = format!(
        "Starting PowerWatch build run at {}.\n",
        started_at.format(CTIME_FORMAT)
    );
    for issue in log.iter() {
        text.push_str(&issue.to_string());
        text.push('\n');
    }
    text
}

pub fn append_build_log(path: &Path, started_at: NaiveDateTime, log: &RunLog) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log dir {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open build log {}", path.display()))?;
    file.write_all(format_build_log(started_at, log).as_bytes())
        .with_context(|| format!("append build log {}", path.display()))?;
    Ok(())
}
