use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;

use crate::error::{DucqError, Result};

/// Installs the global logger: everything at `log_level` and above goes to a
/// fresh `<app_name>_<timestamp>.log` in `log_dir`, warnings and errors are
/// echoed to stderr. Older logs of the same app are removed, keeping the newest.
///
/// Returns the path of the new log file.
pub fn setup_logging(log_dir: &Path, log_level: &str, app_name: &str) -> Result<PathBuf> {
    let (dispatch, log_path) = build_dispatch(log_dir, parse_level(log_level), app_name)?;
    dispatch.apply().map_err(|e| DucqError::Logging(e.to_string()))?;
    Ok(log_path)
}

/// Unknown names fall back to `info`.
pub fn parse_level(log_level: &str) -> LevelFilter {
    match log_level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Deletes every `<app_name>_*.log` in `log_dir` except the newest one.
///
/// File names carry a sortable timestamp, so "newest" is the greatest name.
pub fn cleanup_old_logs(log_dir: &Path, app_name: &str) -> Result<usize> {
    let prefix = format!("{}_", app_name);
    let mut names: Vec<String> = fs::read_dir(log_dir)?
        .filter_map(|res| res.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.starts_with(&prefix) && name.ends_with(".log"))
        .collect();

    names.sort_unstable_by(|a, b| b.cmp(a));

    let mut removed = 0;
    for name in names.iter().skip(1) {
        match fs::remove_file(log_dir.join(name)) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!("Failed to delete old log file {:?}: {}", name, e),
        }
    }
    Ok(removed)
}

fn build_dispatch(log_dir: &Path, level: LevelFilter, app_name: &str) -> Result<(fern::Dispatch, PathBuf)> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }
    cleanup_old_logs(log_dir, app_name)?;

    let log_file_name = format!("{}_{}.log", app_name, chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let log_path = log_dir.join(log_file_name);

    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(fern::Dispatch::new().level(LevelFilter::Warn).chain(std::io::stderr()))
        .chain(fern::log_file(&log_path)?);

    Ok((dispatch, log_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level(" trace "), LevelFilter::Trace);
        assert_eq!(parse_level("error"), LevelFilter::Error);
        assert_eq!(parse_level("fatal"), LevelFilter::Info);
    }

    #[test]
    fn test_cleanup_keeps_newest_of_the_app_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "ducq_monitor_2024-01-01_10-00-00.log",
            "ducq_monitor_2024-01-02_10-00-00.log",
            "ducq_monitor_2024-01-03_10-00-00.log",
            "ducq_send_2024-01-01_10-00-00.log",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        assert_eq!(cleanup_old_logs(dir.path(), "ducq_monitor").unwrap(), 2);
        assert!(dir.path().join("ducq_monitor_2024-01-03_10-00-00.log").exists());
        assert!(!dir.path().join("ducq_monitor_2024-01-01_10-00-00.log").exists());
        assert!(dir.path().join("ducq_send_2024-01-01_10-00-00.log").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_dispatch_creates_log_dir_and_file() {
        let root = tempfile::tempdir().unwrap();
        let log_dir = root.path().join("logs");
        let (_dispatch, path) = build_dispatch(&log_dir, LevelFilter::Info, "ducq_test").unwrap();
        assert!(path.exists());
        assert!(path.starts_with(&log_dir));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("ducq_test_"));
    }
}
