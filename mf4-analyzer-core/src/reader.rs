//! Log file opening and discovery
//!
//! This module picks a reader from the file extension and finds the newest
//! readable log in an input directory.

use crate::formats::{CsvLogReader, SUPPORTED_EXTENSIONS};
use crate::source::ChannelSource;
use crate::types::{AnalyzerError, Result, Timestamp};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Identity of the log file being processed
#[derive(Debug, Clone, PartialEq)]
pub struct LogFileInfo {
    pub path: PathBuf,
    /// File name without directory
    pub file_name: String,
    /// File name without extension, used to name exports
    pub base_name: String,
    /// Last modification time
    pub modified: Timestamp,
}

impl LogFileInfo {
    /// Describe a file on disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let base_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            base_name,
            modified,
        })
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// Open a log file with the reader matching its extension
pub fn open_log(path: &Path) -> Result<Box<dyn ChannelSource>> {
    log::info!("Opening log file: {:?}", path);

    let extension = extension_of(path);
    match extension.as_deref() {
        Some("csv") => {
            log::debug!("Detected CSV channel table");
            Ok(Box::new(CsvLogReader::open(path)?))
        }
        _ => Err(AnalyzerError::LogParseError(format!(
            "Unsupported file format: {:?} (supported: {:?})",
            extension, SUPPORTED_EXTENSIONS
        ))),
    }
}

/// Candidate log files in `dir`, newest first
pub fn list_logs(dir: &Path, extensions: &[String]) -> Result<Vec<LogFileInfo>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = extension_of(&path)
            .map(|ext| extensions.iter().any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext)))
            .unwrap_or(false);
        if matches {
            files.push(LogFileInfo::from_path(&path)?);
        }
    }
    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.file_name.cmp(&b.file_name)));
    Ok(files)
}

/// Open the newest log in `dir` that can actually be read
///
/// Unreadable files are skipped with a warning. Finding nothing is the one
/// fatal condition of a run.
pub fn find_latest_log(
    dir: &Path,
    extensions: &[String],
) -> Result<(Box<dyn ChannelSource>, LogFileInfo)> {
    let candidates = list_logs(dir, extensions).map_err(|e| {
        log::error!("Cannot list {:?}: {}", dir, e);
        AnalyzerError::NoLogFile(dir.display().to_string())
    })?;

    for info in candidates {
        match open_log(&info.path) {
            Ok(source) => {
                log::info!("Using log file: {} (modified {})", info.file_name, info.modified);
                return Ok((source, info));
            }
            Err(e) => log::warn!("Failed to load {}: {}", info.file_name, e),
        }
    }

    Err(AnalyzerError::NoLogFile(dir.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::{Duration, SystemTime};

    fn write_file(dir: &Path, name: &str, content: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
        path
    }

    fn csv_ext() -> Vec<String> {
        vec!["csv".to_string()]
    }

    #[test]
    fn test_unsupported_file_format() {
        let result = open_log(Path::new("test.mf4"));
        assert!(matches!(result, Err(AnalyzerError::LogParseError(_))));
    }

    #[test]
    fn test_latest_readable_log_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "old.csv", "time,A\n0,1\n1,2\n", 300);
        write_file(dir.path(), "broken.csv", "nonsense\n", 10);
        write_file(dir.path(), "notes.txt", "time,A\n0,1\n", 0);
        write_file(dir.path(), "mid.csv", "time,B\n0,5\n", 100);

        let names: Vec<String> = list_logs(dir.path(), &csv_ext())
            .unwrap()
            .into_iter()
            .map(|info| info.file_name)
            .collect();
        assert_eq!(names, vec!["broken.csv", "mid.csv", "old.csv"]);

        let (source, info) = find_latest_log(dir.path(), &csv_ext()).unwrap();
        assert_eq!(info.base_name, "mid");
        assert_eq!(source.channel_names(), vec!["B".to_string()]);
    }

    #[test]
    fn test_no_log_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "readme.txt", "hello", 0);

        let result = find_latest_log(dir.path(), &csv_ext());
        assert!(matches!(result, Err(AnalyzerError::NoLogFile(_))));

        let missing = dir.path().join("does-not-exist");
        assert!(matches!(
            find_latest_log(&missing, &csv_ext()),
            Err(AnalyzerError::NoLogFile(_))
        ));
    }
}
