//! Timestamp utilities

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use std::path::Path;
use std::time::SystemTime;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a filesystem timestamp to local wall-clock time
pub fn system_time_to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

/// Last modification time of `path` in local wall-clock time
///
/// Returns `None` if the file does not exist or the platform does not
/// report modification times.
pub fn file_modified(path: &Path) -> Option<NaiveDateTime> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(system_time_to_local(modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_system_time_conversion_is_monotonic() {
        let earlier = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        let later = earlier + Duration::from_secs(60);
        assert!(system_time_to_local(later) > system_time_to_local(earlier));
    }

    #[test]
    fn test_file_modified_missing_file() {
        assert!(file_modified(Path::new("/definitely/not/here.jpg")).is_none());
    }

    #[test]
    fn test_file_modified_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"x").unwrap();
        assert!(file_modified(&path).is_some());
    }
}
