//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or when the
//! `test-support` feature is enabled.

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use tempfile::NamedTempFile;

/// Clock whose reading only moves when a test advances it.
///
/// Readings have millisecond resolution and are shared across threads, so
/// one clock can drive every service in an integration test.
#[derive(Debug)]
pub struct MutableClock {
    millis: AtomicI64,
}

impl MutableClock {
    /// Start the clock at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let millis = i64::try_from(delta.as_millis())
            .unwrap_or_else(|_| panic!("advancing by {delta:?} overflows the clock"));
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Move the clock by whole seconds; negative values rewind it.
    pub fn advance_seconds(&self, seconds: i64) {
        self.millis.fetch_add(seconds * 1_000, Ordering::SeqCst);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis)
            .unwrap_or_else(|| panic!("clock reading {millis}ms is out of range"))
    }
}

/// Signing secret written to a temporary file, removed on drop.
///
/// # Examples
///
/// ```rust
/// use sns_backend::test_support::TempSecretFile;
///
/// let file = TempSecretFile::new(b"secret-bytes")?;
/// assert!(file.path().exists());
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct TempSecretFile(NamedTempFile);

impl TempSecretFile {
    /// Write `contents` to a fresh temporary file.
    pub fn new(contents: &[u8]) -> io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents)?;
        file.flush()?;
        Ok(Self(file))
    }

    /// Location of the file on disk.
    pub fn path(&self) -> &Path {
        self.0.path()
    }

    /// Path rendered for an environment variable value.
    pub fn path_string(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use rstest::rstest;

    #[rstest]
    fn clock_moves_only_when_advanced() {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid instant");
        let clock = MutableClock::new(start);
        assert_eq!(clock.utc(), start);

        clock.advance(Duration::from_millis(1_500));
        clock.advance_seconds(-1);
        assert_eq!(clock.utc(), start + TimeDelta::milliseconds(500));
    }

    #[rstest]
    fn secret_file_holds_the_given_bytes() {
        let file = TempSecretFile::new(b"secret-bytes").expect("temp file");
        let read = std::fs::read(file.path()).expect("read back");
        assert_eq!(read, b"secret-bytes");
    }
}
