//! # Upload Materializer
//!
//! Saves an uploaded multipart file under the upload directory with a fresh
//! UUID v4 name. Files are never overwritten. With
//! [`UploadRetention::MaxAge`] each new upload first sweeps expired ones.
//!
//! Everything here is blocking file I/O. The resolver runs it on tokio's
//! blocking pool.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use uuid::Uuid;

use super::errors::{UploadError, UploadResult};
use super::multipart::SpooledPart;

/// Default upload directory, relative to the working directory
pub const DEFAULT_UPLOAD_DIR: &str = "tmp";

/// How long materialized uploads are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadRetention {
    /// Never delete uploads
    #[default]
    KeepForever,
    /// Delete uploads older than this
    MaxAge(Duration),
}

impl UploadRetention {
    /// `None` seconds means keep forever
    pub fn from_secs(secs: Option<u64>) -> Self {
        match secs {
            Some(secs) => UploadRetention::MaxAge(Duration::from_secs(secs)),
            None => UploadRetention::KeepForever,
        }
    }
}

/// Writes uploads into a fixed directory
#[derive(Debug, Clone)]
pub struct UploadMaterializer {
    dir: PathBuf,
    retention: UploadRetention,
}

impl UploadMaterializer {
    /// Create a materializer. A relative `dir` is anchored at the current
    /// working directory once, here.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        let dir = if dir.is_absolute() {
            dir
        } else {
            std::env::current_dir()?.join(dir)
        };

        Ok(Self {
            dir,
            retention: UploadRetention::KeepForever,
        })
    }

    pub fn with_retention(mut self, retention: UploadRetention) -> Self {
        self.retention = retention;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn retention(&self) -> UploadRetention {
        self.retention
    }

    /// Create the upload directory if missing
    pub fn ensure_dir(&self) -> UploadResult<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o766);
        }

        builder.create(&self.dir).map_err(|source| UploadError::CreateDir {
            path: self.dir.display().to_string(),
            source,
        })
    }

    /// Copy `part` to `<dir>/<uuid>` and return the new path
    pub fn materialize(&self, part: &SpooledPart) -> UploadResult<PathBuf> {
        self.ensure_dir()?;

        if let UploadRetention::MaxAge(max_age) = self.retention {
            if let Err(e) = self.sweep_older_than(max_age, SystemTime::now()) {
                tracing::warn!(event = "UPLOAD_SWEEP_FAILED", error = %e);
            }
        }

        let path = self.dir.join(Uuid::new_v4().to_string());
        let write_err = |source| UploadError::Write {
            path: path.display().to_string(),
            source,
        };

        let mut file: File = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(write_err)?;
        let written = part
            .copy_into(&mut file)
            .and_then(|size| file.sync_all().map(|()| size));
        let size = match written {
            Ok(size) => size,
            Err(source) => {
                drop(file);
                discard_partial(&path);
                return Err(write_err(source));
            }
        };

        tracing::info!(
            event = "UPLOAD_MATERIALIZED",
            path = %path.display(),
            size
        );

        Ok(path)
    }

    /// Delete uploads older than the retention window. Returns the number
    /// removed; always zero under `KeepForever`.
    pub fn sweep_expired(&self) -> UploadResult<usize> {
        match self.retention {
            UploadRetention::KeepForever => Ok(0),
            UploadRetention::MaxAge(max_age) => self.sweep_older_than(max_age, SystemTime::now()),
        }
    }

    /// Only regular files named by a UUID are considered.
    fn sweep_older_than(&self, max_age: Duration, now: SystemTime) -> UploadResult<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(UploadError::Sweep(e)),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(UploadError::Sweep)?;
            let is_upload = entry
                .file_name()
                .to_str()
                .map(|name| Uuid::parse_str(name).is_ok())
                .unwrap_or(false);
            if !is_upload {
                continue;
            }

            let metadata = entry.metadata().map_err(UploadError::Sweep)?;
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata.modified().map_err(UploadError::Sweep)?;
            let age = now.duration_since(modified).unwrap_or_default();
            if age >= max_age {
                fs::remove_file(entry.path()).map_err(UploadError::Sweep)?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(event = "UPLOAD_SWEEP", removed, dir = %self.dir.display());
        }

        Ok(removed)
    }
}

/// Remove a half-written upload; nothing references it once the write failed
fn discard_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            event = "UPLOAD_DISCARD_FAILED",
            path = %path.display(),
            error = %e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn materializer(temp: &TempDir) -> UploadMaterializer {
        UploadMaterializer::new(temp.path().join("uploads")).unwrap()
    }

    #[test]
    fn test_relative_dir_anchored_at_cwd() {
        let uploads = UploadMaterializer::new("tmp").unwrap();
        assert!(uploads.dir().is_absolute());
        assert!(uploads.dir().ends_with(DEFAULT_UPLOAD_DIR));
    }

    #[test]
    fn test_materialize_writes_uuid_named_file() {
        let temp = TempDir::new().unwrap();
        let uploads = materializer(&temp);

        let path = uploads
            .materialize(&SpooledPart::in_memory(b"hello".to_vec()))
            .unwrap();

        assert_eq!(path.parent().unwrap(), uploads.dir());
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(name).is_ok());
        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_each_upload_gets_its_own_file() {
        let temp = TempDir::new().unwrap();
        let uploads = materializer(&temp);
        let part = SpooledPart::in_memory(b"same".to_vec());

        let first = uploads.materialize(&part).unwrap();
        let second = uploads.materialize(&part).unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read_dir(uploads.dir()).unwrap().count(), 2);
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let temp = TempDir::new().unwrap();
        let uploads = materializer(&temp);

        // Spill file gone before the copy: the write fails after create_new
        let spill = tempfile::NamedTempFile::new().unwrap();
        fs::remove_file(spill.path()).unwrap();
        let part = SpooledPart::Disk {
            file: spill,
            len: 4,
        };

        let err = uploads.materialize(&part).unwrap_err();
        assert!(matches!(err, UploadError::Write { .. }));
        assert_eq!(fs::read_dir(uploads.dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_keep_forever_never_sweeps() {
        let temp = TempDir::new().unwrap();
        let uploads = materializer(&temp);
        uploads
            .materialize(&SpooledPart::in_memory(b"a".to_vec()))
            .unwrap();

        assert_eq!(uploads.sweep_expired().unwrap(), 0);
        assert_eq!(fs::read_dir(uploads.dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired_uploads() {
        let temp = TempDir::new().unwrap();
        let uploads = materializer(&temp);
        let old = uploads
            .materialize(&SpooledPart::in_memory(b"old".to_vec()))
            .unwrap();
        fs::write(uploads.dir().join("keep.txt"), b"not an upload").unwrap();

        let fresh = uploads
            .clone()
            .with_retention(UploadRetention::MaxAge(Duration::from_secs(3600)));
        assert_eq!(fresh.sweep_expired().unwrap(), 0);
        assert!(old.exists());

        let expired = uploads.with_retention(UploadRetention::MaxAge(Duration::ZERO));
        assert_eq!(expired.sweep_expired().unwrap(), 1);
        assert!(!old.exists());
        assert!(expired.dir().join("keep.txt").exists());
    }

    #[test]
    fn test_sweep_missing_dir_is_noop() {
        let temp = TempDir::new().unwrap();
        let uploads = materializer(&temp).with_retention(UploadRetention::MaxAge(Duration::ZERO));
        assert_eq!(uploads.sweep_expired().unwrap(), 0);
    }

    #[test]
    fn test_retention_from_secs() {
        assert_eq!(UploadRetention::from_secs(None), UploadRetention::KeepForever);
        assert_eq!(
            UploadRetention::from_secs(Some(60)),
            UploadRetention::MaxAge(Duration::from_secs(60))
        );
    }
}
