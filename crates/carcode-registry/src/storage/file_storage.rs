//! File-based persistence for uploaded images and generated artifacts
//!
//! Directory structure:
//! ```text
//! static/
//! ├── uploads/            (vehicle images, <reg_no>_<sanitized upload name>)
//! │   └── ABC-003_corolla.jpg
//! └── codes/              (generated artifacts, keyed by registration number)
//!     ├── ABC-002.png
//!     └── ABC-001_qr.png
//! ```
//!
//! One [`FileStorage`] manages one of these directories.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileStorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Bytes written under a temporary name, awaiting [`FileStorage::commit`]
#[derive(Debug)]
pub struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    /// Path the file will have once committed
    pub fn target(&self) -> &Path {
        &self.target
    }
}

/// A single directory of files
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a new file storage rooted at `root`
    ///
    /// The directory is created lazily on first write, or eagerly with
    /// [`FileStorage::ensure_root`].
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist
    pub async fn ensure_root(&self) -> Result<(), FileStorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| FileStorageError::io(&self.root, e))
    }

    /// Path a plain file name resolves to inside this storage
    pub fn path_for(&self, file_name: &str) -> Result<PathBuf, FileStorageError> {
        if !is_plain_file_name(file_name) {
            return Err(FileStorageError::InvalidName(file_name.to_string()));
        }
        Ok(self.root.join(file_name))
    }

    /// Write bytes under a temporary name, to appear as `file_name` on
    /// [`FileStorage::commit`]
    ///
    /// Until committed, nothing is visible under `file_name`.
    pub async fn stage(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StagedFile, FileStorageError> {
        let target = self.path_for(file_name)?;
        let temp = self
            .root
            .join(format!(".{}.partial", Uuid::new_v4().simple()));
        self.ensure_root().await?;

        fs::write(&temp, bytes)
            .await
            .map_err(|e| FileStorageError::io(&temp, e))?;

        Ok(StagedFile { temp, target })
    }

    /// Move a staged file to its final name, replacing any file already there
    pub async fn commit(&self, staged: StagedFile) -> Result<PathBuf, FileStorageError> {
        if let Err(e) = fs::rename(&staged.temp, &staged.target).await {
            let _ = fs::remove_file(&staged.temp).await;
            return Err(FileStorageError::io(&staged.target, e));
        }
        Ok(staged.target)
    }

    /// Drop a staged file without publishing it
    pub async fn discard(&self, staged: StagedFile) -> Result<(), FileStorageError> {
        self.remove(&staged.temp).await
    }

    /// Write bytes under `file_name` verbatim
    ///
    /// The name must be a single path component.
    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, FileStorageError> {
        let path = self.path_for(file_name)?;
        self.ensure_root().await?;

        fs::write(&path, bytes)
            .await
            .map_err(|e| FileStorageError::io(&path, e))?;

        Ok(path)
    }

    /// Read a file by name
    ///
    /// Names that are not a single path component are reported as not found.
    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>, FileStorageError> {
        let path = self
            .path_for(file_name)
            .map_err(|_| FileStorageError::NotFound(file_name.to_string()))?;

        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FileStorageError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(FileStorageError::io(&path, e)),
        }
    }

    /// Check whether a file exists
    pub async fn exists(&self, file_name: &str) -> bool {
        match self.path_for(file_name) {
            Ok(path) => fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Remove a file previously returned by [`FileStorage::commit`] or
    /// [`FileStorage::write`]; a missing file is not an error
    pub async fn remove(&self, path: &Path) -> Result<(), FileStorageError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FileStorageError::io(path, e)),
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Reduce an arbitrary name to a safe file name
///
/// Non-ASCII characters are dropped, path separators and whitespace runs
/// become `_`, anything outside `[A-Za-z0-9._-]` is removed and leading or
/// trailing `.`/`_` are stripped. Returns `None` when nothing is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let spaced: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// File name an upload for vehicle `reg_no` is stored under
///
/// The sanitized client name is prefixed with the registration number, so
/// uploads of different vehicles never share a file. A name with no usable
/// characters becomes `<reg_no>_image`, keeping the extension if one survives.
pub fn upload_file_name(reg_no: &str, suggested_name: &str) -> String {
    let (stem, extension) = match suggested_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (suggested_name, None),
    };

    let stem = sanitize_filename(stem).unwrap_or_else(|| "image".to_string());
    match extension.and_then(sanitize_filename) {
        Some(extension) => format!("{}_{}.{}", reg_no, stem, extension),
        None => format!("{}_{}", reg_no, stem),
    }
}
