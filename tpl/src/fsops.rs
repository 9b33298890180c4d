//! Filesystem primitives: path classification and recursive copy

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// What a filesystem path currently points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Absent,
    File,
    Directory,
}

/// Errors raised while inspecting or copying paths
#[derive(Debug, Error)]
pub enum FsError {
    #[error("Source not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
                source,
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Counts of what a copy wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub files: usize,
    pub directories: usize,
}

/// Report whether `path` is absent, a file or a directory.
///
/// A missing path is `Absent`, not an error. Any other failure to read the
/// metadata (permissions, I/O) is returned as an error.
pub fn classify(path: &Path) -> Result<PathKind, FsError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(PathKind::Directory),
        Ok(_) => Ok(PathKind::File),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(PathKind::Absent)
        }
        Err(e) => Err(FsError::from_io(path, e)),
    }
}

/// Copy `source` to `destination`.
///
/// With `is_directory` false a single file is copied; if `destination` is an
/// existing directory the file lands inside it under its own name, otherwise
/// `destination` is the target file path. With `is_directory` true the whole
/// tree under `source` is copied into `destination`, which is created if
/// missing. Existing files at the destination are overwritten, nothing is
/// ever removed. A failure part way through leaves whatever was already
/// copied on disk.
pub fn copy(source: &Path, destination: &Path, is_directory: bool) -> Result<CopySummary, FsError> {
    debug!(?source, ?destination, is_directory, "fsops::copy: called");
    if is_directory {
        copy_dir(source, destination)
    } else {
        copy_file(source, destination)?;
        Ok(CopySummary {
            files: 1,
            directories: 0,
        })
    }
}

fn copy_file(source: &Path, destination: &Path) -> Result<PathBuf, FsError> {
    if classify(source)? != PathKind::File {
        return Err(FsError::SourceMissing {
            path: source.to_path_buf(),
        });
    }

    let target = if classify(destination)? == PathKind::Directory {
        let name = source.file_name().ok_or_else(|| FsError::SourceMissing {
            path: source.to_path_buf(),
        })?;
        destination.join(name)
    } else {
        destination.to_path_buf()
    };

    fs::copy(source, &target).map_err(|e| FsError::from_io(&target, e))?;
    debug!(?target, "fsops::copy_file: copied");
    Ok(target)
}

fn copy_dir(source: &Path, destination: &Path) -> Result<CopySummary, FsError> {
    if classify(source)? != PathKind::Directory {
        return Err(FsError::SourceMissing {
            path: source.to_path_buf(),
        });
    }

    fs::create_dir_all(destination).map_err(|e| FsError::from_io(destination, e))?;

    let mut summary = CopySummary::default();
    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| source.to_path_buf(), Path::to_path_buf);
            FsError::from_io(&path, e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| FsError::from_io(entry.path(), io::Error::other(e)))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| FsError::from_io(&target, e))?;
            summary.directories += 1;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| FsError::from_io(&target, e))?;
            summary.files += 1;
        }
    }

    debug!(?summary, "fsops::copy_dir: complete");
    Ok(summary)
}
