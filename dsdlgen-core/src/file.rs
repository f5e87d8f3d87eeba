use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

/// Errors raised while preparing or finishing an output file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The destination exists and overwriting was not allowed.
    #[error("{} exists and overwrite is not allowed", path.display())]
    OverwriteDenied { path: PathBuf },

    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        FileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How to handle existing files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// Replace existing files, relaxing read-only permissions first.
    Allow,
    /// Fail if the destination already exists.
    Deny,
}

impl Overwrite {
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed {
            Overwrite::Allow
        } else {
            Overwrite::Deny
        }
    }
}

/// Make `path` ready to be truncated and written.
///
/// Missing parent directories are created. If the file already exists it is
/// either rejected or made owner/group writable, depending on `overwrite`.
pub fn prepare_destination(path: &Path, overwrite: Overwrite) -> Result<(), FileError> {
    if path.exists() {
        match overwrite {
            Overwrite::Deny => {
                return Err(FileError::OverwriteDenied {
                    path: path.to_path_buf(),
                });
            }
            Overwrite::Allow => relax_permissions(path)?,
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FileError::io(parent, e))?;
    }
    Ok(())
}

/// Prepare `path` and open it for buffered writing.
pub fn create_output(path: &Path, overwrite: Overwrite) -> Result<BufWriter<File>, FileError> {
    prepare_destination(path, overwrite)?;
    let file = File::create(path).map_err(|e| FileError::io(path, e))?;
    Ok(BufWriter::new(file))
}

/// Set the permission bits of a finished file.
#[cfg(unix)]
pub fn set_file_mode(path: &Path, mode: u32) -> Result<(), FileError> {
    use std::os::unix::fs::PermissionsExt;

    debug!(path = %path.display(), mode = %format!("{:o}", mode), "setting file mode");
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| FileError::io(path, e))
}

/// Set the permission bits of a finished file.
///
/// Only the owner write bit is meaningful on this platform.
#[cfg(not(unix))]
pub fn set_file_mode(path: &Path, mode: u32) -> Result<(), FileError> {
    debug!(path = %path.display(), mode = %format!("{:o}", mode), "setting file mode");
    let mut perms = fs::metadata(path)
        .map_err(|e| FileError::io(path, e))?
        .permissions();
    perms.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(path, perms).map_err(|e| FileError::io(path, e))
}

#[cfg(unix)]
fn relax_permissions(path: &Path) -> Result<(), FileError> {
    use std::os::unix::fs::PermissionsExt;

    let perms = fs::metadata(path)
        .map_err(|e| FileError::io(path, e))?
        .permissions();
    let mode = perms.mode() | 0o220;
    debug!(path = %path.display(), "making existing output writable");
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| FileError::io(path, e))
}

#[cfg(not(unix))]
fn relax_permissions(path: &Path) -> Result<(), FileError> {
    let mut perms = fs::metadata(path)
        .map_err(|e| FileError::io(path, e))?
        .permissions();
    if perms.readonly() {
        debug!(path = %path.display(), "making existing output writable");
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(path, perms).map_err(|e| FileError::io(path, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_create_output_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("c").join("test.h");

        let mut out = create_output(&path, Overwrite::Deny).unwrap();
        out.write_all(b"nested").unwrap();
        drop(out);

        assert_eq!(fs::read_to_string(&path).unwrap(), "nested");
    }

    #[test]
    fn test_overwrite_denied_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.h");
        fs::write(&path, "original").unwrap();

        let err = create_output(&path, Overwrite::Deny).unwrap_err();

        assert!(matches!(err, FileError::OverwriteDenied { .. }));
        assert!(err.to_string().contains("test.h"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_overwrite_allowed_truncates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.h");
        fs::write(&path, "original content").unwrap();

        let mut out = create_output(&path, Overwrite::Allow).unwrap();
        out.write_all(b"new").unwrap();
        drop(out);

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_allowed_relaxes_read_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.h");
        fs::write(&path, "original").unwrap();
        set_file_mode(&path, 0o444).unwrap();

        prepare_destination(&path, Overwrite::Allow).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o664);
    }

    #[cfg(unix)]
    #[test]
    fn test_set_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.h");
        fs::write(&path, "x").unwrap();

        set_file_mode(&path, 0o444).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o444);
    }
}
