//! Naming, size checks and writing of rendered ConfigMaps.

use std::io::Write;
#[cfg(unix)]
use cap_std::fs::OpenOptionsExt;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};

use crate::error::{CliError, Result};

/// File name for a rendered ConfigMap: `{namespace}--{name}--{timestamp}.yaml`.
///
/// Characters outside `[a-zA-Z0-9-.]` in the namespace and name become `-`.
#[must_use]
pub fn file_name(namespace: &str, name: &str, timestamp: i64) -> String {
    format!("{}--{}--{timestamp}.yaml", sanitise(namespace), sanitise(name))
}

fn sanitise(part: &str) -> String {
    part.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '.' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}

/// Refuse documents longer than `limit` bytes.
///
/// # Errors
///
/// Returns [`CliError::SizeLimitExceeded`] when `rendered` is too large.
pub fn check_size(id: &str, rendered: &str, limit: usize) -> Result<()> {
    let size = rendered.len();
    if size > limit {
        return Err(CliError::SizeLimitExceeded {
            id: id.to_owned(),
            size,
            limit,
        });
    }
    Ok(())
}

/// Mode for newly created ConfigMap files; they may carry secrets.
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o600;

/// Directory rendered ConfigMaps are written into.
#[derive(Debug)]
pub struct OutputDir {
    path: Utf8PathBuf,
    dir: Dir,
}

impl OutputDir {
    /// Open an existing output directory.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] when the directory cannot be opened.
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(|source| {
            CliError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            dir,
        })
    }

    /// Write `contents` to `file_name`, replacing any existing file.
    ///
    /// New files are created readable and writable by the owner only.
    /// Returns the full path written.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Write`] when the file cannot be written.
    pub fn write(&self, file_name: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.path.join(file_name);
        let write_error = |source| CliError::Write {
            path: path.clone(),
            source,
        };
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(OUTPUT_MODE);
        let mut file = self
            .dir
            .open_with(file_name, &options)
            .map_err(write_error)?;
        file.write_all(contents.as_bytes()).map_err(write_error)?;
        Ok(path)
    }
}
