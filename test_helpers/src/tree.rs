//! Temporary directory trees holding configuration sources and manifests.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};
use std::io::Write;
use tempfile::TempDir;

/// A temporary directory that tests populate through a capability handle.
///
/// The directory and everything written into it are removed on drop.
#[derive(Debug)]
pub struct ContentTree {
    _tempdir: TempDir,
    path: Utf8PathBuf,
    dir: Dir,
}

impl ContentTree {
    /// Creates an empty tree in the system temporary directory.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created or its path is not UTF-8.
    pub fn new() -> Result<Self> {
        let tempdir = tempfile::tempdir().context("create temp dir")?;
        let path = Utf8PathBuf::from_path_buf(tempdir.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("temp dir path is not UTF-8: {}", path.display()))?;
        let dir = Dir::open_ambient_dir(&path, ambient_authority()).context("open temp dir")?;
        Ok(Self {
            _tempdir: tempdir,
            path,
            dir,
        })
    }

    /// Absolute path of the tree root.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Writes `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails when a directory or the file cannot be created.
    pub fn write(&self, relative: impl AsRef<Utf8Path>, contents: impl AsRef<[u8]>) -> Result<()> {
        let target = relative.as_ref();
        if let Some(parent) = target.parent().filter(|parent| !parent.as_str().is_empty()) {
            self.create_dir(parent)?;
        }
        let mut file = self
            .dir
            .open_with(
                target,
                OpenOptions::new().write(true).create(true).truncate(true),
            )
            .with_context(|| format!("open {target}"))?;
        file.write_all(contents.as_ref())
            .with_context(|| format!("write {target}"))?;
        Ok(())
    }

    /// Creates `relative` and any missing parents.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created.
    pub fn create_dir(&self, relative: impl AsRef<Utf8Path>) -> Result<()> {
        let target = relative.as_ref();
        self.dir
            .create_dir_all(target)
            .with_context(|| format!("create directory {target}"))
    }

    /// Creates a symbolic link at `link` pointing to `original`.
    ///
    /// # Errors
    ///
    /// Fails when the link cannot be created.
    #[cfg(unix)]
    pub fn symlink(
        &self,
        original: impl AsRef<Utf8Path>,
        link: impl AsRef<Utf8Path>,
    ) -> Result<()> {
        let target = link.as_ref();
        self.dir
            .symlink(original.as_ref(), target)
            .with_context(|| format!("link {target}"))
    }

    /// Reads `relative` back as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not UTF-8.
    pub fn read_to_string(&self, relative: impl AsRef<Utf8Path>) -> Result<String> {
        let target = relative.as_ref();
        self.dir
            .read_to_string(target)
            .with_context(|| format!("read {target}"))
    }

    /// Lists the regular file names directly inside `relative`, sorted.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be listed.
    pub fn file_names(&self, relative: impl AsRef<Utf8Path>) -> Result<Vec<String>> {
        let target = relative.as_ref();
        let mut names = Vec::new();
        for entry_result in self
            .dir
            .read_dir(target)
            .with_context(|| format!("list {target}"))?
        {
            let entry = entry_result.with_context(|| format!("list {target}"))?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name()?);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::ContentTree;
    use anyhow::Result;

    #[test]
    fn write_creates_parent_directories() -> Result<()> {
        let tree = ContentTree::new()?;
        tree.write("a/b/c.txt", "hello")?;
        assert_eq!(tree.read_to_string("a/b/c.txt")?, "hello");
        assert_eq!(tree.file_names("a/b")?, vec![String::from("c.txt")]);
        Ok(())
    }
}
