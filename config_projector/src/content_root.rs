//! Capability-confined access to the directory holding configuration sources.
//!
//! Every read goes through a [`cap_std`] directory handle, so source
//! locations that try to escape the root (`../secret`) fail with an I/O error
//! instead of reaching the wider filesystem.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, FileType};
use glob::{MatchOptions, Pattern};
use tracing::warn;

use crate::error::{ProjectionError, ProjectionResult};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Root directory that source locations are resolved against.
#[derive(Debug)]
pub struct ContentRoot {
    path: Utf8PathBuf,
    dir: Dir,
}

impl ContentRoot {
    /// Open `path` as the content root.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Io`] when the directory cannot be opened.
    pub fn open(path: impl AsRef<Utf8Path>) -> ProjectionResult<Self> {
        let root = path.as_ref();
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| ProjectionError::io(root, err))?;
        Ok(Self {
            path: root.to_path_buf(),
            dir,
        })
    }

    /// Path the root was opened from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read the file at `location`, relative to the root.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Io`] when the file cannot be read or lies
    /// outside the root.
    pub fn read(&self, location: &Utf8Path) -> ProjectionResult<Vec<u8>> {
        self.dir
            .read(location)
            .map_err(|err| ProjectionError::io(self.path.join(location), err))
    }

    /// Expand `pattern` against the root.
    ///
    /// Only regular files are returned, as root-relative paths in sorted
    /// order. Directories whose names match are skipped with a warning.
    ///
    /// The walk only descends into directories the pattern can still reach:
    /// each `/`-separated segment admits one level, and a `**` segment admits
    /// any depth below it. Symbolic links to directories are followed where a
    /// segment names them, never beneath a `**`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::GlobPattern`] for malformed patterns and
    /// [`ProjectionError::Io`] when a directory cannot be listed.
    pub fn glob(&self, pattern: &str) -> ProjectionResult<Vec<Utf8PathBuf>> {
        let compile = |raw: &str| {
            Pattern::new(raw).map_err(|source| ProjectionError::GlobPattern {
                pattern: pattern.to_owned(),
                source,
            })
        };
        let plan = GlobPlan {
            full: compile(pattern)?,
            segments: pattern
                .split('/')
                .map(|segment| {
                    if segment == "**" {
                        Ok(Segment::AnyDepth)
                    } else {
                        compile(segment).map(Segment::Level)
                    }
                })
                .collect::<ProjectionResult<_>>()?,
        };
        let mut matches = Vec::new();
        self.collect_matches(&self.dir, Utf8Path::new(""), 0, false, &plan, &mut matches)?;
        matches.sort();
        Ok(matches)
    }

    fn collect_matches(
        &self,
        dir: &Dir,
        base: &Utf8Path,
        depth: usize,
        below_any_depth: bool,
        plan: &GlobPlan,
        matches: &mut Vec<Utf8PathBuf>,
    ) -> ProjectionResult<()> {
        for entry in self.list(dir, base)? {
            let rel = base.join(&entry.name);
            let is_match = plan.full.matches_with(rel.as_str(), MATCH_OPTIONS);
            if entry.file_type.is_dir() {
                if is_match {
                    warn!(path = %rel, pattern = %plan.full, "glob matched a directory; skipping");
                }
                let any_depth = below_any_depth || plan.is_any_depth(depth);
                let descend = if any_depth {
                    !entry.is_link
                } else {
                    plan.admits(depth, entry.name.as_str())
                };
                if descend {
                    let subdir = dir
                        .open_dir(&entry.name)
                        .map_err(|err| ProjectionError::io(self.path.join(&rel), err))?;
                    self.collect_matches(&subdir, &rel, depth + 1, any_depth, plan, matches)?;
                }
            } else if entry.file_type.is_file() && is_match {
                matches.push(rel);
            }
        }
        Ok(())
    }

    /// List `dir`, resolving symbolic links that stay inside the root.
    fn list(&self, dir: &Dir, base: &Utf8Path) -> ProjectionResult<Vec<Listed>> {
        let listing_error = |err| ProjectionError::io(self.path.join(base), err);
        let mut entries = Vec::new();
        for entry_result in dir.read_dir(".").map_err(listing_error)? {
            let entry = entry_result.map_err(listing_error)?;
            let name = Utf8PathBuf::from(entry.file_name().map_err(listing_error)?);
            let mut file_type = entry.file_type().map_err(listing_error)?;
            let is_link = file_type.is_symlink();
            if is_link {
                match dir.metadata(&name) {
                    Ok(metadata) => file_type = metadata.file_type(),
                    Err(err) => {
                        warn!(path = %base.join(&name), error = %err, "skipping unresolvable link");
                        continue;
                    }
                }
            }
            entries.push(Listed {
                name,
                file_type,
                is_link,
            });
        }
        entries.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(entries)
    }
}

/// A glob pattern alongside its per-directory segments.
struct GlobPlan {
    full: Pattern,
    segments: Vec<Segment>,
}

enum Segment {
    Level(Pattern),
    AnyDepth,
}

impl GlobPlan {
    fn is_any_depth(&self, depth: usize) -> bool {
        matches!(self.segments.get(depth), Some(Segment::AnyDepth))
    }

    /// Whether a directory called `name` at `depth` can hold further matches
    /// under a literal or wildcard segment.
    fn admits(&self, depth: usize, name: &str) -> bool {
        match self.segments.get(depth) {
            Some(Segment::Level(segment)) => {
                depth + 1 < self.segments.len() && segment.matches_with(name, MATCH_OPTIONS)
            }
            Some(Segment::AnyDepth) | None => false,
        }
    }
}

struct Listed {
    name: Utf8PathBuf,
    file_type: FileType,
    is_link: bool,
}
