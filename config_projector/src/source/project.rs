//! Verbatim projection of single files and glob matches.

use camino::Utf8Path;
use tracing::debug;

use super::{Projection, SourceDescriptor};
use crate::content_root::ContentRoot;
use crate::error::{ProjectionError, ProjectionResult};

impl SourceDescriptor {
    pub(super) fn project_glob(&self, root: &ContentRoot) -> ProjectionResult<Projection> {
        let mut projection = Projection::new();
        for matched in root.glob(&self.location)? {
            let name = matched
                .file_name()
                .map_or_else(|| matched.to_string(), str::to_owned);
            // Keys are base names, so matches from different directories can collide.
            if projection.contains_key(&name) {
                return Err(ProjectionError::DuplicateGlobMatch {
                    name,
                    pattern: self.location.clone(),
                });
            }
            let contents = root.read(&matched)?;
            debug!(path = %matched, key = %name, "projected glob match");
            projection.insert(name, strip_trailing_newline(contents));
        }
        Ok(projection)
    }

    pub(super) fn project_file(&self, root: &ContentRoot) -> ProjectionResult<Projection> {
        let key = self
            .output_file
            .clone()
            .ok_or(ProjectionError::OutputFileRequired)?;
        let contents = root.read(Utf8Path::new(&self.location))?;
        Ok(Projection::from([(key, strip_trailing_newline(contents))]))
    }
}

/// Drop exactly one trailing line feed.
fn strip_trailing_newline(mut contents: Vec<u8>) -> Vec<u8> {
    if contents.last() == Some(&b'\n') {
        contents.pop();
    }
    contents
}
