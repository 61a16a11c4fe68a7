//! Change detection for rendered Dockerfiles

use std::collections::HashSet;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::release::ReleaseTag;

/// True when there is no previous content or it differs from `rendered`
///
/// Compares raw bytes so a previous file that is not valid UTF-8 counts as changed.
pub fn has_changed(previous: Option<&[u8]>, rendered: &str) -> bool {
    previous != Some(rendered.as_bytes())
}

/// Tracks which tags' Dockerfiles changed during this run
#[derive(Debug, Default)]
pub struct ChangeTracker {
    dirty: HashSet<String>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `rendered` with the `previous` content and mark the tag dirty if it changed
    pub fn observe(&mut self, tag: &ReleaseTag, previous: Option<&[u8]>, rendered: &str) -> bool {
        let changed = has_changed(previous, rendered);
        if changed {
            debug!("Dockerfile for {} changed", tag);
            self.dirty.insert(tag.stripped().to_string());
        }
        changed
    }

    /// Compare against the file at `path`, then overwrite it with `rendered`
    ///
    /// The file is written whether or not it changed. Returns whether it changed.
    pub fn persist(&mut self, tag: &ReleaseTag, path: &Path, rendered: &str) -> io::Result<bool> {
        let previous = match std::fs::read(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };

        let changed = self.observe(tag, previous.as_deref(), rendered);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, rendered)?;

        Ok(changed)
    }

    pub fn is_dirty(&self, stripped_tag: &str) -> bool {
        self.dirty.contains(stripped_tag)
    }

    pub fn dirty(&self) -> &HashSet<String> {
        &self.dirty
    }

    pub fn into_dirty(self) -> HashSet<String> {
        self.dirty
    }
}
