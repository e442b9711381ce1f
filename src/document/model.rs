use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ExplorerError, ExplorerResult};

/// Edit counter of a document; every text change gets a new revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Source text owned by the surrounding document layer
#[derive(Debug, Clone)]
pub struct Document {
    path: Option<PathBuf>,
    text: Arc<str>,
    revision: Revision,
}

impl Document {
    /// Create an unsaved document with just text
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            path: None,
            text: text.into(),
            revision: Revision::default(),
        }
    }

    /// Load a document from disk.
    ///
    /// # Errors
    /// `CorruptFile` if the file is not valid UTF-8, `Io` if it cannot be
    /// read.
    pub fn open(path: impl AsRef<Path>) -> ExplorerResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|err| {
            log::warn!(
                target: "cst_explorer::document",
                "Rejecting {}: invalid UTF-8 at byte {}",
                path.display(),
                err.utf8_error().valid_up_to()
            );
            ExplorerError::corrupt_file(path)
        })?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            text: text.into(),
            revision: Revision::default(),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shared handle to the text, for handing to a background parse
    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Replace the text, returning the new revision
    pub fn update_text(&mut self, text: impl Into<Arc<str>>) -> Revision {
        self.text = text.into();
        self.revision = self.revision.next();
        self.revision
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
