//! Link plan scanning and artifact classification.
//!
//! gn writes a ninja file per target. The line that links the library
//! target lists its complete link closure: every object file and every
//! static sub-library. Merging those into one archive gives a library that
//! can be linked without the WebRTC build tree.

use crate::error::{BuilderError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Tokens of the link plan lines that mention the library target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    tokens: Vec<String>,
}

/// Linked files sorted by how they are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkArtifacts {
    /// Object files, merged into a temporary archive first.
    pub objects: Vec<Utf8PathBuf>,
    /// Static libraries, merged directly.
    pub archives: Vec<Utf8PathBuf>,
}

impl LinkPlan {
    /// Read the link plan at `path`, keeping lines that contain `target`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::LinkPlanMissing`] if the file does not exist.
    pub fn read(path: &Utf8Path, target: &str) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BuilderError::LinkPlanMissing {
                path: path.to_owned(),
            },
            _ => BuilderError::filesystem(path, e),
        })?;
        Ok(Self::parse(&contents, target))
    }

    /// Collect every whitespace-separated token of every line containing
    /// `target`, in file order.
    #[must_use]
    pub fn parse(contents: &str, target: &str) -> Self {
        let tokens = contents
            .lines()
            .filter(|line| line.contains(target))
            .flat_map(str::split_whitespace)
            .map(str::to_owned)
            .collect();
        Self { tokens }
    }

    /// The collected tokens.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Sort tokens into objects and archives.
    ///
    /// Tokens containing any of `exclusions`, or for which `always_excluded`
    /// returns `true`, are dropped. Of the rest, `.o` files become objects
    /// and `.a` files archives; anything else (rule names, flags, the
    /// target's own `name:` output) is ignored. Kept paths are joined onto
    /// `base`.
    #[must_use]
    pub fn classify(
        &self,
        base: &Utf8Path,
        exclusions: &[String],
        always_excluded: impl Fn(&str) -> bool,
    ) -> LinkArtifacts {
        let mut artifacts = LinkArtifacts::default();
        let kept = self.tokens.iter().filter(|token| {
            !always_excluded(token) && !exclusions.iter().any(|ex| token.contains(ex.as_str()))
        });
        for token in kept {
            if token.ends_with(".o") {
                artifacts.objects.push(base.join(token));
            } else if token.ends_with(".a") {
                artifacts.archives.push(base.join(token));
            }
        }
        artifacts
    }
}
