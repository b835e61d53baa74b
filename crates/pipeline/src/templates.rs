//! Static example diagram storage.
//!
//! Example documents live as `.drawio` files under a content root and are
//! served verbatim — no headers, no negotiation, just the file text. The
//! built-in catalog backs the sidebar's template menu.

use std::path::{Component, Path, PathBuf};

/// One entry in the template catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Identifier used in URLs and file names (without extension).
    pub name: &'static str,
    /// Human-readable title, also used as the document title when loaded
    /// into the editor.
    pub title: &'static str,
}

/// Templates shipped with the application.
pub const BUILT_IN_TEMPLATES: &[TemplateEntry] = &[
    TemplateEntry {
        name: "div_by_zero",
        title: "Divide by Zero",
    },
    TemplateEntry {
        name: "nested_loop",
        title: "Nested Loop",
    },
    TemplateEntry {
        name: "reusable_function",
        title: "Reusable Function",
    },
];

/// Errors from template lookup.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template file exists for the given name.
    #[error("template '{name}' not found")]
    NotFound { name: String },

    /// The name contains path segments that would escape the content root.
    #[error("invalid template name '{0}'")]
    InvalidName(String),

    /// Reading the template file failed for a reason other than absence.
    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads example diagrams from a directory.
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The built-in catalog, in menu order.
    pub fn list(&self) -> &'static [TemplateEntry] {
        BUILT_IN_TEMPLATES
    }

    /// Title to show for a template name: the catalog title when the name
    /// is a built-in, otherwise the last path segment as-is.
    pub fn title_for(&self, name: &str) -> String {
        BUILT_IN_TEMPLATES
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.title.to_string())
            .unwrap_or_else(|| {
                name.rsplit('/')
                    .next()
                    .unwrap_or(name)
                    .to_string()
            })
    }

    /// Read the diagram text for `name` verbatim.
    ///
    /// `name` may contain subdirectory segments (e.g.
    /// `templates/nested_loop`); a leading `/` is tolerated. Names with
    /// parent-directory segments are rejected before touching the
    /// filesystem.
    pub async fn load(&self, name: &str) -> Result<String, TemplateError> {
        let path = self.resolve(name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TemplateError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(TemplateError::Io(e)),
        }
    }

    /// Map a template name to its file path under the content root.
    fn resolve(&self, name: &str) -> Result<PathBuf, TemplateError> {
        let trimmed = name.trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(TemplateError::InvalidName(name.to_string()));
        }
        let relative = Path::new(trimmed);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(TemplateError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{trimmed}.drawio")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn loads_template_text_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let content = "<mxfile><diagram>loop</diagram></mxfile>\n";
        std::fs::write(dir.path().join("nested_loop.drawio"), content).unwrap();

        let store = TemplateStore::new(dir.path());
        let text = store.load("nested_loop").await.unwrap();
        assert_eq!(text, content);
    }

    #[tokio::test]
    async fn loads_from_subdirectory_with_leading_slash() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("templates")).unwrap();
        std::fs::write(dir.path().join("templates/nested_loop.drawio"), "<t/>").unwrap();

        let store = TemplateStore::new(dir.path());
        let text = store.load("/templates/nested_loop").await.unwrap();
        assert_eq!(text, "<t/>");
    }

    #[tokio::test]
    async fn missing_template_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        assert_matches!(
            store.load("no_such_template").await,
            Err(TemplateError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn parent_directory_segments_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        assert_matches!(
            store.load("../etc/passwd").await,
            Err(TemplateError::InvalidName(_))
        );
        assert_matches!(store.load("").await, Err(TemplateError::InvalidName(_)));
    }

    #[test]
    fn catalog_titles_resolve() {
        let store = TemplateStore::new("/tmp");
        assert_eq!(store.title_for("nested_loop"), "Nested Loop");
        assert_eq!(store.title_for("templates/custom_one"), "custom_one");
    }
}
