//! Reader and writer for the synchronization engine's configuration grammar.
//!
//! Text format (one statement per line, `#` starts a comment):
//! ```text
//! section: screens
//!     <name>:
//!         #@cell <column>,<row>
//!         shift = <modifier>
//!         ...
//! end
//! section: aliases
//!     <name>:
//!         <alias>
//! end
//! section: links
//!     <name>:
//!         right = <name>
//! end
//! section: options
//!     clipboardSharing = true
//!     keystroke(Control+Alt+Left) = switchInDirection(left)
//! end
//! ```
//!
//! Lines starting with `#@` are editor directives.  The engine skips them as
//! comments; [`import`] reads them back so grid cells and editor-only options
//! survive a round trip.

use thiserror::Error;

use crate::domain::registry::RegistryError;

mod export;
mod import;
mod lexer;

pub use export::export;
pub use import::import;

/// Keyword of the editor directive carrying a screen's grid cell.
pub(crate) const CELL_DIRECTIVE: &str = "cell";

/// Keyword of the editor directive carrying `ignore_auto_config_clients`.
pub(crate) const IGNORE_AUTO_CONFIG_DIRECTIVE: &str = "ignoreAutoConfigClients";

/// A configuration document in the engine's text grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document(String);

impl Document {
    /// Wraps text read from disk.  The text is not validated until [`import`].
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that prevent a configuration from being exported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// There is nothing to export.
    #[error("the configuration has no screens")]
    NoScreens,

    /// Some screens cannot be reached from the others.
    #[error("the screens form {components} separate groups; every screen must touch another")]
    Disconnected { components: usize },
}

/// Errors that reject a document.  Line numbers are 1-based.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The text does not follow the grammar.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A name used in the aliases, links or options section was never declared.
    #[error("line {line}: unknown screen \"{name}\"")]
    UnknownScreen { line: usize, name: String },

    /// The declared screens violate a registry rule (duplicate name or cell).
    #[error("line {line}: {source}")]
    Registry {
        line: usize,
        #[source]
        source: RegistryError,
    },

    /// Links that cannot be turned into a consistent grid.
    #[error("line {line}: malformed link: {reason}")]
    MalformedLink { line: usize, reason: String },
}

impl ImportError {
    /// Line the error was detected on.
    pub fn line(&self) -> usize {
        match self {
            ImportError::Syntax { line, .. }
            | ImportError::UnknownScreen { line, .. }
            | ImportError::Registry { line, .. }
            | ImportError::MalformedLink { line, .. } => *line,
        }
    }
}
