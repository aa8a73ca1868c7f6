//! Use cases: produce and open engine configuration documents.
//!
//! These functions work on [`Document`] values only; reading and writing the
//! files is done by `infrastructure::storage::engine_file`.

use kvm_topology::{export, import, Document, ExportError, ImportError, ServerConfig};
use tracing::{info, warn};

/// Exports `config` for the engine, logging a refusal.
pub fn export_engine_config(config: &ServerConfig) -> Result<Document, ExportError> {
    match export(config) {
        Ok(document) => {
            info!(screens = config.registry().len(), "engine configuration exported");
            Ok(document)
        }
        Err(e) => {
            warn!(error = %e, "engine configuration not exported");
            Err(e)
        }
    }
}

/// Replaces `config` with the contents of `document`.
///
/// On error `config` is left empty rather than half-loaded, and the error is
/// returned so the caller can show it.
pub fn open_engine_config(config: &mut ServerConfig, document: &Document) -> Result<(), ImportError> {
    match import(document.as_str()) {
        Ok(imported) => {
            *config = imported;
            info!(
                screens = config.registry().len(),
                hotkeys = config.hotkeys().len(),
                "engine configuration opened"
            );
            Ok(())
        }
        Err(e) => {
            *config = ServerConfig::new();
            warn!(line = e.line(), error = %e, "engine configuration rejected");
            Err(e)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
