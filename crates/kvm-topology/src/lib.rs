//! # kvm-topology
//!
//! Shared library for KVM-Configurator containing the screen topology model
//! and the reader/writer for the synchronization engine's configuration
//! grammar.
//!
//! It has zero dependencies on OS APIs, UI frameworks, or the file system.
//!
//! # Architecture overview (for beginners)
//!
//! A software KVM switch lets one keyboard and mouse (attached to the
//! "server" screen) drive several other computers ("client" screens).  When
//! the cursor leaves the server screen through an edge, input is redirected to
//! whichever screen sits on the other side of that edge.  The redirection
//! itself is done by an external engine process; this crate only describes
//! *where* every screen sits.
//!
//! - **`domain`** – Pure business logic.  Screens are placed on the cells of
//!   an unbounded grid ([`Cell`]).  The [`ScreenRegistry`] owns the screens
//!   and an index from cell to screen; the [`Topology`] view derives every
//!   left/right/up/down neighbor from that index, so adjacency can never
//!   drift away from the placement.
//!
//! - **`format`** – The text grammar consumed by the engine.  [`export`]
//!   turns a [`ServerConfig`] into a [`Document`]; [`import`] parses a
//!   document back, rejecting inconsistent links instead of guessing.

pub mod domain;
pub mod format;

// Re-export the most-used types at the crate root so callers can write
// `kvm_topology::ServerConfig` instead of `kvm_topology::domain::config::ServerConfig`.
pub use domain::config::{ScreenEdit, ServerConfig};
pub use domain::grid::{Cell, Direction, GridViewport};
pub use domain::hotkey::{ActionKind, HotkeyAction, KeyChord, LockMode, Trigger};
pub use domain::options::GlobalOptions;
pub use domain::registry::{RegistryError, ScreenRegistry};
pub use domain::screen::{
    Corner, DeadCorners, ModifierKey, ModifierRemap, Screen, ScreenFixes, ScreenId, ScreenSettings,
};
pub use domain::topology::{Link, Topology};
pub use format::{export, import, Document, ExportError, ImportError};
