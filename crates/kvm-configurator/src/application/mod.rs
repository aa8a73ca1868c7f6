//! Application layer use cases for the layout editor.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (the screen model in `kvm-topology`) and the infrastructure (files,
//! terminal, settings).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "move this
//!   screen to that cell").
//! - **Depend on abstractions** (traits) rather than concrete UI code, so the
//!   same logic drives a desktop editor or the command line.
//! - **Contain no OS calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`placement`**   – Drag-and-drop gestures: add a screen from the
//!   palette, move it, drop it on the removal target.
//!
//! - **`edit_screen`** – Runs the screen settings form until the input is
//!   valid or the user cancels.
//!
//! - **`auto_place`**  – Finds a cell for a client announced by the engine's
//!   auto-configuration.
//!
//! - **`config_io`**   – Turns the layout into an engine document and back.

pub mod auto_place;
pub mod config_io;
pub mod edit_screen;
pub mod placement;
