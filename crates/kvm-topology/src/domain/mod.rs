//! Domain entities for KVM-Configurator.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from OS APIs, file systems, or UI frameworks.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Here the rules are: one screen per grid cell, globally unique names and
//! aliases, adjacency derived from neighboring cells, and hotkeys that never
//! point at a screen that no longer exists.

/// Integer cell addressing and the user-visible grid window.
pub mod grid;

/// Screens and their per-screen settings.
pub mod screen;

/// Arena of screens plus the cell occupancy index.
pub mod registry;

/// Adjacency derived from cell occupancy.
pub mod topology;

/// Hotkey actions that switch focus or lock the cursor.
pub mod hotkey;

/// Options that apply to the whole server rather than a single screen.
pub mod options;

/// The aggregate edited by the front-end and exported to the engine.
pub mod config;
