//! Infrastructure layer for the configurator.
//!
//! Contains the file-system adapters: the TOML settings file and the engine
//! configuration file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `kvm_topology`, but MUST NOT be imported by the `application` layer.

pub mod storage;
