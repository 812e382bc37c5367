//! Routing subsystem.
//!
//! There is one route: everything under the mount prefix goes to the
//! configured upstream. `target.rs` turns the remainder of the path into the
//! upstream URL.

pub mod target;

pub use target::TargetPath;
