//! Input polled once per tick by the host and consumed by scene actors.
//!
//! # Invariants
//! - Actors read a snapshot, never raw window events.
//! - The snapshot is independent of the windowing library.

pub mod state;

pub use state::{InputState, Key};
