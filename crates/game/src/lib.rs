//! Scene actors and the game loop.
//!
//! # Invariants
//! - The loop is single-threaded: `start`, then `update`/`draw` once per tick
//!   until either returns false, then `end`.
//! - Start-up failure never enters the running state; exit codes are
//!   0 (success), -1 (start-up failure), -2 (teardown failure).
//! - Actors read an input snapshot; only the `Host` talks to the window.

pub mod actor;
pub mod camera;
pub mod earth;
pub mod error;
pub mod game;
pub mod headless;
pub mod host;
pub mod light;
pub mod settings;

pub use actor::Actor;
pub use camera::Camera;
pub use earth::Earth;
pub use error::GameError;
pub use game::{ExitStatus, Game, GameState};
pub use headless::{FrameStats, HeadlessHost};
pub use host::{Host, HostConfig};
pub use light::Light;
pub use settings::SceneSettings;
