use glam::Mat4;
use scene_input::InputState;

/// Something in the scene that advances once per tick.
pub trait Actor {
    /// Advance by `dt` seconds. Returning false asks the loop to stop.
    fn update(&mut self, dt: f32, input: &InputState) -> bool;

    /// World transform of the actor.
    fn transform(&self) -> Mat4;
}
