use crate::settings::LightSettings;
use glam::Vec3;

/// Directional light colours and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,
    direction: Vec3,
}

impl Light {
    pub fn new(settings: &LightSettings) -> Self {
        Self {
            ambient: settings.ambient,
            diffuse: settings.diffuse,
            specular: settings.specular,
            direction: Self::orbit_direction(0.0),
        }
    }

    /// Direction at `time` seconds: `normalize(cos(t/2), 1, sin(t/2))`.
    pub fn orbit_direction(time: f32) -> Vec3 {
        let angle = time * 0.5;
        Vec3::new(angle.cos(), 1.0, angle.sin()).normalize()
    }

    pub fn orbit(&mut self, time: f32) {
        self.direction = Self::orbit_direction(time);
    }

    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    pub fn set_ambient(&mut self, color: Vec3) {
        self.ambient = color;
    }

    pub fn diffuse(&self) -> Vec3 {
        self.diffuse
    }

    pub fn set_diffuse(&mut self, color: Vec3) {
        self.diffuse = color;
    }

    pub fn specular(&self) -> Vec3 {
        self.specular
    }

    pub fn set_specular(&mut self, color: Vec3) {
        self.specular = color;
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Normalizes `direction`; a zero vector is ignored.
    pub fn set_direction(&mut self, direction: Vec3) {
        if let Some(d) = direction.try_normalize() {
            self.direction = d;
        }
    }
}
