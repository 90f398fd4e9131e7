use crate::error::GameError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scene configuration. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub light: LightSettings,
    pub earth: EarthSettings,
    pub assets: AssetSettings,
    pub debug: DebugSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Computer Graphics".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    /// Degrees.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    /// World units per second.
    pub move_speed: f32,
    /// Degrees per pixel of mouse travel per second.
    pub turn_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::splat(10.0),
            yaw: -135.0,
            pitch: -45.0,
            move_speed: 1.0,
            turn_speed: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for LightSettings {
    fn default() -> Self {
        let red = Vec3::new(0.66, 0.0, 0.0);
        Self {
            ambient: red,
            diffuse: red,
            specular: red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthSettings {
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub spin_degrees_per_second: f32,
    /// Image to wrap the sphere with; a generated texture is used when unset.
    pub texture: Option<PathBuf>,
}

impl Default for EarthSettings {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::splat(10.0),
            spin_degrees_per_second: 10.0,
            texture: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// OBJ mesh drawn at the origin.
    pub model: PathBuf,
    pub model_texture: Option<PathBuf>,
    /// WGSL source replacing the built-in scene shader.
    pub shader: Option<PathBuf>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            model: PathBuf::from("soulspear.obj"),
            model_texture: None,
            shader: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Maximum debug lines per frame.
    pub line_capacity: usize,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            line_capacity: 10_000,
        }
    }
}

impl SceneSettings {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let config_error = |message: String| GameError::Config {
            path: path.to_path_buf(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let settings = serde_json::from_str(&text).map_err(|e| config_error(e.to_string()))?;
        tracing::info!(path = %path.display(), "loaded scene settings");
        Ok(settings)
    }
}
