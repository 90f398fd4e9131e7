use crate::AssetError;
use scene_common::TextureData;
use std::f32::consts::{PI, TAU};
use std::path::Path;

/// Load an image file (PNG or JPEG) as RGBA8.
pub fn load(path: impl AsRef<Path>) -> Result<TextureData, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let texture = decode(&bytes)?;
    tracing::info!(
        path = %path.display(),
        width = texture.width,
        height = texture.height,
        "loaded texture"
    );
    Ok(texture)
}

/// Decode an in-memory PNG or JPEG as RGBA8.
pub fn decode(bytes: &[u8]) -> Result<TextureData, AssetError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureData {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

const OCEAN: [u8; 4] = [22, 64, 140, 255];
const LAND: [u8; 4] = [54, 120, 48, 255];
const ICE: [u8; 4] = [235, 240, 245, 255];

/// Equirectangular stand-in Earth: polar caps above 72 degrees latitude,
/// continents where a low-frequency sine field crosses a threshold.
pub fn earth_texture(width: u32, height: u32) -> TextureData {
    TextureData::from_fn(width, height, |u, v| {
        let latitude = (0.5 - v) * PI;
        if latitude.abs() > 72.0_f32.to_radians() {
            return ICE;
        }
        let lon = u * TAU;
        let lat = v * PI;
        let field = (lon * 2.0).sin() * (lat * 3.0).sin()
            + 0.5 * (lon * 5.0 + 1.3).sin() * (lat * 4.0 + 0.7).cos();
        if field > 0.45 { LAND } else { OCEAN }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn earth_has_ice_caps_and_both_surfaces() {
        let tex = earth_texture(128, 64);
        assert_eq!(tex.texel(0, 0), Some(ICE));
        assert_eq!(tex.texel(64, 63), Some(ICE));
        let equator: Vec<[u8; 4]> = (0..128).filter_map(|x| tex.texel(x, 32)).collect();
        assert!(equator.contains(&OCEAN));
        assert!(tex.pixels.chunks_exact(4).any(|p| p == LAND));
    }

    #[test]
    fn png_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let img = ImageBuffer::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255u8, 255, 255, 255])
            } else {
                Rgba([0u8, 0, 0, 255])
            }
        });
        img.save(&path).unwrap();

        let tex = load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(tex.texel(1, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        assert!(matches!(decode(b"not an image"), Err(AssetError::Image(_))));
    }
}
