//! Diffuse texture loading. Decoding is delegated to `image`.

use std::path::Path;

use anyhow::{Context, Result};

/// RGBA8 pixels ready for upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            rgba8_len(width, height),
            "Data size doesn't match RGBA8 format"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Decode any format `image` was built with and convert to RGBA8.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).with_context(|| format!("Failed to open image {:?}", path))?;
        let channels = img.color().channel_count();
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::info!("Loaded texture {}x{} ({} channels in source)", width, height, channels);
        Ok(Self::new_rgba8(width, height, rgba.into_raw()))
    }

    /// Try `primary`, then `alternate`, then fall back to a checkerboard.
    /// Never fails: a missing texture should not stop the mesh from drawing.
    pub fn load_or_fallback(primary: &Path, alternate: Option<&Path>) -> Self {
        match Self::load(primary) {
            Ok(texture) => return texture,
            Err(err) => log::warn!("{:#}", err),
        }
        if let Some(alt) = alternate {
            log::warn!("Trying alternate texture path {:?}", alt);
            match Self::load(alt) {
                Ok(texture) => return texture,
                Err(err) => log::warn!("{:#}", err),
            }
        }
        log::warn!("Using checkerboard texture");
        Self::checkerboard(64)
    }

    /// White/gray checkerboard with 8px squares.
    pub fn checkerboard(size: u32) -> Self {
        let mut data = Vec::with_capacity(rgba8_len(size, size));
        for y in 0..size {
            for x in 0..size {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }
        Self::new_rgba8(size, size, data)
    }

    pub fn is_valid(&self) -> bool {
        self.data.len() == rgba8_len(self.width, self.height) && self.width > 0 && self.height > 0
    }
}

/// Byte length of an RGBA8 image, computed in `usize` so large sizes cannot wrap.
fn rgba8_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_is_valid() {
        let tex = TextureData::checkerboard(16);
        assert!(tex.is_valid());
        assert_eq!(&tex.data[0..4], &[255, 255, 255, 255]);
        // pixel (8, 0) is in the second square
        assert_eq!(&tex.data[8 * 4..8 * 4 + 4], &[128, 128, 128, 255]);
    }

    #[test]
    fn rgba8_len_does_not_wrap_in_u32() {
        // 32768 * 32768 * 4 == 2^32, one past u32::MAX
        assert_eq!(rgba8_len(32_768, 32_768), 1usize << 32);
    }

    #[test]
    fn missing_texture_falls_back() {
        let tex = TextureData::load_or_fallback(Path::new("/no/such/tex.png"), Some(Path::new("/nor/this.png")));
        assert!(tex.is_valid());
        assert_eq!(tex.width, 64);
    }

    #[test]
    fn png_round_trips_through_image() {
        let dir = std::env::temp_dir().join("objmesh_texture_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("red.png");
        image::RgbImage::from_pixel(2, 3, image::Rgb([255, 0, 0])).save(&path).unwrap();

        let tex = TextureData::load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (2, 3));
        assert_eq!(&tex.data[0..4], &[255, 0, 0, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
