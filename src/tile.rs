//! Slices a composited 2048x2048 bucket into 256x256 zoom-17 tiles.

use crate::dimension::Dimension;
use anyhow::{Context, Result};
use image::{imageops, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

pub const BASE_ZOOM: u8 = 17;
const TILES_PER_BUCKET_SIDE: u32 = 16;
const CROP_SIZE: u32 = 128;
pub const TILE_SIZE: u32 = 256;

pub fn tile_path(root: &Path, dimension: Dimension, zoom: u8, x: i64, y: i64) -> PathBuf {
    root.join(dimension.as_str()).join(zoom.to_string()).join(x.to_string()).join(format!("{y}.png"))
}

fn write_tile(path: &Path, image: &RgbaImage) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image.save(path).with_context(|| format!("failed to write {}", path.display()))
}

/// Slices one bucket canvas into its 16x16 grid of zoom-17 tiles, each
/// cropped to its 128px source region then upscaled to the viewer's
/// 256px tile size. `bx`/`bz` are the bucket's world-block origin divided
/// by the bucket size, i.e. the tile coordinate of its top-left corner at
/// the base zoom level. Returns the tile coordinates written.
pub fn slice_bucket(
    root: &Path,
    dimension: Dimension,
    base_tile_x: i64,
    base_tile_y: i64,
    bucket: &RgbaImage,
) -> Result<Vec<(i64, i64)>> {
    let mut written = Vec::with_capacity((TILES_PER_BUCKET_SIDE * TILES_PER_BUCKET_SIDE) as usize);

    for nz in 0..TILES_PER_BUCKET_SIDE {
        for nx in 0..TILES_PER_BUCKET_SIDE {
            let cropped = imageops::crop_imm(bucket, nx * CROP_SIZE, nz * CROP_SIZE, CROP_SIZE, CROP_SIZE)
                .to_image();
            let resized = imageops::resize(&cropped, TILE_SIZE, TILE_SIZE, imageops::FilterType::Nearest);

            let x = base_tile_x + i64::from(nx);
            let y = base_tile_y + i64::from(nz);
            write_tile(&tile_path(root, dimension, BASE_ZOOM, x, y), &resized)?;
            written.push((x, y));
        }
    }

    Ok(written)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tile_path_layout() {
        let path = tile_path(Path::new("/out"), Dimension::Overworld, 17, -3, 5);
        assert_eq!(path, Path::new("/out/overworld/17/-3/5.png"));
    }

    #[test]
    fn slice_bucket_writes_full_grid() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = RgbaImage::new(2048, 2048);

        let written = slice_bucket(dir.path(), Dimension::Overworld, 10, 20, &bucket).unwrap();

        assert_eq!(written.len(), 256);
        assert!(written.contains(&(10, 20)));
        assert!(written.contains(&(25, 35)));
        assert!(dir.path().join("overworld/17/10/20.png").exists());
    }
}
