//! Downsamples the zoom-17 tile grid into coarser zoom levels, 2:1 per
//! step, down to a single zoom-0 tile.

use crate::dimension::Dimension;
use crate::tile::{tile_path, TILE_SIZE};
use anyhow::{Context, Result};
use image::{imageops, RgbaImage};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;

fn child_tiles(root: &Path, dimension: Dimension, zoom: u8) -> Result<Vec<(i64, i64)>> {
    let pattern = root.join(dimension.as_str()).join(zoom.to_string()).join("*/*.png");
    let pattern = pattern.to_string_lossy().into_owned();

    let mut tiles = Vec::new();
    for entry in glob::glob(&pattern).context("invalid tile search pattern")? {
        let path = entry?;
        let y: i64 = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
            .context("malformed tile filename")?;
        let x: i64 = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
            .context("malformed tile directory name")?;
        tiles.push((x, y));
    }

    Ok(tiles)
}

/// Reduces every tile at `zoom + 1` into its parent at `zoom`, returning
/// the set of parent tile coordinates written.
pub fn reduce_level(root: &Path, dimension: Dimension, zoom: u8) -> Result<HashSet<(i64, i64)>> {
    let children = child_tiles(root, dimension, zoom + 1)?;

    let mut parents: HashSet<(i64, i64)> = HashSet::new();
    for (x, y) in &children {
        parents.insert((x.div_euclid(2), y.div_euclid(2)));
    }

    parents
        .par_iter()
        .try_for_each(|&(px, py)| -> Result<()> {
            let mut canvas = RgbaImage::new(TILE_SIZE * 2, TILE_SIZE * 2);

            for dz in 0..2i64 {
                for dx in 0..2i64 {
                    let child_path = tile_path(root, dimension, zoom + 1, px * 2 + dx, py * 2 + dz);
                    if !child_path.is_file() {
                        continue;
                    }
                    let child = image::open(&child_path)
                        .with_context(|| format!("failed to open {}", child_path.display()))?
                        .into_rgba8();
                    imageops::overlay(
                        &mut canvas,
                        &child,
                        dx * i64::from(TILE_SIZE),
                        dz * i64::from(TILE_SIZE),
                    );
                }
            }

            let reduced = imageops::resize(&canvas, TILE_SIZE, TILE_SIZE, imageops::FilterType::Nearest);
            let path = tile_path(root, dimension, zoom, px, py);
            if let Some(parent_dir) = path.parent() {
                std::fs::create_dir_all(parent_dir)
                    .with_context(|| format!("failed to create {}", parent_dir.display()))?;
            }
            reduced.save(&path).with_context(|| format!("failed to write {}", path.display()))
        })?;

    Ok(parents)
}

/// Reduces the whole pyramid from `BASE_ZOOM - 1` down to zoom 0,
/// sequentially by level (each level depends on the one above it) but in
/// parallel within a level. Returns the total number of tiles written.
pub fn reduce_pyramid(root: &Path, dimensions: &[Dimension]) -> Result<usize> {
    let mut total = 0;

    for zoom in (0..crate::tile::BASE_ZOOM).rev() {
        for &dimension in dimensions {
            let written = reduce_level(root, dimension, zoom)?;
            total += written.len();
        }
    }

    Ok(total)
}
