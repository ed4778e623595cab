//! Groups stored map PNGs into 2048x2048 world-block buckets and composites
//! each bucket's maps onto a single canvas in paint order.

use crate::dimension::Dimension;
use crate::png_store::StoredMapPng;
use anyhow::{Context, Result};
use image::{imageops, RgbaImage};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::Path;

pub const BUCKET_SIZE: i32 = 2048;

/// World-block coordinate of a map's top-left corner, derived from its
/// center and painted side length.
pub fn top_left(stored: &StoredMapPng) -> (i32, i32) {
    let half_side = (64i32) << stored.scale;
    (stored.x - half_side + 64, stored.z - half_side + 64)
}

pub fn bucket_origin(top_left: (i32, i32)) -> (i32, i32) {
    (top_left.0.div_euclid(BUCKET_SIZE) * BUCKET_SIZE, top_left.1.div_euclid(BUCKET_SIZE) * BUCKET_SIZE)
}

pub fn group_by_bucket(
    maps: &[StoredMapPng],
) -> HashMap<(Dimension, i32, i32), Vec<&StoredMapPng>> {
    let mut buckets: HashMap<(Dimension, i32, i32), Vec<&StoredMapPng>> = HashMap::new();

    for map in maps {
        let origin = bucket_origin(top_left(map));
        buckets.entry((map.dimension, origin.0, origin.1)).or_default().push(map);
    }

    buckets
}

/// Orders maps within a bucket so later entries paint over earlier ones:
/// lower zoom (more detail) last, ties broken by most recent epoch.
fn paint_order(maps: &mut [&StoredMapPng], disable_zoom_sort: bool) {
    if disable_zoom_sort {
        maps.sort_by_key(|m| m.epoch);
    } else {
        maps.sort_by_key(|m| (Reverse(m.scale), m.epoch));
    }
}

pub fn composite_bucket(
    origin: (i32, i32),
    maps: &[&StoredMapPng],
    disable_zoom_sort: bool,
) -> Result<RgbaImage> {
    let mut ordered: Vec<&StoredMapPng> = maps.to_vec();
    paint_order(&mut ordered, disable_zoom_sort);

    let mut canvas = RgbaImage::new(BUCKET_SIZE as u32, BUCKET_SIZE as u32);

    for map in ordered {
        let source = image::open(&map.path)
            .with_context(|| format!("failed to reopen {}", map.path.display()))?
            .into_rgba8();

        let tl = top_left(map);
        let local_x = (tl.0 - origin.0).rem_euclid(BUCKET_SIZE) as i64;
        let local_z = (tl.1 - origin.1).rem_euclid(BUCKET_SIZE) as i64;

        imageops::overlay(&mut canvas, &source, local_x, local_z);
    }

    Ok(canvas)
}

pub fn bucket_filename(dimension: Dimension, origin: (i32, i32)) -> String {
    format!("{dimension}.{}.{}.png", origin.0, -origin.1)
}

pub fn write_bucket(dir: &Path, dimension: Dimension, origin: (i32, i32), image: &RgbaImage) -> Result<()> {
    let path = dir.join(bucket_filename(dimension, origin));
    image.save(&path).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn map(x: i32, z: i32, scale: u8, epoch: i64) -> StoredMapPng {
        StoredMapPng {
            id: 1,
            hash: "h".to_owned(),
            epoch,
            dimension: Dimension::Overworld,
            x,
            z,
            scale,
            path: PathBuf::from("unused.png"),
        }
    }

    #[test]
    fn top_left_centers_on_scale_zero() {
        let tl = top_left(&map(64, 64, 0, 0));
        assert_eq!(tl, (64 - 64 + 64, 64 - 64 + 64));
    }

    #[test]
    fn bucket_origin_floors_to_grid() {
        assert_eq!(bucket_origin((2050, -10)), (2048, -2048));
        assert_eq!(bucket_origin((-1, -1)), (-2048, -2048));
    }

    #[test]
    fn paint_order_prefers_detail_then_recency() {
        let coarse = map(0, 0, 3, 5);
        let fine_old = map(0, 0, 0, 1);
        let fine_new = map(0, 0, 0, 2);
        let mut maps = vec![&coarse, &fine_old, &fine_new];

        paint_order(&mut maps, false);

        assert_eq!(maps.last().unwrap().scale, 0);
        assert_eq!(maps.last().unwrap().epoch, 2);
    }

    #[test]
    fn disable_zoom_sort_uses_epoch_only() {
        let coarse_new = map(0, 0, 3, 9);
        let fine_old = map(0, 0, 0, 1);
        let mut maps = vec![&fine_old, &coarse_new];

        paint_order(&mut maps, true);

        assert_eq!(maps.last().unwrap().epoch, 9);
    }
}
