//! Emits the banner and map-footprint marker files consumed by the web
//! viewer, as flat JSON/GeoJSON-shaped documents alongside the tile tree.

use crate::decoder::{Banner, DecodedMap, Frame};
use crate::dimension::Dimension;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct BannerFeature {
    #[serde(rename = "X")]
    x: i32,
    #[serde(rename = "Y")]
    y: i32,
    #[serde(rename = "Z")]
    z: i32,
    name: String,
    color: String,
    dimension: &'static str,
}

pub fn write_banners(path: &Path, maps: &[DecodedMap]) -> Result<()> {
    let mut seen: BTreeSet<(i32, i32, i32, String, String, &'static str)> = BTreeSet::new();
    let mut features = Vec::new();

    for map in maps {
        for banner in &map.banners {
            let key = (
                banner.x,
                banner.y,
                banner.z,
                banner.name.clone(),
                banner.color.clone(),
                map.dimension.as_str(),
            );
            if !seen.insert(key) {
                continue;
            }

            features.push(BannerFeature {
                x: banner.x,
                y: banner.y,
                z: banner.z,
                name: banner.name.clone(),
                color: banner.color.clone(),
                dimension: map.dimension.as_str(),
            });
        }
    }

    let body = serde_json::to_vec(&features).context("failed to serialize banners")?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

/// The five-point closed ring `[TL, TR, BL, BR, TL]`, `TL = (center_x −
/// 64·2^scale, center_z − 64·2^scale)`, with no additional shift or sign
/// flip — this is a different point from the compositor's bucket-aligned
/// top-left.
fn footprint_ring(center_x: i32, center_z: i32, scale: u8, width: i32) -> serde_json::Value {
    let half = 64i32 << scale;
    let top_left = [center_x - half, center_z - half];
    let top_right = [center_x - half + width, center_z - half];
    let bottom_left = [center_x - half, center_z - half + width];
    let bottom_right = [center_x - half + width, center_z - half + width];

    serde_json::json!([[top_left, top_right, bottom_left, bottom_right, top_left]])
}

#[derive(Serialize)]
struct MapMember<'a> {
    id: u32,
    scale: u8,
    filename: &'a str,
    banners: &'a [Banner],
    frames: &'a [Frame],
}

pub fn write_maps(
    path: &Path,
    maps: &[DecodedMap],
    filenames: &HashMap<u32, String>,
) -> Result<()> {
    let mut groups: HashMap<(Dimension, i32, i32, u8), Vec<&DecodedMap>> = HashMap::new();
    for map in maps {
        groups
            .entry((map.dimension, map.center.x, map.center.z, map.scale.0))
            .or_default()
            .push(map);
    }

    let mut features = Vec::new();
    for ((dimension, center_x, center_z, scale), mut group) in groups {
        group.sort_by_key(|m| m.id);

        let width = 128 * (1i32 << scale);
        let members: Vec<MapMember> = group
            .iter()
            .filter_map(|map| {
                filenames.get(&map.id).map(|filename| MapMember {
                    id: map.id,
                    scale: map.scale.0,
                    filename,
                    banners: &map.banners,
                    frames: &map.frames,
                })
            })
            .collect();

        features.push(serde_json::json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": footprint_ring(center_x, center_z, scale, width),
            },
            "properties": {
                "scale": scale,
                "dimension": dimension.as_str(),
                "maps": members,
            },
        }));
    }

    let document = serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
    });

    let body = serde_json::to_vec(&document).context("failed to serialize maps.json")?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}
