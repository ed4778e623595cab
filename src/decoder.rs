//! Turns one raw tagged-binary map record into an RGBA raster plus its
//! embedded markers, regardless of which source dialect produced it.

use crate::dimension::Dimension;
use crate::nbt_tree::NbtTree;
use crate::palette;
use anyhow::{bail, Result};
use log::warn;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, json::JsonString};

/// Side length, in pixels, of every stored map at any scale.
pub const SIDE: u32 = 128;
pub const PIXEL_COUNT: usize = (SIDE * SIDE) as usize;

/// Content hash of an all-transparent `SIDE`x`SIDE` raster, used to drop
/// maps that were allocated but never drawn on.
pub const EMPTY_MAP_HASH: &str = "fcd6bcb56c1689fcef28b57c22475bad";

/// A map's zoom level, 0 (most detailed) through 4 (least detailed).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Scale(pub u8);

impl Scale {
    pub fn new(value: u8) -> Result<Self> {
        if value > 4 {
            bail!("map scale out of range: {value}");
        }
        Ok(Self(value))
    }

    /// World-block length covered by one pixel at this scale.
    pub fn side(self) -> u32 {
        1 << self.0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Center {
    pub x: i32,
    pub z: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Banner {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub color: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Frame {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub rotation: u8,
}

#[derive(Clone, Debug)]
pub struct DecodedMap {
    pub id: u32,
    pub epoch_hint: i64,
    pub scale: Scale,
    pub center: Center,
    pub dimension: Dimension,
    pub pixels: Vec<u8>,
    pub hash: String,
    pub banners: Vec<Banner>,
    pub frames: Vec<Frame>,
}

#[serde_as]
#[derive(Deserialize)]
struct NameComponent {
    #[serde_as(as = "JsonString")]
    #[serde(default)]
    text: String,
}

fn parse_dimension(node: &NbtTree) -> Option<Dimension> {
    if let Some(name) = node.as_str() {
        return Dimension::from_qualified_name(name);
    }
    node.as_i32().and_then(Dimension::from_legacy_id)
}

fn position(node: &NbtTree) -> Option<(i32, i32, i32)> {
    let pos = node.field("Pos")?;
    let x = pos.field("X")?.as_i32()?;
    let y = pos.field("Y")?.as_i32()?;
    let z = pos.field("Z")?.as_i32()?;
    Some((x, y, z))
}

fn banner_name(node: &NbtTree) -> String {
    node.field("Name")
        .and_then(NbtTree::as_str)
        .and_then(|raw| serde_json::from_str::<NameComponent>(raw).ok())
        .map(|component| component.text)
        .unwrap_or_default()
}

fn parse_banner(node: &NbtTree) -> Option<Banner> {
    let (x, y, z) = position(node)?;
    let color = node.field("Color").and_then(NbtTree::as_str).unwrap_or("black").to_owned();
    Some(Banner { x, y, z, color, name: banner_name(node) })
}

fn parse_frame(node: &NbtTree) -> Option<Frame> {
    let (x, y, z) = position(node)?;
    let rotation = node.field("Rotation").and_then(NbtTree::as_i32).unwrap_or(0) as u8;
    Some(Frame { x, y, z, rotation })
}

/// Nearest-neighbour upscale from the decoder's internal `SIDE`x`SIDE` RGBA
/// raster to the full painted side length for the map's scale.
pub fn expand_pixels(scale: Scale, base: &[u8]) -> Vec<u8> {
    let factor = scale.side().max(1);
    let painted_side = SIDE * factor;
    let mut out = vec![0u8; (painted_side * painted_side * 4) as usize];

    for y in 0..painted_side {
        let src_y = (y / factor).min(SIDE - 1);
        for x in 0..painted_side {
            let src_x = (x / factor).min(SIDE - 1);
            let src_offset = ((src_y * SIDE + src_x) * 4) as usize;
            let dst_offset = ((y * painted_side + x) * 4) as usize;
            out[dst_offset..dst_offset + 4].copy_from_slice(&base[src_offset..src_offset + 4]);
        }
    }

    out
}

/// Decodes one raw record into a renderable map, or `None` if it should be
/// skipped entirely (unsupported scale, unlimited-tracking map when those
/// are excluded, or a record with no recognizable color data).
pub fn decode(
    id: u32,
    epoch_hint: i64,
    data: &NbtTree,
    include_unlimited_tracking: bool,
) -> Result<Option<DecodedMap>> {
    let Some(scale_raw) = data.field("scale").and_then(NbtTree::as_i8) else {
        warn!("map {id}: missing required field `scale`, skipping");
        return Ok(None);
    };
    let scale = match Scale::new(scale_raw as u8) {
        Ok(scale) => scale,
        Err(error) => {
            warn!("map {id}: {error}");
            return Ok(None);
        }
    };

    let unlimited_tracking = data
        .field("unlimitedTracking")
        .and_then(NbtTree::as_i8)
        .map(|v| v != 0)
        .unwrap_or(false);
    if unlimited_tracking && !include_unlimited_tracking {
        warn!("map {id}: skipping unlimited-tracking map");
        return Ok(None);
    }

    let Some(dimension_node) = data.field("dimension") else {
        warn!("map {id}: missing required field `dimension`, skipping");
        return Ok(None);
    };
    let Some(dimension) = parse_dimension(dimension_node) else {
        warn!("map {id}: unrecognized dimension value, skipping");
        return Ok(None);
    };

    let Some(x_center) = data.field("xCenter").and_then(NbtTree::as_i32) else {
        warn!("map {id}: missing required field `xCenter`, skipping");
        return Ok(None);
    };
    let Some(z_center) = data.field("zCenter").and_then(NbtTree::as_i32) else {
        warn!("map {id}: missing required field `zCenter`, skipping");
        return Ok(None);
    };
    let center = Center { x: x_center, z: z_center };

    let Some(colors) = data.field("colors").and_then(NbtTree::as_byte_array) else {
        warn!("map {id}: missing required field `colors`, skipping");
        return Ok(None);
    };

    let base_rgba = if colors.len() == PIXEL_COUNT {
        let mut rgba = vec![0u8; PIXEL_COUNT * 4];
        for (index, &indexed) in colors.iter().enumerate() {
            rgba[index * 4..index * 4 + 4].copy_from_slice(&palette::rgba_for_index(indexed as u8));
        }
        rgba
    } else if colors.len() == PIXEL_COUNT * 4 {
        colors.iter().map(|&b| b as u8).collect()
    } else {
        warn!("map {id}: unexpected color array length {}", colors.len());
        return Ok(None);
    };

    let mut hasher = Md5::new();
    hasher.update(&base_rgba);
    let hash = format!("{:x}", hasher.finalize());

    if hash == EMPTY_MAP_HASH {
        warn!("map {id}: blank map, skipping");
        return Ok(None);
    }

    let banners = data
        .field("banners")
        .and_then(NbtTree::as_list)
        .map(|list| list.iter().filter_map(parse_banner).collect())
        .unwrap_or_default();

    let frames = data
        .field("frames")
        .and_then(NbtTree::as_list)
        .map(|list| list.iter().filter_map(parse_frame).collect())
        .unwrap_or_default();

    Ok(Some(DecodedMap {
        id,
        epoch_hint,
        scale,
        center,
        dimension,
        pixels: expand_pixels(scale, &base_rgba),
        hash,
        banners,
        frames,
    }))
}
