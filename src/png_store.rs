//! On-disk identity/change-detection layer: one PNG per map, named so its
//! content hash and epoch are recoverable without a sidecar index.

use crate::decoder::{DecodedMap, SIDE};
use crate::dimension::Dimension;
use anyhow::{Context, Result};
use log::warn;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct StoredMapPng {
    pub id: u32,
    pub hash: String,
    pub epoch: i64,
    pub dimension: Dimension,
    pub x: i32,
    pub z: i32,
    pub scale: u8,
    pub path: PathBuf,
}

fn filename(
    id: u32,
    hash: &str,
    epoch: i64,
    dimension: Dimension,
    x: i32,
    z: i32,
    scale: u8,
) -> String {
    format!("{id}.{hash}.{epoch}.{dimension}.{x}.{z}.{scale}.png")
}

impl StoredMapPng {
    pub fn filename(&self) -> String {
        filename(self.id, &self.hash, self.epoch, self.dimension, self.x, self.z, self.scale)
    }
}

fn parse_filename(path: &Path) -> Option<StoredMapPng> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('.').collect();
    let [id, hash, epoch, dimension, x, z, scale] = parts.try_into().ok()?;

    Some(StoredMapPng {
        id: id.parse().ok()?,
        hash: hash.to_owned(),
        epoch: epoch.parse().ok()?,
        dimension: dimension.parse().ok()?,
        x: x.parse().ok()?,
        z: z.parse().ok()?,
        scale: scale.parse().ok()?,
        path: path.to_path_buf(),
    })
}

/// Loads the highest-epoch PNG for every map id currently on disk.
pub fn load_all(dir: &Path) -> Result<HashMap<u32, StoredMapPng>> {
    let mut stored: HashMap<u32, StoredMapPng> = HashMap::new();

    if !dir.is_dir() {
        return Ok(stored);
    }

    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
            continue;
        }

        let Some(parsed) = parse_filename(&path) else {
            warn!("ignoring unrecognized file in map store: {}", path.display());
            continue;
        };

        stored
            .entry(parsed.id)
            .and_modify(|existing| {
                if parsed.epoch > existing.epoch {
                    *existing = parsed.clone();
                }
            })
            .or_insert(parsed);
    }

    Ok(stored)
}

pub enum Action {
    /// The map is unchanged since the last run; nothing to do.
    Drop,
    /// The map is new or its content hash changed; write a fresh PNG at
    /// this epoch and retire the previous file, if any.
    Write { epoch: i64 },
}

pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs() as i64)
}

/// Decides whether a decoded map needs a new PNG written, comparing it
/// against whatever is already on disk for that map id.
///
/// A brand-new map is written at its own `epoch_hint`. An unchanged map is
/// dropped unless its `epoch_hint` has advanced past the stored epoch, in
/// which case only the epoch is refreshed. A changed map is written at
/// `epoch_hint`, falling back to wall-clock `now` when the source dialect
/// carries no epoch hint (`epoch_hint == 0`, as bedrock always reports).
pub fn reconcile(decoded: &DecodedMap, stored: Option<&StoredMapPng>, now: i64) -> Action {
    match stored {
        None => Action::Write { epoch: decoded.epoch_hint },
        Some(previous) if previous.hash == decoded.hash => {
            if decoded.epoch_hint > previous.epoch {
                Action::Write { epoch: decoded.epoch_hint }
            } else {
                Action::Drop
            }
        }
        Some(_) => {
            let epoch = if decoded.epoch_hint == 0 { now } else { decoded.epoch_hint };
            Action::Write { epoch }
        }
    }
}

pub fn write(
    dir: &Path,
    decoded: &DecodedMap,
    epoch: i64,
    previous: Option<&StoredMapPng>,
) -> Result<StoredMapPng> {
    let painted_side = SIDE * decoded.scale.side();
    let buffer =
        image::RgbaImage::from_raw(painted_side, painted_side, decoded.pixels.clone())
            .context("decoded pixel buffer did not match its declared dimensions")?;

    let name = filename(
        decoded.id,
        &decoded.hash,
        epoch,
        decoded.dimension,
        decoded.center.x,
        decoded.center.z,
        decoded.scale.0,
    );
    let path = dir.join(&name);
    buffer.save(&path).with_context(|| format!("failed to write {}", path.display()))?;

    if let Some(previous) = previous {
        if previous.path != path {
            if let Err(error) = fs::remove_file(&previous.path) {
                warn!("failed to remove stale {}: {error}", previous.path.display());
            }
        }
    }

    Ok(StoredMapPng {
        id: decoded.id,
        hash: decoded.hash.clone(),
        epoch,
        dimension: decoded.dimension,
        x: decoded.center.x,
        z: decoded.center.z,
        scale: decoded.scale.0,
        path,
    })
}
