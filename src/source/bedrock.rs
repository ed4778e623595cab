//! Bedrock/BDS source: map records embedded as values in the world's
//! leveldb-style key/value store, keyed by `map_<id>`.

use super::{RawMap, SourceAdapter};
use crate::bedrock_nbt;
use anyhow::{bail, Context, Result};
use rusty_leveldb::{LdbIterator, Options, DB};
use std::path::{Path, PathBuf};

pub struct SourceBedrock {
    db_path: PathBuf,
}

fn parse_id(key: &[u8]) -> Option<u32> {
    let key = std::str::from_utf8(key).ok()?;
    let suffix = key.rsplit('_').next()?;
    suffix.parse().ok()
}

impl SourceBedrock {
    pub fn open(world: &Path) -> Result<Self> {
        let db_path = world.join("db");
        if !db_path.is_dir() {
            bail!("no leveldb store found at {}", db_path.display());
        }
        Ok(Self { db_path })
    }
}

impl SourceAdapter for SourceBedrock {
    fn scan(&self) -> Result<Vec<RawMap>> {
        let mut db = DB::open(&self.db_path, Options::default())
            .with_context(|| format!("failed to open leveldb store at {}", self.db_path.display()))?;

        let mut iter = db.new_iter().context("failed to open leveldb iterator")?;
        let mut maps = Vec::new();
        let mut key = Vec::new();
        let mut value = Vec::new();

        while iter.advance() {
            if !iter.current(&mut key, &mut value) {
                break;
            }

            if !key.windows(3).any(|w| w == b"map") {
                continue;
            }
            let Some(id) = parse_id(&key) else {
                continue;
            };

            let nbt = bedrock_nbt::parse_little_endian(&value)
                .with_context(|| format!("failed to parse bedrock NBT for map {id}"))?;

            // The embedded store carries no file mtime to derive an epoch
            // hint from; epoch ordering for bedrock worlds falls back to
            // content-hash comparison alone.
            maps.push(RawMap { id, epoch_hint: 0, nbt });
        }

        Ok(maps)
    }
}
