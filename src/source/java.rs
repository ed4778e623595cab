//! Java-edition source: gzip-compressed NBT files discovered via the
//! world's `idcounts.dat` sibling directory.

use super::{RawMap, SourceAdapter};
use crate::nbt_tree::NbtTree;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

pub struct SourceJava {
    data_dir: PathBuf,
}

fn locate_data_dir(world: &Path) -> Result<PathBuf> {
    let pattern = world.join("**/idcounts.dat");
    let pattern = pattern.to_string_lossy().into_owned();

    let found = glob::glob(&pattern)
        .context("invalid idcounts.dat search pattern")?
        .filter_map(Result::ok)
        .next()
        .with_context(|| format!("no idcounts.dat found under {}", world.display()))?;

    found
        .parent()
        .map(Path::to_path_buf)
        .context("idcounts.dat had no parent directory")
}

fn parse_id(path: &Path) -> Option<u32> {
    path.file_stem()?.to_str()?.strip_prefix("map_")?.parse().ok()
}

impl SourceJava {
    pub fn open(world: &Path) -> Result<Self> {
        Ok(Self { data_dir: locate_data_dir(world)? })
    }
}

impl SourceAdapter for SourceJava {
    fn scan(&self) -> Result<Vec<RawMap>> {
        let pattern = self.data_dir.join("map_*.dat");
        let pattern = pattern.to_string_lossy().into_owned();

        let mut maps = Vec::new();
        for entry in glob::glob(&pattern).context("invalid map file search pattern")? {
            let path = entry?;
            let Some(id) = parse_id(&path) else {
                continue;
            };

            let metadata = fs::metadata(&path)
                .with_context(|| format!("failed to stat {}", path.display()))?;
            let epoch_hint = metadata
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |duration| duration.as_secs() as i64);

            let file = fs::File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let mut raw = Vec::new();
            GzDecoder::new(file)
                .read_to_end(&mut raw)
                .with_context(|| format!("failed to ungzip {}", path.display()))?;

            let value: fastnbt::Value = fastnbt::from_bytes(&raw)
                .with_context(|| format!("failed to parse NBT in {}", path.display()))?;
            let tree = NbtTree::from(value);
            let data = tree.field("data").cloned().unwrap_or(tree);

            maps.push(RawMap { id, epoch_hint, nbt: data });
        }

        Ok(maps)
    }
}
