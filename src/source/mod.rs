//! Discovery of raw map records from a world save, independent of which
//! server dialect produced them.

pub mod bedrock;
pub mod java;

use crate::nbt_tree::NbtTree;
use anyhow::Result;

/// One map record as pulled from disk, before decoding.
pub struct RawMap {
    pub id: u32,
    pub epoch_hint: i64,
    pub nbt: NbtTree,
}

/// Implemented once per server dialect (java region files, bedrock leveldb).
pub trait SourceAdapter {
    fn scan(&self) -> Result<Vec<RawMap>>;
}
