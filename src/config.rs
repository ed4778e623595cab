//! Run configuration, built once from CLI arguments.

use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceType {
    Java,
    Bedrock,
}

impl FromStr for SourceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "java" => Ok(SourceType::Java),
            "bds" | "bedrock" => Ok(SourceType::Bedrock),
            other => Err(anyhow::anyhow!("unknown source type: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub world: PathBuf,
    pub source_type: SourceType,
    pub output: PathBuf,
    pub include_unlimited_tracking: bool,
    pub disable_zoom_sort: bool,
    pub copy_template: Option<PathBuf>,
    pub quiet: bool,
    pub force: bool,
}
