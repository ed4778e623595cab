use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One of the three worlds a map can be captured in.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Overworld,
    Nether,
    End,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Overworld, Dimension::Nether, Dimension::End];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Overworld => "overworld",
            Dimension::Nether => "nether",
            Dimension::End => "end",
        }
    }

    /// Maps the legacy numeric dimension codes (-1/0/1) used by older records.
    pub fn from_legacy_id(id: i32) -> Option<Self> {
        match id {
            -1 => Some(Dimension::Nether),
            0 => Some(Dimension::Overworld),
            1 => Some(Dimension::End),
            _ => None,
        }
    }

    pub fn from_qualified_name(name: &str) -> Option<Self> {
        match name {
            "minecraft:overworld" => Some(Dimension::Overworld),
            "minecraft:the_nether" => Some(Dimension::Nether),
            "minecraft:the_end" => Some(Dimension::End),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overworld" => Ok(Dimension::Overworld),
            "nether" => Ok(Dimension::Nether),
            "end" => Ok(Dimension::End),
            other => Err(anyhow::anyhow!("unknown dimension: {other}")),
        }
    }
}
