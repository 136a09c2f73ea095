//! Glacier and bed DEM source identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Glaciers with prepared input data.
///
/// Declaration order is the processing order used by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Glacier {
    Helheim,
    Kangerd,
    Jakobshavn,
}

impl Glacier {
    /// All supported glaciers, in processing order.
    pub const ALL: [Glacier; 3] = [Glacier::Helheim, Glacier::Kangerd, Glacier::Jakobshavn];

    /// Lowercase name, used for directories and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Glacier::Helheim => "helheim",
            Glacier::Kangerd => "kangerd",
            Glacier::Jakobshavn => "jakobshavn",
        }
    }

    /// Capitalized name, used in solver file names.
    pub fn title(&self) -> &'static str {
        match self {
            Glacier::Helheim => "Helheim",
            Glacier::Kangerd => "Kangerd",
            Glacier::Jakobshavn => "Jakobshavn",
        }
    }
}

impl FromStr for Glacier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "helheim" => Ok(Glacier::Helheim),
            "kangerd" => Ok(Glacier::Kangerd),
            "jakobshavn" => Ok(Glacier::Jakobshavn),
            _ => Err(ParseError::UnknownGlacier(s.to_string())),
        }
    }
}

impl fmt::Display for Glacier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of the bed elevation DEMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemSource {
    /// Mass-conservation bed (Morlighem et al.)
    Morlighem,
    /// CReSIS radar-derived bed
    Cresis,
}

impl DemSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemSource::Morlighem => "morlighem",
            DemSource::Cresis => "cresis",
        }
    }
}

impl FromStr for DemSource {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morlighem" => Ok(DemSource::Morlighem),
            "cresis" => Ok(DemSource::Cresis),
            _ => Err(ParseError::UnknownDemSource(s.to_string())),
        }
    }
}

impl fmt::Display for DemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
