use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::KpwdError;

/// Prefix KEGG uses for species-agnostic reference maps.
pub const REFERENCE_MARKER: &str = "map";

static PATHWAY_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]{2,4})([0-9]{5})$").expect("pathway id regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionMode {
    All,
    Search,
    List,
    File,
    Commandline,
}

impl fmt::Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionMode::All => write!(f, "all"),
            ActionMode::Search => write!(f, "search"),
            ActionMode::List => write!(f, "list"),
            ActionMode::File => write!(f, "file"),
            ActionMode::Commandline => write!(f, "commandline"),
        }
    }
}

impl FromStr for ActionMode {
    type Err = KpwdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "all" => Ok(ActionMode::All),
            "search" => Ok(ActionMode::Search),
            "list" => Ok(ActionMode::List),
            "file" => Ok(ActionMode::File),
            "commandline" => Ok(ActionMode::Commandline),
            _ => Err(KpwdError::UnknownAction(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    #[default]
    Sequential,
    Concurrent,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Sequential => write!(f, "sequential"),
            DriverKind::Concurrent => write!(f, "concurrent"),
        }
    }
}

impl FromStr for DriverKind {
    type Err = KpwdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "sequential" => Ok(DriverKind::Sequential),
            "concurrent" => Ok(DriverKind::Concurrent),
            _ => Err(KpwdError::UnknownDriver(value.to_string())),
        }
    }
}

/// KEGG organism code such as `hsa`, or `map` for reference pathways.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganismCode(String);

impl OrganismCode {
    pub fn reference() -> Self {
        Self(REFERENCE_MARKER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_reference(&self) -> bool {
        self.0 == REFERENCE_MARKER
    }
}

impl Default for OrganismCode {
    fn default() -> Self {
        Self::reference()
    }
}

impl fmt::Display for OrganismCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrganismCode {
    type Err = KpwdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            return Ok(Self::reference());
        }
        let is_valid = (2..=4).contains(&normalized.len())
            && normalized.chars().all(|ch| ch.is_ascii_lowercase());
        if !is_valid {
            return Err(KpwdError::InvalidOrganismCode(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Fully qualified pathway identifier: organism prefix plus five digits.
///
/// Only constructed through `FromStr`, so the value is always ASCII and the
/// last five bytes are the number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathwayId(String);

impl PathwayId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn prefix(&self) -> &str {
        &self.0[..self.0.len() - 5]
    }

    pub fn number(&self) -> &str {
        &self.0[self.0.len() - 5..]
    }

    /// Same pathway number under another organism prefix.
    pub fn with_organism(&self, org: &OrganismCode) -> Self {
        Self(format!("{}{}", org.as_str(), self.number()))
    }
}

impl fmt::Display for PathwayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PathwayId {
    type Err = KpwdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if !PATHWAY_ID_RE.is_match(trimmed) {
            return Err(KpwdError::InvalidPathwayId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Prepends the organism code to ids that start with a digit. Anything else
/// is returned as given (trimmed).
pub fn normalize_raw(raw: &str, org: &OrganismCode) -> String {
    let trimmed = raw.trim();
    match trimmed.chars().next() {
        Some(ch) if ch.is_ascii_digit() => format!("{}{}", org.as_str(), trimmed),
        _ => trimmed.to_string(),
    }
}

pub fn normalize_all<S: AsRef<str>>(
    raws: &[S],
    org: &OrganismCode,
) -> Result<Vec<PathwayId>, KpwdError> {
    raws.iter()
        .map(|raw| normalize_raw(raw.as_ref(), org).parse())
        .collect()
}
