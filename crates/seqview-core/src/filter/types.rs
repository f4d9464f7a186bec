use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Filter categories offered in the quick filter sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacetKind {
    Service,
    Stage,
    Sequence,
    Status,
}

impl FacetKind {
    pub const ALL: [FacetKind; 4] = [
        FacetKind::Service,
        FacetKind::Stage,
        FacetKind::Sequence,
        FacetKind::Status,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FacetKind::Service => "Service",
            FacetKind::Stage => "Stage",
            FacetKind::Sequence => "Sequence",
            FacetKind::Status => "Status",
        }
    }

    /// Look up a facet by its display name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub name: String,
    pub value: String,
}

impl FilterOption {
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub kind: FacetKind,
    pub show_in_sidebar: bool,
    pub options: Vec<FilterOption>,
}

impl Facet {
    pub fn empty(kind: FacetKind) -> Self {
        Self {
            kind,
            show_in_sidebar: true,
            options: Vec::new(),
        }
    }
}

/// One selected (facet, value) pair as produced by the quick filter.
///
/// The facet is kept as the raw name so malformed input can be carried
/// through and dropped by the engine rather than rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub facet: String,
    pub value: String,
}

impl FilterSelection {
    pub fn new(facet: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            facet: facet.into(),
            value: value.into(),
        }
    }
}

impl FromStr for FilterSelection {
    type Err = String;

    /// Parse `Facet=value`, e.g. `Status=failed`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (facet, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid filter '{}': expected Facet=value", s))?;
        let (facet, value) = (facet.trim(), value.trim());
        if facet.is_empty() || value.is_empty() {
            return Err(format!("Invalid filter '{}': expected Facet=value", s));
        }
        Ok(Self::new(facet, value))
    }
}
