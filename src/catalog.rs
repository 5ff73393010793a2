//! Static destination catalog
//!
//! Loaded once at startup and read-only afterwards. The default catalog is
//! embedded in the binary; a JSON file can replace it.

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Embed)]
#[folder = "catalog/"]
struct CatalogAssets;

const EMBEDDED_CATALOG: &str = "destinations.json";

/// Destination category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Adventure,
    Historical,
    Cultural,
    Nature,
    Beach,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Adventure,
        Category::Historical,
        Category::Cultural,
        Category::Nature,
        Category::Beach,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Adventure => "Adventure",
            Category::Historical => "Historical",
            Category::Cultural => "Cultural",
            Category::Nature => "Nature",
            Category::Beach => "Beach",
        }
    }
}

/// Which destinations are offered for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(c) => f.write_str(c.as_str()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .map(CategoryFilter::Only)
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        value.to_string()
    }
}

/// Map position as percentages of the map's width and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

impl Coordinates {
    fn in_range(self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub image: String,
    pub description: String,
    pub category: Category,
    pub fun_fact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("embedded catalog is missing")]
    MissingEmbedded,
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate destination id: {0}")]
    DuplicateId(String),
    #[error("destination {0} has an empty name")]
    EmptyName(String),
    #[error("destination {0} has coordinates outside 0..=100")]
    CoordinatesOutOfRange(String),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// Ordered, immutable collection of destinations
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    destinations: Vec<Destination>,
}

impl Catalog {
    /// Load from `path`, or from the embedded default when `None`
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_json(&json)
            }
            None => Self::embedded(),
        }
    }

    pub fn embedded() -> Result<Self, CatalogError> {
        let file = CatalogAssets::get(EMBEDDED_CATALOG).ok_or(CatalogError::MissingEmbedded)?;
        let destinations: Vec<Destination> = serde_json::from_slice(&file.data)?;
        Self::new(destinations)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let destinations: Vec<Destination> = serde_json::from_str(json)?;
        Self::new(destinations)
    }

    pub fn new(destinations: Vec<Destination>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for dest in &destinations {
            if !seen.insert(dest.id.as_str()) {
                return Err(CatalogError::DuplicateId(dest.id.clone()));
            }
            if dest.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(dest.id.clone()));
            }
            if !dest.coordinates.in_range() {
                return Err(CatalogError::CoordinatesOutOfRange(dest.id.clone()));
            }
        }
        Ok(Self { destinations })
    }

    pub fn get(&self, id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }

    /// Destinations offered under `filter`, in catalog order
    pub fn filtered(&self, filter: CategoryFilter) -> Vec<Destination> {
        self.destinations
            .iter()
            .filter(|d| filter.matches(d.category))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}
