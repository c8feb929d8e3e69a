use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// One registry entry in source form: an identifier and its regex patterns,
/// tried in list order against lowercased text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantPatterns {
    pub id: String,
    pub patterns: Vec<String>,
}

impl RestaurantPatterns {
    pub fn new(id: &str, patterns: &[&str]) -> Self {
        RestaurantPatterns {
            id: id.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Built-in restaurants, in match order. Earlier entries win when a receipt
/// mentions more than one restaurant.
pub const DEFAULT_RESTAURANTS: &[(&str, &[&str])] = &[
    ("burger_lab", &[r"burger\s*lab", r"bl\s*restaurant"]),
    ("kfc", &[r"kfc", r"kentucky\s*fried"]),
    ("mcdonalds", &[r"mcdonald", r"mc\s*donald"]),
    ("pizza_hut", &[r"pizza\s*hut"]),
    ("subway", &[r"subway"]),
    ("dominos", &[r"domino", r"dominos"]),
];

pub fn default_restaurants() -> Vec<RestaurantPatterns> {
    DEFAULT_RESTAURANTS
        .iter()
        .map(|(id, patterns)| RestaurantPatterns::new(id, patterns))
        .collect()
}

#[derive(Debug, Error)]
pub enum PatternFileError {
    #[error("Failed to read pattern file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse pattern file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// On-disk pattern set:
///
/// ```toml
/// [[restaurant]]
/// id = "taco_bell"
/// patterns = ['taco\s*bell', 'live\s*mas']
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternFile {
    #[serde(default, rename = "restaurant")]
    pub restaurants: Vec<RestaurantPatterns>,
}

impl PatternFile {
    pub fn from_toml(content: &str) -> Result<Self, PatternFileError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, PatternFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| PatternFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }
}
