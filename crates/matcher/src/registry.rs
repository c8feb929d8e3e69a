use std::path::Path;

use platescan_core::{default_restaurants, PatternFile, PatternFileError, RestaurantPatterns};
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid pattern '{pattern}' for restaurant '{restaurant}': {source}")]
    InvalidPattern {
        restaurant: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error(transparent)]
    PatternFile(#[from] PatternFileError),
}

/// Internal pairing of a restaurant with its precompiled patterns.
struct CompiledRestaurant {
    id: String,
    patterns: Vec<Regex>,
}

/// Ordered mapping from restaurant id to regex patterns.
///
/// Lookup is first-match: restaurants are tried in insertion order, each
/// restaurant's patterns in list order, and the first pattern found anywhere
/// in the lowercased text decides the result.
pub struct PatternRegistry {
    restaurants: Vec<CompiledRestaurant>,
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternRegistry {
    /// Registry seeded with the built-in restaurants.
    pub fn new() -> Self {
        let restaurants = default_restaurants()
            .into_iter()
            .map(|r| CompiledRestaurant {
                patterns: r
                    .patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("invalid built-in pattern"))
                    .collect(),
                id: r.id,
            })
            .collect();
        Self { restaurants }
    }

    pub fn empty() -> Self {
        Self {
            restaurants: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    /// Restaurant ids in match order.
    pub fn restaurants(&self) -> impl Iterator<Item = &str> {
        self.restaurants.iter().map(|r| r.id.as_str())
    }

    /// Add or replace the pattern list for `restaurant`.
    ///
    /// A replaced restaurant keeps its position in the match order; a new one
    /// goes last. Nothing changes if any pattern fails to compile.
    pub fn add_restaurant_pattern<S: AsRef<str>>(
        &mut self,
        restaurant: &str,
        patterns: &[S],
    ) -> Result<(), MatchError> {
        let compiled = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| MatchError::InvalidPattern {
                    restaurant: restaurant.to_string(),
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        match self.restaurants.iter_mut().find(|r| r.id == restaurant) {
            Some(existing) => {
                tracing::debug!(restaurant, "replacing restaurant patterns");
                existing.patterns = compiled;
            }
            None => {
                tracing::debug!(restaurant, "registering restaurant patterns");
                self.restaurants.push(CompiledRestaurant {
                    id: restaurant.to_string(),
                    patterns: compiled,
                });
            }
        }
        Ok(())
    }

    /// Apply every entry of a pattern set, in order.
    ///
    /// Entries before a failing one stay applied.
    pub fn extend(&mut self, entries: &[RestaurantPatterns]) -> Result<(), MatchError> {
        for entry in entries {
            self.add_restaurant_pattern(&entry.id, entry.patterns.as_slice())?;
        }
        Ok(())
    }

    pub fn extend_from_toml(&mut self, toml_content: &str) -> Result<(), MatchError> {
        let file = PatternFile::from_toml(toml_content)?;
        self.extend(&file.restaurants)
    }

    pub fn load_pattern_file(&mut self, path: &Path) -> Result<(), MatchError> {
        let file = PatternFile::load(path)?;
        tracing::info!(
            path = %path.display(),
            count = file.restaurants.len(),
            "loaded restaurant patterns"
        );
        self.extend(&file.restaurants)
    }

    /// Identify the restaurant that issued `text`, if any.
    pub fn identify(&self, text: &str) -> Option<&str> {
        if text.is_empty() {
            return None;
        }
        let text = text.to_lowercase();
        self.restaurants
            .iter()
            .find(|r| r.patterns.iter().any(|re| re.is_match(&text)))
            .map(|r| r.id.as_str())
    }

    pub fn identify_opt(&self, text: Option<&str>) -> Option<&str> {
        text.and_then(|t| self.identify(t))
    }
}
