use crate::model::{Catalog, ConfigError, Supplier};
use crate::normalizer::FieldMap;
use crate::pricing::Markup;
use crate::routing::{InclusionPredicate, MarkerMode};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct FeedConfig {
    pub id: String,
    pub supplier: Supplier,
    pub catalog: Catalog,
    pub url: String,
    /// Element name wrapping one record (`rims`, `tires`, `item`).
    pub collection: String,
    /// Raw field whose presence means "in stock locally".
    #[serde(default)]
    pub availability_marker: Option<String>,
    #[serde(default)]
    pub field_map: HashMap<String, String>,
    #[serde(default)]
    pub preferred_fields: Vec<String>,
}

impl FeedConfig {
    pub fn field_map(&self) -> FieldMap {
        FieldMap::builtin(self.catalog, self.supplier)
            .with_overrides(&self.field_map)
            .with_preferred(self.preferred_fields.iter().cloned())
    }
}

#[derive(Debug, Deserialize)]
pub struct PassConfig {
    pub feed: String,
    #[serde(default)]
    pub include: Option<InclusionPredicate>,
    pub marker: MarkerMode,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DestinationConfig {
    pub name: String,
    pub file: String,
    pub passes: Vec<PassConfig>,
    #[serde(default)]
    pub markup: Option<Markup>,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub feeds: Vec<FeedConfig>,
    pub destinations: Vec<DestinationConfig>,
}

impl AppConfig {
    pub fn feed_position(&self, id: &str) -> Option<usize> {
        self.feeds.iter().position(|f| f.id == id)
    }

    /// Structural checks; any failure aborts the run before a feed is fetched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut feed_ids = HashSet::new();
        for feed in &self.feeds {
            if !feed_ids.insert(feed.id.as_str()) {
                return Err(ConfigError::DuplicateFeed(feed.id.clone()));
            }
        }

        let mut names = HashSet::new();
        let mut files = HashSet::new();
        for dest in &self.destinations {
            if !names.insert(dest.name.as_str()) {
                return Err(ConfigError::DuplicateDestination(dest.name.clone()));
            }
            if !files.insert(dest.file.as_str()) {
                return Err(ConfigError::DuplicateFile(dest.file.clone()));
            }
            if dest.markup.is_some_and(|m| !m.percent.is_finite()) {
                return Err(ConfigError::InvalidMarkup {
                    destination: dest.name.clone(),
                });
            }

            let mut last_position = 0;
            for pass in &dest.passes {
                let Some(position) = self.feed_position(&pass.feed) else {
                    return Err(ConfigError::UnknownFeed {
                        destination: dest.name.clone(),
                        feed: pass.feed.clone(),
                    });
                };
                if position < last_position {
                    return Err(ConfigError::PassOrder {
                        destination: dest.name.clone(),
                        feed: pass.feed.clone(),
                    });
                }
                last_position = position;

                if pass.marker == MarkerMode::With && self.feeds[position].availability_marker.is_none() {
                    return Err(ConfigError::MissingMarker {
                        destination: dest.name.clone(),
                        feed: pass.feed.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    parse_config(&content)
}
