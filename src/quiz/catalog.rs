//! Quiz catalog loading and sampling.
//!
//! Catalogs are YAML, either a bare list of quizzes or a map with a
//! `quizzes` key.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Result, ScamguardError};

/// Category value that selects across all categories.
pub const ANY_CATEGORY: &str = "random";

/// One quiz message and its ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Catalog-wide identifier; assigned from position when omitted
    #[serde(default)]
    pub id: u32,
    /// Category, e.g. `alba`, `secondhand`, `smishing`, `sns`
    pub category: String,
    /// The message shown to the player
    pub content: String,
    /// Whether the message is fraudulent
    #[serde(alias = "is_scam")]
    pub is_scam: bool,
    /// Canned explanation shown without calling the provider
    #[serde(default)]
    pub explanation: Option<String>,
    /// Reasons the message is a scam, in display order
    #[serde(default, alias = "scam_points")]
    pub scam_points: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    quizzes: Vec<Quiz>,
}

/// In-memory collection of quizzes.
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    quizzes: Vec<Quiz>,
}

impl QuizCatalog {
    /// Create a catalog from quizzes, assigning ids to those without one.
    pub fn new(mut quizzes: Vec<Quiz>) -> Self {
        for (i, quiz) in quizzes.iter_mut().enumerate() {
            if quiz.id == 0 {
                quiz.id = u32::try_from(i + 1).unwrap_or(u32::MAX);
            }
        }
        Self { quizzes }
    }

    /// Load a catalog from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading quiz catalog");

        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml(&contents)?;
        info!(quizzes = catalog.len(), "Quiz catalog loaded");
        Ok(catalog)
    }

    /// Load a catalog from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(parse_error)?;

        let quizzes = if document.is_sequence() {
            serde_yaml::from_value::<Vec<Quiz>>(document).map_err(parse_error)?
        } else {
            serde_yaml::from_value::<CatalogFile>(document)
                .map_err(parse_error)?
                .quizzes
        };
        Ok(Self::new(quizzes))
    }

    /// Pick up to `limit` quizzes at random, optionally from one category.
    ///
    /// `None` or [`ANY_CATEGORY`] draws from every category.
    pub fn sample(&self, category: Option<&str>, limit: usize) -> Vec<Quiz> {
        let mut pool: Vec<&Quiz> = match category {
            Some(c) if c != ANY_CATEGORY => self.quizzes.iter().filter(|q| q.category == c).collect(),
            _ => self.quizzes.iter().collect(),
        };

        pool.shuffle(&mut rand::thread_rng());
        pool.into_iter().take(limit).cloned().collect()
    }

    /// Look up a quiz by id.
    pub fn get(&self, id: u32) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == id)
    }

    /// Get the number of quizzes.
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    /// Whether the catalog holds no quizzes.
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

fn parse_error(e: serde_yaml::Error) -> ScamguardError {
    ScamguardError::Catalog(format!("Failed to parse quiz catalog: {}", e))
}
