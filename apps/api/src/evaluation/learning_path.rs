//! Learning Track Generator — turns missing skills into short, ordered study plans.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::evaluation::{ordered, LoadError};

/// One learning-track entry: a missing skill and the steps to close the gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningStep {
    pub skill: String,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    steps: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
struct CatalogSource(#[serde(deserialize_with = "ordered::deserialize")] Vec<(String, CatalogEntry)>);

/// Ordered catalog of lowercase skill key → study steps.
///
/// Key order is the document order and decides which entry a fuzzy lookup lands on.
#[derive(Debug, Clone, Default)]
pub struct LearningPathCatalog {
    paths: Vec<(String, Vec<String>)>,
}

impl LearningPathCatalog {
    pub fn new<I, K>(paths: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: Into<String>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|(key, steps)| (key.into().to_lowercase(), steps))
                .collect(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let source: CatalogSource = serde_json::from_str(raw)?;
        Ok(Self::new(
            source.0.into_iter().map(|(key, entry)| (key, entry.steps)),
        ))
    }

    /// Reads the catalog from a JSON learning-paths file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let raw = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let catalog = Self::from_json(&raw).map_err(|e| LoadError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

        if catalog.is_empty() {
            warn!("Learning path catalog {} is empty; every skill gets generic steps", path.display());
        } else {
            info!("Loaded learning paths for {} skills", catalog.len());
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Direct key lookup, then the first key (in catalog order) that contains or is
    /// contained in `skill_lower`.
    pub fn lookup(&self, skill_lower: &str) -> Option<&[String]> {
        self.paths
            .iter()
            .find(|(key, _)| key == skill_lower)
            .or_else(|| {
                self.paths
                    .iter()
                    .find(|(key, _)| skill_lower.contains(key.as_str()) || key.contains(skill_lower))
            })
            .map(|(_, steps)| steps.as_slice())
    }
}

/// Builds learning tracks from a shared catalog.
#[derive(Debug, Clone)]
pub struct LearningTrackGenerator {
    catalog: LearningPathCatalog,
}

impl LearningTrackGenerator {
    pub fn new(catalog: LearningPathCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &LearningPathCatalog {
        &self.catalog
    }

    /// One entry per missing skill, in input order. Repeats are kept.
    ///
    /// Catalog steps are truncated to `max_steps`; a skill with no entry, or whose entry
    /// has no steps, gets the generic four-step plan instead.
    pub fn generate_learning_track(
        &self,
        missing_skills: &[String],
        max_steps: usize,
    ) -> Vec<LearningStep> {
        missing_skills
            .iter()
            .map(|skill| {
                let steps = match self.catalog.lookup(&skill.to_lowercase()) {
                    Some(steps) if !steps.is_empty() => {
                        steps.iter().take(max_steps).cloned().collect()
                    }
                    _ => generic_steps(skill, max_steps),
                };
                LearningStep {
                    skill: skill.clone(),
                    steps,
                }
            })
            .collect()
    }
}

fn generic_steps(skill: &str, max_steps: usize) -> Vec<String> {
    [
        format!("Research {skill} fundamentals and core concepts"),
        format!("Complete online tutorials or courses on {skill}"),
        format!("Build a small project using {skill}"),
        format!("Practice {skill} through hands-on exercises"),
    ]
    .into_iter()
    .take(max_steps)
    .collect()
}
