//! Skill Dictionary — canonical skill names and aliases, built once from the skills document.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::evaluation::{ordered, LoadError};

// ────────────────────────────────────────────────────────────────────────────
// Source document shape
// ────────────────────────────────────────────────────────────────────────────

/// A single skill as authored in a category: either a bare name or a record with aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        aliases: Vec<String>,
    },
}

impl SkillEntry {
    pub fn name(&self) -> &str {
        match self {
            SkillEntry::Name(name) => name,
            SkillEntry::Detailed { name, .. } => name,
        }
    }

    pub fn aliases(&self) -> &[String] {
        match self {
            SkillEntry::Name(_) => &[],
            SkillEntry::Detailed { aliases, .. } => aliases,
        }
    }
}

/// Raw skills document: category → entries, plus a flat alias → canonical map.
/// Both keep document order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillsSource {
    #[serde(default, deserialize_with = "ordered::deserialize")]
    pub categories: Vec<(String, Vec<SkillEntry>)>,
    #[serde(default, deserialize_with = "ordered::deserialize")]
    pub aliases: Vec<(String, String)>,
}

// ────────────────────────────────────────────────────────────────────────────
// Whole-word matcher
// ────────────────────────────────────────────────────────────────────────────

/// Case-insensitive `\b<term>\b` matcher for one skill or alias.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    pattern: Regex,
}

impl TermMatcher {
    pub fn new(term: &str) -> Result<Self, LoadError> {
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).map_err(|e| {
            LoadError::Pattern {
                term: term.to_string(),
                source: e,
            }
        })?;
        Ok(Self { pattern })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SkillDictionary
// ────────────────────────────────────────────────────────────────────────────

/// Immutable skill vocabulary shared by the extractor.
///
/// `canonical_skills` holds lowercase names; `alias_map` maps a lowercase alias to the
/// canonical display name exactly as authored ("Python", "C++").
#[derive(Debug, Clone)]
pub struct SkillDictionary {
    canonical_skills: HashSet<String>,
    alias_map: HashMap<String, String>,
    /// Lowercase alias target → target as authored. Folds case variants of a target.
    targets: HashMap<String, String>,
    skill_matchers: Vec<(String, TermMatcher)>,
    alias_matchers: Vec<(String, TermMatcher)>,
}

impl SkillDictionary {
    /// Builds the dictionary from a parsed source document.
    ///
    /// Category aliases are applied first and the top-level `aliases` map last, so a
    /// top-level alias overrides a category alias with the same key.
    pub fn from_source(source: &SkillsSource) -> Result<Self, LoadError> {
        let mut canonical_skills = HashSet::new();
        let mut alias_map = HashMap::new();

        for (_, entries) in &source.categories {
            for entry in entries {
                canonical_skills.insert(entry.name().to_lowercase());
                for alias in entry.aliases() {
                    alias_map.insert(alias.to_lowercase(), entry.name().to_string());
                }
            }
        }

        for (alias, canonical) in &source.aliases {
            alias_map.insert(alias.to_lowercase(), canonical.clone());
        }

        Self::from_parts(canonical_skills, alias_map)
    }

    /// Builds the dictionary from already-normalized parts, compiling one matcher per term.
    pub fn from_parts(
        canonical_skills: HashSet<String>,
        alias_map: HashMap<String, String>,
    ) -> Result<Self, LoadError> {
        let skill_matchers = canonical_skills
            .iter()
            .map(|skill| Ok((skill.clone(), TermMatcher::new(skill)?)))
            .collect::<Result<Vec<_>, LoadError>>()?;

        let alias_matchers = alias_map
            .keys()
            .map(|alias| Ok((alias.clone(), TermMatcher::new(alias)?)))
            .collect::<Result<Vec<_>, LoadError>>()?;

        // Sorted so two targets differing only in case always fold to the same one.
        let mut targets = HashMap::new();
        for target in alias_map.values().collect::<BTreeSet<_>>() {
            targets
                .entry(target.to_lowercase())
                .or_insert_with(|| target.clone());
        }

        Ok(Self {
            canonical_skills,
            alias_map,
            targets,
            skill_matchers,
            alias_matchers,
        })
    }

    /// Reads and builds the dictionary from a JSON skills file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let raw = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let source: SkillsSource = serde_json::from_str(&raw).map_err(|e| LoadError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

        let dictionary = Self::from_source(&source)?;
        info!(
            "Loaded {} skills and {} aliases",
            dictionary.canonical_skills().len(),
            dictionary.alias_count()
        );
        Ok(dictionary)
    }

    pub fn canonical_skills(&self) -> &HashSet<String> {
        &self.canonical_skills
    }

    /// Canonical display name for a lowercase alias, if known.
    pub fn resolve_alias(&self, alias_lower: &str) -> Option<&str> {
        self.alias_map.get(alias_lower).map(String::as_str)
    }

    /// Alias target whose lowercase form equals `skill_lower`, as authored.
    pub fn resolve_target(&self, skill_lower: &str) -> Option<&str> {
        self.targets.get(skill_lower).map(String::as_str)
    }

    pub fn alias_count(&self) -> usize {
        self.alias_map.len()
    }

    /// Lowercase canonical skills with their matchers.
    pub(crate) fn skill_matchers(&self) -> &[(String, TermMatcher)] {
        &self.skill_matchers
    }

    /// Lowercase aliases with their matchers.
    pub(crate) fn alias_matchers(&self) -> &[(String, TermMatcher)] {
        &self.alias_matchers
    }
}
