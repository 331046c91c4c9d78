//! Skill Extractor — finds dictionary skills in free text and normalizes them to display form.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::evaluation::dictionary::SkillDictionary;

/// Scans text against a shared `SkillDictionary`.
#[derive(Debug, Clone)]
pub struct SkillExtractor {
    dictionary: Arc<SkillDictionary>,
}

impl SkillExtractor {
    pub fn new(dictionary: Arc<SkillDictionary>) -> Self {
        Self { dictionary }
    }

    /// Extracts the deduplicated set of skill mentions present in `text`.
    ///
    /// Canonical hits are title-cased; alias hits resolve to the alias target as authored.
    /// Both passes run independently, so a canonical skill and an alias pointing at a
    /// differently-cased target can both appear.
    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let text_lower = text.to_lowercase();
        let mut found = BTreeSet::new();

        for (skill, matcher) in self.dictionary.skill_matchers() {
            if matcher.is_match(&text_lower) {
                found.insert(title_case(skill));
            }
        }

        for (alias, matcher) in self.dictionary.alias_matchers() {
            if matcher.is_match(&text_lower) {
                if let Some(canonical) = self.dictionary.resolve_alias(alias) {
                    found.insert(canonical.to_string());
                }
            }
        }

        debug!("Extracted {} skills from text ({} chars)", found.len(), text.len());
        found.into_iter().collect()
    }

    /// Maps each mention through the alias table, title-casing anything that is not an alias.
    ///
    /// A mention that matches an alias target ignoring case ("Javascript", "PostgreSQL")
    /// takes the target as authored, so a canonical hit and an alias hit for the same
    /// skill collapse into one entry and a second pass changes nothing.
    pub fn normalize_skills(&self, skills: &[String]) -> Vec<String> {
        skills
            .iter()
            .map(|skill| {
                let lower = skill.to_lowercase();
                self.dictionary
                    .resolve_alias(&lower)
                    .or_else(|| self.dictionary.resolve_target(&lower))
                    .map(str::to_string)
                    .unwrap_or_else(|| title_case(skill))
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest.
/// Any non-letter starts a new run: "node.js" → "Node.Js", "ci/cd" → "Ci/Cd".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
