//! Fit Scoring — skill-overlap coverage, text similarity, and the verdict tiers.
//!
//! Text similarity sits behind the `TextSimilarity` trait. The engine holds an
//! `Arc<dyn TextSimilarity>` chosen at startup; the only backend shipped is TF-IDF.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evaluation::{LoadError, SimilarityError};

/// Weight of skill coverage in the blended fit score; text similarity gets the rest.
pub const SKILL_WEIGHT: f64 = 0.7;
pub const TEXT_WEIGHT: f64 = 0.3;

const MAX_FEATURES: usize = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Verdict
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    StrongFit,
    ModerateFit,
    WeakFit,
}

impl Verdict {
    /// Lower bounds are inclusive: a score equal to a threshold lands in the higher tier.
    pub fn classify(score: f64, strong_threshold: f64, moderate_threshold: f64) -> Self {
        if score >= strong_threshold {
            Verdict::StrongFit
        } else if score >= moderate_threshold {
            Verdict::ModerateFit
        } else {
            Verdict::WeakFit
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skill overlap
// ────────────────────────────────────────────────────────────────────────────

/// Coverage of the job's skills by the resume's skills.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillOverlap {
    pub score: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

/// Fraction of distinct (case-folded) job skills also present in the resume.
///
/// Extra resume skills never lower the score. `matched` keeps the resume's display
/// forms and `missing` the job's, both in their original list order.
pub fn calculate_fit_score(resume_skills: &[String], job_skills: &[String]) -> SkillOverlap {
    if resume_skills.is_empty() || job_skills.is_empty() {
        return SkillOverlap {
            score: 0.0,
            matched: Vec::new(),
            missing: job_skills.to_vec(),
        };
    }

    let resume_lower: HashSet<String> = resume_skills.iter().map(|s| s.to_lowercase()).collect();
    let job_lower: HashSet<String> = job_skills.iter().map(|s| s.to_lowercase()).collect();

    let matched_lower: HashSet<&String> = resume_lower.intersection(&job_lower).collect();

    let matched = resume_skills
        .iter()
        .filter(|s| matched_lower.contains(&s.to_lowercase()))
        .cloned()
        .collect();
    let missing = job_skills
        .iter()
        .filter(|s| !resume_lower.contains(&s.to_lowercase()))
        .cloned()
        .collect();

    let score = (matched_lower.len() as f64 / job_lower.len() as f64).min(1.0);

    SkillOverlap {
        score,
        matched,
        missing,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text similarity backends
// ────────────────────────────────────────────────────────────────────────────

/// A text similarity backend. Implement this to swap the similarity model without
/// touching the engine or the handlers.
pub trait TextSimilarity: Send + Sync {
    /// Backend name as configured through `SIMILARITY_MODEL`.
    fn name(&self) -> &'static str;

    /// Similarity in [0, 1] between two documents.
    fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError>;
}

/// Resolves a configured model name to a backend.
pub fn similarity_backend(model: &str) -> Result<Arc<dyn TextSimilarity>, LoadError> {
    match model.trim().to_lowercase().as_str() {
        "tfidf" => Ok(Arc::new(TfidfSimilarity)),
        other => Err(LoadError::UnknownSimilarityModel(other.to_string())),
    }
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// TF-IDF cosine similarity over a vocabulary fitted on just the two documents.
///
/// Tokens are lowercase runs of two or more word characters, English stop words
/// dropped, then unigrams plus adjacent bigrams. The vocabulary keeps the top
/// `MAX_FEATURES` terms by corpus frequency (ties by term text). Smoothed idf,
/// raw term counts, L2-normalized rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfSimilarity;

impl TfidfSimilarity {
    fn terms(text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN_RE
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|t| !super::stop_words::is_stop_word(t))
            .collect();

        let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
        terms
    }

    fn counts(terms: &[String]) -> HashMap<&str, f64> {
        let mut counts = HashMap::new();
        for term in terms {
            *counts.entry(term.as_str()).or_insert(0.0) += 1.0;
        }
        counts
    }
}

impl TextSimilarity for TfidfSimilarity {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        let terms_a = Self::terms(a);
        let terms_b = Self::terms(b);
        let counts_a = Self::counts(&terms_a);
        let counts_b = Self::counts(&terms_b);

        // BTreeMap gives term-ascending order, so the stable sort breaks frequency ties by text.
        let mut corpus: BTreeMap<&str, f64> = BTreeMap::new();
        for (term, count) in counts_a.iter().chain(counts_b.iter()) {
            *corpus.entry(*term).or_insert(0.0) += *count;
        }
        if corpus.is_empty() {
            return Err(SimilarityError::EmptyVocabulary);
        }

        let mut ranked: Vec<(&str, f64)> = corpus.into_iter().collect();
        ranked.sort_by(|x, y| y.1.total_cmp(&x.1));
        ranked.truncate(MAX_FEATURES);

        let n_docs = 2.0_f64;
        let weighted: Vec<(f64, f64)> = ranked
            .iter()
            .map(|(term, _)| {
                let tf_a = counts_a.get(term).copied().unwrap_or(0.0);
                let tf_b = counts_b.get(term).copied().unwrap_or(0.0);
                let df = (tf_a > 0.0) as u8 as f64 + (tf_b > 0.0) as u8 as f64;
                let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
                (tf_a * idf, tf_b * idf)
            })
            .collect();

        let norm_a = weighted.iter().map(|(x, _)| x * x).sum::<f64>().sqrt();
        let norm_b = weighted.iter().map(|(_, y)| y * y).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return Err(SimilarityError::ZeroNorm);
        }

        let dot: f64 = weighted.iter().map(|(x, y)| x * y).sum();
        Ok((dot / (norm_a * norm_b)).clamp(0.0, 1.0))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FitScorer
// ────────────────────────────────────────────────────────────────────────────

/// Combines skill coverage with the configured text similarity backend.
#[derive(Clone)]
pub struct FitScorer {
    similarity: Arc<dyn TextSimilarity>,
}

impl std::fmt::Debug for FitScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitScorer")
            .field("similarity", &self.similarity.name())
            .finish()
    }
}

impl FitScorer {
    pub fn new(similarity: Arc<dyn TextSimilarity>) -> Self {
        Self { similarity }
    }

    pub fn backend(&self) -> &'static str {
        self.similarity.name()
    }

    pub fn calculate_fit_score(&self, resume_skills: &[String], job_skills: &[String]) -> SkillOverlap {
        calculate_fit_score(resume_skills, job_skills)
    }

    /// Similarity between the raw texts. A backend failure is logged and scored 0.0.
    pub fn calculate_text_similarity(&self, resume_text: &str, job_text: &str) -> f64 {
        match self.similarity.similarity(resume_text, job_text) {
            Ok(score) => score,
            Err(e) => {
                warn!("Text similarity ({}) failed, using 0.0: {e}", self.similarity.name());
                0.0
            }
        }
    }

    /// `0.7 * skill_score + 0.3 * text_similarity`, unrounded.
    pub fn blend(skill_score: f64, text_similarity: f64) -> f64 {
        SKILL_WEIGHT * skill_score + TEXT_WEIGHT * text_similarity
    }
}

/// Rounds to two decimals for the response.
pub fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_resume_scores_zero_and_everything_missing() {
        let overlap = calculate_fit_score(&[], &skills(&["Python"]));
        assert_eq!(overlap.score, 0.0);
        assert!(overlap.matched.is_empty());
        assert_eq!(overlap.missing, skills(&["Python"]));
    }

    #[test]
    fn test_empty_job_scores_zero() {
        let overlap = calculate_fit_score(&skills(&["Python"]), &[]);
        assert_eq!(overlap.score, 0.0);
        assert!(overlap.matched.is_empty());
        assert!(overlap.missing.is_empty());
    }

    #[test]
    fn test_extra_resume_skills_do_not_penalize() {
        let overlap = calculate_fit_score(&skills(&["Python", "SQL"]), &skills(&["Python"]));
        assert_eq!(overlap.score, 1.0);
        assert_eq!(overlap.matched, skills(&["Python"]));
        assert!(overlap.missing.is_empty());
    }

    #[test]
    fn test_coverage_uses_distinct_case_folded_job_skills() {
        let overlap = calculate_fit_score(
            &skills(&["python"]),
            &skills(&["Python", "PYTHON", "Rust"]),
        );
        assert!((overlap.score - 0.5).abs() < 1e-9);
        // Display forms come from the original lists.
        assert_eq!(overlap.matched, skills(&["python"]));
        assert_eq!(overlap.missing, skills(&["Rust"]));
    }

    #[test]
    fn test_score_is_monotonic_in_matched_skills() {
        let job = skills(&["Python", "SQL", "Rust", "Docker"]);
        let mut resume = skills(&["Excel"]);
        let mut previous = calculate_fit_score(&resume, &job).score;
        for skill in ["Python", "SQL", "Rust", "Docker"] {
            resume.push(skill.to_string());
            let current = calculate_fit_score(&resume, &job).score;
            assert!(current >= previous, "{current} < {previous}");
            previous = current;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn test_verdict_boundaries_belong_to_higher_tier() {
        assert_eq!(Verdict::classify(0.70, 0.7, 0.4), Verdict::StrongFit);
        assert_eq!(Verdict::classify(0.699, 0.7, 0.4), Verdict::ModerateFit);
        assert_eq!(Verdict::classify(0.40, 0.7, 0.4), Verdict::ModerateFit);
        assert_eq!(Verdict::classify(0.399, 0.7, 0.4), Verdict::WeakFit);
        assert_eq!(Verdict::classify(1.0, 0.7, 0.4), Verdict::StrongFit);
        assert_eq!(Verdict::classify(0.0, 0.7, 0.4), Verdict::WeakFit);
    }

    #[test]
    fn test_verdict_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Verdict::ModerateFit).unwrap(),
            "\"moderate_fit\""
        );
    }

    #[test]
    fn test_tfidf_identical_texts_score_one() {
        let score = TfidfSimilarity
            .similarity("Rust systems programming", "rust Systems programming")
            .unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tfidf_disjoint_texts_score_zero() {
        let score = TfidfSimilarity
            .similarity("kubernetes clusters", "watercolor painting")
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_tfidf_matches_reference_value() {
        // Shared terms: python, sql, "python sql" (idf 1); all others idf ln(1.5) + 1.
        let score = TfidfSimilarity
            .similarity(
                "I have 5 years of Python and SQL experience",
                "Looking for a Python, SQL and Rust developer",
            )
            .unwrap();
        let rare = (1.5_f64).ln() + 1.0;
        let expected = 3.0 / ((3.0 + 4.0 * rare * rare) * (3.0 + 6.0 * rare * rare)).sqrt();
        assert!((score - expected).abs() < 1e-9, "{score} vs {expected}");
    }

    #[test]
    fn test_tfidf_stop_words_only_is_empty_vocabulary() {
        let err = TfidfSimilarity
            .similarity("and the of", "a an to")
            .unwrap_err();
        assert_eq!(err, SimilarityError::EmptyVocabulary);
    }

    #[test]
    fn test_tfidf_one_sided_document_is_zero_norm() {
        let err = TfidfSimilarity
            .similarity("the and of", "distributed systems")
            .unwrap_err();
        assert_eq!(err, SimilarityError::ZeroNorm);
    }

    #[test]
    fn test_scorer_recovers_similarity_failure_as_zero() {
        let scorer = FitScorer::new(Arc::new(TfidfSimilarity));
        assert_eq!(scorer.calculate_text_similarity("", ""), 0.0);
    }

    #[test]
    fn test_blend_and_round() {
        let blended = FitScorer::blend(2.0 / 3.0, 0.2358);
        assert!((blended - 0.53741).abs() < 1e-4);
        assert_eq!(round2(blended), 0.54);
    }

    #[test]
    fn test_similarity_backend_lookup() {
        assert_eq!(similarity_backend("tfidf").unwrap().name(), "tfidf");
        assert_eq!(similarity_backend(" TFIDF ").unwrap().name(), "tfidf");
        assert!(matches!(
            similarity_backend("sentence_embeddings"),
            Err(LoadError::UnknownSimilarityModel(_))
        ));
    }
}
