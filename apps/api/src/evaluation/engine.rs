//! Fit Engine — runs extraction, scoring and learning-track generation for one
//! resume / job description pair.
//!
//! Built once at startup and shared behind an `Arc`; every component is read-only
//! after construction, so evaluations run concurrently without locking.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::evaluation::dictionary::SkillDictionary;
use crate::evaluation::extractor::SkillExtractor;
use crate::evaluation::learning_path::{LearningPathCatalog, LearningStep, LearningTrackGenerator};
use crate::evaluation::scoring::{round2, similarity_backend, FitScorer, TextSimilarity, Verdict};
use crate::evaluation::LoadError;

/// Tunables for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSettings {
    pub max_steps_per_skill: usize,
    pub strong_fit_threshold: f64,
    pub moderate_fit_threshold: f64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            max_steps_per_skill: 4,
            strong_fit_threshold: 0.7,
            moderate_fit_threshold: 0.4,
        }
    }
}

impl EvaluationSettings {
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.max_steps_per_skill == 0 {
            return Err(LoadError::Settings(
                "max_steps_per_skill must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("strong_fit_threshold", self.strong_fit_threshold),
            ("moderate_fit_threshold", self.moderate_fit_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LoadError::Settings(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.moderate_fit_threshold > self.strong_fit_threshold {
            return Err(LoadError::Settings(format!(
                "moderate_fit_threshold ({}) exceeds strong_fit_threshold ({})",
                self.moderate_fit_threshold, self.strong_fit_threshold
            )));
        }
        Ok(())
    }

    pub fn verdict(&self, score: f64) -> Verdict {
        Verdict::classify(score, self.strong_fit_threshold, self.moderate_fit_threshold)
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub fit_score: f64,
    pub verdict: Verdict,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommended_learning_track: Vec<LearningStep>,
}

/// Where the engine's dictionaries live and which similarity model to use.
#[derive(Debug, Clone)]
pub struct EngineSources<'a> {
    pub skills_file: &'a Path,
    pub learning_paths_file: &'a Path,
    pub similarity_model: &'a str,
}

#[derive(Debug, Clone)]
pub struct FitEngine {
    extractor: SkillExtractor,
    scorer: FitScorer,
    generator: LearningTrackGenerator,
    settings: EvaluationSettings,
}

impl FitEngine {
    pub fn new(
        dictionary: SkillDictionary,
        catalog: LearningPathCatalog,
        similarity: Arc<dyn TextSimilarity>,
        settings: EvaluationSettings,
    ) -> Result<Self, LoadError> {
        settings.validate()?;
        Ok(Self {
            extractor: SkillExtractor::new(Arc::new(dictionary)),
            scorer: FitScorer::new(similarity),
            generator: LearningTrackGenerator::new(catalog),
            settings,
        })
    }

    /// Loads both dictionaries from disk. Any failure aborts startup.
    pub fn load(sources: &EngineSources<'_>, settings: EvaluationSettings) -> Result<Self, LoadError> {
        let similarity = similarity_backend(sources.similarity_model)?;
        let dictionary = SkillDictionary::load(sources.skills_file)?;
        let catalog = LearningPathCatalog::load(sources.learning_paths_file)?;

        let engine = Self::new(dictionary, catalog, similarity, settings)?;
        info!("FitEngine initialized ({engine})");
        Ok(engine)
    }

    pub fn scorer(&self) -> &FitScorer {
        &self.scorer
    }

    pub fn generator(&self) -> &LearningTrackGenerator {
        &self.generator
    }

    /// Scores a resume against a job description.
    ///
    /// The verdict is taken from the unrounded blend; only the reported score is rounded.
    /// A learning track is produced only for non-strong fits with missing skills.
    pub fn evaluate(&self, resume_text: &str, job_description: &str) -> EvaluationResult {
        let resume_skills = self
            .extractor
            .normalize_skills(&self.extractor.extract_skills(resume_text));
        let job_skills = self
            .extractor
            .normalize_skills(&self.extractor.extract_skills(job_description));

        let overlap = self.scorer.calculate_fit_score(&resume_skills, &job_skills);
        let text_similarity = self
            .scorer
            .calculate_text_similarity(resume_text, job_description);

        let fit_score = FitScorer::blend(overlap.score, text_similarity);
        let verdict = self.settings.verdict(fit_score);
        debug!(
            "skill score {:.3}, text similarity {:.3}, blended {:.3} -> {:?}",
            overlap.score, text_similarity, fit_score, verdict
        );

        let recommended_learning_track = if verdict != Verdict::StrongFit && !overlap.missing.is_empty() {
            self.generator
                .generate_learning_track(&overlap.missing, self.settings.max_steps_per_skill)
        } else {
            Vec::new()
        };

        EvaluationResult {
            fit_score: round2(fit_score).clamp(0.0, 1.0),
            verdict,
            matched_skills: overlap.matched,
            missing_skills: overlap.missing,
            recommended_learning_track,
        }
    }
}

impl fmt::Display for FitEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "similarity: {}, learning paths: {}, strong >= {}, moderate >= {}, max steps {}",
            self.scorer.backend(),
            self.generator.catalog().len(),
            self.settings.strong_fit_threshold,
            self.settings.moderate_fit_threshold,
            self.settings.max_steps_per_skill
        )
    }
}
