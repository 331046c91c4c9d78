// Resume-role fit evaluation.
// Implements: skill dictionary, skill extraction, fit scoring, learning tracks, and the
// engine that ties them together. Dictionaries are loaded once and shared read-only.

pub mod dictionary;
pub mod engine;
pub mod extractor;
pub mod handlers;
pub mod learning_path;
mod ordered;
pub mod scoring;
mod stop_words;

use thiserror::Error;

/// Startup failure while building the engine. Fatal: there is no degraded mode.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid matcher for skill term '{term}': {source}")]
    Pattern {
        term: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid evaluation settings: {0}")]
    Settings(String),

    #[error("unknown similarity model '{0}' (supported: tfidf)")]
    UnknownSimilarityModel(String),
}

/// Failure computing text similarity. Never leaves the scorer; it becomes a 0.0 score.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("empty vocabulary: documents contain only stop words or short tokens")]
    EmptyVocabulary,

    #[error("document has no terms in the fitted vocabulary")]
    ZeroNorm,
}
