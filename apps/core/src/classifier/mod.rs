//! # Classifier Module
//!
//! Turns raw complaint text into a category, a priority, a routing department
//! and a summary sentence.
//!
//! ## Components
//! - `rules`: ordered keyword tables for category and priority
//! - `summary`: sentence templates
//! - `local`: in-process keyword classifier
//! - `remote`: HTTP delegate with the same contract
//!
//! Which variant runs is decided by configuration, see [`build_classifier`].

pub mod local;
pub mod remote;
pub mod rules;
pub mod summary;

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::ClassifierConfig;
use crate::traits::Classifier;

pub use local::KeywordClassifier;
pub use remote::RemoteClassifier;

/// Why a classification attempt produced no analysis.
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// The request never got a response (connection refused, timeout, ...).
    #[error("Classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The classifier answered with a non-success status and no error message.
    #[error("Classifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The classifier answered with an explicit `{"error": ...}` payload.
    #[error("Classifier rejected the complaint: {0}")]
    Rejected(String),

    #[error("Classifier response could not be decoded: {0}")]
    Malformed(String),
}

/// Builds the classifier selected by configuration.
pub fn build_classifier(config: &ClassifierConfig) -> Result<Arc<dyn Classifier>, ClassificationError> {
    let classifier: Arc<dyn Classifier> = match config {
        ClassifierConfig::Local { delay } => Arc::new(KeywordClassifier::new(*delay)),
        ClassifierConfig::Remote {
            endpoint,
            auth_token,
            timeout,
        } => Arc::new(RemoteClassifier::new(endpoint.clone(), auth_token.clone(), *timeout)?),
    };

    info!("Using {} classifier", classifier.name());
    Ok(classifier)
}
