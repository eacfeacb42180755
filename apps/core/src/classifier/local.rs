//! In-process keyword classifier.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

use super::rules::{detect_category, detect_priority};
use super::summary::SummaryTemplate;
use super::ClassificationError;
use crate::models::{AnalysisResult, City};
use crate::traits::Classifier;

/// Pure keyword heuristic, optionally delayed to mimic a model round trip.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    delay: Duration,
}

impl KeywordClassifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Classifies without any delay, drawing the summary template from `rng`.
    pub fn analyze_with_rng<R: Rng + ?Sized>(
        text: &str,
        city: Option<City>,
        rng: &mut R,
    ) -> AnalysisResult {
        let category_match = detect_category(text);
        let priority = detect_priority(text);
        let category = category_match.category;
        let department = category.department();

        debug!(
            category = %category,
            keyword = category_match.keyword.unwrap_or("-"),
            priority = %priority,
            "Keyword classification"
        );

        AnalysisResult {
            category,
            priority,
            department: department.to_string(),
            summary: SummaryTemplate::pick(rng).render(category, priority, department, city),
        }
    }

    /// Classifies without any delay.
    pub fn analyze(text: &str, city: Option<City>) -> AnalysisResult {
        Self::analyze_with_rng(text, city, &mut rand::thread_rng())
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn classify(
        &self,
        text: &str,
        city: Option<City>,
    ) -> Result<AnalysisResult, ClassificationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Self::analyze(text, city))
    }
}
