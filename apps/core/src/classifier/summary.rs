//! Human-readable summary sentences for an analysis.

use rand::Rng;

use crate::models::{Category, City, Priority};

/// The three sentence shapes a summary can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTemplate {
    CitizenReport,
    Pertains,
    FallsUnder,
}

impl SummaryTemplate {
    pub const ALL: [SummaryTemplate; 3] = [
        SummaryTemplate::CitizenReport,
        SummaryTemplate::Pertains,
        SummaryTemplate::FallsUnder,
    ];

    /// Picks a template uniformly at random.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Renders the sentence. The city clause disappears entirely when `city` is `None`.
    pub fn render(
        &self,
        category: Category,
        priority: Priority,
        department: &str,
        city: Option<City>,
    ) -> String {
        let city_clause = city.map(|c| format!(" in {}", c)).unwrap_or_default();
        let category = category.label().to_lowercase();
        let priority = priority.label().to_lowercase();

        match self {
            SummaryTemplate::CitizenReport => format!(
                "A citizen has reported an issue{} related to {}. The complaint indicates a {} priority concern that requires attention from the {}.",
                city_clause, category, priority, department
            ),
            SummaryTemplate::Pertains => format!(
                "This complaint{} pertains to {} matters. Based on the content analysis, it has been classified as {} priority and should be directed to the {} for resolution.",
                city_clause, category, priority, department
            ),
            SummaryTemplate::FallsUnder => format!(
                "The reported issue{} falls under the {} category. The AI analysis suggests {} priority handling by the {}.",
                city_clause, category, priority, department
            ),
        }
    }
}
