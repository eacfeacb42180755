use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Category, City, ComplaintStatus, Priority, StoredComplaint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorityBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

/// Aggregates shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub high_priority: usize,
    /// Number of distinct categories present.
    pub category_count: usize,
    /// Sorted by count descending, then label ascending.
    pub by_category: Vec<CategoryCount>,
    pub by_priority: PriorityBreakdown,
    pub by_status: StatusBreakdown,
}

/// Keeps the complaints filed against `city`. `None` keeps everything.
pub fn filter_by_city(complaints: Vec<StoredComplaint>, city: Option<City>) -> Vec<StoredComplaint> {
    match city {
        Some(city) => complaints.into_iter().filter(|c| c.city == Some(city)).collect(),
        None => complaints,
    }
}

pub fn compute(complaints: &[StoredComplaint]) -> DashboardSummary {
    let mut categories: HashMap<Category, usize> = HashMap::new();
    let mut by_priority = PriorityBreakdown::default();
    let mut by_status = StatusBreakdown::default();

    for complaint in complaints {
        *categories.entry(complaint.category).or_insert(0) += 1;

        match complaint.priority {
            Priority::Low => by_priority.low += 1,
            Priority::Medium => by_priority.medium += 1,
            Priority::High => by_priority.high += 1,
        }

        match complaint.status {
            ComplaintStatus::Pending => by_status.pending += 1,
            ComplaintStatus::InProgress => by_status.in_progress += 1,
            ComplaintStatus::Resolved => by_status.resolved += 1,
        }
    }

    let mut by_category: Vec<CategoryCount> = categories
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    by_category.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.label().cmp(b.category.label()))
    });

    DashboardSummary {
        total: complaints.len(),
        high_priority: by_priority.high,
        category_count: by_category.len(),
        by_category,
        by_priority,
        by_status,
    }
}
