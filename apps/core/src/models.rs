use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::AppError;

/// Cities a complaint can be filed against. Also used to filter admin views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "New York")]
    NewYork,
    #[serde(rename = "Los Angeles")]
    LosAngeles,
    Chicago,
    Houston,
    Phoenix,
    Philadelphia,
    #[serde(rename = "San Antonio")]
    SanAntonio,
    #[serde(rename = "San Diego")]
    SanDiego,
    Dallas,
    #[serde(rename = "San Jose")]
    SanJose,
}

impl City {
    pub const ALL: [City; 10] = [
        City::NewYork,
        City::LosAngeles,
        City::Chicago,
        City::Houston,
        City::Phoenix,
        City::Philadelphia,
        City::SanAntonio,
        City::SanDiego,
        City::Dallas,
        City::SanJose,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            City::NewYork => "New York",
            City::LosAngeles => "Los Angeles",
            City::Chicago => "Chicago",
            City::Houston => "Houston",
            City::Phoenix => "Phoenix",
            City::Philadelphia => "Philadelphia",
            City::SanAntonio => "San Antonio",
            City::SanDiego => "San Diego",
            City::Dallas => "Dallas",
            City::SanJose => "San Jose",
        }
    }

    /// Parses an optional form value. Blank input means "no city selected".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<City>, AppError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for City {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::ALL
            .into_iter()
            .find(|city| city.label() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown city: {}", s)))
    }
}

/// Complaint category assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Infrastructure & Roads")]
    InfrastructureRoads,
    #[serde(rename = "Water & Sanitation")]
    WaterSanitation,
    #[serde(rename = "Waste Management")]
    WasteManagement,
    #[serde(rename = "Electricity & Lighting")]
    ElectricityLighting,
    Environmental,
    #[serde(rename = "Parks & Recreation")]
    ParksRecreation,
    #[serde(rename = "Public Safety")]
    PublicSafety,
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::InfrastructureRoads,
        Category::WaterSanitation,
        Category::WasteManagement,
        Category::ElectricityLighting,
        Category::Environmental,
        Category::ParksRecreation,
        Category::PublicSafety,
        Category::GeneralInquiry,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::InfrastructureRoads => "Infrastructure & Roads",
            Category::WaterSanitation => "Water & Sanitation",
            Category::WasteManagement => "Waste Management",
            Category::ElectricityLighting => "Electricity & Lighting",
            Category::Environmental => "Environmental",
            Category::ParksRecreation => "Parks & Recreation",
            Category::PublicSafety => "Public Safety",
            Category::GeneralInquiry => "General Inquiry",
        }
    }

    /// The department a complaint of this category is routed to.
    pub fn department(&self) -> &'static str {
        match self {
            Category::InfrastructureRoads => "Department of Public Works",
            Category::WaterSanitation => "Water Utilities Department",
            Category::WasteManagement => "Sanitation Department",
            Category::ElectricityLighting => "Power & Utilities Department",
            Category::Environmental => "Environmental Protection Agency",
            Category::ParksRecreation => "Parks & Recreation Department",
            Category::PublicSafety => "Public Safety Department",
            Category::GeneralInquiry => "City Services Department",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown category: {}", s)))
    }
}

/// Urgency tier of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            other => Err(AppError::Validation(format!("Unknown priority: {}", other))),
        }
    }
}

/// Lifecycle of a stored complaint. Only the admin status update moves it past `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in-progress",
            ComplaintStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for ComplaintStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ComplaintStatus::Pending),
            "in-progress" => Ok(ComplaintStatus::InProgress),
            "resolved" => Ok(ComplaintStatus::Resolved),
            other => Err(AppError::Validation(format!("Unknown status: {}", other))),
        }
    }
}

/// Output of a classifier. Produced once per submission and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub category: Category,
    pub priority: Priority,
    pub department: String,
    pub summary: String,
}

/// A validated complaint as typed by the citizen.
#[derive(Debug, Clone, Validate)]
pub struct ComplaintInput {
    /// Trimmed complaint text.
    #[validate(length(
        min = 10,
        max = 5000,
        message = "Complaint must be between 10 and 5000 characters"
    ))]
    pub text: String,
    pub city: Option<City>,
}

impl ComplaintInput {
    /// Builds and validates an input from raw form values.
    pub fn parse(text: &str, city: Option<&str>) -> Result<Self, AppError> {
        let input = Self {
            text: text.trim().to_string(),
            city: City::parse_optional(city)?,
        };
        input.validate()?;
        Ok(input)
    }
}

/// Raw image bytes attached to a submission, before upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Everything the store needs to create a complaint record.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub user_id: String,
    pub input: ComplaintInput,
    pub analysis: AnalysisResult,
    pub image_urls: Vec<String>,
}

/// A persisted complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredComplaint {
    pub id: String,
    pub user_id: String,
    pub complaint_text: String,
    pub city: Option<City>,
    pub category: Category,
    pub priority: Priority,
    pub department: String,
    pub summary: String,
    pub status: ComplaintStatus,
    pub image_urls: Vec<String>,
    /// Unix timestamp of when the complaint was filed.
    pub created_at: i64,
}

/// Row layout of the `complaints` table.
#[derive(Debug, FromRow)]
pub struct ComplaintRow {
    pub id: String,
    pub user_id: String,
    pub complaint_text: String,
    pub city: Option<String>,
    pub category: String,
    pub priority: String,
    pub department: String,
    pub summary: String,
    pub status: String,
    pub image_urls: Json<Vec<String>>,
    pub created_at: i64,
}

impl TryFrom<ComplaintRow> for StoredComplaint {
    type Error = AppError;

    fn try_from(row: ComplaintRow) -> Result<Self, Self::Error> {
        let corrupt = |e: AppError| AppError::Internal(format!("Corrupt complaint row {}: {}", row.id, e));

        Ok(Self {
            city: row.city.as_deref().map(str::parse::<City>).transpose().map_err(corrupt)?,
            category: row.category.parse().map_err(corrupt)?,
            priority: row.priority.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            image_urls: row.image_urls.0,
            id: row.id,
            user_id: row.user_id,
            complaint_text: row.complaint_text,
            department: row.department,
            summary: row.summary,
            created_at: row.created_at,
        })
    }
}

/// What a caller hands to the submission service.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub text: String,
    pub city: Option<String>,
    pub images: Vec<ImageUpload>,
}

/// Returned to the caller once a complaint is classified and stored.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub complaint_id: String,
    pub complaint_text: String,
    pub city: Option<City>,
    pub analysis: AnalysisResult,
    pub image_urls: Vec<String>,
    pub status: ComplaintStatus,
}
