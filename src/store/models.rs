//! Entity models persisted by the store, plus the enriched read-time
//! views and the create/update payload shapes used by handlers.
//!
//! All wire names are camelCase; enum variants travel as
//! SCREAMING_SNAKE_CASE strings matching the public API.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Company,
    Applicant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanySize {
    Startup,
    Small,
    Medium,
    Large,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    EntryLevel,
    MidLevel,
    SeniorLevel,
    Executive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
    Hired,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Company => "COMPANY",
            Self::Applicant => "APPLICANT",
        }
    }
}

impl FromStr for UserRole {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "COMPANY" => Ok(Self::Company),
            "APPLICANT" => Ok(Self::Applicant),
            _ => Err(()),
        }
    }
}

impl FromStr for CompanySize {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STARTUP" => Ok(Self::Startup),
            "SMALL" => Ok(Self::Small),
            "MEDIUM" => Ok(Self::Medium),
            "LARGE" => Ok(Self::Large),
            "ENTERPRISE" => Ok(Self::Enterprise),
            _ => Err(()),
        }
    }
}

impl FromStr for JobType {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FULL_TIME" => Ok(Self::FullTime),
            "PART_TIME" => Ok(Self::PartTime),
            "CONTRACT" => Ok(Self::Contract),
            "FREELANCE" => Ok(Self::Freelance),
            "INTERNSHIP" => Ok(Self::Internship),
            _ => Err(()),
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENTRY_LEVEL" => Ok(Self::EntryLevel),
            "MID_LEVEL" => Ok(Self::MidLevel),
            "SENIOR_LEVEL" => Ok(Self::SeniorLevel),
            "EXECUTIVE" => Ok(Self::Executive),
            _ => Err(()),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "PUBLISHED" => Ok(Self::Published),
            "CLOSED" => Ok(Self::Closed),
            "ARCHIVED" => Ok(Self::Archived),
            _ => Err(()),
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "REVIEWED" => Ok(Self::Reviewed),
            "SHORTLISTED" => Ok(Self::Shortlisted),
            "REJECTED" => Ok(Self::Rejected),
            "HIRED" => Ok(Self::Hired),
            _ => Err(()),
        }
    }
}

// ============================================================================
// Stored entities
// ============================================================================

/// Applicant profile sub-record carried on a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// bcrypt hash; plaintext never touches the store.
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub size: CompanySize,
    pub industry: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i32>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job posting as persisted. Foreign keys only; the company/category
/// records and the application count are attached at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub requirements: String,
    pub benefits: String,
    pub location: String,
    pub remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i64>,
    pub currency: String,
    pub job_type: JobType,
    pub experience: ExperienceLevel,
    pub status: JobStatus,
    pub featured: bool,
    pub company_id: String,
    pub category_id: String,
    pub views: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub applicant_name: String,
    pub applicant_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Read-time views (enriched records)
// ============================================================================

/// A job with its related records resolved. `application_count` is
/// recomputed from the applications collection on every read, so it
/// cannot drift from the records it summarizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub application_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobView>,
}

// ============================================================================
// Per-user side records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJob {
    pub job_id: String,
    pub user_id: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_alerts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_locations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_job_types: Option<Vec<String>>,
}

impl UserPreferences {
    /// Merge `patch` into self; only fields present in the patch change.
    pub fn merge(&mut self, patch: UserPreferences) {
        if patch.theme.is_some() {
            self.theme = patch.theme;
        }
        if patch.email_notifications.is_some() {
            self.email_notifications = patch.email_notifications;
        }
        if patch.job_alerts.is_some() {
            self.job_alerts = patch.job_alerts;
        }
        if patch.profile_visibility.is_some() {
            self.profile_visibility = patch.profile_visibility;
        }
        if patch.preferred_locations.is_some() {
            self.preferred_locations = patch.preferred_locations;
        }
        if patch.preferred_job_types.is_some() {
            self.preferred_job_types = patch.preferred_job_types;
        }
    }
}

/// Saved-jobs storage shape: user id -> saved entries.
pub type SavedJobsMap = HashMap<String, Vec<SavedJob>>;
/// Preferences storage shape: user id -> preferences.
pub type PreferencesMap = HashMap<String, UserPreferences>;

// ============================================================================
// Create / update payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub benefits: String,
    pub location: String,
    #[serde(default)]
    pub remote: bool,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub job_type: JobType,
    pub experience: ExperienceLevel,
    #[serde(default = "default_job_status")]
    pub status: JobStatus,
    #[serde(default)]
    pub featured: bool,
    pub company_id: String,
    pub category_id: String,
    pub deadline: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_job_status() -> JobStatus {
    JobStatus::Draft
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJob {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub currency: Option<String>,
    pub job_type: Option<JobType>,
    pub experience: Option<ExperienceLevel>,
    pub status: Option<JobStatus>,
    pub featured: Option<bool>,
    pub company_id: Option<String>,
    pub category_id: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub size: CompanySize,
    pub industry: String,
    pub location: String,
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub size: Option<CompanySize>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub founded_year: Option<i32>,
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_category_color")]
    pub color: String,
    pub icon: Option<String>,
}

fn default_category_color() -> String {
    "#3B82F6".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub job_id: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: Option<String>,
    pub resume: Option<String>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplication {
    pub status: Option<ApplicationStatus>,
    pub notes: Option<String>,
    pub reviewed_by: Option<String>,
    #[serde(skip)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Store-level user creation payload; the password is hashed by the
/// caller before it gets here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<UserRole>,
    pub company_id: Option<String>,
    pub profile: Option<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_wire_names() {
        let json = serde_json::to_string(&JobType::FullTime).unwrap();
        assert_eq!(json, "\"FULL_TIME\"");
        let back: JobType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, JobType::FullTime);

        assert_eq!("SENIOR_LEVEL".parse::<ExperienceLevel>(), Ok(ExperienceLevel::SeniorLevel));
        assert_eq!("FREELANCE".parse::<JobType>(), Ok(JobType::Freelance));
        assert!("TEMP".parse::<JobType>().is_err());
    }

    #[test]
    fn job_view_serializes_flattened() {
        let now = Utc::now();
        let view = JobView {
            job: Job {
                id: "job-1".into(),
                title: "Engineer".into(),
                slug: "engineer".into(),
                description: String::new(),
                requirements: String::new(),
                benefits: String::new(),
                location: "Remote".into(),
                remote: true,
                salary_min: None,
                salary_max: None,
                currency: "USD".into(),
                job_type: JobType::FullTime,
                experience: ExperienceLevel::MidLevel,
                status: JobStatus::Published,
                featured: false,
                company_id: "company-1".into(),
                category_id: "cat-1".into(),
                views: 0,
                deadline: None,
                created_at: now,
                updated_at: now,
            },
            company: None,
            category: None,
            application_count: 3,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["title"], "Engineer");
        assert_eq!(value["applicationCount"], 3);
        assert_eq!(value["jobType"], "FULL_TIME");
    }

    #[test]
    fn preferences_merge_only_overwrites_present_fields() {
        let mut prefs = UserPreferences {
            theme: Some("dark".into()),
            email_notifications: Some(true),
            ..Default::default()
        };
        prefs.merge(UserPreferences {
            theme: Some("light".into()),
            ..Default::default()
        });
        assert_eq!(prefs.theme.as_deref(), Some("light"));
        assert_eq!(prefs.email_notifications, Some(true));
    }
}
