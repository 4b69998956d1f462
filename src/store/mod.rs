//! The data store: typed entity collections over a file-backed JSON
//! key-value layer, with read-time relationship resolution.
//!
//! Persistence is whole-collection: every mutation reads a collection,
//! changes it in memory, and writes the entire collection back. A
//! `write_lock` serializes read-modify-write cycles inside this
//! process; a second process pointed at the same data directory still
//! races with last-write-wins at collection granularity.
//!
//! Absence is signaled with `Option`/`bool` returns, never an error.
//! Referential integrity is a caller responsibility: deleting a
//! company or category here succeeds even when jobs still reference
//! it, and enrichment then resolves the reference to `None`.

pub mod backup;
pub mod kv;
pub mod models;
pub mod query;
pub mod seed;

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use self::kv::JsonKv;
use self::models::*;

pub(crate) mod keys {
    pub const USERS: &str = "job-board-users";
    pub const COMPANIES: &str = "job-board-companies";
    pub const CATEGORIES: &str = "job-board-categories";
    pub const JOBS: &str = "job-board-jobs";
    pub const APPLICATIONS: &str = "job-board-applications";
    pub const CURRENT_USER: &str = "job-board-current-user";
    pub const PREFERENCES: &str = "job-board-user-preferences";
    pub const SAVED_JOBS: &str = "job-board-saved-jobs";
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
        }
    }
}

pub struct Store {
    kv: JsonKv,
    write_lock: Mutex<()>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Derive a URL-safe slug: lowercase, runs of non-alphanumerics
/// collapsed to a single hyphen, no leading or trailing hyphen.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut gap = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    slug
}

fn enrich_job(
    job: Job,
    companies: &[Company],
    categories: &[Category],
    applications: &[Application],
) -> JobView {
    let company = companies.iter().find(|c| c.id == job.company_id).cloned();
    let category = categories.iter().find(|c| c.id == job.category_id).cloned();
    let application_count = applications.iter().filter(|a| a.job_id == job.id).count() as i64;
    JobView {
        job,
        company,
        category,
        application_count,
    }
}

impl Store {
    pub fn open(config: StoreConfig) -> Self {
        Self {
            kv: JsonKv::open(config.data_dir),
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.kv.is_available()
    }

    pub(crate) fn kv(&self) -> &JsonKv {
        &self.kv
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a collection, seeding and persisting the defaults the first
    /// time nothing is stored under the key.
    fn collection<T>(&self, key: &str, seed: fn() -> Vec<T>) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.kv.load::<Vec<T>>(key) {
            Some(items) => items,
            None => {
                let items = seed();
                self.kv.set(key, &items);
                items
            }
        }
    }

    // ========================================================================
    // Raw collections (stored representation, foreign keys only)
    // ========================================================================

    pub fn users(&self) -> Vec<User> {
        self.collection(keys::USERS, seed::users)
    }

    pub fn set_users(&self, users: &[User]) -> bool {
        self.kv.set(keys::USERS, users)
    }

    pub fn companies(&self) -> Vec<Company> {
        self.collection(keys::COMPANIES, seed::companies)
    }

    pub fn set_companies(&self, companies: &[Company]) -> bool {
        self.kv.set(keys::COMPANIES, companies)
    }

    pub fn categories(&self) -> Vec<Category> {
        self.collection(keys::CATEGORIES, seed::categories)
    }

    pub fn set_categories(&self, categories: &[Category]) -> bool {
        self.kv.set(keys::CATEGORIES, categories)
    }

    pub fn jobs_raw(&self) -> Vec<Job> {
        self.collection(keys::JOBS, seed::jobs)
    }

    pub fn set_jobs(&self, jobs: &[Job]) -> bool {
        self.kv.set(keys::JOBS, jobs)
    }

    pub fn applications_raw(&self) -> Vec<Application> {
        self.collection(keys::APPLICATIONS, seed::applications)
    }

    pub fn set_applications(&self, applications: &[Application]) -> bool {
        self.kv.set(keys::APPLICATIONS, applications)
    }

    // ========================================================================
    // Enriched reads
    // ========================================================================

    /// All jobs with company, category, and application count resolved.
    pub fn jobs(&self) -> Vec<JobView> {
        let companies = self.companies();
        let categories = self.categories();
        let applications = self.applications_raw();
        self.jobs_raw()
            .into_iter()
            .map(|job| enrich_job(job, &companies, &categories, &applications))
            .collect()
    }

    /// All applications with their (already enriched) job attached.
    pub fn applications(&self) -> Vec<ApplicationView> {
        let jobs = self.jobs();
        self.applications_raw()
            .into_iter()
            .map(|application| {
                let job = jobs.iter().find(|j| j.job.id == application.job_id).cloned();
                ApplicationView { application, job }
            })
            .collect()
    }

    pub fn find_job(&self, id: &str) -> Option<JobView> {
        self.jobs().into_iter().find(|j| j.job.id == id)
    }

    pub fn find_company(&self, id: &str) -> Option<Company> {
        self.companies().into_iter().find(|c| c.id == id)
    }

    pub fn find_category(&self, id: &str) -> Option<Category> {
        self.categories().into_iter().find(|c| c.id == id)
    }

    pub fn find_application(&self, id: &str) -> Option<ApplicationView> {
        self.applications().into_iter().find(|a| a.application.id == id)
    }

    pub fn find_user(&self, id: &str) -> Option<User> {
        self.users().into_iter().find(|u| u.id == id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users()
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Jobs still referencing this company. Used by callers that choose
    /// to refuse deletion; the delete primitive itself does not check.
    pub fn company_job_count(&self, company_id: &str) -> usize {
        self.jobs_raw().iter().filter(|j| j.company_id == company_id).count()
    }

    pub fn category_job_count(&self, category_id: &str) -> usize {
        self.jobs_raw().iter().filter(|j| j.category_id == category_id).count()
    }

    // ========================================================================
    // Job CRUD
    // ========================================================================

    pub fn create_job(&self, new: NewJob) -> JobView {
        let _guard = self.lock();
        let now = Utc::now();
        let job = Job {
            id: new_id(),
            slug: slugify(&new.title),
            title: new.title,
            description: new.description,
            requirements: new.requirements,
            benefits: new.benefits,
            location: new.location,
            remote: new.remote,
            salary_min: new.salary_min,
            salary_max: new.salary_max,
            currency: new.currency,
            job_type: new.job_type,
            experience: new.experience,
            status: new.status,
            featured: new.featured,
            company_id: new.company_id,
            category_id: new.category_id,
            views: 0,
            deadline: new.deadline,
            created_at: now,
            updated_at: now,
        };
        let mut jobs = self.jobs_raw();
        jobs.push(job.clone());
        self.set_jobs(&jobs);
        enrich_job(job, &self.companies(), &self.categories(), &self.applications_raw())
    }

    pub fn update_job(&self, id: &str, patch: UpdateJob) -> Option<JobView> {
        let _guard = self.lock();
        let mut jobs = self.jobs_raw();
        let job = jobs.iter_mut().find(|j| j.id == id)?;
        if let Some(v) = patch.title {
            job.title = v;
        }
        if let Some(v) = patch.description {
            job.description = v;
        }
        if let Some(v) = patch.requirements {
            job.requirements = v;
        }
        if let Some(v) = patch.benefits {
            job.benefits = v;
        }
        if let Some(v) = patch.location {
            job.location = v;
        }
        if let Some(v) = patch.remote {
            job.remote = v;
        }
        if let Some(v) = patch.salary_min {
            job.salary_min = Some(v);
        }
        if let Some(v) = patch.salary_max {
            job.salary_max = Some(v);
        }
        if let Some(v) = patch.currency {
            job.currency = v;
        }
        if let Some(v) = patch.job_type {
            job.job_type = v;
        }
        if let Some(v) = patch.experience {
            job.experience = v;
        }
        if let Some(v) = patch.status {
            job.status = v;
        }
        if let Some(v) = patch.featured {
            job.featured = v;
        }
        if let Some(v) = patch.company_id {
            job.company_id = v;
        }
        if let Some(v) = patch.category_id {
            job.category_id = v;
        }
        if let Some(v) = patch.deadline {
            job.deadline = Some(v);
        }
        job.updated_at = Utc::now();
        let updated = job.clone();
        self.set_jobs(&jobs);
        Some(enrich_job(
            updated,
            &self.companies(),
            &self.categories(),
            &self.applications_raw(),
        ))
    }

    pub fn delete_job(&self, id: &str) -> bool {
        let _guard = self.lock();
        let mut jobs = self.jobs_raw();
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        if jobs.len() == before {
            return false;
        }
        self.set_jobs(&jobs)
    }

    /// Bump the views counter, returning the refreshed view.
    pub fn record_job_view(&self, id: &str) -> Option<JobView> {
        let _guard = self.lock();
        let mut jobs = self.jobs_raw();
        let job = jobs.iter_mut().find(|j| j.id == id)?;
        job.views += 1;
        let viewed = job.clone();
        self.set_jobs(&jobs);
        Some(enrich_job(
            viewed,
            &self.companies(),
            &self.categories(),
            &self.applications_raw(),
        ))
    }

    // ========================================================================
    // Company CRUD
    // ========================================================================

    pub fn create_company(&self, new: NewCompany) -> Company {
        let _guard = self.lock();
        let now = Utc::now();
        let company = Company {
            id: new_id(),
            name: new.name,
            description: new.description,
            logo: new.logo,
            website: new.website,
            size: new.size,
            industry: new.industry,
            location: new.location,
            founded_year: new.founded_year,
            verified: new.verified,
            created_at: now,
            updated_at: now,
        };
        let mut companies = self.companies();
        companies.push(company.clone());
        self.set_companies(&companies);
        company
    }

    pub fn update_company(&self, id: &str, patch: UpdateCompany) -> Option<Company> {
        let _guard = self.lock();
        let mut companies = self.companies();
        let company = companies.iter_mut().find(|c| c.id == id)?;
        if let Some(v) = patch.name {
            company.name = v;
        }
        if let Some(v) = patch.description {
            company.description = v;
        }
        if let Some(v) = patch.logo {
            company.logo = Some(v);
        }
        if let Some(v) = patch.website {
            company.website = Some(v);
        }
        if let Some(v) = patch.size {
            company.size = v;
        }
        if let Some(v) = patch.industry {
            company.industry = v;
        }
        if let Some(v) = patch.location {
            company.location = v;
        }
        if let Some(v) = patch.founded_year {
            company.founded_year = Some(v);
        }
        if let Some(v) = patch.verified {
            company.verified = v;
        }
        company.updated_at = Utc::now();
        let updated = company.clone();
        self.set_companies(&companies);
        Some(updated)
    }

    pub fn delete_company(&self, id: &str) -> bool {
        let _guard = self.lock();
        let mut companies = self.companies();
        let before = companies.len();
        companies.retain(|c| c.id != id);
        if companies.len() == before {
            return false;
        }
        self.set_companies(&companies)
    }

    // ========================================================================
    // Category CRUD
    // ========================================================================

    pub fn create_category(&self, new: NewCategory) -> Category {
        let _guard = self.lock();
        let now = Utc::now();
        let category = Category {
            id: new_id(),
            slug: slugify(&new.name),
            name: new.name,
            description: new.description,
            color: new.color,
            icon: new.icon,
            created_at: now,
            updated_at: now,
        };
        let mut categories = self.categories();
        categories.push(category.clone());
        self.set_categories(&categories);
        category
    }

    pub fn update_category(&self, id: &str, patch: UpdateCategory) -> Option<Category> {
        let _guard = self.lock();
        let mut categories = self.categories();
        let category = categories.iter_mut().find(|c| c.id == id)?;
        if let Some(v) = patch.name {
            category.name = v;
        }
        if let Some(v) = patch.description {
            category.description = Some(v);
        }
        if let Some(v) = patch.color {
            category.color = v;
        }
        if let Some(v) = patch.icon {
            category.icon = Some(v);
        }
        category.updated_at = Utc::now();
        let updated = category.clone();
        self.set_categories(&categories);
        Some(updated)
    }

    pub fn delete_category(&self, id: &str) -> bool {
        let _guard = self.lock();
        let mut categories = self.categories();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return false;
        }
        self.set_categories(&categories)
    }

    // ========================================================================
    // Application CRUD
    // ========================================================================

    pub fn create_application(&self, new: NewApplication) -> ApplicationView {
        let _guard = self.lock();
        let now = Utc::now();
        let application = Application {
            id: new_id(),
            job_id: new.job_id,
            applicant_name: new.applicant_name,
            applicant_email: new.applicant_email,
            applicant_phone: new.applicant_phone,
            resume: new.resume,
            cover_letter: new.cover_letter,
            status: ApplicationStatus::Pending,
            notes: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        let mut applications = self.applications_raw();
        applications.push(application.clone());
        self.set_applications(&applications);
        let job = self.find_job(&application.job_id);
        ApplicationView { application, job }
    }

    pub fn update_application(&self, id: &str, patch: UpdateApplication) -> Option<ApplicationView> {
        let _guard = self.lock();
        let mut applications = self.applications_raw();
        let application = applications.iter_mut().find(|a| a.id == id)?;
        if let Some(v) = patch.status {
            application.status = v;
        }
        if let Some(v) = patch.notes {
            application.notes = Some(v);
        }
        if let Some(v) = patch.reviewed_by {
            application.reviewed_by = Some(v);
        }
        if let Some(v) = patch.reviewed_at {
            application.reviewed_at = Some(v);
        }
        application.updated_at = Utc::now();
        let updated = application.clone();
        self.set_applications(&applications);
        let job = self.find_job(&updated.job_id);
        Some(ApplicationView {
            application: updated,
            job,
        })
    }

    pub fn delete_application(&self, id: &str) -> bool {
        let _guard = self.lock();
        let mut applications = self.applications_raw();
        let before = applications.len();
        applications.retain(|a| a.id != id);
        if applications.len() == before {
            return false;
        }
        self.set_applications(&applications)
    }

    // ========================================================================
    // User CRUD
    // ========================================================================

    /// Returns `None` when the email is already registered.
    pub fn create_user(&self, new: NewUser) -> Option<User> {
        let _guard = self.lock();
        let mut users = self.users();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&new.email)) {
            return None;
        }
        let now = Utc::now();
        let user = User {
            id: new_id(),
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            role: new.role,
            avatar: None,
            company_id: new.company_id,
            profile: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        self.set_users(&users);
        Some(user)
    }

    pub fn update_user(&self, id: &str, patch: UpdateUser) -> Option<User> {
        let _guard = self.lock();
        let mut users = self.users();
        let user = users.iter_mut().find(|u| u.id == id)?;
        if let Some(v) = patch.name {
            user.name = v;
        }
        if let Some(v) = patch.avatar {
            user.avatar = Some(v);
        }
        if let Some(v) = patch.role {
            user.role = v;
        }
        if let Some(v) = patch.company_id {
            user.company_id = Some(v);
        }
        if let Some(v) = patch.profile {
            user.profile = Some(v);
        }
        user.updated_at = Utc::now();
        let updated = user.clone();
        self.set_users(&users);
        Some(updated)
    }

    pub fn delete_user(&self, id: &str) -> bool {
        let _guard = self.lock();
        let mut users = self.users();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return false;
        }
        self.set_users(&users)
    }

    // ========================================================================
    // Current user, saved jobs, preferences
    // ========================================================================

    pub fn current_user(&self) -> Option<User> {
        self.kv.load(keys::CURRENT_USER)
    }

    pub fn set_current_user(&self, user: Option<&User>) -> bool {
        match user {
            Some(user) => self.kv.set(keys::CURRENT_USER, user),
            None => {
                self.kv.remove(keys::CURRENT_USER);
                true
            }
        }
    }

    pub fn saved_jobs(&self, user_id: &str) -> Vec<SavedJob> {
        let all: SavedJobsMap = self.kv.get(keys::SAVED_JOBS, SavedJobsMap::new());
        all.get(user_id).cloned().unwrap_or_default()
    }

    /// Idempotent: saving an already-saved job reports success.
    pub fn save_job(&self, user_id: &str, job_id: &str) -> bool {
        let _guard = self.lock();
        let mut all: SavedJobsMap = self.kv.get(keys::SAVED_JOBS, SavedJobsMap::new());
        let entries = all.entry(user_id.to_string()).or_default();
        if entries.iter().any(|s| s.job_id == job_id) {
            return true;
        }
        entries.push(SavedJob {
            job_id: job_id.to_string(),
            user_id: user_id.to_string(),
            saved_at: Utc::now(),
        });
        self.kv.set(keys::SAVED_JOBS, &all)
    }

    pub fn unsave_job(&self, user_id: &str, job_id: &str) -> bool {
        let _guard = self.lock();
        let mut all: SavedJobsMap = self.kv.get(keys::SAVED_JOBS, SavedJobsMap::new());
        match all.get_mut(user_id) {
            Some(entries) => {
                entries.retain(|s| s.job_id != job_id);
                self.kv.set(keys::SAVED_JOBS, &all)
            }
            None => true,
        }
    }

    pub fn is_job_saved(&self, user_id: &str, job_id: &str) -> bool {
        self.saved_jobs(user_id).iter().any(|s| s.job_id == job_id)
    }

    pub fn preferences(&self, user_id: &str) -> UserPreferences {
        let all: PreferencesMap = self.kv.get(keys::PREFERENCES, PreferencesMap::new());
        all.get(user_id).cloned().unwrap_or_default()
    }

    /// Merge a partial preferences record into the stored one.
    pub fn set_preferences(&self, user_id: &str, patch: UserPreferences) -> bool {
        let _guard = self.lock();
        let mut all: PreferencesMap = self.kv.get(keys::PREFERENCES, PreferencesMap::new());
        all.entry(user_id.to_string()).or_default().merge(patch);
        self.kv.set(keys::PREFERENCES, &all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn test_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(StoreConfig {
            data_dir: dir.path().to_path_buf(),
        });
        (store, dir)
    }

    fn sample_job(title: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            description: "A role".into(),
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
            deadline: None,
        }
    }

    #[test]
    fn first_read_seeds_and_persists_defaults() {
        let (store, _dir) = test_store();
        assert_eq!(store.jobs_raw().len(), 3);
        assert!(store.kv().contains(keys::JOBS));
        assert_eq!(store.categories().len(), 5);
        assert_eq!(store.companies().len(), 4);
    }

    #[test]
    fn slugify_strips_punctuation_and_collapses_hyphens() {
        assert_eq!(slugify("Engineering & Ops!"), "engineering-ops");
        assert_eq!(slugify("  Senior   Developer  "), "senior-developer");
        assert_eq!(slugify("C++ / Rust"), "c-rust");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn create_job_derives_slug_and_stamps_timestamps() {
        let (store, _dir) = test_store();
        let created = store.create_job(sample_job("Staff Engineer, Platform"));
        assert_eq!(created.job.slug, "staff-engineer-platform");
        assert_eq!(created.job.views, 0);
        assert_eq!(created.job.created_at, created.job.updated_at);
        assert!(store.find_job(&created.job.id).is_some());
    }

    #[test]
    fn update_with_empty_patch_touches_only_updated_at() {
        let (store, _dir) = test_store();
        let created = store.create_job(sample_job("Engineer"));
        std::thread::sleep(std::time::Duration::from_millis(5));
        let updated = store.update_job(&created.job.id, UpdateJob::default()).unwrap();
        assert!(updated.job.updated_at > created.job.updated_at);
        let (mut a, mut b) = (created.job, updated.job);
        a.updated_at = b.updated_at;
        b.updated_at = a.updated_at;
        assert_eq!(a, b);
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let (store, _dir) = test_store();
        assert!(store.update_job("nope", UpdateJob::default()).is_none());
        assert!(store.update_company("nope", UpdateCompany::default()).is_none());
        assert!(store.update_application("nope", UpdateApplication::default()).is_none());
    }

    #[test]
    fn application_count_tracks_application_records() {
        let (store, _dir) = test_store();
        let before = store.find_job("job-1").unwrap().application_count;
        let created = store.create_application(NewApplication {
            job_id: "job-1".into(),
            applicant_name: "Ada".into(),
            applicant_email: "ada@example.com".into(),
            applicant_phone: None,
            resume: None,
            cover_letter: None,
        });
        assert_eq!(store.find_job("job-1").unwrap().application_count, before + 1);

        assert!(store.delete_application(&created.application.id));
        assert_eq!(store.find_job("job-1").unwrap().application_count, before);

        // Unknown id: false, counts untouched.
        assert!(!store.delete_application("missing"));
        assert_eq!(store.find_job("job-1").unwrap().application_count, before);
    }

    #[test]
    fn application_for_vanished_job_is_accepted_and_unenriched() {
        let (store, _dir) = test_store();
        let created = store.create_application(NewApplication {
            job_id: "no-such-job".into(),
            applicant_name: "Ada".into(),
            applicant_email: "ada@example.com".into(),
            applicant_phone: None,
            resume: None,
            cover_letter: None,
        });
        assert!(created.job.is_none());
        assert!(store.find_application(&created.application.id).is_some());
    }

    #[test]
    fn enrichment_yields_none_for_dangling_references() {
        let (store, _dir) = test_store();
        let mut job = sample_job("Orphan");
        job.company_id = "ghost-company".into();
        job.category_id = "ghost-category".into();
        let created = store.create_job(job);
        assert!(created.company.is_none());
        assert!(created.category.is_none());
    }

    #[test]
    fn store_level_delete_ignores_dependent_jobs() {
        // Integrity is a caller responsibility: the primitive succeeds
        // even while jobs still reference the company.
        let (store, _dir) = test_store();
        assert!(store.company_job_count("company-1") >= 1);
        assert!(store.delete_company("company-1"));
        let job = store.find_job("job-1").unwrap();
        assert!(job.company.is_none());
    }

    #[test]
    fn delete_returns_false_for_unknown_ids() {
        let (store, _dir) = test_store();
        assert!(!store.delete_job("missing"));
        assert!(!store.delete_company("missing"));
        assert!(!store.delete_category("missing"));
        assert!(!store.delete_user("missing"));
    }

    #[test]
    fn record_job_view_increments_views() {
        let (store, _dir) = test_store();
        let before = store.find_job("job-1").unwrap().job.views;
        let viewed = store.record_job_view("job-1").unwrap();
        assert_eq!(viewed.job.views, before + 1);
        assert!(store.record_job_view("missing").is_none());
    }

    #[test]
    fn finders_resolve_seeded_ids() {
        let (store, _dir) = test_store();
        assert!(store.find_category("cat-1").is_some());
        assert!(store.find_company("company-1").is_some());
        assert!(store.find_user("admin-1").is_some());
        assert!(store.find_category("missing").is_none());
    }

    #[test]
    fn update_user_can_change_role_and_profile() {
        let (store, _dir) = test_store();
        let updated = store
            .update_user(
                "user-1",
                UpdateUser {
                    role: Some(UserRole::Company),
                    company_id: Some("company-2".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.role, UserRole::Company);
        assert_eq!(updated.company_id.as_deref(), Some("company-2"));
        // Untouched fields survive the merge.
        assert_eq!(updated.email, "john@example.com");
    }

    #[test]
    fn duplicate_email_registration_is_rejected() {
        let (store, _dir) = test_store();
        let user = NewUser {
            email: "Admin@JobBoard.com".into(),
            password_hash: "$2b$04$hash".into(),
            name: "Dup".into(),
            role: UserRole::Applicant,
            company_id: None,
        };
        assert!(store.create_user(user).is_none());
    }

    #[test]
    fn save_job_is_idempotent_per_user() {
        let (store, _dir) = test_store();
        assert!(store.save_job("user-1", "job-1"));
        assert!(store.save_job("user-1", "job-1"));
        assert_eq!(store.saved_jobs("user-1").len(), 1);
        assert!(store.is_job_saved("user-1", "job-1"));
        assert!(!store.is_job_saved("user-2", "job-1"));

        assert!(store.unsave_job("user-1", "job-1"));
        assert!(store.saved_jobs("user-1").is_empty());
        // Unsaving for a user with no entries is a no-op success.
        assert!(store.unsave_job("user-3", "job-1"));
    }

    #[test]
    fn preferences_merge_and_persist_per_user() {
        let (store, _dir) = test_store();
        store.set_preferences(
            "user-1",
            UserPreferences {
                theme: Some("dark".into()),
                job_alerts: Some(true),
                ..Default::default()
            },
        );
        store.set_preferences(
            "user-1",
            UserPreferences {
                theme: Some("light".into()),
                ..Default::default()
            },
        );
        let prefs = store.preferences("user-1");
        assert_eq!(prefs.theme.as_deref(), Some("light"));
        assert_eq!(prefs.job_alerts, Some(true));
        assert_eq!(store.preferences("user-2"), UserPreferences::default());
    }

    #[test]
    fn public_search_sees_only_published_jobs() {
        use super::query::{search_jobs, JobFilter, JobSort};

        let (store, _dir) = test_store();
        store
            .update_job(
                "job-3",
                UpdateJob {
                    status: Some(JobStatus::Draft),
                    ..Default::default()
                },
            )
            .unwrap();

        let page = search_jobs(store.jobs(), &JobFilter::published(), JobSort::Newest, 1, 20);
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|j| j.job.status == JobStatus::Published));
        assert!(page.items.iter().all(|j| j.job.id != "job-3"));
    }

    #[test]
    fn current_user_set_get_clear() {
        let (store, _dir) = test_store();
        let user = store.find_user("admin-1").unwrap();
        assert!(store.set_current_user(Some(&user)));
        assert_eq!(store.current_user().unwrap().id, "admin-1");
        assert!(store.set_current_user(None));
        assert!(store.current_user().is_none());
    }
}
