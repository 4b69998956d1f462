//! Whole-state export/import plus the admin reset/clear actions.
//!
//! An export is one JSON document carrying every collection and the
//! per-user side records. Import accepts a superset document and
//! overwrites only the keys present in it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Application, Category, Company, Job, PreferencesMap, SavedJobsMap, User};
use super::{keys, seed, Store};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companies: Option<Vec<Company>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<Job>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications: Option<Vec<Application>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_preferences: Option<PreferencesMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_jobs: Option<SavedJobsMap>,
    pub exported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStats {
    pub users: usize,
    pub companies: usize,
    pub categories: usize,
    pub jobs: usize,
    pub applications: usize,
}

impl Store {
    pub fn stats(&self) -> DataStats {
        DataStats {
            users: self.users().len(),
            companies: self.companies().len(),
            categories: self.categories().len(),
            jobs: self.jobs_raw().len(),
            applications: self.applications_raw().len(),
        }
    }

    /// Snapshot the entire state as a single document. Collections are
    /// exported in their stored form (foreign keys, no enrichment).
    pub fn export_data(&self) -> ExportDocument {
        ExportDocument {
            users: Some(self.users()),
            companies: Some(self.companies()),
            categories: Some(self.categories()),
            jobs: Some(self.jobs_raw()),
            applications: Some(self.applications_raw()),
            current_user: self.current_user(),
            user_preferences: Some(self.kv().get(keys::PREFERENCES, PreferencesMap::new())),
            saved_jobs: Some(self.kv().get(keys::SAVED_JOBS, SavedJobsMap::new())),
            exported_at: Utc::now(),
        }
    }

    /// Overwrite the keys present in `doc`, leaving the rest untouched.
    pub fn import_data(&self, doc: &ExportDocument) -> bool {
        let mut ok = true;
        if let Some(users) = &doc.users {
            ok &= self.set_users(users);
        }
        if let Some(companies) = &doc.companies {
            ok &= self.set_companies(companies);
        }
        if let Some(categories) = &doc.categories {
            ok &= self.set_categories(categories);
        }
        if let Some(jobs) = &doc.jobs {
            ok &= self.set_jobs(jobs);
        }
        if let Some(applications) = &doc.applications {
            ok &= self.set_applications(applications);
        }
        if let Some(user) = &doc.current_user {
            ok &= self.set_current_user(Some(user));
        }
        if let Some(preferences) = &doc.user_preferences {
            ok &= self.kv().set(keys::PREFERENCES, preferences);
        }
        if let Some(saved) = &doc.saved_jobs {
            ok &= self.kv().set(keys::SAVED_JOBS, saved);
        }
        ok
    }

    /// Reset every collection to the built-in seed data.
    pub fn reset_data(&self) -> DataStats {
        self.set_users(&seed::users());
        self.set_companies(&seed::companies());
        self.set_categories(&seed::categories());
        self.set_jobs(&seed::jobs());
        self.set_applications(&seed::applications());
        self.stats()
    }

    /// Remove every stored key. The next read of each collection will
    /// re-seed it.
    pub fn clear_all(&self) -> bool {
        for key in [
            keys::USERS,
            keys::COMPANIES,
            keys::CATEGORIES,
            keys::JOBS,
            keys::APPLICATIONS,
            keys::CURRENT_USER,
            keys::PREFERENCES,
            keys::SAVED_JOBS,
        ] {
            self.kv().remove(key);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{NewApplication, UpdateJob, UserPreferences};
    use crate::store::tests::test_store;

    #[test]
    fn import_of_export_restores_equal_state() {
        let (store, _dir) = test_store();
        store.save_job("user-1", "job-1");
        store.set_preferences(
            "user-1",
            UserPreferences {
                theme: Some("dark".into()),
                ..Default::default()
            },
        );
        let snapshot = store.export_data();

        // Diverge from the snapshot, then restore it.
        store.update_job("job-1", UpdateJob {
            title: Some("Altered".into()),
            ..Default::default()
        });
        store.delete_company("company-4");
        store.unsave_job("user-1", "job-1");

        assert!(store.import_data(&snapshot));
        assert_eq!(Some(store.users()), snapshot.users);
        assert_eq!(Some(store.companies()), snapshot.companies);
        assert_eq!(Some(store.categories()), snapshot.categories);
        assert_eq!(Some(store.jobs_raw()), snapshot.jobs);
        assert_eq!(Some(store.applications_raw()), snapshot.applications);
        assert_eq!(store.saved_jobs("user-1").len(), 1);
        assert_eq!(store.preferences("user-1").theme.as_deref(), Some("dark"));
    }

    #[test]
    fn import_overwrites_only_present_keys() {
        let (store, _dir) = test_store();
        let companies_before = store.companies();
        let doc = ExportDocument {
            users: None,
            companies: None,
            categories: None,
            jobs: Some(vec![]),
            applications: None,
            current_user: None,
            user_preferences: None,
            saved_jobs: None,
            exported_at: Utc::now(),
        };
        assert!(store.import_data(&doc));
        assert!(store.jobs_raw().is_empty());
        assert_eq!(store.companies(), companies_before);
    }

    #[test]
    fn reset_restores_seed_counts() {
        let (store, _dir) = test_store();
        store.create_application(NewApplication {
            job_id: "job-1".into(),
            applicant_name: "Extra".into(),
            applicant_email: "extra@example.com".into(),
            applicant_phone: None,
            resume: None,
            cover_letter: None,
        });
        store.delete_job("job-3");
        let stats = store.reset_data();
        assert_eq!(stats.jobs, 3);
        assert_eq!(stats.applications, 3);
        assert_eq!(stats.categories, 5);
        assert_eq!(stats.companies, 4);
    }

    #[test]
    fn clear_all_removes_keys_and_reads_reseed() {
        let (store, _dir) = test_store();
        store.delete_job("job-1");
        assert_eq!(store.jobs_raw().len(), 2);
        assert!(store.clear_all());
        // Collections are gone; the next read seeds defaults again.
        assert_eq!(store.jobs_raw().len(), 3);
        assert!(store.current_user().is_none());
    }

    #[test]
    fn export_document_survives_json_round_trip() {
        let (store, _dir) = test_store();
        let doc = store.export_data();
        let json = serde_json::to_string(&doc).unwrap();
        let back: ExportDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.jobs, back.jobs);
        assert_eq!(doc.users, back.users);
        assert_eq!(doc.exported_at, back.exported_at);
    }
}
