//! The single filter/sort/paginate engine behind every listing
//! endpoint. All predicates combine with AND semantics; an empty
//! membership set means "no constraint".

use serde::{Deserialize, Serialize};

use super::models::{
    Company, CompanySize, ExperienceLevel, JobStatus, JobType, JobView,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

// ============================================================================
// Pagination
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Slice `items` to the requested 1-indexed page. A page past the end
/// yields empty items with the totals intact, never an error.
pub fn paginate<T>(items: Vec<T>, page: i64, limit: i64) -> Page<T> {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let page = page.max(1);
    let total = items.len() as i64;
    let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
    let offset = ((page - 1) * limit) as usize;
    let items = items
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .collect();
    Page {
        items,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages,
        },
    }
}

// ============================================================================
// Job search
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Case-insensitive substring over title, company name, description.
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_types: Vec<JobType>,
    pub experience: Vec<ExperienceLevel>,
    pub category_ids: Vec<String>,
    pub company_ids: Vec<String>,
    pub remote_only: bool,
    pub featured_only: bool,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    /// `Some(Published)` for public listings; `None` sees every status.
    pub status: Option<JobStatus>,
}

impl JobFilter {
    pub fn published() -> Self {
        Self {
            status: Some(JobStatus::Published),
            ..Default::default()
        }
    }

    pub fn matches(&self, job: &JobView) -> bool {
        if let Some(status) = self.status {
            if job.job.status != status {
                return false;
            }
        }
        if let Some(q) = self.search.as_deref().filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            let company_name = job
                .company
                .as_ref()
                .map(|c| c.name.to_lowercase())
                .unwrap_or_default();
            if !job.job.title.to_lowercase().contains(&q)
                && !company_name.contains(&q)
                && !job.job.description.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        if let Some(loc) = self.location.as_deref().filter(|l| !l.is_empty()) {
            if !job.job.location.to_lowercase().contains(&loc.to_lowercase()) {
                return false;
            }
        }
        if !self.job_types.is_empty() && !self.job_types.contains(&job.job.job_type) {
            return false;
        }
        if !self.experience.is_empty() && !self.experience.contains(&job.job.experience) {
            return false;
        }
        if !self.category_ids.is_empty() && !self.category_ids.contains(&job.job.category_id) {
            return false;
        }
        if !self.company_ids.is_empty() && !self.company_ids.contains(&job.job.company_id) {
            return false;
        }
        if self.remote_only && !job.job.remote {
            return false;
        }
        if self.featured_only && !job.job.featured {
            return false;
        }
        // Salary containment: both of the job's bounds must lie inside the
        // requested range. A job missing either bound never matches.
        if self.salary_min.is_some() || self.salary_max.is_some() {
            match (job.job.salary_min, job.job.salary_max) {
                (Some(lo), Some(hi)) => {
                    if let Some(min) = self.salary_min {
                        if lo < min {
                            return false;
                        }
                    }
                    if let Some(max) = self.salary_max {
                        if hi > max {
                            return false;
                        }
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSort {
    /// createdAt descending.
    #[default]
    Newest,
    /// salaryMax descending, missing treated as 0.
    SalaryHigh,
    /// salaryMin ascending, missing treated as 0.
    SalaryLow,
    /// applicationCount descending.
    MostApplications,
}

impl JobSort {
    /// Wire names used by the `sort` query parameter. Unknown values
    /// fall back to the default order.
    pub fn parse(s: &str) -> Self {
        match s {
            "salary-high" => Self::SalaryHigh,
            "salary-low" => Self::SalaryLow,
            "applications" => Self::MostApplications,
            _ => Self::Newest,
        }
    }

    fn apply(self, jobs: &mut [JobView]) {
        // Vec sort is stable, so ties keep their incoming order.
        match self {
            Self::Newest => jobs.sort_by(|a, b| b.job.created_at.cmp(&a.job.created_at)),
            Self::SalaryHigh => {
                jobs.sort_by(|a, b| b.job.salary_max.unwrap_or(0).cmp(&a.job.salary_max.unwrap_or(0)))
            }
            Self::SalaryLow => {
                jobs.sort_by(|a, b| a.job.salary_min.unwrap_or(0).cmp(&b.job.salary_min.unwrap_or(0)))
            }
            Self::MostApplications => {
                jobs.sort_by(|a, b| b.application_count.cmp(&a.application_count))
            }
        }
    }
}

pub fn search_jobs(
    jobs: Vec<JobView>,
    filter: &JobFilter,
    sort: JobSort,
    page: i64,
    limit: i64,
) -> Page<JobView> {
    let mut matched: Vec<JobView> = jobs.into_iter().filter(|j| filter.matches(j)).collect();
    sort.apply(&mut matched);
    paginate(matched, page, limit)
}

// ============================================================================
// Company search
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    pub industry: Option<String>,
    pub size: Option<CompanySize>,
    pub verified_only: bool,
}

impl CompanyFilter {
    pub fn matches(&self, company: &Company) -> bool {
        if let Some(q) = self.search.as_deref().filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            if !company.name.to_lowercase().contains(&q)
                && !company.description.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        if let Some(industry) = self.industry.as_deref().filter(|i| !i.is_empty()) {
            if !company.industry.eq_ignore_ascii_case(industry) {
                return false;
            }
        }
        if let Some(size) = self.size {
            if company.size != size {
                return false;
            }
        }
        if self.verified_only && !company.verified {
            return false;
        }
        true
    }
}

pub fn search_companies(
    companies: Vec<Company>,
    filter: &CompanyFilter,
    page: i64,
    limit: i64,
) -> Page<Company> {
    let matched: Vec<Company> = companies.into_iter().filter(|c| filter.matches(c)).collect();
    paginate(matched, page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{Job, JobStatus};
    use chrono::{Duration, Utc};

    fn job(id: &str, title: &str) -> JobView {
        let now = Utc::now();
        JobView {
            job: Job {
                id: id.to_string(),
                title: title.to_string(),
                slug: id.to_string(),
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
            application_count: 0,
        }
    }

    #[test]
    fn filters_combine_conjunctively_and_output_is_a_subset() {
        let mut a = job("a", "Rust Engineer");
        a.job.location = "Berlin".into();
        let mut b = job("b", "Rust Engineer");
        b.job.location = "Lisbon".into();
        let c = job("c", "Gardener");

        let filter = JobFilter {
            search: Some("rust".into()),
            location: Some("berlin".into()),
            status: Some(JobStatus::Published),
            ..Default::default()
        };
        let page = search_jobs(vec![a, b, c], &filter, JobSort::Newest, 1, 20);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].job.id, "a");
        for item in &page.items {
            assert!(filter.matches(item));
        }
    }

    #[test]
    fn empty_membership_set_means_no_constraint() {
        let jobs = vec![job("a", "One"), job("b", "Two")];
        let filter = JobFilter {
            job_types: vec![],
            status: Some(JobStatus::Published),
            ..Default::default()
        };
        assert_eq!(search_jobs(jobs, &filter, JobSort::Newest, 1, 20).items.len(), 2);
    }

    #[test]
    fn search_matches_company_name() {
        let mut a = job("a", "Engineer");
        a.company = Some(crate::store::seed::companies().remove(0));
        let b = job("b", "Engineer");
        let filter = JobFilter {
            search: Some("techcorp".into()),
            ..Default::default()
        };
        let page = search_jobs(vec![a, b], &filter, JobSort::Newest, 1, 20);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].job.id, "a");
    }

    #[test]
    fn salary_filter_requires_both_bounds_inside_range() {
        let mut inside = job("inside", "A");
        inside.job.salary_min = Some(90_000);
        inside.job.salary_max = Some(110_000);
        let mut straddles = job("straddles", "B");
        straddles.job.salary_min = Some(70_000);
        straddles.job.salary_max = Some(110_000);
        let mut half_set = job("half", "C");
        half_set.job.salary_min = Some(95_000);
        half_set.job.salary_max = None;
        let no_salary = job("none", "D");

        let filter = JobFilter {
            salary_min: Some(80_000),
            salary_max: Some(120_000),
            ..Default::default()
        };
        let page = search_jobs(
            vec![inside, straddles, half_set, no_salary],
            &filter,
            JobSort::Newest,
            1,
            20,
        );
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].job.id, "inside");
    }

    #[test]
    fn draft_jobs_are_invisible_to_published_scope() {
        let mut draft = job("draft", "Hidden");
        draft.job.status = JobStatus::Draft;
        let published = vec![job("a", "One"), job("b", "Two"), draft];
        let page = search_jobs(published, &JobFilter::published(), JobSort::Newest, 1, 20);
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|j| j.job.status == JobStatus::Published));
    }

    #[test]
    fn sort_orders_treat_missing_salary_as_zero() {
        let mut high = job("high", "A");
        high.job.salary_max = Some(200_000);
        let mut low = job("low", "B");
        low.job.salary_max = Some(50_000);
        let missing = job("missing", "C");

        let page = search_jobs(
            vec![low.clone(), missing.clone(), high.clone()],
            &JobFilter::default(),
            JobSort::SalaryHigh,
            1,
            20,
        );
        let ids: Vec<&str> = page.items.iter().map(|j| j.job.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "low", "missing"]);

        let mut cheap = low;
        cheap.job.salary_min = Some(40_000);
        let mut pricey = high;
        pricey.job.salary_min = Some(150_000);
        let page = search_jobs(
            vec![pricey, cheap, missing],
            &JobFilter::default(),
            JobSort::SalaryLow,
            1,
            20,
        );
        let ids: Vec<&str> = page.items.iter().map(|j| j.job.id.as_str()).collect();
        assert_eq!(ids, vec!["missing", "low", "high"]);
    }

    #[test]
    fn pagination_obeys_length_formula() {
        let jobs: Vec<JobView> = (0..25).map(|i| job(&format!("j{i}"), "T")).collect();
        let filter = JobFilter::default();

        let page1 = search_jobs(jobs.clone(), &filter, JobSort::Newest, 1, 10);
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page1.pagination.total, 25);
        assert_eq!(page1.pagination.total_pages, 3);

        let page3 = search_jobs(jobs.clone(), &filter, JobSort::Newest, 3, 10);
        assert_eq!(page3.items.len(), 5);

        let page4 = search_jobs(jobs, &filter, JobSort::Newest, 4, 10);
        assert!(page4.items.is_empty());
        assert_eq!(page4.pagination.total, 25);
    }

    #[test]
    fn empty_collection_paginates_to_empty_page() {
        let page = search_jobs(vec![], &JobFilter::default(), JobSort::Newest, 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 0);
        assert_eq!(page.pagination.total_pages, 0);
    }

    #[test]
    fn limit_is_clamped() {
        let jobs: Vec<JobView> = (0..300).map(|i| job(&format!("j{i}"), "T")).collect();
        let page = search_jobs(jobs, &JobFilter::default(), JobSort::Newest, 1, 1000);
        assert_eq!(page.items.len(), MAX_PAGE_SIZE as usize);
        assert_eq!(page.pagination.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn newest_sort_is_by_created_at_descending() {
        let mut old = job("old", "A");
        old.job.created_at = Utc::now() - Duration::days(10);
        let fresh = job("fresh", "B");
        let page = search_jobs(
            vec![old, fresh],
            &JobFilter::default(),
            JobSort::Newest,
            1,
            20,
        );
        assert_eq!(page.items[0].job.id, "fresh");
    }

    #[test]
    fn company_filter_matches_industry_and_verified() {
        let companies = crate::store::seed::companies();
        let filter = CompanyFilter {
            industry: Some("technology".into()),
            verified_only: true,
            ..Default::default()
        };
        let page = search_companies(companies, &filter, 1, 20);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "company-1");
    }
}
