//! Built-in seed data. Loaded into a collection the first time it is
//! read with nothing persisted, and by the admin reset action.

use chrono::{Duration, Utc};

use super::models::*;

/// Demo account passwords (documented for local use):
/// admin@jobboard.com / admin123, hr@techcorp.com / company123,
/// john@example.com / user123. Stored hashed; cost 4 keeps first-run
/// seeding fast for throwaway demo credentials.
const SEED_BCRYPT_COST: u32 = 4;

fn demo_hash(password: &str) -> String {
    bcrypt::hash(password, SEED_BCRYPT_COST).unwrap_or_else(|_| String::new())
}

pub fn categories() -> Vec<Category> {
    let now = Utc::now();
    let cat = |id: &str, name: &str, slug: &str, description: &str, color: &str, icon: &str| Category {
        id: id.to_string(),
        name: name.to_string(),
        slug: slug.to_string(),
        description: Some(description.to_string()),
        color: color.to_string(),
        icon: Some(icon.to_string()),
        created_at: now,
        updated_at: now,
    };
    vec![
        cat("cat-1", "Engineering", "engineering", "Software development and engineering roles", "#3B82F6", "Code"),
        cat("cat-2", "Product", "product", "Product management and strategy", "#10B981", "Package"),
        cat("cat-3", "Design", "design", "UI/UX and graphic design", "#F59E0B", "Palette"),
        cat("cat-4", "Marketing", "marketing", "Digital marketing and growth", "#EF4444", "Megaphone"),
        cat("cat-5", "Sales", "sales", "Sales and business development", "#8B5CF6", "TrendingUp"),
    ]
}

pub fn companies() -> Vec<Company> {
    let now = Utc::now();
    vec![
        Company {
            id: "company-1".into(),
            name: "TechCorp Inc.".into(),
            description: "Leading technology company focused on innovative solutions for the modern world.".into(),
            logo: None,
            website: Some("https://techcorp.com".into()),
            size: CompanySize::Large,
            industry: "Technology".into(),
            location: "San Francisco, CA".into(),
            founded_year: Some(2015),
            verified: true,
            created_at: now,
            updated_at: now,
        },
        Company {
            id: "company-2".into(),
            name: "StartupXYZ".into(),
            description: "Fast-growing startup revolutionizing the way people work remotely.".into(),
            logo: None,
            website: Some("https://startupxyz.com".into()),
            size: CompanySize::Startup,
            industry: "SaaS".into(),
            location: "Remote".into(),
            founded_year: Some(2021),
            verified: false,
            created_at: now,
            updated_at: now,
        },
        Company {
            id: "company-3".into(),
            name: "Design Studio".into(),
            description: "Creative agency specializing in digital design and user experience.".into(),
            logo: None,
            website: Some("https://designstudio.com".into()),
            size: CompanySize::Small,
            industry: "Design".into(),
            location: "New York, NY".into(),
            founded_year: Some(2018),
            verified: true,
            created_at: now,
            updated_at: now,
        },
        Company {
            id: "company-4".into(),
            name: "Global Finance Corp".into(),
            description: "International financial services company with offices worldwide.".into(),
            logo: None,
            website: Some("https://globalfinance.com".into()),
            size: CompanySize::Enterprise,
            industry: "Finance".into(),
            location: "London, UK".into(),
            founded_year: Some(2005),
            verified: true,
            created_at: now,
            updated_at: now,
        },
    ]
}

pub fn jobs() -> Vec<Job> {
    let now = Utc::now();
    vec![
        Job {
            id: "job-1".into(),
            title: "Senior Frontend Developer".into(),
            slug: "senior-frontend-developer".into(),
            description: "We're looking for a senior frontend developer to join our growing team. You'll be working on cutting-edge web applications using React, TypeScript, and modern tooling.".into(),
            requirements: "5+ years of experience with React, TypeScript, and modern frontend technologies. Experience with Next.js, Tailwind CSS, and state management libraries.".into(),
            benefits: "Competitive salary, health insurance, 401k, flexible working hours, remote work options, professional development budget.".into(),
            location: "San Francisco, CA".into(),
            remote: false,
            salary_min: Some(120_000),
            salary_max: Some(150_000),
            currency: "USD".into(),
            job_type: JobType::FullTime,
            experience: ExperienceLevel::SeniorLevel,
            status: JobStatus::Published,
            featured: true,
            company_id: "company-1".into(),
            category_id: "cat-1".into(),
            views: 245,
            deadline: Some(now + Duration::days(30)),
            created_at: now - Duration::days(2),
            updated_at: now - Duration::days(2),
        },
        Job {
            id: "job-2".into(),
            title: "Product Manager".into(),
            slug: "product-manager".into(),
            description: "Join our product team to drive the vision and strategy for our core platform. You'll work closely with engineering, design, and business teams.".into(),
            requirements: "3+ years of product management experience, preferably in SaaS or technology companies. Strong analytical skills and experience with product metrics.".into(),
            benefits: "Stock options, health benefits, flexible PTO, learning stipend, modern office environment.".into(),
            location: "Remote".into(),
            remote: true,
            salary_min: Some(100_000),
            salary_max: Some(130_000),
            currency: "USD".into(),
            job_type: JobType::FullTime,
            experience: ExperienceLevel::MidLevel,
            status: JobStatus::Published,
            featured: false,
            company_id: "company-2".into(),
            category_id: "cat-2".into(),
            views: 89,
            deadline: Some(now + Duration::days(45)),
            created_at: now - Duration::days(7),
            updated_at: now - Duration::days(7),
        },
        Job {
            id: "job-3".into(),
            title: "UX Designer".into(),
            slug: "ux-designer".into(),
            description: "Create amazing user experiences for our diverse client portfolio. You'll be responsible for user research, wireframing, prototyping, and collaborating with development teams.".into(),
            requirements: "2+ years of UX design experience, proficiency in Figma/Sketch, understanding of design systems and user-centered design principles.".into(),
            benefits: "Creative environment, professional development budget, flexible schedule, design conference attendance.".into(),
            location: "New York, NY".into(),
            remote: false,
            salary_min: Some(80_000),
            salary_max: Some(100_000),
            currency: "USD".into(),
            job_type: JobType::Contract,
            experience: ExperienceLevel::MidLevel,
            status: JobStatus::Published,
            featured: false,
            company_id: "company-3".into(),
            category_id: "cat-3".into(),
            views: 156,
            deadline: Some(now + Duration::days(20)),
            created_at: now - Duration::days(3),
            updated_at: now - Duration::days(3),
        },
    ]
}

pub fn applications() -> Vec<Application> {
    let now = Utc::now();
    vec![
        Application {
            id: "app-1".into(),
            job_id: "job-1".into(),
            applicant_name: "John Doe".into(),
            applicant_email: "john.doe@email.com".into(),
            applicant_phone: Some("+1-555-0123".into()),
            resume: None,
            cover_letter: Some("I'm excited about this opportunity to work with your team...".into()),
            status: ApplicationStatus::Pending,
            notes: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now - Duration::hours(2),
            updated_at: now - Duration::hours(2),
        },
        Application {
            id: "app-2".into(),
            job_id: "job-2".into(),
            applicant_name: "Jane Smith".into(),
            applicant_email: "jane.smith@email.com".into(),
            applicant_phone: Some("+1-555-0124".into()),
            resume: None,
            cover_letter: Some("I believe my product management experience would be valuable...".into()),
            status: ApplicationStatus::Reviewed,
            notes: None,
            reviewed_by: Some("admin".into()),
            reviewed_at: Some(now - Duration::hours(1)),
            created_at: now - Duration::hours(5),
            updated_at: now - Duration::hours(1),
        },
        Application {
            id: "app-3".into(),
            job_id: "job-3".into(),
            applicant_name: "Mike Johnson".into(),
            applicant_email: "mike.johnson@email.com".into(),
            applicant_phone: Some("+1-555-0125".into()),
            resume: None,
            cover_letter: Some("As a passionate UX designer, I'm thrilled about the possibility...".into()),
            status: ApplicationStatus::Shortlisted,
            notes: None,
            reviewed_by: Some("admin".into()),
            reviewed_at: Some(now - Duration::hours(12)),
            created_at: now - Duration::hours(24),
            updated_at: now - Duration::hours(12),
        },
    ]
}

pub fn users() -> Vec<User> {
    let now = Utc::now();
    vec![
        User {
            id: "admin-1".into(),
            email: "admin@jobboard.com".into(),
            password_hash: demo_hash("admin123"),
            name: "Admin User".into(),
            role: UserRole::Admin,
            avatar: None,
            company_id: None,
            profile: None,
            created_at: now,
            updated_at: now,
        },
        User {
            id: "company-user-1".into(),
            email: "hr@techcorp.com".into(),
            password_hash: demo_hash("company123"),
            name: "Sarah Johnson".into(),
            role: UserRole::Company,
            avatar: None,
            company_id: Some("company-1".into()),
            profile: Some(UserProfile {
                bio: Some("HR Manager at TechCorp with 8 years of experience in talent acquisition.".into()),
                phone: Some("+1-555-0101".into()),
                location: Some("San Francisco, CA".into()),
                ..Default::default()
            }),
            created_at: now,
            updated_at: now,
        },
        User {
            id: "user-1".into(),
            email: "john@example.com".into(),
            password_hash: demo_hash("user123"),
            name: "John Doe".into(),
            role: UserRole::Applicant,
            avatar: None,
            company_id: None,
            profile: Some(UserProfile {
                bio: Some("Full-stack developer with 5 years of experience in React and Node.js.".into()),
                skills: Some(vec![
                    "JavaScript".into(),
                    "React".into(),
                    "Node.js".into(),
                    "TypeScript".into(),
                    "PostgreSQL".into(),
                ]),
                experience: Some("5 years".into()),
                education: Some("BS Computer Science, Stanford University".into()),
                location: Some("San Francisco, CA".into()),
                phone: Some("+1-555-0201".into()),
                website: Some("https://johndoe.dev".into()),
                resume: Some("john_doe_resume.pdf".into()),
            }),
            created_at: now,
            updated_at: now,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_foreign_keys_resolve() {
        let companies = companies();
        let categories = categories();
        for job in jobs() {
            assert!(companies.iter().any(|c| c.id == job.company_id), "{}", job.company_id);
            assert!(categories.iter().any(|c| c.id == job.category_id), "{}", job.category_id);
        }
        let jobs = jobs();
        for app in applications() {
            assert!(jobs.iter().any(|j| j.id == app.job_id), "{}", app.job_id);
        }
    }

    #[test]
    fn seed_passwords_are_hashed() {
        for user in users() {
            assert!(user.password_hash.starts_with("$2"), "bcrypt hash expected");
        }
        let admin = users().into_iter().find(|u| u.role == UserRole::Admin).unwrap();
        assert!(bcrypt::verify("admin123", &admin.password_hash).unwrap());
    }
}
