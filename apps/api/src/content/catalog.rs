//! Default content of the skills page, used whenever a section has nothing
//! usable in durable storage.

use crate::content::records::{
    CertificationSeed, SkillCategorySeed, SkillSeed, TechSeed, TrainingSeed,
};

pub const SKILL_CATEGORIES_KEY: &str = "skills_categories";
pub const TECH_STACK_KEY: &str = "tech_stack";
pub const CERTIFICATIONS_KEY: &str = "certifications";
pub const TRAINING_KEY: &str = "current_training";

fn category(title: &str, icon: &str, skills: &[(&str, i64)]) -> SkillCategorySeed {
    SkillCategorySeed {
        title: title.to_string(),
        icon: icon.to_string(),
        skills: skills
            .iter()
            .map(|&(name, level)| SkillSeed {
                name: name.to_string(),
                level,
            })
            .collect(),
    }
}

pub fn default_skill_categories() -> Vec<SkillCategorySeed> {
    vec![
        category(
            "Frontend Development",
            "Globe",
            &[
                ("React.js", 95),
                ("TypeScript", 90),
                ("Tailwind CSS", 95),
                ("Next.js", 85),
                ("Vue.js", 75),
            ],
        ),
        category(
            "Backend Development",
            "Database",
            &[
                ("Node.js", 90),
                ("Express.js", 90),
                ("Python", 80),
                ("PostgreSQL", 85),
                ("MongoDB", 85),
            ],
        ),
        category(
            "Development Tools",
            "Wrench",
            &[
                ("Git & GitHub", 95),
                ("Docker", 80),
                ("AWS", 75),
                ("CI/CD", 85),
                ("Testing (Jest)", 85),
            ],
        ),
        category(
            "Soft Skills",
            "Brain",
            &[
                ("Problem Solving", 95),
                ("Team Leadership", 85),
                ("Communication", 90),
                ("Agile/Scrum", 90),
                ("Code Review", 90),
            ],
        ),
    ]
}

pub fn default_certifications() -> Vec<CertificationSeed> {
    [
        ("AWS Certified Developer", "Amazon Web Services", "2023"),
        ("React Advanced Patterns", "Frontend Masters", "2023"),
        ("Full Stack Web Development", "Udacity", "2022"),
        ("Agile Project Management", "Scrum Alliance", "2022"),
    ]
    .into_iter()
    .map(|(name, issuer, year)| CertificationSeed {
        name: name.to_string(),
        issuer: issuer.to_string(),
        year: year.to_string(),
    })
    .collect()
}

pub fn default_tech_stack() -> Vec<TechSeed> {
    [
        "React", "TypeScript", "Node.js", "PostgreSQL", "MongoDB", "Express", "Next.js",
        "Tailwind", "Docker", "AWS", "Git", "Jest", "Redux", "GraphQL", "REST API", "Webpack",
        "Vite", "Python",
    ]
    .into_iter()
    .map(|name| TechSeed {
        name: name.to_string(),
    })
    .collect()
}

pub fn default_training() -> Vec<TrainingSeed> {
    [
        ("Advanced System Design", 75),
        ("Machine Learning Fundamentals", 45),
        ("Microservices Architecture", 60),
    ]
    .into_iter()
    .map(|(course, progress)| TrainingSeed {
        course: course.to_string(),
        progress,
    })
    .collect()
}
