//! Field optimizers: isolated rewrite capabilities for headline and summary.
//!
//! Each optimizer tries the LLM first (when a generator is configured) and
//! degrades to a deterministic rule-based rewrite on any generation failure.
//! A generation failure never escapes an optimizer; only a local programming
//! error propagates.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::generate::{split_explanation, GenerationRequest, TextGenerator};
use crate::profile::{Profile, ToolKind, ToolResult};

/// Uniform contract for a single optimization capability.
#[async_trait]
pub trait FieldOptimizer: Send + Sync {
    /// Which tool this optimizer implements.
    fn kind(&self) -> ToolKind;

    /// Produce replacement text for the profile field.
    async fn optimize(&self, profile: &Profile) -> Result<ToolResult>;
}

// Short role-specific taglines to make headlines more specific and
// ATS-friendly.
const ROLE_TAGLINES: &[(&str, &str)] = &[
    ("backend developer", "APIs & Server-Side Systems"),
    ("frontend developer", "React & Modern Web"),
    ("data analyst", "Data & Analytics"),
    ("data scientist", "ML & Data-Driven Insights"),
    ("qa engineer", "Testing & Quality Assurance"),
    ("devops engineer", "CI/CD & Cloud"),
    ("full stack developer", "End-to-End Development"),
    ("software engineer", "Software Development"),
    ("mobile developer", "iOS & Android"),
    ("ml engineer", "Machine Learning & Production ML"),
    ("cloud engineer", "Cloud & Infrastructure"),
    ("security engineer", "Application & Cloud Security"),
    ("product manager", "Product & Roadmap"),
    ("technical lead", "Architecture & Team Leadership"),
];

// Headlines considered too generic to be worth preserving in explanations.
const GENERIC_HEADLINES: &[&str] = &["student", "graduate", "engineer", "software engineer"];

// Role keywords used to detect relevant experience in a summary.
const SUMMARY_ROLE_KEYWORDS: &[(&str, &[&str])] = &[
    ("backend developer", &["api", "backend", "server", "python", "java"]),
    ("frontend developer", &["react", "javascript", "frontend", "ui"]),
    ("data analyst", &["data", "sql", "analytics", "statistics"]),
    ("data scientist", &["data", "ml", "python", "statistics", "modeling"]),
    ("qa engineer", &["qa", "testing", "automation"]),
    ("devops engineer", &["ci/cd", "docker", "cloud", "automation"]),
    ("full stack developer", &["frontend", "backend", "react", "api"]),
    ("software engineer", &["software", "development", "code", "systems"]),
    (
        "mobile developer",
        &["mobile", "ios", "android", "react native", "swift", "kotlin"],
    ),
    ("ml engineer", &["ml", "machine learning", "python", "model", "production"]),
    ("cloud engineer", &["cloud", "aws", "azure", "gcp", "infrastructure"]),
    ("security engineer", &["security", "application", "cloud", "compliance"]),
    ("product manager", &["product", "roadmap", "stakeholders", "agile"]),
    ("technical lead", &["architecture", "lead", "team", "technical"]),
];

// Markers that usually indicate a student or entry-level profile.
const NO_EXPERIENCE_MARKERS: &[&str] = &[
    "student",
    "graduate",
    "looking for",
    "first opportunity",
    "motivated",
];

const EXPERIENCED_SUMMARIES: &[(&str, &str)] = &[
    (
        "backend developer",
        "Backend Developer with hands-on experience building server-side logic, APIs, \
         and data-driven systems, focusing on reliability and scalability.",
    ),
    (
        "frontend developer",
        "Frontend Developer experienced in building user interfaces using modern \
         JavaScript frameworks, with a strong focus on usability and performance.",
    ),
    (
        "data analyst",
        "Data Analyst with experience working with data, statistics, and transforming \
         raw data into actionable insights.",
    ),
    (
        "data scientist",
        "Data Scientist with experience in machine learning, statistics, and turning \
         data into models and business impact.",
    ),
    (
        "qa engineer",
        "QA Engineer with experience in software testing, quality assurance processes, \
         and ensuring system reliability.",
    ),
    (
        "devops engineer",
        "DevOps Engineer with experience in CI/CD pipelines, cloud infrastructure, \
         and automation.",
    ),
    (
        "full stack developer",
        "Full Stack Developer experienced in both frontend and backend, building \
         end-to-end applications with modern frameworks.",
    ),
    (
        "software engineer",
        "Software Engineer with experience designing and building reliable systems \
         and clean, maintainable code.",
    ),
    (
        "mobile developer",
        "Mobile Developer experienced in building native or cross-platform apps \
         for iOS and Android.",
    ),
    (
        "ml engineer",
        "ML Engineer with experience taking machine learning models from research \
         to production, including pipelines and monitoring.",
    ),
    (
        "cloud engineer",
        "Cloud Engineer with experience in AWS, Azure, or GCP, infrastructure as code, \
         and scalable architectures.",
    ),
    (
        "security engineer",
        "Security Engineer focused on application and cloud security, compliance, \
         and secure development practices.",
    ),
    (
        "product manager",
        "Product Manager with experience defining roadmaps, working with stakeholders, \
         and driving delivery in agile environments.",
    ),
    (
        "technical lead",
        "Technical Lead with experience in architecture decisions, mentoring, \
         and leading engineering teams.",
    ),
];

const STUDENT_SUMMARIES: &[(&str, &str)] = &[
    (
        "backend developer",
        "Computer Science student with a strong foundation in backend development, \
         experienced through academic and personal projects involving APIs, Python, \
         and server-side systems.",
    ),
    (
        "frontend developer",
        "Computer Science student with a focus on frontend development, experienced \
         in building user interfaces using React and modern JavaScript through \
         academic and personal projects.",
    ),
    (
        "data analyst",
        "Student with a strong analytical background, experienced in data analysis, \
         SQL, and statistics through academic coursework and projects.",
    ),
    (
        "data scientist",
        "Student with a strong foundation in data science and ML, experienced in \
         Python, statistics, and modeling through coursework and projects.",
    ),
    (
        "qa engineer",
        "Computer Science student with a focus on software quality and testing, \
         experienced in QA methodologies and testing tools through academic projects.",
    ),
    (
        "devops engineer",
        "Computer Science student with hands-on experience in DevOps concepts such as \
         CI/CD, automation, and cloud fundamentals through academic and personal projects.",
    ),
    (
        "full stack developer",
        "Computer Science student with full stack experience through projects in \
         frontend and backend technologies.",
    ),
    (
        "software engineer",
        "Computer Science student building practical experience in software development \
         through coursework and personal projects.",
    ),
    (
        "mobile developer",
        "Student with experience in mobile development through projects in iOS, \
         Android, or cross-platform frameworks.",
    ),
    (
        "ml engineer",
        "Student with a focus on machine learning and ML systems, experienced through \
         coursework and projects in Python and ML frameworks.",
    ),
    (
        "cloud engineer",
        "Student with hands-on experience in cloud and infrastructure through \
         courses and personal projects (AWS, Azure, or GCP).",
    ),
    (
        "security engineer",
        "Student with interest in security, experienced through coursework and \
         projects in application or cloud security.",
    ),
    (
        "product manager",
        "Student with interest in product management, experienced through projects \
         in requirements, roadmap, and agile practices.",
    ),
    (
        "technical lead",
        "Student with leadership experience in technical projects and team collaboration.",
    ),
];

const HEADLINE_SYSTEM_PROMPT: &str = "You are a LinkedIn profile expert. Improve the user's \
    headline to better match the target job role. Keep it concise (under 120 characters). \
    Return only the improved headline, then on a new line write 'EXPLANATION:' followed by \
    one short sentence.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a LinkedIn profile expert. Rewrite the user's \
    About/Summary to align with the target job role. Keep the user's real experience and \
    wording where possible, while improving structure and keywords. Write 2-4 short \
    paragraphs. Then add a new line with 'EXPLANATION:' followed by one short sentence.";

const HEADLINE_MAX_TOKENS: u32 = 150;
const SUMMARY_MAX_TOKENS: u32 = 600;

// Summaries are truncated before being embedded in the prompt.
const SUMMARY_PROMPT_LIMIT: usize = 2000;

fn headline_prompt(current: &str, target_role: &str) -> GenerationRequest {
    GenerationRequest::new(
        HEADLINE_SYSTEM_PROMPT,
        format!("Target role: {target_role}\nCurrent headline: {current}"),
        HEADLINE_MAX_TOKENS,
    )
}

fn summary_prompt(current: &str, target_role: &str) -> GenerationRequest {
    let excerpt: String = current.chars().take(SUMMARY_PROMPT_LIMIT).collect();
    GenerationRequest::new(
        SUMMARY_SYSTEM_PROMPT,
        format!("Target role: {target_role}\nCurrent summary:\n{excerpt}"),
        SUMMARY_MAX_TOKENS,
    )
}

/// Normalize a target role against the tagline table: exact match first, then
/// first-token prefix/containment match.
fn tagline_for(role: &str) -> Option<&'static str> {
    let role = role.to_lowercase();
    if let Some((_, tagline)) = ROLE_TAGLINES.iter().find(|(key, _)| *key == role) {
        return Some(tagline);
    }

    let first = role.split_whitespace().next()?;
    ROLE_TAGLINES
        .iter()
        .find(|(key, _)| key.starts_with(first) || key.contains(first))
        .map(|(_, tagline)| *tagline)
}

fn lookup<'a>(table: &'a [(&str, &str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Headline rewrite tool.
pub struct HeadlineOptimizer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl HeadlineOptimizer {
    /// Create a headline optimizer. `None` disables the LLM path entirely.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    fn rule_based(&self, current: &str, target: &str) -> ToolResult {
        if target.is_empty() {
            let text = if current.is_empty() {
                "Open to new opportunities".to_string()
            } else {
                current.to_string()
            };
            return ToolResult::fallback(
                ToolKind::Headline,
                text,
                "No target role provided; kept the existing headline.",
            );
        }

        let text = match tagline_for(target) {
            Some(tagline) => format!("{target} | {tagline}"),
            None => target.to_string(),
        };

        let current_lower = current.to_lowercase();
        let explanation = if !current.is_empty()
            && !GENERIC_HEADLINES.contains(&current_lower.as_str())
        {
            format!(
                "Headline focused on target role '{target}' with a clear specialization. \
                 Your existing headline was considered; you can manually merge in specific \
                 details (e.g. years of experience) if needed."
            )
        } else {
            "Headline rewritten to clearly reflect the target role and a relevant focus area."
                .to_string()
        };

        ToolResult::fallback(ToolKind::Headline, text, explanation)
    }
}

#[async_trait]
impl FieldOptimizer for HeadlineOptimizer {
    fn kind(&self) -> ToolKind {
        ToolKind::Headline
    }

    async fn optimize(&self, profile: &Profile) -> Result<ToolResult> {
        let current = profile.headline.trim();
        let target = profile.target_role.trim();

        if let Some(generator) = &self.generator {
            match generator.generate(headline_prompt(current, target)).await {
                Ok(raw) => {
                    let (text, explanation) = split_explanation(&raw);
                    // Models that skip the marker get truncated to the
                    // headline length limit.
                    let text = if explanation.is_some() {
                        text
                    } else {
                        text.chars().take(120).collect()
                    };
                    if !text.is_empty() {
                        let explanation = explanation.unwrap_or_else(|| {
                            "Headline tailored to the target role.".to_string()
                        });
                        return Ok(ToolResult::llm(ToolKind::Headline, text, explanation));
                    }
                    warn!("LLM returned an empty headline, falling back");
                }
                Err(e) => {
                    warn!("LLM headline call failed: {}, falling back", e);
                }
            }
        }

        Ok(self.rule_based(current, target))
    }
}

/// Summary rewrite tool.
pub struct SummaryOptimizer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl SummaryOptimizer {
    /// Create a summary optimizer. `None` disables the LLM path entirely.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    fn rule_based(&self, current: &str, target: &str) -> ToolResult {
        if target.is_empty() {
            return ToolResult::fallback(
                ToolKind::Summary,
                "Professional with a solid technical background and hands-on project \
                 experience.",
                "No target role provided; wrote a neutral summary.",
            );
        }

        let role_key = target.to_lowercase();
        let summary_lower = current.to_lowercase();

        let has_experience = lookup_keywords(&role_key)
            .map(|keywords| keywords.iter().any(|k| summary_lower.contains(k)))
            .unwrap_or(false);
        let entry_level = NO_EXPERIENCE_MARKERS
            .iter()
            .any(|marker| summary_lower.contains(marker));

        let (text, explanation) = if !has_experience || entry_level {
            let text = lookup(STUDENT_SUMMARIES, &role_key)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "Student with a strong interest in {target}, building practical \
                         skills through academic studies and personal projects."
                    )
                });
            (
                text,
                "Summary rewritten for a student or entry-level candidate.",
            )
        } else {
            let text = lookup(EXPERIENCED_SUMMARIES, &role_key)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "{target} with a solid technical background and professional \
                         experience."
                    )
                });
            (text, "Summary rewritten for an experienced candidate.")
        };

        ToolResult::fallback(ToolKind::Summary, text, explanation)
    }
}

fn lookup_keywords(role_key: &str) -> Option<&'static [&'static str]> {
    SUMMARY_ROLE_KEYWORDS
        .iter()
        .find(|(k, _)| *k == role_key)
        .map(|(_, v)| *v)
}

#[async_trait]
impl FieldOptimizer for SummaryOptimizer {
    fn kind(&self) -> ToolKind {
        ToolKind::Summary
    }

    async fn optimize(&self, profile: &Profile) -> Result<ToolResult> {
        let current = profile.summary.trim();
        let target = profile.target_role.trim();

        if let Some(generator) = &self.generator {
            match generator.generate(summary_prompt(current, target)).await {
                Ok(raw) => {
                    let (text, explanation) = split_explanation(&raw);
                    if !text.is_empty() {
                        let explanation = explanation.unwrap_or_else(|| {
                            "Summary tailored to the target role.".to_string()
                        });
                        return Ok(ToolResult::llm(ToolKind::Summary, text, explanation));
                    }
                    warn!("LLM returned an empty summary, falling back");
                }
                Err(e) => {
                    warn!("LLM summary call failed: {}, falling back", e);
                }
            }
        }

        Ok(self.rule_based(current, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GenerationError;

    struct StubGenerator {
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> std::result::Result<String, GenerationError> {
            match self.reply {
                Some(reply) => Ok(reply.to_string()),
                None => Err(GenerationError::Timeout),
            }
        }
    }

    fn stub(reply: Option<&'static str>) -> Option<Arc<dyn TextGenerator>> {
        Some(Arc::new(StubGenerator { reply }))
    }

    #[tokio::test]
    async fn test_headline_fallback_without_generator() {
        let optimizer = HeadlineOptimizer::new(None);
        let profile = Profile::new("", "", "Backend Developer");

        let result = optimizer.optimize(&profile).await.unwrap();
        assert!(result.fallback_used);
        assert!(!result.used_llm);
        assert_eq!(result.text, "Backend Developer | APIs & Server-Side Systems");
    }

    #[tokio::test]
    async fn test_headline_fallback_on_generation_error() {
        let optimizer = HeadlineOptimizer::new(stub(None));
        let profile = Profile::new("Student", "", "QA Engineer");

        let result = optimizer.optimize(&profile).await.unwrap();
        assert!(result.fallback_used);
        assert!(!result.used_llm);
        assert!(!result.text.is_empty());
    }

    #[tokio::test]
    async fn test_headline_llm_success() {
        let optimizer = HeadlineOptimizer::new(stub(Some(
            "Senior Backend Engineer | Distributed Systems\nEXPLANATION: Emphasized seniority.",
        )));
        let profile = Profile::new("Engineer", "", "Senior Backend Engineer");

        let result = optimizer.optimize(&profile).await.unwrap();
        assert!(result.used_llm);
        assert!(!result.fallback_used);
        assert_eq!(result.text, "Senior Backend Engineer | Distributed Systems");
        assert_eq!(result.explanation, "Emphasized seniority.");
    }

    #[tokio::test]
    async fn test_headline_unknown_role_uses_role_as_text() {
        let optimizer = HeadlineOptimizer::new(None);
        let profile = Profile::new("", "", "Basket Weaver");

        let result = optimizer.optimize(&profile).await.unwrap();
        assert_eq!(result.text, "Basket Weaver");
        assert!(result.fallback_used);
    }

    #[tokio::test]
    async fn test_headline_partial_role_match() {
        let optimizer = HeadlineOptimizer::new(None);
        let profile = Profile::new("", "", "Backend");

        let result = optimizer.optimize(&profile).await.unwrap();
        assert_eq!(result.text, "Backend | APIs & Server-Side Systems");
    }

    #[tokio::test]
    async fn test_summary_student_template() {
        let optimizer = SummaryOptimizer::new(None);
        let profile = Profile::new("", "Motivated student looking for a role", "QA Engineer");

        let result = optimizer.optimize(&profile).await.unwrap();
        assert!(result.fallback_used);
        assert!(result.text.contains("student"));
        assert_eq!(
            result.explanation,
            "Summary rewritten for a student or entry-level candidate."
        );
    }

    #[tokio::test]
    async fn test_summary_experienced_template() {
        let optimizer = SummaryOptimizer::new(None);
        let profile = Profile::new(
            "",
            "I have built many APIs and backend services in Python over the years.",
            "Backend Developer",
        );

        let result = optimizer.optimize(&profile).await.unwrap();
        assert!(result.fallback_used);
        assert_eq!(
            result.explanation,
            "Summary rewritten for an experienced candidate."
        );
        assert!(result.text.starts_with("Backend Developer"));
    }

    #[tokio::test]
    async fn test_summary_llm_success() {
        let optimizer = SummaryOptimizer::new(stub(Some(
            "Rewritten summary paragraph.\nEXPLANATION: Aligned with the role.",
        )));
        let profile = Profile::new("", "old summary", "Data Analyst");

        let result = optimizer.optimize(&profile).await.unwrap();
        assert!(result.used_llm);
        assert_eq!(result.text, "Rewritten summary paragraph.");
    }

    #[tokio::test]
    async fn test_fallback_text_never_empty() {
        let profiles = [
            Profile::new("", "", ""),
            Profile::new("", "", "Backend Developer"),
            Profile::new("x", "y", "Unknown Role Entirely"),
        ];

        for profile in &profiles {
            let headline = HeadlineOptimizer::new(None)
                .optimize(profile)
                .await
                .unwrap();
            assert!(!headline.text.is_empty(), "empty headline for {:?}", profile);

            let summary = SummaryOptimizer::new(None).optimize(profile).await.unwrap();
            assert!(!summary.text.is_empty(), "empty summary for {:?}", profile);
        }
    }
}
