//! Decision engine for selecting which optimization tools to run.
//!
//! Scoring is a pure function of the profile and the engine's configuration:
//! no clock, no randomness, no I/O. Identical input always yields an
//! identical trace.

use std::collections::HashMap;

use tracing::info;

use crate::profile::{DecisionTrace, Profile, ScoredCandidate, ToolKind};

/// Scoring constants for the decision engine.
///
/// Held immutably by the engine so alternative rule sets can be tested side
/// by side. `Default` carries the production constants.
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    /// Minimum headline score that triggers a headline rewrite.
    pub headline_threshold: u32,
    /// Minimum summary score that triggers a summary rewrite.
    pub summary_threshold: u32,
    /// Score assigned to an entirely missing field. Must clear both
    /// thresholds on its own.
    pub missing_field_score: u32,
    /// A summary problem at or above this score forces a rewrite even when
    /// the headline is already strong.
    pub critical_summary_score: u32,
    /// Headlines shorter than this are penalized.
    pub headline_min_len: usize,
    /// Summaries shorter than this are penalized.
    pub summary_min_len: usize,
    /// Headlines considered too generic on their own.
    pub generic_headlines: Vec<String>,
    /// Role keywords per role family, keyed by the first token of the
    /// target role.
    pub role_keywords: HashMap<String, Vec<String>>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        let mut role_keywords = HashMap::new();
        role_keywords.insert(
            "backend".to_string(),
            vec!["backend", "api", "server", "python", "java"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        role_keywords.insert(
            "data".to_string(),
            vec!["data", "analytics", "sql", "ml"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        role_keywords.insert(
            "qa".to_string(),
            vec!["qa", "testing", "automation"]
                .into_iter()
                .map(String::from)
                .collect(),
        );

        Self {
            headline_threshold: 2,
            summary_threshold: 2,
            missing_field_score: 3,
            critical_summary_score: 3,
            headline_min_len: 15,
            summary_min_len: 100,
            generic_headlines: vec!["student", "graduate", "engineer", "software engineer"]
                .into_iter()
                .map(String::from)
                .collect(),
            role_keywords,
        }
    }
}

/// Scores each candidate tool against a profile and decides which should run.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: DecisionConfig,
}

impl DecisionEngine {
    /// Create an engine with custom scoring constants.
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    /// The selection threshold for a tool.
    pub fn threshold(&self, tool: ToolKind) -> u32 {
        match tool {
            ToolKind::Headline => self.config.headline_threshold,
            ToolKind::Summary => self.config.summary_threshold,
        }
    }

    /// Score every known tool and produce the decision trace.
    ///
    /// A tool is selected iff its final score reaches that tool's threshold;
    /// nothing else affects selection. Never fails: an empty target role
    /// simply skips the keyword rules.
    pub fn decide(&self, profile: &Profile) -> DecisionTrace {
        let headline = profile.headline.trim().to_lowercase();
        let summary = profile.summary.trim().to_lowercase();
        let role = profile.target_role.trim().to_lowercase();

        let (headline_score, headline_reasons) = self.score_headline(&headline, &role);
        let (summary_score, summary_reasons) =
            self.score_summary(&summary, &role, headline_score);

        let candidates = vec![
            ScoredCandidate {
                tool: ToolKind::Headline,
                score: headline_score,
                reasons: headline_reasons,
                selected: headline_score >= self.config.headline_threshold,
            },
            ScoredCandidate {
                tool: ToolKind::Summary,
                score: summary_score,
                reasons: summary_reasons,
                selected: summary_score >= self.config.summary_threshold,
            },
        ];

        let trace = DecisionTrace { candidates };

        info!(
            headline_score,
            summary_score,
            selected = ?trace.selected().map(|c| c.tool.as_str()).collect::<Vec<_>>(),
            "decision trace computed"
        );

        trace
    }

    fn score_headline(&self, headline: &str, role: &str) -> (u32, Vec<String>) {
        let mut score = 0;
        let mut reasons = Vec::new();

        // Missing field short-circuits: it already clears the threshold.
        if headline.is_empty() {
            score += self.config.missing_field_score;
            reasons.push("headline missing".to_string());
            return (score, reasons);
        }

        if self.config.generic_headlines.iter().any(|g| g == headline) {
            score += 2;
            reasons.push("generic headline".to_string());
        }

        if let Some(role_token) = role.split_whitespace().next() {
            if !headline.contains(role_token) {
                score += 2;
                reasons.push("missing role keyword".to_string());
            }
        }

        if headline.len() < self.config.headline_min_len {
            score += 1;
            reasons.push("headline too short".to_string());
        }

        (score, reasons)
    }

    fn score_summary(&self, summary: &str, role: &str, headline_score: u32) -> (u32, Vec<String>) {
        let mut score = 0;
        let mut reasons = Vec::new();

        if summary.is_empty() {
            score += self.config.missing_field_score;
            reasons.push("summary missing".to_string());
        } else {
            let keywords = role
                .split_whitespace()
                .next()
                .and_then(|token| self.config.role_keywords.get(token));

            if let Some(keywords) = keywords {
                if !keywords.iter().any(|k| summary.contains(k.as_str())) {
                    score += 2;
                    reasons.push("missing role keywords".to_string());
                }
            }

            if summary.len() < self.config.summary_min_len {
                score += 1;
                reasons.push("summary too short".to_string());
            }
        }

        // A strong headline suppresses a summary rewrite unless the summary
        // problem is critical.
        if headline_score == 0 && score < self.config.critical_summary_score {
            score = 0;
            reasons.push("summary acceptable given strong headline".to_string());
        }

        (score, reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DecisionEngine {
        DecisionEngine::default()
    }

    fn decide(headline: &str, summary: &str, role: &str) -> DecisionTrace {
        engine().decide(&Profile::new(headline, summary, role))
    }

    #[test]
    fn test_identical_input_identical_trace() {
        let profile = Profile::new("Student", "I like computers", "Backend Developer");
        let engine = engine();

        let first = engine.decide(&profile);
        for _ in 0..10 {
            assert_eq!(engine.decide(&profile), first);
        }
    }

    #[test]
    fn test_selection_matches_threshold() {
        let engine = engine();
        let profiles = [
            Profile::new("", "", ""),
            Profile::new("Student", "short", "Backend Developer"),
            Profile::new(
                "Backend Developer | APIs & Server-Side Systems",
                "Experienced backend developer building APIs in Python and Java. \
                 I design server architectures and data pipelines for production use.",
                "Backend Developer",
            ),
            Profile::new("Engineer", "Motivated graduate", "QA Engineer"),
        ];

        for profile in &profiles {
            let trace = engine.decide(profile);
            for candidate in &trace.candidates {
                assert_eq!(
                    candidate.selected,
                    candidate.score >= engine.threshold(candidate.tool),
                    "threshold law violated for {:?}",
                    candidate
                );
            }
        }
    }

    #[test]
    fn test_missing_headline_scores_maximally() {
        let trace = decide("", "Experienced engineer", "Senior Backend Engineer");

        let headline = trace.candidate(ToolKind::Headline).unwrap();
        assert_eq!(headline.score, 3);
        assert!(headline.selected);
        assert_eq!(headline.reasons, vec!["headline missing"]);
    }

    #[test]
    fn test_strong_profile_selects_nothing() {
        let trace = decide(
            "Backend Developer | APIs & Server-Side Systems",
            "Backend developer with years of experience designing APIs and \
             server-side systems in Python and Java, focused on reliability \
             and scalability in production.",
            "Backend Developer",
        );

        assert_eq!(trace.selected().count(), 0);
        let summary = trace.candidate(ToolKind::Summary).unwrap();
        assert!(summary
            .reasons
            .iter()
            .any(|r| r == "summary acceptable given strong headline"));
    }

    #[test]
    fn test_generic_headline_selected() {
        let trace = decide("Student", "whatever", "Backend Developer");

        let headline = trace.candidate(ToolKind::Headline).unwrap();
        assert!(headline.selected);
        assert!(headline.reasons.contains(&"generic headline".to_string()));
        assert!(headline
            .reasons
            .contains(&"missing role keyword".to_string()));
    }

    #[test]
    fn test_empty_role_skips_keyword_rules() {
        let trace = decide("Some headline here ok", "A summary that is fine", "");

        let headline = trace.candidate(ToolKind::Headline).unwrap();
        assert!(!headline
            .reasons
            .contains(&"missing role keyword".to_string()));

        let summary = trace.candidate(ToolKind::Summary).unwrap();
        assert!(!summary
            .reasons
            .contains(&"missing role keywords".to_string()));
    }

    #[test]
    fn test_missing_summary_survives_strong_headline() {
        // Empty summary scores at the critical level, so the suppression
        // rule must not zero it out.
        let trace = decide(
            "Backend Developer | APIs & Server-Side Systems",
            "",
            "Backend Developer",
        );

        let summary = trace.candidate(ToolKind::Summary).unwrap();
        assert_eq!(summary.score, 3);
        assert!(summary.selected);
    }

    #[test]
    fn test_weak_summary_suppressed_by_strong_headline() {
        // Keywords are present but the summary is short: a non-critical
        // problem, zeroed because the headline is already strong.
        let trace = decide(
            "Backend Developer | APIs & Server-Side Systems",
            "I build APIs in Python",
            "Backend Developer",
        );

        let summary = trace.candidate(ToolKind::Summary).unwrap();
        assert_eq!(summary.score, 0);
        assert!(!summary.selected);
    }

    #[test]
    fn test_custom_config() {
        let config = DecisionConfig {
            headline_threshold: 100,
            ..Default::default()
        };
        let engine = DecisionEngine::new(config);

        let trace = engine.decide(&Profile::new("", "", "Backend Developer"));
        assert!(!trace.candidate(ToolKind::Headline).unwrap().selected);
    }
}
