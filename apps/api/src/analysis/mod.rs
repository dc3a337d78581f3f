//! Read-only views the analysis backend computes for a user, proxied so the
//! client only talks to this service.

pub mod handlers;

use std::str::FromStr;

use serde::Deserialize;

const DEFAULT_LIST_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Overview,
    AtsScore,
    SkillsGap,
    JobMatch,
    CareerPath,
    InterviewPrep,
    InterviewQuestions,
    ProgressHistory,
    ProgressTrends,
    JobRecommendations,
    SalaryInsights,
    Keywords,
    CourseRecommendations,
}

/// Optional parameters of `GET /api/v1/analysis/:kind`. Each view forwards
/// only the ones its backend endpoint understands.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub user_id: Option<String>,
    /// Role for job-match and interview-prep.
    pub role: Option<String>,
    pub target_role: Option<String>,
    pub location: Option<String>,
    pub limit: Option<u32>,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 13] = [
        AnalysisKind::Overview,
        AnalysisKind::AtsScore,
        AnalysisKind::SkillsGap,
        AnalysisKind::JobMatch,
        AnalysisKind::CareerPath,
        AnalysisKind::InterviewPrep,
        AnalysisKind::InterviewQuestions,
        AnalysisKind::ProgressHistory,
        AnalysisKind::ProgressTrends,
        AnalysisKind::JobRecommendations,
        AnalysisKind::SalaryInsights,
        AnalysisKind::Keywords,
        AnalysisKind::CourseRecommendations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Overview => "overview",
            AnalysisKind::AtsScore => "ats-score",
            AnalysisKind::SkillsGap => "skills-gap",
            AnalysisKind::JobMatch => "job-match",
            AnalysisKind::CareerPath => "career-path",
            AnalysisKind::InterviewPrep => "interview-prep",
            AnalysisKind::InterviewQuestions => "interview-questions",
            AnalysisKind::ProgressHistory => "progress-history",
            AnalysisKind::ProgressTrends => "progress-trends",
            AnalysisKind::JobRecommendations => "job-recommendations",
            AnalysisKind::SalaryInsights => "salary-insights",
            AnalysisKind::Keywords => "keywords",
            AnalysisKind::CourseRecommendations => "course-recommendations",
        }
    }

    /// Backend endpoint serving this view.
    pub fn path(&self) -> &'static str {
        match self {
            AnalysisKind::Overview => "/analysis/overview",
            AnalysisKind::AtsScore => "/analysis/ats-score",
            AnalysisKind::SkillsGap => "/analysis/skills-gap",
            AnalysisKind::JobMatch => "/analysis/job-match",
            AnalysisKind::CareerPath => "/analysis/career-path",
            AnalysisKind::InterviewPrep => "/interview/prep",
            AnalysisKind::InterviewQuestions => "/interview/questions",
            AnalysisKind::ProgressHistory => "/progress/history",
            AnalysisKind::ProgressTrends => "/progress/trends",
            AnalysisKind::JobRecommendations => "/jobs/recommendations",
            AnalysisKind::SalaryInsights => "/jobs/salary-insights",
            AnalysisKind::Keywords => "/jobs/keywords",
            AnalysisKind::CourseRecommendations => "/courses/recommendations",
        }
    }

    /// Backend query string for `user_id`, starting with the user.
    pub fn query_pairs(&self, user_id: &str, query: &AnalysisQuery) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("user_id", user_id.to_string())];
        let optional = |name: &'static str, value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (name, v.to_string()))
        };

        match self {
            AnalysisKind::SkillsGap | AnalysisKind::Keywords => {
                pairs.extend(optional("target_role", &query.target_role));
            }
            AnalysisKind::JobMatch | AnalysisKind::InterviewPrep => {
                pairs.extend(optional("role", &query.role));
            }
            AnalysisKind::SalaryInsights => {
                pairs.extend(optional("location", &query.location));
            }
            AnalysisKind::ProgressHistory
            | AnalysisKind::JobRecommendations
            | AnalysisKind::CourseRecommendations => {
                let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
                pairs.push(("limit", limit.to_string()));
            }
            AnalysisKind::Overview
            | AnalysisKind::AtsScore
            | AnalysisKind::CareerPath
            | AnalysisKind::InterviewQuestions
            | AnalysisKind::ProgressTrends => {}
        }
        pairs
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown analysis '{s}'"))
    }
}
