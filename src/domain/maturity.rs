//! Digital maturity questionnaire, scoring and service recommendations.
//!
//! The score is the plain mean of five 1-5 answers. It only selects a tier
//! label and a pair of recommended offerings; it has no other effect.

use serde::{Deserialize, Serialize};

pub const MIN_ANSWER: u8 = 1;
pub const MAX_ANSWER: u8 = 5;

const INITIAL_CEILING: f64 = 2.0;
const DEVELOPING_CEILING: f64 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    DataGovernance,
    AnalyticsCapability,
    TechnologyInfrastructure,
    DataLiteracy,
    BusinessAlignment,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::DataGovernance,
        Dimension::AnalyticsCapability,
        Dimension::TechnologyInfrastructure,
        Dimension::DataLiteracy,
        Dimension::BusinessAlignment,
    ];
}

/// Per-dimension answers, stored as an opaque blob on the profile row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityAssessment {
    pub data_governance: u8,
    pub analytics_capability: u8,
    pub technology_infrastructure: u8,
    pub data_literacy: u8,
    pub business_alignment: u8,
}

impl MaturityAssessment {
    #[cfg(test)]
    pub fn uniform(answer: u8) -> Self {
        Self {
            data_governance: answer,
            analytics_capability: answer,
            technology_infrastructure: answer,
            data_literacy: answer,
            business_alignment: answer,
        }
    }

    pub fn answer(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::DataGovernance => self.data_governance,
            Dimension::AnalyticsCapability => self.analytics_capability,
            Dimension::TechnologyInfrastructure => self.technology_infrastructure,
            Dimension::DataLiteracy => self.data_literacy,
            Dimension::BusinessAlignment => self.business_alignment,
        }
    }

    pub fn set(&mut self, dimension: Dimension, answer: u8) {
        let slot = match dimension {
            Dimension::DataGovernance => &mut self.data_governance,
            Dimension::AnalyticsCapability => &mut self.analytics_capability,
            Dimension::TechnologyInfrastructure => &mut self.technology_infrastructure,
            Dimension::DataLiteracy => &mut self.data_literacy,
            Dimension::BusinessAlignment => &mut self.business_alignment,
        };
        *slot = answer;
    }

    /// Arithmetic mean of the five answers, not rounded.
    pub fn score(&self) -> f64 {
        let total: u32 = Dimension::ALL
            .iter()
            .map(|dimension| u32::from(self.answer(*dimension)))
            .sum();
        f64::from(total) / Dimension::ALL.len() as f64
    }

    pub fn tier(&self) -> MaturityTier {
        MaturityTier::from_score(self.score())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaturityTier {
    Initial,
    Developing,
    Advanced,
}

impl MaturityTier {
    pub fn from_score(score: f64) -> Self {
        if score <= INITIAL_CEILING {
            Self::Initial
        } else if score <= DEVELOPING_CEILING {
            Self::Developing
        } else {
            Self::Advanced
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Developing => "Developing",
            Self::Advanced => "Advanced",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Initial => "Your company is in the early stages of its digital transformation",
            Self::Developing => "You have a solid base, with clear room for improvement",
            Self::Advanced => "Your company has mature analytical capabilities",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecommendation {
    pub title: &'static str,
    pub description: &'static str,
    pub price: &'static str,
    pub features: &'static [&'static str],
    pub recommended: bool,
}

pub fn recommendations(score: f64) -> Vec<ServiceRecommendation> {
    match MaturityTier::from_score(score) {
        MaturityTier::Initial => vec![
            ServiceRecommendation {
                title: "Basic Digital Diagnostic",
                description: "Full assessment of your current state and a transformation roadmap",
                price: "Free",
                features: &[
                    "Digital maturity analysis",
                    "Opportunity identification",
                    "Basic action plan",
                    "Priority recommendations",
                ],
                recommended: true,
            },
            ServiceRecommendation {
                title: "Dashboard Implementation",
                description: "Basic dashboards to visualise your main KPIs",
                price: "$299/month",
                features: &[
                    "Up to 5 dashboards",
                    "Connection to 3 data sources",
                    "Automatic refresh",
                    "Email support",
                ],
                recommended: false,
            },
        ],
        MaturityTier::Developing => vec![
            ServiceRecommendation {
                title: "Predictive Analytics",
                description: "Machine learning models to predict trends and behaviour",
                price: "$599/month",
                features: &[
                    "Custom predictive models",
                    "Churn and retention analysis",
                    "Sales forecasting",
                    "Automatic alerts",
                ],
                recommended: true,
            },
            ServiceRecommendation {
                title: "Process Optimisation",
                description: "Find and improve processes through data analysis",
                price: "$899/month",
                features: &[
                    "Operational efficiency analysis",
                    "Bottleneck identification",
                    "Improvement recommendations",
                    "KPI tracking",
                ],
                recommended: false,
            },
        ],
        MaturityTier::Advanced => vec![
            ServiceRecommendation {
                title: "Advanced AI and Automation",
                description: "AI solutions that automate decisions",
                price: "$1,299/month",
                features: &[
                    "Custom AI models",
                    "Decision automation",
                    "Real-time analysis",
                    "Integration with existing systems",
                ],
                recommended: true,
            },
            ServiceRecommendation {
                title: "Strategic Consulting",
                description: "Strategic advice to get the most value from your data",
                price: "$2,499/month",
                features: &[
                    "Custom data strategy",
                    "Transformation roadmap",
                    "Team training",
                    "Dedicated support",
                ],
                recommended: false,
            },
        ],
    }
}

pub struct Question {
    pub dimension: Dimension,
    pub title: &'static str,
    pub prompt: &'static str,
    /// Option labels for answers 1 through 5.
    pub options: [&'static str; 5],
}

pub const QUESTIONNAIRE: [Question; 5] = [
    Question {
        dimension: Dimension::DataGovernance,
        title: "Data Governance",
        prompt: "How would you describe the current state of data governance in your company?",
        options: [
            "We have no defined data policies",
            "We have some basic policies",
            "Policies are defined but not fully implemented",
            "Policies are implemented and monitored",
            "Mature, optimised data governance",
        ],
    },
    Question {
        dimension: Dimension::AnalyticsCapability,
        title: "Analytics Capability",
        prompt: "How advanced are your organisation's analytical capabilities?",
        options: [
            "Basic reports only",
            "Some dashboards and metrics",
            "Basic predictive analysis",
            "Advanced analytics and machine learning",
            "AI and real-time analysis",
        ],
    },
    Question {
        dimension: Dimension::TechnologyInfrastructure,
        title: "Technology Infrastructure",
        prompt: "How would you rate your technology infrastructure for data?",
        options: [
            "Legacy systems without integration",
            "Some integrated systems",
            "Basic centralised data platform",
            "Modern cloud infrastructure",
            "Fully optimised data architecture",
        ],
    },
    Question {
        dimension: Dimension::DataLiteracy,
        title: "Data Literacy",
        prompt: "What is the level of data literacy in your team?",
        options: [
            "Very limited, few people understand the data",
            "Basic knowledge in some areas",
            "Moderate data competence",
            "Good literacy level",
            "Highly developed data culture",
        ],
    },
    Question {
        dimension: Dimension::BusinessAlignment,
        title: "Business Alignment",
        prompt: "How aligned is your data with business goals?",
        options: [
            "No clear alignment",
            "Basic alignment",
            "Some KPIs connected to the business",
            "Metrics aligned with strategy",
            "Data as a competitive advantage",
        ],
    },
];

pub fn is_valid_answer(answer: u8) -> bool {
    (MIN_ANSWER..=MAX_ANSWER).contains(&answer)
}
