//! First-run questionnaire: company details, five maturity questions, summary.

use thiserror::Error;

use crate::{
    domain::{
        clock::Clock,
        maturity::{is_valid_answer, Dimension, MaturityAssessment, MaturityTier, QUESTIONNAIRE},
        profile::ProfileUpdate,
    },
    usecases::session::{SessionError, SessionStore},
};

/// Company info, one step per question, then the summary.
pub const TOTAL_STEPS: usize = QUESTIONNAIRE.len() + 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnboardingError {
    #[error("answers must be between 1 and 5, got {0}")]
    InvalidAnswer(u8),
    #[error("the current step is not a question")]
    NotAQuestion,
    #[error("the questionnaire is not complete")]
    Incomplete,
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CompanyInfo,
    Question(Dimension),
    Complete,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyInfo {
    pub company: String,
    pub job_title: String,
    pub employees: String,
}

impl CompanyInfo {
    fn is_filled(&self) -> bool {
        [&self.company, &self.job_title, &self.employees]
            .iter()
            .all(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingResult {
    pub assessment: MaturityAssessment,
    pub score: f64,
    pub tier: MaturityTier,
}

#[derive(Debug, Clone, Default)]
pub struct OnboardingWizard {
    step: usize,
    company: CompanyInfo,
    answers: [Option<u8>; 5],
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        match self.step {
            0 => Step::CompanyInfo,
            n if n <= QUESTIONNAIRE.len() => Step::Question(QUESTIONNAIRE[n - 1].dimension),
            _ => Step::Complete,
        }
    }

    /// 1-based position for "step N of TOTAL_STEPS".
    pub fn step_number(&self) -> usize {
        self.step + 1
    }

    pub fn progress_percent(&self) -> u8 {
        ((self.step_number() * 100) as f64 / TOTAL_STEPS as f64).round() as u8
    }

    pub fn company_info(&self) -> &CompanyInfo {
        &self.company
    }

    pub fn set_company_info(&mut self, info: CompanyInfo) {
        self.company = info;
    }

    /// Records an answer for the question on screen.
    pub fn answer(&mut self, value: u8) -> Result<(), OnboardingError> {
        let Step::Question(dimension) = self.step() else {
            return Err(OnboardingError::NotAQuestion);
        };
        if !is_valid_answer(value) {
            return Err(OnboardingError::InvalidAnswer(value));
        }
        self.answers[dimension_index(dimension)] = Some(value);
        Ok(())
    }

    pub fn answer_for(&self, dimension: Dimension) -> Option<u8> {
        self.answers[dimension_index(dimension)]
    }

    pub fn can_proceed(&self) -> bool {
        match self.step() {
            Step::CompanyInfo => self.company.is_filled(),
            Step::Question(dimension) => self.answer_for(dimension).is_some(),
            Step::Complete => true,
        }
    }

    /// Moves forward when the current step is satisfied. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        if !self.can_proceed() || self.step + 1 >= TOTAL_STEPS {
            return false;
        }
        self.step += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    /// Score and tier once every question has an answer.
    pub fn result(&self) -> Option<OnboardingResult> {
        let mut assessment = MaturityAssessment::default();
        for dimension in Dimension::ALL {
            assessment.set(dimension, self.answer_for(dimension)?);
        }

        Some(OnboardingResult {
            score: assessment.score(),
            tier: assessment.tier(),
            assessment,
        })
    }

    /// Completes onboarding. With `persist` set, the score, answers and company
    /// name are written to the signed-in profile.
    pub fn finish<C: Clock>(
        &self,
        session: &mut SessionStore<C>,
        persist: bool,
    ) -> Result<OnboardingResult, OnboardingError> {
        if self.step() != Step::Complete {
            return Err(OnboardingError::Incomplete);
        }
        let result = self.result().ok_or(OnboardingError::Incomplete)?;

        if persist {
            let company = self.company.company.trim();
            session.update_profile(ProfileUpdate {
                maturity_level: Some(result.score),
                maturity_assessment: Some(result.assessment.clone()),
                company: (!company.is_empty()).then(|| company.to_owned()),
                ..ProfileUpdate::default()
            })?;
        }

        tracing::info!(
            score = result.score,
            tier = result.tier.label(),
            persisted = persist,
            "onboarding finished"
        );
        Ok(result)
    }
}

fn dimension_index(dimension: Dimension) -> usize {
    Dimension::ALL
        .iter()
        .position(|candidate| *candidate == dimension)
        .unwrap_or_default()
}
