use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// Position in the dialogue. Variants are declared in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    DoseSelect,
    FirstDoseDateEntry,
    AgeGroupSelect,
    StateSelect,
    DistrictSelect,
    HospitalSelect,
    SlotSelect,
    Scheduled,
    Closed,
}

impl Step {
    pub fn all() -> &'static [Step] {
        &[
            Step::DoseSelect,
            Step::FirstDoseDateEntry,
            Step::AgeGroupSelect,
            Step::StateSelect,
            Step::DistrictSelect,
            Step::HospitalSelect,
            Step::SlotSelect,
            Step::Scheduled,
            Step::Closed,
        ]
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Step::Scheduled | Step::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::DoseSelect => "dose_select",
            Step::FirstDoseDateEntry => "first_dose_date_entry",
            Step::AgeGroupSelect => "age_group_select",
            Step::StateSelect => "state_select",
            Step::DistrictSelect => "district_select",
            Step::HospitalSelect => "hospital_select",
            Step::SlotSelect => "slot_select",
            Step::Scheduled => "scheduled",
            Step::Closed => "closed",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = crate::error::VaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::all()
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| crate::error::VaxError::InvalidStep(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// InvalidReset
// ---------------------------------------------------------------------------

/// When the invalid-input counter returns to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReset {
    /// Never: strikes accumulate across the whole session.
    #[default]
    Session,
    /// On every forward advance to a new step.
    PerStep,
}

impl InvalidReset {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidReset::Session => "session",
            InvalidReset::PerStep => "per_step",
        }
    }
}

impl fmt::Display for InvalidReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvalidReset {
    type Err = crate::error::VaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session" => Ok(InvalidReset::Session),
            "per_step" | "per-step" => Ok(InvalidReset::PerStep),
            _ => Err(crate::error::VaxError::InvalidPolicy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// CloseReason
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Scheduled,
    Quit,
    TooManyInvalid,
    NotEligible,
    PeerDisconnected,
}

impl CloseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseReason::Scheduled => "scheduled",
            CloseReason::Quit => "quit",
            CloseReason::TooManyInvalid => "too_many_invalid",
            CloseReason::NotEligible => "not_eligible",
            CloseReason::PeerDisconnected => "peer_disconnected",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
