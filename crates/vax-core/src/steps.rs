use crate::catalog::Catalog;
use crate::config::SessionConfig;
use crate::filter;
use crate::options::OptionSet;
use crate::session::{Choice, Selections};
use crate::types::Step;

// ---------------------------------------------------------------------------
// StepContext
// ---------------------------------------------------------------------------

pub struct StepContext<'a> {
    pub catalog: &'a Catalog,
    pub selections: &'a Selections,
    pub config: &'a SessionConfig,
}

impl StepContext<'_> {
    fn second_dose_chosen(&self) -> bool {
        self.selections.dose.as_deref() == Some(self.config.second_dose.trigger_dose.as_str())
    }
}

// ---------------------------------------------------------------------------
// StepRule
// ---------------------------------------------------------------------------

/// What a step expects back from the client.
#[derive(Clone, Copy)]
pub enum StepInput {
    /// Pick a key from the option set the step builds.
    Menu(fn(&StepContext) -> OptionSet<Choice>),
    /// Type a `DD/MM/YYYY` date.
    Date,
}

/// One row of the dialogue table.
#[derive(Clone, Copy)]
pub struct StepRule {
    pub step: Step,
    pub prompt: &'static str,
    pub input: StepInput,
    pub next: fn(&StepContext) -> Step,
    /// `None` makes "back" a re-prompt.
    pub back: Option<fn(&StepContext) -> Step>,
}

// ---------------------------------------------------------------------------
// Option builders
// ---------------------------------------------------------------------------

fn sel(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn dose_menu(ctx: &StepContext) -> OptionSet<Choice> {
    filter::list_doses(ctx.catalog).map(Choice::Dose)
}

fn age_group_menu(ctx: &StepContext) -> OptionSet<Choice> {
    let s = ctx.selections;
    filter::list_age_groups(ctx.catalog, sel(&s.dose)).map(Choice::AgeGroup)
}

fn state_menu(ctx: &StepContext) -> OptionSet<Choice> {
    let s = ctx.selections;
    filter::list_states(ctx.catalog, sel(&s.age_group), sel(&s.dose)).map(Choice::State)
}

fn district_menu(ctx: &StepContext) -> OptionSet<Choice> {
    let s = ctx.selections;
    filter::list_districts(
        ctx.catalog,
        sel(&s.state),
        sel(&s.age_group),
        sel(&s.dose),
    )
    .map(Choice::District)
}

fn hospital_menu(ctx: &StepContext) -> OptionSet<Choice> {
    let s = ctx.selections;
    filter::list_hospitals(
        ctx.catalog,
        sel(&s.district),
        sel(&s.state),
        sel(&s.age_group),
        sel(&s.dose),
    )
    .map(Choice::Hospital)
}

fn slot_menu(ctx: &StepContext) -> OptionSet<Choice> {
    let s = ctx.selections;
    filter::list_slots(
        ctx.catalog,
        sel(&s.hospital),
        sel(&s.district),
        sel(&s.state),
        sel(&s.age_group),
        sel(&s.dose),
    )
    .map(Choice::Slot)
}

// ---------------------------------------------------------------------------
// Default table
// ---------------------------------------------------------------------------

pub fn default_steps() -> Vec<StepRule> {
    vec![
        StepRule {
            step: Step::DoseSelect,
            prompt: "Select the Dose of Vaccination:",
            input: StepInput::Menu(dose_menu),
            next: |ctx| {
                if ctx.second_dose_chosen() {
                    Step::FirstDoseDateEntry
                } else {
                    Step::AgeGroupSelect
                }
            },
            back: None,
        },
        StepRule {
            step: Step::FirstDoseDateEntry,
            prompt: "Provide the date of First Vaccination Dose (DD/MM/YYYY), for e.g. 12/5/2021",
            input: StepInput::Date,
            next: |_| Step::AgeGroupSelect,
            back: Some(|_| Step::DoseSelect),
        },
        StepRule {
            step: Step::AgeGroupSelect,
            prompt: "Select the Age Group:",
            input: StepInput::Menu(age_group_menu),
            next: |_| Step::StateSelect,
            back: Some(|ctx| {
                if ctx.second_dose_chosen() {
                    Step::FirstDoseDateEntry
                } else {
                    Step::DoseSelect
                }
            }),
        },
        StepRule {
            step: Step::StateSelect,
            prompt: "Select the State:",
            input: StepInput::Menu(state_menu),
            next: |_| Step::DistrictSelect,
            back: Some(|_| Step::AgeGroupSelect),
        },
        StepRule {
            step: Step::DistrictSelect,
            prompt: "Select the District:",
            input: StepInput::Menu(district_menu),
            next: |_| Step::HospitalSelect,
            back: Some(|_| Step::StateSelect),
        },
        StepRule {
            step: Step::HospitalSelect,
            prompt: "Select the Vaccination Center Name:",
            input: StepInput::Menu(hospital_menu),
            next: |_| Step::SlotSelect,
            back: Some(|_| Step::DistrictSelect),
        },
        StepRule {
            step: Step::SlotSelect,
            prompt: "Select one of the available slots to schedule the Appointment:",
            input: StepInput::Menu(slot_menu),
            next: |_| Step::Scheduled,
            back: Some(|_| Step::HospitalSelect),
        },
    ]
}
