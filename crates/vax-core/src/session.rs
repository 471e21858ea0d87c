use crate::catalog::Catalog;
use crate::config::SessionConfig;
use crate::eligibility::{self, Eligibility};
use crate::options::{DoseOption, HospitalOption, OptionSet, SlotOption};
use crate::steps::{default_steps, StepContext, StepInput, StepRule};
use crate::types::{CloseReason, InvalidReset, Step};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Choice
// ---------------------------------------------------------------------------

/// A value the client can pick at one of the menu steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Dose(DoseOption),
    AgeGroup(String),
    State(String),
    District(String),
    Hospital(HospitalOption),
    Slot(SlotOption),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Dose(d) => write!(f, "{d}"),
            Choice::AgeGroup(v) | Choice::State(v) | Choice::District(v) => f.write_str(v),
            Choice::Hospital(h) => write!(f, "{h}"),
            Choice::Slot(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for Choice {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Choice::Dose(d) => d.serialize(s),
            Choice::AgeGroup(v) | Choice::State(v) | Choice::District(v) => s.serialize_str(v),
            Choice::Hospital(h) => h.serialize(s),
            Choice::Slot(x) => x.serialize(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selections {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_dose: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<u32>,
}

impl Selections {
    pub fn record(&mut self, choice: &Choice) {
        match choice {
            Choice::Dose(d) => self.dose = Some(d.dose.clone()),
            Choice::AgeGroup(v) => self.age_group = Some(v.clone()),
            Choice::State(v) => self.state = Some(v.clone()),
            Choice::District(v) => self.district = Some(v.clone()),
            Choice::Hospital(h) => {
                self.hospital = Some(h.hospital.clone());
                self.vaccine = Some(h.vaccine.clone());
            }
            Choice::Slot(s) => {
                self.date = Some(s.date.clone());
                self.slots = Some(s.slots);
            }
        }
    }

    /// Forget everything chosen at `step` and after it.
    pub fn clear_from(&mut self, step: Step) {
        if step <= Step::DoseSelect {
            self.dose = None;
        }
        if step <= Step::FirstDoseDateEntry {
            self.first_dose = None;
        }
        if step <= Step::AgeGroupSelect {
            self.age_group = None;
        }
        if step <= Step::StateSelect {
            self.state = None;
        }
        if step <= Step::DistrictSelect {
            self.district = None;
        }
        if step <= Step::HospitalSelect {
            self.hospital = None;
            self.vaccine = None;
        }
        if step <= Step::SlotSelect {
            self.date = None;
            self.slots = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One inbound line, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Quit,
    Back,
    Reply(&'a str),
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "q" | "Q" => Input::Quit,
            "b" | "B" => Input::Back,
            other => Input::Reply(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Message / Reply
// ---------------------------------------------------------------------------

/// Outbound dialogue events. Rendering to text lives in `wire`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Banner,
    Prompt {
        step: Step,
        title: &'static str,
        options: Option<OptionSet<Choice>>,
    },
    Selected(Choice),
    DateAccepted {
        date: String,
        weeks: i64,
    },
    NotEligible {
        weeks_remaining: i64,
    },
    Late {
        weeks_late: i64,
    },
    OnTime,
    InvalidDate,
    Invalid {
        count: u32,
    },
    InvalidLimit {
        count: u32,
    },
    NoSlots,
    Scheduled,
    Farewell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub messages: Vec<Message>,
    /// Set when the session ended with this reply.
    pub close: Option<CloseReason>,
}

impl Reply {
    fn open(messages: Vec<Message>) -> Self {
        Self {
            messages,
            close: None,
        }
    }

    fn closed(messages: Vec<Message>, reason: CloseReason) -> Self {
        Self {
            messages,
            close: Some(reason),
        }
    }

    pub fn awaits_input(&self) -> bool {
        self.close.is_none()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    catalog: Arc<Catalog>,
    config: SessionConfig,
    rules: Vec<StepRule>,
    today: NaiveDate,
    step: Step,
    selections: Selections,
    invalid_count: u32,
    menu: Option<OptionSet<Choice>>,
    close_reason: Option<CloseReason>,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, config: SessionConfig, today: NaiveDate) -> Self {
        Self {
            catalog,
            config,
            rules: default_steps(),
            today,
            step: Step::DoseSelect,
            selections: Selections::default(),
            invalid_count: 0,
            menu: None,
            close_reason: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn invalid_count(&self) -> u32 {
        self.invalid_count
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    pub fn is_closed(&self) -> bool {
        self.close_reason.is_some()
    }

    /// The option set the last prompt offered, if the step is a menu.
    pub fn menu(&self) -> Option<&OptionSet<Choice>> {
        self.menu.as_ref()
    }

    /// Banner and first prompt.
    pub fn start(&mut self) -> Reply {
        let mut messages = vec![Message::Banner];
        messages.extend(self.prompt());
        Reply::open(messages)
    }

    /// Feed one client line. Once closed, every call returns an empty reply.
    pub fn handle(&mut self, line: &str) -> Reply {
        if let Some(reason) = self.close_reason {
            return Reply::closed(Vec::new(), reason);
        }
        match Input::parse(line) {
            Input::Quit => self.close(Vec::new(), CloseReason::Quit),
            Input::Back => self.back(),
            Input::Reply(text) => match self.rule().map(|r| r.input) {
                Some(StepInput::Date) => self.enter_date(text),
                Some(StepInput::Menu(_)) => self.select(text),
                None => self.disconnect(),
            },
        }
    }

    /// The peer went away. Nothing is sent.
    pub fn disconnect(&mut self) -> Reply {
        if self.close_reason.is_none() {
            self.finish(CloseReason::PeerDisconnected);
        }
        Reply::closed(Vec::new(), CloseReason::PeerDisconnected)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn rule(&self) -> Option<&StepRule> {
        self.rules.iter().find(|r| r.step == self.step)
    }

    fn ctx(&self) -> StepContext<'_> {
        StepContext {
            catalog: &self.catalog,
            selections: &self.selections,
            config: &self.config,
        }
    }

    fn prompt(&mut self) -> Option<Message> {
        let rule = self.rule()?;
        let (title, input) = (rule.prompt, rule.input);
        let options = match input {
            StepInput::Menu(build) => Some(build(&self.ctx())),
            StepInput::Date => None,
        };
        self.menu = options.clone();
        Some(Message::Prompt {
            step: self.step,
            title,
            options,
        })
    }

    fn reprompt(&mut self, mut messages: Vec<Message>) -> Reply {
        messages.extend(self.prompt());
        Reply::open(messages)
    }

    fn back(&mut self) -> Reply {
        if let Some(back) = self.rule().and_then(|r| r.back) {
            let previous = back(&self.ctx());
            self.selections.clear_from(previous);
            self.step = previous;
        }
        self.reprompt(Vec::new())
    }

    fn advance(&mut self, mut messages: Vec<Message>) -> Reply {
        let next = match self.rule().map(|r| r.next) {
            Some(next) => next(&self.ctx()),
            None => Step::Closed,
        };
        if self.config.invalid_reset == InvalidReset::PerStep {
            self.invalid_count = 0;
        }
        if next == Step::Scheduled {
            messages.push(Message::Scheduled);
            return self.close(messages, CloseReason::Scheduled);
        }
        self.step = next;
        self.reprompt(messages)
    }

    fn select(&mut self, text: &str) -> Reply {
        let Some(choice) = self.menu.as_ref().and_then(|m| m.resolve(text)).cloned() else {
            return self.strike();
        };
        if let Choice::Slot(slot) = &choice {
            if slot.slots == 0 {
                return self.reprompt(vec![Message::Selected(choice), Message::NoSlots]);
            }
        }
        self.selections.record(&choice);
        self.advance(vec![Message::Selected(choice)])
    }

    fn enter_date(&mut self, text: &str) -> Reply {
        let Ok(date) = eligibility::parse_date(text) else {
            return self.reprompt(vec![Message::InvalidDate]);
        };
        let weeks = eligibility::weeks_since(date, self.today);
        let band = Eligibility::classify(weeks, self.config.second_dose.window());
        let accepted = Message::DateAccepted {
            date: text.to_string(),
            weeks,
        };
        match band {
            Eligibility::Reject => self.reprompt(vec![Message::InvalidDate]),
            Eligibility::NotYetEligible { weeks_remaining } => self.close(
                vec![accepted, Message::NotEligible { weeks_remaining }],
                CloseReason::NotEligible,
            ),
            Eligibility::OnTime => {
                self.selections.first_dose = Some(date);
                self.advance(vec![accepted, Message::OnTime])
            }
            Eligibility::Late { weeks_late } => {
                self.selections.first_dose = Some(date);
                self.advance(vec![accepted, Message::Late { weeks_late }])
            }
        }
    }

    fn strike(&mut self) -> Reply {
        self.invalid_count += 1;
        let count = self.invalid_count;
        if count >= self.config.max_invalid {
            return self.close(
                vec![Message::InvalidLimit { count }],
                CloseReason::TooManyInvalid,
            );
        }
        self.reprompt(vec![Message::Invalid { count }])
    }

    fn close(&mut self, mut messages: Vec<Message>, reason: CloseReason) -> Reply {
        messages.push(Message::Farewell);
        self.finish(reason);
        Reply::closed(messages, reason)
    }

    fn finish(&mut self, reason: CloseReason) {
        self.step = match reason {
            CloseReason::Scheduled => Step::Scheduled,
            _ => Step::Closed,
        };
        self.menu = None;
        self.close_reason = Some(reason);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
