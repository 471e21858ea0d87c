//! Line-oriented text form of dialogue messages.
//!
//! Server lines start with `>>> ` (prompt) or `<<< ` (info). An option set
//! travels on its own line as a JSON object in presentation order. A line of
//! exactly [`TURN_MARKER`] means the server is waiting for one reply line.

use crate::error::Result;
use crate::session::{Choice, Message, Reply};
use serde_json::Value;

pub const TURN_MARKER: &str = "==>";
pub const PROMPT_PREFIX: &str = ">>> ";
pub const INFO_PREFIX: &str = "<<< ";

const BANNER: &[&str] = &[
    "==================================================",
    "        VACCINATION APPOINTMENT SCHEDULER",
    "==================================================",
    "Reply with an option number. 'b' goes back, 'q' quits.",
];

// ---------------------------------------------------------------------------
// Server side
// ---------------------------------------------------------------------------

fn info(text: impl AsRef<str>) -> String {
    format!("{INFO_PREFIX}{}", text.as_ref())
}

fn selected_lines(choice: &Choice) -> Vec<String> {
    match choice {
        Choice::Dose(d) => vec![info(format!("Dose selected: {}", d.dose))],
        Choice::AgeGroup(v) => vec![info(format!("Selected Age Group: {v}"))],
        Choice::State(v) => vec![info(format!("Selected State: {v}"))],
        Choice::District(v) => vec![info(format!("Selected District: {v}"))],
        Choice::Hospital(h) => vec![info(format!("Selected Vaccination Center: {h}"))],
        Choice::Slot(s) => vec![
            info(format!("Selected Vaccination Appointment Date: {}", s.date)),
            info(format!("Available Slots on the selected Date: {}", s.slots)),
        ],
    }
}

/// The text lines for one message, without terminators.
pub fn render_message(message: &Message) -> Result<Vec<String>> {
    let lines = match message {
        Message::Banner => BANNER.iter().map(info).collect(),
        Message::Prompt { title, options, .. } => {
            let mut lines = vec![format!("{PROMPT_PREFIX}{title}")];
            if let Some(options) = options {
                lines.push(serde_json::to_string(options)?);
            }
            lines
        }
        Message::Selected(choice) => selected_lines(choice),
        Message::DateAccepted { date, weeks } => vec![
            info(format!("Date of First Vaccination Dose provided: {date}")),
            info(format!("Number of weeks from today: {weeks}")),
        ],
        Message::NotEligible { weeks_remaining } => vec![info(format!(
            "You are not eligible right now for 2nd Vaccination Dose! Try after {weeks_remaining} weeks."
        ))],
        Message::Late { weeks_late } => vec![info(format!(
            "You have been late in scheduling your 2nd Vaccination Dose by {weeks_late} weeks."
        ))],
        Message::OnTime => vec![info(
            "You are eligible for 2nd Vaccination Dose and are in the right time-frame to take it.",
        )],
        Message::InvalidDate => vec![info("Invalid Date provided of First Vaccination Dose")],
        Message::Invalid { count } => vec![info(format!(
            "Invalid input provided {count} time(s)! Try again."
        ))],
        Message::InvalidLimit { count } => vec![info(format!(
            "Invalid input provided {count} time(s)! Closing the connection."
        ))],
        Message::NoSlots => vec![info(
            "Selected Appointment Date has no available slots, select another date!",
        )],
        Message::Scheduled => vec![info(
            "Your appointment is scheduled. Make sure to carry ID Proof while you visit Vaccination Center!",
        )],
        Message::Farewell => vec![info("See ya! Visit again :)")],
    };
    Ok(lines)
}

/// Newline-terminated text for a whole reply, ending with the turn marker
/// when the session expects another line.
pub fn encode_reply(reply: &Reply) -> Result<String> {
    let mut out = String::new();
    for message in &reply.messages {
        for line in render_message(message)? {
            out.push_str(&line);
            out.push('\n');
        }
    }
    if reply.awaits_input() {
        out.push_str(TURN_MARKER);
        out.push('\n');
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Client side
// ---------------------------------------------------------------------------

/// One line received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    Prompt(String),
    Info(String),
    /// `(key, label)` pairs in presentation order.
    Options(Vec<(String, String)>),
    Turn,
    Text(String),
}

impl ServerLine {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line == TURN_MARKER {
            return Ok(ServerLine::Turn);
        }
        if let Some(rest) = line.strip_prefix(PROMPT_PREFIX) {
            return Ok(ServerLine::Prompt(rest.to_string()));
        }
        if let Some(rest) = line.strip_prefix(INFO_PREFIX) {
            return Ok(ServerLine::Info(rest.to_string()));
        }
        match line.find('{') {
            Some(0) => Ok(ServerLine::Options(parse_mapping(line)?)),
            _ => Ok(ServerLine::Text(line.to_string())),
        }
    }
}

fn label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", label(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Decode an option-set object into display pairs, keeping key order.
pub fn parse_mapping(text: &str) -> Result<Vec<(String, String)>> {
    let map: serde_json::Map<String, Value> = serde_json::from_str(text)?;
    Ok(map.iter().map(|(k, v)| (k.clone(), label(v))).collect())
}
