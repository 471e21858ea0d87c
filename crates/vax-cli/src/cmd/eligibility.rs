use crate::output::print_json;
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use vax_core::config::Config;
use vax_core::eligibility::{self, Eligibility, DATE_FORMAT};

#[derive(Serialize)]
struct Report {
    first_dose: NaiveDate,
    today: NaiveDate,
    weeks: i64,
    eligibility: Eligibility,
    may_proceed: bool,
}

pub fn run(root: &Path, date: &str, today: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let first_dose = eligibility::parse_date(date)?;
    let today = match today {
        Some(t) => eligibility::parse_date(t).context("invalid --today")?,
        None => chrono::Local::now().date_naive(),
    };

    let weeks = eligibility::weeks_since(first_dose, today);
    let band = Eligibility::classify(weeks, config.session.second_dose.window());

    if json {
        return print_json(&Report {
            first_dose,
            today,
            weeks,
            eligibility: band,
            may_proceed: band.may_proceed(),
        });
    }

    println!("First dose:  {}", first_dose.format(DATE_FORMAT));
    println!("Today:       {}", today.format(DATE_FORMAT));
    println!("Weeks since: {weeks}");
    let detail = match band {
        Eligibility::Reject => "first dose date is in the future".to_string(),
        Eligibility::NotYetEligible { weeks_remaining } => {
            format!("not eligible yet, try after {weeks_remaining} week(s)")
        }
        Eligibility::OnTime => "eligible and within the recommended window".to_string(),
        Eligibility::Late { weeks_late } => {
            format!("eligible, late by {weeks_late} week(s)")
        }
    };
    println!("Band:        {} ({detail})", band.as_str());
    Ok(())
}
