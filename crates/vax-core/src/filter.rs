//! Narrowing queries over the catalog.
//!
//! Every query is a pure function of the catalog and the selections made so
//! far. Matching is exact, case-sensitive string equality. A query with no
//! matching rows returns an empty set.

use crate::catalog::{Catalog, SlotRow};
use crate::options::{DoseOption, HospitalOption, OptionSet, SlotOption};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Filter key
// ---------------------------------------------------------------------------

/// Partial key over the selection hierarchy. `None` fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Filter<'a> {
    pub dose: Option<&'a str>,
    pub age_group: Option<&'a str>,
    pub state: Option<&'a str>,
    pub district: Option<&'a str>,
    pub hospital: Option<&'a str>,
}

impl<'a> Filter<'a> {
    pub fn matches(&self, row: &SlotRow) -> bool {
        fn eq(want: Option<&str>, have: &str) -> bool {
            want.map_or(true, |w| w == have)
        }
        eq(self.dose, &row.dose)
            && eq(self.age_group, &row.age_group)
            && eq(self.state, &row.state)
            && eq(self.district, &row.district)
            && eq(self.hospital, &row.hospital)
    }

    pub fn rows<'c>(self, catalog: &'c Catalog) -> impl Iterator<Item = &'c SlotRow> + 'c
    where
        'a: 'c,
    {
        catalog.rows().iter().filter(move |r| self.matches(r))
    }
}

fn sorted_distinct<'c>(
    rows: impl Iterator<Item = &'c SlotRow>,
    field: fn(&SlotRow) -> &str,
) -> OptionSet<String> {
    let distinct: BTreeSet<&str> = rows.map(field).collect();
    OptionSet::numbered(distinct.into_iter().map(str::to_string))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Distinct doses in first-seen order, keyed by the dose value itself.
pub fn list_doses(catalog: &Catalog) -> OptionSet<DoseOption> {
    OptionSet::keyed(catalog.rows().iter().map(|r| {
        (
            r.dose.clone(),
            DoseOption {
                dose: r.dose.clone(),
            },
        )
    }))
}

pub fn list_age_groups(catalog: &Catalog, dose: &str) -> OptionSet<String> {
    let key = Filter {
        dose: Some(dose),
        ..Filter::default()
    };
    sorted_distinct(key.rows(catalog), |r| r.age_group.as_str())
}

pub fn list_states(catalog: &Catalog, age_group: &str, dose: &str) -> OptionSet<String> {
    let key = Filter {
        dose: Some(dose),
        age_group: Some(age_group),
        ..Filter::default()
    };
    sorted_distinct(key.rows(catalog), |r| r.state.as_str())
}

pub fn list_districts(
    catalog: &Catalog,
    state: &str,
    age_group: &str,
    dose: &str,
) -> OptionSet<String> {
    let key = Filter {
        dose: Some(dose),
        age_group: Some(age_group),
        state: Some(state),
        ..Filter::default()
    };
    sorted_distinct(key.rows(catalog), |r| r.district.as_str())
}

/// Distinct hospital/vaccine pairs, sorted by hospital then vaccine.
pub fn list_hospitals(
    catalog: &Catalog,
    district: &str,
    state: &str,
    age_group: &str,
    dose: &str,
) -> OptionSet<HospitalOption> {
    let key = Filter {
        dose: Some(dose),
        age_group: Some(age_group),
        state: Some(state),
        district: Some(district),
        hospital: None,
    };
    let pairs: BTreeSet<HospitalOption> = key
        .rows(catalog)
        .map(|r| HospitalOption {
            hospital: r.hospital.clone(),
            vaccine: r.vaccine.clone(),
        })
        .collect();
    OptionSet::numbered(pairs)
}

/// Date/slot pairs for the matching row in declared order; repeats collapsed.
pub fn list_slots(
    catalog: &Catalog,
    hospital: &str,
    district: &str,
    state: &str,
    age_group: &str,
    dose: &str,
) -> OptionSet<SlotOption> {
    let key = Filter {
        dose: Some(dose),
        age_group: Some(age_group),
        state: Some(state),
        district: Some(district),
        hospital: Some(hospital),
    };
    let mut seen: Vec<SlotOption> = Vec::new();
    for row in key.rows(catalog) {
        for entry in &row.slots_by_date {
            let option = SlotOption {
                date: entry.date.clone(),
                slots: entry.slots,
            };
            if !seen.contains(&option) {
                seen.push(option);
            }
        }
    }
    OptionSet::numbered(seen)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DateSlots;

    fn row(
        dose: &str,
        age: &str,
        state: &str,
        district: &str,
        hospital: &str,
        vaccine: &str,
    ) -> SlotRow {
        SlotRow {
            dose: dose.into(),
            age_group: age.into(),
            state: state.into(),
            district: district.into(),
            hospital: hospital.into(),
            vaccine: vaccine.into(),
            slots_by_date: vec![DateSlots::new("May 15", 0), DateSlots::new("May 16", 81)],
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_rows(vec![
            row("2", "45+", "Ladakh", "Leh", "Sonam Norboo", "Covishield"),
            row("1", "18+", "Kerala", "Ernakulam", "Aster", "Covaxin"),
            row("2", "18+", "Ladakh", "Kargil", "MedStar Hospital Center", "Covaxin"),
            row("2", "18+", "Ladakh", "Kargil", "District Hospital", "Covishield"),
            row("2", "18+", "Ladakh", "Kargil", "MedStar Hospital Center", "Covaxin"),
            row("2", "18+", "Goa", "South Goa", "Eden Clinic", "Covishield"),
        ])
        .unwrap()
    }

    fn labels(set: &OptionSet<String>) -> Vec<&str> {
        set.values().map(String::as_str).collect()
    }

    #[test]
    fn doses_keep_first_seen_order() {
        let doses = list_doses(&catalog());
        let shown: Vec<String> = doses.values().map(|d| d.to_string()).collect();
        assert_eq!(shown, ["Dose 2", "Dose 1"]);
        assert_eq!(doses.keys().collect::<Vec<_>>(), ["2", "1"]);
    }

    #[test]
    fn age_groups_are_sorted_and_renumbered() {
        let ages = list_age_groups(&catalog(), "2");
        assert_eq!(labels(&ages), ["18+", "45+"]);
        assert_eq!(ages.get("1").map(String::as_str), Some("18+"));
    }

    #[test]
    fn states_and_districts_narrow_by_every_key() {
        let c = catalog();
        assert_eq!(labels(&list_states(&c, "18+", "2")), ["Goa", "Ladakh"]);
        assert_eq!(labels(&list_districts(&c, "Ladakh", "18+", "2")), ["Kargil"]);
        assert!(list_districts(&c, "Ladakh", "18+", "1").is_empty());
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(list_states(&catalog(), "18+", "2")
            .values()
            .all(|s| s != "ladakh"));
        assert!(list_districts(&catalog(), "ladakh", "18+", "2").is_empty());
    }

    #[test]
    fn hospitals_collapse_duplicates_and_sort() {
        let hospitals = list_hospitals(&catalog(), "Kargil", "Ladakh", "18+", "2");
        let names: Vec<&str> = hospitals.values().map(|h| h.hospital.as_str()).collect();
        assert_eq!(names, ["District Hospital", "MedStar Hospital Center"]);
    }

    #[test]
    fn slots_follow_row_order() {
        let slots = list_slots(
            &catalog(),
            "MedStar Hospital Center",
            "Kargil",
            "Ladakh",
            "18+",
            "2",
        );
        assert_eq!(slots.len(), 2);
        assert_eq!(slots.get("1").map(|s| s.slots), Some(0));
        assert_eq!(slots.get("2").map(|s| s.date.as_str()), Some("May 16"));
    }

    #[test]
    fn empty_catalog_gives_empty_sets() {
        let empty = Catalog::default();
        assert!(list_doses(&empty).is_empty());
        assert!(list_age_groups(&empty, "1").is_empty());
    }
}
