use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use serde::Serialize;
use std::fmt::Display;
use std::path::Path;
use vax_core::catalog::{Catalog, CatalogProvider, FileCatalog, SampleCatalog};
use vax_core::config::Config;
use vax_core::filter;
use vax_core::options::OptionSet;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum CatalogSubcommand {
    /// List the dose options
    Doses,

    /// List age groups offered for a dose
    Ages {
        #[arg(long)]
        dose: String,
    },

    /// List states for a dose and age group
    States {
        #[arg(long)]
        dose: String,
        #[arg(long = "age")]
        age_group: String,
    },

    /// List districts within a state
    Districts {
        #[arg(long)]
        dose: String,
        #[arg(long = "age")]
        age_group: String,
        #[arg(long)]
        state: String,
    },

    /// List vaccination centers within a district
    Hospitals {
        #[arg(long)]
        dose: String,
        #[arg(long = "age")]
        age_group: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        district: String,
    },

    /// List dates and open slots at a vaccination center
    Slots {
        #[arg(long)]
        dose: String,
        #[arg(long = "age")]
        age_group: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        district: String,
        #[arg(long)]
        hospital: String,
    },
}

// ---------------------------------------------------------------------------
// Provider selection
// ---------------------------------------------------------------------------

/// The configured catalog file, or the bundled sample when it does not exist.
pub fn provider(root: &Path, config: &Config) -> Box<dyn CatalogProvider> {
    let path = config.catalog_path(root);
    if path.exists() {
        Box::new(FileCatalog::new(path))
    } else {
        tracing::warn!(
            "catalog {} not found, using the bundled sample",
            path.display()
        );
        Box::new(SampleCatalog)
    }
}

pub fn load(root: &Path, config: &Config) -> anyhow::Result<Catalog> {
    provider(root, config)
        .load_catalog()
        .context("failed to load catalog")
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: CatalogSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let catalog = load(root, &config)?;

    match subcmd {
        CatalogSubcommand::Doses => show(filter::list_doses(&catalog), json),
        CatalogSubcommand::Ages { dose } => show(filter::list_age_groups(&catalog, &dose), json),
        CatalogSubcommand::States { dose, age_group } => {
            show(filter::list_states(&catalog, &age_group, &dose), json)
        }
        CatalogSubcommand::Districts {
            dose,
            age_group,
            state,
        } => show(
            filter::list_districts(&catalog, &state, &age_group, &dose),
            json,
        ),
        CatalogSubcommand::Hospitals {
            dose,
            age_group,
            state,
            district,
        } => show(
            filter::list_hospitals(&catalog, &district, &state, &age_group, &dose),
            json,
        ),
        CatalogSubcommand::Slots {
            dose,
            age_group,
            state,
            district,
            hospital,
        } => show(
            filter::list_slots(&catalog, &hospital, &district, &state, &age_group, &dose),
            json,
        ),
    }
}

fn show<T: Serialize + Display>(options: OptionSet<T>, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&options);
    }
    if options.is_empty() {
        println!("No matching options.");
        return Ok(());
    }
    let rows = options
        .iter()
        .map(|(key, value)| vec![key.to_string(), value.to_string()])
        .collect();
    print_table(&["CHOICE", "OPTION"], rows);
    Ok(())
}
