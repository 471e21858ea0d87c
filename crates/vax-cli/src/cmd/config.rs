use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use vax_core::config::{Config, ConfigWarning, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Check the session, server and catalog settings
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => show(root, &config, json),
        ConfigSubcommand::Validate => validate(&config.validate(), json),
    }
}

fn show(root: &Path, config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(config);
    }
    print!("{}", serde_yaml::to_string(config)?);
    println!("# catalog file: {}", config.catalog_path(root).display());
    Ok(())
}

fn validate(findings: &[ConfigWarning], json: bool) -> anyhow::Result<()> {
    let errors = findings
        .iter()
        .filter(|f| f.level == WarnLevel::Error)
        .count();

    if json {
        print_json(&serde_json::json!({
            "errors": errors,
            "warnings": findings,
        }))?;
    } else {
        for f in findings {
            let tag = match f.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{tag}] {}", f.message);
        }
        if findings.is_empty() {
            println!("Config is valid. No warnings.");
        }
    }

    if errors > 0 {
        anyhow::bail!("{errors} config error(s)");
    }
    Ok(())
}
