//! Config command - inspect and edit configuration files.

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use console::Style;
use pdap_config::{PdapConfig, load_config_file, project_config_path, save_config};
use serde_json::json;

use super::{Context, print_json, print_success};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Show which config files are read and in what order
    Which,

    /// Print the user config file path
    Path,

    /// Set a value, e.g. `pdap config set api.base_url https://...`
    Set {
        /// Dotted key such as api.base_url or cache.default_ttl_secs
        key: String,

        value: String,

        /// Write ./pdap.toml instead of the user config
        #[arg(long)]
        local: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Path => {
            let path = pdap_config::xdg_config_path()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?;
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommand::Set { key, value, local } => cmd_set(ctx, &key, &value, local),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let config = ctx.config()?.redacted();
    if ctx.json_output {
        return print_json(&serde_json::to_value(&config)?);
    }

    let dim = Style::new().dim();
    println!("{}", dim.apply_to("# effective configuration"));
    println!("{}", dim.apply_to(format!("# api.base_url = {}", config.api_base_url())));
    println!("{}", dim.apply_to(format!("# api.app_base_url = {}", config.app_base_url())));
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = pdap_config::load_config(None)?;

    if ctx.json_output {
        let sources: Vec<_> = loaded
            .sources
            .iter()
            .map(|s| {
                json!({
                    "layer": s.kind.to_string(),
                    "path": s.path.display().to_string(),
                    "loaded": s.loaded,
                })
            })
            .collect();
        return print_json(&json!({ "sources": sources, "warnings": loaded.warnings }));
    }

    println!("Config files, later overrides earlier:\n");
    for source in &loaded.sources {
        let status = if source.loaded { "✓ loaded   " } else { "· not found" };
        println!("  {} {:<8} {}", status, source.kind, source.path.display());
    }
    for warning in &loaded.warnings {
        println!("  ⚠ {}", warning);
    }
    Ok(())
}

fn cmd_set(ctx: &Context, key: &str, value: &str, local: bool) -> Result<()> {
    let path = if local {
        project_config_path(&std::env::current_dir()?)
    } else {
        pdap_config::xdg_config_path()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?
    };

    // Edit only the target file, not the merged view.
    let mut config = if path.is_file() {
        load_config_file(&path)?
    } else {
        PdapConfig::new()
    };
    config.set_value(key, value)?;
    save_config(&config, &path)?;

    if ctx.json_output {
        print_json(&json!({ "key": key, "value": value, "file": path.display().to_string() }))
    } else {
        print_success(format!("Set {} in {}", key, path.display()));
        Ok(())
    }
}
