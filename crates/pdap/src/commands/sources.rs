//! Sources command - look up and submit data sources.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use console::{Style, style};
use pdap_router::SIGN_IN_PATH;
use serde_json::{Value, json};

use super::{Context, print_json, print_success};

const CREATE_PATH: &str = "/data-source/create";

/// Arguments for the sources command.
#[derive(Args, Debug)]
pub struct SourcesArgs {
    #[command(subcommand)]
    pub command: SourcesCommand,
}

#[derive(Subcommand, Debug)]
pub enum SourcesCommand {
    /// Show a data source
    Get {
        /// Data source id
        id: String,
    },

    /// Submit a new data source (requires sign-in)
    Create {
        /// Request body as inline JSON
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        data: Option<String>,

        /// Read the request body from a JSON file
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Run the sources command.
pub async fn run(args: SourcesArgs, ctx: &Context) -> Result<()> {
    match args.command {
        SourcesCommand::Get { id } => cmd_get(ctx, &id).await,
        SourcesCommand::Create { data, file } => cmd_create(ctx, data, file).await,
    }
}

async fn cmd_get(ctx: &Context, id: &str) -> Result<()> {
    let conn = ctx.connect()?;
    let api = conn.client.data_sources();

    let source = api.get(id).await?;
    api.set_previous_route(Some(format!("/data-source/{}", id)));
    let neighbors = api.neighbors(id);

    if ctx.json_output {
        return print_json(&json!({
            "data_source": source,
            "previous": neighbors.previous,
            "next": neighbors.next,
        }));
    }

    let dim = Style::new().dim();
    let record = source.get("data").unwrap_or(&source);
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("(unnamed)");

    println!("{}", style(name).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    if let Some(fields) = record.as_object() {
        for (key, value) in fields {
            if key == "name" || value.is_null() {
                continue;
            }
            println!("  {:<24} {}", key, display_value(value));
        }
    }

    if neighbors.previous.is_some() || neighbors.next.is_some() {
        println!();
        if let Some(prev) = &neighbors.previous {
            println!("{}", dim.apply_to(format!("  previous: {}", prev)));
        }
        if let Some(next) = &neighbors.next {
            println!("{}", dim.apply_to(format!("  next:     {}", next)));
        }
    }
    Ok(())
}

async fn cmd_create(ctx: &Context, data: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let body = match (data, file) {
        (Some(data), _) => data,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => bail!("Pass --data or --file"),
    };
    let body: Value = serde_json::from_str(&body).context("Request body is not valid JSON")?;

    let conn = ctx.connect()?;
    conn.client.auth().ensure_fresh().await?;

    let landed = conn.client.router().navigate(CREATE_PATH)?;
    if landed == SIGN_IN_PATH {
        bail!("Sign in first: 'pdap auth login'");
    }

    let created = conn.client.data_sources().create(&body).await?;
    if ctx.json_output {
        print_json(&created)
    } else {
        match created.get("data").and_then(|d| d.get("id")).or(created.get("id")) {
            Some(id) => print_success(format!("Data source created: {}", display_value(id))),
            None => print_success("Data source submitted"),
        }
        Ok(())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
