//! Search command - run searches and manage followed searches.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::Style;
use pdap_client::{FollowedSearchLookup, SearchParams};
use serde_json::{Value, json};

use super::{Context, print_json, print_success};

/// Arguments for the search command.
#[derive(Args, Debug)]
pub struct SearchArgs {
    #[command(subcommand)]
    pub command: SearchCommand,
}

#[derive(Subcommand, Debug)]
pub enum SearchCommand {
    /// Search data sources by location and record category
    Run(SearchQuery),

    /// Follow a search (requires sign-in)
    Follow(SearchQuery),

    /// Stop following a search (requires sign-in)
    Unfollow(SearchQuery),

    /// List followed searches (requires sign-in)
    Followed,

    /// Check whether a search is followed
    Find(SearchQuery),
}

/// Location and record filters shared by the search subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchQuery {
    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub county: Option<String>,

    #[arg(long)]
    pub locality: Option<String>,

    /// Record category (repeatable)
    #[arg(long = "record-category")]
    pub record_categories: Vec<String>,

    /// Extra parameter as key=value (repeatable)
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

impl SearchQuery {
    pub fn to_params(&self) -> SearchParams {
        let mut params = SearchParams::new();
        if let Some(state) = &self.state {
            params = params.with("state", state.as_str());
        }
        if let Some(county) = &self.county {
            params = params.with("county", county.as_str());
        }
        if let Some(locality) = &self.locality {
            params = params.with("locality", locality.as_str());
        }
        if !self.record_categories.is_empty() {
            params = params.with("record_categories", self.record_categories.clone());
        }
        for (key, value) in &self.params {
            params = params.with(key.as_str(), value.as_str());
        }
        params
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

/// Run the search command.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    match args.command {
        SearchCommand::Run(query) => cmd_run(ctx, &query).await,
        SearchCommand::Follow(query) => {
            let params = non_empty(&query)?;
            let conn = ctx.connect()?;
            conn.require_user().await?;
            let response = conn.client.search().follow(&params).await?;
            if ctx.json_output {
                print_json(&response)
            } else {
                print_success("Following search");
                Ok(())
            }
        }
        SearchCommand::Unfollow(query) => {
            let params = non_empty(&query)?;
            let conn = ctx.connect()?;
            conn.require_user().await?;
            let response = conn.client.search().unfollow(&params).await?;
            if ctx.json_output {
                print_json(&response)
            } else {
                print_success("No longer following search");
                Ok(())
            }
        }
        SearchCommand::Followed => {
            let conn = ctx.connect()?;
            conn.require_user().await?;
            let followed = conn.client.search().followed().await?;
            if ctx.json_output {
                return print_json(&serde_json::to_value(&followed)?);
            }

            if followed.is_empty() {
                let dim = Style::new().dim();
                println!("{}", dim.apply_to("No followed searches"));
            }
            for params in &followed {
                println!("  {}", describe(params));
            }
            Ok(())
        }
        SearchCommand::Find(query) => {
            let params = non_empty(&query)?;
            let conn = ctx.connect()?;
            conn.client.auth().ensure_fresh().await?;
            let lookup = conn.client.search().find_followed(&params).await?;

            let (status, found) = match lookup {
                FollowedSearchLookup::Found(found) => ("followed", Some(found)),
                FollowedSearchLookup::NotFound => ("not followed", None),
                FollowedSearchLookup::Unauthenticated => ("signed out", None),
            };
            if ctx.json_output {
                print_json(&json!({ "status": status, "search": found }))
            } else {
                println!("{}: {}", describe(&params), status);
                Ok(())
            }
        }
    }
}

async fn cmd_run(ctx: &Context, query: &SearchQuery) -> Result<()> {
    let params = non_empty(query)?;
    let conn = ctx.connect()?;
    let api = conn.client.search();

    let results = api.search(&params).await?;
    let ids = collect_ids(&results);
    api.set_most_recent_search_ids(ids.clone());

    if ctx.json_output {
        return print_json(&results);
    }

    let dim = Style::new().dim();
    println!("{} result(s) for {}", ids.len(), describe(&params));
    for id in &ids {
        println!("  {}", id);
    }
    if !ids.is_empty() {
        println!();
        println!(
            "{}",
            dim.apply_to("Use 'pdap sources get <id>' to see a data source")
        );
    }
    Ok(())
}

fn non_empty(query: &SearchQuery) -> Result<SearchParams> {
    let params = query.to_params();
    if params.is_empty() {
        bail!("Give at least one of --state, --county, --locality, --record-category or --param");
    }
    Ok(params)
}

fn describe(params: &SearchParams) -> String {
    params
        .query_pairs()
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ids of result records in document order, without duplicates.
///
/// A result record is any object inside an array that carries an `id`.
fn collect_ids(value: &Value) -> Vec<String> {
    fn walk(value: &Value, in_array: bool, out: &mut Vec<String>) {
        match value {
            Value::Array(items) => {
                for item in items {
                    walk(item, true, out);
                }
            }
            Value::Object(fields) => {
                if in_array
                    && let Some(id) = fields.get("id").and_then(id_string)
                    && !out.contains(&id)
                {
                    out.push(id);
                }
                for (key, child) in fields {
                    if key != "id" {
                        walk(child, false, out);
                    }
                }
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(value, false, &mut out);
    out
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_ids_nested_groups() {
        let results = json!({
            "count": 3,
            "data": [
                { "results": [{ "id": "fed-1" }] },
                { "results": [{ "id": 12 }, { "id": "fed-1" }] },
                { "results": [{ "id": "loc-9", "agency": { "id": "agency-1" } }] }
            ]
        });

        assert_eq!(collect_ids(&results), vec!["fed-1", "12", "loc-9"]);
    }

    #[test]
    fn test_collect_ids_ignores_top_level_id() {
        let results = json!({ "id": "not-a-result", "data": [] });
        assert!(collect_ids(&results).is_empty());
    }

    #[test]
    fn test_query_to_params() {
        let query = SearchQuery {
            state: Some("Pennsylvania".into()),
            record_categories: vec!["Police & Public Interactions".into()],
            params: vec![("page".into(), "2".into())],
            ..Default::default()
        };

        let params = query.to_params();
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("state"), Some(&json!("Pennsylvania")));
        assert_eq!(
            params.get("record_categories"),
            Some(&json!(["Police & Public Interactions"]))
        );
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("page=2"),
            Ok(("page".to_string(), "2".to_string()))
        );
        assert!(parse_key_value("page").is_err());
        assert!(parse_key_value("=2").is_err());
    }
}
