//! Route command - evaluate the navigation guard for an app path.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use pdap_router::{NavigationFailure, Navigator, path_only};
use serde_json::json;

use super::{Context, print_json};

/// Arguments for the route command.
#[derive(Args, Debug)]
pub struct RouteArgs {
    /// App path, e.g. /profile or /data-source/42
    pub path: String,
}

/// Run the route command.
pub async fn run(args: RouteArgs, ctx: &Context) -> Result<()> {
    let conn = ctx.connect()?;
    conn.client.auth().ensure_fresh().await?;

    let router = conn.client.router();
    let gated = router.guard().routes().requires_auth(&args.path);

    let (landed, failure) = match router.navigate(&args.path) {
        Ok(landed) => (landed, None),
        Err(failure @ NavigationFailure::Duplicated { .. }) => {
            (router.navigator().current(), Some(failure))
        }
        Err(failure) => return Err(failure.into()),
    };
    let head = router.guard().head();
    let redirect_to = conn.client.session().redirect_to();

    if ctx.json_output {
        return print_json(&json!({
            "requested": args.path,
            "landed": landed,
            "requires_auth": gated,
            "redirected": path_only(&landed) != path_only(&args.path),
            "redirect_to": redirect_to,
            "title": head.title,
            "description": head.description,
        }));
    }

    let dim = Style::new().dim();
    println!("{}", style(&head.title).bold());
    println!("{}", dim.apply_to(&head.description));
    println!();
    println!("  Requested:  {}", args.path);
    println!("  Landed:     {}", landed);
    println!(
        "  Sign-in:    {}",
        if gated { "required" } else { "not required" }
    );
    if let Some(target) = redirect_to {
        println!("  Returns to: {} after sign-in", target);
    }
    if let Some(failure) = failure {
        println!("{}", dim.apply_to(format!("  ({})", failure)));
    }
    Ok(())
}
