//! rtwatch - follow kernel routing tables and print route changes.

use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use rtfollow::{Route, TableManager};

#[derive(Parser)]
#[command(name = "rtwatch", version, about = "Watch kernel routing tables")]
struct Cli {
    /// Tables to follow, as `id` or `id=name`.
    #[arg(value_name = "TABLE")]
    tables: Vec<String>,

    /// Follow the table bound to a VRF device, given by device name.
    #[arg(long, value_name = "DEV")]
    vrf: Vec<String>,

    /// Output JSON, one route per line.
    #[arg(short = 'j', long)]
    json: bool,

    /// Print the initial snapshots and exit instead of streaming updates.
    #[arg(long)]
    oneshot: bool,
}

fn parse_table(spec: &str) -> anyhow::Result<(u32, String)> {
    let (id, name) = match spec.split_once('=') {
        Some((id, name)) => (id, name.to_owned()),
        None => (spec, format!("table-{spec}")),
    };
    let id = id
        .parse()
        .with_context(|| format!("bad table id {id:?}"))?;
    Ok((id, name))
}

fn print_route(route: &Route, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(route)?);
    } else {
        println!("{route}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    if cli.tables.is_empty() && cli.vrf.is_empty() {
        bail!("nothing to follow: name at least one table or --vrf device");
    }

    let mut manager = TableManager::connect().context("open rtnetlink socket")?;

    let mut follow = Vec::new();
    for spec in &cli.tables {
        follow.push(parse_table(spec)?);
    }
    for dev in &cli.vrf {
        let table = manager
            .connection()
            .vrf_table_by_name(dev)
            .await
            .with_context(|| format!("vrf device {dev:?}"))?;
        follow.push((table, dev.clone()));
    }

    for (table, name) in follow {
        manager.follow(table, name.as_str());
        let taken = manager
            .refresh(table)
            .await
            .with_context(|| format!("dump table {table}"))?;
        println!("# table {table} ({name}): {taken} routes");
        if let Some(snapshot) = manager.get(table) {
            for route in snapshot.routes() {
                print_route(route, cli.json)?;
            }
        }
    }

    if cli.oneshot {
        return Ok(());
    }

    loop {
        match manager.wait_for_update(Duration::from_secs(60)).await {
            Ok(Some(route)) => {
                if !manager.is_followed(route.table) {
                    continue;
                }
                print_route(&route, cli.json)?;
                if let Err(e) = manager.apply(route) {
                    // e.g. a withdrawal for a route we never held
                    tracing::debug!("update not applied: {e}");
                }
            }
            // dump terminators and quiet minutes are not events
            Ok(None) => {}
            Err(e) if e.is_timeout() => {}
            Err(e) => return Err(e).context("waiting for route updates"),
        }
    }
}
