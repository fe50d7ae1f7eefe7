use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use ufc_data::{AppConfig, DocStore, RefreshScope, UfcService};

#[derive(Parser)]
#[command(name = "ufc-data", about = "UFC data scraper and cache manager")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync the fighter directory into the local store
    SyncFighters,
    /// Refresh the event list (headers only)
    RefreshEvents,
    /// Refresh the fight card of a single event
    RefreshDetails { ufc_id: String },
    /// Refresh fight cards for every stored event
    RefreshAll,
    /// Refresh fight cards for past events only
    RefreshPast,
    /// Refresh the weight-class rankings
    RefreshRankings,
    /// Print one stored event with its fight card
    ShowEvent { ufc_id: String },
    /// List stored upcoming events
    ListUpcoming,
    /// List the most recent stored past events
    ListPast,
    /// Print the stored rankings snapshot
    ShowRankings,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let store = Arc::new(
        DocStore::open(&config.data_file).with_context(|| {
            format!("Failed to open data file {}", config.data_file.display())
        })?,
    );
    let service = UfcService::new(&config, Arc::clone(&store));

    match cli.command {
        Command::SyncFighters => {
            let count = service
                .sync_fighters()
                .await
                .context("Failed to sync the fighter directory")?;
            println!("Synced {} fighters", count);
        }
        Command::RefreshEvents => {
            let refresh = service
                .refresh_event_list()
                .await
                .context("Failed to refresh the event list")?;
            println!(
                "Refreshed {} events ({} upcoming, {} past)",
                refresh.total, refresh.upcoming_count, refresh.past_count
            );
        }
        Command::RefreshDetails { ufc_id } => {
            let event = service
                .refresh_event_details(&ufc_id)
                .await
                .with_context(|| format!("Failed to refresh details for {}", ufc_id))?;
            println!("Refreshed {}: {} fights", event.name, event.fights.len());
        }
        Command::RefreshAll => {
            let report = service
                .bulk_refresh_details(RefreshScope::All)
                .await
                .context("Bulk refresh failed")?;
            print_report(&report);
        }
        Command::RefreshPast => {
            let report = service
                .bulk_refresh_details(RefreshScope::Past)
                .await
                .context("Bulk refresh failed")?;
            print_report(&report);
        }
        Command::RefreshRankings => {
            let snapshot = service
                .refresh_rankings()
                .await
                .context("Failed to refresh rankings")?;
            println!("Refreshed {} divisions", snapshot.divisions.len());
        }
        Command::ShowEvent { ufc_id } => match store.get_event(&ufc_id).await {
            Some(event) => {
                println!("{} ({})", event.name, event.date.format("%Y-%m-%d"));
                if let Some(location) = &event.location {
                    println!("  {}", location);
                }
                for fight in &event.fights {
                    println!(
                        "  {}. [{}] {} vs {}",
                        fight.bout_order, fight.card_section, fight.red_name, fight.blue_name
                    );
                }
            }
            None => println!("Event {} not found", ufc_id),
        },
        Command::ListUpcoming => {
            let events = store.upcoming_events().await;
            println!("{} upcoming events", events.len());
            for event in events {
                println!("  {}  {}", event.date.format("%Y-%m-%d"), event.name);
            }
        }
        Command::ListPast => {
            let events = store.past_events(10).await;
            println!("{} past events", events.len());
            for event in events {
                println!("  {}  {}", event.date.format("%Y-%m-%d"), event.name);
            }
        }
        Command::ShowRankings => match store.rankings().await {
            Some(snapshot) => {
                println!(
                    "Rankings as of {}",
                    snapshot.last_refreshed_at.format("%Y-%m-%d %H:%M")
                );
                for division in &snapshot.divisions {
                    println!("\n{}", division.division);
                    if let Some(champion) = &division.champion {
                        println!("  C. {}", champion.name);
                    }
                    for fighter in &division.fighters {
                        let rank = fighter.rank_text.as_deref().unwrap_or("-");
                        println!("  {}. {}", rank, fighter.name);
                    }
                }
            }
            None => println!("No rankings stored yet"),
        },
    }

    Ok(())
}

fn print_report(report: &ufc_data::BulkRefreshReport) {
    println!(
        "Refreshed {}/{} events ({} failed)",
        report.updated_count, report.total_events, report.failed_count
    );
    for error in &report.errors {
        println!("  {}: {}", error.ufc_id, error.error);
    }
}
