mod db;
mod error;
mod harvester;
mod parser;
mod profile;
mod server;
mod wizard;

use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;

use harvester::Harvester;
use profile::{BusinessProfile, ProfileField};
use wizard::{SectionSelection, StageOne, StageZero, STAGE_ONE_KEY, STAGE_ZERO_KEY};

#[derive(Parser)]
#[command(
    name = "profile_scraper",
    about = "Auto-populate business-plan fields from a company web page"
)]
struct Cli {
    /// SQLite database for snapshots, profiles and wizard state
    #[arg(long, global = true, env = "PROFILE_DB", default_value = db::DEFAULT_DB_PATH)]
    db: String,

    /// Page fetch timeout in seconds
    #[arg(long, global = true, env = "FETCH_TIMEOUT_SECS", default_value_t = harvester::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page and store its raw field snapshot
    Fetch { url: String },
    /// Fetch a page and print the extracted profile (nothing is stored)
    Extract {
        url: String,
        /// Comma-separated sections to keep, e.g. "concept,brand" (default: all fields)
        #[arg(short, long)]
        sections: Option<SectionSelection>,
    },
    /// Fetch, extract and merge the profile into the wizard state
    Import {
        url: String,
        /// Comma-separated sections to populate (default: concept and brand)
        #[arg(short, long)]
        sections: Option<SectionSelection>,
    },
    /// Re-run extraction over stored snapshots
    Process {
        /// Max snapshots to process
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Include snapshots that already have a profile
        #[arg(long)]
        all: bool,
    },
    /// Show the wizard state, or the stored profile of one snapshot
    Show {
        #[arg(long)]
        snapshot: Option<i64>,
    },
    /// Show snapshot statistics
    Stats,
    /// Run the HTTP API
    Serve {
        #[arg(short, long, env = "PORT", default_value = "3001")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout);

    let result = match cli.command {
        Commands::Fetch { url } => {
            let url = error::validate_url(Some(url.as_str()))?;
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let harvester = Harvester::new(timeout)?;
            let (id, raw) = fetch_snapshot(&conn, &harvester, url.as_str()).await?;
            match raw {
                Ok(_) => println!("Stored snapshot #{} for {}", id, url),
                Err(e) => println!("Snapshot #{} recorded a fetch error: {:#}", id, e),
            }
            Ok(())
        }
        Commands::Extract { url, sections } => {
            let url = error::validate_url(Some(url.as_str()))?;
            let harvester = Harvester::new(timeout)?;
            let raw = harvester.harvest(url.as_str()).await?;
            let profile = parser::extract(&raw);
            let data = wizard::filter_by_sections(&profile, sections.as_ref());
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Commands::Import { url, sections } => {
            let url = error::validate_url(Some(url.as_str()))?;
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let harvester = Harvester::new(timeout)?;
            let (id, raw) = fetch_snapshot(&conn, &harvester, url.as_str()).await?;
            let raw = raw.with_context(|| format!("Import aborted, see snapshot #{}", id))?;

            let profile = parser::extract(&raw);
            db::save_profiles(
                &conn,
                &[db::ProfileRow {
                    snapshot_id: id,
                    url: url.to_string(),
                    profile: profile.clone(),
                }],
            )?;

            let data = wizard::filter_by_sections(&profile, sections.as_ref());
            let written = import_profile(&conn, &data, sections.as_ref())?;
            let fields: Vec<&str> = ProfileField::ALL
                .iter()
                .filter(|f| f.get(&data).is_some())
                .map(|f| f.as_str())
                .collect();
            println!("{}", serde_json::to_string_pretty(&data)?);
            println!(
                "Imported {} fields from {} (snapshot #{}): {}",
                written,
                url,
                id,
                fields.join(", ")
            );
            Ok(())
        }
        Commands::Process { limit, all } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let snapshots = if all {
                db::fetch_all_snapshots(&conn, limit)?
            } else {
                db::fetch_unprocessed(&conn, limit)?
            };
            if snapshots.is_empty() {
                println!("No unprocessed snapshots. Run 'fetch' first.");
                return Ok(());
            }
            println!("Processing {} snapshots...", snapshots.len());
            let counts = process_snapshots(&conn, &snapshots)?;
            counts.print();
            Ok(())
        }
        Commands::Show { snapshot } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            match snapshot {
                Some(id) => {
                    let profile = db::load_profile(&conn, id)?
                        .with_context(|| format!("No profile for snapshot #{}", id))?;
                    println!("{}", serde_json::to_string_pretty(&profile)?);
                }
                None => {
                    let zero: StageZero = db::load_stage(&conn, STAGE_ZERO_KEY)?;
                    let one: StageOne = db::load_stage(&conn, STAGE_ONE_KEY)?;
                    println!("--- {} ---", STAGE_ZERO_KEY);
                    println!("{}", serde_json::to_string_pretty(&zero)?);
                    println!("--- {} ---", STAGE_ONE_KEY);
                    println!("{}", serde_json::to_string_pretty(&one)?);
                }
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Snapshots:   {}", s.snapshots);
            println!("URLs:        {}", s.urls);
            println!("Errors:      {}", s.errors);
            println!("Processed:   {}", s.processed);
            println!("Unprocessed: {}", s.unprocessed);
            Ok(())
        }
        Commands::Serve { port } => {
            let harvester = Harvester::new(timeout)?;
            server::serve(harvester, port).await
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Harvest `url` and record the attempt. A failed fetch is stored and handed
/// back to the caller alongside the snapshot id.
async fn fetch_snapshot(
    conn: &rusqlite::Connection,
    harvester: &Harvester,
    url: &str,
) -> anyhow::Result<(i64, anyhow::Result<profile::RawFieldBundle>)> {
    let start = Instant::now();
    let result = harvester.harvest(url).await;
    let latency_ms = Some(start.elapsed().as_millis() as i64);

    let row = match &result {
        Ok(raw) => db::SnapshotRow {
            url: url.to_string(),
            raw: Some(raw.clone()),
            error: None,
            latency_ms,
        },
        Err(e) => {
            warn!("{:#}", e);
            db::SnapshotRow {
                url: url.to_string(),
                raw: None,
                error: Some(format!("{:#}", e)),
                latency_ms,
            }
        }
    };
    let id = db::insert_snapshot(conn, &row)?;
    Ok((id, result))
}

/// Merge into the stages the selection targets; returns fields written.
fn import_profile(
    conn: &rusqlite::Connection,
    data: &BusinessProfile,
    sections: Option<&SectionSelection>,
) -> anyhow::Result<usize> {
    let (concept, brand) = wizard::stages_for(sections);
    let mut written = 0;

    if concept {
        let mut stage: StageZero = db::load_stage(conn, STAGE_ZERO_KEY)?;
        written += wizard::merge_into_stage_zero(&mut stage, data);
        db::save_stage(conn, STAGE_ZERO_KEY, &stage)?;
    }
    if brand {
        let mut stage: StageOne = db::load_stage(conn, STAGE_ONE_KEY)?;
        written += wizard::merge_into_stage_one(&mut stage, data);
        db::save_stage(conn, STAGE_ONE_KEY, &stage)?;
    }

    Ok(written)
}

struct ProcessCounts {
    profiles: usize,
    empty: usize,
    missions: usize,
    inferred: usize,
}

impl ProcessCounts {
    fn print(&self) {
        println!(
            "Saved {} profiles ({} empty), {} with a mission, {} inferred fields.",
            self.profiles, self.empty, self.missions, self.inferred,
        );
    }
}

fn process_snapshots(
    conn: &rusqlite::Connection,
    snapshots: &[db::StoredSnapshot],
) -> anyhow::Result<ProcessCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(snapshots.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = ProcessCounts {
        profiles: 0,
        empty: 0,
        missions: 0,
        inferred: 0,
    };

    for chunk in snapshots.chunks(500) {
        let rows: Vec<db::ProfileRow> = chunk
            .par_iter()
            .map(|s| db::ProfileRow {
                snapshot_id: s.id,
                url: s.url.clone(),
                profile: parser::extract(&s.raw),
            })
            .collect();

        for r in &rows {
            let p = &r.profile;
            counts.profiles += 1;
            counts.empty += p.is_empty() as usize;
            counts.missions += p.mission.is_some() as usize;
            counts.inferred += [&p.problem_solving, &p.unique_value, &p.target_audience]
                .iter()
                .filter(|f| f.is_some())
                .count();
        }

        db::save_profiles(conn, &rows)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
