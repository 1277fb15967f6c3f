use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

use commands::reconcile::SnapshotKind;

#[derive(Parser)]
#[command(name = "kkm")]
#[command(about = "Entity reconciliation worker CLI", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (base -> env -> local)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Reconcile one snapshot read from a JSON file; prints the outcome
    Reconcile {
        #[arg(value_enum)]
        kind: SnapshotKind,

        /// Snapshot JSON file
        file: String,
    },

    /// Clan member sync: point every listed member at the clan, then
    /// reconcile the roster
    Roster {
        /// Roster snapshot JSON file
        file: String,
    },

    /// Set (or clear, when --clan-id is omitted) one account's clan
    Membership {
        #[arg(long)]
        account_id: i64,

        #[arg(long)]
        clan_id: Option<i64>,
    },

    /// Record a region's current game version
    GameVersion {
        #[arg(long)]
        region_id: i16,

        #[arg(long)]
        version: String,
    },

    /// Print the decoded per-ship stats stored for an account
    ShipStats {
        #[arg(long)]
        account_id: i64,
    },

    /// Connectivity check
    Ping,

    /// Print the activity tier for the given counters (no database)
    Classify {
        #[arg(long, default_value_t = false)]
        hidden: bool,

        #[arg(long)]
        total_battles: i64,

        /// Unix seconds; 0 = unknown
        #[arg(long)]
        last_battle_time: i64,

        /// Evaluation time (unix seconds); defaults to now
        #[arg(long)]
        now: Option<i64>,
    },

    /// Error log utilities
    Errlog {
        #[command(subcommand)]
        cmd: ErrlogCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply embedded SQL migrations
    Migrate,
}

#[derive(Subcommand)]
enum ErrlogCmd {
    /// Print the diagnostics recorded under a correlation id
    Find {
        /// Error log path (defaults to logging.error_log_path)
        #[arg(long)]
        path: Option<String>,

        #[arg(long)]
        error_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();
    let cfg = commands::load_worker_config(&cli.config_paths)?;
    init_tracing(&cfg.logging.filter);

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = commands::connect(&cfg).await?;
            match cmd {
                DbCmd::Status => {
                    let s = kkm_db::status(&pool).await?;
                    println!("db_ok={} has_entity_tables={}", s.ok, s.has_entity_tables);
                }
                DbCmd::Migrate => {
                    kkm_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = kkm_config::load_layered_yaml(&path_refs)?;
            let report =
                kkm_config::report_unused_keys(&loaded.config_json, kkm_config::UnusedKeyPolicy::Warn)?;
            for p in &report.unused_leaf_pointers {
                eprintln!("warning: unused config key {p}");
            }
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Reconcile { kind, file } => {
            let rec = commands::reconciler(&cfg).await?;
            let outcome = commands::reconcile::run(&rec, kind, &file).await?;
            commands::print_outcome(&outcome)?;
        }

        Commands::Roster { file } => {
            let rec = commands::reconciler(&cfg).await?;
            for outcome in commands::reconcile::sync_roster(&rec, &file).await? {
                commands::print_outcome(&outcome)?;
            }
        }

        Commands::Membership {
            account_id,
            clan_id,
        } => {
            let rec = commands::reconciler(&cfg).await?;
            let outcome = rec.set_membership(account_id, clan_id).await?;
            commands::print_outcome(&outcome)?;
        }

        Commands::GameVersion { region_id, version } => {
            let rec = commands::reconciler(&cfg).await?;
            let outcome = rec.reconcile_game_version(region_id, &version).await?;
            commands::print_outcome(&outcome)?;
        }

        Commands::ShipStats { account_id } => {
            let rec = commands::reconciler(&cfg).await?;
            let stats = rec
                .load_ship_stats(account_id)
                .await
                .context("load_ship_stats failed")?;
            println!("{}", serde_json::to_string(&stats)?);
        }

        Commands::Ping => {
            let rec = commands::reconciler(&cfg).await?;
            let outcome = rec.ping().await?;
            commands::print_outcome(&outcome)?;
        }

        Commands::Classify {
            hidden,
            total_battles,
            last_battle_time,
            now,
        } => {
            let now = now.unwrap_or_else(|| Utc::now().timestamp());
            let tier = kkm_reconcile::classify(!hidden, total_battles, last_battle_time, now);
            println!("active_level={tier}");
        }

        Commands::Errlog { cmd } => match cmd {
            ErrlogCmd::Find { path, error_id } => {
                let path = path
                    .or_else(|| cfg.logging.error_log_path.clone())
                    .context("no --path given and logging.error_log_path is not configured")?;
                let id = Uuid::parse_str(&error_id).context("invalid error_id uuid")?;
                match kkm_errlog::find_record(&path, id)? {
                    Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                    None => anyhow::bail!("no record for error_id={id} in {path}"),
                }
            }
        },
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
