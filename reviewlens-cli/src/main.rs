//! reviewlens — analyze product reviews with two AI services and store the
//! combined result in a local reviews table.
//!
//! # Subcommands
//! - `analyze [text]` — run sentiment + key-point analysis, persist the record
//! - `list [-n <limit>]` — show stored reviews, newest first
//! - `show <id>`         — show one stored review
//! - `health`            — check database connectivity

use std::io::Read;

use clap::{Parser, Subcommand};
use reviewlens_core::models::ReviewRecord;
use reviewlens_core::{db, ReviewAnalyzer, ReviewStore, ReviewlensConfig};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "reviewlens",
    version,
    about = "Product review analysis — sentiment and key points, persisted locally"
)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "reviewlens.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a review and store the result
    Analyze {
        /// Review text; read from stdin when omitted
        text: Option<String>,

        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored reviews, newest first
    List {
        /// Maximum number of reviews to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: i64,

        /// Output as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show a stored review by id
    Show {
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check database connectivity
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let config = match ReviewlensConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let pool = match db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to open database {}: {}", config.database.url, e);
            std::process::exit(1);
        }
    };
    db::init_schema(&pool).await?;

    let store = ReviewStore::new(pool.clone());

    match args.command {
        Commands::Analyze { text, json } => {
            let review_text = match text {
                Some(t) => t,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let review_text = review_text.trim();
            if review_text.is_empty() {
                anyhow::bail!("review text is empty");
            }

            let analyzer = ReviewAnalyzer::from_config(&config);
            let result = analyzer.analyze(review_text).await;
            let record = store.insert(review_text, &result).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
        }

        Commands::List { limit, json } => {
            let records = store.list(limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No stored reviews.");
            } else {
                for record in &records {
                    print_record(record);
                    println!();
                }
            }
        }

        Commands::Show { id, json } => {
            match store.get(id).await? {
                Some(record) if json => println!("{}", serde_json::to_string_pretty(&record)?),
                Some(record) => print_record(&record),
                None => {
                    eprintln!("No review with id {}", id);
                    std::process::exit(1);
                }
            }
        }

        Commands::Health => match db::health_check(&pool).await {
            Ok(version) => println!("✅ SQLite connected: {}", version),
            Err(e) => {
                println!("❌ Database check failed: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn print_record(record: &ReviewRecord) {
    println!(
        "#{} [{}] {:.2} — {}",
        record.id,
        record.sentiment,
        record.sentiment_score,
        record.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  {}", record.review_text);
    for point in &record.key_points {
        println!("  • {}", point);
    }
}
