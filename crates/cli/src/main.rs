use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::{ArgGroup, Parser};
use owo_colors::OwoColorize;
use pttcrawl_core::{CrawlConfig, CrawlReport, Crawler, FetchConfig, HttpTransport, PageEnd};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crawl PTT board pages or single articles into JSON files
#[derive(Parser, Debug)]
#[command(name = "pttcrawl")]
#[command(author = "pttcrawl Contributors")]
#[command(version)]
#[command(about = "Crawl PTT boards into JSON files", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["index", "article"])))]
struct Args {
    /// Board name, e.g. Gossiping
    #[arg(short, long, value_name = "BOARD")]
    board: String,

    /// Crawl listing pages START through END (END -1 = last page)
    #[arg(short, long, num_args = 2, value_names = ["START", "END"], allow_negative_numbers = true)]
    index: Option<Vec<i64>>,

    /// Crawl a single article, e.g. M.1419434423.A.DF0
    #[arg(short, long, value_name = "ID")]
    article: Option<String>,

    /// Directory output files are written to
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output_dir: PathBuf,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "3", value_name = "SECS")]
    timeout: u64,

    /// Pause after every listing page, in milliseconds
    #[arg(long, default_value = "100", value_name = "MS")]
    delay_ms: u64,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Article URL to leave out of a range crawl (repeatable)
    #[arg(long, value_name = "URL")]
    skip: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,pttcrawl_core=debug,pttcrawl=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Validates `--index START END`.
fn page_range(index: &[i64]) -> anyhow::Result<(u32, PageEnd)> {
    let [start, end] = index else {
        bail!("--index takes exactly two values: START END");
    };

    let start = u32::try_from(*start)
        .ok()
        .filter(|start| *start > 0)
        .with_context(|| format!("START must be a positive page index, got {}", start))?;
    let end = PageEnd::from_index(*end).context("Invalid END index")?;

    if matches!(end, PageEnd::Index(end) if end < start) {
        echo::print_warning(&format!("END is before START {}; nothing will be crawled", start));
    }

    Ok((start, end))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    debug!(?args, "parsed arguments");

    let range = args.index.as_deref().map(page_range).transpose()?;

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
        echo::print_step(1, 2, "Preparing crawler");
        echo::print_field("Board", &args.board);
        echo::print_field("Output", &args.output_dir.display().to_string());
        echo::print_field("Timeout", &format!("{}s", args.timeout));
        if args.insecure {
            echo::print_field("TLS", "not verified");
        }
        eprintln!();
    }

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory: {}", args.output_dir.display()))?;

    let fetch_config = FetchConfig { timeout: args.timeout, verify_tls: !args.insecure, ..Default::default() };
    let transport = HttpTransport::new(&fetch_config).context("Failed to build HTTP client")?;

    let config = CrawlConfig::builder()
        .output_dir(&args.output_dir)
        .page_delay(Duration::from_millis(args.delay_ms))
        .build();
    let crawler = Crawler::new(transport, config);

    let started = Instant::now();
    let report: CrawlReport = match (range, &args.article) {
        (Some((start, end)), _) => {
            if args.verbose {
                let end_label = match end {
                    PageEnd::Last => "last".to_string(),
                    PageEnd::Index(end) => end.to_string(),
                };
                echo::print_step(2, 2, &format!("Crawling {} pages {}..{}", args.board, start, end_label));
            }

            let skip: HashSet<String> = args.skip.iter().cloned().collect();
            crawler
                .crawl_range(&args.board, start, end, &skip)
                .await
                .with_context(|| format!("Failed to crawl board {}", args.board))?
        }
        (None, Some(article_id)) => {
            if args.verbose {
                echo::print_step(2, 2, &format!("Crawling article {}", article_id.bright_white()));
            }

            crawler
                .crawl_article(&args.board, article_id)
                .await
                .with_context(|| format!("Failed to crawl article {}", article_id))?
        }
        (None, None) => bail!("one of --index or --article is required"),
    };

    if args.verbose {
        echo::print_summary(&report.summary, started.elapsed());
    }

    if report.summary.failed > 0 {
        echo::print_warning(&format!("{} article(s) could not be fetched", report.summary.failed));
    }
    echo::print_success(&format!("Output written to {}", report.path.display().bright_white()));

    Ok(())
}
