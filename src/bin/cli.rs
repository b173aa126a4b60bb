//! dev-scan CLI
//!
//! Searches Reddit, Hacker News and ProductHunt, or enriches web pages via a
//! browser automation tool. Results go to stdout, diagnostics to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use dev_scan::{
    error::Result,
    models::{Config, Source, TimeFilter},
    output::{CheckReport, FAILURE_EXIT_CODE, Report, render_compact, render_json, usage_line},
    pipeline::{self, SearchRequest},
    services::browser::{AgentBrowser, PageSeed, parse_seeds, seeds_from_urls},
};
use tokio::io::AsyncReadExt;

/// dev-scan - developer community search for LLM agents
#[derive(Parser, Debug)]
#[command(
    name = "dev-scan",
    version,
    about = "Search developer communities and enrich results with comments"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "dev-scan.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every search subcommand.
#[derive(Args, Debug)]
struct SearchArgs {
    /// Search query
    query: Option<String>,

    /// Number of results to return
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Lookback window: hour, day, week, month, year or all
    #[arg(long, default_value = "month")]
    time: TimeFilter,

    /// Print JSON instead of the compact digest
    #[arg(long)]
    json: bool,

    /// Probe availability and exit
    #[arg(long)]
    check: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search Reddit threads
    Reddit {
        #[command(flatten)]
        args: SearchArgs,

        /// Top comments per thread
        #[arg(long, default_value_t = 5)]
        comments: usize,

        /// Comma-separated subreddits, replacing discovery
        #[arg(long, value_delimiter = ',')]
        subreddits: Vec<String>,
    },

    /// Search Hacker News stories
    Hn {
        #[command(flatten)]
        args: SearchArgs,

        /// Top comments per story
        #[arg(long, default_value_t = 5)]
        comments: usize,
    },

    /// Search ProductHunt launches
    Ph {
        #[command(flatten)]
        args: SearchArgs,

        /// Top comments per product
        #[arg(long, default_value_t = 3)]
        comments: usize,
    },

    /// Enrich web pages through the browser automation tool
    Enrich {
        /// Page URLs
        urls: Vec<String>,

        /// Read search results (JSON) from stdin
        #[arg(long)]
        stdin: bool,

        /// Comments per page
        #[arg(long, default_value_t = 5)]
        comments: usize,

        /// Maximum body characters [default: 500]
        #[arg(long)]
        body: Option<usize>,

        /// Pages enriched in parallel [default: 3]
        #[arg(long)]
        concurrency: Option<usize>,

        /// Milliseconds to wait for rendering [default: 1500]
        #[arg(long)]
        wait: Option<u64>,

        /// Print JSON instead of the compact digest
        #[arg(long)]
        json: bool,

        /// Probe availability and exit
        #[arg(long)]
        check: bool,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Reddit {
            args,
            comments,
            subreddits,
        } => {
            config.validate()?;
            search(&config, Source::Reddit, args, comments, subreddits).await
        }
        Command::Hn { args, comments } => {
            config.validate()?;
            search(&config, Source::HackerNews, args, comments, Vec::new()).await
        }
        Command::Ph { args, comments } => {
            config.validate()?;
            search(&config, Source::ProductHunt, args, comments, Vec::new()).await
        }
        Command::Enrich {
            urls,
            stdin,
            comments,
            body,
            concurrency,
            wait,
            json,
            check,
        } => {
            // Flags override the configured values
            if let Some(body) = body {
                config.browser.body_chars = body;
            }
            if let Some(concurrency) = concurrency {
                config.enrich.concurrency = concurrency;
            }
            if let Some(wait) = wait {
                config.browser.wait_ms = wait;
            }
            config.validate()?;

            if check {
                let report = match pipeline::check_browser(&config).await {
                    Ok(tool) => CheckReport::available().with_tool(tool),
                    Err(e) => CheckReport::unavailable(e),
                };
                return print_check(&report);
            }

            let seeds = collect_seeds(&urls, stdin).await?;
            if seeds.is_empty() {
                eprintln!("Error: no URLs given");
                eprintln!("{}", usage_line(Source::Web));
                return Ok(ExitCode::from(FAILURE_EXIT_CODE));
            }

            let driver = AgentBrowser::new(&config.browser);
            let records = pipeline::run_browser(driver, &config, seeds, comments).await;
            print_report(&Report::new(Source::Web, None, &records), json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn search(
    config: &Config,
    source: Source,
    args: SearchArgs,
    comments: usize,
    subreddits: Vec<String>,
) -> Result<ExitCode> {
    if args.check {
        let report = CheckReport::from_result(pipeline::check_source(config, source).await);
        return print_check(&report);
    }

    let Ok(query) = pipeline::require_query(args.query.as_deref()) else {
        eprintln!("{}", usage_line(source));
        return Ok(ExitCode::from(FAILURE_EXIT_CODE));
    };

    let request = SearchRequest {
        source,
        query,
        time: args.time,
        count: args.count,
        max_comments: comments,
        subreddits,
    };
    log::info!(
        "{} search: \"{}\" (time={}, count={})",
        source.display_name(),
        request.query,
        request.time,
        request.count
    );

    let records = pipeline::run_search(config, &request).await?;
    print_report(&Report::new(source, Some(&request.query), &records), args.json)?;
    Ok(ExitCode::SUCCESS)
}

/// Seeds from positional URLs followed by stdin results.
async fn collect_seeds(urls: &[String], stdin: bool) -> Result<Vec<PageSeed>> {
    let mut seeds = seeds_from_urls(urls);
    if stdin {
        let mut raw = String::new();
        tokio::io::stdin().read_to_string(&mut raw).await?;
        seeds.extend(parse_seeds(&raw)?);
    }
    Ok(seeds)
}

fn print_report(report: &Report<'_>, json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(report)?);
    } else {
        println!("{}", render_compact(report, Utc::now()));
    }
    Ok(())
}

fn print_check(report: &CheckReport) -> Result<ExitCode> {
    println!("{}", report.to_json()?);
    Ok(ExitCode::from(report.exit_code()))
}
