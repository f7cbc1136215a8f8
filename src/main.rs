use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use parentsku::config::Config;
use parentsku::pipeline::{self, FeedReport};
use parentsku::util::{strip_control_chars, truncate_to_width};

/// Parents shown in the preview after a run.
const PREVIEW_COUNT: usize = 5;
const PREVIEW_NAME_WIDTH: usize = 70;
const PREVIEW_IMAGE_WIDTH: usize = 60;

const RULE: &str = "======================================================================";

#[derive(Parser, Debug)]
#[command(
    name = "parentsku",
    about = "Group Google Shopping feed variants into parent SKUs"
)]
struct Args {
    /// Google Shopping feed (XML)
    feed: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if !args.feed.exists() {
        eprintln!("Error: File not found: {}", args.feed.display());
        eprintln!();
        eprintln!("Usage:");
        eprintln!("  parentsku feed.xml");
        std::process::exit(1);
    }

    let config = Config::load_default().context("Failed to load configuration")?;

    println!("{RULE}");
    println!("    GOOGLE SHOPPING FEED - PARENT SKU GENERATOR");
    println!("{RULE}");
    println!();
    println!("Reading feed: {}", args.feed.display());

    let report = pipeline::run(&args.feed, &config.csv_path(), &config.image_list_path())
        .await
        .with_context(|| format!("Failed to process feed '{}'", args.feed.display()))?;

    print_summary(&report);
    print_preview(&report);
    print_next_steps(&report);
    Ok(())
}

fn print_summary(report: &FeedReport) {
    println!();
    println!("{RULE}");
    println!("SUMMARY");
    println!("{RULE}");
    println!(" Items read:              {}", report.items);
    println!(" Items without group:     {}", report.ungroupable);
    println!(" Parent SKUs:             {}", report.parents.len());
    println!(" Image list lines:        {}", report.image_lines);
    println!(" Parents without image:   {}", report.parents_without_image());
    println!(" CSV:                     {}", report.csv_path.display());
    println!(" Image list:              {}", report.image_list_path.display());
    println!("{RULE}");
}

fn print_preview(report: &FeedReport) {
    if report.parents.is_empty() {
        return;
    }

    println!();
    println!("Sample parent SKUs:");
    for (i, parent) in report.parents.iter().take(PREVIEW_COUNT).enumerate() {
        let name = strip_control_chars(&parent.name);
        let image = strip_control_chars(parent.image_url().unwrap_or("-"));
        println!();
        println!("{}. SKU: {}", i + 1, strip_control_chars(&parent.sku));
        println!("   Name: {}", truncate_to_width(&name, PREVIEW_NAME_WIDTH));
        println!("   Image: {}", truncate_to_width(&image, PREVIEW_IMAGE_WIDTH));
    }

    if report.parents.len() > PREVIEW_COUNT {
        println!();
        println!("... and {} more parent SKUs", report.parents.len() - PREVIEW_COUNT);
    }
}

fn print_next_steps(report: &FeedReport) {
    println!();
    println!("{RULE}");
    println!("NEXT STEPS");
    println!("{RULE}");
    println!("1. '{}' holds every parent SKU", report.csv_path.display());
    println!("2. Download the images listed in '{}':", report.image_list_path.display());
    println!("     parentsku-images {}", report.image_list_path.display());
    println!("   Line format: SKU|IMAGE_URL");
    println!("{RULE}");
}
