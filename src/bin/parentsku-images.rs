use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use parentsku::config::Config;
use parentsku::images::{read_list, DownloadEvent, DownloadStats, Downloader};
use parentsku::util::{strip_control_chars, truncate_to_width};

/// Download failures printed individually before going quiet. Malformed
/// lines are always printed.
const SHOWN_FAILURES: usize = 10;

const RULE: &str = "======================================================================";

#[derive(Parser, Debug)]
#[command(
    name = "parentsku-images",
    about = "Download the images listed in a SKU|URL file"
)]
struct Args {
    /// Image list written by `parentsku` (one SKU|URL per line)
    list: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if !args.list.exists() {
        eprintln!("Error: File not found: {}", args.list.display());
        eprintln!();
        eprintln!("Usage:");
        eprintln!("  parentsku-images lista_imagens.txt");
        std::process::exit(1);
    }

    let config = Config::load_default().context("Failed to load configuration")?;

    println!("{RULE}");
    println!("    GOOGLE SHOPPING IMAGE DOWNLOADER");
    println!("{RULE}");
    println!();
    println!("Reading list: {}", args.list.display());

    let list = read_list(&args.list)
        .await
        .with_context(|| format!("Failed to read image list '{}'", args.list.display()))?;
    println!("Images to download: {}", list.lines.len());
    println!();

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to create HTTP client")?;
    let downloader = Downloader::new(client, &config.image_dir)
        .with_timeout(config.request_timeout())
        .with_delay(config.request_delay());

    let stats = downloader.run(&list, report_event).await;

    print_summary(&stats, &downloader);
    Ok(())
}

fn report_event(event: DownloadEvent<'_>) {
    match event {
        DownloadEvent::Progress { done, total, stats } => {
            println!(
                "Progress: {}/{} ({}%) - OK: {}, Errors: {}",
                done,
                total,
                done * 100 / total.max(1),
                stats.succeeded,
                stats.errored
            );
        }
        DownloadEvent::Malformed { line, .. } => {
            let line = strip_control_chars(line);
            println!("  Invalid line: {}", truncate_to_width(&line, 60));
        }
        DownloadEvent::Failed {
            line,
            error,
            failures,
        } if failures <= SHOWN_FAILURES => {
            let line = strip_control_chars(line);
            println!("  Failed: {} ({})", truncate_to_width(&line, 60), error);
        }
        DownloadEvent::Failed { .. } | DownloadEvent::Saved { .. } => {}
    }
}

fn print_summary(stats: &DownloadStats, downloader: &Downloader) {
    println!();
    println!("{RULE}");
    println!("DOWNLOAD SUMMARY");
    println!("{RULE}");
    println!(" Lines processed:   {}", stats.total);
    println!(" Downloaded:        {}", stats.succeeded);
    println!(" Blank lines:       {}", stats.skipped);
    println!(" Errors:            {}", stats.errored);
    println!(" Destination:       {}", downloader.dest().display());
    println!("{RULE}");
}
