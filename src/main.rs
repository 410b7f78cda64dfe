mod archive;
mod bonds;
mod fetch;
mod gaps;
mod models;
mod reconcile;
mod report;
mod store;

use anyhow::Result;
use chrono::Local;
use clap::{Arg, Command};
use models::Config;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("premium-bonds-checker")
        .version("1.0")
        .about("Reconciles recorded premium bond winnings against monthly prize reports")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .get_matches();

    let config_file = matches.get_one::<String>("config").unwrap();

    // Load or create configuration
    let config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        let default_config = Config::default();
        default_config.save_to_file(config_file)?;
        println!(
            "⚠️  Please review {} and point it at your winnings and holdings files, then run the program again.",
            config_file
        );
        return Ok(());
    };

    if !Path::new(&config.winnings_file).exists() {
        println!("❌ Error: winnings file not found: {}", config.winnings_file);
        return Ok(());
    }
    if !Path::new(&config.holdings_file).exists() {
        println!("❌ Error: holdings file not found: {}", config.holdings_file);
        return Ok(());
    }

    let mut ledger = store::read_winnings(&config.winnings_file)?;
    let holdings = store::read_holdings(&config.holdings_file)?;
    println!(
        "📂 Loaded {} winnings row(s) and {} holding range(s)",
        ledger.len(),
        holdings.len()
    );

    // Which draw months of the lookback window still need their report?
    let recorded: HashSet<_> = ledger.iter().map(|r| gaps::month_of(r.draw_date)).collect();
    let today = Local::now().date_naive();
    let window = gaps::months_to_check(config.lookback_months, today);
    let (any_missing, missing_months) = gaps::find_missing_months(&window, &recorded);

    if !any_missing {
        println!("✅ No draw months need fetching");
        store::write_winnings(&config.winnings_file, &ledger)?;
        return Ok(());
    }

    let held = bonds::expand_holdings(&holdings)?;
    let prefixes = bonds::valid_prefixes(&holdings);
    println!(
        "🔢 Holding {} bond(s) across {} prefix(es)",
        held.len(),
        prefixes.len()
    );

    let fetcher = fetch::ReportFetcher::new();
    let mut total_added = 0;
    let mut skipped_months = Vec::new();

    // Oldest month first, so new unique ids increase in draw order
    for month in missing_months {
        let month_label = month.format("%B %Y");
        println!("📅 Prize data missing for {}", month_label);

        let texts = match fetcher.fetch_month(&config.report_url_template, month).await {
            Ok(texts) => texts,
            Err(e) => {
                println!("   ❌ Failed to fetch report for {}: {:#}", month_label, e);
                skipped_months.push(month);
                continue;
            }
        };

        // Merge the archive's files into one prize map; later files keep
        // the last-occurrence-wins rule.
        let mut prizes = HashMap::new();
        let mut parse_failed = false;
        for text in &texts {
            match report::parse_report(text, &prefixes, config.currency_marker) {
                Ok(map) => prizes.extend(map),
                Err(e) => {
                    println!("   ❌ Unusable report for {}: {}", month_label, e);
                    parse_failed = true;
                    break;
                }
            }
        }
        if parse_failed {
            skipped_months.push(month);
            continue;
        }

        let added = reconcile::reconcile_month(
            &held,
            &prizes,
            month,
            &config.id_prefix,
            &mut ledger,
        )?;
        println!("   🎉 {} winning bond(s) recorded for {}", added, month_label);
        total_added += added;
    }

    store::write_winnings(&config.winnings_file, &ledger)?;
    println!("\n💾 Winnings saved to {}", config.winnings_file);

    println!("\n📊 SUMMARY");
    println!("   New winning records: {}", total_added);
    if !skipped_months.is_empty() {
        let skipped: Vec<String> = skipped_months
            .iter()
            .map(|m| m.format("%B %Y").to_string())
            .collect();
        println!("   ⚠️  Skipped months: {}", skipped.join(", "));
    }

    Ok(())
}
