//! ThreatLens CLI - assess the impact of a CVE against your asset inventory

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use threatlens_common::{Config, LogFormat, LoggingConfig};
use threatlens_core::AssessmentOutcome;
use threatlens_engine::{
    AssessmentWorkflow, EvidenceCollector, ExploitationResolver, ThreatScorer,
};
use threatlens_feeds::{FileInventory, GithubSearch, KevFeed, NvdRegistry};
use tracing::info;

/// ThreatLens CVE impact assessment
#[derive(Parser, Debug)]
#[command(name = "threatlens")]
#[command(version)]
#[command(about = "Assess a CVE against your asset inventory", long_about = None)]
struct Args {
    /// CVE identifier to assess (e.g. CVE-2025-53770)
    cve_id: String,

    /// Configuration file path
    #[arg(short, long, default_value = "threatlens.toml")]
    config: String,

    /// Asset inventory file (overrides config)
    #[arg(short, long)]
    inventory: Option<String>,

    /// Log level (trace, debug, info, warn, error); defaults to the
    /// configured level
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact); defaults to the configured
    /// format
    #[arg(long)]
    log_format: Option<String>,

    /// Emit the full assessment as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };
    let config = config.merge_env();

    // CLI flags take precedence over the configured logging settings
    let (level, format) = effective_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        &config.logging,
    );
    threatlens_common::init_logging(&level, format);

    let inventory_path = args.inventory.as_deref().unwrap_or(&config.inventory);
    let inventory = FileInventory::load(inventory_path)?;

    let client = threatlens_feeds::http_client()?;

    let mut registry = NvdRegistry::new(client.clone(), config.registry.api_key.clone());
    if let Some(ref url) = config.registry.api_url {
        registry = registry.with_api_url(url);
    }

    info!("loading KEV catalog");
    let kev = match config.kev.catalog_url {
        Some(ref url) => KevFeed::fetch_from(&client, url).await?,
        None => KevFeed::fetch(&client).await?,
    };

    let github = GithubSearch::new(client, config.github.token.clone());

    let workflow = AssessmentWorkflow::new(
        Arc::new(registry),
        Arc::new(inventory),
        ExploitationResolver::new(Arc::new(kev)),
        EvidenceCollector::new(Arc::new(github))
            .with_limit(config.evidence.limit)
            .with_snippet_max_chars(config.evidence.snippet_max_chars),
        ThreatScorer::with_config(config.scoring.clone()),
    );

    let outcome = workflow.run(&args.cve_id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }

    Ok(())
}

fn effective_logging(
    flag_level: Option<&str>,
    flag_format: Option<&str>,
    configured: &LoggingConfig,
) -> (String, LogFormat) {
    let level = flag_level.unwrap_or(&configured.level).to_string();
    let format = LogFormat::parse(flag_format.unwrap_or(&configured.format));
    (level, format)
}

fn print_summary(outcome: &AssessmentOutcome) {
    match outcome {
        AssessmentOutcome::NotFound { cve_id } => {
            println!("{}: not found in the vulnerability registry", cve_id);
        }
        AssessmentOutcome::Unaffected { record } => {
            println!("{}: no owned asset is affected", record.cve_id);
            println!("  Severity:  {}", record.severity);
            if let Some(score) = record.cvss_score {
                println!("  CVSS:      {:.1}", score);
            }
        }
        AssessmentOutcome::Assessed(assessment) => {
            let record = &assessment.record;
            println!("{}", record.cve_id);
            println!("  Threat:    {}", assessment.score);
            println!("  Severity:  {}", record.severity);
            if let Some(score) = record.cvss_score {
                println!("  CVSS:      {:.1}", score);
            }
            println!(
                "  Remediate: within {} days",
                assessment.score.level.sla_days()
            );

            if assessment.exploitation.actively_exploited {
                let mut note = String::from("  Exploited: yes");
                if assessment.exploitation.ransomware_campaign {
                    note.push_str(" (known ransomware campaign)");
                }
                println!("{}", note);
                if let Some(ref due) = assessment.exploitation.due_date {
                    println!("  KEV due:   {}", due);
                }
            } else {
                println!("  Exploited: no known exploitation");
            }

            println!("\nAffected assets ({}):", assessment.matched_assets.len());
            for asset in &assessment.matched_assets {
                println!(
                    "  {} - {} {} {} [{}/{}]",
                    asset.hostname,
                    asset.vendor,
                    asset.product,
                    asset.version,
                    asset.environment,
                    asset.criticality,
                );
            }

            if assessment.evidence.is_empty() {
                println!("\nNo public exploit repositories found.");
            } else {
                println!("\nExploit evidence ({}):", assessment.evidence.len());
                for candidate in &assessment.evidence {
                    println!("  {} ({} stars)", candidate.full_name, candidate.stars);
                    println!("    {}", candidate.url);
                    if let Some(ref desc) = candidate.description {
                        println!("    {}", desc);
                    }
                }
            }
        }
    }
}
