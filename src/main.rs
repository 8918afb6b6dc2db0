use anyhow::Context;

use mailrules::config::AppConfig;
use mailrules::gmail::{GmailClient, GmailExecutor};
use mailrules::ingest;
use mailrules::rules::{RuleEngine, load_rules};
use mailrules::store::LibSqlStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export GMAIL_ACCESS_TOKEN=ya29....");
        std::process::exit(1);
    });

    eprintln!("📬 mailrules v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Rules: {}", config.rules_path.display());

    let store = LibSqlStore::new_local(&config.db_path)
        .await
        .with_context(|| format!("Failed to open store at {}", config.db_path.display()))?;

    // Fail on a malformed rule set before touching the provider.
    let rule_set = load_rules(&config.rules_path)
        .with_context(|| format!("Failed to load rules from {}", config.rules_path.display()))?;
    eprintln!("   Loaded {} rule(s)", rule_set.rules.len());

    let client = GmailClient::new(config.gmail_base_url.clone(), config.access_token.clone());
    let report = ingest::sync_messages(&client, &store, config.max_results)
        .await
        .context("Ingest cycle failed")?;
    eprintln!(
        "   Ingested {} of {} message(s) ({} failed)",
        report.stored, report.listed, report.failed
    );

    let engine = RuleEngine::new(rule_set, config.failure_mode)?;
    let executor = GmailExecutor::new(GmailClient::new(
        config.gmail_base_url.clone(),
        config.access_token.clone(),
    ));

    let summary = engine.run(&store, &executor).await?;
    eprintln!(
        "   Run {}: {} message(s), {} rule match(es), {} action(s) submitted, {} error(s)",
        summary.run_id,
        summary.messages_processed,
        summary.rules_matched,
        summary.actions_submitted,
        summary.errors.len()
    );

    if summary.has_errors() {
        for error in &summary.errors {
            tracing::warn!(?error, "Run error");
        }
    }

    Ok(())
}
