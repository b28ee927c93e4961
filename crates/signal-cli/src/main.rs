mod config;
mod pipeline;

use bar_storage::BarStorage;
use config::AppConfig;
use market_fetch::{EastmoneyFetcher, FetchManager, TushareFetcher};
use notifier::Notifier;
use pipeline::{AnalyzeOptions, Dependencies};
use std::collections::HashMap;
use std::sync::Arc;
use stock_name_resolver::StockNameResolver;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if config.symbols.is_empty() {
        tracing::warn!("WATCHLIST_SYMBOLS is empty, nothing to analyze");
        return Ok(());
    }

    let mut fetchers: Vec<Arc<dyn signal_core::Fetcher>> = vec![Arc::new(EastmoneyFetcher::new(0))];
    if let Some(token) = &config.tushare_token {
        fetchers.push(Arc::new(TushareFetcher::new(token.clone(), 1)));
    }
    let fetch_manager = Arc::new(FetchManager::new(fetchers));

    let storage = Arc::new(BarStorage::new(&format!("sqlite://{}", config.database_path)).await?);
    let name_resolver = Arc::new(StockNameResolver::new(config.name_cache_path.clone().into(), Vec::new()));
    let notifier = Arc::new(Notifier::new(&config.notifier));

    let deps = Dependencies { fetch_manager, storage, name_resolver, notifier: notifier.clone() };
    let opts = AnalyzeOptions {
        days_of_history: config.days_of_history,
        max_concurrency: config.max_concurrency,
        news_context: HashMap::new(),
    };

    let results = pipeline::analyze(&config.symbols, &opts, &deps).await;
    tracing::info!(analyzed = results.len(), requested = config.symbols.len(), "analysis pass complete");

    if results.is_empty() {
        return Ok(());
    }

    let dispatch = pipeline::publish(&results, &notifier).await;
    if !dispatch.all_succeeded {
        tracing::warn!(?dispatch.channel_results, "one or more notification channels failed");
    }

    Ok(())
}
