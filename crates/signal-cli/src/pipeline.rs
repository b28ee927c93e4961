use bar_storage::BarStorage;
use chrono::Utc;
use market_fetch::FetchManager;
use notifier::{render_report, DispatchResult, Notifier};
use signal_core::{BarSeries, SignalResult};
use std::collections::HashMap;
use std::sync::Arc;
use stock_name_resolver::StockNameResolver;
use tokio::sync::Semaphore;

/// Per-run knobs the caller supplies; everything with a sensible
/// default lives in `AppConfig` instead.
pub struct AnalyzeOptions {
    pub days_of_history: i64,
    pub max_concurrency: usize,
    pub news_context: HashMap<String, String>,
}

/// Explicit holder for the collaborators `analyze`/`publish` need —
/// constructed once at startup and passed down, rather than reached for
/// through a global.
pub struct Dependencies {
    pub fetch_manager: Arc<FetchManager>,
    pub storage: Arc<BarStorage>,
    pub name_resolver: Arc<StockNameResolver>,
    pub notifier: Arc<Notifier>,
}

/// `analyze(symbols, opts) -> [SignalResult]`. Invalid symbols are
/// skipped with a warning rather than aborting the whole batch; workers
/// run under a bounded semaphore so fetch/store/decide stays a blocking
/// chain per symbol instead of spiking concurrency with the watchlist
/// size.
pub async fn analyze(symbols: &[String], opts: &AnalyzeOptions, deps: &Dependencies) -> Vec<SignalResult> {
    let semaphore = Arc::new(Semaphore::new(opts.max_concurrency.max(1)));
    let mut handles = Vec::with_capacity(symbols.len());

    for raw_symbol in symbols {
        let symbol = match validators::validate_stock_code(raw_symbol) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(symbol = raw_symbol.as_str(), %err, "skipping invalid symbol");
                continue;
            }
        };
        let news = opts.news_context.get(&symbol).cloned();
        let semaphore = semaphore.clone();
        let fetch_manager = deps.fetch_manager.clone();
        let storage = deps.storage.clone();
        let name_resolver = deps.name_resolver.clone();
        let days = opts.days_of_history;

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore never closes");
            analyze_one(&symbol, days, news.as_deref(), &fetch_manager, &storage, &name_resolver).await
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {}
            Err(err) => tracing::error!(%err, "analyze worker panicked"),
        }
    }
    results
}

async fn analyze_one(
    symbol: &str,
    days: i64,
    news_context: Option<&str>,
    fetch_manager: &FetchManager,
    storage: &BarStorage,
    name_resolver: &StockNameResolver,
) -> Option<SignalResult> {
    let end = Utc::now().date_naive();
    let start = end - chrono::Duration::days(days);

    let (series, source) = fetch_manager.get_daily(symbol, Some(start), Some(end), days).await;
    let series = match series {
        Some(series) => series,
        None => {
            tracing::warn!(symbol, "all fetchers exhausted, nothing to analyze");
            return None;
        }
    };

    if let Err(err) = storage.upsert(&series.bars, &source).await {
        tracing::warn!(symbol, %err, "failed to persist fetched bars");
    }

    let stored_bars = match storage.range(symbol, start, end).await {
        Ok(bars) if bars.len() >= series.len() => bars,
        _ => series.bars,
    };
    let series = BarSeries::new(stored_bars);

    let _name = name_resolver.get_stock_name(symbol, None).await;

    match decision_engine::analyze(symbol, &series, news_context) {
        Ok(result) => Some(result),
        Err(err) => {
            tracing::info!(symbol, %err, "decision engine declined to score symbol");
            None
        }
    }
}

/// `publish([SignalResult]) -> bool`. Renders the report once and fans
/// it out through every configured channel; never raises on per-channel
/// failure.
pub async fn publish(results: &[SignalResult], notifier: &Notifier) -> DispatchResult {
    let report = render_report(results);
    notifier.send(&report).await
}
