use async_trait::async_trait;
use signal_core::MarketType;

/// One external name-lookup collaborator, queried in the resolver's
/// configured priority order. `hk_only` mirrors the original's
/// YFinance-is-HK-only restriction (source-C in spec terms).
#[async_trait]
pub trait NameSource: Send + Sync {
    fn name(&self) -> &str;

    fn hk_only(&self) -> bool {
        false
    }

    async fn lookup(&self, code: &str) -> Option<String>;
}

pub(crate) fn applies_to(source: &dyn NameSource, code: &str) -> bool {
    !source.hk_only() || MarketType::detect(code) == MarketType::Hk
}
