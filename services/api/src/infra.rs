use metrics_exporter_prometheus::PrometheusHandle;
use replate::marketplace::{InMemoryMarket, ListingLifecycleService};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One in-memory market backing both the listing store and the claim ledger,
/// so claim checks and inserts share a serialization point.
pub(crate) fn build_market_service(
) -> Arc<ListingLifecycleService<InMemoryMarket, InMemoryMarket>> {
    let market = Arc::new(InMemoryMarket::default());
    Arc::new(ListingLifecycleService::new(market.clone(), market))
}
