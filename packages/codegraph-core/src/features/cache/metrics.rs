//! Cache hit/miss instrumentation, exposed via a `prometheus::Registry`.
//!
//! Ambient observability only — nothing here decides cache behavior. Not
//! scraped by this core (that's the out-of-scope serving layer's job).

use prometheus::{IntCounterVec, Opts, Registry};

pub struct CacheMetrics {
    pub hits: IntCounterVec,
    pub misses: IntCounterVec,
}

impl CacheMetrics {
    pub fn new(registry: &Registry) -> Self {
        let hits = IntCounterVec::new(
            Opts::new("codegraph_cache_hits_total", "Cache hits by tier"),
            &["tier"],
        )
        .expect("metric definition is static and valid");
        let misses = IntCounterVec::new(
            Opts::new("codegraph_cache_misses_total", "Cache misses by tier"),
            &["tier"],
        )
        .expect("metric definition is static and valid");

        // Registration fails only on a name collision against an already
        // registered metric, which cannot happen for a freshly built
        // registry — ignore accordingly rather than threading a Result
        // through every call site that constructs a CacheMetrics.
        let _ = registry.register(Box::new(hits.clone()));
        let _ = registry.register(Box::new(misses.clone()));

        Self { hits, misses }
    }

    pub fn record_hit(&self, tier: &str) {
        self.hits.with_label_values(&[tier]).inc();
    }

    pub fn record_miss(&self, tier: &str) {
        self.misses.with_label_values(&[tier]).inc();
    }

    pub fn hit_rate(&self, tier: &str) -> f64 {
        let hits = self.hits.with_label_values(&[tier]).get() as f64;
        let misses = self.misses.with_label_values(&[tier]).get() as f64;
        if hits + misses == 0.0 {
            0.0
        } else {
            hits / (hits + misses)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_reflects_recorded_samples() {
        let registry = Registry::new();
        let metrics = CacheMetrics::new(&registry);
        metrics.record_hit("l1");
        metrics.record_hit("l1");
        metrics.record_miss("l1");
        assert!((metrics.hit_rate("l1") - (2.0 / 3.0)).abs() < 1e-9);
    }
}
