use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vidhi_core::MatchedRule;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    queries_total: AtomicU64,
    section_hits_total: AtomicU64,
    procedure_hits_total: AtomicU64,
    scenario_hits_total: AtomicU64,
    fir_filing_total: AtomicU64,
    fallback_total: AtomicU64,
    rejected_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub queries_total: u64,
    pub section_hits_total: u64,
    pub procedure_hits_total: u64,
    pub scenario_hits_total: u64,
    pub fir_filing_total: u64,
    pub fallback_total: u64,
    pub rejected_total: u64,
    pub avg_latency_micros: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_match(&self, rule: &MatchedRule) {
        self.queries_total.fetch_add(1, Ordering::Relaxed);

        let counter = match rule {
            MatchedRule::IpcSection { .. } | MatchedRule::CrpcSection { .. } => {
                &self.section_hits_total
            }
            MatchedRule::Procedure { .. } => &self.procedure_hits_total,
            MatchedRule::Scenario { .. } => &self.scenario_hits_total,
            MatchedRule::FirFiling => &self.fir_filing_total,
            MatchedRule::Fallback => &self.fallback_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        metrics::counter!("vidhi_queries_total", "rule" => rule.label()).increment(1);
    }

    /// Blank or oversized input turned away before reaching the selector.
    pub fn inc_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vidhi_rejected_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        metrics::histogram!("vidhi_select_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let queries = self.queries_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            queries_total: queries,
            section_hits_total: self.section_hits_total.load(Ordering::Relaxed),
            procedure_hits_total: self.procedure_hits_total.load(Ordering::Relaxed),
            scenario_hits_total: self.scenario_hits_total.load(Ordering::Relaxed),
            fir_filing_total: self.fir_filing_total.load(Ordering::Relaxed),
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            avg_latency_micros: if queries == 0 {
                0.0
            } else {
                latency as f64 / queries as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,vidhi_api=info,vidhi_agents=info,vidhi_knowledge=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use vidhi_core::ScenarioFamily;

    use super::*;

    #[test]
    fn snapshot_buckets_rules() {
        let metrics = AppMetrics::default();
        metrics.record_match(&MatchedRule::IpcSection {
            number: "302".to_string(),
        });
        metrics.record_match(&MatchedRule::Scenario {
            family: ScenarioFamily::Fraud,
        });
        metrics.record_match(&MatchedRule::Fallback);
        metrics.inc_rejected();
        metrics.observe_latency(Duration::from_micros(30));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.queries_total, 3);
        assert_eq!(snapshot.section_hits_total, 1);
        assert_eq!(snapshot.scenario_hits_total, 1);
        assert_eq!(snapshot.fallback_total, 1);
        assert_eq!(snapshot.rejected_total, 1);
        assert!((snapshot.avg_latency_micros - 10.0).abs() < f64::EPSILON);
    }
}
