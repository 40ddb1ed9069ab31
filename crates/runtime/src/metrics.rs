use std::collections::BTreeMap;

use serde::Serialize;

/// Named session counters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Compositions,
    CompositionsReused,
    GridRequests,
    StaleGridResponses,
    PickEvents,
    ProviderErrors,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Histogram {
    pub count: u64,
    pub sum: u64,
    pub min: u64,
    pub max: u64,
}

impl Histogram {
    pub fn record(&mut self, value: u64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum = self.sum.saturating_add(value);
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

/// Deterministic counters plus a fetch-latency histogram.
///
/// Sorted maps keep snapshot ordering stable for logs and the CLI report.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<Counter, u64>,
    fetch_latency_ms: Histogram,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub counters: Vec<(Counter, u64)>,
    pub fetch_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    pub fn inc(&mut self, counter: Counter) {
        *self.counters.entry(counter).or_insert(0) += 1;
    }

    pub fn record_fetch_latency(&mut self, millis: u64) {
        self.fetch_latency_ms.record(millis);
    }

    pub fn fetch_latency(&self) -> Histogram {
        self.fetch_latency_ms
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (*k, *v)).collect(),
            fetch_latency_ms: self.fetch_latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Counter, Histogram, Metrics};

    #[test]
    fn counters_accumulate() {
        let mut m = Metrics::new();
        m.inc(Counter::Compositions);
        m.inc(Counter::Compositions);
        assert_eq!(m.counter(Counter::Compositions), 2);
        assert_eq!(m.counter(Counter::PickEvents), 0);
    }

    #[test]
    fn histogram_tracks_min_max_mean() {
        let mut h = Histogram::default();
        assert_eq!(h.mean(), None);
        h.record(5);
        h.record(2);
        h.record(8);
        assert_eq!((h.count, h.sum, h.min, h.max), (3, 15, 2, 8));
        assert_eq!(h.mean(), Some(5.0));
    }

    #[test]
    fn snapshot_is_ordered_by_counter() {
        let mut m = Metrics::new();
        m.inc(Counter::ProviderErrors);
        m.inc(Counter::Compositions);
        m.record_fetch_latency(12);
        let snap = m.snapshot();
        assert_eq!(
            snap.counters,
            vec![(Counter::Compositions, 1), (Counter::ProviderErrors, 1)]
        );
        assert_eq!(snap.fetch_latency_ms.count, 1);
    }
}
