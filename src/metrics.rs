//! Observability for the hover pipeline: per-lookup tracing ids and
//! histogram timings (debounce wait, locate, lookup, render) with
//! p50/p95/p99 summaries.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Identifiers attached to every lookup flowing through the pipeline.
#[derive(Debug, Clone)]
pub struct LookupIds {
    pub request_id: String,
    pub generation: u64,
}

impl LookupIds {
    pub fn new(generation: u64) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            generation,
        }
    }
}

/// Stores histograms for all named metrics.
pub struct MetricsRegistry {
    histograms: Mutex<HashMap<&'static str, SampleWindow>>,
    window_capacity: usize,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            histograms: Mutex::new(HashMap::new()),
            window_capacity: 1024,
        }
    }

    /// Record a sample (in microseconds) for the named metric.
    pub fn record(&self, name: &'static str, value_us: f64) {
        let mut histograms = self.histograms.lock();
        let capacity = self.window_capacity;
        histograms
            .entry(name)
            .or_insert_with(|| SampleWindow::new(capacity))
            .push(value_us);
    }

    /// Start a timing span that records on finish.
    pub fn span(self: &Arc<Self>, name: &'static str) -> TimingSpan {
        TimingSpan {
            name,
            start: Instant::now(),
            registry: Arc::clone(self),
        }
    }

    /// Percentile for a metric (p in 0-100), in microseconds.
    pub fn percentile(&self, name: &str, p: f64) -> f64 {
        let histograms = self.histograms.lock();
        histograms.get(name).map(|w| w.percentile(p)).unwrap_or(0.0)
    }

    /// Summary of all metrics at p50/p95/p99.
    pub fn summary(&self) -> HashMap<String, MetricSummary> {
        let histograms = self.histograms.lock();
        histograms
            .iter()
            .map(|(&name, window)| {
                (
                    name.to_string(),
                    MetricSummary {
                        p50_us: window.percentile(50.0),
                        p95_us: window.percentile(95.0),
                        p99_us: window.percentile(99.0),
                        count: window.count,
                    },
                )
            })
            .collect()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricSummary {
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
    pub count: usize,
}

/// A span measuring elapsed time from creation to explicit finish.
pub struct TimingSpan {
    name: &'static str,
    start: Instant,
    registry: Arc<MetricsRegistry>,
}

impl TimingSpan {
    /// End the span, recording elapsed duration in microseconds.
    pub fn finish(self) -> f64 {
        let elapsed_us = self.start.elapsed().as_micros() as f64;
        self.registry.record(self.name, elapsed_us);
        elapsed_us
    }
}

/// Fixed-capacity ring of recent samples.
struct SampleWindow {
    samples: Vec<f64>,
    pos: usize,
    count: usize,
}

impl SampleWindow {
    fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            pos: 0,
            count: 0,
        }
    }

    fn push(&mut self, value: f64) {
        let capacity = self.samples.len();
        self.samples[self.pos] = value;
        self.pos = (self.pos + 1) % capacity;
        if self.count < capacity {
            self.count += 1;
        }
    }

    fn percentile(&self, p: f64) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self.samples[..self.count].to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let idx = ((p / 100.0) * (self.count as f64 - 1.0)).round() as usize;
        sorted[idx.min(self.count - 1)]
    }
}

/// Well-known metric names (constants to avoid typos).
pub mod metric_names {
    /// Time from the first pointer sample of a burst to the debounce firing.
    pub const DEBOUNCE_WAIT: &str = "debounce_wait";
    pub const LOCATE_DONE: &str = "t_locate_done";
    pub const LOOKUP_DONE: &str = "t_lookup_done";
    pub const RENDER_DONE: &str = "t_render_done";
}
