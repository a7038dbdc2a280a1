use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded operation timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String, // "list" | "create" | "get" | "approve" | "delete" | "undo" | "seed"
    pub backend: String,   // "DB" | "UndoBuffer"
    pub duration_ns: u64,
    pub duration_us: f64,
    pub duration_ms: f64,
    pub item_count: usize,
    pub success: bool,
}

impl MetricEntry {
    pub fn new(
        operation: impl Into<String>,
        backend: impl Into<String>,
        duration: Duration,
        item_count: usize,
        success: bool,
    ) -> Self {
        let duration_ns = duration.as_nanos() as u64;
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            backend: backend.into(),
            duration_ns,
            duration_us: duration_ns as f64 / 1_000.0,
            duration_ms: duration_ns as f64 / 1_000_000.0,
            item_count,
            success,
        }
    }
}

/// Entries kept by default before the oldest ones are dropped.
pub const METRICS_CAPACITY: usize = 10_000;

/// Bounded in-memory store of the most recent timing entries.
#[derive(Debug)]
pub struct MetricsStore {
    pub entries: VecDeque<MetricEntry>,
    capacity: usize,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::with_capacity(METRICS_CAPACITY)
    }
}

impl MetricsStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(METRICS_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, entry: MetricEntry) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn record_raw(
        &mut self,
        operation: impl Into<String>,
        backend: impl Into<String>,
        duration: Duration,
        item_count: usize,
        success: bool,
    ) {
        self.record(MetricEntry::new(
            operation, backend, duration, item_count, success,
        ));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Aggregate stats per (operation, backend) pair.
    pub fn aggregated(&self) -> Vec<AggregatedMetric> {
        let mut map: HashMap<(String, String), Vec<&MetricEntry>> = HashMap::new();

        for e in &self.entries {
            map.entry((e.operation.clone(), e.backend.clone()))
                .or_default()
                .push(e);
        }

        let mut out: Vec<AggregatedMetric> = map
            .into_iter()
            .map(|((op, backend), entries)| {
                let count = entries.len();
                let failures = entries.iter().filter(|e| !e.success).count();
                let mut sorted: Vec<u64> = entries.iter().map(|e| e.duration_ns).collect();
                sorted.sort_unstable();
                let total: u64 = sorted.iter().sum();
                let avg = total / count as u64;
                let min = *sorted.first().unwrap_or(&0);
                let max = *sorted.last().unwrap_or(&0);
                let p50 = sorted[count / 2];
                let p95 = sorted[((count as f64 * 0.95) as usize).min(count.saturating_sub(1))];
                let p99 = sorted[((count as f64 * 0.99) as usize).min(count.saturating_sub(1))];

                AggregatedMetric {
                    operation: op,
                    backend,
                    sample_count: count,
                    failure_count: failures,
                    min_ns: min,
                    max_ns: max,
                    avg_ns: avg,
                    p50_ns: p50,
                    p95_ns: p95,
                    p99_ns: p99,
                    avg_ms: avg as f64 / 1_000_000.0,
                    p95_ms: p95 as f64 / 1_000_000.0,
                }
            })
            .collect();

        out.sort_by(|a, b| a.operation.cmp(&b.operation).then(a.backend.cmp(&b.backend)));
        out
    }

    /// Export all entries as a CSV string.
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record([
            "timestamp",
            "operation",
            "backend",
            "duration_ns",
            "duration_us",
            "duration_ms",
            "item_count",
            "success",
        ])?;

        for e in &self.entries {
            wtr.write_record([
                e.timestamp.to_rfc3339(),
                e.operation.clone(),
                e.backend.clone(),
                e.duration_ns.to_string(),
                format!("{:.3}", e.duration_us),
                format!("{:.6}", e.duration_ms),
                e.item_count.to_string(),
                e.success.to_string(),
            ])?;
        }

        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }

    /// Render a simple ASCII table of the aggregated rows.
    pub fn ascii_table(&self) -> String {
        let agg = self.aggregated();
        if agg.is_empty() {
            return "No metrics collected yet.".to_string();
        }

        let mut out = String::new();
        out.push_str(&format!(
            "\n{:<12} {:<12} {:>9} {:>9} {:>12} {:>12} {:>12}\n",
            "Operation", "Backend", "Samples", "Failures", "Avg (µs)", "P95 (µs)", "P99 (µs)"
        ));
        out.push_str(&"-".repeat(84));
        out.push('\n');

        for row in &agg {
            out.push_str(&format!(
                "{:<12} {:<12} {:>9} {:>9} {:>12.2} {:>12.2} {:>12.2}\n",
                row.operation,
                row.backend,
                row.sample_count,
                row.failure_count,
                row.avg_ns as f64 / 1_000.0,
                row.p95_ns as f64 / 1_000.0,
                row.p99_ns as f64 / 1_000.0,
            ));
        }

        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetric {
    pub operation: String,
    pub backend: String,
    pub sample_count: usize,
    pub failure_count: usize,
    pub min_ns: u64,
    pub max_ns: u64,
    pub avg_ns: u64,
    pub p50_ns: u64,
    pub p95_ns: u64,
    pub p99_ns: u64,
    pub avg_ms: f64,
    pub p95_ms: f64,
}
