//! Performance metrics and statistics tracking for the inference service.

use crate::types::Case;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for served predictions
pub struct InferenceMetrics {
    /// Total predictions served successfully
    pub predictions_served: AtomicU64,
    /// Total predictions that ended in an error string
    pub prediction_errors: AtomicU64,
    /// Requests with a selector outside {1, 2, 3}
    pub invalid_case_requests: AtomicU64,
    /// Successful predictions per case
    predictions_by_case: RwLock<HashMap<&'static str, u64>>,
    /// Failed predictions per case
    errors_by_case: RwLock<HashMap<&'static str, u64>>,
    /// Dispatch latencies per case (in microseconds)
    latencies: RwLock<HashMap<&'static str, Vec<u64>>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl InferenceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            prediction_errors: AtomicU64::new(0),
            invalid_case_requests: AtomicU64::new(0),
            predictions_by_case: RwLock::new(HashMap::new()),
            errors_by_case: RwLock::new(HashMap::new()),
            latencies: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, case: Case, elapsed: Duration) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_case) = self.predictions_by_case.write() {
            *by_case.entry(case.slot_name()).or_insert(0) += 1;
        }

        if let Ok(mut latencies) = self.latencies.write() {
            let case_latencies = latencies.entry(case.slot_name()).or_insert_with(Vec::new);
            case_latencies.push(elapsed.as_micros() as u64);
            // Keep only last 10000 per case for memory efficiency
            if case_latencies.len() > 10000 {
                case_latencies.drain(0..5000);
            }
        }
    }

    /// Record a prediction that ended in an error string
    pub fn record_failure(&self, case: Case) {
        self.prediction_errors.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_case) = self.errors_by_case.write() {
            *by_case.entry(case.slot_name()).or_insert(0) += 1;
        }
    }

    /// Record a request with an invalid case selector
    pub fn record_invalid_case(&self) {
        self.invalid_case_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Get latency statistics per case
    pub fn get_case_stats(&self) -> HashMap<&'static str, CaseStats> {
        let latencies = self.latencies.read().unwrap();
        let mut stats = HashMap::new();

        for (case, case_latencies) in latencies.iter() {
            if case_latencies.is_empty() {
                continue;
            }

            let mut sorted: Vec<u64> = case_latencies.clone();
            sorted.sort();

            let sum: u64 = sorted.iter().sum();
            let count = sorted.len();

            stats.insert(
                *case,
                CaseStats {
                    count: count as u64,
                    mean_us: sum / count as u64,
                    p50_us: sorted[count / 2],
                    p99_us: sorted[(count as f64 * 0.99) as usize],
                },
            );
        }

        stats
    }

    /// Get current throughput (predictions per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get successful predictions per case
    pub fn get_predictions_by_case(&self) -> HashMap<&'static str, u64> {
        self.predictions_by_case.read().unwrap().clone()
    }

    /// Get failed predictions per case
    pub fn get_errors_by_case(&self) -> HashMap<&'static str, u64> {
        self.errors_by_case.read().unwrap().clone()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let served = self.predictions_served.load(Ordering::Relaxed);
        let errors = self.prediction_errors.load(Ordering::Relaxed);
        let invalid = self.invalid_case_requests.load(Ordering::Relaxed);
        let throughput = self.get_throughput();
        let by_case = self.get_predictions_by_case();
        let case_stats = self.get_case_stats();

        info!(
            served = served,
            errors = errors,
            invalid_case = invalid,
            throughput = format!("{:.1}/s", throughput),
            "Prediction metrics summary"
        );

        let errors_by_case = self.get_errors_by_case();
        for case in Case::all() {
            let name = case.slot_name();
            let count = by_case.get(name).copied().unwrap_or(0);
            let errors = errors_by_case.get(name).copied().unwrap_or(0);
            if let Some(stats) = case_stats.get(name) {
                info!(
                    case = name,
                    count = count,
                    errors = errors,
                    mean_us = stats.mean_us,
                    p50_us = stats.p50_us,
                    p99_us = stats.p99_us,
                    "Case latency"
                );
            }
        }
    }
}

impl Default for InferenceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-case latency statistics
#[derive(Debug)]
pub struct CaseStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<InferenceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<InferenceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = InferenceMetrics::new();

        metrics.record_prediction(Case::ObjectClassification, Duration::from_micros(100));
        metrics.record_prediction(Case::ObjectClassification, Duration::from_micros(200));
        metrics.record_prediction(Case::AnomalyDetection, Duration::from_micros(150));
        metrics.record_failure(Case::RedshiftBinning);
        metrics.record_invalid_case();

        assert_eq!(metrics.predictions_served.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.prediction_errors.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.invalid_case_requests.load(Ordering::Relaxed), 1);

        let by_case = metrics.get_predictions_by_case();
        assert_eq!(by_case.get("classification"), Some(&2));
        assert_eq!(by_case.get("anomaly"), Some(&1));
        assert_eq!(by_case.get("redshift"), None);

        let errors_by_case = metrics.get_errors_by_case();
        assert_eq!(errors_by_case.get("redshift"), Some(&1));
    }

    #[test]
    fn test_case_stats() {
        let metrics = InferenceMetrics::new();

        for us in [100, 200, 300, 400] {
            metrics.record_prediction(Case::RedshiftBinning, Duration::from_micros(us));
        }

        let stats = metrics.get_case_stats();
        let redshift = stats.get("redshift").unwrap();
        assert_eq!(redshift.count, 4);
        assert_eq!(redshift.mean_us, 250);
    }
}
