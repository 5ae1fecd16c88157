//! Performance metrics and statistics tracking for the scoring engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for scoring throughput and outcomes
pub struct ScoringMetrics {
    /// Total profiles scored
    pub profiles_scored: AtomicU64,
    /// Total requests that failed (alignment or inference)
    pub requests_failed: AtomicU64,
    /// Results by persona segment
    results_by_persona: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Uplift score distribution buckets over [-1, 1]
    uplift_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ScoringMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            profiles_scored: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            results_by_persona: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            uplift_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored profile
    pub fn record_analysis(&self, processing_time: Duration, uplift_score: f64, persona: &str) {
        self.profiles_scored.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        // Map uplift from [-1, 1] onto ten buckets
        let bucket = (((uplift_score + 1.0) / 2.0) * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.uplift_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut by_persona) = self.results_by_persona.write() {
            *by_persona.entry(persona.to_string()).or_insert(0) += 1;
        }
    }

    /// Record a failed request
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let percentile = |p: f64| sorted[(sorted.len() as f64 * p) as usize];
        let mean = sorted.iter().sum::<u64>() / sorted.len() as u64;

        ProcessingStats {
            count: sorted.len() as u64,
            mean_us: mean,
            p50_us: sorted[sorted.len() / 2],
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (profiles per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.profiles_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get uplift score distribution
    pub fn get_uplift_distribution(&self) -> [u64; 10] {
        *self.uplift_buckets.read().unwrap()
    }

    /// Get results by persona segment
    pub fn get_persona_breakdown(&self) -> HashMap<String, u64> {
        self.results_by_persona.read().unwrap().clone()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.profiles_scored.load(Ordering::Relaxed);
        let failed = self.requests_failed.load(Ordering::Relaxed);

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let by_persona = self.get_persona_breakdown();
        let uplift_dist = self.get_uplift_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║           UPLIFT SCORING ENGINE - METRICS SUMMARY            ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Profiles Scored: {:>8}  │  Throughput: {:>6.1} profiles/s   ║",
            scored, throughput
        );
        info!(
            "║ Requests Failed: {:>8}                                    ║",
            failed
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Results by Persona:                                          ║");
        for (persona, count) in &by_persona {
            let pct = if scored > 0 {
                (*count as f64 / scored as f64) * 100.0
            } else {
                0.0
            };
            info!(
                "║   {:15}: {:>6} ({:>5.1}%)                            ║",
                persona, count, pct
            );
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Uplift Score Distribution:                                   ║");
        let total: u64 = uplift_dist.iter().sum();
        for (i, &count) in uplift_dist.iter().enumerate() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:+.1} to {:+.1}: {:>6} ({:>5.1}%) {}",
                -1.0 + i as f64 * 0.2,
                -1.0 + (i + 1) as f64 * 0.2,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ScoringMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ScoringMetrics>, interval_secs: u64) -> Self {
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
        let metrics = ScoringMetrics::new();

        metrics.record_analysis(Duration::from_micros(100), 0.2, "Persuadable");
        metrics.record_analysis(Duration::from_micros(200), -0.15, "Do Not Disturb");
        metrics.record_failure();

        assert_eq!(metrics.profiles_scored.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.requests_failed.load(Ordering::Relaxed), 1);

        let breakdown = metrics.get_persona_breakdown();
        assert_eq!(breakdown.get("Persuadable"), Some(&1));
    }

    #[test]
    fn test_uplift_buckets_cover_negative_scores() {
        let metrics = ScoringMetrics::new();

        metrics.record_analysis(Duration::from_micros(100), -1.0, "Do Not Disturb");
        metrics.record_analysis(Duration::from_micros(100), 0.0, "Lost Cause");
        metrics.record_analysis(Duration::from_micros(100), 1.0, "Persuadable");

        let dist = metrics.get_uplift_distribution();
        assert_eq!(dist[0], 1);
        assert_eq!(dist[5], 1);
        assert_eq!(dist[9], 1);
        assert_eq!(dist.iter().sum::<u64>(), 3);
    }
}
