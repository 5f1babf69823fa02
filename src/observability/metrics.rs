//! Thread-safe metrics collection
//!
//! Atomic counters for ticket intake, classification, reply drafting and
//! logins, plus a bounded window of pipeline timings.

use crate::routing::Department;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const TIMING_WINDOW: usize = 1000;

/// Global metrics collector instance
pub static METRICS: Lazy<MetricsCollector> = Lazy::new(MetricsCollector::new);

/// Get reference to global metrics collector
pub fn metrics() -> &'static MetricsCollector {
    &METRICS
}

pub struct MetricsCollector {
    tickets_received: AtomicU64,
    tickets_in_flight: AtomicU64,
    tickets_created: AtomicU64,
    tickets_failed: AtomicU64,

    keyword_overrides: AtomicU64,
    model_classifications: AtomicU64,
    classifier_failures: AtomicU64,
    reply_failures: AtomicU64,

    logins_succeeded: AtomicU64,
    logins_rejected: AtomicU64,

    department_counts: Mutex<HashMap<Department, u64>>,
    processing_times: Mutex<Vec<u64>>, // milliseconds

    started_at: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            tickets_received: AtomicU64::new(0),
            tickets_in_flight: AtomicU64::new(0),
            tickets_created: AtomicU64::new(0),
            tickets_failed: AtomicU64::new(0),
            keyword_overrides: AtomicU64::new(0),
            model_classifications: AtomicU64::new(0),
            classifier_failures: AtomicU64::new(0),
            reply_failures: AtomicU64::new(0),
            logins_succeeded: AtomicU64::new(0),
            logins_rejected: AtomicU64::new(0),
            department_counts: Mutex::new(HashMap::new()),
            processing_times: Mutex::new(Vec::new()),
            started_at: AtomicU64::new(current_timestamp()),
        }
    }

    /// Count an incoming ticket. It stays in flight until the returned
    /// guard drops, including when the request future is cancelled.
    #[must_use = "the ticket leaves the in-flight gauge when the guard drops"]
    pub fn ticket_received(&self) -> InFlightTicket<'_> {
        self.tickets_received.fetch_add(1, Ordering::Relaxed);
        self.tickets_in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightTicket { collector: self }
    }

    pub fn ticket_created(&self, department: Department, duration: Duration) {
        self.tickets_created.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut counts) = self.department_counts.lock() {
            *counts.entry(department).or_insert(0) += 1;
        }
        self.record_processing_time(duration);
    }

    pub fn ticket_failed(&self, duration: Duration) {
        self.tickets_failed.fetch_add(1, Ordering::Relaxed);
        self.record_processing_time(duration);
    }

    pub fn record_keyword_override(&self) {
        self.keyword_overrides.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_model_classification(&self) {
        self.model_classifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classifier_failure(&self) {
        self.classifier_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reply_failure(&self) {
        self.reply_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn login_succeeded(&self) {
        self.logins_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn login_rejected(&self) {
        self.logins_rejected.fetch_add(1, Ordering::Relaxed);
    }

    fn record_processing_time(&self, duration: Duration) {
        if let Ok(mut times) = self.processing_times.lock() {
            times.push(duration.as_millis() as u64);
            if times.len() > TIMING_WINDOW {
                times.remove(0);
            }
        }
    }

    /// Average, p50, p95 and p99 over the timing window
    fn processing_time_statistics(&self) -> (f64, f64, f64, f64) {
        let Ok(times) = self.processing_times.lock() else {
            return (0.0, 0.0, 0.0, 0.0);
        };
        if times.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }

        let mut sorted = times.clone();
        sorted.sort_unstable();
        let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;

        (
            avg,
            percentile(&sorted, 50.0),
            percentile(&sorted, 95.0),
            percentile(&sorted, 99.0),
        )
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        let now = current_timestamp();
        let (avg, p50, p95, p99) = self.processing_time_statistics();

        let by_department = self
            .department_counts
            .lock()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(d, n)| (d.as_str().to_string(), *n))
                    .collect()
            })
            .unwrap_or_default();

        MetricsSnapshot {
            tickets: TicketMetrics {
                received: self.tickets_received.load(Ordering::Relaxed),
                in_flight: self.tickets_in_flight.load(Ordering::Relaxed),
                created: self.tickets_created.load(Ordering::Relaxed),
                failed: self.tickets_failed.load(Ordering::Relaxed),
                by_department,
                avg_processing_time_ms: avg,
                processing_time_p50_ms: p50,
                processing_time_p95_ms: p95,
                processing_time_p99_ms: p99,
            },
            classification: ClassificationMetrics {
                keyword_overrides: self.keyword_overrides.load(Ordering::Relaxed),
                model_classifications: self.model_classifications.load(Ordering::Relaxed),
                classifier_failures: self.classifier_failures.load(Ordering::Relaxed),
                reply_failures: self.reply_failures.load(Ordering::Relaxed),
            },
            auth: AuthMetrics {
                logins_succeeded: self.logins_succeeded.load(Ordering::Relaxed),
                logins_rejected: self.logins_rejected.load(Ordering::Relaxed),
            },
            uptime_seconds: now.saturating_sub(self.started_at.load(Ordering::Relaxed)),
            timestamp: now,
        }
    }
}

/// Holds one slot of the in-flight gauge
pub struct InFlightTicket<'a> {
    collector: &'a MetricsCollector,
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.collector
            .tickets_in_flight
            .fetch_sub(1, Ordering::Relaxed);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub tickets: TicketMetrics,
    pub classification: ClassificationMetrics,
    pub auth: AuthMetrics,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketMetrics {
    pub received: u64,
    pub in_flight: u64,
    pub created: u64,
    pub failed: u64,
    pub by_department: HashMap<String, u64>,
    pub avg_processing_time_ms: f64,
    pub processing_time_p50_ms: f64,
    pub processing_time_p95_ms: f64,
    pub processing_time_p99_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationMetrics {
    pub keyword_overrides: u64,
    pub model_classifications: u64,
    pub classifier_failures: u64,
    pub reply_failures: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthMetrics {
    pub logins_succeeded: u64,
    pub logins_rejected: u64,
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Nearest-rank percentile over pre-sorted data
fn percentile(sorted: &[u64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)] as f64
}
