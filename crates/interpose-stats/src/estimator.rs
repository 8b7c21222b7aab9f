//! Online mean/variance estimation with buffered writers.
//!
//! Each service owns an [`Accumulator`] updated with Welford's algorithm.
//! Writers never contend on the accumulator directly: they push into a
//! small lock-free buffer, and whoever finds it full drains it. Readers
//! drain the buffer before looking at the accumulator, so a read always
//! reflects every sample recorded before it started.

use crossbeam_queue::ArrayQueue;
use dashmap::DashMap;
use interpose_core::epoch_millis;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Default per-service buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64;

/// Running statistics for one service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accumulator {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    cumulative: f64,
}

impl Accumulator {
    /// An accumulator with no samples.
    pub const EMPTY: Accumulator = Accumulator {
        count: 0,
        mean: 0.0,
        m2: 0.0,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
        cumulative: 0.0,
    };

    /// Adds one sample.
    pub fn record(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
        self.min = self.min.min(x);
        self.max = self.max.max(x);
        self.cumulative += x;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sum of squared deviations from the mean.
    pub fn m2(&self) -> f64 {
        self.m2
    }

    /// Smallest sample, or 0 with no samples.
    pub fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    /// Largest sample, or 0 with no samples.
    pub fn max(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.max
        }
    }

    pub fn cumulative(&self) -> f64 {
        self.cumulative
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Buffered accumulator for one service.
#[derive(Debug)]
pub struct Estimator {
    buffer: ArrayQueue<f64>,
    accumulator: Mutex<Accumulator>,
}

impl Estimator {
    /// Creates an estimator buffering up to `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: ArrayQueue::new(capacity.max(1)),
            accumulator: Mutex::new(Accumulator::EMPTY),
        }
    }

    /// Records a sample. Never drops it: when the buffer is full the writer
    /// drains it, or yields and retries if another thread holds the
    /// accumulator.
    pub fn record(&self, x: f64) {
        let mut sample = x;
        loop {
            match self.buffer.push(sample) {
                Ok(()) => return,
                Err(rejected) => {
                    sample = rejected;
                    match self.accumulator.try_lock() {
                        Some(mut acc) => self.drain_into(&mut acc),
                        None => std::thread::yield_now(),
                    }
                }
            }
        }
    }

    /// Drains buffered samples and returns the accumulator.
    pub fn quiesce(&self) -> Accumulator {
        let mut acc = self.accumulator.lock();
        self.drain_into(&mut acc);
        *acc
    }

    /// Number of samples waiting in the buffer.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn drain_into(&self, acc: &mut Accumulator) {
        while let Some(x) = self.buffer.pop() {
            acc.record(x);
        }
    }
}

/// Statistics for one service, as reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatistic {
    pub service: String,
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
    pub min: f64,
    pub max: f64,
    pub cumulative: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl ServiceStatistic {
    fn new(service: &str, acc: &Accumulator) -> Self {
        Self {
            service: service.to_string(),
            count: acc.count(),
            mean: acc.mean(),
            m2: acc.m2(),
            min: acc.min(),
            max: acc.max(),
            cumulative: acc.cumulative(),
            variance: acc.variance(),
            std_dev: acc.std_dev(),
        }
    }
}

/// Statistics for every sampled service, sorted by service name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub sampling_started_millis: u64,
    pub services: Vec<ServiceStatistic>,
}

/// Per-service estimators keyed by service name.
#[derive(Debug)]
pub struct StatisticsEstimator {
    estimators: DashMap<Arc<str>, Arc<Estimator>>,
    sampling_started: AtomicU64,
    buffer_capacity: usize,
}

impl StatisticsEstimator {
    /// Creates an estimator set whose per-service buffers hold
    /// `buffer_capacity` samples.
    pub fn new(buffer_capacity: usize) -> Self {
        Self {
            estimators: DashMap::new(),
            sampling_started: AtomicU64::new(epoch_millis(SystemTime::now())),
            buffer_capacity,
        }
    }

    /// Records one sample for `service`.
    pub fn record(&self, service: &str, sample: f64) {
        self.estimator(service).record(sample);
    }

    /// Quiesced statistics for one service.
    pub fn statistic(&self, service: &str) -> Option<ServiceStatistic> {
        let estimator = self.estimators.get(service).map(|e| Arc::clone(e.value()))?;
        Some(ServiceStatistic::new(service, &estimator.quiesce()))
    }

    /// Quiesced statistics for every service.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let estimators: Vec<(Arc<str>, Arc<Estimator>)> = self
            .estimators
            .iter()
            .map(|e| (Arc::clone(e.key()), Arc::clone(e.value())))
            .collect();

        let mut services: Vec<ServiceStatistic> = estimators
            .iter()
            .map(|(service, estimator)| ServiceStatistic::new(service, &estimator.quiesce()))
            .collect();
        services.sort_by(|a, b| a.service.cmp(&b.service));

        StatisticsSnapshot {
            sampling_started_millis: self.sampling_started_millis(),
            services,
        }
    }

    /// Drops all accumulators and restarts the sampling window.
    pub fn reset(&self) {
        self.estimators.clear();
        self.sampling_started
            .store(epoch_millis(SystemTime::now()), Ordering::Relaxed);
    }

    /// Drops all accumulators.
    pub fn clear(&self) {
        self.estimators.clear();
    }

    /// When the current sampling window started, in epoch milliseconds.
    pub fn sampling_started_millis(&self) -> u64 {
        self.sampling_started.load(Ordering::Relaxed)
    }

    /// Number of services with an accumulator.
    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }

    fn estimator(&self, service: &str) -> Arc<Estimator> {
        if let Some(existing) = self.estimators.get(service) {
            return Arc::clone(existing.value());
        }
        let capacity = self.buffer_capacity;
        Arc::clone(
            self.estimators
                .entry(Arc::from(service))
                .or_insert_with(|| Arc::new(Estimator::new(capacity)))
                .value(),
        )
    }
}

impl Default for StatisticsEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
