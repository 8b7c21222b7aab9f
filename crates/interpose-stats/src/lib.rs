//! Online duration statistics for interpose.
//!
//! [`StatisticsProcessor`] measures how long each matching invocation takes
//! and folds the sample into a per-service accumulator (count, mean, M2,
//! min, max, cumulative) using Welford's online algorithm, so mean and
//! standard deviation are available at any time without storing samples.
//!
//! Starting the processor opens a fresh sampling window; stopping it drops
//! every accumulator.
//!
//! # Example
//!
//! ```rust
//! use interpose_core::{DataBag, Dispatcher, Invocation, ManagedProcessor, Result};
//! use interpose_stats::StatisticsProcessor;
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::new();
//! let stats = Arc::new(StatisticsProcessor::builder().build());
//! stats.start(&dispatcher);
//!
//! let executor = |_: &mut Invocation| -> Result<()> { Ok(()) };
//! for _ in 0..3 {
//!     dispatcher
//!         .dispatch(&executor, &mut Invocation::new("orders.Create", DataBag::new()))
//!         .unwrap();
//! }
//!
//! let report = stats.snapshot();
//! assert_eq!(report.services[0].service, "orders.Create");
//! assert_eq!(report.services[0].count, 3);
//! ```

pub mod config;
pub mod estimator;
pub mod events;
pub mod processor;

pub use config::{StatisticsConfig, StatisticsConfigBuilder};
pub use estimator::{
    Accumulator, Estimator, ServiceStatistic, StatisticsEstimator, StatisticsSnapshot,
    DEFAULT_BUFFER_CAPACITY,
};
pub use events::StatisticsEvent;
pub use processor::{StatisticsProcessor, STATISTICS_PRIORITY};
