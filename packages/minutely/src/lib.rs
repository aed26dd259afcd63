#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! # minutely
//!
//! Collect timings and other numeric samples in-process, fold them into per-minute summary
//! statistics and periodically push those statistics to an external system.
//!
//! # Collected metrics
//!
//! Every sample is tagged with a metric name and an optional set of [`Segments`]
//! (dimension key/value pairs). For each distinct combination of minute, metric name and
//! segment set, the following statistics are collected:
//!
//! * Number of samples (`u64`).
//! * Mean of the samples (`f64`).
//! * Minimum and maximum sample (`f64`).
//!
//! # Recording samples
//!
//! The crate root exposes a process-wide collector through free functions. Install a sink
//! once at startup, then record values from any thread:
//!
//! ```
//! use minutely::{Segments, TracingSink};
//!
//! minutely::set_sink(TracingSink);
//!
//! let segments = Segments::from([("endpoint", "/orders")]);
//!
//! // Arbitrary values.
//! minutely::record_value("order_total_eur", 49.95, &segments);
//!
//! // Timed spans, in seconds. Begin and end must happen on the same thread.
//! minutely::begin_measure("order_processing_duration", &segments);
//! // ... process the order ...
//! minutely::end_measure("order_processing_duration", &segments);
//!
//! // Scoped timing that also covers early returns and panics.
//! {
//!     let _timer = minutely::measure("order_persist_duration", &segments);
//!     // ... write to the database ...
//! }
//! ```
//!
//! Recommended metric name format: `big_medium_small_units`
//!
//! # Flushing
//!
//! Whenever a value is recorded and the flush interval (one minute by default) has passed
//! since the previous flush, the recording thread extracts everything accumulated so far
//! and hands it to the [`Sink`]. Flushing is driven by recording activity: a process that
//! records nothing does not flush, no matter how much time passes. Call [`flush()`] to
//! flush explicitly, for example before the process exits.
//!
//! The payload handed to the sink is grouped by metric and then by minute:
//!
//! ```
//! use std::sync::Arc;
//!
//! use minutely::{Collector, MemorySink, Segments};
//!
//! let sink = Arc::new(MemorySink::new());
//! let collector = Collector::builder().sink(Arc::clone(&sink)).build();
//!
//! collector.record_value("queue_depth", 4.0, &Segments::new());
//! collector.record_value("queue_depth", 8.0, &Segments::new());
//! collector.flush().unwrap();
//!
//! for metric in &sink.payloads()[0] {
//!     for point in metric.points() {
//!         for values in point.values() {
//!             println!(
//!                 "{} @ {}: mean {:?} over {} samples",
//!                 metric.metric(),
//!                 point.time(),
//!                 values.average(),
//!                 values.count()
//!             );
//!         }
//!     }
//! }
//! ```
//!
//! Delivery is best-effort. If the sink fails, the payload is dropped and not retried.
//!
//! # Dedicated collectors
//!
//! The process-wide collector is a [`Collector`] like any other. Create your own instances
//! via [`Collector::builder()`] when you need isolated metrics or a custom configuration,
//! or [`install()`] a custom one as the process-wide collector before first use.
//!
//! # Panic policy
//!
//! This crate will not panic for "mathematical" reasons during recording, such as
//! overflow of sample counts.
//!
//! Flushing without a sink is a usage error. An explicit [`flush()`] reports it as
//! [`Error::SinkNotSet`], but a flush triggered by recording a value panics, because there
//! is nobody to report the error to and silently discarding all metrics is worse.
//! Either way nothing is extracted, so the recorded data is delivered once a sink is installed.
//!
//! # Mathematics policy
//!
//! Values are `f64`. Means are maintained incrementally and match the arithmetic mean
//! exactly for short sequences; very long sequences within one minute accumulate the usual
//! floating point rounding error.

mod aggregator;
mod clock;
mod collector;
mod collector_builder;
mod constants;
mod data_types;
mod error;
mod global;
mod measure;
mod reshape;
mod segments;
mod sink;
mod spans;
mod stat_set;

pub use aggregator::*;
pub use clock::*;
pub use collector::*;
pub use collector_builder::*;
pub use constants::*;
pub use data_types::*;
pub use error::*;
pub use global::*;
pub use measure::*;
pub use reshape::*;
pub use segments::*;
pub use sink::*;
pub use stat_set::*;
