//! Click count aggregation.
//!
//! The aggregator is the only writer of click counts. It drains the click
//! queue one event at a time and applies each event as a single increment
//! on the mapping store. Several aggregators may share one queue.

pub mod event;
pub mod shutdown;
pub mod worker;

pub use event::{parse_event, MalformedEvent};
pub use shutdown::shutdown_signal;
pub use worker::{
    Aggregator, AggregatorSettings, DrainReport, StepOutcome, DEFAULT_ERROR_BACKOFF,
    DEFAULT_IDLE_BACKOFF, DEFAULT_IDLE_JITTER,
};
