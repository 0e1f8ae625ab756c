//! Observability utilities.

mod logging;
mod tracing;

pub use logging::{init_logging, LogConfig};
pub use tracing::{
    CollectingRunObserver, LoggingRunObserver, NoOpRunObserver, ObservedEvent, RunObserver,
    SpanTimer,
};
