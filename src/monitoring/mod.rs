mod telemetry;

pub use telemetry::{init_telemetry, LogLevel, PerformanceTracker, TelemetryConfig};

/// Log the duration of the enclosing scope at debug level.
#[macro_export]
macro_rules! track_performance {
    ($name:expr) => {
        let _tracker = $crate::monitoring::PerformanceTracker::new($name);
    };
}
