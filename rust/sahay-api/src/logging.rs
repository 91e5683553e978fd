//! Structured logging helpers.
//!
//! Small utilities for timing startup phases and logging numbered
//! initialization steps with consistent formatting.

use std::time::Instant;

/// Operation timer for measuring and logging execution duration.
///
/// Logs the operation start on creation; call [`OpTimer::finish`] to log
/// the elapsed duration.
#[derive(Debug)]
pub struct OpTimer {
    component: String,
    operation: String,
    start: Instant,
}

impl OpTimer {
    /// Creates a new operation timer and logs the start.
    #[must_use]
    pub fn new(component: impl Into<String>, operation: impl Into<String>) -> Self {
        let component = component.into();
        let operation = operation.into();

        tracing::debug!(
            component = %component,
            operation = %operation,
            "Operation started"
        );

        Self {
            component,
            operation,
            start: Instant::now(),
        }
    }

    /// Finishes the timer and logs the duration.
    pub fn finish(self) {
        let duration_ms = self.start.elapsed().as_millis();

        tracing::info!(
            component = %self.component,
            operation = %self.operation,
            duration_ms = duration_ms,
            "Operation completed"
        );
    }
}

/// Macro for logging initialization steps with consistent formatting.
#[macro_export]
macro_rules! log_init_step {
    ($step:expr, $total:expr, $name:expr, $detail:expr) => {
        tracing::info!(
            step = $step,
            total = $total,
            "[{}/{}] {} - {}",
            $step,
            $total,
            $name,
            $detail
        );
    };
    ($step:expr, $total:expr, $name:expr) => {
        tracing::info!(step = $step, total = $total, "[{}/{}] {}", $step, $total, $name);
    };
}

/// Macro for logging warnings during initialization.
#[macro_export]
macro_rules! log_init_warning {
    ($msg:expr) => {
        tracing::warn!("⚠️  {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        tracing::warn!("⚠️  {}", format!($msg, $($arg)*));
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_timer_records_names() {
        let timer = OpTimer::new("test_component", "test_operation");
        assert_eq!(timer.component, "test_component");
        assert_eq!(timer.operation, "test_operation");
    }

    #[test]
    fn op_timer_finish_does_not_panic() {
        let timer = OpTimer::new("test", "operation");
        timer.finish();
    }
}
