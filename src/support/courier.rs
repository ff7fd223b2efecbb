//! Diagnostics interface supplied at engine construction.
//!
//! Warnings and messages are delivered through a courier interface supplied
//! at construction, with four channels (info, warn, error, debug), rather
//! than through any global process state. [`Courier`] is that interface; an
//! [`Engine`](crate::engine::Engine) owns a `Box<dyn Courier>` rather than
//! calling a global logging macro directly.
//!
//! The default implementation, [`LogCourier`], forwards each channel to the
//! [`log`] facade, so deployments get ordinary structured logging for free.
//! Tests use [`RecordingCourier`] to assert on emitted messages without
//! installing a global logger.

use std::sync::Mutex;

/// A sink for simulation diagnostics.
///
/// Implementations must not re-enter the engine: a courier call happens
/// synchronously within `Engine::run_one_step` and must return without
/// mutating the engine it was called from.
pub trait Courier: Send + Sync {
    /// Routine informational message (e.g. a step summary).
    fn info(&self, message: &str);

    /// A non-fatal [`OperatingWarning`](super::OperatingWarning)-class condition.
    fn warn(&self, message: &str);

    /// An error accompanying a step abort.
    fn error(&self, message: &str);

    /// Fine-grained tracing, off by default in most deployments.
    fn debug(&self, message: &str);
}

/// Forwards each channel to the [`log`] facade.
///
/// This is the default courier used by [`EngineConfig::default`](crate::engine::EngineConfig::default).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCourier;

impl Courier for LogCourier {
    fn info(&self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }

    fn debug(&self, message: &str) {
        log::debug!("{message}");
    }
}

/// Collects messages per channel instead of emitting them, for tests.
#[derive(Debug, Default)]
pub struct RecordingCourier {
    pub info: Mutex<Vec<String>>,
    pub warn: Mutex<Vec<String>>,
    pub error: Mutex<Vec<String>>,
    pub debug: Mutex<Vec<String>>,
}

impl Courier for RecordingCourier {
    fn info(&self, message: &str) {
        self.info.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warn.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.error.lock().unwrap().push(message.to_string());
    }

    fn debug(&self, message: &str) {
        self.debug.lock().unwrap().push(message.to_string());
    }
}

/// Non-fatal operating conditions a [`Courier`] may be asked to report.
///
/// Not [`std::error::Error`] values, since none of them abort a step.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatingWarning {
    /// A heat source's COP evaluated below 1.
    LowCop { heat_source: String, cop: f64 },
    /// A heat source's COP evaluated below 0.
    NegativeCop { heat_source: String, cop: f64 },
    /// An environment temperature fell outside a performance map's declared
    /// breakpoints, requiring extrapolation.
    Extrapolated {
        heat_source: String,
        axis: &'static str,
        value: f64,
    },
    /// An entering-water high-temperature shut-off logic engaged.
    HighTShutOffEngaged { heat_source: String },
}

impl OperatingWarning {
    /// Renders the warning as a single-line message for a [`Courier`].
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::LowCop { heat_source, cop } => {
                format!("{heat_source}: COP {cop:.3} is less than 1")
            }
            Self::NegativeCop { heat_source, cop } => {
                format!("{heat_source}: COP {cop:.3} is negative")
            }
            Self::Extrapolated {
                heat_source,
                axis,
                value,
            } => {
                format!("{heat_source}: extrapolating {axis} axis at {value:.2}")
            }
            Self::HighTShutOffEngaged { heat_source } => {
                format!("{heat_source}: entering-water high-temperature shut-off engaged")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_courier_collects_per_channel() {
        let courier = RecordingCourier::default();
        courier.info("started");
        courier.warn(&OperatingWarning::LowCop {
            heat_source: "compressor".into(),
            cop: 0.8,
        }
        .message());
        courier.debug("trace");

        assert_eq!(courier.info.lock().unwrap().as_slice(), ["started"]);
        assert_eq!(
            courier.warn.lock().unwrap().as_slice(),
            ["compressor: COP 0.800 is less than 1"]
        );
        assert_eq!(courier.debug.lock().unwrap().as_slice(), ["trace"]);
        assert!(courier.error.lock().unwrap().is_empty());
    }
}
