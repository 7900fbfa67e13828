use std::sync::Arc;

use prost_reflect::MessageDescriptor;
use prost_types::Timestamp;

use crate::catalog::ConstraintSource;
use crate::registry::ValidationRules;

/// Source of "now" for temporal constraints.
///
/// Any `Fn() -> Timestamp + Send + Sync` closure is a clock.
pub trait Clock: Send + Sync {
    /// Returns the current point in time.
    fn now(&self) -> Timestamp;
}

impl<F> Clock for F
where
    F: Fn() -> Timestamp + Send + Sync,
{
    fn now(&self) -> Timestamp {
        self()
    }
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    // as_secs() since UNIX_EPOCH fits in i64 and subsec_nanos() is below 10^9.
    #[allow(clippy::cast_possible_wrap)]
    fn now(&self) -> Timestamp {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp {
            seconds: now.as_secs() as i64,
            nanos: now.subsec_nanos() as i32,
        }
    }
}

/// Always returns the same point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(Timestamp);

impl FixedClock {
    /// Freeze the clock at `seconds` and `nanos` since the Unix epoch.
    #[must_use]
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self(Timestamp { seconds, nanos })
    }

    /// Freeze the clock at `timestamp`.
    #[must_use]
    pub fn at(timestamp: Timestamp) -> Self {
        Self(timestamp)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Options for configuring the `Validator` at construction time.
#[non_exhaustive]
pub enum ValidatorOption {
    /// Disable lazy compilation: only message types given with
    /// [`ValidatorOption::MessageDescriptors`] can be validated, all others
    /// produce a compilation error.
    DisableLazy,

    /// Override the clock used by temporal constraints.
    Clock(Arc<dyn Clock>),

    /// Read constraint catalogs from this source instead of descriptor options.
    Constraints(Arc<dyn ConstraintSource>),

    /// Externally configured rules adding `valid` to target fields.
    Rules(ValidationRules),

    /// Preload evaluators for these descriptors at validator construction time.
    MessageDescriptors(Vec<MessageDescriptor>),
}

/// Options for configuring a single `Validator::validate_with` call.
#[non_exhaustive]
pub enum ValidationOption {
    /// Override the clock used by temporal constraints for this call.
    Clock(Arc<dyn Clock>),
}

/// Runtime configuration passed to evaluators during validation.
#[derive(Clone)]
pub(crate) struct ValidationConfig {
    pub clock: Arc<dyn Clock>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }
}

impl ValidationConfig {
    pub fn with_options(&self, options: &[ValidationOption]) -> Self {
        let mut cfg = self.clone();
        for option in options {
            match option {
                ValidationOption::Clock(clock) => cfg.clock = Arc::clone(clock),
            }
        }
        cfg
    }
}
