use prost_reflect::Value;
use prost_types::Timestamp;

use prost_constraints_types::{Time, TimeConstraint};

use crate::error::CompilationError;
use crate::violation::{self, ConstraintViolation};

/// Checks that a `google.protobuf.Timestamp` lies in the past or the future.
pub(crate) struct TimestampRuleEval {
    time: Time,
    msg_format: Option<String>,
}

impl TimestampRuleEval {
    pub fn new(constraint: &TimeConstraint) -> Result<Self, CompilationError> {
        let time = match Time::try_from(constraint.time) {
            Ok(time @ (Time::Past | Time::Future)) => time,
            Ok(Time::Unspecified) | Err(_) => {
                return Err(CompilationError::new(format!(
                    "temporal constraint needs PAST or FUTURE, got {}",
                    constraint.time
                )));
            }
        };
        let template = match time {
            Time::Past => violation::IN_PAST,
            _ => violation::IN_FUTURE,
        };
        violation::check_custom(constraint.msg_format.as_deref(), template, "`when`")?;
        Ok(Self {
            time,
            msg_format: constraint.msg_format.clone(),
        })
    }

    pub fn evaluate(
        &self,
        val: &Value,
        field_path: &[String],
        now: &Timestamp,
    ) -> Option<ConstraintViolation> {
        let ts = as_timestamp(val)?;

        let (holds, template) = match self.time {
            Time::Future => (ts_gt(&ts, now), violation::IN_FUTURE),
            Time::Past => (ts_lt(&ts, now), violation::IN_PAST),
            Time::Unspecified => return None,
        };
        if holds {
            return None;
        }
        Some(ConstraintViolation::from_template(
            self.msg_format.as_deref(),
            template,
            Vec::new(),
            field_path.to_vec(),
        ))
    }
}

fn as_timestamp(val: &Value) -> Option<Timestamp> {
    let msg = val.as_message()?;
    let seconds = msg
        .get_field_by_name("seconds")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);
    let nanos = msg
        .get_field_by_name("nanos")
        .and_then(|v| v.as_i32())
        .unwrap_or(0);
    Some(Timestamp { seconds, nanos })
}

fn ts_lt(a: &Timestamp, b: &Timestamp) -> bool {
    a.seconds < b.seconds || (a.seconds == b.seconds && a.nanos < b.nanos)
}

fn ts_gt(a: &Timestamp, b: &Timestamp) -> bool {
    a.seconds > b.seconds || (a.seconds == b.seconds && a.nanos > b.nanos)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing;

    const NOW: Timestamp = Timestamp {
        seconds: 1_700_000_000,
        nanos: 500,
    };

    fn eval(time: Time) -> TimestampRuleEval {
        TimestampRuleEval::new(&TimeConstraint {
            time: time as i32,
            msg_format: None,
        })
        .expect("time constraint compiles")
    }

    fn path() -> Vec<String> {
        vec!["when".to_string()]
    }

    #[test]
    fn future_rejects_now_and_earlier() {
        let future = eval(Time::Future);
        assert!(future
            .evaluate(&testing::timestamp(NOW.seconds, NOW.nanos + 1), &path(), &NOW)
            .is_none());

        let at_now = future
            .evaluate(&testing::timestamp(NOW.seconds, NOW.nanos), &path(), &NOW)
            .expect("now is not in the future");
        assert_eq!(at_now.msg_format(), "Timestamp value must be in the future.");
        assert!(at_now.params().is_empty());

        assert!(future
            .evaluate(&testing::timestamp(NOW.seconds - 1, 999_999_999), &path(), &NOW)
            .is_some());
    }

    #[test]
    fn past_rejects_now_and_later() {
        let past = eval(Time::Past);
        assert!(past
            .evaluate(&testing::timestamp(NOW.seconds, NOW.nanos - 1), &path(), &NOW)
            .is_none());
        assert!(past
            .evaluate(&testing::timestamp(NOW.seconds, NOW.nanos), &path(), &NOW)
            .is_some());
        let later = past
            .evaluate(&testing::timestamp(NOW.seconds + 60, 0), &path(), &NOW)
            .expect("later is not in the past");
        assert_eq!(later.render(), "Timestamp value must be in the past.");
    }

    #[test]
    fn custom_message_cannot_carry_placeholders() {
        let custom = |text: &str| {
            TimestampRuleEval::new(&TimeConstraint {
                time: Time::Past as i32,
                msg_format: Some(text.to_string()),
            })
        };
        assert!(custom("Must be before %s").is_err());

        let eval = custom("Too late").expect("plain text compiles");
        let violation = eval
            .evaluate(&testing::timestamp(NOW.seconds + 1, 0), &path(), &NOW)
            .expect("later is not in the past");
        assert_eq!(violation.render(), "Too late");
        assert!(violation.params().is_empty());
    }

    #[test]
    fn direction_is_mandatory() {
        let err = TimestampRuleEval::new(&TimeConstraint {
            time: Time::Unspecified as i32,
            msg_format: None,
        })
        .err()
        .expect("unspecified direction");
        assert!(err.cause.contains("PAST or FUTURE"));
        assert!(
            TimestampRuleEval::new(&TimeConstraint {
                time: 9,
                msg_format: None,
            })
            .is_err()
        );
    }
}
