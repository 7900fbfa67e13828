use std::cmp::Ordering;

use prost_reflect::Value;
use rust_decimal::Decimal;

use prost_constraints_types::{DigitsConstraint, FieldConstraints, NumberBound};

use crate::error::CompilationError;
use crate::violation::{self, ConstraintViolation};

/// Fractional digits a `Decimal` holds.
const MAX_SCALE: usize = 28;

/// A numeric value as compared by range and digits constraints.
///
/// Floats are taken at their shortest round-trip decimal text, so 16.5f32
/// compares as exactly 16.5 rather than its widened binary value.
#[derive(Debug, Clone, PartialEq)]
enum Number {
    /// Integers, and floats whose text fits a `Decimal` without rounding.
    Exact(Decimal),
    /// A float with more fractional digits than a `Decimal` holds. It lies
    /// strictly between `truncated` and the next step of the 28th decimal
    /// place away from zero.
    Finer {
        truncated: Decimal,
        negative: bool,
        text: String,
    },
    /// A float beyond the `Decimal` range, or not finite.
    Beyond(f64),
}

impl Number {
    fn from_value(val: &Value) -> Option<Self> {
        match val {
            Value::I32(v) => Some(Self::Exact(Decimal::from(*v))),
            Value::I64(v) => Some(Self::Exact(Decimal::from(*v))),
            Value::U32(v) => Some(Self::Exact(Decimal::from(*v))),
            Value::U64(v) => Some(Self::Exact(Decimal::from(*v))),
            Value::F32(v) => Some(Self::from_float(v.to_string(), f64::from(*v))),
            Value::F64(v) => Some(Self::from_float(v.to_string(), *v)),
            _ => None,
        }
    }

    fn from_float(text: String, value: f64) -> Self {
        if !value.is_finite() {
            return Self::Beyond(value);
        }
        if let Ok(exact) = Decimal::from_str_exact(&text) {
            return Self::Exact(exact);
        }
        let truncated = match text.split_once('.') {
            Some((integral, fractional)) if fractional.len() > MAX_SCALE => {
                Decimal::from_str_exact(&format!("{integral}.{}", &fractional[..MAX_SCALE]))
            }
            _ => return Self::Beyond(value),
        };
        match truncated {
            Ok(truncated) => Self::Finer {
                truncated,
                negative: value.is_sign_negative(),
                text,
            },
            Err(_) => Self::Beyond(value),
        }
    }

    /// Orders the value against a bound; `None` for NaN.
    fn cmp_bound(&self, bound: Decimal) -> Option<Ordering> {
        match self {
            Self::Exact(d) => Some(d.cmp(&bound)),
            // No bound lies strictly between `truncated` and the value.
            Self::Finer {
                truncated,
                negative,
                ..
            } => Some(match truncated.cmp(&bound) {
                Ordering::Equal if *negative => Ordering::Less,
                Ordering::Equal => Ordering::Greater,
                other => other,
            }),
            Self::Beyond(f) if f.is_nan() => None,
            Self::Beyond(f) if *f > 0.0 => Some(Ordering::Greater),
            Self::Beyond(_) => Some(Ordering::Less),
        }
    }
}

/// Parses bound text, refusing text a `Decimal` would round.
fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

struct Bound {
    value: Decimal,
    text: String,
    exclusive: bool,
    msg_format: Option<String>,
}

impl Bound {
    fn new(bound: &NumberBound, side: &str) -> Result<Self, CompilationError> {
        let text = bound.value.trim().to_string();
        let value = parse_decimal(&text).ok_or_else(|| {
            CompilationError::new(format!(
                "{side} bound `{}` is not a decimal number of at most {MAX_SCALE} fractional digits",
                bound.value
            ))
        })?;
        Ok(Self {
            value,
            text,
            exclusive: bound.exclusive,
            msg_format: bound.msg_format.clone(),
        })
    }

    /// Returns true if `n` lies on the allowed side of a lower bound.
    fn admits_from_above(&self, n: &Number) -> bool {
        match n.cmp_bound(self.value) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => !self.exclusive,
            Some(Ordering::Less) | None => false,
        }
    }

    /// Returns true if `n` lies on the allowed side of an upper bound.
    fn admits_from_below(&self, n: &Number) -> bool {
        match n.cmp_bound(self.value) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => !self.exclusive,
            Some(Ordering::Greater) | None => false,
        }
    }
}

struct Digits {
    integer_max: usize,
    fraction_max: usize,
    msg_format: Option<String>,
}

impl Digits {
    fn new(digits: &DigitsConstraint) -> Result<Self, CompilationError> {
        let limit = |value: i32, name: &str| {
            usize::try_from(value).map_err(|_| {
                CompilationError::new(format!("digits {name} must not be negative, got {value}"))
            })
        };
        Ok(Self {
            integer_max: limit(digits.integer_max, "integer_max")?,
            fraction_max: limit(digits.fraction_max, "fraction_max")?,
            msg_format: digits.msg_format.clone(),
        })
    }

    fn admits(&self, n: &Number) -> bool {
        let (integral, fractional) = match n {
            Number::Exact(d) => count_digits(&d.normalize().to_string()),
            Number::Finer { text, .. } => count_digits(text),
            Number::Beyond(f) if f.is_finite() => count_digits(&f.to_string()),
            Number::Beyond(_) => return false,
        };
        integral <= self.integer_max && fractional <= self.fraction_max
    }
}

/// Counts the digits before and after the decimal point of a plain decimal
/// text. Leading zeros of the integral part and trailing zeros of the
/// fractional part do not count.
fn count_digits(text: &str) -> (usize, usize) {
    let unsigned = text.trim_start_matches(['-', '+']);
    let (integral, fractional) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    (
        integral.trim_start_matches('0').len(),
        fractional.trim_end_matches('0').len(),
    )
}

/// `min`, `max` and `digits` checks shared by every numeric category.
pub(crate) struct NumberRuleEval {
    min: Option<Bound>,
    max: Option<Bound>,
    digits: Option<Digits>,
}

impl NumberRuleEval {
    pub fn new(constraints: &FieldConstraints) -> Result<Self, CompilationError> {
        Ok(Self {
            min: constraints.min.as_ref().map(|b| Bound::new(b, "min")).transpose()?,
            max: constraints.max.as_ref().map(|b| Bound::new(b, "max")).transpose()?,
            digits: constraints.digits.as_ref().map(Digits::new).transpose()?,
        })
    }

    pub fn tautology(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.digits.is_none()
    }

    pub fn evaluate(&self, val: &Value, field_path: &[String]) -> Vec<ConstraintViolation> {
        let Some(n) = Number::from_value(val) else {
            return Vec::new();
        };

        let mut violations = Vec::new();

        if let Some(min) = &self.min {
            if !min.admits_from_above(&n) {
                let template = if min.exclusive {
                    violation::MIN_EXCLUSIVE
                } else {
                    violation::MIN_INCLUSIVE
                };
                violations.push(ConstraintViolation::from_template(
                    min.msg_format.as_deref(),
                    template,
                    vec![min.text.clone()],
                    field_path.to_vec(),
                ));
            }
        }

        if let Some(max) = &self.max {
            if !max.admits_from_below(&n) {
                let template = if max.exclusive {
                    violation::MAX_EXCLUSIVE
                } else {
                    violation::MAX_INCLUSIVE
                };
                violations.push(ConstraintViolation::from_template(
                    max.msg_format.as_deref(),
                    template,
                    vec![max.text.clone()],
                    field_path.to_vec(),
                ));
            }
        }

        if let Some(digits) = &self.digits {
            if !digits.admits(&n) {
                violations.push(ConstraintViolation::from_template(
                    digits.msg_format.as_deref(),
                    violation::DIGITS,
                    vec![digits.integer_max.to_string(), digits.fraction_max.to_string()],
                    field_path.to_vec(),
                ));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn bound(value: &str, exclusive: bool) -> Option<NumberBound> {
        Some(NumberBound {
            value: value.to_string(),
            exclusive,
            msg_format: None,
        })
    }

    fn range(min: Option<NumberBound>, max: Option<NumberBound>) -> NumberRuleEval {
        NumberRuleEval::new(&FieldConstraints {
            min,
            max,
            ..Default::default()
        })
        .expect("bounds compile")
    }

    fn digits(integer_max: i32, fraction_max: i32) -> NumberRuleEval {
        NumberRuleEval::new(&FieldConstraints {
            digits: Some(DigitsConstraint {
                integer_max,
                fraction_max,
                msg_format: None,
            }),
            ..Default::default()
        })
        .expect("digits compile")
    }

    fn path() -> Vec<String> {
        vec!["value".to_string()]
    }

    #[test]
    fn double_min_is_compared_exactly() {
        let eval = range(bound("16.5", false), None);
        assert!(eval.evaluate(&Value::F64(16.5), &path()).is_empty());
        assert!(eval.evaluate(&Value::F64(20.5), &path()).is_empty());

        let violations = eval.evaluate(&Value::F64(5.5), &path());
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].msg_format(),
            "Number must be greater than or equal to %s."
        );
        assert_eq!(violations[0].params(), ["16.5"]);
    }

    #[test]
    fn exclusive_bounds_reject_the_boundary() {
        let eval = range(bound("16.5", true), bound("64.5", true));
        let at_min = eval.evaluate(&Value::F64(16.5), &path());
        assert_eq!(at_min.len(), 1);
        assert_eq!(at_min[0].render(), "Number must be greater than 16.5.");

        let at_max = eval.evaluate(&Value::F64(64.5), &path());
        assert_eq!(at_max.len(), 1);
        assert_eq!(at_max[0].render(), "Number must be less than 64.5.");
    }

    #[test]
    fn float_boundaries_do_not_pick_up_binary_noise() {
        // 0.1f32 widened to f64 is 0.10000000149011612.
        let eval = range(None, bound("0.1", false));
        assert!(eval.evaluate(&Value::F32(0.1), &path()).is_empty());
    }

    #[test]
    fn integer_kinds_share_the_decimal_comparison() {
        let eval = range(bound("-5", false), bound("10", true));
        assert!(eval.evaluate(&Value::I32(-5), &path()).is_empty());
        assert!(eval.evaluate(&Value::I64(9), &path()).is_empty());
        assert_eq!(eval.evaluate(&Value::U32(10), &path()).len(), 1);
        assert_eq!(eval.evaluate(&Value::U64(u64::MAX), &path()).len(), 1);
        assert_eq!(eval.evaluate(&Value::I64(-6), &path()).len(), 1);
    }

    #[test]
    fn nan_fails_every_check_and_infinity_exceeds_every_bound() {
        let eval = range(bound("0", false), bound("100", false));
        assert_eq!(eval.evaluate(&Value::F64(f64::NAN), &path()).len(), 2);
        assert_eq!(eval.evaluate(&Value::F64(f64::INFINITY), &path()).len(), 1);
        assert_eq!(digits(5, 5).evaluate(&Value::F64(f64::NAN), &path()).len(), 1);
    }

    #[test]
    fn values_finer_than_the_decimal_scale_keep_their_order() {
        let tiny = Value::F64(1e-30);
        assert!(range(bound("0", true), None).evaluate(&tiny, &path()).is_empty());
        assert_eq!(range(None, bound("0", false)).evaluate(&tiny, &path()).len(), 1);

        let negative = Value::F64(-1e-30);
        assert!(range(None, bound("0", true)).evaluate(&negative, &path()).is_empty());
        assert_eq!(range(bound("0", false), None).evaluate(&negative, &path()).len(), 1);

        let v = 1.2345678901234567e-15_f64;
        let text = v.to_string();
        let (_, fractional) = text.split_once('.').expect("plain decimal text");
        assert!(fractional.len() > MAX_SCALE);
        let truncated = format!("0.{}", &fractional[..MAX_SCALE]);
        let finer = Value::F64(v);
        assert!(range(bound(&truncated, true), None).evaluate(&finer, &path()).is_empty());
        assert_eq!(range(None, bound(&truncated, false)).evaluate(&finer, &path()).len(), 1);

        let negated = format!("-{truncated}");
        let finer = Value::F64(-v);
        assert!(range(None, bound(&negated, true)).evaluate(&finer, &path()).is_empty());
        assert_eq!(range(bound(&negated, false), None).evaluate(&finer, &path()).len(), 1);
    }

    #[test]
    fn values_beyond_the_decimal_range_compare_by_sign() {
        let huge = Value::F64(1e30);
        assert!(range(bound("0", false), None).evaluate(&huge, &path()).is_empty());
        assert_eq!(range(None, bound("100", false)).evaluate(&huge, &path()).len(), 1);
        assert_eq!(range(bound("-100", false), None).evaluate(&Value::F64(-1e30), &path()).len(), 1);
    }

    #[test]
    fn digits_count_the_float_text_below_the_decimal_scale() {
        let tiny = Value::F64(1e-30);
        assert_eq!(digits(2, 2).evaluate(&tiny, &path()).len(), 1);
        assert!(digits(0, 30).evaluate(&tiny, &path()).is_empty());
        assert_eq!(digits(0, 29).evaluate(&tiny, &path()).len(), 1);
        assert!(digits(31, 0).evaluate(&Value::F64(1e30), &path()).is_empty());
    }

    #[test]
    fn bounds_a_decimal_would_round_fail_to_compile() {
        let err = NumberRuleEval::new(&FieldConstraints {
            min: bound("0.0000000000000000000000000000001", false),
            ..Default::default()
        })
        .err()
        .expect("bound finer than the decimal scale must fail");
        assert!(err.cause.contains("at most 28 fractional digits"));
        assert!(range(bound("1e-5", false), None).evaluate(&Value::F64(0.00001), &path()).is_empty());
    }

    #[test]
    fn digits_boundaries() {
        let eval = digits(2, 2);
        assert!(eval.evaluate(&Value::F64(12.5), &path()).is_empty());
        assert!(eval.evaluate(&Value::F64(1.12), &path()).is_empty());
        assert!(eval.evaluate(&Value::F64(99.99), &path()).is_empty());

        let violations = eval.evaluate(&Value::F64(123.5), &path());
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].render(),
            "Number value is out of bounds, expected: <2 max digits>.<2 max digits>."
        );
        assert_eq!(eval.evaluate(&Value::F64(1.123), &path()).len(), 1);
    }

    #[test]
    fn digits_apply_to_integers() {
        let eval = digits(3, 0);
        assert!(eval.evaluate(&Value::I32(-999), &path()).is_empty());
        assert_eq!(eval.evaluate(&Value::I64(1000), &path()).len(), 1);
    }

    #[test]
    fn count_digits_ignores_sign_and_padding_zeros() {
        assert_eq!(count_digits("12.5"), (2, 1));
        assert_eq!(count_digits("-0.50"), (0, 1));
        assert_eq!(count_digits("100"), (3, 0));
        assert_eq!(count_digits("0"), (0, 0));
    }

    #[test]
    fn malformed_declarations_fail_to_compile() {
        let err = NumberRuleEval::new(&FieldConstraints {
            min: bound("sixteen", false),
            ..Default::default()
        })
        .err()
        .expect("bound must be a number");
        assert!(err.cause.contains("sixteen"));

        let err = NumberRuleEval::new(&FieldConstraints {
            digits: Some(DigitsConstraint {
                integer_max: -1,
                fraction_max: 2,
                msg_format: None,
            }),
            ..Default::default()
        })
        .err()
        .expect("negative digits must fail");
        assert!(err.cause.contains("integer_max"));
    }

    #[test]
    fn custom_message_replaces_template() {
        let eval = range(
            Some(NumberBound {
                value: "1".into(),
                exclusive: false,
                msg_format: Some("Too small".into()),
            }),
            None,
        );
        let violations = eval.evaluate(&Value::I32(0), &path());
        assert_eq!(violations[0].msg_format(), "Too small");
        assert!(violations[0].params().is_empty());
    }

    proptest! {
        #[test]
        fn inclusive_bound_admits_exactly_the_bound(v in -1_000_000i64..1_000_000) {
            let text = v.to_string();
            let eval = range(bound(&text, false), bound(&text, false));
            prop_assert!(eval.evaluate(&Value::I64(v), &path()).is_empty());
            let eval = range(bound(&text, true), None);
            prop_assert_eq!(eval.evaluate(&Value::I64(v), &path()).len(), 1);
        }

        #[test]
        fn float_bound_at_its_own_text_is_a_tie(v in -1e15f64..1e15) {
            let text = v.to_string();
            prop_assume!(Decimal::from_str_exact(&text).is_ok());
            let eval = range(bound(&text, false), bound(&text, false));
            prop_assert!(eval.evaluate(&Value::F64(v), &path()).is_empty());
            let eval = range(bound(&text, true), bound(&text, true));
            prop_assert_eq!(eval.evaluate(&Value::F64(v), &path()).len(), 2);
        }

        #[test]
        fn digit_limits_at_the_float_text_are_tight(v in prop::num::f64::NORMAL) {
            let (integral, fractional) = count_digits(&v.to_string());
            let (integral, fractional) = (integral as i32, fractional as i32);
            let value = Value::F64(v);
            prop_assert!(digits(integral, fractional).evaluate(&value, &path()).is_empty());
            if integral > 0 {
                prop_assert_eq!(digits(integral - 1, fractional).evaluate(&value, &path()).len(), 1);
            }
            if fractional > 0 {
                prop_assert_eq!(digits(integral, fractional - 1).evaluate(&value, &path()).len(), 1);
            }
        }

        #[test]
        fn integral_digit_count_matches_decimal_length(v in 1i64..i64::MAX) {
            let (integral, fractional) = count_digits(&Decimal::from(v).to_string());
            prop_assert_eq!(integral, v.to_string().len());
            prop_assert_eq!(fractional, 0);
        }
    }
}
