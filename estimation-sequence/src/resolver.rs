use std::str::FromStr;

use rust_decimal::Decimal;

use crate::chain::SequenceChain;
use crate::models::value::Value;

/// Return the value whose magnitude best approximates `target`.
///
/// A single pass over the chain's adjacent pairs finds the bracket of
/// numeric values surrounding the target; the nearer side wins. At an
/// exact midpoint `round_up` picks the higher value. Targets below the
/// minimum resolve to the minimum, targets above the maximum to the
/// maximum. A chain without numeric values resolves to `None`.
///
/// Pure and side-effect free: safe to call from any number of readers
/// sharing an immutable chain.
pub fn closest(chain: &SequenceChain, target: Decimal, round_up: bool) -> Option<&Value> {
    match bracket(chain, target) {
        (None, None) => None,
        (Some(left), None) => Some(left),
        (None, Some(right)) => Some(right),
        (Some(left), Some(right)) => match (left.magnitude(), right.magnitude()) {
            (Some(left_magnitude), Some(right_magnitude)) => {
                let diff_left = (left_magnitude - target).abs();
                let diff_right = (right_magnitude - target).abs();
                if diff_left == diff_right {
                    return Some(if round_up { right } else { left });
                }
                if diff_left < diff_right {
                    Some(left)
                } else {
                    Some(right)
                }
            }
            // a bracket always carries magnitudes on both sides
            _ => None,
        },
    }
}

/// `closest` with the default tie-break favoring the higher value.
pub fn closest_round_up(chain: &SequenceChain, target: Decimal) -> Option<&Value> {
    closest(chain, target, true)
}

/// `closest` for callers holding a floating-point target, e.g. a mean of
/// several picks. The target is converted through its shortest decimal
/// representation so boundary and tie comparisons stay exact.
pub fn closest_f64(chain: &SequenceChain, target: f64, round_up: bool) -> Option<&Value> {
    if !target.is_finite() {
        log::error!("Target {} is not a finite number", target);
        return None;
    }
    let repr = target.to_string();
    let target = match Decimal::from_str(&repr).or_else(|_| Decimal::from_scientific(&repr)) {
        Ok(target) => target,
        Err(_) => {
            log::error!("Target {} does not fit in a decimal", repr);
            return None;
        }
    };
    closest(chain, target, round_up)
}

/// The pair of adjacent numeric values surrounding `target`.
///
/// `(None, Some(min))` when the target sits at or below the minimum,
/// `(Some(max), None)` when it sits above the maximum, `(None, None)` on a
/// chain without numeric values.
pub fn bracket(chain: &SequenceChain, target: Decimal) -> (Option<&Value>, Option<&Value>) {
    for (value, next_value) in chain.value_pairs(true) {
        let left = match value.magnitude() {
            Some(left) => left,
            None => {
                // should not occur: pairs over numeric values only
                log::error!("Value {} carries no magnitude, skipping", value.id);
                continue;
            }
        };

        if target <= left {
            return (None, Some(value));
        }

        let next_value = match next_value {
            Some(next_value) => next_value,
            // tail reached without a bracket: target is above the maximum
            None => return (Some(value), None),
        };

        if let Some(right) = next_value.magnitude() {
            if target <= right {
                return (Some(value), Some(next_value));
            }
        }
    }

    (None, None)
}
