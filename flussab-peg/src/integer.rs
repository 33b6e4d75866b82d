//! Rules for decimal integers and conversion of their matched input.
//!
//! The rules only describe the syntax. The value is computed from the [`Span`][crate::Span]
//! passed to an [`Action`][crate::Action]:
//!
//! ```
//! use flussab_peg::{integer, rule, Action, Span};
//!
//! struct PushValue;
//!
//! impl Action<Vec<i32>> for PushValue {
//!     fn apply(span: &Span<'_>, state: &mut Vec<i32>) {
//!         // A value that does not fit would be reported here.
//!         state.extend(integer::signed::<i32>(span.as_bytes()));
//!     }
//! }
//!
//! rule! {
//!     type State = Vec<i32>;
//!
//!     pub struct Value = integer::Signed, apply(PushValue);
//! }
//! ```
use num_traits::{
    ops::overflowing::{OverflowingAdd, OverflowingMul, OverflowingSub},
    FromPrimitive, Zero,
};

use crate::rules::{One, Opt, Plus, Range, Seq, Sor};

/// One or more ASCII digits.
pub type Unsigned = Plus<Range<b'0', b'9'>>;

/// One or more ASCII digits, optionally preceded by `'+'` or `'-'`.
pub type Signed = Seq<(Opt<Sor<(One<b'+'>, One<b'-'>)>>, Unsigned)>;

#[inline]
fn accumulate<I>(digits: &[u8], step: impl Fn(&I, &I) -> (I, bool)) -> Option<I>
where
    I: Zero + FromPrimitive + OverflowingMul,
{
    if digits.is_empty() {
        return None;
    }
    let ten = I::from_u8(10)?;
    let mut value = I::zero();
    let mut overflow = false;

    for &digit in digits {
        if !digit.is_ascii_digit() {
            return None;
        }
        let (new_value, overflowed) = value.overflowing_mul(&ten);
        overflow |= overflowed;
        let (new_value, overflowed) = step(&new_value, &I::from_u8(digit - b'0')?);
        overflow |= overflowed;
        value = new_value;
    }

    (!overflow).then_some(value)
}

/// Converts input matched by [`Unsigned`] to an integer.
///
/// Returns `None` if `digits` contains anything but ASCII digits, is empty, or if the value does
/// not fit into `I`.
#[inline]
pub fn unsigned<I>(digits: &[u8]) -> Option<I>
where
    I: Zero + FromPrimitive + OverflowingAdd + OverflowingMul,
{
    accumulate(digits, I::overflowing_add)
}

/// Converts input matched by [`Signed`] to an integer.
///
/// Negative values are accumulated downwards, so the minimal value of a signed type is accepted.
/// Returns `None` for malformed input or if the value does not fit into `I`.
#[inline]
pub fn signed<I>(digits: &[u8]) -> Option<I>
where
    I: Zero + FromPrimitive + OverflowingAdd + OverflowingSub + OverflowingMul,
{
    match digits.split_first() {
        Some((b'-', rest)) => accumulate(rest, I::overflowing_sub),
        Some((b'+', rest)) => accumulate(rest, I::overflowing_add),
        _ => accumulate(digits, I::overflowing_add),
    }
}
