//! The rule vocabulary grammars are composed of.
//!
//! Atomic rules match single bytes, fixed byte strings or properties of the input position.
//! Further single byte rules are declared using [`ranges!`][crate::ranges!], common ones are
//! found in [`ascii`][crate::ascii].
//! Combinators build larger rules from smaller ones with the usual PEG semantics: sequences and
//! ordered choices, greedy repetitions, look-ahead predicates, and rules that turn a local
//! mismatch into a fatal error.
//!
//! Every rule upholds the same invariant: when it does not match, the input position is exactly
//! the one it was attempted at. Rules that consist of several steps use a
//! [`Marker`][crate::Marker] to restore the position when a later step fails.
//!
//! Sequences and choices take their sub-rules as a tuple:
//!
//! ```
//! use flussab_peg::{literal, rules::{Eof, One, Plus, Range, Seq, Sor, Str}};
//!
//! literal! {
//!     pub struct Hex = b"0x";
//! }
//!
//! type Number = Sor<(
//!     Seq<(Str<Hex>, Plus<Sor<(Range<b'0', b'9'>, Range<b'a', b'f'>)>>)>,
//!     Plus<Range<b'0', b'9'>>,
//! )>;
//! type File = Seq<(Number, One<b'\n'>, Eof)>;
//! ```
mod atomic;
mod combinators;
mod repetition;

pub use atomic::{
    Any, Bof, Bytes, Discard, Eof, Eol, Failure, IStr, Literal, NotOne, NotRange, One, OneOf,
    Range, Str, Success,
};
pub use combinators::{
    At, Disable, Enable, IfApply, IfMust, Must, NotAt, Opt, Pad, ParseList, Raise, RuleList, Seq,
    Sor,
};
pub use repetition::{List, ListMust, Plus, Rep, RepMax, RepMin, RepMinMax, RepOpt, Star, Until};
