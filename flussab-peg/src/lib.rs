//! The Flussab PEG crate is an engine for matching parsing expression grammars against
//! streaming input.
//!
//! Grammars are written as Rust types composed from the rules in [`rules`], which are matched
//! using [`parse`]. The engine is aimed at the same kind of inputs as the other Flussab crates,
//! large machine generated files and interactive streams, but with the convenience of a
//! backtracking PEG:
//!
//! * _Bounded memory_: A [`BufferInput`] reads its input on demand and only retains the data that
//!   is still needed for backtracking. The amount of retained data is limited by a configured
//!   maximum, a grammar that would need to backtrack or look ahead further fails with a distinct
//!   [`BufferExhausted`] error.
//!
//! * _Predictable backtracking_: Every rule that does not match leaves the input position exactly
//!   where it was. This is enforced by [`Marker`]s, which borrow the input and rewind it when
//!   dropped, so backtracking follows the nesting of rule attempts.
//!
//! * _Error reporting_: A mismatch can be turned into a fatal error at any point of the grammar
//!   using [`Must`][rules::Must]. Fatal errors are not retried by enclosing choices, they abort
//!   the parse with a message attached to the rule and the position where matching failed.
//!
//! * _No hidden costs_: Grammars are zero-sized types, so matching a grammar compiles down to
//!   plain nested function calls. Grammars that would not terminate, because a rule can recurse
//!   into itself or repeat without consuming input, can be found up front using
//!   [`analyze::analyze`].
//!
//! ## Using Flussab PEG
//!
//! Rules that are referred to by name, for recursion, error messages or to attach
//! [`Action`]s, are declared using [`rule!`]. Actions are implemented for the user state they
//! operate on, so a grammar using them can only be matched with that state:
//!
//! ```rust
//! use flussab_peg::{
//!     parse, rule,
//!     rules::{Eof, List, Must, One, Plus, Range, Seq, Sor},
//!     Action, MemoryInput, Res, Span,
//! };
//!
//! struct Count;
//!
//! impl Action<usize> for Count {
//!     fn apply(_span: &Span<'_>, count: &mut usize) {
//!         *count += 1;
//!     }
//! }
//!
//! rule! {
//!     type State = usize;
//!
//!     pub struct Number = Plus<Range<b'0', b'9'>>, apply(Count);
//!     pub struct Close = One<b']'>, message("expected ']'");
//!     pub struct Array = Seq<(One<b'['>, List<Value, One<b','>>, Must<Close>)>;
//!     pub struct Value = Sor<(Number, Array)>;
//!     pub struct File = Seq<(Value, Eof)>;
//! }
//!
//! let mut numbers = 0usize;
//! let mut input = MemoryInput::new("example", "[1,[2,3],4]");
//! assert!(matches!(parse::<File, _, _>(&mut input, &mut numbers), Res(Ok(()))));
//! assert_eq!(numbers, 4);
//!
//! let mut input = MemoryInput::new("example", "[1,2");
//! let err = parse::<File, _, _>(&mut input, &mut 0usize).matches().unwrap_err();
//! assert_eq!(err.to_string(), "example:1:5: expected ']'");
//! ```

#![warn(missing_docs)]
pub mod analyze;
pub mod ascii;
mod buffer_input;
mod control;
mod error;
mod input;
pub mod integer;
mod memory_input;
mod parser;
mod position;
pub mod reader;
mod rule;
pub mod rules;


pub use buffer_input::BufferInput;
pub use control::{error_message, Action, Actions, Control, Normal, Tracer};
pub use error::{BufferExhausted, Error, InnerError, SyntaxError};
pub use input::{Input, Marker, Span};
pub use memory_input::MemoryInput;
pub use parser::Parsed;
pub use position::Position;
pub use rule::{match_byte, match_named, Context, Parse, Rule};

pub use Parsed::*;

/// Matches the grammar `R` at the current position of `input`, using the [`Normal`] control.
///
/// See [`parse_with`] for the possible results.
pub fn parse<R: Parse<S>, I: Input, S>(input: &mut I, state: &mut S) -> Parsed<(), Error> {
    parse_with::<R, I, S, Normal>(input, state, &mut Normal)
}

/// Matches the grammar `R` at the current position of `input`, using the given [`Control`].
///
/// Returns `Res(Ok(()))` after advancing over the matched input and `Fallthrough` without
/// changing the input position if the input does not match. A fatal error, an exhausted
/// [`BufferInput`] or an IO error is returned as `Res(Err(..))`. IO errors take precedence, as
/// they are the likely cause of any mismatch or error following them.
pub fn parse_with<R: Parse<S>, I: Input, S, C: Control<S>>(
    input: &mut I,
    state: &mut S,
    control: &mut C,
) -> Parsed<(), Error> {
    let mut cx = Context::new(state, control);
    let result = R::parse(input, &mut cx);
    if let Err(err) = input.check_io_error() {
        return Res(Err(err.into()));
    }
    match result {
        Ok(true) => Res(Ok(())),
        Ok(false) => Fallthrough,
        Err(err) => Res(Err(err)),
    }
}
