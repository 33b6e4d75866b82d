use std::mem;

use crate::{
    analyze::{Analysis, RuleId},
    Actions, Control, Error, Input, Marker,
};

/// A parsing expression.
///
/// Rules are types that are never instantiated. A grammar is a composition of the rules found
/// in [`rules`][crate::rules], where named rules declared using [`rule!`][crate::rule!] tie the
/// knot for recursive grammars.
///
/// This trait only covers what is independent of the user state, the identity of a rule and its
/// structure. Matching is provided by [`Parse`].
pub trait Rule: Sized + 'static {
    /// Name used for diagnostics.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The error message used when this rule is required to match but does not.
    fn message() -> Option<&'static str> {
        None
    }

    /// Registers this rule and all rules it refers to for the well-formedness analysis.
    fn describe(analysis: &mut Analysis) -> RuleId;
}

/// A rule that can be matched using the user state `S`.
///
/// Rules without actions implement this for every state type. A rule with actions only
/// implements it for states its actions accept, so passing the wrong state to
/// [`parse`][crate::parse] does not compile.
///
/// Matching a rule returns `Ok(true)` after advancing over the matched input and `Ok(false)`
/// when the input does not match. In the latter case the input position is left exactly as it
/// was before the attempt. An `Err` aborts the complete parse.
pub trait Parse<S>: Rule {
    /// Attempts to match the rule at the current input position.
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error>;
}

/// User state and [`Control`] used while matching.
pub struct Context<'a, S, C> {
    pub(crate) state: &'a mut S,
    pub(crate) control: &'a mut C,
    pub(crate) apply: bool,
}

impl<'a, S, C: Control<S>> Context<'a, S, C> {
    /// Creates a context with actions enabled.
    pub fn new(state: &'a mut S, control: &'a mut C) -> Self {
        Context {
            state,
            control,
            apply: true,
        }
    }

    /// The user state passed to actions and controls.
    #[inline]
    pub fn state(&mut self) -> &mut S {
        &mut *self.state
    }

    /// The control invoked for named rules.
    #[inline]
    pub fn control(&mut self) -> &mut C {
        &mut *self.control
    }

    /// Whether matching rules currently applies their actions.
    #[inline]
    pub fn actions_enabled(&self) -> bool {
        self.apply
    }

    /// Runs `f` with actions enabled or disabled, restoring the previous setting afterwards.
    #[inline]
    pub fn with_actions<T>(&mut self, enabled: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = mem::replace(&mut self.apply, enabled);
        let result = f(self);
        self.apply = previous;
        result
    }

    /// Raises the fatal error for `R` via the control.
    #[cold]
    pub fn raise<R: Rule, I: Input>(&mut self, input: &mut I) -> Error {
        self.control.raise::<R, I>(input, self.state)
    }

    #[inline]
    pub(crate) fn apply_actions<R: Rule, A: Actions<S>, I: Input>(
        &mut self,
        marker: &Marker<'_, I>,
    ) {
        if self.apply && !A::EMPTY {
            A::apply_all::<R, C>(&marker.span(), self.state, self.control);
        }
    }
}

/// Matches the body `B` of the named rule `R`, invoking the control hooks and actions of `R`.
///
/// This is used by the code generated by [`rule!`][crate::rule!].
#[inline]
pub fn match_named<R, B, A, I, S, C>(
    input: &mut I,
    cx: &mut Context<'_, S, C>,
) -> Result<bool, Error>
where
    R: Rule,
    B: Parse<S>,
    A: Actions<S>,
    I: Input,
    C: Control<S>,
{
    cx.control.start::<R, I>(input, cx.state);
    let result = if A::EMPTY {
        B::parse(input, cx)
    } else {
        // Actions need the matched input, which is only retained while a marker is alive.
        let mut marker = input.mark();
        let result = B::parse(&mut *marker, cx);
        if let Ok(true) = result {
            cx.apply_actions::<R, A, I>(&marker);
            marker.commit();
        }
        result
    };
    let matched = match result {
        Ok(matched) => matched,
        Err(err) => {
            cx.control.unwind::<R, I>(input, cx.state);
            return Err(err);
        }
    };
    if matched {
        cx.control.success::<R, I>(input, cx.state);
    } else {
        cx.control.failure::<R, I>(input, cx.state)?;
    }
    Ok(matched)
}

/// Matches a single byte for which `matches` returns `true`.
///
/// This is used by the code generated by [`ranges!`][crate::ranges!].
#[inline]
pub fn match_byte<I: Input>(input: &mut I, matches: impl FnOnce(u8) -> bool) -> Result<bool, Error> {
    match input.peek_byte(0)? {
        Some(byte) if matches(byte) => {
            input.advance(1);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Declares named rules.
///
/// A named rule matches exactly like its body, but it is what [`Control`] hooks, error messages
/// and actions refer to. Named rules are also the only way to write recursive grammars.
///
/// ```
/// use flussab_peg::{rule, rules::{One, Plus, Range, Seq, Must, Opt}};
///
/// rule! {
///     /// One or more decimal digits.
///     pub struct Digits = Plus<Range<b'0', b'9'>>;
///     /// A closing parenthesis, required after an opening one.
///     pub struct Close = One<b')'>, message("unterminated group (missing ')')");
///     pub struct Group = Seq<(One<b'('>, Opt<Group>, Must<Close>)>;
/// }
/// ```
///
/// Actions are attached using `apply(A, ...)`, which must come before `message(..)`. Rules
/// declared like above can be matched with any user state, so their actions must accept any
/// state. Actions that need a specific state are used in rules declared for that state, by
/// starting the declarations with `type State = ...;`. All rules of such a declaration can only
/// be matched with that state:
///
/// ```
/// use flussab_peg::{parse, rule, rules::{Eof, List, One, Range, Seq}, Action, MemoryInput, Span};
///
/// struct Push;
///
/// impl Action<Vec<u8>> for Push {
///     fn apply(span: &Span<'_>, digits: &mut Vec<u8>) {
///         digits.extend_from_slice(span.as_bytes());
///     }
/// }
///
/// rule! {
///     type State = Vec<u8>;
///
///     pub struct Digit = Range<b'0', b'9'>, apply(Push);
///     pub struct Digits = Seq<(List<Digit, One<b' '>>, Eof)>;
/// }
///
/// let mut digits = vec![];
/// let mut input = MemoryInput::new("digits", "1 2 3");
/// assert!(parse::<Digits, _, _>(&mut input, &mut digits).matches().unwrap());
/// assert_eq!(digits, b"123");
/// ```
///
/// States borrowing data name their lifetimes, as in `type State<'a> = Lines<'a>;`.
#[macro_export]
macro_rules! rule {
    (type State $(<$($lt:lifetime),+ $(,)?>)? = $state:ty; $($rules:tt)*) => {
        $crate::rule!(@state [$($($lt),+)?] [$state] $($rules)*);
    };
    (@state [$($lt:lifetime),*] [$state:ty]) => {};
    (@state [$($lt:lifetime),*] [$state:ty]
        $(#[$attr:meta])*
        $vis:vis struct $name:ident = $body:ty
            $(, apply($($action:ty),+ $(,)?))?
            $(, message($msg:expr))?
        ;
        $($rest:tt)*
    ) => {
        $crate::rule!(@declare [$(#[$attr])*] $vis $name = $body $(, $msg)?);

        impl<$($lt),*> $crate::Parse<$state> for $name {
            #[inline]
            fn parse<I: $crate::Input, C: $crate::Control<$state>>(
                input: &mut I,
                cx: &mut $crate::Context<'_, $state, C>,
            ) -> Result<bool, $crate::Error> {
                $crate::match_named::<Self, $body, ($($($action,)+)?), I, $state, C>(input, cx)
            }
        }

        $crate::rule!(@state [$($lt),*] [$state] $($rest)*);
    };
    (@declare [$(#[$attr:meta])*] $vis:vis $name:ident = $body:ty $(, $msg:expr)?) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Default, Debug)]
        $vis struct $name;

        impl $crate::Rule for $name {
            fn name() -> &'static str {
                stringify!($name)
            }

            fn message() -> Option<&'static str> {
                None $(.or(Some($msg)))?
            }

            fn describe(analysis: &mut $crate::analyze::Analysis) -> $crate::analyze::RuleId {
                analysis.named::<Self, $body>()
            }
        }
    };
    ($(
        $(#[$attr:meta])*
        $vis:vis struct $name:ident = $body:ty
            $(, apply($($action:ty),+ $(,)?))?
            $(, message($msg:expr))?
        ;
    )*) => {$(
        $crate::rule!(@declare [$(#[$attr])*] $vis $name = $body $(, $msg)?);

        impl<S> $crate::Parse<S> for $name {
            #[inline]
            fn parse<I: $crate::Input, C: $crate::Control<S>>(
                input: &mut I,
                cx: &mut $crate::Context<'_, S, C>,
            ) -> Result<bool, $crate::Error> {
                $crate::match_named::<Self, $body, ($($($action,)+)?), I, S, C>(input, cx)
            }
        }
    )*};
}

/// Declares byte string [`Literal`][crate::rules::Literal]s.
///
/// ```
/// use flussab_peg::{literal, rules::{IStr, Str}};
///
/// literal! {
///     pub struct Select = b"select";
/// }
///
/// type Keyword = IStr<Select>;
/// type Exact = Str<Select>;
/// ```
#[macro_export]
macro_rules! literal {
    ($(
        $(#[$attr:meta])*
        $vis:vis struct $name:ident = $bytes:expr;
    )*) => {$(
        $(#[$attr])*
        #[derive(Clone, Copy, Default, Debug)]
        $vis struct $name;

        impl $crate::rules::Literal for $name {
            const BYTES: &'static [u8] = $bytes;
        }
    )*};
}

/// Declares rules matching a single byte out of a set of bytes and inclusive byte ranges.
///
/// ```
/// use flussab_peg::{ranges, rules::{Plus, Seq, Star}};
///
/// ranges! {
///     pub struct NameStart = b'a'..=b'z', b'A'..=b'Z', b'_';
///     pub struct NameChar = b'a'..=b'z', b'A'..=b'Z', b'0'..=b'9', b'_', b'-';
/// }
///
/// type Name = Seq<(NameStart, Star<NameChar>)>;
/// ```
#[macro_export]
macro_rules! ranges {
    ($(
        $(#[$attr:meta])*
        $vis:vis struct $name:ident = $($lo:literal $(..= $hi:literal)?),+ $(,)?;
    )*) => {$(
        $(#[$attr])*
        #[derive(Clone, Copy, Default, Debug)]
        $vis struct $name;

        impl $crate::Rule for $name {
            fn name() -> &'static str {
                stringify!($name)
            }

            fn describe(analysis: &mut $crate::analyze::Analysis) -> $crate::analyze::RuleId {
                analysis.leaf::<Self>($crate::analyze::Kind::Consume)
            }
        }

        impl<S> $crate::Parse<S> for $name {
            #[inline]
            fn parse<I: $crate::Input, C: $crate::Control<S>>(
                input: &mut I,
                _cx: &mut $crate::Context<'_, S, C>,
            ) -> Result<bool, $crate::Error> {
                $crate::match_byte(input, |byte| matches!(byte, $($lo $(..= $hi)?)|+))
            }
        }
    )*};
}
