use crate::{Error, Input, Rule, Span};

/// Side effect performed on the input matched by a rule, using the user state `S`.
///
/// Actions are attached to rules when declaring them using [`rule!`][crate::rule!] or inline
/// using [`IfApply`][crate::rules::IfApply]. An action is applied as soon as its rule matched,
/// and never within [`At`][crate::rules::At] or [`NotAt`][crate::rules::NotAt] predicates.
///
/// Implementing this only for the state an action needs makes every rule using the action
/// require that state, which is checked when the grammar is matched using [`parse`][crate::parse]:
///
/// ```compile_fail
/// use flussab_peg::{parse, rule, rules::Range, Action, MemoryInput, Span};
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
/// }
///
/// let mut input = MemoryInput::new("digits", "1");
/// let _ = parse::<Digit, _, _>(&mut input, &mut ());
/// ```
pub trait Action<S> {
    /// Performs the action for the matched `span`.
    fn apply(span: &Span<'_>, state: &mut S);
}

/// A possibly empty tuple of [`Action`]s for the user state `S`, applied in order.
pub trait Actions<S> {
    /// Whether there are no actions to apply.
    const EMPTY: bool;

    /// Applies all actions via [`Control::apply`].
    fn apply_all<R: Rule, C: Control<S>>(span: &Span<'_>, state: &mut S, control: &mut C);
}

impl<S> Actions<S> for () {
    const EMPTY: bool = true;

    #[inline]
    fn apply_all<R: Rule, C: Control<S>>(_span: &Span<'_>, _state: &mut S, _control: &mut C) {}
}

macro_rules! impl_actions_for_tuple {
    ($($action:ident),+) => {
        impl<S, $($action: Action<S>),+> Actions<S> for ($($action,)+) {
            const EMPTY: bool = false;

            #[inline]
            fn apply_all<R: Rule, C: Control<S>>(span: &Span<'_>, state: &mut S, control: &mut C) {
                $(control.apply::<R, $action>(span, state);)+
            }
        }
    };
}

impl_actions_for_tuple!(A0);
impl_actions_for_tuple!(A0, A1);
impl_actions_for_tuple!(A0, A1, A2);
impl_actions_for_tuple!(A0, A1, A2, A3);
impl_actions_for_tuple!(A0, A1, A2, A3, A4);
impl_actions_for_tuple!(A0, A1, A2, A3, A4, A5);

/// Hooks invoked while matching named rules.
///
/// For every attempt of a rule declared using [`rule!`][crate::rule!], [`start`][Self::start] is
/// invoked first, followed by exactly one of [`success`][Self::success],
/// [`failure`][Self::failure] or [`unwind`][Self::unwind]. Every method has a default
/// implementation, which is what [`Normal`] uses.
pub trait Control<S> {
    /// Called before attempting to match `R`.
    #[inline]
    fn start<R: Rule, I: Input>(&mut self, _input: &I, _state: &mut S) {}

    /// Called after `R` matched and its actions were applied.
    #[inline]
    fn success<R: Rule, I: Input>(&mut self, _input: &I, _state: &mut S) {}

    /// Called after `R` failed to match, with the input rewound to where `R` was attempted.
    ///
    /// Returning an error escalates the local failure to a fatal one, which aborts the parse
    /// without trying any remaining alternatives. By default every failure is recoverable.
    #[inline]
    fn failure<R: Rule, I: Input>(&mut self, _input: &mut I, _state: &mut S) -> Result<(), Error> {
        Ok(())
    }

    /// Called when a fatal error aborts matching `R`, after `R` was started.
    ///
    /// Neither [`success`][Self::success] nor [`failure`][Self::failure] is called in that
    /// case.
    #[inline]
    fn unwind<R: Rule, I: Input>(&mut self, _input: &I, _state: &mut S) {}

    /// Generates the fatal error for a rule that was required to match but did not.
    ///
    /// By default this uses the [`message`][Rule::message] of `R`.
    #[cold]
    fn raise<R: Rule, I: Input>(&mut self, input: &mut I, _state: &mut S) -> Error {
        input.give_up(error_message::<R>())
    }

    /// Applies the action `A` for a match of `R`.
    #[inline]
    fn apply<R: Rule, A: Action<S>>(&mut self, span: &Span<'_>, state: &mut S) {
        A::apply(span, state)
    }
}

/// The message used when `R` is required to match but does not.
pub fn error_message<R: Rule>() -> String {
    match R::message() {
        Some(msg) => msg.to_owned(),
        None => format!("parse error matching {}", R::name()),
    }
}

/// The default [`Control`], which only raises errors.
#[derive(Clone, Copy, Default, Debug)]
pub struct Normal;

impl<S> Control<S> for Normal {}

/// A [`Control`] logging the progress of matching named rules.
///
/// Every attempt is logged at `trace` level, every raised error at `debug` level.
#[derive(Default, Debug)]
pub struct Tracer {
    depth: usize,
    attempts: usize,
}

impl Tracer {
    /// Number of named rule attempts so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Number of named rules currently being matched.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<S> Control<S> for Tracer {
    fn start<R: Rule, I: Input>(&mut self, input: &I, _state: &mut S) {
        log::trace!(
            "{}:{}: {:indent$}start {}",
            input.source(),
            input.position(),
            "",
            R::name(),
            indent = self.depth * 2
        );
        self.depth += 1;
        self.attempts += 1;
    }

    fn success<R: Rule, I: Input>(&mut self, input: &I, _state: &mut S) {
        self.depth = self.depth.saturating_sub(1);
        log::trace!(
            "{}:{}: {:indent$}success {}",
            input.source(),
            input.position(),
            "",
            R::name(),
            indent = self.depth * 2
        );
    }

    fn failure<R: Rule, I: Input>(&mut self, input: &mut I, _state: &mut S) -> Result<(), Error> {
        self.depth = self.depth.saturating_sub(1);
        log::trace!(
            "{}:{}: {:indent$}failure {}",
            input.source(),
            input.position(),
            "",
            R::name(),
            indent = self.depth * 2
        );
        Ok(())
    }

    fn unwind<R: Rule, I: Input>(&mut self, input: &I, _state: &mut S) {
        self.depth = self.depth.saturating_sub(1);
        log::trace!(
            "{}:{}: {:indent$}unwind {}",
            input.source(),
            input.position(),
            "",
            R::name(),
            indent = self.depth * 2
        );
    }

    fn raise<R: Rule, I: Input>(&mut self, input: &mut I, _state: &mut S) -> Error {
        log::debug!(
            "{}:{}: raising error for {}",
            input.source(),
            input.position(),
            R::name()
        );
        input.give_up(error_message::<R>())
    }
}
