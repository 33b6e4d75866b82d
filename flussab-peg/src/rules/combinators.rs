use std::marker::PhantomData;

use super::Star;
use crate::{
    analyze::{Analysis, Kind, RuleId},
    Actions, Context, Control, Error, Input, Parse, Rule,
};

/// A tuple of rules, used as the sub-rules of [`Seq`], [`Sor`] and [`IfMust`].
pub trait RuleList: 'static {
    /// Registers all rules for the analysis.
    fn describe_all(analysis: &mut Analysis) -> Vec<RuleId>;
}

/// A tuple of rules that can be matched using the user state `S`.
pub trait ParseList<S>: RuleList {
    /// Matches all rules in order, stopping at the first mismatch.
    ///
    /// This does not restore the input position on a mismatch.
    fn parse_all<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error>;

    /// Matches the first matching rule.
    fn parse_first<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error>;

    /// Matches all rules in order, raising an error for the first mismatch.
    fn parse_all_or_raise<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<(), Error>;
}

macro_rules! impl_rule_list_for_tuple {
    ($($rule:ident),*) => {
        impl<$($rule: Rule),*> RuleList for ($($rule,)*) {
            #[allow(unused_variables)]
            fn describe_all(analysis: &mut Analysis) -> Vec<RuleId> {
                vec![$($rule::describe(analysis)),*]
            }
        }

        impl<S, $($rule: Parse<S>),*> ParseList<S> for ($($rule,)*) {
            #[inline]
            #[allow(unused_variables)]
            fn parse_all<I: Input, C: Control<S>>(
                input: &mut I,
                cx: &mut Context<'_, S, C>,
            ) -> Result<bool, Error> {
                $(
                    if !$rule::parse(input, cx)? {
                        return Ok(false);
                    }
                )*
                Ok(true)
            }

            #[inline]
            #[allow(unused_variables)]
            fn parse_first<I: Input, C: Control<S>>(
                input: &mut I,
                cx: &mut Context<'_, S, C>,
            ) -> Result<bool, Error> {
                $(
                    if $rule::parse(input, cx)? {
                        return Ok(true);
                    }
                )*
                Ok(false)
            }

            #[inline]
            #[allow(unused_variables)]
            fn parse_all_or_raise<I: Input, C: Control<S>>(
                input: &mut I,
                cx: &mut Context<'_, S, C>,
            ) -> Result<(), Error> {
                $(
                    if !$rule::parse(input, cx)? {
                        return Err(cx.raise::<$rule, I>(input));
                    }
                )*
                Ok(())
            }
        }
    };
}

impl_rule_list_for_tuple!();
impl_rule_list_for_tuple!(R0);
impl_rule_list_for_tuple!(R0, R1);
impl_rule_list_for_tuple!(R0, R1, R2);
impl_rule_list_for_tuple!(R0, R1, R2, R3);
impl_rule_list_for_tuple!(R0, R1, R2, R3, R4);
impl_rule_list_for_tuple!(R0, R1, R2, R3, R4, R5);
impl_rule_list_for_tuple!(R0, R1, R2, R3, R4, R5, R6);
impl_rule_list_for_tuple!(R0, R1, R2, R3, R4, R5, R6, R7);
impl_rule_list_for_tuple!(R0, R1, R2, R3, R4, R5, R6, R7, R8);
impl_rule_list_for_tuple!(R0, R1, R2, R3, R4, R5, R6, R7, R8, R9);

/// Matches the rules of the tuple `T` in order.
///
/// If any rule does not match, the input is rewound to where the sequence started.
pub struct Seq<T>(PhantomData<T>);

impl<T: RuleList> Rule for Seq<T> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Seq, T::describe_all)
    }
}

impl<S, T: ParseList<S>> Parse<S> for Seq<T> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        let mut marker = input.mark();
        let matched = T::parse_all(&mut *marker, cx)?;
        Ok(marker.finish(matched))
    }
}

/// Ordered choice, matches the first matching rule of the tuple `T`.
///
/// Later alternatives are not tried once an alternative matched, even if they would match more
/// input.
pub struct Sor<T>(PhantomData<T>);

impl<T: RuleList> Rule for Sor<T> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Sor, T::describe_all)
    }
}

impl<S, T: ParseList<S>> Parse<S> for Sor<T> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        // Each failing alternative already left the input where it started.
        T::parse_first(input, cx)
    }
}

/// Matches `R` or nothing.
pub struct Opt<R>(PhantomData<R>);

impl<R: Rule> Rule for Opt<R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Opt, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, R: Parse<S>> Parse<S> for Opt<R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        R::parse(input, cx)?;
        Ok(true)
    }
}

/// Attempts `R` with actions disabled and always rewinds the input.
#[inline]
pub(super) fn look_ahead<R: Parse<S>, I: Input, S, C: Control<S>>(
    input: &mut I,
    cx: &mut Context<'_, S, C>,
) -> Result<bool, Error> {
    let mut marker = input.mark();
    cx.with_actions(false, |cx| R::parse(&mut *marker, cx))
}

/// Matches iff `R` matches, without consuming input.
pub struct At<R>(PhantomData<R>);

impl<R: Rule> Rule for At<R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Opt, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, R: Parse<S>> Parse<S> for At<R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        look_ahead::<R, I, S, C>(input, cx)
    }
}

/// Matches iff `R` does not match, without consuming input.
pub struct NotAt<R>(PhantomData<R>);

impl<R: Rule> Rule for NotAt<R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Opt, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, R: Parse<S>> Parse<S> for NotAt<R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        Ok(!look_ahead::<R, I, S, C>(input, cx)?)
    }
}

/// Matches `R` or raises a fatal error.
///
/// The error is generated by [`Control::raise`] for `R`, which by default uses the
/// [`message`][Rule::message] of `R`. Unlike a mismatch, the error is not caught by enclosing
/// choices, it aborts the parse.
pub struct Must<R>(PhantomData<R>);

impl<R: Rule> Rule for Must<R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Seq, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, R: Parse<S>> Parse<S> for Must<R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        if R::parse(input, cx)? {
            Ok(true)
        } else {
            Err(cx.raise::<R, I>(input))
        }
    }
}

/// Matches `Cond` followed by all rules of the tuple `T`, each of which is required.
///
/// When `Cond` does not match, this does not match either. Once `Cond` matched, the choice is
/// locked in and every mismatch of a rule in `T` raises a fatal error.
pub struct IfMust<Cond, T>(PhantomData<(Cond, T)>);

impl<Cond: Rule, T: RuleList> Rule for IfMust<Cond, T> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Seq, |analysis| {
            let mut children = vec![Cond::describe(analysis)];
            children.extend(T::describe_all(analysis));
            children
        })
    }
}

impl<S, Cond: Parse<S>, T: ParseList<S>> Parse<S> for IfMust<Cond, T> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        if !Cond::parse(input, cx)? {
            return Ok(false);
        }
        T::parse_all_or_raise(input, cx)?;
        Ok(true)
    }
}

/// Raises the fatal error for `R` without attempting to match anything.
pub struct Raise<R>(PhantomData<R>);

impl<R: Rule> Rule for Raise<R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.leaf::<Self>(Kind::Consume)
    }
}

impl<S, R: Rule> Parse<S> for Raise<R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        Err(cx.raise::<R, I>(input))
    }
}

/// Matches `R` surrounded by any number of `P`, usually whitespace.
///
/// If `R` does not match, the leading padding is not consumed either.
pub struct Pad<R, P>(PhantomData<(R, P)>);

impl<R: Rule, P: Rule> Rule for Pad<R, P> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Seq, <(Star<P>, R, Star<P>)>::describe_all)
    }
}

impl<S, R: Parse<S>, P: Parse<S>> Parse<S> for Pad<R, P> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        Seq::<(Star<P>, R, Star<P>)>::parse(input, cx)
    }
}

/// Matches `R` and applies the actions `A` to the matched input.
///
/// The actions are passed to [`Control::apply`] with `R` as the rule.
pub struct IfApply<R, A>(PhantomData<(R, A)>);

impl<R: Rule, A: 'static> Rule for IfApply<R, A> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Seq, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, R: Parse<S>, A: Actions<S> + 'static> Parse<S> for IfApply<R, A> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        let mut marker = input.mark();
        if !R::parse(&mut *marker, cx)? {
            return Ok(false);
        }
        cx.apply_actions::<R, A, I>(&marker);
        marker.commit();
        Ok(true)
    }
}

/// Matches `R` with actions enabled.
pub struct Enable<R>(PhantomData<R>);

impl<R: Rule> Rule for Enable<R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Seq, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, R: Parse<S>> Parse<S> for Enable<R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        cx.with_actions(true, |cx| R::parse(input, cx))
    }
}

/// Matches `R` with actions disabled.
pub struct Disable<R>(PhantomData<R>);

impl<R: Rule> Rule for Disable<R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Seq, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, R: Parse<S>> Parse<S> for Disable<R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        cx.with_actions(false, |cx| R::parse(input, cx))
    }
}
