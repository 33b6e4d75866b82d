use std::marker::PhantomData;

use super::{combinators::look_ahead, Any};
use crate::{
    analyze::{Analysis, Kind, RuleId},
    Context, Control, Error, Input, Parse, Rule,
};

fn at_least(min: usize) -> Kind {
    if min == 0 {
        Kind::Opt
    } else {
        Kind::Seq
    }
}

/// Matches `R` as often as possible, including zero times.
pub struct Star<R>(PhantomData<R>);

impl<R: Rule> Rule for Star<R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.repetition::<Self>(Kind::Opt, 0, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, R: Parse<S>> Parse<S> for Star<R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        while R::parse(input, cx)? {}
        Ok(true)
    }
}

/// Matches `R` as often as possible, at least once.
pub struct Plus<R>(PhantomData<R>);

impl<R: Rule> Rule for Plus<R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.repetition::<Self>(Kind::Seq, 0, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, R: Parse<S>> Parse<S> for Plus<R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        if !R::parse(input, cx)? {
            return Ok(false);
        }
        while R::parse(input, cx)? {}
        Ok(true)
    }
}

/// Matches `R` exactly `N` times.
///
/// Further matches of `R` are left in the input.
pub struct Rep<const N: usize, R>(PhantomData<R>);

impl<const N: usize, R: Rule> Rule for Rep<N, R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(at_least(N), |analysis| vec![R::describe(analysis)])
    }
}

impl<S, const N: usize, R: Parse<S>> Parse<S> for Rep<N, R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        let mut marker = input.mark();
        for _ in 0..N {
            if !R::parse(&mut *marker, cx)? {
                return Ok(false);
            }
        }
        marker.commit();
        Ok(true)
    }
}

/// Matches `R` as often as possible, at least `MIN` times.
pub struct RepMin<const MIN: usize, R>(PhantomData<R>);

impl<const MIN: usize, R: Rule> Rule for RepMin<MIN, R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.repetition::<Self>(at_least(MIN), 0, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, const MIN: usize, R: Parse<S>> Parse<S> for RepMin<MIN, R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        if !Rep::<MIN, R>::parse(input, cx)? {
            return Ok(false);
        }
        while R::parse(input, cx)? {}
        Ok(true)
    }
}

/// Matches `R` up to `MAX` times, but does not match if `R` would match another time.
pub struct RepMax<const MAX: usize, R>(PhantomData<R>);

impl<const MAX: usize, R: Rule> Rule for RepMax<MAX, R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Opt, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, const MAX: usize, R: Parse<S>> Parse<S> for RepMax<MAX, R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        RepMinMax::<0, MAX, R>::parse(input, cx)
    }
}

/// Matches `R` at least `MIN` and at most `MAX` times, but does not match if `R` would match
/// another time.
pub struct RepMinMax<const MIN: usize, const MAX: usize, R>(PhantomData<R>);

impl<const MIN: usize, const MAX: usize, R> RepMinMax<MIN, MAX, R> {
    const VALID_BOUNDS: () = assert!(MIN <= MAX, "RepMinMax requires MIN <= MAX");
}

impl<const MIN: usize, const MAX: usize, R: Rule> Rule for RepMinMax<MIN, MAX, R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(at_least(MIN), |analysis| vec![R::describe(analysis)])
    }
}

impl<S, const MIN: usize, const MAX: usize, R: Parse<S>> Parse<S> for RepMinMax<MIN, MAX, R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_BOUNDS;

        let mut marker = input.mark();
        for _ in 0..MIN {
            if !R::parse(&mut *marker, cx)? {
                return Ok(false);
            }
        }
        for _ in MIN..MAX {
            if !R::parse(&mut *marker, cx)? {
                marker.commit();
                return Ok(true);
            }
        }
        let more = look_ahead::<R, I, S, C>(&mut *marker, cx)?;
        Ok(marker.finish(!more))
    }
}

/// Matches `R` up to `N` times, always succeeding.
///
/// Unlike [`RepMax`], further matches of `R` are left in the input.
pub struct RepOpt<const N: usize, R>(PhantomData<R>);

impl<const N: usize, R: Rule> Rule for RepOpt<N, R> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.node::<Self>(Kind::Opt, |analysis| vec![R::describe(analysis)])
    }
}

impl<S, const N: usize, R: Parse<S>> Parse<S> for RepOpt<N, R> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        for _ in 0..N {
            if !R::parse(input, cx)? {
                break;
            }
        }
        Ok(true)
    }
}

/// Matches `R` repeatedly until the terminator `T` matches.
///
/// The terminator is only looked at, it is not consumed. When the end of the input is reached
/// without finding the terminator, this matches iff `EOF_OK` is `true`.
pub struct Until<T, R = Any, const EOF_OK: bool = false>(PhantomData<(T, R)>);

impl<T: Rule, R: Rule, const EOF_OK: bool> Rule for Until<T, R, EOF_OK> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.repetition::<Self>(Kind::Opt, 1, |analysis| {
            vec![T::describe(analysis), R::describe(analysis)]
        })
    }
}

impl<S, T: Parse<S>, R: Parse<S>, const EOF_OK: bool> Parse<S> for Until<T, R, EOF_OK> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        let mut marker = input.mark();
        loop {
            if look_ahead::<T, I, S, C>(&mut *marker, cx)? {
                marker.commit();
                return Ok(true);
            }
            if marker.is_at_end()? {
                return Ok(marker.finish(EOF_OK));
            }
            if !R::parse(&mut *marker, cx)? {
                return Ok(false);
            }
        }
    }
}

/// Matches one or more `R` separated by `Sep`.
///
/// A trailing separator is not consumed.
pub struct List<R, Sep>(PhantomData<(R, Sep)>);

impl<R: Rule, Sep: Rule> Rule for List<R, Sep> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.repetition::<Self>(Kind::Seq, 0, |analysis| {
            vec![R::describe(analysis), Sep::describe(analysis)]
        })
    }
}

impl<S, R: Parse<S>, Sep: Parse<S>> Parse<S> for List<R, Sep> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        if !R::parse(input, cx)? {
            return Ok(false);
        }
        loop {
            let mut marker = input.mark();
            if !(Sep::parse(&mut *marker, cx)? && R::parse(&mut *marker, cx)?) {
                return Ok(true);
            }
            marker.commit();
        }
    }
}

/// Matches one or more `R` separated by `Sep`, where every separator must be followed by `R`.
///
/// Unlike [`List`], a separator that is not followed by `R` raises the fatal error for `R`.
pub struct ListMust<R, Sep>(PhantomData<(R, Sep)>);

impl<R: Rule, Sep: Rule> Rule for ListMust<R, Sep> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.repetition::<Self>(Kind::Seq, 0, |analysis| {
            vec![R::describe(analysis), Sep::describe(analysis)]
        })
    }
}

impl<S, R: Parse<S>, Sep: Parse<S>> Parse<S> for ListMust<R, Sep> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        if !R::parse(input, cx)? {
            return Ok(false);
        }
        while Sep::parse(input, cx)? {
            if !R::parse(input, cx)? {
                return Err(cx.raise::<R, I>(input));
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{
        rules::{Eof, One, Seq},
        InnerError, MemoryInput, Normal,
    };

    type A = One<b'a'>;
    type Ab = Seq<(One<b'a'>, One<b'b'>)>;

    fn run<R: Parse<()>>(data: &str) -> (bool, usize) {
        let mut input = MemoryInput::new("test", data);
        let (mut state, mut control) = ((), Normal);
        let mut cx = Context::new(&mut state, &mut control);
        let matched = R::parse(&mut input, &mut cx).unwrap();
        (matched, input.position().offset())
    }

    #[test]
    fn unbounded() {
        assert_eq!(run::<Star<A>>("aaab"), (true, 3));
        assert_eq!(run::<Star<A>>("b"), (true, 0));
        assert_eq!(run::<Plus<A>>("aab"), (true, 2));
        assert_eq!(run::<Plus<A>>("b"), (false, 0));
        assert_eq!(run::<RepMin<2, A>>("aaa"), (true, 3));
        assert_eq!(run::<RepMin<2, A>>("ab"), (false, 0));
    }

    #[test]
    fn partial_repetition_is_rewound() {
        assert_eq!(run::<Star<Ab>>("ababa"), (true, 4));
        assert_eq!(run::<Plus<Ab>>("aba"), (true, 2));
        assert_eq!(run::<Rep<3, Ab>>("ababa"), (false, 0));
        assert_eq!(run::<RepMin<3, Ab>>("ababa"), (false, 0));
    }

    #[test]
    fn exact_count() {
        assert_eq!(run::<Rep<2, A>>("a"), (false, 0));
        assert_eq!(run::<Rep<2, A>>("aa"), (true, 2));
        assert_eq!(run::<Rep<2, A>>("aaa"), (true, 2));
        assert_eq!(run::<Rep<0, A>>("a"), (true, 0));
        assert_eq!(run::<Seq<(Rep<2, A>, Eof)>>("aaa"), (false, 0));
    }

    #[test]
    fn bounded() {
        assert_eq!(run::<RepMax<2, A>>(""), (true, 0));
        assert_eq!(run::<RepMax<2, A>>("aa"), (true, 2));
        assert_eq!(run::<RepMax<2, A>>("aaa"), (false, 0));
        assert_eq!(run::<RepMinMax<1, 2, A>>(""), (false, 0));
        assert_eq!(run::<RepMinMax<1, 2, A>>("ab"), (true, 1));
        assert_eq!(run::<RepMinMax<1, 2, A>>("aaa"), (false, 0));
        assert_eq!(run::<RepOpt<2, A>>("aaa"), (true, 2));
        assert_eq!(run::<RepOpt<2, A>>("b"), (true, 0));
    }

    #[test]
    fn until() {
        assert_eq!(run::<Until<One<b';'>>>("abc;"), (true, 3));
        assert_eq!(run::<Until<One<b';'>>>(";"), (true, 0));
        assert_eq!(run::<Until<One<b';'>>>("abc"), (false, 0));
        assert_eq!(run::<Until<One<b';'>, Any, true>>("abc"), (true, 3));
        assert_eq!(run::<Until<One<b';'>, A>>("aab;"), (false, 0));
        assert_eq!(run::<Until<Eof, A>>("aa"), (true, 2));
    }

    #[test]
    fn lists() {
        type Items = List<A, One<b','>>;
        assert_eq!(run::<Items>("a,a,a"), (true, 5));
        assert_eq!(run::<Items>("a,a,"), (true, 3));
        assert_eq!(run::<Items>("a,,a"), (true, 1));
        assert_eq!(run::<Items>(",a"), (false, 0));
    }

    #[test]
    fn lists_with_required_elements() {
        type Items = ListMust<A, One<b','>>;
        assert_eq!(run::<Items>("a,a;"), (true, 3));
        assert_eq!(run::<Items>(",a"), (false, 0));

        let mut input = MemoryInput::new("test", "a,a,b");
        let (mut state, mut control) = ((), Normal);
        let mut cx = Context::new(&mut state, &mut control);
        let err = Items::parse(&mut input, &mut cx).unwrap_err();
        assert_matches!(*err, InnerError::Syntax(ref err) if err.position.column() == 5);
    }
}
