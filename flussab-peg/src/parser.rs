/// Result of matching a grammar, which can fall through on input that does not match.
///
/// Matching a grammar using [`parse`][crate::parse] has three possible outcomes:
///
/// * The grammar matched: `Res(Ok(()))`. The input was advanced past the matched input.
/// * The input does not match the grammar: `Fallthrough`. The input was left unchanged, so that
///   another grammar can be tried.
/// * Matching was aborted: `Res(Err(err))`. This happens for fatal syntax errors raised by
///   [`Must`][crate::rules::Must] and similar rules, when a [`BufferInput`][crate::BufferInput]
///   ran out of retention capacity and when reading the input failed.
///
/// [`Parsed`] values can be converted into plain `Result` values using
/// [`or_give_up`][Parsed::or_give_up], making the `Parsed` value fall through to an unrecoverable
/// error, or using [`matches`][Parsed::matches] or [`optional`][Parsed::optional].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed<T, E> {
    /// A successful match or an irrecoverable error.
    Res(Result<T, E>),
    /// The input does not match the grammar.
    ///
    /// This leaves the input unchanged.
    Fallthrough,
}

pub use Parsed::*;

impl<T, E> Parsed<T, E> {
    /// Equivalent to `map_err(From::from)`.
    pub fn err_into<E2: From<E>>(self) -> Parsed<T, E2> {
        self.map_err(From::from)
    }

    /// Turns a mismatch into an irrecoverable error.
    #[inline]
    pub fn or_give_up(self, err: impl FnOnce() -> E) -> Result<T, E> {
        match self {
            Res(result) => result,
            Fallthrough => Err(err()),
        }
    }

    /// Returns `None` for a mismatch.
    #[inline]
    pub fn optional(self) -> Result<Option<T>, E> {
        match self {
            Res(Ok(value)) => Ok(Some(value)),
            Res(Err(err)) => Err(err),
            Fallthrough => Ok(None),
        }
    }

    /// Returns whether the input matched.
    #[inline]
    pub fn matches(self) -> Result<bool, E> {
        match self {
            Res(Ok(_)) => Ok(true),
            Res(Err(err)) => Err(err),
            Fallthrough => Ok(false),
        }
    }

    /// Tries a different grammar when the input did not match.
    ///
    /// An error is returned unchanged, it does not cause the alternative to be tried.
    #[inline]
    pub fn or_parse(self, parse: impl FnOnce() -> Parsed<T, E>) -> Parsed<T, E> {
        match self {
            Fallthrough => parse(),
            v => v,
        }
    }

    /// Continues with `parse` after a successful match.
    ///
    /// When the returned value is an error, it is not turned back into a mismatch.
    #[inline]
    pub fn and_then<U>(self, parse: impl FnOnce(T) -> Result<U, E>) -> Parsed<U, E> {
        match self {
            Res(Ok(value)) => Res(parse(value)),
            Res(Err(err)) => Res(Err(err)),
            Fallthrough => Fallthrough,
        }
    }

    /// Replaces a successfully parsed value with the value returned when applying the function `f`
    /// to it.
    ///
    /// If the match was not successful, the error or fallthrough is returned unchanged.
    #[inline]
    pub fn map<T2>(self, f: impl FnOnce(T) -> T2) -> Parsed<T2, E> {
        match self {
            Res(Ok(value)) => Res(Ok(f(value))),
            Res(Err(err)) => Res(Err(err)),
            Fallthrough => Fallthrough,
        }
    }

    /// Replaces an occured error with the error returned when applying the function `f` to it.
    #[inline]
    pub fn map_err<E2>(self, f: impl FnOnce(E) -> E2) -> Parsed<T, E2> {
        match self {
            Res(Ok(value)) => Res(Ok(value)),
            Res(Err(err)) => Res(Err(f(err))),
            Fallthrough => Fallthrough,
        }
    }
}

impl<T, E> From<Result<T, E>> for Parsed<T, E> {
    #[inline]
    fn from(res: Result<T, E>) -> Self {
        Res(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        literal, parse,
        rules::{Eof, Plus, Range, Seq, Str},
        Error, Input, MemoryInput,
    };

    literal! {
        struct Null = b"none";
    }

    type Number = Plus<Range<b'0', b'9'>>;
    type Empty = Seq<(Str<Null>, Eof)>;

    fn entry(input: &mut MemoryInput) -> Parsed<Option<usize>, Error> {
        let start = input.position().offset();
        parse::<Number, _, _>(input, &mut ())
            .map(|()| Some(input.position().offset() - start))
            .or_parse(|| parse::<Empty, _, _>(input, &mut ()).map(|()| None))
    }

    #[test]
    fn combine_results() {
        let mut input = MemoryInput::new("test", "1234");
        assert_eq!(entry(&mut input).optional().unwrap(), Some(Some(4)));

        let mut input = MemoryInput::new("test", "none");
        assert!(entry(&mut input).matches().unwrap());

        let mut input = MemoryInput::new("test", "nothing");
        assert!(!entry(&mut input).matches().unwrap());
        assert_eq!(input.position().offset(), 0);
    }

    #[test]
    fn errors_are_not_retried() {
        let parsed: Parsed<(), &str> = Res(Err("fatal"));
        assert_eq!(parsed.or_parse(|| Res(Ok(()))), Res(Err("fatal")));
        assert_eq!(
            Parsed::<u8, &str>::Fallthrough.and_then(|v| Ok(v + 1)),
            Fallthrough
        );
        assert_eq!(
            Parsed::<u8, &str>::from(Ok(1)).and_then(|v| Ok(v + 1)),
            Res(Ok(2))
        );
    }

    #[test]
    fn give_up_on_mismatch() {
        let mut input = MemoryInput::new("test", "12");
        let parsed = parse::<Number, _, _>(&mut input, &mut ());
        assert!(parsed.or_give_up(|| unreachable!()).is_ok());

        let mut input = MemoryInput::new("test", "none");
        let err = parse::<Number, _, _>(&mut input, &mut ())
            .or_give_up(|| input.give_up("expected a number".to_owned()))
            .unwrap_err();
        assert_eq!(err.to_string(), "test:1:1: expected a number");
    }

    #[test]
    fn convert_errors() {
        #[derive(Debug, PartialEq, Eq)]
        struct Fatal(&'static str);

        impl From<&'static str> for Fatal {
            fn from(msg: &'static str) -> Self {
                Fatal(msg)
            }
        }

        let parsed: Parsed<u8, &'static str> = Res(Err("fatal"));
        assert_eq!(parsed.err_into::<Fatal>(), Res(Err(Fatal("fatal"))));
        assert_eq!(parsed.map_err(str::len), Res(Err(5)));
        assert_eq!(Parsed::<u8, &str>::Res(Ok(1)).map_err(str::len), Res(Ok(1)));
        assert_eq!(Parsed::<u8, &str>::Fallthrough.err_into::<Fatal>(), Fallthrough);
    }
}
