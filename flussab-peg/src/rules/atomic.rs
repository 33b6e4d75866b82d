use std::marker::PhantomData;

use crate::{
    analyze::{Analysis, Kind, RuleId},
    match_byte, Context, Control, Error, Input, Parse, Rule,
};

/// A byte string matched by [`Str`] or [`IStr`], usually declared using
/// [`literal!`][crate::literal!].
pub trait Literal: 'static {
    /// The bytes to match.
    const BYTES: &'static [u8];
}

macro_rules! consuming_leaf {
    () => {
        fn describe(analysis: &mut Analysis) -> RuleId {
            analysis.leaf::<Self>(Kind::Consume)
        }
    };
}

macro_rules! optional_leaf {
    () => {
        fn describe(analysis: &mut Analysis) -> RuleId {
            analysis.leaf::<Self>(Kind::Opt)
        }
    };
}

/// Matches the byte `B`.
pub struct One<const B: u8>;

impl<const B: u8> Rule for One<B> {
    consuming_leaf!();
}

impl<S, const B: u8> Parse<S> for One<B> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        match_byte(input, |byte| byte == B)
    }
}

/// Matches any byte other than `B`.
pub struct NotOne<const B: u8>;

impl<const B: u8> Rule for NotOne<B> {
    consuming_leaf!();
}

impl<S, const B: u8> Parse<S> for NotOne<B> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        match_byte(input, |byte| byte != B)
    }
}

/// Matches any single byte contained in the literal `L`.
pub struct OneOf<L>(PhantomData<L>);

impl<L: Literal> Rule for OneOf<L> {
    consuming_leaf!();
}

impl<S, L: Literal> Parse<S> for OneOf<L> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        match_byte(input, |byte| L::BYTES.contains(&byte))
    }
}

/// Matches a byte in the inclusive range `LO..=HI`.
pub struct Range<const LO: u8, const HI: u8>;

impl<const LO: u8, const HI: u8> Rule for Range<LO, HI> {
    consuming_leaf!();
}

impl<S, const LO: u8, const HI: u8> Parse<S> for Range<LO, HI> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        match_byte(input, |byte| (LO..=HI).contains(&byte))
    }
}

/// Matches a byte outside of the inclusive range `LO..=HI`.
pub struct NotRange<const LO: u8, const HI: u8>;

impl<const LO: u8, const HI: u8> Rule for NotRange<LO, HI> {
    consuming_leaf!();
}

impl<S, const LO: u8, const HI: u8> Parse<S> for NotRange<LO, HI> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        match_byte(input, |byte| !(LO..=HI).contains(&byte))
    }
}

/// Matches any single byte.
pub struct Any;

impl Rule for Any {
    consuming_leaf!();
}

impl<S> Parse<S> for Any {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        match_byte(input, |_| true)
    }
}

/// Matches exactly `N` arbitrary bytes.
pub struct Bytes<const N: usize>;

impl<const N: usize> Rule for Bytes<N> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.leaf::<Self>(if N == 0 { Kind::Opt } else { Kind::Consume })
    }
}

impl<S, const N: usize> Parse<S> for Bytes<N> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        if input.require(N)?.len() >= N {
            input.advance(N);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Matches the bytes of `L`.
///
/// This does not request more data than the length of `L`.
pub struct Str<L>(PhantomData<L>);

impl<L: Literal> Rule for Str<L> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.leaf::<Self>(if L::BYTES.is_empty() {
            Kind::Opt
        } else {
            Kind::Consume
        })
    }
}

impl<S, L: Literal> Parse<S> for Str<L> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        let len = L::BYTES.len();
        if input.require(len)?.starts_with(L::BYTES) {
            input.advance(len);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Matches the bytes of `L`, ignoring ASCII case.
pub struct IStr<L>(PhantomData<L>);

impl<L: Literal> Rule for IStr<L> {
    fn describe(analysis: &mut Analysis) -> RuleId {
        analysis.leaf::<Self>(if L::BYTES.is_empty() {
            Kind::Opt
        } else {
            Kind::Consume
        })
    }
}

impl<S, L: Literal> Parse<S> for IStr<L> {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        let len = L::BYTES.len();
        let matches = match input.require(len)?.get(..len) {
            Some(bytes) => bytes.eq_ignore_ascii_case(L::BYTES),
            None => false,
        };
        if matches {
            input.advance(len);
        }
        Ok(matches)
    }
}

/// Matches a line break, either `"\n"` or `"\r\n"`.
pub struct Eol;

impl Rule for Eol {
    consuming_leaf!();
}

impl<S> Parse<S> for Eol {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        let len = match input.peek_byte(0)? {
            Some(b'\n') => 1,
            Some(b'\r') if input.peek_byte(1)? == Some(b'\n') => 2,
            _ => return Ok(false),
        };
        input.advance(len);
        Ok(true)
    }
}

/// Matches at the end of the input.
pub struct Eof;

impl Rule for Eof {
    optional_leaf!();
}

impl<S> Parse<S> for Eof {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        input.is_at_end()
    }
}

/// Matches at the start of the input.
pub struct Bof;

impl Rule for Bof {
    optional_leaf!();
}

impl<S> Parse<S> for Bof {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        Ok(input.position().offset() == 0)
    }
}

/// Always matches without consuming input.
pub struct Success;

impl Rule for Success {
    optional_leaf!();
}

impl<S> Parse<S> for Success {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        _input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        Ok(true)
    }
}

/// Never matches.
pub struct Failure;

impl Rule for Failure {
    consuming_leaf!();
}

impl<S> Parse<S> for Failure {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        _input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        Ok(false)
    }
}

/// Releases input that is no longer needed and matches without consuming input.
///
/// Placing this between the top-level items of a grammar keeps a
/// [`BufferInput`][crate::BufferInput] from retaining data that was already processed.
pub struct Discard;

impl Rule for Discard {
    optional_leaf!();
}

impl<S> Parse<S> for Discard {
    #[inline]
    fn parse<I: Input, C: Control<S>>(
        input: &mut I,
        _cx: &mut Context<'_, S, C>,
    ) -> Result<bool, Error> {
        input.discard();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{literal, MemoryInput, Normal, Position};

    literal! {
        struct Abc = b"abc";
        struct Vowels = b"aeiou";
    }

    fn run<R: Parse<()>>(data: &str) -> (bool, usize) {
        let mut input = MemoryInput::new("test", data);
        let (mut state, mut control) = ((), Normal);
        let mut cx = Context::new(&mut state, &mut control);
        let matched = R::parse(&mut input, &mut cx).unwrap();
        (matched, input.position().offset())
    }

    #[test]
    fn single_bytes() {
        assert_eq!(run::<One<b'a'>>("ab"), (true, 1));
        assert_eq!(run::<One<b'a'>>("ba"), (false, 0));
        assert_eq!(run::<One<b'a'>>(""), (false, 0));
        assert_eq!(run::<NotOne<b'a'>>("ba"), (true, 1));
        assert_eq!(run::<NotOne<b'a'>>(""), (false, 0));
        assert_eq!(run::<OneOf<Vowels>>("e"), (true, 1));
        assert_eq!(run::<OneOf<Vowels>>("x"), (false, 0));
        assert_eq!(run::<Range<b'0', b'9'>>("7"), (true, 1));
        assert_eq!(run::<Range<b'0', b'9'>>("a"), (false, 0));
        assert_eq!(run::<NotRange<b'0', b'9'>>("a"), (true, 1));
        assert_eq!(run::<Any>("\0"), (true, 1));
        assert_eq!(run::<Any>(""), (false, 0));
    }

    #[test]
    fn strings() {
        assert_eq!(run::<Str<Abc>>("abcd"), (true, 3));
        assert_eq!(run::<Str<Abc>>("abd"), (false, 0));
        assert_eq!(run::<Str<Abc>>("ab"), (false, 0));
        assert_eq!(run::<IStr<Abc>>("aBC"), (true, 3));
        assert_eq!(run::<IStr<Abc>>("aB"), (false, 0));
        assert_eq!(run::<Bytes<2>>("abc"), (true, 2));
        assert_eq!(run::<Bytes<4>>("abc"), (false, 0));
    }

    #[test]
    fn line_breaks() {
        assert_eq!(run::<Eol>("\nx"), (true, 1));
        assert_eq!(run::<Eol>("\r\nx"), (true, 2));
        assert_eq!(run::<Eol>("\rx"), (false, 0));

        let mut input = MemoryInput::new("test", "\r\nx");
        let (mut state, mut control) = ((), Normal);
        let mut cx = Context::new(&mut state, &mut control);
        assert!(Eol::parse(&mut input, &mut cx).unwrap());
        assert_eq!(input.position().line(), 2);
        assert_eq!(input.position().column(), 1);
    }

    #[test]
    fn positions() {
        assert_eq!(run::<Eof>(""), (true, 0));
        assert_eq!(run::<Eof>("a"), (false, 0));
        assert_eq!(run::<Bof>("a"), (true, 0));
        assert_eq!(run::<Success>("a"), (true, 0));
        assert_eq!(run::<Failure>("a"), (false, 0));
        assert_eq!(run::<Discard>("a"), (true, 0));

        let mut input = MemoryInput::new("test", "a");
        let (mut state, mut control) = ((), Normal);
        let mut cx = Context::new(&mut state, &mut control);
        assert!(One::<b'a'>::parse(&mut input, &mut cx).unwrap());
        assert!(!Bof::parse(&mut input, &mut cx).unwrap());
        assert_ne!(input.position(), Position::new());
    }
}
