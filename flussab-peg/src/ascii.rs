//! Character classes for ASCII based grammars.
//!
//! Each class is a rule matching a single byte of the class, declared using
//! [`ranges!`][crate::ranges!]. The core rules of ABNF, which many grammars of text based formats
//! are written in, are found in [`abnf`].
use crate::{
    ranges,
    rules::{Seq, Star},
};

ranges! {
    /// An ASCII letter.
    pub struct Alpha = b'a'..=b'z', b'A'..=b'Z';
    /// An ASCII letter or digit.
    pub struct Alnum = b'a'..=b'z', b'A'..=b'Z', b'0'..=b'9';
    /// A decimal digit.
    pub struct Digit = b'0'..=b'9';
    /// A hexadecimal digit of either case.
    pub struct XDigit = b'0'..=b'9', b'a'..=b'f', b'A'..=b'F';
    /// An uppercase ASCII letter.
    pub struct Upper = b'A'..=b'Z';
    /// A lowercase ASCII letter.
    pub struct Lower = b'a'..=b'z';
    /// A space or a horizontal tab.
    pub struct Blank = b' ', b'\t';
    /// Any ASCII whitespace, including line breaks, vertical tabs and form feeds.
    pub struct Space = b' ', b'\t'..=b'\r';
    /// A printable ASCII character, including the space.
    pub struct Print = b' '..=b'~';
    /// A printable ASCII character other than the space.
    pub struct Graph = b'!'..=b'~';
    /// The first character of an [`Identifier`].
    pub struct IdentifierFirst = b'a'..=b'z', b'A'..=b'Z', b'_';
    /// A character following the first one in an [`Identifier`].
    pub struct IdentifierOther = b'a'..=b'z', b'A'..=b'Z', b'0'..=b'9', b'_';
}

/// A C style identifier.
pub type Identifier = Seq<(IdentifierFirst, Star<IdentifierOther>)>;

/// The core rules of ABNF as defined in RFC 5234.
pub mod abnf {
    use crate::{
        ranges,
        rules::{Any, Seq, Sor, Star},
    };

    pub use super::{Alpha, Digit};

    ranges! {
        /// `BIT`
        pub struct Bit = b'0', b'1';
        /// `CHAR`, any 7-bit character except NUL.
        pub struct Char = 0x01..=0x7f;
        /// `CR`
        pub struct Cr = b'\r';
        /// `CTL`, a control character.
        pub struct Ctl = 0x00..=0x1f, 0x7f;
        /// `DQUOTE`
        pub struct DQuote = b'"';
        /// `HEXDIG`, also accepting lowercase letters as ABNF strings are case-insensitive.
        pub struct HexDig = b'0'..=b'9', b'a'..=b'f', b'A'..=b'F';
        /// `HTAB`
        pub struct HTab = b'\t';
        /// `LF`
        pub struct Lf = b'\n';
        /// `SP`
        pub struct Sp = b' ';
        /// `VCHAR`, a visible character.
        pub struct VChar = 0x21..=0x7e;
        /// `WSP`, a space or a horizontal tab.
        pub struct Wsp = b' ', b'\t';
    }

    /// `CRLF`
    pub type Crlf = Seq<(Cr, Lf)>;

    /// `LWSP`, linear whitespace spanning multiple lines.
    pub type Lwsp = Star<Sor<(Wsp, Seq<(Crlf, Wsp)>)>>;

    /// `OCTET`
    pub type Octet = Any;
}

#[cfg(test)]
mod tests {
    use super::{abnf::*, *};
    use crate::{input::Input, Context, MemoryInput, Normal, Parse};

    fn run<R: Parse<()>>(data: &str) -> (bool, usize) {
        let mut input = MemoryInput::new("test", data);
        let (mut state, mut control) = ((), Normal);
        let mut cx = Context::new(&mut state, &mut control);
        let matched = R::parse(&mut input, &mut cx).unwrap();
        (matched, input.position().offset())
    }

    fn class<R: Parse<()>>() -> Vec<u8> {
        (0..=u8::MAX)
            .filter(|&byte| {
                let data = [byte];
                let mut input = MemoryInput::new("test", &data);
                let (mut state, mut control) = ((), Normal);
                let mut cx = Context::new(&mut state, &mut control);
                R::parse(&mut input, &mut cx).unwrap()
            })
            .collect()
    }

    #[test]
    fn classes() {
        assert_eq!(class::<Digit>(), b"0123456789");
        assert_eq!(class::<XDigit>(), b"0123456789ABCDEFabcdef");
        assert_eq!(class::<Blank>(), b"\t ");
        assert_eq!(class::<Space>(), b"\t\n\x0b\x0c\r ");
        assert_eq!(class::<Alpha>().len(), 52);
        assert_eq!(class::<Alnum>().len(), 62);
        assert!(class::<Upper>().iter().all(u8::is_ascii_uppercase));
        assert!(class::<Lower>().iter().all(u8::is_ascii_lowercase));
        assert_eq!(class::<Print>().len(), 95);
        assert_eq!(class::<Graph>(), class::<VChar>());
    }

    #[test]
    fn abnf_core_rules() {
        assert_eq!(class::<Bit>(), b"01");
        assert_eq!(class::<Wsp>(), class::<Blank>());
        assert_eq!(class::<HexDig>(), class::<XDigit>());
        assert_eq!(class::<Char>().len(), 127);
        assert_eq!(class::<Ctl>().len(), 33);
        assert_eq!(class::<Octet>().len(), 256);
        assert_eq!(run::<Crlf>("\r\n"), (true, 2));
        assert_eq!(run::<Crlf>("\n"), (false, 0));
        assert_eq!(run::<Lwsp>(" \t\r\n x"), (true, 5));
        assert_eq!(run::<Lwsp>("\r\nx"), (true, 0));
    }

    #[test]
    fn identifiers() {
        assert_eq!(run::<Identifier>("_tmp1 = 2"), (true, 5));
        assert_eq!(run::<Identifier>("1st"), (false, 0));
    }
}
