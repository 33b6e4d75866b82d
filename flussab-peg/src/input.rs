use std::{
    fmt, io,
    ops::{Deref, DerefMut},
};

use bstr::{BStr, ByteSlice};

use crate::{error::SyntaxError, Error, Position};

pub(crate) mod sealed {
    use crate::Position;

    /// Cursor manipulation reserved to [`Marker`][super::Marker].
    pub trait Sealed {
        /// Keeps all input starting at `position` available until the matching `unpin`.
        ///
        /// Pins nest and are released in reverse order.
        fn pin(&mut self, position: Position);

        /// Releases the most recent pin.
        fn unpin(&mut self);

        /// Moves the cursor back to a pinned position.
        fn restore(&mut self, position: Position);

        /// Returns the input between a pinned position and the cursor.
        fn consumed_since(&self, start: Position) -> &[u8];
    }
}

use sealed::Sealed;

/// Input that rules are matched against.
///
/// An input is a logically linear sequence of bytes with a cursor. Rules inspect the data in front
/// of the cursor using [`require`][Self::require] and move the cursor forward using
/// [`advance`][Self::advance]. The only way to move the cursor backwards is to create a
/// [`Marker`] before advancing and to drop it without committing it.
///
/// This trait is sealed, use [`MemoryInput`][crate::MemoryInput] for in-memory data and
/// [`BufferInput`][crate::BufferInput] for streaming data.
pub trait Input: Sealed {
    /// Label of the input used for diagnostics.
    fn source(&self) -> &str;

    /// The current cursor position.
    fn position(&self) -> Position;

    /// Returns the already available data in front of the cursor.
    ///
    /// This never reads more data.
    fn buf(&self) -> &[u8];

    /// Makes sure that at least `amount` bytes in front of the cursor are available, unless the
    /// end of the input is reached first.
    ///
    /// Returns a slice to _all_ of the available data, which is shorter than `amount` only at the
    /// end of the input. Fails with [`BufferExhausted`][crate::BufferExhausted] when the input
    /// would have to retain more data than it is allowed to.
    fn require(&mut self, amount: usize) -> Result<&[u8], Error>;

    /// Advances the cursor over `n` bytes made available by a previous
    /// [`require`][Self::require].
    ///
    /// This will panic if the number of bytes exceeds the amount of available data.
    fn advance(&mut self, n: usize);

    /// Releases all data in front of the oldest live [`Marker`] (or the cursor, if there is none).
    ///
    /// This is always safe to call, data that is still needed for backtracking is kept.
    fn discard(&mut self);

    /// Returns an encountered IO error as `Err(io_err)`.
    ///
    /// This resets the stored IO error and returns `Ok(())` if no IO error is stored.
    fn check_io_error(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Returns the byte at `offset` from the cursor or `None` at the end of the input.
    #[inline]
    fn peek_byte(&mut self, offset: usize) -> Result<Option<u8>, Error> {
        Ok(self.require(offset + 1)?.get(offset).copied())
    }

    /// Returns whether the cursor is at the end of the input.
    ///
    /// Reaching the end of the input is not an error, even for a [`BufferInput`] that is unable to
    /// buffer any further data.
    ///
    /// [`BufferInput`]: crate::BufferInput
    #[inline]
    fn is_at_end(&mut self) -> Result<bool, Error> {
        Ok(self.require(1)?.is_empty())
    }

    /// Captures the cursor position so it can be restored when a rule fails.
    #[inline]
    fn mark(&mut self) -> Marker<'_, Self>
    where
        Self: Sized,
    {
        Marker::new(self)
    }

    /// Generates a syntax error at the cursor position.
    ///
    /// If an IO error was encountered before, that IO error is returned instead, as it is the
    /// more likely reason for the unexpected input.
    #[cold]
    #[inline(never)]
    fn give_up(&mut self, msg: String) -> Error {
        if let Err(err) = self.check_io_error() {
            return err.into();
        }
        SyntaxError {
            source: self.source().to_owned(),
            position: self.position(),
            msg,
        }
        .into()
    }
}

/// Saved cursor position of an attempted rule.
///
/// Dropping a marker without calling [`commit`][Self::commit] moves the cursor back to where the
/// marker was created. While the marker is alive, the input retains all data from that position
/// on.
///
/// A marker mutably borrows its input and dereferences to it, so markers nested within the
/// attempt are necessarily released first.
pub struct Marker<'a, I: Input> {
    input: &'a mut I,
    start: Position,
    committed: bool,
}

impl<'a, I: Input> Marker<'a, I> {
    #[inline]
    fn new(input: &'a mut I) -> Self {
        let start = input.position();
        input.pin(start);
        Marker {
            input,
            start,
            committed: false,
        }
    }

    /// The position at which the marker was created.
    #[inline]
    pub fn start(&self) -> Position {
        self.start
    }

    /// The input advanced over since the marker was created.
    #[inline]
    pub fn consumed(&self) -> &[u8] {
        self.input.consumed_since(self.start)
    }

    /// The input advanced over since the marker was created, with its source location.
    #[inline]
    pub fn span(&self) -> Span<'_> {
        Span {
            bytes: self.consumed(),
            start: self.start,
            source: self.input.source(),
        }
    }

    /// Keeps the cursor where it is.
    #[inline]
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Commits the marker when `matched` is `true` and rewinds it otherwise.
    ///
    /// Returns `matched`.
    #[inline]
    pub fn finish(self, matched: bool) -> bool {
        if matched {
            self.commit();
        }
        matched
    }
}

impl<I: Input> Deref for Marker<'_, I> {
    type Target = I;

    #[inline]
    fn deref(&self) -> &I {
        self.input
    }
}

impl<I: Input> DerefMut for Marker<'_, I> {
    #[inline]
    fn deref_mut(&mut self) -> &mut I {
        self.input
    }
}

impl<I: Input> Drop for Marker<'_, I> {
    #[inline]
    fn drop(&mut self) {
        if !self.committed {
            self.input.restore(self.start);
        }
        self.input.unpin();
    }
}

/// The input matched by a rule, as passed to an [`Action`][crate::Action].
///
/// The referenced data is only guaranteed to be retained for the duration of the action.
#[derive(Copy, Clone)]
pub struct Span<'a> {
    bytes: &'a [u8],
    start: Position,
    source: &'a str,
}

impl<'a> Span<'a> {
    /// The matched bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The matched bytes as a byte string.
    #[inline]
    pub fn as_bstr(&self) -> &'a BStr {
        self.bytes.as_bstr()
    }

    /// The matched bytes if they are valid UTF-8.
    #[inline]
    pub fn to_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }

    /// The position of the first matched byte.
    #[inline]
    pub fn start(&self) -> Position {
        self.start
    }

    /// Label of the input.
    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Number of matched bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the rule matched without consuming input.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {:?}",
            self.source,
            self.start,
            self.bytes.as_bstr()
        )
    }
}

impl fmt::Display for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.bytes.as_bstr(), f)
    }
}
