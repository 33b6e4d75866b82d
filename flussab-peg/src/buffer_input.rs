use std::io::{self, BufReader, Cursor, Read};

use crate::{error::BufferExhausted, input::sealed::Sealed, Error, Input, Position};

/// An [`Input`] for streaming data, retaining only a bounded amount of it.
///
/// Data is read from the underlying [`Read`] instance in requests of at most `CHUNK` bytes, and
/// only as much as is needed to satisfy the [`require`][Input::require] calls of the matched
/// rules. Data in front of the oldest live [`Marker`][crate::Marker] (or in front of the cursor,
/// if there is none) is released automatically when space is needed for newly read data, and
/// explicitly by [`discard`][Input::discard].
///
/// The input never retains more than `maximum + CHUNK` bytes, where `maximum` is passed to the
/// constructor. A rule that would need to retain more, by backtracking or looking ahead further,
/// fails with a [`BufferExhausted`] error instead of silently losing data. The extra chunk ensures
/// that checking for the end of the input after advancing over `maximum` retained bytes does not
/// exhaust the buffer. So `maximum` is the backtracking distance that is guaranteed to succeed,
/// not the exact point at which retention fails, which depends on how reads align with `CHUNK`.
///
/// Rules that can backtrack, like [`Seq`][crate::rules::Seq] or a named rule with actions,
/// retain everything they matched until they are done. To process inputs larger than the
/// retention capacity, the outermost rules of a grammar need to avoid backtracking, e.g. by
/// locking in choices using [`IfMust`][crate::rules::IfMust].
///
/// Like [`std::io::BufReader`] this does not return IO errors from individual reads. When an IO
/// error is encountered, the input is treated as if it ended, which makes the parse fail. The IO
/// error is then reported by [`parse`][crate::parse] or by [`give_up`][Input::give_up].
pub struct BufferInput<'a, const CHUNK: usize = 64> {
    read: Box<dyn Read + 'a>,
    buf: Vec<u8>,
    // `buf[pos_in_buf..pos_in_buf + valid_len]` must _always_ be valid input
    pos_in_buf: usize,
    valid_len: usize,
    complete: bool,
    io_error: Option<io::Error>,
    position: Position,
    pins: usize,
    // Only meaningful while `pins > 0`
    pin_in_buf: usize,
    capacity: usize,
    source: String,
}

impl<'a, const CHUNK: usize> BufferInput<'a, CHUNK> {
    /// The maximal number of bytes read at once.
    pub const CHUNK_SIZE: usize = CHUNK;

    const VALID_CHUNK_SIZE: () = assert!(CHUNK >= 2, "the chunk size must be at least 2");

    /// Creates a [`BufferInput`] for the data of a [`BufReader`].
    pub fn from_buf_reader(
        source: impl Into<String>,
        maximum: usize,
        buf_reader: BufReader<impl Read + 'a>,
    ) -> Self {
        // Avoid double buffering without discarding any already buffered contents.
        let buf_data = buf_reader.buffer().to_vec();
        if buf_data.is_empty() {
            Self::from_read(source, maximum, buf_reader.into_inner())
        } else {
            Self::from_read(
                source,
                maximum,
                Cursor::new(buf_data).chain(buf_reader.into_inner()),
            )
        }
    }

    /// Creates a [`BufferInput`] for the data of a [`Read`] instance.
    ///
    /// If the [`Read`] instance is a [`BufReader`], it is better to use
    /// [`from_buf_reader`][Self::from_buf_reader] to avoid unnecessary double buffering of the
    /// data.
    pub fn from_read(source: impl Into<String>, maximum: usize, read: impl Read + 'a) -> Self {
        Self::from_boxed_dyn_read(source.into(), maximum, Box::new(read))
    }

    /// Creates a [`BufferInput`] for the data of a boxed [`Read`] instance.
    ///
    /// If the [`Read`] instance is a [`BufReader`], it is better to use
    /// [`from_buf_reader`][Self::from_buf_reader] to avoid unnecessary double buffering of the
    /// data.
    #[inline(never)]
    pub fn from_boxed_dyn_read(source: String, maximum: usize, read: Box<dyn Read + 'a>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CHUNK_SIZE;
        BufferInput {
            read,
            buf: vec![],
            pos_in_buf: 0,
            valid_len: 0,
            complete: false,
            io_error: None,
            position: Position::new(),
            pins: 0,
            pin_in_buf: 0,
            capacity: maximum.saturating_add(CHUNK),
            source,
        }
    }

    /// Maximal number of bytes this input retains at once.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes currently retained, starting at the oldest live marker or the cursor.
    #[inline]
    pub fn retained(&self) -> usize {
        self.pos_in_buf + self.valid_len - self.keep_in_buf()
    }

    /// Returns whether all remaining data is buffered.
    ///
    /// This can happen when the end was reached or when an IO error was encountered. You can use
    /// [`check_io_error`][Input::check_io_error] to determine whether an IO error occured.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns a reference to an encountered IO error.
    ///
    /// This does not reset the stored IO error and returns `None` if no IO error is stored.
    #[inline]
    pub fn io_error(&self) -> Option<&io::Error> {
        self.io_error.as_ref()
    }

    #[inline]
    fn keep_in_buf(&self) -> usize {
        if self.pins > 0 {
            self.pin_in_buf
        } else {
            self.pos_in_buf
        }
    }

    #[cold]
    #[inline(never)]
    fn require_cold(&mut self, amount: usize) -> Result<(), Error> {
        while self.valid_len < amount && !self.complete {
            let keep_in_buf = self.keep_in_buf();
            let required = (self.pos_in_buf - keep_in_buf).saturating_add(amount);
            if required > self.capacity {
                log::debug!(
                    "{}:{}: retaining {} bytes exceeds the buffer capacity of {}",
                    self.source,
                    self.position,
                    required,
                    self.capacity
                );
                return Err(BufferExhausted {
                    source: self.source.clone(),
                    position: self.position,
                    required,
                    capacity: self.capacity,
                }
                .into());
            }
            self.request_more(keep_in_buf);
        }
        Ok(())
    }

    /// Moves the retained data to the start of the buffer.
    fn realign(&mut self, keep_in_buf: usize) {
        if keep_in_buf == 0 {
            return;
        }
        log::trace!(
            "{}: releasing {} bytes, retaining {}",
            self.source,
            keep_in_buf,
            self.pos_in_buf + self.valid_len - keep_in_buf
        );
        self.buf
            .copy_within(keep_in_buf..self.pos_in_buf + self.valid_len, 0);
        self.pos_in_buf -= keep_in_buf;
        if self.pins > 0 {
            self.pin_in_buf -= keep_in_buf;
        }
    }

    /// Reads at most one more chunk, never retaining more than the capacity.
    fn request_more(&mut self, keep_in_buf: usize) {
        let retained = self.pos_in_buf + self.valid_len - keep_in_buf;
        debug_assert!(retained < self.capacity);
        let len = CHUNK.min(self.capacity - retained);

        // Only move data when the buffer would otherwise have to grow beyond the capacity.
        if self.pos_in_buf + self.valid_len + len > self.capacity {
            self.realign(keep_in_buf);
        }

        let end = self.pos_in_buf + self.valid_len;
        let target_end = end + len;

        if self.buf.len() < target_end {
            self.buf.resize(target_end, 0);
        }

        // Do only a single successful read (to make line buffered repls usable), but do retry on
        // `Interrupted`.
        loop {
            match self.read.read(&mut self.buf[end..target_end]) {
                Ok(0) => self.complete = true,
                Ok(n) => {
                    // this assert is load bearing, as `self.valid_len` is trusted but Read
                    // implementations aren't
                    assert!(n <= len, "invariant of std::io::Read trait violated");
                    self.valid_len += n
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.io_error = Some(err);
                    self.complete = true;
                }
            }
            break;
        }
    }
}

impl<const CHUNK: usize> Sealed for BufferInput<'_, CHUNK> {
    #[inline]
    fn pin(&mut self, position: Position) {
        debug_assert_eq!(position, self.position);
        if self.pins == 0 {
            self.pin_in_buf = self.pos_in_buf;
        }
        self.pins += 1;
    }

    #[inline]
    fn unpin(&mut self) {
        debug_assert!(self.pins > 0, "unbalanced marker release");
        self.pins -= 1;
    }

    #[inline]
    fn restore(&mut self, position: Position) {
        let back = self.position.offset() - position.offset();
        debug_assert!(self.pins > 0 && back <= self.pos_in_buf - self.pin_in_buf);
        self.pos_in_buf -= back;
        self.valid_len += back;
        self.position = position;
    }

    #[inline]
    fn consumed_since(&self, start: Position) -> &[u8] {
        let len = self.position.offset() - start.offset();
        &self.buf[self.pos_in_buf - len..self.pos_in_buf]
    }
}

impl<const CHUNK: usize> Input for BufferInput<'_, CHUNK> {
    #[inline]
    fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    fn position(&self) -> Position {
        self.position
    }

    #[inline]
    fn buf(&self) -> &[u8] {
        &self.buf[self.pos_in_buf..self.pos_in_buf + self.valid_len]
    }

    #[inline]
    fn require(&mut self, amount: usize) -> Result<&[u8], Error> {
        if self.valid_len < amount {
            self.require_cold(amount)?;
        }
        Ok(self.buf())
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        if n > self.valid_len {
            advance_cold();
        }
        self.position
            .advance(&self.buf[self.pos_in_buf..self.pos_in_buf + n]);
        self.pos_in_buf += n;
        self.valid_len -= n;
    }

    fn discard(&mut self) {
        self.realign(self.keep_in_buf());
    }

    #[inline]
    fn check_io_error(&mut self) -> io::Result<()> {
        if let Some(err) = self.io_error.take() {
            Err(err)
        } else {
            Ok(())
        }
    }
}

#[inline(never)]
#[cold]
fn advance_cold() -> ! {
    panic!("advanced past the available data");
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::InnerError;

    /// Hands out the data in pieces of at most `step` bytes, logging each request size.
    struct Trickle<'r> {
        data: &'r [u8],
        step: usize,
        requests: Vec<usize>,
    }

    impl Read for &mut Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.requests.push(buf.len());
            let data = self.data;
            let n = buf.len().min(self.step).min(data.len());
            buf[..n].copy_from_slice(&data[..n]);
            self.data = &data[n..];
            Ok(n)
        }
    }

    #[test]
    fn require_reads_lazily() -> Result<(), Error> {
        let mut trickle = Trickle {
            data: b"abcdefgh",
            step: 8,
            requests: vec![],
        };
        let mut input = BufferInput::<4>::from_read("test", 8, &mut trickle);

        assert_eq!(input.require(1)?, b"abcd");
        assert_eq!(input.require(3)?, b"abcd");
        assert_eq!(input.require(5)?, b"abcdefgh");
        assert_eq!(input.require(9)?, b"abcdefgh");
        assert!(input.is_complete());
        drop(input);
        assert!(trickle.requests.iter().all(|&len| len <= 4));
        Ok(())
    }

    #[test]
    fn releases_data_behind_cursor() -> Result<(), Error> {
        let data = vec![b'x'; 1000];
        let mut input = BufferInput::<4>::from_read("test", 4, &data[..]);
        for _ in 0..1000 {
            assert_eq!(input.require(1)?.first(), Some(&b'x'));
            input.advance(1);
            assert!(input.retained() <= input.capacity());
        }
        assert!(input.is_at_end()?);
        assert_eq!(input.position().offset(), 1000);
        Ok(())
    }

    #[test]
    fn marker_retains_data() -> Result<(), Error> {
        let data = b"0123456789";
        let mut input = BufferInput::<2>::from_read("test", 6, &data[..]);
        input.require(1)?;
        input.advance(1);

        let mut m = input.mark();
        for _ in 0..8 {
            m.require(1)?;
            m.advance(1);
        }
        assert_eq!(m.consumed(), b"12345678");
        assert_eq!(m.retained(), 8);
        assert_matches!(
            *m.require(1).unwrap_err(),
            InnerError::BufferExhausted(BufferExhausted {
                required: 9,
                capacity: 8,
                ..
            })
        );
        m.discard();
        assert_eq!(m.consumed(), b"12345678");
        drop(m);

        assert_eq!(input.position().offset(), 1);
        assert_eq!(input.require(2)?, b"12345678");
        Ok(())
    }

    #[test]
    fn maximum_is_a_lower_bound() -> Result<(), Error> {
        let data = b"0123456789";
        let mut input = BufferInput::<2>::from_read("test", 4, &data[..]);
        assert_eq!(input.capacity(), 6);

        let mut m = input.mark();
        for _ in 0..6 {
            m.require(1)?;
            m.advance(1);
        }
        assert_eq!(m.retained(), 6);
        assert_matches!(
            *m.require(1).unwrap_err(),
            InnerError::BufferExhausted(BufferExhausted {
                required: 7,
                capacity: 6,
                ..
            })
        );
        Ok(())
    }

    #[test]
    fn end_of_input_is_not_exhaustion() -> Result<(), Error> {
        let mut input = BufferInput::<2>::from_read("test", 1, &b"ab"[..]);
        let mut m = input.mark();
        m.require(2)?;
        m.advance(2);
        assert!(!m.is_complete());
        assert!(m.is_at_end()?);
        assert!(m.is_complete());
        drop(m);

        // Without room for one more byte, the end cannot be detected.
        let mut input = BufferInput::<2>::from_read("test", 0, &b"ab"[..]);
        let mut m = input.mark();
        m.require(2)?;
        m.advance(2);
        assert_matches!(*m.is_at_end().unwrap_err(), InnerError::BufferExhausted(_));
        Ok(())
    }

    #[test]
    fn deferred_io_error() {
        struct Failing;

        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
            }
        }

        let mut input = BufferInput::<8>::from_read("test", 8, Failing);
        assert_eq!(input.require(1).ok().map(<[u8]>::len), Some(0));
        assert!(input.io_error().is_some());
        assert_matches!(*input.give_up("unexpected".into()), InnerError::Io(_));
        assert!(input.check_io_error().is_ok());
    }

    #[test]
    fn keeps_buffered_reader_contents() -> Result<(), Error> {
        use std::io::BufRead;

        let mut buf_reader = BufReader::with_capacity(4, &b"hello world"[..]);
        assert_eq!(buf_reader.fill_buf()?, b"hell");
        let mut input = BufferInput::<64>::from_buf_reader("test", 64, buf_reader);
        assert_eq!(input.require(11)?, b"hello world");
        Ok(())
    }
}
