//! Data sources for [`BufferInput`][crate::BufferInput].
//!
//! Any [`Read`] instance can be used as a data source. This module contains adapters for sources
//! that are not already available as [`Read`] instance.
use std::io::{self, Read};

/// Creates a [`Read`] instance from a generator function.
///
/// The function is called with a buffer to fill and returns the number of bytes it wrote into
/// that buffer. Returning `Ok(0)` signals the end of the data, after which the function is not
/// called again.
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
{
    FromFn { f, done: false }
}

/// A [`Read`] instance calling a generator function, see [`from_fn`].
pub struct FromFn<F> {
    f: F,
    done: bool,
}

impl<F> Read for FromFn<F>
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        let n = (self.f)(buf)?;
        self.done = n == 0;
        Ok(n)
    }
}

/// Reads a byte string up to (and excluding) the first NUL byte.
///
/// The data following the first NUL byte is never read, which makes this suitable for data
/// produced by code that uses NUL terminated strings.
pub struct CStrReader<'a> {
    data: &'a [u8],
}

impl<'a> CStrReader<'a> {
    /// Creates a reader for the data in front of the first NUL byte of `data`.
    ///
    /// If `data` contains no NUL byte, all of `data` is read.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl Read for CStrReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        for (target, &byte) in buf.iter_mut().zip(self.data) {
            if byte == 0 {
                self.data = &[];
                break;
            }
            *target = byte;
            n += 1;
        }
        if !self.data.is_empty() {
            self.data = &self.data[n..];
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_stops_after_end() -> io::Result<()> {
        let mut calls = 0;
        let mut reader = from_fn(|buf: &mut [u8]| {
            calls += 1;
            if calls > 2 {
                return Ok(0);
            }
            buf[0] = b'0' + calls;
            Ok(1)
        });
        let mut out = vec![];
        reader.read_to_end(&mut out)?;
        assert_eq!(out, b"12");
        assert_eq!(reader.read(&mut [0; 4])?, 0);
        drop(reader);
        assert_eq!(calls, 3);
        Ok(())
    }

    #[test]
    fn cstr_stops_at_nul() -> io::Result<()> {
        let mut reader = CStrReader::new(b"abc\0def");
        let mut buf = [0; 2];
        assert_eq!(reader.read(&mut buf)?, 2);
        assert_eq!(&buf, b"ab");
        assert_eq!(reader.read(&mut buf)?, 1);
        assert_eq!(buf[0], b'c');
        assert_eq!(reader.read(&mut buf)?, 0);

        let mut out = vec![];
        CStrReader::new(b"no terminator").read_to_end(&mut out)?;
        assert_eq!(out, b"no terminator");
        Ok(())
    }
}
