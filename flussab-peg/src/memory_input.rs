use crate::{input::sealed::Sealed, Error, Input, Position};

/// An [`Input`] for data that is completely available in memory.
///
/// As all data is always available, requesting data from a `MemoryInput` never fails.
pub struct MemoryInput<'a> {
    data: &'a [u8],
    position: Position,
    source: String,
    pins: usize,
}

impl<'a> MemoryInput<'a> {
    /// Creates a [`MemoryInput`] for the given data, labeled as `source` in diagnostics.
    pub fn new(source: impl Into<String>, data: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        MemoryInput {
            data: data.as_ref(),
            position: Position::new(),
            source: source.into(),
            pins: 0,
        }
    }

    /// Returns the data that was not advanced over yet.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position.offset()..]
    }
}

impl Sealed for MemoryInput<'_> {
    #[inline]
    fn pin(&mut self, _position: Position) {
        self.pins += 1;
    }

    #[inline]
    fn unpin(&mut self) {
        debug_assert!(self.pins > 0, "unbalanced marker release");
        self.pins -= 1;
    }

    #[inline]
    fn restore(&mut self, position: Position) {
        debug_assert!(position.offset() <= self.position.offset());
        self.position = position;
    }

    #[inline]
    fn consumed_since(&self, start: Position) -> &[u8] {
        &self.data[start.offset()..self.position.offset()]
    }
}

impl Input for MemoryInput<'_> {
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
        self.remaining()
    }

    #[inline]
    fn require(&mut self, _amount: usize) -> Result<&[u8], Error> {
        Ok(self.remaining())
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        let offset = self.position.offset();
        let bytes = match self.data.get(offset..offset + n) {
            Some(bytes) => bytes,
            None => panic!("advanced past the end of the input"),
        };
        self.position.advance(bytes);
    }

    #[inline]
    fn discard(&mut self) {}
}
