//! Builders that turn matched lines into definitions.
//!
//! Enum and struct builders accumulate members between an opening and a
//! closing line; the driver keeps at most one of each in an [`Open`] slot.
//! Functions and callbacks are assembled from a single line.

pub mod enums;
pub mod function;
pub mod structs;

pub use enums::EnumBuilder;
pub use function::{assemble_callback, FunctionDefinition, ParameterDefinition};
pub use structs::StructBuilder;

use crate::error::ErrorKind;

/// Holds the single open instance of a multi-line builder.
#[derive(Debug)]
pub struct Open<B> {
    current: Option<(usize, B)>,
}

impl<B> Default for Open<B> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<B> Open<B> {
    pub fn begin(&mut self, line: usize, builder: B) -> Result<(), ErrorKind> {
        if self.current.is_some() {
            return Err(ErrorKind::OverlappedDefinition);
        }
        self.current = Some((line, builder));
        Ok(())
    }

    pub fn get_mut(&mut self) -> Result<&mut B, ErrorKind> {
        self.current
            .as_mut()
            .map(|(_, b)| b)
            .ok_or(ErrorKind::UnmatchedClose)
    }

    pub fn take(&mut self) -> Result<B, ErrorKind> {
        self.current
            .take()
            .map(|(_, b)| b)
            .ok_or(ErrorKind::UnmatchedClose)
    }

    /// Line of the opening construct, while one is open.
    pub fn opened_at(&self) -> Option<usize> {
        self.current.as_ref().map(|(line, _)| *line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_open_instance() {
        let mut slot: Open<u8> = Open::default();
        slot.begin(3, 1).unwrap();
        assert_eq!(slot.begin(4, 2), Err(ErrorKind::OverlappedDefinition));
        assert_eq!(slot.opened_at(), Some(3));
        assert_eq!(slot.take(), Ok(1));
        assert_eq!(slot.take(), Err(ErrorKind::UnmatchedClose));
        assert_eq!(slot.get_mut(), Err(ErrorKind::UnmatchedClose));
    }
}
