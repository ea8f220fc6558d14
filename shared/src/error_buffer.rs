use std::slice::Iter;

use log::trace;

use crate::LockstepError;

/// Errors recorded since the last drain.
///
/// Nothing bounds the buffer; whoever owns it is expected to drain it after
/// each serialize, deserialize or tick.
#[derive(Debug, Default)]
pub struct ErrorBuffer {
    records: Vec<LockstepError>,
}

impl ErrorBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: LockstepError) {
        trace!("recorded error: {}", error);
        self.records.push(error);
    }

    /// Takes every recorded error, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<LockstepError> {
        std::mem::take(&mut self.records)
    }

    pub fn iter(&self) -> Iter<'_, LockstepError> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a ErrorBuffer {
    type Item = &'a LockstepError;
    type IntoIter = Iter<'a, LockstepError>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
