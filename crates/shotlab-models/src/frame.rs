//! Raw video frame handles.

use std::sync::Arc;

/// A raw video frame as produced by the external frame source.
///
/// The pixel payload is behind an `Arc`, so cloning a `Frame` clones a
/// handle, not the pixels. The capture ring and an active-recording
/// snapshot can therefore share payloads without copying, and ownership
/// of a finished capture transfers to the analysis task as a plain `Vec`.
#[derive(Debug, Clone)]
pub struct Frame {
    data: Arc<[u8]>,
}

impl Frame {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Frame {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Frame {}
