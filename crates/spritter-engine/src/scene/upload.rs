/// GPU buffer a region is written to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    /// Per-submission payload records.
    Payload,
    /// Vertex stream of `PullerEntry` values.
    Puller,
    /// Persistent geometry words.
    Arena,
}

/// Destination of the per-frame uploads.
///
/// `offset` is in bytes from the start of `buffer`. Called at most once per
/// buffer per frame, and never with an empty region.
pub trait UploadSink {
    fn write_region(&mut self, buffer: BufferKind, offset: u64, bytes: &[u8]);
}

impl<S: UploadSink + ?Sized> UploadSink for &mut S {
    #[inline]
    fn write_region(&mut self, buffer: BufferKind, offset: u64, bytes: &[u8]) {
        (**self).write_region(buffer, offset, bytes);
    }
}
