use crate::executable::SegmentKind;

/// A byte transformation applied to each loadable segment before it is
/// written, e.g. encryption.
///
/// Called at most once per non-empty code, rodata and data segment; the
/// container records the length of the returned bytes.
pub trait SegmentTransform {
    fn transform(
        &self,
        kind: SegmentKind,
        data: &[u8],
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> SegmentTransform for F
where
    F: Fn(SegmentKind, &[u8]) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>,
{
    fn transform(
        &self,
        kind: SegmentKind,
        data: &[u8],
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        self(kind, data)
    }
}
