use std::io;

use thiserror::Error;

use crate::elf::ElfError;
use crate::executable::SegmentKind;

/// Terminal failures of a conversion. Nothing is retried.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unsupported executable: {0}")]
    Format(ElfError),
    #[error("truncated executable: {0}")]
    TruncatedImage(ElfError),
    #[error("executable has no code section")]
    MissingSegment,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("cannot encode {0}")]
    Encoding(String),
    #[error("{kind} transform failed: {source}")]
    Transform {
        kind: SegmentKind,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ElfError> for ConvertError {
    fn from(error: ElfError) -> Self {
        match error {
            ElfError::Truncated { .. } => ConvertError::TruncatedImage(error),
            error => ConvertError::Format(error),
        }
    }
}

/// Narrows a position or length to the container's 32-bit fields.
pub(crate) fn to_u32(
    value: impl TryInto<u32> + Copy + std::fmt::Display,
    what: &str,
) -> Result<u32, ConvertError> {
    value
        .try_into()
        .map_err(|_| ConvertError::Encoding(format!("{what} {value} (exceeds 32 bits)")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elf_truncation_is_its_own_kind() {
        let truncated = ElfError::Truncated {
            what: "section content",
            offset: 0x40,
            size: 0x100,
            file_size: 0x80,
        };
        assert!(matches!(
            ConvertError::from(truncated),
            ConvertError::TruncatedImage(_)
        ));
        assert!(matches!(
            ConvertError::from(ElfError::InvalidMagic),
            ConvertError::Format(ElfError::InvalidMagic)
        ));
    }

    #[test]
    fn narrows_to_u32() {
        assert_eq!(to_u32(42u64, "offset").unwrap(), 42);
        let err = to_u32(0x1_0000_0000u64, "offset").unwrap_err();
        assert_eq!(err.to_string(), "cannot encode offset 4294967296 (exceeds 32 bits)");
    }
}
