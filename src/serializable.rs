use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SerializationError {
    #[error("invalid container magic {0:#018x}")]
    InvalidMagic(u64),
    #[error("data too short")]
    DataTooShort,
    #[error("{region} region ({size} bytes at {offset:#x}) lies outside the container")]
    RegionOutOfBounds {
        region: &'static str,
        offset: u32,
        size: u32,
    },
    #[error("{0} string is not NUL-terminated UTF-8")]
    InvalidString(&'static str),
    #[error("symbol name offset {0:#x} lies outside the name table")]
    InvalidNameOffset(u32),
}

/// Fixed-layout records of the container format.
///
/// `deserialize` returns the number of bytes consumed along with the value.
pub trait Serializable: Sized {
    fn serialize(&self) -> Vec<u8>;
    fn deserialize(data: &[u8]) -> Result<(usize, Self), SerializationError>;
}

// Callers check the length before reading.
pub(crate) fn le_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

pub(crate) fn le_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

pub(crate) fn le_u64(data: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
        data[offset + 4],
        data[offset + 5],
        data[offset + 6],
        data[offset + 7],
    ])
}

/// Reads the NUL-terminated string starting at `offset`, without the terminator.
pub(crate) fn c_str_at(data: &[u8], offset: usize) -> Option<&[u8]> {
    let tail = data.get(offset..)?;
    let end = tail.iter().position(|&b| b == 0)?;
    Some(&tail[..end])
}
