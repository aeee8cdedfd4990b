use super::ElfError;

pub const ELF_IDENT_SIZE: usize = 16;

const MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

// offset definition
const OFF_CLASS: usize = 4;
const OFF_DATA: usize = 5;
const OFF_VERSION: usize = 6;
// ABI fields are ignored, the loader does not look at them either

const CLASS32: u8 = 1;
const DATA2LSB: u8 = 1;
const EV_CURRENT: u8 = 1;

/// Accepts only 32-bit little-endian images, the single flavour the loader runs.
pub fn check_ident(data: &[u8]) -> Result<(), ElfError> {
    if data.len() < ELF_IDENT_SIZE {
        return Err(ElfError::Truncated {
            what: "ELF identification",
            offset: 0,
            size: ELF_IDENT_SIZE as u64,
            file_size: data.len(),
        });
    }

    if data[..4] != MAGIC {
        return Err(ElfError::InvalidMagic);
    }
    if data[OFF_CLASS] != CLASS32 {
        return Err(ElfError::UnsupportedClass(data[OFF_CLASS]));
    }
    if data[OFF_DATA] != DATA2LSB {
        return Err(ElfError::UnsupportedEncoding(data[OFF_DATA]));
    }
    if data[OFF_VERSION] != EV_CURRENT {
        return Err(ElfError::UnsupportedVersion(data[OFF_VERSION]));
    }

    Ok(())
}
