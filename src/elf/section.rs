use bitflags::bitflags;

use super::ElfError;
use crate::serializable::le_u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    Null,
    Progbits,
    Symtab,
    Strtab,
    Rela,
    Hash,
    Dynamic,
    Note,
    Nobits,
    Rel,
    Dynsym,
    InitArray,
    FiniArray,
    PreinitArray,
    ArmExidx,
    ArmAttributes,
    Other(u32),
}

impl From<u32> for SectionType {
    fn from(value: u32) -> Self {
        match value {
            0 => SectionType::Null,
            1 => SectionType::Progbits,
            2 => SectionType::Symtab,
            3 => SectionType::Strtab,
            4 => SectionType::Rela,
            5 => SectionType::Hash,
            6 => SectionType::Dynamic,
            7 => SectionType::Note,
            8 => SectionType::Nobits,
            9 => SectionType::Rel,
            11 => SectionType::Dynsym,
            14 => SectionType::InitArray,
            15 => SectionType::FiniArray,
            16 => SectionType::PreinitArray,
            0x7000_0001 => SectionType::ArmExidx,
            0x7000_0003 => SectionType::ArmAttributes,
            v => SectionType::Other(v),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SectionFlags: u32 {
        const WRITE = 0x1;
        const ALLOC = 0x2;
        const EXECINSTR = 0x4;
        const MERGE = 0x10;
        const STRINGS = 0x20;
        const INFO_LINK = 0x40;
        const LINK_ORDER = 0x80;
        const GROUP = 0x200;
        const TLS = 0x400;
    }
}

/// An `Elf32_Shdr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    pub name: u32,
    pub section_type: SectionType,
    pub flags: SectionFlags,
    pub addr: u32,
    pub offset: u32,
    pub size: u32,
    pub link: u32,
    pub info: u32,
    pub addralign: u32,
    pub entsize: u32,
}

impl SectionHeader {
    pub const SIZE: usize = 40;

    pub fn parse(data: &[u8]) -> Result<Self, ElfError> {
        if data.len() < Self::SIZE {
            return Err(ElfError::Truncated {
                what: "section header",
                offset: 0,
                size: Self::SIZE as u64,
                file_size: data.len(),
            });
        }

        Ok(SectionHeader {
            name: le_u32(data, 0),
            section_type: SectionType::from(le_u32(data, 4)),
            flags: SectionFlags::from_bits_retain(le_u32(data, 8)),
            addr: le_u32(data, 12),
            offset: le_u32(data, 16),
            size: le_u32(data, 20),
            link: le_u32(data, 24),
            info: le_u32(data, 28),
            addralign: le_u32(data, 32),
            entsize: le_u32(data, 36),
        })
    }

    /// Whether the section occupies bytes in the file (everything but `SHT_NOBITS`).
    pub fn has_file_content(&self) -> bool {
        !matches!(self.section_type, SectionType::Nobits | SectionType::Null)
    }
}
