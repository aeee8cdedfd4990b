//! Minimal reader for 32-bit little-endian ARM ELF images.
//!
//! Only the section header table and the symbol tables are decoded; program
//! headers, relocations and dynamic linking information are never looked at.

pub use section::{SectionFlags, SectionHeader, SectionType};
pub use symbol::{ElfSymbol, SymbolType, SHN_ABS, SHN_UNDEF};

use log::trace;
use thiserror::Error;

use crate::serializable::{c_str_at, le_u16, le_u32};

#[cfg(test)]
pub(crate) mod fixture;
pub mod ident;
pub mod section;
pub mod symbol;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElfError {
    #[error("not an ELF image")]
    InvalidMagic,
    #[error("unsupported ELF class {0} (expected 32-bit)")]
    UnsupportedClass(u8),
    #[error("unsupported ELF data encoding {0} (expected little endian)")]
    UnsupportedEncoding(u8),
    #[error("unsupported ELF version {0}")]
    UnsupportedVersion(u8),
    #[error("unsupported machine {0} (expected ARM)")]
    UnsupportedMachine(u16),
    #[error("unexpected section header size {0}")]
    InvalidSectionHeaderSize(u16),
    #[error("section index {0} out of range")]
    InvalidSectionIndex(usize),
    #[error("section name offset {0:#x} out of range")]
    InvalidSectionName(u32),
    #[error("symbol table `{section}` has entry size {entsize}")]
    InvalidSymbolEntrySize { section: String, entsize: u32 },
    #[error("symbol table `{section}` links to `{link}`, which is not a string table")]
    InvalidStringTable { section: String, link: String },
    #[error("{kind} sections `{first}` and `{second}` overlap")]
    OverlappingSections {
        kind: &'static str,
        first: String,
        second: String,
    },
    #[error("{kind} section `{second}` starts {gap:#x} bytes past `{first}`")]
    SegmentGap {
        kind: &'static str,
        first: String,
        second: String,
        gap: u32,
    },
    #[error("symbol table `{section}` is {size} bytes, not a whole number of entries")]
    InvalidSymbolTableSize { section: String, size: u32 },
    #[error("{what} ({size} bytes at {offset:#x}) extends past the end of the {file_size}-byte image")]
    Truncated {
        what: &'static str,
        offset: u64,
        size: u64,
        file_size: usize,
    },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Architecture {
    Arm = 40,
}

impl TryFrom<u16> for Architecture {
    type Error = ElfError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            40 => Ok(Architecture::Arm),
            v => Err(ElfError::UnsupportedMachine(v)),
        }
    }
}

const ELF_HEADER_SIZE: usize = 52;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElfSection<'a> {
    pub name: String,
    pub header: SectionHeader,
    /// File content; empty for `SHT_NOBITS` sections.
    pub content: &'a [u8],
}

#[derive(Debug)]
pub struct ElfImage<'a> {
    pub architecture: Architecture,
    pub entry: u32,
    sections: Vec<ElfSection<'a>>,
}

impl<'a> ElfImage<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, ElfError> {
        ident::check_ident(data)?;
        check_extent(data, "ELF header", 0, ELF_HEADER_SIZE as u64)?;

        let architecture = Architecture::try_from(le_u16(data, 18))?;
        let entry = le_u32(data, 24);
        let shoff = le_u32(data, 32) as u64;
        let shentsize = le_u16(data, 46);
        let shnum = le_u16(data, 48) as usize;
        let shstrndx = le_u16(data, 50) as usize;

        if shnum == 0 {
            return Ok(ElfImage {
                architecture,
                entry,
                sections: Vec::new(),
            });
        }
        if shentsize as usize != SectionHeader::SIZE {
            return Err(ElfError::InvalidSectionHeaderSize(shentsize));
        }
        check_extent(
            data,
            "section header table",
            shoff,
            (shnum * SectionHeader::SIZE) as u64,
        )?;

        let mut headers = Vec::with_capacity(shnum);
        for idx in 0..shnum {
            let start = shoff as usize + idx * SectionHeader::SIZE;
            headers.push(SectionHeader::parse(&data[start..])?);
        }

        let mut contents = Vec::with_capacity(shnum);
        for header in &headers {
            if header.has_file_content() {
                contents.push(section_content(data, header)?);
            } else {
                contents.push(&data[..0]);
            }
        }

        // SHN_UNDEF: the image carries no section names
        let shstrtab = match shstrndx {
            0 => None,
            idx => Some(
                *contents
                    .get(idx)
                    .ok_or(ElfError::InvalidSectionIndex(idx))?,
            ),
        };

        let mut sections = Vec::with_capacity(shnum);
        for (header, content) in headers.into_iter().zip(contents) {
            let name = match shstrtab {
                Some(shstrtab) => {
                    let name = c_str_at(shstrtab, header.name as usize)
                        .ok_or(ElfError::InvalidSectionName(header.name))?;
                    String::from_utf8_lossy(name).into_owned()
                }
                None => String::new(),
            };
            sections.push(ElfSection {
                name,
                header,
                content,
            });
        }

        trace!("parsed {} section headers", sections.len());

        Ok(ElfImage {
            architecture,
            entry,
            sections,
        })
    }

    pub fn sections(&self) -> &[ElfSection<'a>] {
        &self.sections
    }

    /// All entries of every `SHT_SYMTAB` section, null entries included.
    pub fn symbols(&self) -> Result<Vec<ElfSymbol<'a>>, ElfError> {
        let mut symbols = Vec::new();

        for section in &self.sections {
            if section.header.section_type != SectionType::Symtab {
                continue;
            }
            if section.header.entsize as usize != ElfSymbol::SIZE {
                return Err(ElfError::InvalidSymbolEntrySize {
                    section: section.name.clone(),
                    entsize: section.header.entsize,
                });
            }

            let link = section.header.link as usize;
            let strtab = self
                .sections
                .get(link)
                .ok_or(ElfError::InvalidSectionIndex(link))?;
            if strtab.header.section_type != SectionType::Strtab {
                return Err(ElfError::InvalidStringTable {
                    section: section.name.clone(),
                    link: strtab.name.clone(),
                });
            }

            if section.content.len() % ElfSymbol::SIZE != 0 {
                return Err(ElfError::InvalidSymbolTableSize {
                    section: section.name.clone(),
                    size: section.header.size,
                });
            }

            let entries = section.content.chunks_exact(ElfSymbol::SIZE);
            for entry in entries {
                symbols.push(ElfSymbol::parse(entry, strtab.content)?);
            }
        }

        Ok(symbols)
    }
}

fn check_extent(data: &[u8], what: &'static str, offset: u64, size: u64) -> Result<(), ElfError> {
    if offset + size > data.len() as u64 {
        return Err(ElfError::Truncated {
            what,
            offset,
            size,
            file_size: data.len(),
        });
    }
    Ok(())
}

fn section_content<'a>(data: &'a [u8], header: &SectionHeader) -> Result<&'a [u8], ElfError> {
    let offset = header.offset as u64;
    let size = header.size as u64;
    check_extent(data, "section content", offset, size)?;
    Ok(&data[offset as usize..(offset + size) as usize])
}
