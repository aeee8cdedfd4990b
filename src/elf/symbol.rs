use super::ElfError;
use crate::serializable::{c_str_at, le_u16, le_u32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    NoType,
    Object,
    Func,
    Section,
    File,
    Common,
    Tls,
    Other(u8),
}

pub const SHN_UNDEF: u16 = 0;
pub const SHN_ABS: u16 = 0xfff1;

/// An `Elf32_Sym` with its name resolved against the linked string table.
///
/// `name` is `None` when `st_name` points outside the string table or the
/// string there is not terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElfSymbol<'a> {
    pub name: Option<&'a [u8]>,
    pub value: u32,
    pub size: u32,
    pub info: u8,
    pub other: u8,
    pub shndx: u16,
}

impl<'a> ElfSymbol<'a> {
    pub const SIZE: usize = 16;

    pub fn parse(entry: &[u8], strtab: &'a [u8]) -> Result<Self, ElfError> {
        if entry.len() < Self::SIZE {
            return Err(ElfError::Truncated {
                what: "symbol table entry",
                offset: 0,
                size: Self::SIZE as u64,
                file_size: entry.len(),
            });
        }

        Ok(ElfSymbol {
            name: c_str_at(strtab, le_u32(entry, 0) as usize),
            value: le_u32(entry, 4),
            size: le_u32(entry, 8),
            info: entry[12],
            other: entry[13],
            shndx: le_u16(entry, 14),
        })
    }

    pub fn symbol_type(&self) -> SymbolType {
        match self.info & 0xf {
            0 => SymbolType::NoType,
            1 => SymbolType::Object,
            2 => SymbolType::Func,
            3 => SymbolType::Section,
            4 => SymbolType::File,
            5 => SymbolType::Common,
            6 => SymbolType::Tls,
            t => SymbolType::Other(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRTAB: &[u8] = b"\0main\0";

    #[test]
    fn parses_entry() {
        let entry: &[u8] = &[
            1, 0, 0, 0, // name
            0x01, 0x01, 0, 0x07, // value
            0x20, 0, 0, 0, // size
            0x12, // info = STB_GLOBAL | STT_FUNC
            0,    // other
            1, 0, // shndx
        ];

        let sym = ElfSymbol::parse(entry, STRTAB).unwrap();
        assert_eq!(sym.name, Some(&b"main"[..]));
        assert_eq!(sym.value, 0x0700_0101);
        assert_eq!(sym.size, 0x20);
        assert_eq!(sym.symbol_type(), SymbolType::Func);
        assert_eq!(sym.shndx, 1);
    }

    #[test]
    fn unresolvable_name() {
        let mut entry = [0u8; 16];
        entry[0] = 0x40;
        let sym = ElfSymbol::parse(&entry, STRTAB).unwrap();
        assert_eq!(sym.name, None);
    }
}
