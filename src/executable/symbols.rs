use bitflags::bitflags;
use log::trace;

use crate::address::Address;
use crate::elf::{ElfError, ElfImage, ElfSymbol, SymbolType, SHN_UNDEF};
use crate::serializable::{c_str_at, le_u16, le_u32, Serializable, SerializationError};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u16 {
        const DATA = 1 << 0;
        const FUNC = 1 << 1;
        /// The routine runs in Thumb state.
        const THUMB = 1 << 2;
        /// The stored name is not the symbol's original name.
        const ALTNAME = 1 << 3;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub address: Address,
    /// 0 when unknown or too large to store.
    pub size: u16,
    pub flags: SymbolFlags,
}

impl Symbol {
    /// Converts a symbol table entry, or returns `None` for entries that have
    /// no meaning at run time.
    pub fn from_elf(symbol: &ElfSymbol<'_>) -> Option<Symbol> {
        let kind = match symbol.symbol_type() {
            SymbolType::Func => SymbolFlags::FUNC,
            SymbolType::Object | SymbolType::NoType => SymbolFlags::DATA,
            _ => return None,
        };
        if symbol.value == 0 || symbol.shndx == SHN_UNDEF {
            return None;
        }

        let raw = Address(symbol.value);
        let mut flags = kind;
        let address = if kind == SymbolFlags::FUNC && raw.is_thumb() {
            flags |= SymbolFlags::THUMB;
            raw.without_thumb_bit()
        } else {
            raw
        };

        let name = match symbol.name {
            Some([]) => return None,
            // ARM mapping symbols ($a, $t, $d, $t.1, ...) only mark instruction set boundaries
            Some([b'$', ..]) => return None,
            Some(name) => match std::str::from_utf8(name) {
                Ok(name) => match demangled(name) {
                    Some(pretty) => {
                        flags |= SymbolFlags::ALTNAME;
                        pretty
                    }
                    None => name.to_string(),
                },
                Err(_) => {
                    flags |= SymbolFlags::ALTNAME;
                    synthesized_name(kind, address)
                }
            },
            None => {
                flags |= SymbolFlags::ALTNAME;
                synthesized_name(kind, address)
            }
        };

        Some(Symbol {
            name,
            address,
            size: u16::try_from(symbol.size).unwrap_or(0),
            flags,
        })
    }
}

fn demangled(name: &str) -> Option<String> {
    let demangled = rustc_demangle::try_demangle(name).ok()?;
    let pretty = format!("{:#}", demangled);
    (pretty != name).then_some(pretty)
}

fn synthesized_name(kind: SymbolFlags, address: Address) -> String {
    if kind == SymbolFlags::FUNC {
        format!("sub_{:08X}", address.0)
    } else {
        format!("data_{:08X}", address.0)
    }
}

/// Runtime-relevant symbols of an image, in symbol table order.
pub fn extract(elf: &ElfImage<'_>) -> Result<Vec<Symbol>, ElfError> {
    let mut symbols = Vec::new();
    for symbol in elf.symbols()? {
        match Symbol::from_elf(&symbol) {
            Some(symbol) => symbols.push(symbol),
            None => trace!("skipping symbol {:?} at {:#010x}", symbol.name, symbol.value),
        }
    }
    Ok(symbols)
}

/// A fixed 12-byte symbol record of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub address: Address,
    pub size: u16,
    pub flags: SymbolFlags,
    /// Relative to the start of the name table.
    pub name_offset: u32,
}

impl SymbolEntry {
    pub const SIZE: usize = 12;
}

impl Serializable for SymbolEntry {
    fn serialize(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::SIZE);
        data.extend(self.address.0.to_le_bytes());
        data.extend(self.size.to_le_bytes());
        data.extend(self.flags.bits().to_le_bytes());
        data.extend(self.name_offset.to_le_bytes());
        data
    }

    fn deserialize(data: &[u8]) -> Result<(usize, Self), SerializationError> {
        if data.len() < Self::SIZE {
            return Err(SerializationError::DataTooShort);
        }

        Ok((
            Self::SIZE,
            SymbolEntry {
                address: Address(le_u32(data, 0)),
                size: le_u16(data, 4),
                flags: SymbolFlags::from_bits_retain(le_u16(data, 6)),
                name_offset: le_u32(data, 8),
            },
        ))
    }
}

/// Symbol records plus the name table they point into.
///
/// Names are appended once per symbol; identical names are not shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    names: Vec<u8>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            entries: Vec::new(),
            names: Vec::new(),
        }
    }

    pub fn add_symbol(&mut self, symbol: &Symbol) {
        let name_offset = self.names.len() as u32;
        self.names.extend(symbol.name.as_bytes());
        self.names.push(0); // null terminator

        self.entries.push(SymbolEntry {
            address: symbol.address,
            size: symbol.size,
            flags: symbol.flags,
            name_offset,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn names(&self) -> &[u8] {
        &self.names
    }

    /// The symbol record array.
    pub fn serialize_entries(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.entries.len() * SymbolEntry::SIZE);
        for entry in &self.entries {
            data.extend(entry.serialize());
        }
        data
    }

    /// Decodes `count` records from `entries`. The name table has no stored
    /// length, so `names` runs to wherever the caller knows it ends.
    pub fn deserialize(
        entries: &[u8],
        count: u32,
        names: &[u8],
    ) -> Result<Self, SerializationError> {
        let mut table = SymbolTable::new();
        let mut offset = 0;
        let mut names_end = 0;

        for _ in 0..count {
            let (size, entry) = SymbolEntry::deserialize(&entries[offset.min(entries.len())..])?;
            offset += size;

            let name = c_str_at(names, entry.name_offset as usize)
                .ok_or(SerializationError::InvalidNameOffset(entry.name_offset))?;
            names_end = names_end.max(entry.name_offset as usize + name.len() + 1);
            table.entries.push(entry);
        }

        table.names = names[..names_end].to_vec();
        Ok(table)
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.entries
            .iter()
            .map(|entry| {
                let name = c_str_at(&self.names, entry.name_offset as usize).unwrap_or_default();
                Symbol {
                    name: String::from_utf8_lossy(name).into_owned(),
                    address: entry.address,
                    size: entry.size,
                    flags: entry.flags,
                }
            })
            .collect()
    }
}

impl<'a> FromIterator<&'a Symbol> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = &'a Symbol>>(iter: I) -> Self {
        let mut table = SymbolTable::new();
        for symbol in iter {
            table.add_symbol(symbol);
        }
        table
    }
}
