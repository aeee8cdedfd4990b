//! Hand-assembled ELF32 little-endian images for tests.
//!
//! Layout: ELF header, section contents in declaration order, `.symtab` and
//! `.strtab` (only when symbols were added), `.shstrtab`, then the section
//! header table. User sections get indices starting at 1.
#![allow(dead_code)]

pub const SHF_WRITE: u32 = 0x1;
pub const SHF_ALLOC: u32 = 0x2;
pub const SHF_EXECINSTR: u32 = 0x4;

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_ARM_ATTRIBUTES: u32 = 0x7000_0003;

pub const STT_NOTYPE: u8 = 0;
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;
pub const STT_SECTION: u8 = 3;
pub const STT_FILE: u8 = 4;
pub const STB_LOCAL: u8 = 0x00;
pub const STB_GLOBAL: u8 = 0x10;

const EM_ARM: u16 = 40;
const EHDR_SIZE: usize = 52;
const SHDR_SIZE: usize = 40;
const SYM_SIZE: usize = 16;

struct FixtureSection {
    name: String,
    sh_type: u32,
    flags: u32,
    addr: u32,
    data: Vec<u8>,
    nobits_size: u32,
}

struct FixtureSymbol {
    name: Result<String, u32>,
    value: u32,
    size: u32,
    info: u8,
    shndx: u16,
}

pub struct ElfBuilder {
    machine: u16,
    sections: Vec<FixtureSection>,
    symbols: Vec<FixtureSymbol>,
}

impl ElfBuilder {
    pub fn new() -> Self {
        ElfBuilder {
            machine: EM_ARM,
            sections: Vec::new(),
            symbols: Vec::new(),
        }
    }

    pub fn machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    pub fn progbits(self, name: &str, flags: u32, addr: u32, data: Vec<u8>) -> Self {
        self.section(name, SHT_PROGBITS, flags, addr, data)
    }

    pub fn section(mut self, name: &str, sh_type: u32, flags: u32, addr: u32, data: Vec<u8>) -> Self {
        self.sections.push(FixtureSection {
            name: name.to_string(),
            sh_type,
            flags,
            addr,
            data,
            nobits_size: 0,
        });
        self
    }

    pub fn nobits(mut self, name: &str, flags: u32, addr: u32, size: u32) -> Self {
        self.sections.push(FixtureSection {
            name: name.to_string(),
            sh_type: SHT_NOBITS,
            flags,
            addr,
            data: Vec::new(),
            nobits_size: size,
        });
        self
    }

    pub fn symbol(mut self, name: &str, value: u32, size: u32, info: u8, shndx: u16) -> Self {
        self.symbols.push(FixtureSymbol {
            name: Ok(name.to_string()),
            value,
            size,
            info,
            shndx,
        });
        self
    }

    /// A symbol whose `st_name` is `name_offset` verbatim.
    pub fn raw_symbol(mut self, name_offset: u32, value: u32, size: u32, info: u8, shndx: u16) -> Self {
        self.symbols.push(FixtureSymbol {
            name: Err(name_offset),
            value,
            size,
            info,
            shndx,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0u8; EHDR_SIZE];
        let mut shstrtab = vec![0u8];
        // (name, type, flags, addr, offset, size, link, info, addralign, entsize)
        let mut headers: Vec<[u32; 10]> = vec![[0; 10]];

        for section in &self.sections {
            let name = push_str(&mut shstrtab, &section.name);
            let offset = out.len() as u32;
            let size = if section.sh_type == SHT_NOBITS {
                section.nobits_size
            } else {
                out.extend_from_slice(&section.data);
                section.data.len() as u32
            };
            headers.push([
                name,
                section.sh_type,
                section.flags,
                section.addr,
                offset,
                size,
                0,
                0,
                1,
                0,
            ]);
        }

        if !self.symbols.is_empty() {
            let symtab_index = headers.len() as u32;
            let mut strtab = vec![0u8];
            let mut symtab = vec![0u8; SYM_SIZE];
            for symbol in &self.symbols {
                let name = match &symbol.name {
                    Ok(name) => push_str(&mut strtab, name),
                    Err(offset) => *offset,
                };
                symtab.extend_from_slice(&name.to_le_bytes());
                symtab.extend_from_slice(&symbol.value.to_le_bytes());
                symtab.extend_from_slice(&symbol.size.to_le_bytes());
                symtab.push(symbol.info);
                symtab.push(0);
                symtab.extend_from_slice(&symbol.shndx.to_le_bytes());
            }

            let name = push_str(&mut shstrtab, ".symtab");
            let offset = out.len() as u32;
            out.extend_from_slice(&symtab);
            headers.push([
                name,
                SHT_SYMTAB,
                0,
                0,
                offset,
                symtab.len() as u32,
                symtab_index + 1,
                1,
                4,
                SYM_SIZE as u32,
            ]);

            let name = push_str(&mut shstrtab, ".strtab");
            let offset = out.len() as u32;
            out.extend_from_slice(&strtab);
            headers.push([name, SHT_STRTAB, 0, 0, offset, strtab.len() as u32, 0, 0, 1, 0]);
        }

        let shstrndx = headers.len() as u16;
        let name = push_str(&mut shstrtab, ".shstrtab");
        let offset = out.len() as u32;
        let size = shstrtab.len() as u32;
        out.extend_from_slice(&shstrtab);
        headers.push([name, SHT_STRTAB, 0, 0, offset, size, 0, 0, 1, 0]);

        while out.len() % 4 != 0 {
            out.push(0);
        }
        let shoff = out.len() as u32;
        for header in &headers {
            for field in header {
                out.extend_from_slice(&field.to_le_bytes());
            }
        }

        let mut ehdr = Vec::with_capacity(EHDR_SIZE);
        ehdr.extend_from_slice(&[0x7f, b'E', b'L', b'F', 1, 1, 1, 0]);
        ehdr.extend_from_slice(&[0; 8]);
        ehdr.extend_from_slice(&2u16.to_le_bytes()); // e_type = ET_EXEC
        ehdr.extend_from_slice(&self.machine.to_le_bytes());
        ehdr.extend_from_slice(&1u32.to_le_bytes()); // e_version
        ehdr.extend_from_slice(&0u32.to_le_bytes()); // e_entry
        ehdr.extend_from_slice(&0u32.to_le_bytes()); // e_phoff
        ehdr.extend_from_slice(&shoff.to_le_bytes());
        ehdr.extend_from_slice(&0x0500_0000u32.to_le_bytes()); // e_flags = EABI5
        ehdr.extend_from_slice(&(EHDR_SIZE as u16).to_le_bytes());
        ehdr.extend_from_slice(&0u16.to_le_bytes()); // e_phentsize
        ehdr.extend_from_slice(&0u16.to_le_bytes()); // e_phnum
        ehdr.extend_from_slice(&(SHDR_SIZE as u16).to_le_bytes());
        ehdr.extend_from_slice(&(headers.len() as u16).to_le_bytes());
        ehdr.extend_from_slice(&shstrndx.to_le_bytes());
        out[..EHDR_SIZE].copy_from_slice(&ehdr);

        out
    }
}

fn push_str(table: &mut Vec<u8>, s: &str) -> u32 {
    let offset = table.len() as u32;
    table.extend_from_slice(s.as_bytes());
    table.push(0);
    offset
}

fn patch_section_field(image: &mut [u8], index: usize, field: usize, value: u32) {
    let shoff = u32::from_le_bytes([image[32], image[33], image[34], image[35]]) as usize;
    let at = shoff + index * SHDR_SIZE + field * 4;
    image[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn set_section_size(image: &mut [u8], index: usize, size: u32) {
    patch_section_field(image, index, 5, size);
}

pub fn set_section_entsize(image: &mut [u8], index: usize, entsize: u32) {
    patch_section_field(image, index, 9, entsize);
}

pub fn set_shstrndx(image: &mut [u8], index: u16) {
    image[50..52].copy_from_slice(&index.to_le_bytes());
}
