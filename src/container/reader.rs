use super::header::{ContainerHeader, Region};
use crate::executable::{Symbol, SymbolEntry, SymbolTable};
use crate::metadata::Version;
use crate::serializable::{le_u32, Serializable, SerializationError};

/// A decoded container, rebuilt from nothing but its own header offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub header: ContainerHeader,
    pub author: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub targets: Vec<u32>,
    pub code: Vec<u8>,
    pub rodata: Vec<u8>,
    pub data: Vec<u8>,
    pub bss_size: u32,
    pub symbols: Vec<Symbol>,
}

impl Container {
    pub fn version(&self) -> Version {
        Version::unpack(self.header.version)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, SerializationError> {
        let (_, header) = ContainerHeader::deserialize(data)?;

        let infos = &header.infos;
        let author = read_string(data, "author", &infos.author)?;
        let title = read_string(data, "title", &infos.title)?;
        let summary = read_string(data, "summary", &infos.summary)?;
        let description = read_string(data, "description", &infos.description)?;

        let targets = Region::new(
            header.targets.count.saturating_mul(4),
            header.targets.offset,
        );
        let targets = slice(data, "targets", &targets)?
            .chunks_exact(4)
            .map(|id| le_u32(id, 0))
            .collect();

        let executable = &header.executable;
        let code = slice(data, "code", &executable.code)?.to_vec();
        let rodata = slice(data, "rodata", &executable.rodata)?.to_vec();
        let segment_data = slice(data, "data", &executable.data)?.to_vec();

        let symtable = &header.symtable;
        let symbols = if symtable.count == 0 {
            Vec::new()
        } else {
            let entries = Region::new(
                symtable
                    .count
                    .saturating_mul(SymbolEntry::SIZE as u32),
                symtable.symbols_offset,
            );
            let entries = slice(data, "symbols", &entries)?;
            let names = data.get(symtable.name_table_offset as usize..).ok_or(
                SerializationError::RegionOutOfBounds {
                    region: "symbol names",
                    offset: symtable.name_table_offset,
                    size: 0,
                },
            )?;
            SymbolTable::deserialize(entries, symtable.count, names)?.symbols()
        };

        Ok(Container {
            header,
            author,
            title,
            summary,
            description,
            targets,
            code,
            rodata,
            data: segment_data,
            bss_size: executable.bss_size,
            symbols,
        })
    }
}

fn slice<'a>(
    data: &'a [u8],
    region_name: &'static str,
    region: &Region,
) -> Result<&'a [u8], SerializationError> {
    if region.is_empty() {
        return Ok(&[]);
    }
    let out_of_bounds = SerializationError::RegionOutOfBounds {
        region: region_name,
        offset: region.offset,
        size: region.size,
    };
    if region.end() > data.len() as u64 {
        return Err(out_of_bounds);
    }
    Ok(&data[region.offset as usize..region.end() as usize])
}

fn read_string(
    data: &[u8],
    field: &'static str,
    region: &Region,
) -> Result<Option<String>, SerializationError> {
    let bytes = slice(data, field, region)?;
    match bytes.split_last() {
        None => Ok(None),
        Some((0, text)) => match std::str::from_utf8(text) {
            Ok(text) if !text.contains('\0') => Ok(Some(text.to_string())),
            _ => Err(SerializationError::InvalidString(field)),
        },
        Some(_) => Err(SerializationError::InvalidString(field)),
    }
}
