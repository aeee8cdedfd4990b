use std::io::{Seek, SeekFrom, Write};

use log::debug;

use super::header::{ContainerHeader, Region, TargetsDescriptor};
use crate::error::to_u32;
use crate::executable::{Executable, SegmentKind};
use crate::metadata::{InfoField, Metadata};
use crate::serializable::Serializable;
use crate::transform::SegmentTransform;
use crate::ConvertError;

/// Streams a container into `out`.
///
/// Every region is appended once; the only backward step is [`finalize`],
/// which rewrites the fixed-size header at offset 0.
///
/// [`finalize`]: ContainerWriter::finalize
pub struct ContainerWriter<'w, W: Write + Seek> {
    out: &'w mut W,
    header: ContainerHeader,
}

impl<'w, W: Write + Seek> ContainerWriter<'w, W> {
    /// Writes the header placeholder. `out` must be positioned at 0.
    pub fn begin(out: &'w mut W, version: u32) -> Result<Self, ConvertError> {
        let mut writer = ContainerWriter {
            out,
            header: ContainerHeader::new(version),
        };
        if writer.position()? != 0 {
            return Err(ConvertError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "container output must start at offset 0",
            )));
        }
        let placeholder = writer.header.serialize();
        writer.out.write_all(&placeholder)?;
        Ok(writer)
    }

    fn position(&mut self) -> Result<u32, ConvertError> {
        let position = self.out.stream_position()?;
        to_u32(position, "file offset")
    }

    /// Appends `parts` back to back and returns where they landed.
    fn append(&mut self, what: &str, parts: &[&[u8]]) -> Result<Region, ConvertError> {
        let offset = self.position()?;
        let mut size = 0u64;
        for part in parts {
            self.out.write_all(part)?;
            size += part.len() as u64;
        }
        let region = Region::new(to_u32(size, what)?, offset);
        debug!("{what}: {} bytes at {:#x}", region.size, region.offset);
        Ok(region)
    }

    /// Title, author, summary, description; each NUL-terminated.
    pub fn write_infos(&mut self, metadata: &Metadata) -> Result<(), ConvertError> {
        for (field, text) in metadata.infos() {
            if text.contains('\0') {
                return Err(ConvertError::Encoding(format!(
                    "{} (contains a NUL byte)",
                    field.name()
                )));
            }
            let region = self.append(field.name(), &[text.as_bytes(), &[0]])?;
            let slot = match field {
                InfoField::Author => &mut self.header.infos.author,
                InfoField::Title => &mut self.header.infos.title,
                InfoField::Summary => &mut self.header.infos.summary,
                InfoField::Description => &mut self.header.infos.description,
            };
            *slot = region;
        }
        Ok(())
    }

    pub fn write_targets(&mut self, targets: &[u32]) -> Result<(), ConvertError> {
        if targets.is_empty() {
            return Ok(());
        }

        let mut data = Vec::with_capacity(targets.len() * 4);
        for target in targets {
            data.extend(target.to_le_bytes());
        }
        let region = self.append("targets", &[&data])?;
        self.header.targets = TargetsDescriptor {
            count: to_u32(targets.len(), "target count")?,
            offset: region.offset,
        };
        Ok(())
    }

    /// Code, rodata, data, then the symbol table and its names when
    /// `include_symbols` is set and there is at least one symbol.
    pub fn write_executable(
        &mut self,
        executable: &Executable,
        include_symbols: bool,
        transform: Option<&dyn SegmentTransform>,
    ) -> Result<(), ConvertError> {
        let segments = executable.segments();

        self.header.executable.code =
            self.write_segment(SegmentKind::Code, &segments.code.data, transform)?;
        if !segments.rodata.is_empty() {
            self.header.executable.rodata =
                self.write_segment(SegmentKind::Rodata, &segments.rodata.data, transform)?;
        }
        if !segments.data.is_empty() {
            self.header.executable.data =
                self.write_segment(SegmentKind::Data, &segments.data.data, transform)?;
        }
        self.header.executable.bss_size = segments.bss_size;

        if include_symbols && !executable.symbols().is_empty() {
            let table = executable.symbol_table();
            let symbols = self.append("symbols", &[&table.serialize_entries()])?;
            let names = self.append("symbol names", &[table.names()])?;
            self.header.symtable.count = to_u32(table.len(), "symbol count")?;
            self.header.symtable.symbols_offset = symbols.offset;
            self.header.symtable.name_table_offset = names.offset;
        }
        Ok(())
    }

    fn write_segment(
        &mut self,
        kind: SegmentKind,
        data: &[u8],
        transform: Option<&dyn SegmentTransform>,
    ) -> Result<Region, ConvertError> {
        match transform {
            Some(transform) => {
                let transformed = transform
                    .transform(kind, data)
                    .map_err(|source| ConvertError::Transform { kind, source })?;
                if transformed.is_empty() {
                    if kind == SegmentKind::Code {
                        return Err(ConvertError::Transform {
                            kind,
                            source: "no bytes left".into(),
                        });
                    }
                    return Ok(Region::default());
                }
                self.append(kind.name(), &[&transformed])
            }
            None => self.append(kind.name(), &[data]),
        }
    }

    /// Rewrites the populated header over the placeholder.
    pub fn finalize(self) -> Result<ContainerHeader, ConvertError> {
        self.out.seek(SeekFrom::Start(0))?;
        self.out.write_all(&self.header.serialize())?;
        self.out.flush()?;
        Ok(self.header)
    }
}

/// Writes a complete container for an analyzed executable.
pub fn write<W: Write + Seek>(
    out: &mut W,
    executable: &Executable,
    metadata: &Metadata,
    include_symbols: bool,
    transform: Option<&dyn SegmentTransform>,
) -> Result<ContainerHeader, ConvertError> {
    let mut writer = ContainerWriter::begin(out, metadata.version.pack()?)?;
    writer.write_infos(metadata)?;
    writer.write_targets(metadata.effective_targets())?;
    writer.write_executable(executable, include_symbols, transform)?;
    writer.finalize()
}
