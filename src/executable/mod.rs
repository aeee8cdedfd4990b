pub use segments::{Segment, SegmentKind, Segments};
pub use symbols::{Symbol, SymbolEntry, SymbolFlags, SymbolTable};

use log::info;

use crate::elf::ElfImage;
use crate::ConvertError;

pub mod segments;
pub mod symbols;

/// Everything the container needs from an executable image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    segments: Segments,
    symbols: Vec<Symbol>,
}

impl Executable {
    /// Fails with [`ConvertError::MissingSegment`] when there is no code at all.
    pub fn new(segments: Segments, symbols: Vec<Symbol>) -> Result<Self, ConvertError> {
        if segments.code.is_empty() {
            return Err(ConvertError::MissingSegment);
        }
        Ok(Executable { segments, symbols })
    }

    /// Analyzes an ELF image. The symbol table is only read when
    /// `include_symbols` is set.
    pub fn from_elf(image: &[u8], include_symbols: bool) -> Result<Self, ConvertError> {
        let elf = ElfImage::parse(image)?;
        let segments = Segments::from_sections(elf.sections())?;
        let symbols = if include_symbols {
            symbols::extract(&elf)?
        } else {
            Vec::new()
        };

        let executable = Executable::new(segments, symbols)?;
        info!(
            "executable: {} bytes of code at {}, {} symbols",
            executable.segments.code.len(),
            executable.segments.code.address,
            executable.symbols.len()
        );
        Ok(executable)
    }

    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol_table(&self) -> SymbolTable {
        self.symbols.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elf::fixture::*;
    use crate::elf::ElfError;

    #[test]
    fn analyzes_image() {
        let image = ElfBuilder::new()
            .progbits(".text", SHF_ALLOC | SHF_EXECINSTR, 0x0700_0000, vec![0x1e, 0xff, 0x2f, 0xe1])
            .progbits(".data", SHF_ALLOC | SHF_WRITE, 0x0700_0004, vec![7; 4])
            .symbol("_start", 0x0700_0000, 4, STT_FUNC | STB_GLOBAL, 1)
            .build();

        let executable = Executable::from_elf(&image, true).unwrap();
        assert_eq!(executable.segments().code.len(), 4);
        assert_eq!(executable.segments().data.data, vec![7; 4]);
        assert_eq!(executable.symbols().len(), 1);
        assert_eq!(executable.symbol_table().names(), b"_start\0");
    }

    #[test]
    fn symbols_are_not_read_when_discarded() {
        let mut image = ElfBuilder::new()
            .progbits(".text", SHF_ALLOC | SHF_EXECINSTR, 0x0700_0000, vec![0; 4])
            .symbol("_start", 0x0700_0000, 4, STT_FUNC, 1)
            .build();
        set_section_entsize(&mut image, 2, 0);

        let executable = Executable::from_elf(&image, false).unwrap();
        assert!(executable.symbols().is_empty());

        assert!(matches!(
            Executable::from_elf(&image, true),
            Err(ConvertError::Format(ElfError::InvalidSymbolEntrySize { .. }))
        ));
    }

    #[test]
    fn image_without_code() {
        let image = ElfBuilder::new()
            .progbits(".rodata", SHF_ALLOC, 0x0700_0000, vec![1; 4])
            .build();

        assert!(matches!(
            Executable::from_elf(&image, true),
            Err(ConvertError::MissingSegment)
        ));
    }

    #[test]
    fn truncated_image() {
        let mut image = ElfBuilder::new()
            .progbits(".text", SHF_ALLOC | SHF_EXECINSTR, 0x0700_0000, vec![0; 4])
            .build();
        set_section_size(&mut image, 1, 0x8000);

        assert!(matches!(
            Executable::from_elf(&image, false),
            Err(ConvertError::TruncatedImage(_))
        ));
    }
}
