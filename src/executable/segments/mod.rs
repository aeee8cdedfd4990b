pub mod kind;

pub use kind::SegmentKind;

use log::{debug, trace};

use crate::elf::{ElfError, ElfSection};
use crate::Address;

/// The loadable image of one segment class: the concatenation of all its
/// sections, with gaps between them kept as zero padding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub address: Address,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn new(address: Address, data: Vec<u8>) -> Self {
        Segment { address, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments {
    pub code: Segment,
    pub rodata: Segment,
    pub data: Segment,
    /// bss occupies memory only.
    pub bss_size: u32,
}

impl Segments {
    pub fn from_sections(sections: &[ElfSection<'_>]) -> Result<Self, ElfError> {
        let mut code = SegmentLayout::new(SegmentKind::Code);
        let mut rodata = SegmentLayout::new(SegmentKind::Rodata);
        let mut data = SegmentLayout::new(SegmentKind::Data);
        let mut bss = SegmentLayout::new(SegmentKind::Bss);

        let mut loadable: Vec<(SegmentKind, &ElfSection<'_>)> = sections
            .iter()
            .filter(|section| section.header.size > 0)
            .filter_map(|section| {
                SegmentKind::classify(&section.header).map(|kind| (kind, section))
            })
            .collect();
        // stable: equal addresses keep section header order
        loadable.sort_by_key(|(_, section)| section.header.addr);

        for (kind, section) in loadable {
            trace!(
                "{} -> {} ({} bytes at {:#010x})",
                section.name,
                kind,
                section.header.size,
                section.header.addr
            );
            let layout = match kind {
                SegmentKind::Code => &mut code,
                SegmentKind::Rodata => &mut rodata,
                SegmentKind::Data => &mut data,
                SegmentKind::Bss => &mut bss,
            };
            layout.push(section)?;
        }

        let segments = Segments {
            code: code.finish(),
            rodata: rodata.finish(),
            data: data.finish(),
            bss_size: bss.span(),
        };
        debug!(
            "segments: code {} bytes, rodata {} bytes, data {} bytes, bss {} bytes",
            segments.code.len(),
            segments.rodata.len(),
            segments.data.len(),
            segments.bss_size
        );
        Ok(segments)
    }
}

/// Largest hole between two sections of one class that is filled with zeros.
pub const MAX_SEGMENT_GAP: u32 = 0x10_0000;

struct SegmentLayout {
    kind: SegmentKind,
    start: Option<Address>,
    end: Address,
    last_section: String,
    data: Vec<u8>,
}

impl SegmentLayout {
    fn new(kind: SegmentKind) -> Self {
        SegmentLayout {
            kind,
            start: None,
            end: Address(0),
            last_section: String::new(),
            data: Vec::new(),
        }
    }

    fn push(&mut self, section: &ElfSection<'_>) -> Result<(), ElfError> {
        let address = Address(section.header.addr);
        let size = section.header.size;

        if self.start.is_none() {
            self.start = Some(address);
        } else if address < self.end {
            return Err(ElfError::OverlappingSections {
                kind: self.kind.name(),
                first: self.last_section.clone(),
                second: section.name.clone(),
            });
        }

        if self.kind != SegmentKind::Bss {
            let padding = if self.data.is_empty() {
                0
            } else {
                (address - self.end) as u32
            };
            if padding > MAX_SEGMENT_GAP {
                return Err(ElfError::SegmentGap {
                    kind: self.kind.name(),
                    first: self.last_section.clone(),
                    second: section.name.clone(),
                    gap: padding,
                });
            }
            self.data.resize(self.data.len() + padding as usize, 0);
            self.data.extend_from_slice(section.content);
        }

        self.end = Address(address.0.saturating_add(size));
        self.last_section = section.name.clone();
        Ok(())
    }

    fn span(&self) -> u32 {
        match self.start {
            Some(start) => self.end.0 - start.0,
            None => 0,
        }
    }

    fn finish(self) -> Segment {
        Segment {
            address: self.start.unwrap_or_default(),
            data: self.data,
        }
    }
}
