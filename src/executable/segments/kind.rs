use std::fmt;

use crate::elf::{SectionFlags, SectionHeader, SectionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Code,
    Rodata,
    Data,
    Bss,
}

impl SegmentKind {
    /// Which segment an allocated section contributes to, if any.
    pub fn classify(header: &SectionHeader) -> Option<SegmentKind> {
        let flags = header.flags;
        if !flags.contains(SectionFlags::ALLOC) || header.section_type == SectionType::Null {
            return None;
        }

        let on_disk = header.section_type != SectionType::Nobits;
        let writable = flags.contains(SectionFlags::WRITE);

        if flags.contains(SectionFlags::EXECINSTR) {
            Some(SegmentKind::Code)
        } else if !writable && on_disk {
            Some(SegmentKind::Rodata)
        } else if writable && on_disk {
            Some(SegmentKind::Data)
        } else if writable {
            Some(SegmentKind::Bss)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SegmentKind::Code => "code",
            SegmentKind::Rodata => "rodata",
            SegmentKind::Data => "data",
            SegmentKind::Bss => "bss",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
