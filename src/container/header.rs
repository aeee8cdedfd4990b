use crate::serializable::*;

/// "3GX$0001" read as a little-endian u64.
pub const MAGIC: u64 = 0x3130_3030_2458_4733;

/// A size (or length, or count) and the absolute file offset it starts at.
/// The offset is zero whenever the size is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Region {
    pub size: u32,
    pub offset: u32,
}

impl Region {
    pub fn new(size: u32, offset: u32) -> Self {
        Region { size, offset }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn end(&self) -> u64 {
        self.offset as u64 + self.size as u64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutableDescriptor {
    pub code: Region,
    pub rodata: Region,
    pub data: Region,
    pub bss_size: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymtableDescriptor {
    pub count: u32,
    pub symbols_offset: u32,
    pub name_table_offset: u32,
}

/// String lengths include the NUL terminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Infos {
    pub author: Region,
    pub title: Region,
    pub summary: Region,
    pub description: Region,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetsDescriptor {
    pub count: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: u64,
    pub version: u32,
    pub executable: ExecutableDescriptor,
    pub symtable: SymtableDescriptor,
    pub infos: Infos,
    pub targets: TargetsDescriptor,
}

impl ContainerHeader {
    pub const SIZE: usize = 92;

    /// The placeholder written before any table.
    pub fn new(version: u32) -> Self {
        ContainerHeader {
            magic: MAGIC,
            version,
            executable: ExecutableDescriptor::default(),
            symtable: SymtableDescriptor::default(),
            infos: Infos::default(),
            targets: TargetsDescriptor::default(),
        }
    }
}

fn push_region(data: &mut Vec<u8>, region: &Region) {
    data.extend(region.size.to_le_bytes());
    data.extend(region.offset.to_le_bytes());
}

fn read_region(data: &[u8], offset: usize) -> Region {
    Region {
        size: le_u32(data, offset),
        offset: le_u32(data, offset + 4),
    }
}

impl Serializable for ContainerHeader {
    fn serialize(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::SIZE);
        data.extend(self.magic.to_le_bytes());
        data.extend(self.version.to_le_bytes());

        push_region(&mut data, &self.executable.code);
        push_region(&mut data, &self.executable.rodata);
        push_region(&mut data, &self.executable.data);
        data.extend(self.executable.bss_size.to_le_bytes());

        data.extend(self.symtable.count.to_le_bytes());
        data.extend(self.symtable.symbols_offset.to_le_bytes());
        data.extend(self.symtable.name_table_offset.to_le_bytes());

        push_region(&mut data, &self.infos.author);
        push_region(&mut data, &self.infos.title);
        push_region(&mut data, &self.infos.summary);
        push_region(&mut data, &self.infos.description);

        data.extend(self.targets.count.to_le_bytes());
        data.extend(self.targets.offset.to_le_bytes());
        data
    }

    fn deserialize(data: &[u8]) -> Result<(usize, Self), SerializationError> {
        if data.len() < Self::SIZE {
            return Err(SerializationError::DataTooShort);
        }

        let magic = le_u64(data, 0);
        if magic != MAGIC {
            return Err(SerializationError::InvalidMagic(magic));
        }

        Ok((
            Self::SIZE,
            ContainerHeader {
                magic,
                version: le_u32(data, 8),
                executable: ExecutableDescriptor {
                    code: read_region(data, 12),
                    rodata: read_region(data, 20),
                    data: read_region(data, 28),
                    bss_size: le_u32(data, 36),
                },
                symtable: SymtableDescriptor {
                    count: le_u32(data, 40),
                    symbols_offset: le_u32(data, 44),
                    name_table_offset: le_u32(data, 48),
                },
                infos: Infos {
                    author: read_region(data, 52),
                    title: read_region(data, 60),
                    summary: read_region(data, 68),
                    description: read_region(data, 76),
                },
                targets: TargetsDescriptor {
                    count: le_u32(data, 84),
                    offset: le_u32(data, 88),
                },
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_layout() {
        let data = ContainerHeader::new(0x0102_0300).serialize();
        assert_eq!(data.len(), ContainerHeader::SIZE);
        assert_eq!(&data[..8], b"3GX$0001");
        assert_eq!(&data[8..12], &[0x00, 0x03, 0x02, 0x01]);
        assert!(data[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn field_positions() {
        let mut header = ContainerHeader::new(0);
        header.executable.code = Region::new(100, 97);
        header.executable.bss_size = 0x40;
        header.symtable.name_table_offset = 0x1234;
        header.infos.title = Region::new(5, 92);
        header.targets = TargetsDescriptor {
            count: 2,
            offset: 0x200,
        };

        let data = header.serialize();
        assert_eq!(le_u32(&data, 12), 100);
        assert_eq!(le_u32(&data, 16), 97);
        assert_eq!(le_u32(&data, 36), 0x40);
        assert_eq!(le_u32(&data, 48), 0x1234);
        assert_eq!(le_u32(&data, 60), 5);
        assert_eq!(le_u32(&data, 64), 92);
        assert_eq!(le_u32(&data, 84), 2);
        assert_eq!(le_u32(&data, 88), 0x200);

        assert_eq!(ContainerHeader::deserialize(&data), Ok((92, header)));
    }

    #[test]
    fn rejects_foreign_magic() {
        let mut data = ContainerHeader::new(0).serialize();
        data[7] = b'2';
        assert!(matches!(
            ContainerHeader::deserialize(&data),
            Err(SerializationError::InvalidMagic(_))
        ));
        assert_eq!(
            ContainerHeader::deserialize(&data[..91]),
            Err(SerializationError::DataTooShort)
        );
    }
}
