//! Converts a linked ARM ELF plugin into a 3GX container.
//!
//! [`convert`] is the whole pipeline: the ELF image is analyzed into an
//! [`Executable`] (loadable segments and symbols), then serialized next to
//! the plugin [`Metadata`].

use std::io::{Seek, Write};

pub mod address;
pub mod container;
pub mod elf;
pub mod error;
pub mod executable;
pub mod metadata;
pub mod output;
pub mod serializable;
pub mod settings;
pub mod transform;

pub use address::Address;
pub use container::{Container, ContainerHeader};
pub use elf::ElfError;
pub use error::ConvertError;
pub use executable::{Executable, Segment, SegmentKind, Segments, Symbol, SymbolFlags};
pub use metadata::{Metadata, Version};
pub use serializable::{Serializable, SerializationError};
pub use transform::SegmentTransform;

#[derive(Clone, Copy)]
pub struct ConvertOptions<'t> {
    /// Read the ELF symbol table and store it in the container.
    pub include_symbols: bool,
    pub transform: Option<&'t dyn SegmentTransform>,
}

impl Default for ConvertOptions<'_> {
    fn default() -> Self {
        ConvertOptions {
            include_symbols: true,
            transform: None,
        }
    }
}

/// Converts `image` and writes the container to `output`, which must be
/// positioned at its start.
///
/// Metadata is validated before anything else, and the image is fully
/// analyzed before the first byte is written.
pub fn convert<W: Write + Seek>(
    image: &[u8],
    output: &mut W,
    metadata: &Metadata,
    options: &ConvertOptions,
) -> Result<ContainerHeader, ConvertError> {
    metadata.validate()?;
    let executable = Executable::from_elf(image, options.include_symbols)?;
    container::write(
        output,
        &executable,
        metadata,
        options.include_symbols,
        options.transform,
    )
}
