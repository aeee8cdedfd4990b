//! The 3GX plugin container.
//!
//! ```text
//! +--------------------+ 0
//! | header (92 bytes)  |  rewritten last
//! +--------------------+
//! | title\0 author\0   |
//! | summary\0 desc\0   |  only the non-empty ones
//! +--------------------+
//! | target ids (u32)   |
//! +--------------------+
//! | code               |
//! | rodata             |
//! | data               |
//! +--------------------+
//! | symbol records     |  12 bytes each
//! | name table         |
//! +--------------------+
//! ```

pub mod header;
pub mod reader;
pub mod writer;

pub use header::{
    ContainerHeader, ExecutableDescriptor, Infos, Region, SymtableDescriptor, TargetsDescriptor,
    MAGIC,
};
pub use reader::Container;
pub use writer::{write, ContainerWriter};
