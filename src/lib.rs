//! RISC-V Sv39 page table entries.
//!
//! A [`PageTableEntry`] is one 64-bit word of a page table, viewable either
//! as a raw integer or field by field following the [`Field`] layout.
//! [`PageTable`] is a whole page of them as laid out in physical memory.
#![no_std]

pub mod address;
pub mod entry;
pub mod field;
pub mod page_size;
pub mod table;

pub use entry::{PTEFlags, PageTableEntry};
pub use field::{Field, FieldOutOfRange};
pub use page_size::{PageSize, Size1GiB, Size2MiB, Size4KiB};
pub use table::{PageTable, TableSizeError};
