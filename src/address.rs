use core::fmt;

use crate::field::Field;

/// A 64-bit physical address in Sv39 is split into three fields:
///
/// [56..63] - must be zero.
/// [12..55] - the physical page number.
/// [0..11] - 12 bits of byte offset within the page.
pub type PhysicalAddress = u64;

/// Physical page number, the 44 bits stored in an entry.
pub type PhysicalPageNum = u64;

/// Bits of offset within a page.
pub const PG_SHIFT: usize = 12;

/// The size of a base page.
pub const PAGE_SIZE: usize = 1 << PG_SHIFT;

/// Bits of a physical page number.
pub const PPN_WIDTH: usize = Field::Ppn.width();

/// Bits of a physical address.
pub const PA_WIDTH: usize = PPN_WIDTH + PG_SHIFT;

/// The size of one entry in memory.
pub const PTE_SIZE: usize = 8;

/// Entries in one page table page.
pub const ENTRIES_PER_TABLE: usize = PAGE_SIZE / PTE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressNotAlignedError(pub PhysicalAddress);

impl fmt::Display for AddressNotAlignedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "address 0x{:x} is not page aligned", self.0)
    }
}

#[macro_export]
macro_rules! pg_round_up {
    ($sz:expr, $pg_size:expr) => {{
        ($sz + $pg_size - 1) & !($pg_size - 1)
    }};
}

#[macro_export]
macro_rules! pg_round_down {
    ($a:expr, $pg_size:expr) => {{
        $a & !($pg_size - 1)
    }};
}

#[macro_export]
macro_rules! is_aligned {
    ($addr:expr, $pg_size:expr) => {{
        $crate::pg_round_down!($addr, $pg_size) == $addr
    }};
}

/// Physical page number containing `pa`. The page offset is dropped.
pub const fn pa_to_ppn(pa: PhysicalAddress) -> PhysicalPageNum {
    pa >> PG_SHIFT
}

/// Like [`pa_to_ppn`], but rejects addresses that are not page aligned.
pub fn pa_to_ppn_exact(pa: PhysicalAddress) -> Result<PhysicalPageNum, AddressNotAlignedError> {
    if is_page_aligned(pa) {
        Ok(pa_to_ppn(pa))
    } else {
        Err(AddressNotAlignedError(pa))
    }
}

pub const fn ppn_to_pa(ppn: PhysicalPageNum) -> PhysicalAddress {
    ppn << PG_SHIFT
}

pub fn is_page_aligned(pa: PhysicalAddress) -> bool {
    is_aligned!(pa, PAGE_SIZE as u64)
}
