use core::{
    fmt,
    ops::{Index, IndexMut},
};

use log::debug;

use crate::{
    address::{ENTRIES_PER_TABLE, PAGE_SIZE, PTE_SIZE},
    entry::PageTableEntry,
};

/// The memory image had the wrong length for one page table page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSizeError(pub usize);

impl fmt::Display for TableSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page table image is {} bytes, expected {}", self.0, PAGE_SIZE)
    }
}

/// One page table page: 512 entries filling a 4 KiB, page aligned frame.
///
/// Only storage is provided here, entries are read and written through
/// indexing. The in-memory image produced by [`PageTable::write_to`] is
/// the one the MMU reads.
#[repr(C, align(4096))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageTable([PageTableEntry; ENTRIES_PER_TABLE]);

impl PageTable {
    pub const fn empty() -> Self {
        PageTable([PageTableEntry::empty(); ENTRIES_PER_TABLE])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageTableEntry> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PageTableEntry> {
        self.0.iter_mut()
    }

    /// Index and entry of every slot with `V` set.
    pub fn valid_entries(&self) -> impl Iterator<Item = (usize, &PageTableEntry)> {
        self.0.iter().enumerate().filter(|(_, pte)| pte.is_valid())
    }

    /// Resets every slot to the empty entry.
    pub fn clear(&mut self) {
        self.0.fill(PageTableEntry::empty());
    }

    /// Stores the table into `buf` in the little-endian memory format.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), TableSizeError> {
        if buf.len() != PAGE_SIZE {
            return Err(TableSizeError(buf.len()));
        }

        for (chunk, pte) in buf.chunks_exact_mut(PTE_SIZE).zip(self.0.iter()) {
            chunk.copy_from_slice(&pte.to_le_bytes());
        }
        Ok(())
    }

    /// Loads a table from a page of memory written by hardware or by
    /// [`PageTable::write_to`].
    pub fn read_from(buf: &[u8]) -> Result<Self, TableSizeError> {
        if buf.len() != PAGE_SIZE {
            return Err(TableSizeError(buf.len()));
        }

        let mut table = Self::empty();
        for (pte, chunk) in table.0.iter_mut().zip(buf.chunks_exact(PTE_SIZE)) {
            let bytes = chunk.try_into().map_err(|_| TableSizeError(buf.len()))?;
            *pte = PageTableEntry::from_le_bytes(bytes);
        }

        debug!(
            "page_table: loaded {} valid entries from memory image",
            table.valid_entries().count()
        );
        Ok(table)
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for PageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageTable(")?;

        for (idx, pte) in self.valid_entries() {
            write!(f, "{}: {}, ", idx, pte)?;
        }

        write!(f, ")")?;
        Ok(())
    }
}

impl Index<usize> for PageTable {
    type Output = PageTableEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for PageTable {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}
