use core::fmt;

use bit_field::BitField;
use bitflags::bitflags;
use log::trace;

use crate::{
    address::{pa_to_ppn, ppn_to_pa, PhysicalAddress, PhysicalPageNum},
    field::{Field, FieldOutOfRange},
    page_size::PageSize,
};

bitflags! {
    #[derive(Default, Debug, PartialEq, Eq, Hash, Clone, Copy)]
    pub struct PTEFlags: u8 {
        const V = 1 << 0; // VALID
        const R = 1 << 1; // READABLE
        const W = 1 << 2; // WRITABLE
        const X = 1 << 3; // EXECUTABLE
        const U = 1 << 4; // USER
        const G = 1 << 5; // GLOBAL
        const A = 1 << 6; // ACCESSED
        const D = 1 << 7; // DIRTY
    }
}

const FLAGS_RANGE: core::ops::Range<usize> = 0..8;

/// Page table entry in RISC-V Sv39 mode.
///
/// The entry is a single 64-bit word, see [`Field`] for the layout. Any bit
/// pattern is accepted: hardware conventions such as `W` without `R` being
/// reserved are reported by the `is_*` inspectors but never enforced.
///
/// `ppn` and its segments `PPN0`, `PPN1`, `PPN2` are different views of the
/// same bits 10..53, so writing one is always visible through the others.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PageTableEntry(u64);

impl PageTableEntry {
    pub const fn empty() -> Self {
        PageTableEntry(0)
    }

    pub const fn from_raw(value: u64) -> Self {
        PageTableEntry(value)
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Makes an entry pointing at physical page `ppn`.
    pub fn new(ppn: PhysicalPageNum, flags: PTEFlags) -> Result<Self, FieldOutOfRange> {
        let mut pte = Self::empty();
        pte.set_ppn(ppn)?;
        pte.set_flags(flags);
        Ok(pte)
    }

    /// Makes an entry for the page containing `pa`.
    ///
    /// The page offset of `pa` is dropped; addresses beyond the 56-bit
    /// physical address space are rejected.
    pub fn from_pa(pa: PhysicalAddress, flags: PTEFlags) -> Result<Self, FieldOutOfRange> {
        Self::new(pa_to_ppn(pa), flags)
    }

    pub fn get_field(&self, field: Field) -> u64 {
        self.0.get_bits(field.range())
    }

    /// Writes `value` into `field`, leaving every bit outside the field
    /// untouched. Nothing is written if the value is too wide.
    pub fn set_field(&mut self, field: Field, value: u64) -> Result<(), FieldOutOfRange> {
        let value = field.check(value)?;
        trace!("pte: set {} to 0x{:x}, raw: 0x{:x}", field, value, self.0);
        self.0.set_bits(field.range(), value);
        Ok(())
    }

    /// Returns a copy of this entry with `field` replaced.
    pub fn with_field(mut self, field: Field, value: u64) -> Result<Self, FieldOutOfRange> {
        self.set_field(field, value)?;
        Ok(self)
    }

    pub fn ppn(&self) -> PhysicalPageNum {
        self.get_field(Field::Ppn)
    }

    pub fn set_ppn(&mut self, ppn: PhysicalPageNum) -> Result<(), FieldOutOfRange> {
        self.set_field(Field::Ppn, ppn)
    }

    pub fn ppn0(&self) -> u64 {
        self.get_field(Field::Ppn0)
    }

    pub fn ppn1(&self) -> u64 {
        self.get_field(Field::Ppn1)
    }

    pub fn ppn2(&self) -> u64 {
        self.get_field(Field::Ppn2)
    }

    pub fn set_ppn0(&mut self, value: u64) -> Result<(), FieldOutOfRange> {
        self.set_field(Field::Ppn0, value)
    }

    pub fn set_ppn1(&mut self, value: u64) -> Result<(), FieldOutOfRange> {
        self.set_field(Field::Ppn1, value)
    }

    pub fn set_ppn2(&mut self, value: u64) -> Result<(), FieldOutOfRange> {
        self.set_field(Field::Ppn2, value)
    }

    /// Physical address of the page (or next level table) this entry
    /// points to.
    pub fn pa(&self) -> PhysicalAddress {
        ppn_to_pa(self.ppn())
    }

    pub fn rsw(&self) -> u64 {
        self.get_field(Field::Rsw)
    }

    pub fn set_rsw(&mut self, value: u64) -> Result<(), FieldOutOfRange> {
        self.set_field(Field::Rsw, value)
    }

    /// Bits 54..63. Stored as is, no meaning is assigned to them.
    pub fn reserved(&self) -> u64 {
        self.get_field(Field::Reserved)
    }

    pub fn set_reserved(&mut self, value: u64) -> Result<(), FieldOutOfRange> {
        self.set_field(Field::Reserved, value)
    }

    pub fn flags(&self) -> PTEFlags {
        PTEFlags::from_bits_retain(self.0.get_bits(FLAGS_RANGE) as u8)
    }

    /// Replaces all eight flag bits.
    pub fn set_flags(&mut self, flags: PTEFlags) {
        trace!("pte: set flags {:?}, raw: 0x{:x}", flags, self.0);
        self.0.set_bits(FLAGS_RANGE, flags.bits() as u64);
    }

    pub fn insert_flags(&mut self, flags: PTEFlags) {
        self.set_flags(self.flags() | flags);
    }

    pub fn remove_flags(&mut self, flags: PTEFlags) {
        self.set_flags(self.flags() - flags);
    }

    pub fn is_valid(&self) -> bool {
        self.flags().contains(PTEFlags::V)
    }

    pub fn is_readable(&self) -> bool {
        self.flags().contains(PTEFlags::R)
    }

    pub fn is_writable(&self) -> bool {
        self.flags().contains(PTEFlags::W)
    }

    pub fn is_executable(&self) -> bool {
        self.flags().contains(PTEFlags::X)
    }

    pub fn is_user(&self) -> bool {
        self.flags().contains(PTEFlags::U)
    }

    pub fn is_global(&self) -> bool {
        self.flags().contains(PTEFlags::G)
    }

    pub fn is_accessed(&self) -> bool {
        self.flags().contains(PTEFlags::A)
    }

    pub fn is_dirty(&self) -> bool {
        self.flags().contains(PTEFlags::D)
    }

    /// Valid, and maps a page: at least one of `R`, `W`, `X` is set.
    pub fn is_leaf(&self) -> bool {
        self.is_valid() && self.flags().intersects(PTEFlags::R | PTEFlags::W | PTEFlags::X)
    }

    /// Valid, and points to the next level of page table.
    pub fn is_pointer(&self) -> bool {
        self.is_valid() && !self.flags().intersects(PTEFlags::R | PTEFlags::W | PTEFlags::X)
    }

    /// `W` without `R`, which the privileged architecture reserves.
    pub fn is_reserved_encoding(&self) -> bool {
        self.is_writable() && !self.is_readable()
    }

    /// Whether the physical page number can back a leaf of size `S`, i.e.
    /// every PPN segment below `S::LEVEL` is zero.
    pub fn is_aligned_for<S: PageSize>(&self) -> bool {
        Field::PPN_SEGMENTS
            .iter()
            .take(S::LEVEL)
            .all(|segment| self.get_field(*segment) == 0)
    }

    /// A leaf at `level` whose lower PPN segments are not zero. Hardware
    /// raises a page fault on such entries.
    pub fn is_misaligned_superpage(&self, level: usize) -> bool {
        self.is_leaf()
            && Field::PPN_SEGMENTS
                .iter()
                .take(level)
                .any(|segment| self.get_field(*segment) != 0)
    }

    /// The entry as stored in page table memory.
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    pub const fn from_le_bytes(bytes: [u8; 8]) -> Self {
        PageTableEntry(u64::from_le_bytes(bytes))
    }
}

impl From<u64> for PageTableEntry {
    fn from(value: u64) -> Self {
        Self::from_raw(value)
    }
}

impl From<PageTableEntry> for u64 {
    fn from(pte: PageTableEntry) -> Self {
        pte.to_raw()
    }
}

impl fmt::Display for PageTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Highest flag first, as in `DAGUXWRV`.
        let flags = self.flags();
        write!(f, "PTE(ppn: 0x{:x}, flags: ", self.ppn())?;
        for (i, name) in b"VRWXUGAD".iter().enumerate().rev() {
            let set = flags.bits() & (1 << i) != 0;
            write!(f, "{}", if set { *name as char } else { '-' })?;
        }
        write!(f, ", rsw: {})", self.rsw())
    }
}

impl fmt::Debug for PageTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("PageTableEntry");
        s.field("raw", &format_args!("0x{:016x}", self.0));
        for field in Field::ALL {
            s.field(field.name(), &format_args!("0x{:x}", self.get_field(field)));
        }
        s.finish()
    }
}
