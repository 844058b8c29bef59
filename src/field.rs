use core::{fmt, ops::Range};

/// Named fields of a Sv39 page table entry.
///
/// [54..63] - reserved for future extensions.
/// [28..53] - PPN2, 26 bits of level-2 physical page number.
/// [19..27] - PPN1, 9 bits of level-1 physical page number.
/// [10..18] - PPN0, 9 bits of level-0 physical page number.
/// [8..9] - RSW, reserved for supervisor software.
/// [0..7] - flags, see [`PTEFlags`](crate::PTEFlags).
///
/// `Ppn` covers bits 10..53 and overlaps the three segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    V,
    R,
    W,
    X,
    U,
    G,
    A,
    D,
    Rsw,
    Ppn0,
    Ppn1,
    Ppn2,
    Ppn,
    Reserved,
}

impl Field {
    /// Every field, in layout order.
    pub const ALL: [Field; 14] = [
        Field::V,
        Field::R,
        Field::W,
        Field::X,
        Field::U,
        Field::G,
        Field::A,
        Field::D,
        Field::Rsw,
        Field::Ppn0,
        Field::Ppn1,
        Field::Ppn2,
        Field::Ppn,
        Field::Reserved,
    ];

    /// The one-bit flag fields.
    pub const FLAGS: [Field; 8] = [
        Field::V,
        Field::R,
        Field::W,
        Field::X,
        Field::U,
        Field::G,
        Field::A,
        Field::D,
    ];

    /// PPN segments indexed by page table level.
    pub const PPN_SEGMENTS: [Field; 3] = [Field::Ppn0, Field::Ppn1, Field::Ppn2];

    /// `(offset, width)` of the field in bits.
    pub const fn layout(self) -> (usize, usize) {
        match self {
            Field::V => (0, 1),
            Field::R => (1, 1),
            Field::W => (2, 1),
            Field::X => (3, 1),
            Field::U => (4, 1),
            Field::G => (5, 1),
            Field::A => (6, 1),
            Field::D => (7, 1),
            Field::Rsw => (8, 2),
            Field::Ppn0 => (10, 9),
            Field::Ppn1 => (19, 9),
            Field::Ppn2 => (28, 26),
            Field::Ppn => (10, 44),
            Field::Reserved => (54, 10),
        }
    }

    pub const fn offset(self) -> usize {
        self.layout().0
    }

    pub const fn width(self) -> usize {
        self.layout().1
    }

    /// Bit range of the field, suitable for [`BitField`](bit_field::BitField).
    pub const fn range(self) -> Range<usize> {
        let (offset, width) = self.layout();
        offset..offset + width
    }

    /// All-ones value of the field width, not shifted.
    pub const fn mask(self) -> u64 {
        (1 << self.width()) - 1
    }

    /// The largest value the field can hold.
    pub const fn max(self) -> u64 {
        self.mask()
    }

    /// Returns the PPN segment used at the given page table level.
    pub const fn ppn_segment(level: usize) -> Option<Field> {
        if level < Self::PPN_SEGMENTS.len() {
            Some(Self::PPN_SEGMENTS[level])
        } else {
            None
        }
    }

    /// Hardware mnemonic of the field.
    pub const fn name(self) -> &'static str {
        match self {
            Field::V => "V",
            Field::R => "R",
            Field::W => "W",
            Field::X => "X",
            Field::U => "U",
            Field::G => "G",
            Field::A => "A",
            Field::D => "D",
            Field::Rsw => "RSW",
            Field::Ppn0 => "PPN0",
            Field::Ppn1 => "PPN1",
            Field::Ppn2 => "PPN2",
            Field::Ppn => "ppn",
            Field::Reserved => "Reserved",
        }
    }

    /// Parses a mnemonic as returned by [`Field::name`]. `PPN` is accepted
    /// for the whole page number as well.
    pub fn from_name(name: &str) -> Option<Field> {
        match name {
            "PPN" => Some(Field::Ppn),
            _ => Self::ALL.iter().copied().find(|f| f.name() == name),
        }
    }

    /// Checks that `value` fits in the field.
    pub const fn check(self, value: u64) -> Result<u64, FieldOutOfRange> {
        if value > self.max() {
            Err(FieldOutOfRange { field: self, value })
        } else {
            Ok(value)
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value was too wide for the field it was written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldOutOfRange {
    pub field: Field,
    pub value: u64,
}

impl fmt::Display for FieldOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value 0x{:x} does not fit in {} ({} bits, max 0x{:x})",
            self.value,
            self.field,
            self.field.width(),
            self.field.max()
        )
    }
}
