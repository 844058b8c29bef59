/// Granularity of a leaf mapping. A leaf found at `LEVEL` maps `SIZE` bytes.
pub trait PageSize: Copy + Eq + PartialOrd + Ord {
    const SIZE: u64;
    const LEVEL: usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Size4KiB {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Size2MiB {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Size1GiB {}

impl PageSize for Size4KiB {
    const SIZE: u64 = 4096;
    const LEVEL: usize = 0;
}

impl PageSize for Size2MiB {
    const SIZE: u64 = Size4KiB::SIZE * 512;
    const LEVEL: usize = 1;
}

impl PageSize for Size1GiB {
    const SIZE: u64 = Size2MiB::SIZE * 512;
    const LEVEL: usize = 2;
}
