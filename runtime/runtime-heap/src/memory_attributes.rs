use bitfield_struct::bitfield;

/// Capability flags of a physical memory range, as reported by boot code.
///
/// ### Bit layout
///
/// | Bits  | Name                      | Meaning |
/// |-------|---------------------------|---------|
/// | 0     | `ram`                     | Volatile random-access memory |
/// | 1     | `flash`                   | Flash memory |
/// | 2     | `rom`                     | Mask ROM |
/// | 3     | `configuration_registers` | Memory-mapped peripheral registers |
/// | 4     | `writable`                | CPU stores are allowed |
/// | 5     | `non_volatile`            | Contents survive a power cycle |
/// | 6     | `internal`                | On-chip memory |
/// | 7     | `external`                | Off-chip memory behind a bus controller |
/// | 8     | `cacheable`               | Accesses go through the data cache |
/// | 9–31  | reserved                  | |
#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct MemoryAttributes {
    pub ram: bool,
    pub flash: bool,
    pub rom: bool,
    pub configuration_registers: bool,
    pub writable: bool,
    pub non_volatile: bool,
    pub internal: bool,
    pub external: bool,
    pub cacheable: bool,

    #[bits(23)]
    _reserved_9_31: u32,
}

impl MemoryAttributes {
    /// On-chip, writable, volatile RAM.
    #[inline]
    #[must_use]
    pub const fn internal_ram() -> Self {
        Self::new()
            .with_ram(true)
            .with_writable(true)
            .with_internal(true)
            .with_cacheable(true)
    }

    /// Off-chip, writable, volatile RAM.
    #[inline]
    #[must_use]
    pub const fn external_ram() -> Self {
        Self::new()
            .with_ram(true)
            .with_writable(true)
            .with_external(true)
    }

    /// Whether objects may be placed in this memory.
    #[inline]
    #[must_use]
    pub const fn is_heap_capable(self) -> bool {
        self.writable() && !self.configuration_registers()
    }
}
