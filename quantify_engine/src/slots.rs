//! Fresh local-slot allocation.

/// Hands out fresh local-slot indices above a method's existing locals and
/// tracks the high-water mark.
///
/// Seeded at the method's current `max_locals`, so every allocated slot is
/// guaranteed not to alias existing state.
#[derive(Debug)]
pub struct SlotAllocator {
    next: u32,
    high_water: u32,
}

impl SlotAllocator {
    /// Start allocating at `base` (typically the method's `max_locals`).
    pub fn new(base: u16) -> Self {
        Self {
            next: u32::from(base),
            high_water: u32::from(base),
        }
    }

    /// Allocate one single-width slot. `None` when the slot index space is
    /// exhausted.
    pub fn alloc(&mut self) -> Option<u16> {
        self.alloc_width(1)
    }

    /// Allocate one two-slot (wide) value's storage, returning the first
    /// slot index.
    pub fn alloc_wide(&mut self) -> Option<u16> {
        self.alloc_width(2)
    }

    /// One past the highest slot handed out so far.
    pub fn high_water(&self) -> u16 {
        // high_water never exceeds u16::MAX + 1 because allocation refuses
        // to move past the representable index range.
        self.high_water.min(u32::from(u16::MAX)) as u16
    }

    fn alloc_width(&mut self, width: u32) -> Option<u16> {
        let slot = u16::try_from(self.next).ok()?;
        let end = self.next + width;
        if end > u32::from(u16::MAX) + 1 {
            return None;
        }
        self.next = end;
        self.high_water = self.high_water.max(end);
        Some(slot)
    }
}
