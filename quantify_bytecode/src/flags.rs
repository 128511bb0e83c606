//! Access flags for classes and methods.
//!
//! Flag bit values follow the JVM class-file convention so that units
//! produced from real class files keep their original masks.

/// Access flag bit set for a class or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessFlags(u32);

impl AccessFlags {
    /// No flags.
    pub const NONE: AccessFlags = AccessFlags(0);
    /// Declared public.
    pub const PUBLIC: AccessFlags = AccessFlags(0x0001);
    /// Declared private.
    pub const PRIVATE: AccessFlags = AccessFlags(0x0002);
    /// Declared static.
    pub const STATIC: AccessFlags = AccessFlags(0x0008);
    /// Declared final.
    pub const FINAL: AccessFlags = AccessFlags(0x0010);
    /// Implemented in native code; carries no instruction sequence.
    pub const NATIVE: AccessFlags = AccessFlags(0x0100);
    /// Interface (class-level); its methods carry no bodies to rewrite.
    pub const INTERFACE: AccessFlags = AccessFlags(0x0200);
    /// Declared abstract; no instruction sequence.
    pub const ABSTRACT: AccessFlags = AccessFlags(0x0400);
    /// Compiler-generated bridge method.
    pub const BRIDGE: AccessFlags = AccessFlags(0x0040);
    /// Compiler-generated synthetic member.
    pub const SYNTHETIC: AccessFlags = AccessFlags(0x1000);

    /// Check whether all bits of `other` are set.
    #[inline]
    pub const fn contains(self, other: AccessFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether any bit of `other` is set.
    #[inline]
    pub const fn intersects(self, other: AccessFlags) -> bool {
        (self.0 & other.0) != 0
    }

    /// Combine flag sets.
    #[inline]
    pub const fn union(self, other: AccessFlags) -> AccessFlags {
        AccessFlags(self.0 | other.0)
    }

    /// Raw bit value.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from a raw bit value.
    #[inline]
    pub const fn from_bits(bits: u32) -> AccessFlags {
        AccessFlags(bits)
    }
}

impl std::ops::BitOr for AccessFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for AccessFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
