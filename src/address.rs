use std::fmt;

/// A load address in the target's 32-bit address space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub u32);

impl Address {
    /// ARM interworking: bit 0 of a code address selects the Thumb instruction set.
    pub const THUMB_BIT: u32 = 1;

    pub fn is_thumb(self) -> bool {
        self.0 & Self::THUMB_BIT != 0
    }

    pub fn without_thumb_bit(self) -> Address {
        Address(self.0 & !Self::THUMB_BIT)
    }
}

impl std::ops::Add<u32> for Address {
    type Output = Address;
    fn add(self, rhs: u32) -> Self::Output {
        Address(self.0.wrapping_add(rhs))
    }
}

impl std::ops::Sub<Address> for Address {
    type Output = i64;

    fn sub(self, rhs: Address) -> Self::Output {
        self.0 as i64 - rhs.0 as i64
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
