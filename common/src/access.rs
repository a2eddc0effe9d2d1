//! Access rights attached to a (file, user) pair.

/// Rights a user may hold over a file. Mirrors `ACCESS_NONE`/`ACCESS_READ`/
/// `ACCESS_WRITE` from the original source, combined as a small bitmask
/// rather than re-deriving the three-way enum by hand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AccessRight(u8);

impl AccessRight {
    pub const NONE: AccessRight = AccessRight(0);
    pub const READ: AccessRight = AccessRight(1 << 0);
    pub const WRITE: AccessRight = AccessRight(1 << 1);
    pub const READ_WRITE: AccessRight = AccessRight(Self::READ.0 | Self::WRITE.0);

    pub fn from_bits(bits: u8) -> Option<AccessRight> {
        if bits & !Self::READ_WRITE.0 == 0 {
            Some(AccessRight(bits))
        } else {
            None
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn can_read(self) -> bool {
        self.0 & Self::READ.0 != 0
    }

    pub fn can_write(self) -> bool {
        self.0 & Self::WRITE.0 != 0
    }

    pub fn union(self, other: AccessRight) -> AccessRight {
        AccessRight(self.0 | other.0)
    }
}

impl Default for AccessRight {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_implies_both() {
        let rw = AccessRight::READ_WRITE;
        assert!(rw.can_read());
        assert!(rw.can_write());
    }

    #[test]
    fn from_bits_rejects_unknown_bits() {
        assert!(AccessRight::from_bits(0b100).is_none());
        assert_eq!(AccessRight::from_bits(0b011), Some(AccessRight::READ_WRITE));
    }
}
