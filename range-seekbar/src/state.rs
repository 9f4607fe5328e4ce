//! Persisted instance state.

use bytemuck::{Pod, Zeroable};

use crate::error::RangeError;

/// The `(start, end)` pair a host saves across a save/restore cycle.
///
/// The byte layout is two native-endian `i32`s, `start` first.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavedState {
    /// Saved start endpoint.
    pub start: i32,
    /// Saved end endpoint.
    pub end: i32,
}

impl SavedState {
    /// Encoded size in bytes.
    pub const SIZE: usize = std::mem::size_of::<SavedState>();

    /// Creates a snapshot.
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Raw bytes of the snapshot.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }

    /// Decodes a snapshot produced by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RangeError> {
        bytemuck::try_pod_read_unaligned(bytes)
            .map_err(|_| RangeError::InvalidSavedState { len: bytes.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_written_first() {
        let bytes = SavedState::new(7, 9).to_bytes();
        assert_eq!(&bytes[..4], &7i32.to_ne_bytes());
        assert_eq!(&bytes[4..], &9i32.to_ne_bytes());
        assert_eq!(SavedState::from_bytes(&bytes), Ok(SavedState::new(7, 9)));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(
            SavedState::from_bytes(&[0u8; 5]),
            Err(RangeError::InvalidSavedState { len: 5 })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_named_fields() {
        let json = serde_json::to_string(&SavedState::new(3, 40)).unwrap();
        assert_eq!(json, r#"{"start":3,"end":40}"#);
    }
}
