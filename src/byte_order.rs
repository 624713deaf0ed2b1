//! Helpers for the byte order of hash words on the wire.
//!
//! Every 4-byte hash carried in a frame (the trailing chain hash and the two
//! acknowledgement words of a meta frame) is little-endian. Keeping the
//! conversions here leaves the frame code explicit about wire endianness.

/// Serialise a `u32` hash word in wire byte order (little-endian).
///
/// # Examples
///
/// ```
/// use hashframe::byte_order::write_wire_u32;
///
/// assert_eq!(write_wire_u32(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
/// ```
#[must_use]
pub fn write_wire_u32(value: u32) -> [u8; 4] { value.to_le_bytes() }

/// Parse a wire-order `u32` hash word.
///
/// # Examples
///
/// ```
/// use hashframe::byte_order::read_wire_u32;
///
/// assert_eq!(read_wire_u32([0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
/// ```
#[must_use]
pub fn read_wire_u32(bytes: [u8; 4]) -> u32 { u32::from_le_bytes(bytes) }

/// Read the hash word stored at `offset`, or `None` if `buf` is too short.
#[must_use]
pub fn read_wire_u32_at(buf: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let word = <[u8; 4]>::try_from(buf.get(offset..end)?).ok()?;
    Some(read_wire_u32(word))
}

/// Store `value` at `offset`, returning `false` if `buf` is too short.
pub fn write_wire_u32_at(buf: &mut [u8], offset: usize, value: u32) -> bool {
    let Some(end) = offset.checked_add(4) else {
        return false;
    };
    match buf.get_mut(offset..end) {
        Some(slot) => {
            slot.copy_from_slice(&write_wire_u32(value));
            true
        }
        None => false,
    }
}
