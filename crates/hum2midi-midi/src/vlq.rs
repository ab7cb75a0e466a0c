//! Variable-length quantities as used for MIDI delta times.
//!
//! Seven bits per byte, most significant group first; every byte except the
//! last has its high bit set.

/// Largest value a MIDI file allows in a variable-length quantity.
pub const MAX_VLQ: u32 = 0x0FFF_FFFF;

/// Append `value` as a variable-length quantity.
pub fn write_vlq(out: &mut Vec<u8>, mut value: u32) {
    let mut bytes = [0u8; 5];
    let mut i = bytes.len() - 1;
    bytes[i] = (value & 0x7F) as u8;
    value >>= 7;
    while value > 0 {
        i -= 1;
        bytes[i] = ((value & 0x7F) | 0x80) as u8;
        value >>= 7;
    }
    out.extend_from_slice(&bytes[i..]);
}
