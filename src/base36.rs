//! Base36 helpers shared by every identifier field.

/// Digit characters used in the Base36 notation.
pub const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// An O(1) map from any byte to the digit at `byte % 36`.
const NORMALIZE_MAP: [u8; 256] = {
    let mut map = [0u8; 256];
    let mut i = 0;
    while i < map.len() {
        map[i] = DIGITS[i % DIGITS.len()];
        i += 1;
    }
    map
};

/// Maps every byte in place to the Base36 digit at `byte % 36`.
///
/// This is intentionally lossy: bytes are reduced one by one rather than converting the buffer
/// as a single number.
///
/// # Examples
///
/// ```rust
/// let mut buf = *b"\x00\x01\x23\x24\xff";
/// puid::base36::normalize(&mut buf);
/// assert_eq!(&buf, b"01z03");
/// ```
pub fn normalize(bytes: &mut [u8]) {
    bytes.iter_mut().for_each(|e| *e = NORMALIZE_MAP[*e as usize]);
}

/// Returns `true` if every byte is one of the 36 lowercase digits.
pub fn is_base36(bytes: &[u8]) -> bool {
    bytes.iter().all(|e| matches!(e, b'0'..=b'9' | b'a'..=b'z'))
}

/// Appends the unpadded Base36 representation of `value` to `buf`.
pub fn push_int(buf: &mut Vec<u8>, value: u64) {
    // u64::MAX takes 13 digits in Base36
    let mut dst = [b'0'; 13];
    let mut i = dst.len();
    let mut n = value;
    loop {
        i -= 1;
        dst[i] = DIGITS[(n % 36) as usize];
        n /= 36;
        if n == 0 {
            break;
        }
    }
    buf.extend_from_slice(&dst[i..]);
}

/// Writes `value` right-aligned into `dst`, filling the remaining places with `'0'`.
///
/// Higher digits that do not fit in `dst` are dropped.
pub(crate) fn write_padded(value: u64, dst: &mut [u8]) {
    let mut n = value;
    for e in dst.iter_mut().rev() {
        *e = DIGITS[(n % 36) as usize];
        n /= 36;
    }
}
