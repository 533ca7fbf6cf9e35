use crate::{base36, BLOCK, MAX_HALF_INT};
use fstr::FStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::{error, fmt, process};

const HALF: usize = BLOCK / 2;

/// Creates the [`BLOCK`]-digit `fingerprint` field from a label and a number.
///
/// The default generator uses the host name and the process ID, but any pair may be used to
/// pre-compute fingerprints for a coordination scheme. The first half folds the label by adding
/// the leading byte of each character into alternating slots; the second half is `num` clamped
/// to two Base36 digits. The result always consists of Base36 digits only.
///
/// # Examples
///
/// ```rust
/// assert_eq!(puid::create_fingerprint("\0", 1), "0001");
/// assert_eq!(puid::create_fingerprint("localhost", 0), "ur00");
/// ```
pub fn create_fingerprint(label: &str, num: u64) -> FStr<BLOCK> {
    let mut acc = [0u8; HALF];
    let bytes = label.as_bytes();
    for (i, _) in label.char_indices() {
        acc[i % HALF] = acc[i % HALF].wrapping_add(bytes[i]);
    }
    base36::normalize(&mut acc);

    let mut dst = [b'0'; BLOCK];
    dst[..HALF].copy_from_slice(&acc);
    base36::write_padded(num % MAX_HALF_INT, &mut dst[HALF..]);

    // SAFETY: All bytes in `dst` are valid ASCII characters.
    unsafe { FStr::from_inner_unchecked(dst) }
}

/// Returns the fingerprint of the current host and process.
///
/// It is computed once per process from the host name (`"localhost"` if unavailable) and the
/// process ID. A process created by `fork()` gets its own fingerprint on the next call.
pub fn process_fingerprint() -> FStr<BLOCK> {
    fingerprint_for_pid(process::id())
}

/// Returns the cached fingerprint for `pid`, deriving and caching it if the cache belongs to
/// another process.
fn fingerprint_for_pid(pid: u32) -> FStr<BLOCK> {
    // upper half: pid; lower half: fingerprint bytes, never zero once filled
    static CACHE: AtomicU64 = AtomicU64::new(0);

    let cached = CACHE.load(Ordering::Acquire);
    if (cached >> 32) as u32 == pid && cached as u32 != 0 {
        let dst = (cached as u32).to_be_bytes();
        // SAFETY: Only Base36 digits produced by `create_fingerprint` are cached.
        return unsafe { FStr::from_inner_unchecked(dst) };
    }

    let host = gethostname::gethostname().into_string().unwrap_or_default();
    let fp = host_fingerprint(&host, u64::from(pid));
    let packed = u32::from_be_bytes(*fp.as_bytes());
    CACHE.store((u64::from(pid) << 32) | u64::from(packed), Ordering::Release);
    fp
}

fn host_fingerprint(host: &str, pid: u64) -> FStr<BLOCK> {
    if host.is_empty() {
        #[cfg(feature = "log")]
        log::debug!("host name unavailable; using localhost for fingerprint");
        create_fingerprint("localhost", pid)
    } else {
        create_fingerprint(host, pid)
    }
}

/// Fits a caller-supplied fingerprint to [`BLOCK`] digits.
///
/// Short input is right-padded with `'0'` and long input is truncated. Empty input and input
/// containing anything but lowercase Base36 digits are rejected.
pub fn fingerprint_from_bytes(bytes: &[u8]) -> Result<FStr<BLOCK>, FingerprintError> {
    if bytes.is_empty() {
        return Err(FingerprintError::empty());
    }

    let mut dst = [b'0'; BLOCK];
    let n = bytes.len().min(BLOCK);
    dst[..n].copy_from_slice(&bytes[..n]);

    if let Some(position) = dst.iter().position(|e| !base36::is_base36(&[*e])) {
        return Err(FingerprintError::invalid_digit(dst[position], position));
    }

    // SAFETY: All bytes in `dst` are Base36 digits and hence valid ASCII characters.
    Ok(unsafe { FStr::from_inner_unchecked(dst) })
}

/// An error fitting an unusable fingerprint.
#[derive(Clone, Debug)]
pub struct FingerprintError {
    kind: FingerprintErrorKind,
}

#[derive(Clone, Eq, PartialEq, Debug)]
enum FingerprintErrorKind {
    Empty,
    InvalidDigit { byte: u8, position: usize },
}

impl FingerprintError {
    const fn empty() -> Self {
        Self {
            kind: FingerprintErrorKind::Empty,
        }
    }

    const fn invalid_digit(byte: u8, position: usize) -> Self {
        Self {
            kind: FingerprintErrorKind::InvalidDigit { byte, position },
        }
    }
}

impl fmt::Display for FingerprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not use fingerprint: ")?;
        match self.kind {
            FingerprintErrorKind::Empty => write!(f, "empty byte sequence"),
            FingerprintErrorKind::InvalidDigit { byte, position } => write!(
                f,
                "non-base36 byte {:#04x} at {} (use `create_fingerprint` to derive one)",
                byte, position
            ),
        }
    }
}

impl error::Error for FingerprintError {}
