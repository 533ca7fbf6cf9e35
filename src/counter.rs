use crate::{base36, BASE, MAX_COUNTER};
use std::sync::{Arc, Mutex, PoisonError};

/// A source of the rolling `counter` field.
///
/// The default implementation is [`MutexCounter`]. Implement this trait only to coordinate
/// counters across processes, e.g. with an atomic increment on a shared store. Every value
/// returned must lie in `0..MAX_COUNTER`; the generator does not check it.
pub trait Counter: Send + Sync {
    /// Returns the current value and advances the counter.
    fn next(&self) -> u64;
}

impl<T: Counter + ?Sized> Counter for Arc<T> {
    fn next(&self) -> u64 {
        (**self).next()
    }
}

/// The default counter: a single integer behind a mutex that wraps to zero at
/// [`MAX_COUNTER`].
#[derive(Debug, Default)]
pub struct MutexCounter {
    value: Mutex<u64>,
}

impl MutexCounter {
    /// Creates a counter starting at zero.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a counter starting at `value % MAX_COUNTER`.
    pub const fn starting_at(value: u64) -> Self {
        Self {
            value: Mutex::new(value % MAX_COUNTER),
        }
    }
}

impl Counter for MutexCounter {
    fn next(&self) -> u64 {
        // the integer is always in range, so a poisoned lock holds a usable value
        let mut value = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        let n = *value;
        *value += 1;
        if *value == MAX_COUNTER {
            *value = 0;
        }
        n
    }
}

const DIGIT_1: u64 = BASE;
const DIGIT_2: u64 = DIGIT_1 * BASE;
const DIGIT_3: u64 = DIGIT_2 * BASE;
const DIGIT_4: u64 = DIGIT_3 * BASE;

/// Returns the number of Base36 digits needed to write `n`.
pub const fn digit_len(n: u64) -> usize {
    if n < DIGIT_1 {
        1
    } else if n < DIGIT_2 {
        2
    } else if n < DIGIT_3 {
        3
    } else if n < DIGIT_4 {
        4
    } else {
        let mut len = 5;
        let mut rest = n / DIGIT_4;
        while rest >= BASE {
            len += 1;
            rest /= BASE;
        }
        len
    }
}

/// Appends `value` in Base36, left-padded with `'0'` to `width` digits.
///
/// Values needing more than `width` digits are written in full.
pub fn push_padded(buf: &mut Vec<u8>, value: u64, width: usize) {
    let len = digit_len(value);
    if len >= width {
        base36::push_int(buf, value);
    } else {
        let start = buf.len();
        buf.resize(start + width, b'0');
        base36::write_padded(value, &mut buf[start..]);
    }
}
