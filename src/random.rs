use rand_chacha::ChaCha8Rng;
use rand_core09::{RngCore, SeedableRng as _};
use std::process;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the bytes behind the `random` field.
///
/// Implementations fill `buf` completely and return the number of bytes written. The bytes need
/// not be Base36 digits; the generator normalizes them. Cryptographic strength is not required,
/// as uniqueness comes from the combination of all fields.
pub trait Random: Send + Sync {
    /// Fills `buf` with random bytes.
    fn fill(&self, buf: &mut [u8]) -> usize;
}

impl<T: Random + ?Sized> Random for Arc<T> {
    fn fill(&self, buf: &mut [u8]) -> usize {
        (**self).fill(buf)
    }
}

/// The default random source: a fast, non-cryptographic ChaCha8 generator seeded from the wall
/// clock and shared behind a mutex.
///
/// The generator state belongs to the process that created it. When used from a child process
/// created by `fork()`, it is reseeded from the clock and the new process ID before the first
/// byte is produced, so parent and child never share a byte stream.
#[derive(Debug)]
pub struct DefaultRandom {
    inner: Mutex<State>,
}

#[derive(Debug)]
struct State {
    rng: ChaCha8Rng,
    pid: u32,
}

impl State {
    fn fill_for_pid(&mut self, pid: u32, buf: &mut [u8]) {
        if self.pid != pid {
            #[cfg(feature = "log")]
            log::debug!("process ID changed from {} to {}; reseeding", self.pid, pid);
            self.rng = ChaCha8Rng::seed_from_u64(clock_seed() ^ (u64::from(pid) << 32));
            self.pid = pid;
        }
        self.rng.fill_bytes(buf);
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

impl Default for DefaultRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultRandom {
    /// Creates an instance seeded from the current time.
    pub fn new() -> Self {
        Self::from_seed(clock_seed())
    }

    /// Creates an instance with a fixed seed, producing a reproducible byte stream within the
    /// creating process.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: Mutex::new(State {
                rng: ChaCha8Rng::seed_from_u64(seed),
                pid: process::id(),
            }),
        }
    }

    fn fill_for_pid(&self, pid: u32, buf: &mut [u8]) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill_for_pid(pid, buf);
    }
}

impl Random for DefaultRandom {
    fn fill(&self, buf: &mut [u8]) -> usize {
        self.fill_for_pid(process::id(), buf);
        buf.len()
    }
}

/// An adapter that implements [`Random`] for [`RngCore`] types from `rand` (v0.9).
///
/// The wrapped generator is guarded by a mutex so that one instance can serve concurrent
/// callers.
///
/// # Examples
///
/// ```rust
/// use puid::{Generator, RngAdapter};
/// use rand_chacha::ChaCha20Rng;
/// use rand_core09::SeedableRng as _;
///
/// let g = Generator::new().with_random(RngAdapter::new(ChaCha20Rng::seed_from_u64(42)));
/// println!("{}", g.generate());
/// ```
#[derive(Debug, Default)]
pub struct RngAdapter<T> {
    inner: Mutex<T>,
}

impl<T> RngAdapter<T> {
    /// Wraps a random number generator.
    pub const fn new(rng: T) -> Self {
        Self {
            inner: Mutex::new(rng),
        }
    }

    /// Returns the wrapped random number generator.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: RngCore + Send> Random for RngAdapter<T> {
    fn fill(&self, buf: &mut [u8]) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill_bytes(buf);
        buf.len()
    }
}
