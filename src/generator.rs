use crate::counter::{self, Counter, MutexCounter};
use crate::fingerprint::{self, FingerprintError};
use crate::random::{DefaultRandom, Random};
use crate::{base36, BLOCK, CUID_PREFIX, DEFAULT_PREFIX, RANDOM_LEN};
use fstr::FStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use std::fmt;

#[cfg(test)]
mod tests;

/// A trait that defines the minimum system clock interface for [`Generator`].
pub trait TimeSource: Send + Sync {
    /// Returns the current Unix timestamp in milliseconds.
    fn unix_ts_ms(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn unix_ts_ms(&self) -> u64 {
        (**self).unix_ts_ms()
    }
}

/// The default [`TimeSource`] that uses [`std::time::SystemTime`].
///
/// A clock set before the Unix epoch reads as zero.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}

/// Configuration for [`Generator::try_from_options`].
///
/// Every field left as `None` falls back to the default: the process fingerprint, a fresh
/// [`MutexCounter`], a fresh [`DefaultRandom`], the `"p"` prefix and [`StdSystemTime`].
///
/// # Examples
///
/// ```rust
/// use puid::{Generator, Options};
///
/// let g = Generator::try_from_options(Options::new().prefix("id_").fingerprint("a1b2"))?;
/// assert!(g.generate().starts_with("id_"));
/// assert_eq!(g.fingerprint(), "a1b2");
/// # Ok::<(), puid::FingerprintError>(())
/// ```
#[derive(Clone, Default)]
pub struct Options {
    /// The `fingerprint` field, fitted to [`BLOCK`] digits.
    pub fingerprint: Option<Vec<u8>>,
    /// The source of the `random` field.
    pub random: Option<Arc<dyn Random>>,
    /// The source of the `counter` field.
    pub counter: Option<Arc<dyn Counter>>,
    /// The leading bytes of every identifier.
    pub prefix: Option<Vec<u8>>,
    /// The source of the `timestamp` field.
    pub time_source: Option<Arc<dyn TimeSource>>,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field(
                "prefix",
                &self.prefix.as_deref().map(String::from_utf8_lossy),
            )
            .field(
                "fingerprint",
                &self.fingerprint.as_deref().map(String::from_utf8_lossy),
            )
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Creates an empty set of options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fingerprint bytes.
    pub fn fingerprint(mut self, fingerprint: impl Into<Vec<u8>>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Sets the random source.
    pub fn random(mut self, random: impl Random + 'static) -> Self {
        let random: Arc<dyn Random> = Arc::new(random);
        self.random = Some(random);
        self
    }

    /// Sets the counter.
    pub fn counter(mut self, counter: impl Counter + 'static) -> Self {
        let counter: Arc<dyn Counter> = Arc::new(counter);
        self.counter = Some(counter);
        self
    }

    /// Sets the prefix.
    pub fn prefix(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the time source.
    pub fn time_source(mut self, time_source: impl TimeSource + 'static) -> Self {
        let time_source: Arc<dyn TimeSource> = Arc::new(time_source);
        self.time_source = Some(time_source);
        self
    }
}

/// Represents a PUID generator.
///
/// An identifier consists of the prefix followed by four Base36 fields:
///
/// ```text
/// <prefix><timestamp: variable><counter: 4><fingerprint: 4><random: 8>
/// ```
///
/// A generator is safe to share across threads. The `with_*` methods never modify `self`; they
/// return a new generator that shares every field not being replaced.
///
/// # Examples
///
/// ```rust
/// use puid::Generator;
///
/// let g = Generator::new();
/// let x = g.generate(); // e.g., "pmgd3jy9f000aur00x2k9c4qe"
/// assert!(regex::Regex::new(r"^p[0-9a-z]{24}$").unwrap().is_match(&x));
///
/// let h = g.with_prefix("user_");
/// assert!(h.generate().starts_with("user_"));
/// ```
#[derive(Clone)]
pub struct Generator {
    fingerprint: Fingerprint,
    prefix: Arc<[u8]>,
    counter: Arc<dyn Counter>,
    random: Arc<dyn Random>,
    time_source: Arc<dyn TimeSource>,
}

/// The `fingerprint` field of a generator.
#[derive(Clone, Copy, Debug)]
enum Fingerprint {
    /// Follows the current process, including children created by `fork()`.
    Process,
    Fixed(FStr<BLOCK>),
}

impl Fingerprint {
    fn get(self) -> FStr<BLOCK> {
        match self {
            Self::Process => fingerprint::process_fingerprint(),
            Self::Fixed(fp) => fp,
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("prefix", &String::from_utf8_lossy(&self.prefix))
            .field("fingerprint", &self.fingerprint.get().as_str())
            .finish_non_exhaustive()
    }
}

impl TryFrom<Options> for Generator {
    type Error = FingerprintError;

    fn try_from(options: Options) -> Result<Self, Self::Error> {
        Self::try_from_options(options)
    }
}

impl Generator {
    /// Creates a generator with the process fingerprint, a fresh counter, a fresh random source
    /// and the `"p"` prefix.
    pub fn new() -> Self {
        Self {
            fingerprint: Fingerprint::Process,
            prefix: Arc::from(DEFAULT_PREFIX),
            counter: Arc::new(MutexCounter::new()),
            random: Arc::new(DefaultRandom::new()),
            time_source: Arc::new(StdSystemTime),
        }
    }

    /// Creates a generator behaving like `cuid`, i.e. with the `"c"` prefix.
    pub fn cuid() -> Self {
        Self::new().with_prefix_bytes(CUID_PREFIX)
    }

    /// Creates a generator from options, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the supplied fingerprint is empty or contains bytes other than
    /// lowercase Base36 digits within its first [`BLOCK`] bytes.
    pub fn try_from_options(options: Options) -> Result<Self, FingerprintError> {
        let fingerprint = match options.fingerprint {
            Some(bytes) => Fingerprint::Fixed(fingerprint::fingerprint_from_bytes(&bytes)?),
            None => Fingerprint::Process,
        };

        Ok(Self {
            fingerprint,
            prefix: match options.prefix {
                Some(prefix) => Arc::from(prefix),
                None => Arc::from(DEFAULT_PREFIX),
            },
            counter: match options.counter {
                Some(counter) => counter,
                None => Arc::new(MutexCounter::new()),
            },
            random: match options.random {
                Some(random) => random,
                None => Arc::new(DefaultRandom::new()),
            },
            time_source: match options.time_source {
                Some(time_source) => time_source,
                None => Arc::new(StdSystemTime),
            },
        })
    }

    /// Creates a generator from options, filling unset fields with defaults.
    ///
    /// # Panics
    ///
    /// Panics if the supplied fingerprint is rejected by [`Generator::try_from_options`].
    pub fn from_options(options: Options) -> Self {
        Self::try_from_options(options).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Appends a new identifier to `buf`.
    pub fn append_to(&self, buf: &mut Vec<u8>) {
        // a millisecond timestamp takes 8 digits until the year 5188
        buf.reserve(self.prefix.len() + 8 + 2 * BLOCK + RANDOM_LEN);

        buf.extend_from_slice(&self.prefix);
        base36::push_int(buf, self.time_source.unix_ts_ms());
        counter::push_padded(buf, self.counter.next(), BLOCK);
        buf.extend_from_slice(self.fingerprint.get().as_bytes());

        let mut random = [0u8; RANDOM_LEN];
        self.random.fill(&mut random);
        base36::normalize(&mut random);
        buf.extend_from_slice(&random);
    }

    /// Generates a new identifier as raw bytes.
    pub fn generate_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.append_to(&mut buf);
        buf
    }

    /// Generates a new identifier as a string.
    ///
    /// Prefix bytes that are not valid UTF-8 are replaced with `U+FFFD`; use
    /// [`Generator::generate_bytes`] to keep them verbatim.
    pub fn generate(&self) -> String {
        String::from_utf8(self.generate_bytes())
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }

    /// Returns the prefix bytes.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Returns the fingerprint.
    ///
    /// Unless one was supplied, this is the fingerprint of the calling process, which changes in
    /// a child created by `fork()`.
    pub fn fingerprint(&self) -> FStr<BLOCK> {
        self.fingerprint.get()
    }

    /// Returns a copy of this generator with a string prefix.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        self.with_prefix_bytes(prefix.as_bytes())
    }

    /// Returns a copy of this generator with a single-byte prefix.
    pub fn with_prefix_byte(&self, prefix: u8) -> Self {
        self.with_prefix_bytes(&[prefix])
    }

    /// Returns a copy of this generator with an arbitrary byte prefix.
    ///
    /// The prefix is not validated; `cuid`-style identifiers start with a letter in `a-z`.
    pub fn with_prefix_bytes(&self, prefix: &[u8]) -> Self {
        Self {
            prefix: Arc::from(prefix),
            ..self.clone()
        }
    }

    /// Returns a copy of this generator with another random source.
    pub fn with_random(&self, random: impl Random + 'static) -> Self {
        Self {
            random: Arc::new(random),
            ..self.clone()
        }
    }

    /// Returns a copy of this generator with another counter.
    pub fn with_counter(&self, counter: impl Counter + 'static) -> Self {
        Self {
            counter: Arc::new(counter),
            ..self.clone()
        }
    }

    /// Returns a copy of this generator with another time source.
    pub fn with_time_source(&self, time_source: impl TimeSource + 'static) -> Self {
        Self {
            time_source: Arc::new(time_source),
            ..self.clone()
        }
    }

    /// Returns a copy of this generator with a fingerprint derived by
    /// [`create_fingerprint`](crate::create_fingerprint).
    pub fn with_fingerprint(&self, label: &str, num: u64) -> Self {
        Self {
            fingerprint: Fingerprint::Fixed(fingerprint::create_fingerprint(label, num)),
            ..self.clone()
        }
    }

    /// Returns a copy of this generator with the given fingerprint bytes, padded or truncated to
    /// [`BLOCK`] digits.
    ///
    /// # Errors
    ///
    /// Returns an error if `fingerprint` is empty or not made of lowercase Base36 digits.
    pub fn try_with_fingerprint_bytes(
        &self,
        fingerprint: &[u8],
    ) -> Result<Self, FingerprintError> {
        Ok(Self {
            fingerprint: Fingerprint::Fixed(fingerprint::fingerprint_from_bytes(fingerprint)?),
            ..self.clone()
        })
    }

    /// Returns a copy of this generator with the given fingerprint bytes, padded or truncated to
    /// [`BLOCK`] digits.
    ///
    /// # Panics
    ///
    /// Panics if `fingerprint` is rejected by [`Generator::try_with_fingerprint_bytes`].
    pub fn with_fingerprint_bytes(&self, fingerprint: &[u8]) -> Self {
        self.try_with_fingerprint_bytes(fingerprint)
            .unwrap_or_else(|err| panic!("{}", err))
    }
}
