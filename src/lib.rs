//! # PUID: Prefixed, sortable, collision-resistant Unique IDentifier
//!
//! ```rust
//! # #[cfg(feature = "global_gen")]
//! # {
//! let x = puid::new();
//! println!("{}", x); // e.g., "pmgd3jy9f000aur00x2k9c4qe"
//!
//! let y = puid::default_generator().with_prefix("user_").generate();
//! println!("{}", y); // e.g., "user_mgd3jy9g000bur00lq0a1ffk"
//! # }
//! ```
//!
//! A PUID is a short, URL-safe string in the spirit of [cuid]: a caller-chosen prefix followed
//! by four lowercase Base36 fields.
//!
//! - 8-digit (for the foreseeable future) `timestamp`: Unix time in milliseconds
//! - 4-digit `counter`: incremented on every generation, rolling over at 36^4
//! - 4-digit `fingerprint`: derived once per process from the host name and the process ID
//! - 8-digit `random`: freshly sampled bytes, reduced into the alphabet
//!
//! Uniqueness comes from the combination of these fields rather than from the quality of the
//! random field alone, so the default random source favors speed over cryptographic strength.
//! Identifiers from one generator sort by creation time to the millisecond.
//!
//! [cuid]: https://github.com/paralleldrive/cuid
//!
//! ## Crate features
//!
//! Default features:
//!
//! - `global_gen`: enables the process-wide default generator, [`default_generator`], and the
//!   [`new`], [`new_bytes`] and [`cuid`] functions.
//!
//! Optional features:
//!
//! - `log`: emits debug messages through the [`log`](https://crates.io/crates/log) facade when the
//!   default generator is initialized, the host name is unavailable, or the default random source
//!   is reseeded after a fork.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base36;

mod counter;
pub use counter::{digit_len, push_padded, Counter, MutexCounter};

mod fingerprint;
pub use fingerprint::{
    create_fingerprint, fingerprint_from_bytes, process_fingerprint, FingerprintError,
};

mod random;
pub use random::{DefaultRandom, Random, RngAdapter};

mod generator;
pub use generator::{Generator, Options, StdSystemTime, TimeSource};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{cuid, default_generator, new, new_bytes};

/// The radix of every digit field.
pub const BASE: u64 = 36;

/// The width in digits of the `counter` and `fingerprint` fields.
pub const BLOCK: usize = 4;

/// The width in digits of the `random` field.
pub const RANDOM_LEN: usize = 2 * BLOCK;

/// The exclusive upper bound of the numeric half of a fingerprint (36^2).
pub const MAX_HALF_INT: u64 = 1296;

/// The exclusive upper bound of the `counter` field (36^4).
pub const MAX_COUNTER: u64 = 1_679_616;

/// The prefix used unless another one is configured.
pub const DEFAULT_PREFIX: &[u8] = b"p";

/// The prefix of `cuid`-style identifiers.
pub const CUID_PREFIX: &[u8] = b"c";
