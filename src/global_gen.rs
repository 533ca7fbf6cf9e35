#![cfg(feature = "global_gen")]

use crate::Generator;
use std::sync::OnceLock;

/// Returns the process-wide default generator.
///
/// The generator is built on first use from the process fingerprint, a counter starting at zero,
/// a time-seeded random source and the `"p"` prefix. Share it instead of building your own, or
/// derive a differently configured copy with its `with_*` methods.
///
/// In a child process created by `fork()`, the generator switches to the child's own fingerprint
/// and reseeds its random source to avoid collisions across processes.
///
/// # Examples
///
/// ```rust
/// let g = puid::default_generator().with_prefix("order_");
/// assert!(g.generate().starts_with("order_"));
/// assert_eq!(g.fingerprint(), puid::default_generator().fingerprint());
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]
pub fn default_generator() -> &'static Generator {
    static G: OnceLock<Generator> = OnceLock::new();

    G.get_or_init(|| {
        let g = Generator::new();
        #[cfg(feature = "log")]
        log::debug!("initialized default generator with fingerprint {}", g.fingerprint());
        g
    })
}

/// Generates a new identifier encoded as a string using the default generator.
///
/// This function is thread-safe; multiple threads in a process can call it concurrently.
///
/// # Examples
///
/// ```rust
/// let x = puid::new(); // e.g., "pmgd3jy9f000aur00x2k9c4qe"
///
/// assert!(regex::Regex::new(r"^p[0-9a-z]{24}$").unwrap().is_match(&x));
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]
pub fn new() -> String {
    default_generator().generate()
}

/// Generates a new identifier as raw bytes using the default generator.
#[cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]
pub fn new_bytes() -> Vec<u8> {
    default_generator().generate_bytes()
}

/// Generates a new `cuid`-style identifier, i.e. with the `"c"` prefix, using the counter,
/// fingerprint and random source of the default generator.
#[cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]
pub fn cuid() -> String {
    static G: OnceLock<Generator> = OnceLock::new();

    G.get_or_init(|| default_generator().with_prefix_bytes(crate::CUID_PREFIX))
        .generate()
}
