use super::*;
use crate::counter::digit_len;

/// Always returns the same counter value.
struct FixedCounter(u64);

impl Counter for FixedCounter {
    fn next(&self) -> u64 {
        self.0
    }
}

/// Fills every byte with the same value.
struct FixedRandom(u8);

impl Random for FixedRandom {
    fn fill(&self, buf: &mut [u8]) -> usize {
        buf.iter_mut().for_each(|e| *e = self.0);
        buf.len()
    }
}

/// Always reads the same time.
struct FixedClock(u64);

impl TimeSource for FixedClock {
    fn unix_ts_ms(&self) -> u64 {
        self.0
    }
}

/// Splits an identifier into (counter, fingerprint, random), counting from the end.
fn tail_fields(id: &str) -> (&str, &str, &str) {
    let n = id.len();
    (
        &id[n - 16..n - 12],
        &id[n - 12..n - 8],
        &id[n - RANDOM_LEN..],
    )
}

/// Generates a predictable identifier from fixed sources
#[test]
fn generates_a_predictable_identifier_from_fixed_sources() {
    let g = Generator::from_options(
        Options::new()
            .prefix("x")
            .fingerprint("ffff")
            // "1111" in padded Base36
            .counter(FixedCounter(1 + 36 + 36 * 36 + 36 * 36 * 36))
            // 27 is 'r' in Base36
            .random(FixedRandom(27))
            // "10000000" in Base36
            .time_source(FixedClock(78_364_164_096)),
    );

    assert_eq!(g.generate(), "x100000001111ffffrrrrrrrr");
    assert_eq!(g.generate_bytes(), b"x100000001111ffffrrrrrrrr");
}

/// Fills unset options with defaults
#[test]
fn fills_unset_options_with_defaults() {
    let g = Generator::from_options(Options::new());
    assert_eq!(g.prefix(), b"p");
    assert_eq!(g.fingerprint(), crate::process_fingerprint());

    let before = StdSystemTime.unix_ts_ms();
    let (x, y) = (g.generate(), g.generate());
    let re = regex::Regex::new(r"^p[0-9a-z]{24}$").unwrap();
    assert!(re.is_match(&x) && re.is_match(&y));
    assert_eq!(tail_fields(&x).0, "0000");
    assert_eq!(tail_fields(&y).0, "0001");
    assert_eq!(tail_fields(&x).1, g.fingerprint().as_str());
    assert_ne!(tail_fields(&x).2, tail_fields(&y).2);
    assert!(u64::from_str_radix(&x[1..x.len() - 16], 36).unwrap() >= before);

    // each generator built from options gets its own counter
    let h = Generator::try_from(Options::default()).unwrap();
    assert_eq!(tail_fields(&h.generate()).0, "0000");
    assert_eq!(tail_fields(&g.generate()).0, "0002");
}

/// Shows the prefix and fingerprint of options in debug output
#[test]
fn shows_the_prefix_and_fingerprint_of_options_in_debug_output() {
    let o = Options::new()
        .prefix("id_")
        .fingerprint("a1b2")
        .random(FixedRandom(0));
    assert_eq!(
        format!("{:?}", o),
        r#"Options { prefix: Some("id_"), fingerprint: Some("a1b2"), .. }"#
    );
    assert_eq!(
        format!("{:?}", Options::new()),
        "Options { prefix: None, fingerprint: None, .. }"
    );
}

/// Generates identifiers in the default format
#[test]
fn generates_identifiers_in_the_default_format() {
    use regex::Regex;

    let re = Regex::new(r"^p[0-9a-z]{24}$").unwrap();
    let g = Generator::new();
    for _ in 0..1000 {
        assert!(re.is_match(&g.generate()));
    }
    assert!(Regex::new(r"^p[0-9a-z]{24}$")
        .unwrap()
        .is_match(std::str::from_utf8(&g.generate_bytes()).unwrap()));

    let re = Regex::new(r"^c[0-9a-z]{24}$").unwrap();
    assert!(re.is_match(&Generator::cuid().generate()));
}

/// Keeps the length fixed for a given prefix
#[test]
fn keeps_the_length_fixed_for_a_given_prefix() {
    let g = Generator::new();
    let prefixes = [
        g.with_prefix("a"),
        g.with_prefix(""),
        g.with_prefix("foo"),
        g.with_prefix_byte(b'z'),
        g.with_prefix_byte(b'*'),
        g.with_prefix_byte(b' '),
        g.with_prefix_bytes(b"abc"),
        g.with_prefix_bytes(b"f"),
        g.with_prefix_bytes(b"x:"),
    ];

    for e in prefixes {
        let ts_len = digit_len(StdSystemTime.unix_ts_ms());
        let id = e.generate_bytes();
        assert_eq!(id.len(), e.prefix().len() + ts_len + 2 * BLOCK + RANDOM_LEN);
        assert!(id.starts_with(e.prefix()));
    }
}

/// Places a custom counter value in the counter field
#[test]
fn places_a_custom_counter_value_in_the_counter_field() {
    // 1337 is "0115" in padded Base36
    let g = Generator::new().with_counter(FixedCounter(1337));
    for _ in 0..2 {
        assert_eq!(tail_fields(&g.generate()).0, "0115");
    }
}

/// Counts up within a generator
#[test]
fn counts_up_within_a_generator() {
    let g = Generator::new().with_random(FixedRandom(0));
    let counters: Vec<String> = (0..3)
        .map(|_| tail_fields(&g.generate()).0.to_owned())
        .collect();
    assert_eq!(counters, ["0000", "0001", "0002"]);
}

/// Places a custom random source in the random field
#[test]
fn places_a_custom_random_source_in_the_random_field() {
    let from_clone = Generator::new().with_random(FixedRandom(1));
    let from_options = Generator::from_options(Options::new().random(FixedRandom(1)));
    for g in [from_clone, from_options] {
        for _ in 0..2 {
            assert_eq!(tail_fields(&g.generate()).2, "11111111");
        }
    }
}

/// Normalizes raw random bytes
#[test]
fn normalizes_raw_random_bytes() {
    // 0xff % 36 == 3
    let g = Generator::new().with_random(FixedRandom(0xff));
    assert_eq!(tail_fields(&g.generate()).2, "33333333");
}

/// Reproduces the random field from a seeded rand generator
#[test]
fn reproduces_the_random_field_from_a_seeded_rand_generator() {
    use crate::RngAdapter;
    use rand09::{rngs::StdRng, SeedableRng as _};

    let a = Generator::new().with_random(RngAdapter::new(StdRng::seed_from_u64(1)));
    let b = Generator::new().with_random(RngAdapter::new(StdRng::seed_from_u64(1)));
    for _ in 0..100 {
        let (x, y) = (a.generate(), b.generate());
        assert_eq!(tail_fields(&x).2, tail_fields(&y).2);
        assert!(base36::is_base36(tail_fields(&x).2.as_bytes()));
    }
}

/// Keeps the fingerprint across identifiers
#[test]
fn keeps_the_fingerprint_across_identifiers() {
    let g = Generator::new().with_fingerprint_bytes(b"abcd");
    assert_eq!(g.fingerprint(), "abcd");
    for _ in 0..2 {
        assert_eq!(tail_fields(&g.generate()).1, "abcd");
    }

    let g = Generator::new().with_fingerprint("\0", 1);
    for _ in 0..2 {
        assert_eq!(tail_fields(&g.generate()).1, "0001");
    }

    let g = Generator::new();
    assert_eq!(g.fingerprint(), crate::process_fingerprint());
    assert_eq!(tail_fields(&g.generate()).1, g.fingerprint().as_str());
}

/// Truncates a long fingerprint
#[test]
fn truncates_a_long_fingerprint() {
    let g = Generator::new().with_fingerprint_bytes(b"acbdefg");
    assert_eq!(g.fingerprint().len(), BLOCK);
    assert_eq!(tail_fields(&g.generate()).1, "acbd");
}

/// Rejects a bad fingerprint without touching the source generator
#[test]
fn rejects_a_bad_fingerprint_without_touching_the_source_generator() {
    let g = Generator::new();
    assert!(g.try_with_fingerprint_bytes(b"").is_err());
    assert!(g.try_with_fingerprint_bytes(b"abc\0").is_err());
    assert!(Generator::try_from_options(Options::new().fingerprint(*b"abc\0")).is_err());
    assert!(Generator::try_from(Options::new().fingerprint(Vec::new())).is_err());
    assert_eq!(g.fingerprint(), crate::process_fingerprint());
}

/// Panics on an empty fingerprint
#[test]
#[should_panic(expected = "empty byte sequence")]
fn panics_on_an_empty_fingerprint() {
    Generator::new().with_fingerprint_bytes(b"");
}

/// Panics on a non-base36 fingerprint
#[test]
#[should_panic(expected = "non-base36 byte")]
fn panics_on_a_non_base36_fingerprint() {
    Generator::new().with_fingerprint_bytes(&[b'a', b'b', b'c', 0x00]);
}

/// Panics on a non-base36 fingerprint in options
#[test]
#[should_panic(expected = "could not use fingerprint")]
fn panics_on_a_non_base36_fingerprint_in_options() {
    Generator::from_options(Options::new().fingerprint(vec![b'a', b'b', b'c', 0x00]));
}

/// Derives clones without modifying the original
#[test]
fn derives_clones_without_modifying_the_original() {
    let base = Generator::new();
    let prefixed = base.with_prefix("a");
    let fixed = prefixed.with_random(FixedRandom(1));

    assert_eq!(base.prefix(), b"p");
    assert_eq!(prefixed.prefix(), b"a");
    assert_eq!(fixed.prefix(), b"a");
    assert_eq!(base.fingerprint(), fixed.fingerprint());

    let id = fixed.generate();
    assert!(id.starts_with('a'));
    assert_eq!(tail_fields(&id).2, "11111111");

    let refingerprinted = fixed.with_fingerprint_bytes(b"zz");
    assert_eq!(refingerprinted.fingerprint(), "zz00");
    assert_eq!(fixed.fingerprint(), base.fingerprint());
}

/// Shares the counter between clones that keep it
#[test]
fn shares_the_counter_between_clones_that_keep_it() {
    let a = Generator::new();
    let b = a.with_prefix("b");
    assert_eq!(tail_fields(&a.generate()).0, "0000");
    assert_eq!(tail_fields(&b.generate()).0, "0001");

    let c = a.with_counter(MutexCounter::new());
    assert_eq!(tail_fields(&c.generate()).0, "0000");
    assert_eq!(tail_fields(&a.generate()).0, "0002");
}

/// Appends to an existing buffer
#[test]
fn appends_to_an_existing_buffer() {
    let g = Generator::from_options(
        Options::new()
            .prefix("x")
            .fingerprint("ffff")
            .counter(FixedCounter(0))
            .random(FixedRandom(0))
            .time_source(FixedClock(0)),
    );

    let mut buf = b"ids:".to_vec();
    g.append_to(&mut buf);
    buf.push(b',');
    g.append_to(&mut buf);
    assert_eq!(buf, b"ids:x00000ffff00000000,x00000ffff00000000");
}

/// Replaces invalid UTF-8 prefix bytes only in the text form
#[test]
fn replaces_invalid_utf8_prefix_bytes_only_in_the_text_form() {
    let g = Generator::new().with_prefix_bytes(&[0xff]);
    assert_eq!(g.generate_bytes()[0], 0xff);
    assert!(g.generate().starts_with('\u{fffd}'));
}

/// Generates no duplicates under multithreading
#[test]
fn generates_no_duplicates_under_multithreading() {
    use std::{collections::HashSet, sync::mpsc, thread};

    let g = Generator::new();
    let (tx, rx) = mpsc::channel();
    for _ in 0..4 {
        let tx = tx.clone();
        let g = g.clone();
        thread::spawn(move || {
            for _ in 0..10000 {
                tx.send(g.generate()).unwrap();
            }
        });
    }
    drop(tx);

    let mut s = HashSet::new();
    while let Ok(e) = rx.recv() {
        s.insert(e);
    }

    assert_eq!(s.len(), 4 * 10000);
}

/// Gives a forked child its own fingerprint and random field
#[cfg(unix)]
#[test]
fn gives_a_forked_child_its_own_fingerprint_and_random_field() {
    use std::{fs::File, io::Read as _, os::unix::io::FromRawFd as _, panic};

    let g = Generator::new().with_time_source(FixedClock(0));
    g.generate();

    let mut fds = [0; 2];
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
    let pid = unsafe { libc::fork() };
    assert!(pid >= 0);
    if pid == 0 {
        let id = panic::catch_unwind(panic::AssertUnwindSafe(|| g.generate())).unwrap_or_default();
        unsafe {
            libc::write(fds[1], id.as_ptr().cast(), id.len());
            libc::_exit(0);
        }
    }

    unsafe { libc::close(fds[1]) };
    let parent = g.generate();
    let mut child = String::new();
    unsafe { File::from_raw_fd(fds[0]) }
        .read_to_string(&mut child)
        .unwrap();
    let mut status = 0;
    assert_eq!(unsafe { libc::waitpid(pid, &mut status, 0) }, pid);

    assert_eq!(child.len(), parent.len());
    assert_eq!(tail_fields(&child).0, tail_fields(&parent).0);
    assert_ne!(tail_fields(&child).2, tail_fields(&parent).2);

    // the child's fingerprint ends with its own process ID
    let mut expected = [b'0'; 2];
    base36::write_padded(pid as u64 % crate::MAX_HALF_INT, &mut expected);
    assert_eq!(&tail_fields(&child).1.as_bytes()[2..], &expected);
    assert_eq!(tail_fields(&parent).1, crate::process_fingerprint().as_str());
}
