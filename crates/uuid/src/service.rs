//! Internal implementation of the [`Identifier`] value type.

use crate::{EntropyError, ParseError, ParseErrorKind, UuidResult};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use std::{fmt, str::FromStr};
use uuid::{Builder, Uuid};

/// Length in bytes of the canonical hyphenated form.
pub const CANONICAL_LEN: usize = 36;

/// Byte offsets of the four hyphens in the canonical form.
const HYPHEN_OFFSETS: [usize; 4] = [8, 13, 18, 23];

/// A 128-bit universally unique identifier.
///
/// `Identifier` is a plain value: it is `Copy`, compares by its bytes and carries no other
/// state. Two identifiers holding the same 16 bytes are indistinguishable.
///
/// # Construction
/// - [`Identifier::generate`] draws a fresh random version-4 identifier.
/// - [`Identifier::parse`] decodes the canonical textual form.
/// - [`Identifier::nil`] (or [`Identifier::NIL`]) is the all-zero identifier.
///
/// # Display format
/// When displayed or converted to string, an `Identifier` always produces the canonical
/// 36-character lowercase hyphenated form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(Uuid);

impl Identifier {
    /// The all-zero identifier.
    pub const NIL: Self = Self(Uuid::nil());

    /// Generates a new random (version 4) identifier.
    ///
    /// The 16 bytes come from the operating system's secure random source, with the version
    /// nibble of byte 6 forced to `0100` and the top two bits of byte 8 forced to `10`.
    ///
    /// # Aborts
    ///
    /// If the secure random source fails, the failure is logged and the process is aborted.
    /// Use [`Identifier::try_generate`] to receive the [`EntropyError`] instead.
    pub fn generate() -> Self {
        match Self::try_generate() {
            Ok(id) => id,
            Err(err) => entropy_failure(err),
        }
    }

    /// Generates a new random identifier, returning an error if entropy is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`EntropyError`] if the operating system's random source fails.
    pub fn try_generate() -> Result<Self, EntropyError> {
        Self::try_generate_with(&mut OsRng)
    }

    /// Generates a new random identifier from the given cryptographically secure generator.
    ///
    /// The version and variant bits are forced after the random bytes are drawn, so every
    /// identifier produced here reports version 4 and the RFC 4122 variant.
    ///
    /// # Arguments
    ///
    /// * `rng` - Secure generator that supplies the 16 random bytes.
    ///
    /// # Returns
    ///
    /// Returns a newly generated version-4 [`Identifier`].
    ///
    /// # Errors
    ///
    /// Returns [`EntropyError`] if `rng` fails to fill the 16 random bytes.
    pub fn try_generate_with<R>(rng: &mut R) -> Result<Self, EntropyError>
    where
        R: RngCore + CryptoRng,
    {
        let mut bytes = [0u8; 16];
        rng.try_fill_bytes(&mut bytes).map_err(EntropyError::Source)?;

        let id = Self(Builder::from_random_bytes(bytes).into_uuid());
        tracing::debug!(%id, "generated identifier");
        Ok(id)
    }

    /// Returns the all-zero identifier.
    pub const fn nil() -> Self {
        Self::NIL
    }

    /// Wraps 16 raw bytes without touching the version or variant bits.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parses the canonical hyphenated form.
    ///
    /// Hex digits may be in either case; hyphens must sit at byte offsets 8, 13, 18 and 23.
    /// The layout is checked here, so the simple, braced and URN forms that `uuid` would
    /// otherwise accept are rejected before decoding. The decoded bytes are returned as-is,
    /// without checking the version or variant bits.
    ///
    /// # Arguments
    ///
    /// * `input` - Candidate UUID text, exactly 36 bytes in the `8-4-4-4-12` layout.
    ///
    /// # Returns
    ///
    /// Returns the [`Identifier`] holding the 16 decoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `input` is not exactly 36 bytes, if the hyphens are missing
    /// or misplaced, or if any other character is not a hex digit.
    pub fn parse(input: &str) -> UuidResult<Self> {
        let raw = input.as_bytes();
        if raw.len() != CANONICAL_LEN {
            return Err(ParseError::new(ParseErrorKind::InvalidLength(raw.len())));
        }

        if let Some((index, character)) = input.char_indices().find(|(_, c)| !c.is_ascii()) {
            return Err(ParseError::new(ParseErrorKind::InvalidCharacter {
                character,
                index,
            }));
        }

        let groups_ok = raw
            .iter()
            .enumerate()
            .all(|(index, &b)| (b == b'-') == HYPHEN_OFFSETS.contains(&index));
        if !groups_ok {
            return Err(ParseError::new(ParseErrorKind::InvalidGroups));
        }

        Uuid::try_parse(input)
            .map(Self)
            .map_err(|_| invalid_character(input))
    }

    /// Returns true if [`Identifier::parse`] accepts `input`.
    pub fn validate(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    /// Renders the canonical 36-character lowercase hyphenated form.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Byte-wise equality.
    pub fn equal(&self, other: &Self) -> bool {
        self == other
    }

    /// Returns true for the all-zero identifier.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Returns the 16 raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Returns the version nibble (the high four bits of byte 6).
    ///
    /// Generated identifiers always report `4`. Parsed identifiers report whatever was
    /// written, since [`Identifier::parse`] does not check these bits.
    ///
    /// # Returns
    ///
    /// Returns a value in `0..=15`.
    pub fn version(&self) -> u8 {
        self.as_bytes()[6] >> 4
    }

    /// Returns true if the top two bits of byte 8 are `10` (the RFC 4122 variant).
    pub fn is_rfc4122_variant(&self) -> bool {
        self.as_bytes()[8] & 0xc0 == 0x80
    }
}

impl fmt::Display for Identifier {
    /// Formats the identifier in canonical form (36 lowercase characters, hyphenated).
    ///
    /// The output has the same shape for every value, including the nil identifier.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Identifier {
    type Err = ParseError;

    /// Parses a string into an `Identifier`, requiring the canonical layout.
    ///
    /// This is equivalent to calling [`Identifier::parse`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the string is not a canonical UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

impl From<[u8; 16]> for Identifier {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Identifier> for [u8; 16] {
    fn from(id: Identifier) -> Self {
        *id.as_bytes()
    }
}

/// Locates the first non-hex digit in input whose length and hyphens are already valid.
fn invalid_character(input: &str) -> ParseError {
    let kind = input
        .char_indices()
        .find(|(index, c)| !HYPHEN_OFFSETS.contains(index) && !c.is_ascii_hexdigit())
        .map(|(index, character)| ParseErrorKind::InvalidCharacter { character, index })
        .unwrap_or(ParseErrorKind::InvalidGroups);
    ParseError::new(kind)
}

fn entropy_failure(err: EntropyError) -> ! {
    tracing::error!(error = %err, "cannot generate identifier without entropy, aborting");
    eprintln!("uuid: cannot generate random identifier: {err}");
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const SAMPLE: &str = "550e8400-e29b-41d4-a716-446655440000";

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "entropy pool unavailable",
            )))
        }
    }

    impl CryptoRng for FailingRng {}

    fn is_canonical_shape(s: &str) -> bool {
        s.len() == CANONICAL_LEN
            && s.bytes().enumerate().all(|(i, b)| {
                if HYPHEN_OFFSETS.contains(&i) {
                    b == b'-'
                } else {
                    matches!(b, b'0'..=b'9' | b'a'..=b'f')
                }
            })
    }

    #[test]
    fn test_generate_sets_version_and_variant() {
        for _ in 0..1_000 {
            let id = Identifier::generate();
            let bytes = id.as_bytes();

            assert_eq!(bytes[6] >> 4, 0b0100);
            assert_eq!(bytes[8] >> 6, 0b10);
            assert_eq!(id.version(), 4);
            assert!(id.is_rfc4122_variant());
            assert!(Identifier::validate(&id.render()));
        }
    }

    #[test]
    fn test_generate_is_unique() {
        let ids: HashSet<Identifier> = (0..10_000).map(|_| Identifier::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_generate_from_many_threads() {
        let ids: Vec<Identifier> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..500)
                            .map(|_| Identifier::generate())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().expect("generator thread panicked"))
                .collect()
        });

        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(|id| id.version() == 4));
    }

    #[test]
    fn test_try_generate_reports_entropy_failure() {
        let result = Identifier::try_generate_with(&mut FailingRng);

        match result {
            Err(EntropyError::Source(err)) => {
                assert!(err.to_string().contains("entropy pool unavailable"));
            }
            Ok(id) => panic!("expected entropy failure, got {id}"),
        }
    }

    #[test]
    fn test_try_generate_succeeds_with_os_rng() {
        let id = Identifier::try_generate().unwrap();
        assert_eq!(id.version(), 4);
    }

    #[test]
    fn test_nil_renders_as_zeros() {
        let nil = Identifier::nil();

        assert_eq!(nil.render(), "00000000-0000-0000-0000-000000000000");
        assert_eq!(nil.as_bytes(), &[0u8; 16]);
        assert!(nil.is_nil());
        assert_eq!(nil, Identifier::NIL);
        assert_eq!(nil, Identifier::default());
    }

    #[test]
    fn test_render_groups_follow_byte_layout() {
        let id = Identifier::from_bytes([
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ]);

        assert_eq!(id.render(), "00112233-4455-6677-8899-aabbccddeeff");
        assert_eq!(format!("{id}"), id.render());
    }

    #[test]
    fn test_parse_valid_canonical_uuid() {
        let id = Identifier::parse(SAMPLE).unwrap();

        assert_eq!(id.render(), SAMPLE);
        assert_eq!(id.as_bytes()[0], 0x55);
        assert_eq!(id.as_bytes()[15], 0x00);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let upper = Identifier::parse("550E8400-E29B-41D4-A716-446655440000").unwrap();
        let mixed = Identifier::parse("550e8400-E29b-41D4-a716-446655440000").unwrap();
        let lower = Identifier::parse(SAMPLE).unwrap();

        assert_eq!(upper, lower);
        assert_eq!(mixed, lower);
        assert_eq!(upper.render(), SAMPLE);
    }

    #[test]
    fn test_parse_keeps_arbitrary_version_bits() {
        let text = "ffffffff-ffff-ffff-ffff-ffffffffffff";
        let id = Identifier::parse(text).unwrap();

        assert_eq!(id.version(), 0xf);
        assert!(!id.is_rfc4122_variant());
        assert_eq!(id.render(), text);
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = Identifier::parse("").unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::InvalidLength(0));
    }

    #[test]
    fn test_parse_rejects_too_short() {
        let err = Identifier::parse(&SAMPLE[..35]).unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::InvalidLength(35));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let err = Identifier::parse(&format!("{SAMPLE}0")).unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::InvalidLength(37));
    }

    #[test]
    fn test_parse_rejects_misplaced_hyphen() {
        // Still four hyphens and 32 hex digits, but the first group is short.
        let err = Identifier::parse("550e840-0e29b-41d4-a716-446655440000").unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::InvalidGroups);
    }

    #[test]
    fn test_parse_rejects_doubled_hyphen() {
        let err = Identifier::parse("550e8400--29b-41d4-a716-446655440000").unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::InvalidGroups);
    }

    #[test]
    fn test_parse_reports_first_non_hex_character() {
        let err = Identifier::parse("550e8400-e29b-41x4-a716-44665544000z").unwrap_err();
        assert_eq!(
            err.kind(),
            &ParseErrorKind::InvalidCharacter {
                character: 'x',
                index: 16
            }
        );
    }

    #[test]
    fn test_parse_decodes_same_bytes_as_uuid_crate() {
        let id = Identifier::parse("6BA7B810-9DAD-11D1-80B4-00C04FD430C8").unwrap();
        let expected = Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap();

        assert_eq!(id.as_bytes(), expected.as_bytes());
        assert_eq!(id.version(), 1);
    }

    #[test]
    fn test_parse_rejects_missing_hyphens() {
        let err = Identifier::parse("550e8400e29b41d4a716446655440000abcd").unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::InvalidGroups);
    }

    #[test]
    fn test_parse_rejects_non_hex_character() {
        let err = Identifier::parse("550e8400-e29b-41d4-a716-44665544000g").unwrap_err();
        assert_eq!(
            err.kind(),
            &ParseErrorKind::InvalidCharacter {
                character: 'g',
                index: 35
            }
        );
        assert!(err.to_string().starts_with("invalid UUID"));
    }

    #[test]
    fn test_parse_rejects_multibyte_character() {
        // 'é' is two bytes, so the total is still 36 bytes.
        let err = Identifier::parse("é50e8400-e29b-41d4-a716-44665544000").unwrap_err();
        assert_eq!(
            err.kind(),
            &ParseErrorKind::InvalidCharacter {
                character: 'é',
                index: 0
            }
        );
    }

    #[test]
    fn test_parse_rejects_other_uuid_forms() {
        assert!(Identifier::parse("550e8400e29b41d4a716446655440000").is_err());
        assert!(Identifier::parse("{550e8400-e29b-41d4-a716-446655440000}").is_err());
        assert!(Identifier::parse("urn:uuid:550e8400-e29b-41d4-a716-446655440000").is_err());
    }

    #[test]
    fn test_validate_matches_parse() {
        let inputs = [
            "",
            "not-a-uuid",
            SAMPLE,
            "550E8400-E29B-41D4-A716-446655440000",
            "550e8400-e29b-41d4-a716-44665544000g",
            "550e8400-e29b-41d4-a716-4466554400000",
            "00000000-0000-0000-0000-000000000000",
        ];

        for input in inputs {
            assert_eq!(Identifier::validate(input), Identifier::parse(input).is_ok());
        }
        assert!(!Identifier::validate("not-a-uuid"));
        assert!(Identifier::validate(SAMPLE));
    }

    #[test]
    fn test_equal() {
        let a = Identifier::generate();
        let b = Identifier::parse(&a.render()).unwrap();
        let c = Identifier::generate();

        assert!(a.equal(&a));
        assert!(a.equal(&b));
        assert!(!a.equal(&c));
    }

    #[test]
    fn test_from_str() {
        let parsed: Identifier = SAMPLE.parse().unwrap();
        assert_eq!(parsed.render(), SAMPLE);

        let result: Result<Identifier, _> = "not-a-uuid".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_byte_array_conversions() {
        let bytes = *Identifier::parse(SAMPLE).unwrap().as_bytes();
        let id = Identifier::from(bytes);
        let back: [u8; 16] = id.into();

        assert_eq!(back, bytes);
        assert_eq!(id.render(), SAMPLE);
    }

    proptest! {
        #[test]
        fn prop_render_parse_round_trip(bytes in any::<[u8; 16]>()) {
            let id = Identifier::from_bytes(bytes);
            let rendered = id.render();

            prop_assert!(is_canonical_shape(&rendered));
            prop_assert_eq!(Identifier::parse(&rendered).unwrap(), id);
            prop_assert_eq!(Identifier::parse(&rendered.to_uppercase()).unwrap(), id);
        }
    }
}
