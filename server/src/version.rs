use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    sync::LazyLock,
};

use regex::Regex;
use thiserror::Error;

const SEPARATOR: char = '.';

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)?(\.[0-9]+)?$").expect("Invalid version regex")
});

/// One of the three numbers of a [`Version`] together with whether it was ever written.
///
/// An absent segment always holds the value `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Segment {
    value: u64,
    present: bool,
}

impl Segment {
    #[must_use]
    pub const fn present(value: u64) -> Self {
        Self {
            value,
            present: true,
        }
    }

    #[must_use]
    pub const fn absent() -> Self {
        Self {
            value: 0,
            present: false,
        }
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.present
    }

    const fn increment(self) -> Self {
        Self::present(self.value.saturating_add(1))
    }

    const fn promote(self) -> Self {
        Self::present(self.value)
    }

    const fn reset(self) -> Self {
        Self {
            value: 0,
            present: self.present,
        }
    }
}

/// Selects which segment of a version a bump applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Major,
    Minor,
    Patch,
}

impl Element {
    pub const ALL: [Element; 3] = [Element::Major, Element::Minor, Element::Patch];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Element::Major => "major",
            Element::Minor => "minor",
            Element::Patch => "patch",
        }
    }
}

impl Display for Element {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Element {
    type Err = UnknownElementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "major" => Ok(Element::Major),
            "minor" => Ok(Element::Minor),
            "patch" => Ok(Element::Patch),
            _ => Err(UnknownElementError(value.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a version element, expected major, minor or patch")]
pub struct UnknownElementError(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{segment}` in `{text}` is not a valid version number")]
pub struct ParseVersionError {
    text: String,
    segment: String,
}

impl ParseVersionError {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A `major.minor.patch` version where trailing segments may not have been promoted yet.
///
/// `"1"` only tracks a major number, `"1.0"` tracks major and minor. Bumping a lower segment
/// promotes every segment above it, bumping a higher segment never introduces lower ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[must_use]
pub struct Version {
    major: Segment,
    minor: Segment,
    patch: Segment,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major: Segment::present(major),
            minor: Segment::present(minor),
            patch: Segment::present(patch),
        }
    }

    /// Parses stored or previously validated text.
    ///
    /// The empty string is the version nothing has been written to yet. Segments after the
    /// third are ignored; use [`Version::validate`] first on untrusted input.
    pub fn parse(text: &str) -> Result<Self, ParseVersionError> {
        let mut version = Self::default();
        if text.is_empty() {
            return Ok(version);
        }

        let mut segments = text.split(SEPARATOR).map(|segment| parse_segment(text, segment));
        if let Some(major) = segments.next() {
            version.major = major?;
        }
        if let Some(minor) = segments.next() {
            version.minor = minor?;
        }
        if let Some(patch) = segments.next() {
            version.patch = patch?;
        }
        Ok(version)
    }

    /// Checks client supplied text against the `N`, `N.N` or `N.N.N` syntax.
    #[must_use]
    pub fn validate(text: &str) -> bool {
        VERSION_PATTERN.is_match(text)
    }

    #[must_use]
    pub const fn major(&self) -> Segment {
        self.major
    }

    #[must_use]
    pub const fn minor(&self) -> Segment {
        self.minor
    }

    #[must_use]
    pub const fn patch(&self) -> Segment {
        self.patch
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.major.present && !self.minor.present && !self.patch.present
    }

    pub const fn bump(self, element: Element) -> Self {
        match element {
            Element::Major => self.bump_major(),
            Element::Minor => self.bump_minor(),
            Element::Patch => self.bump_patch(),
        }
    }

    pub const fn bump_major(self) -> Self {
        Self {
            major: self.major.increment(),
            minor: self.minor.reset(),
            patch: self.patch.reset(),
        }
    }

    pub const fn bump_minor(self) -> Self {
        Self {
            major: self.major.promote(),
            minor: self.minor.increment(),
            patch: self.patch.reset(),
        }
    }

    pub const fn bump_patch(self) -> Self {
        Self {
            major: self.major.promote(),
            minor: self.minor.promote(),
            patch: self.patch.increment(),
        }
    }
}

fn parse_segment(text: &str, segment: &str) -> Result<Segment, ParseVersionError> {
    let error = || ParseVersionError {
        text: text.to_string(),
        segment: segment.to_string(),
    };

    // u64::from_str would also accept a leading '+'
    if segment.is_empty() || !segment.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(error());
    }
    segment.parse().map(Segment::present).map_err(|_| error())
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl Display for Version {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in [self.major, self.minor, self.patch] {
            if !segment.present {
                continue;
            }
            if !first {
                write!(formatter, "{SEPARATOR}")?;
            }
            write!(formatter, "{}", segment.value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::{proptest, string::string_regex};

    use super::{Element, Segment, Version};

    fn parsed(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    #[test]
    fn parse_tracks_presence() {
        assert_eq!(
            parsed("1"),
            Version {
                major: Segment::present(1),
                minor: Segment::absent(),
                patch: Segment::absent(),
            }
        );
        assert_eq!(
            parsed("1.0"),
            Version {
                major: Segment::present(1),
                minor: Segment::present(0),
                patch: Segment::absent(),
            }
        );
        assert_eq!(parsed("1.0.0"), Version::new(1, 0, 0));
        assert_eq!(parsed("10.02.030"), Version::new(10, 2, 30));
    }

    #[test]
    fn parse_empty_is_not_an_error() {
        let version = parsed("");
        assert!(version.is_empty());
        assert_eq!(version.to_string(), "");
    }

    #[test]
    fn parse_rejects_non_numeric_segments() {
        for invalid in ["aaa", "1.", ".1", "1.a.0", "1..2", "+1", "-1", "1. 2"] {
            let error = Version::parse(invalid).unwrap_err();
            assert_eq!(error.text(), invalid);
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(Version::parse("18446744073709551616").is_err());
        assert_eq!(
            parsed("18446744073709551615").major().value(),
            u64::MAX
        );
    }

    #[test]
    fn parse_ignores_segments_after_patch() {
        assert_eq!(parsed("1.2.3.4"), Version::new(1, 2, 3));
    }

    #[test]
    fn validate_accepts_one_to_three_groups() {
        for valid in ["1", "1.0", "1.0.0", "0", "10.200.3000"] {
            assert!(Version::validate(valid), "{valid} should be valid");
        }
    }

    #[test]
    fn validate_rejects_malformed_text() {
        for invalid in [
            "", "aaa", "1.", ".1", "3.1.2.", "aaa1.1.1aaa", "1.2.3.4", "1..2", "1.2 ", "v1.2",
            "١",
        ] {
            assert!(!Version::validate(invalid), "{invalid:?} should be invalid");
        }
    }

    #[test]
    fn bump_major() {
        assert_eq!(parsed("1.0.0").bump_major().to_string(), "2.0.0");
        assert_eq!(parsed("1.0").bump_major().to_string(), "2.0");
        assert_eq!(parsed("1").bump_major().to_string(), "2");
        assert_eq!(parsed("1.4.7").bump_major().to_string(), "2.0.0");
        assert_eq!(parsed("").bump_major().to_string(), "1");
    }

    #[test]
    fn bump_minor() {
        assert_eq!(parsed("1.0.0").bump_minor().to_string(), "1.1.0");
        assert_eq!(parsed("1.0").bump_minor().to_string(), "1.1");
        assert_eq!(parsed("1").bump_minor().to_string(), "1.1");
        assert_eq!(parsed("1.4.7").bump_minor().to_string(), "1.5.0");
        assert_eq!(parsed("").bump_minor().to_string(), "0.1");
    }

    #[test]
    fn bump_patch() {
        assert_eq!(parsed("1.0.0").bump_patch().to_string(), "1.0.1");
        assert_eq!(parsed("1.0").bump_patch().to_string(), "1.0.1");
        assert_eq!(parsed("1").bump_patch().to_string(), "1.0.1");
        assert_eq!(parsed("").bump_patch().to_string(), "0.0.1");
    }

    #[test]
    fn bump_saturates_at_max() {
        let version = Version::new(u64::MAX, 0, 0).bump_major();
        assert_eq!(version.major().value(), u64::MAX);
    }

    #[test]
    fn bump_dispatches_on_element() {
        let version = parsed("1.2.3");
        assert_eq!(version.bump(Element::Major), version.bump_major());
        assert_eq!(version.bump(Element::Minor), version.bump_minor());
        assert_eq!(version.bump(Element::Patch), version.bump_patch());
    }

    #[test]
    fn element_names() {
        for element in Element::ALL {
            assert_eq!(element.as_str().parse::<Element>().unwrap(), element);
        }
        assert!("build".parse::<Element>().is_err());
    }

    const CANONICAL_VERSION: &str = "(0|[1-9][0-9]{0,8})(\\.(0|[1-9][0-9]{0,8})){0,2}";
    const ANY_VERSION: &str = "[0-9]{1,9}(\\.[0-9]{1,9}){0,2}";

    proptest! {
        #[test]
        fn canonical_text_formats_back_unchanged(text in string_regex(CANONICAL_VERSION).unwrap()) {
            assert!(Version::validate(&text));
            assert_eq!(parsed(&text).to_string(), text);
        }

        #[test]
        fn validated_text_always_parses(text in string_regex(ANY_VERSION).unwrap()) {
            assert!(Version::validate(&text));
            let version = parsed(&text);
            assert_eq!(
                version.to_string().split('.').count(),
                text.split('.').count()
            );
        }

        #[test]
        fn bump_major_resets_lower_segments(text in string_regex(ANY_VERSION).unwrap()) {
            let version = parsed(&text);
            let bumped = version.bump_major();

            assert_eq!(bumped.major().value(), version.major().value() + 1);
            assert!(bumped.major().is_present());
            assert_eq!(bumped.minor(), Segment { value: 0, present: version.minor().is_present() });
            assert_eq!(bumped.patch(), Segment { value: 0, present: version.patch().is_present() });
        }

        #[test]
        fn lower_bumps_promote_higher_segments(text in string_regex(ANY_VERSION).unwrap()) {
            let version = parsed(&text);

            let minor = version.bump_minor();
            assert!(minor.major().is_present() && minor.minor().is_present());
            assert_eq!(minor.major().value(), version.major().value());
            assert_eq!(minor.minor().value(), version.minor().value() + 1);

            let patch = version.bump_patch();
            assert!(patch.major().is_present() && patch.minor().is_present() && patch.patch().is_present());
            assert_eq!(patch.patch().value(), version.patch().value() + 1);
        }
    }
}
