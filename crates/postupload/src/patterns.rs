//! Declared file name rules used by the channel policies
//!
//! Exceptions to the regular layout are kept here as named tables rather than
//! scattered through the policies, so each rule can be audited and tested on
//! its own. All rules match against a file's base name.

use once_cell::sync::Lazy;
use regex::Regex;

/// Platform tags, in priority order. The first tag `<dir>` ends with (after a
/// `-`) wins, so the order is part of observable routing.
pub const PLATFORMS: [&str; 5] = ["win32", "macosx64", "linux", "linux64", "win64"];

/// Binaries used to generate updates, routed to `mar-tools/<platform>`
pub const RELEASE_TOOLS: [&str; 4] = ["mar", "mar.exe", "mbsdiff", "mbsdiff.exe"];

/// A named regular expression over file names
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
}

impl Rule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            // Patterns are compile-time constants covered by the tests below
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("rule {name}: {e}")),
        }
    }

    pub fn is_match(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }
}

/// An ordered set of rules; the first matching rule is reported
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    fn new(rules: &[(&'static str, &str)]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|(name, pattern)| Rule::new(name, pattern))
                .collect(),
        }
    }

    /// The first rule matching `file_name`
    pub fn find(&self, file_name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.is_match(file_name))
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.find(file_name).is_some()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Files never published to a `latest-*` directory
pub static LATEST_SKIPS: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::new(&[
        ("crashreporter-symbols", r"crashreporter-symbols\.zip$"),
        ("partial-mar", r"\.partial\..*\.mar(\.asc)?$"),
    ])
});

/// Primary en-US artifacts that are also published to `latest-<branch>-l10n`
pub static L10N_DUPLICATES: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::new(&[
        ("en-us-windows-zip", r"\.en-US\.win(32|64)\.zip$"),
        (
            "en-us-package",
            r"en-US.*\.(checksums|complete\.mar|tar\.bz2|dmg|exe)(\.asc)?$",
        ),
    ])
});

/// Files never published to tinderbox builds directories
pub static TINDERBOX_SKIPS: Lazy<RuleTable> =
    Lazy::new(|| RuleTable::new(&[("mar", r"\.mar$")]));

/// Whether a directory named `dir` is a localisation directory
pub fn is_l10n(dir: &str) -> bool {
    dir.ends_with("l10n")
}

/// Localised language packs keep their directory layout in l10n directories
pub fn preserves_l10n_layout(dir: &str, file_name: &str) -> bool {
    is_l10n(dir) && file_name.ends_with(".xpi")
}

/// Whether `file_name` is one of [`RELEASE_TOOLS`]
pub fn is_release_tool(file_name: &str) -> bool {
    RELEASE_TOOLS.contains(&file_name)
}

/// The first platform tag `dir` ends with, preceded by a `-`
pub fn platform_of(dir: &str) -> Option<&'static str> {
    if dir.is_empty() {
        return None;
    }
    PLATFORMS.iter().copied().find(|tag| {
        dir.strip_suffix(tag)
            .is_some_and(|rest| rest.ends_with('-'))
    })
}
