//! Release channels and the metadata each one needs

use serde::{Deserialize, Serialize};
use std::fmt;

/// A distribution layout a release file can be placed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// `<product>/<nightly>/latest-<branch>`
    Latest,
    /// `<product>/<nightly>/<year>/<month>/<stamp>-<branch>`
    Dated,
    /// `<product>/candidates/<version>-candidates/build<n>`
    Candidates,
    /// Candidates layout with directories always preserved
    MobileCandidates,
    /// `<product>/tinderbox-builds/<dir>`
    TinderboxBuilds,
    /// `<product>/tinderbox-builds/<dir>/<epoch>`
    DatedTinderboxBuilds,
    /// `<product>/try-builds/<who>-<revision>`
    TryBuilds,
}

impl Channel {
    /// Every channel, in the order a run processes them
    pub const ALL: [Channel; 7] = [
        Channel::Latest,
        Channel::Dated,
        Channel::Candidates,
        Channel::MobileCandidates,
        Channel::TinderboxBuilds,
        Channel::DatedTinderboxBuilds,
        Channel::TryBuilds,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Latest => "latest",
            Channel::Dated => "dated",
            Channel::Candidates => "candidates",
            Channel::MobileCandidates => "mobile-candidates",
            Channel::TinderboxBuilds => "tinderbox-builds",
            Channel::DatedTinderboxBuilds => "dated-tinderbox-builds",
            Channel::TryBuilds => "try-builds",
        }
    }

    /// Metadata that must be present before any path is computed
    pub fn required_fields(&self) -> &'static [Field] {
        match self {
            Channel::Latest => &[Field::Branch],
            Channel::Dated => &[Field::BuildId],
            Channel::Candidates | Channel::MobileCandidates => {
                &[Field::Version, Field::BuildNumber]
            }
            Channel::TinderboxBuilds => &[],
            Channel::DatedTinderboxBuilds => &[Field::BuildId],
            Channel::TryBuilds => &[Field::Who, Field::Revision, Field::Product],
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A piece of release metadata a channel can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Branch,
    BuildId,
    Version,
    BuildNumber,
    Who,
    Revision,
    Product,
}

impl Field {
    /// Name of the command line flag supplying this field
    pub fn flag(&self) -> &'static str {
        match self {
            Field::Branch => "branch",
            Field::BuildId => "buildid",
            Field::Version => "version",
            Field::BuildNumber => "build-number",
            Field::Who => "who",
            Field::Revision => "revision",
            Field::Product => "product",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_are_unique() {
        let mut names: Vec<_> = Channel::ALL.iter().map(Channel::name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Channel::ALL.len());
    }

    #[test]
    fn test_serde_uses_channel_names() {
        for channel in Channel::ALL {
            let json = serde_json::to_string(&channel).unwrap();
            assert_eq!(json, format!("\"{}\"", channel.name()));
        }
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(Channel::Latest.required_fields(), &[Field::Branch]);
        assert!(Channel::TinderboxBuilds.required_fields().is_empty());
        assert_eq!(
            Channel::TryBuilds.required_fields(),
            &[Field::Who, Field::Revision, Field::Product]
        );
    }
}
