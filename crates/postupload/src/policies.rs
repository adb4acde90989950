//! Per-channel placement rules
//!
//! Each policy maps one source file to the ordered list of keys it must be
//! stored under. An empty list means the file is deliberately not published
//! to that channel. Required metadata is checked first, then that the file
//! lies under the source directory, and only then are paths computed.

use std::path::Path;
use tracing::debug;

use crate::channel::Channel;
use crate::context::{PathContext, file_name, join_key};
use crate::error::Result;
use crate::patterns::{self, L10N_DUPLICATES, LATEST_SKIPS, TINDERBOX_SKIPS};

const MAR_TOOLS_DIR: &str = "mar-tools";
const UNSIGNED_DIR: &str = "unsigned";

impl PathContext {
    /// Destinations of `file` in `channel`
    pub fn destinations(&self, channel: Channel, file: &Path) -> Result<Vec<String>> {
        match channel {
            Channel::Latest => self.to_latest(file),
            Channel::Dated => self.to_dated(file),
            Channel::Candidates => self.to_candidates(file),
            Channel::MobileCandidates => self.to_mobile_candidates(file),
            Channel::TinderboxBuilds => self.to_tinderbox_builds(file),
            Channel::DatedTinderboxBuilds => self.to_dated_tinderbox_builds(file),
            Channel::TryBuilds => self.to_try_builds(file),
        }
    }

    /// Required fields and source tree membership; returns the base name
    fn admit<'a>(&self, channel: Channel, file: &'a Path) -> Result<&'a str> {
        self.check_required(channel)?;
        let relative = self.relative_source(file)?;
        Ok(file_name(relative).unwrap_or_default())
    }

    /// `<product>/<nightly>/latest-<branch>[/<build_dir>]`
    ///
    /// Release tools go to `mar-tools/<platform>` below it, and primary en-US
    /// artifacts of non-l10n branches are duplicated into
    /// `latest-<branch>-l10n` so localised repacks can reuse them.
    pub fn to_latest(&self, file: &Path) -> Result<Vec<String>> {
        let name = self.admit(Channel::Latest, file)?;
        let branch = self.branch.as_str();

        if let Some(rule) = LATEST_SKIPS.find(name) {
            debug!(file = %file.display(), rule = rule.name, "skipping file for latest");
            return Ok(Vec::new());
        }

        let latest_dir = format!("latest-{branch}");
        let dest_dir = self.product_key(&[self.nightly_dir.as_str(), &latest_dir, &self.build_dir]);

        let mut dests = if patterns::preserves_l10n_layout(branch, name) {
            self.resolve_path(file, &dest_dir, true)?
        } else if self.is_release_tool(file) {
            let Some(platform) = self.platform() else {
                debug!(
                    file = %file.display(),
                    tinderbox_builds_dir = %self.tinderbox_builds_dir,
                    "no platform for release tool, skipping"
                );
                return Ok(Vec::new());
            };
            let tools_dir = format!("{dest_dir}/{MAR_TOOLS_DIR}/{platform}");
            self.resolve_path(file, &tools_dir, false)?
        } else {
            self.resolve_path(file, &dest_dir, false)?
        };

        if !patterns::is_l10n(branch) {
            if let Some(rule) = L10N_DUPLICATES.find(name) {
                let l10n_dir = format!("latest-{branch}-l10n");
                let dup_dir =
                    self.product_key(&[self.nightly_dir.as_str(), &l10n_dir, &self.build_dir]);
                debug!(file = %file.display(), rule = rule.name, "duplicating into {l10n_dir}");
                dests.extend(self.resolve_path(file, &dup_dir, false)?);
            }
        }

        Ok(dests)
    }

    /// `<product>/<nightly>/<year>/<month>/<stamp>-<branch>[/<build_dir>]`
    pub fn to_dated(&self, file: &Path) -> Result<Vec<String>> {
        let name = self.admit(Channel::Dated, file)?;
        let build_id = self.require_build_id(Channel::Dated)?;

        let dated_dir = format!("{}-{}", build_id.dated_stamp(), self.branch);
        let dest_dir = self.product_key(&[
            self.nightly_dir.as_str(),
            build_id.year(),
            build_id.month(),
            &dated_dir,
            &self.build_dir,
        ]);

        let preserve = patterns::preserves_l10n_layout(&self.branch, name);
        self.resolve_path(file, &dest_dir, preserve)
    }

    /// `<product>/candidates/<version>-candidates/build<n>[/unsigned]/<build_dir>`
    ///
    /// Directories are preserved, except for release tools which go flat into
    /// `build<n>/mar-tools/<platform>` when a platform is known.
    pub fn to_candidates(&self, file: &Path) -> Result<Vec<String>> {
        self.admit(Channel::Candidates, file)?;
        let build_root = self.candidates_build_root();

        if self.is_release_tool(file) {
            if let Some(platform) = self.platform() {
                let tools_dir = format!("{build_root}/{MAR_TOOLS_DIR}/{platform}");
                return self.resolve_path(file, &tools_dir, false);
            }
        }

        let unsigned = if self.needs_unsigned_dir(file) {
            UNSIGNED_DIR
        } else {
            ""
        };
        let dest_dir = join_key(&[build_root.as_str(), unsigned, self.build_dir.as_str()]);
        self.resolve_path(file, &dest_dir, true)
    }

    /// Candidates layout, always preserving directories
    pub fn to_mobile_candidates(&self, file: &Path) -> Result<Vec<String>> {
        self.admit(Channel::MobileCandidates, file)?;
        let dest_dir = join_key(&[self.candidates_build_root().as_str(), self.build_dir.as_str()]);
        self.resolve_path(file, &dest_dir, true)
    }

    /// `<product>/tinderbox-builds/<tinderbox_builds_dir>/<build_dir>`
    pub fn to_tinderbox_builds(&self, file: &Path) -> Result<Vec<String>> {
        let name = self.admit(Channel::TinderboxBuilds, file)?;
        let dest_dir = self.product_key(&[
            "tinderbox-builds",
            &self.tinderbox_builds_dir,
            &self.build_dir,
        ]);
        self.place_tinderbox(file, name, &dest_dir)
    }

    /// `<product>/tinderbox-builds/<tinderbox_builds_dir>/<epoch>/<build_dir>`
    pub fn to_dated_tinderbox_builds(&self, file: &Path) -> Result<Vec<String>> {
        let name = self.admit(Channel::DatedTinderboxBuilds, file)?;
        let epoch = self
            .require_build_id(Channel::DatedTinderboxBuilds)?
            .epoch_seconds()
            .to_string();
        let dest_dir = self.product_key(&[
            "tinderbox-builds",
            &self.tinderbox_builds_dir,
            &epoch,
            &self.build_dir,
        ]);
        self.place_tinderbox(file, name, &dest_dir)
    }

    /// `<product>/try-builds/<who>-<revision>/<build_dir>`, always flat
    pub fn to_try_builds(&self, file: &Path) -> Result<Vec<String>> {
        self.admit(Channel::TryBuilds, file)?;
        let try_dir = format!("{}-{}", self.who, self.revision);
        let dest_dir = self.product_key(&["try-builds", &try_dir, &self.build_dir]);
        self.resolve_path(file, &dest_dir, false)
    }

    fn candidates_build_root(&self) -> String {
        let candidates_dir = format!("{}-candidates", self.version);
        let build = format!("build{}", self.build_number);
        self.product_key(&["candidates", &candidates_dir, &build])
    }

    /// Unsigned Windows builds are kept apart from signed ones, logs excepted
    fn needs_unsigned_dir(&self, file: &Path) -> bool {
        let path = file.to_string_lossy();
        !self.signed && path.contains("win32") && !path.contains("/logs/")
    }

    fn place_tinderbox(&self, file: &Path, name: &str, dest_dir: &str) -> Result<Vec<String>> {
        if let Some(rule) = TINDERBOX_SKIPS.find(name) {
            debug!(file = %file.display(), rule = rule.name, "skipping file for tinderbox builds");
            return Ok(Vec::new());
        }
        let preserve = patterns::preserves_l10n_layout(&self.tinderbox_builds_dir, name);
        self.resolve_path(file, dest_dir, preserve)
    }
}
