//! Command line flags

use clap::Parser;
use postupload::{BuildId, Channel, DEFAULT_NIGHTLY_DIR, PathContext, ReleaseError};
use postupload_storage::publish::DEFAULT_CONCURRENCY;
use std::path::PathBuf;

/// Flags each channel switch needs, as checked before anything runs
const CHANNEL_FLAGS: [(Channel, &[&str]); 7] = [
    (Channel::Latest, &["branch"]),
    (Channel::Dated, &["branch", "buildid", "nightly-dir"]),
    (Channel::Candidates, &["version", "build-number"]),
    (Channel::MobileCandidates, &["version", "build-number", "builddir"]),
    (Channel::TinderboxBuilds, &["tinderbox-builds-dir"]),
    (Channel::DatedTinderboxBuilds, &["tinderbox-builds-dir", "buildid"]),
    (Channel::TryBuilds, &["who", "revision", "builddir"]),
];

#[derive(Debug, Parser)]
#[command(
    name = "post_upload",
    about = "Publish freshly built release files to the product delivery tree"
)]
pub struct Args {
    /// Set product name to build paths properly.
    #[arg(short, long)]
    pub product: Option<String>,

    /// Set version number to build paths properly.
    #[arg(short, long)]
    pub version: Option<String>,

    /// Set the base directory for nightlies (ie $product/$nightly_dir/).
    #[arg(long, default_value = DEFAULT_NIGHTLY_DIR)]
    pub nightly_dir: String,

    /// Set branch name to build paths properly.
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Set buildid to build paths properly.
    #[arg(short = 'i', long)]
    pub buildid: Option<String>,

    /// Set build number to build paths properly.
    #[arg(short = 'n', long)]
    pub build_number: Option<String>,

    #[arg(short, long)]
    pub revision: Option<String>,

    #[arg(short, long)]
    pub who: Option<String>,

    /// Subdir to arrange packaged unittest build paths properly.
    #[arg(long)]
    pub builddir: Option<String>,

    /// Set tinderbox builds dir to build paths properly.
    #[arg(long)]
    pub tinderbox_builds_dir: Option<String>,

    /// Copy files to $product/$nightly_dir/latest-$branch
    #[arg(short = 'l', long)]
    pub release_to_latest: bool,

    /// Copy files to $product/$nightly_dir/$datedir-$branch
    #[arg(short = 'd', long)]
    pub release_to_dated: bool,

    /// Copy files to $product/candidates/$version-candidates/build$build_number
    #[arg(short = 'c', long)]
    pub release_to_candidates_dir: bool,

    /// Copy mobile files to $product/candidates/$version-candidates/build$build_number
    #[arg(long)]
    pub release_to_mobile_candidates_dir: bool,

    /// Copy files to $product/tinderbox-builds/$tinderbox_builds_dir
    #[arg(short = 't', long)]
    pub release_to_tinderbox_builds: bool,

    /// Copy files to $product/tinderbox-builds/$tinderbox_builds_dir/$timestamp
    #[arg(long, alias = "release-to-tinderbox-dated-builds")]
    pub release_to_dated_tinderbox_builds: bool,

    /// Copy files to $product/try-builds/$who-$revision
    #[arg(long)]
    pub release_to_try_builds: bool,

    /// Don't use unsigned directory for uploaded files
    #[arg(long)]
    pub signed: bool,

    /// Put every key in this bucket instead of following the bucket map
    #[arg(long, env = "S3_BUCKET")]
    pub bucket: Option<String>,

    /// Print destinations without copying anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Files of a channel copied at the same time
    #[arg(long, env = "POST_UPLOAD_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Directory the files were uploaded to
    pub upload_dir: PathBuf,

    /// Files to publish
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl Args {
    /// Selected channels, in processing order
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|channel| self.selects(*channel))
            .collect()
    }

    fn selects(&self, channel: Channel) -> bool {
        match channel {
            Channel::Latest => self.release_to_latest,
            Channel::Dated => self.release_to_dated,
            Channel::Candidates => self.release_to_candidates_dir,
            Channel::MobileCandidates => self.release_to_mobile_candidates_dir,
            Channel::TinderboxBuilds => self.release_to_tinderbox_builds,
            Channel::DatedTinderboxBuilds => self.release_to_dated_tinderbox_builds,
            Channel::TryBuilds => self.release_to_try_builds,
        }
    }

    fn flag(&self, name: &str) -> Option<&str> {
        let value = match name {
            "product" => &self.product,
            "version" => &self.version,
            "branch" => &self.branch,
            "buildid" => &self.buildid,
            "build-number" => &self.build_number,
            "revision" => &self.revision,
            "who" => &self.who,
            "builddir" => &self.builddir,
            "tinderbox-builds-dir" => &self.tinderbox_builds_dir,
            "nightly-dir" => return Some(self.nightly_dir.as_str()).filter(|v| !v.is_empty()),
            _ => return None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Every missing flag, reported together
    pub fn problems(&self) -> Vec<String> {
        let mut required = vec!["product"];
        for (channel, flags) in CHANNEL_FLAGS {
            if self.selects(channel) {
                required.extend_from_slice(flags);
            }
        }

        let mut problems = Vec::new();
        for flag in required {
            let message = format!("--{flag} must be set");
            if self.flag(flag).is_none() && !problems.contains(&message) {
                problems.push(message);
            }
        }
        problems
    }

    /// Release metadata described by the flags
    pub fn path_context(&self) -> Result<PathContext, ReleaseError> {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        let mut ctx = PathContext::new(&self.upload_dir, text(&self.product));
        ctx.branch = text(&self.branch);
        ctx.build_dir = text(&self.builddir);
        ctx.nightly_dir = self.nightly_dir.clone();
        ctx.tinderbox_builds_dir = text(&self.tinderbox_builds_dir);
        ctx.version = text(&self.version);
        ctx.build_number = text(&self.build_number);
        ctx.who = text(&self.who);
        ctx.revision = text(&self.revision);
        ctx.signed = self.signed;
        ctx.build_id = match self.buildid.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(BuildId::parse(raw)?),
        };
        Ok(ctx)
    }
}
