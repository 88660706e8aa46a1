//! Distribution channel selection

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

/// Distribution tag a release is published under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Latest,
    Alpha,
    Beta,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Latest => "latest",
            Channel::Alpha => "alpha",
            Channel::Beta => "beta",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the publish command is told which channel to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelPolicy {
    /// Pre-releases go to `alpha`/`beta`, everything else to `latest`
    #[default]
    Tagged,
    /// No tag is passed; the registry's default channel is used
    Default,
}

impl ChannelPolicy {
    /// Channel to pass to the publish command, if any
    pub fn select(self, version: &Version) -> Option<Channel> {
        match self {
            ChannelPolicy::Tagged => Some(channel_of(version)),
            ChannelPolicy::Default => None,
        }
    }
}

/// Channel of a parsed release.
///
/// Only the pre-release label is inspected; build metadata never moves a
/// release off `latest`.
pub fn channel_of(version: &Version) -> Channel {
    channel_for(version.pre.as_str())
}

/// Map a pre-release label to its channel.
///
/// "alpha" is checked before "beta", so a label carrying both goes to `alpha`.
pub fn channel_for(version: &str) -> Channel {
    if version.contains("alpha") {
        Channel::Alpha
    } else if version.contains("beta") {
        Channel::Beta
    } else {
        Channel::Latest
    }
}
