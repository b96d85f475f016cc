//! Named rewrite rule sets.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named rewrite profile.
///
/// The docs site has been published by two generations of the export
/// pipeline. `Current` leaves tables alone and redacts internal hostnames and
/// edge bundle credentials; `Legacy` wraps tables in the site's table
/// shortcode and performs no hostname or credential redaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Current,
    Legacy,
}

/// How `./images/...` references are mapped onto the published image tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImagePaths {
    /// `/images/<version>/<output_dir>/<file>`
    Scoped,
    /// `/images/<version>/<file>`
    Direct,
}

impl Profile {
    pub fn name(&self) -> &'static str {
        match self {
            Profile::Current => "current",
            Profile::Legacy => "legacy",
        }
    }

    pub fn wraps_tables(&self) -> bool {
        matches!(self, Profile::Legacy)
    }

    /// Whether internal hostnames and embedded credentials are redacted.
    pub fn redacts_secrets(&self) -> bool {
        matches!(self, Profile::Current)
    }

    pub fn default_image_paths(&self) -> ImagePaths {
        match self {
            Profile::Current => ImagePaths::Scoped,
            Profile::Legacy => ImagePaths::Direct,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
