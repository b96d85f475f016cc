//! Markdown rewriting for publication.
//!
//! Converted notebooks are a Markdown/HTML hybrid. The [`Rewriter`] runs an
//! ordered list of named [`Rule`]s over the whole document to strip
//! rendering artifacts, publish image paths as figure shortcodes, and redact
//! a short allowlist of known private values.

mod rules;

use std::borrow::Cow;

use crate::domain::{ImagePaths, Profile};

pub use rules::{
    CREDENTIAL_PLACEHOLDER, EMAIL_PLACEHOLDER, PRIVATE_DOMAIN, PRIVATE_EMAIL,
    PRIVATE_REGISTRY_URL, PUBLIC_DOMAIN, REGISTRY_URL_PLACEHOLDER, Rule, RuleContext,
    published_image_path,
};

/// Default site release tag used in published image paths.
pub const DEFAULT_VERSION: &str = "2024.1";
/// Default display width of figure shortcodes.
pub const DEFAULT_FIGURE_WIDTH: u32 = 800;

/// Site-wide values shared by every job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteSettings {
    pub version: String,
    pub figure_width: u32,
    pub image_paths: ImagePaths,
}

impl RewriteSettings {
    /// Default settings for a profile.
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            figure_width: DEFAULT_FIGURE_WIDTH,
            image_paths: profile.default_image_paths(),
        }
    }
}

/// Result of rewriting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    /// Names of the rules that changed the text, in application order.
    pub applied: Vec<&'static str>,
}

/// Applies a profile's rules, in order, to whole documents.
///
/// # Example
///
/// ```
/// use nbexport::domain::Profile;
/// use nbexport::rewrite::Rewriter;
///
/// let rewriter = Rewriter::for_profile(Profile::Current);
/// let out = rewriter.apply("<div>\n![png](./images/foo.png)\n</div>", "docs/keras");
/// assert_eq!(
///     out.text,
///     "\n{{<figure src=\"/images/2024.1/docs/keras/foo.png\" width=\"800\" label=\"png\">}}\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Rewriter {
    profile: Profile,
    rules: Vec<Rule>,
    settings: RewriteSettings,
}

impl Rewriter {
    pub fn new(profile: Profile, settings: RewriteSettings) -> Self {
        let rules = Rule::ALL
            .into_iter()
            .filter(|r| r.enabled_in(profile))
            .collect();
        Self {
            profile,
            rules,
            settings,
        }
    }

    pub fn for_profile(profile: Profile) -> Self {
        Self::new(profile, RewriteSettings::for_profile(profile))
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn settings(&self) -> &RewriteSettings {
        &self.settings
    }

    /// Rewrites a document belonging to a job with the given output directory.
    pub fn apply(&self, doc: &str, output_dir: &str) -> Rewritten {
        let ctx = RuleContext {
            version: &self.settings.version,
            output_dir: output_dir.trim_matches('/'),
            image_paths: self.settings.image_paths,
            figure_width: self.settings.figure_width,
        };

        let mut text = doc.to_string();
        let mut applied = Vec::new();
        for rule in &self.rules {
            if let Cow::Owned(next) = rule.apply(&text, &ctx) {
                if next != text {
                    tracing::debug!(rule = rule.name(), "rule changed document");
                    applied.push(rule.name());
                    text = next;
                }
            }
        }

        Rewritten { text, applied }
    }
}
