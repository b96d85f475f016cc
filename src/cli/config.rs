//! Configuration file support.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::convert::ConverterSpec;
use crate::domain::{ImagePaths, Profile};
use crate::export::ExportPaths;
use crate::rewrite::{DEFAULT_FIGURE_WIDTH, DEFAULT_VERSION, RewriteSettings};

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "nbexport.toml";

const DEFAULT_DOCS_ROOT: &str = "docs/markdown";
const DEFAULT_IMAGE_ROOT: &str = "images";
const DEFAULT_MANIFEST: &str = "export-jobs.toml";

/// Project configuration loaded from `nbexport.toml`.
///
/// Relative paths in the file resolve against the directory containing it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the published Markdown tree
    pub docs_root: Option<PathBuf>,

    /// Root of the published image tree. Defaults to `images/<version>`,
    /// the directory that figure shortcodes point into.
    pub image_root: Option<PathBuf>,

    /// Job manifest file
    pub manifest: Option<PathBuf>,

    /// Rewrite profile
    pub profile: Option<Profile>,

    /// Site release tag used in image paths
    pub version: Option<String>,

    /// Display width of figure shortcodes
    pub figure_width: Option<u32>,

    /// Override the profile's image path mode
    pub image_paths: Option<ImagePaths>,

    /// Converter command
    pub converter: Option<ConverterSpec>,

    #[serde(skip)]
    project_dir: PathBuf,
}

impl Config {
    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, `./nbexport.toml` is used if
    /// present, otherwise defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = PathBuf::from(CONFIG_FILE_NAME);
                if !path.is_file() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config = Self::parse(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.project_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Directory that relative config paths and job inputs resolve against.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn resolve(&self, value: Option<&PathBuf>, default: &str) -> PathBuf {
        let path = value.map(PathBuf::as_path).unwrap_or(Path::new(default));
        self.project_dir.join(path)
    }

    pub fn docs_root(&self) -> PathBuf {
        self.resolve(self.docs_root.as_ref(), DEFAULT_DOCS_ROOT)
    }

    pub fn image_root(&self) -> PathBuf {
        match &self.image_root {
            Some(path) => self.project_dir.join(path),
            None => self
                .project_dir
                .join(DEFAULT_IMAGE_ROOT)
                .join(self.version()),
        }
    }

    fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Resolve the manifest path, with the CLI argument taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--manifest` argument (relative to the working directory)
    /// 2. Config file `manifest` setting
    /// 3. `export-jobs.toml` in the project directory
    pub fn manifest_path(&self, cli_manifest: Option<&PathBuf>) -> PathBuf {
        cli_manifest
            .cloned()
            .unwrap_or_else(|| self.resolve(self.manifest.as_ref(), DEFAULT_MANIFEST))
    }

    /// Resolve the profile, with the CLI argument taking precedence.
    pub fn profile(&self, cli_profile: Option<Profile>) -> Profile {
        cli_profile.or(self.profile).unwrap_or_default()
    }

    pub fn rewrite_settings(&self, profile: Profile) -> RewriteSettings {
        RewriteSettings {
            version: self.version().to_string(),
            figure_width: self.figure_width.unwrap_or(DEFAULT_FIGURE_WIDTH),
            image_paths: self
                .image_paths
                .unwrap_or_else(|| profile.default_image_paths()),
        }
    }

    pub fn converter(&self) -> ConverterSpec {
        self.converter.clone().unwrap_or_default()
    }

    pub fn export_paths(&self) -> ExportPaths {
        ExportPaths {
            project_dir: self.project_dir.clone(),
            docs_root: self.docs_root(),
            image_root: self.image_root(),
        }
    }
}
