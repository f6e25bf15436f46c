//! Settings shared by every sample, built once from the command line.

use std::path::{Path, PathBuf};

use clap::ArgMatches;
use log::LevelFilter;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// Directory that contains `shaders/` and `textures/`. Every asset path is resolved against it.
    pub asset_root: PathBuf,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub log_level: LevelFilter,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            width: 600,
            height: 400,
            vsync: true,
            log_level: LevelFilter::Info,
        }
    }
}

impl SampleConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, String> {
        let defaults = Self::default();

        let asset_root = matches.value_of("assets")
            .map(PathBuf::from)
            .unwrap_or(defaults.asset_root);

        let log_level = if matches.is_present("quiet") {
            LevelFilter::Warn
        } else {
            match matches.occurrences_of("verbose") {
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };

        Ok(Self {
            asset_root,
            width: parse_dimension(matches.value_of("width"), defaults.width, "width")?,
            height: parse_dimension(matches.value_of("height"), defaults.height, "height")?,
            vsync: !matches.is_present("no-vsync"),
            log_level,
        })
    }

    /// Path of a shader program under `shaders/`, e.g. `shader_path("strip/simple")`.
    pub fn shader_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join("shaders").join(name)
    }

    /// Path of an image under `textures/`.
    pub fn texture_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join("textures").join(name)
    }

    /// Warns when the asset root doesn't look like it holds the sample shaders, which is the
    /// usual reason a sample fails to load anything.
    pub fn check_asset_root(&self) -> bool {
        let shaders = self.asset_root.join("shaders");
        if !shaders.is_dir() {
            warn!(
                "{} has no shaders/ directory; pass the repository root with --assets",
                self.asset_root.display()
            );
            return false;
        }
        true
    }
}

fn parse_dimension(value: Option<&str>, default: u32, what: &str) -> Result<u32, String> {
    match value {
        None => Ok(default),
        Some(text) => match text.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(format!("Invalid window {}: {}", what, text)),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shader_paths_are_under_the_asset_root() {
        let config = SampleConfig { asset_root: PathBuf::from("/opt/samples"), ..SampleConfig::default() };

        assert_eq!(config.shader_path("strip/simple"), PathBuf::from("/opt/samples/shaders/strip/simple"));
        assert_eq!(config.texture_path("mosaic.png"), PathBuf::from("/opt/samples/textures/mosaic.png"));
    }

    #[test]
    fn dimensions_must_be_positive_numbers() {
        assert_eq!(parse_dimension(None, 300, "width"), Ok(300));
        assert_eq!(parse_dimension(Some("800"), 300, "width"), Ok(800));
        assert!(parse_dimension(Some("0"), 300, "width").is_err());
        assert!(parse_dimension(Some("wide"), 300, "width").is_err());
    }

    #[test]
    fn repository_root_has_the_shaders() {
        let config = SampleConfig::default();
        assert!(config.check_asset_root());
        assert!(config.texture_path("mosaic.png").is_file());
    }
}
