use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use mazecore::{
    algorithms::{GeneratorKind, Params, UnknownGeneratorError},
    dims::Pos,
    driver::GenerationConfig,
};
use ron::{self, extensions::Extensions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_SETTINGS: &str = include_str!("./default_settings.ron");

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot access settings file: {0}")]
    Io(#[from] io::Error),
    #[error("error reading settings file ({path:?}), {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("no preference directory on this platform")]
    NoPreferenceDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rows: usize,
    pub cols: usize,
    pub algorithm: String,
    pub start: Option<Pos>,
    pub delay_ms: u64,
    pub seed: Option<u64>,
    pub params: Params,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 40,
            algorithm: GeneratorKind::default().to_string(),
            start: None,
            delay_ms: 5,
            seed: None,
            params: Params::default(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        dirs::preference_dir()
            .map(|dir| dir.join("mazegen").join("settings.ron"))
            .ok_or(SettingsError::NoPreferenceDir)
    }

    fn options() -> ron::Options {
        ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, SettingsError> {
        Self::options()
            .from_str(text)
            .map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Reads the settings, creating the file with defaults when it doesn't exist yet.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("Creating default settings at {:?}", path);
                Self::reset_config(path)?;
                Self::parse(path, DEFAULT_SETTINGS)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn reset_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_SETTINGS)?;
        Ok(())
    }

    pub fn algorithm(&self) -> Result<GeneratorKind, UnknownGeneratorError> {
        self.algorithm.parse()
    }

    pub fn generation_config(&self) -> Result<GenerationConfig, UnknownGeneratorError> {
        Ok(GenerationConfig {
            generator: self.algorithm()?,
            start: self.start,
            delay: Duration::from_millis(self.delay_ms),
            seed: self.seed,
            params: self.params.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("mazegen-test-{}-{}", std::process::id(), name))
            .join("settings.ron")
    }

    #[test]
    fn embedded_defaults_match() {
        let settings = Settings::parse(Path::new("default"), DEFAULT_SETTINGS).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.algorithm(), Ok(GeneratorKind::DepthFirst));
    }

    #[test]
    fn partial_file_and_implicit_some() {
        let text = r#"(
            algorithm: "Wilson",
            start: (row: 1, col: 2),
            seed: 7,
            params: {"merge_chance": "0.25"},
        )"#;
        let settings = Settings::parse(Path::new("partial"), text).unwrap();
        assert_eq!(settings.rows, 20);
        assert_eq!(settings.start, Some(Pos::new(1, 2)));

        let config = settings.generation_config().unwrap();
        assert_eq!(config.generator, GeneratorKind::Wilson);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.delay, Duration::from_millis(5));
        assert_eq!(config.params.get("merge_chance"), Some("0.25"));
    }

    #[test]
    fn malformed_file() {
        let err = Settings::parse(Path::new("broken.ron"), "(rows: \"many\")").unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));

        let settings = Settings::parse(Path::new("unknown"), "(algorithm: \"prim\")").unwrap();
        assert!(settings.generation_config().is_err());
    }

    #[test]
    fn load_creates_defaults() {
        let path = temp_path("load");
        let _ = fs::remove_file(&path);

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_SETTINGS);

        fs::write(&path, "(rows: 3)").unwrap();
        assert_eq!(Settings::load(&path).unwrap().rows, 3);
        Settings::reset_config(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap().rows, 20);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
