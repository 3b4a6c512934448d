use crate::defaults::*;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

fn default_verbose() -> i8 {
    VERBOSE
}
fn default_parameter_directory() -> String {
    String::from(PARAMETER_DIRECTORY)
}
fn default_kpoints() -> Vec<[f64; 3]> {
    vec![[0.0, 0.0, 0.0]]
}
fn default_sepsilon() -> f64 {
    SEPSILON
}
fn default_min_distance() -> f64 {
    MIN_DISTANCE
}
fn default_parallel() -> bool {
    PARALLEL_PAIR_LOOP
}
fn default_write_matrices() -> bool {
    WRITE_MATRICES
}
fn default_output_directory() -> String {
    String::from(OUTPUT_DIRECTORY)
}
fn default_slater_koster_config() -> SlaterKosterConfig {
    SlaterKosterConfig {
        sepsilon: default_sepsilon(),
        min_distance: default_min_distance(),
        parallel: default_parallel(),
    }
}
fn default_output_config() -> OutputConfig {
    OutputConfig {
        write_matrices: default_write_matrices(),
        directory: default_output_directory(),
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Configuration {
    #[serde(default = "default_verbose")]
    pub verbose: i8,
    #[serde(default = "default_parameter_directory")]
    pub parameter_directory: String,
    #[serde(default = "default_kpoints")]
    pub kpoints: Vec<[f64; 3]>,
    #[serde(default = "default_slater_koster_config")]
    pub slater_koster: SlaterKosterConfig,
    #[serde(default = "default_output_config")]
    pub output: OutputConfig,
}

impl Configuration {
    /// Reads the configuration file. If it does not exist in the directory the default
    /// settings are used and written to the file, so that the user can see all options.
    pub fn new() -> Result<Self> {
        Self::from_path(Path::new(CONFIG_FILE_NAME))
    }

    pub fn from_path(config_file_path: &Path) -> Result<Self> {
        let exists: bool = config_file_path.exists();
        let config_string: String = if exists {
            fs::read_to_string(config_file_path).with_context(|| {
                format!("unable to read config file {}", config_file_path.display())
            })?
        } else {
            String::new()
        };
        let config: Self = toml::from_str(&config_string)
            .with_context(|| format!("invalid config file {}", config_file_path.display()))?;
        if !exists {
            fs::write(config_file_path, toml::to_string(&config)?).with_context(|| {
                format!("unable to write config file {}", config_file_path.display())
            })?;
        }
        Ok(config)
    }

    /// Directory of the parameter files, the environment variable takes precedence.
    pub fn parameter_directory(&self) -> String {
        env::var(PARAMETER_DIR_VARIABLE).unwrap_or_else(|_| self.parameter_directory.clone())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            v if v < 0 => log::LevelFilter::Warn,
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SlaterKosterConfig {
    #[serde(default = "default_sepsilon")]
    pub sepsilon: f64,
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_write_matrices")]
    pub write_matrices: bool,
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Configuration = toml::from_str("").unwrap();
        assert_eq!(config.verbose, 0);
        assert_eq!(config.kpoints, vec![[0.0, 0.0, 0.0]]);
        assert_eq!(config.slater_koster.min_distance, MIN_DISTANCE);
        assert!(config.slater_koster.parallel);
        assert!(!config.output.write_matrices);
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn sections_are_partially_overridden() {
        let text: &str = "verbose = 2\nkpoints = [[0.5, 0.0, 0.0]]\n\n[slater_koster]\nsepsilon = 0.01\n";
        let config: Configuration = toml::from_str(text).unwrap();
        assert_eq!(config.slater_koster.sepsilon, 0.01);
        assert_eq!(config.slater_koster.min_distance, MIN_DISTANCE);
        assert_eq!(config.kpoints, vec![[0.5, 0.0, 0.0]]);
        assert_eq!(config.log_level(), log::LevelFilter::Trace);
        // the written file reproduces the configuration
        let again: Configuration = toml::from_str(&toml::to_string(&config).unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn missing_file_is_created() {
        let dir = env::temp_dir().join(format!("slako-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        let _ = fs::remove_file(&path);
        let config: Configuration = Configuration::from_path(&path).unwrap();
        assert!(path.exists());
        assert_eq!(Configuration::from_path(&path).unwrap(), config);
        fs::remove_dir_all(&dir).unwrap();
    }
}
