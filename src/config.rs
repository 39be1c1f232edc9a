//! Process configuration.
//!
//! Values are layered, later layers winning: compiled defaults, an optional TOML file, then
//! environment variables prefixed with `DFA_`. Nested keys are separated by a double underscore,
//! so `limits.max_states` is set through `DFA_LIMITS__MAX_STATES`.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::wire::DfaDefinition;
use crate::{Error, Result};

pub const ENV_PREFIX: &str = "DFA_";

/// Bounds enforced on requests before any automaton is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_states: usize,
    pub max_alphabet_size: usize,
    /// Counted in characters.
    pub max_input_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_states: 100,
            max_alphabet_size: 20,
            max_input_length: 1000,
        }
    }
}

impl Limits {
    pub fn check_definition(&self, definition: &DfaDefinition) -> Result<()> {
        if definition.states.len() > self.max_states {
            return Err(Error::TooManyStates(self.max_states));
        }
        if definition.alphabet.len() > self.max_alphabet_size {
            return Err(Error::AlphabetTooLarge(self.max_alphabet_size));
        }
        Ok(())
    }

    pub fn check_input(&self, input: &str) -> Result<()> {
        if input.chars().count() > self.max_input_length {
            return Err(Error::InputTooLong(self.max_input_length));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Directory holding the predefined automata.
    pub catalog_dir: PathBuf,
    /// `EnvFilter` directives, overridden by `RUST_LOG` when set.
    pub log_filter: String,
    pub log_format: LogFormat,
    // kept last, TOML tables follow plain values
    pub limits: Limits,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("automata"),
            log_filter: "warn,dfa_minimizer=info".to_string(),
            log_format: LogFormat::default(),
            limits: Limits::default(),
        }
    }
}

impl Configuration {
    /// Load [`Configuration`] from an optional file with overrides from environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with_default(Configuration::default(), config_file)
    }

    pub fn load_with_default(
        default_configuration: Configuration,
        config_file: Option<&Path>,
    ) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(default_configuration));
        if let Some(path) = config_file {
            // figment silently skips missing files
            if !path.is_file() {
                return Err(Error::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                ));
            }
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| Error::Config(Box::new(e)))
    }

    /// Renders the effective configuration as TOML.
    pub fn dump(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;
    use crate::wire::Transitions;

    fn definition(states: usize, symbols: usize) -> DfaDefinition {
        DfaDefinition {
            states: (0..states).map(|i| format!("q{i}")).collect(),
            alphabet: (0..symbols).map(|i| i.to_string()).collect(),
            transitions: Transitions::List(vec![]),
            start_state: "q0".to_string(),
            accept_states: vec![],
        }
    }

    #[test]
    fn default_limits() {
        let limits = Limits::default();
        assert!(limits.check_definition(&definition(100, 20)).is_ok());
        assert_eq!(
            limits.check_definition(&definition(101, 2)).unwrap_err().to_string(),
            "Too many states (max 100)"
        );
        assert_eq!(
            limits.check_definition(&definition(3, 21)).unwrap_err().to_string(),
            "Alphabet too large (max 20 symbols)"
        );
    }

    #[test]
    fn input_length_counts_characters() {
        let limits = Limits {
            max_input_length: 3,
            ..Limits::default()
        };
        assert!(limits.check_input("ééé").is_ok());
        assert!(matches!(limits.check_input("0101"), Err(Error::InputTooLong(3))));
    }

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config = Configuration::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, Configuration::default());
            Ok(())
        });
    }

    #[test]
    fn file_and_environment_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "dfa.toml",
                r#"
                catalog_dir = "samples"
                log_format = "json"

                [limits]
                max_states = 10
                max_alphabet_size = 4
                "#,
            )?;
            jail.set_env("DFA_LIMITS__MAX_ALPHABET_SIZE", "2");

            let config =
                Configuration::load(Some(Path::new("dfa.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.catalog_dir, PathBuf::from("samples"));
            assert_eq!(config.log_format, LogFormat::Json);
            assert_eq!(config.limits.max_states, 10);
            assert_eq!(config.limits.max_alphabet_size, 2);
            assert_eq!(config.limits.max_input_length, 1000);
            Ok(())
        });
    }

    #[test]
    fn missing_config_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = Configuration::load(Some(Path::new("absent.toml"))).unwrap_err();
            assert!(matches!(err, Error::Io { .. }));
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_reported() {
        Jail::expect_with(|jail| {
            jail.set_env("DFA_LIMITS__MAX_STATES", "many");
            let err = Configuration::load(None).unwrap_err();
            assert!(matches!(err, Error::Config(_)));
            Ok(())
        });
    }

    #[test]
    fn dump_round_trips() {
        let dumped = Configuration::default().dump().unwrap();
        assert!(dumped.contains("max_states = 100"));
        let parsed: Configuration = toml::from_str(&dumped).unwrap();
        assert_eq!(parsed, Configuration::default());
    }
}
