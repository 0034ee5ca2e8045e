//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{DependencyTarget, EntrypointConfig};
use crate::config::validation::ValidationError;

pub const DB_HOST: &str = "DB_HOST";
pub const POSTGRES_PORT: &str = "POSTGRES_PORT";
pub const POSTGRES_USER: &str = "POSTGRES_USER";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from a TOML file.
///
/// Semantic validation is left to the caller so that command-line
/// overrides are applied first.
pub fn load_config(path: &Path) -> Result<EntrypointConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: EntrypointConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(config)
}

/// Read the database target from the process environment.
pub fn target_from_env() -> Result<DependencyTarget, ConfigError> {
    target_from_lookup(|name| std::env::var(name).ok())
}

/// Build the database target from a variable lookup.
///
/// Every missing, empty or malformed variable is reported in one error.
pub fn target_from_lookup<F>(lookup: F) -> Result<DependencyTarget, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut errors = Vec::new();

    let host = required(&lookup, DB_HOST, &mut errors);
    let port_raw = required(&lookup, POSTGRES_PORT, &mut errors);
    let user = required(&lookup, POSTGRES_USER, &mut errors);

    let port = port_raw.and_then(|raw| match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Some(port),
        _ => {
            errors.push(ValidationError::InvalidPort {
                name: POSTGRES_PORT,
                value: raw,
            });
            None
        }
    });

    match (host, port, user) {
        (Some(host), Some(port), Some(user)) if errors.is_empty() => {
            Ok(DependencyTarget { host, port, user })
        }
        _ => Err(ConfigError::Validation(errors)),
    }
}

fn required<F>(lookup: &F, name: &'static str, errors: &mut Vec<ValidationError>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => {
            errors.push(ValidationError::MissingVariable(name));
            None
        }
        Some(value) if value.trim().is_empty() => {
            errors.push(ValidationError::EmptyVariable(name));
            None
        }
        Some(value) => Some(value.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn lookup(vars: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_complete_target() {
        let vars = env(&[
            ("DB_HOST", "db"),
            ("POSTGRES_PORT", "5432"),
            ("POSTGRES_USER", "library"),
        ]);
        let target = target_from_lookup(lookup(&vars)).unwrap();
        assert_eq!(target.host, "db");
        assert_eq!(target.port, 5432);
        assert_eq!(target.user, "library");
    }

    #[test]
    fn test_each_missing_variable_is_reported() {
        for missing in [DB_HOST, POSTGRES_PORT, POSTGRES_USER] {
            let mut vars = env(&[
                ("DB_HOST", "db"),
                ("POSTGRES_PORT", "5432"),
                ("POSTGRES_USER", "library"),
            ]);
            vars.remove(missing);

            match target_from_lookup(lookup(&vars)) {
                Err(ConfigError::Validation(errors)) => {
                    assert_eq!(errors, vec![ValidationError::MissingVariable(missing)]);
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_and_bad_port() {
        let vars = env(&[
            ("DB_HOST", "  "),
            ("POSTGRES_PORT", "postgres"),
            ("POSTGRES_USER", "library"),
        ]);
        let Err(ConfigError::Validation(errors)) = target_from_lookup(lookup(&vars)) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::EmptyVariable(DB_HOST)));
        assert!(errors.contains(&ValidationError::InvalidPort {
            name: POSTGRES_PORT,
            value: "postgres".into(),
        }));
    }

    #[test]
    fn test_port_zero_rejected() {
        let vars = env(&[
            ("DB_HOST", "db"),
            ("POSTGRES_PORT", "0"),
            ("POSTGRES_USER", "library"),
        ]);
        assert!(target_from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [probe]
            interval_secs = 1

            [setup.migrate]
            program = "./manage"
            args = ["migrate"]
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.probe.interval_secs, 1);
        assert_eq!(config.setup.migrate.program, "./manage");
        assert_eq!(config.setup.migrate.args, vec!["migrate".to_string()]);
        assert_eq!(config.setup.collect_static.program, "python");
    }

    #[test]
    fn test_load_config_defers_semantic_checks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nworkers = 0").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.workers, 0);
        assert_eq!(
            crate::config::validation::validate_config(&config).unwrap_err(),
            vec![ValidationError::NotPositive("server.workers")]
        );
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/entrypoint.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
