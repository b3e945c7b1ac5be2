//! Utility functions for CLI commands.

use std::path::Path;

use moodbox_session::Config;

use crate::Cli;

/// Loads the configuration named by `--config`.
///
/// Without `--config` the default file is used if it exists, and the
/// built-in defaults otherwise.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = cli.config.as_deref() {
        return Ok(Config::load(Some(Path::new(path)))?);
    }
    match Config::default_path() {
        Some(path) if path.exists() => Ok(Config::load(Some(&path))?),
        _ => Ok(Config::default()),
    }
}

/// Loads a request from a YAML or JSON file.
pub fn load_request<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)?;
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("yaml");

    let result = match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };

    Ok(result)
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: serde::Serialize>(
    result: &T,
    output_path: Option<&str>,
    as_json: bool,
) -> anyhow::Result<()> {
    let output = if as_json {
        serde_json::to_string_pretty(result)? + "\n"
    } else {
        serde_yaml::to_string(result)?
    };

    match output_path {
        Some(path) => std::fs::write(path, output)?,
        None => print!("{}", output),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Req {
        name: String,
    }

    #[test]
    fn test_load_request_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("req.yaml");
        let json = dir.path().join("req.json");
        std::fs::write(&yaml, "name: a\n").unwrap();
        std::fs::write(&json, r#"{"name": "b"}"#).unwrap();

        let a: Req = load_request(yaml.to_str().unwrap()).unwrap();
        let b: Req = load_request(json.to_str().unwrap()).unwrap();
        assert_eq!(a.name, "a");
        assert_eq!(b.name, "b");
    }
}
