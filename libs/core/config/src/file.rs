use crate::ConfigError;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read a TOML file and deserialize it into `T`.
///
/// A missing file is reported as [`ConfigError::NotFound`] so callers can
/// tell it apart from permission problems and malformed content.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        #[serde(default)]
        retries: u32,
    }

    #[test]
    fn test_load_toml_success() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"course\"\nretries = 3").unwrap();

        let sample: Sample = load_toml(file.path()).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "course".to_string(),
                retries: 3
            }
        );
    }

    #[test]
    fn test_load_toml_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = load_toml::<Sample>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(ref p) if p == &path));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_load_toml_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = ").unwrap();

        let err = load_toml::<Sample>(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_toml_wrong_type() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"course\"\nretries = \"many\"").unwrap();

        let err = load_toml::<Sample>(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
