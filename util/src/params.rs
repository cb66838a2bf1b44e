//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot determine the software root directory: {0}")]
    RootNotFound(std::io::Error),

    #[error("Cannot load the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot read the parameter file {0:?}: {1}")]
    DeserialiseError(PathBuf, toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the `params` directory under the software root (see
/// [`crate::host::get_path_editor_root`]).
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    let mut path = crate::host::get_path_editor_root().map_err(LoadError::RootNotFound)?;
    path.push("params");
    path.push(param_file_path);

    load_from_path(path)
}

/// Load a parameter file from an explicit path.
pub fn load_from_path<P, Q>(path: Q) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    Q: AsRef<Path>,
{
    let path = path.as_ref();

    let params_str =
        read_to_string(path).map_err(|e| LoadError::FileLoadError(path.to_path_buf(), e))?;

    from_str(&params_str).map_err(|e| LoadError::DeserialiseError(path.to_path_buf(), e))
}

/// Parse parameters from a TOML string.
pub fn from_str<P>(params_str: &str) -> Result<P, toml::de::Error>
where
    P: DeserializeOwned,
{
    toml::from_str(params_str)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct TestParams {
        gain: f64,
        name: String,
    }

    #[test]
    fn test_from_str() {
        let p: TestParams = from_str("gain = 1.5\nname = \"robot\"\n").unwrap();
        assert_eq!(
            p,
            TestParams {
                gain: 1.5,
                name: String::from("robot")
            }
        );

        assert!(from_str::<TestParams>("gain = \"not a number\"").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        match load_from_path::<TestParams, _>("/definitely/not/a/params.toml") {
            Err(LoadError::FileLoadError(path, _)) => {
                assert_eq!(path, PathBuf::from("/definitely/not/a/params.toml"))
            }
            _ => panic!("Expected a file load error"),
        }
    }
}
