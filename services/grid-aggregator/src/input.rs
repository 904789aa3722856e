//! Loading tile buffers and aggregation parameters.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use temporal_grid::AggregationParams;

/// Path argument meaning "read from stdin".
pub const STDIN_PATH: &str = "-";

/// Parse a JSON array of unsigned integers.
pub fn parse_buffer(text: &str) -> Result<Vec<u32>> {
    serde_json::from_str(text).context("Tile buffer must be a JSON array of unsigned integers")
}

/// Read a tile buffer from a file, or from stdin when `path` is `-`.
pub fn read_buffer(path: &str) -> Result<Vec<u32>> {
    let text = if path == STDIN_PATH {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read tile buffer from stdin")?;
        text
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read tile buffer {}", path))?
    };
    parse_buffer(&text)
}

/// Split a `key=value` argument.
pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value pair: no '=' found in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid key=value pair: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Build params from an optional JSON file, then apply `pairs` on top.
pub fn load_params(params_file: Option<&Path>, pairs: &[(String, String)]) -> Result<AggregationParams> {
    let mut params = match params_file {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read params file {}", path.display()))?;
            AggregationParams::from_json(&json)
                .with_context(|| format!("Invalid params file {}", path.display()))?
        }
        None => AggregationParams::default(),
    };
    params
        .apply_query_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .context("Invalid --param value")?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use temporal_grid::CombinationKind;

    #[test]
    fn test_parse_buffer() {
        assert_eq!(parse_buffer("[1, 1, 0, 5, 5, 42]").unwrap(), vec![1, 1, 0, 5, 5, 42]);
        assert!(parse_buffer("[1, -1]").is_err());
        assert!(parse_buffer("{}").is_err());
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("breaks=[[0,1]]").unwrap(),
            ("breaks".to_string(), "[[0,1]]".to_string())
        );
        assert_eq!(
            parse_key_val("tileBBox=0,0,1,1").unwrap(),
            ("tileBBox".to_string(), "0,0,1,1".to_string())
        );
        assert!(parse_key_val("delta").is_err());
        assert!(parse_key_val("=5").is_err());
    }

    #[test]
    fn test_pairs_override_params_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"delta": 31, "numDatasets": 2, "combinationMode": "compare"}}"#).unwrap();

        let pairs = vec![("delta".to_string(), "7".to_string())];
        let params = load_params(Some(file.path()), &pairs).unwrap();
        assert_eq!(params.delta, 7);
        assert_eq!(params.num_datasets, 2);
        assert_eq!(params.combination_mode, Some(CombinationKind::Compare));
    }

    #[test]
    fn test_read_buffer_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{:?}", test_utils::buffers::WINDOW.to_vec()).unwrap();
        let buffer = read_buffer(file.path().to_str().unwrap()).unwrap();
        assert_eq!(buffer, test_utils::buffers::WINDOW.to_vec());
    }

    #[test]
    fn test_missing_files_are_reported() {
        let err = read_buffer("/nonexistent/tile.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tile.json"));
        assert!(load_params(Some(Path::new("/nonexistent/params.json")), &[]).is_err());
    }
}
