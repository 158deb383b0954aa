use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a request file into a typed struct.
///
/// `.yaml` / `.yml` files are parsed as YAML, everything else as JSON.
pub fn read_request<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let resolved = resolve_path(path)?;
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;

    let request = if is_yaml(&resolved) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?
    };
    tracing::debug!(path = %resolved.display(), "loaded request file");
    Ok(request)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.exists() {
        return Err(format!("File not found: {}", resolved.display()).into());
    }
    if !resolved.is_file() {
        return Err(format!("Not a file: {}", resolved.display()).into());
    }

    Ok(resolved)
}
