use std::path::Path;

use keysync::{Specification, TankerClient, config::DEFAULT_FILE_NAME};

/// Environment variable that overrides `tanker.token` from the specification file.
pub const TOKEN_ENV: &str = "KEYSYNC_TOKEN";

/// Loads the specification from `path` (or `keysync.toml`) and applies the
/// token override from the environment.
pub fn load_specification(path: Option<&str>) -> Result<Specification, String> {
    let path = path.unwrap_or(DEFAULT_FILE_NAME);
    if !Path::new(path).is_file() {
        return Err(format!("Specification file not found: {}", path));
    }

    let spec = Specification::load(path)
        .map_err(|e| format!("Failed to load specification {}: {}", path, e))?;
    Ok(with_token_override(spec, std::env::var(TOKEN_ENV).ok()))
}

/// Replaces the configured token when `token` is set and non-empty.
pub fn with_token_override(mut spec: Specification, token: Option<String>) -> Specification {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        spec.tanker.token = token;
    }
    spec
}

pub fn build_client(spec: &Specification) -> Result<TankerClient, String> {
    TankerClient::new(spec.tanker.clone()).map_err(|e| e.to_string())
}
