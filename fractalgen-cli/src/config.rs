//! JSON request files for `--config` and `--dump-config`.

use std::path::Path;

use tracing::debug;

use fractalgen_core::RenderRequest;

use crate::error::CliError;

/// Read a render request from a JSON file.
///
/// Missing `strategy` and Buddhabrot sampling fields take their defaults.
pub fn load_request(path: &Path) -> Result<RenderRequest, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let request = serde_json::from_str(&text).map_err(|source| CliError::ParseConfig {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "Loaded request file");
    Ok(request)
}

/// Pretty-printed JSON accepted back by [`load_request`]. Invalid requests
/// are rejected rather than written out.
pub fn dump_request(request: &RenderRequest) -> Result<String, CliError> {
    request.validate()?;
    Ok(serde_json::to_string_pretty(request)?)
}
