//! Loading organization profiles from disk.

use std::path::Path;

use advisor_shared::{AdvisorError, ProfileContext, Result};

/// Supported profile file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProfileFormat {
    Toml,
    Json,
}

impl ProfileFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(AdvisorError::validation(format!(
                "unsupported profile file '{}': expected .toml or .json",
                path.display()
            ))),
        }
    }
}

/// Read and validate a profile file.
pub(crate) fn load_profile(path: &Path) -> Result<ProfileContext> {
    let format = ProfileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| AdvisorError::io(path, e))?;
    parse_profile(&content, format).map_err(|message| {
        AdvisorError::validation(format!("{}: {message}", path.display()))
    })
}

/// Parse and validate profile text. The error is a bare message so the
/// caller can attach the file path once.
pub(crate) fn parse_profile(
    content: &str,
    format: ProfileFormat,
) -> std::result::Result<ProfileContext, String> {
    let profile: ProfileContext = match format {
        ProfileFormat::Toml => toml::from_str(content).map_err(|e| e.to_string())?,
        ProfileFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
    };
    profile.validate().map_err(|e| match e {
        AdvisorError::Validation { message } => message,
        other => other.to_string(),
    })?;
    Ok(profile)
}
