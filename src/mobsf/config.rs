//! Backend configuration.
//!
//! Values come from the process environment first, then from an optional
//! `.env` file (working directory, then next to the executable). Values in
//! `.env` may reference other variables with `${VAR}` or `${VAR:-default}`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Backend base URL variable.
pub const URL_VAR: &str = "MOBSF_URL";
/// Backend API key variable.
pub const API_KEY_VAR: &str = "MOBSF_API_KEY";
/// Used when `MOBSF_URL` is unset or empty.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },
}

/// Where and how to reach MobSF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobsfConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Sent verbatim as the `Authorization` header. `None` sends no header and
    /// lets the backend reject the request.
    pub api_key: Option<String>,
}

impl Default for MobsfConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl MobsfConfig {
    /// Load from the process environment plus the first `.env` found.
    pub fn load() -> Self {
        let file_vars = find_env_file()
            .and_then(|path| match load_env_file(&path) {
                Ok(vars) => {
                    tracing::info!(path = %path.display(), count = vars.len(), "loaded .env");
                    Some(vars)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unreadable .env");
                    None
                }
            })
            .unwrap_or_default();

        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = non_empty(URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            api_key: non_empty(API_KEY_VAR),
        }
    }

    /// Absolute URL for an API path such as `/api/v1/upload`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// ─── .env loading ────────────────────────────────────────────────────────────

/// Candidate `.env` locations: working directory, then the executable's
/// directory.
fn find_env_file() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(".env"));
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(".env"));
    }
    candidates.into_iter().find(|p| p.is_file())
}

/// Read a `.env` file into a map. Does not touch the process environment.
pub fn load_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(parse_env(&raw))
}

/// Parse `KEY=VALUE` lines.
///
/// Blank lines and `#` comments are skipped, an `export ` prefix is allowed,
/// matching single or double quotes around the value are stripped, and
/// `${VAR}` references are interpolated (earlier keys in the file, then the
/// process environment).
pub fn parse_env(raw: &str) -> HashMap<String, String> {
    let mut vars: HashMap<String, String> = HashMap::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = value.trim();
        let (value, interpolate) = match unquote(value) {
            Some(('\'', inner)) => (inner, false),
            Some((_, inner)) => (inner, true),
            None => (value, true),
        };

        let value = if interpolate {
            interpolate_vars(value, |name| {
                vars.get(name).cloned().or_else(|| std::env::var(name).ok())
            })
        } else {
            value.to_string()
        };
        vars.insert(key.to_string(), value);
    }

    vars
}

fn unquote(value: &str) -> Option<(char, &str)> {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return Some((q, &value[1..value.len() - 1]));
        }
    }
    None
}

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            if let Some(idx) = var_expr.find(":-") {
                let (name, default) = (&var_expr[..idx], &var_expr[idx + 2..]);
                result.push_str(
                    &lookup(name)
                        .filter(|v| !v.is_empty())
                        .unwrap_or_else(|| expand_tilde(default)),
                );
            } else {
                result.push_str(&lookup(&var_expr).unwrap_or_default());
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
