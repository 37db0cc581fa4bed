use crate::errors::UpdateError;
use crate::models::{PatchOutcome, Token, TOKEN_ACL};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;


pub fn generate_token(now: u64, duration_secs: u64, signature: &str) -> Token {
    Token {
        issued_at: now,
        expires_at: now.saturating_add(duration_secs),
        acl: TOKEN_ACL.to_string(),
        hmac: signature.to_string(),
    }
}

/// Matches `"<field>":"<value>"` inside an embedded header string.
pub struct CookiePattern {
    regex: Regex,
}

impl CookiePattern {
    pub fn new(field: &str) -> Result<Self, UpdateError> {
        let pattern = format!(r#"("{}":\s*")[^"]+(")"#, regex::escape(field));
        let regex = Regex::new(&pattern)
            .map_err(|e| UpdateError::Config(format!("invalid cookie field pattern: {}", e)))?;
        Ok(Self { regex })
    }

    /// Replaces the first quoted value only. The new value is inserted literally.
    pub fn replace(&self, text: &str, value: &str) -> (String, PatchOutcome) {
        if !self.regex.is_match(text) {
            return (text.to_string(), PatchOutcome::NoMatch);
        }
        let replaced = self
            .regex
            .replacen(text, 1, |caps: &Captures| format!("{}{}{}", &caps[1], value, &caps[2]));
        (replaced.into_owned(), PatchOutcome::Replaced)
    }
}

pub fn patch_document(
    document: &mut Value,
    key: &str,
    pattern: &CookiePattern,
    value: &str,
) -> Result<PatchOutcome, UpdateError> {
    let slot = document
        .get_mut(key)
        .ok_or_else(|| UpdateError::MissingKey { key: key.to_string() })?;
    let text = slot
        .as_str()
        .ok_or_else(|| UpdateError::NotAString { key: key.to_string() })?;

    let (patched, outcome) = pattern.replace(text, value);
    if outcome == PatchOutcome::Replaced {
        *slot = Value::String(patched);
    }
    Ok(outcome)
}

/// Writes `document` as 4-space indented JSON, replacing `path` atomically.
pub fn persist_document(document: &Value, path: &Path) -> Result<(), UpdateError> {
    let io_err = |source: io::Error| UpdateError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    document
        .serialize(&mut serializer)
        .map_err(|e| io_err(e.into()))?;

    let mut tmp = temp_file_in(dir).map_err(io_err)?;
    tmp.write_all(&buf).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(io_err)?;
    }
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// New files get the usual world-readable mode (subject to umask), not tempfile's 0600.
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(fs::Permissions::from_mode(0o644))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}
