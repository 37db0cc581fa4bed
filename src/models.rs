use std::fmt;
use std::path::PathBuf;

pub const TOKEN_ACL: &str = "/*";

/// Time-bounded access token, valid within `[issued_at, expires_at)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub issued_at: u64,
    pub expires_at: u64,
    pub acl: String,
    pub hmac: String,
}

impl Token {
    pub fn cookie_value(&self, name: Option<&str>) -> String {
        match name {
            Some(name) if !name.is_empty() => format!("{}={}", name, self),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "st={}~exp={}~acl={}~hmac={}",
            self.issued_at, self.expires_at, self.acl, self.hmac
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Replaced,
    /// The target string had no embedded cookie field; left untouched.
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Staged,
    Skipped,
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub token: Token,
    pub patch: PatchOutcome,
    pub output_path: PathBuf,
    pub stage: StageOutcome,
}
