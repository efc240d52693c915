use anyhow::{bail, Context, Result};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use which::which;

#[cfg(windows)]
const KEYTOOL_BIN: &str = "keytool.exe";
#[cfg(not(windows))]
const KEYTOOL_BIN: &str = "keytool";

pub fn resolve_cmd(command: &str) -> Result<PathBuf> {
    if command.contains(['/', '\\']) {
        let path = PathBuf::from(command);
        if path.exists() {
            return Ok(path);
        }
        bail!("command not found at: {}", path.display());
    }
    which(command).with_context(|| format!("command not found in PATH: {command}"))
}

/// Find keytool: `KEYTOOL` override, then `$JAVA_HOME/bin`, then `PATH`.
pub fn resolve_keytool() -> Result<PathBuf> {
    resolve_keytool_from(env::var_os("KEYTOOL"), env::var_os("JAVA_HOME"))
}

fn resolve_keytool_from(keytool: Option<OsString>, java_home: Option<OsString>) -> Result<PathBuf> {
    if let Some(command) = keytool.filter(|v| !v.is_empty()) {
        return resolve_cmd(&command.to_string_lossy()).context("KEYTOOL is set but unusable");
    }
    if let Some(java_home) = java_home.filter(|v| !v.is_empty()) {
        let candidate = Path::new(&java_home).join("bin").join(KEYTOOL_BIN);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    which("keytool").context("keytool not found in PATH. Install a JDK or set JAVA_HOME.")
}
