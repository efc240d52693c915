use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::args::ReplaceDecision;
use crate::utils::resolve_keytool;

pub const KEYSTORE_FILE: &str = "upload-keystore.jks";
pub const KEY_ALIAS: &str = "app";

const KEY_ALGORITHM: &str = "RSA";
const KEY_SIZE: u32 = 2048;
const VALIDITY_DAYS: u32 = 10000;

/// Certificate subject. Empty fields are kept and render as `KEY=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub cn: String,
    pub ou: String,
    pub org: String,
    pub location: String,
    pub state: String,
    pub country: String,
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CN={}, OU={}, O={}, L={}, ST={}, C={}",
            self.cn, self.ou, self.org, self.location, self.state, self.country
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExistingKeystore {
    /// No keystore at the target path.
    Absent,
    /// A keystore exists and must be deleted before generating.
    Replace,
    /// A keystore exists and the caller declined to replace it.
    Keep,
}

/// Decide what to do about a keystore already present at `path`. A path that
/// cannot be checked is an error rather than `Absent`.
pub fn check_existing(path: &Path, decision: ReplaceDecision) -> Result<ExistingKeystore> {
    let exists = path
        .try_exists()
        .with_context(|| format!("Failed to check for {}", path.display()))?;
    if !exists {
        return Ok(ExistingKeystore::Absent);
    }
    Ok(match decision {
        ReplaceDecision::Replace => ExistingKeystore::Replace,
        ReplaceDecision::Keep => ExistingKeystore::Keep,
    })
}

pub fn remove_existing(path: &Path) -> Result<()> {
    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    println!("Removed existing keystore: {}", path.display());
    Ok(())
}

/// Everything keytool needs to produce one keystore with a single key entry.
pub struct KeyRequest<'a> {
    pub keystore: &'a Path,
    pub store_password: &'a str,
    pub key_password: &'a str,
    pub dname: &'a DistinguishedName,
}

impl KeyRequest<'_> {
    pub fn keytool_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-genkey", "-v", "-keystore"].map(OsString::from).into();
        args.push(self.keystore.as_os_str().to_owned());
        args.extend(["-keyalg", KEY_ALGORITHM, "-keysize"].map(OsString::from));
        args.push(KEY_SIZE.to_string().into());
        args.push("-validity".into());
        args.push(VALIDITY_DAYS.to_string().into());
        args.extend(["-alias", KEY_ALIAS, "-storepass", self.store_password].map(OsString::from));
        args.extend(["-keypass", self.key_password].map(OsString::from));
        args.push("-dname".into());
        args.push(self.dname.to_string().into());
        args
    }
}

/// Produces a keystore file for a [`KeyRequest`].
pub trait KeyGenerator {
    fn generate(&self, request: &KeyRequest<'_>) -> Result<()>;
}

/// The JDK `keytool` binary.
#[derive(Debug)]
pub struct Keytool {
    program: PathBuf,
}

impl Keytool {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    pub fn locate() -> Result<Self> {
        Ok(Self::new(resolve_keytool()?))
    }
}

impl KeyGenerator for Keytool {
    fn generate(&self, request: &KeyRequest<'_>) -> Result<()> {
        println!("Running {} -genkey ...", self.program.display());
        let output = Command::new(&self.program)
            .args(request.keytool_args())
            .output()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !output.status.success() {
            bail!(
                "keytool failed with status: {}{}",
                output.status,
                describe_output(&output)
            );
        }
        Ok(())
    }
}

/// keytool reports some errors on stdout and some on stderr; keep both.
fn describe_output(output: &Output) -> String {
    let mut text = String::new();
    for stream in [&output.stdout, &output.stderr] {
        let chunk = String::from_utf8_lossy(stream);
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            text.push('\n');
            text.push_str(chunk);
        }
    }
    text
}
