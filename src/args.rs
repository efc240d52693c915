use anyhow::{bail, Result};
use clap::Parser;
use std::str::FromStr;

use crate::keystore::DistinguishedName;

/// Minimum length, in characters, that keytool accepts for either password.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Parser, Debug)]
#[command(
    name = "gen-android-keystore",
    about = "Generate an Android upload keystore and its key.properties"
)]
pub struct Args {
    /// Keystore password (at least 6 characters)
    #[arg(long, value_name = "PASSWORD", allow_hyphen_values = true)]
    pub store_pass: Option<String>,

    /// Key password (at least 6 characters)
    #[arg(long, value_name = "PASSWORD", allow_hyphen_values = true)]
    pub key_pass: Option<String>,

    /// Replace an existing upload-keystore.jks: y/yes or n/no
    #[arg(long, value_name = "ANSWER")]
    pub replace: Option<String>,

    /// Certificate common name (CN)
    #[arg(long, allow_hyphen_values = true)]
    pub cn: Option<String>,

    /// Organizational unit (OU)
    #[arg(long, allow_hyphen_values = true)]
    pub ou: Option<String>,

    /// Organization (O)
    #[arg(long, allow_hyphen_values = true)]
    pub org: Option<String>,

    /// Locality or city (L)
    #[arg(long, allow_hyphen_values = true)]
    pub location: Option<String>,

    /// State or province (ST)
    #[arg(long, allow_hyphen_values = true)]
    pub state: Option<String>,

    /// Two-letter country code (C)
    #[arg(long, allow_hyphen_values = true)]
    pub country: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ReplaceDecision {
    Replace,
    Keep,
}

impl FromStr for ReplaceDecision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(Self::Replace),
            "n" | "no" => Ok(Self::Keep),
            other => bail!("--replace must be one of y, yes, n, no (got {other:?})"),
        }
    }
}

/// Validated, immutable inputs for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoreConfig {
    pub store_password: String,
    pub key_password: String,
    pub replace: ReplaceDecision,
    pub dname: DistinguishedName,
}

impl Args {
    /// Flags for the optional DN fields that were not given on the command line.
    pub fn missing_optional(&self) -> Vec<&'static str> {
        [
            ("--cn", &self.cn),
            ("--ou", &self.ou),
            ("--org", &self.org),
            ("--location", &self.location),
            ("--state", &self.state),
            ("--country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(flag, _)| flag)
        .collect()
    }

    pub fn into_config(self) -> Result<KeystoreConfig> {
        let store_password = require_password("--store-pass", self.store_pass)?;
        let key_password = require_password("--key-pass", self.key_pass)?;
        let replace = match self.replace {
            Some(value) => value.parse::<ReplaceDecision>()?,
            None => bail!("--replace is required (one of y, yes, n, no)"),
        };

        Ok(KeystoreConfig {
            store_password,
            key_password,
            replace,
            dname: DistinguishedName {
                cn: self.cn.unwrap_or_default(),
                ou: self.ou.unwrap_or_default(),
                org: self.org.unwrap_or_default(),
                location: self.location.unwrap_or_default(),
                state: self.state.unwrap_or_default(),
                country: self.country.unwrap_or_default(),
            },
        })
    }
}

fn require_password(flag: &str, value: Option<String>) -> Result<String> {
    let Some(value) = value else {
        bail!("{flag} is required (minimum {MIN_PASSWORD_LEN} characters)");
    };
    let len = value.chars().count();
    if len < MIN_PASSWORD_LEN {
        bail!("{flag} must be at least {MIN_PASSWORD_LEN} characters (got {len})");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(extra: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("gen-android-keystore").chain(extra.iter().copied()))
    }

    fn valid() -> Vec<&'static str> {
        vec!["--store-pass", "secret1", "--key-pass", "secret2", "--replace", "y"]
    }

    #[test]
    fn full_argument_set_builds_config() {
        let mut argv = valid();
        argv.extend(["--cn", "Jane Doe", "--org", "Acme", "--country", "US"]);
        let config = parse(&argv).unwrap().into_config().unwrap();

        assert_eq!(config.store_password, "secret1");
        assert_eq!(config.key_password, "secret2");
        assert_eq!(config.replace, ReplaceDecision::Replace);
        assert_eq!(config.dname.cn, "Jane Doe");
        assert_eq!(config.dname.org, "Acme");
        assert_eq!(config.dname.ou, "");
        assert_eq!(config.dname.country, "US");
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let args = parse(&valid()).unwrap();
        assert_eq!(
            args.missing_optional(),
            ["--cn", "--ou", "--org", "--location", "--state", "--country"]
        );
        let config = args.into_config().unwrap();
        assert_eq!(config.dname, DistinguishedName::default());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let mut argv = valid();
        argv.extend(["--alias", "release"]);
        let err = parse(&argv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn positional_argument_is_rejected() {
        let mut argv = valid();
        argv.push("stray");
        assert!(parse(&argv).is_err());
    }

    #[test]
    fn help_is_not_an_error_exit() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }

    #[test]
    fn short_passwords_name_field_and_minimum() {
        let err = parse(&["--store-pass", "abc", "--key-pass", "secret2", "--replace", "n"])
            .unwrap()
            .into_config()
            .unwrap_err()
            .to_string();
        assert!(err.contains("--store-pass"), "{err}");
        assert!(err.contains('6'), "{err}");

        let err = parse(&["--store-pass", "secret1", "--key-pass", "12345", "--replace", "n"])
            .unwrap()
            .into_config()
            .unwrap_err()
            .to_string();
        assert!(err.contains("--key-pass"), "{err}");
    }

    #[test]
    fn password_length_counts_characters() {
        // Six characters, eleven bytes.
        let config = parse(&["--store-pass", "ééééé1", "--key-pass", "-dash-", "--replace", "no"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.store_password, "ééééé1");
        assert_eq!(config.key_password, "-dash-");
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let err = parse(&["--key-pass", "secret2", "--replace", "y"])
            .unwrap()
            .into_config()
            .unwrap_err()
            .to_string();
        assert!(err.contains("--store-pass is required"), "{err}");

        let err = parse(&["--store-pass", "secret1", "--key-pass", "secret2"])
            .unwrap()
            .into_config()
            .unwrap_err()
            .to_string();
        assert!(err.contains("--replace is required"), "{err}");
    }

    #[test]
    fn replace_answers_are_case_insensitive() {
        for answer in ["y", "Y", "yes", "YES", " Yes "] {
            assert_eq!(answer.parse::<ReplaceDecision>().unwrap(), ReplaceDecision::Replace);
        }
        for answer in ["n", "N", "no", "No"] {
            assert_eq!(answer.parse::<ReplaceDecision>().unwrap(), ReplaceDecision::Keep);
        }
        for answer in ["", "maybe", "yess", "0"] {
            assert!(answer.parse::<ReplaceDecision>().is_err());
        }
    }
}
