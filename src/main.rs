//! Generate Android Upload Keystore
//!
//! Generates `upload-keystore.jks` with `keytool` and writes the matching
//! `key.properties` next to it, both in the current directory.
//!
//! ## What it does
//! - Validates passwords (6+ characters) and the `--replace` answer
//! - If `upload-keystore.jks` exists, replaces it (`--replace y`) or keeps it
//!   and exits successfully (`--replace n`)
//! - Runs `keytool` for an RSA 2048-bit key valid for 10000 days, alias `app`
//! - Writes `key.properties` with `storeFile=../app/upload-keystore.jks`
//! - On any failure after that point, removes both files again
//!
//! keytool is looked up via `KEYTOOL`, then `$JAVA_HOME/bin`, then `PATH`.
//!
//! Usage:
//!   gen_android_keystore --store-pass PASS --key-pass PASS --replace y|n
//!       [--cn NAME] [--ou UNIT] [--org ORG] [--location CITY] [--state STATE] [--country CC]

mod args;
mod cleanup;
mod keystore;
mod properties;
mod utils;

use anyhow::{bail, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use args::{Args, KeystoreConfig};
use cleanup::ArtifactGuard;
use keystore::{ExistingKeystore, KeyGenerator, KeyRequest, Keytool, KEYSTORE_FILE};
use properties::PROPERTIES_FILE;

/// Output locations, rooted at the working directory.
#[derive(Debug, Clone)]
struct ArtifactPaths {
    keystore: PathBuf,
    properties: PathBuf,
}

impl ArtifactPaths {
    fn in_dir(dir: &Path) -> Self {
        Self {
            keystore: dir.join(KEYSTORE_FILE),
            properties: dir.join(PROPERTIES_FILE),
        }
    }
}

const FAILURE_MESSAGE: &str = "✗ Keystore generation failed; fix the error and rerun.";

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Generated,
    KeptExisting,
}

/// Generate the keystore and properties file. `locate` is only called once
/// the run is known to need a key generator.
fn run<G, F>(config: &KeystoreConfig, paths: &ArtifactPaths, locate: F) -> Result<Outcome>
where
    G: KeyGenerator,
    F: FnOnce() -> Result<G>,
{
    let existing = keystore::check_existing(&paths.keystore, config.replace)?;
    if existing == ExistingKeystore::Keep {
        println!(
            "✓ Keeping existing keystore at {}. Nothing to do.",
            paths.keystore.display()
        );
        return Ok(Outcome::KeptExisting);
    }

    let generator = locate()?;
    if existing == ExistingKeystore::Replace {
        keystore::remove_existing(&paths.keystore)?;
    }

    let guard = ArtifactGuard::new([paths.keystore.clone(), paths.properties.clone()]);

    let request = KeyRequest {
        keystore: &paths.keystore,
        store_password: &config.store_password,
        key_password: &config.key_password,
        dname: &config.dname,
    };
    println!("Generating keystore with dname: {}", config.dname);
    generator.generate(&request)?;
    if !paths.keystore.exists() {
        bail!(
            "keytool reported success but {} was not created",
            paths.keystore.display()
        );
    }
    println!("✓ Keystore generated at: {}", paths.keystore.display());

    properties::write_key_properties(&paths.properties, config, KEYSTORE_FILE)?;

    guard.disarm();
    Ok(Outcome::Generated)
}

/// `--help` exits 0; every usage error exits 1 instead of clap's default 2.
fn parse_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_exit_code(&e));
        }
    };

    for flag in args.missing_optional() {
        eprintln!("Warning: {flag} not provided, using an empty value");
    }

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("Run with --help for usage.");
            return ExitCode::FAILURE;
        }
    };

    let paths = ArtifactPaths::in_dir(Path::new("."));
    match run(&config, &paths, Keytool::locate) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("{FAILURE_MESSAGE}");
            ExitCode::FAILURE
        }
    }
}
