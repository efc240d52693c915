use anyhow::{bail, Context, Result};
use java_properties::PropertiesWriter;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::args::KeystoreConfig;
use crate::keystore::KEY_ALIAS;

pub const PROPERTIES_FILE: &str = "key.properties";

/// Gradle resolves `storeFile` relative to the `app` module, one level below
/// the directory holding key.properties.
const STORE_FILE_DIR: &str = "../app";

pub fn store_file_entry(keystore_file_name: &str) -> String {
    format!("{STORE_FILE_DIR}/{keystore_file_name}")
}

/// Write key.properties from scratch, truncating any previous file.
pub fn write_key_properties(
    path: &Path,
    config: &KeystoreConfig,
    keystore_file_name: &str,
) -> Result<()> {
    let store_file = store_file_entry(keystore_file_name);
    let entries = [
        ("storePassword", config.store_password.as_str()),
        ("keyPassword", config.key_password.as_str()),
        ("keyAlias", KEY_ALIAS),
        ("storeFile", store_file.as_str()),
    ];

    let file = fs::File::create(path)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    let mut writer = PropertiesWriter::new_with_encoding(BufWriter::new(file), encoding_rs::UTF_8);
    for (key, value) in entries {
        writer
            .write(key, value)
            .with_context(|| format!("Failed to write {key} to {}", path.display()))?;
    }
    writer
        .finish()
        .with_context(|| format!("Failed to write properties: {}", path.display()))?;
    drop(writer);

    if !path.exists() {
        bail!("{} was not created", path.display());
    }
    println!("✓ Properties written to: {}", path.display());
    Ok(())
}
