// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Scratch-dir artifacts for the development session.
//!
//! The dev server and the app builder are separate processes; they pick up
//! the session's effective addresses from small JSON files written next to
//! the synthesized entries. Both files are rewritten wholesale on every
//! (re-)resolve, after the port patch.

use anyhow::Context;
use basys::ResolvedConfig;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

/// Writes `dev-server.json` (host, port, backendPort) into the scratch dir.
pub fn write_dev_server_config(config: &ResolvedConfig) -> anyhow::Result<PathBuf> {
    let path = config.temp_dir.join("dev-server.json");
    let body = json!({
        "host": config.host,
        "port": config.port,
        "backendPort": config.backend_port,
    });
    fs::write(&path, format!("{:#}\n", body))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Writes `app-builder.json` into the scratch dir when an app builder is
/// configured.
///
/// `appBuilder: true` selects the builder with default settings (an empty
/// object is written); an object carries its settings through verbatim;
/// `false`/absent writes nothing and returns `None`.
pub fn write_app_builder_config(config: &ResolvedConfig) -> anyhow::Result<Option<PathBuf>> {
    let settings = match &config.app_builder {
        Value::Bool(true) => json!({}),
        Value::Object(map) => Value::Object(map.clone()),
        _ => return Ok(None),
    };

    let path = config.temp_dir.join("app-builder.json");
    fs::write(&path, format!("{settings:#}\n"))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use basys::config::{resolve, Env};
    use std::path::Path;
    use tempfile::tempdir;

    fn project(dir: &Path, manifest: &str) -> ResolvedConfig {
        fs::write(dir.join("basys.json"), manifest).unwrap();
        fs::create_dir_all(dir.join("src")).unwrap();
        resolve(dir, None, Env::Dev).unwrap()
    }

    #[test]
    fn test_dev_server_config_reflects_patched_ports() {
        let dir = tempdir().unwrap();
        let mut config = project(dir.path(), "{apps: {main: {type: 'web'}}}");
        config.patch_ports(3100, Some(3101));

        let path = write_dev_server_config(&config).unwrap();
        let written: Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["host"], json!("localhost"));
        assert_eq!(written["port"], json!(3100));
        assert_eq!(written["backendPort"], json!(3101));
    }

    #[test]
    fn test_app_builder_object_written_verbatim() {
        let dir = tempdir().unwrap();
        let config = project(
            dir.path(),
            "{apps: {main: {type: 'web'}}, appBuilder: {port: 9000}}",
        );

        let path = write_app_builder_config(&config).unwrap().unwrap();
        let written: Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, json!({"port": 9000}));
    }

    #[test]
    fn test_app_builder_disabled_writes_nothing() {
        let dir = tempdir().unwrap();
        let config = project(
            dir.path(),
            "{apps: {main: {type: 'web'}}, appBuilder: false}",
        );

        assert!(write_app_builder_config(&config).unwrap().is_none());
        assert!(!config.temp_dir.join("app-builder.json").exists());
    }
}
