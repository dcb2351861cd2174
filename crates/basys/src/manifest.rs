// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Project manifest loading.
//!
//! The manifest (`basys.json`) is the user-authored declaration of the
//! project: a top-level `apps` object mapping app name to its declaration,
//! plus the project-wide `caseSensitive` flag and optional `appBuilder`
//! sub-config. It is parsed with the tolerant-JSON syntax from
//! [`crate::json5`].
//!
//! Manifest errors are always fatal: there is no valid partial manifest.

use crate::error::{ConfigError, Result};
use crate::json5;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "basys.json";

/// Top-level manifest keys. Anything else is a configuration error.
const TOP_LEVEL_KEYS: &[&str] = &["apps", "caseSensitive", "appBuilder"];

/// The parsed, shape-validated project manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Path the manifest was loaded from.
    pub path: PathBuf,
    /// App declarations keyed by app name. Names are unique by construction
    /// (JSON object keys).
    pub apps: Map<String, Value>,
    /// Project-wide route case sensitivity.
    pub case_sensitive: bool,
    /// App builder sub-config (`true`, `false` or an options object).
    pub app_builder: Value,
}

impl Manifest {
    /// Loads and shape-validates the manifest at `path`.
    pub fn load(path: &Path) -> Result<Manifest> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

        let value = json5::parse(&text).map_err(|source| ConfigError::ManifestSyntax {
            path: path.to_path_buf(),
            source,
        })?;

        let shape_err = |reason: String| ConfigError::ManifestShape {
            path: path.to_path_buf(),
            reason,
        };

        let Value::Object(root) = value else {
            return Err(shape_err("top-level value must be an object".to_string()));
        };

        for key in root.keys() {
            if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
                return Err(shape_err(format!("unrecognized top-level key {key:?}")));
            }
        }

        let apps = match root.get("apps") {
            Some(Value::Object(apps)) if !apps.is_empty() => apps.clone(),
            Some(Value::Object(_)) | None => {
                return Err(shape_err("no apps are declared under \"apps\"".to_string()))
            }
            Some(_) => return Err(shape_err("\"apps\" must be an object".to_string())),
        };

        for (name, decl) in &apps {
            if !decl.is_object() {
                return Err(shape_err(format!("app {name:?} must be an object")));
            }
        }

        let case_sensitive = match root.get("caseSensitive") {
            Some(Value::Bool(b)) => *b,
            None => false,
            Some(_) => return Err(shape_err("\"caseSensitive\" must be a boolean".to_string())),
        };

        let app_builder = root.get("appBuilder").cloned().unwrap_or(Value::Null);

        Ok(Manifest {
            path: path.to_path_buf(),
            apps,
            case_sensitive,
            app_builder,
        })
    }

    /// Declared app names, in manifest order.
    pub fn app_names(&self) -> Vec<String> {
        self.apps.keys().cloned().collect()
    }

    /// Selects the target app declaration.
    ///
    /// With `name` omitted the single declared app is used; several declared
    /// apps require an explicit name. An unknown name lists the valid ones.
    pub fn select_app(&self, name: Option<&str>) -> Result<(&str, &Map<String, Value>)> {
        if name.is_none() && self.apps.len() > 1 {
            return Err(ConfigError::AppNameRequired {
                names: self.app_names(),
            });
        }

        for (key, decl) in &self.apps {
            let matches = match name {
                Some(name) => key == name,
                None => true,
            };
            if matches {
                if let Value::Object(decl) = decl {
                    return Ok((key.as_str(), decl));
                }
            }
        }

        Err(ConfigError::UnknownApp {
            name: name.unwrap_or_default().to_string(),
            names: self.app_names(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_manifest(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join(MANIFEST_FILE);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_tolerant_syntax() {
        let dir = tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            r#"{
              // the single web app
              apps: {
                main: {type: 'web', port: 9000,},
              },
              caseSensitive: true,
            }"#,
        );

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.app_names(), vec!["main"]);
        assert!(manifest.case_sensitive);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let err = Manifest::load(&dir.path().join(MANIFEST_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::ManifestRead { .. }));
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let dir = tempdir().unwrap();
        let path = write_manifest(dir.path(), "{apps: {main: {type: 'web'}");
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ManifestSyntax { .. }));
    }

    #[test]
    fn test_non_object_is_fatal() {
        let dir = tempdir().unwrap();
        let path = write_manifest(dir.path(), "[1, 2, 3]");
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ManifestShape { .. }));
    }

    #[test]
    fn test_no_apps_is_fatal() {
        let dir = tempdir().unwrap();
        let path = write_manifest(dir.path(), "{apps: {}}");
        assert!(matches!(
            Manifest::load(&path).unwrap_err(),
            ConfigError::ManifestShape { .. }
        ));

        let path = write_manifest(dir.path(), "{caseSensitive: false}");
        assert!(matches!(
            Manifest::load(&path).unwrap_err(),
            ConfigError::ManifestShape { .. }
        ));
    }

    #[test]
    fn test_unknown_top_level_key_is_fatal() {
        let dir = tempdir().unwrap();
        let path = write_manifest(dir.path(), "{apps: {main: {type: 'web'}}, prot: 1}");
        let err = Manifest::load(&path).unwrap_err();
        assert!(err.to_string().contains("prot"));
    }

    #[test]
    fn test_select_single_app_without_name() {
        let dir = tempdir().unwrap();
        let path = write_manifest(dir.path(), "{apps: {main: {type: 'web'}}}");
        let manifest = Manifest::load(&path).unwrap();
        let (name, _) = manifest.select_app(None).unwrap();
        assert_eq!(name, "main");
    }

    #[test]
    fn test_select_requires_name_with_several_apps() {
        let dir = tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            "{apps: {admin: {type: 'web'}, public: {type: 'web'}}}",
        );
        let manifest = Manifest::load(&path).unwrap();

        let err = manifest.select_app(None).unwrap_err();
        assert!(matches!(err, ConfigError::AppNameRequired { .. }));

        let (name, _) = manifest.select_app(Some("admin")).unwrap();
        assert_eq!(name, "admin");
    }

    #[test]
    fn test_select_unknown_app_lists_valid_names() {
        let dir = tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            "{apps: {admin: {type: 'web'}, public: {type: 'web'}}}",
        );
        let manifest = Manifest::load(&path).unwrap();
        let err = manifest.select_app(Some("backoffice")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("backoffice"));
        assert!(message.contains("admin"));
        assert!(message.contains("public"));
    }
}
