// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Configuration resolution.
//!
//! [`resolve`] turns a `(projectDir, appName, env)` triple into one
//! [`ResolvedConfig`]: the single source of truth for a build or dev cycle.
//! Precedence, lowest to highest:
//!
//! 1. environment defaults (dev/test/prod)
//! 2. app-kind defaults (web/mobile/desktop)
//! 3. project-wide manifest settings (`caseSensitive`, `appBuilder`)
//! 4. the app declaration from `basys.json`
//! 5. the app's environment-specific sub-block for the active environment
//!
//! Arrays replace wholesale on merge (see [`merge::ArrayMerge`]). The
//! `dev`/`test`/`prod` sub-block keys are stripped right after folding so
//! they never leak into the final snapshot.
//!
//! A `ResolvedConfig` is rebuilt fresh on every resolution and is never
//! mutated afterwards, with one exception: [`ResolvedConfig::patch_ports`]
//! overwrites `port`/`backendPort` once free ports have been probed.

/// Static default configuration tables.
pub mod defaults;
/// Deep merge over JSON values.
pub mod merge;

use crate::error::{ConfigError, Result};
use crate::manifest::{Manifest, MANIFEST_FILE};
use merge::{merge, ArrayMerge};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Built-in configuration keys recognized by the resolver.
///
/// A manifest key outside this set under an app's `custom` bag is passed
/// through verbatim to application code; any key *inside* this set given
/// under `custom` is a configuration error.
pub const BUILT_IN_KEYS: &[&str] = &[
    "entry",
    "favicon",
    "styles",
    "cssSourceMap",
    "jsSourceMap",
    "host",
    "port",
    "backendEntry",
    "backendPort",
    "nodeVersion",
    "browsers",
    "testBrowsers",
    "poll",
    "custom",
    "appBuilder",
    "caseSensitive",
];

/// Environment sub-block keys allowed inside an app declaration.
const ENV_KEYS: &[&str] = &["dev", "test", "prod"];

/// The target platform of a declared application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    /// Browser app with a backend server process.
    Web,
    /// Mobile app.
    Mobile,
    /// Desktop app.
    Desktop,
}

impl AppKind {
    /// Parses a manifest `type` value.
    pub fn parse(kind: &str) -> Option<AppKind> {
        match kind {
            "web" => Some(AppKind::Web),
            "mobile" => Some(AppKind::Mobile),
            "desktop" => Some(AppKind::Desktop),
            _ => None,
        }
    }

    /// The manifest spelling of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppKind::Web => "web",
            AppKind::Mobile => "mobile",
            AppKind::Desktop => "desktop",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The environment a configuration is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    /// Development server with watch-driven regeneration.
    Dev,
    /// End-to-end / unit test runs.
    Test,
    /// Production build.
    Prod,
}

impl Env {
    /// The manifest spelling of the environment tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Dev => "dev",
            Env::Test => "test",
            Env::Prod => "prod",
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Env::Dev),
            "test" => Ok(Env::Test),
            "prod" => Ok(Env::Prod),
            other => Err(format!(
                "invalid environment {other:?} (expected dev, test or prod)"
            )),
        }
    }
}

/// The fully merged configuration snapshot for one `(project, app, env)`
/// triple.
///
/// Treated as read-only for the duration of a synthesis cycle; only
/// [`ResolvedConfig::patch_ports`] may mutate it, once, after free ports are
/// probed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    /// Name of the resolved app.
    pub app_name: String,
    /// The app's target platform.
    #[serde(rename = "type")]
    pub kind: AppKind,
    /// The environment tag.
    pub env: Env,
    /// Dev/backend server host.
    pub host: String,
    /// Dev server port (starting point; patched once probed).
    pub port: u16,
    /// Backend server port, web apps only.
    #[serde(default)]
    pub backend_port: Option<u16>,
    /// User frontend entry module, relative to `src/`.
    #[serde(default)]
    pub entry: Option<String>,
    /// User backend entry module, relative to `src/`, web apps only.
    #[serde(default)]
    pub backend_entry: Option<String>,
    /// Favicon path.
    #[serde(default)]
    pub favicon: Option<String>,
    /// Global stylesheet list.
    #[serde(default)]
    pub styles: Vec<String>,
    /// Emit CSS source maps.
    pub css_source_map: bool,
    /// Emit JS source maps.
    pub js_source_map: bool,
    /// Browserslist targets, web apps only.
    #[serde(default)]
    pub browsers: Vec<String>,
    /// Browsers used by the e2e test runner.
    #[serde(default)]
    pub test_browsers: Vec<String>,
    /// Node version targeted by the backend bundle, web apps only.
    #[serde(default)]
    pub node_version: Option<String>,
    /// Poll the file system instead of relying on watch events.
    #[serde(default)]
    pub poll: bool,
    /// User custom options, passed through verbatim to application code.
    #[serde(default)]
    pub custom: Map<String, Value>,
    /// App builder sub-config (`true`, `false` or an options object).
    #[serde(default)]
    pub app_builder: Value,
    /// Project-wide route case sensitivity.
    pub case_sensitive: bool,
    /// Public path prefix for emitted assets.
    pub assets_public_path: String,
    /// Absolute project root.
    pub project_dir: PathBuf,
    /// Per-app, per-env scratch directory for generated artifacts.
    pub temp_dir: PathBuf,
    /// Bundler output directory: `dist/` in production, the scratch
    /// directory otherwise.
    pub dist_dir: PathBuf,
}

impl ResolvedConfig {
    /// Patches in the probed free ports.
    ///
    /// This is the only permitted mutation of a resolved configuration; all
    /// other fields are preserved.
    pub fn patch_ports(&mut self, port: u16, backend_port: Option<u16>) {
        self.port = port;
        if backend_port.is_some() {
            self.backend_port = backend_port;
        }
    }

    /// The component source root, `<projectDir>/src`.
    pub fn src_dir(&self) -> PathBuf {
        self.project_dir.join("src")
    }
}

/// Resolves the configuration for `(project_dir, app_name, env)`.
///
/// Loads the manifest, selects the target app, merges the default tables
/// with the declaration and its environment sub-block, validates the custom
/// option bag and ensures the scratch directory exists. Fatal on any
/// configuration error; there is no partial result.
pub fn resolve(project_dir: &Path, app_name: Option<&str>, env: Env) -> Result<ResolvedConfig> {
    let manifest = Manifest::load(&project_dir.join(MANIFEST_FILE))?;
    resolve_from(project_dir, &manifest, app_name, env)
}

/// Resolves against an already loaded manifest.
pub fn resolve_from(
    project_dir: &Path,
    manifest: &Manifest,
    app_name: Option<&str>,
    env: Env,
) -> Result<ResolvedConfig> {
    let (name, decl) = manifest.select_app(app_name)?;
    let name = name.to_string();

    let kind = match decl.get("type") {
        None | Some(Value::Null) => return Err(ConfigError::MissingAppKind { app: name }),
        Some(Value::String(kind)) => {
            AppKind::parse(kind).ok_or_else(|| ConfigError::InvalidAppKind {
                app: name.clone(),
                kind: kind.clone(),
            })?
        }
        Some(other) => {
            return Err(ConfigError::InvalidAppKind {
                app: name,
                kind: other.to_string(),
            })
        }
    };

    // Fold the matching environment sub-block over the declaration, then
    // strip all sub-block keys: they must not leak into the final config or
    // be mistaken for custom options.
    let mut declared = Value::Object(decl.clone());
    if let Some(sub) = decl.get(env.as_str()) {
        let Value::Object(sub_map) = sub else {
            return Err(ConfigError::InvalidOptionValue {
                message: format!(
                    "app {name:?}: {:?} override block must be an object",
                    env.as_str()
                ),
            });
        };
        // The kind was validated from the declaration above; letting a
        // sub-block swap it afterwards would skip that validation and mix
        // one kind's defaults with another's.
        if sub_map.contains_key("type") {
            return Err(ConfigError::InvalidOptionValue {
                message: format!(
                    "app {name:?}: \"type\" cannot be overridden in the {:?} block",
                    env.as_str()
                ),
            });
        }
        declared = merge(&declared, sub, ArrayMerge::Replace);
    }
    if let Value::Object(map) = &mut declared {
        for key in ENV_KEYS {
            map.remove(*key);
        }
        for key in map.keys() {
            if key != "type" && !BUILT_IN_KEYS.contains(&key.as_str()) {
                return Err(ConfigError::UnknownOption {
                    app: name,
                    key: key.clone(),
                });
            }
        }
    }

    // Project-wide manifest settings sit between the default tables and the
    // app declaration.
    let mut base = defaults::defaults(kind, env);
    base = merge(
        &base,
        &json!({ "caseSensitive": manifest.case_sensitive }),
        ArrayMerge::Replace,
    );
    if !manifest.app_builder.is_null() {
        base = merge(
            &base,
            &json!({ "appBuilder": manifest.app_builder }),
            ArrayMerge::Replace,
        );
    }

    let mut merged = merge(&base, &declared, ArrayMerge::Replace);

    if let Some(custom) = merged.get("custom") {
        let Value::Object(custom) = custom else {
            return Err(ConfigError::InvalidOptionValue {
                message: format!("app {name:?}: \"custom\" must be an object"),
            });
        };
        for key in custom.keys() {
            if key == "type" || BUILT_IN_KEYS.contains(&key.as_str()) {
                return Err(ConfigError::CustomOptionCollision {
                    app: name,
                    key: key.clone(),
                });
            }
        }
    }

    let temp_dir = project_dir.join(".basys").join(&name).join(env.as_str());
    fs::create_dir_all(&temp_dir).map_err(|source| ConfigError::ScratchDir {
        path: temp_dir.clone(),
        source,
    })?;

    let dist_dir = if env == Env::Prod {
        project_dir.join("dist")
    } else {
        temp_dir.clone()
    };

    if let Value::Object(map) = &mut merged {
        map.insert("appName".to_string(), json!(name));
        map.insert("env".to_string(), json!(env.as_str()));
        map.insert("assetsPublicPath".to_string(), json!("/"));
        map.insert("projectDir".to_string(), json!(project_dir));
        map.insert("tempDir".to_string(), json!(temp_dir));
        map.insert("distDir".to_string(), json!(dist_dir));
    }

    serde_json::from_value(merged).map_err(|e| ConfigError::InvalidOptionValue {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn project(manifest: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), manifest).unwrap();
        dir
    }

    #[test]
    fn test_merge_precedence() {
        let dir = project(
            r#"{apps: {main: {
                type: 'web',
                port: 9000,
                dev: {port: 9090},
            }}}"#,
        );

        let dev = resolve(dir.path(), None, Env::Dev).unwrap();
        assert_eq!(dev.port, 9090);

        let prod = resolve(dir.path(), None, Env::Prod).unwrap();
        assert_eq!(prod.port, 9000);
    }

    #[test]
    fn test_defaults_apply_when_undeclared() {
        let dir = project("{apps: {main: {type: 'web'}}}");
        let config = resolve(dir.path(), None, Env::Dev).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.backend_port, Some(8081));
        assert!(!config.css_source_map);
        assert_eq!(config.browsers, vec!["> 1%", "last 2 versions"]);
    }

    #[test]
    fn test_array_replace_never_concatenates() {
        let dir = project("{apps: {main: {type: 'web', browsers: ['ie11']}}}");
        let config = resolve(dir.path(), None, Env::Dev).unwrap();
        assert_eq!(config.browsers, vec!["ie11"]);
    }

    #[test]
    fn test_custom_collision_is_fatal_for_every_kind() {
        for kind in ["web", "mobile", "desktop"] {
            let dir = project(&format!(
                "{{apps: {{main: {{type: '{kind}', custom: {{port: 1}}}}}}}}"
            ));
            let err = resolve(dir.path(), None, Env::Dev).unwrap_err();
            match err {
                ConfigError::CustomOptionCollision { key, .. } => assert_eq!(key, "port"),
                other => panic!("expected collision error, got {other}"),
            }
        }
    }

    #[test]
    fn test_custom_options_pass_through() {
        let dir = project(
            "{apps: {main: {type: 'web', custom: {apiKey: 'k', flags: {beta: true}}}}}",
        );
        let config = resolve(dir.path(), None, Env::Dev).unwrap();
        assert_eq!(config.custom["apiKey"], "k");
        assert_eq!(config.custom["flags"]["beta"], true);
    }

    #[test]
    fn test_env_sub_blocks_never_leak() {
        let dir = project(
            r#"{apps: {main: {
                type: 'web',
                dev: {port: 9090},
                test: {port: 9191},
                prod: {port: 9292},
            }}}"#,
        );

        let test = resolve(dir.path(), None, Env::Test).unwrap();
        assert_eq!(test.port, 9191);
        // The other sub-blocks are gone, not smuggled into custom options.
        assert!(test.custom.is_empty());
    }

    #[test]
    fn test_env_sub_block_cannot_override_kind() {
        let dir = project("{apps: {main: {type: 'web', dev: {type: 'mobile'}}}}");
        let err = resolve(dir.path(), None, Env::Dev).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOptionValue { .. }));
        assert!(err.to_string().contains("\"type\""));

        // A bogus kind in a sub-block gets the same clear rejection instead
        // of a deserialization error downstream.
        let dir = project("{apps: {main: {type: 'web', dev: {type: 'tv'}}}}");
        let err = resolve(dir.path(), None, Env::Dev).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOptionValue { .. }));

        // Sub-blocks for other environments are stripped, never folded.
        let dir = project("{apps: {main: {type: 'web', dev: {type: 'mobile'}}}}");
        let prod = resolve(dir.path(), None, Env::Prod).unwrap();
        assert_eq!(prod.kind, AppKind::Web);
        assert_eq!(prod.backend_port, Some(8081));
    }

    #[test]
    fn test_unknown_app_level_key_is_fatal() {
        let dir = project("{apps: {main: {type: 'web', prot: 8080}}}");
        let err = resolve(dir.path(), None, Env::Dev).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { ref key, .. } if key == "prot"));
    }

    #[test]
    fn test_invalid_kind_is_fatal() {
        let dir = project("{apps: {main: {type: 'tv'}}}");
        let err = resolve(dir.path(), None, Env::Dev).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAppKind { ref kind, .. } if kind == "tv"));

        let dir = project("{apps: {main: {port: 8080}}}");
        let err = resolve(dir.path(), None, Env::Dev).unwrap_err();
        assert!(matches!(err, ConfigError::MissingAppKind { .. }));
    }

    #[test]
    fn test_scratch_dir_determinism() {
        let dir = project("{apps: {main: {type: 'web'}}}");

        let first = resolve(dir.path(), None, Env::Dev).unwrap();
        let second = resolve(dir.path(), None, Env::Dev).unwrap();
        assert_eq!(first.temp_dir, second.temp_dir);
        assert_eq!(first.dist_dir, second.dist_dir);

        assert!(first.temp_dir.is_dir());
        assert_eq!(
            first.temp_dir,
            dir.path().join(".basys").join("main").join("dev")
        );
        // Non-production output lands in the scratch directory.
        assert_eq!(first.dist_dir, first.temp_dir);

        let prod = resolve(dir.path(), None, Env::Prod).unwrap();
        assert_eq!(prod.dist_dir, dir.path().join("dist"));
    }

    #[test]
    fn test_port_patch_preserves_all_other_fields() {
        let dir = project("{apps: {main: {type: 'web', custom: {apiKey: 'k'}}}}");
        let original = resolve(dir.path(), None, Env::Dev).unwrap();

        let mut patched = original.clone();
        patched.patch_ports(9999, Some(9998));
        assert_eq!(patched.port, 9999);
        assert_eq!(patched.backend_port, Some(9998));

        patched.port = original.port;
        patched.backend_port = original.backend_port;
        assert_eq!(patched, original);
    }

    #[test]
    fn test_project_wide_case_sensitive() {
        let dir = project("{caseSensitive: true, apps: {main: {type: 'web'}}}");
        let config = resolve(dir.path(), None, Env::Dev).unwrap();
        assert!(config.case_sensitive);
    }

    #[test]
    fn test_resolution_is_rebuilt_fresh() {
        let dir = project("{apps: {main: {type: 'web', port: 9000}}}");
        let first = resolve(dir.path(), None, Env::Dev).unwrap();
        assert_eq!(first.port, 9000);

        fs::write(
            dir.path().join(MANIFEST_FILE),
            "{apps: {main: {type: 'web', port: 9100}}}",
        )
        .unwrap();
        let second = resolve(dir.path(), None, Env::Dev).unwrap();
        assert_eq!(second.port, 9100);
    }
}
