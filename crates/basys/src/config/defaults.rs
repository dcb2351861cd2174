// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Static default configuration tables.
//!
//! Three layers, merged lowest to highest before any manifest values:
//! common defaults, per-environment defaults, per-kind defaults.

use super::{AppKind, Env};
use crate::config::merge::{merge, ArrayMerge};
use serde_json::{json, Value};

/// Defaults shared by every app kind and environment.
fn common_defaults() -> Value {
    json!({
        "entry": null,
        "favicon": null,
        "styles": [],
        "custom": {},
        "caseSensitive": false,
        "appBuilder": true,
        "poll": false,
        "testBrowsers": [],
    })
}

/// Per-environment defaults.
///
/// Dev and test servers get a port that is only a starting point: if it is
/// taken, a free one is probed and patched in (see `ResolvedConfig::patch_ports`).
/// In production the server fails to start if the port is in use.
fn env_defaults(env: Env) -> Value {
    match env {
        Env::Dev => json!({
            "host": "localhost",
            "port": 8080,
            "cssSourceMap": false,
            "jsSourceMap": false,
        }),
        Env::Test => json!({
            "host": "localhost",
            "port": 8080,
            "cssSourceMap": true,
            "jsSourceMap": true,
        }),
        Env::Prod => json!({
            "host": "localhost",
            "port": 8080,
            "cssSourceMap": true,
            "jsSourceMap": true,
        }),
    }
}

/// Per-kind defaults. The web kind is the only one with a backend process.
fn kind_defaults(kind: AppKind, env: Env) -> Value {
    match kind {
        AppKind::Web => json!({
            "browsers": ["> 1%", "last 2 versions"],
            "backendEntry": null,
            "backendPort": 8081,
            "nodeVersion": if env == Env::Dev { "current" } else { "8.9" },
        }),
        AppKind::Mobile => json!({}),
        AppKind::Desktop => json!({}),
    }
}

/// Builds the full default table for one `(kind, env)` pair.
///
/// Kind defaults sit above environment defaults: a key present in both is
/// taken from the kind table.
pub fn defaults(kind: AppKind, env: Env) -> Value {
    let base = merge(&common_defaults(), &env_defaults(env), ArrayMerge::Replace);
    merge(&base, &kind_defaults(kind, env), ArrayMerge::Replace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_defaults() {
        let value = defaults(AppKind::Web, Env::Dev);
        assert_eq!(value["port"], 8080);
        assert_eq!(value["host"], "localhost");
        assert_eq!(value["backendPort"], 8081);
        assert_eq!(value["nodeVersion"], "current");
        assert_eq!(
            value["browsers"],
            serde_json::json!(["> 1%", "last 2 versions"])
        );
    }

    #[test]
    fn test_source_maps_per_env() {
        assert_eq!(defaults(AppKind::Web, Env::Dev)["cssSourceMap"], false);
        assert_eq!(defaults(AppKind::Web, Env::Test)["cssSourceMap"], true);
        assert_eq!(defaults(AppKind::Web, Env::Prod)["jsSourceMap"], true);
    }

    #[test]
    fn test_node_version_outside_dev() {
        assert_eq!(defaults(AppKind::Web, Env::Prod)["nodeVersion"], "8.9");
    }

    #[test]
    fn test_non_web_kinds_have_no_backend() {
        let value = defaults(AppKind::Mobile, Env::Dev);
        assert!(value.get("backendPort").is_none());
        assert!(value.get("backendEntry").is_none());
    }
}
