// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route compilation.
//!
//! Declared page paths use the parameter syntax of the target routing
//! library (`/users/:id`, trailing `*` wildcard). [`compile_pattern`]
//! validates a declared path and translates it into a matchit pattern;
//! the concrete matcher is an implementation detail behind that seam.
//!
//! Compilation is best-effort: one malformed path produces a diagnostic
//! against the owning component and never aborts the remaining patterns.
//! The affected component is excluded from the route table (it stays in the
//! component registry for non-routed use).

use crate::error::Diagnostic;
use crate::scanner::ComponentInfo;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Route pattern syntax or conflict error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Page paths are absolute.
    #[error("page path must start with '/'")]
    MissingLeadingSlash,

    /// Empty path segment (`//`).
    #[error("page path contains an empty segment")]
    EmptySegment,

    /// A `:param` segment with a missing or malformed name.
    #[error("invalid parameter name in segment {0:?}")]
    InvalidParameter(String),

    /// The same parameter name appears twice.
    #[error("duplicate parameter name {0:?}")]
    DuplicateParameter(String),

    /// Syntax outside the supported subset (groups, inline wildcards,
    /// modifiers).
    #[error("unsupported path syntax in segment {0:?}")]
    UnsupportedSyntax(String),

    /// A `*` wildcard somewhere other than the final segment.
    #[error("wildcard '*' is only allowed as the final segment")]
    MisplacedWildcard,

    /// The pattern was rejected by the matcher (conflict with an existing
    /// route or an internal restriction).
    #[error("{0}")]
    Rejected(String),
}

/// A matchable representation of one declared page path.
pub struct RouteMatcher {
    pattern: String,
    case_sensitive: bool,
    router: matchit::Router<()>,
}

impl RouteMatcher {
    /// The matchit pattern this matcher was built from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Matches a request path, returning extracted parameters on success.
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let candidate = if self.case_sensitive {
            path.to_string()
        } else {
            path.to_ascii_lowercase()
        };
        let matched = self.router.at(&candidate).ok()?;
        Some(
            matched
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl fmt::Debug for RouteMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatcher")
            .field("pattern", &self.pattern)
            .field("case_sensitive", &self.case_sensitive)
            .finish()
    }
}

/// Compiles a declared page path into a [`RouteMatcher`].
///
/// Case sensitivity is applied at compile time: in the insensitive mode both
/// the pattern and every candidate path are lowercased.
pub fn compile_pattern(pattern: &str, case_sensitive: bool) -> Result<RouteMatcher, RouteError> {
    let matchit_pattern = to_matchit_pattern(pattern, case_sensitive)?;

    let mut router = matchit::Router::new();
    router
        .insert(&matchit_pattern, ())
        .map_err(|e| RouteError::Rejected(e.to_string()))?;

    Ok(RouteMatcher {
        pattern: matchit_pattern,
        case_sensitive,
        router,
    })
}

/// Translates the declared syntax into a matchit pattern.
fn to_matchit_pattern(pattern: &str, case_sensitive: bool) -> Result<String, RouteError> {
    if !pattern.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash);
    }
    if pattern == "/" {
        return Ok("/".to_string());
    }

    let mut seen = Vec::new();
    let mut segments = Vec::new();
    let raw: Vec<&str> = pattern[1..].split('/').collect();
    let last = raw.len() - 1;

    for (index, segment) in raw.iter().enumerate() {
        if segment.is_empty() {
            return Err(RouteError::EmptySegment);
        }
        if segment.contains(&['(', ')', '?', '+'][..]) {
            return Err(RouteError::UnsupportedSyntax((*segment).to_string()));
        }

        if *segment == "*" {
            if index != last {
                return Err(RouteError::MisplacedWildcard);
            }
            segments.push("{*rest}".to_string());
        } else if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty()
                || !name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(RouteError::InvalidParameter((*segment).to_string()));
            }
            if seen.iter().any(|s| s == name) {
                return Err(RouteError::DuplicateParameter(name.to_string()));
            }
            seen.push(name.to_string());
            segments.push(format!("{{{name}}}"));
        } else if segment.contains(&[':', '*'][..]) {
            // Inline parameters and wildcards (e.g. "file-:name", "a*b")
            // are outside the supported subset.
            return Err(RouteError::UnsupportedSyntax((*segment).to_string()));
        } else if case_sensitive {
            segments.push((*segment).to_string());
        } else {
            segments.push(segment.to_ascii_lowercase());
        }
    }

    Ok(format!("/{}", segments.join("/")))
}

/// One successfully compiled route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRoute {
    /// The originating component file.
    pub component: PathBuf,
    /// The declared page path, as written in the component metadata.
    pub path: String,
    /// The compiled matchit pattern.
    pub pattern: String,
}

impl CompiledRoute {
    /// Rebuilds the matcher for this route.
    pub fn matcher(&self, case_sensitive: bool) -> Result<RouteMatcher, RouteError> {
        compile_pattern(&self.path, case_sensitive)
    }
}

/// Compiles every declared page path in the component registry.
///
/// Returns the compiled routes in deterministic (component path) order plus
/// the diagnostics for paths that failed to compile or conflict with an
/// already registered route.
pub fn compile_routes(
    components: &BTreeMap<PathBuf, ComponentInfo>,
    case_sensitive: bool,
) -> (Vec<CompiledRoute>, Vec<Diagnostic>) {
    let mut routes = Vec::new();
    let mut errors = Vec::new();
    let mut table: matchit::Router<()> = matchit::Router::new();

    for (component, info) in components {
        let Some(path) = &info.path else {
            continue;
        };

        let matcher = match compile_pattern(path, case_sensitive) {
            Ok(matcher) => matcher,
            Err(e) => {
                errors.push(Diagnostic::new(
                    component,
                    format!("page path {path:?}: {e}"),
                ));
                continue;
            }
        };

        // Conflict detection across the whole route set.
        if let Err(e) = table.insert(matcher.pattern(), ()) {
            errors.push(Diagnostic::new(
                component,
                format!("page path {path:?}: {e}"),
            ));
            continue;
        }

        routes.push(CompiledRoute {
            component: component.clone(),
            path: path.clone(),
            pattern: matcher.pattern().to_string(),
        });
    }

    (routes, errors)
}
