// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Bundler entry synthesis.
//!
//! Renders the frontend bootstrap module and, for web apps, the backend
//! bootstrap module as plain source text, parameterized by the resolved
//! configuration, the component registry and the compiled routes. Both
//! entries are written wholesale into the scratch directory; there is no
//! incremental patching.
//!
//! Frontend and backend are independent failure domains: a missing user
//! entry module surfaces as a diagnostic against that entry type and the
//! other output still proceeds.
//!
//! The backend entry embeds a deliberately narrow configuration object:
//! `host`, `port`, `backendPort` plus everything under `custom`. Nothing
//! else from the resolved configuration reaches the running application
//! process.

use crate::config::{AppKind, Env, ResolvedConfig};
use crate::error::{ConfigError, Diagnostic, Result};
use crate::routes::CompiledRoute;
use crate::scanner::ComponentInfo;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Which bootstrap module an [`EntrySource`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// The browser bootstrap module.
    Frontend,
    /// The server bootstrap module (web apps only).
    Backend,
}

impl EntryKind {
    /// The file name of the entry inside the scratch directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            EntryKind::Frontend => "frontend-entry.js",
            EntryKind::Backend => "backend-entry.js",
        }
    }
}

/// Synthesized source text for one bootstrap module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySource {
    /// Frontend or backend.
    pub kind: EntryKind,
    /// The scratch-directory path the source is written to.
    pub path: PathBuf,
    /// The rendered module source.
    pub source: String,
}

/// Result of one synthesis pass.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    /// The scan generation this output belongs to.
    pub generation: u64,
    /// The frontend bootstrap module.
    pub frontend: EntrySource,
    /// The backend bootstrap module, present only for web apps.
    pub backend: Option<EntrySource>,
    /// Per-entry synthesis diagnostics.
    pub errors: Vec<Diagnostic>,
}

impl SynthesisOutput {
    /// Writes both entries into the scratch directory, fully overwriting
    /// any previous content.
    pub fn write(&self) -> Result<()> {
        write_entry(&self.frontend)?;
        if let Some(backend) = &self.backend {
            write_entry(backend)?;
        }
        Ok(())
    }
}

fn write_entry(entry: &EntrySource) -> Result<()> {
    fs::write(&entry.path, &entry.source).map_err(|source| ConfigError::EntryWrite {
        path: entry.path.clone(),
        source,
    })
}

/// Renders the entry modules for one scan generation.
///
/// Never fails: a missing referenced user entry module is recorded as a
/// diagnostic and the affected entry renders without the customization.
pub fn synthesize(
    config: &ResolvedConfig,
    components: &BTreeMap<PathBuf, ComponentInfo>,
    routes: &[CompiledRoute],
    generation: u64,
) -> SynthesisOutput {
    let mut errors = Vec::new();

    let frontend_entry = resolve_user_entry(config, config.entry.as_deref(), &mut errors);
    let frontend = EntrySource {
        kind: EntryKind::Frontend,
        path: config.temp_dir.join(EntryKind::Frontend.file_name()),
        source: render_frontend(config, components, routes, frontend_entry.as_deref(), generation),
    };

    let backend = (config.kind == AppKind::Web).then(|| {
        let backend_entry = resolve_user_entry(config, config.backend_entry.as_deref(), &mut errors);
        EntrySource {
            kind: EntryKind::Backend,
            path: config.temp_dir.join(EntryKind::Backend.file_name()),
            source: render_backend(config, routes, backend_entry.as_deref(), generation),
        }
    });

    SynthesisOutput {
        generation,
        frontend,
        backend,
        errors,
    }
}

/// Resolves a user entry module path relative to `src/`, recording a
/// diagnostic when the referenced file does not exist.
fn resolve_user_entry(
    config: &ResolvedConfig,
    entry: Option<&str>,
    errors: &mut Vec<Diagnostic>,
) -> Option<PathBuf> {
    let entry = entry?;
    let path = config.src_dir().join(entry);
    if path.exists() {
        Some(path)
    } else {
        errors.push(Diagnostic::new(
            &path,
            format!("referenced entry module {entry:?} does not exist"),
        ));
        None
    }
}

/// Escapes a string as a JS string literal.
fn js_str(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn js_path(path: &Path) -> String {
    js_str(&path.to_string_lossy())
}

fn header(generation: u64) -> String {
    format!("// Generated by basys (generation {generation}). Do not edit.\n")
}

/// Renders the frontend bootstrap: registers every component, builds the
/// router table from the compiled routes, installs the head/meta and router
/// plugins and mounts the application.
fn render_frontend(
    config: &ResolvedConfig,
    components: &BTreeMap<PathBuf, ComponentInfo>,
    routes: &[CompiledRoute],
    user_entry: Option<&Path>,
    generation: u64,
) -> String {
    let routed: BTreeMap<&PathBuf, &str> = routes
        .iter()
        .map(|route| (&route.component, route.path.as_str()))
        .collect();

    let mut js = header(generation);
    js.push_str("import '@babel/polyfill';\n");
    js.push_str("import Meta from 'vue-meta';\n");
    js.push_str("import Router from 'vue-router';\n\n");
    js.push_str("const routes = [];\nlet options;\nlet comp;\n\n");
    js.push_str("Vue.use(Meta, {keyName: 'head'});\nVue.use(Router);\n\n");

    match user_entry {
        Some(entry) => {
            js.push_str(&format!("const entry = require({});\n", js_path(entry)));
            js.push_str("const conf = (entry && entry.default) || {};\n\n");
        }
        None => js.push_str("const conf = {};\n\n"),
    }

    for path in components.keys() {
        js.push_str(&format!("options = require({}).default;\n", js_path(path)));
        js.push_str("comp = Vue.component(options.name, options);\n");
        if let Some(page_path) = routed.get(path) {
            js.push_str("routes.push({\n");
            js.push_str(&format!("  path: {},\n", js_str(page_path)));
            js.push_str("  name: options.name,\n");
            js.push_str("  component: comp,\n");
            js.push_str("});\n");
        }
        js.push('\n');
    }

    js.push_str("const router = new Router({\n");
    js.push_str("  mode: 'history',\n");
    js.push_str(&format!("  caseSensitive: {},\n", config.case_sensitive));
    js.push_str("  fallback: false,\n");
    js.push_str("  routes,\n");
    js.push_str("  scrollBehavior: () => ({x: 0, y: 0}),\n");
    js.push_str("});\n\n");

    js.push_str("Vue.config.productionTip = false;\n\n");
    js.push_str("window.app = new Vue({\n");
    js.push_str("  el: '#app',\n");
    js.push_str("  router,\n");
    js.push_str("  render: conf.render || (h => h('router-view')),\n");
    js.push_str("});\n");
    js
}

/// The configuration object exposed to generated backend code: whitelisted
/// keys plus the custom bag, nothing else.
fn backend_config(config: &ResolvedConfig) -> Value {
    let mut conf = Map::new();
    for (key, value) in &config.custom {
        conf.insert(key.clone(), value.clone());
    }
    conf.insert("host".to_string(), Value::from(config.host.clone()));
    conf.insert("port".to_string(), Value::from(config.port));
    if let Some(backend_port) = config.backend_port {
        conf.insert("backendPort".to_string(), Value::from(backend_port));
    }
    Value::Object(conf)
}

/// Renders the backend bootstrap: an HTTP app serving static output, one
/// handler per page path rendering the shared HTML template, the
/// `setPageHandler` customization hook and the optional user backend entry.
fn render_backend(
    config: &ResolvedConfig,
    routes: &[CompiledRoute],
    user_entry: Option<&Path>,
    generation: u64,
) -> String {
    let conf = serde_json::to_string_pretty(&backend_config(config))
        .unwrap_or_else(|_| "{}".to_string());

    let mut js = header(generation);
    js.push_str("import bodyParser from 'body-parser';\n");
    js.push_str("import express from 'express';\n");
    js.push_str("import fs from 'fs';\n");
    js.push_str("import http from 'http';\n");
    js.push_str("import morgan from 'morgan';\n");
    js.push_str("import nunjucks from 'nunjucks';\n");
    js.push_str("import path from 'path';\n\n");

    js.push_str(&format!("let config = {conf};\n"));
    if config.env != Env::Dev {
        // Deployed bundles may override the embedded config via a file
        // placed next to the backend entry.
        js.push_str(
            "const configPath = process.env.BASYS_CONFIG_PATH || path.join(__dirname, 'config.json');\n",
        );
        js.push_str("if (fs.existsSync(configPath)) {\n");
        js.push_str("  Object.assign(config, JSON.parse(fs.readFileSync(configPath, 'utf8')));\n");
        js.push_str("}\n");
    }
    js.push_str("global.BASYS_CONFIG = config;\n\n");

    js.push_str("const pagePaths = [\n");
    for route in routes {
        js.push_str(&format!("  {},\n", js_str(&route.path)));
    }
    js.push_str("];\n\n");

    js.push_str("const app = express();\n");
    js.push_str("app.use(morgan('dev'));\n");
    js.push_str("app.use('/static', express.static(path.join(__dirname, 'static')));\n\n");

    js.push_str("let pageHandler = (render, req, res) => render({});\n");
    js.push_str("global.setPageHandler = func => {\n  pageHandler = func;\n};\n\n");

    js.push_str("const pageTemplate = nunjucks.compile(\n");
    js.push_str("  fs.readFileSync(path.join(__dirname, 'index.html'), 'utf8')\n");
    js.push_str(");\n");
    js.push_str("const pageRoute = (req, res) => {\n");
    js.push_str("  pageHandler(ctx => res.send(pageTemplate.render(ctx)), req, res);\n");
    js.push_str("};\n");
    js.push_str("for (const pagePath of pagePaths) {\n");
    js.push_str("  app.get(pagePath, pageRoute);\n");
    js.push_str("}\n\n");

    if config.env == Env::Dev {
        js.push_str("const port = config.backendPort;\n");
    } else {
        js.push_str("const port = config.port;\n");
    }
    js.push_str("app.set('port', port);\n\n");

    js.push_str("app.use(bodyParser.json());\n");
    js.push_str("app.use(bodyParser.urlencoded({extended: true}));\n\n");

    js.push_str("global.app = app;\n");
    js.push_str("global.server = http.createServer(app);\n\n");

    if let Some(entry) = user_entry {
        js.push_str(&format!("require({});\n\n", js_path(entry)));
    }

    js.push_str("app.use((req, res) => {\n  res.status(404).end();\n});\n\n");

    js.push_str("server.listen({host: config.host, port}, err => {\n");
    js.push_str("  if (err) {\n    console.error(err);\n  }\n");
    js.push_str("});\n\n");
    js.push_str("process.on('SIGINT', () => server.close());\n");
    js
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, Env};
    use crate::manifest::MANIFEST_FILE;
    use crate::routes::compile_routes;
    use crate::scanner::scan;
    use std::path::Path;
    use tempfile::tempdir;

    fn setup(dir: &Path, manifest: &str) -> ResolvedConfig {
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        fs::create_dir_all(dir.join("src")).unwrap();
        resolve(dir, None, Env::Dev).unwrap()
    }

    fn component(dir: &Path, rel: &str, info: &str) {
        let path = dir.join("src").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            format!("<template><div/></template>\n<info>{info}</info>\n"),
        )
        .unwrap();
    }

    fn synthesize_project(config: &ResolvedConfig, generation: u64) -> SynthesisOutput {
        let scanned = scan(config).unwrap();
        let (routes, _) = compile_routes(&scanned.components, config.case_sensitive);
        synthesize(config, &scanned.components, &routes, generation)
    }

    #[test]
    fn test_backend_only_for_web_apps() {
        let dir = tempdir().unwrap();
        let config = setup(dir.path(), "{apps: {main: {type: 'web'}}}");
        assert!(synthesize_project(&config, 1).backend.is_some());

        let dir = tempdir().unwrap();
        let config = setup(dir.path(), "{apps: {main: {type: 'mobile'}}}");
        assert!(synthesize_project(&config, 1).backend.is_none());
    }

    #[test]
    fn test_frontend_registers_components_and_routes() {
        let dir = tempdir().unwrap();
        component(dir.path(), "pages/home.vue", "{path: '/'}");
        component(dir.path(), "widget.vue", "{}");
        let config = setup(dir.path(), "{apps: {main: {type: 'web'}}}");

        let output = synthesize_project(&config, 1);
        let js = &output.frontend.source;

        assert!(js.contains("home.vue"));
        assert!(js.contains("widget.vue"));
        // Only the routed component lands in the router table.
        assert_eq!(js.matches("routes.push(").count(), 1);
        assert!(js.contains("path: \"/\""));
    }

    #[test]
    fn test_backend_config_is_whitelisted() {
        let dir = tempdir().unwrap();
        component(dir.path(), "pages/home.vue", "{path: '/'}");
        let config = setup(
            dir.path(),
            "{apps: {main: {type: 'web', custom: {apiKey: 'secret-k'}}}}",
        );

        let output = synthesize_project(&config, 1);
        let js = &output.backend.unwrap().source;

        assert!(js.contains("\"host\""));
        assert!(js.contains("\"port\""));
        assert!(js.contains("\"backendPort\""));
        assert!(js.contains("\"apiKey\""));
        // Resolved fields outside the whitelist never reach application code.
        assert!(!js.contains("projectDir"));
        assert!(!js.contains("tempDir"));
        assert!(!js.contains("distDir"));
        assert!(!js.contains("browsers"));
    }

    #[test]
    fn test_missing_user_entry_is_a_diagnostic_not_a_crash() {
        let dir = tempdir().unwrap();
        let config = setup(
            dir.path(),
            "{apps: {main: {type: 'web', entry: 'missing.js'}}}",
        );

        let output = synthesize_project(&config, 1);
        assert_eq!(output.errors.len(), 1);
        assert!(output.errors[0].message.contains("missing.js"));
        // The frontend still renders, without the override.
        assert!(output.frontend.source.contains("const conf = {};"));
        // The backend is unaffected.
        assert!(output.backend.is_some());
    }

    #[test]
    fn test_user_entries_are_wired_when_present() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.js"), "export default {};").unwrap();
        fs::write(dir.path().join("src/server.js"), "// backend hooks").unwrap();
        let config = setup(
            dir.path(),
            "{apps: {main: {type: 'web', entry: 'main.js', backendEntry: 'server.js'}}}",
        );

        let output = synthesize_project(&config, 1);
        assert!(output.errors.is_empty());
        assert!(output.frontend.source.contains("main.js"));
        assert!(output.backend.unwrap().source.contains("server.js"));
    }

    #[test]
    fn test_entries_written_wholesale() {
        let dir = tempdir().unwrap();
        component(dir.path(), "pages/home.vue", "{path: '/'}");
        let config = setup(dir.path(), "{apps: {main: {type: 'web'}}}");

        let output = synthesize_project(&config, 7);
        output.write().unwrap();

        let frontend = fs::read_to_string(config.temp_dir.join("frontend-entry.js")).unwrap();
        let backend = fs::read_to_string(config.temp_dir.join("backend-entry.js")).unwrap();
        assert!(frontend.starts_with("// Generated by basys (generation 7)."));
        assert!(backend.starts_with("// Generated by basys (generation 7)."));

        // A later pass fully overwrites.
        let output = synthesize_project(&config, 8);
        output.write().unwrap();
        let frontend = fs::read_to_string(config.temp_dir.join("frontend-entry.js")).unwrap();
        assert!(frontend.starts_with("// Generated by basys (generation 8)."));
    }
}
