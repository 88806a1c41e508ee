//! Integration Test: Headless Core
//!
//! **Policy**: `widget-core` holds all widget behavior and MUST NOT depend on
//! a terminal toolkit or an HTTP server framework. Surfaces (the TUI, the API
//! server) depend on the core, never the other way around.

use std::fs;

use architectural_enforcement::{code_part, rust_sources, workspace_root};

/// Crates that belong to a surface, not to the core
const SURFACE_CRATES: &[&str] = &["ratatui", "crossterm", "axum", "tower-http", "tower_http"];

#[test]
fn test_core_manifest_has_no_surface_dependencies() {
    let manifest = workspace_root().join("widget/core/Cargo.toml");
    let content = fs::read_to_string(&manifest).expect("widget-core manifest should exist");

    let violations: Vec<String> = content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter(|line| declares_any(line, SURFACE_CRATES))
        .map(|line| format!("{}: {}", manifest.display(), line.trim()))
        .collect();

    assert!(
        violations.is_empty(),
        "widget-core must stay headless:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_core_sources_never_import_surfaces() {
    let mut violations = Vec::new();

    for path in rust_sources("widget/core/src") {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in content.lines().enumerate() {
            if imports_any(code_part(line), SURFACE_CRATES) {
                violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "widget-core must stay headless:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_core_does_not_depend_on_its_surfaces() {
    let manifest = workspace_root().join("widget/core/Cargo.toml");
    let content = fs::read_to_string(&manifest).expect("widget-core manifest should exist");

    assert!(!declares_any(&content, &["widget-tui", "portfolio-api"]));
}

/// A manifest line of the form `name = ...` or `name.workspace = ...`
fn declares_any(line: &str, crates: &[&str]) -> bool {
    line.lines().any(|line| {
        let key = line.split('=').next().unwrap_or("").trim();
        let key = key.split('.').next().unwrap_or("");
        crates.contains(&key)
    })
}

/// A `use name::...` or `name::` path in code
fn imports_any(code: &str, crates: &[&str]) -> bool {
    crates.iter().any(|name| {
        let name = name.replace('-', "_");
        code.contains(&format!("use {name}")) || code.contains(&format!(" {name}::"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_detection() {
        assert!(declares_any("ratatui = \"0.29\"", SURFACE_CRATES));
        assert!(declares_any("axum.workspace = true", SURFACE_CRATES));
        assert!(!declares_any("tokio = { version = \"1\" }", SURFACE_CRATES));
    }

    #[test]
    fn test_import_detection() {
        assert!(imports_any("use ratatui::layout::Rect;", SURFACE_CRATES));
        assert!(imports_any("let s = crossterm::terminal::size();", SURFACE_CRATES));
        assert!(!imports_any("use tokio::sync::mpsc;", SURFACE_CRATES));
    }
}
