//! Common test utilities: binary locator and a seeded fixture project.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_bindery")
}

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Minimal project: one site, a default-group entity and a tagged one,
/// the loader runtime files and a loader config.
pub fn seed_project(root: &Path) {
    write(
        root,
        "loader.js",
        r#"System.config({ "paths": { "app/*": "src/app/*" } });"#,
    );
    write(root, "packages/system-polyfills.js", "// polyfills\n");
    write(root, "packages/system.src.js", "// loader runtime\n");

    write(root, "sources/base/global/js/bootstrap.js", "bootstrap();\n");
    write(root, "sources/base/global/js/common.js", "common();\n");
    write(root, "sources/base/modules/teaser/js/teaser.js", "teaser();\n");
    write(root, "sources/base/modules/teaser/groups.toml", "js = \"core\"\n");
}
