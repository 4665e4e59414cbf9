//! Embeds the source revision in `gastos --version`.
//!
//! Release tarballs have no `.git`; packagers set `GASTOS_BUILD_SHA` instead.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const REVISION_ENV: &str = "GASTOS_BUILD_SHA";

fn git_revision(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8(out.stdout).ok()?.trim().to_owned();
    (!rev.is_empty()).then_some(rev)
}

fn main() {
    let workspace = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .and_then(|dir| dir.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(".."));

    let revision = env::var(REVISION_ENV)
        .ok()
        .filter(|r| !r.is_empty())
        .or_else(|| git_revision(&workspace))
        .unwrap_or_else(|| "unknown".to_owned());

    println!("cargo:rustc-env={REVISION_ENV}={revision}");
    println!("cargo:rerun-if-env-changed={REVISION_ENV}");
    println!("cargo:rerun-if-changed={}", workspace.join(".git/HEAD").display());
    println!("cargo:rerun-if-changed={}", workspace.join(".git/index").display());
}
