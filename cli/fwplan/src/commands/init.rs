//! `fwplan init` — write a starter fwplan.toml.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::manifest::{FwplanManifest, MANIFEST_NAME};

/// Create `fwplan.toml` in `project_dir`.
pub fn run(project_dir: &Path, cpu: &str, force: bool) -> Result<()> {
    let path = project_dir.join(MANIFEST_NAME);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    fs::write(&path, FwplanManifest::template(cpu)?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_manifest() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), "cortex-m23", false).unwrap();
        let (manifest, _) = FwplanManifest::find_and_load(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.board.cpu, "cortex-m23");
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), "cortex-m4", false).unwrap();
        assert!(run(dir.path(), "cortex-m3", false).is_err());
        run(dir.path(), "cortex-m3", true).unwrap();
        let (manifest, _) = FwplanManifest::find_and_load(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.board.cpu, "cortex-m3");
    }
}
