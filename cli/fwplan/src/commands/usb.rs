//! `fwplan usb` — resolve the USB stack classes for a set of defines.

use std::path::{Path, PathBuf};

use anyhow::Result;
use fwplan_core::HardwareDescriptor;
use fwplan_usb::parse::load_feature_table;
use fwplan_usb::{resolve_features, FeatureTable};

use crate::commands::kernel::library_root;
use crate::commands::report::{self, Resolved};
use crate::commands::{descriptor, LibraryArgs};
use crate::manifest::{self, FwplanManifest};

/// Resolve the USB plan from the manifest and command-line overrides.
pub fn resolve(
    project_dir: &Path,
    manifest: Option<&FwplanManifest>,
    args: &LibraryArgs,
) -> Result<Resolved> {
    let descriptor = descriptor(manifest, args);
    let config = manifest.and_then(|m| m.usb.as_ref());
    let table = match &args.table {
        Some(path) => load_feature_table(path)?,
        None => manifest::feature_table(project_dir, config)?,
    };
    let root = library_root(project_dir, args.root.as_deref(), config.map(|c| c.root.as_path()));
    resolved(&descriptor, &table, root)
}

pub(crate) fn resolved(
    descriptor: &HardwareDescriptor,
    table: &FeatureTable,
    root: PathBuf,
) -> Result<Resolved> {
    let plan = resolve_features(descriptor, table)?;
    Ok(Resolved {
        plan,
        root,
        source_dir: PathBuf::new(),
    })
}

/// Resolve and print the USB plan.
pub fn run(project_dir: &Path, manifest: Option<&FwplanManifest>, args: &LibraryArgs) -> Result<()> {
    let resolved = resolve(project_dir, manifest, args)?;
    let report = report::assemble(vec![resolved])?;
    report::print(&report, args.format, args.list_sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::args;

    #[test]
    fn resolves_device_class() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args();
        a.defines = vec!["PIO_USBFS_DEVICE_CDC".into()];
        let r = resolve(dir.path(), None, &a).unwrap();
        assert!(r.plan.include_paths.contains("device/class/cdc/Include"));
        assert!(r.plan.defines.contains("USE_USB_FS"));
        assert_eq!(r.root, dir.path());
    }

    #[test]
    fn custom_table_from_argument() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usb.toml");
        std::fs::write(
            &path,
            r#"
library = "custom"
driver-source-dir = "drv"
full-speed-define = "FS"

[[feature]]
flag = "CDC"
role = "device"
class = "cdc"
"#,
        )
        .unwrap();
        let mut a = args();
        a.table = Some(path);
        a.defines = vec!["CDC".into()];
        let r = resolve(dir.path(), None, &a).unwrap();
        assert_eq!(r.plan.library, "custom");
        assert_eq!(
            r.plan.filter.render(),
            ["-<*>", "+<drv*>", "+<device/class/cdc/Source*>", "+<device/core/Source*>"]
        );
    }

    #[test]
    fn json_report_serializes() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args();
        a.defines = vec!["PIO_USBFS_HOST_HID".into()];
        let r = resolve(dir.path(), None, &a).unwrap();
        let report = report::assemble(vec![r]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let filter = &json["libraries"][0]["environment"]["source-filter"];
        assert_eq!(filter[0], "-<*>");
        assert_eq!(json["global"]["defines"][0], "USE_USB_FS");
        assert!(json["global"].get("source-filter").is_none());
    }
}
