//! Feature flag mapping table.

use std::collections::HashMap;
use std::fmt;

use fwplan_core::{PlanError, Result};
use serde::{Deserialize, Serialize};

/// Which side of the USB link a class implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Device,
    Host,
}

impl Role {
    /// Top-level directory of the role in the stack's source tree.
    pub fn dir(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Host => "host",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir())
    }
}

/// One feature flag and the class it enables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeatureEntry {
    /// The define that enables the class (e.g., "PIO_USBFS_DEVICE_CDC").
    pub flag: String,
    pub role: Role,
    /// Class directory name (e.g., "cdc").
    pub class: String,
    /// Files of a sibling variant sharing the class directory.
    #[serde(default)]
    pub special_excludes: Vec<String>,
}

impl FeatureEntry {
    pub fn include_dir(&self) -> String {
        format!("{}/class/{}/Include", self.role.dir(), self.class)
    }

    pub fn source_dir(&self) -> String {
        format!("{}/class/{}/Source", self.role.dir(), self.class)
    }
}

/// Static mapping from feature flags to USB classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeatureTable {
    /// Library name used in messages.
    pub library: String,
    /// Namespace of the table's flags. Unknown defines inside it are reported.
    #[serde(default)]
    pub flag_prefix: String,
    /// Low-level driver sources, compiled for either role.
    pub driver_source_dir: String,
    /// Define the stack needs to run in full-speed mode.
    pub full_speed_define: String,
    /// Driver files that only compile with device configuration headers.
    #[serde(default)]
    pub device_driver_files: Vec<String>,
    /// Driver files that only compile with host configuration headers.
    #[serde(default)]
    pub host_driver_files: Vec<String>,
    #[serde(rename = "feature")]
    pub features: Vec<FeatureEntry>,
}

impl FeatureTable {
    /// Look up the entry for `flag`.
    pub fn feature(&self, flag: &str) -> Option<&FeatureEntry> {
        self.features.iter().find(|f| f.flag == flag)
    }

    /// Entries of `role`, in table order.
    pub fn features_for(&self, role: Role) -> impl Iterator<Item = &FeatureEntry> {
        self.features.iter().filter(move |f| f.role == role)
    }

    pub fn core_include_dir(&self, role: Role) -> String {
        format!("{}/core/Include", role.dir())
    }

    pub fn core_source_dir(&self, role: Role) -> String {
        format!("{}/core/Source", role.dir())
    }

    /// Driver files that reference configuration headers of `role`.
    pub fn driver_files(&self, role: Role) -> &[String] {
        match role {
            Role::Device => &self.device_driver_files,
            Role::Host => &self.host_driver_files,
        }
    }

    /// Check that every flag has exactly one entry and one role.
    pub fn validate(&self) -> Result<()> {
        if self.driver_source_dir.is_empty() {
            return Err(PlanError::Validation {
                detail: format!("{}: driver-source-dir is empty", self.library),
            });
        }
        if self.full_speed_define.is_empty() {
            return Err(PlanError::Validation {
                detail: format!("{}: full-speed-define is empty", self.library),
            });
        }
        let mut roles: HashMap<&str, Role> = HashMap::new();
        for entry in &self.features {
            if entry.class.is_empty() {
                return Err(PlanError::Validation {
                    detail: format!("feature flag '{}' has an empty class", entry.flag),
                });
            }
            match roles.insert(entry.flag.as_str(), entry.role) {
                Some(previous) if previous != entry.role => {
                    return Err(PlanError::ConflictingRoles {
                        flag: entry.flag.clone(),
                    });
                }
                Some(_) => {
                    return Err(PlanError::DuplicateEntry {
                        kind: "feature flag",
                        key: entry.flag.clone(),
                    });
                }
                None => {}
            }
        }
        Ok(())
    }

    /// The GD32 USBFS library.
    pub fn gd32_usbfs() -> Self {
        let entry = |flag: &str, role: Role, class: &str, excludes: &[&str]| FeatureEntry {
            flag: flag.into(),
            role,
            class: class.into(),
            special_excludes: excludes.iter().map(|e| e.to_string()).collect(),
        };
        Self {
            library: "GD32 USBFS".into(),
            flag_prefix: "PIO_USBFS_".into(),
            driver_source_dir: "driver/Source".into(),
            full_speed_define: "USE_USB_FS".into(),
            device_driver_files: vec![
                "driver/Source/drv_usb_dev.c".into(),
                "driver/Source/drv_usbd_int.c".into(),
            ],
            host_driver_files: vec![
                "driver/Source/drv_usb_host.c".into(),
                "driver/Source/drv_usbh_int.c".into(),
            ],
            features: vec![
                entry("PIO_USBFS_DEVICE_AUDIO", Role::Device, "audio", &[]),
                entry("PIO_USBFS_DEVICE_CDC", Role::Device, "cdc", &[]),
                entry("PIO_USBFS_DEVICE_DFU", Role::Device, "dfu", &[]),
                entry(
                    "PIO_USBFS_DEVICE_HID_STANDARD",
                    Role::Device,
                    "hid",
                    &["device/class/hid/Source/custom_hid_core.c"],
                ),
                entry(
                    "PIO_USBFS_DEVICE_HID_CUSTOM",
                    Role::Device,
                    "hid",
                    &["device/class/hid/Source/standard_hid_core.c"],
                ),
                entry("PIO_USBFS_DEVICE_IAP", Role::Device, "iap", &[]),
                entry("PIO_USBFS_DEVICE_MSC", Role::Device, "msc", &[]),
                entry("PIO_USBFS_DEVICE_PRINTER", Role::Device, "printer", &[]),
                entry("PIO_USBFS_HOST_HID", Role::Host, "hid", &[]),
                entry("PIO_USBFS_HOST_MSC", Role::Host, "msc", &[]),
            ],
        }
    }
}
