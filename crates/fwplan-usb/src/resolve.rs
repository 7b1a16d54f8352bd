//! Feature resolution.
//!
//! Collects class directories for every enabled device and host flag,
//! adds the core directories of the active roles, and builds a filter
//! that starts from nothing, includes the driver tree and the collected
//! sources, and then excludes conflicting files. Exclusions come last so
//! they win over the broader includes.

use fwplan_core::{BuildPlan, HardwareDescriptor, Pattern, Result, Warning};

use crate::table::{FeatureTable, Role};

/// Resolve the USB stack build plan for the defines in `descriptor`.
///
/// A descriptor without any USB flag is valid: the plan then compiles
/// only the driver tree.
pub fn resolve_features(descriptor: &HardwareDescriptor, table: &FeatureTable) -> Result<BuildPlan> {
    table.validate()?;

    let mut plan = BuildPlan::new(&table.library);
    let mut source_dirs: Vec<String> = Vec::new();
    let mut excludes: Vec<String> = Vec::new();
    let mut include_device_core = false;
    let mut include_host_core = false;

    if !table.flag_prefix.is_empty() {
        for define in &descriptor.defines {
            if define.starts_with(&table.flag_prefix) && table.feature(define).is_none() {
                plan.warn(Warning::UnknownFeatureFlag {
                    flag: define.clone(),
                });
            }
        }
    }

    for role in [Role::Device, Role::Host] {
        for entry in table
            .features_for(role)
            .filter(|e| descriptor.has_define(&e.flag))
        {
            match role {
                Role::Device => include_device_core = true,
                Role::Host => include_host_core = true,
            }
            log::info!(
                "{}: option {} found, adding {role} class \"{}\"",
                table.library,
                entry.flag,
                entry.class
            );
            plan.add_include_path(entry.include_dir());
            push_unique(&mut source_dirs, entry.source_dir());
            for file in &entry.special_excludes {
                push_unique(&mut excludes, file.clone());
            }
        }
    }

    for (role, active) in [
        (Role::Device, include_device_core),
        (Role::Host, include_host_core),
    ] {
        if active {
            plan.add_include_path(table.core_include_dir(role));
            push_unique(&mut source_dirs, table.core_source_dir(role));
        }
    }

    // The unused role's driver files include its configuration header,
    // which the application does not provide.
    let unused_role = match (include_device_core, include_host_core) {
        (true, false) => Some(Role::Host),
        (false, true) => Some(Role::Device),
        _ => None,
    };
    if let Some(role) = unused_role {
        log::info!("{}: excluding {role} driver files", table.library);
        for file in table.driver_files(role) {
            push_unique(&mut excludes, file.clone());
        }
    }

    plan.filter
        .exclude(Pattern::everything())
        .include(Pattern::wildcard(&table.driver_source_dir));
    for dir in &source_dirs {
        plan.filter.include(Pattern::wildcard(dir));
    }
    for file in &excludes {
        plan.filter.exclude(Pattern::path(file));
    }

    plan.add_define(table.full_speed_define.clone());

    Ok(plan)
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}
