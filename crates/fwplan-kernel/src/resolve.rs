//! Port resolution.

use fwplan_core::{BuildPlan, HardwareDescriptor, Pattern, PlanError, Result};

use crate::table::PortTable;

/// Resolve the kernel build plan for `descriptor.cpu`.
///
/// Filter rules, in order:
/// 1. include everything
/// 2. exclude the whole portable directory
/// 3. include the selected port directory
/// 4. exclude files that only build with the MPU enabled
/// 5. include or exclude the compatibility layer
///
/// Fails with [`PlanError::UnknownTarget`] when the table has no port for
/// the CPU; no partial plan is returned.
pub fn resolve_port(descriptor: &HardwareDescriptor, table: &PortTable) -> Result<BuildPlan> {
    table.validate()?;

    let entry = table
        .port(&descriptor.cpu)
        .ok_or_else(|| PlanError::UnknownTarget {
            library: table.library.clone(),
            cpu: descriptor.cpu.clone(),
            known: table.cpu_ids(),
        })?;
    log::info!(
        "{}: using port {} for {}",
        table.library,
        entry.port_path,
        entry.cpu
    );

    let portable = table.portable_dir.trim_end_matches('/');
    let port_dir = format!("{portable}/{}", entry.port_path.trim_end_matches('/'));

    let mut plan = BuildPlan::new(&table.library);
    plan.filter
        .include(Pattern::everything())
        .exclude(Pattern::wildcard(&format!("{portable}/")))
        .include(Pattern::path(&port_dir));
    for file in &table.excluded_files {
        plan.filter.exclude(Pattern::path(file));
    }
    plan.add_include_path(table.source_path(&port_dir));

    if let Some(shim) = &table.shim {
        let enabled = descriptor.has_define(&shim.define);
        log::info!(
            "{}: compatibility layer {} {}",
            table.library,
            shim.dir,
            if enabled { "included" } else { "excluded" }
        );
        if enabled {
            plan.filter.include(Pattern::path(&shim.dir));
            plan.add_include_path(table.source_path(&shim.dir));
        } else {
            plan.filter.exclude(Pattern::path(&shim.dir));
        }
    }

    if entry.needs_asm_fixup {
        plan.add_compiler_flag(&table.asm_fixup_flag);
    }
    for pair in &entry.extra_flags {
        plan.add_compiler_flag(&pair.compiler);
        plan.add_linker_flag(&pair.linker);
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwplan_core::{RecordingSink, Verdict};

    fn resolve(cpu: &str) -> Result<BuildPlan> {
        resolve_port(&HardwareDescriptor::new(cpu), &PortTable::freertos())
    }

    #[test]
    fn cortex_m4_without_defines() {
        let plan = resolve("cortex-m4").unwrap();
        assert_eq!(
            plan.filter.render(),
            [
                "+<*>",
                "-<portable/*>",
                "+<portable/ARM_CM4F>",
                "-<mpu_wrappers.c>",
                "-<cmsis_os2>",
            ]
        );
        assert!(plan.filter.selects("portable/ARM_CM4F/port.c"));
        assert!(!plan.filter.selects("mpu_wrappers.c"));
        assert!(!plan.filter.selects("cmsis_os2/cmsis_os2.c"));
        assert!(plan.filter.selects("tasks.c"));
        assert_eq!(plan.include_paths.iter().collect::<Vec<_>>(), ["src/portable/ARM_CM4F"]);
        assert_eq!(plan.compiler_flags, ["-mfpu=fpv4-sp-d16", "-mfloat-abi=softfp"]);
        assert_eq!(plan.linker_flags, ["-mfpu=fpv4-sp-d16", "-mfloat-abi=softfp"]);
        assert!(plan.defines.is_empty());
    }

    #[test]
    fn every_cpu_selects_exactly_one_port() {
        let table = PortTable::freertos();
        for entry in &table.ports {
            let plan = resolve_port(&HardwareDescriptor::new(&entry.cpu), &table).unwrap();
            let port_dirs: Vec<_> = plan
                .include_paths
                .iter()
                .filter(|p| p.starts_with("src/portable/"))
                .collect();
            assert_eq!(port_dirs, [format!("src/portable/{}", entry.port_path)]);

            for other in &table.ports {
                let file = format!("portable/{}/port.c", other.port_path);
                assert_eq!(
                    plan.filter.selects(&file),
                    other.cpu == entry.cpu,
                    "{} selecting {file}",
                    entry.cpu
                );
            }
            assert_eq!(
                plan.filter.evaluate("portable/MemMang/heap_4.c"),
                Some(Verdict::Exclude)
            );
        }
    }

    #[test]
    fn unknown_cpu_fails() {
        let err = resolve("cortex-a53").unwrap_err();
        match err {
            PlanError::UnknownTarget { cpu, known, .. } => {
                assert_eq!(cpu, "cortex-a53");
                assert_eq!(known.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(resolve("").is_err());
    }

    #[test]
    fn shim_define_includes_layer() {
        let table = PortTable::freertos();
        let descriptor =
            HardwareDescriptor::new("cortex-m3").with_define("PIO_FREERTOS_WITH_CMSISOS2");
        let with_shim = resolve_port(&descriptor, &table).unwrap();
        let without = resolve_port(&HardwareDescriptor::new("cortex-m3"), &table).unwrap();

        assert_eq!(with_shim.include_paths.len(), without.include_paths.len() + 1);
        assert!(with_shim.include_paths.contains("src/cmsis_os2"));
        assert_eq!(with_shim.filter.rules().last().unwrap().to_string(), "+<cmsis_os2>");
        assert_eq!(without.filter.rules().last().unwrap().to_string(), "-<cmsis_os2>");
        assert!(with_shim.filter.selects("cmsis_os2/cmsis_os2.c"));

        let again = resolve_port(&descriptor, &table).unwrap();
        assert_eq!(with_shim, again);
    }

    #[test]
    fn cortex_m33_gets_asm_and_fpu_flags() {
        let plan = resolve("cortex-m33").unwrap();
        assert_eq!(
            plan.compiler_flags,
            ["-masm-syntax-unified", "-mfpu=fp-armv8", "-mfloat-abi=softfp"]
        );
        assert_eq!(plan.linker_flags, ["-mfpu=fp-armv8", "-mfloat-abi=softfp"]);
        assert!(plan.filter.selects("portable/ARM_CM33_NTZ/non_secure/port.c"));
        assert!(!plan.filter.selects("portable/ARM_CM33_NTZ/secure/secure_init.c"));
    }

    #[test]
    fn cortex_m23_has_no_fpu_flags() {
        let plan = resolve("cortex-m23").unwrap();
        assert_eq!(plan.compiler_flags, ["-masm-syntax-unified"]);
        assert!(plan.linker_flags.is_empty());
    }

    #[test]
    fn cortex_m3_has_no_flags() {
        let plan = resolve("cortex-m3").unwrap();
        assert!(plan.compiler_flags.is_empty());
        assert!(plan.linker_flags.is_empty());
    }

    #[test]
    fn plan_reaches_library_and_global_scope() {
        let dir = tempfile::tempdir().unwrap();
        let plan = resolve("cortex-m4").unwrap();
        let mut lib = RecordingSink::library();
        let mut global = RecordingSink::global();
        plan.apply(dir.path(), &mut [&mut lib, &mut global]).unwrap();

        let expected = dir.path().join("src").join("portable").join("ARM_CM4F");
        assert_eq!(lib.include_paths, [expected.clone()]);
        assert_eq!(global.include_paths, [expected]);
        assert_eq!(lib.compiler_flags, global.compiler_flags);
        assert_eq!(lib.linker_flags, global.linker_flags);
        assert_eq!(lib.source_filter.len(), 5);
    }

    #[test]
    fn custom_table_with_trailing_slashes() {
        let table = crate::parse::parse_port_table(
            r#"
library = "FreeRTOS"
source-dir = "src/"
portable-dir = "portable/"
excluded-files = ["mpu_wrappers.c"]

[shim]
define = "PIO_FREERTOS_WITH_CMSISOS2"
dir = "cmsis_os2/"

[[port]]
cpu = "cortex-m3"
port-path = "ARM_CM3/"
"#,
        )
        .unwrap();
        let plan = resolve_port(&HardwareDescriptor::new("cortex-m3"), &table).unwrap();
        assert_eq!(
            plan.filter.render(),
            [
                "+<*>",
                "-<portable/*>",
                "+<portable/ARM_CM3>",
                "-<mpu_wrappers.c>",
                "-<cmsis_os2>",
            ]
        );
        assert!(plan.filter.selects("portable/ARM_CM3/port.c"));
        assert!(!plan.filter.selects("cmsis_os2/cmsis_os2.c"));
        assert_eq!(plan.include_paths.iter().collect::<Vec<_>>(), ["src/portable/ARM_CM3"]);

        let with_shim = resolve_port(
            &HardwareDescriptor::new("cortex-m3").with_define("PIO_FREERTOS_WITH_CMSISOS2"),
            &table,
        )
        .unwrap();
        assert!(with_shim.filter.selects("cmsis_os2/cmsis_os2.c"));
        assert!(with_shim.include_paths.contains("src/cmsis_os2"));
    }

    #[test]
    fn invalid_table_is_rejected_before_lookup() {
        let mut table = PortTable::freertos();
        table.ports.push(table.ports[0].clone());
        assert!(matches!(
            resolve_port(&HardwareDescriptor::new("cortex-m4"), &table),
            Err(PlanError::DuplicateEntry { .. })
        ));
    }
}
