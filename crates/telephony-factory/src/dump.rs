//! Free-form text dump for operators. Not a machine contract.

use std::fmt::{self, Write};

use crate::config::FactoryConfig;
use crate::diag::DiagnosticLogRegistry;
use crate::driver::DriverHandle;
use crate::registry::SlotRegistry;
use crate::switcher::RegionalConfig;

const SEPARATOR: &str = "++++++++++++++++++++++++++++++++";

pub struct DumpInput<'a> {
    pub config: &'a FactoryConfig,
    pub registry: &'a SlotRegistry,
    pub paired: &'a [DriverHandle],
    pub regional: Option<RegionalConfig>,
    pub logs: &'a DiagnosticLogRegistry,
}

pub fn render(input: &DumpInput<'_>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_dump(&mut out, input);
    out
}

pub fn write_dump(out: &mut dyn Write, input: &DumpInput<'_>) -> fmt::Result {
    let config = input.config;
    writeln!(out, "TelephonyFactory:")?;
    writeln!(out, " driver={}", config.driver)?;
    writeln!(out, " variant={:?}", config.variant)?;
    writeln!(out, " slot_count={}", config.slot_count)?;
    writeln!(out, " capability_slot={}", config.capability_slot)?;
    writeln!(out, " base_preference={}", config.base_preference())?;

    match input.registry.all() {
        Ok(handles) => {
            let default_slot = input.registry.default_slot().unwrap_or(0);
            writeln!(out, " state=ready default_slot={default_slot}")?;
            match input.regional {
                Some(cfg) => writeln!(out, " regional: {cfg}")?,
                None => writeln!(out, " regional: none")?,
            }
            for (slot, handle) in handles.iter().enumerate() {
                write_handle(out, &format!("slot {slot}"), handle)?;
            }
            for handle in input.paired {
                write_handle(out, &format!("paired path {}", handle.instance()), handle)?;
            }
        }
        Err(e) => writeln!(out, " state=uninitialized ({e})")?,
    }

    writeln!(out, "{SEPARATOR}")?;
    writeln!(out, "LocalLogs:")?;
    for category in input.logs.dump_all() {
        writeln!(out, " {} ({}/{}):", category.name, category.lines.len(), category.capacity)?;
        for line in &category.lines {
            writeln!(out, "  {line}")?;
        }
    }
    Ok(())
}

fn write_handle(out: &mut dyn Write, label: &str, handle: &DriverHandle) -> fmt::Result {
    writeln!(out, "{SEPARATOR}")?;
    writeln!(out, "{label} phone_type={}:", handle.phone_type())?;
    let mut body = String::new();
    handle.driver().dump(&mut body)?;
    for line in body.lines() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}
