//! Vendor detection: fetches `sysObjectID` and reports which vendor family
//! owns the agent, or `Unknown` if none is recognized. Grounded on
//! `nssct.plugins.detect.detect`.

use crate::error::Error;
use crate::oid::Oid;
use crate::report::{Alert, Collector, Severity};
use crate::Engine;

/// `sysObjectID.0`, `.1.3.6.1.2.1.1.2.0`.
pub fn sys_object_id() -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 2, 0])
}

fn allied_telesis() -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 4, 1, 207])
}

fn cisco() -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 4, 1, 9])
}

/// Fetch `sysObjectID` and record which vendor family the agent belongs
/// to. Agents whose `sysObjectID` matches no known vendor prefix are
/// reported `Unknown`, never silently skipped.
pub async fn detect<E: Engine + ?Sized>(
    engine: &E,
    collector: &Collector,
) -> Result<(), Error> {
    let reported = engine.get(sys_object_id()).await?;
    let crate::value::Value::ObjectIdentifier(oid) = reported else {
        collector.add_alert(Alert::new(
            Severity::Unknown,
            "sysObjectID is not an OBJECT IDENTIFIER",
        ));
        return Ok(());
    };

    if oid.starts_with(&cisco()) {
        collector.add_alert(Alert::new(Severity::Ok, "detected a Cisco device"));
    } else if oid.starts_with(&allied_telesis()) {
        collector.add_alert(Alert::new(
            Severity::Ok,
            "Allied Telesis does not report health",
        ));
    } else {
        collector.add_alert(Alert::new(
            Severity::Unknown,
            format!("unknown device identified by {oid}"),
        ));
    }
    Ok(())
}
