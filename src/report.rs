//! Alert/severity reporting sink. Grounded on `nssct.report`, trimmed to
//! the data model the core actually touches: the Nagios-format text
//! renderer and perfdata metrics are an out-of-scope external collaborator.

use std::cell::RefCell;
use std::rc::Rc;

/// Nagios-style severity, ordered worst-to-best for reporting purposes as
/// `Critical > Warning > Ok`, with `Unknown` reported only when nothing more
/// specific was ever recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Everything checked out.
    Ok,
    /// Worth a human's attention, not yet an incident.
    Warning,
    /// An incident.
    Critical,
    /// The probe could not determine a more specific state.
    Unknown,
}

/// One finding a plugin reports.
#[derive(Debug, Clone)]
pub struct Alert {
    /// How bad this finding is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl Alert {
    /// Construct an alert.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Alert {
            severity,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        };
        write!(f, "{label} - {}", self.message)
    }
}

#[derive(Debug, Default)]
struct CollectorInner {
    alerts: Vec<Alert>,
}

/// A write-only sink (from a plugin's point of view) collecting alerts,
/// shareable across fanned-out plugins.
#[derive(Debug, Clone, Default)]
pub struct Collector(Rc<RefCell<CollectorInner>>);

impl Collector {
    /// A fresh, empty collector.
    pub fn new() -> Self {
        Collector::default()
    }

    /// Record a finding.
    pub fn add_alert(&self, alert: Alert) {
        self.0.borrow_mut().alerts.push(alert);
    }

    /// All alerts recorded so far, in recording order.
    pub fn alerts(&self) -> Vec<Alert> {
        self.0.borrow().alerts.clone()
    }

    /// Alerts of exactly the given severity, in recording order.
    pub fn alerts_of(&self, severity: Severity) -> Vec<Alert> {
        self.0
            .borrow()
            .alerts
            .iter()
            .filter(|a| a.severity == severity)
            .cloned()
            .collect()
    }

    /// The overall probe state: the worst severity among
    /// `Critical, Warning, Ok` that has at least one alert, or `Unknown` if
    /// nothing was ever recorded (or only `Unknown` alerts were).
    pub fn state(&self) -> Severity {
        for severity in [Severity::Critical, Severity::Warning, Severity::Ok] {
            if !self.alerts_of(severity).is_empty() {
                return severity;
            }
        }
        Severity::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collector_is_unknown() {
        let c = Collector::new();
        assert_eq!(c.state(), Severity::Unknown);
    }

    #[test]
    fn worst_severity_wins() {
        let c = Collector::new();
        c.add_alert(Alert::new(Severity::Warning, "w"));
        c.add_alert(Alert::new(Severity::Critical, "c"));
        c.add_alert(Alert::new(Severity::Ok, "o"));
        assert_eq!(c.state(), Severity::Critical);
    }

    #[test]
    fn unknown_alert_does_not_outrank_ok() {
        let c = Collector::new();
        c.add_alert(Alert::new(Severity::Unknown, "u"));
        c.add_alert(Alert::new(Severity::Ok, "o"));
        assert_eq!(c.state(), Severity::Ok);
    }

    #[test]
    fn display_format() {
        let a = Alert::new(Severity::Critical, "disk on fire");
        assert_eq!(a.to_string(), "CRITICAL - disk on fire");
    }
}
