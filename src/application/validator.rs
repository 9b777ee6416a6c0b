//! # Resource Validator
//!
//! Pure checks of requested RAM/CPU/disk against the configured ceilings.
//! Fields are checked in the order RAM, CPU, disk. Creation checks positivity of
//! every field before any ceiling; updates check each field completely in turn.

use std::fmt;

use crate::domain::config::LimitsConfig;
use crate::domain::types::{ResourceSpec, ResourceUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Ram,
    Cpu,
    Disk,
}

impl Resource {
    /// Name of the setting holding this resource's ceiling.
    pub fn setting(&self) -> &'static str {
        match self {
            Resource::Ram => "MAX_RAM",
            Resource::Cpu => "MAX_CPU",
            Resource::Disk => "MAX_DISK",
        }
    }

    fn ceiling(&self, limits: &LimitsConfig) -> i64 {
        match self {
            Resource::Ram => limits.max_ram,
            Resource::Cpu => limits.max_cpu,
            Resource::Disk => limits.max_disk,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Ram => "RAM",
            Resource::Cpu => "CPU",
            Resource::Disk => "Disk",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceViolation {
    #[error("{resource} must be a positive integer (got {value})")]
    NotPositive { resource: Resource, value: i64 },
    #[error("{resource} {value} exceeds the allowed maximum ({}={max})", .resource.setting())]
    AboveCeiling {
        resource: Resource,
        value: i64,
        max: i64,
    },
    #[error("No resource changes given; set at least one of memory, cpu or disk")]
    NothingToChange,
}

impl ResourceViolation {
    pub fn resource(&self) -> Option<Resource> {
        match self {
            ResourceViolation::NotPositive { resource, .. }
            | ResourceViolation::AboveCeiling { resource, .. } => Some(*resource),
            ResourceViolation::NothingToChange => None,
        }
    }
}

fn check_positive(resource: Resource, value: i64) -> Result<(), ResourceViolation> {
    if value <= 0 {
        return Err(ResourceViolation::NotPositive { resource, value });
    }
    Ok(())
}

fn check_ceiling(resource: Resource, value: i64, limits: &LimitsConfig) -> Result<(), ResourceViolation> {
    let max = resource.ceiling(limits);
    if value > max {
        return Err(ResourceViolation::AboveCeiling {
            resource,
            value,
            max,
        });
    }
    Ok(())
}

fn check(resource: Resource, value: i64, limits: &LimitsConfig) -> Result<(), ResourceViolation> {
    check_positive(resource, value)?;
    check_ceiling(resource, value, limits)
}

/// Validates a full `ResourceSpec` for server creation: every field must be
/// positive before any ceiling is looked at.
pub fn validate_spec(spec: &ResourceSpec, limits: &LimitsConfig) -> Result<(), ResourceViolation> {
    let fields = [
        (Resource::Ram, spec.ram),
        (Resource::Cpu, spec.cpu),
        (Resource::Disk, spec.disk),
    ];
    for (resource, value) in fields {
        check_positive(resource, value)?;
    }
    for (resource, value) in fields {
        check_ceiling(resource, value, limits)?;
    }
    Ok(())
}

/// Validates only the fields that are set. An update with nothing set is rejected.
pub fn validate_update(update: &ResourceUpdate, limits: &LimitsConfig) -> Result<(), ResourceViolation> {
    if update.is_empty() {
        return Err(ResourceViolation::NothingToChange);
    }
    let fields = [
        (Resource::Ram, update.ram),
        (Resource::Cpu, update.cpu),
        (Resource::Disk, update.disk),
    ];
    for (resource, value) in fields {
        if let Some(value) = value {
            check(resource, value, limits)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> LimitsConfig {
        LimitsConfig {
            max_ram: 4096,
            max_cpu: 200,
            max_disk: 10000,
        }
    }

    fn spec(ram: i64, cpu: i64, disk: i64) -> ResourceSpec {
        ResourceSpec { ram, cpu, disk }
    }

    #[test]
    fn test_valid_spec_including_exact_ceiling() {
        assert_eq!(validate_spec(&spec(1024, 100, 5000), &limits()), Ok(()));
        assert_eq!(validate_spec(&spec(4096, 200, 10000), &limits()), Ok(()));
        assert_eq!(validate_spec(&spec(1, 1, 1), &limits()), Ok(()));
    }

    #[test]
    fn test_non_positive_fields_rejected() {
        for (s, expected) in [
            (spec(0, 100, 100), Resource::Ram),
            (spec(-5, 100, 100), Resource::Ram),
            (spec(100, 0, 100), Resource::Cpu),
            (spec(100, 100, -1), Resource::Disk),
        ] {
            let err = validate_spec(&s, &limits()).unwrap_err();
            assert!(matches!(err, ResourceViolation::NotPositive { .. }));
            assert_eq!(err.resource(), Some(expected));
        }
    }

    #[test]
    fn test_ceiling_violation_names_field_and_max() {
        let err = validate_spec(&spec(4097, 100, 100), &limits()).unwrap_err();
        assert_eq!(
            err,
            ResourceViolation::AboveCeiling {
                resource: Resource::Ram,
                value: 4097,
                max: 4096
            }
        );
        let message = err.to_string();
        assert!(message.contains("RAM"));
        assert!(message.contains("MAX_RAM=4096"));

        let err = validate_spec(&spec(100, 201, 100), &limits()).unwrap_err();
        assert_eq!(err.resource(), Some(Resource::Cpu));
        let err = validate_spec(&spec(100, 100, 10001), &limits()).unwrap_err();
        assert_eq!(err.resource(), Some(Resource::Disk));
    }

    #[test]
    fn test_positivity_checked_before_any_ceiling() {
        // CPU being non-positive is reported before RAM being over the ceiling.
        let err = validate_spec(&spec(999999, 0, 100), &limits()).unwrap_err();
        assert_eq!(
            err,
            ResourceViolation::NotPositive {
                resource: Resource::Cpu,
                value: 0
            }
        );
        let err = validate_spec(&spec(999999, 999, -1), &limits()).unwrap_err();
        assert_eq!(err.resource(), Some(Resource::Disk));
        // Among positivity failures, RAM comes first.
        let err = validate_spec(&spec(0, 999, 0), &limits()).unwrap_err();
        assert!(matches!(
            err,
            ResourceViolation::NotPositive {
                resource: Resource::Ram,
                ..
            }
        ));
        // All positive: the first ceiling violation in RAM, CPU, disk order wins.
        let err = validate_spec(&spec(100, 999, 99999), &limits()).unwrap_err();
        assert_eq!(err.resource(), Some(Resource::Cpu));
    }

    #[test]
    fn test_update_checks_field_by_field() {
        // Updates keep per-field order: RAM over the ceiling wins over CPU at zero.
        let update = ResourceUpdate {
            ram: Some(999999),
            cpu: Some(0),
            disk: None,
        };
        let err = validate_update(&update, &limits()).unwrap_err();
        assert!(matches!(err, ResourceViolation::AboveCeiling { resource: Resource::Ram, .. }));
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = ResourceUpdate {
            ram: None,
            cpu: Some(150),
            disk: None,
        };
        assert_eq!(validate_update(&update, &limits()), Ok(()));

        let update = ResourceUpdate {
            ram: None,
            cpu: None,
            disk: Some(0),
        };
        assert_eq!(
            validate_update(&update, &limits()).unwrap_err().resource(),
            Some(Resource::Disk)
        );
    }

    #[test]
    fn test_empty_update_rejected() {
        assert_eq!(
            validate_update(&ResourceUpdate::default(), &limits()),
            Err(ResourceViolation::NothingToChange)
        );
    }
}
