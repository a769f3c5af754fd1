//! Install parameter validation.
//!
//! Checks a service descriptor section against a parameter schema and
//! produces the ordered install argument list.

use tracing::debug;

use crate::descriptor::ServiceDescriptor;
use crate::error::{ConfigErrorKind, SvcmError, SvcmResult};

/// Recognized parameter names, with the required subset in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSchema {
    recognized: Vec<&'static str>,
    required: Vec<&'static str>,
}

impl ParameterSchema {
    /// Define a schema.
    ///
    /// Required names are always recognized, even when missing from
    /// `recognized`.
    pub fn new(recognized: &[&'static str], required: &[&'static str]) -> Self {
        let mut all = recognized.to_vec();
        for name in required {
            if !all.contains(name) {
                all.push(*name);
            }
        }

        Self {
            recognized: all,
            required: required.to_vec(),
        }
    }

    /// Required names in declared order.
    pub fn required(&self) -> &[&'static str] {
        &self.required
    }

    /// All recognized names.
    pub fn recognized(&self) -> &[&'static str] {
        &self.recognized
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(&name)
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.recognized.contains(&name)
    }
}

/// Extract the install arguments of a service.
///
/// The result holds the required values in schema order, followed by a
/// `name, value` pair for every recognized optional parameter in section
/// order. Parameters unknown to the schema are skipped.
///
/// # Errors
///
/// A missing section or a missing required parameter is a configuration
/// error naming what is missing.
pub fn extract_install_args(
    descriptor: &ServiceDescriptor,
    section: &str,
    schema: &ParameterSchema,
) -> SvcmResult<Vec<String>> {
    let options = descriptor
        .section(section)
        .ok_or_else(|| SvcmError::Config {
            kind: ConfigErrorKind::SectionNotFound {
                section: section.to_string(),
            },
        })?;

    let mut install_args = Vec::with_capacity(options.len() * 2);

    for &name in schema.required() {
        let value = options
            .get(name)
            .ok_or_else(|| SvcmError::missing_parameter(name))?;
        install_args.push(value.to_string());
    }

    for (name, value) in options.options() {
        if schema.is_required(name) {
            continue;
        }
        if !schema.is_recognized(name) {
            debug!(section = section, parameter = name, "Ignoring unknown parameter");
            continue;
        }
        install_args.push(name.to_string());
        install_args.push(value.to_string());
    }

    Ok(install_args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ParameterSchema {
        ParameterSchema::new(
            &["DisplayName", "Application", "Start"],
            &["DisplayName", "Application"],
        )
    }

    #[test]
    fn test_required_then_optional_pairs() {
        let descriptor = ServiceDescriptor::from_pairs(
            "service",
            [
                ("DisplayName", "svc1"),
                ("Application", "C:\\app.exe"),
                ("Start", "SERVICE_AUTO_START"),
            ],
        );

        let args = extract_install_args(&descriptor, "service", &schema()).unwrap();
        assert_eq!(
            args,
            vec!["svc1", "C:\\app.exe", "Start", "SERVICE_AUTO_START"]
        );
    }

    #[test]
    fn test_required_order_follows_schema_not_section() {
        let descriptor = ServiceDescriptor::from_pairs(
            "service",
            [
                ("Start", "SERVICE_DEMAND_START"),
                ("Application", "app.exe"),
                ("DisplayName", "svc1"),
            ],
        );

        let args = extract_install_args(&descriptor, "service", &schema()).unwrap();
        assert_eq!(args, vec!["svc1", "app.exe", "Start", "SERVICE_DEMAND_START"]);
    }

    #[test]
    fn test_optional_pairs_follow_section_order() {
        let schema = ParameterSchema::new(
            &["DisplayName", "Application", "Start", "AppDirectory", "Description"],
            &["DisplayName", "Application"],
        );
        let descriptor = ServiceDescriptor::from_pairs(
            "service",
            [
                ("Description", "d"),
                ("DisplayName", "svc1"),
                ("AppDirectory", "C:\\work"),
                ("Application", "app.exe"),
                ("Start", "SERVICE_AUTO_START"),
            ],
        );

        let args = extract_install_args(&descriptor, "service", &schema).unwrap();
        assert_eq!(
            args,
            vec![
                "svc1",
                "app.exe",
                "Description",
                "d",
                "AppDirectory",
                "C:\\work",
                "Start",
                "SERVICE_AUTO_START"
            ]
        );
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let descriptor = ServiceDescriptor::from_pairs(
            "service",
            [
                ("DisplayName", "svc1"),
                ("Application", "app.exe"),
                ("Priority", "HIGH"),
                ("start", "lowercase is a different name"),
            ],
        );

        let args = extract_install_args(&descriptor, "service", &schema()).unwrap();
        assert_eq!(args, vec!["svc1", "app.exe"]);
    }

    #[test]
    fn test_missing_required_parameter() {
        let descriptor = ServiceDescriptor::from_pairs(
            "service",
            [("DisplayName", "svc1"), ("Start", "SERVICE_AUTO_START")],
        );

        let err = extract_install_args(&descriptor, "service", &schema()).unwrap_err();
        match &err {
            SvcmError::Config {
                kind: ConfigErrorKind::MissingParameter { param },
            } => assert_eq!(param, "Application"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("Application"));
    }

    #[test]
    fn test_missing_section() {
        let descriptor = ServiceDescriptor::from_pairs("program", [("DisplayName", "svc1")]);
        let result = extract_install_args(&descriptor, "service", &schema());
        assert!(matches!(
            result,
            Err(SvcmError::Config {
                kind: ConfigErrorKind::SectionNotFound { .. }
            })
        ));
    }

    #[test]
    fn test_required_names_are_recognized() {
        let schema = ParameterSchema::new(&["Start"], &["DisplayName"]);
        assert!(schema.is_recognized("DisplayName"));
        assert!(schema.is_required("DisplayName"));
        assert!(!schema.is_required("Start"));
    }
}
