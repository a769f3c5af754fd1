//! NSSM parameter set.

use std::fmt;

use crate::validation::ParameterSchema;

/// Descriptor section holding the service parameters.
pub const SERVICE_SECTION: &str = "service";

/// Parameters NSSM accepts in a service descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NssmParameter {
    Description,
    DisplayName,
    Name,
    Application,
    AppDirectory,
    AppParameters,
    Start,
    DependOnService,
    AppStdout,
    AppStderr,
    AppEnvironmentExtra,
}

impl NssmParameter {
    /// All parameters in declaration order.
    pub const ALL: [NssmParameter; 11] = [
        NssmParameter::Description,
        NssmParameter::DisplayName,
        NssmParameter::Name,
        NssmParameter::Application,
        NssmParameter::AppDirectory,
        NssmParameter::AppParameters,
        NssmParameter::Start,
        NssmParameter::DependOnService,
        NssmParameter::AppStdout,
        NssmParameter::AppStderr,
        NssmParameter::AppEnvironmentExtra,
    ];

    /// Required parameters. The order is the order of the positional
    /// `install` arguments and must not change.
    pub const REQUIRED: [NssmParameter; 2] = [NssmParameter::DisplayName, NssmParameter::Application];

    /// Parameter name as written in descriptors and on the NSSM command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            NssmParameter::Description => "Description",
            NssmParameter::DisplayName => "DisplayName",
            NssmParameter::Name => "Name",
            NssmParameter::Application => "Application",
            NssmParameter::AppDirectory => "AppDirectory",
            NssmParameter::AppParameters => "AppParameters",
            NssmParameter::Start => "Start",
            NssmParameter::DependOnService => "DependOnService",
            NssmParameter::AppStdout => "AppStdout",
            NssmParameter::AppStderr => "AppStderr",
            NssmParameter::AppEnvironmentExtra => "AppEnvironmentExtra",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    /// Schema used to validate NSSM service descriptors.
    pub fn schema() -> ParameterSchema {
        let recognized: Vec<&'static str> = Self::ALL.iter().map(|p| p.as_str()).collect();
        let required: Vec<&'static str> = Self::REQUIRED.iter().map(|p| p.as_str()).collect();
        ParameterSchema::new(&recognized, &required)
    }
}

impl fmt::Display for NssmParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of the NSSM `Start` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    Auto,
    DelayedAuto,
    Demand,
    Disabled,
}

impl StartMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartMode::Auto => "SERVICE_AUTO_START",
            StartMode::DelayedAuto => "SERVICE_DELAYED_AUTO_START",
            StartMode::Demand => "SERVICE_DEMAND_START",
            StartMode::Disabled => "SERVICE_DISABLED",
        }
    }
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_parameters_in_order() {
        let schema = NssmParameter::schema();
        assert_eq!(schema.required(), &["DisplayName", "Application"]);
        assert_eq!(schema.recognized().len(), NssmParameter::ALL.len());
    }

    #[test]
    fn test_optional_parameters_recognized() {
        let schema = NssmParameter::schema();
        for name in ["Start", "AppParameters", "DependOnService", "AppEnvironmentExtra"] {
            assert!(schema.is_recognized(name));
            assert!(!schema.is_required(name));
        }
        assert!(!schema.is_recognized("start"));
        assert!(!schema.is_recognized("ObjectName"));
    }

    #[test]
    fn test_start_modes() {
        assert_eq!(StartMode::Auto.as_str(), "SERVICE_AUTO_START");
        assert_eq!(StartMode::Demand.to_string(), "SERVICE_DEMAND_START");
        assert!(NssmParameter::Application.is_required());
        assert!(!NssmParameter::Start.is_required());
    }
}
