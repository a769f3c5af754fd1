//! Configuration settings for the service agent.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SvcmError;
use crate::package::PackageFiles;
use crate::services::ManagerOptions;
use crate::templates::TemplateContext;

/// Main configuration structure for the agent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub manager: ManagerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Service manager configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerConfig {
    /// Backend name.
    #[serde(default = "default_manager_kind")]
    pub kind: String,
    /// Explicit path of the control executable.
    pub exec_path: Option<PathBuf>,
    /// Executable search path, overriding the process `PATH`.
    pub search_path: Option<String>,
    /// Lifecycle command timeout in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_seconds: u64,
    /// Executable identity check timeout in seconds.
    #[serde(default = "default_identity_timeout")]
    pub identity_timeout_seconds: u64,
}

/// Paths configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Local package repository.
    #[serde(default = "default_repository_root")]
    pub repository_root: PathBuf,
    /// Package info file, relative to the package directory.
    #[serde(default = "default_pkg_info_file")]
    pub pkg_info_file: PathBuf,
    /// Package INI file, relative to the package directory.
    #[serde(default = "default_pkg_ini_file")]
    pub pkg_ini_file: PathBuf,
    /// Service descriptor file, relative to the package directory.
    #[serde(default = "default_service_descriptor_file")]
    pub service_descriptor_file: PathBuf,
}

/// Cluster addresses available to install argument templates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterConfig {
    pub master_ip: Option<String>,
    pub local_ip: Option<String>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_manager_kind() -> String {
    "nssm".to_string()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_identity_timeout() -> u64 {
    5
}

fn default_repository_root() -> PathBuf {
    PathBuf::from("C:\\d2iq\\dcos\\packages")
}

fn default_pkg_info_file() -> PathBuf {
    PackageFiles::default().pkg_info
}

fn default_pkg_ini_file() -> PathBuf {
    PackageFiles::default().pkg_ini
}

fn default_service_descriptor_file() -> PathBuf {
    PackageFiles::default().service_descriptor
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            kind: default_manager_kind(),
            exec_path: None,
            search_path: None,
            command_timeout_seconds: default_command_timeout(),
            identity_timeout_seconds: default_identity_timeout(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            repository_root: default_repository_root(),
            pkg_info_file: default_pkg_info_file(),
            pkg_ini_file: default_pkg_ini_file(),
            service_descriptor_file: default_service_descriptor_file(),
        }
    }
}

impl ClusterConfig {
    /// Template variables, with unset addresses falling back to loopback.
    pub fn template_context(&self) -> TemplateContext {
        TemplateContext::new(self.master_ip.as_deref(), self.local_ip.as_deref())
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SvcmError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SvcmError::Settings {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        Self::parse(&content).map_err(|e| match e {
            SvcmError::Settings { message } => SvcmError::Settings {
                message: format!("'{}': {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Parse and validate settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, SvcmError> {
        let settings: Settings = toml::from_str(content).map_err(|e| SvcmError::Settings {
            message: format!("Failed to parse config: {}", e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), SvcmError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(SvcmError::Settings {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(SvcmError::Settings {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        if self.manager.command_timeout_seconds == 0 || self.manager.identity_timeout_seconds == 0
        {
            return Err(SvcmError::Settings {
                message: "Manager timeouts must be at least one second".to_string(),
            });
        }

        Ok(())
    }

    /// Package file locations.
    pub fn package_files(&self) -> PackageFiles {
        PackageFiles {
            pkg_info: self.paths.pkg_info_file.clone(),
            pkg_ini: self.paths.pkg_ini_file.clone(),
            service_descriptor: self.paths.service_descriptor_file.clone(),
        }
    }

    /// Apply the manager and cluster settings to manager options.
    pub fn apply(&self, mut options: ManagerOptions) -> ManagerOptions {
        options.template = self.cluster.template_context();
        options.exec_path = self.manager.exec_path.clone();
        options.search_path = self.manager.search_path.as_ref().map(OsString::from);
        options.command_timeout = Duration::from_secs(self.manager.command_timeout_seconds);
        options.identity_timeout = Duration::from_secs(self.manager.identity_timeout_seconds);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ServiceDescriptor;

    #[test]
    fn test_default_values() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, "pretty");
        assert_eq!(settings.manager.kind, "nssm");
        assert_eq!(settings.manager.command_timeout_seconds, 30);
        assert_eq!(settings.manager.identity_timeout_seconds, 5);
        assert_eq!(
            settings.paths.service_descriptor_file,
            PathBuf::from("etc").join("package.nssm")
        );
        assert_eq!(settings.cluster.template_context(), TemplateContext::default());
    }

    #[test]
    fn test_parse_full_config() {
        let settings = Settings::parse(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [manager]
            exec_path = 'C:\d2iq\dcos\bin\nssm.exe'
            command_timeout_seconds = 60

            [paths]
            repository_root = 'D:\packages'

            [cluster]
            master_ip = "10.0.0.1"
            "#,
        )
        .unwrap();

        assert_eq!(settings.logging.format, "json");
        assert_eq!(
            settings.manager.exec_path,
            Some(PathBuf::from("C:\\d2iq\\dcos\\bin\\nssm.exe"))
        );
        assert_eq!(settings.paths.repository_root, PathBuf::from("D:\\packages"));

        let options = settings.apply(ManagerOptions::new(ServiceDescriptor::new()));
        assert_eq!(options.command_timeout, Duration::from_secs(60));
        assert_eq!(options.identity_timeout, Duration::from_secs(5));
        assert_eq!(options.template.master_ip, "10.0.0.1");
        assert_eq!(options.template.local_ip, "127.0.0.1");
    }

    #[test]
    fn test_invalid_log_level() {
        let result = Settings::parse("[logging]\nlevel = \"verbose\"\n");
        assert!(matches!(result, Err(SvcmError::Settings { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Settings::parse("[manager]\ncommand_timeout_seconds = 0\n");
        assert!(matches!(result, Err(SvcmError::Settings { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(dir.path().join("agent.toml"));
        assert!(matches!(result, Err(SvcmError::Settings { .. })));
    }
}
