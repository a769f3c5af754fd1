//! Package metadata reader.
//!
//! Loads one package from the local package repository: its `pkginfo.json`,
//! optional `package.ini`, and optional service descriptor.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::descriptor::ServiceDescriptor;
use crate::error::{ConfigErrorKind, SvcmError, SvcmResult};
use crate::services::ManagerOptions;
use crate::validation::validate_package_id;

/// Locations of package files, relative to the package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFiles {
    pub pkg_info: PathBuf,
    pub pkg_ini: PathBuf,
    pub service_descriptor: PathBuf,
}

impl Default for PackageFiles {
    fn default() -> Self {
        Self {
            pkg_info: PathBuf::from("pkginfo.json"),
            pkg_ini: PathBuf::from("package.ini"),
            service_descriptor: PathBuf::from("etc").join("package.nssm"),
        }
    }
}

/// A package loaded from the repository.
#[derive(Debug, Clone)]
pub struct Package {
    id: String,
    name: String,
    version: String,
    dir: PathBuf,
    info: serde_json::Value,
    ini: Option<ServiceDescriptor>,
    service: Option<ServiceDescriptor>,
    service_path: PathBuf,
}

impl Package {
    /// Load a package from `<repository_root>/<pkg_id>`.
    pub fn load(repository_root: &Path, pkg_id: &str, files: &PackageFiles) -> SvcmResult<Self> {
        let (name, version) = validate_package_id(pkg_id)?;

        let dir = repository_root.join(pkg_id);
        if !dir.is_dir() {
            return Err(SvcmError::Config {
                kind: ConfigErrorKind::PackageNotFound { path: dir },
            });
        }

        let info = read_pkg_info(&dir.join(&files.pkg_info))?;

        let ini_path = dir.join(&files.pkg_ini);
        let ini = if ini_path.is_file() {
            Some(ServiceDescriptor::load(&ini_path)?)
        } else {
            None
        };

        let service_path = dir.join(&files.service_descriptor);
        let service = if service_path.is_file() {
            Some(ServiceDescriptor::load(&service_path)?)
        } else {
            debug!(path = %service_path.display(), "Package declares no service");
            None
        };

        info!(
            pkg_id = pkg_id,
            has_ini = ini.is_some(),
            has_service = service.is_some(),
            "Package loaded"
        );

        Ok(Self {
            id: pkg_id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            dir,
            info,
            ini,
            service,
            service_path,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Package directory in the repository.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parsed `pkginfo.json`.
    pub fn info(&self) -> &serde_json::Value {
        &self.info
    }

    /// Parsed `package.ini`, when the package has one.
    pub fn ini(&self) -> Option<&ServiceDescriptor> {
        self.ini.as_ref()
    }

    /// Whether the package runs as a Windows service.
    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    /// The service descriptor; an error when the package declares none.
    pub fn service_descriptor(&self) -> SvcmResult<&ServiceDescriptor> {
        self.service.as_ref().ok_or_else(|| SvcmError::Config {
            kind: ConfigErrorKind::DescriptorNotFound {
                path: self.service_path.clone(),
            },
        })
    }

    /// Manager options for this package's service.
    pub fn manager_options(&self) -> SvcmResult<ManagerOptions> {
        Ok(ManagerOptions::new(self.service_descriptor()?.clone()).pkg_id(self.id.as_str()))
    }
}

fn read_pkg_info(path: &Path) -> SvcmResult<serde_json::Value> {
    let pkg_info_error = |message: String| SvcmError::Config {
        kind: ConfigErrorKind::PackageInfo {
            path: path.to_path_buf(),
            message,
        },
    };

    let content = std::fs::read_to_string(path).map_err(|e| pkg_info_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| pkg_info_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PKG_ID: &str = "mesos--1.9.0";

    fn create_package(root: &Path, with_service: bool) -> PathBuf {
        let dir = root.join(PKG_ID);
        fs::create_dir_all(dir.join("etc")).unwrap();
        fs::write(
            dir.join("pkginfo.json"),
            r#"{"requires": ["openssl"], "environment": {"MESOS_PORT": "5051"}}"#,
        )
        .unwrap();
        fs::write(dir.join("package.ini"), "[pkg]\nname=mesos\n").unwrap();
        if with_service {
            fs::write(
                dir.join("etc").join("package.nssm"),
                "[service]\nDisplayName=dcos-mesos-agent\nApplication=C:\\mesos\\agent.exe\n",
            )
            .unwrap();
        }
        dir
    }

    #[test]
    fn test_load_package() {
        let root = tempfile::tempdir().unwrap();
        create_package(root.path(), true);

        let package = Package::load(root.path(), PKG_ID, &PackageFiles::default()).unwrap();
        assert_eq!(package.name(), "mesos");
        assert_eq!(package.version(), "1.9.0");
        assert_eq!(package.info()["environment"]["MESOS_PORT"], "5051");
        assert_eq!(package.ini().unwrap().get("pkg", "name"), Some("mesos"));
        assert!(package.has_service());

        let options = package.manager_options().unwrap();
        assert_eq!(options.pkg_id.as_deref(), Some(PKG_ID));
        assert_eq!(
            options.descriptor.get("service", "DisplayName"),
            Some("dcos-mesos-agent")
        );
    }

    #[test]
    fn test_package_without_service() {
        let root = tempfile::tempdir().unwrap();
        create_package(root.path(), false);

        let package = Package::load(root.path(), PKG_ID, &PackageFiles::default()).unwrap();
        assert!(!package.has_service());
        assert!(matches!(
            package.service_descriptor(),
            Err(SvcmError::Config {
                kind: ConfigErrorKind::DescriptorNotFound { .. }
            })
        ));
    }

    #[test]
    fn test_missing_pkg_info() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_package(root.path(), true);
        fs::remove_file(dir.join("pkginfo.json")).unwrap();

        let result = Package::load(root.path(), PKG_ID, &PackageFiles::default());
        assert!(matches!(
            result,
            Err(SvcmError::Config {
                kind: ConfigErrorKind::PackageInfo { .. }
            })
        ));
    }

    #[test]
    fn test_malformed_pkg_info() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_package(root.path(), true);
        fs::write(dir.join("pkginfo.json"), "{not json").unwrap();

        let err = Package::load(root.path(), PKG_ID, &PackageFiles::default()).unwrap_err();
        match err {
            SvcmError::Config {
                kind: ConfigErrorKind::PackageInfo { path, .. },
            } => assert_eq!(path, dir.join("pkginfo.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_package_dir() {
        let root = tempfile::tempdir().unwrap();
        let result = Package::load(root.path(), PKG_ID, &PackageFiles::default());
        assert!(matches!(
            result,
            Err(SvcmError::Config {
                kind: ConfigErrorKind::PackageNotFound { .. }
            })
        ));
    }

    #[test]
    fn test_invalid_package_id() {
        let root = tempfile::tempdir().unwrap();
        let result = Package::load(root.path(), "../escape--1", &PackageFiles::default());
        assert!(matches!(
            result,
            Err(SvcmError::Config {
                kind: ConfigErrorKind::InvalidPackageId { .. }
            })
        ));
    }
}
