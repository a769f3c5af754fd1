//! INI descriptor file reader.
//!
//! Descriptors are INI-style text files. Option names keep their case and
//! backslashes are taken literally, so Windows paths survive unchanged.
//! Indented lines continue the previous value and are joined with `\n`.

use std::collections::HashSet;
use std::path::Path;

use ini::{Ini, ParseOption};
use tracing::debug;

use crate::error::{ConfigErrorKind, SvcmError, SvcmResult};

use super::types::ServiceDescriptor;

impl ServiceDescriptor {
    /// Parse descriptor text.
    ///
    /// Options outside any section, repeated sections and duplicate
    /// options within a section are rejected.
    pub fn parse(content: &str, origin: &Path) -> SvcmResult<Self> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            enabled_indented_mutiline_value: true,
            ..ParseOption::default()
        };

        let ini = Ini::load_from_str_opt(content, options).map_err(|e| SvcmError::Config {
            kind: ConfigErrorKind::DescriptorUnreadable {
                path: origin.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let mut descriptor = ServiceDescriptor::new();
        let mut seen = HashSet::new();
        for (section, properties) in ini.iter() {
            let Some(section) = section else {
                if let Some((name, _)) = properties.iter().next() {
                    return Err(SvcmError::Config {
                        kind: ConfigErrorKind::DescriptorUnreadable {
                            path: origin.to_path_buf(),
                            message: format!("Option '{}' outside of any section", name),
                        },
                    });
                }
                continue;
            };

            if !seen.insert(section) {
                return Err(SvcmError::Config {
                    kind: ConfigErrorKind::DuplicateSection {
                        section: section.to_string(),
                    },
                });
            }

            let target = descriptor.section_mut(section);
            for (name, value) in properties.iter() {
                if target.set(name, value) {
                    return Err(SvcmError::Config {
                        kind: ConfigErrorKind::DuplicateOption {
                            section: section.to_string(),
                            option: name.to_string(),
                        },
                    });
                }
            }
        }

        Ok(descriptor)
    }

    /// Read and parse a descriptor file.
    pub fn load<P: AsRef<Path>>(path: P) -> SvcmResult<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(SvcmError::Config {
                kind: ConfigErrorKind::DescriptorNotFound {
                    path: path.to_path_buf(),
                },
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SvcmError::Config {
            kind: ConfigErrorKind::DescriptorUnreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let descriptor = Self::parse(&content, path)?;
        debug!(
            path = %path.display(),
            sections = ?descriptor.section_names().collect::<Vec<_>>(),
            "Service descriptor loaded"
        );
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("package.nssm")
    }

    #[test]
    fn test_parse_preserves_case_and_backslashes() {
        let content = "[service]\n\
                       DisplayName=dcos-mesos-agent\n\
                       Application=C:\\d2iq\\dcos\\bin\\mesos-agent.exe\n\
                       AppDirectory = C:\\d2iq\\dcos\\var\n";
        let descriptor = ServiceDescriptor::parse(content, &origin()).unwrap();

        assert_eq!(
            descriptor.get("service", "Application"),
            Some("C:\\d2iq\\dcos\\bin\\mesos-agent.exe")
        );
        assert_eq!(
            descriptor.get("service", "AppDirectory"),
            Some("C:\\d2iq\\dcos\\var")
        );
        assert_eq!(descriptor.get("service", "displayname"), None);
    }

    #[test]
    fn test_parse_keeps_option_order() {
        let content = "[service]\nStart=SERVICE_AUTO_START\nDisplayName=svc1\nApplication=app.exe\n";
        let descriptor = ServiceDescriptor::parse(content, &origin()).unwrap();
        let names: Vec<_> = descriptor
            .section("service")
            .unwrap()
            .options()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["Start", "DisplayName", "Application"]);
    }

    #[test]
    fn test_parse_keeps_template_syntax() {
        let content = "[service]\nAppParameters=--master=zk://{{ master_ip }}:2181/mesos\n";
        let descriptor = ServiceDescriptor::parse(content, &origin()).unwrap();
        assert_eq!(
            descriptor.get("service", "AppParameters"),
            Some("--master=zk://{{ master_ip }}:2181/mesos")
        );
    }

    #[test]
    fn test_indented_lines_continue_value() {
        let content = "[service]\n\
                       DisplayName=svc1\n\
                       Application=app.exe\n\
                       AppEnvironmentExtra=A=1\n    B=2\n\
                       Start=SERVICE_AUTO_START\n";
        let descriptor = ServiceDescriptor::parse(content, &origin()).unwrap();

        assert_eq!(
            descriptor.get("service", "AppEnvironmentExtra"),
            Some("A=1\nB=2")
        );
        assert_eq!(descriptor.get("service", "B"), None);
        assert_eq!(descriptor.get("service", "Start"), Some("SERVICE_AUTO_START"));
    }

    #[test]
    fn test_duplicate_option_rejected() {
        let content = "[service]\nDisplayName=a\nApplication=b\nDisplayName=c\n";
        let err = ServiceDescriptor::parse(content, &origin()).unwrap_err();
        match err {
            SvcmError::Config {
                kind: ConfigErrorKind::DuplicateOption { section, option },
            } => {
                assert_eq!(section, "service");
                assert_eq!(option, "DisplayName");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_section_rejected() {
        let content = "[service]\nDisplayName=a\n[other]\nx=1\n[service]\nApplication=b\n";
        let err = ServiceDescriptor::parse(content, &origin()).unwrap_err();
        assert!(matches!(
            err,
            SvcmError::Config {
                kind: ConfigErrorKind::DuplicateSection { ref section }
            } if section == "service"
        ));
    }

    #[test]
    fn test_option_outside_section_rejected() {
        let content = "DisplayName=a\n[service]\nApplication=b\n";
        assert!(ServiceDescriptor::parse(content, &origin()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServiceDescriptor::load(dir.path().join("package.nssm"));
        assert!(matches!(
            result,
            Err(SvcmError::Config {
                kind: ConfigErrorKind::DescriptorNotFound { .. }
            })
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.nssm");
        std::fs::write(&path, "[service]\nDisplayName=svc1\nApplication=app.exe\n").unwrap();

        let descriptor = ServiceDescriptor::load(&path).unwrap();
        assert_eq!(descriptor.get("service", "DisplayName"), Some("svc1"));
    }
}
