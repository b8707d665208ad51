//! Configuration document loading and validation.
//!
//! The configuration is one YAML document declaring every managed
//! instance. Parsing is strict: unknown keys anywhere in the tree are
//! rejected. Validation checks the dependency graph up front so the
//! scheduler never sees an unknown or cyclic `depends_on` reference.

pub mod cache;
pub mod error;

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use seerrsync_core::InstanceConfig;

pub use cache::{default_cache_path, load_cache, save_cache};
pub use error::ConfigError;

/// The full configuration document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    /// Managed instances, keyed by instance name. Order is preserved
    /// and used for reporting.
    pub instances: IndexMap<String, InstanceConfig>,
}

impl ConfigDocument {
    /// Parse a document from YAML text and validate it.
    pub fn from_yaml(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let document: Self = serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        document.validate()?;
        Ok(document)
    }

    /// Load and validate a document from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::from_yaml(&raw, path)?;
        debug!(
            path = %path.display(),
            instances = document.instances.len(),
            "configuration loaded"
        );
        Ok(document)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.instances.is_empty() {
            return Err(ConfigError::NoInstances);
        }

        for (name, config) in &self.instances {
            for dependency in &config.depends_on {
                if !self.instances.contains_key(dependency) {
                    return Err(ConfigError::UnknownDependency {
                        instance: name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        self.check_cycles()
    }

    fn check_cycles(&self) -> Result<(), ConfigError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            name: &str,
            instances: &IndexMap<String, InstanceConfig>,
            marks: &mut HashMap<String, Mark>,
        ) -> Result<(), ConfigError> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(ConfigError::DependencyCycle {
                        instance: name.to_owned(),
                    });
                }
                None => {}
            }
            marks.insert(name.to_owned(), Mark::Visiting);
            if let Some(config) = instances.get(name) {
                for dependency in &config.depends_on {
                    visit(dependency, instances, marks)?;
                }
            }
            marks.insert(name.to_owned(), Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        for name in self.instances.keys() {
            visit(name, &self.instances, &mut marks)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
instances:
  main:
    hostname: jellyseerr.local
    api_key: abc123=
    settings:
      general:
        application_title: Requests
      sonarr:
        delete_unmanaged: true
        definitions:
          Sonarr:
            hostname: sonarr
            api_key: k
            root_folder: /data/tv
            quality_profile: HD - 1080p
            language_profile: English
";

    fn origin() -> std::path::PathBuf {
        std::path::PathBuf::from("seerrsync.yml")
    }

    #[test]
    fn sample_document_parses() {
        let document = ConfigDocument::from_yaml(SAMPLE, &origin()).unwrap();
        let main = &document.instances["main"];
        assert_eq!(main.hostname, "jellyseerr.local");
        assert_eq!(main.port, 5055);
        let general = main.settings.general.as_ref().unwrap();
        assert_eq!(general.application_title, "Requests");
        let sonarr = main.settings.sonarr.as_ref().unwrap();
        assert!(sonarr.delete_unmanaged);
        assert!(sonarr.definitions.contains_key("Sonarr"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let raw = "instances:\n  main:\n    hostname: x\n    api_key: k\n    no_such_key: 1\n";
        let err = ConfigDocument::from_yaml(raw, &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("seerrsync.yml"));
    }

    #[test]
    fn empty_document_is_rejected() {
        let err = ConfigDocument::from_yaml("instances: {}\n", &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::NoInstances));
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let raw = "\
instances:
  main:
    hostname: a
    api_key: k
    depends_on: [other]
";
        let err = ConfigDocument::from_yaml(raw, &origin()).unwrap_err();
        match err {
            ConfigError::UnknownDependency {
                instance,
                dependency,
            } => {
                assert_eq!(instance, "main");
                assert_eq!(dependency, "other");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dependency_cycles_are_rejected() {
        let raw = "\
instances:
  a:
    hostname: a
    api_key: k
    depends_on: [b]
  b:
    hostname: b
    api_key: k
    depends_on: [a]
";
        let err = ConfigDocument::from_yaml(raw, &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::DependencyCycle { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seerrsync.yml");
        std::fs::write(&path, SAMPLE).unwrap();
        let document = ConfigDocument::load(&path).unwrap();
        assert_eq!(document.instances.len(), 1);
    }
}
