//! Security scanners configuration (sec-scanners-config.yaml)

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wax::Glob;

use crate::error::{Result, config};
use crate::files::FileReader;

/// Excludes always appended to the Mend configuration
pub const DEFAULT_EXCLUDES: [&str; 2] = ["**/test/**", "**/*_test.go"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScanConfig {
    #[serde(default)]
    pub rc_tag: String,

    #[serde(default)]
    pub dev_branch: String,

    #[serde(default)]
    pub mend: MendConfig,

    /// Third-party images scanned by image-based scanners
    #[serde(default)]
    pub protecode: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MendConfig {
    /// Globs of sub-projects excluded from scanning
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether sub-projects are scanned separately ("true" / "false")
    #[serde(default)]
    pub sub_projects: String,

    #[serde(default)]
    pub language: String,
}

impl SecurityScanConfig {
    /// Parse from YAML, append default excludes and validate globs
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.normalize()?;
        Ok(config)
    }

    fn normalize(&mut self) -> Result<()> {
        for exclude in DEFAULT_EXCLUDES {
            if !self.mend.exclude.iter().any(|e| e == exclude) {
                self.mend.exclude.push(exclude.to_string());
            }
        }
        for exclude in &self.mend.exclude {
            Glob::new(exclude).map_err(|e| {
                config::invalid("mend.exclude", format!("'{exclude}' is not a valid glob: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Read the security config at `path`.
///
/// A missing file yields [`ModulectlError::SecurityConfigFileDoesNotExist`],
/// which callers treat as "no security metadata".
///
/// [`ModulectlError::SecurityConfigFileDoesNotExist`]: crate::error::ModulectlError::SecurityConfigFileDoesNotExist
pub fn parse(reader: &impl FileReader, path: &Path) -> Result<SecurityScanConfig> {
    if !reader.file_exists(path) {
        return Err(config::security_missing(path.display().to_string()));
    }
    let content = reader.read_to_string(path)?;
    let mut parsed: SecurityScanConfig = serde_yaml::from_str(&content)
        .map_err(|e| config::parse_failed(path.display().to_string(), e.to_string()))?;
    parsed.normalize()?;
    debug!(
        path = %path.display(),
        images = parsed.protecode.len(),
        "security config loaded"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModulectlError;
    use crate::files::OsFileReader;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
rcTag: 1.0.0
devBranch: main
mend:
  language: golang-mod
  subProjects: "false"
  exclude:
    - "**/mocks/**"
protecode:
  - europe-docker.pkg.dev/kyma-project/prod/template-operator:1.0.0
  - europe-docker.pkg.dev/kyma-project/prod/webhook:v1.2.0
"#;

    #[test]
    fn test_from_yaml() {
        let config = SecurityScanConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.rc_tag, "1.0.0");
        assert_eq!(config.dev_branch, "main");
        assert_eq!(config.mend.language, "golang-mod");
        assert_eq!(config.mend.sub_projects, "false");
        assert_eq!(config.protecode.len(), 2);
        assert_eq!(
            config.mend.exclude,
            vec!["**/mocks/**", "**/test/**", "**/*_test.go"]
        );
    }

    #[test]
    fn test_default_excludes_not_duplicated() {
        let config = SecurityScanConfig::from_yaml("mend:\n  exclude: ['**/test/**']\n").unwrap();
        assert_eq!(config.mend.exclude, vec!["**/test/**", "**/*_test.go"]);
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let err =
            SecurityScanConfig::from_yaml("mend:\n  exclude: ['**/{unclosed']\n").unwrap_err();
        assert!(matches!(err, ModulectlError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_parse_missing_file_is_distinct() {
        let temp = TempDir::new().unwrap();
        let err = parse(&OsFileReader, &temp.path().join("sec-scanners-config.yaml")).unwrap_err();
        assert!(matches!(err, ModulectlError::SecurityConfigFileDoesNotExist { .. }));
    }

    #[test]
    fn test_parse_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sec-scanners-config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = parse(&OsFileReader, &path).unwrap();
        assert_eq!(config.rc_tag, "1.0.0");
    }
}
