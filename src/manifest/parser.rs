//! Multi-document YAML manifest parsing

use std::path::Path;

use serde_yaml::Value;

use crate::error::{ModulectlError, Result};
use crate::files::FileReader;

/// Parses a manifest file into its YAML documents
pub trait ManifestParser {
    fn parse(&self, path: &Path) -> Result<Vec<Value>>;
}

/// [`ManifestParser`] reading YAML streams through a [`FileReader`]
#[derive(Debug, Clone, Default)]
pub struct YamlManifestParser<R> {
    reader: R,
}

impl<R: FileReader> YamlManifestParser<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: FileReader> ManifestParser for YamlManifestParser<R> {
    fn parse(&self, path: &Path) -> Result<Vec<Value>> {
        let content = self.reader.read_to_string(path)?;
        let mut documents = Vec::new();

        for document in split_documents(&content) {
            if document.trim().is_empty() {
                continue;
            }
            let value: Value =
                serde_yaml::from_str(&document).map_err(|e| ModulectlError::ManifestParseFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            if !value.is_null() {
                documents.push(value);
            }
        }

        Ok(documents)
    }
}

/// Split a YAML stream on `---` separator lines.
///
/// Only a line consisting of the separator starts a new document; `---`
/// inside a scalar stays part of the current one.
pub fn split_documents(content: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        if is_separator(line) {
            documents.push(std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    documents.push(current);

    documents
}

fn is_separator(line: &str) -> bool {
    let line = line.trim_end();
    line == "---" || line.strip_prefix("---").is_some_and(|rest| rest.starts_with([' ', '\t']))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::OsFileReader;
    use tempfile::TempDir;

    #[test]
    fn test_split_on_separator_lines_only() {
        let content = "a: 1\n---\nb: \"x---y\"\nc: |\n  text --- more\n---   \nd: 4\n";
        let documents = split_documents(content);
        assert_eq!(documents.len(), 3);
        assert!(documents[1].contains("x---y"));
        assert!(documents[1].contains("text --- more"));
        assert_eq!(documents[2], "d: 4\n");
    }

    #[test]
    fn test_leading_separator_yields_empty_first_document() {
        let documents = split_documents("---\nkind: Service\n");
        assert_eq!(documents, vec![String::new(), "kind: Service\n".to_string()]);
    }

    #[test]
    fn test_parse_skips_empty_documents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("manifest.yaml");
        std::fs::write(&path, "---\nkind: Service\n---\n\n---\n# comment only\n").unwrap();

        let parser = YamlManifestParser::new(OsFileReader);
        let documents = parser.parse(&path).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0]["kind"].as_str(), Some("Service"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("manifest.yaml");
        std::fs::write(&path, "kind: [unclosed\n").unwrap();

        let parser = YamlManifestParser::new(OsFileReader);
        assert!(matches!(
            parser.parse(&path).unwrap_err(),
            ModulectlError::ManifestParseFailed { .. }
        ));
    }
}
