//! Kubernetes label selector parsing
//!
//! Parses the string form accepted by `kubectl -l`, e.g.
//! `operator.kyma-project.io/oci-registry-cred=test-operator,env!=dev,tier in (a,b)`.
//! Equality requirements become `matchLabels`; everything else becomes
//! `matchExpressions`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, config};

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").expect("label name regex is valid")
});

static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("label prefix regex is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// Parse a selector string
pub fn parse(selector: &str) -> Result<LabelSelector> {
    let mut result = LabelSelector::default();

    for requirement in split_requirements(selector) {
        let requirement = requirement.trim();
        if requirement.is_empty() {
            return Err(config::invalid_selector(selector, "empty requirement"));
        }
        parse_requirement(selector, requirement, &mut result)?;
    }

    Ok(result)
}

/// Split on commas that are not inside a `(...)` value set
fn split_requirements(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in selector.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&selector[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts
}

fn parse_requirement(selector: &str, requirement: &str, result: &mut LabelSelector) -> Result<()> {
    if let Some(key) = requirement.strip_prefix('!') {
        let key = validate_key(selector, key.trim())?;
        result.match_expressions.push(LabelSelectorRequirement {
            key,
            operator: Operator::DoesNotExist,
            values: Vec::new(),
        });
        return Ok(());
    }

    if let Some((key, value)) = requirement.split_once("!=") {
        let key = validate_key(selector, key.trim())?;
        let value = validate_value(selector, value.trim())?;
        result.match_expressions.push(LabelSelectorRequirement {
            key,
            operator: Operator::NotIn,
            values: vec![value],
        });
        return Ok(());
    }

    if let Some((key, value)) = requirement
        .split_once("==")
        .or_else(|| requirement.split_once('='))
    {
        let key = validate_key(selector, key.trim())?;
        let value = validate_value(selector, value.trim())?;
        result.match_labels.insert(key, value);
        return Ok(());
    }

    let mut words = requirement.splitn(2, char::is_whitespace);
    let key = words.next().unwrap_or_default();
    let rest = words.next().map(str::trim).unwrap_or_default();

    if rest.is_empty() {
        let key = validate_key(selector, key)?;
        result.match_expressions.push(LabelSelectorRequirement {
            key,
            operator: Operator::Exists,
            values: Vec::new(),
        });
        return Ok(());
    }

    let (operator, values) = if let Some(values) = rest.strip_prefix("notin") {
        (Operator::NotIn, values)
    } else if let Some(values) = rest.strip_prefix("in") {
        (Operator::In, values)
    } else {
        return Err(config::invalid_selector(
            selector,
            format!("unknown operator in '{requirement}'"),
        ));
    };

    let values = values.trim();
    let Some(inner) = values
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
    else {
        return Err(config::invalid_selector(
            selector,
            format!("expected '(' value list ')' in '{requirement}'"),
        ));
    };

    let values = inner
        .split(',')
        .map(|v| validate_value(selector, v.trim()))
        .collect::<Result<Vec<_>>>()?;

    result.match_expressions.push(LabelSelectorRequirement {
        key: validate_key(selector, key)?,
        operator,
        values,
    });
    Ok(())
}

/// Validate a qualified label key (`[prefix/]name`)
fn validate_key(selector: &str, key: &str) -> Result<String> {
    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN || !PREFIX_RE.is_match(prefix) {
            return Err(config::invalid_selector(
                selector,
                format!("invalid key prefix '{prefix}'"),
            ));
        }
    }

    if name.is_empty() || name.len() > MAX_NAME_LEN || !NAME_RE.is_match(name) {
        return Err(config::invalid_selector(
            selector,
            format!("invalid key '{key}'"),
        ));
    }

    Ok(key.to_string())
}

/// Validate a label value; empty values are allowed
fn validate_value(selector: &str, value: &str) -> Result<String> {
    if !value.is_empty() && (value.len() > MAX_NAME_LEN || !NAME_RE.is_match(value)) {
        return Err(config::invalid_selector(
            selector,
            format!("invalid value '{value}'"),
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_equality() {
        let selector = parse("operator.kyma-project.io/oci-registry-cred=test-operator").unwrap();
        assert_eq!(
            selector.match_labels.get("operator.kyma-project.io/oci-registry-cred"),
            Some(&"test-operator".to_string())
        );
        assert!(selector.match_expressions.is_empty());
    }

    #[test]
    fn test_parse_double_equals_and_multiple() {
        let selector = parse("app==web, tier=backend").unwrap();
        assert_eq!(selector.match_labels.len(), 2);
        assert_eq!(selector.match_labels["tier"], "backend");
    }

    #[test]
    fn test_parse_set_based() {
        let selector =
            parse("env in (prod, staging),tier notin (frontend),!legacy,managed").unwrap();
        assert!(selector.match_labels.is_empty());
        assert_eq!(
            selector.match_expressions,
            vec![
                LabelSelectorRequirement {
                    key: "env".to_string(),
                    operator: Operator::In,
                    values: vec!["prod".to_string(), "staging".to_string()],
                },
                LabelSelectorRequirement {
                    key: "tier".to_string(),
                    operator: Operator::NotIn,
                    values: vec!["frontend".to_string()],
                },
                LabelSelectorRequirement {
                    key: "legacy".to_string(),
                    operator: Operator::DoesNotExist,
                    values: vec![],
                },
                LabelSelectorRequirement {
                    key: "managed".to_string(),
                    operator: Operator::Exists,
                    values: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_parse_not_equal() {
        let selector = parse("env!=dev").unwrap();
        assert_eq!(selector.match_expressions[0].operator, Operator::NotIn);
    }

    #[test]
    fn test_match_labels_json() {
        let selector = parse("b=2,a=1").unwrap();
        let json = serde_json::to_string(&selector.match_labels).unwrap();
        assert_eq!(json, r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn test_invalid_selectors() {
        for input in [
            "a=b,",
            "=value",
            "key=bad value!",
            "Bad_Prefix/key=v",
            "env in prod",
            "env between (a)",
        ] {
            let err = parse(input).unwrap_err();
            assert!(
                matches!(err, crate::error::ModulectlError::InvalidLabelSelector { .. }),
                "{input} should be rejected"
            );
        }
    }
}
