//! Domain vocabulary and the per-domain operation allow-list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Verticals exposed by the upstream API.
pub const DOMAINS: &[&str] = &[
    "accounting",
    "commerce",
    "ecommerce",
    "invoicing",
    "banking",
    "payment",
    "pms",
    "custom",
];

/// Upstream connection API names mapped to domain slugs.
pub const CONNECTION_TYPES: &[(&str, &str)] = &[
    ("Accounting", "accounting"),
    ("Point of Sale", "commerce"),
    ("eCommerce", "ecommerce"),
    ("Invoicing", "invoicing"),
    ("Banking", "banking"),
    ("Payment", "payment"),
    ("Property Management System", "pms"),
    ("Custom", "custom"),
];

/// Resolves a connection's API name to its domain slug.
pub fn domain_for_connection(api_name: &str) -> Option<&'static str> {
    CONNECTION_TYPES
        .iter()
        .find(|(api, _)| *api == api_name)
        .map(|(_, domain)| *domain)
}

/// Operation categories a tool name can carry after its domain prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Get,
    Create,
    Update,
    Add,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Get,
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Add,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Get => "get",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Add => "add",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "get" => Some(OperationKind::Get),
            "create" => Some(OperationKind::Create),
            "update" => Some(OperationKind::Update),
            "add" => Some(OperationKind::Add),
            _ => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a tool name of the form `<domain>_<kind>_<rest>` into its
/// domain and kind segments.
pub fn split_tool_name(name: &str) -> Option<(&str, &str)> {
    let mut parts = name.splitn(3, '_');
    let domain = parts.next()?;
    let kind = parts.next()?;
    if domain.is_empty() || kind.is_empty() {
        return None;
    }
    Some((domain, kind))
}

/// Per-domain allow-list of operation kinds.
///
/// An empty config allows nothing; an absent config is represented by
/// [`FunctionConfig::allow_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionConfig {
    domains: BTreeMap<String, Vec<OperationKind>>,
}

impl FunctionConfig {
    /// Every kind allowed in every domain.
    pub fn allow_all() -> Self {
        Self {
            domains: DOMAINS
                .iter()
                .map(|d| (d.to_string(), OperationKind::ALL.to_vec()))
                .collect(),
        }
    }

    /// Parses and validates a JSON config of the shape
    /// `{"accounting": ["get", "create"], ...}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("invalid function config JSON: {e}")))?;
        Self::validate(parsed)
    }

    /// Validates raw domain/kind names, deduplicating kinds while
    /// preserving their order.
    pub fn validate(raw: BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut domains = BTreeMap::new();
        for (domain, kinds) in raw {
            if !DOMAINS.contains(&domain.as_str()) {
                return Err(Error::Config(format!(
                    "unknown domain '{domain}' in function config (expected one of: {})",
                    DOMAINS.join(", ")
                )));
            }
            let mut seen = Vec::new();
            for kind in kinds {
                let parsed = OperationKind::parse(&kind).ok_or_else(|| {
                    Error::Config(format!(
                        "unknown operation kind '{kind}' for domain '{domain}' (expected one of: get, create, update, add)"
                    ))
                })?;
                if !seen.contains(&parsed) {
                    seen.push(parsed);
                }
            }
            domains.insert(domain, seen);
        }
        Ok(Self { domains })
    }

    /// True when the given domain allows the given kind.
    pub fn allows(&self, domain: &str, kind: OperationKind) -> bool {
        self.domains
            .get(domain)
            .is_some_and(|kinds| kinds.contains(&kind))
    }

    /// Applies the allow-list to a full tool name.
    pub fn allows_name(&self, name: &str) -> bool {
        match split_tool_name(name) {
            Some((domain, kind)) => match OperationKind::parse(kind) {
                Some(kind) => self.allows(domain, kind),
                None => false,
            },
            None => false,
        }
    }

    /// Domains present in the config.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.domains.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(d, ks)| {
                (
                    d.to_string(),
                    ks.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    #[test]
    fn test_validate_accepts_known_domains_and_kinds() {
        let config =
            FunctionConfig::validate(raw(&[("accounting", &["get", "create"])])).unwrap();
        assert!(config.allows("accounting", OperationKind::Get));
        assert!(config.allows("accounting", OperationKind::Create));
        assert!(!config.allows("accounting", OperationKind::Update));
        assert!(!config.allows("commerce", OperationKind::Get));
    }

    #[test]
    fn test_validate_rejects_unknown_domain() {
        let err = FunctionConfig::validate(raw(&[("treasury", &["get"])])).unwrap_err();
        assert!(err.to_string().contains("unknown domain 'treasury'"));
    }

    #[test]
    fn test_validate_rejects_unknown_kind() {
        let err = FunctionConfig::validate(raw(&[("banking", &["delete"])])).unwrap_err();
        assert!(err.to_string().contains("unknown operation kind 'delete'"));
    }

    #[test]
    fn test_validate_deduplicates_preserving_order() {
        let config = FunctionConfig::validate(raw(&[(
            "invoicing",
            &["update", "get", "update", "get"],
        )]))
        .unwrap();
        assert_eq!(
            config.domains["invoicing"],
            vec![OperationKind::Update, OperationKind::Get]
        );
    }

    #[test]
    fn test_empty_config_allows_nothing() {
        let config = FunctionConfig::validate(BTreeMap::new()).unwrap();
        assert!(config.is_empty());
        assert!(!config.allows_name("accounting_get_invoices"));
    }

    #[test]
    fn test_allows_name_splits_on_underscores() {
        let config = FunctionConfig::from_json(r#"{"accounting": ["get"]}"#).unwrap();
        assert!(config.allows_name("accounting_get_invoices"));
        assert!(config.allows_name("accounting_get_analytic_plans"));
        assert!(!config.allows_name("accounting_create_invoice"));
        assert!(!config.allows_name("commerce_get_orders"));
        assert!(!config.allows_name("consumers"));
    }

    #[test]
    fn test_from_json_rejects_malformed_json() {
        assert!(FunctionConfig::from_json("not json").is_err());
        assert!(FunctionConfig::from_json(r#"{"accounting": "get"}"#).is_err());
    }

    #[test]
    fn test_connection_type_lookup() {
        assert_eq!(domain_for_connection("Point of Sale"), Some("commerce"));
        assert_eq!(domain_for_connection("Accounting"), Some("accounting"));
        assert_eq!(domain_for_connection("CRM"), None);
    }

    #[test]
    fn test_split_tool_name() {
        assert_eq!(
            split_tool_name("banking_get_transactions"),
            Some(("banking", "get"))
        );
        assert_eq!(split_tool_name("consumers"), None);
        assert_eq!(split_tool_name("_get_x"), None);
    }
}
