//! Address classification.
//!
//! Pure functions over a normalized address:
//! - **Disposable**: the domain belongs to a throwaway-mailbox provider
//! - **Role-based**: the local part names a function (`support@`, `sales.eu@`)
//!   rather than a person
//! - **Domain type**: personal webmail provider or corporate domain
//!
//! The lists behind these checks come from a [`ClassifierConfig`] so they can
//! be replaced without touching the rules themselves.
//!
//! # Example
//!
//! ```
//! use mailsift_core::classify::{AddressType, Classifier};
//!
//! let classifier = Classifier::default();
//!
//! let flags = classifier.classify_address("support.team@mailinator.com");
//! assert!(flags.is_disposable);
//! assert!(flags.is_role_based);
//!
//! let domain = classifier.classify_domain("gmail.com");
//! assert_eq!(domain.tld, "com");
//! assert_eq!(domain.kind, AddressType::Personal);
//! ```

mod defaults;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use defaults::{DISPOSABLE_DOMAINS, PERSONAL_DOMAINS, ROLE_PREFIXES};

/// Whether an address belongs to a consumer mailbox or an organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    /// Hosted by a consumer webmail provider.
    Personal,
    /// Anything not recognised as personal.
    #[default]
    Corporate,
}

impl AddressType {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Corporate => "corporate",
        }
    }
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags derived from the full address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressFlags {
    /// Domain is a known disposable-mailbox provider.
    pub is_disposable: bool,
    /// Local part is a role prefix, or a role prefix followed by `.`.
    pub is_role_based: bool,
}

/// Facts derived from the domain alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainInfo {
    /// Text after the last `.`; the whole domain when there is no `.`.
    pub tld: String,
    /// Personal or corporate.
    pub kind: AddressType,
}

/// Lists driving the classifier.
///
/// Each list falls back to the built-in one when absent from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Disposable-mailbox domains (exact match).
    #[serde(default = "defaults::disposable_domains")]
    pub disposable_domains: Vec<String>,
    /// Consumer webmail domains (exact match).
    #[serde(default = "defaults::personal_domains")]
    pub personal_domains: Vec<String>,
    /// Role prefixes matched against the local part.
    #[serde(default = "defaults::role_prefixes")]
    pub role_prefixes: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            disposable_domains: defaults::disposable_domains(),
            personal_domains: defaults::personal_domains(),
            role_prefixes: defaults::role_prefixes(),
        }
    }
}

/// Classifies normalized addresses against fixed lists.
#[derive(Debug, Clone)]
pub struct Classifier {
    disposable: HashSet<String>,
    personal: HashSet<String>,
    roles: Vec<String>,
}

impl Classifier {
    /// Builds a classifier from configuration. List entries are trimmed and
    /// lower-cased; empty entries are dropped.
    #[must_use]
    pub fn new(config: &ClassifierConfig) -> Self {
        let mut roles: Vec<String> = normalize_list(&config.role_prefixes).collect();
        roles.sort_unstable();
        roles.dedup();

        Self {
            disposable: normalize_list(&config.disposable_domains).collect(),
            personal: normalize_list(&config.personal_domains).collect(),
            roles,
        }
    }

    /// Classifies an address by its domain and local part.
    ///
    /// Comparison is case-insensitive, so `SUPPORT@Example.com` and
    /// `support@example.com` classify identically.
    #[must_use]
    pub fn classify_address(&self, address: &str) -> AddressFlags {
        let address = address.trim().to_ascii_lowercase();
        let (local, domain) = split_address(&address);

        AddressFlags {
            is_disposable: self.disposable.contains(domain),
            is_role_based: self.is_role(local),
        }
    }

    /// Derives the TLD and personal/corporate type of a domain.
    #[must_use]
    pub fn classify_domain(&self, domain: &str) -> DomainInfo {
        let domain = domain.trim().to_ascii_lowercase();
        let tld = domain
            .rsplit_once('.')
            .map_or(domain.as_str(), |(_, tld)| tld)
            .to_string();
        let kind = if self.personal.contains(&domain) {
            AddressType::Personal
        } else {
            AddressType::Corporate
        };

        DomainInfo { tld, kind }
    }

    fn is_role(&self, local: &str) -> bool {
        self.roles.iter().any(|prefix| {
            local
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

/// Splits an address into `(local, domain)` at the first `@`.
///
/// An address without `@` is all local part with an empty domain.
#[must_use]
pub fn split_address(address: &str) -> (&str, &str) {
    address.split_once('@').unwrap_or((address, ""))
}

fn normalize_list(list: &[String]) -> impl Iterator<Item = String> + '_ {
    list.iter()
        .map(|entry| entry.trim().to_ascii_lowercase())
        .filter(|entry| !entry.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_disposable_domain() {
        let classifier = Classifier::default();
        assert!(classifier.classify_address("x@mailinator.com").is_disposable);
        assert!(!classifier.classify_address("x@gmail.com").is_disposable);
        assert_eq!(
            classifier.classify_domain("gmail.com").kind,
            AddressType::Personal
        );
    }

    #[test]
    fn test_role_prefix_boundary() {
        let classifier = Classifier::default();
        assert!(classifier.classify_address("support@acme.com").is_role_based);
        assert!(
            classifier
                .classify_address("support.team@acme.com")
                .is_role_based
        );
        assert!(
            !classifier
                .classify_address("supporting@acme.com")
                .is_role_based
        );
        assert!(!classifier.classify_address("jane@acme.com").is_role_based);
    }

    #[test]
    fn test_address_can_be_disposable_and_role_based() {
        let flags = Classifier::default().classify_address("admin@yopmail.com");
        assert!(flags.is_disposable);
        assert!(flags.is_role_based);
    }

    #[test]
    fn test_classify_domain_tld() {
        let classifier = Classifier::default();
        let info = classifier.classify_domain("mail.example.co.uk");
        assert_eq!(info.tld, "uk");
        assert_eq!(info.kind, AddressType::Corporate);
    }

    #[test]
    fn test_classify_domain_without_dot() {
        let info = Classifier::default().classify_domain("localhost");
        assert_eq!(info.tld, "localhost");
        assert_eq!(info.kind, AddressType::Corporate);
    }

    #[test]
    fn test_injected_lists_replace_defaults() {
        let config = ClassifierConfig {
            disposable_domains: vec![" Burner.Example ".to_string()],
            personal_domains: vec!["home.example".to_string()],
            role_prefixes: vec!["Desk".to_string(), String::new()],
        };
        let classifier = Classifier::new(&config);

        assert!(classifier.classify_address("a@burner.example").is_disposable);
        assert!(!classifier.classify_address("a@mailinator.com").is_disposable);
        assert!(classifier.classify_address("desk.eu@x.com").is_role_based);
        assert!(!classifier.classify_address("support@x.com").is_role_based);
        assert_eq!(
            classifier.classify_domain("home.example").kind,
            AddressType::Personal
        );
        assert_eq!(
            classifier.classify_domain("gmail.com").kind,
            AddressType::Corporate
        );
    }

    #[test]
    fn test_config_missing_lists_use_defaults() {
        let config: ClassifierConfig =
            serde_json::from_str(r#"{"role_prefixes": ["desk"]}"#).unwrap();
        assert_eq!(config.role_prefixes, vec!["desk".to_string()]);
        assert_eq!(config.disposable_domains.len(), DISPOSABLE_DOMAINS.len());
        assert_eq!(config.personal_domains.len(), PERSONAL_DOMAINS.len());
    }

    #[test]
    fn test_address_type_names() {
        for kind in [AddressType::Personal, AddressType::Corporate] {
            assert_eq!(kind.to_string(), kind.as_str());
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                serde_json::Value::from(kind.as_str())
            );
        }
    }

    #[test]
    fn test_split_address() {
        assert_eq!(split_address("a@b.com"), ("a", "b.com"));
        assert_eq!(split_address("nodomain"), ("nodomain", ""));
    }

    proptest! {
        #[test]
        fn prop_classification_ignores_case(
            local in "[a-zA-Z]{1,10}(\\.[a-zA-Z]{1,5})?",
            domain in "(Mailinator|GMAIL|example|Acme)\\.(com|COM|net)",
        ) {
            let classifier = Classifier::default();
            let mixed = format!("{local}@{domain}");
            let lowered = mixed.to_lowercase();

            prop_assert_eq!(
                classifier.classify_address(&mixed),
                classifier.classify_address(&lowered)
            );
            prop_assert_eq!(
                classifier.classify_domain(&domain),
                classifier.classify_domain(&domain.to_lowercase())
            );
        }
    }
}
