use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Process-wide policy defaults consumed by the document assemblers.
///
/// Loaded once at startup and treated as read-only afterwards. Strict/lenient
/// building is deliberately NOT part of this struct; it is an explicit
/// parameter on every top-level build entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    /// The authority this process publishes under (the host part of its ivoids).
    pub authority: String,
    /// Further authorities whose resources this registry is allowed to publish.
    pub managed_authorities: BTreeSet<String>,
    /// Human-readable site name, used in generated descriptions.
    pub site_name: String,

    /// Default row limit for data-access responses.
    pub dal_default_limit: u64,
    /// Hard row limit no request may exceed.
    pub dal_hard_limit: u64,
    /// Default retention of asynchronous jobs, in seconds.
    pub retention_period_s: u64,
    /// Default execution duration of asynchronous jobs, in seconds.
    pub execution_duration_s: u64,
    /// Hard upload size limit, in bytes.
    pub max_upload_bytes: u64,
    /// Page size of harvesting list responses.
    pub oai_page_size: u64,

    /// Default maximum search radius (degrees) for positional queries.
    pub default_max_radius: f64,
    /// Default test-query radius (degrees).
    pub default_test_radius: f64,

    /// Access-path rewrites: long local path to its published short alias.
    pub short_aliases: BTreeMap<String, String>,
    /// Also publish a protocol-switched (http/https) mirror of each access URL.
    pub mirror_alternate_protocol: bool,
    /// Emit the experimental endpoint-declaring interface on table-access
    /// capabilities in addition to the plain one.
    pub experimental_endpoint_decl: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            authority: String::new(),
            managed_authorities: BTreeSet::new(),
            site_name: "unnamed data center".to_string(),
            dal_default_limit: 2_000,
            dal_hard_limit: 10_000_000,
            retention_period_s: 172_800,
            execution_duration_s: 3_600,
            max_upload_bytes: 100_000_000,
            oai_page_size: 500,
            default_max_radius: 180.0,
            default_test_radius: 0.001,
            short_aliases: BTreeMap::new(),
            mirror_alternate_protocol: false,
            experimental_endpoint_decl: false,
        }
    }
}

impl RegistryConfig {
    /// Parse a config from YAML. Missing keys fall back to the defaults.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// True if `authority` is one this registry may publish resources for.
    pub fn manages(&self, authority: &str) -> bool {
        !authority.is_empty()
            && (authority == self.authority || self.managed_authorities.contains(authority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let cfg = RegistryConfig::default();
        assert_eq!(cfg.dal_default_limit, 2_000);
        assert!(!cfg.manages("org.example"));
        assert!(!cfg.manages(""));
    }

    #[test]
    fn yaml_overrides_partial() {
        let cfg = RegistryConfig::from_yaml(
            r#"
authority: org.example
managedAuthorities: [org.partner]
oaiPageSize: 50
shortAliases:
  surveys/dr3/q/cone: cone
"#,
        )
        .unwrap();
        assert!(cfg.manages("org.example"));
        assert!(cfg.manages("org.partner"));
        assert!(!cfg.manages("org.other"));
        assert_eq!(cfg.oai_page_size, 50);
        assert_eq!(cfg.short_aliases["surveys/dr3/q/cone"], "cone");
        // untouched keys keep their defaults
        assert_eq!(cfg.dal_hard_limit, 10_000_000);
    }
}
