use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use toml::Value;
use tracing::debug;

/// Locations searched by [`load`], merged in this order.
pub const CONFIG_LOCATIONS: [&str; 3] = [
    "/etc/iprovision/config.toml",
    "config/config.toml",
    "./config.toml",
];

/// A mergeable TOML configuration naming the providers to load.
///
/// # Examples
///
/// ```
/// use iprovision::ProvisionConfig;
///
/// let mut base = ProvisionConfig::from_str(r#"
///     [provisioning]
///     providers = ["database", "cache"]
/// "#).unwrap();
///
/// let overlay = ProvisionConfig::from_str(r#"
///     [provisioning]
///     providers = ["mailer", "cache"]
/// "#).unwrap();
///
/// base.merge(overlay);
///
/// assert_eq!(
///     base.providers().unwrap(),
///     vec!["database", "cache", "mailer", "cache"]
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    #[serde(flatten)]
    value: Value,
}

#[derive(Debug, Default, Deserialize)]
struct ProvisioningSection {
    #[serde(default)]
    providers: Vec<String>,
}

impl fmt::Display for ProvisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        ProvisionConfig {
            value: Value::Table(toml::Table::new()),
        }
    }
}

impl ProvisionConfig {
    pub fn from_str(s: &str) -> Result<Self, anyhow::Error> {
        let value = toml::from_str(s)?;
        Ok(Self { value })
    }

    pub fn from_file<P: AsRef<Path>>(fname: P) -> Result<Self, anyhow::Error> {
        let path = fname.as_ref();
        if !path.exists() {
            return Err(anyhow::anyhow!("File {} does not exist", path.display()));
        }
        let config = std::fs::read_to_string(path)?;
        Self::from_str(&config).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Deep merge `other` into this config.
    ///
    /// Tables merge recursively, arrays concatenate, anything else is replaced by
    /// the value from `other`.
    pub fn merge(&mut self, other: Self) {
        self.value = merge_values(&self.value, &other.value);
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get a value by dotted path (e.g., "provisioning.providers")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.value;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Deserialize the table at `prefix`, or the whole config when `prefix` is empty.
    pub fn section<T: DeserializeOwned>(&self, prefix: &str) -> Result<T, anyhow::Error> {
        let part = if prefix.is_empty() {
            &self.value
        } else {
            self.get(prefix)
                .ok_or_else(|| anyhow::anyhow!("No config found for {}", prefix))?
        };

        let json = serde_json::to_value(part)
            .map_err(|e| anyhow::anyhow!("Failed to convert to json: {}", e))?;
        serde_json::from_value(json)
            .map_err(|e| anyhow::anyhow!("Invalid config for {}: {}", prefix, e))
    }

    /// Provider identifiers listed under `[provisioning] providers`, duplicates included.
    pub fn providers(&self) -> Result<Vec<String>, anyhow::Error> {
        if self.get("provisioning").is_none() {
            return Ok(Vec::new());
        }
        let section: ProvisioningSection = self.section("provisioning")?;
        Ok(section.providers)
    }
}

fn merge_values(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Table(a_map), Value::Table(b_map)) => {
            let mut result: BTreeMap<String, Value> =
                a_map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

            for (k, v) in b_map {
                let merged = match result.get(k) {
                    Some(existing) => merge_values(existing, v),
                    None => v.clone(),
                };
                result.insert(k.clone(), merged);
            }

            Value::Table(result.into_iter().collect())
        }
        (Value::Array(a_vec), Value::Array(b_vec)) => {
            let mut result = a_vec.clone();
            result.extend(b_vec.iter().cloned());
            Value::Array(result)
        }
        _ => b.clone(),
    }
}

/// Merge every existing file in `paths`, in order.
pub fn load_from<P: AsRef<Path>>(paths: &[P]) -> Result<ProvisionConfig, anyhow::Error> {
    let mut merged: Option<ProvisionConfig> = None;
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            continue;
        }
        debug!(path = %path.display(), "loading provisioning config");
        let config = ProvisionConfig::from_file(path)?;
        match merged.as_mut() {
            Some(base) => base.merge(config),
            None => merged = Some(config),
        }
    }
    merged.ok_or_else(|| anyhow::anyhow!("No config file found"))
}

/// Load and merge the config files found at [`CONFIG_LOCATIONS`].
pub fn load() -> Result<ProvisionConfig, anyhow::Error> {
    load_from(&CONFIG_LOCATIONS)
}
