//! Compatibility gate between package manifests and the running core.
//!
//! Rules, in order:
//! 1. an empty manifest is compatible;
//! 2. `min_core_version` requires `host >= min`;
//! 3. otherwise an explicit version list requires an exact match;
//! 4. otherwise the package is compatible.
//!
//! The gate never fails. A manifest it cannot make sense of (not a mapping,
//! or a rule of the wrong shape) is treated as incompatible.

use serde_json::Value;

use super::manifest::{Manifest, COMPATIBLE_VERSIONS_KEYS, MIN_CORE_VERSION_KEY};
use crate::core::Version;

/// Check a manifest against the host's version.
pub fn is_compatible(manifest: &Manifest, host_version: &str) -> bool {
    evaluate(manifest, &Version::parse(host_version)).unwrap_or(false)
}

/// `None` means the manifest was malformed in a way the rules cannot judge.
fn evaluate(manifest: &Manifest, host: &Version) -> Option<bool> {
    if manifest.is_empty() {
        return Some(true);
    }
    let map = manifest.as_map()?;

    if let Some(min) = map.get(MIN_CORE_VERSION_KEY).filter(|v| is_truthy(v)) {
        let min = scalar_to_string(min)?;
        return Some(*host >= Version::parse(&min));
    }

    let listed = COMPATIBLE_VERSIONS_KEYS.iter().find_map(|key| map.get(*key).filter(|v| is_truthy(v)));
    if let Some(listed) = listed {
        let versions = listed.as_array()?;
        let matched = versions
            .iter()
            .filter_map(scalar_to_string)
            .any(|v| Version::parse(&v) == *host);
        return Some(matched);
    }

    Some(true)
}

fn is_truthy(value: &Value) -> bool {
    !Manifest::new(value.clone()).is_empty()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
