//! Capability table: the allow-list a surface is allowed to see
//!
//! Built once with `CapabilityTableBuilder`, then frozen into an
//! `ExposedWorld`. The world has no mutating API; anything not in the table
//! does not resolve.

use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::bridge::{BridgeError, ScanVerdict};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    #[error("'{namespace}.{name}' is not exposed")]
    Unresolved { namespace: String, name: String },
    /// The capability resolved but the host rejected the call
    #[error(transparent)]
    Rejected(#[from] BridgeError),
}

pub type CapabilityFn =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<ScanVerdict, BridgeError>> + Send + Sync>;

// =============================================================================
// Builder
// =============================================================================

pub struct CapabilityTableBuilder {
    namespaces: BTreeMap<String, BTreeMap<String, CapabilityFn>>,
}

impl CapabilityTableBuilder {
    pub fn new() -> Self {
        Self {
            namespaces: BTreeMap::new(),
        }
    }

    /// Add `namespace.name`; a later entry with the same key wins
    pub fn expose(mut self, namespace: &str, name: &str, capability: CapabilityFn) -> Self {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), capability);
        self
    }

    /// Freeze the table
    pub fn build(self) -> ExposedWorld {
        ExposedWorld {
            namespaces: Arc::new(self.namespaces),
        }
    }
}

impl Default for CapabilityTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ExposedWorld
// =============================================================================

/// Read-only view of what one surface can call
#[derive(Clone)]
pub struct ExposedWorld {
    namespaces: Arc<BTreeMap<String, BTreeMap<String, CapabilityFn>>>,
}

impl ExposedWorld {
    pub fn builder() -> CapabilityTableBuilder {
        CapabilityTableBuilder::new()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn names(&self, namespace: &str) -> Vec<&str> {
        self.namespaces
            .get(namespace)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn resolve(&self, namespace: &str, name: &str) -> Result<CapabilityFn, CapabilityError> {
        self.namespaces
            .get(namespace)
            .and_then(|table| table.get(name))
            .cloned()
            .ok_or_else(|| CapabilityError::Unresolved {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    /// Resolve and call in one step
    pub async fn call(
        &self,
        namespace: &str,
        name: &str,
        arg: impl Into<String>,
    ) -> Result<ScanVerdict, CapabilityError> {
        let capability = self.resolve(namespace, name)?;
        Ok(capability(arg.into()).await?)
    }
}

impl fmt::Debug for ExposedWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (namespace, table) in self.namespaces.iter() {
            map.entry(namespace, &table.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;

    fn constant(value: &'static str) -> CapabilityFn {
        Arc::new(move |_arg: String| {
            async move { Ok::<_, BridgeError>(ScanVerdict::new(json!(value))) }.boxed()
        })
    }

    #[tokio::test]
    async fn test_exposed_capability_resolves() {
        let world = ExposedWorld::builder()
            .expose("demo", "ping", constant("pong"))
            .build();

        let verdict = world.call("demo", "ping", "").await.unwrap();
        assert_eq!(verdict.into_value(), json!("pong"));
    }

    #[tokio::test]
    async fn test_unlisted_capability_is_unresolved() {
        let world = ExposedWorld::builder()
            .expose("demo", "ping", constant("pong"))
            .build();

        let missing_name = world.call("demo", "readFile", "/etc/hosts").await;
        let missing_ns = world.call("process", "exit", "").await;

        assert_eq!(
            missing_name.unwrap_err(),
            CapabilityError::Unresolved {
                namespace: "demo".into(),
                name: "readFile".into()
            }
        );
        assert!(matches!(
            missing_ns,
            Err(CapabilityError::Unresolved { .. })
        ));
    }

    #[test]
    fn test_clones_share_the_frozen_table() {
        let world = ExposedWorld::builder()
            .expose("a", "x", constant("1"))
            .expose("a", "y", constant("2"))
            .expose("b", "z", constant("3"))
            .build();
        let copy = world.clone();

        assert_eq!(copy.namespaces().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(copy.names("a"), vec!["x", "y"]);
        assert!(copy.names("c").is_empty());
    }

    #[tokio::test]
    async fn test_host_rejection_is_wrapped() {
        let failing: CapabilityFn =
            Arc::new(|_arg: String| async { Err::<ScanVerdict, _>(BridgeError::Disconnected) }.boxed());
        let world = ExposedWorld::builder().expose("demo", "scan", failing).build();

        let err = world.call("demo", "scan", "x").await.unwrap_err();
        assert_eq!(err, CapabilityError::Rejected(BridgeError::Disconnected));
    }
}
