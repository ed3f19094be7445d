//! The describable-resource domain model: resources, their publications, and
//! the prerequisite warm cache used when records are built.

use crate::meta::{MetaBlock, MetaScope};
use crate::tableset::SchemaDef;
use anyhow::anyhow;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// The group every publicly registered publication belongs to by default.
pub const MANAGED_SET: &str = "managed";

/// The requested-set default: publicly managed records only.
pub fn default_sets() -> BTreeSet<String> {
    BTreeSet::from([MANAGED_SET.to_string()])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    Active,
    Deleted,
}

impl ResourceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceStatus::Active => "active",
            ResourceStatus::Deleted => "deleted",
        }
    }
}

/// One binding of a resource to a publishing mechanism.
///
/// A publication belongs to exactly one resource and one mechanism key. Its
/// own metadata block carries the access-level keys (`accessURL`,
/// `mirrorURL`, `description`, request/result types); set membership controls
/// which harvesting queries see it.
#[derive(Debug, Clone)]
pub struct Publication {
    pub mechanism: String,
    pub sets: BTreeSet<String>,
    pub auxiliary: bool,
    /// When set, this publication actually describes a different resource
    /// than its syntactic parent (input parameters come from there).
    pub target: Option<Arc<Resource>>,
    pub meta: MetaBlock,
}

impl Publication {
    pub fn new(mechanism: impl Into<String>, sets: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            mechanism: mechanism.into(),
            sets: sets.into_iter().map(str::to_string).collect(),
            auxiliary: false,
            target: None,
            meta: MetaBlock::new(),
        }
    }

    pub fn auxiliary(mut self) -> Self {
        self.auxiliary = true;
        self
    }

    pub fn with_meta(mut self, key: &str, value: &str) -> Self {
        self.meta.add(key, value);
        self
    }

    /// True if this publication is a member of any of `names`.
    pub fn in_any_set(&self, names: &BTreeSet<String>) -> bool {
        !self.sets.is_disjoint(names)
    }
}

/// Anything that can be described by a resource record.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Identity of the resource collection this resource comes from.
    pub collection: String,
    /// Local id within the collection.
    pub id: String,
    /// Kind used when no explicit `kind` meta overrides it.
    pub default_kind: String,
    pub status: ResourceStatus,
    /// Root access URL, when the resource is reachable at all; derived URLs
    /// (footprint endpoints and the like) hang off this.
    pub base_url: Option<String>,
    pub meta: MetaBlock,
    pub publications: Vec<Publication>,
    pub schemas: Vec<SchemaDef>,
}

impl Resource {
    pub fn new(
        collection: impl Into<String>,
        id: impl Into<String>,
        default_kind: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            default_kind: default_kind.into(),
            status: ResourceStatus::Active,
            base_url: None,
            meta: MetaBlock::new(),
            publications: Vec::new(),
            schemas: Vec::new(),
        }
    }

    /// The kind tag selecting the document family: an explicit `kind` meta
    /// wins over the inferred default.
    pub fn kind(&self) -> String {
        self.meta
            .text("kind", false)
            .unwrap_or_else(|| self.default_kind.clone())
    }

    pub fn ivoid(&self) -> Option<String> {
        self.meta.text("identifier", true)
    }

    pub fn qualified_id(&self) -> String {
        format!("{}#{}", self.collection, self.id)
    }

    pub fn publications_for_sets<'a>(
        &'a self,
        names: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a Publication> {
        self.publications.iter().filter(move |p| p.in_any_set(names))
    }

    /// A URL derived from the resource's base access path, `None` when the
    /// resource is not reachable over the web at all.
    pub fn derived_url(&self, suffix: &str) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), suffix))
    }

    /// The remainder of a dropped resource: enough identity to publish a
    /// tombstone header, no metadata body.
    pub fn deleted_placeholder(ivoid: &str, record_timestamp: &str) -> Self {
        let mut res = Resource::new("deleted", ivoid.rsplit('/').next().unwrap_or(ivoid), "deleted");
        res.status = ResourceStatus::Deleted;
        res.meta.set("identifier", ivoid);
        res.meta.set("_metadataUpdated", record_timestamp);
        res
    }
}

/// Loads the prerequisite collections a resource collection depends on.
///
/// This is the only seam through which record building touches anything
/// resembling I/O; implementations are expected to be idempotent.
pub trait PrerequisiteLoader: Send + Sync {
    /// Collections that must be warm before records from `collection` can be
    /// built (typically introduced by served-by relationships).
    fn prerequisites(&self, collection: &str) -> anyhow::Result<Vec<String>>;

    /// Make one prerequisite collection available.
    fn load(&self, collection: &str) -> anyhow::Result<()>;
}

/// A loader for processes whose resources declare no prerequisites.
pub struct NoPrerequisites;

impl PrerequisiteLoader for NoPrerequisites {
    fn prerequisites(&self, _collection: &str) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn load(&self, _collection: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Compute-once map from collection identity to its prerequisite list.
///
/// Owned by the assembler, never attached to the domain objects. Concurrent
/// callers serialize on the single mutex; the loader is consulted at most
/// once per collection.
#[derive(Default)]
pub struct DependencyCache {
    known: Mutex<HashMap<String, Vec<String>>>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure every prerequisite of `collection` has been loaded.
    pub fn ensure(&self, collection: &str, loader: &dyn PrerequisiteLoader) -> anyhow::Result<()> {
        let deps = {
            let mut known = self
                .known
                .lock()
                .map_err(|e| anyhow!("Lock: {}", e))?;
            match known.get(collection) {
                Some(deps) => deps.clone(),
                None => {
                    let deps = loader.prerequisites(collection)?;
                    tracing::debug!(collection, count = deps.len(), "prerequisites resolved");
                    known.insert(collection.to_string(), deps.clone());
                    deps
                }
            }
        };
        for dep in &deps {
            loader.load(dep)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn explicit_kind_meta_overrides_the_default() {
        let mut res = Resource::new("surveys/dr3", "cone", "catalog-service");
        assert_eq!(res.kind(), "catalog-service");
        res.meta.set("kind", "data-service");
        assert_eq!(res.kind(), "data-service");
    }

    #[test]
    fn set_filtering_is_by_intersection() {
        let mut res = Resource::new("surveys/dr3", "cone", "catalog-service");
        res.publications
            .push(Publication::new("cone-search", [MANAGED_SET]));
        res.publications
            .push(Publication::new("form", ["local"]));

        let names = default_sets();
        let mechanisms: Vec<_> = res
            .publications_for_sets(&names)
            .map(|p| p.mechanism.as_str())
            .collect();
        assert_eq!(mechanisms, ["cone-search"]);
    }

    #[test]
    fn derived_urls_need_a_base() {
        let mut res = Resource::new("surveys/dr3", "cone", "catalog-service");
        assert!(res.derived_url("coverage").is_none());
        res.base_url = Some("http://dc.example.org/surveys/dr3/q".to_string());
        assert_eq!(
            res.derived_url("coverage").unwrap(),
            "http://dc.example.org/surveys/dr3/q/coverage"
        );
    }

    #[test]
    fn deleted_placeholder_keeps_identity_only() {
        let res = Resource::deleted_placeholder("ivo://org.example/surveys/dr3/cone", "2024-05-01T12:00:00Z");
        assert_eq!(res.status, ResourceStatus::Deleted);
        assert_eq!(res.kind(), "deleted");
        assert_eq!(res.ivoid().unwrap(), "ivo://org.example/surveys/dr3/cone");
        assert!(res.publications.is_empty());
    }

    struct CountingLoader {
        asked: AtomicUsize,
        loaded: AtomicUsize,
    }

    impl PrerequisiteLoader for CountingLoader {
        fn prerequisites(&self, _collection: &str) -> anyhow::Result<Vec<String>> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["base/tap".to_string()])
        }

        fn load(&self, _collection: &str) -> anyhow::Result<()> {
            self.loaded.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn prerequisites_are_resolved_once_per_collection() {
        let cache = DependencyCache::new();
        let loader = CountingLoader {
            asked: AtomicUsize::new(0),
            loaded: AtomicUsize::new(0),
        };
        cache.ensure("surveys/dr3", &loader).unwrap();
        cache.ensure("surveys/dr3", &loader).unwrap();
        cache.ensure("other/rd", &loader).unwrap();
        assert_eq!(loader.asked.load(Ordering::SeqCst), 2);
        // loads stay idempotent on the loader side, the cache does not dedupe them
        assert_eq!(loader.loaded.load(Ordering::SeqCst), 3);
    }
}
