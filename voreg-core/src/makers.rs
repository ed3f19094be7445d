//! Per-kind resource document assembly.
//!
//! One handler per resource kind, registered in a table built once at
//! startup. Specialization is explicit: a handler that extends another kind
//! calls `RecordAssembler::append_for` on its parent kind itself, then
//! appends its own substructure. A handler that forgets to chain silently
//! loses the parent's fields; that is part of the handler-authoring
//! contract, not something the table compensates for.

use crate::builder::{self, BuildContext, BuildMode};
use crate::capabilities::CapabilityAssembler;
use crate::config::RegistryConfig;
use crate::error::BuildError;
use crate::meta::MetaScope;
use crate::model::{doc, ri, vg, vr, vs, vstd};
use crate::resolve::KindResolver;
use crate::resource::{DependencyCache, NoPrerequisites, PrerequisiteLoader, Resource};
use crate::tableset;
use crate::xml::Node;
use std::collections::BTreeSet;

/// The resource-kind vocabulary.
pub mod kind {
    pub const SERVICE: &str = "service";
    pub const DATA_SERVICE: &str = "data-service";
    pub const CATALOG_SERVICE: &str = "catalog-service";
    pub const REGISTRY: &str = "registry";
    pub const ORGANIZATION: &str = "organization";
    pub const AUTHORITY: &str = "authority";
    pub const STANDARD: &str = "standard";
    pub const DOCUMENT: &str = "document";
    pub const DELETED: &str = "deleted";
    pub const TABLE: &str = "table";
    pub const DATA: &str = "data";
}

pub trait ResourceMaker: Send + Sync {
    /// The resource element for this kind, type attribute included.
    fn element(&self) -> Node;

    /// Tombstone kinds produce no document body at all.
    fn tombstone(&self) -> bool {
        false
    }

    /// Append this kind's substructure to the document under construction.
    /// The common base (attributes, validation marker, curation and content)
    /// has already been applied when this is called.
    fn append(
        &self,
        asm: &RecordAssembler,
        document: &mut Node,
        set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError>;
}

struct ServiceMaker;

impl ResourceMaker for ServiceMaker {
    fn element(&self) -> Node {
        vs::data_service()
    }

    fn append(
        &self,
        asm: &RecordAssembler,
        document: &mut Node,
        set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        document.push(builder::rights_builder().build(&ctx.resource.meta, ctx)?);
        for publication in ctx.resource.publications_for_sets(set_names) {
            let pctx = ctx.for_publication(publication);
            document.push(asm.capabilities().capability(publication, &pctx)?);
        }
        Ok(())
    }
}

/// Services with instrument/facility/coverage metadata but no tables.
struct DataServiceMaker;

impl ResourceMaker for DataServiceMaker {
    fn element(&self) -> Node {
        vs::data_service()
    }

    fn append(
        &self,
        asm: &RecordAssembler,
        document: &mut Node,
        set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        asm.append_for(kind::SERVICE, document, set_names, ctx)?;
        document.push(builder::org_meta_builder().build(&ctx.resource.meta, ctx)?);
        document.push(builder::coverage_meta_builder().build(&ctx.resource.meta, ctx)?);
        Ok(())
    }
}

struct CatalogServiceMaker;

impl ResourceMaker for CatalogServiceMaker {
    fn element(&self) -> Node {
        vs::catalog_service()
    }

    fn append(
        &self,
        asm: &RecordAssembler,
        document: &mut Node,
        set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        asm.append_for(kind::DATA_SERVICE, document, set_names, ctx)?;
        document.push(tableset::table_set(&ctx.resource.schemas));
        Ok(())
    }
}

struct RegistryMaker;

impl ResourceMaker for RegistryMaker {
    fn element(&self) -> Node {
        vg::registry_resource()
    }

    fn append(
        &self,
        asm: &RecordAssembler,
        document: &mut Node,
        set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        asm.append_for(kind::SERVICE, document, set_names, ctx)?;
        document.push(vg::full().with_text(ctx.resource.meta.text_or("full", "false")));
        document.push(builder::registry_meta_builder().build(&ctx.resource.meta, ctx)?);
        document.push(tableset::table_set(&ctx.resource.schemas));
        Ok(())
    }
}

struct OrganizationMaker;

impl ResourceMaker for OrganizationMaker {
    fn element(&self) -> Node {
        vr::organisation()
    }

    fn append(
        &self,
        _asm: &RecordAssembler,
        document: &mut Node,
        _set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        document.push(builder::org_meta_builder().build(&ctx.resource.meta, ctx)?);
        Ok(())
    }
}

struct AuthorityMaker;

impl ResourceMaker for AuthorityMaker {
    fn element(&self) -> Node {
        vg::authority_resource()
    }

    fn append(
        &self,
        _asm: &RecordAssembler,
        document: &mut Node,
        _set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        document.push(
            vg::managing_org()
                .opt_attr("ivo-id", ctx.resource.meta.text("managingOrg.ivoId", false))
                .with_text(ctx.resource.meta.text_or("managingOrg", "")),
        );
        Ok(())
    }
}

struct StandardMaker;

impl ResourceMaker for StandardMaker {
    fn element(&self) -> Node {
        vstd::standard_resource()
    }

    fn append(
        &self,
        _asm: &RecordAssembler,
        document: &mut Node,
        _set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        document.push(builder::standards_meta_builder().build(&ctx.resource.meta, ctx)?);
        Ok(())
    }
}

/// Documents run the full catalog-service chain under their own element.
struct DocumentMaker;

impl ResourceMaker for DocumentMaker {
    fn element(&self) -> Node {
        doc::document_resource()
    }

    fn append(
        &self,
        asm: &RecordAssembler,
        document: &mut Node,
        set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        asm.append_for(kind::CATALOG_SERVICE, document, set_names, ctx)
    }
}

struct DeletedMaker;

impl ResourceMaker for DeletedMaker {
    fn element(&self) -> Node {
        ri::resource()
    }

    fn tombstone(&self) -> bool {
        true
    }

    fn append(
        &self,
        _asm: &RecordAssembler,
        _document: &mut Node,
        _set_names: &BTreeSet<String>,
        _ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        Ok(())
    }
}

/// Data collections (published tables and data descriptors) render as
/// catalog resources: capabilities, organizational metadata, coverage and
/// the table set, but no specialized service chain.
struct DataCollectionMaker;

impl ResourceMaker for DataCollectionMaker {
    fn element(&self) -> Node {
        vs::catalog_resource()
    }

    fn append(
        &self,
        asm: &RecordAssembler,
        document: &mut Node,
        set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        for publication in ctx.resource.publications_for_sets(set_names) {
            let pctx = ctx.for_publication(publication);
            document.push(asm.capabilities().capability(publication, &pctx)?);
        }
        document.push(builder::org_meta_builder().build(&ctx.resource.meta, ctx)?);
        document.push(builder::coverage_meta_builder().build(&ctx.resource.meta, ctx)?);
        document.push(tableset::table_set(&ctx.resource.schemas));
        Ok(())
    }
}

fn builtin_makers() -> KindResolver<Box<dyn ResourceMaker>> {
    let mut r: KindResolver<Box<dyn ResourceMaker>> = KindResolver::new();
    r.register(kind::SERVICE, Box::new(ServiceMaker));
    r.register(kind::DATA_SERVICE, Box::new(DataServiceMaker));
    r.register(kind::CATALOG_SERVICE, Box::new(CatalogServiceMaker));
    r.register(kind::REGISTRY, Box::new(RegistryMaker));
    r.register(kind::ORGANIZATION, Box::new(OrganizationMaker));
    r.register(kind::AUTHORITY, Box::new(AuthorityMaker));
    r.register(kind::STANDARD, Box::new(StandardMaker));
    r.register(kind::DOCUMENT, Box::new(DocumentMaker));
    r.register(kind::DELETED, Box::new(DeletedMaker));
    r.register(kind::TABLE, Box::new(DataCollectionMaker));
    r.register(kind::DATA, Box::new(DataCollectionMaker));
    r
}

/// The facade turning resources into resource-description documents.
///
/// Holds the registration tables, the process configuration and the
/// prerequisite cache; one instance serves a whole process.
pub struct RecordAssembler {
    config: RegistryConfig,
    makers: KindResolver<Box<dyn ResourceMaker>>,
    capabilities: CapabilityAssembler,
    dependencies: DependencyCache,
    loader: Box<dyn PrerequisiteLoader>,
}

impl RecordAssembler {
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_loader(config, Box::new(NoPrerequisites))
    }

    pub fn with_loader(config: RegistryConfig, loader: Box<dyn PrerequisiteLoader>) -> Self {
        Self {
            config,
            makers: builtin_makers(),
            capabilities: CapabilityAssembler::builtin(),
            dependencies: DependencyCache::new(),
            loader,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &CapabilityAssembler {
        &self.capabilities
    }

    /// The resource-description document for `resource`, filtered to the
    /// requested set names; `None` for tombstone kinds.
    pub fn resource_document(
        &self,
        resource: &Resource,
        set_names: &BTreeSet<String>,
        mode: BuildMode,
    ) -> Result<Option<Node>, BuildError> {
        let kind = resource.kind();
        let maker = self.makers.resolve(&kind)?;
        if maker.tombstone() {
            return Ok(None);
        }

        self.dependencies
            .ensure(&resource.collection, self.loader.as_ref())
            .map_err(|e| BuildError::Prerequisite {
                collection: resource.collection.clone(),
                reason: e.to_string(),
            })?;

        let ctx = BuildContext::new(&self.config, mode, resource);
        let mut document = maker
            .element()
            .opt_attr("created", resource.meta.text("creationDate", true))
            .opt_attr("updated", resource.meta.text("_metadataUpdated", true))
            .attr("status", resource.status.as_str());
        if let Some(level) = resource.meta.text("validationLevel", false) {
            document.push(
                vr::validation_level()
                    .opt_attr("validatedBy", resource.meta.text("validatedBy", false))
                    .with_text(level),
            );
        }
        document.push(builder::vor_resource_builder().build(&resource.meta, &ctx)?);
        maker.append(self, &mut document, set_names, &ctx)?;
        document.finalize();
        Ok(Some(document))
    }

    /// Run another kind's append step; how specialized handlers chain to
    /// their parent kind.
    pub fn append_for(
        &self,
        kind: &str,
        document: &mut Node,
        set_names: &BTreeSet<String>,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        self.makers.resolve(kind)?.append(self, document, set_names, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::mech;
    use crate::resource::{default_sets, Publication, MANAGED_SET};
    use crate::tableset::{ColumnDef, SchemaDef, TableDef};

    fn catalog_service() -> Resource {
        let mut res = Resource::new("surveys/dr3", "main", kind::CATALOG_SERVICE);
        res.meta.set("title", "DR3 catalog");
        res.meta.set("creationDate", "2020-05-05T10:00:00Z");
        res.meta.set("_metadataUpdated", "2024-01-01T00:00:00Z");
        res.meta.add("rights", "CC-BY 4.0");
        res.meta.set("description", "The third data release.");
        res.publications.push(
            Publication::new(mech::TABLE_ACCESS, [MANAGED_SET])
                .with_meta("accessURL", "http://dc.example.org/tap")
                .with_meta("description", "TAP access to DR3."),
        );
        res.schemas.push(SchemaDef {
            name: "dr3".to_string(),
            tables: vec![TableDef {
                name: "dr3.main".to_string(),
                columns: vec![ColumnDef {
                    name: "source_id".to_string(),
                    datatype: "long".to_string(),
                    primary: true,
                    required: true,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        });
        res
    }

    fn document_for(res: &Resource) -> Node {
        RecordAssembler::new(RegistryConfig::default())
            .resource_document(res, &default_sets(), BuildMode::Lenient)
            .unwrap()
            .unwrap()
    }

    fn children_named<'a>(node: &'a Node, name: &str) -> Vec<&'a Node> {
        node.children().iter().filter(|c| c.name() == name).collect()
    }

    #[test]
    fn catalog_service_document_has_the_full_chain() {
        let res = catalog_service();
        let document = document_for(&res);

        assert_eq!(document.attr_value("xsi:type").unwrap(), "vs:CatalogService");
        assert_eq!(document.attr_value("status").unwrap(), "active");
        assert_eq!(
            document.attr_value("created").unwrap(),
            "2020-05-05T10:00:00Z"
        );

        // base fields
        assert_eq!(children_named(&document, "title").len(), 1);
        assert_eq!(children_named(&document, "content").len(), 1);
        // service-level contributions survive the specializations
        assert_eq!(children_named(&document, "rights").len(), 1);
        let caps = children_named(&document, "capability");
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].attr_value("xsi:type").unwrap(), "tr:TableAccess");
        // the catalog-specific table set, non-empty
        let tablesets = children_named(&document, "tableset");
        assert_eq!(tablesets.len(), 1);
        assert!(!tablesets[0].children().is_empty());
    }

    #[test]
    fn set_filtering_controls_capabilities() {
        let mut res = catalog_service();
        res.publications
            .push(Publication::new(mech::FORM, ["local"]).with_meta(
                "accessURL",
                "http://dc.example.org/form",
            ));
        let document = document_for(&res);
        // the local-only publication is not in the managed set
        assert_eq!(children_named(&document, "capability").len(), 1);
    }

    #[test]
    fn deleted_kind_is_a_tombstone() {
        let res = Resource::deleted_placeholder("ivo://org.example/x", "2024-01-01T00:00:00Z");
        let out = RecordAssembler::new(RegistryConfig::default())
            .resource_document(&res, &default_sets(), BuildMode::Lenient)
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn unknown_kind_is_fatal() {
        let mut res = catalog_service();
        res.meta.set("kind", "interpretive-dance");
        let err = RecordAssembler::new(RegistryConfig::default())
            .resource_document(&res, &default_sets(), BuildMode::Lenient)
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownKind(k) if k == "interpretive-dance"));
    }

    #[test]
    fn organization_documents_skip_service_structure() {
        let mut res = Resource::new("orgs", "obs", kind::ORGANIZATION);
        res.meta.set("title", "Example Observatory");
        res.meta.add("facility", "The 2.2m telescope");
        let document = document_for(&res);
        assert_eq!(document.attr_value("xsi:type").unwrap(), "vr:Organisation");
        assert_eq!(children_named(&document, "facility").len(), 1);
        assert!(children_named(&document, "capability").is_empty());
        assert!(children_named(&document, "tableset").is_empty());
    }

    #[test]
    fn registry_document_declares_managed_authorities() {
        let mut res = Resource::new("registry", "main", kind::REGISTRY);
        res.meta.set("title", "Example publishing registry");
        res.meta.add("managedAuthority", "org.example");
        res.meta.add("managedAuthority", "org.partner");
        res.publications.push(
            Publication::new(mech::HARVEST, [MANAGED_SET])
                .with_meta("accessURL", "http://dc.example.org/oai"),
        );
        let document = document_for(&res);
        assert_eq!(document.attr_value("xsi:type").unwrap(), "vg:Registry");
        assert_eq!(children_named(&document, "managedAuthority").len(), 2);
        assert_eq!(children_named(&document, "full").len(), 1);
        let caps = children_named(&document, "capability");
        assert_eq!(caps[0].attr_value("xsi:type").unwrap(), "vg:Harvest");
    }

    #[test]
    fn table_kind_renders_as_catalog_resource_with_capabilities() {
        let mut res = catalog_service();
        res.meta.set("kind", kind::TABLE);
        let document = document_for(&res);
        assert_eq!(
            document.attr_value("xsi:type").unwrap(),
            "vs:CatalogResource"
        );
        assert_eq!(children_named(&document, "capability").len(), 1);
        assert_eq!(children_named(&document, "tableset").len(), 1);
        // rights only come from the service chain
        assert!(children_named(&document, "rights").is_empty());
    }

    #[test]
    fn document_kind_extends_the_catalog_chain() {
        let mut res = catalog_service();
        res.meta.set("kind", kind::DOCUMENT);
        let document = document_for(&res);
        assert_eq!(document.attr_value("xsi:type").unwrap(), "doc:Document");
        assert_eq!(children_named(&document, "rights").len(), 1);
        assert_eq!(children_named(&document, "tableset").len(), 1);
    }

    #[test]
    fn documents_are_idempotent() {
        let res = catalog_service();
        let a = document_for(&res).to_xml().unwrap();
        let b = document_for(&res).to_xml().unwrap();
        assert_eq!(a, b);
    }
}
