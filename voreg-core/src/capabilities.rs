//! Capability and interface assembly.
//!
//! Every publication of a resource translates to one capability with (at
//! least) one interface. The mechanism key picks the makers: capabilities
//! resolve hard (an unknown mechanism cannot be rendered), interfaces fall
//! back to a plain parameterized-HTTP form. Auxiliary publications bypass
//! the mechanism's capability maker and produce the reduced standard-id-only
//! form, or nothing when the mechanism declares no auxiliary identifier.

use crate::builder::{tap_model_builder, BuildContext};
use crate::error::BuildError;
use crate::meta::MetaScope;
use crate::model::{cs, doc, sia, slap, ssap, std_ids, tr, vg, vr, vs};
use crate::resolve::KindResolver;
use crate::resource::{Publication, Resource};
use crate::tableset;
use crate::xml::Node;
use std::collections::BTreeMap;
use url::Url;

/// The publishing-mechanism vocabulary.
pub mod mech {
    pub const IMAGE_ACCESS: &str = "image-access";
    pub const CONE_SEARCH: &str = "cone-search";
    pub const SPECTRAL_ACCESS: &str = "spectral-access";
    pub const LINE_ACCESS: &str = "line-access";
    pub const TABLE_ACCESS: &str = "table-access";
    pub const LINK_METADATA: &str = "link-metadata";
    pub const SODA_SYNC: &str = "synchronous-soda";
    pub const SODA_ASYNC: &str = "asynchronous-soda";
    pub const STATIC: &str = "static";
    pub const FORM: &str = "form";
    pub const CUSTOM: &str = "custom";
    pub const EXTERNAL: &str = "external";
    pub const DOC_FORM: &str = "documentation-form";
    pub const AVAILABILITY: &str = "availability";
    pub const CAPABILITIES: &str = "capabilities";
    pub const TABLE_METADATA: &str = "table-metadata";
    pub const HARVEST: &str = "harvest";
    pub const EDITION: &str = "edition";
}

/// The resource whose declared input parameters a publication exposes: its
/// secondary target when one is set, otherwise the resource being built.
fn param_source<'a>(publication: &'a Publication, ctx: &BuildContext<'a>) -> &'a Resource {
    publication.target.as_deref().unwrap_or(ctx.resource)
}

// ── access URLs ──

fn apply_short_alias(access_url: &str, aliases: &BTreeMap<String, String>) -> String {
    let Ok(mut url) = Url::parse(access_url) else {
        return access_url.to_string();
    };
    let local = url.path().trim_start_matches('/').to_string();
    match aliases.get(&local) {
        Some(short) => {
            // query strings survive untouched, including a bare trailing
            // '?' or '&' some protocols require
            url.set_path(short);
            url.to_string()
        }
        None => access_url.to_string(),
    }
}

fn switch_protocol(access_url: &str) -> Option<String> {
    let mut url = Url::parse(access_url).ok()?;
    let switched = match url.scheme() {
        "http" => "https",
        "https" => "http",
        _ => return None,
    };
    url.set_scheme(switched).ok()?;
    Some(url.to_string())
}

fn published_access_url(
    publication: &Publication,
    ctx: &BuildContext<'_>,
) -> Result<String, BuildError> {
    let raw = publication
        .meta
        .text("accessURL", false)
        .ok_or_else(|| BuildError::MissingMeta("accessURL".to_string()))?;
    Ok(apply_short_alias(&raw, &ctx.config.short_aliases))
}

/// Shared interface construction: access URL, security method, mirrors.
/// A mirror equal to the primary access URL is dropped.
fn base_interface(
    element: Node,
    publication: &Publication,
    ctx: &BuildContext<'_>,
) -> Result<Node, BuildError> {
    let access_url = published_access_url(publication, ctx)?;
    let mut interface = element.with(
        vr::access_url()
            .opt_attr("use", publication.meta.text("urlUse", false))
            .with_text(&access_url),
    );
    if let Some(sec) = publication.meta.text("securityId", false) {
        interface.push(vr::security_method().attr("standardID", sec));
    }
    for mirror in publication.meta.values("mirrorURL", false) {
        if !mirror.content.is_empty() && mirror.content != access_url {
            interface.push(vr::mirror_url().with_text(&mirror.content));
        }
    }
    if ctx.config.mirror_alternate_protocol {
        // external URLs on other schemes simply cannot be switched
        if let Some(alt) = switch_protocol(&access_url) {
            interface.push(vr::mirror_url().with_text(alt));
        }
    }
    Ok(interface)
}

// ── interface makers ──

pub trait InterfaceMaker: Send + Sync {
    fn make(&self, publication: &Publication, ctx: &BuildContext<'_>) -> Result<Node, BuildError>;
}

fn input_params(src: &Resource) -> Vec<Node> {
    src.meta
        .values("inputParam", false)
        .iter()
        .map(|v| {
            vs::param()
                .attr(
                    "std",
                    if v.child_text("std") == Some("true") {
                        "true"
                    } else {
                        "false"
                    },
                )
                .with(vs::name().with_text(v.child_text("name").unwrap_or_default()))
                .with(vs::description().with_text(v.child_text("description").unwrap_or_default()))
                .with(vs::unit().with_text(v.child_text("unit").unwrap_or_default()))
                .with(vs::ucd().with_text(v.child_text("ucd").unwrap_or_default()))
                .with(tableset::simple_type(
                    v.child_text("type").unwrap_or("char"),
                    v.child_text("arraysize"),
                ))
        })
        .collect()
}

/// Parameterized HTTP endpoint, query/result types and declared input
/// parameters included. The fallback for unregistered mechanisms.
struct ParamsInterface {
    role: Option<&'static str>,
}

impl InterfaceMaker for ParamsInterface {
    fn make(&self, publication: &Publication, ctx: &BuildContext<'_>) -> Result<Node, BuildError> {
        let element = vs::param_http_interface().opt_attr("role", self.role);
        let mut interface = base_interface(element, publication, ctx)?;
        interface.push(
            vs::query_type()
                .with_text(publication.meta.text("requestMethod", false).unwrap_or_default()),
        );
        interface.push(
            vs::result_type()
                .with_text(publication.meta.text("resultType", false).unwrap_or_default()),
        );
        interface.push(input_params(param_source(publication, ctx)));
        Ok(interface)
    }
}

/// Parameterized HTTP without parameter introspection (the introspection
/// endpoints themselves, and the cutout endpoints, which cannot enumerate
/// their parameters without a dataset identifier).
struct PlainParamsInterface;

impl InterfaceMaker for PlainParamsInterface {
    fn make(&self, publication: &Publication, ctx: &BuildContext<'_>) -> Result<Node, BuildError> {
        base_interface(
            vs::param_http_interface().attr("role", "std"),
            publication,
            ctx,
        )
    }
}

struct BrowserInterface {
    role: Option<&'static str>,
}

impl InterfaceMaker for BrowserInterface {
    fn make(&self, publication: &Publication, ctx: &BuildContext<'_>) -> Result<Node, BuildError> {
        base_interface(
            vr::web_browser().opt_attr("role", self.role),
            publication,
            ctx,
        )
    }
}

struct OaiInterface;

impl InterfaceMaker for OaiInterface {
    fn make(&self, publication: &Publication, ctx: &BuildContext<'_>) -> Result<Node, BuildError> {
        base_interface(vg::oai_http_interface().attr("role", "std"), publication, ctx)
    }
}

const TABLE_ACCESS_VERSION: &str = "1.1";

struct TableAccessInterface;

impl InterfaceMaker for TableAccessInterface {
    fn make(&self, publication: &Publication, ctx: &BuildContext<'_>) -> Result<Node, BuildError> {
        base_interface(
            tr::interface().attr("version", TABLE_ACCESS_VERSION),
            publication,
            ctx,
        )
    }
}

/// The endpoint-declaring experimental interface form for table access.
struct EndpointDeclInterface;

impl InterfaceMaker for EndpointDeclInterface {
    fn make(&self, publication: &Publication, ctx: &BuildContext<'_>) -> Result<Node, BuildError> {
        let mut interface = base_interface(
            tr::dali_interface().attr("version", TABLE_ACCESS_VERSION),
            publication,
            ctx,
        )?;
        for name in ["sync", "async", "tables", "examples"] {
            interface.push(tr::endpoint().with(tr::name().with_text(name)));
        }
        Ok(interface)
    }
}

fn builtin_interfaces() -> KindResolver<Box<dyn InterfaceMaker>> {
    let mut r: KindResolver<Box<dyn InterfaceMaker>> = KindResolver::new();
    for m in [
        mech::IMAGE_ACCESS,
        mech::CONE_SEARCH,
        mech::SPECTRAL_ACCESS,
        mech::LINE_ACCESS,
        mech::LINK_METADATA,
    ] {
        r.register(m, Box::new(ParamsInterface { role: Some("std") }));
    }
    for m in [
        mech::SODA_SYNC,
        mech::SODA_ASYNC,
        mech::AVAILABILITY,
        mech::CAPABILITIES,
        mech::TABLE_METADATA,
    ] {
        r.register(m, Box::new(PlainParamsInterface));
    }
    for m in [
        mech::FORM,
        mech::STATIC,
        mech::CUSTOM,
        mech::EXTERNAL,
        mech::DOC_FORM,
    ] {
        r.register(m, Box::new(BrowserInterface { role: None }));
    }
    r.register(mech::EDITION, Box::new(BrowserInterface { role: Some("rendered") }));
    r.register(mech::TABLE_ACCESS, Box::new(TableAccessInterface));
    r.register(mech::HARVEST, Box::new(OaiInterface));
    r.set_default(Box::new(ParamsInterface { role: None }));
    r
}

// ── capability makers ──

pub trait CapabilityMaker: Send + Sync {
    /// The capability element, standard id and type attributes included.
    fn element(&self) -> Node;

    /// Standard id used when this mechanism appears on auxiliary
    /// publications; none means auxiliary publications emit nothing.
    fn auxiliary_id(&self) -> Option<&'static str> {
        None
    }

    /// Interface elements; a few mechanisms legitimately contribute more
    /// than one.
    fn interfaces(
        &self,
        publication: &Publication,
        ctx: &BuildContext<'_>,
        interfaces: &KindResolver<Box<dyn InterfaceMaker>>,
    ) -> Result<Vec<Node>, BuildError> {
        Ok(vec![interfaces
            .resolve(&publication.mechanism)?
            .make(publication, ctx)?])
    }

    /// Protocol-specific parameter blocks appended after the interfaces.
    fn extend(
        &self,
        cap: &mut Node,
        publication: &Publication,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let _ = (cap, publication, ctx);
        Ok(())
    }
}

/// A capability that needs nothing beyond description and interface.
struct PlainCapability;

impl CapabilityMaker for PlainCapability {
    fn element(&self) -> Node {
        vr::capability()
    }
}

/// A plain capability carrying a fixed standard id.
struct StandardCapability {
    standard_id: &'static str,
}

impl CapabilityMaker for StandardCapability {
    fn element(&self) -> Node {
        vr::capability().attr("standardID", self.standard_id)
    }
}

struct ImageAccessCapability;

impl CapabilityMaker for ImageAccessCapability {
    fn element(&self) -> Node {
        sia::capability()
    }

    fn auxiliary_id(&self) -> Option<&'static str> {
        Some(std_ids::SIA_AUX)
    }

    fn extend(
        &self,
        cap: &mut Node,
        publication: &Publication,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let service = param_source(publication, ctx);
        let meta = &service.meta;
        cap.push(
            sia::image_service_type().with_text(meta.required_text("image.serviceType")?),
        );
        cap.push(
            sia::max_query_region_size()
                .with(sia::long().with_text(
                    meta.text("image.maxQueryRegionSize.long", false).unwrap_or_default(),
                ))
                .with(sia::lat().with_text(
                    meta.text("image.maxQueryRegionSize.lat", false).unwrap_or_default(),
                )),
        );
        cap.push(
            sia::max_image_extent()
                .with(sia::long().with_text(
                    meta.text("image.maxImageExtent.long", false).unwrap_or_default(),
                ))
                .with(sia::lat().with_text(
                    meta.text("image.maxImageExtent.lat", false).unwrap_or_default(),
                )),
        );
        cap.push(
            sia::max_image_size()
                .with_text(meta.text("image.maxImageSize", false).unwrap_or_default()),
        );
        cap.push(
            sia::max_file_size()
                .with_text(meta.text("image.maxFileSize", false).unwrap_or_default()),
        );
        cap.push(sia::max_records().with_text(
            meta.text("image.maxRecords", false)
                .unwrap_or_else(|| ctx.config.dal_hard_limit.to_string()),
        ));
        cap.push(
            sia::test_query()
                .with(
                    sia::pos()
                        .with(sia::long().with_text(
                            meta.text("testQuery.pos.ra", false).unwrap_or_default(),
                        ))
                        .with(sia::lat().with_text(
                            meta.text("testQuery.pos.dec", false).unwrap_or_default(),
                        )),
                )
                .with(
                    sia::size()
                        .with(sia::long().with_text(
                            meta.text("testQuery.size.ra", false).unwrap_or_default(),
                        ))
                        .with(sia::lat().with_text(
                            meta.text("testQuery.size.dec", false).unwrap_or_default(),
                        )),
                ),
        );
        Ok(())
    }
}

struct ConeSearchCapability;

impl CapabilityMaker for ConeSearchCapability {
    fn element(&self) -> Node {
        cs::capability()
    }

    fn extend(
        &self,
        cap: &mut Node,
        publication: &Publication,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let service = param_source(publication, ctx);
        let meta = &service.meta;
        cap.push(cs::max_sr().with_text(
            meta.text("cone.maxRadius", true)
                .unwrap_or_else(|| ctx.config.default_max_radius.to_string()),
        ));
        cap.push(cs::max_records().with_text((ctx.config.dal_default_limit * 10).to_string()));
        cap.push(cs::verbosity().with_text("true"));
        cap.push(
            cs::test_query()
                .with(cs::ra().with_text(meta.required_text("cone.testQuery.ra")?))
                .with(cs::dec().with_text(meta.required_text("cone.testQuery.dec")?))
                .with(cs::sr().with_text(
                    meta.text("cone.testQuery.sr", false)
                        .unwrap_or_else(|| ctx.config.default_test_radius.to_string()),
                )),
        );
        Ok(())
    }
}

struct SpectralAccessCapability;

impl CapabilityMaker for SpectralAccessCapability {
    fn element(&self) -> Node {
        ssap::capability()
    }

    fn extend(
        &self,
        cap: &mut Node,
        publication: &Publication,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let service = param_source(publication, ctx);
        let meta = &service.meta;
        cap.push(
            ssap::compliance_level()
                .with_text(meta.text_or("spectral.complianceLevel", "minimal")),
        );
        cap.push(ssap::data_source().with_text(meta.required_text("spectral.dataSource")?));
        cap.push(
            ssap::creation_type().with_text(meta.text_or("spectral.creationType", "archival")),
        );
        cap.push(ssap::supported_frame().with_text("ICRS"));
        cap.push(ssap::max_search_radius().with_text("90"));
        cap.push(ssap::max_records().with_text(ctx.config.dal_hard_limit.to_string()));
        cap.push(
            ssap::default_max_records().with_text(ctx.config.dal_default_limit.to_string()),
        );
        cap.push(ssap::max_aperture().with_text("90"));
        cap.push(
            ssap::test_query().with(
                ssap::query_data_cmd().with_text(meta.required_text("spectral.testQuery")?),
            ),
        );
        Ok(())
    }
}

struct LineAccessCapability;

impl CapabilityMaker for LineAccessCapability {
    fn element(&self) -> Node {
        slap::capability()
    }

    fn extend(
        &self,
        cap: &mut Node,
        publication: &Publication,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let service = param_source(publication, ctx);
        let meta = &service.meta;
        cap.push(
            slap::compliance_level().with_text(meta.text_or("line.complianceLevel", "full")),
        );
        cap.push(slap::data_source().with_text(meta.required_text("line.dataSource")?));
        cap.push(
            slap::test_query()
                .with(slap::query_data_cmd().with_text(meta.required_text("line.testQuery")?)),
        );
        Ok(())
    }
}

const ADQL_FEATURES: &[(&str, &[&str])] = &[
    (
        std_ids::TAPREGEXT_GEO,
        &[
            "BOX", "POINT", "CIRCLE", "POLYGON", "REGION", "CENTROID", "COORD1", "COORD2",
            "DISTANCE", "CONTAINS", "INTERSECTS", "AREA",
        ],
    ),
    (std_ids::TAPREGEXT_STRING, &["LOWER", "ILIKE"]),
    (std_ids::TAPREGEXT_OFFSET, &["OFFSET"]),
    (std_ids::TAPREGEXT_SETS, &["UNION", "EXCEPT", "INTERSECT"]),
];

/// (mime, aliases, standard id)
const OUTPUT_FORMATS: &[(&str, &[&str], &str)] = &[
    (
        "application/x-votable+xml",
        &["votable"],
        "ivo://ivoa.net/std/TAPRegExt#output-votable-binary",
    ),
    ("text/csv;header=present", &["csv"], ""),
    ("text/tab-separated-values", &["tsv"], ""),
];

const UPLOAD_METHODS: &[&str] = &["inline", "http", "https", "ftp"];

struct TableAccessCapability;

impl CapabilityMaker for TableAccessCapability {
    fn element(&self) -> Node {
        tr::capability()
    }

    fn auxiliary_id(&self) -> Option<&'static str> {
        Some(std_ids::TAP_AUX)
    }

    fn interfaces(
        &self,
        publication: &Publication,
        ctx: &BuildContext<'_>,
        _interfaces: &KindResolver<Box<dyn InterfaceMaker>>,
    ) -> Result<Vec<Node>, BuildError> {
        let mut out = vec![TableAccessInterface.make(publication, ctx)?];
        if ctx.config.experimental_endpoint_decl {
            out.push(EndpointDeclInterface.make(publication, ctx)?);
        }
        Ok(out)
    }

    fn extend(
        &self,
        cap: &mut Node,
        publication: &Publication,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let service = param_source(publication, ctx);
        cap.push(tap_model_builder().build(&service.meta, ctx)?);

        let mut language = tr::language()
            .with(tr::name().with_text("ADQL"))
            .with(
                tr::version()
                    .attr("ivo-id", "ivo://ivoa.net/std/ADQL#v2.0")
                    .with_text("2.0"),
            )
            .with(tr::description().with_text("The Astronomical Data Query Language"));
        for (feature_type, forms) in ADQL_FEATURES {
            let mut features = tr::language_features().attr("type", *feature_type);
            for form in *forms {
                features.push(tr::feature().with(tr::form().with_text(*form)));
            }
            language.push(features);
        }
        cap.push(language);

        for (mime, aliases, ivoid) in OUTPUT_FORMATS {
            let mut format = tr::output_format().with(tr::mime().with_text(*mime));
            if !ivoid.is_empty() {
                format.set_attr("ivo-id", *ivoid);
            }
            for alias in *aliases {
                format.push(tr::alias().with_text(*alias));
            }
            cap.push(format);
        }

        for proto in UPLOAD_METHODS {
            cap.push(tr::upload_method().attr(
                "ivo-id",
                format!("{}{}", std_ids::TAPREGEXT_UPLOAD, proto),
            ));
        }

        let cfg = ctx.config;
        cap.push(
            tr::retention_period()
                .with(tr::default().with_text(cfg.retention_period_s.to_string())),
        );
        cap.push(
            tr::execution_duration()
                .with(tr::default().with_text(cfg.execution_duration_s.to_string())),
        );
        cap.push(
            tr::output_limit()
                .with(
                    tr::default()
                        .attr("unit", "row")
                        .with_text(cfg.dal_default_limit.to_string()),
                )
                .with(
                    tr::hard()
                        .attr("unit", "row")
                        .with_text(cfg.dal_hard_limit.to_string()),
                ),
        );
        cap.push(
            tr::upload_limit().with(
                tr::hard()
                    .attr("unit", "byte")
                    .with_text(cfg.max_upload_bytes.to_string()),
            ),
        );
        Ok(())
    }
}

struct HarvestCapability;

impl CapabilityMaker for HarvestCapability {
    fn element(&self) -> Node {
        vg::harvest_capability()
    }

    fn extend(
        &self,
        cap: &mut Node,
        _publication: &Publication,
        ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        cap.push(vg::max_records().with_text(ctx.config.oai_page_size.to_string()));
        Ok(())
    }
}

struct EditionCapability;

impl CapabilityMaker for EditionCapability {
    fn element(&self) -> Node {
        doc::edition_capability()
    }

    fn extend(
        &self,
        cap: &mut Node,
        publication: &Publication,
        _ctx: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        for source in publication.meta.values("sourceURL", false) {
            cap.push(
                vr::web_browser()
                    .attr("role", "source")
                    .with(vr::access_url().with_text(&source.content)),
            );
        }
        cap.push(
            doc::language_code()
                .with_text(publication.meta.text_or("languageCode", "en")),
        );
        cap.push(
            doc::loc_title()
                .with_text(publication.meta.text("locTitle", false).unwrap_or_default()),
        );
        Ok(())
    }
}

fn builtin_capabilities() -> KindResolver<Box<dyn CapabilityMaker>> {
    let mut r: KindResolver<Box<dyn CapabilityMaker>> = KindResolver::new();
    r.register(mech::IMAGE_ACCESS, Box::new(ImageAccessCapability));
    r.register(mech::CONE_SEARCH, Box::new(ConeSearchCapability));
    r.register(mech::SPECTRAL_ACCESS, Box::new(SpectralAccessCapability));
    r.register(mech::LINE_ACCESS, Box::new(LineAccessCapability));
    r.register(mech::TABLE_ACCESS, Box::new(TableAccessCapability));
    r.register(
        mech::LINK_METADATA,
        Box::new(StandardCapability {
            standard_id: std_ids::DATALINK,
        }),
    );
    r.register(
        mech::SODA_SYNC,
        Box::new(StandardCapability {
            standard_id: std_ids::SODA_SYNC,
        }),
    );
    r.register(
        mech::SODA_ASYNC,
        Box::new(StandardCapability {
            standard_id: std_ids::SODA_ASYNC,
        }),
    );
    r.register(
        mech::AVAILABILITY,
        Box::new(StandardCapability {
            standard_id: std_ids::VOSI_AVAILABILITY,
        }),
    );
    r.register(
        mech::CAPABILITIES,
        Box::new(StandardCapability {
            standard_id: std_ids::VOSI_CAPABILITIES,
        }),
    );
    r.register(
        mech::TABLE_METADATA,
        Box::new(StandardCapability {
            standard_id: std_ids::VOSI_TABLES,
        }),
    );
    r.register(mech::HARVEST, Box::new(HarvestCapability));
    r.register(mech::EDITION, Box::new(EditionCapability));
    for m in [
        mech::FORM,
        mech::STATIC,
        mech::CUSTOM,
        mech::EXTERNAL,
        mech::DOC_FORM,
    ] {
        r.register(m, Box::new(PlainCapability));
    }
    r
}

// ── assembly ──

pub struct CapabilityAssembler {
    capabilities: KindResolver<Box<dyn CapabilityMaker>>,
    interfaces: KindResolver<Box<dyn InterfaceMaker>>,
}

impl CapabilityAssembler {
    /// The full builtin mechanism tables, built once at startup.
    pub fn builtin() -> Self {
        Self {
            capabilities: builtin_capabilities(),
            interfaces: builtin_interfaces(),
        }
    }

    /// The capability element for a publication, or `None` when an auxiliary
    /// publication's mechanism declares no auxiliary identifier.
    pub fn capability(
        &self,
        publication: &Publication,
        ctx: &BuildContext<'_>,
    ) -> Result<Option<Node>, BuildError> {
        if publication.auxiliary {
            return self.auxiliary_capability(publication, ctx);
        }
        let maker = self.capabilities.resolve(&publication.mechanism)?;
        let mut cap = maker.element();
        cap.push(self.description(publication));
        cap.push(maker.interfaces(publication, ctx, &self.interfaces)?);
        maker.extend(&mut cap, publication, ctx)?;
        Ok(Some(cap))
    }

    /// The reduced capability form: the auxiliary standard id, description
    /// and interface, none of the protocol-specific blocks.
    fn auxiliary_capability(
        &self,
        publication: &Publication,
        ctx: &BuildContext<'_>,
    ) -> Result<Option<Node>, BuildError> {
        let maker = self.capabilities.resolve(&publication.mechanism)?;
        let Some(aux_id) = maker.auxiliary_id() else {
            return Ok(None);
        };
        let mut cap = vr::capability().attr("standardID", aux_id);
        cap.push(self.description(publication));
        cap.push(
            self.interfaces
                .resolve(&publication.mechanism)?
                .make(publication, ctx)?,
        );
        Ok(Some(cap))
    }

    fn description(&self, publication: &Publication) -> Node {
        vr::description().with_text(publication.meta.text("description", false).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuildMode;
    use crate::config::RegistryConfig;
    use crate::resource::{Resource, MANAGED_SET};

    fn service() -> Resource {
        let mut res = Resource::new("surveys/dr3", "cone", "catalog-service");
        res.meta.set("title", "DR3 cone search");
        res
    }

    fn cone_publication() -> Publication {
        Publication::new(mech::CONE_SEARCH, [MANAGED_SET])
            .with_meta("accessURL", "http://dc.example.org/surveys/dr3/q/cone?")
            .with_meta("description", "Positional search over DR3.")
    }

    fn build_capability(
        res: &Resource,
        publication: &Publication,
        config: &RegistryConfig,
    ) -> Result<Option<Node>, BuildError> {
        let ctx = BuildContext::new(config, BuildMode::Lenient, res);
        let pctx = ctx.for_publication(publication);
        CapabilityAssembler::builtin().capability(publication, &pctx)
    }

    fn child<'a>(node: &'a Node, name: &str) -> Option<&'a Node> {
        node.children().iter().find(|c| c.name() == name)
    }

    #[test]
    fn cone_capability_carries_test_query_and_limits() {
        let mut res = service();
        res.meta.set("cone.testQuery.ra", "12.5");
        res.meta.set("cone.testQuery.dec", "-30.0");
        let config = RegistryConfig::default();
        let cap = build_capability(&res, &cone_publication(), &config)
            .unwrap()
            .unwrap();
        assert_eq!(cap.attr_value("standardID").unwrap(), std_ids::CONE_SEARCH);
        assert_eq!(child(&cap, "maxSR").unwrap().text().unwrap(), "180");
        assert_eq!(child(&cap, "maxRecords").unwrap().text().unwrap(), "20000");
        let tq = child(&cap, "testQuery").unwrap();
        assert_eq!(child(tq, "sr").unwrap().text().unwrap(), "0.001");
    }

    #[test]
    fn cone_capability_without_test_query_is_a_missing_meta() {
        let res = service();
        let config = RegistryConfig::default();
        let err = build_capability(&res, &cone_publication(), &config).unwrap_err();
        assert!(matches!(err, BuildError::MissingMeta(k) if k == "cone.testQuery.ra"));
    }

    #[test]
    fn unknown_mechanism_is_a_hard_error() {
        let res = service();
        let publication = Publication::new("carrier-pigeon", [MANAGED_SET])
            .with_meta("accessURL", "http://dc.example.org/x");
        let config = RegistryConfig::default();
        let err = build_capability(&res, &publication, &config).unwrap_err();
        assert!(matches!(err, BuildError::UnknownKind(k) if k == "carrier-pigeon"));
    }

    #[test]
    fn auxiliary_without_declared_id_yields_nothing() {
        let mut res = service();
        res.meta.set("cone.testQuery.ra", "1");
        res.meta.set("cone.testQuery.dec", "2");
        let publication = cone_publication().auxiliary();
        let config = RegistryConfig::default();
        assert!(build_capability(&res, &publication, &config)
            .unwrap()
            .is_none());
    }

    #[test]
    fn auxiliary_table_access_is_reduced_to_the_standard_id() {
        let res = service();
        let publication = Publication::new(mech::TABLE_ACCESS, [MANAGED_SET])
            .with_meta("accessURL", "http://dc.example.org/tap")
            .auxiliary();
        let config = RegistryConfig::default();
        let cap = build_capability(&res, &publication, &config)
            .unwrap()
            .unwrap();
        assert_eq!(cap.attr_value("standardID").unwrap(), std_ids::TAP_AUX);
        // no xsi:type, no protocol-specific children
        assert!(cap.attr_value("xsi:type").is_none());
        assert!(child(&cap, "retentionPeriod").is_none());
        assert!(child(&cap, "language").is_none());
        assert!(child(&cap, "interface").is_some());
    }

    #[test]
    fn table_access_declares_policy_from_config() {
        let res = service();
        let publication = Publication::new(mech::TABLE_ACCESS, [MANAGED_SET])
            .with_meta("accessURL", "http://dc.example.org/tap");
        let mut config = RegistryConfig::default();
        config.retention_period_s = 3600;
        let cap = build_capability(&res, &publication, &config)
            .unwrap()
            .unwrap();
        let retention = child(&cap, "retentionPeriod").unwrap();
        assert_eq!(child(retention, "default").unwrap().text().unwrap(), "3600");
        let upload = child(&cap, "uploadLimit").unwrap();
        assert_eq!(
            child(upload, "hard").unwrap().attr_value("unit").unwrap(),
            "byte"
        );
        let features: Vec<_> = child(&cap, "language")
            .unwrap()
            .children()
            .iter()
            .filter(|c| c.name() == "languageFeatures")
            .collect();
        assert_eq!(features.len(), ADQL_FEATURES.len());
    }

    #[test]
    fn table_access_interface_count_follows_the_flag() {
        let res = service();
        let publication = Publication::new(mech::TABLE_ACCESS, [MANAGED_SET])
            .with_meta("accessURL", "http://dc.example.org/tap");
        let config = RegistryConfig::default();
        let cap = build_capability(&res, &publication, &config)
            .unwrap()
            .unwrap();
        let count = cap
            .children()
            .iter()
            .filter(|c| c.name() == "interface")
            .count();
        assert_eq!(count, 1);

        let mut config = RegistryConfig::default();
        config.experimental_endpoint_decl = true;
        let cap = build_capability(&res, &publication, &config)
            .unwrap()
            .unwrap();
        let interfaces: Vec<_> = cap
            .children()
            .iter()
            .filter(|c| c.name() == "interface")
            .collect();
        assert_eq!(interfaces.len(), 2);
        assert_eq!(
            interfaces[1].attr_value("xsi:type").unwrap(),
            "tr:DALIInterface"
        );
    }

    #[test]
    fn mirror_equal_to_access_url_is_dropped() {
        let res = service();
        let publication = Publication::new(mech::FORM, [MANAGED_SET])
            .with_meta("accessURL", "http://dc.example.org/form")
            .with_meta("mirrorURL", "http://dc.example.org/form")
            .with_meta("mirrorURL", "http://mirror.example.org/form");
        let config = RegistryConfig::default();
        let cap = build_capability(&res, &publication, &config)
            .unwrap()
            .unwrap();
        let interface = child(&cap, "interface").unwrap();
        let mirrors: Vec<_> = interface
            .children()
            .iter()
            .filter(|c| c.name() == "mirrorURL")
            .map(|c| c.text().unwrap())
            .collect();
        assert_eq!(mirrors, ["http://mirror.example.org/form"]);
    }

    #[test]
    fn protocol_switch_mirror_is_config_gated() {
        let res = service();
        let publication = Publication::new(mech::FORM, [MANAGED_SET])
            .with_meta("accessURL", "https://dc.example.org/form");
        let mut config = RegistryConfig::default();
        config.mirror_alternate_protocol = true;
        let cap = build_capability(&res, &publication, &config)
            .unwrap()
            .unwrap();
        let interface = child(&cap, "interface").unwrap();
        let mirrors: Vec<_> = interface
            .children()
            .iter()
            .filter(|c| c.name() == "mirrorURL")
            .map(|c| c.text().unwrap())
            .collect();
        assert_eq!(mirrors, ["http://dc.example.org/form"]);
    }

    #[test]
    fn short_alias_rewrites_the_path_and_keeps_the_query() {
        let mut aliases = BTreeMap::new();
        aliases.insert("surveys/dr3/q/cone".to_string(), "cone".to_string());
        assert_eq!(
            apply_short_alias("http://dc.example.org/surveys/dr3/q/cone?", &aliases),
            "http://dc.example.org/cone?"
        );
        assert_eq!(
            apply_short_alias("http://dc.example.org/other/path", &aliases),
            "http://dc.example.org/other/path"
        );
    }

    #[test]
    fn interface_params_come_from_the_target_resource() {
        let mut target = Resource::new("cats/gaia", "main", "catalog-service");
        target.meta.add(
            "inputParam",
            crate::meta::MetaValue::default()
                .with("name", "RA")
                .with("type", "double")
                .with("std", "true")
                .with("unit", "deg"),
        );

        let res = service();
        let mut publication = Publication::new(mech::CONE_SEARCH, [MANAGED_SET])
            .with_meta("accessURL", "http://dc.example.org/cone");
        publication.target = Some(std::sync::Arc::new(target));

        let config = RegistryConfig::default();
        let ctx = BuildContext::new(&config, BuildMode::Lenient, &res);
        let interface = builtin_interfaces()
            .resolve(mech::CONE_SEARCH)
            .unwrap()
            .make(&publication, &ctx.for_publication(&publication))
            .unwrap();
        let param = child(&interface, "param").unwrap();
        assert_eq!(param.attr_value("std").unwrap(), "true");
        assert_eq!(child(param, "name").unwrap().text().unwrap(), "RA");
        assert_eq!(child(param, "unit").unwrap().text().unwrap(), "deg");
    }
}
