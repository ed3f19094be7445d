//! The model-based document builder.
//!
//! A [`ModelBuilder`] compiles a declarative rule tree, mirroring the target
//! document shape, into a function of a metadata scope: leaf rules fetch all
//! values for a key and run them through a node factory, group rules wrap
//! their children in a container that vanishes when nothing below produced
//! content. The handful of values that need more than the metadata itself
//! (the enclosing resource, process policy, strictness) get them from an
//! explicit [`BuildContext`] threaded through every call.

use crate::config::RegistryConfig;
use crate::coverage;
use crate::error::BuildError;
use crate::meta::{MetaScope, MetaValue};
use crate::model::{self, std_ids};
use crate::resource::{Publication, Resource};
use crate::xml::Node;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Whether locally recoverable construction errors abort the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Recover what can be recovered; drop and log the rest.
    #[default]
    Lenient,
    /// Any construction error aborts the whole document.
    Strict,
}

impl BuildMode {
    pub fn is_strict(self) -> bool {
        matches!(self, BuildMode::Strict)
    }
}

/// Everything a build step may need beyond the metadata scope itself.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub config: &'a RegistryConfig,
    pub mode: BuildMode,
    /// The resource whose document is being assembled.
    pub resource: &'a Resource,
    /// The publication currently being rendered, inside capability work.
    pub publication: Option<&'a Publication>,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &'a RegistryConfig, mode: BuildMode, resource: &'a Resource) -> Self {
        Self {
            config,
            mode,
            resource,
            publication: None,
        }
    }

    pub fn for_publication(&self, publication: &'a Publication) -> Self {
        Self {
            publication: Some(publication),
            ..*self
        }
    }
}

/// Attribute bindings resolved from a matched value's sub-metadata.
#[derive(Debug, Default)]
pub struct LocalAttrs(BTreeMap<&'static str, String>);

impl LocalAttrs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

type ElemFn = Box<dyn Fn() -> Node + Send + Sync>;
type CustomFn =
    Box<dyn Fn(&MetaValue, &LocalAttrs, &BuildContext<'_>) -> Result<Vec<Node>, BuildError> + Send + Sync>;

enum Factory {
    /// A plain element; the builder fills in attributes and content.
    Elem(ElemFn),
    /// An arbitrary function of the matched value; may yield nothing.
    Custom(CustomFn),
    /// No node of its own; child results are spliced into the parent.
    Splice,
}

/// One node of the declarative build specification. Immutable once built.
pub struct Rule {
    key: Option<&'static str>,
    factory: Factory,
    /// (attribute name, meta sub-key) bindings; resolved per matched value.
    attrs: Vec<(&'static str, &'static str)>,
    children: Vec<Rule>,
    propagate: bool,
    required: bool,
}

impl Rule {
    pub fn leaf(key: &'static str, factory: impl Fn() -> Node + Send + Sync + 'static) -> Self {
        Self {
            key: Some(key),
            factory: Factory::Elem(Box::new(factory)),
            attrs: Vec::new(),
            children: Vec::new(),
            propagate: true,
            required: false,
        }
    }

    pub fn custom(
        key: &'static str,
        factory: impl Fn(&MetaValue, &LocalAttrs, &BuildContext<'_>) -> Result<Vec<Node>, BuildError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            key: Some(key),
            factory: Factory::Custom(Box::new(factory)),
            attrs: Vec::new(),
            children: Vec::new(),
            propagate: true,
            required: false,
        }
    }

    /// A container with no metadata key of its own; children are evaluated
    /// against the same scope.
    pub fn group(
        factory: impl Fn() -> Node + Send + Sync + 'static,
        children: Vec<Rule>,
    ) -> Self {
        Self {
            key: None,
            factory: Factory::Elem(Box::new(factory)),
            attrs: Vec::new(),
            children,
            propagate: true,
            required: false,
        }
    }

    /// A keyed rule without a container: children build against each matched
    /// value and land directly in the parent.
    pub fn splice(key: &'static str, children: Vec<Rule>) -> Self {
        Self {
            key: Some(key),
            factory: Factory::Splice,
            attrs: Vec::new(),
            children,
            propagate: true,
            required: false,
        }
    }

    pub fn attr(mut self, name: &'static str, meta_key: &'static str) -> Self {
        self.attrs.push((name, meta_key));
        self
    }

    pub fn children(mut self, children: Vec<Rule>) -> Self {
        self.children = children;
        self
    }

    pub fn no_propagate(mut self) -> Self {
        self.propagate = false;
        self
    }

    /// Absence of the key aborts the build instead of yielding nothing.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

pub struct ModelBuilder {
    rules: Vec<Rule>,
}

impl ModelBuilder {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Run the rule tree against a metadata scope. Restartable; reads only.
    pub fn build(
        &self,
        scope: &dyn MetaScope,
        ctx: &BuildContext<'_>,
    ) -> Result<Vec<Node>, BuildError> {
        build_rules(&self.rules, scope, ctx)
    }
}

fn build_rules(
    rules: &[Rule],
    scope: &dyn MetaScope,
    ctx: &BuildContext<'_>,
) -> Result<Vec<Node>, BuildError> {
    let mut out = Vec::new();
    for rule in rules {
        out.extend(build_rule(rule, scope, ctx)?);
    }
    Ok(out)
}

fn resolve_attrs(bindings: &[(&'static str, &'static str)], value: &MetaValue) -> LocalAttrs {
    let mut attrs = LocalAttrs::default();
    for &(name, meta_key) in bindings {
        if let Some(text) = value.child_text(meta_key) {
            attrs.0.insert(name, text.to_string());
        }
    }
    attrs
}

fn build_rule(
    rule: &Rule,
    scope: &dyn MetaScope,
    ctx: &BuildContext<'_>,
) -> Result<Vec<Node>, BuildError> {
    let Some(key) = rule.key else {
        // group: one container, children against the unchanged scope
        let children = build_rules(&rule.children, scope, ctx)?;
        return Ok(match &rule.factory {
            Factory::Elem(factory) => {
                let mut node = factory();
                node.push(children);
                if node.is_empty() {
                    Vec::new()
                } else {
                    vec![node]
                }
            }
            _ => children,
        });
    };

    let values = scope.values(key, rule.propagate);
    if values.is_empty() {
        if rule.required {
            return Err(BuildError::MissingMeta(key.to_string()));
        }
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for value in &values {
        let locals = resolve_attrs(&rule.attrs, value);
        match &rule.factory {
            Factory::Elem(factory) => {
                let mut node = factory();
                for &(name, _) in &rule.attrs {
                    if let Some(v) = locals.get(name) {
                        node.set_attr(name, v);
                    }
                }
                if rule.children.is_empty() {
                    node.set_text(&value.content);
                } else {
                    node.push(build_rules(&rule.children, value, ctx)?);
                }
                if !node.is_empty() {
                    out.push(node);
                }
            }
            Factory::Splice => out.extend(build_rules(&rule.children, value, ctx)?),
            Factory::Custom(factory) => out.extend(factory(value, &locals, ctx)?),
        }
    }
    Ok(out)
}

// ── custom leaf builders ──

/// Bibcodes are recognized in free source text and marked up as such.
fn looks_like_bibcode(text: &str) -> bool {
    text.len() == 19
        && text.chars().take(4).all(|c| c.is_ascii_digit())
        && text
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_uppercase() || c == '.' || c == ':')
}

fn build_source(
    value: &MetaValue,
    _attrs: &LocalAttrs,
    _ctx: &BuildContext<'_>,
) -> Result<Vec<Node>, BuildError> {
    let mut node = model::vr::source();
    if looks_like_bibcode(&value.content) {
        node.set_attr("format", "bibcode");
    }
    node.set_text(&value.content);
    Ok(vec![node])
}

fn looks_like_date(text: &str) -> bool {
    let b = text.as_bytes();
    b.len() >= 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
}

/// News entries predate the proper date metadata but carry usable dates;
/// entries whose date attribute does not parse are ignored.
fn build_date_from_news(
    _value: &MetaValue,
    attrs: &LocalAttrs,
    _ctx: &BuildContext<'_>,
) -> Result<Vec<Node>, BuildError> {
    let date = attrs.get("date").unwrap_or("");
    if !looks_like_date(date) {
        return Ok(Vec::new());
    }
    Ok(vec![model::vr::date()
        .attr("role", attrs.get("role").unwrap_or("updated"))
        .with_text(date)])
}

fn build_coverage_profile(
    value: &MetaValue,
    _attrs: &LocalAttrs,
    ctx: &BuildContext<'_>,
) -> Result<Vec<Node>, BuildError> {
    if value.content.is_empty() {
        return Ok(Vec::new());
    }
    match coverage::profile_node(&value.content) {
        Ok(node) => Ok(vec![node]),
        Err(err) if ctx.mode.is_strict() => Err(err),
        Err(err) => {
            tracing::error!(error = %err, "coverage profile left out of the document");
            Ok(Vec::new())
        }
    }
}

/// A resource with spatial coverage can serve footprints; the URL comes from
/// the enclosing resource, not from the metadata.
fn build_footprint_url(
    _value: &MetaValue,
    _attrs: &LocalAttrs,
    ctx: &BuildContext<'_>,
) -> Result<Vec<Node>, BuildError> {
    Ok(match ctx.resource.derived_url("coverage") {
        Some(url) => vec![model::vs::footprint()
            .attr("ivo-id", std_ids::MOC)
            .with_text(url)],
        None => Vec::new(),
    })
}

// ── the fixed builders ──

const LEGACY_RELATIONSHIP_TERMS: &[(&str, &str)] = &[
    ("servedBy", "IsServedBy"),
    ("serviceFor", "IsServiceFor"),
    ("derivedFrom", "IsDerivedFrom"),
    ("relatedTo", "related-to"),
    ("mirrorOf", "IsIdenticalTo"),
    ("uses", "Cites"),
];

const RELATIONSHIP_TERMS: &[(&str, &str)] = &[
    ("cites", "Cites"),
    ("isSupplementTo", "IsSupplementTo"),
    ("isSupplementedBy", "IsSupplementedBy"),
    ("isContinuedBy", "IsContinuedBy"),
    ("continues", "Continues"),
    ("isNewVersionOf", "IsNewVersionOf"),
    ("isPreviousVersionOf", "IsPreviousVersionOf"),
    ("isPartOf", "IsPartOf"),
    ("hasPart", "HasPart"),
    ("isSourceOf", "IsSourceOf"),
    ("isDerivedFrom", "IsDerivedFrom"),
    ("isIdenticalTo", "IsIdenticalTo"),
    ("isServiceFor", "IsServiceFor"),
    ("isServedBy", "IsServedBy"),
];

fn relationship_rule(meta_name: &'static str, term: &'static str) -> Rule {
    Rule::group(
        move || {
            model::vr::relationship().with(model::vr::relationship_type().with_text(term))
        },
        vec![Rule::leaf(meta_name, model::vr::related_resource).attr("ivo-id", "ivoId")],
    )
}

/// The common curation/content builder every resource record runs through.
pub fn vor_resource_builder() -> &'static ModelBuilder {
    static BUILDER: OnceLock<ModelBuilder> = OnceLock::new();
    BUILDER.get_or_init(|| {
        let mut content_children = vec![
            Rule::leaf("subject", model::vr::subject),
            Rule::leaf("description", model::vr::description),
            Rule::custom("source", build_source),
            Rule::leaf("referenceURL", model::vr::reference_url),
            Rule::leaf("type", model::vr::type_),
            Rule::leaf("contentLevel", model::vr::content_level),
        ];
        // relationship terms of the older vocabulary, kept for records that
        // still use them, then the current term set
        for &(meta_name, term) in LEGACY_RELATIONSHIP_TERMS {
            content_children.push(relationship_rule(meta_name, term));
        }
        for &(meta_name, term) in RELATIONSHIP_TERMS {
            content_children.push(relationship_rule(meta_name, term));
        }

        ModelBuilder::new(vec![
            Rule::leaf("title", model::vr::title).required(),
            Rule::leaf("shortName", model::vr::short_name),
            Rule::leaf("identifier", model::vr::identifier),
            Rule::custom("doi", |value, _, _| {
                Ok(vec![model::vr::alt_identifier()
                    .with_text(format!("doi:{}", value.content))])
            }),
            Rule::group(
                model::vr::curation,
                vec![
                    Rule::leaf("publisher", model::vr::publisher).attr("ivo-id", "ivoId"),
                    Rule::leaf("creator", model::vr::creator).children(vec![
                        Rule::leaf("name", model::vr::name),
                        Rule::leaf("altIdentifier", model::vr::alt_identifier),
                        Rule::leaf("logo", model::vr::logo),
                    ]),
                    Rule::leaf("contributor", model::vr::contributor).attr("ivo-id", "ivoId"),
                    Rule::leaf("_dataUpdated", || model::vr::date().attr("role", "updated")),
                    Rule::leaf("date", model::vr::date).attr("role", "role"),
                    Rule::custom("_news", build_date_from_news)
                        .attr("role", "role")
                        .attr("date", "date"),
                    Rule::leaf("version", model::vr::version),
                    Rule::leaf("contact", model::vr::contact).children(vec![
                        Rule::leaf("name", model::vr::name).attr("ivo-id", "ivoId"),
                        Rule::leaf("address", model::vr::address),
                        Rule::leaf("email", model::vr::email),
                        Rule::leaf("telephone", model::vr::telephone),
                    ]),
                ],
            ),
            Rule::group(model::vr::content, content_children),
        ])
    })
}

/// The flat bibliographic mapping used by the plain envelope format.
pub fn dc_builder() -> &'static ModelBuilder {
    static BUILDER: OnceLock<ModelBuilder> = OnceLock::new();
    BUILDER.get_or_init(|| {
        ModelBuilder::new(vec![
            Rule::leaf("title", model::dc::title).required(),
            Rule::leaf("identifier", model::dc::identifier),
            Rule::splice("creator", vec![Rule::leaf("name", model::dc::creator)]),
            Rule::splice("contributor", vec![Rule::leaf("name", model::dc::contributor)]),
            Rule::leaf("description", model::dc::description),
            Rule::leaf("language", model::dc::language),
            Rule::leaf("rights", model::dc::rights),
            Rule::leaf("publisher", model::dc::publisher),
        ])
    })
}

pub fn oai_header_builder() -> &'static ModelBuilder {
    static BUILDER: OnceLock<ModelBuilder> = OnceLock::new();
    BUILDER.get_or_init(|| {
        ModelBuilder::new(vec![
            Rule::leaf("identifier", model::oai::identifier),
            Rule::leaf("_metadataUpdated", model::oai::datestamp),
        ])
    })
}

pub fn org_meta_builder() -> &'static ModelBuilder {
    static BUILDER: OnceLock<ModelBuilder> = OnceLock::new();
    BUILDER.get_or_init(|| {
        ModelBuilder::new(vec![
            Rule::leaf("facility", model::vr::facility),
            Rule::leaf("instrument", model::vr::instrument)
                .attr("ivo-id", "ivoId")
                .attr("altIdentifier", "altIdentifier"),
        ])
    })
}

pub fn standards_meta_builder() -> &'static ModelBuilder {
    static BUILDER: OnceLock<ModelBuilder> = OnceLock::new();
    BUILDER.get_or_init(|| {
        ModelBuilder::new(vec![
            Rule::leaf("endorsedVersion", model::vstd::endorsed_version)
                .attr("status", "status")
                .attr("use", "use"),
            Rule::leaf("deprecated", model::vstd::deprecated),
            Rule::leaf("key", model::vstd::key).children(vec![
                Rule::leaf("name", model::vstd::name),
                Rule::leaf("description", model::vstd::description),
            ]),
        ])
    })
}

pub fn coverage_meta_builder() -> &'static ModelBuilder {
    static BUILDER: OnceLock<ModelBuilder> = OnceLock::new();
    BUILDER.get_or_init(|| {
        ModelBuilder::new(vec![Rule::leaf("coverage", model::vs::coverage).children(
            vec![
                Rule::custom("profile", build_coverage_profile),
                Rule::leaf("spatial", model::vs::spatial),
                Rule::leaf("temporal", model::vs::temporal),
                Rule::leaf("spectral", model::vs::spectral),
                // spatially covered resources additionally point at their
                // footprint endpoint
                Rule::custom("spatial", build_footprint_url),
                Rule::leaf("waveband", model::vs::waveband),
                Rule::leaf("regionOfRegard", model::vs::region_of_regard),
            ],
        )])
    })
}

pub fn rights_builder() -> &'static ModelBuilder {
    static BUILDER: OnceLock<ModelBuilder> = OnceLock::new();
    BUILDER.get_or_init(|| {
        ModelBuilder::new(vec![
            Rule::leaf("rights", model::vr::rights).attr("rightsURI", "rightsURI")
        ])
    })
}

pub fn registry_meta_builder() -> &'static ModelBuilder {
    static BUILDER: OnceLock<ModelBuilder> = OnceLock::new();
    BUILDER.get_or_init(|| {
        ModelBuilder::new(vec![Rule::leaf(
            "managedAuthority",
            model::vg::managed_authority,
        )])
    })
}

pub fn tap_model_builder() -> &'static ModelBuilder {
    static BUILDER: OnceLock<ModelBuilder> = OnceLock::new();
    BUILDER.get_or_init(|| {
        ModelBuilder::new(vec![
            Rule::leaf("supportsModel", model::tr::data_model).attr("ivo-id", "ivoId")
        ])
    })
}
