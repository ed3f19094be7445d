//! Harvesting-envelope documents around the resource records.
//!
//! Single-record and list documents, the endpoint self-description, and the
//! enumeration documents (sets, metadata formats, identifiers). List
//! assembly never aborts on a single bad record: the record is skipped and
//! the failure goes to the error sink.

use crate::builder::{dc_builder, oai_header_builder, BuildContext, BuildMode};
use crate::capabilities::mech;
use crate::error::{BuildError, OaiFault};
use crate::makers::RecordAssembler;
use crate::meta::MetaScope;
use crate::model::{self, oai, oai_dc};
use crate::resource::{default_sets, Resource, ResourceStatus};
use crate::xml::Node;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

pub const PROTOCOL_VERSION: &str = "2.0";
pub const EARLIEST_DATESTAMP: &str = "1970-01-01T00:00:00Z";
pub const DELETED_RECORD_POLICY: &str = "transient";
pub const GRANULARITY: &str = "YYYY-MM-DDThh:mm:ssZ";

/// Wire format for datestamps at the declared granularity.
pub fn format_datestamp(when: DateTime<Utc>) -> String {
    when.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// The two dissemination formats of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// The minimal common bibliographic format.
    OaiDc,
    /// The full resource-description format.
    IvoVor,
}

impl RecordFormat {
    pub fn prefix(self) -> &'static str {
        match self {
            RecordFormat::OaiDc => "oai_dc",
            RecordFormat::IvoVor => "ivo_vor",
        }
    }

    pub fn from_prefix(prefix: &str) -> Result<Self, OaiFault> {
        match prefix {
            "oai_dc" => Ok(RecordFormat::OaiDc),
            "ivo_vor" => Ok(RecordFormat::IvoVor),
            other => Err(OaiFault::CannotDisseminateFormat(other.to_string())),
        }
    }
}

fn header_element(resource: &Resource, ctx: &BuildContext<'_>) -> Result<Node, BuildError> {
    let mut header = oai::header();
    if resource.status == ResourceStatus::Deleted {
        header.set_attr("status", "deleted");
    }
    header.push(oai_header_builder().build(&resource.meta, ctx)?);
    let sets: BTreeSet<&str> = resource
        .publications
        .iter()
        .flat_map(|p| p.sets.iter().map(String::as_str))
        .collect();
    for set in sets {
        header.push(oai::set_spec().with_text(set));
    }
    Ok(header)
}

/// The metadata body in the requested format, `None` for tombstones.
fn metadata_body(
    asm: &RecordAssembler,
    resource: &Resource,
    set_names: &BTreeSet<String>,
    mode: BuildMode,
    format: RecordFormat,
) -> Result<Option<Node>, BuildError> {
    if resource.status == ResourceStatus::Deleted {
        return Ok(None);
    }
    match format {
        RecordFormat::IvoVor => asm.resource_document(resource, set_names, mode),
        RecordFormat::OaiDc => {
            let ctx = BuildContext::new(asm.config(), mode, resource);
            Ok(Some(
                oai_dc::dc().with(dc_builder().build(&resource.meta, &ctx)?),
            ))
        }
    }
}

/// One record: header plus, for live resources, the metadata body.
pub fn record_element(
    asm: &RecordAssembler,
    resource: &Resource,
    set_names: &BTreeSet<String>,
    mode: BuildMode,
    format: RecordFormat,
) -> Result<Node, BuildError> {
    let ctx = BuildContext::new(asm.config(), mode, resource);
    let mut record = oai::record().with(header_element(resource, &ctx)?);
    if let Some(body) = metadata_body(asm, resource, set_names, mode, format)? {
        record.push(oai::metadata().with(body));
    }
    Ok(record)
}

/// A list document over as many of `resources` as could be built. A failing
/// record is skipped and reported; the list itself always comes back.
pub fn list_records_element(
    asm: &RecordAssembler,
    resources: &[Resource],
    set_names: &BTreeSet<String>,
    mode: BuildMode,
    format: RecordFormat,
) -> Node {
    let mut list = oai::list_records();
    for resource in resources {
        match record_element(asm, resource, set_names, mode, format) {
            Ok(record) => list.push(record),
            Err(BuildError::MissingMeta(key)) => {
                tracing::error!(
                    resource = %resource.qualified_id(),
                    key = %key,
                    "cannot build record, mandatory meta missing; record skipped"
                );
            }
            Err(err) => {
                tracing::error!(
                    resource = %resource.qualified_id(),
                    error = %err,
                    "cannot build record; record skipped"
                );
            }
        }
    }
    list
}

pub fn list_identifiers_element(
    asm: &RecordAssembler,
    resources: &[Resource],
    mode: BuildMode,
) -> Node {
    let mut list = oai::list_identifiers();
    for resource in resources {
        let ctx = BuildContext::new(asm.config(), mode, resource);
        match header_element(resource, &ctx) {
            Ok(header) => list.push(header),
            Err(err) => {
                tracing::error!(
                    resource = %resource.qualified_id(),
                    error = %err,
                    "cannot build record header; identifier skipped"
                );
            }
        }
    }
    list
}

/// A single-record document, or the protocol signal when none can be built.
pub fn get_record_element(
    asm: &RecordAssembler,
    resource: &Resource,
    mode: BuildMode,
    format: RecordFormat,
) -> Result<Node, OaiFault> {
    match record_element(asm, resource, &default_sets(), mode, format) {
        Ok(record) => Ok(oai::get_record().with(record)),
        Err(err) => {
            tracing::error!(
                resource = %resource.qualified_id(),
                error = %err,
                "single-record request failed"
            );
            Err(OaiFault::IdDoesNotExist(
                resource
                    .ivoid()
                    .unwrap_or_else(|| resource.qualified_id()),
            ))
        }
    }
}

pub fn list_sets_element<'a>(set_names: impl IntoIterator<Item = &'a str>) -> Node {
    let mut node = oai::list_sets();
    for name in set_names {
        node.push(
            oai::set()
                .with(oai::set_spec().with_text(name))
                .with(oai::set_name().with_text(name)),
        );
    }
    node
}

pub fn list_metadata_formats_element() -> Node {
    let mut node = oai::list_metadata_formats();
    for format in model::METADATA_FORMATS {
        node.push(
            oai::metadata_format()
                .with(oai::metadata_prefix().with_text(format.prefix))
                .with(oai::schema().with_text(format.schema))
                .with(oai::metadata_namespace().with_text(format.namespace)),
        );
    }
    node
}

/// The harvesting endpoint's access URL: an explicit one on the harvest
/// publication wins over the derived default.
fn harvest_base_url(registry: &Resource) -> Option<String> {
    for publication in &registry.publications {
        if publication.mechanism == mech::HARVEST {
            if let Some(url) = publication.meta.text("accessURL", false) {
                return Some(url);
            }
        }
    }
    registry.derived_url("harvest")
}

/// The endpoint self-description, its own resource record embedded.
pub fn identify_element(
    asm: &RecordAssembler,
    registry: &Resource,
    mode: BuildMode,
) -> Result<Node, BuildError> {
    Ok(oai::identify()
        .with(oai::repository_name().with_text(registry.meta.required_text("title")?))
        .with(oai::base_url().with_text(harvest_base_url(registry).unwrap_or_default()))
        .with(oai::protocol_version().with_text(PROTOCOL_VERSION))
        .with(oai::admin_email().with_text(registry.meta.text_or("contact.email", "")))
        .with(oai::earliest_datestamp().with_text(EARLIEST_DATESTAMP))
        .with(oai::deleted_record().with_text(DELETED_RECORD_POLICY))
        .with(oai::granularity().with_text(GRANULARITY))
        .with(
            oai::description().with(asm.resource_document(registry, &default_sets(), mode)?),
        ))
}
