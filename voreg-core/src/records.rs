//! The publishing projection: flat rows describing what a resource
//! contributes to the service list.
//!
//! These rows are what a storage layer persists; producing them also
//! front-loads the two publication-time checks: a resource must carry the
//! mandatory record metadata, and its identifier must belong to an authority
//! this registry manages.

use crate::capabilities::mech;
use crate::config::RegistryConfig;
use crate::error::BuildError;
use crate::meta::MetaScope;
use crate::resource::{Resource, ResourceStatus, MANAGED_SET};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Introspection mechanisms are registry plumbing; they never show up as
/// user-facing interfaces.
pub const HIDDEN_MECHANISMS: &[&str] =
    &[mech::AVAILABILITY, mech::CAPABILITIES, mech::TABLE_METADATA];

const BROWSEABLE_MECHANISMS: &[&str] = &[
    mech::FORM,
    mech::STATIC,
    mech::CUSTOM,
    mech::EXTERNAL,
    mech::DOC_FORM,
    mech::EDITION,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRow {
    pub ivoid: String,
    pub short_name: Option<String>,
    pub source_collection: String,
    pub res_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Individual authors joined with `"; "`.
    pub authors: String,
    pub updated: Option<String>,
    pub rec_timestamp: DateTime<Utc>,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRow {
    pub source_collection: String,
    pub res_id: String,
    pub mechanism: String,
    pub access_url: Option<String>,
    pub reference_url: Option<String>,
    pub browseable: bool,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRow {
    pub source_collection: String,
    pub res_id: String,
    pub set_name: String,
    pub mechanism: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRow {
    pub source_collection: String,
    pub res_id: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRow {
    pub source_collection: String,
    pub res_id: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PublishRow {
    Resource(ResourceRow),
    Interface(InterfaceRow),
    Set(SetRow),
    Author(AuthorRow),
    Subject(SubjectRow),
}

/// The authority part of an ivoid, when it has one.
pub fn authority_of(ivoid: &str) -> Option<&str> {
    let rest = ivoid.strip_prefix("ivo://")?;
    let authority = rest.split('/').next().unwrap_or(rest);
    (!authority.is_empty()).then_some(authority)
}

/// Author lists use `;` between individuals; trailing "et al" entries are
/// not authors.
fn authors_of(resource: &Resource) -> Vec<String> {
    let mut out = Vec::new();
    for value in resource.meta.values("creator.name", true) {
        for author in value.content.split(';') {
            let author = author.trim();
            if !author.is_empty() && !author.starts_with("et al") {
                out.push(author.to_string());
            }
        }
    }
    out
}

fn base_row(
    resource: &Resource,
    config: &RegistryConfig,
    now: DateTime<Utc>,
) -> Result<ResourceRow, BuildError> {
    let ivoid = resource.meta.required_text("identifier")?;
    let authority = authority_of(&ivoid)
        .ok_or_else(|| BuildError::BadIdentifier(ivoid.clone()))?
        .to_string();
    if !config.manages(&authority) {
        return Err(BuildError::UnmanagedAuthority { ivoid, authority });
    }
    Ok(ResourceRow {
        title: resource.meta.required_text("title")?,
        ivoid,
        short_name: resource.meta.text("shortName", false),
        source_collection: resource.collection.clone(),
        res_id: resource.id.clone(),
        description: resource.meta.text("description", false),
        authors: authors_of(resource).join("; "),
        updated: resource.meta.text("_dataUpdated", false),
        rec_timestamp: now,
        deleted: resource.status == ResourceStatus::Deleted,
    })
}

/// Everything a resource contributes to the service list.
///
/// No publications means no rows at all. A resource from an unmanaged
/// authority is skipped with a warning, not an error; genuinely missing
/// record metadata still fails.
pub fn publish_rows(
    resource: &Resource,
    config: &RegistryConfig,
    now: DateTime<Utc>,
) -> Result<Vec<PublishRow>, BuildError> {
    if resource.publications.is_empty() {
        return Ok(Vec::new());
    }
    let base = match base_row(resource, config, now) {
        Ok(base) => base,
        Err(BuildError::UnmanagedAuthority { ivoid, authority }) => {
            tracing::warn!(
                %ivoid,
                %authority,
                "skipping publication of resource from unmanaged authority"
            );
            return Ok(Vec::new());
        }
        Err(err) => return Err(err),
    };

    let mut rows = vec![PublishRow::Resource(base)];
    for publication in &resource.publications {
        // auxiliary and introspection publications exist for the registry
        // record only
        if publication.auxiliary || HIDDEN_MECHANISMS.contains(&publication.mechanism.as_str()) {
            continue;
        }
        rows.push(PublishRow::Interface(InterfaceRow {
            source_collection: resource.collection.clone(),
            res_id: resource.id.clone(),
            mechanism: publication.mechanism.clone(),
            access_url: publication.meta.text("accessURL", false),
            reference_url: resource.meta.text("referenceURL", true),
            browseable: BROWSEABLE_MECHANISMS.contains(&publication.mechanism.as_str()),
            deleted: false,
        }));
        for set_name in &publication.sets {
            rows.push(PublishRow::Set(SetRow {
                source_collection: resource.collection.clone(),
                res_id: resource.id.clone(),
                set_name: set_name.clone(),
                mechanism: publication.mechanism.clone(),
                deleted: false,
            }));
        }
    }
    for author in authors_of(resource) {
        rows.push(PublishRow::Author(AuthorRow {
            source_collection: resource.collection.clone(),
            res_id: resource.id.clone(),
            author,
        }));
    }
    for subject in resource.meta.values("subject", false) {
        rows.push(PublishRow::Subject(SubjectRow {
            source_collection: resource.collection.clone(),
            res_id: resource.id.clone(),
            subject: subject.content,
        }));
    }
    Ok(rows)
}

/// Rows marking an identifier as dropped; the record stays harvestable as a
/// tombstone.
pub fn tombstone_rows(ivoid: &str, now: DateTime<Utc>) -> Vec<PublishRow> {
    let res_id = ivoid.rsplit('/').next().unwrap_or(ivoid).to_string();
    vec![
        PublishRow::Resource(ResourceRow {
            ivoid: ivoid.to_string(),
            short_name: Some("deleted".to_string()),
            source_collection: "deleted".to_string(),
            res_id: res_id.clone(),
            title: format!("Ex {ivoid}"),
            description: Some(
                "This is a sentinel for a record once published by this registry but now dropped."
                    .to_string(),
            ),
            authors: String::new(),
            updated: None,
            rec_timestamp: now,
            deleted: true,
        }),
        PublishRow::Set(SetRow {
            source_collection: "deleted".to_string(),
            res_id,
            set_name: MANAGED_SET.to_string(),
            mechanism: mech::CUSTOM.to_string(),
            deleted: true,
        }),
    ]
}
