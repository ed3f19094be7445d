//! The fixed XML vocabulary of the resource-description and harvesting
//! envelope schemas: namespace table, element constructors, `xsi:type`
//! values, standard identifiers and schema-mandated child orderings.

use crate::xml::Node;

pub struct Namespace {
    pub prefix: &'static str,
    pub uri: &'static str,
    pub schema: &'static str,
}

pub const NAMESPACES: &[Namespace] = &[
    Namespace {
        prefix: "oai",
        uri: "http://www.openarchives.org/OAI/2.0/",
        schema: "http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd",
    },
    Namespace {
        prefix: "oai_dc",
        uri: "http://www.openarchives.org/OAI/2.0/oai_dc/",
        schema: "http://www.openarchives.org/OAI/2.0/oai_dc.xsd",
    },
    Namespace {
        prefix: "dc",
        uri: "http://purl.org/dc/elements/1.1/",
        schema: "http://dublincore.org/schemas/xmls/simpledc20021212.xsd",
    },
    Namespace {
        prefix: "ri",
        uri: "http://www.ivoa.net/xml/RegistryInterface/v1.0",
        schema: "http://www.ivoa.net/xml/RegistryInterface/RegistryInterface-v1.0.xsd",
    },
    Namespace {
        prefix: "vr",
        uri: "http://www.ivoa.net/xml/VOResource/v1.0",
        schema: "http://www.ivoa.net/xml/VOResource/VOResource-v1.0.xsd",
    },
    Namespace {
        prefix: "vg",
        uri: "http://www.ivoa.net/xml/VORegistry/v1.0",
        schema: "http://www.ivoa.net/xml/VORegistry/VORegistry-v1.0.xsd",
    },
    Namespace {
        prefix: "vs",
        uri: "http://www.ivoa.net/xml/VODataService/v1.1",
        schema: "http://www.ivoa.net/xml/VODataService/VODataService-v1.1.xsd",
    },
    Namespace {
        prefix: "cs",
        uri: "http://www.ivoa.net/xml/ConeSearch/v1.0",
        schema: "http://www.ivoa.net/xml/ConeSearch/ConeSearch-v1.0.xsd",
    },
    Namespace {
        prefix: "sia",
        uri: "http://www.ivoa.net/xml/SIA/v1.1",
        schema: "http://www.ivoa.net/xml/SIA/SIA-v1.1.xsd",
    },
    Namespace {
        prefix: "ssap",
        uri: "http://www.ivoa.net/xml/SSA/v1.1",
        schema: "http://www.ivoa.net/xml/SSA/SSA-v1.1.xsd",
    },
    Namespace {
        prefix: "slap",
        uri: "http://www.ivoa.net/xml/SLAP/v1.0",
        schema: "http://www.ivoa.net/xml/SLAP/SLAP-v1.0.xsd",
    },
    Namespace {
        prefix: "tr",
        uri: "http://www.ivoa.net/xml/TAPRegExt/v1.0",
        schema: "http://www.ivoa.net/xml/TAPRegExt/TAPRegExt-v1.0.xsd",
    },
    Namespace {
        prefix: "vstd",
        uri: "http://www.ivoa.net/xml/StandardsRegExt/v1.0",
        schema: "http://www.ivoa.net/xml/StandardsRegExt/StandardsRegExt-1.0.xsd",
    },
    Namespace {
        prefix: "doc",
        uri: "http://www.ivoa.net/xml/DocRegExt/v1",
        schema: "http://www.ivoa.net/xml/DocRegExt/DocRegExt-v1.0.xsd",
    },
    Namespace {
        prefix: "stc",
        uri: "http://www.ivoa.net/xml/STC/stc-v1.30.xsd",
        schema: "http://www.ivoa.net/xml/STC/stc-v1.30.xsd",
    },
    Namespace {
        prefix: "xsi",
        uri: "http://www.w3.org/2001/XMLSchema-instance",
        schema: "",
    },
];

pub fn namespace(prefix: &str) -> Option<&'static Namespace> {
    NAMESPACES.iter().find(|ns| ns.prefix == prefix)
}

/// The envelope metadata formats this compiler can disseminate.
pub struct MetadataFormat {
    pub prefix: &'static str,
    pub schema: &'static str,
    pub namespace: &'static str,
}

pub const METADATA_FORMATS: &[MetadataFormat] = &[
    MetadataFormat {
        prefix: "oai_dc",
        schema: "http://www.openarchives.org/OAI/2.0/oai_dc.xsd",
        namespace: "http://www.openarchives.org/OAI/2.0/oai_dc/",
    },
    MetadataFormat {
        prefix: "ivo_vor",
        schema: "http://www.ivoa.net/xml/RegistryInterface/RegistryInterface-v1.0.xsd",
        namespace: "http://www.ivoa.net/xml/RegistryInterface/v1.0",
    },
];

/// Standard identifiers the capability assemblers must reproduce verbatim.
pub mod std_ids {
    pub const SIA: &str = "ivo://ivoa.net/std/SIA";
    pub const SIA_AUX: &str = "ivo://ivoa.net/std/SIA#aux";
    pub const CONE_SEARCH: &str = "ivo://ivoa.net/std/ConeSearch";
    pub const SSA: &str = "ivo://ivoa.net/std/SSA";
    pub const SLAP: &str = "ivo://ivoa.net/std/SLAP";
    pub const TAP: &str = "ivo://ivoa.net/std/TAP";
    pub const TAP_AUX: &str = "ivo://ivoa.net/std/TAP#aux";
    pub const DATALINK: &str = "ivo://ivoa.net/std/DataLink#links-1.1";
    pub const SODA_SYNC: &str = "ivo://ivoa.net/std/SODA#sync-1.0";
    pub const SODA_ASYNC: &str = "ivo://ivoa.net/std/SODA#async-1.0";
    pub const VOSI_AVAILABILITY: &str = "ivo://ivoa.net/std/VOSI#availability";
    pub const VOSI_CAPABILITIES: &str = "ivo://ivoa.net/std/VOSI#capabilities";
    pub const VOSI_TABLES: &str = "ivo://ivoa.net/std/VOSI#tables";
    pub const REGISTRY: &str = "ivo://ivoa.net/std/Registry";
    pub const MOC: &str = "ivo://ivoa.net/std/moc";
    pub const TAPREGEXT_UDF: &str = "ivo://ivoa.net/std/TAPRegExt#features-udf";
    pub const TAPREGEXT_GEO: &str = "ivo://ivoa.net/std/TAPRegExt#features-adqlgeo";
    pub const TAPREGEXT_STRING: &str = "ivo://ivoa.net/std/TAPRegExt#features-adql-string";
    pub const TAPREGEXT_OFFSET: &str = "ivo://ivoa.net/std/TAPRegExt#features-adql-offset";
    pub const TAPREGEXT_SETS: &str = "ivo://ivoa.net/std/TAPRegExt#features-adql-sets";
    pub const TAPREGEXT_UPLOAD: &str = "ivo://ivoa.net/std/TAPRegExt#upload-";
}

fn resource_element(xsi_type: &'static str, needs: &'static [&'static str]) -> Node {
    Node::qualified("ri", "Resource")
        .attr("xsi:type", xsi_type)
        .needs(needs)
}

pub mod ri {
    use super::*;

    pub fn resource() -> Node {
        Node::qualified("ri", "Resource").needs(&["vr", "xsi"])
    }
}

pub mod vr {
    use super::*;

    pub fn organisation() -> Node {
        resource_element("vr:Organisation", &["vr", "xsi"])
    }

    pub fn title() -> Node {
        Node::local("vr", "title")
    }
    pub fn short_name() -> Node {
        Node::local("vr", "shortName")
    }
    pub fn identifier() -> Node {
        Node::local("vr", "identifier")
    }
    pub fn alt_identifier() -> Node {
        Node::local("vr", "altIdentifier")
    }
    pub fn curation() -> Node {
        Node::local("vr", "curation")
    }
    pub fn publisher() -> Node {
        Node::local("vr", "publisher")
    }
    pub fn creator() -> Node {
        Node::local("vr", "creator")
    }
    pub fn contributor() -> Node {
        Node::local("vr", "contributor")
    }
    pub fn name() -> Node {
        Node::local("vr", "name")
    }
    pub fn address() -> Node {
        Node::local("vr", "address")
    }
    pub fn email() -> Node {
        Node::local("vr", "email")
    }
    pub fn telephone() -> Node {
        Node::local("vr", "telephone")
    }
    pub fn logo() -> Node {
        Node::local("vr", "logo")
    }
    pub fn date() -> Node {
        Node::local("vr", "date")
    }
    pub fn version() -> Node {
        Node::local("vr", "version")
    }
    pub fn contact() -> Node {
        Node::local("vr", "contact")
    }
    pub fn content() -> Node {
        Node::local("vr", "content")
    }
    pub fn subject() -> Node {
        Node::local("vr", "subject")
    }
    pub fn description() -> Node {
        Node::local("vr", "description")
    }
    pub fn source() -> Node {
        Node::local("vr", "source")
    }
    pub fn reference_url() -> Node {
        Node::local("vr", "referenceURL")
    }
    pub fn type_() -> Node {
        Node::local("vr", "type")
    }
    pub fn content_level() -> Node {
        Node::local("vr", "contentLevel")
    }

    /// A relationship counts as empty without a related resource, however
    /// much else it carries (the type child is always present).
    pub fn relationship() -> Node {
        Node::local("vr", "relationship").empty_unless_child("relatedResource")
    }
    pub fn relationship_type() -> Node {
        Node::local("vr", "relationshipType")
    }
    pub fn related_resource() -> Node {
        Node::local("vr", "relatedResource")
    }

    pub fn rights() -> Node {
        Node::local("vr", "rights")
    }
    pub fn validation_level() -> Node {
        Node::local("vr", "validationLevel")
    }
    pub fn facility() -> Node {
        Node::local("vr", "facility")
    }
    pub fn instrument() -> Node {
        Node::local("vr", "instrument")
    }

    pub fn capability() -> Node {
        Node::local("vr", "capability").needs(&["xsi"])
    }
    pub fn interface() -> Node {
        Node::local("vr", "interface").needs(&["xsi"])
    }
    pub fn web_browser() -> Node {
        interface().attr("xsi:type", "vr:WebBrowser").needs(&["vr", "xsi"])
    }
    pub fn web_service() -> Node {
        interface().attr("xsi:type", "vr:WebService").needs(&["vr", "xsi"])
    }
    pub fn access_url() -> Node {
        Node::local("vr", "accessURL")
    }
    pub fn mirror_url() -> Node {
        Node::local("vr", "mirrorURL")
    }
    pub fn security_method() -> Node {
        Node::local("vr", "securityMethod")
    }
    pub fn wsdl_url() -> Node {
        Node::local("vr", "wsdlURL")
    }
}

pub mod oai {
    use super::*;

    fn elem(name: &'static str) -> Node {
        Node::qualified("oai", name)
    }

    pub fn record() -> Node {
        elem("record")
    }
    pub fn header() -> Node {
        elem("header")
    }
    pub fn identifier() -> Node {
        elem("identifier")
    }
    pub fn datestamp() -> Node {
        elem("datestamp")
    }
    pub fn set_spec() -> Node {
        elem("setSpec")
    }
    pub fn metadata() -> Node {
        elem("metadata")
    }
    pub fn identify() -> Node {
        elem("Identify")
    }
    pub fn list_records() -> Node {
        elem("ListRecords")
    }
    pub fn list_identifiers() -> Node {
        elem("ListIdentifiers")
    }
    pub fn list_sets() -> Node {
        elem("ListSets").may_be_empty()
    }
    pub fn get_record() -> Node {
        elem("GetRecord")
    }
    pub fn list_metadata_formats() -> Node {
        elem("ListMetadataFormats")
    }
    pub fn metadata_format() -> Node {
        elem("metadataFormat")
    }
    pub fn metadata_prefix() -> Node {
        elem("metadataPrefix")
    }
    pub fn schema() -> Node {
        elem("schema")
    }
    pub fn metadata_namespace() -> Node {
        elem("metadataNamespace")
    }
    pub fn set() -> Node {
        elem("set")
    }
    pub fn set_name() -> Node {
        elem("setName")
    }
    pub fn repository_name() -> Node {
        elem("repositoryName")
    }
    pub fn base_url() -> Node {
        elem("baseURL")
    }
    pub fn protocol_version() -> Node {
        elem("protocolVersion")
    }
    pub fn admin_email() -> Node {
        elem("adminEmail")
    }
    pub fn earliest_datestamp() -> Node {
        elem("earliestDatestamp")
    }
    pub fn deleted_record() -> Node {
        elem("deletedRecord")
    }
    pub fn granularity() -> Node {
        elem("granularity")
    }
    pub fn description() -> Node {
        elem("description")
    }
}

pub mod oai_dc {
    use super::*;

    pub fn dc() -> Node {
        Node::qualified("oai_dc", "dc").needs(&["dc", "xsi"])
    }
}

pub mod dc {
    use super::*;

    fn elem(name: &'static str) -> Node {
        Node::qualified("dc", name)
    }

    pub fn title() -> Node {
        elem("title")
    }
    pub fn identifier() -> Node {
        elem("identifier")
    }
    pub fn creator() -> Node {
        elem("creator")
    }
    pub fn contributor() -> Node {
        elem("contributor")
    }
    pub fn description() -> Node {
        elem("description")
    }
    pub fn language() -> Node {
        elem("language")
    }
    pub fn rights() -> Node {
        elem("rights")
    }
    pub fn publisher() -> Node {
        elem("publisher")
    }
}

pub mod vg {
    use super::*;

    pub fn registry_resource() -> Node {
        resource_element("vg:Registry", &["vg", "vr", "xsi"])
    }
    pub fn authority_resource() -> Node {
        resource_element("vg:Authority", &["vg", "vr", "xsi"])
    }
    pub fn harvest_capability() -> Node {
        vr::capability()
            .attr("standardID", std_ids::REGISTRY)
            .attr("xsi:type", "vg:Harvest")
            .needs(&["vg", "vs", "xsi"])
    }
    pub fn oai_http_interface() -> Node {
        vr::interface().attr("xsi:type", "vg:OAIHTTP").needs(&["vg", "xsi"])
    }
    pub fn full() -> Node {
        Node::local("vg", "full")
    }
    pub fn managed_authority() -> Node {
        Node::local("vg", "managedAuthority")
    }
    pub fn managing_org() -> Node {
        Node::local("vg", "managingOrg")
    }
    pub fn max_records() -> Node {
        Node::local("vg", "maxRecords")
    }
}

pub mod vs {
    use super::*;

    pub fn data_service() -> Node {
        resource_element("vs:DataService", &["vs", "vr", "xsi"])
    }
    pub fn catalog_service() -> Node {
        resource_element("vs:CatalogService", &["vs", "vr", "xsi"])
    }
    pub fn catalog_resource() -> Node {
        resource_element("vs:CatalogResource", &["vs", "vr", "xsi"])
    }

    pub fn tableset() -> Node {
        Node::local("vs", "tableset").child_order(&["schema"])
    }
    pub fn schema() -> Node {
        Node::local("vs", "schema").child_order(&["name", "title", "description", "utype", "table"])
    }
    pub fn table() -> Node {
        Node::local("vs", "table").child_order(&[
            "name",
            "title",
            "description",
            "utype",
            "nrows",
            "column",
            "foreignKey",
        ])
    }
    pub fn name() -> Node {
        Node::local("vs", "name")
    }
    pub fn title() -> Node {
        Node::local("vs", "title")
    }
    pub fn description() -> Node {
        Node::local("vs", "description")
    }
    pub fn utype() -> Node {
        Node::local("vs", "utype")
    }
    pub fn nrows() -> Node {
        Node::local("vs", "nrows")
    }
    pub fn column() -> Node {
        Node::local("vs", "column")
    }
    pub fn unit() -> Node {
        Node::local("vs", "unit")
    }
    pub fn ucd() -> Node {
        Node::local("vs", "ucd")
    }
    pub fn flag() -> Node {
        Node::local("vs", "flag")
    }
    pub fn votable_type() -> Node {
        Node::local("vs", "dataType")
            .attr("xsi:type", "vs:VOTableType")
            .needs(&["vs", "xsi"])
    }
    pub fn simple_type() -> Node {
        Node::local("vs", "dataType")
            .attr("xsi:type", "vs:SimpleDataType")
            .needs(&["vs", "xsi"])
    }
    pub fn foreign_key() -> Node {
        Node::local("vs", "foreignKey").child_order(&[
            "targetTable",
            "fkColumn",
            "description",
            "utype",
        ])
    }
    pub fn target_table() -> Node {
        Node::local("vs", "targetTable")
    }
    pub fn fk_column() -> Node {
        Node::local("vs", "fkColumn").child_order(&["fromColumn", "targetColumn"])
    }
    pub fn from_column() -> Node {
        Node::local("vs", "fromColumn")
    }
    pub fn target_column() -> Node {
        Node::local("vs", "targetColumn")
    }

    pub fn coverage() -> Node {
        Node::local("vs", "coverage")
    }
    pub fn spatial() -> Node {
        Node::local("vs", "spatial")
    }
    pub fn temporal() -> Node {
        Node::local("vs", "temporal")
    }
    pub fn spectral() -> Node {
        Node::local("vs", "spectral")
    }
    pub fn waveband() -> Node {
        Node::local("vs", "waveband")
    }
    pub fn region_of_regard() -> Node {
        Node::local("vs", "regionOfRegard")
    }
    pub fn footprint() -> Node {
        Node::local("vs", "footprint")
    }

    pub fn param_http_interface() -> Node {
        vr::interface().attr("xsi:type", "vs:ParamHTTP").needs(&["vs", "xsi"])
    }
    pub fn query_type() -> Node {
        Node::local("vs", "queryType")
    }
    pub fn result_type() -> Node {
        Node::local("vs", "resultType")
    }
    pub fn param() -> Node {
        Node::local("vs", "param")
    }
}

pub mod cs {
    use super::*;

    pub fn capability() -> Node {
        vr::capability()
            .attr("standardID", std_ids::CONE_SEARCH)
            .attr("xsi:type", "cs:ConeSearch")
            .needs(&["cs", "vs", "xsi"])
    }
    pub fn max_sr() -> Node {
        Node::local("cs", "maxSR")
    }
    pub fn max_records() -> Node {
        Node::local("cs", "maxRecords")
    }
    pub fn verbosity() -> Node {
        Node::local("cs", "verbosity")
    }
    pub fn test_query() -> Node {
        Node::local("cs", "testQuery")
    }
    pub fn ra() -> Node {
        Node::local("cs", "ra")
    }
    pub fn dec() -> Node {
        Node::local("cs", "dec")
    }
    pub fn sr() -> Node {
        Node::local("cs", "sr")
    }
}

pub mod sia {
    use super::*;

    pub fn capability() -> Node {
        vr::capability()
            .attr("standardID", std_ids::SIA)
            .attr("xsi:type", "sia:SimpleImageAccess")
            .needs(&["sia", "vs", "xsi"])
    }
    pub fn image_service_type() -> Node {
        Node::local("sia", "imageServiceType")
    }
    pub fn max_query_region_size() -> Node {
        Node::local("sia", "maxQueryRegionSize")
    }
    pub fn max_image_extent() -> Node {
        Node::local("sia", "maxImageExtent")
    }
    pub fn max_image_size() -> Node {
        Node::local("sia", "maxImageSize")
    }
    pub fn max_file_size() -> Node {
        Node::local("sia", "maxFileSize")
    }
    pub fn max_records() -> Node {
        Node::local("sia", "maxRecords")
    }
    pub fn long() -> Node {
        Node::local("sia", "long")
    }
    pub fn lat() -> Node {
        Node::local("sia", "lat")
    }
    pub fn test_query() -> Node {
        Node::local("sia", "testQuery")
    }
    pub fn pos() -> Node {
        Node::local("sia", "pos")
    }
    pub fn size() -> Node {
        Node::local("sia", "size")
    }
}

pub mod ssap {
    use super::*;

    pub fn capability() -> Node {
        vr::capability()
            .attr("standardID", std_ids::SSA)
            .attr("xsi:type", "ssap:SimpleSpectralAccess")
            .needs(&["ssap", "vs", "xsi"])
    }
    pub fn compliance_level() -> Node {
        Node::local("ssap", "complianceLevel")
    }
    pub fn data_source() -> Node {
        Node::local("ssap", "dataSource")
    }
    pub fn creation_type() -> Node {
        Node::local("ssap", "creationType")
    }
    pub fn supported_frame() -> Node {
        Node::local("ssap", "supportedFrame")
    }
    pub fn max_search_radius() -> Node {
        Node::local("ssap", "maxSearchRadius")
    }
    pub fn max_records() -> Node {
        Node::local("ssap", "maxRecords")
    }
    pub fn default_max_records() -> Node {
        Node::local("ssap", "defaultMaxRecords")
    }
    pub fn max_aperture() -> Node {
        Node::local("ssap", "maxAperture")
    }
    pub fn test_query() -> Node {
        Node::local("ssap", "testQuery")
    }
    pub fn query_data_cmd() -> Node {
        Node::local("ssap", "queryDataCmd")
    }
}

pub mod slap {
    use super::*;

    pub fn capability() -> Node {
        vr::capability()
            .attr("standardID", std_ids::SLAP)
            .attr("xsi:type", "slap:SimpleLineAccess")
            .needs(&["slap", "vs", "xsi"])
    }
    pub fn compliance_level() -> Node {
        Node::local("slap", "complianceLevel")
    }
    pub fn data_source() -> Node {
        Node::local("slap", "dataSource")
    }
    pub fn test_query() -> Node {
        Node::local("slap", "testQuery")
    }
    pub fn query_data_cmd() -> Node {
        Node::local("slap", "queryDataCmd")
    }
}

pub mod tr {
    use super::*;

    pub fn capability() -> Node {
        vr::capability()
            .attr("standardID", std_ids::TAP)
            .attr("xsi:type", "tr:TableAccess")
            .needs(&["tr", "vs", "xsi"])
    }
    pub fn interface() -> Node {
        vr::interface()
            .attr("role", "std")
            .attr("xsi:type", "vs:ParamHTTP")
            .needs(&["vs", "xsi"])
    }
    /// The experimental endpoint-declaring interface form.
    pub fn dali_interface() -> Node {
        vr::interface()
            .attr("role", "std")
            .attr("xsi:type", "tr:DALIInterface")
            .needs(&["tr", "xsi"])
    }
    pub fn endpoint() -> Node {
        Node::local("tr", "endpoint")
    }
    pub fn name() -> Node {
        Node::local("tr", "name")
    }
    pub fn data_model() -> Node {
        Node::local("tr", "dataModel")
    }
    pub fn language() -> Node {
        Node::local("tr", "language")
    }
    pub fn version() -> Node {
        Node::local("tr", "version")
    }
    pub fn description() -> Node {
        Node::local("tr", "description")
    }
    pub fn language_features() -> Node {
        Node::local("tr", "languageFeatures")
    }
    pub fn feature() -> Node {
        Node::local("tr", "feature")
    }
    pub fn form() -> Node {
        Node::local("tr", "form")
    }
    pub fn output_format() -> Node {
        Node::local("tr", "outputFormat")
    }
    pub fn mime() -> Node {
        Node::local("tr", "mime")
    }
    pub fn alias() -> Node {
        Node::local("tr", "alias")
    }
    pub fn upload_method() -> Node {
        Node::local("tr", "uploadMethod").may_be_empty()
    }
    pub fn retention_period() -> Node {
        Node::local("tr", "retentionPeriod")
    }
    pub fn execution_duration() -> Node {
        Node::local("tr", "executionDuration")
    }
    pub fn output_limit() -> Node {
        Node::local("tr", "outputLimit")
    }
    pub fn upload_limit() -> Node {
        Node::local("tr", "uploadLimit")
    }
    pub fn default() -> Node {
        Node::local("tr", "default")
    }
    pub fn hard() -> Node {
        Node::local("tr", "hard")
    }
}

pub mod vstd {
    use super::*;

    pub fn standard_resource() -> Node {
        resource_element("vstd:Standard", &["vstd", "vr", "xsi"])
    }
    pub fn endorsed_version() -> Node {
        Node::local("vstd", "endorsedVersion")
            .attr("status", "n/a")
            .attr("use", "preferred")
    }
    pub fn deprecated() -> Node {
        Node::local("vstd", "deprecated")
    }
    pub fn key() -> Node {
        Node::local("vstd", "key")
    }
    pub fn name() -> Node {
        Node::local("vstd", "name")
    }
    pub fn description() -> Node {
        Node::local("vstd", "description")
    }
}

pub mod doc {
    use super::*;

    pub fn document_resource() -> Node {
        resource_element("doc:Document", &["doc", "vr", "xsi"])
    }
    pub fn edition_capability() -> Node {
        vr::capability().attr("xsi:type", "doc:Edition").needs(&["doc", "xsi"])
    }
    pub fn language_code() -> Node {
        Node::local("doc", "languageCode")
    }
    pub fn loc_title() -> Node {
        Node::local("doc", "locTitle")
    }
}

pub mod stc {
    use super::*;

    pub fn resource_profile() -> Node {
        Node::qualified("stc", "STCResourceProfile")
    }
    pub fn all_sky() -> Node {
        Node::qualified("stc", "AllSky")
    }
    pub fn circle() -> Node {
        Node::qualified("stc", "Circle")
    }
    pub fn center() -> Node {
        Node::qualified("stc", "Center")
    }
    pub fn radius() -> Node {
        Node::qualified("stc", "Radius")
    }
    pub fn polygon() -> Node {
        Node::qualified("stc", "Polygon")
    }
    pub fn vertex() -> Node {
        Node::qualified("stc", "Vertex")
    }
    pub fn position() -> Node {
        Node::qualified("stc", "Position")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_prefix_resolves() {
        for node in [
            vr::capability(),
            vs::tableset(),
            cs::capability(),
            sia::capability(),
            ssap::capability(),
            slap::capability(),
            tr::capability(),
            vstd::standard_resource(),
            doc::document_resource(),
            oai::record(),
            oai_dc::dc(),
            stc::resource_profile(),
        ] {
            assert!(
                namespace(node.prefix()).is_some(),
                "unregistered prefix {}",
                node.prefix()
            );
        }
    }

    #[test]
    fn capability_elements_carry_their_standard_ids() {
        assert_eq!(
            cs::capability().attr_value("standardID").unwrap(),
            std_ids::CONE_SEARCH
        );
        assert_eq!(
            tr::capability().attr_value("xsi:type").unwrap(),
            "tr:TableAccess"
        );
        assert_eq!(
            vg::harvest_capability().attr_value("standardID").unwrap(),
            std_ids::REGISTRY
        );
    }

    #[test]
    fn both_envelope_formats_are_declared() {
        let prefixes: Vec<_> = METADATA_FORMATS.iter().map(|f| f.prefix).collect();
        assert_eq!(prefixes, ["oai_dc", "ivo_vor"]);
    }
}
