use thiserror::Error;

/// Failures raised while compiling a resource into a registry document.
///
/// `MissingMeta` and `BadCoverage` are recoverable in lenient mode (the
/// enclosing substructure or record is dropped and the failure is logged);
/// `UnknownKind` is always fatal for the record or publication it hits.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("mandatory meta key '{0}' is missing")]
    MissingMeta(String),

    #[error("no handler registered for kind '{0}'")]
    UnknownKind(String),

    #[error("coverage expression '{expr}' cannot be parsed: {reason}")]
    BadCoverage { expr: String, reason: String },

    #[error("identifier '{ivoid}' belongs to authority '{authority}', which this registry does not manage")]
    UnmanagedAuthority { ivoid: String, authority: String },

    #[error("'{0}' is not a usable resource identifier")]
    BadIdentifier(String),

    #[error("prerequisite load for collection '{collection}' failed: {reason}")]
    Prerequisite { collection: String, reason: String },

    #[error("document serialization failed: {0}")]
    Serialize(String),
}

/// The protocol-level fault vocabulary reported to harvesting clients.
///
/// The request cycle itself lives elsewhere; these are the signals the
/// document layer hands upward when it cannot produce a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OaiFault {
    #[error("bad argument: {0}")]
    BadArgument(String),
    #[error("bad resumption token: {0}")]
    BadResumptionToken(String),
    #[error("bad verb: {0}")]
    BadVerb(String),
    #[error("cannot disseminate format: {0}")]
    CannotDisseminateFormat(String),
    #[error("id does not exist: {0}")]
    IdDoesNotExist(String),
    #[error("no metadata formats")]
    NoMetadataFormats,
    #[error("no set hierarchy")]
    NoSetHierarchy,
    #[error("no records match")]
    NoRecordsMatch,
}

impl OaiFault {
    /// The wire code used in OAI error elements.
    pub fn code(&self) -> &'static str {
        match self {
            OaiFault::BadArgument(_) => "badArgument",
            OaiFault::BadResumptionToken(_) => "badResumptionToken",
            OaiFault::BadVerb(_) => "badVerb",
            OaiFault::CannotDisseminateFormat(_) => "cannotDisseminateFormat",
            OaiFault::IdDoesNotExist(_) => "idDoesNotExist",
            OaiFault::NoMetadataFormats => "noMetadataFormats",
            OaiFault::NoSetHierarchy => "noSetHierarchy",
            OaiFault::NoRecordsMatch => "noRecordsMatch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_codes_match_wire_names() {
        assert_eq!(OaiFault::NoRecordsMatch.code(), "noRecordsMatch");
        assert_eq!(
            OaiFault::CannotDisseminateFormat("x".into()).code(),
            "cannotDisseminateFormat"
        );
    }
}
