use thiserror::Error;

/// Conversion failures. Fatal errors carry the offending template id or
/// code so callers can trace to the exact section or entry.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Reverse direction: the input bundle is missing a structurally
    /// required resource (Composition or Patient).
    #[error("{0} not found")]
    MissingResource(&'static str),

    /// Reverse direction: a Composition section carries no code.
    #[error("missing section code")]
    MissingSectionCode,

    /// Reverse direction: a section code outside the template registry.
    /// Document templates are regulatory; an unmapped section is a
    /// modeling gap, not permissive input.
    #[error("unknown section code: {0}")]
    UnknownSectionCode(String),

    /// Forward direction: an entry template id outside the recognized set
    /// for its section, with `ignore_unsupported_sections` off.
    #[error("unhandled {kind} templateId: {template_id}")]
    UnsupportedTemplateId {
        kind: &'static str,
        template_id: String,
    },

    /// QRDA parameters were requested but invalid or absent.
    #[error("invalid QRDA parameters: {0}")]
    InvalidQrdaParams(&'static str),

    #[error(transparent)]
    Format(#[from] crosswalk_format::FormatError),

    #[error(transparent)]
    Model(#[from] crosswalk_cda::ModelError),

    #[error("resource mapping error: {0}")]
    Json(#[from] serde_json::Error),
}
