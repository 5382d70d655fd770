//! Bidirectional conversion between C-CDA clinical documents and FHIR
//! document bundles, plus QRDA Category I generation.
//!
//! Conversions are synchronous and pure: each call owns its private
//! resource accumulator, the vocabulary and template registries are
//! static and read-only, and output ordering is deterministic (sections
//! and entries in input order, synthesized side resources in
//! first-synthesis order). Independent documents may be converted
//! concurrently without coordination.
//!
//! ```no_run
//! use crosswalk_cda::ClinicalDocument;
//! use crosswalk_convert::{convert_ccda_to_fhir, convert_fhir_to_ccda, ConvertOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let xml = std::fs::read_to_string("summary.xml")?;
//! let doc = ClinicalDocument::from_xml(&xml)?;
//! let bundle = convert_ccda_to_fhir(&doc, &ConvertOptions::default())?;
//! let back = convert_fhir_to_ccda(&bundle, &Default::default())?;
//! println!("{}", back.to_xml()?);
//! # Ok(())
//! # }
//! ```

mod ccda_to_fhir;
mod error;
mod fhir_to_ccda;
mod qrda;

pub mod datetime;
pub mod narrative;
pub mod oids;
pub mod systems;
pub mod templates;

pub use ccda_to_fhir::{convert_ccda_to_fhir, ConvertOptions};
pub use error::ConvertError;
pub use fhir_to_ccda::{convert_fhir_to_ccda, DocumentKind, FhirToCcdaOptions};
pub use qrda::{build_qrda_xml, QrdaEncounter, QrdaInput, QrdaParams};
