//! FHIR R4 data models.
//!
//! The subset of the R4 schema the converters consume and produce. Types
//! work the same across conversions: no validation, just data
//! representation with serde round-tripping.

mod datatypes;
mod resources;

pub use datatypes::*;
pub use resources::*;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_enum_tagged_by_resource_type() {
        let value = json!({
            "resourceType": "Patient",
            "id": "p1",
            "name": [{ "given": ["Alice"], "family": "Newman" }],
            "gender": "female",
        });
        let resource: Resource = serde_json::from_value(value).unwrap();
        match &resource {
            Resource::Patient(p) => {
                assert_eq!(p.id.as_deref(), Some("p1"));
                assert_eq!(p.gender.as_deref(), Some("female"));
            }
            other => panic!("expected Patient, got {}", other.resource_type()),
        }
        assert_eq!(resource.local_reference().as_deref(), Some("Patient/p1"));
    }

    #[test]
    fn bundle_reference_resolution() {
        let bundle = Bundle {
            r#type: Some("document".to_string()),
            entry: Some(vec![BundleEntry {
                resource: Some(Resource::Organization(Organization {
                    id: Some("org1".to_string()),
                    name: Some("General Hospital".to_string()),
                    ..Default::default()
                })),
            }]),
            ..Default::default()
        };
        let found = bundle.resource_by_reference("Organization/org1").unwrap();
        assert_eq!(found.resource_type(), "Organization");
        assert!(bundle.resource_by_reference("Organization/other").is_none());
        assert!(bundle.resource_by_reference("garbage").is_none());
    }

    #[test]
    fn optional_fields_not_serialized() {
        let patient = Patient {
            id: Some("p1".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value, json!({ "id": "p1" }));
    }
}
