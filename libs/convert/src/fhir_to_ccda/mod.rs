//! FHIR bundle → C-CDA document.
//!
//! Requires exactly one Composition and one Patient in the bundle. Each
//! Composition section resolves its code through the template registry
//! (fatal if unknown: document templates are regulatory), then each
//! referenced resource is resolved against the bundle index and
//! dispatched by resource kind to a pure entry builder. Unresolvable
//! references are treated as already-pruned data and simply omitted.

pub(crate) mod actors;
mod entries;

use crate::datetime::map_fhir_to_ccda_date_time;
use crate::error::ConvertError;
use crate::narrative;
use crate::oids::*;
use crate::systems::*;
use crate::templates::{
    section_template_ids, template_ids, REFERRAL_TEMPLATE_IDS, SUMMARY_TEMPLATE_IDS,
};
use actors::{
    map_addresses_or_unknown, map_effective_time, map_identifiers, map_names,
    map_telecoms_or_unknown, record_target, RecordTargetConfig,
};
use crosswalk_cda as cda;
use crosswalk_fhir::*;

/// The document shape to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    #[default]
    Summary,
    Referral,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FhirToCcdaOptions {
    pub kind: DocumentKind,
}

/// Convert a document bundle to a C-CDA document.
pub fn convert_fhir_to_ccda(
    bundle: &Bundle,
    options: &FhirToCcdaOptions,
) -> Result<cda::ClinicalDocument, ConvertError> {
    let composition = match bundle.first_of_type("Composition") {
        Some(Resource::Composition(composition)) => composition,
        _ => return Err(ConvertError::MissingResource("Composition")),
    };
    let patient = match bundle.first_of_type("Patient") {
        Some(Resource::Patient(patient)) => patient,
        _ => return Err(ConvertError::MissingResource("Patient")),
    };

    let cx = ReverseContext { bundle, composition, patient };
    cx.convert(options)
}

/// Read-only view shared by the entry builders: the bundle index plus
/// the structurally required resources.
pub(crate) struct ReverseContext<'a> {
    pub bundle: &'a Bundle,
    pub composition: &'a Composition,
    pub patient: &'a Patient,
}

impl<'a> ReverseContext<'a> {
    fn convert(&self, options: &FhirToCcdaOptions) -> Result<cda::ClinicalDocument, ConvertError> {
        let mut sections = Vec::new();
        for section in self.composition.section.iter().flatten() {
            sections.push(self.create_section(section)?);
        }

        let referral = self.find_referral_request();

        let (specs, code) = match options.kind {
            DocumentKind::Referral => (
                REFERRAL_TEMPLATE_IDS,
                cda::Code {
                    code: Some(LOINC_REFERRAL_NOTE.to_string()),
                    display_name: Some("Referral Note".to_string()),
                    code_system: Some(OID_LOINC_CODE_SYSTEM.to_string()),
                    code_system_name: Some("LOINC".to_string()),
                    ..Default::default()
                },
            ),
            DocumentKind::Summary => (
                SUMMARY_TEMPLATE_IDS,
                cda::Code {
                    code: Some(LOINC_SUMMARY_OF_EPISODE_NOTE.to_string()),
                    display_name: Some("Summarization of Episode Note".to_string()),
                    code_system: Some(OID_LOINC_CODE_SYSTEM.to_string()),
                    code_system_name: Some("LOINC".to_string()),
                    ..Default::default()
                },
            ),
        };

        // Header element order is enforced by document validators.
        Ok(cda::ClinicalDocument {
            xmlns: Some(cda::CDA_NS.to_string()),
            xmlns_sdtc: Some(cda::SDTC_NS.to_string()),
            xmlns_xsi: Some(cda::XSI_NS.to_string()),
            realm_code: Some(cda::RealmCode { code: Some("US".to_string()) }),
            type_id: Some(cda::TypeId {
                root: Some(OID_HL7_REGISTERED_MODELS.to_string()),
                extension: Some("POCD_HD000040".to_string()),
            }),
            template_id: template_ids(specs),
            id: map_identifiers(self.composition.id.as_deref(), None),
            code: Some(code),
            title: self.composition.title.clone(),
            effective_time: map_effective_time(self.composition.date.as_deref(), None),
            confidentiality_code: self
                .composition
                .confidentiality
                .as_deref()
                .and_then(|c| CONFIDENTIALITY_MAPPER.fhir_to_cda_code(c)),
            language_code: Some(cda::Code {
                code: Some(
                    self.composition
                        .language
                        .clone()
                        .unwrap_or_else(|| "en-US".to_string()),
                ),
                ..Default::default()
            }),
            record_target: Some(record_target(self.patient, RecordTargetConfig::default())),
            author: self.map_author(
                self.composition.author.as_ref().and_then(|a| a.first()),
                self.composition.date.as_deref(),
                true,
            ),
            custodian: self.map_custodian(),
            information_recipient: self.map_recipient(referral),
            participant: self.create_participants(),
            documentation_of: self.map_documentation_of(),
            component: if sections.is_empty() {
                None
            } else {
                Some(cda::Component {
                    structured_body: Some(cda::StructuredBody {
                        component: sections
                            .into_iter()
                            .map(|section| cda::BodyComponent { section: vec![section] })
                            .collect(),
                    }),
                })
            },
        })
    }

    fn find_referral_request(&self) -> Option<&'a Reference> {
        self.composition
            .section
            .as_ref()?
            .iter()
            .find(|section| {
                section.code.as_ref().and_then(|c| c.first_code())
                    == Some(LOINC_REASON_FOR_REFERRAL_SECTION)
            })?
            .entry
            .as_ref()?
            .iter()
            .find(|entry| {
                entry
                    .reference
                    .as_deref()
                    .is_some_and(|r| r.starts_with("ServiceRequest/"))
            })
    }

    fn create_section(&self, section: &CompositionSection) -> Result<cda::Section, ConvertError> {
        let section_code = section
            .code
            .as_ref()
            .and_then(|code| code.first_code())
            .ok_or(ConvertError::MissingSectionCode)?;

        let specs = section_template_ids(section_code)
            .ok_or_else(|| ConvertError::UnknownSectionCode(section_code.to_string()))?;

        let resources: Vec<&Resource> = section
            .entry
            .iter()
            .flatten()
            .filter_map(|reference| self.bundle.resolve(Some(reference)))
            .collect();

        // Reason for Referral carries its text and a referral activity
        // directly instead of regular entries.
        if section_code == LOINC_REASON_FOR_REFERRAL_SECTION {
            if let [Resource::ServiceRequest(request)] = resources.as_slice() {
                return Ok(self.create_reason_for_referral_section(section, request));
            }
        }

        let entries: Vec<cda::EntryNode> = resources
            .iter()
            .filter_map(|resource| self.create_entry(section, resource))
            .collect();

        Ok(cda::Section {
            null_flavor: if resources.is_empty() { Some("NI".to_string()) } else { None },
            template_id: template_ids(specs),
            code: map_concept_to_cda_code(section.code.as_ref()),
            title: section.title.clone(),
            text: narrative::div_to_narrative(section.text.as_ref()),
            author: None,
            entry: if entries.is_empty() { None } else { Some(entries) },
        })
    }

    fn create_entry(
        &self,
        section: &CompositionSection,
        resource: &Resource,
    ) -> Option<cda::EntryNode> {
        match resource {
            Resource::AllergyIntolerance(allergy) => Some(entries::allergy(self, allergy)),
            Resource::CarePlan(care_plan) => entries::care_plan(self, care_plan),
            Resource::CareTeam(care_team) => Some(entries::care_team(self, care_team)),
            Resource::Condition(condition) => entries::condition(self, section, condition),
            Resource::Encounter(encounter) => Some(entries::encounter(self, encounter)),
            Resource::Goal(goal) => entries::goal(section, goal),
            Resource::Immunization(immunization) => Some(entries::immunization(self, immunization)),
            Resource::MedicationRequest(medication) => Some(entries::medication(self, medication)),
            Resource::Procedure(procedure) => Some(entries::procedure(self, procedure)),
            Resource::Observation(observation) => Some(entries::observation(self, observation)),
            Resource::ServiceRequest(request) => Some(entries::service_request(self, request)),
            _ => None,
        }
    }

    fn create_reason_for_referral_section(
        &self,
        section: &CompositionSection,
        request: &ServiceRequest,
    ) -> cda::Section {
        cda::Section {
            template_id: template_ids(
                section_template_ids(LOINC_REASON_FOR_REFERRAL_SECTION).unwrap_or_default(),
            ),
            code: map_concept_to_cda_code(section.code.as_ref()),
            title: section.title.clone(),
            text: request
                .note
                .as_ref()
                .and_then(|notes| notes.first())
                .and_then(|note| note.text.clone())
                .map(serde_json::Value::String),
            entry: Some(vec![cda::EntryNode {
                act: Some(vec![cda::Act {
                    class_code: Some("PCPR".to_string()),
                    mood_code: Some("INT".to_string()),
                    template_id: vec![cda::TemplateId {
                        root: Some(OID_PATIENT_REFERRAL_ACTIVITY_OBSERVATION.to_string()),
                        extension: None,
                    }],
                    id: map_identifiers(request.id.as_deref(), request.identifier.as_deref()),
                    code: map_concept_to_cda_code(request.code.as_ref()),
                    status_code: Some(code_only("active")),
                    effective_time: map_effective_time(
                        request.occurrence_date_time.as_deref(),
                        None,
                    ),
                    priority_code: Some(cda::Code {
                        code: Some("A".to_string()),
                        display_name: Some("ASAP".to_string()),
                        code_system: Some(OID_ACT_PRIORITY_CODE_SYSTEM.to_string()),
                        code_system_name: Some("ActPriority".to_string()),
                        ..Default::default()
                    }),
                    author: self.map_author(
                        request.requester.as_ref(),
                        request.occurrence_date_time.as_deref(),
                        false,
                    ),
                    ..Default::default()
                }]),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    /// Resolve an author reference (transitively through PractitionerRole)
    /// into the document author structure. Unresolved references are
    /// omitted, not errors.
    pub(crate) fn map_author(
        &self,
        author: Option<&Reference>,
        time: Option<&str>,
        include_device: bool,
    ) -> Option<Vec<cda::Author>> {
        let mut resolved = self.bundle.resolve(author)?;

        let mut organization: Option<&Organization> = None;
        if let Resource::Organization(org) = resolved {
            organization = Some(org);
        } else if let Resource::PractitionerRole(role) = resolved {
            if let Some(Resource::Organization(org)) = self.bundle.resolve(role.organization.as_ref())
            {
                organization = Some(org);
            }
            resolved = self.bundle.resolve(role.practitioner.as_ref())?;
        }

        let parts = ActorParts::of(resolved);

        Some(vec![cda::Author {
            template_id: Some(vec![cda::TemplateId {
                root: Some(OID_AUTHOR_PARTICIPANT.to_string()),
                extension: None,
            }]),
            time: time.map(|t| cda::TimeStamp {
                value: map_fhir_to_ccda_date_time(Some(t)),
                null_flavor: None,
            }),
            assigned_author: Some(cda::AssignedAuthor {
                id: map_identifiers(resolved.id(), parts.identifiers),
                addr: Some(map_addresses_or_unknown(parts.address)),
                telecom: Some(map_telecoms_or_unknown(parts.telecom)),
                code: map_concept_to_cda_code(parts.qualification),
                assigned_person: parts.name.map(|names| cda::Person {
                    id: None,
                    name: map_names(Some(names)),
                }),
                assigned_authoring_device: if parts.name.is_none() && include_device {
                    Some(cda::AuthoringDevice {
                        manufacturer_model_name: Some("Crosswalk".to_string()),
                        software_name: Some("Crosswalk".to_string()),
                    })
                } else {
                    None
                },
                represented_organization: organization.and_then(|org| {
                    org.name.as_ref().map(|name| cda::OrganizationNode {
                        name: Some(vec![cda::TextValue::from(name.clone())]),
                        ..Default::default()
                    })
                }),
            }),
        }])
    }

    /// Resolve a performer/member reference (transitively through
    /// PractitionerRole) into an assigned-entity structure.
    pub(crate) fn map_assigned_entity(
        &self,
        actor: Option<&Reference>,
    ) -> Option<cda::AssignedEntity> {
        let resolved = self.bundle.resolve(actor)?;

        let mut practitioner: Option<&Practitioner> = None;
        let mut organization: Option<&Organization> = None;
        match resolved {
            Resource::PractitionerRole(role) => {
                if let Some(Resource::Practitioner(p)) =
                    self.bundle.resolve(role.practitioner.as_ref())
                {
                    practitioner = Some(p);
                }
                if let Some(Resource::Organization(o)) =
                    self.bundle.resolve(role.organization.as_ref())
                {
                    organization = Some(o);
                }
            }
            Resource::Practitioner(p) => practitioner = Some(p),
            Resource::Organization(o) => organization = Some(o),
            _ => return None,
        }

        let parts = ActorParts::of(resolved);
        Some(cda::AssignedEntity {
            id: map_identifiers(resolved.id(), parts.identifiers),
            code: None,
            addr: Some(map_addresses_or_unknown(
                practitioner.and_then(|p| p.address.as_deref()),
            )),
            telecom: Some(map_telecoms_or_unknown(parts.telecom)),
            assigned_person: practitioner.map(|p| cda::Person {
                id: map_identifiers(p.id.as_deref(), p.identifier.as_deref()),
                name: map_names(p.name.as_deref()),
            }),
            represented_organization: organization.map(|org| cda::OrganizationNode {
                id: map_identifiers(org.id.as_deref(), org.identifier.as_deref()),
                name: org
                    .name
                    .as_ref()
                    .map(|name| vec![cda::TextValue::from(name.clone())]),
                addr: Some(map_addresses_or_unknown(org.address.as_deref())),
                telecom: Some(map_telecoms_or_unknown(org.telecom.as_deref())),
            }),
        })
    }

    fn map_custodian(&self) -> Option<cda::Custodian> {
        let custodian = self.composition.custodian.as_ref()?;
        let Resource::Organization(organization) = self.bundle.resolve(Some(custodian))? else {
            return None;
        };

        Some(cda::Custodian {
            assigned_custodian: cda::AssignedCustodian {
                represented_custodian_organization: cda::OrganizationNode {
                    id: map_identifiers(
                        organization.id.as_deref(),
                        organization.identifier.as_deref(),
                    ),
                    name: organization
                        .name
                        .as_ref()
                        .map(|name| vec![cda::TextValue::from(name.clone())]),
                    telecom: Some(map_telecoms_or_unknown(organization.telecom.as_deref())),
                    addr: Some(map_addresses_or_unknown(organization.address.as_deref())),
                },
            },
        })
    }

    fn map_recipient(&self, referral: Option<&Reference>) -> Option<cda::InformationRecipient> {
        let Resource::ServiceRequest(request) = self.bundle.resolve(referral)? else {
            return None;
        };
        let performer = request.performer.as_ref()?.first()?;
        let Resource::Practitioner(practitioner) = self.bundle.resolve(Some(performer))? else {
            return None;
        };

        Some(cda::InformationRecipient {
            intended_recipient: cda::IntendedRecipient {
                information_recipient: Some(cda::Person {
                    id: None,
                    name: map_names(practitioner.name.as_deref()),
                }),
            },
        })
    }

    /// Related persons in the bundle become document-level participants.
    fn create_participants(&self) -> Option<Vec<cda::Participant>> {
        let related: Vec<&RelatedPerson> = self
            .bundle
            .resources()
            .filter_map(|resource| match resource {
                Resource::RelatedPerson(person) => Some(person),
                _ => None,
            })
            .collect();
        if related.is_empty() {
            return None;
        }

        Some(
            related
                .into_iter()
                .map(|person| cda::Participant {
                    type_code: Some("IND".to_string()),
                    template_id: Some(vec![cda::TemplateId {
                        root: Some(OID_RELATED_PERSON_PARTICIPANT.to_string()),
                        extension: Some("2023-05-01".to_string()),
                    }]),
                    associated_entity: Some(cda::AssociatedEntity {
                        class_code: Some("PRS".to_string()),
                        id: map_identifiers(person.id.as_deref(), person.identifier.as_deref()),
                        code: map_concept_to_cda_code(
                            person.relationship.as_ref().and_then(|r| r.first()),
                        ),
                        addr: Some(map_addresses_or_unknown(person.address.as_deref())),
                        telecom: Some(map_telecoms_or_unknown(person.telecom.as_deref())),
                        associated_person: Some(cda::Person {
                            id: None,
                            name: map_names(person.name.as_deref()),
                        }),
                    }),
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn map_documentation_of(&self) -> Option<cda::DocumentationOf> {
        let event = self.composition.event.as_ref()?.first()?;
        if event.code.is_none() && event.period.is_none() {
            return None;
        }

        Some(cda::DocumentationOf {
            type_code: None,
            service_event: Some(cda::ServiceEvent {
                class_code: Some("PCPR".to_string()),
                code: map_concept_to_cda_code(event.code.as_ref().and_then(|c| c.first())),
                effective_time: actors::map_effective_date(None, event.period.as_ref()),
                performer: None,
            }),
        })
    }
}

/// The actor-shaped fields a resolved author resource can contribute.
struct ActorParts<'a> {
    identifiers: Option<&'a [Identifier]>,
    name: Option<&'a [HumanName]>,
    address: Option<&'a [Address]>,
    telecom: Option<&'a [ContactPoint]>,
    qualification: Option<&'a CodeableConcept>,
}

impl<'a> ActorParts<'a> {
    fn of(resource: &'a Resource) -> ActorParts<'a> {
        match resource {
            Resource::Practitioner(p) => ActorParts {
                identifiers: p.identifier.as_deref(),
                name: p.name.as_deref(),
                address: p.address.as_deref(),
                telecom: p.telecom.as_deref(),
                qualification: p
                    .qualification
                    .as_ref()
                    .and_then(|q| q.first())
                    .and_then(|q| q.code.as_ref()),
            },
            Resource::Patient(p) => ActorParts {
                identifiers: p.identifier.as_deref(),
                name: p.name.as_deref(),
                address: p.address.as_deref(),
                telecom: p.telecom.as_deref(),
                qualification: None,
            },
            Resource::RelatedPerson(p) => ActorParts {
                identifiers: p.identifier.as_deref(),
                name: p.name.as_deref(),
                address: p.address.as_deref(),
                telecom: p.telecom.as_deref(),
                qualification: None,
            },
            Resource::Organization(o) => ActorParts {
                identifiers: o.identifier.as_deref(),
                name: None,
                address: o.address.as_deref(),
                telecom: o.telecom.as_deref(),
                qualification: None,
            },
            _ => ActorParts {
                identifiers: None,
                name: None,
                address: None,
                telecom: None,
                qualification: None,
            },
        }
    }
}

pub(crate) fn code_only(code: &str) -> cda::Code {
    cda::Code {
        code: Some(code.to_string()),
        ..Default::default()
    }
}
