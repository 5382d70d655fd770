//! C-CDA document → FHIR bundle.
//!
//! Walks the document header and every structured-body section,
//! dispatching each entry by entry kind and the enclosing section's
//! template id. Handlers return at most one primary resource; actor
//! resources synthesized along the way (practitioners, organizations,
//! practitioner roles, encounter-diagnosis conditions) go through an
//! explicit accumulator so resource synthesis stays visible per call.
//!
//! Identity convention: a document id whose root is a UUID with no
//! extension becomes the resource id; every other id becomes a resource
//! identifier entry. This holds symmetrically in the reverse direction.

use crate::datetime::{map_cda_to_fhir_date, map_cda_to_fhir_date_time};
use crate::error::ConvertError;
use crate::narrative;
use crate::oids::*;
use crate::qrda::{self, QrdaParams};
use crate::systems::*;
use crosswalk_cda as cda;
use crosswalk_fhir::*;
use tracing::{debug, warn};
use uuid::Uuid;

/// Forward conversion options.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Skip entries with unrecognized template ids instead of failing.
    /// An escape hatch for document sections not yet modeled, not a
    /// recovery mechanism; skipped entries are dropped whole.
    pub ignore_unsupported_sections: bool,
    /// Attach a QRDA Category I report to the bundle, built from the
    /// clinical resources produced by this conversion.
    pub generate_qrda: bool,
    /// Required when `generate_qrda` is set.
    pub qrda: Option<QrdaParams>,
}

/// Convert a parsed C-CDA document into a document bundle: one
/// Composition, the patient (when a record target exists), and every
/// resource produced while walking sections.
pub fn convert_ccda_to_fhir(
    doc: &cda::ClinicalDocument,
    options: &ConvertOptions,
) -> Result<Bundle, ConvertError> {
    Converter { doc, options }.convert()
}

/// Side-resource sink for one conversion. Owned by a single call, never
/// shared; resources keep first-synthesis order.
#[derive(Default)]
struct Accumulator {
    resources: Vec<Resource>,
}

impl Accumulator {
    fn push(&mut self, resource: Resource) -> Reference {
        let reference = resource.reference();
        self.resources.push(resource);
        reference
    }
}

/// The section kinds the forward converter dispatches on, resolved from
/// the enclosing section's first template id. A single `Unsupported` arm
/// keeps the closure invariant checkable in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    Allergies,
    Problems,
    HealthConcerns,
    PlanOfTreatment,
    Procedures,
    Results,
    SocialHistory,
    VitalSigns,
    Immunizations,
    Medications,
    Goals,
    Encounters,
    CareTeams,
    MentalStatus,
    Devices,
    ReasonForReferral,
    Notes,
    Payers,
    Assessments,
    Unsupported,
}

pub(crate) fn section_kind(template_root: &str) -> SectionKind {
    match template_root {
        OID_ALLERGIES_SECTION_ENTRIES_OPTIONAL | OID_ALLERGIES_SECTION_ENTRIES_REQUIRED => {
            SectionKind::Allergies
        }
        OID_PROBLEMS_SECTION_ENTRIES_OPTIONAL | OID_PROBLEMS_SECTION_ENTRIES_REQUIRED => {
            SectionKind::Problems
        }
        OID_HEALTH_CONCERNS_SECTION => SectionKind::HealthConcerns,
        OID_PLAN_OF_CARE_SECTION => SectionKind::PlanOfTreatment,
        OID_PROCEDURES_SECTION_ENTRIES_OPTIONAL | OID_PROCEDURES_SECTION_ENTRIES_REQUIRED => {
            SectionKind::Procedures
        }
        OID_RESULTS_SECTION_ENTRIES_OPTIONAL | OID_RESULTS_SECTION_ENTRIES_REQUIRED => {
            SectionKind::Results
        }
        OID_SOCIAL_HISTORY_SECTION => SectionKind::SocialHistory,
        OID_VITAL_SIGNS_SECTION_ENTRIES_OPTIONAL | OID_VITAL_SIGNS_SECTION_ENTRIES_REQUIRED => {
            SectionKind::VitalSigns
        }
        OID_IMMUNIZATIONS_SECTION_ENTRIES_OPTIONAL | OID_IMMUNIZATIONS_SECTION_ENTRIES_REQUIRED => {
            SectionKind::Immunizations
        }
        OID_MEDICATIONS_SECTION_ENTRIES_OPTIONAL | OID_MEDICATIONS_SECTION_ENTRIES_REQUIRED => {
            SectionKind::Medications
        }
        OID_GOALS_SECTION => SectionKind::Goals,
        OID_ENCOUNTERS_SECTION_ENTRIES_OPTIONAL | OID_ENCOUNTERS_SECTION_ENTRIES_REQUIRED => {
            SectionKind::Encounters
        }
        OID_CARE_TEAMS_SECTION => SectionKind::CareTeams,
        OID_MENTAL_STATUS_SECTION => SectionKind::MentalStatus,
        OID_MEDICAL_EQUIPMENT_SECTION => SectionKind::Devices,
        OID_REASON_FOR_REFERRAL => SectionKind::ReasonForReferral,
        OID_NOTES_SECTION => SectionKind::Notes,
        OID_PAYERS_SECTION => SectionKind::Payers,
        OID_ASSESSMENTS_SECTION => SectionKind::Assessments,
        _ => SectionKind::Unsupported,
    }
}

struct Converter<'a> {
    doc: &'a cda::ClinicalDocument,
    options: &'a ConvertOptions,
}

impl<'a> Converter<'a> {
    fn convert(&self) -> Result<Bundle, ConvertError> {
        let mut acc = Accumulator::default();

        let patient = self
            .doc
            .record_target
            .as_ref()
            .and_then(|targets| targets.first())
            .map(|target| self.map_patient(&target.patient_role));
        let patient_ref = patient
            .as_ref()
            .and_then(|p| p.id.as_deref())
            .map(|id| Reference::local("Patient", id));

        if let (Some(reference), Some(participants)) = (&patient_ref, &self.doc.participant) {
            for participant in participants {
                if let Some(related) = self.map_related_person(participant, reference) {
                    acc.push(Resource::RelatedPerson(related));
                }
            }
        }

        let mut sections = Vec::new();
        for section in self.doc.sections() {
            let produced = self.process_section(section, patient_ref.as_ref(), &mut acc)?;
            sections.push(CompositionSection {
                title: section.title.clone(),
                code: map_cda_code_to_concept(section.code.as_ref()),
                text: Some(narrative::narrative_to_div(section)),
                entry: Some(produced.iter().map(Resource::reference).collect()),
            });
            for resource in produced {
                acc.push(resource);
            }
        }

        let composition = self.create_composition(sections, patient_ref.as_ref(), &mut acc);

        let mut resources = Vec::with_capacity(acc.resources.len() + 2);
        resources.push(Resource::Composition(composition));
        if let Some(patient) = patient {
            resources.push(Resource::Patient(patient));
        }
        resources.append(&mut acc.resources);

        if self.options.generate_qrda {
            let params = self.options.qrda.as_ref().ok_or(
                ConvertError::InvalidQrdaParams("qrda parameters required with generate_qrda"),
            )?;
            if let Some(report) = qrda::build_qrda_document_reference(&resources, params)? {
                resources.push(Resource::DocumentReference(report));
            }
        }

        Ok(Bundle {
            r#type: Some("document".to_string()),
            entry: Some(
                resources
                    .into_iter()
                    .map(|resource| BundleEntry { resource: Some(resource) })
                    .collect(),
            ),
            ..Default::default()
        })
    }

    fn create_composition(
        &self,
        sections: Vec<CompositionSection>,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Composition {
        let doc = self.doc;
        Composition {
            id: Some(map_resource_id(doc.id.as_deref())),
            language: doc.language_code.as_ref().and_then(|c| c.code.clone()),
            status: Some("final".to_string()),
            type_: map_cda_code_to_concept(doc.code.as_ref()).or_else(|| {
                Some(CodeableConcept {
                    coding: Some(vec![Coding {
                        system: Some(LOINC.to_string()),
                        code: Some(LOINC_SUMMARY_OF_EPISODE_NOTE.to_string()),
                        display: None,
                    }]),
                    ..Default::default()
                })
            }),
            confidentiality: doc
                .confidentiality_code
                .as_ref()
                .and_then(|c| c.code.clone()),
            subject: patient_ref.cloned(),
            author: self
                .map_author(doc.author.as_ref().and_then(|a| a.first()), acc)
                .map(|reference| vec![reference])
                .or_else(|| {
                    Some(vec![Reference {
                        display: Some("Crosswalk".to_string()),
                        ..Default::default()
                    }])
                }),
            custodian: self.map_custodian(acc),
            event: self.map_documentation_of(),
            date: doc
                .effective_time
                .as_ref()
                .and_then(|times| times.first())
                .and_then(|time| map_cda_to_fhir_date_time(time.point()))
                .or_else(|| {
                    Some(
                        chrono::Utc::now()
                            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                    )
                }),
            title: Some(
                doc.title
                    .clone()
                    .unwrap_or_else(|| "Medical Summary".to_string()),
            ),
            section: Some(sections),
        }
    }

    fn map_documentation_of(&self) -> Option<Vec<CompositionEvent>> {
        let service_event = self.doc.documentation_of.as_ref()?.service_event.as_ref()?;
        Some(vec![CompositionEvent {
            code: map_cda_code_to_concept(service_event.code.as_ref()).map(|c| vec![c]),
            period: service_event
                .effective_time
                .as_ref()
                .and_then(|times| times.first())
                .and_then(map_interval_to_period),
        }])
    }

    fn map_custodian(&self, acc: &mut Accumulator) -> Option<Reference> {
        let organization = &self
            .doc
            .custodian
            .as_ref()?
            .assigned_custodian
            .represented_custodian_organization;
        let resource = Organization {
            id: Some(map_resource_id(organization.id.as_deref())),
            identifier: map_identifiers(organization.id.as_deref()),
            name: first_text(organization.name.as_deref()),
            address: map_addresses(organization.addr.as_deref()),
            telecom: map_telecoms(organization.telecom.as_deref()),
        };
        Some(acc.push(Resource::Organization(resource)))
    }

    fn map_patient(&self, patient_role: &cda::PatientRole) -> Patient {
        let info = patient_role.patient.as_ref();
        let mut extensions = Vec::new();

        if let Some(races) = info.and_then(|i| i.race_code.as_ref()) {
            if let Some(extension) = race_extension(US_CORE_RACE_URL, "ombCategory", races) {
                extensions.push(extension);
            }
        }
        if let Some(detailed) = info.and_then(|i| i.sdtc_race_code.as_ref()) {
            if let Some(extension) = race_extension(US_CORE_RACE_URL, "detailed", detailed) {
                extensions.push(extension);
            }
        }
        if let Some(ethnicities) = info.and_then(|i| i.ethnic_group_code.as_ref()) {
            if let Some(extension) = race_extension(US_CORE_ETHNICITY_URL, "ombCategory", ethnicities)
            {
                extensions.push(extension);
            }
        }

        Patient {
            id: Some(map_resource_id(patient_role.id.as_deref())),
            extension: if extensions.is_empty() { None } else { Some(extensions) },
            identifier: map_identifiers(patient_role.id.as_deref()),
            name: info.and_then(|i| map_names(i.name.as_deref())),
            gender: info
                .and_then(|i| i.administrative_gender_code.as_ref())
                .and_then(|c| c.code.as_deref())
                .map(map_gender),
            birth_date: info
                .and_then(|i| i.birth_time.as_ref())
                .and_then(|t| map_cda_to_fhir_date(t.value.as_deref())),
            address: map_addresses(patient_role.addr.as_deref()),
            telecom: map_telecoms(patient_role.telecom.as_deref()),
            communication: info.and_then(|i| map_communication(i.language_communication.as_deref())),
        }
    }

    fn map_related_person(
        &self,
        participant: &cda::Participant,
        patient_ref: &Reference,
    ) -> Option<RelatedPerson> {
        let entity = participant.associated_entity.as_ref()?;
        Some(RelatedPerson {
            id: Some(map_resource_id(entity.id.as_deref())),
            identifier: map_identifiers(entity.id.as_deref()),
            patient: Some(patient_ref.clone()),
            relationship: map_cda_code_to_concept(entity.code.as_ref()).map(|c| vec![c]),
            name: entity
                .associated_person
                .as_ref()
                .and_then(|person| map_names(person.name.as_deref())),
            address: map_addresses(entity.addr.as_deref()),
            telecom: map_telecoms(entity.telecom.as_deref()),
        })
    }

    fn process_section(
        &self,
        section: &cda::Section,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Result<Vec<Resource>, ConvertError> {
        let kind = section
            .template_id
            .first()
            .and_then(|t| t.root.as_deref())
            .map(section_kind)
            .unwrap_or(SectionKind::Unsupported);
        debug!(section = ?kind, "processing section");

        let mut resources = Vec::new();
        for entry in section.entry.iter().flatten() {
            self.process_entry(kind, entry, patient_ref, &mut resources, acc)?;
        }
        Ok(resources)
    }

    fn process_entry(
        &self,
        kind: SectionKind,
        entry: &cda::EntryNode,
        patient_ref: Option<&Reference>,
        out: &mut Vec<Resource>,
        acc: &mut Accumulator,
    ) -> Result<(), ConvertError> {
        for act in entry.act.iter().flatten() {
            if let Some(resource) = self.process_act(kind, act, patient_ref, acc)? {
                out.push(resource);
            }
        }
        for admin in entry.substance_administration.iter().flatten() {
            if let Some(resource) =
                self.process_substance_administration(kind, admin, patient_ref, acc)?
            {
                out.push(resource);
            }
        }
        for organizer in entry.organizer.iter().flatten() {
            out.push(self.process_organizer(kind, organizer, patient_ref, acc));
        }
        for observation in entry.observation.iter().flatten() {
            out.push(self.process_observation(kind, observation, patient_ref, acc));
        }
        for encounter in entry.encounter.iter().flatten() {
            out.push(self.process_encounter(encounter, patient_ref, acc));
        }
        for procedure in entry.procedure.iter().flatten() {
            out.push(self.process_procedure(procedure, patient_ref));
        }
        Ok(())
    }

    fn unsupported(
        &self,
        kind: &'static str,
        template_id: &str,
    ) -> Result<Option<Resource>, ConvertError> {
        if self.options.ignore_unsupported_sections {
            // Dropped whole; the template id is the audit trail.
            warn!(template_id, kind, "skipping unsupported entry");
            Ok(None)
        } else {
            Err(ConvertError::UnsupportedTemplateId {
                kind,
                template_id: template_id.to_string(),
            })
        }
    }

    fn process_act(
        &self,
        kind: SectionKind,
        act: &cda::Act,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Result<Option<Resource>, ConvertError> {
        match kind {
            SectionKind::Allergies => Ok(self.process_allergy_act(act, patient_ref, acc)),
            SectionKind::Problems | SectionKind::HealthConcerns => {
                Ok(self.process_condition_act(act, patient_ref, acc))
            }
            SectionKind::PlanOfTreatment => Ok(self.process_care_plan_act(act, patient_ref)),
            SectionKind::Procedures => Ok(self.process_procedure_act(act, patient_ref, acc)),
            // Recognized but intentionally unmodeled sections.
            SectionKind::ReasonForReferral | SectionKind::Notes | SectionKind::Payers => Ok(None),
            _ => self.unsupported(
                "act",
                act.template_id
                    .first()
                    .and_then(|t| t.root.as_deref())
                    .unwrap_or("unknown"),
            ),
        }
    }

    fn process_allergy_act(
        &self,
        act: &cda::Act,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Option<Resource> {
        let observation = act
            .entry_relationship
            .as_ref()?
            .iter()
            .find(|rel| rel.type_code.as_deref() == Some("SUBJ"))?
            .first_observation()?;

        let allergen = observation
            .participant
            .as_ref()
            .and_then(|p| p.first())
            .and_then(|p| p.participant_role.as_ref())
            .and_then(|role| role.playing_entity.as_ref())
            .and_then(|entity| entity.code.as_ref());

        let code = allergen.and_then(|allergen_code| {
            let mut concept = map_cda_code_to_concept(Some(allergen_code))?;
            concept.extension = allergen_code
                .original_text
                .as_ref()
                .and_then(|text| narrative::text_extensions(Some(text)));
            Some(concept)
        });

        let category = observation
            .value
            .as_ref()
            .and_then(|value| value.as_code())
            .and_then(|code| code.code.as_deref())
            .and_then(|code| ALLERGY_CATEGORY_MAPPER.cda_to_fhir(code))
            .map(|category| vec![category.to_string()]);

        let reactions: Vec<AllergyIntoleranceReaction> = observation
            .entry_relationship
            .iter()
            .flatten()
            .filter(|rel| rel.type_code.as_deref() == Some("MFST"))
            .flat_map(|rel| rel.observation.iter().flatten())
            .map(|reaction| self.process_reaction(reaction))
            .collect();

        Some(Resource::AllergyIntolerance(AllergyIntolerance {
            id: Some(map_resource_id(act.id.as_deref())),
            extension: narrative::text_extensions(observation.text.as_ref()),
            identifier: map_identifiers(act.id.as_deref()),
            clinical_status: Some(simple_concept(
                ALLERGY_CLINICAL_CODE_SYSTEM,
                ALLERGY_STATUS_MAPPER.cda_to_fhir_or(status_code(&act.status_code), "active"),
                None,
            )),
            verification_status: Some(simple_concept(
                ALLERGY_VERIFICATION_CODE_SYSTEM,
                "confirmed",
                None,
            )),
            type_: Some("allergy".to_string()),
            category,
            code,
            patient: patient_ref.cloned(),
            onset_date_time: first_point_or_low(observation.effective_time.as_deref())
                .and_then(|v| map_cda_to_fhir_date_time(Some(v))),
            recorded_date: first_point_or_low(act.effective_time.as_deref())
                .and_then(|v| map_cda_to_fhir_date_time(Some(v))),
            recorder: self.map_author(act.author.as_ref().and_then(|a| a.first()), acc),
            asserter: self.map_author(observation.author.as_ref().and_then(|a| a.first()), acc),
            reaction: if reactions.is_empty() { None } else { Some(reactions) },
            onset_period: None,
        }))
    }

    fn process_reaction(&self, reaction_obs: &cda::Observation) -> AllergyIntoleranceReaction {
        let mut manifestation =
            map_cda_code_to_concept(reaction_obs.value.as_ref().and_then(|v| v.as_code()));
        if let (Some(concept), Some(anchor)) = (
            manifestation.as_mut(),
            reaction_obs.text.as_ref().and_then(|t| t.reference_value()),
        ) {
            concept.extension = narrative::anchor_extensions(Some(anchor));
        }

        let mut reaction = AllergyIntoleranceReaction {
            id: Some(map_resource_id(reaction_obs.id.as_deref())),
            manifestation: manifestation.map(|m| vec![m]),
            onset: reaction_obs
                .effective_time
                .as_ref()
                .and_then(|times| times.first())
                .and_then(|time| map_cda_to_fhir_date_time(time.low_value())),
            ..Default::default()
        };

        if let Some(severity_obs) = reaction_obs.related_observation("SUBJ") {
            reaction.severity = severity_obs
                .value
                .as_ref()
                .and_then(|v| v.as_code())
                .and_then(|c| c.code.as_deref())
                .and_then(|c| ALLERGY_SEVERITY_MAPPER.cda_to_fhir(c))
                .map(str::to_string);
            reaction.extension = narrative::text_extensions(severity_obs.text.as_ref());
        }

        reaction
    }

    fn process_condition_act(
        &self,
        act: &cda::Act,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Option<Resource> {
        let observation = act
            .entry_relationship
            .as_ref()?
            .iter()
            .find(|rel| rel.type_code.as_deref() == Some("SUBJ"))?
            .first_observation()?;

        let interval = observation
            .effective_time
            .as_ref()
            .and_then(|times| times.first());

        Some(Resource::Condition(Condition {
            id: Some(map_resource_id(act.id.as_deref())),
            meta: Some(Meta { profile: Some(vec![US_CORE_CONDITION_URL.to_string()]) }),
            extension: narrative::text_extensions(observation.text.as_ref()),
            identifier: concat_identifiers(
                map_identifiers(act.id.as_deref()),
                map_identifiers(observation.id.as_deref()),
            ),
            clinical_status: Some(simple_concept(
                CLINICAL_CONDITION_CODE_SYSTEM,
                PROBLEM_STATUS_MAPPER.cda_to_fhir_or(status_code(&act.status_code), "active"),
                None,
            )),
            verification_status: Some(simple_concept(
                CONDITION_VERIFICATION_CODE_SYSTEM,
                "confirmed",
                None,
            )),
            category: Some(vec![simple_concept(
                CONDITION_CATEGORY_CODE_SYSTEM,
                "problem-list-item",
                Some("Problem List Item"),
            )]),
            code: map_cda_code_to_concept(observation.value.as_ref().and_then(|v| v.as_code())),
            subject: patient_ref.cloned(),
            onset_date_time: interval
                .and_then(|time| map_cda_to_fhir_date_time(time.low_value())),
            abatement_date_time: interval
                .and_then(|time| map_cda_to_fhir_date_time(time.high_value())),
            recorded_date: first_point_or_low(act.effective_time.as_deref())
                .and_then(|v| map_cda_to_fhir_date_time(Some(v))),
            recorder: self.map_author(observation.author.as_ref().and_then(|a| a.first()), acc),
            asserter: self.map_author(observation.author.as_ref().and_then(|a| a.first()), acc),
        }))
    }

    fn process_care_plan_act(
        &self,
        act: &cda::Act,
        patient_ref: Option<&Reference>,
    ) -> Option<Resource> {
        Some(Resource::CarePlan(CarePlan {
            id: Some(map_resource_id(act.id.as_deref())),
            identifier: map_identifiers(act.id.as_deref()),
            status: Some("completed".to_string()),
            intent: Some("plan".to_string()),
            title: Some("CARE PLAN".to_string()),
            category: map_cda_code_to_concept(act.code.as_ref()).map(|c| vec![c]),
            subject: patient_ref.cloned(),
            description: act.text.as_ref().and_then(|t| t.as_plain()).map(str::to_string),
            extension: narrative::text_extensions(act.text.as_ref()),
        }))
    }

    fn process_procedure_act(
        &self,
        act: &cda::Act,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Option<Resource> {
        Some(Resource::Procedure(Procedure {
            id: Some(map_resource_id(act.id.as_deref())),
            identifier: map_identifiers(act.id.as_deref()),
            status: Some("completed".to_string()),
            code: map_cda_code_to_concept(act.code.as_ref()),
            subject: patient_ref.cloned(),
            performed_date_time: first_point_or_low(act.effective_time.as_deref())
                .and_then(|v| map_cda_to_fhir_date_time(Some(v))),
            recorder: self.map_author(act.author.as_ref().and_then(|a| a.first()), acc),
            asserter: self.map_author(act.author.as_ref().and_then(|a| a.first()), acc),
            extension: narrative::text_extensions(act.text.as_ref()),
            ..Default::default()
        }))
    }

    fn process_substance_administration(
        &self,
        kind: SectionKind,
        admin: &cda::SubstanceAdministration,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Result<Option<Resource>, ConvertError> {
        match kind {
            SectionKind::Medications | SectionKind::PlanOfTreatment => {
                Ok(self.process_medication(admin, patient_ref, acc))
            }
            SectionKind::Immunizations => Ok(self.process_immunization(admin, patient_ref, acc)),
            _ => self.unsupported(
                "substance administration",
                admin
                    .template_id
                    .first()
                    .and_then(|t| t.root.as_deref())
                    .unwrap_or("unknown"),
            ),
        }
    }

    fn process_medication(
        &self,
        admin: &cda::SubstanceAdministration,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Option<Resource> {
        let id = map_resource_id(admin.id.as_deref());
        let material = admin.first_material();
        let medication_code = material.and_then(|m| m.code.as_ref()).and_then(|c| c.first());
        let manufacturer = admin.manufacturer();

        let instructions = admin
            .entry_relationship
            .iter()
            .flatten()
            .filter_map(|rel| rel.substance_administration.as_ref()?.first())
            .find(|nested| {
                nested
                    .template_id
                    .first()
                    .and_then(|t| t.root.as_deref())
                    == Some(OID_MEDICATION_FREE_TEXT_SIG)
            });

        let code_extensions = medication_code
            .and_then(|code| code.original_text.as_ref())
            .and_then(|text| narrative::text_extensions(Some(text)));

        // A manufacturer forces a contained Medication so the round trip
        // keeps the organization; otherwise an inline concept suffices.
        let (contained, medication_reference, medication_codeable_concept) =
            if let Some(org) = manufacturer {
                let medication = Medication {
                    id: Some(format!("med-{id}")),
                    code: map_cda_code_to_concept(medication_code),
                    extension: code_extensions,
                    manufacturer: Some(Reference {
                        identifier: org
                            .id
                            .as_ref()
                            .and_then(|ids| ids.first())
                            .and_then(|id| id.root.clone())
                            .map(|value| Identifier { system: None, value: Some(value) }),
                        display: first_text(org.name.as_deref()),
                        ..Default::default()
                    }),
                };
                (
                    Some(vec![Resource::Medication(medication)]),
                    Some(Reference {
                        reference: Some(format!("#med-{id}")),
                        ..Default::default()
                    }),
                    None,
                )
            } else {
                let concept = map_cda_code_to_concept(medication_code).map(|mut c| {
                    c.extension = code_extensions;
                    c
                });
                (None, None, concept)
            };

        let validity = admin
            .effective_time
            .as_ref()
            .and_then(|times| times.iter().find(|t| t.period.is_none()));
        let timing = admin
            .effective_time
            .as_ref()
            .and_then(|times| times.iter().find_map(|t| t.period.as_ref()));

        Some(Resource::MedicationRequest(MedicationRequest {
            id: Some(id),
            contained,
            meta: Some(Meta {
                profile: Some(vec![US_CORE_MEDICATION_REQUEST_URL.to_string()]),
            }),
            extension: narrative::text_extensions(admin.text.as_ref()),
            status: Some(
                MEDICATION_STATUS_MAPPER
                    .cda_to_fhir_or(status_code(&admin.status_code), "active")
                    .to_string(),
            ),
            intent: Some("order".to_string()),
            medication_reference,
            medication_codeable_concept,
            subject: patient_ref.cloned(),
            authored_on: admin
                .author
                .as_ref()
                .and_then(|authors| authors.first())
                .and_then(|author| author.time.as_ref())
                .and_then(|time| map_cda_to_fhir_date_time(time.value.as_deref())),
            requester: self.map_author(admin.author.as_ref().and_then(|a| a.first()), acc),
            dispense_request: validity
                .filter(|time| time.low.is_some() || time.high.is_some())
                .map(|time| MedicationRequestDispenseRequest {
                    validity_period: Some(Period {
                        start: map_cda_to_fhir_date_time(time.low_value()),
                        end: map_cda_to_fhir_date_time(time.high_value()),
                    }),
                }),
            dosage_instruction: Some(vec![Dosage {
                text: admin.text.as_ref().and_then(|t| match t {
                    cda::EntryText::Plain(s) => Some(s.clone()),
                    cda::EntryText::Referenced(_) => None,
                }),
                extension: instructions
                    .and_then(|nested| narrative::text_extensions(nested.text.as_ref())),
                route: map_cda_code_to_concept(admin.route_code.as_ref()),
                timing: timing.map(|period| Timing {
                    repeat: Some(TimingRepeat {
                        period: period.value.as_deref().and_then(|v| v.parse().ok()),
                        period_unit: period.unit.clone(),
                    }),
                }),
                dose_and_rate: admin.dose_quantity.as_ref().map(|dose| {
                    vec![DosageDoseAndRate {
                        dose_quantity: Some(Quantity {
                            value: dose.value.as_deref().and_then(|v| v.parse().ok()),
                            unit: dose.unit.clone(),
                            system: Some(UCUM.to_string()),
                            code: dose.unit.clone(),
                        }),
                    }]
                }),
            }]),
            ..Default::default()
        }))
    }

    fn process_immunization(
        &self,
        admin: &cda::SubstanceAdministration,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Option<Resource> {
        admin.consumable.as_ref()?;
        let material = admin.first_material();

        let performers: Vec<ImmunizationPerformer> = admin
            .performer
            .iter()
            .flatten()
            .filter_map(|performer| {
                let actor = self.map_assigned_entity(performer.assigned_entity.as_ref(), acc)?;
                Some(ImmunizationPerformer { actor: Some(actor) })
            })
            .collect();

        Some(Resource::Immunization(Immunization {
            id: Some(map_resource_id(admin.id.as_deref())),
            extension: narrative::text_extensions(admin.text.as_ref()),
            identifier: map_identifiers(admin.id.as_deref()),
            status: Some(
                IMMUNIZATION_STATUS_MAPPER
                    .cda_to_fhir_or(status_code(&admin.status_code), "completed")
                    .to_string(),
            ),
            vaccine_code: map_cda_code_to_concept(
                material.and_then(|m| m.code.as_ref()).and_then(|c| c.first()),
            ),
            patient: patient_ref.cloned(),
            occurrence_date_time: first_point_or_low(admin.effective_time.as_deref())
                .and_then(|v| map_cda_to_fhir_date_time(Some(v))),
            lot_number: material
                .and_then(|m| m.lot_number_text.as_ref())
                .and_then(|lots| lots.first())
                .and_then(|lot| lot.as_str())
                .map(str::to_string),
            manufacturer: admin.manufacturer().map(|org| Reference {
                display: first_text(org.name.as_deref()),
                ..Default::default()
            }),
            performer: if performers.is_empty() { None } else { Some(performers) },
        }))
    }

    fn process_organizer(
        &self,
        kind: SectionKind,
        organizer: &cda::Organizer,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Resource {
        if kind == SectionKind::CareTeams {
            self.process_care_team_organizer(organizer, acc)
        } else {
            self.process_vitals_organizer(organizer, patient_ref, acc)
        }
    }

    fn process_care_team_organizer(
        &self,
        organizer: &cda::Organizer,
        acc: &mut Accumulator,
    ) -> Resource {
        let participants: Vec<CareTeamParticipant> = organizer
            .component
            .iter()
            .filter_map(|component| self.process_care_team_member(component, acc))
            .collect();

        Resource::CareTeam(CareTeam {
            id: Some(map_resource_id(organizer.id.as_deref())),
            identifier: map_identifiers(organizer.id.as_deref()),
            participant: if participants.is_empty() { None } else { Some(participants) },
        })
    }

    fn process_care_team_member(
        &self,
        component: &cda::OrganizerComponent,
        acc: &mut Accumulator,
    ) -> Option<CareTeamParticipant> {
        let act = component.act.as_ref()?.first()?;
        let performer = act.performer.as_ref()?.first()?;

        Some(CareTeamParticipant {
            role: map_cda_code_to_concept(performer.function_code.as_ref()).map(|c| vec![c]),
            member: self.map_assigned_entity(performer.assigned_entity.as_ref(), acc),
            period: act
                .effective_time
                .as_ref()
                .and_then(|times| times.first())
                .and_then(map_interval_to_period),
        })
    }

    fn process_vitals_organizer(
        &self,
        organizer: &cda::Organizer,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Resource {
        let mut members = Vec::new();
        for component in &organizer.component {
            for observation in component.observation.iter().flatten() {
                let child = self.process_vitals_observation(observation, patient_ref, acc);
                members.push(acc.push(Resource::Observation(child)));
            }
        }

        Resource::Observation(Observation {
            id: Some(map_resource_id(organizer.id.as_deref())),
            identifier: map_identifiers(organizer.id.as_deref()),
            status: Some("final".to_string()),
            category: map_observation_categories(&organizer.template_id),
            code: map_cda_code_to_concept(organizer.code.as_ref()),
            subject: patient_ref.cloned(),
            effective_date_time: organizer
                .effective_time
                .as_ref()
                .and_then(|times| times.first())
                .and_then(|time| map_cda_to_fhir_date_time(time.point())),
            has_member: if members.is_empty() { None } else { Some(members) },
            ..Default::default()
        })
    }

    fn process_observation(
        &self,
        kind: SectionKind,
        observation: &cda::Observation,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Resource {
        let own_template = observation
            .template_id
            .first()
            .and_then(|t| t.root.as_deref());
        if own_template == Some(OID_GOAL_OBSERVATION)
            || own_template == Some(OID_GOALS_SECTION)
            || matches!(kind, SectionKind::PlanOfTreatment | SectionKind::Goals)
        {
            self.process_goal_observation(observation, patient_ref)
        } else {
            Resource::Observation(self.process_vitals_observation(observation, patient_ref, acc))
        }
    }

    fn process_goal_observation(
        &self,
        observation: &cda::Observation,
        patient_ref: Option<&Reference>,
    ) -> Resource {
        let description = match &observation.value {
            Some(value) => match value {
                cda::ObservationValue::Cd(code) | cda::ObservationValue::Ce(code) => {
                    map_cda_code_to_concept(Some(code))
                }
                cda::ObservationValue::St { text } => Some(CodeableConcept {
                    text: Some(text.clone().unwrap_or_default()),
                    ..Default::default()
                }),
                _ => None,
            },
            None => None,
        };

        let targets: Vec<GoalTarget> = observation
            .entry_relationship
            .iter()
            .flatten()
            .filter_map(|rel| {
                let act = rel.act.as_ref()?.first()?;
                Some(GoalTarget {
                    measure: map_cda_code_to_concept(act.code.as_ref()),
                    detail_codeable_concept: map_cda_code_to_concept(act.code.as_ref()),
                    due_date: act
                        .effective_time
                        .as_ref()
                        .and_then(|times| times.first())
                        .and_then(|time| {
                            map_cda_to_fhir_date_time(time.low_value().or(time.point()))
                        }),
                })
            })
            .collect();

        Resource::Goal(Goal {
            id: Some(map_resource_id(observation.id.as_deref())),
            extension: narrative::text_extensions(observation.text.as_ref()),
            identifier: map_identifiers(observation.id.as_deref()),
            lifecycle_status: Some(map_goal_lifecycle_status(status_code(
                &observation.status_code,
            ))),
            category: map_cda_code_to_concept(observation.code.as_ref()).map(|c| vec![c]),
            description: description.or_else(|| {
                Some(CodeableConcept {
                    text: Some("Unknown goal".to_string()),
                    ..Default::default()
                })
            }),
            subject: patient_ref.cloned(),
            start_date: first_point_or_low(observation.effective_time.as_deref())
                .and_then(|v| map_cda_to_fhir_date(Some(v))),
            target: if targets.is_empty() { None } else { Some(targets) },
        })
    }

    fn process_vitals_observation(
        &self,
        observation: &cda::Observation,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Observation {
        let mut result = Observation {
            id: Some(map_resource_id(observation.id.as_deref())),
            extension: narrative::text_extensions(observation.text.as_ref()),
            identifier: map_identifiers(observation.id.as_deref()),
            status: Some("final".to_string()),
            category: map_observation_categories(&observation.template_id),
            code: map_cda_code_to_concept(observation.code.as_ref()),
            subject: patient_ref.cloned(),
            effective_date_time: observation
                .effective_time
                .as_ref()
                .and_then(|times| times.first())
                .and_then(|time| map_cda_to_fhir_date_time(time.point())),
            reference_range: map_reference_ranges(observation.reference_range.as_deref()),
            performer: {
                let performers: Vec<Reference> = observation
                    .author
                    .iter()
                    .flatten()
                    .filter_map(|author| self.map_author(Some(author), acc))
                    .collect();
                if performers.is_empty() { None } else { Some(performers) }
            },
            ..Default::default()
        };

        match &observation.value {
            Some(cda::ObservationValue::Pq(quantity))
            | Some(cda::ObservationValue::Co(quantity)) => {
                result.value_quantity = Some(Quantity {
                    value: quantity.value.as_deref().and_then(|v| v.parse().ok()),
                    unit: quantity.unit.clone(),
                    system: Some(UCUM.to_string()),
                    code: quantity.unit.clone(),
                });
            }
            Some(cda::ObservationValue::Cd(code)) | Some(cda::ObservationValue::Ce(code)) => {
                result.value_codeable_concept = map_cda_code_to_concept(Some(code));
            }
            Some(cda::ObservationValue::St { text }) => {
                result.value_string = Some(text.clone().unwrap_or_default());
            }
            Some(cda::ObservationValue::Int { value }) => {
                result.value_integer = value.as_deref().and_then(|v| v.parse().ok());
            }
            Some(other) => {
                warn!(value = ?other, "unhandled observation value type");
            }
            None => {}
        }

        // Child observations become standalone resources linked through
        // hasMember.
        let mut members = Vec::new();
        for rel in observation.entry_relationship.iter().flatten() {
            for child in rel.observation.iter().flatten() {
                let resource = self.process_vitals_observation(child, patient_ref, acc);
                members.push(acc.push(Resource::Observation(resource)));
            }
        }
        if !members.is_empty() {
            result.has_member = Some(members);
        }

        result
    }

    fn process_encounter(
        &self,
        encounter: &cda::Encounter,
        patient_ref: Option<&Reference>,
        acc: &mut Accumulator,
    ) -> Resource {
        let mut diagnoses = Vec::new();
        for rel in encounter.entry_relationship.iter().flatten() {
            if rel.type_code.as_deref() != Some("RSON") {
                continue;
            }
            let Some(observation) = rel.first_observation() else {
                continue;
            };
            let condition = Condition {
                id: Some(map_resource_id(observation.id.as_deref())),
                identifier: map_identifiers(observation.id.as_deref()),
                clinical_status: Some(simple_concept(CLINICAL_CONDITION_CODE_SYSTEM, "active", None)),
                verification_status: Some(simple_concept(
                    CONDITION_VER_STATUS_CODE_SYSTEM,
                    "confirmed",
                    None,
                )),
                code: map_cda_code_to_concept(observation.value.as_ref().and_then(|v| v.as_code())),
                subject: patient_ref.cloned(),
                onset_date_time: observation
                    .effective_time
                    .as_ref()
                    .and_then(|times| times.first())
                    .and_then(|time| map_cda_to_fhir_date_time(time.low_value())),
                ..Default::default()
            };
            let reference = acc.push(Resource::Condition(condition));
            diagnoses.push(EncounterDiagnosis {
                condition: Some(reference),
                use_: Some(simple_concept(
                    DIAGNOSIS_ROLE_CODE_SYSTEM,
                    "AD",
                    Some("Admission diagnosis"),
                )),
                rank: None,
            });
        }

        let participants: Vec<EncounterParticipant> = encounter
            .performer
            .iter()
            .flatten()
            .map(|performer| EncounterParticipant {
                type_: Some(vec![simple_concept(
                    PARTICIPATION_CODE_SYSTEM,
                    performer.type_code.as_deref().unwrap_or("PPRF"),
                    Some("Primary Performer"),
                )]),
                individual: self.map_assigned_entity(performer.assigned_entity.as_ref(), acc),
            })
            .collect();

        Resource::Encounter(Encounter {
            id: Some(map_resource_id(encounter.id.as_deref())),
            extension: narrative::text_extensions(encounter.text.as_ref()),
            identifier: map_identifiers(encounter.id.as_deref()),
            status: Some(
                ENCOUNTER_STATUS_MAPPER
                    .cda_to_fhir_or(status_code(&encounter.status_code), "unknown")
                    .to_string(),
            ),
            class: Some(Coding {
                system: Some(ACT_CODE_SYSTEM.to_string()),
                code: Some(
                    encounter
                        .code
                        .as_ref()
                        .and_then(|c| c.code.clone())
                        .unwrap_or_else(|| "AMB".to_string()),
                ),
                display: Some(
                    encounter
                        .code
                        .as_ref()
                        .and_then(|c| c.display_name.clone())
                        .unwrap_or_else(|| "Ambulatory".to_string()),
                ),
            }),
            type_: map_cda_code_to_concept(encounter.code.as_ref()).map(|c| vec![c]),
            subject: patient_ref.cloned(),
            participant: if participants.is_empty() { None } else { Some(participants) },
            period: encounter
                .effective_time
                .as_ref()
                .and_then(|times| times.first())
                .and_then(map_interval_to_period),
            diagnosis: if diagnoses.is_empty() { None } else { Some(diagnoses) },
        })
    }

    fn process_procedure(
        &self,
        procedure: &cda::Procedure,
        patient_ref: Option<&Reference>,
    ) -> Resource {
        let time = procedure
            .effective_time
            .as_ref()
            .and_then(|times| times.first());
        Resource::Procedure(Procedure {
            id: Some(map_resource_id(procedure.id.as_deref())),
            extension: narrative::text_extensions(procedure.text.as_ref()),
            identifier: map_identifiers(procedure.id.as_deref()),
            status: Some(
                PROCEDURE_STATUS_MAPPER
                    .cda_to_fhir_or(status_code(&procedure.status_code), "completed")
                    .to_string(),
            ),
            code: map_cda_code_to_concept(procedure.code.as_ref()),
            subject: patient_ref.cloned(),
            performed_date_time: time
                .and_then(|t| map_cda_to_fhir_date_time(t.point())),
            performed_period: time.and_then(map_interval_to_period),
            body_site: map_cda_code_to_concept(procedure.target_site_code.as_ref())
                .map(|c| vec![c]),
            ..Default::default()
        })
    }

    /// Synthesize a Practitioner from an author participation and return
    /// a reference to it.
    fn map_author(&self, author: Option<&cda::Author>, acc: &mut Accumulator) -> Option<Reference> {
        let author = author?;
        let assigned = author.assigned_author.as_ref();

        // Device authors carry no person; nothing useful to synthesize.
        if assigned.map_or(true, |a| {
            a.assigned_person.is_none() && a.id.is_none() && a.code.is_none()
        }) {
            return None;
        }

        let practitioner = Practitioner {
            id: Some(map_resource_id(assigned.and_then(|a| a.id.as_deref()))),
            identifier: map_identifiers(assigned.and_then(|a| a.id.as_deref())),
            name: assigned
                .and_then(|a| a.assigned_person.as_ref())
                .and_then(|person| map_names(person.name.as_deref())),
            address: map_addresses(assigned.and_then(|a| a.addr.as_deref())),
            telecom: map_telecoms(assigned.and_then(|a| a.telecom.as_deref())),
            qualification: assigned
                .and_then(|a| map_cda_code_to_concept(a.code.as_ref()))
                .map(|code| vec![PractitionerQualification { code: Some(code) }]),
        };

        Some(acc.push(Resource::Practitioner(practitioner)))
    }

    /// Synthesize Practitioner + Organization + PractitionerRole from an
    /// assigned entity and return a reference to the role.
    fn map_assigned_entity(
        &self,
        entity: Option<&cda::AssignedEntity>,
        acc: &mut Accumulator,
    ) -> Option<Reference> {
        let entity = entity?;

        let practitioner = Practitioner {
            id: Some(map_resource_id(entity.id.as_deref())),
            identifier: map_identifiers(entity.id.as_deref()),
            name: entity
                .assigned_person
                .as_ref()
                .and_then(|person| map_names(person.name.as_deref())),
            address: map_addresses(entity.addr.as_deref()),
            telecom: map_telecoms(entity.telecom.as_deref()),
            qualification: None,
        };
        let practitioner_ref = acc.push(Resource::Practitioner(practitioner));

        let organization = entity.represented_organization.as_ref();
        let organization_ref = organization.map(|org| {
            acc.push(Resource::Organization(Organization {
                id: Some(map_resource_id(org.id.as_deref())),
                identifier: map_identifiers(org.id.as_deref()),
                name: first_text(org.name.as_deref()),
                address: map_addresses(org.addr.as_deref()),
                telecom: map_telecoms(org.telecom.as_deref()),
            }))
        });

        let role = PractitionerRole {
            id: Some(Uuid::new_v4().to_string()),
            practitioner: Some(practitioner_ref),
            organization: organization_ref,
        };
        Some(acc.push(Resource::PractitionerRole(role)))
    }
}

/// US Core race/ethnicity: each document code becomes one nested
/// extension carrying the coding unchanged. A leading nullFlavor means
/// the demographic was explicitly unknown and maps to nothing.
fn race_extension(url: &str, nested_url: &str, codes: &[cda::Code]) -> Option<Extension> {
    if codes.is_empty() || codes[0].null_flavor.is_some() {
        return None;
    }
    let nested: Vec<Extension> = codes
        .iter()
        .map(|code| Extension {
            url: nested_url.to_string(),
            value_coding: map_cda_code_to_coding(Some(code)),
            ..Default::default()
        })
        .collect();
    Some(Extension {
        url: url.to_string(),
        extension: Some(nested),
        ..Default::default()
    })
}

/// The identity convention: a UUID root with no extension denotes the
/// resource's own id. Anything else gets a freshly generated id.
pub(crate) fn map_resource_id(ids: Option<&[cda::InstanceIdentifier]>) -> String {
    ids.iter()
        .flat_map(|ids| ids.iter())
        .find(|id| id.extension.is_none() && id.root.as_deref().is_some_and(is_uuid))
        .and_then(|id| id.root.clone())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub(crate) fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// All ids other than the resource-id carrier become identifier entries.
pub(crate) fn map_identifiers(
    ids: Option<&[cda::InstanceIdentifier]>,
) -> Option<Vec<Identifier>> {
    let ids = ids?;
    let result: Vec<Identifier> = ids
        .iter()
        .filter(|id| !(id.extension.is_none() && id.root.as_deref().is_some_and(is_uuid)))
        .map(|id| Identifier {
            system: map_cda_system_to_fhir(id.root.as_deref()),
            value: id.extension.clone(),
        })
        .collect();
    Some(result)
}

fn concat_identifiers(
    first: Option<Vec<Identifier>>,
    second: Option<Vec<Identifier>>,
) -> Option<Vec<Identifier>> {
    match (first, second) {
        (None, second) => second,
        (first, None) => first,
        (Some(mut first), Some(second)) => {
            first.extend(second);
            Some(first)
        }
    }
}

pub(crate) fn map_names(names: Option<&[cda::PersonName]>) -> Option<Vec<HumanName>> {
    let names = names?;
    if names.is_empty() {
        return None;
    }
    Some(
        names
            .iter()
            .map(|name| HumanName {
                use_: name
                    .use_
                    .as_deref()
                    .and_then(|u| HUMAN_NAME_USE_MAPPER.cda_to_fhir(u))
                    .map(str::to_string),
                prefix: text_values(name.prefix.as_deref()),
                given: text_values(name.given.as_deref()),
                family: name.family.as_ref().and_then(|f| f.as_str()).map(str::to_string),
                suffix: text_values(name.suffix.as_deref()),
                period: None,
            })
            .collect(),
    )
}

fn text_values(values: Option<&[cda::TextValue]>) -> Option<Vec<String>> {
    let values = values?;
    let result: Vec<String> = values
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::to_string)
        .collect();
    if result.is_empty() { None } else { Some(result) }
}

pub(crate) fn first_text(values: Option<&[cda::TextValue]>) -> Option<String> {
    values?
        .first()
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

pub(crate) fn map_addresses(addrs: Option<&[cda::Addr]>) -> Option<Vec<Address>> {
    let addrs = addrs?;
    if addrs.is_empty() || addrs.iter().all(|a| a.null_flavor.as_deref() == Some("UNK")) {
        return None;
    }
    Some(
        addrs
            .iter()
            .map(|addr| Address {
                use_: addr
                    .use_
                    .as_deref()
                    .and_then(|u| ADDRESS_USE_MAPPER.cda_to_fhir(u))
                    .map(str::to_string),
                line: addr.street_address_line.clone(),
                city: addr.city.clone(),
                state: addr.state.clone(),
                postal_code: addr.postal_code.clone(),
                country: addr.country.clone(),
            })
            .collect(),
    )
}

pub(crate) fn map_telecoms(telecoms: Option<&[cda::Telecom]>) -> Option<Vec<ContactPoint>> {
    let telecoms = telecoms?;
    if telecoms.is_empty()
        || telecoms.iter().all(|t| t.null_flavor.as_deref() == Some("UNK"))
    {
        return None;
    }
    Some(
        telecoms
            .iter()
            .map(|telecom| ContactPoint {
                use_: telecom
                    .use_
                    .as_deref()
                    .and_then(|u| TELECOM_USE_MAPPER.cda_to_fhir(u))
                    .map(str::to_string),
                system: telecom.value.as_deref().map(telecom_system),
                value: telecom
                    .value
                    .as_deref()
                    .map(|v| v.trim_start_matches("tel:").trim_start_matches("mailto:"))
                    .map(str::to_string),
            })
            .collect(),
    )
}

fn telecom_system(value: &str) -> String {
    if value.starts_with("tel:") {
        "phone".to_string()
    } else if value.starts_with("mailto:") {
        "email".to_string()
    } else {
        "other".to_string()
    }
}

fn map_communication(
    communications: Option<&[cda::LanguageCommunication]>,
) -> Option<Vec<PatientCommunication>> {
    let communications = communications?;
    if communications.is_empty() {
        return None;
    }
    Some(
        communications
            .iter()
            .map(|communication| PatientCommunication {
                language: communication.language_code.as_ref().map(|code| CodeableConcept {
                    coding: Some(vec![Coding {
                        system: Some("urn:ietf:bcp:47".to_string()),
                        code: code.code.clone(),
                        display: None,
                    }]),
                    ..Default::default()
                }),
                preferred: None,
            })
            .collect(),
    )
}

/// Gender codes outside the administrative set pass through unmapped so
/// non-enumerated gender identities survive the round trip.
fn map_gender(code: &str) -> String {
    GENDER_MAPPER
        .cda_to_fhir(code)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

fn map_goal_lifecycle_status(status: Option<&str>) -> String {
    match status {
        Some("completed") => "completed",
        Some("cancelled") | Some("aborted") => "cancelled",
        _ => "active",
    }
    .to_string()
}

fn map_observation_categories(template_ids: &[cda::TemplateId]) -> Option<Vec<CodeableConcept>> {
    let mut seen = Vec::new();
    let mut result = Vec::new();
    for template_id in template_ids {
        let Some(root) = template_id.root.as_deref() else { continue };
        let Some(concept) = OBSERVATION_CATEGORY_MAPPER.cda_to_fhir_concept(root) else {
            continue;
        };
        let code = concept.first_code().map(str::to_string);
        if let Some(code) = code {
            if !seen.contains(&code) {
                seen.push(code);
                result.push(concept);
            }
        }
    }
    if result.is_empty() { None } else { Some(result) }
}

fn map_reference_ranges(
    ranges: Option<&[cda::ReferenceRange]>,
) -> Option<Vec<ObservationReferenceRange>> {
    let ranges = ranges?;
    if ranges.is_empty() {
        return None;
    }
    Some(
        ranges
            .iter()
            .filter_map(|range| {
                let observation_range = range.observation_range.as_ref()?;
                Some(ObservationReferenceRange {
                    extension: narrative::text_extensions(observation_range.text.as_ref()),
                    text: observation_range
                        .text
                        .as_ref()
                        .and_then(|t| t.as_plain())
                        .map(str::to_string),
                })
            })
            .collect(),
    )
}

fn status_code(code: &Option<cda::Code>) -> Option<&str> {
    code.as_ref().and_then(|c| c.code.as_deref())
}

fn first_point_or_low(times: Option<&[cda::EffectiveTime]>) -> Option<&str> {
    let time = times?.first()?;
    time.point().or_else(|| time.low_value())
}

fn map_interval_to_period(time: &cda::EffectiveTime) -> Option<Period> {
    if time.value.is_none() && (time.low.is_some() || time.high.is_some()) {
        Some(Period {
            start: map_cda_to_fhir_date_time(time.low_value()),
            end: map_cda_to_fhir_date_time(time.high_value()),
        })
    } else {
        None
    }
}

fn simple_concept(system: &str, code: &str, display: Option<&str>) -> CodeableConcept {
    CodeableConcept {
        coding: Some(vec![Coding {
            system: Some(system.to_string()),
            code: Some(code.to_string()),
            display: display.map(str::to_string),
        }]),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_root_without_extension_is_resource_id() {
        let ids = vec![cda::InstanceIdentifier {
            root: Some("bc01a5d1-3a34-4286-82cc-43eb04c972a7".to_string()),
            ..Default::default()
        }];
        assert_eq!(map_resource_id(Some(&ids)), "bc01a5d1-3a34-4286-82cc-43eb04c972a7");
        // And it is excluded from the identifier list.
        assert_eq!(map_identifiers(Some(&ids)).unwrap().len(), 0);
    }

    #[test]
    fn non_uuid_root_becomes_identifier() {
        let ids = vec![cda::InstanceIdentifier {
            root: Some("2.16.840.1.113883.4.1".to_string()),
            extension: Some("999-99-9999".to_string()),
            ..Default::default()
        }];
        let generated = map_resource_id(Some(&ids));
        assert!(is_uuid(&generated));
        let identifiers = map_identifiers(Some(&ids)).unwrap();
        assert_eq!(identifiers.len(), 1);
        assert_eq!(identifiers[0].system.as_deref(), Some(US_SSN_URL));
        assert_eq!(identifiers[0].value.as_deref(), Some("999-99-9999"));
    }

    #[test]
    fn uuid_root_with_extension_is_not_resource_id() {
        let ids = vec![cda::InstanceIdentifier {
            root: Some("bc01a5d1-3a34-4286-82cc-43eb04c972a7".to_string()),
            extension: Some("MRN-1".to_string()),
            ..Default::default()
        }];
        let generated = map_resource_id(Some(&ids));
        assert_ne!(generated, "bc01a5d1-3a34-4286-82cc-43eb04c972a7");
        assert_eq!(map_identifiers(Some(&ids)).unwrap().len(), 1);
    }

    #[test]
    fn gender_passes_unmapped_codes_through() {
        assert_eq!(map_gender("F"), "female");
        assert_eq!(map_gender("33791000087105"), "33791000087105");
    }

    #[test]
    fn addresses_all_unknown_collapse_to_none() {
        let addrs = vec![cda::Addr {
            null_flavor: Some("UNK".to_string()),
            ..Default::default()
        }];
        assert!(map_addresses(Some(&addrs)).is_none());
    }

    #[test]
    fn telecom_prefix_drives_system() {
        let telecoms = vec![cda::Telecom {
            value: Some("tel:+1-555-0100".to_string()),
            use_: Some("HP".to_string()),
            ..Default::default()
        }];
        let mapped = map_telecoms(Some(&telecoms)).unwrap();
        assert_eq!(mapped[0].system.as_deref(), Some("phone"));
        assert_eq!(mapped[0].value.as_deref(), Some("+1-555-0100"));
        assert_eq!(mapped[0].use_.as_deref(), Some("home"));
    }
}
