//! C-CDA document structs.
//!
//! No validation here, just data representation. Optional scalars are
//! `Option`, repeatable elements are `Vec` (see `ALWAYS_ARRAY` in the
//! crate root), and attributes carry `@_` renames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A text-bearing node that may appear as a plain string or as an element
/// with `#text` content (`<given>John</given>` vs `<given qualifier="CL">…`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextValue {
    Plain(String),
    Node {
        #[serde(rename = "#text", skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl TextValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TextValue::Plain(s) => Some(s),
            TextValue::Node { text } => text.as_deref(),
        }
    }
}

impl From<&str> for TextValue {
    fn from(s: &str) -> Self {
        TextValue::Plain(s.to_string())
    }
}

impl From<String> for TextValue {
    fn from(s: String) -> Self {
        TextValue::Plain(s)
    }
}

/// A `text` element on a clinical statement: either inline prose or a
/// reference anchor into the section narrative (`<reference value="#x"/>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryText {
    Plain(String),
    Referenced(TextReference),
}

impl EntryText {
    /// The narrative anchor, when present.
    pub fn reference_value(&self) -> Option<&str> {
        match self {
            EntryText::Plain(_) => None,
            EntryText::Referenced(t) => t.reference.as_ref().and_then(|r| r.value.as_deref()),
        }
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self {
            EntryText::Plain(s) => Some(s),
            EntryText::Referenced(t) => t.text.as_deref(),
        }
    }

    pub fn from_reference(anchor: &str) -> EntryText {
        EntryText::Referenced(TextReference {
            reference: Some(ReferenceValue {
                value: Some(anchor.to_string()),
                null_flavor: None,
            }),
            text: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceValue>,
    #[serde(rename = "#text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceValue {
    #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RealmCode {
    #[serde(rename = "@_code", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeId {
    #[serde(rename = "@_root", skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(rename = "@_extension", skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateId {
    #[serde(rename = "@_root", skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(rename = "@_extension", skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

/// `II` — root/extension instance identifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstanceIdentifier {
    #[serde(rename = "@_root", skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(rename = "@_extension", skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(
        rename = "@_assigningAuthorityName",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigning_authority_name: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
}

/// `CD`/`CE` — coded value with optional translations and original text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    #[serde(rename = "@_code", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "@_displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "@_codeSystem", skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    #[serde(rename = "@_codeSystemName", skip_serializing_if = "Option::is_none")]
    pub code_system_name: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<EntryText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec<Code>>,
}

/// `PQ` — value/unit physical quantity (also dose quantities).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "@_unit", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeStamp {
    #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
}

/// `IVL_TS`/`PIVL_TS` — point, interval, or periodic effective time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectiveTime {
    #[serde(rename = "@_xsi:type", skip_serializing_if = "Option::is_none")]
    pub xsi_type: Option<String>,
    #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "@_operator", skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(
        rename = "@_institutionSpecified",
        skip_serializing_if = "Option::is_none"
    )]
    pub institution_specified: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<TimeStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<TimeStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Quantity>,
}

impl EffectiveTime {
    pub fn point(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn low_value(&self) -> Option<&str> {
        self.low.as_ref().and_then(|t| t.value.as_deref())
    }

    pub fn high_value(&self) -> Option<&str> {
        self.high.as_ref().and_then(|t| t.value.as_deref())
    }
}

/// `ANY` — the tagged observation value union, discriminated by
/// `xsi:type`. Consumers match exhaustively; unknown types fail
/// deserialization of the value element only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@_xsi:type")]
pub enum ObservationValue {
    #[serde(rename = "CD")]
    Cd(Code),
    #[serde(rename = "CE")]
    Ce(Code),
    #[serde(rename = "ST")]
    St {
        #[serde(rename = "#text", skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    #[serde(rename = "PQ")]
    Pq(Quantity),
    #[serde(rename = "CO")]
    Co(Quantity),
    #[serde(rename = "INT")]
    Int {
        #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    #[serde(rename = "ED")]
    Ed {
        #[serde(skip_serializing_if = "Option::is_none")]
        reference: Option<ReferenceValue>,
    },
}

impl ObservationValue {
    /// The coded payload for `CD`/`CE` values.
    pub fn as_code(&self) -> Option<&Code> {
        match self {
            ObservationValue::Cd(code) | ObservationValue::Ce(code) => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addr {
    #[serde(rename = "@_use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address_line: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Telecom {
    #[serde(rename = "@_use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(rename = "@_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(rename = "@_use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Vec<TextValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<Vec<TextValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<TextValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<Vec<TextValue>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageCommunication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency_level_code: Option<Code>,
}

/// Demographics block inside `recordTarget/patientRole/patient`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<PersonName>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative_gender_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_time: Option<TimeStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_code: Option<Vec<Code>>,
    #[serde(rename = "sdtc:raceCode", skip_serializing_if = "Option::is_none")]
    pub sdtc_race_code: Option<Vec<Code>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethnic_group_code: Option<Vec<Code>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_communication: Option<Vec<LanguageCommunication>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatientRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<Vec<Addr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<Telecom>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTarget {
    pub patient_role: PatientRole,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<PersonName>>,
}

/// A CDA organization node (represented/custodian/manufacturer).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganizationNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<TextValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<Vec<Addr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<Telecom>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoringDevice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedAuthor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<Vec<Addr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<Telecom>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_person: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_authoring_device: Option<AuthoringDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub represented_organization: Option<OrganizationNode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(rename = "templateId", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Vec<TemplateId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_author: Option<AssignedAuthor>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedCustodian {
    pub represented_custodian_organization: OrganizationNode,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Custodian {
    pub assigned_custodian: AssignedCustodian,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntendedRecipient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information_recipient: Option<Person>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InformationRecipient {
    pub intended_recipient: IntendedRecipient,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedEntity {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<Vec<Addr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<Telecom>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associated_person: Option<Person>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayingEntity {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<TextValue>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayingDevice {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopingEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRole {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(rename = "templateId", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Vec<TemplateId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<Vec<Addr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<Telecom>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playing_entity: Option<PlayingEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playing_device: Option<PlayingDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoping_entity: Option<ScopingEntity>,
}

/// Document- or statement-level participation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(rename = "@_typeCode", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(rename = "templateId", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Vec<TemplateId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<EffectiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associated_entity: Option<AssociatedEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_role: Option<ParticipantRole>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<Vec<Addr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<Telecom>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_person: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub represented_organization: Option<OrganizationNode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performer {
    #[serde(rename = "@_typeCode", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<EffectiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_entity: Option<AssignedEntity>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEvent {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<EffectiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Performer>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationOf {
    #[serde(rename = "@_typeCode", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_event: Option<ServiceEvent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturedLabeledDrug {
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturedMaterial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<Code>>,
    #[serde(rename = "lotNumberText", skip_serializing_if = "Option::is_none")]
    pub lot_number_text: Option<Vec<TextValue>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturedProduct {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(rename = "templateId", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Vec<TemplateId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufactured_material: Option<Vec<ManufacturedMaterial>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufactured_labeled_drug: Option<Vec<ManufacturedLabeledDrug>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_organization: Option<Vec<OrganizationNode>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumable {
    #[serde(rename = "@_typeCode", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufactured_product: Option<Vec<ManufacturedProduct>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<EntryText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ObservationValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_range: Option<ObservationRange>,
}

/// `entryRelationship` — a typed nested link between clinical assertions
/// (SUBJ, MFST, RSON, REFR, COMP).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRelationship {
    #[serde(rename = "@_typeCode", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(rename = "@_inversionInd", skip_serializing_if = "Option::is_none")]
    pub inversion_ind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act: Option<Vec<Act>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<Vec<Observation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Vec<Organizer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance_administration: Option<Vec<SubstanceAdministration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Vec<Encounter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure: Option<Vec<Procedure>>,
}

impl EntryRelationship {
    pub fn first_observation(&self) -> Option<&Observation> {
        self.observation.as_ref().and_then(|o| o.first())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Act {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(rename = "@_moodCode", skip_serializing_if = "Option::is_none")]
    pub mood_code: Option<String>,
    #[serde(rename = "@_negationInd", skip_serializing_if = "Option::is_none")]
    pub negation_ind: Option<String>,
    #[serde(rename = "templateId", default, skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<TemplateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<EntryText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Code>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<EffectiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<Author>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Performer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<Participant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_relationship: Option<Vec<EntryRelationship>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(rename = "@_moodCode", skip_serializing_if = "Option::is_none")]
    pub mood_code: Option<String>,
    #[serde(rename = "@_negationInd", skip_serializing_if = "Option::is_none")]
    pub negation_ind: Option<String>,
    #[serde(rename = "templateId", default, skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<TemplateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<EntryText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Code>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<EffectiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ObservationValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<Author>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<Participant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_relationship: Option<Vec<EntryRelationship>>,
    #[serde(rename = "referenceRange", skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<Vec<ReferenceRange>>,
}

impl Observation {
    /// The observation nested under the first relationship of the given
    /// type code.
    pub fn related_observation(&self, type_code: &str) -> Option<&Observation> {
        self.entry_relationship
            .as_ref()?
            .iter()
            .find(|rel| rel.type_code.as_deref() == Some(type_code))?
            .first_observation()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerComponent {
    #[serde(rename = "@_typeCode", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act: Option<Vec<Act>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<Vec<Observation>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(rename = "@_moodCode", skip_serializing_if = "Option::is_none")]
    pub mood_code: Option<String>,
    #[serde(rename = "templateId", default, skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<TemplateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Code>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<EffectiveTime>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component: Vec<OrganizerComponent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstanceAdministration {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(rename = "@_moodCode", skip_serializing_if = "Option::is_none")]
    pub mood_code: Option<String>,
    #[serde(rename = "@_negationInd", skip_serializing_if = "Option::is_none")]
    pub negation_ind: Option<String>,
    #[serde(rename = "templateId", default, skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<TemplateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<EntryText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Code>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<EffectiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumable: Option<Consumable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Performer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<Author>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_relationship: Option<Vec<EntryRelationship>>,
}

impl SubstanceAdministration {
    pub fn first_material(&self) -> Option<&ManufacturedMaterial> {
        self.consumable
            .as_ref()?
            .manufactured_product
            .as_ref()?
            .first()?
            .manufactured_material
            .as_ref()?
            .first()
    }

    pub fn manufacturer(&self) -> Option<&OrganizationNode> {
        self.consumable
            .as_ref()?
            .manufactured_product
            .as_ref()?
            .first()?
            .manufacturer_organization
            .as_ref()?
            .first()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(rename = "@_moodCode", skip_serializing_if = "Option::is_none")]
    pub mood_code: Option<String>,
    #[serde(rename = "templateId", default, skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<TemplateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<EntryText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Code>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<EffectiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Performer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<Participant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_relationship: Option<Vec<EntryRelationship>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    #[serde(rename = "@_classCode", skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(rename = "@_moodCode", skip_serializing_if = "Option::is_none")]
    pub mood_code: Option<String>,
    #[serde(rename = "@_negationInd", skip_serializing_if = "Option::is_none")]
    pub negation_ind: Option<String>,
    #[serde(rename = "templateId", default, skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<TemplateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<EntryText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Code>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<EffectiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_site_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Performer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<Participant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_relationship: Option<Vec<EntryRelationship>>,
}

/// One `<entry>`: a tagged union of the clinical statement kinds, each a
/// vector because CDA permits repetition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryNode {
    #[serde(rename = "@_typeCode", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act: Option<Vec<Act>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<Vec<Observation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Vec<Organizer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance_administration: Option<Vec<SubstanceAdministration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Vec<Encounter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure: Option<Vec<Procedure>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "@_nullFlavor", skip_serializing_if = "Option::is_none")]
    pub null_flavor: Option<String>,
    #[serde(rename = "templateId", default, skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<TemplateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable narrative; arbitrary markup kept as a raw tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<Author>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<EntryNode>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyComponent {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuredBody {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component: Vec<BodyComponent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_body: Option<StructuredBody>,
}

/// The document root. Field order follows the US Realm Header schema
/// order, which validators enforce.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalDocument {
    #[serde(rename = "@_xmlns", skip_serializing_if = "Option::is_none")]
    pub xmlns: Option<String>,
    #[serde(rename = "@_xmlns:sdtc", skip_serializing_if = "Option::is_none")]
    pub xmlns_sdtc: Option<String>,
    #[serde(rename = "@_xmlns:xsi", skip_serializing_if = "Option::is_none")]
    pub xmlns_xsi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm_code: Option<RealmCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<TypeId>,
    #[serde(rename = "templateId", default, skip_serializing_if = "Vec::is_empty")]
    pub template_id: Vec<TemplateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<InstanceIdentifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "effectiveTime", skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<Vec<EffectiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidentiality_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_target: Option<Vec<RecordTarget>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<Author>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custodian: Option<Custodian>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information_recipient: Option<InformationRecipient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<Participant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_of: Option<DocumentationOf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,
}

impl ClinicalDocument {
    /// All sections of the structured body, in document order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.component
            .iter()
            .filter_map(|c| c.structured_body.as_ref())
            .flat_map(|body| body.component.iter())
            .flat_map(|component| component.section.iter())
    }
}
