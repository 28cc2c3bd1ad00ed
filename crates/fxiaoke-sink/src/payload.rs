//! Provider payload shapes.
//!
//! Field names follow the provider contract exactly; do not rename them to
//! match local conventions.

use serde::Serialize;
use sync_core::ConsumableRecord;

/// Object type accepted by the direct ingest endpoint.
pub const DIRECT_OBJECT_API_NAME: &str = "MedicalInsuranceCodeFile";

/// Object type created through the open API.
pub const CREATE_OBJECT_API_NAME: &str = "MedicalConsumable";

/// Body of a direct push.
#[derive(Debug, Serialize)]
pub struct DirectPushBody {
    #[serde(rename = "objAPIName")]
    pub obj_api_name: &'static str,
    #[serde(rename = "masterFieldVal")]
    pub master_field_val: MasterFieldVal,
}

/// Field block of a direct push, keyed by the provider's field names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterFieldVal {
    pub consumables_category: String,
    pub consumables_enterprise: String,
    pub id: String,
    pub medical_consumables_code: String,
    pub model: String,
    pub old_registration_filing_certificate_number: String,
    pub old_registration_filing_product_name: String,
    pub original_registration_filing_number: String,
    pub registrant_filing_person: String,
    pub registration_certificate_number: String,
    pub registration_filing_certificate_number: String,
    pub registration_filing_product_name: String,
    pub serial_number: String,
    pub single_product_name: String,
    pub single_product_number: String,
    pub specification: String,
    pub specification_model_number: String,
    pub status: i32,
    pub udi_di: String,
}

/// Map a source record onto the direct push body.
pub fn direct_push_body(record: &ConsumableRecord) -> DirectPushBody {
    DirectPushBody {
        obj_api_name: DIRECT_OBJECT_API_NAME,
        master_field_val: MasterFieldVal {
            consumables_category: record.consumable_category.clone(),
            consumables_enterprise: record.enterprise_name.clone(),
            id: record.unique_id(),
            medical_consumables_code: record.consumable_code.trim().to_string(),
            model: record.model.clone(),
            old_registration_filing_certificate_number: record.old_registration_record_no.clone(),
            old_registration_filing_product_name: record.old_registration_product_name.clone(),
            original_registration_filing_number: record.original_registration_record_no.clone(),
            registrant_filing_person: record.registrant.clone(),
            registration_certificate_number: record.registration_cert_no.clone(),
            registration_filing_certificate_number: record.registration_record_no.clone(),
            registration_filing_product_name: record.registration_product_name.clone(),
            serial_number: record.serial_number.trim().to_string(),
            single_product_name: record.single_product_name.clone(),
            single_product_number: record.single_product_code.clone(),
            specification: record.specification.clone(),
            specification_model_number: record.spec_model_id.clone(),
            status: record.status,
            udi_di: record.udi_di.clone(),
        },
    }
}

/// Body of an open-API object creation.
#[derive(Debug, Serialize)]
pub struct CreateObjectBody {
    #[serde(rename = "corpAccessToken")]
    pub corp_access_token: String,
    #[serde(rename = "corpId")]
    pub corp_id: String,
    pub data: CreateObjectData,
}

#[derive(Debug, Serialize)]
pub struct CreateObjectData {
    pub object_data: ObjectData,
    pub api_name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ObjectData {
    pub data: ObjectFields,
}

#[derive(Debug, Serialize)]
pub struct ObjectFields {
    pub name: String,
    pub code: String,
    pub content: String,
}

/// Map a source record onto the open-API creation body.
pub fn create_object_body(
    token: &str,
    corp_id: &str,
    record: &ConsumableRecord,
) -> CreateObjectBody {
    CreateObjectBody {
        corp_access_token: token.to_string(),
        corp_id: corp_id.to_string(),
        data: CreateObjectData {
            object_data: ObjectData {
                data: ObjectFields {
                    name: record.display_name().to_string(),
                    code: record.unique_id(),
                    content: record.single_product_name.clone(),
                },
            },
            api_name: CREATE_OBJECT_API_NAME,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_body_field_names() {
        let record = ConsumableRecord {
            uid: "pk".to_string(),
            consumable_code: " C14 ".to_string(),
            serial_number: " 001 ".to_string(),
            consumable_category: "implant".to_string(),
            enterprise_name: "Acme Medical".to_string(),
            spec_model_id: "SM-9".to_string(),
            udi_di: "0614141".to_string(),
            status: 1,
            ..Default::default()
        };

        let value = serde_json::to_value(direct_push_body(&record)).unwrap();

        assert_eq!(value["objAPIName"], "MedicalInsuranceCodeFile");
        let fields = &value["masterFieldVal"];
        assert_eq!(fields["consumablesCategory"], "implant");
        assert_eq!(fields["consumablesEnterprise"], "Acme Medical");
        assert_eq!(fields["id"], "C14-001");
        assert_eq!(fields["medicalConsumablesCode"], "C14");
        assert_eq!(fields["serialNumber"], "001");
        assert_eq!(fields["specificationModelNumber"], "SM-9");
        assert_eq!(fields["udiDi"], "0614141");
        assert_eq!(fields["status"], 1);
        assert_eq!(
            fields["oldRegistrationFilingCertificateNumber"],
            ""
        );
        assert_eq!(fields["registrantFilingPerson"], "");
    }

    #[test]
    fn test_create_body_shape() {
        let record = ConsumableRecord {
            uid: "pk".to_string(),
            registration_product_name: "Bone screw".to_string(),
            single_product_name: "Screw 4mm".to_string(),
            ..Default::default()
        };

        let value = serde_json::to_value(create_object_body("tok-1", "app-1", &record)).unwrap();

        assert_eq!(value["corpAccessToken"], "tok-1");
        assert_eq!(value["corpId"], "app-1");
        assert_eq!(value["data"]["api_name"], "MedicalConsumable");
        let fields = &value["data"]["object_data"]["data"];
        assert_eq!(fields["name"], "Bone screw");
        assert_eq!(fields["code"], "pk");
        assert_eq!(fields["content"], "Screw 4mm");
    }

    #[test]
    fn test_create_body_unnamed_fallback() {
        let record = ConsumableRecord::default();
        let value = serde_json::to_value(create_object_body("t", "c", &record)).unwrap();

        assert_eq!(value["data"]["object_data"]["data"]["name"], "unnamed");
    }
}
