//! Source record type for the medical-consumable registry table.

use serde::{Deserialize, Serialize};

/// A single row of the source table, snapshotted at run start.
///
/// All text columns are read as-is; NULL or absent columns become empty
/// strings so the push loop never has to deal with optionality. The record
/// is never mutated after the fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableRecord {
    /// Primary key of the source table (the `uuid` column,
    /// `<consumable_code>-<serial_number>` as written by the importer).
    pub uid: String,
    /// National consumable classification code.
    pub consumable_code: String,
    /// Serial number within the classification code.
    pub serial_number: String,
    /// Registration certificate number.
    pub registration_cert_no: String,
    /// Registration/filing certificate number.
    pub registration_record_no: String,
    /// Original registration/filing number.
    pub original_registration_record_no: String,
    /// Product name on the registration/filing certificate.
    pub registration_product_name: String,
    /// Superseded registration/filing certificate number.
    pub old_registration_record_no: String,
    /// Product name on the superseded certificate.
    pub old_registration_product_name: String,
    /// Registrant / filing person.
    pub registrant: String,
    /// Consumable category.
    pub consumable_category: String,
    /// Single-product code.
    pub single_product_code: String,
    /// Single-product name.
    pub single_product_name: String,
    /// Manufacturing enterprise name.
    pub enterprise_name: String,
    /// Specification text.
    pub specification: String,
    /// Model text.
    pub model: String,
    /// Specification/model identifier.
    pub spec_model_id: String,
    /// UDI-DI identifier.
    pub udi_di: String,
    /// Row status flag (source default is 1 = active).
    pub status: i32,
}

impl Default for ConsumableRecord {
    fn default() -> Self {
        Self {
            uid: String::new(),
            consumable_code: String::new(),
            serial_number: String::new(),
            registration_cert_no: String::new(),
            registration_record_no: String::new(),
            original_registration_record_no: String::new(),
            registration_product_name: String::new(),
            old_registration_record_no: String::new(),
            old_registration_product_name: String::new(),
            registrant: String::new(),
            consumable_category: String::new(),
            single_product_code: String::new(),
            single_product_name: String::new(),
            enterprise_name: String::new(),
            specification: String::new(),
            model: String::new(),
            spec_model_id: String::new(),
            udi_di: String::new(),
            status: 1,
        }
    }
}

impl ConsumableRecord {
    /// Identifier used when pushing this record to the CRM.
    ///
    /// `"{code}-{serial}"` when both parts are non-empty after trimming,
    /// otherwise the stored primary key.
    pub fn unique_id(&self) -> String {
        let code = self.consumable_code.trim();
        let serial = self.serial_number.trim();
        if !code.is_empty() && !serial.is_empty() {
            format!("{code}-{serial}")
        } else {
            self.uid.clone()
        }
    }

    /// Human-readable name for log lines and notifications.
    pub fn display_name(&self) -> &str {
        if self.registration_product_name.is_empty() {
            "unnamed"
        } else {
            &self.registration_product_name
        }
    }
}
