//! Full-table snapshot reads from the source database.

use anyhow::{bail, Context, Result};
use sync_core::ConsumableRecord;
use tokio_postgres::{Client, NoTls, Row};

/// Connect and drive the connection on a background task.
pub async fn connect(connection_string: &str) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
        .await
        .context("Failed to connect to PostgreSQL")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {e}");
        }
    });

    Ok(client)
}

/// Check that the table exists and is readable before the full read.
pub async fn probe_table(client: &Client, table: &str) -> Result<()> {
    validate_table_name(table)?;
    client
        .query(&format!("SELECT 1 FROM {table} LIMIT 1"), &[])
        .await
        .with_context(|| format!("Table '{table}' is not readable"))?;
    Ok(())
}

/// Pull every row of the import table into memory.
///
/// The snapshot is taken once per run; the connection is not needed again
/// while records are pushed. NULL or absent columns become empty strings
/// (status becomes 1) so downstream code sees a uniform record.
pub async fn fetch_consumables(client: &Client, table: &str) -> Result<Vec<ConsumableRecord>> {
    probe_table(client, table).await?;

    tracing::info!("Fetching records from {table}");
    let rows = client
        .query(&format!("SELECT * FROM {table}"), &[])
        .await
        .with_context(|| format!("Failed to read table '{table}'"))?;
    tracing::info!("Fetched {} rows from {table}", rows.len());

    Ok(rows.iter().map(row_to_record).collect())
}

fn row_to_record(row: &Row) -> ConsumableRecord {
    ConsumableRecord {
        uid: text_column(row, "uuid"),
        consumable_code: text_column(row, "consumable_code"),
        serial_number: text_column(row, "serial_number"),
        registration_cert_no: text_column(row, "registration_cert_no"),
        registration_record_no: text_column(row, "registration_record_no"),
        original_registration_record_no: text_column(row, "original_registration_record_no"),
        registration_product_name: text_column(row, "registration_product_name"),
        old_registration_record_no: text_column(row, "old_registration_record_no"),
        old_registration_product_name: text_column(row, "old_registration_product_name"),
        registrant: text_column(row, "registrant"),
        consumable_category: text_column(row, "consumable_category"),
        single_product_code: text_column(row, "single_product_code"),
        single_product_name: text_column(row, "single_product_name"),
        enterprise_name: text_column(row, "enterprise_name"),
        specification: text_column(row, "specification"),
        model: text_column(row, "model"),
        spec_model_id: text_column(row, "spec_model_id"),
        udi_di: text_column(row, "udi_di"),
        status: match row.try_get::<_, Option<i16>>("status") {
            Ok(Some(value)) => i32::from(value),
            _ => 1,
        },
    }
}

fn text_column(row: &Row, name: &str) -> String {
    match row.try_get::<_, Option<String>>(name) {
        Ok(Some(value)) => value,
        _ => String::new(),
    }
}

/// Table names are interpolated into SQL, so only accept plain identifiers.
fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let head_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !head_ok || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("Invalid table name: '{table}'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_names() {
        assert!(validate_table_name("medical_consumables").is_ok());
        assert!(validate_table_name("_staging2").is_ok());
    }

    #[test]
    fn test_invalid_table_names() {
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2fast").is_err());
        assert!(validate_table_name("drop table;--").is_err());
        assert!(validate_table_name("a.b").is_err());
    }
}
