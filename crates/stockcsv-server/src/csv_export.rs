//! CSV serialization of normalized rows.
//!
//! Output is prefixed with a UTF-8 byte-order mark so spreadsheet
//! applications detect the encoding and render accented store names
//! correctly.

use stockcsv_core::{NormalizedRow, CSV_COLUMNS};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Serializes rows into a complete CSV document, header included.
///
/// # Errors
///
/// Propagates `csv` writer failures; with an in-memory buffer these only
/// occur on malformed record lengths.
pub fn rows_to_csv(rows: &[NormalizedRow]) -> Result<Vec<u8>, csv::Error> {
    let mut buf: Vec<u8> = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(CSV_COLUMNS)?;
        for row in rows {
            writer.write_record([
                row.name.as_str(),
                row.address1.as_str(),
                row.address2.as_str(),
                row.city.as_str(),
                row.region.as_str(),
                row.postal_code.as_str(),
                row.country.as_str(),
                row.phone.as_str(),
                row.website.as_str(),
                &coord(row.lat),
                &coord(row.lng),
                row.address_full.as_str(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

fn coord(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
