//! Spreadsheet (CSV) bulk import

use crate::error::{CatalogError, CatalogResult};
use csv::{ReaderBuilder, Trim};
use domain::{ImportRow, PartRecord, PartRepository};
use std::io::Read;
use tracing::{debug, info};

/// Parse rows with headers `partNumber, partName, color, workstation, models`.
/// Fully blank rows are skipped.
pub fn read_import_rows<R: Read>(reader: R) -> CatalogResult<Vec<ImportRow>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize::<ImportRow>().enumerate() {
        let row = result.map_err(|e| CatalogError::Import(format!("row {}: {e}", line + 2)))?;
        if row == ImportRow::default() {
            debug!(row = line + 2, "Skipping blank import row");
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Create one photo-less record per row and save them one after another.
/// Returns the number of records saved.
pub async fn import_csv<R, P>(reader: R, repository: &P) -> CatalogResult<usize>
where
    R: Read,
    P: PartRepository + ?Sized,
    P::Error: Into<CatalogError>,
{
    let rows = read_import_rows(reader)?;
    let total = rows.len();

    for (index, row) in rows.into_iter().enumerate() {
        let record = PartRecord::imported(row.into_draft());
        repository.save_part(&record).await.map_err(|e| {
            let e: CatalogError = e.into();
            CatalogError::Import(format!("saving row {} of {total} failed: {e}", index + 1))
        })?;
    }

    info!(items_count = total as u64, "Import finished");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{PartColor, PartModel};

    #[test]
    fn test_read_rows_with_blank_lines_and_missing_columns() {
        let data = "\
partNumber,partName,color,workstation,models
P-1, Bracket ,Ayers Grey,WS-1,\"B03, P11\"
,,,,
P-2,Clip
";
        let rows = read_import_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = rows[0].clone().into_draft();
        assert_eq!(first.part_name, "Bracket");
        assert_eq!(first.color, PartColor::AyersGrey);
        assert_eq!(first.models.len(), 2);
        assert!(first.models.contains(&PartModel::P11));

        let second = rows[1].clone().into_draft();
        assert_eq!(second.part_number, "P-2");
        assert!(second.workstation.is_empty());
    }

    #[test]
    fn test_header_only_file() {
        let rows = read_import_rows("partNumber,partName\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }
}
