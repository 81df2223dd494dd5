//! Workbook decoding for menu uploads.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::debug;

use crate::error::IngestionError;

/// Read the first sheet of an `.xlsx`/`.xls` workbook as text columns.
///
/// The sheet has no header row. Each inner vector is one column, top to
/// bottom; cells that do not hold text are `None`.
pub fn read_first_sheet_columns(bytes: Vec<u8>) -> Result<Vec<Vec<Option<String>>>, IngestionError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestionError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet)?;
    debug!(sheet = %sheet, rows = range.height(), columns = range.width(), "Read worksheet");
    Ok(columns_of(&range))
}

fn columns_of(range: &Range<Data>) -> Vec<Vec<Option<String>>> {
    (0..range.width())
        .map(|col| {
            range
                .rows()
                .map(|row| match row.get(col) {
                    Some(Data::String(text)) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_column_major() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("Menu Monday".to_string()));
        range.set_value((1, 0), Data::String("Soup".to_string()));
        range.set_value((0, 1), Data::String("Menu Tuesday".to_string()));
        range.set_value((1, 1), Data::Float(3.5));

        let columns = columns_of(&range);
        assert_eq!(
            columns,
            vec![
                vec![Some("Menu Monday".to_string()), Some("Soup".to_string())],
                vec![Some("Menu Tuesday".to_string()), None],
            ]
        );
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = read_first_sheet_columns(b"not a workbook".to_vec());
        assert!(matches!(result, Err(IngestionError::Spreadsheet(_))));
    }
}
