use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::shared::error::{Result, WbsError};
use crate::shared::hierarchy::ImportRow;

/// Read a CSV export into header-keyed rows.
///
/// Invalid UTF-8 is replaced rather than rejected, and records with more
/// cells than there are headers are dropped. Short records simply lack the
/// trailing columns.
pub fn read_rows<R: Read>(input: R) -> Result<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let text = String::from_utf8_lossy(h);
            let text: &str = if i == 0 { text.trim_start_matches('\u{feff}') } else { &text };
            text.trim().to_string()
        })
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.byte_records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!(line, error = %e, "skipping unreadable CSV record");
                continue;
            }
        };
        if record.len() > headers.len() {
            debug!(line, cells = record.len(), "skipping CSV record with extra cells");
            continue;
        }
        let row: ImportRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, cell)| (h.clone(), String::from_utf8_lossy(cell).into_owned()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_rows_from_path(path: &Path) -> Result<Vec<ImportRow>> {
    let file = File::open(path)
        .map_err(|e| WbsError::MissingFile(format!("{}: {}", path.display(), e)))?;
    read_rows(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::hierarchy::build_hierarchy;

    #[test]
    fn test_read_rows_basic() {
        let csv = "WBS,Name,Weightage\n1,Civil,\n1.1,Piling,3\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["WBS"], "1");
        assert_eq!(rows[0]["Weightage"], "");
        assert_eq!(rows[1]["Name"], "Piling");
    }

    #[test]
    fn test_bom_and_header_whitespace() {
        let csv = "\u{feff}WBS , Task Name\n2,Roof\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0]["WBS"], "2");
        assert_eq!(rows[0]["Task Name"], "Roof");
    }

    #[test]
    fn test_bad_lines_skipped() {
        let csv = "WBS,Name\n1,ok\n2,too,many,cells\n3\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["WBS"], "3");
        assert!(!rows[1].contains_key("Name"));
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let mut bytes = b"WBS,Name\n1,Caf".to_vec();
        bytes.push(0xE9);
        bytes.push(b'\n');
        let rows = read_rows(&bytes[..]).unwrap();
        assert!(rows[0]["Name"].starts_with("Caf"));
    }

    #[test]
    fn test_csv_to_tree() {
        let csv = "\
Activity ID,Activity Name,Start,Finish,Weightage (%)
1,Substructure,2024-01-01,2024-02-01,
1.1,Excavation,2024-01-01,2024-01-10,40
,,,,
1.2,Foundations,2024-01-11,2024-02-01,60
";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        let forest = build_hierarchy(&rows);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].subtasks.len(), 2);
        assert_eq!(forest[0].subtasks[1].weightage, 60.0);
    }

    #[test]
    fn test_missing_file() {
        let err = read_rows_from_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, WbsError::MissingFile(_)));
    }
}
