// CSV import with delimiter sniffing

use std::io::Read;
use std::path::Path;

use deptboard_report::{CellScalar, RawSheet, ReportError};

/// Sheet name synthesized for CSV sources, matching what workbook exports
/// call their first sheet.
pub const CSV_SHEET_NAME: &str = "Sheet1";

/// Decode a CSV file into a single synthetic sheet. Cells stay text-typed;
/// numeric parsing happens downstream where workbook and CSV values are
/// treated alike.
pub fn read_csv(path: &Path, file_label: &str) -> Result<Vec<(String, RawSheet)>, ReportError> {
    let content = read_file_as_utf8(path).map_err(|reason| ReportError::ReadFailure {
        file: file_label.to_string(),
        reason,
    })?;
    let delimiter = sniff_delimiter(&content);
    let sheet = sheet_from_string(&content, delimiter).map_err(|reason| ReportError::ReadFailure {
        file: file_label.to_string(),
        reason,
    })?;
    Ok(vec![(CSV_SHEET_NAME.to_string(), sheet)])
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines. For each candidate (tab, semicolon, comma, pipe), count
/// fields per line; the delimiter with the most consistent field count
/// (>1 field) wins, with higher field counts breaking ties.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must split the header line into >1 field to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed. Excel-exported CSVs are often
/// Windows-1252.
fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn sheet_from_string(content: &str, delimiter: u8) -> Result<RawSheet, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        CellScalar::Empty
                    } else {
                        CellScalar::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawSheet::new(rows))
}
