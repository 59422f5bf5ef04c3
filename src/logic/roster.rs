//! Roster import: one player name per CSV row (first column).

use crate::models::TournamentError;
use std::io;

/// Read player names from CSV. Blank rows, `#` comment lines and a leading `name` header are
/// skipped; extra columns are ignored. Names are not validated here.
pub fn parse_roster<R: io::Read>(reader: R) -> Result<Vec<String>, TournamentError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut names = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| TournamentError::InvalidRoster(e.to_string()))?;
        let Some(name) = record.get(0) else {
            continue;
        };
        if name.is_empty() || (row == 0 && name.eq_ignore_ascii_case("name")) {
            continue;
        }
        names.push(name.to_string());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_column_and_skips_header() {
        let csv = "name,level\nAna,3\n  Ben , 2\n\n# bench\nCarla\n";
        assert_eq!(parse_roster(csv.as_bytes()).unwrap(), vec!["Ana", "Ben", "Carla"]);
    }

    #[test]
    fn headerless_roster() {
        let csv = "Ana\nBen\n";
        assert_eq!(parse_roster(csv.as_bytes()).unwrap(), vec!["Ana", "Ben"]);
    }
}
