// Participant roster: ingestion, duplicate-name handling, removal.
//
// The roster is owned by the application and handed to the engines as a
// slice. Ids are issued here and are never reused after removal, so an id
// recorded in the draw history cannot later refer to someone else.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::participant::Participant;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Sample names used to seed an empty roster for demos.
pub const MOCK_NAMES: &[&str] = &[
    "Avery Chen",
    "Blake Lin",
    "Casey Wang",
    "Dana Liu",
    "Elliot Huang",
    "Frankie Wu",
    "Gray Tsai",
    "Harper Kuo",
    "Indra Cheng",
    "Jordan Hsu",
    "Kai Lo",
    "Logan Chou",
    "Morgan Yeh",
    "Noel Hung",
    "Oakley Fang",
    "Parker Su",
    "Quinn Tang",
    "Riley Pan",
    "Sage Lai",
    "Taylor Ho",
];

/// Header cells recognised on the first row of an imported CSV.
const HEADER_MARKERS: &[&str] = &["name", "姓名"];

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Roster {
    participants: Vec<Participant>,
    next_id: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from names, issuing fresh ids in order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster = Roster::new();
        roster.push_names(names);
        roster
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Add one participant per non-blank line of pasted text.
    ///
    /// Returns the number of participants added.
    pub fn add_from_text(&mut self, text: &str) -> usize {
        let names: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let added = self.push_names(names);
        info!("Added {} participants from text", added);
        added
    }

    /// Append the fixed list of sample names.
    pub fn add_mock_data(&mut self) -> usize {
        let added = self.push_names(MOCK_NAMES.iter().copied());
        info!("Added {} mock participants", added);
        added
    }

    /// Import names from the first column of a CSV stream.
    ///
    /// Blank rows are skipped. When the first remaining row looks like a
    /// header (contains "name" in any case, or "姓名"), it is dropped.
    pub fn import_csv<R: Read>(&mut self, rdr: R) -> Result<usize, RosterError> {
        let names = read_csv_names(rdr)?;
        let added = self.push_names(names);
        info!("Imported {} participants from CSV", added);
        Ok(added)
    }

    /// Import names from a CSV file on disk.
    pub fn import_csv_file(&mut self, path: &Path) -> Result<usize, RosterError> {
        let file = std::fs::File::open(path).map_err(|e| RosterError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        self.import_csv(file)
    }

    /// Remove the participant with `id`. Returns whether anyone was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != id);
        self.participants.len() != before
    }

    pub fn clear(&mut self) {
        info!("Clearing roster ({} participants)", self.participants.len());
        self.participants.clear();
    }

    /// Names that appear more than once.
    pub fn duplicate_names(&self) -> BTreeSet<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for p in &self.participants {
            *counts.entry(p.name.as_str()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Keep the first participant of each name and drop the rest.
    ///
    /// Returns the number removed.
    pub fn remove_duplicate_names(&mut self) -> usize {
        let before = self.participants.len();
        let mut seen: HashSet<String> = HashSet::new();
        self.participants.retain(|p| seen.insert(p.name.clone()));
        let removed = before - self.participants.len();
        info!("Removed {} duplicate-name participants", removed);
        removed
    }

    fn push_names<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for name in names {
            let id = format!("p-{}", self.next_id);
            self.next_id += 1;
            self.participants.push(Participant::new(id, name));
            added += 1;
        }
        added
    }
}

// ---------------------------------------------------------------------------
// CSV helpers
// ---------------------------------------------------------------------------

fn read_csv_names<R: Read>(rdr: R) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let mut names = Vec::new();
    for result in reader.records() {
        let record = result?;
        match record.get(0) {
            Some(first) if !first.is_empty() => names.push(first.to_string()),
            _ => {}
        }
    }

    if names.first().is_some_and(|first| looks_like_header(first)) {
        debug!("Dropping CSV header row {:?}", names[0]);
        names.remove(0);
    }

    Ok(names)
}

fn looks_like_header(cell: &str) -> bool {
    let lower = cell.to_lowercase();
    HEADER_MARKERS.iter().any(|marker| lower.contains(marker))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn names(roster: &Roster) -> Vec<&str> {
        roster.participants().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn add_from_text_trims_and_skips_blank_lines() {
        let mut roster = Roster::new();
        let added = roster.add_from_text("  Alice \n\n Bob\n   \nCarol\n");
        assert_eq!(added, 3);
        assert_eq!(names(&roster), vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn ids_are_unique_and_not_reused_after_removal() {
        let mut roster = Roster::from_names(["A", "B"]);
        let removed_id = roster.participants()[1].id.clone();
        assert!(roster.remove(&removed_id));
        roster.add_from_text("C");

        let ids: HashSet<&str> = roster.participants().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(!ids.contains(removed_id.as_str()));
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut roster = Roster::from_names(["A"]);
        assert!(!roster.remove("p-999"));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn mock_data_appends_twenty_names() {
        let mut roster = Roster::from_names(["Existing"]);
        assert_eq!(roster.add_mock_data(), 20);
        assert_eq!(roster.len(), 21);
        assert_eq!(roster.participants()[0].name, "Existing");
    }

    #[test]
    fn csv_import_takes_first_column() {
        let mut roster = Roster::new();
        let data = "Alice,Engineering\nBob,Sales\n";
        assert_eq!(roster.import_csv(data.as_bytes()).unwrap(), 2);
        assert_eq!(names(&roster), vec!["Alice", "Bob"]);
    }

    #[test]
    fn csv_import_drops_english_header() {
        let mut roster = Roster::new();
        let data = "Full Name,Dept\nAlice,Eng\n";
        roster.import_csv(data.as_bytes()).unwrap();
        assert_eq!(names(&roster), vec!["Alice"]);
    }

    #[test]
    fn csv_import_drops_chinese_header() {
        let mut roster = Roster::new();
        let data = "姓名\n陳大文\n李小華\n";
        roster.import_csv(data.as_bytes()).unwrap();
        assert_eq!(names(&roster), vec!["陳大文", "李小華"]);
    }

    #[test]
    fn csv_import_header_detection_skips_leading_blank_rows() {
        let mut roster = Roster::new();
        let data = "\n,\nNAME\nAlice\n";
        roster.import_csv(data.as_bytes()).unwrap();
        assert_eq!(names(&roster), vec!["Alice"]);
    }

    #[test]
    fn csv_import_only_checks_first_row_for_header() {
        let mut roster = Roster::new();
        let data = "Alice\nNathaniel\n";
        roster.import_csv(data.as_bytes()).unwrap();
        assert_eq!(names(&roster), vec!["Alice", "Nathaniel"]);
    }

    #[test]
    fn csv_import_honours_quoted_commas() {
        let mut roster = Roster::new();
        let data = "\"Doe, Jane\",HR\n";
        roster.import_csv(data.as_bytes()).unwrap();
        assert_eq!(names(&roster), vec!["Doe, Jane"]);
    }

    #[test]
    fn csv_import_missing_file_is_io_error() {
        let mut roster = Roster::new();
        let err = roster
            .import_csv_file(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
        assert!(roster.is_empty());
    }

    #[test]
    fn duplicate_names_detected() {
        let roster = Roster::from_names(["A", "B", "A", "C", "B", "A"]);
        let dups: Vec<String> = roster.duplicate_names().into_iter().collect();
        assert_eq!(dups, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn remove_duplicate_names_keeps_first_occurrence() {
        let mut roster = Roster::from_names(["A", "B", "A", "C", "B"]);
        let first_a = roster.participants()[0].id.clone();

        assert_eq!(roster.remove_duplicate_names(), 2);
        assert_eq!(names(&roster), vec!["A", "B", "C"]);
        assert_eq!(roster.participants()[0].id, first_a);
        assert!(roster.duplicate_names().is_empty());
    }

    #[test]
    fn clear_empties_roster() {
        let mut roster = Roster::from_names(["A", "B"]);
        roster.clear();
        assert!(roster.is_empty());
    }
}
