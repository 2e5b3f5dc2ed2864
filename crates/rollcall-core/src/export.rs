// CSV export of the current groups.
//
// Layout: UTF-8 with a byte-order mark so spreadsheet apps pick the right
// encoding, a header row, then one row per (group, member) pair. Every
// field is quoted and embedded quotes are doubled.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::config::ExportConfig;
use crate::participant::Group;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const HEADER: [&str; 2] = ["group name", "member name"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("there are no groups to export")]
    NothingToExport,

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write `groups` as CSV to `out`.
pub fn write_groups<W: Write>(groups: &[Group], mut out: W) -> Result<(), ExportError> {
    if groups.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    out.write_all(UTF8_BOM).map_err(csv::Error::from)?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(out);
    writer.write_record(HEADER)?;
    for group in groups {
        for member in &group.members {
            writer.write_record([group.name.as_str(), member.name.as_str()])?;
        }
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// File name for an export made on `date`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("groups_{}.csv", date.format("%Y-%m-%d"))
}

/// Directory exports are written to: the configured one, else the user's
/// download folder, else the working directory.
pub fn resolve_export_dir(config: &ExportConfig) -> PathBuf {
    let configured = config.dir.trim();
    if !configured.is_empty() {
        return PathBuf::from(configured);
    }
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Export `groups` into `dir` under today's file name. Returns the path
/// written.
pub fn export_groups_to(groups: &[Group], dir: &Path) -> Result<PathBuf, ExportError> {
    if groups.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let path = dir.join(export_filename(Local::now().date_naive()));
    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let file = std::fs::File::create(&path).map_err(io_err)?;
    write_groups(groups, std::io::BufWriter::new(file))?;

    info!("Exported {} groups to {}", groups.len(), path.display());
    Ok(path)
}

/// Export `groups` to the directory selected by `config`.
pub fn export_groups(groups: &[Group], config: &ExportConfig) -> Result<PathBuf, ExportError> {
    export_groups_to(groups, &resolve_export_dir(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::Participant;

    fn group(name: &str, members: &[&str]) -> Group {
        Group {
            id: format!("group-1-{name}"),
            name: name.to_string(),
            members: members
                .iter()
                .enumerate()
                .map(|(i, m)| Participant::new(format!("p-{i}"), *m))
                .collect(),
        }
    }

    fn render(groups: &[Group]) -> String {
        let mut buf = Vec::new();
        write_groups(groups, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_bom_header_and_one_row_per_member() {
        let out = render(&[group("Red", &["Ann", "Bo"]), group("Blue", &["Cy"])]);
        assert_eq!(
            out,
            "\u{FEFF}\"group name\",\"member name\"\n\
             \"Red\",\"Ann\"\n\
             \"Red\",\"Bo\"\n\
             \"Blue\",\"Cy\"\n"
        );
    }

    #[test]
    fn embedded_quotes_and_commas_are_escaped() {
        let out = render(&[group("The \"A\" Team", &["Doe, Jane"])]);
        assert!(out.ends_with("\"The \"\"A\"\" Team\",\"Doe, Jane\"\n"));

        // Reading it back yields the original values.
        let body = out.trim_start_matches('\u{FEFF}');
        let mut rdr = csv::Reader::from_reader(body.as_bytes());
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "The \"A\" Team");
        assert_eq!(&row[1], "Doe, Jane");
    }

    #[test]
    fn empty_groups_are_rejected() {
        let mut buf = Vec::new();
        let err = write_groups(&[], &mut buf).unwrap_err();
        assert!(matches!(err, ExportError::NothingToExport));
        assert!(buf.is_empty());
    }

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(date), "groups_2024-03-09.csv");
    }

    #[test]
    fn configured_dir_wins() {
        let config = ExportConfig {
            dir: " /tmp/rollcall-out ".into(),
        };
        assert_eq!(resolve_export_dir(&config), PathBuf::from("/tmp/rollcall-out"));
    }

    #[test]
    fn export_writes_file_into_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested");
        let path = export_groups_to(&[group("Red", &["Ann"])], &target).unwrap();

        assert_eq!(path.parent().unwrap(), target);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("groups_") && name.ends_with(".csv"));

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
    }

    #[test]
    fn export_with_no_groups_creates_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = export_groups_to(&[], tmp.path()).unwrap_err();
        assert!(matches!(err, ExportError::NothingToExport));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
