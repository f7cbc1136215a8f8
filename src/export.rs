//! CSV and image-list exports of parent records.
//!
//! Both writers build the full output in memory and then replace the target
//! file atomically, creating its directory when missing.

use std::path::Path;
use thiserror::Error;

use crate::feed::ParentRecord;
use crate::util::write_atomically;

/// Column header of the CSV export.
pub const CSV_HEADER: [&str; 3] = ["sku", "name", "image"];

/// Field separator of the image list (`<sku>|<url>`).
pub const LIST_DELIMITER: char = '|';

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Serializes parent records as CSV with a `sku,name,image` header.
///
/// The header is written even when there are no records. A missing image is
/// an empty field.
pub fn csv_bytes(parents: &[ParentRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for parent in parents {
        writer.serialize(parent)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

/// Writes the CSV export to `path`, replacing any existing file.
pub fn write_csv(parents: &[ParentRecord], path: &Path) -> Result<(), ExportError> {
    let bytes = csv_bytes(parents)?;
    write_atomically(path, &bytes).map_err(|e| ExportError::io(path, e))?;
    tracing::info!(path = %path.display(), rows = parents.len(), "Wrote CSV export");
    Ok(())
}

/// Renders the image list: one `<sku>|<url>` line per parent with an image.
///
/// Parents without an image are skipped. Returns the text and its line count.
pub fn image_list(parents: &[ParentRecord]) -> (String, usize) {
    let mut out = String::new();
    let mut lines = 0;
    for parent in parents {
        if let Some(url) = parent.image_url() {
            out.push_str(&parent.sku);
            out.push(LIST_DELIMITER);
            out.push_str(url);
            out.push('\n');
            lines += 1;
        }
    }
    (out, lines)
}

/// Writes the image list to `path`, replacing any existing file.
///
/// Returns the number of lines written.
pub fn write_image_list(parents: &[ParentRecord], path: &Path) -> Result<usize, ExportError> {
    let (content, lines) = image_list(parents);
    write_atomically(path, content.as_bytes()).map_err(|e| ExportError::io(path, e))?;

    let skipped = parents.len() - lines;
    if skipped > 0 {
        tracing::debug!(skipped = skipped, "Parents without image left out of image list");
    }
    tracing::info!(path = %path.display(), lines = lines, "Wrote image list");
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parent(sku: &str, name: &str, image: Option<&str>) -> ParentRecord {
        ParentRecord {
            sku: sku.into(),
            name: name.into(),
            image: image.map(String::from),
        }
    }

    #[test]
    fn test_csv_header_and_rows() {
        let bytes = csv_bytes(&[
            parent("A", "Camiseta", Some("http://x/a.jpg")),
            parent("B", "Bermuda", None),
        ])
        .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "sku,name,image\nA,Camiseta,http://x/a.jpg\nB,Bermuda,\n"
        );
    }

    #[test]
    fn test_csv_header_written_without_records() {
        let bytes = csv_bytes(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "sku,name,image\n");
    }

    #[test]
    fn test_csv_quotes_embedded_delimiters() {
        let bytes = csv_bytes(&[parent("C", "Calça \"Slim\", Azul", None)]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "sku,name,image\nC,\"Calça \"\"Slim\"\", Azul\",\n"
        );
    }

    #[test]
    fn test_image_list_skips_missing_and_empty_images() {
        let (content, lines) = image_list(&[
            parent("A", "a", Some("http://x/a.jpg")),
            parent("B", "b", None),
            parent("C", "c", Some("")),
            parent("D", "d", Some("http://x/d.png")),
        ]);
        assert_eq!(content, "A|http://x/a.jpg\nD|http://x/d.png\n");
        assert_eq!(lines, 2);
    }

    #[test]
    fn test_writers_create_directory_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("outputs").join("sku_pai.csv");
        let list_path = dir.path().join("outputs").join("lista_imagens.txt");
        let parents = vec![parent("A", "Camiseta", Some("http://x/a.jpg"))];

        std::fs::create_dir_all(csv_path.parent().unwrap()).unwrap();
        std::fs::write(&list_path, "stale|line\nmore|stale\n").unwrap();

        write_csv(&parents, &csv_path).unwrap();
        let lines = write_image_list(&parents, &list_path).unwrap();

        assert_eq!(lines, 1);
        assert_eq!(
            std::fs::read_to_string(&list_path).unwrap(),
            "A|http://x/a.jpg\n"
        );
        assert!(std::fs::read_to_string(&csv_path)
            .unwrap()
            .starts_with("sku,name,image\n"));
    }
}
