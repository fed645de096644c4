use std::path::Path;
use thiserror::Error;

/// Extensions accepted for peptide files
pub const PEPTIDE_FILE_EXTENSIONS: [&str; 4] = [".txt", ".fasta", ".csv", ".tsv"];

/// Local form validation failures; these block submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a peptide sequence")]
    EmptyPeptide,
    #[error("Please select a file")]
    NoFileSelected,
    #[error("Invalid file type. Please upload a .txt, .fasta, .csv, or .tsv file.")]
    InvalidFileType,
    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// A peptide file accepted by the missense form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: std::path::PathBuf,
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    /// `name (size)` as shown under the upload area
    pub fn summary(&self) -> String {
        format!("{} ({})", self.name, format_file_size(self.size))
    }
}

/// Whether `name` ends in one of [`PEPTIDE_FILE_EXTENSIONS`], ignoring case
pub fn has_peptide_extension(name: &str) -> bool {
    let Some(dot) = name.rfind('.') else {
        return false;
    };
    let extension = name[dot..].to_lowercase();
    PEPTIDE_FILE_EXTENSIONS.contains(&extension.as_str())
}

/// Check a user-chosen peptide file and read its size
pub fn select_peptide_file(path: &Path) -> Result<SelectedFile, ValidationError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !has_peptide_extension(&name) {
        return Err(ValidationError::InvalidFileType);
    }
    let metadata = std::fs::metadata(path)
        .map_err(|_| ValidationError::FileNotFound(path.display().to_string()))?;
    if !metadata.is_file() {
        return Err(ValidationError::FileNotFound(path.display().to_string()));
    }
    Ok(SelectedFile {
        path: path.to_path_buf(),
        name,
        size: metadata.len(),
    })
}

/// Peptide text must contain something besides whitespace
pub fn validate_peptide_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::EmptyPeptide)
    } else {
        Ok(())
    }
}

/// `N bytes`, `N.N KB` below 1 MiB, `N.N MB` otherwise
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1_048_576 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    }
}

/// Turn a pasted or typed path into a filesystem path
///
/// Terminals paste dropped files quoted or as `file://` URLs.
pub fn clean_pasted_path(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    let without_scheme = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    without_scheme.replace("\\ ", " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 bytes");
        assert_eq!(format_file_size(1023), "1023 bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1.0 MB");
        assert_eq!(format_file_size(5 * 1_048_576 + 524_288), "5.5 MB");
    }

    #[test]
    fn test_extension_check_ignores_case() {
        assert!(has_peptide_extension("peptides.FASTA"));
        assert!(has_peptide_extension("a.b.tsv"));
        assert!(!has_peptide_extension("peptides.xlsx"));
        assert!(!has_peptide_extension("fasta"));
    }

    #[test]
    fn test_select_peptide_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.fasta");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, ">p1\nMKVLA\n").unwrap();
        drop(file);

        let selected = select_peptide_file(&path).unwrap();
        assert_eq!(selected.summary(), "input.fasta (10 bytes)");

        let bad = dir.path().join("input.xlsx");
        std::fs::write(&bad, b"x").unwrap();
        assert_eq!(select_peptide_file(&bad), Err(ValidationError::InvalidFileType));
        assert!(matches!(
            select_peptide_file(&dir.path().join("missing.txt")),
            Err(ValidationError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_validate_peptide_text() {
        assert_eq!(validate_peptide_text("  \n "), Err(ValidationError::EmptyPeptide));
        assert!(validate_peptide_text("MKVLA").is_ok());
        assert_eq!(
            ValidationError::EmptyPeptide.to_string(),
            "Please enter a peptide sequence"
        );
    }

    #[test]
    fn test_clean_pasted_path() {
        assert_eq!(clean_pasted_path("'/tmp/my file.txt'\n"), "/tmp/my file.txt");
        assert_eq!(clean_pasted_path("file:///tmp/a.csv"), "/tmp/a.csv");
        assert_eq!(clean_pasted_path("/tmp/my\\ file.txt"), "/tmp/my file.txt");
    }
}
