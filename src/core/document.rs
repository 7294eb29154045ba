//! In-memory editable view of a line-oriented config file.
//!
//! Edits go to a working buffer; the original snapshot only changes when the
//! document is saved (or reloaded). Saving writes a timestamped backup of the
//! on-disk content before overwriting it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

/// A config document shared between the host and the plugins it loaded.
pub type SharedDocument = Arc<Mutex<ConfigDocument>>;

/// Errors raised by document operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document path does not point at a regular file.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A line index outside the working buffer.
    #[error("Line index {index} out of range (document has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Editable representation of a text config file.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    original: Vec<String>,
    lines: Vec<String>,
}

impl ConfigDocument {
    /// Open a document, expanding a leading `~` in the path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let raw = path.as_ref().to_string_lossy();
        let path = PathBuf::from(shellexpand::tilde(&raw).into_owned());
        if !path.is_file() {
            return Err(DocumentError::NotFound(path));
        }

        let mut document = Self { path, original: Vec::new(), lines: Vec::new() };
        document.load()?;
        Ok(document)
    }

    /// Wrap the document for sharing with plugin editors.
    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    /// Re-read the file, dropping any unsaved edits.
    pub fn load(&mut self) -> Result<(), DocumentError> {
        let content = std::fs::read_to_string(&self.path)?;
        self.original = content.lines().map(str::to_string).collect();
        self.lines = self.original.clone();
        Ok(())
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Working lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn get_line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Whether the working buffer differs from the last loaded content.
    pub fn is_modified(&self) -> bool {
        self.lines != self.original
    }

    /// Replace a whole line.
    pub fn replace_line(&mut self, index: usize, line: impl Into<String>) -> Result<(), DocumentError> {
        let len = self.lines.len();
        let slot = self.lines.get_mut(index).ok_or(DocumentError::IndexOutOfRange { index, len })?;
        *slot = line.into();
        Ok(())
    }

    pub fn append_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Insert a line before `index`; `index == line_count()` appends.
    pub fn insert_line(&mut self, index: usize, line: impl Into<String>) -> Result<(), DocumentError> {
        let len = self.lines.len();
        if index > len {
            return Err(DocumentError::IndexOutOfRange { index, len });
        }
        self.lines.insert(index, line.into());
        Ok(())
    }

    /// Comment out a line with `#`, keeping its indentation.
    pub fn comment_line(&mut self, index: usize) -> Result<(), DocumentError> {
        let current = self.line_or_err(index)?;
        let updated = comment_line(current);
        self.replace_line(index, updated)
    }

    /// Remove the first `#` of a commented line, keeping its indentation.
    pub fn uncomment_line(&mut self, index: usize) -> Result<(), DocumentError> {
        let current = self.line_or_err(index)?;
        let updated = uncomment_line(current);
        self.replace_line(index, updated)
    }

    fn line_or_err(&self, index: usize) -> Result<&str, DocumentError> {
        self.get_line(index).ok_or(DocumentError::IndexOutOfRange { index, len: self.lines.len() })
    }

    /// Write the working buffer to disk.
    ///
    /// With `backup` set, the current on-disk content is first copied to
    /// `{path}.bak.{YYYYmmdd_HHMMSS}`; the backup path is returned. The
    /// document is reloaded from disk afterwards.
    pub fn save(&mut self, backup: bool) -> Result<Option<PathBuf>, DocumentError> {
        let backup_path = if backup { Some(make_backup(&self.path)?) } else { None };

        let mut text = self.lines.join("\n");
        if !text.ends_with('\n') {
            text.push('\n');
        }
        std::fs::write(&self.path, text)?;
        self.load()?;

        tracing::info!(path = %self.path.display(), lines = self.lines.len(), "Config saved");
        Ok(backup_path)
    }

    /// Drop unsaved edits.
    pub fn discard_changes(&mut self) -> Result<(), DocumentError> {
        self.load()
    }
}

/// Copy `path` to a timestamped sibling backup and return the backup path.
///
/// An existing backup with the same stamp is never overwritten; a numeric
/// suffix (`.1`, `.2`, ...) is added instead.
pub fn make_backup(path: &Path) -> Result<PathBuf, DocumentError> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut base = path.as_os_str().to_owned();
    base.push(format!(".bak.{stamp}"));

    let mut backup = PathBuf::from(&base);
    let mut counter = 1u32;
    while backup.exists() {
        let mut name = base.clone();
        name.push(format!(".{counter}"));
        backup = PathBuf::from(name);
        counter += 1;
    }

    std::fs::copy(path, &backup)?;
    Ok(backup)
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

pub fn is_commented(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

pub fn comment_line(line: &str) -> String {
    if is_commented(line) {
        return line.to_string();
    }
    let indent = leading_whitespace(line);
    format!("{indent}#{}", &line[indent.len()..])
}

pub fn uncomment_line(line: &str) -> String {
    if !is_commented(line) {
        return line.to_string();
    }
    let indent = leading_whitespace(line);
    format!("{indent}{}", line[indent.len()..].replacen('#', "", 1))
}

/// Conventional config locations probed when none is configured.
pub fn default_document_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        candidates.push(PathBuf::from(xdg).join("i3").join("config"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".config").join("i3").join("config"));
        candidates.push(home.join(".i3").join("config"));
    }
    candidates
}

/// First existing conventional config file, if any.
pub fn find_default_document() -> Option<PathBuf> {
    default_document_candidates().into_iter().find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigDocument::open(temp_dir.path().join("nope"));
        assert!(matches!(result, Err(DocumentError::NotFound(_))));
    }

    #[test]
    fn test_edit_does_not_touch_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "a\nb\n");

        let mut doc = ConfigDocument::open(&path).unwrap();
        doc.replace_line(1, "B").unwrap();
        doc.append_line("c");

        assert!(doc.is_modified());
        assert_eq!(doc.lines(), &["a", "B", "c"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_replace_out_of_range() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "a\n");

        let mut doc = ConfigDocument::open(&path).unwrap();
        let err = doc.replace_line(3, "x").unwrap_err();
        assert!(matches!(err, DocumentError::IndexOutOfRange { index: 3, len: 1 }));
    }

    #[test]
    fn test_save_writes_backup_then_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "set $mod Mod4\n");

        let mut doc = ConfigDocument::open(&path).unwrap();
        doc.append_line("x");
        let backup = doc.save(true).unwrap().unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.ends_with("x\n"));
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "set $mod Mod4\n");

        let name = backup.file_name().unwrap().to_string_lossy().to_string();
        let stamp = name.strip_prefix("config.bak.").unwrap();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));

        assert!(!doc.is_modified());
        assert_eq!(doc.line_count(), 2);
    }

    #[test]
    fn test_backups_in_same_second_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config");

        std::fs::write(&path, "one\n").unwrap();
        let first = make_backup(&path).unwrap();
        std::fs::write(&path, "two\n").unwrap();
        let second = make_backup(&path).unwrap();
        std::fs::write(&path, "three\n").unwrap();
        let third = make_backup(&path).unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "one\n");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "two\n");
        assert_eq!(std::fs::read_to_string(&third).unwrap(), "three\n");
    }

    #[test]
    fn test_save_without_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "a");

        let mut doc = ConfigDocument::open(&path).unwrap();
        assert!(doc.save(false).unwrap().is_none());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\n");
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_discard_changes() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "a\n");

        let mut doc = ConfigDocument::open(&path).unwrap();
        doc.append_line("b");
        doc.discard_changes().unwrap();
        assert_eq!(doc.lines(), &["a"]);
    }

    #[test]
    fn test_comment_helpers() {
        assert_eq!(comment_line("  bindsym $mod+Return exec i3"), "  #bindsym $mod+Return exec i3");
        assert_eq!(comment_line("# already"), "# already");
        assert_eq!(uncomment_line("\t#exec x # note"), "\texec x # note");
        assert_eq!(uncomment_line("exec x"), "exec x");
        assert!(is_commented("   # x"));
    }

    #[test]
    fn test_comment_line_in_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "a\n  b\n");

        let mut doc = ConfigDocument::open(&path).unwrap();
        doc.comment_line(1).unwrap();
        assert_eq!(doc.get_line(1), Some("  #b"));
        doc.uncomment_line(1).unwrap();
        assert_eq!(doc.get_line(1), Some("  b"));
    }
}
