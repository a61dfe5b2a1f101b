//! Filename filter applied after discovery.

use crate::types::DriveFile;
use regex::Regex;

/// Keeps files whose name matches an expression from its first character.
///
/// The match only has to start at offset 0; it does not have to cover the
/// whole name.
#[derive(Debug, Clone)]
pub struct NameFilter {
    regex: Regex,
}

impl NameFilter {
    /// Compiles `pattern`.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// The source expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns true if `name` matches at its start.
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.find(name).map_or(false, |m| m.start() == 0)
    }

    /// Lazily keeps the files whose names match.
    pub fn apply<'a, I>(&'a self, files: I) -> impl Iterator<Item = DriveFile> + 'a
    where
        I: IntoIterator<Item = DriveFile>,
        I::IntoIter: 'a,
    {
        files.into_iter().filter(move |file| self.is_match(&file.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::DEFAULT_NAME_REGEX;

    fn named(names: &[&str]) -> Vec<DriveFile> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| DriveFile::new(i.to_string(), *name))
            .collect()
    }

    #[test]
    fn test_prefix_match() {
        let filter = NameFilter::new(r"FY\d{2}_").unwrap();
        assert!(filter.is_match("FY21_Audit.pdf"));
        assert!(!filter.is_match("Copy of FY21_Audit.pdf"));
    }

    #[test]
    fn test_default_grammar() {
        let filter = NameFilter::new(DEFAULT_NAME_REGEX).unwrap();
        assert!(filter.is_match("FY21_Audit_Acme Corp_20230101 final.pdf"));
        assert!(!filter.is_match("FY21_Notes.txt"));
        assert!(!filter.is_match("DRAFT FY21_Audit_Acme_20230101"));
    }

    #[test]
    fn test_apply_keeps_order() {
        let filter = NameFilter::new(r"^FY\d{2}_.*_\d{8}.*").unwrap();
        let kept: Vec<String> = filter
            .apply(named(&[
                "FY21_Audit_Acme_20230101.pdf",
                "FY21_Notes.txt",
                "FY22_Plan_20220505",
            ]))
            .map(|f| f.name)
            .collect();

        assert_eq!(kept, vec!["FY21_Audit_Acme_20230101.pdf", "FY22_Plan_20220505"]);
    }

    #[test]
    fn test_idempotent() {
        let filter = NameFilter::new(DEFAULT_NAME_REGEX).unwrap();
        let files = named(&[
            "FY21_Audit_Acme_20230101.pdf",
            "FY21_Notes.txt",
            "FY20_Narrative_Draft_20200101",
            "report 2021",
        ]);

        let once: Vec<DriveFile> = filter.apply(files).collect();
        let twice: Vec<DriveFile> = filter.apply(once.clone()).collect();

        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(NameFilter::new("FY(").is_err());
    }
}
