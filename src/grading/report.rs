//! Per-assignment results file

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::ci_log::TestTally;
use crate::core::config::{RESULTS_DELIMITER_WIDTH, RESULTS_FILE_NAME};

/// One student's line in the results file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultEntry {
    pub username: String,
    pub repo_url: String,
    pub commit_count: usize,
    pub tally: TestTally,
}

impl ResultEntry {
    /// Renders the delimited block appended for one run
    pub fn render(&self) -> String {
        let rule = "-".repeat(RESULTS_DELIMITER_WIDTH);
        let delimiter = format!("{rule} {} {rule}", self.username);
        format!(
            "{delimiter}\n{},{}\nall_tests,{} passed_tests,{} failed_tests,{}\n{delimiter}\n\n\n",
            self.repo_url, self.commit_count, self.tally.total, self.tally.passed, self.tally.failed,
        )
    }
}

/// Appends `entry` to `<folder>/results.txt`, creating the folder and file if needed
pub fn append_result(folder: &Path, entry: &ResultEntry) -> Result<PathBuf> {
    fs::create_dir_all(folder)
        .with_context(|| format!("Failed to create result folder {}", folder.display()))?;

    let path = folder.join(RESULTS_FILE_NAME);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    file.write_all(entry.render().as_bytes())
        .with_context(|| format!("Failed to append to {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry() -> ResultEntry {
        ResultEntry {
            username: "abc123".to_string(),
            repo_url: "http://gitlab.example.edu/abc123-cse262/homework-2".to_string(),
            commit_count: 14,
            tally: TestTally::new(20, 18, 2),
        }
    }

    #[test]
    fn test_render_format() {
        assert_eq!(
            entry().render(),
            "---------- abc123 ----------\n\
             http://gitlab.example.edu/abc123-cse262/homework-2,14\n\
             all_tests,20 passed_tests,18 failed_tests,2\n\
             ---------- abc123 ----------\n\n\n"
        );
    }

    #[test]
    fn test_append_creates_folder_and_appends() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let folder = temp_dir.path().join("cicd").join("homework-2");

        let path = append_result(&folder, &entry()).unwrap();
        append_result(&folder, &entry()).unwrap();

        assert_eq!(path, folder.join("results.txt"));
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, entry().render().repeat(2));
    }

    #[test]
    fn test_append_fails_when_folder_is_a_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let blocker = temp_dir.path().join("homework-2");
        fs::write(&blocker, "not a directory").unwrap();

        assert!(append_result(&blocker, &entry()).is_err());
    }
}
