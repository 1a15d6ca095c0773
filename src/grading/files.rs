//! Repository file checks

use crate::forge::{ForgeApi, ForgeError, TreeEntry};

/// Counts non-overlapping occurrences of `marker` (e.g. `#[test]`)
pub fn count_marker(content: &str, marker: &str) -> usize {
    if marker.is_empty() {
        return 0;
    }
    content.matches(marker).count()
}

/// Fetches `file_path` at `ref_name` and counts test markers in it
pub async fn count_tests_in_file(
    forge: &dyn ForgeApi,
    project_id: u64,
    ref_name: &str,
    file_path: &str,
    marker: &str,
) -> Result<usize, ForgeError> {
    let file = forge.file(project_id, file_path, ref_name).await?;
    let content = file.decoded_text()?;
    Ok(count_marker(&content, marker))
}

/// Required names that are not top-level files in `entries`
pub fn missing_files(entries: &[TreeEntry], required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !entries.iter().any(|entry| entry.is_blob() && &entry.name == *name))
        .cloned()
        .collect()
}

/// Lists the repository root and reports which required files are absent
pub async fn check_required_files(
    forge: &dyn ForgeApi,
    project_id: u64,
    ref_name: &str,
    required: &[String],
) -> Result<Vec<String>, ForgeError> {
    let entries = forge.repository_tree(project_id, ref_name, "").await?;
    Ok(missing_files(&entries, required))
}

/// One display line for a tree entry
pub fn describe_entry(entry: &TreeEntry) -> String {
    if entry.is_tree() {
        format!("📁 {}/", entry.name)
    } else if entry.is_blob() {
        format!("📄 {}", entry.name)
    } else {
        format!("{} {}", entry.kind.to_uppercase(), entry.name)
    }
}
