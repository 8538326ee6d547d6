use std::path::Path;

use walkdir::WalkDir;

use super::types::ReadError;

/// List the file names in `dir` whose names contain `kw`.
///
/// No recursion. Entries come back in host filesystem order; callers that
/// rely on a particular order should sort explicitly.
pub fn list_files(dir: impl AsRef<Path>, kw: &str) -> Result<Vec<String>, ReadError> {
    let mut names = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ReadError::Io(e.into()))?;
        if entry.file_type().is_file() {
            let name = entry.file_name().to_string_lossy();
            if name.contains(kw) {
                names.push(name.into_owned());
            }
        }
    }

    Ok(names)
}

/// Extract an index label from a file's base name: the substring at the
/// character offsets `[start, end]`, inclusive. A name shorter than the
/// window yields whatever falls inside it.
pub fn extract_index(path: &Path, (start, end): (usize, usize)) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let len = if end >= start { end - start + 1 } else { 0 };
    let index: String = name.chars().skip(start).take(len).collect();

    if index.is_empty() { None } else { Some(index) }
}
