use std::path::Path;

/// Final path component as text.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension of the final path component, including the leading dot.
///
/// Everything from the last `.` counts, so `.json` on its own is an
/// extension and `archive.tar.gz` has `.gz`.
pub fn extension(path: &Path) -> Option<String> {
    let name = file_name(path);
    name.rfind('.').map(|dot| name[dot..].to_string())
}

/// Final path component with its extension removed.
pub fn base_name(path: &Path) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(dot) => name[..dot].to_string(),
        None => name,
    }
}
