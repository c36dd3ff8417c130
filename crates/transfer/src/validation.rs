use std::path::{Component, Path};

use crate::TransferError;

/// Validates a file name before it is used as an attachment title.
///
/// Rejects:
/// - Empty or whitespace-only names
/// - Anything with a directory part (`a/b.pdf`, `C:\x.pdf`)
/// - `.` and `..`
pub fn validate_file_name(file_name: &str) -> Result<(), TransferError> {
    if file_name.trim().is_empty() {
        return Err(TransferError::InvalidFileName("empty file name".into()));
    }

    if file_name.contains(['/', '\\']) {
        return Err(TransferError::InvalidFileName(format!(
            "path separators not allowed: {file_name}"
        )));
    }

    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(TransferError::InvalidFileName(format!(
            "not a plain file name: {file_name}"
        ))),
    }
}
