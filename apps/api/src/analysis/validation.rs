use crate::analysis::extract::DocumentFormat;
use crate::analysis::input::UploadedFile;
use crate::errors::AppError;

/// 5 MiB upload ceiling per file.
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Checks an uploaded file before any extraction work is done.
///
/// Size is checked first, then the declared media type against the
/// three supported formats. Pure: reads only the file's metadata.
pub fn validate_file(file: &UploadedFile) -> Result<DocumentFormat, AppError> {
    if file.size_bytes > MAX_FILE_BYTES {
        return Err(AppError::OversizedInput {
            filename: file.filename.clone(),
            size_bytes: file.size_bytes,
            limit: MAX_FILE_BYTES,
        });
    }

    DocumentFormat::from_media_type(&file.media_type)
}
