use std::{
    fs,
    io::Read,
    path::Path,
};

use crate::core::{
    IntakeLimits,
    MarcFillError,
};

/// An uploaded file as the shell received it.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn from_path(path: &Path) -> Result<Self, MarcFillError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let bytes = fs::read(path)?;
        Ok(Self { file_name, bytes })
    }
}

/// Picks the upload when it has a name, otherwise non-blank inline text.
pub fn read_input(
    upload: Option<Upload>,
    text: Option<String>,
    limits: &IntakeLimits,
) -> Result<String, MarcFillError> {
    if let Some(upload) = upload.filter(|u| !u.file_name.is_empty()) {
        return decode_upload(upload, limits);
    }

    match text {
        Some(text) if !text.trim().is_empty() => {
            check_size(text.len(), limits)?;
            Ok(text)
        }
        _ => Err(MarcFillError::NoInput),
    }
}

/// Inline text from a stream, read no further than one byte past the limit.
pub fn read_stream(reader: impl Read, limits: &IntakeLimits) -> Result<String, MarcFillError> {
    let cap = u64::try_from(limits.max_input_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(cap).read_to_end(&mut bytes)?;
    check_size(bytes.len(), limits)?;

    read_input(None, Some(String::from_utf8(bytes)?), limits)
}

fn decode_upload(upload: Upload, limits: &IntakeLimits) -> Result<String, MarcFillError> {
    if !has_accepted_extension(&upload.file_name, limits) {
        return Err(MarcFillError::UnsupportedFileType(
            upload.file_name,
            limits.accepted_extensions.join(", "),
        ));
    }
    check_size(upload.bytes.len(), limits)?;

    let text = String::from_utf8(upload.bytes)?;
    tracing::debug!("Decoded {} ({} bytes)", upload.file_name, text.len());
    Ok(text)
}

fn check_size(size: usize, limits: &IntakeLimits) -> Result<(), MarcFillError> {
    if size > limits.max_input_bytes {
        return Err(MarcFillError::PayloadTooLarge { size, limit: limits.max_input_bytes });
    }
    Ok(())
}

pub fn has_accepted_extension(file_name: &str, limits: &IntakeLimits) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            limits.accepted_extensions.iter().any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
}

/// Name for the processed attachment: `<stem>.processed.mrk` for a named
/// upload, the configured download name otherwise.
pub fn output_file_name(source: Option<&str>, limits: &IntakeLimits) -> String {
    source
        .and_then(|name| Path::new(name).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{}.processed.mrk", stem))
        .unwrap_or_else(|| limits.download_name.clone())
}
