use std::{
    fs,
    io::{
        self,
        Read,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

use rayon::prelude::*;

use crate::{
    core::{
        pipeline::repair,
        MarcFillError,
        ProcessingStats,
        Settings,
    },
    intake::{
        self,
        Upload,
    },
};

/// Where a single document is read from.
pub enum Input<'a> {
    File(&'a Path),
    Text(String),
    Stream(Box<dyn Read + 'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired {
    pub label: String,                // File name, or `<input>` for text and streams
    pub written_to: Option<PathBuf>,  // None when the text went to the caller's writer
    pub stats: ProcessingStats,
}

#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: Result<Repaired, MarcFillError>,
}

/// Repairs one document. It goes to `output` when given, into `out_dir`
/// under its processed name, or else to `sink`.
pub fn repair_document(
    input: Input<'_>,
    output: Option<&Path>,
    out_dir: Option<&Path>,
    settings: &Settings,
    sink: &mut dyn Write,
) -> Result<Repaired, MarcFillError> {
    let (text, source) = match input {
        Input::File(path) => {
            let upload = Upload::from_path(path)?;
            let name = upload.file_name.clone();
            (intake::read_input(Some(upload), None, &settings.intake)?, Some(name))
        }
        Input::Text(text) => (intake::read_input(None, Some(text), &settings.intake)?, None),
        Input::Stream(reader) => (intake::read_stream(reader, &settings.intake)?, None),
    };

    let report = repair(&text, &settings.profile);
    let label = source.clone().unwrap_or_else(|| "<input>".to_string());
    if report.is_unchanged() {
        tracing::info!("{}: nothing to repair, passing through", label);
    }

    let destination = match (output, out_dir) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(dir)) => {
            Some(dir.join(intake::output_file_name(source.as_deref(), &settings.intake)))
        }
        (None, None) => None,
    };

    match &destination {
        Some(path) => write_output(path, &report.output)?,
        None => {
            sink.write_all(report.output.as_bytes())?;
            sink.flush()?;
        }
    }

    Ok(Repaired { label, written_to: destination, stats: report.stats })
}

/// Repairs several files in parallel into `out_dir`. A failing file does not
/// stop the others; its error is kept in its entry.
pub fn repair_batch(
    files: &[PathBuf],
    out_dir: Option<&Path>,
    settings: &Settings,
) -> Result<Vec<BatchEntry>, MarcFillError> {
    let out_dir = out_dir.ok_or_else(|| {
        MarcFillError::Custom("--out-dir is required with more than one file".to_string())
    })?;

    Ok(files
        .par_iter()
        .map(|path| BatchEntry {
            path: path.clone(),
            result: repair_document(
                Input::File(path),
                None,
                Some(out_dir),
                settings,
                &mut io::sink(),
            ),
        })
        .collect())
}

fn write_output(path: &Path, content: &str) -> Result<(), MarcFillError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}
