use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("inventory file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("could not read {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("sheet \"{sheet}\" not found in {}; available: [{}]", path.display(), available.join(", "))]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },

    #[error("missing required columns: {}", missing.join(", "))]
    MissingRequiredColumns { missing: Vec<String> },
}
