use crate::utils::error::{DispatchError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DispatchError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DispatchError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// A bare file name inside the data directory, ending in `.csv`.
pub fn validate_csv_file_name(field_name: &str, file_name: &str) -> Result<()> {
    validate_path(field_name, file_name)?;

    if file_name.contains('/') || file_name.contains('\\') {
        return Err(DispatchError::InvalidConfigValue {
            field: field_name.to_string(),
            value: file_name.to_string(),
            reason: "Expected a file name, not a path".to_string(),
        });
    }

    match std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some("csv") => Ok(()),
        _ => Err(DispatchError::InvalidConfigValue {
            field: field_name.to_string(),
            value: file_name.to_string(),
            reason: "Unsupported file extension. Allowed extensions: csv".to_string(),
        }),
    }
}

pub fn validate_directory_exists(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    if !std::path::Path::new(path).is_dir() {
        return Err(DispatchError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Directory does not exist".to_string(),
        });
    }
    Ok(())
}
