use crate::adapters::csv_source::{CsvDirectorySource, DRIVERS_FILE, PASSENGERS_FILE, TRIPS_FILE};
use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::{validate_csv_file_name, validate_directory_exists, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchConfig {
    pub data: DataConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    pub directory: String,
    pub passengers_file: Option<String>,
    pub drivers_file: Option<String>,
    pub trips_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    pub json: Option<bool>,
}

impl DispatchConfig {
    /// 只指定資料目錄，其餘使用預設值
    pub fn for_directory(directory: impl Into<String>) -> Self {
        Self {
            data: DataConfig {
                directory: directory.into(),
                passengers_file: None,
                drivers_file: None,
                trips_file: None,
            },
            output: None,
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| DispatchError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| DispatchError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn data_directory(&self) -> &str {
        &self.data.directory
    }

    pub fn passengers_file(&self) -> &str {
        self.data.passengers_file.as_deref().unwrap_or(PASSENGERS_FILE)
    }

    pub fn drivers_file(&self) -> &str {
        self.data.drivers_file.as_deref().unwrap_or(DRIVERS_FILE)
    }

    pub fn trips_file(&self) -> &str {
        self.data.trips_file.as_deref().unwrap_or(TRIPS_FILE)
    }

    pub fn json_output(&self) -> bool {
        self.output.as_ref().and_then(|o| o.json).unwrap_or(false)
    }

    pub fn record_source(&self) -> CsvDirectorySource {
        CsvDirectorySource::new(self.data_directory()).with_file_names(
            self.passengers_file(),
            self.drivers_file(),
            self.trips_file(),
        )
    }
}

impl Validate for DispatchConfig {
    fn validate(&self) -> Result<()> {
        validate_directory_exists("data.directory", &self.data.directory)?;
        validate_csv_file_name("data.passengers_file", self.passengers_file())?;
        validate_csv_file_name("data.drivers_file", self.drivers_file())?;
        validate_csv_file_name("data.trips_file", self.trips_file())?;
        Ok(())
    }
}
