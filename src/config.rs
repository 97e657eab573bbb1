//! Конфигурация пайплайна и сервиса

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::preprocessing::encoding::UnknownCategoryPolicy;
use crate::types::{CategoricalColumn, StorageBucket, StorageRule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Строки с этими производителями GPU удаляются из таблицы
    #[serde(default = "default_irrelevant_gpu_vendors")]
    pub irrelevant_gpu_vendors: Vec<String>,
    #[serde(default = "default_categorical_columns")]
    pub categorical_columns: Vec<CategoricalColumn>,
    #[serde(default)]
    pub unknown_category: UnknownCategoryPolicy,
    #[serde(default = "default_storage_rules")]
    pub storage_rules: Vec<StorageRule>,
}

fn default_irrelevant_gpu_vendors() -> Vec<String> {
    vec!["ARM".to_string()]
}

fn default_categorical_columns() -> Vec<CategoricalColumn> {
    CategoricalColumn::DEFAULT.to_vec()
}

// Hybrid и Flash Storage складываются в HDD и SSD соответственно
pub fn default_storage_rules() -> Vec<StorageRule> {
    vec![
        StorageRule::new("HDD", StorageBucket::Hdd),
        StorageRule::new("SSD", StorageBucket::Ssd),
        StorageRule::new("Hybrid", StorageBucket::Hdd),
        StorageRule::new("Flash Storage", StorageBucket::Ssd),
    ]
}

impl PipelineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Ok(serde_json::from_reader(file)?)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            irrelevant_gpu_vendors: default_irrelevant_gpu_vendors(),
            categorical_columns: default_categorical_columns(),
            unknown_category: UnknownCategoryPolicy::default(),
            storage_rules: default_storage_rules(),
        }
    }
}

/// Настройки HTTP сервиса (из переменных окружения)
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub addr: SocketAddr,
    pub data_path: Option<PathBuf>,
    pub encoder_path: PathBuf,
    pub pipeline_config_path: Option<PathBuf>,
}

impl ServiceConfig {
    pub const DEFAULT_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8000);
    pub const DEFAULT_ENCODER_PATH: &'static str = "models/encoder.json";

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = match lookup("LAPTOP_ML_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid LAPTOP_ML_ADDR '{}': {}", raw, e))?,
            None => SocketAddr::from(Self::DEFAULT_ADDR),
        };

        Ok(Self {
            addr,
            data_path: lookup("LAPTOP_ML_DATA").map(PathBuf::from),
            encoder_path: lookup("LAPTOP_ML_ENCODER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_ENCODER_PATH)),
            pipeline_config_path: lookup("LAPTOP_ML_CONFIG").map(PathBuf::from),
        })
    }

    pub fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        match &self.pipeline_config_path {
            Some(path) => PipelineConfig::from_file(path)
                .map_err(|e| anyhow::anyhow!("failed to read config {:?}: {}", path, e)),
            None => Ok(PipelineConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"irrelevant_gpu_vendors": ["ARM", "Matrox"]}"#).unwrap();

        assert_eq!(config.irrelevant_gpu_vendors, vec!["ARM", "Matrox"]);
        assert_eq!(config.categorical_columns.len(), 5);
        assert_eq!(config.unknown_category, UnknownCategoryPolicy::ZeroVector);
        assert_eq!(config.storage_rules, default_storage_rules());
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, r#"{"unknown_category": "unknown_bucket"}"#).unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.unknown_category, UnknownCategoryPolicy::UnknownBucket);
        assert_eq!(config.irrelevant_gpu_vendors, vec!["ARM"]);
    }

    #[test]
    fn test_service_config_defaults_and_overrides() {
        let empty = ServiceConfig::from_lookup(|_| None).unwrap();
        assert_eq!(empty.addr.port(), 8000);
        assert_eq!(empty.encoder_path, PathBuf::from("models/encoder.json"));
        assert!(empty.data_path.is_none());

        let vars: HashMap<&str, &str> = [
            ("LAPTOP_ML_ADDR", "127.0.0.1:9000"),
            ("LAPTOP_ML_DATA", "data/laptop_data.csv"),
        ]
        .into_iter()
        .collect();
        let config = ServiceConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.data_path, Some(PathBuf::from("data/laptop_data.csv")));

        assert!(ServiceConfig::from_lookup(|_| Some("not an addr".to_string())).is_err());
    }
}
