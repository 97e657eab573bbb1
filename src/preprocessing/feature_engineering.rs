//! Feature engineering: сырые строки -> числовые и категориальные признаки

use linfa::Dataset;
use ndarray::{Array1, Array2, Ix1};

use crate::error::{ParseError, PipelineError, Result};
use crate::preprocessing::encoding::FittedOneHotEncoder;
use crate::preprocessing::parsing::{
    gpu_brand, normalize_cpu_brand, normalize_numeric_with_unit, normalize_os, parse_price,
    parse_screen_resolution, parse_storage_with,
};
use crate::types::{EngineeredLaptop, LaptopFeatures, RawLaptop, StorageRule};

/// Целевая переменная обучается в логарифмической шкале
pub fn log_price(price: f64) -> f64 {
    price.ln()
}

pub fn price_from_log(log_price: f64) -> f64 {
    log_price.exp()
}

/// Удаляет строки с нерелевантными производителями GPU (по умолчанию ARM)
pub fn drop_irrelevant_gpu_rows(table: Vec<EngineeredLaptop>, irrelevant: &[String]) -> Vec<EngineeredLaptop> {
    let before = table.len();
    let kept: Vec<EngineeredLaptop> = table
        .into_iter()
        .filter(|row| !irrelevant.iter().any(|vendor| *vendor == row.features.gpu_brand))
        .collect();

    if kept.len() < before {
        tracing::info!("Dropped {} rows with irrelevant GPU vendors", before - kept.len());
    }
    kept
}

/// Матрица, готовая для обучения модели
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReadyTable {
    pub feature_names: Vec<String>,
    pub features: Array2<f64>,
    /// log(Price)
    pub targets: Array1<f64>,
}

impl ModelReadyTable {
    pub fn into_dataset(self) -> Dataset<f64, f64, Ix1> {
        Dataset::new(self.features, self.targets).with_feature_names(self.feature_names)
    }
}

pub struct FeatureEngineer {
    storage_rules: Vec<StorageRule>,
}

impl FeatureEngineer {
    pub fn new(storage_rules: Vec<StorageRule>) -> Self {
        Self { storage_rules }
    }

    fn non_empty(field: &str, value: &str) -> std::result::Result<String, ParseError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyField {
                field: field.to_string(),
            });
        }
        Ok(trimmed.to_string())
    }

    pub fn engineer_record(&self, raw: &RawLaptop) -> std::result::Result<EngineeredLaptop, ParseError> {
        let screen = parse_screen_resolution(&raw.screen_resolution, raw.inches)?;
        let storage = parse_storage_with(&raw.memory, &self.storage_rules)?;

        let features = LaptopFeatures {
            company: Self::non_empty("Company", &raw.company)?,
            type_name: Self::non_empty("TypeName", &raw.type_name)?,
            ram: normalize_numeric_with_unit(&raw.ram, "GB")?,
            weight: normalize_numeric_with_unit(&raw.weight, "kg")?,
            touchscreen: screen.touchscreen as u8,
            ips: screen.ips as u8,
            ppi: screen.ppi,
            cpu_brand: normalize_cpu_brand(&Self::non_empty("Cpu", &raw.cpu)?),
            hdd: storage.hdd_gb,
            ssd: storage.ssd_gb,
            gpu_brand: gpu_brand(&raw.gpu)?,
            os: normalize_os(&raw.op_sys),
        };

        Ok(EngineeredLaptop {
            features,
            price: parse_price(&raw.price)?,
        })
    }

    /// Первая ошибка разбора отклоняет весь батч
    pub fn engineer(&self, raws: &[RawLaptop]) -> Result<Vec<EngineeredLaptop>> {
        let table = raws
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                self.engineer_record(raw)
                    .map_err(|source| PipelineError::Row { index, source })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Engineered {} rows", table.len());
        Ok(table)
    }

    /// Закодированные категории, затем числовые колонки как есть
    pub fn model_row(features: &LaptopFeatures, encoder: &FittedOneHotEncoder) -> Array1<f64> {
        encoder
            .transform_one(features)
            .iter()
            .copied()
            .chain(features.numeric_values())
            .collect()
    }

    pub fn model_feature_names(encoder: &FittedOneHotEncoder) -> Vec<String> {
        let mut names = encoder.feature_names();
        names.extend(LaptopFeatures::NUMERIC_COLUMNS.iter().map(|c| c.to_string()));
        names
    }

    pub fn model_matrix(table: &[EngineeredLaptop], encoder: &FittedOneHotEncoder) -> Result<ModelReadyTable> {
        if table.is_empty() {
            return Err(PipelineError::EmptyTable);
        }

        let n_features = encoder.n_features_out() + LaptopFeatures::NUMERIC_COLUMNS.len();
        let mut features = Array2::zeros((table.len(), n_features));
        let mut targets = Array1::zeros(table.len());

        for (i, row) in table.iter().enumerate() {
            features
                .row_mut(i)
                .assign(&Self::model_row(&row.features, encoder));
            targets[i] = row.log_price();
        }

        Ok(ModelReadyTable {
            feature_names: Self::model_feature_names(encoder),
            features,
            targets,
        })
    }
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new(crate::config::default_storage_rules())
    }
}
