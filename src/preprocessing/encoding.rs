//! One-hot кодирование категориальных признаков
//!
//! `OneHotEncoder` хранит только настройки. `fit` возвращает
//! `FittedOneHotEncoder` с неизменяемым словарем категорий; он сохраняется
//! на диск и используется при инференсе без повторного обучения.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::types::{CategoricalColumn, EngineeredLaptop, LaptopFeatures};

/// Имя категории-корзины для политики `UnknownBucket`
pub const UNKNOWN_CATEGORY: &str = "<unknown>";

/// Что делать с категорией, которой не было при обучении
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Все индикаторы колонки равны нулю
    #[default]
    ZeroVector,
    /// Отдельный индикатор `<column>=<unknown>` в конце блока колонки
    UnknownBucket,
}

impl AsRef<LaptopFeatures> for LaptopFeatures {
    fn as_ref(&self) -> &LaptopFeatures {
        self
    }
}

impl AsRef<LaptopFeatures> for EngineeredLaptop {
    fn as_ref(&self) -> &LaptopFeatures {
        &self.features
    }
}

#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    columns: Vec<CategoricalColumn>,
    unknown_policy: UnknownCategoryPolicy,
}

impl OneHotEncoder {
    pub fn new(columns: impl Into<Vec<CategoricalColumn>>) -> Self {
        Self {
            columns: columns.into(),
            unknown_policy: UnknownCategoryPolicy::default(),
        }
    }

    pub fn with_unknown_policy(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }

    pub fn fit<R: AsRef<LaptopFeatures>>(&self, rows: &[R]) -> Result<FittedOneHotEncoder> {
        if rows.is_empty() {
            return Err(PipelineError::EmptyTable);
        }

        let vocabularies: Vec<ColumnVocabulary> = self
            .columns
            .iter()
            .map(|&column| {
                // BTreeSet дает отсортированный и детерминированный порядок
                let categories: BTreeSet<&str> =
                    rows.iter().map(|row| column.value(row.as_ref())).collect();
                ColumnVocabulary {
                    column,
                    categories: categories.into_iter().map(str::to_string).collect(),
                }
            })
            .collect();

        let fitted = FittedOneHotEncoder {
            vocabularies,
            unknown_policy: self.unknown_policy,
        };
        tracing::info!(
            "One-hot encoder fitted on {} rows: {} columns, {} output features",
            rows.len(),
            fitted.vocabularies.len(),
            fitted.n_features_out()
        );

        Ok(fitted)
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new(CategoricalColumn::DEFAULT.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnVocabulary {
    pub column: CategoricalColumn,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    vocabularies: Vec<ColumnVocabulary>,
    unknown_policy: UnknownCategoryPolicy,
}

impl FittedOneHotEncoder {
    pub fn vocabularies(&self) -> &[ColumnVocabulary] {
        &self.vocabularies
    }

    pub fn unknown_policy(&self) -> UnknownCategoryPolicy {
        self.unknown_policy
    }

    fn block_width(&self, vocabulary: &ColumnVocabulary) -> usize {
        match self.unknown_policy {
            UnknownCategoryPolicy::ZeroVector => vocabulary.categories.len(),
            UnknownCategoryPolicy::UnknownBucket => vocabulary.categories.len() + 1,
        }
    }

    pub fn n_features_out(&self) -> usize {
        self.vocabularies.iter().map(|v| self.block_width(v)).sum()
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features_out());
        for vocabulary in &self.vocabularies {
            let column = vocabulary.column.name();
            for category in &vocabulary.categories {
                names.push(format!("{}={}", column, category));
            }
            if self.unknown_policy == UnknownCategoryPolicy::UnknownBucket {
                names.push(format!("{}={}", column, UNKNOWN_CATEGORY));
            }
        }
        names
    }

    fn encode_into(&self, features: &LaptopFeatures, out: &mut [f64]) {
        let mut offset = 0;
        for vocabulary in &self.vocabularies {
            let value = vocabulary.column.value(features);
            match vocabulary.categories.iter().position(|c| c == value) {
                Some(idx) => out[offset + idx] = 1.0,
                None => {
                    tracing::debug!(
                        "Unseen category '{}' in column {}",
                        value,
                        vocabulary.column.name()
                    );
                    if self.unknown_policy == UnknownCategoryPolicy::UnknownBucket {
                        out[offset + vocabulary.categories.len()] = 1.0;
                    }
                }
            }
            offset += self.block_width(vocabulary);
        }
    }

    pub fn transform_one(&self, features: &LaptopFeatures) -> Array1<f64> {
        let mut encoded = Array1::zeros(self.n_features_out());
        if let Some(slice) = encoded.as_slice_mut() {
            self.encode_into(features, slice);
        }
        encoded
    }

    pub fn transform<R: AsRef<LaptopFeatures>>(&self, rows: &[R]) -> Array2<f64> {
        let mut encoded = Array2::zeros((rows.len(), self.n_features_out()));
        for (mut out, row) in encoded.rows_mut().into_iter().zip(rows) {
            if let Some(slice) = out.as_slice_mut() {
                self.encode_into(row.as_ref(), slice);
            }
        }
        encoded
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        tracing::info!("Encoder saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let encoder: Self = serde_json::from_reader(file)?;
        tracing::info!(
            "Encoder loaded from {}: {} output features",
            path.display(),
            encoder.n_features_out()
        );
        Ok(encoder)
    }
}

/// Обучает кодировщик на таблице и сразу кодирует ее
pub fn fit_categorical_encoder(
    table: &[EngineeredLaptop],
    categorical_columns: &[CategoricalColumn],
) -> Result<(Array2<f64>, FittedOneHotEncoder)> {
    let encoder = OneHotEncoder::new(categorical_columns.to_vec()).fit(table)?;
    let encoded = encoder.transform(table);
    Ok((encoded, encoder))
}
