//! Пайплайн: разбор -> фильтрация GPU -> обучение кодировщика -> кодирование

use ndarray::Array2;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::preprocessing::{drop_irrelevant_gpu_rows, FeatureEngineer, FittedOneHotEncoder, ModelReadyTable, OneHotEncoder};
use crate::types::{EngineeredLaptop, RawLaptop};

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: Vec<EngineeredLaptop>,
    pub encoder: FittedOneHotEncoder,
    pub encoded: Array2<f64>,
}

impl PipelineOutput {
    pub fn model_ready(&self) -> Result<ModelReadyTable> {
        FeatureEngineer::model_matrix(&self.table, &self.encoder)
    }
}

pub struct FeaturePipeline {
    config: PipelineConfig,
    engineer: FeatureEngineer,
}

impl FeaturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let engineer = FeatureEngineer::new(config.storage_rules.clone());
        Self { config, engineer }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Разбор и фильтрация без кодирования
    pub fn engineer(&self, raws: &[RawLaptop]) -> Result<Vec<EngineeredLaptop>> {
        let table = self.engineer.engineer(raws)?;
        Ok(drop_irrelevant_gpu_rows(table, &self.config.irrelevant_gpu_vendors))
    }

    /// Полный прогон на обучающих данных: кодировщик обучается здесь один раз
    pub fn run(&self, raws: &[RawLaptop]) -> Result<PipelineOutput> {
        let table = self.engineer(raws)?;

        let encoder = OneHotEncoder::new(self.config.categorical_columns.clone())
            .with_unknown_policy(self.config.unknown_category)
            .fit(&table)?;
        let encoded = encoder.transform(&table);

        tracing::info!(
            "Pipeline finished: {} raw rows -> {} rows x {} encoded features",
            raws.len(),
            table.len(),
            encoded.ncols()
        );

        Ok(PipelineOutput {
            table,
            encoder,
            encoded,
        })
    }

    /// Новые данные кодируются уже обученным кодировщиком
    pub fn apply(&self, raws: &[RawLaptop], encoder: &FittedOneHotEncoder) -> Result<(Vec<EngineeredLaptop>, Array2<f64>)> {
        let table = self.engineer(raws)?;
        let encoded = encoder.transform(&table);
        Ok((table, encoded))
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::preprocessing::UnknownCategoryPolicy;
    use crate::types::RawPrice;

    fn raw(company: &str, cpu: &str, gpu: &str, os: &str) -> RawLaptop {
        RawLaptop {
            company: company.to_string(),
            type_name: "Notebook".to_string(),
            inches: 15.6,
            screen_resolution: "Full HD 1920x1080".to_string(),
            cpu: cpu.to_string(),
            ram: "8GB".to_string(),
            memory: "256GB SSD + 1TB HDD".to_string(),
            gpu: gpu.to_string(),
            op_sys: os.to_string(),
            weight: "2.2kg".to_string(),
            price: RawPrice::Text("45000".to_string()),
        }
    }

    fn raws() -> Vec<RawLaptop> {
        vec![
            raw("Dell", "Intel Core i7 8550U 1.8GHz", "Nvidia GeForce MX150", "Windows 10"),
            raw("Samsung", "Samsung Cortex A72&A53 2.0GHz", "ARM Mali T860 MP4", "Chrome OS"),
            raw("Lenovo", "AMD Ryzen 1700 3GHz", "AMD Radeon RX 550", "No OS"),
        ]
    }

    #[test]
    fn test_run_drops_arm_and_fits_encoder() {
        let output = FeaturePipeline::default().run(&raws()).unwrap();

        assert_eq!(output.table.len(), 2);
        assert_eq!(output.encoded.nrows(), 2);
        assert_eq!(output.encoded.ncols(), output.encoder.n_features_out());
        assert!(output
            .encoder
            .feature_names()
            .iter()
            .all(|name| name != "Gpu brand=ARM" && name != "Company=Samsung"));
    }

    #[test]
    fn test_run_is_deterministic() {
        let pipeline = FeaturePipeline::default();
        let first = pipeline.run(&raws()).unwrap();
        let second = pipeline.run(&raws()).unwrap();

        assert_eq!(first.encoded, second.encoded);
        assert_eq!(
            serde_json::to_string(&first.encoder).unwrap(),
            serde_json::to_string(&second.encoder).unwrap()
        );
    }

    #[test]
    fn test_apply_reuses_encoder_without_refit() {
        let pipeline = FeaturePipeline::default();
        let output = pipeline.run(&raws()).unwrap();

        let fresh = vec![raw("Asus", "Intel Core i3 6006U 2GHz", "Intel HD Graphics 520", "Linux")];
        let (table, encoded) = pipeline.apply(&fresh, &output.encoder).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(encoded.ncols(), output.encoder.n_features_out());
        // Asus, i3 и Intel GPU не встречались при обучении: блоки нулевые,
        // единицы только у TypeName и os
        assert!(!output.encoder.feature_names().contains(&"Company=Asus".to_string()));
        assert_eq!(encoded.row(0).sum(), 2.0);
    }

    #[test]
    fn test_unknown_bucket_from_config() {
        let config = PipelineConfig {
            unknown_category: UnknownCategoryPolicy::UnknownBucket,
            ..PipelineConfig::default()
        };
        let output = FeaturePipeline::new(config).run(&raws()).unwrap();
        assert_eq!(output.encoder.unknown_policy(), UnknownCategoryPolicy::UnknownBucket);
    }

    #[test]
    fn test_run_only_arm_rows_is_empty_table() {
        let only_arm = vec![raws().remove(1)];
        assert!(matches!(
            FeaturePipeline::default().run(&only_arm),
            Err(PipelineError::EmptyTable)
        ));
    }

    #[test]
    fn test_model_ready_output() {
        let output = FeaturePipeline::default().run(&raws()).unwrap();
        let ready = output.model_ready().unwrap();
        assert_eq!(ready.features.nrows(), 2);
        assert!((ready.targets[0] - 45000.0_f64.ln()).abs() < 1e-12);
    }
}
