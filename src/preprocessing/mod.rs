/// Модуль предобработки данных

pub mod encoding;
pub mod feature_engineering;
pub mod parsing;

pub use encoding::{fit_categorical_encoder, FittedOneHotEncoder, OneHotEncoder, UnknownCategoryPolicy};
pub use feature_engineering::{drop_irrelevant_gpu_rows, log_price, price_from_log, FeatureEngineer, ModelReadyTable};
pub use parsing::{
    normalize_cpu_brand, normalize_numeric_with_unit, normalize_os, parse_screen_resolution, parse_storage,
};
