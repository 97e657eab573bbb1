/// Типы данных для пайплайна признаков

use serde::{Deserialize, Serialize};
use std::fmt;

/// Цена в исходной таблице: число или строка с числом
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

/// Строка исходной таблицы (как в CSV)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLaptop {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "TypeName")]
    pub type_name: String,
    #[serde(rename = "Inches")]
    pub inches: f64,
    #[serde(rename = "ScreenResolution")]
    pub screen_resolution: String,
    #[serde(rename = "Cpu")]
    pub cpu: String,
    #[serde(rename = "Ram")]
    pub ram: String, // "8GB"
    #[serde(rename = "Memory")]
    pub memory: String, // "128GB SSD +  1TB HDD"
    #[serde(rename = "Gpu")]
    pub gpu: String,
    #[serde(rename = "OpSys")]
    pub op_sys: String,
    #[serde(rename = "Weight")]
    pub weight: String, // "1.37kg"
    #[serde(rename = "Price")]
    pub price: RawPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CpuBrand {
    #[serde(rename = "Intel Core i3")]
    IntelCoreI3,
    #[serde(rename = "Intel Core i5")]
    IntelCoreI5,
    #[serde(rename = "Intel Core i7")]
    IntelCoreI7,
    #[serde(rename = "Other Intel Processor")]
    OtherIntel,
    #[serde(rename = "AMD Processor")]
    Amd,
}

impl CpuBrand {
    pub const ALL: [CpuBrand; 5] = [
        CpuBrand::IntelCoreI3,
        CpuBrand::IntelCoreI5,
        CpuBrand::IntelCoreI7,
        CpuBrand::OtherIntel,
        CpuBrand::Amd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CpuBrand::IntelCoreI3 => "Intel Core i3",
            CpuBrand::IntelCoreI5 => "Intel Core i5",
            CpuBrand::IntelCoreI7 => "Intel Core i7",
            CpuBrand::OtherIntel => "Other Intel Processor",
            CpuBrand::Amd => "AMD Processor",
        }
    }
}

impl fmt::Display for CpuBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OsCategory {
    #[serde(rename = "windows")]
    Windows,
    #[serde(rename = "Mac")]
    Mac,
    #[serde(rename = "Other/Linux/No OS")]
    Other,
}

impl OsCategory {
    pub const ALL: [OsCategory; 3] = [OsCategory::Windows, OsCategory::Mac, OsCategory::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            OsCategory::Windows => "windows",
            OsCategory::Mac => "Mac",
            OsCategory::Other => "Other/Linux/No OS",
        }
    }
}

impl fmt::Display for OsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Признаки экрана
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenFeatures {
    pub touchscreen: bool,
    pub ips: bool,
    pub width: u32,
    pub height: u32,
    pub ppi: f64,
}

/// Объем накопителей в GB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageFeatures {
    pub hdd_gb: u32,
    pub ssd_gb: u32,
}

/// Корзина, в которую попадает тип накопителя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBucket {
    Hdd,
    Ssd,
}

/// Правило сопоставления типа накопителя (например "Hybrid") с корзиной
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRule {
    pub keyword: String,
    pub bucket: StorageBucket,
}

impl StorageRule {
    pub fn new(keyword: impl Into<String>, bucket: StorageBucket) -> Self {
        Self {
            keyword: keyword.into(),
            bucket,
        }
    }
}

/// Признаки одного ноутбука, без цены
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaptopFeatures {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "TypeName")]
    pub type_name: String,
    #[serde(rename = "Ram")]
    pub ram: f64, // GB
    #[serde(rename = "Weight")]
    pub weight: f64, // kg
    #[serde(rename = "Touchscreen")]
    pub touchscreen: u8,
    #[serde(rename = "IPS")]
    pub ips: u8,
    pub ppi: f64,
    #[serde(rename = "Cpu brand")]
    pub cpu_brand: CpuBrand,
    #[serde(rename = "HDD")]
    pub hdd: u32,
    #[serde(rename = "SSD")]
    pub ssd: u32,
    #[serde(rename = "Gpu brand")]
    pub gpu_brand: String,
    pub os: OsCategory,
}

impl LaptopFeatures {
    /// Числовые колонки, которые идут в модель без кодирования
    pub const NUMERIC_COLUMNS: [&'static str; 7] =
        ["Ram", "Weight", "Touchscreen", "IPS", "ppi", "HDD", "SSD"];

    pub fn numeric_values(&self) -> [f64; 7] {
        [
            self.ram,
            self.weight,
            self.touchscreen as f64,
            self.ips as f64,
            self.ppi,
            self.hdd as f64,
            self.ssd as f64,
        ]
    }
}

/// Строка таблицы после feature engineering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeredLaptop {
    #[serde(flatten)]
    pub features: LaptopFeatures,
    #[serde(rename = "Price")]
    pub price: f64,
}

impl EngineeredLaptop {
    /// Целевая переменная для обучения
    pub fn log_price(&self) -> f64 {
        crate::preprocessing::log_price(self.price)
    }
}

/// Категориальные колонки, которые кодируются one-hot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalColumn {
    #[serde(rename = "Company")]
    Company,
    #[serde(rename = "TypeName")]
    TypeName,
    #[serde(rename = "Cpu brand")]
    CpuBrand,
    #[serde(rename = "Gpu brand")]
    GpuBrand,
    #[serde(rename = "os")]
    Os,
}

impl CategoricalColumn {
    pub const DEFAULT: [CategoricalColumn; 5] = [
        CategoricalColumn::Company,
        CategoricalColumn::TypeName,
        CategoricalColumn::CpuBrand,
        CategoricalColumn::GpuBrand,
        CategoricalColumn::Os,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CategoricalColumn::Company => "Company",
            CategoricalColumn::TypeName => "TypeName",
            CategoricalColumn::CpuBrand => "Cpu brand",
            CategoricalColumn::GpuBrand => "Gpu brand",
            CategoricalColumn::Os => "os",
        }
    }

    pub fn value<'a>(&self, features: &'a LaptopFeatures) -> &'a str {
        match self {
            CategoricalColumn::Company => &features.company,
            CategoricalColumn::TypeName => &features.type_name,
            CategoricalColumn::CpuBrand => features.cpu_brand.as_str(),
            CategoricalColumn::GpuBrand => &features.gpu_brand,
            CategoricalColumn::Os => features.os.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_features() -> LaptopFeatures {
        LaptopFeatures {
            company: "Apple".to_string(),
            type_name: "Ultrabook".to_string(),
            ram: 8.0,
            weight: 1.37,
            touchscreen: 0,
            ips: 1,
            ppi: 226.98,
            cpu_brand: CpuBrand::IntelCoreI5,
            hdd: 0,
            ssd: 128,
            gpu_brand: "Intel".to_string(),
            os: OsCategory::Mac,
        }
    }

    #[test]
    fn test_engineered_json_uses_column_names() {
        let row = EngineeredLaptop {
            features: sample_features(),
            price: 71378.68,
        };
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["Cpu brand"], "Intel Core i5");
        assert_eq!(json["os"], "Mac");
        assert_eq!(json["Price"], 71378.68);

        let back: EngineeredLaptop = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_raw_price_accepts_number_or_text() {
        let number: RawPrice = serde_json::from_str("1234.5").unwrap();
        let text: RawPrice = serde_json::from_str("\"1234.5\"").unwrap();
        assert_eq!(number, RawPrice::Number(1234.5));
        assert_eq!(text, RawPrice::Text("1234.5".to_string()));
    }

    #[test]
    fn test_categorical_column_values() {
        let features = sample_features();
        assert_eq!(CategoricalColumn::Company.value(&features), "Apple");
        assert_eq!(CategoricalColumn::CpuBrand.value(&features), "Intel Core i5");
        assert_eq!(CategoricalColumn::Os.value(&features), "Mac");
        assert_eq!(CategoricalColumn::Os.name(), "os");
    }
}
