//! Запрос на предсказание цены из формы дашборда

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::preprocessing::parsing::parse_screen_resolution;
use crate::types::{CpuBrand, LaptopFeatures, OsCategory};

const INVALID_INPUT: &str = "Please provide valid inputs for all fields";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaptopQuery {
    pub company: String,
    pub type_name: String,
    pub ram: f64, // GB
    pub weight: f64, // kg
    pub touchscreen: bool,
    pub ips: bool,
    pub screen_size: f64, // дюймы
    pub resolution: String, // "1920x1080"
    pub cpu_brand: CpuBrand,
    pub hdd: u32,
    pub ssd: u32,
    pub gpu_brand: String,
    pub os: OsCategory,
}

impl LaptopQuery {
    pub fn into_features(self) -> Result<LaptopFeatures> {
        // как в форме: нулевые значения считаются незаполненными
        if self.ram <= 0.0 || self.weight <= 0.0 || self.ssd == 0 || self.screen_size <= 0.0 {
            return Err(PipelineError::InvalidQuery(INVALID_INPUT.to_string()));
        }

        let screen = parse_screen_resolution(&self.resolution, self.screen_size)
            .map_err(|e| PipelineError::InvalidQuery(e.to_string()))?;

        Ok(LaptopFeatures {
            company: self.company,
            type_name: self.type_name,
            ram: self.ram,
            weight: self.weight,
            touchscreen: self.touchscreen as u8,
            ips: self.ips as u8,
            ppi: screen.ppi,
            cpu_brand: self.cpu_brand,
            hdd: self.hdd,
            ssd: self.ssd,
            gpu_brand: self.gpu_brand,
            os: self.os,
        })
    }
}
