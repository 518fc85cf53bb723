use anyhow::{bail, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::pose3d::{RelDepthOrder, REL_ORDER_LEN};

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub vmt: VmtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    /// カメラデバイス番号
    #[serde(default)]
    pub index: i32,
    /// 要求する横解像度（省略時はカメラ任せ）
    pub width: Option<u32>,
    /// 要求する縦解像度
    pub height: Option<u32>,
    /// 要求するFPS
    pub fps: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// 姿勢推定ONNXモデルのパス
    #[serde(default = "default_model_path")]
    pub path: String,
    /// モデルの入力辺長（正方形）
    #[serde(default = "default_input_size")]
    pub input_size: i32,
    /// 候補を採用する信頼度の下限
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrackingConfig {
    /// ボーンごとの相対深度順序（-1/0/+1が11個）
    ///
    /// 外部から与えられる不透明な入力。供給源（第2カメラ等）はスコープ外。
    #[serde(default = "default_depth_order")]
    pub depth_order: Vec<i8>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VmtConfig {
    /// VMTの受信アドレス
    #[serde(default = "default_vmt_addr")]
    pub addr: String,
    #[serde(default = "default_hip_index")]
    pub hip_index: i32,
    #[serde(default = "default_left_foot_index")]
    pub left_foot_index: i32,
    #[serde(default = "default_right_foot_index")]
    pub right_foot_index: i32,
}

fn default_model_path() -> String {
    "models/pose_coco18.onnx".to_string()
}
fn default_input_size() -> i32 {
    384
}
fn default_confidence_threshold() -> f32 {
    0.3
}
fn default_depth_order() -> Vec<i8> {
    vec![0; REL_ORDER_LEN]
}
fn default_vmt_addr() -> String {
    "127.0.0.1:39570".to_string()
}
fn default_hip_index() -> i32 {
    0
}
fn default_left_foot_index() -> i32 {
    1
}
fn default_right_foot_index() -> i32 {
    2
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: None,
            height: None,
            fps: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            input_size: default_input_size(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            depth_order: default_depth_order(),
        }
    }
}

impl Default for VmtConfig {
    fn default() -> Self {
        Self {
            addr: default_vmt_addr(),
            hip_index: default_hip_index(),
            left_foot_index: default_left_foot_index(),
            right_foot_index: default_right_foot_index(),
        }
    }
}

impl TrackingConfig {
    /// 設定値を検証して固定長の深度順序ベクトルにする
    pub fn depth_order(&self) -> Result<RelDepthOrder> {
        if self.depth_order.len() != REL_ORDER_LEN {
            bail!(
                "depth_order must have {} entries, got {}",
                REL_ORDER_LEN,
                self.depth_order.len()
            );
        }
        let mut order = [0i8; REL_ORDER_LEN];
        for (slot, &value) in order.iter_mut().zip(self.depth_order.iter()) {
            if !(-1..=1).contains(&value) {
                bail!("depth_order entries must be -1, 0 or 1, got {}", value);
            }
            *slot = value;
        }
        Ok(order)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 読めなければデフォルト設定で起動する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
