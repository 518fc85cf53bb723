use anyhow::Result;

use crate::camera::Camera;
use crate::config::Config;
use crate::server::CandidateSource;

use super::detector::PoseDetector;
use super::keypoint::PoseCandidate;
use super::preprocess::preprocess_frame;

/// カメラ → 前処理 → 推定器 を束ねた候補ポーズ供給源
///
/// 構築時点でカメラとモデルを開くので、起動失敗はここで呼び出し側に返る。
pub struct CameraPipeline {
    camera: Camera,
    detector: PoseDetector,
    input_size: i32,
}

impl CameraPipeline {
    pub fn from_config(config: &Config) -> Result<Self> {
        let camera = Camera::open(&config.camera)?;
        let detector = PoseDetector::new(&config.model.path)?;
        Ok(Self {
            camera,
            detector,
            input_size: config.model.input_size,
        })
    }

    /// 実際のカメラ解像度
    pub fn resolution(&self) -> (u32, u32) {
        self.camera.resolution()
    }
}

impl CandidateSource for CameraPipeline {
    fn next_candidates(&mut self) -> Result<Vec<PoseCandidate>> {
        let frame = self.camera.read_frame()?;
        let input = preprocess_frame(&frame, self.input_size)?;
        self.detector.detect(input)
    }
}
