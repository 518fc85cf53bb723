use anyhow::{Context, Result};
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use super::keypoint::{CocoPart, Keypoint, PoseCandidate};

/// 複数人対応のCOCO-18姿勢検出器
///
/// 期待するONNXモデルの出力:
/// - "poses":  [1, N, 18, 3] (x, y, confidence) 正規化座標
/// - "scores": [1, N] 候補ごとのスコア
pub struct PoseDetector {
    session: Session,
}

impl PoseDetector {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path.as_ref())
            .context("Failed to load ONNX model")?;

        Ok(Self { session })
    }

    /// 前処理済みテンソルから候補ポーズ一覧を検出
    pub fn detect(&mut self, input: Array4<f32>) -> Result<Vec<PoseCandidate>> {
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs!["images" => input_tensor])
            .context("Inference failed")?;

        let poses: ndarray::ArrayViewD<f32> = outputs["poses"]
            .try_extract_array()
            .context("Failed to extract poses tensor")?;
        let scores: ndarray::ArrayViewD<f32> = outputs["scores"]
            .try_extract_array()
            .context("Failed to extract scores tensor")?;

        let n_candidates = poses.shape()[1];
        let mut candidates = Vec::with_capacity(n_candidates);

        for n in 0..n_candidates {
            let mut keypoints = [Keypoint::default(); CocoPart::COUNT];
            for (i, kp) in keypoints.iter_mut().enumerate() {
                let x = poses[[0, n, i, 0]];
                let y = poses[[0, n, i, 1]];
                let confidence = poses[[0, n, i, 2]];
                *kp = Keypoint::new(x, y, confidence);
            }
            candidates.push(PoseCandidate::new(keypoints, scores[[0, n]]));
        }

        Ok(candidates)
    }
}
