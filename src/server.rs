use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};

use crate::math::middle;
use crate::pose::keypoint::{best_candidate, PoseCandidate};
use crate::pose3d::{Joint, Pose3D, RelDepthOrder};
use crate::tracker::{PoseSink, TrackerSet};

/// フレームごとの候補ポーズの供給源
///
/// カメラ+推定器パイプラインが実装する。呼び出しはフレーム取得と推論の間
/// ワーカースレッドをブロックしてよい。エラーはそのフレーム限りの失敗として
/// 扱われ、ループは止まらない。
pub trait CandidateSource: Send {
    fn next_candidates(&mut self) -> Result<Vec<PoseCandidate>>;
}

/// キャプチャ・推論ループを回すワーカー
///
/// ワーカースレッド1本が供給源を専有し、復元結果をトラッカーに書き込む。
/// 消費側は`trackers()`経由で任意の頻度でスナップショットを読める。
pub struct TrackingServer {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    trackers: Arc<TrackerSet>,
}

impl TrackingServer {
    /// ワーカースレッドを起動する
    ///
    /// カメラやモデルの初期化失敗は供給源の構築時点で呼び出し側に返るため、
    /// ここに来た時点で残る起動失敗はスレッド生成のみ。
    pub fn start(
        mut source: impl CandidateSource + 'static,
        depth_order: RelDepthOrder,
        confidence_threshold: f32,
    ) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let trackers = Arc::new(TrackerSet::new());

        let running_ref = running.clone();
        let trackers_ref = trackers.clone();
        let handle = thread::Builder::new()
            .name("tracking-worker".to_string())
            .spawn(move || {
                while running_ref.load(Ordering::Acquire) {
                    Self::run_frame(
                        &mut source,
                        &trackers_ref,
                        &depth_order,
                        confidence_threshold,
                    );
                }
            })
            .context("Failed to spawn tracking worker")?;

        Ok(Self {
            running,
            handle: Some(handle),
            trackers,
        })
    }

    /// 1フレーム分: 候補取得 → 最良候補選択 → 復元 → トラッカー更新
    fn run_frame(
        source: &mut impl CandidateSource,
        trackers: &TrackerSet,
        depth_order: &RelDepthOrder,
        confidence_threshold: f32,
    ) {
        let candidates = match source.next_candidates() {
            Ok(candidates) => candidates,
            Err(err) => {
                // フレーム単位の失敗は見失い扱いにして続行する
                eprintln!("Frame skipped: {:#}", err);
                trackers.all_out_of_range();
                return;
            }
        };

        match best_candidate(&candidates) {
            Some(best) if best.score >= confidence_threshold => {
                let pose = Pose3D::reconstruct(&best.part_points(), depth_order);
                trackers
                    .hip
                    .update_point(middle(pose.get(Joint::LeftHip), pose.get(Joint::RightHip)));
                trackers.left_ankle.update_point(pose.get(Joint::LeftAnkle));
                trackers.right_ankle.update_point(pose.get(Joint::RightAnkle));
            }
            _ => trackers.all_out_of_range(),
        }
    }

    /// トラッカー一式（消費側スレッドと共有）
    pub fn trackers(&self) -> &Arc<TrackerSet> {
        &self.trackers
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.running.load(Ordering::Acquire)
    }

    /// 停止を要求してワーカーの終了を待つ
    ///
    /// 停止要求は毎イテレーション確認される協調式で、実行中のフレーム1周分は
    /// 待たされる。ワーカースレッド自身から呼ぶとデッドロックする。
    pub fn stop(mut self) -> Result<()> {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("Tracking worker panicked"))?;
        }
        Ok(())
    }
}

impl Drop for TrackingServer {
    fn drop(&mut self) {
        // stop()を経ずに落とされた場合もワーカーには停止を伝える
        self.running.store(false, Ordering::Release);
    }
}
