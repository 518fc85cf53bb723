use std::sync::Mutex;

use crate::math::Vector3;

/// トラッカーの追跡状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    /// 最初の更新が来る前
    Uninitialized,
    /// 追跡中（pointが最新）
    Tracking,
    /// 見失い中（pointは最後に追跡できた値のまま）
    OutOfRange,
}

/// 状態と位置のスナップショット
///
/// statusとpointは必ず同一の更新に由来する。OutOfRangeのときpointは
/// 更新されないので、消費側はstatusを確認してからpointを使うこと。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerSnapshot {
    pub status: TrackingStatus,
    pub point: Vector3,
    /// デバイスがホストに接続済みか（初回更新以降true）
    pub connected: bool,
}

/// 追跡対象1部位分の最新ポーズ保持
///
/// ワーカースレッドが書き、ホスト側スレッドが読む。短いクリティカル
/// セクションのmutexで保護されるため、読み手が途中状態を観測することはない。
pub struct TrackerState {
    serial: String,
    inner: Mutex<TrackerSnapshot>,
}

/// ポーズの受け口となる最小インターフェース
///
/// ホストランタイムのABIに依存しないコア側の境界。具体的なホスト向けの
/// アダプタ（VMT送信など）はこのスナップショットを変換する。
pub trait PoseSink {
    /// 新しい追跡点で更新してTrackingに遷移する
    fn update_point(&self, point: Vector3);
    /// 見失いを通知する（前回のpointは保持される）
    fn update_out_of_range(&self);
    /// 最新状態のスナップショットを返す（短時間だけロックを取る）
    fn query_latest(&self) -> TrackerSnapshot;
}

impl TrackerState {
    pub fn new(serial: &str) -> Self {
        Self {
            serial: serial.to_string(),
            inner: Mutex::new(TrackerSnapshot {
                status: TrackingStatus::Uninitialized,
                point: Vector3::ZERO,
                connected: false,
            }),
        }
    }

    /// デバイスのシリアル文字列
    pub fn serial(&self) -> &str {
        &self.serial
    }
}

impl PoseSink for TrackerState {
    fn update_point(&self, point: Vector3) {
        let mut inner = self.inner.lock().unwrap();
        inner.status = TrackingStatus::Tracking;
        inner.point = point;
        inner.connected = true;
    }

    fn update_out_of_range(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.status = TrackingStatus::OutOfRange;
        inner.connected = true;
    }

    fn query_latest(&self) -> TrackerSnapshot {
        *self.inner.lock().unwrap()
    }
}

/// 公開する仮想トラッカー一式
///
/// 部位ごとに独立したロックを持つので、別部位の更新同士は競合しない。
pub struct TrackerSet {
    pub hip: TrackerState,
    pub left_ankle: TrackerState,
    pub right_ankle: TrackerState,
}

impl TrackerSet {
    pub fn new() -> Self {
        Self {
            hip: TrackerState::new("FBT Hip"),
            left_ankle: TrackerState::new("FBT Left Leg"),
            right_ankle: TrackerState::new("FBT Right Leg"),
        }
    }

    /// 全部位を見失い状態にする
    pub fn all_out_of_range(&self) {
        self.hip.update_out_of_range();
        self.left_ankle.update_out_of_range();
        self.right_ankle.update_out_of_range();
    }
}

impl Default for TrackerSet {
    fn default() -> Self {
        Self::new()
    }
}
