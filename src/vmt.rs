use anyhow::Result;
use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;

use crate::tracker::{TrackerSnapshot, TrackingStatus};

/// VMTのデフォルトアドレス
pub const VMT_DEFAULT_ADDR: &str = "127.0.0.1:39570";

/// トラッカーの位置と回転
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerPose {
    /// 位置 (x, y, z)
    pub position: [f32; 3],
    /// 回転 (クォータニオン: x, y, z, w)
    pub rotation: [f32; 4],
}

impl TrackerPose {
    pub fn new(position: [f32; 3], rotation: [f32; 4]) -> Self {
        Self { position, rotation }
    }

    /// 原点、回転なし
    pub fn identity() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// VMTへ送信するOSCメッセージを構築
/// 引数: index, enable, timeoffset, x, y, z, qx, qy, qz, qw
/// enable: 0=無効, 1=トラッカー
pub fn build_osc_message(index: i32, enable: i32, pose: &TrackerPose) -> OscMessage {
    OscMessage {
        addr: "/VMT/Room/Unity".to_string(),
        args: vec![
            OscType::Int(index),
            OscType::Int(enable),
            OscType::Float(0.0), // timeoffset
            OscType::Float(pose.position[0]),
            OscType::Float(pose.position[1]),
            OscType::Float(pose.position[2]),
            OscType::Float(pose.rotation[0]),
            OscType::Float(pose.rotation[1]),
            OscType::Float(pose.rotation[2]),
            OscType::Float(pose.rotation[3]),
        ],
    }
}

/// トラッカーのスナップショットをVMTメッセージに変換
///
/// Tracking中だけ有効(enable 1)として位置を流し、未初期化・見失い中は
/// 無効(enable 0)にしてトラッカーを隠す。回転はこのコアでは推定しないので
/// 常に単位クォータニオン。
pub fn snapshot_to_message(index: i32, snapshot: &TrackerSnapshot) -> OscMessage {
    let enable = if snapshot.status == TrackingStatus::Tracking {
        1
    } else {
        0
    };
    let pose = TrackerPose::new(
        [snapshot.point.x, snapshot.point.y, snapshot.point.z],
        [0.0, 0.0, 0.0, 1.0],
    );
    build_osc_message(index, enable, &pose)
}

/// OSCメッセージをバイト列にエンコード
pub fn encode_osc_message(msg: &OscMessage) -> Result<Vec<u8>> {
    let packet = OscPacket::Message(msg.clone());
    let encoded = encoder::encode(&packet)?;
    Ok(encoded)
}

/// VMTクライアント
pub struct VmtClient {
    socket: UdpSocket,
    target_addr: String,
}

impl VmtClient {
    /// 新しいVMTクライアントを作成
    pub fn new(target_addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            target_addr: target_addr.to_string(),
        })
    }

    /// トラッカーの位置・回転を送信
    pub fn send(&self, index: i32, enable: i32, pose: &TrackerPose) -> Result<()> {
        let msg = build_osc_message(index, enable, pose);
        let data = encode_osc_message(&msg)?;
        self.socket.send_to(&data, &self.target_addr)?;
        Ok(())
    }

    /// トラッカーのスナップショットを送信
    pub fn send_snapshot(&self, index: i32, snapshot: &TrackerSnapshot) -> Result<()> {
        let msg = snapshot_to_message(index, snapshot);
        let data = encode_osc_message(&msg)?;
        self.socket.send_to(&data, &self.target_addr)?;
        Ok(())
    }
}
