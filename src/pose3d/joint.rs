/// 内部モデルの15ジョイントインデックス
///
/// 並び順はOBJエクスポートと配列インデックスの公開契約なので変更不可。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Joint {
    Head = 0,
    Collarbone = 1,
    Tailbone = 2,
    RightShoulder = 3,
    LeftShoulder = 4,
    RightHip = 5,
    LeftHip = 6,
    RightElbow = 7,
    LeftElbow = 8,
    RightKnee = 9,
    LeftKnee = 10,
    RightWrist = 11,
    LeftWrist = 12,
    RightAnkle = 13,
    LeftAnkle = 14,
}

impl Joint {
    pub const COUNT: usize = 15;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Head),
            1 => Some(Self::Collarbone),
            2 => Some(Self::Tailbone),
            3 => Some(Self::RightShoulder),
            4 => Some(Self::LeftShoulder),
            5 => Some(Self::RightHip),
            6 => Some(Self::LeftHip),
            7 => Some(Self::RightElbow),
            8 => Some(Self::LeftElbow),
            9 => Some(Self::RightKnee),
            10 => Some(Self::LeftKnee),
            11 => Some(Self::RightWrist),
            12 => Some(Self::LeftWrist),
            13 => Some(Self::RightAnkle),
            14 => Some(Self::LeftAnkle),
            _ => None,
        }
    }
}

/// ボーン（親ジョイント, 子ジョイント）の一覧
///
/// 可視化とOBJエクスポート用のスケルトントポロジー。鎖骨まわりを根とした
/// 木構造で、根以外の各ジョイントはちょうど1回だけ子として現れる。
pub const JOINT_PAIRS: [(Joint, Joint); 14] = [
    // 右腕
    (Joint::RightShoulder, Joint::RightElbow),
    (Joint::RightElbow, Joint::RightWrist),
    // 左腕
    (Joint::LeftShoulder, Joint::LeftElbow),
    (Joint::LeftElbow, Joint::LeftWrist),
    // 頭
    (Joint::Collarbone, Joint::Head),
    // 体幹
    (Joint::Collarbone, Joint::RightShoulder),
    (Joint::Collarbone, Joint::LeftShoulder),
    (Joint::Collarbone, Joint::Tailbone),
    (Joint::Tailbone, Joint::RightHip),
    (Joint::Tailbone, Joint::LeftHip),
    // 右脚
    (Joint::RightHip, Joint::RightKnee),
    (Joint::RightKnee, Joint::RightAnkle),
    // 左脚
    (Joint::LeftHip, Joint::LeftKnee),
    (Joint::LeftKnee, Joint::LeftAnkle),
];

/// 相対的な体の比率（共通単位）
///
/// コンパイル時固定の比率であり、ユーザーごとの実測値ではない。
/// スケール係数sがこの単位と画像ピクセルを対応づける。
pub mod proportions {
    pub const FOREARM: f32 = 14.0;
    pub const UPPER_ARM: f32 = 15.0;
    pub const SHOULDER: f32 = 18.0;
    pub const FORELEG: f32 = 20.0;
    pub const THIGH: f32 = 19.0;
    pub const PELVIC: f32 = 14.0;
    pub const SPINE: f32 = 24.0;
    pub const NECK: f32 = 7.0;
    /// 基準身長
    pub const HEIGHT: f32 = 70.0;
}
