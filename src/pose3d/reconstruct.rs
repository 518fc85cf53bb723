use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::math::{middle, Vector2, Vector3};
use crate::pose::keypoint::CocoPart;

use super::joint::proportions::{FORELEG, FOREARM, NECK, PELVIC, SHOULDER, SPINE, THIGH, UPPER_ARM};
use super::joint::{Joint, JOINT_PAIRS};

/// 相対深度順序ベクトルの長さ（解かれる非ルートボーンごとに1つ、両腰は共有）
pub const REL_ORDER_LEN: usize = 11;

/// ボーンごとの相対深度順序
///
/// 各要素は {-1, 0, +1}。+1 は子ジョイントが親よりカメラ側（手前）、
/// -1 は奥、0 は不明（面内として扱う）を意味する。単視点では深度の符号が
/// 決められないため、この情報は外部（第2カメラやヒューリスティック）から与えられる。
///
/// 要素の並び:
/// 0. 右肩→左肩
/// 1. 鎖骨→尾骨
/// 2. 尾骨→両腰（左右共有）
/// 3. 右肩→右肘
/// 4. 左肩→左肘
/// 5. 右腰→右膝
/// 6. 左腰→左膝
/// 7. 右肘→右手首
/// 8. 左肘→左手首
/// 9. 右膝→右足首
/// 10. 左膝→左足首
pub type RelDepthOrder = [i8; REL_ORDER_LEN];

/// スケール下限のゼロ割り・漸近を避けるための微小値
const S_EPSILON: f32 = 1e-10;

/// キネマティックツリーを解く1ステップ分の定義
///
/// スケール下限の計算とジョイントの解決は必ず同じテーブルを参照する
/// （2D差分・ボーン長・深度順序インデックスの対応はここが唯一の定義）。
struct BoneSolve {
    parent: Joint,
    child: Joint,
    length: f32,
    /// RelDepthOrder内のインデックス
    order: usize,
}

/// 解決順のボーンテーブル
///
/// 各ステップの親が解決済みであることに依存した順序なので並び替え不可。
/// 先頭の左肩だけは解決後に鎖骨の中点補正を挟む必要がある。
const BONE_SOLVES: [BoneSolve; 12] = [
    BoneSolve { parent: Joint::RightShoulder, child: Joint::LeftShoulder, length: SHOULDER, order: 0 },
    BoneSolve { parent: Joint::Collarbone, child: Joint::Tailbone, length: SPINE, order: 1 },
    BoneSolve { parent: Joint::Tailbone, child: Joint::RightHip, length: PELVIC / 2.0, order: 2 },
    BoneSolve { parent: Joint::Tailbone, child: Joint::LeftHip, length: PELVIC / 2.0, order: 2 },
    BoneSolve { parent: Joint::RightShoulder, child: Joint::RightElbow, length: UPPER_ARM, order: 3 },
    BoneSolve { parent: Joint::LeftShoulder, child: Joint::LeftElbow, length: UPPER_ARM, order: 4 },
    BoneSolve { parent: Joint::RightHip, child: Joint::RightKnee, length: THIGH, order: 5 },
    BoneSolve { parent: Joint::LeftHip, child: Joint::LeftKnee, length: THIGH, order: 6 },
    BoneSolve { parent: Joint::RightElbow, child: Joint::RightWrist, length: FOREARM, order: 7 },
    BoneSolve { parent: Joint::LeftElbow, child: Joint::LeftWrist, length: FOREARM, order: 8 },
    BoneSolve { parent: Joint::RightKnee, child: Joint::RightAnkle, length: FORELEG, order: 9 },
    BoneSolve { parent: Joint::LeftKnee, child: Joint::LeftAnkle, length: FORELEG, order: 10 },
];

/// COCOパート → 内部ジョイントの変換テーブル
///
/// 鎖骨と尾骨はここに含めず`image_points`で直接求める。
const JOINT_FROM_COCO: [(Joint, CocoPart); 13] = [
    (Joint::Head, CocoPart::Nose),
    (Joint::RightShoulder, CocoPart::RightShoulder),
    (Joint::LeftShoulder, CocoPart::LeftShoulder),
    (Joint::RightHip, CocoPart::RightHip),
    (Joint::LeftHip, CocoPart::LeftHip),
    (Joint::RightElbow, CocoPart::RightElbow),
    (Joint::LeftElbow, CocoPart::LeftElbow),
    (Joint::RightKnee, CocoPart::RightKnee),
    (Joint::LeftKnee, CocoPart::LeftKnee),
    (Joint::RightWrist, CocoPart::RightWrist),
    (Joint::LeftWrist, CocoPart::LeftWrist),
    (Joint::RightAnkle, CocoPart::RightAnkle),
    (Joint::LeftAnkle, CocoPart::LeftAnkle),
];

/// COCOキーポイント配列を内部15ジョイントの2D点に変換
///
/// 鎖骨は推定器が直接出力する首パート（より信頼できる推定値）を使い、
/// 尾骨は両腰の中点として合成する。
fn image_points(parts: &[Vector2; CocoPart::COUNT]) -> [Vector2; Joint::COUNT] {
    let mut points = [Vector2::ZERO; Joint::COUNT];
    for (joint, part) in JOINT_FROM_COCO {
        points[joint as usize] = parts[part as usize];
    }
    points[Joint::Collarbone as usize] = parts[CocoPart::Neck as usize];
    points[Joint::Tailbone as usize] = (parts[CocoPart::RightHip as usize]
        + parts[CocoPart::LeftHip as usize])
        / 2.0;
    points
}

/// ボーン長と2D差分から許されるスケールの下限
///
/// 各ボーンの奥行き成分が実数になるためには s がこの値以上である必要がある。
fn scale_constraint(delta: Vector2, length: f32) -> f32 {
    delta.magnitude() / length + S_EPSILON
}

/// 全ボーンのスケール下限の最大値 = グローバルスケール s
fn scale_floor(points: &[Vector2; Joint::COUNT]) -> f32 {
    BONE_SOLVES
        .iter()
        .map(|bone| {
            scale_constraint(
                points[bone.child as usize] - points[bone.parent as usize],
                bone.length,
            )
        })
        .fold(0.0, f32::max)
}

/// 2D差分・ボーン長・スケールから奥行き成分の大きさを求める
///
/// ノイズの乗った検出では引数が負になり得るので0にクランプする
/// （そのボーンは完全に面内として扱う）。
fn dz(delta: Vector2, length: f32, scale: f32) -> f32 {
    (length * length - delta.dot(&delta) / (scale * scale))
        .max(0.0)
        .sqrt()
}

/// 復元された全身の3Dポーズ
///
/// `Joint`でインデックスされる15ジョイントの座標列。
#[derive(Debug, Clone, PartialEq)]
pub struct Pose3D {
    pub joints: [Vector3; Joint::COUNT],
}

impl Pose3D {
    /// 2Dキーポイントと相対深度順序から3Dポーズを復元する
    ///
    /// アルゴリズムは単視点2D→3D復元手法の移植:
    /// https://github.com/cflamant/3d-pose-reconstruction
    ///
    /// 右肩を原点に固定し、ボーンテーブルの順にジョイントを解いていく。
    /// 面内成分は 2D差分 / s、奥行き成分は体の比率との差分から求め、
    /// 符号は相対深度順序から取る。
    pub fn reconstruct(parts: &[Vector2; CocoPart::COUNT], order: &RelDepthOrder) -> Self {
        let points = image_points(parts);
        let s = scale_floor(&points);

        let mut joints = [Vector3::ZERO; Joint::COUNT];

        // 右肩を原点に固定してから左肩を解く
        joints[Joint::RightShoulder as usize] = Vector3::ZERO;
        Self::solve_bone(&mut joints, &points, &BONE_SOLVES[0], order, s);

        // 鎖骨は両肩の中点に置き直す（初期オフセット推定後の整合性補正）
        joints[Joint::Collarbone as usize] = middle(
            joints[Joint::RightShoulder as usize],
            joints[Joint::LeftShoulder as usize],
        );

        // 尾骨 → 腰 → 肘 → 膝 → 手首 → 足首
        for bone in &BONE_SOLVES[1..] {
            Self::solve_bone(&mut joints, &points, bone, order, s);
        }

        // 頭はオフセット式では解かず、尾骨→鎖骨の軸の延長線上に置く
        let spine_axis =
            joints[Joint::Collarbone as usize] - joints[Joint::Tailbone as usize];
        joints[Joint::Head as usize] =
            joints[Joint::Collarbone as usize] + spine_axis * (NECK / SPINE);

        Self { joints }
    }

    fn solve_bone(
        joints: &mut [Vector3; Joint::COUNT],
        points: &[Vector2; Joint::COUNT],
        bone: &BoneSolve,
        order: &RelDepthOrder,
        s: f32,
    ) {
        let delta = points[bone.child as usize] - points[bone.parent as usize];
        let parent = joints[bone.parent as usize];
        let xy = parent.xy() + delta / s;
        let z = parent.z - order[bone.order] as f32 * dz(delta, bone.length, s);
        joints[bone.child as usize] = Vector3::new(xy.x, xy.y, z);
    }

    pub fn get(&self, joint: Joint) -> Vector3 {
        self.joints[joint as usize]
    }

    /// HMDの頭位置に合わせてポーズ全体を剛体並進する
    pub fn set_head_position(&mut self, target: Vector3) {
        let offset = target - self.joints[Joint::Head as usize];
        for joint in self.joints.iter_mut() {
            *joint += offset;
        }
    }

    /// Wavefront OBJ形式で書き出す（デバッグ・可視化用、読み戻しは想定しない）
    ///
    /// ジョイントごとに `v x y z 1.0`、ボーンごとに1始まりのインデックスで
    /// `l i j` を出力する。
    pub fn write_obj<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for joint in &self.joints {
            writeln!(writer, "v {} {} {} 1.0", joint.x, joint.y, joint.z)?;
        }
        for (parent, child) in JOINT_PAIRS {
            writeln!(writer, "l {} {}", parent as usize + 1, child as usize + 1)?;
        }
        Ok(())
    }

    /// OBJファイルとして保存
    pub fn save_as_obj<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);
        self.write_obj(&mut writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(parts: &mut [Vector2; CocoPart::COUNT], part: CocoPart, x: f32, y: f32) {
        parts[part as usize] = Vector2::new(x, y);
    }

    /// 非対称なテスト用スティックフィギュア（ピクセル座標）
    fn stick_figure() -> [Vector2; CocoPart::COUNT] {
        let mut parts = [Vector2::ZERO; CocoPart::COUNT];
        set(&mut parts, CocoPart::Nose, 320.0, 80.0);
        set(&mut parts, CocoPart::Neck, 322.0, 140.0);
        set(&mut parts, CocoPart::RightShoulder, 260.0, 150.0);
        set(&mut parts, CocoPart::LeftShoulder, 380.0, 145.0);
        set(&mut parts, CocoPart::RightElbow, 240.0, 230.0);
        set(&mut parts, CocoPart::LeftElbow, 400.0, 235.0);
        set(&mut parts, CocoPart::RightWrist, 230.0, 310.0);
        set(&mut parts, CocoPart::LeftWrist, 410.0, 300.0);
        set(&mut parts, CocoPart::RightHip, 285.0, 320.0);
        set(&mut parts, CocoPart::LeftHip, 350.0, 325.0);
        set(&mut parts, CocoPart::RightKnee, 280.0, 420.0);
        set(&mut parts, CocoPart::LeftKnee, 355.0, 415.0);
        set(&mut parts, CocoPart::RightAnkle, 275.0, 520.0);
        set(&mut parts, CocoPart::LeftAnkle, 360.0, 510.0);
        set(&mut parts, CocoPart::RightEye, 310.0, 70.0);
        set(&mut parts, CocoPart::LeftEye, 330.0, 70.0);
        set(&mut parts, CocoPart::RightEar, 300.0, 80.0);
        set(&mut parts, CocoPart::LeftEar, 340.0, 80.0);
        parts
    }

    /// 鉛直軸に対して左右対称なスティックフィギュア（正規化座標）
    fn symmetric_figure() -> [Vector2; CocoPart::COUNT] {
        let mut parts = [Vector2::ZERO; CocoPart::COUNT];
        set(&mut parts, CocoPart::Nose, 0.5, 0.1);
        set(&mut parts, CocoPart::Neck, 0.5, 0.2);
        set(&mut parts, CocoPart::RightShoulder, 0.4, 0.2);
        set(&mut parts, CocoPart::LeftShoulder, 0.6, 0.2);
        set(&mut parts, CocoPart::RightElbow, 0.35, 0.35);
        set(&mut parts, CocoPart::LeftElbow, 0.65, 0.35);
        set(&mut parts, CocoPart::RightWrist, 0.3, 0.5);
        set(&mut parts, CocoPart::LeftWrist, 0.7, 0.5);
        set(&mut parts, CocoPart::RightHip, 0.44, 0.5);
        set(&mut parts, CocoPart::LeftHip, 0.56, 0.5);
        set(&mut parts, CocoPart::RightKnee, 0.43, 0.7);
        set(&mut parts, CocoPart::LeftKnee, 0.57, 0.7);
        set(&mut parts, CocoPart::RightAnkle, 0.42, 0.9);
        set(&mut parts, CocoPart::LeftAnkle, 0.58, 0.9);
        set(&mut parts, CocoPart::RightEye, 0.48, 0.08);
        set(&mut parts, CocoPart::LeftEye, 0.52, 0.08);
        set(&mut parts, CocoPart::RightEar, 0.46, 0.1);
        set(&mut parts, CocoPart::LeftEar, 0.54, 0.1);
        parts
    }

    fn assert_close(a: f32, b: f32) {
        let tol = 1e-3 * a.abs().max(1.0);
        assert!((a - b).abs() < tol, "expected {} ~= {}", a, b);
    }

    fn expected_bone_length(parent: Joint, child: Joint) -> f32 {
        match (parent, child) {
            (Joint::Collarbone, Joint::Head) => NECK,
            (Joint::Collarbone, Joint::RightShoulder) => SHOULDER / 2.0,
            (Joint::Collarbone, Joint::LeftShoulder) => SHOULDER / 2.0,
            (Joint::Collarbone, Joint::Tailbone) => SPINE,
            (Joint::Tailbone, Joint::RightHip) => PELVIC / 2.0,
            (Joint::Tailbone, Joint::LeftHip) => PELVIC / 2.0,
            (Joint::RightShoulder, Joint::RightElbow) => UPPER_ARM,
            (Joint::LeftShoulder, Joint::LeftElbow) => UPPER_ARM,
            (Joint::RightElbow, Joint::RightWrist) => FOREARM,
            (Joint::LeftElbow, Joint::LeftWrist) => FOREARM,
            (Joint::RightHip, Joint::RightKnee) => THIGH,
            (Joint::LeftHip, Joint::LeftKnee) => THIGH,
            (Joint::RightKnee, Joint::RightAnkle) => FORELEG,
            (Joint::LeftKnee, Joint::LeftAnkle) => FORELEG,
            _ => panic!("not a bone: {:?} -> {:?}", parent, child),
        }
    }

    #[test]
    fn test_bone_lengths_match_proportions() {
        let order: RelDepthOrder = [1, -1, 0, 1, -1, 1, 0, -1, 1, 1, -1];
        let pose = Pose3D::reconstruct(&stick_figure(), &order);

        for (parent, child) in JOINT_PAIRS {
            let length = pose.get(parent).distance(&pose.get(child));
            assert_close(expected_bone_length(parent, child), length);
        }
        // 両肩の間隔もテーブル上のボーン
        assert_close(
            SHOULDER,
            pose.get(Joint::RightShoulder).distance(&pose.get(Joint::LeftShoulder)),
        );
    }

    #[test]
    fn test_zero_depth_order_is_planar() {
        let order: RelDepthOrder = [0; REL_ORDER_LEN];
        let pose = Pose3D::reconstruct(&stick_figure(), &order);
        for joint in &pose.joints {
            assert_eq!(joint.z, 0.0);
        }
    }

    #[test]
    fn test_depth_order_flip_is_local_to_leaf() {
        let order_near: RelDepthOrder = [1, -1, 0, 1, -1, 1, 0, -1, 1, 1, 1];
        let mut order_far = order_near;
        order_far[10] = -1; // 左足首

        let near = Pose3D::reconstruct(&stick_figure(), &order_near);
        let far = Pose3D::reconstruct(&stick_figure(), &order_far);

        for index in 0..Joint::COUNT {
            let joint = Joint::from_index(index).unwrap();
            if joint == Joint::LeftAnkle {
                continue;
            }
            assert_eq!(near.joints[index], far.joints[index]);
        }

        let knee_z = near.get(Joint::LeftKnee).z;
        let offset_near = near.get(Joint::LeftAnkle).z - knee_z;
        let offset_far = far.get(Joint::LeftAnkle).z - knee_z;
        assert_close(offset_near, -offset_far);
        assert_eq!(near.get(Joint::LeftAnkle).x, far.get(Joint::LeftAnkle).x);
        assert_eq!(near.get(Joint::LeftAnkle).y, far.get(Joint::LeftAnkle).y);
    }

    #[test]
    fn test_set_head_position_is_rigid() {
        let order: RelDepthOrder = [1, -1, 0, 1, -1, 1, 0, -1, 1, 1, -1];
        let mut pose = Pose3D::reconstruct(&stick_figure(), &order);

        let head = pose.get(Joint::Head);
        let distances: Vec<f32> = pose.joints.iter().map(|j| head.distance(j)).collect();

        let target = Vector3::new(1.0, 2.0, 3.0);
        pose.set_head_position(target);

        let moved_head = pose.get(Joint::Head);
        assert_close(target.x, moved_head.x);
        assert_close(target.y, moved_head.y);
        assert_close(target.z, moved_head.z);

        for (joint, before) in pose.joints.iter().zip(distances) {
            assert_close(before, moved_head.distance(joint));
        }
    }

    #[test]
    fn test_degenerate_identical_keypoints() {
        // 全キーポイントが同一点（大きさゼロの人物）でもクラッシュやNaNを出さない
        let parts = [Vector2::new(0.5, 0.5); CocoPart::COUNT];
        let order: RelDepthOrder = [1; REL_ORDER_LEN];
        let pose = Pose3D::reconstruct(&parts, &order);
        for joint in &pose.joints {
            assert!(joint.x.is_finite() && joint.y.is_finite() && joint.z.is_finite());
        }
    }

    #[test]
    fn test_dz_clamps_negative_argument_to_zero() {
        // スケールと2D差分が矛盾する（ノイズ検出相当）場合は面内に倒す
        let delta = Vector2::new(10.0, 0.0);
        assert_eq!(dz(delta, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_mirror_symmetric_input_gives_mirror_symmetric_pose() {
        // 左右で同じ深度順序（肩間は0でないと対称にならない）
        let order: RelDepthOrder = [0, -1, 1, 1, 1, -1, -1, 0, 0, 1, 1];
        let mut pose = Pose3D::reconstruct(&symmetric_figure(), &order);
        pose.set_head_position(Vector3::ZERO);

        let mirrored_pairs = [
            (Joint::RightShoulder, Joint::LeftShoulder),
            (Joint::RightHip, Joint::LeftHip),
            (Joint::RightElbow, Joint::LeftElbow),
            (Joint::RightKnee, Joint::LeftKnee),
            (Joint::RightWrist, Joint::LeftWrist),
            (Joint::RightAnkle, Joint::LeftAnkle),
        ];
        for (right, left) in mirrored_pairs {
            let r = pose.get(right);
            let l = pose.get(left);
            assert_close(r.x, -l.x);
            assert_close(r.y, l.y);
            assert_close(r.z, l.z);
        }
        // 正中線上のジョイントは x ~ 0
        for joint in [Joint::Head, Joint::Collarbone, Joint::Tailbone] {
            assert!(pose.get(joint).x.abs() < 1e-3);
        }
    }

    #[test]
    fn test_write_obj_format() {
        let order: RelDepthOrder = [0; REL_ORDER_LEN];
        let pose = Pose3D::reconstruct(&stick_figure(), &order);

        let mut buffer = Vec::new();
        pose.write_obj(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), Joint::COUNT + JOINT_PAIRS.len());
        for line in &lines[..Joint::COUNT] {
            assert!(line.starts_with("v "));
            assert!(line.ends_with(" 1.0"));
        }
        // ボーンは1始まりのインデックス
        assert_eq!(
            lines[Joint::COUNT],
            format!(
                "l {} {}",
                Joint::RightShoulder as usize + 1,
                Joint::RightElbow as usize + 1
            )
        );
        for line in &lines[Joint::COUNT..] {
            assert!(line.starts_with("l "));
        }
    }
}
