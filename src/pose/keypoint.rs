use crate::math::Vector2;

/// COCO 18パートのキーポイントインデックス（推定器の出力スキーマ）
///
/// pose3dの変換テーブルはこの並びに依存している。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum CocoPart {
    Nose = 0,
    Neck = 1,
    RightShoulder = 2,
    RightElbow = 3,
    RightWrist = 4,
    LeftShoulder = 5,
    LeftElbow = 6,
    LeftWrist = 7,
    RightHip = 8,
    RightKnee = 9,
    RightAnkle = 10,
    LeftHip = 11,
    LeftKnee = 12,
    LeftAnkle = 13,
    RightEye = 14,
    LeftEye = 15,
    RightEar = 16,
    LeftEar = 17,
}

impl CocoPart {
    pub const COUNT: usize = 18;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::Neck),
            2 => Some(Self::RightShoulder),
            3 => Some(Self::RightElbow),
            4 => Some(Self::RightWrist),
            5 => Some(Self::LeftShoulder),
            6 => Some(Self::LeftElbow),
            7 => Some(Self::LeftWrist),
            8 => Some(Self::RightHip),
            9 => Some(Self::RightKnee),
            10 => Some(Self::RightAnkle),
            11 => Some(Self::LeftHip),
            12 => Some(Self::LeftKnee),
            13 => Some(Self::LeftAnkle),
            14 => Some(Self::RightEye),
            15 => Some(Self::LeftEye),
            16 => Some(Self::RightEar),
            17 => Some(Self::LeftEar),
            _ => None,
        }
    }
}

/// 単一キーポイント
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// 信頼度が閾値以上か
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }

    pub fn point(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

/// 1フレーム中の1人分の検出候補
#[derive(Debug, Clone)]
pub struct PoseCandidate {
    pub keypoints: [Keypoint; CocoPart::COUNT],
    /// 候補全体の信頼度スコア
    pub score: f32,
}

impl PoseCandidate {
    pub fn new(keypoints: [Keypoint; CocoPart::COUNT], score: f32) -> Self {
        Self { keypoints, score }
    }

    pub fn get(&self, part: CocoPart) -> &Keypoint {
        &self.keypoints[part as usize]
    }

    /// 全キーポイントを2D点の配列として取り出す
    pub fn part_points(&self) -> [Vector2; CocoPart::COUNT] {
        let mut points = [Vector2::ZERO; CocoPart::COUNT];
        for (point, kp) in points.iter_mut().zip(self.keypoints.iter()) {
            *point = kp.point();
        }
        points
    }
}

/// 候補の中からスコア最大のものを選ぶ
///
/// 同点の場合は先に現れた候補を採用する。空なら`None`。
pub fn best_candidate(candidates: &[PoseCandidate]) -> Option<&PoseCandidate> {
    candidates
        .iter()
        .reduce(|best, c| if c.score > best.score { c } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(score: f32) -> PoseCandidate {
        PoseCandidate::new([Keypoint::default(); CocoPart::COUNT], score)
    }

    #[test]
    fn test_coco_part_from_index() {
        assert_eq!(CocoPart::from_index(1), Some(CocoPart::Neck));
        assert_eq!(CocoPart::from_index(17), Some(CocoPart::LeftEar));
        assert_eq!(CocoPart::from_index(18), None);
    }

    #[test]
    fn test_keypoint_is_valid() {
        let kp = Keypoint::new(0.5, 0.5, 0.7);
        assert!(kp.is_valid(0.5));
        assert!(!kp.is_valid(0.8));
    }

    #[test]
    fn test_part_points() {
        let mut keypoints = [Keypoint::default(); CocoPart::COUNT];
        keypoints[CocoPart::Neck as usize] = Keypoint::new(0.5, 0.3, 0.9);
        let candidate = PoseCandidate::new(keypoints, 1.0);
        let points = candidate.part_points();
        assert_eq!(points[CocoPart::Neck as usize], Vector2::new(0.5, 0.3));
    }

    #[test]
    fn test_best_candidate_empty() {
        assert!(best_candidate(&[]).is_none());
    }

    #[test]
    fn test_best_candidate_max_wins_anywhere() {
        // 3番目に最大スコアがあっても選ばれること
        // （先頭2つしか比較しない実装の退行を防ぐ）
        let candidates = vec![candidate(0.4), candidate(0.2), candidate(0.9)];
        let best = best_candidate(&candidates).unwrap();
        assert_eq!(best.score, 0.9);

        let candidates = vec![candidate(0.9), candidate(0.2), candidate(0.4)];
        assert_eq!(best_candidate(&candidates).unwrap().score, 0.9);
    }

    #[test]
    fn test_best_candidate_tie_break_is_first() {
        let mut first = candidate(0.5);
        first.keypoints[0] = Keypoint::new(1.0, 1.0, 1.0);
        let candidates = vec![first, candidate(0.5)];
        let best = best_candidate(&candidates).unwrap();
        assert_eq!(best.keypoints[0].x, 1.0);
    }
}
