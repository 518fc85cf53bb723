use anyhow::{bail, Result};

use fbt_tracker::config::Config;
use fbt_tracker::pose::{best_candidate, CameraPipeline};
use fbt_tracker::pose3d::Pose3D;
use fbt_tracker::server::CandidateSource;

const CONFIG_PATH: &str = "config.toml";

/// 閾値を超える候補が出るまで試すフレーム数
const MAX_ATTEMPTS: usize = 100;

/// 1フレームだけ復元してOBJとして保存する確認用ツール
fn main() -> Result<()> {
    let output = std::env::args().nth(1).unwrap_or_else(|| "pose.obj".to_string());

    let config = Config::load_or_default(CONFIG_PATH);
    let depth_order = config.tracking.depth_order()?;
    let mut pipeline = CameraPipeline::from_config(&config)?;
    println!("Camera & model ready");

    for attempt in 1..=MAX_ATTEMPTS {
        let candidates = pipeline.next_candidates()?;
        let Some(best) = best_candidate(&candidates) else {
            continue;
        };
        if best.score < config.model.confidence_threshold {
            continue;
        }

        println!("Pose found (attempt {}, score {:.2})", attempt, best.score);
        let pose = Pose3D::reconstruct(&best.part_points(), &depth_order);
        pose.save_as_obj(&output)?;
        println!("Saved: {}", output);
        return Ok(());
    }

    bail!("No pose above threshold in {} frames", MAX_ATTEMPTS);
}
