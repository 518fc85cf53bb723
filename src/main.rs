use anyhow::Result;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use fbt_tracker::config::Config;
use fbt_tracker::pose::CameraPipeline;
use fbt_tracker::server::TrackingServer;
use fbt_tracker::tracker::PoseSink;
use fbt_tracker::vmt::VmtClient;

const CONFIG_PATH: &str = "config.toml";

/// トラッカー状態をVMTへ流す周期
const PUBLISH_INTERVAL: Duration = Duration::from_millis(11);

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);

    println!("=== FBT Tracker ({}) ===", env!("GIT_VERSION"));
    println!("VMT target: {}", config.vmt.addr);
    println!("Model: {}", config.model.path);

    let depth_order = config.tracking.depth_order()?;

    let pipeline = CameraPipeline::from_config(&config)?;
    let (width, height) = pipeline.resolution();
    println!("Camera: {}x{}", width, height);

    let server = TrackingServer::start(
        pipeline,
        depth_order,
        config.model.confidence_threshold,
    )?;
    let vmt = VmtClient::new(&config.vmt.addr)?;
    println!("Tracking started");
    println!("Enterで終了");

    // stdinのEnterを終了シグナルにする
    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit = quit.clone();
        thread::spawn(move || {
            let mut line = String::new();
            let _ = io::stdin().read_line(&mut line);
            quit.store(true, Ordering::Release);
        });
    }

    while !quit.load(Ordering::Acquire) {
        let trackers = server.trackers();
        vmt.send_snapshot(config.vmt.hip_index, &trackers.hip.query_latest())?;
        vmt.send_snapshot(
            config.vmt.left_foot_index,
            &trackers.left_ankle.query_latest(),
        )?;
        vmt.send_snapshot(
            config.vmt.right_foot_index,
            &trackers.right_ankle.query_latest(),
        )?;
        thread::sleep(PUBLISH_INTERVAL);
    }

    println!("Shutting down...");
    server.stop()?;
    Ok(())
}
