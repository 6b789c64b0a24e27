use anyhow::{Context, Result};
use streamview::engine::recording_slots;
use streamview::observability::FrameMetrics;
use streamview::{Dashboard, DashboardConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("streamview - live chart pipeline");
    println!("================================\n");

    let config = match std::env::args().nth(1) {
        Some(path) => DashboardConfig::from_file(&path)?,
        None => DashboardConfig::default(),
    };

    let source = config.source.build().context("Failed to build sample source")?;
    let (slots, surfaces) = recording_slots(&config.render.charts)?;
    let mut dashboard = Dashboard::new(config, slots)?;

    dashboard.set_metrics_observer(Some(Box::new(|metrics: &FrameMetrics| {
        log::info!(
            "fps={} memory={:.1}MB render={:.2}ms processing={:.2}ms",
            metrics.fps,
            metrics.memory_usage_mb,
            metrics.render_time_ms,
            metrics.processing_time_ms
        );
    })));

    let seeded = dashboard.start(source.as_ref()).await?;
    println!("Seeded {} samples; press Ctrl-C to stop\n", seeded);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    dashboard.shutdown();

    println!("\nBuffer: {} samples", dashboard.buffer().len());
    for (chart, surface) in dashboard.config().render.charts.iter().zip(&surfaces) {
        println!("  {:<8} {} frames drawn", chart.kind, surface.frames());
    }
    println!("\n{}", dashboard.report());

    Ok(())
}
