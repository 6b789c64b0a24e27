use anyhow::{bail, Result};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use streamview::buffers::SharedBuffer;
use streamview::engine::{GenerationTask, SchedulerState};
use streamview::sources::{Clock, GeneratorConfig, StreamGenerator};

/// Fails on every odd call
struct FlakyClock {
    calls: AtomicI64,
}

impl Clock for FlakyClock {
    fn now_ms(&self) -> Result<i64> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call % 2 == 1 {
            bail!("clock glitch on call {}", call);
        }
        Ok(call * 100)
    }
}

fn flaky_task(buffer: &SharedBuffer) -> GenerationTask {
    let clock = Arc::new(FlakyClock {
        calls: AtomicI64::new(0),
    });
    let config = GeneratorConfig {
        seed: Some(1),
        ..GeneratorConfig::default()
    };
    GenerationTask::new(buffer.clone(), StreamGenerator::with_clock(config, clock))
}

#[test]
fn test_failed_tick_leaves_buffer_untouched() {
    let buffer = SharedBuffer::new(100);
    let task = flaky_task(&buffer);

    assert!(task.step().is_some());
    assert!(task.step().is_none());
    assert_eq!(buffer.len(), 1);
    assert!(task.step().is_some());
    assert_eq!(buffer.len(), 2);

    assert_eq!(task.metrics().ticks(), 2);
    assert_eq!(task.metrics().errors(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_generation_continues_after_errors() {
    let buffer = SharedBuffer::new(100);
    let mut task = flaky_task(&buffer);
    assert_eq!(task.interval(), Duration::from_millis(100));

    task.start();
    tokio::time::sleep(Duration::from_millis(1_050)).await;
    assert_eq!(buffer.len(), 5);
    assert_eq!(task.metrics().errors(), 5);

    task.stop();
    task.stop();
    assert_eq!(task.state(), SchedulerState::Stopped);
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(buffer.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_cadence_follows_config() {
    let buffer = SharedBuffer::new(100);
    let config = GeneratorConfig {
        interval_ms: 250,
        seed: Some(2),
        ..GeneratorConfig::default()
    };
    let mut task = GenerationTask::new(buffer.clone(), StreamGenerator::new(config));
    task.start();
    task.start();

    tokio::time::sleep(Duration::from_millis(1_010)).await;
    assert_eq!(buffer.len(), 4);
}
