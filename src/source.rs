use std::{fs, path::Path, thread, time::Duration};

use anyhow::Context;
use crossbeam_channel::{Sender, TrySendError};

use crate::matcher::Matcher;
use crate::types::{Landmark, Observation, SignReference};

/// Roughly 15 observations per second, the cadence a webcam tracker delivers.
const FRAME_INTERVAL: Duration = Duration::from_millis(66);

const SYNTH_LANDMARKS: usize = 21;
const HOLD_FRAMES: usize = 12;
const GAP_FRAMES: usize = 8;

/// Where observations come from. The app has no camera of its own; both
/// backends stand in for an external hand tracker.
#[derive(Debug, Clone, Default)]
pub enum SourceBackend {
    /// Scripted tour of the reference poses: approach, hold, wobble, repeat.
    #[default]
    Walkthrough,
    /// Frames parsed from a JSONL capture, looped end to end.
    Replay { frames: Vec<Vec<Landmark>> },
}

/// Read a replay capture up front so a bad path fails the launch instead of
/// an already-running worker.
pub fn load_replay(path: &Path) -> anyhow::Result<SourceBackend> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read replay file {}", path.display()))?;
    let frames = parse_replay(&text);
    anyhow::ensure!(
        !frames.is_empty(),
        "replay file {} contains no usable frames",
        path.display()
    );
    log::info!("loaded {} replay frame(s) from {}", frames.len(), path.display());
    Ok(SourceBackend::Replay { frames })
}

/// One JSON array of `{x, y}` points per line. An empty array is a frame
/// with no hand in view; lines that fail to parse are skipped.
fn parse_replay(text: &str) -> Vec<Vec<Landmark>> {
    let mut frames = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Vec<Landmark>>(line) {
            Ok(landmarks) => frames.push(landmarks),
            Err(err) => log::warn!("skipping replay line {}: {err}", idx + 1),
        }
    }
    frames
}

/// Feed observations into the pipeline at a fixed cadence. Frames are
/// dropped when the pipeline is busy; the worker exits once the receiving
/// side is gone.
pub fn start_source(
    backend: SourceBackend,
    observation_tx: Sender<Observation>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let frames = match backend {
            SourceBackend::Walkthrough => {
                log::info!("landmark source: scripted walkthrough");
                walkthrough_script(Matcher::builtin().references())
            }
            SourceBackend::Replay { frames } => {
                log::info!("landmark source: replay, {} frame(s)", frames.len());
                frames
            }
        };
        if frames.is_empty() {
            log::error!("landmark source has no frames to play");
            return;
        }

        let mut cursor = 0usize;
        loop {
            let landmarks = frames[cursor].clone();
            cursor = (cursor + 1) % frames.len();

            let observation = if landmarks.is_empty() {
                Observation::no_hand()
            } else {
                Observation::hand(landmarks)
            };
            match observation_tx.try_send(observation) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }
            thread::sleep(FRAME_INTERVAL);
        }
        log::info!("landmark source stopped");
    })
}

/// Deterministic frame sequence covering every reference letter: a no-hand
/// gap, a drift in from an off pose, a clean hold, then an in-threshold
/// wobble. No randomness, so runs are repeatable.
fn walkthrough_script(references: &[SignReference]) -> Vec<Vec<Landmark>> {
    let mut script = Vec::new();
    for reference in references {
        let [wrist, index_mcp] = reference.points;

        for _ in 0..GAP_FRAMES {
            script.push(Vec::new());
        }
        // Drift in along y: the reference letters differ in index-base x,
        // so a vertical approach never brushes a sibling pose.
        for step in 0..HOLD_FRAMES {
            let offset = 0.25 * (1.0 - step as f32 / HOLD_FRAMES as f32);
            script.push(synth_hand(
                Landmark::new(wrist.x, wrist.y + offset),
                Landmark::new(index_mcp.x, index_mcp.y + offset),
            ));
        }
        for _ in 0..HOLD_FRAMES {
            script.push(synth_hand(wrist, index_mcp));
        }
        for step in 0..HOLD_FRAMES {
            let wobble = if step % 2 == 0 { 0.02 } else { -0.02 };
            script.push(synth_hand(
                Landmark::new(wrist.x + wobble, wrist.y),
                Landmark::new(index_mcp.x, index_mcp.y + wobble),
            ));
        }
    }
    script
}

/// Build a full 21-point hand around the two anchor points. Only indices 0
/// and 5 matter for matching; the rest give the overlay a skeleton to draw.
fn synth_hand(wrist: Landmark, index_mcp: Landmark) -> Vec<Landmark> {
    let dx = index_mcp.x - wrist.x;
    let dy = index_mcp.y - wrist.y;

    let mut hand = vec![Landmark::new(0.0, 0.0); SYNTH_LANDMARKS];
    hand[0] = wrist;
    for joint in 0..4 {
        let t = (joint + 1) as f32 * 0.25;
        hand[1 + joint] = Landmark::new(
            wrist.x - 0.06 * t + dx * t * 0.3,
            wrist.y + dy * t * 0.8,
        );
    }
    for finger in 0..4 {
        let base = Landmark::new(
            index_mcp.x + 0.045 * finger as f32,
            index_mcp.y + 0.01 * finger as f32,
        );
        let start = 5 + finger * 4;
        for joint in 0..4 {
            let t = joint as f32;
            hand[start + joint] =
                Landmark::new(base.x + dx * 0.1 * t, base.y + dy * 0.35 * t);
        }
    }
    hand
}
