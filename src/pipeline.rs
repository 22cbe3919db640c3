use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::cue::{CUE_FAILURE, CUE_SUCCESS, SharedCue};
use crate::i18n::Lang;
use crate::matcher::Matcher;
use crate::speech::SpeechRequest;
use crate::store::LearnedStore;
use crate::types::{FrameReport, MatchOutcome, Observation};

/// Messages the UI sends into the running pipeline.
#[derive(Debug, Clone, Copy)]
pub enum PipelineControl {
    SetLanguage(Lang),
}

/// Per-frame recognition state: matching, status text, color cue, speech
/// edge detection and the learned-letter store. Channel-free so the logic
/// can be driven directly.
pub struct Pipeline {
    matcher: Matcher,
    store: LearnedStore,
    cue: SharedCue,
    lang: Lang,
    last_spoken: Option<String>,
}

impl Pipeline {
    pub fn new(matcher: Matcher, store: LearnedStore, cue: SharedCue, lang: Lang) -> Self {
        Self {
            matcher,
            store,
            cue,
            lang,
            last_spoken: None,
        }
    }

    pub fn set_language(&mut self, lang: Lang) {
        if self.lang != lang {
            log::info!("pipeline language set to {}", lang.code());
            self.lang = lang;
        }
    }

    /// Run one observation through the matcher and produce the frame's
    /// report, plus an utterance when a letter is newly held.
    ///
    /// A match is announced once per hold: the same letter on consecutive
    /// frames stays silent, and losing the hand or missing re-arms it.
    /// Frames with no hand leave the color cue as it was.
    pub fn process(&mut self, observation: Observation) -> (FrameReport, Option<SpeechRequest>) {
        let outcome = self.matcher.match_observation(&observation.landmarks);
        let strings = self.lang.strings();

        let mut speech = None;
        let status = match &outcome {
            MatchOutcome::Match(label) => {
                self.cue.set(CUE_SUCCESS);
                if self.last_spoken.as_deref() != Some(label.as_str()) {
                    speech = Some(SpeechRequest::new(label.clone(), self.lang.speech_tag()));
                    self.last_spoken = Some(label.clone());
                }
                if self.store.insert(label) {
                    log::info!("learned letter {label}");
                    if let Err(err) = self.store.save() {
                        log::warn!("could not save learned letters: {err}");
                    }
                }
                label.clone()
            }
            MatchOutcome::NoMatch => {
                self.cue.set(CUE_FAILURE);
                self.last_spoken = None;
                strings.try_again.to_string()
            }
            MatchOutcome::NoObservation => {
                self.last_spoken = None;
                strings.show_hand.to_string()
            }
        };

        let report = FrameReport {
            landmarks: observation.landmarks,
            outcome,
            status,
        };
        (report, speech)
    }
}

/// Consume observations, newest first, and publish frame reports. Control
/// messages are drained before each frame so a language switch applies to
/// the very next report.
pub fn start_pipeline(
    observation_rx: Receiver<Observation>,
    control_rx: Receiver<PipelineControl>,
    report_tx: Sender<FrameReport>,
    speech_tx: Sender<SpeechRequest>,
    mut pipeline: Pipeline,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        log::info!("pipeline started");

        while let Some(observation) = recv_latest_observation(&observation_rx) {
            while let Ok(control) = control_rx.try_recv() {
                match control {
                    PipelineControl::SetLanguage(lang) => pipeline.set_language(lang),
                }
            }

            let (report, speech) = pipeline.process(observation);
            if let Some(request) = speech {
                // Speaker busy means the utterance is simply skipped.
                let _ = speech_tx.try_send(request);
            }
            match report_tx.try_send(report) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }
        }

        log::info!("pipeline stopped");
    })
}

/// Block for one observation, then drain anything queued behind it so the
/// pipeline always works on the freshest frame.
fn recv_latest_observation(rx: &Receiver<Observation>) -> Option<Observation> {
    let mut observation = rx.recv().ok()?;
    while let Ok(newer) = rx.try_recv() {
        observation = newer;
    }
    Some(observation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crossbeam_channel::bounded;
    use tempfile::{TempDir, tempdir};

    use crate::types::Landmark;

    fn test_pipeline(dir: &TempDir, lang: Lang) -> (Pipeline, SharedCue) {
        let cue = SharedCue::new();
        let store = LearnedStore::load(dir.path().join("learned.json"));
        let pipeline = Pipeline::new(Matcher::builtin(), store, cue.clone(), lang);
        (pipeline, cue)
    }

    fn hand_at(wrist: Landmark, index_base: Landmark) -> Observation {
        let mut landmarks = vec![Landmark::new(0.0, 0.0); 21];
        landmarks[0] = wrist;
        landmarks[5] = index_base;
        Observation::hand(landmarks)
    }

    fn a_hand() -> Observation {
        hand_at(Landmark::new(0.5, 0.8), Landmark::new(0.55, 0.7))
    }

    fn b_hand() -> Observation {
        hand_at(Landmark::new(0.5, 0.8), Landmark::new(0.45, 0.7))
    }

    fn far_hand() -> Observation {
        hand_at(Landmark::new(0.9, 0.9), Landmark::new(0.9, 0.9))
    }

    #[test]
    fn matched_frame_reports_letter_and_success_cue() {
        let dir = tempdir().unwrap();
        let (mut pipeline, cue) = test_pipeline(&dir, Lang::En);

        let (report, speech) = pipeline.process(a_hand());
        assert_eq!(report.outcome, MatchOutcome::Match("A".into()));
        assert_eq!(report.status, "A");
        assert_eq!(report.landmarks.len(), 21, "overlay gets the full frame");
        assert_eq!(cue.get(), CUE_SUCCESS);
        assert_eq!(speech, Some(SpeechRequest::new("A", "en-US")));
    }

    #[test]
    fn speaks_once_per_hold() {
        let dir = tempdir().unwrap();
        let (mut pipeline, _cue) = test_pipeline(&dir, Lang::En);

        let (_, first) = pipeline.process(a_hand());
        let (_, held) = pipeline.process(a_hand());
        assert!(first.is_some());
        assert!(held.is_none(), "same letter held stays silent");

        let (_, miss) = pipeline.process(far_hand());
        assert!(miss.is_none());

        let (_, again) = pipeline.process(a_hand());
        assert!(again.is_some(), "re-forming the letter re-announces it");
    }

    #[test]
    fn switching_letters_announces_each_edge() {
        let dir = tempdir().unwrap();
        let (mut pipeline, _cue) = test_pipeline(&dir, Lang::En);

        let (_, a) = pipeline.process(a_hand());
        let (_, b) = pipeline.process(b_hand());
        assert_eq!(a.map(|request| request.text), Some("A".into()));
        assert_eq!(b.map(|request| request.text), Some("B".into()));
    }

    #[test]
    fn missed_frame_sets_failure_cue_and_localized_status() {
        let dir = tempdir().unwrap();
        let (mut pipeline, cue) = test_pipeline(&dir, Lang::Ru);

        let (report, speech) = pipeline.process(far_hand());
        assert_eq!(report.outcome, MatchOutcome::NoMatch);
        assert_eq!(report.status, "Попробуй ещё раз");
        assert_eq!(cue.get(), CUE_FAILURE);
        assert!(speech.is_none());
    }

    #[test]
    fn no_hand_leaves_cue_untouched() {
        let dir = tempdir().unwrap();
        let (mut pipeline, cue) = test_pipeline(&dir, Lang::En);

        pipeline.process(far_hand());
        assert_eq!(cue.get(), CUE_FAILURE);

        let (report, speech) = pipeline.process(Observation::no_hand());
        assert_eq!(report.outcome, MatchOutcome::NoObservation);
        assert_eq!(report.status, "Show your hand");
        assert_eq!(cue.get(), CUE_FAILURE, "cue keeps its last value");
        assert!(speech.is_none());
    }

    #[test]
    fn learns_each_letter_once_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("learned.json");
        let (mut pipeline, _cue) = test_pipeline(&dir, Lang::En);

        pipeline.process(a_hand());
        pipeline.process(a_hand());
        pipeline.process(b_hand());

        let reloaded = LearnedStore::load(&path);
        assert_eq!(reloaded.labels(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn language_change_switches_speech_voice() {
        let dir = tempdir().unwrap();
        let (mut pipeline, _cue) = test_pipeline(&dir, Lang::En);

        pipeline.set_language(Lang::Ru);
        let (report, speech) = pipeline.process(a_hand());
        assert_eq!(report.status, "A", "letter labels are not translated");
        assert_eq!(speech.map(|request| request.tag), Some("ru-RU"));
    }

    #[test]
    fn control_channel_applies_before_next_report() {
        let dir = tempdir().unwrap();
        let (pipeline, _cue) = test_pipeline(&dir, Lang::En);

        let (observation_tx, observation_rx) = bounded(1);
        let (control_tx, control_rx) = bounded(4);
        let (report_tx, report_rx) = bounded(4);
        let (speech_tx, _speech_rx) = bounded::<SpeechRequest>(1);
        let handle = start_pipeline(observation_rx, control_rx, report_tx, speech_tx, pipeline);

        control_tx.send(PipelineControl::SetLanguage(Lang::Ru)).unwrap();
        observation_tx.send(far_hand()).unwrap();

        let report = report_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(report.status, "Попробуй ещё раз");

        drop(observation_tx);
        handle.join().unwrap();
    }

    #[test]
    fn pipeline_stops_when_source_drops() {
        let dir = tempdir().unwrap();
        let (pipeline, _cue) = test_pipeline(&dir, Lang::En);

        let (observation_tx, observation_rx) = bounded(1);
        let (_control_tx, control_rx) = bounded(4);
        let (report_tx, _report_rx) = bounded(4);
        let (speech_tx, _speech_rx) = bounded::<SpeechRequest>(1);
        let handle = start_pipeline(observation_rx, control_rx, report_tx, speech_tx, pipeline);

        observation_tx.send(Observation::no_hand()).unwrap();
        drop(observation_tx);
        handle.join().unwrap();
    }
}
