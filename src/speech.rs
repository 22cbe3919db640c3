use std::{
    io,
    process::{Command, Stdio},
    thread,
};

use crossbeam_channel::Receiver;

/// One utterance. `tag` is the BCP-47 language of the text, e.g. "en-US".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub tag: &'static str,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, tag: &'static str) -> Self {
        Self { text: text.into(), tag }
    }
}

fn voice_for_tag(tag: &str) -> &'static str {
    match tag {
        "ru-RU" => "ru",
        _ => "en-us",
    }
}

/// Speaks requests one at a time through `espeak-ng`. If the binary is not
/// installed the worker logs each utterance instead, so the rest of the app
/// never notices the difference.
pub fn start_speaker(request_rx: Receiver<SpeechRequest>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        log::info!("speech worker started");
        let mut engine_missing = false;

        while let Ok(request) = request_rx.recv() {
            if engine_missing {
                log::info!("speech ({}): {}", request.tag, request.text);
                continue;
            }

            let spawned = Command::new("espeak-ng")
                .arg("-v")
                .arg(voice_for_tag(request.tag))
                .arg(&request.text)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            match spawned {
                Ok(mut child) => match child.wait() {
                    Ok(status) if !status.success() => {
                        log::warn!("espeak-ng exited with {status} for {:?}", request.text);
                    }
                    Ok(_) => {}
                    Err(err) => log::warn!("could not wait on espeak-ng: {err}"),
                },
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    engine_missing = true;
                    log::warn!("espeak-ng not found, speech output will be logged only");
                    log::info!("speech ({}): {}", request.tag, request.text);
                }
                Err(err) => log::warn!("could not start espeak-ng: {err}"),
            }
        }

        log::info!("speech worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn russian_tag_selects_russian_voice() {
        assert_eq!(voice_for_tag("ru-RU"), "ru");
    }

    #[test]
    fn unknown_tags_fall_back_to_english() {
        assert_eq!(voice_for_tag("en-US"), "en-us");
        assert_eq!(voice_for_tag("fr-FR"), "en-us");
    }

    #[test]
    fn speaker_exits_when_channel_closes() {
        let (request_tx, request_rx) = bounded::<SpeechRequest>(1);
        let handle = start_speaker(request_rx);
        drop(request_tx);
        handle.join().unwrap();
    }
}
