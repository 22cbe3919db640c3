#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod cue;
mod i18n;
mod matcher;
mod pipeline;
mod source;
mod speech;
mod store;
mod types;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use crossbeam_channel::bounded;
use gpui::Application;
use gpui_component;

use crate::cue::SharedCue;
use crate::i18n::Lang;
use crate::matcher::Matcher;
use crate::pipeline::Pipeline;
use crate::source::SourceBackend;
use crate::store::{LearnedStore, default_store_path};

struct Options {
    backend: SourceBackend,
    lang: Lang,
    store_path: PathBuf,
}

fn print_usage() {
    println!("usage: asl-tutor [--replay <frames.jsonl>] [--lang en|ru] [--learned <file.json>]");
}

/// Returns None when help was requested and the process should just exit.
fn parse_args() -> Result<Option<Options>> {
    let mut backend = SourceBackend::default();
    let mut lang = Lang::default();
    let mut store_path = default_store_path();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--replay" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--replay needs a file path"))?;
                backend = source::load_replay(Path::new(&path))?;
            }
            "--lang" => {
                let code = args
                    .next()
                    .ok_or_else(|| anyhow!("--lang needs a language code"))?;
                lang = Lang::from_code(&code)
                    .ok_or_else(|| anyhow!("unknown language {code:?}, expected en or ru"))?;
            }
            "--learned" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--learned needs a file path"))?;
                store_path = PathBuf::from(path);
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            other => bail!("unknown argument {other:?}"),
        }
    }

    Ok(Some(Options {
        backend,
        lang,
        store_path,
    }))
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(options) = parse_args()? else {
        return Ok(());
    };

    let matcher = Matcher::builtin();
    let references = matcher.references().to_vec();
    let mut store = LearnedStore::load(options.store_path);
    store.retain_known(&references);
    let learned = store.labels();
    let cue = SharedCue::new();

    let (observation_tx, observation_rx) = bounded(1);
    let (control_tx, control_rx) = bounded(4);
    let (report_tx, report_rx) = bounded(8);
    let (speech_tx, speech_rx) = bounded(1);

    let _source_handle = source::start_source(options.backend, observation_tx);
    let _speech_handle = speech::start_speaker(speech_rx);
    let _pipeline_handle = pipeline::start_pipeline(
        observation_rx,
        control_rx,
        report_tx,
        speech_tx,
        Pipeline::new(matcher, store, cue.clone(), options.lang),
    );

    let lang = options.lang;
    Application::new()
        .with_assets(gpui_component_assets::Assets)
        .run(move |app| {
            gpui_component::init(app);

            if let Err(err) =
                ui::launch_ui(app, report_rx, control_tx, cue, references, learned, lang)
            {
                eprintln!("failed to launch ui: {err:?}");
            }
        });

    Ok(())
}
