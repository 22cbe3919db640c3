use std::{collections::BTreeSet, sync::Arc};

use crossbeam_channel::{Receiver, Sender};
use gpui::prelude::FluentBuilder;
use gpui::{
    AnyElement, App, AppContext, Context, InteractiveElement, IntoElement, ObjectFit,
    ParentElement, Render, RenderImage, SharedString, Styled, StyledImage, TitlebarOptions,
    Window, WindowControlArea, WindowDecorations, WindowOptions, div, img, px,
};
use gpui_component::{
    ActiveTheme, Root, Selectable, StyledExt,
    button::{Button, ButtonVariants},
    h_flex,
    tag::Tag,
    v_flex,
};
use image::{Frame as ImageFrame, ImageBuffer, Rgba};

use crate::cue::SharedCue;
use crate::i18n::Lang;
use crate::pipeline::PipelineControl;
use crate::types::{FrameReport, Landmark, MIN_LANDMARKS, MatchOutcome, SignReference};

/// Hand skeleton edges over the 21 standard landmark indices.
const CONNECTIONS: &[(usize, usize)] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (0, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (0, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    (5, 9),
    (9, 13),
    (13, 17),
];

const SKELETON_LINE_THICKNESS: i32 = 3;
const JOINT_RADIUS: i32 = 3;
const ANCHOR_RADIUS: i32 = 5;
const TARGET_RING_RADIUS: i32 = 9;

const OVERLAY_WIDTH: u32 = 480;
const OVERLAY_HEIGHT: u32 = 360;
const PANEL_WIDTH: f32 = 480.0;
const PANEL_HEIGHT: f32 = 360.0;

const OVERLAY_BACKGROUND: [u8; 4] = [15, 20, 25, 255];
const LINE_COLOR: [u8; 4] = [96, 165, 250, 255];
const JOINT_COLOR: [u8; 4] = [59, 130, 246, 255];
const ANCHOR_MATCHED: [u8; 4] = [34, 197, 94, 255];
const ANCHOR_MISSED: [u8; 4] = [239, 68, 68, 255];
const TARGET_COLOR: [u8; 4] = [245, 158, 11, 255];

pub fn launch_ui(
    app: &mut App,
    report_rx: Receiver<FrameReport>,
    control_tx: Sender<PipelineControl>,
    cue: SharedCue,
    references: Vec<SignReference>,
    learned: Vec<String>,
    lang: Lang,
) -> gpui::Result<()> {
    let window_options = WindowOptions {
        titlebar: Some(TitlebarOptions {
            title: Some(lang.strings().title.into()),
            appears_transparent: true,
            traffic_light_position: None,
        }),
        window_decorations: Some(WindowDecorations::Client),
        ..Default::default()
    };

    app.open_window(window_options, move |window, app| {
        let view = app.new(|_| {
            AppView::new(report_rx, control_tx, cue, references, learned, lang)
        });
        app.new(|cx| Root::new(view, window, cx))
    })?;

    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Tutorial,
    Practice,
}

struct AppView {
    report_rx: Receiver<FrameReport>,
    control_tx: Sender<PipelineControl>,
    cue: SharedCue,
    lang: Lang,
    mode: Mode,
    references: Vec<SignReference>,
    learned: BTreeSet<String>,
    latest_report: Option<FrameReport>,
    latest_image: Option<Arc<RenderImage>>,
}

impl AppView {
    fn new(
        report_rx: Receiver<FrameReport>,
        control_tx: Sender<PipelineControl>,
        cue: SharedCue,
        references: Vec<SignReference>,
        learned: Vec<String>,
        lang: Lang,
    ) -> Self {
        Self {
            report_rx,
            control_tx,
            cue,
            lang,
            mode: Mode::Tutorial,
            references,
            learned: learned.into_iter().collect(),
            latest_report: None,
            latest_image: None,
        }
    }

    /// Pull everything queued by the pipeline, keeping only the newest
    /// report for display. Matched letters are folded into the local
    /// learned set on the way through, so none is missed even when several
    /// reports arrive between renders.
    fn drain_reports(&mut self, window: &mut Window, cx: &mut Context<'_, Self>) {
        let mut fresh = false;
        while let Ok(report) = self.report_rx.try_recv() {
            if let MatchOutcome::Match(label) = &report.outcome {
                self.learned.insert(label.clone());
            }
            self.latest_report = Some(report);
            fresh = true;
        }
        if fresh {
            self.refresh_overlay(window, cx);
        }
    }

    fn refresh_overlay(&mut self, window: &mut Window, cx: &mut Context<'_, Self>) {
        let Some(report) = self.latest_report.take() else {
            return;
        };
        let targets = matches!(self.mode, Mode::Tutorial).then_some(self.references.as_slice());
        let image = overlay_image(&report.landmarks, targets, &report.outcome);
        self.latest_report = Some(report);
        if let Some(image) = image {
            self.replace_latest_image(image, window, cx);
        }
    }

    fn replace_latest_image(
        &mut self,
        new_image: Arc<RenderImage>,
        window: &mut Window,
        cx: &mut Context<'_, Self>,
    ) {
        if let Some(old_image) = self.latest_image.replace(new_image) {
            // Drop the old GPU texture; the sprite atlas would otherwise
            // keep every overlay frame and memory would climb steadily.
            cx.drop_image(old_image, Some(window));
        }
    }

    fn set_mode(&mut self, mode: Mode, window: &mut Window, cx: &mut Context<'_, Self>) {
        if self.mode != mode {
            self.mode = mode;
            self.refresh_overlay(window, cx);
            cx.notify();
        }
    }

    fn set_language(&mut self, lang: Lang, cx: &mut Context<'_, Self>) {
        if self.lang != lang {
            self.lang = lang;
            if self
                .control_tx
                .try_send(PipelineControl::SetLanguage(lang))
                .is_err()
            {
                log::warn!("control channel full, language change not applied");
            }
            cx.notify();
        }
    }

    fn render_main(&mut self, window: &mut Window, cx: &mut Context<'_, Self>) -> AnyElement {
        self.drain_reports(window, cx);

        let strings = self.lang.strings();
        let theme = cx.theme();

        let (status_text, status_color) = match &self.latest_report {
            Some(report) => {
                let color = match report.outcome {
                    MatchOutcome::Match(_) => theme.success,
                    MatchOutcome::NoMatch => theme.accent,
                    MatchOutcome::NoObservation => theme.muted_foreground,
                };
                (report.status.clone(), color)
            }
            None => (strings.show_hand.to_string(), theme.muted_foreground),
        };

        let canvas: AnyElement = if let Some(image) = &self.latest_image {
            img(image.clone())
                .size_full()
                .object_fit(ObjectFit::Contain)
                .rounded_t_lg()
                .into_any_element()
        } else {
            div()
                .size_full()
                .flex()
                .items_center()
                .justify_center()
                .text_sm()
                .text_color(theme.muted_foreground)
                .rounded_t_lg()
                .child(strings.show_hand)
                .into_any_element()
        };

        let canvas_shell = div()
            .relative()
            .w(px(PANEL_WIDTH))
            .h(px(PANEL_HEIGHT))
            .overflow_hidden()
            .rounded_t_lg()
            .bg(gpui::rgb(0x000000))
            .child(canvas);

        let cue_swatch = div()
            .w(px(14.0))
            .h(px(14.0))
            .rounded_full()
            .bg(gpui::rgb(self.cue.get()));

        let status_row = h_flex()
            .justify_between()
            .items_center()
            .gap_2()
            .p_3()
            .child(
                div()
                    .text_base()
                    .font_semibold()
                    .text_color(status_color)
                    .child(status_text),
            )
            .child(cue_swatch);

        let overlay_card = v_flex()
            .w(px(PANEL_WIDTH))
            .rounded_lg()
            .overflow_hidden()
            .bg(gpui::rgb(0x0f1419))
            .child(canvas_shell)
            .child(status_row);

        let mode_row = [
            (Mode::Tutorial, "mode-tutorial", strings.tutorial),
            (Mode::Practice, "mode-practice", strings.practice),
        ]
        .into_iter()
        .fold(h_flex().gap_2(), |row, (mode, id, label)| {
            let is_selected = self.mode == mode;
            row.child(
                Button::new(SharedString::from(id))
                    .label(label)
                    .selected(is_selected)
                    .outline()
                    .on_click(cx.listener(move |this, _, window, cx| {
                        this.set_mode(mode, window, cx);
                    })),
            )
        });

        let language_row = Lang::ALL.into_iter().fold(h_flex().gap_2(), |row, lang| {
            let is_selected = self.lang == lang;
            row.child(
                Button::new(SharedString::from(format!("lang-{}", lang.code())))
                    .label(lang.display_name())
                    .selected(is_selected)
                    .outline()
                    .on_click(cx.listener(move |this, _, _, cx| {
                        this.set_language(lang, cx);
                    })),
            )
        });

        let learned_row: AnyElement = if self.learned.is_empty() {
            div()
                .text_xs()
                .text_color(theme.muted_foreground)
                .child("--")
                .into_any_element()
        } else {
            self.learned
                .iter()
                .fold(h_flex().gap_1(), |row, label| {
                    row.child(Tag::success().rounded_full().child(label.clone()))
                })
                .into_any_element()
        };

        let reference_rows = self
            .references
            .iter()
            .fold(v_flex().gap_1(), |list, reference| {
                list.child(
                    h_flex()
                        .gap_2()
                        .items_center()
                        .child(
                            div()
                                .w(px(24.0))
                                .h(px(24.0))
                                .rounded_md()
                                .border_1()
                                .border_color(theme.border)
                                .flex()
                                .items_center()
                                .justify_center()
                                .font_semibold()
                                .text_color(theme.foreground)
                                .child(reference.label.clone()),
                        )
                        .child(
                            div().text_xs().text_color(theme.muted_foreground).child(
                                format!(
                                    "({:.2}, {:.2}) ({:.2}, {:.2})",
                                    reference.points[0].x,
                                    reference.points[0].y,
                                    reference.points[1].x,
                                    reference.points[1].y
                                ),
                            ),
                        ),
                )
            });

        let controls_card = v_flex()
            .flex_1()
            .gap_3()
            .p_4()
            .rounded_lg()
            .border_1()
            .border_color(theme.border)
            .bg(theme.group_box)
            .child(mode_row)
            .child(language_row)
            .child(
                div()
                    .text_sm()
                    .font_semibold()
                    .text_color(theme.foreground)
                    .child(format!("{} ({})", strings.learned, self.learned.len())),
            )
            .child(learned_row)
            .when(matches!(self.mode, Mode::Tutorial), |this| {
                this.child(reference_rows)
            });

        let (source_icon, source_color) = if self.latest_report.is_some() {
            ("●", theme.success)
        } else {
            ("○", theme.muted_foreground)
        };

        let titlebar = h_flex()
            .window_control_area(WindowControlArea::Drag)
            .h(px(32.0))
            .w_full()
            .px_3()
            .items_center()
            .justify_between()
            .bg(gpui::rgb(0x0f1419))
            .border_b_1()
            .border_color(gpui::rgb(0x2d3640))
            .child(
                h_flex()
                    .gap_3()
                    .items_center()
                    .child(
                        div()
                            .text_sm()
                            .font_semibold()
                            .text_color(gpui::rgb(0xe0e0e0))
                            .child(strings.title),
                    )
                    .child(div().text_xs().text_color(source_color).child(source_icon)),
            )
            .child(
                h_flex()
                    .gap_1()
                    .child(
                        div()
                            .id("minimize-button")
                            .w(px(36.0))
                            .h(px(28.0))
                            .flex()
                            .items_center()
                            .justify_center()
                            .window_control_area(WindowControlArea::Min)
                            .hover(|style| style.bg(gpui::rgb(0x2d3640)))
                            .text_color(gpui::rgb(0xb0b0b0))
                            .child("━"),
                    )
                    .child(
                        div()
                            .id("maximize-button")
                            .w(px(36.0))
                            .h(px(28.0))
                            .flex()
                            .items_center()
                            .justify_center()
                            .window_control_area(WindowControlArea::Max)
                            .hover(|style| style.bg(gpui::rgb(0x2d3640)))
                            .text_color(gpui::rgb(0xb0b0b0))
                            .child("□"),
                    )
                    .child(
                        div()
                            .id("close-button")
                            .w(px(36.0))
                            .h(px(28.0))
                            .flex()
                            .items_center()
                            .justify_center()
                            .window_control_area(WindowControlArea::Close)
                            .hover(|style| {
                                style
                                    .bg(gpui::rgb(0xe81123))
                                    .text_color(gpui::rgb(0xffffff))
                            })
                            .text_color(gpui::rgb(0xb0b0b0))
                            .child("✕"),
                    ),
            );

        v_flex()
            .size_full()
            .bg(gpui::rgb(0x1a2332))
            .child(titlebar)
            .child(
                h_flex()
                    .flex_1()
                    .gap_3()
                    .p_4()
                    .items_start()
                    .child(overlay_card)
                    .child(controls_card),
            )
            .into_any_element()
    }
}

impl Render for AppView {
    fn render(
        &mut self,
        window: &mut Window,
        cx: &mut Context<'_, Self>,
    ) -> impl gpui::IntoElement {
        // Keep frames flowing: schedule the next notify so reports drain at
        // display rate even without input events.
        cx.defer_in(window, |_, _, cx| {
            cx.notify();
        });

        self.render_main(window, cx)
    }
}

/// Rasterize one frame of the presenter canvas: background, optional
/// reference-pose rings, the hand skeleton, and the two inspected joints
/// tinted by the frame's outcome.
fn overlay_image(
    landmarks: &[Landmark],
    targets: Option<&[SignReference]>,
    outcome: &MatchOutcome,
) -> Option<Arc<RenderImage>> {
    let mut rgba = vec![0u8; (OVERLAY_WIDTH * OVERLAY_HEIGHT * 4) as usize];
    for px in rgba.chunks_exact_mut(4) {
        px.copy_from_slice(&OVERLAY_BACKGROUND);
    }

    if let Some(references) = targets {
        for reference in references {
            for point in reference.points {
                draw_ring(
                    &mut rgba,
                    OVERLAY_WIDTH,
                    OVERLAY_HEIGHT,
                    to_canvas(point, OVERLAY_WIDTH, OVERLAY_HEIGHT),
                    TARGET_RING_RADIUS,
                    TARGET_COLOR,
                );
            }
        }
    }

    if landmarks.len() >= MIN_LANDMARKS {
        draw_skeleton(&mut rgba, OVERLAY_WIDTH, OVERLAY_HEIGHT, landmarks);

        let anchor_color = match outcome {
            MatchOutcome::Match(_) => ANCHOR_MATCHED,
            _ => ANCHOR_MISSED,
        };
        for idx in [0usize, 5] {
            if let Some(point) = landmarks.get(idx) {
                draw_circle(
                    &mut rgba,
                    OVERLAY_WIDTH,
                    OVERLAY_HEIGHT,
                    to_canvas(*point, OVERLAY_WIDTH, OVERLAY_HEIGHT),
                    ANCHOR_RADIUS,
                    anchor_color,
                );
            }
        }
    }

    // GPUI expects BGRA; convert in place to avoid the async asset pipeline.
    for px in rgba.chunks_exact_mut(4) {
        px.swap(0, 2);
    }

    let buffer = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(OVERLAY_WIDTH, OVERLAY_HEIGHT, rgba)?;
    Some(Arc::new(RenderImage::new(vec![ImageFrame::new(buffer)])))
}

/// Map a normalized point onto the canvas. Estimator output can land well
/// outside the frame; coordinates are clamped onto the nearest edge pixel
/// so the draw helpers only ever see in-range centers.
fn to_canvas(point: Landmark, width: u32, height: u32) -> (i32, i32) {
    let x = (point.x * width as f32).clamp(0.0, width.saturating_sub(1) as f32);
    let y = (point.y * height as f32).clamp(0.0, height.saturating_sub(1) as f32);
    (x as i32, y as i32)
}

fn draw_skeleton(buffer: &mut [u8], width: u32, height: u32, landmarks: &[Landmark]) {
    for &(a, b) in CONNECTIONS {
        if let (Some(pa), Some(pb)) = (landmarks.get(a), landmarks.get(b)) {
            draw_line(
                buffer,
                width,
                height,
                to_canvas(*pa, width, height),
                to_canvas(*pb, width, height),
                LINE_COLOR,
                SKELETON_LINE_THICKNESS,
            );
        }
    }

    for &point in landmarks {
        draw_circle(
            buffer,
            width,
            height,
            to_canvas(point, width, height),
            JOINT_RADIUS,
            JOINT_COLOR,
        );
    }
}

fn draw_line(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    p0: (i32, i32),
    p1: (i32, i32),
    color: [u8; 4],
    thickness: i32,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = (thickness.max(1) - 1) / 2;

    loop {
        put_pixel_safe(buffer, width, height, x0, y0, color);
        if radius > 0 {
            for ox in -radius..=radius {
                for oy in -radius..=radius {
                    if ox == 0 && oy == 0 {
                        continue;
                    }
                    if ox.abs() + oy.abs() <= radius {
                        put_pixel_safe(buffer, width, height, x0 + ox, y0 + oy, color);
                    }
                }
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_circle(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    center: (i32, i32),
    radius: i32,
    color: [u8; 4],
) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_safe(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Hollow circle, two pixels thick.
fn draw_ring(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    center: (i32, i32),
    radius: i32,
    color: [u8; 4],
) {
    let (cx, cy) = center;
    let inner = (radius - 2).max(0);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d2 = dx * dx + dy * dy;
            if d2 <= radius * radius && d2 >= inner * inner {
                put_pixel_safe(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_safe(buffer: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux >= width || uy >= height {
        return;
    }
    let idx = ((uy * width + ux) as usize) * 4;
    if idx + 3 < buffer.len() {
        buffer[idx..idx + 4].copy_from_slice(&color);
    }
}
