use super::layout::{KEY_RANGE, NoteRect, ROW_HEIGHT, RollLayout};
use super::render::{Rgb, Surface, render};
use crate::midi::{MAX_PITCH, pitch_name};
use crate::timing::Session;
use eframe::egui;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(17, 17, 17);

fn color32(color: Rgb, alpha: f32) -> egui::Color32 {
    let Rgb(r, g, b) = color;
    egui::Color32::from_rgba_unmultiplied(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// [`Surface`] over an egui painter, offset to the allocated canvas rect.
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    rect: egui::Rect,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, rect: egui::Rect) -> Self {
        Self { painter, rect }
    }

    fn pos(&self, (x, y): (f64, f64)) -> egui::Pos2 {
        self.rect.min + egui::vec2(x as f32, y as f32)
    }
}

impl Surface for PainterSurface<'_> {
    fn height(&self) -> f64 {
        self.rect.height() as f64
    }

    fn clear(&mut self) {
        self.painter.rect_filled(self.rect, 0.0, BACKGROUND);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb) {
        self.painter.line_segment(
            [self.pos(from), self.pos(to)],
            egui::Stroke::new(1.0, color32(color, 1.0)),
        );
    }

    fn fill_rect(&mut self, rect: NoteRect, color: Rgb, alpha: f32) {
        let note_rect = egui::Rect::from_min_size(
            self.pos((rect.x, rect.y)),
            egui::vec2(rect.width as f32, rect.height as f32),
        );
        self.painter.rect_filled(note_rect, 0.0, color32(color, alpha));
    }
}

pub struct PianoRoll<'a> {
    session: &'a Session,
    width: f32,
}

pub struct PianoRollResponse {
    /// Time and pitch under the pointer
    pub hovered: Option<(f64, u8)>,
}

impl<'a> PianoRoll<'a> {
    pub fn new(session: &'a Session, width: f32) -> Self {
        Self { session, width }
    }

    pub fn show(self, ui: &mut egui::Ui) -> PianoRollResponse {
        let layout = RollLayout::new(self.width as f64, self.session.total_duration());

        egui::ScrollArea::both()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let (response, painter) = ui.allocate_painter(
                    egui::vec2(self.width, layout.height() as f32),
                    egui::Sense::hover(),
                );

                let mut surface = PainterSurface::new(&painter, response.rect);
                render(
                    &mut surface,
                    &layout,
                    self.session.notes(),
                    self.session.track_filter(),
                    self.session.playhead_time(),
                );

                let hovered = response
                    .hover_pos()
                    .map(|pos| pos - response.rect.min)
                    .and_then(|offset| hovered_cell(&layout, offset));

                if let Some((time, pitch)) = hovered {
                    response.on_hover_text_at_pointer(format!(
                        "{} @ {:.2}s",
                        pitch_name(pitch),
                        time
                    ));
                }

                PianoRollResponse { hovered }
            })
            .inner
    }
}

/// Inverse of the note mapping for a pointer offset inside the canvas.
fn hovered_cell(layout: &RollLayout, offset: egui::Vec2) -> Option<(f64, u8)> {
    let row = (offset.y as f64 / ROW_HEIGHT).floor() as i64;
    if !(1..=KEY_RANGE as i64).contains(&row) {
        return None;
    }
    let pitch = u8::try_from(KEY_RANGE as i64 - row).ok()?;
    (pitch <= MAX_PITCH).then(|| (layout.x_to_time(offset.x as f64), pitch))
}
