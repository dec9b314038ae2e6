use crate::presentation::Staff;
use crate::protocol::NoteToken;
use eframe::egui;

const WIDTH: f32 = 650.0;
const HEIGHT: f32 = 200.0;
const NOTE_RADIUS: f32 = 8.0;

/// Vertical position of each slot's note head; sharps sit on their natural's
/// line and the rest sits with SOL.
const NOTE_HEIGHTS: [f32; NoteToken::COUNT] = [
    145.0, 140.0, 130.0, 130.0, 120.0, 120.0, 110.0, 102.0, 102.0, 95.0, 95.0, 95.0,
];

const LIT: egui::Color32 = egui::Color32::from_rgb(0, 191, 255);
const INK: egui::Color32 = egui::Color32::BLACK;
const PAPER: egui::Color32 = egui::Color32::WHITE;

fn slot_x(slot: usize) -> f32 {
    50.0 + slot as f32 * 50.0
}

/// Paints one staff: five lines, a note head with stem for every pitch, a
/// `#` beside sharps, the rest block, and a label under each.
pub fn draw_staff(ui: &mut egui::Ui, staff: &Staff) {
    let (response, painter) =
        ui.allocate_painter(egui::Vec2::new(WIDTH, HEIGHT), egui::Sense::hover());
    let rect = response.rect;
    let at = |x: f32, y: f32| rect.min + egui::Vec2::new(x, y);

    painter.rect_filled(rect, 0.0, PAPER);

    for i in 0..5 {
        let y = 50.0 + i as f32 * 15.0;
        painter.line_segment([at(0.0, y), at(WIDTH, y)], egui::Stroke::new(2.0, INK));
    }

    for token in NoteToken::ALL {
        let x = slot_x(token.slot());
        let y = NOTE_HEIGHTS[token.slot()];
        let fill = if staff.is_lit(token) { LIT } else { INK };

        if token.is_rest() {
            let block = egui::Rect::from_min_max(at(x - 6.0, y - 10.0), at(x + 6.0, y));
            painter.rect_filled(block, 0.0, fill);
            label(&painter, at(x, y + 20.0), "PAUSA");
            continue;
        }

        painter.circle_filled(at(x, y), NOTE_RADIUS, fill);
        painter.line_segment(
            [at(x + NOTE_RADIUS, y), at(x + NOTE_RADIUS, y - 30.0)],
            egui::Stroke::new(2.0, INK),
        );
        if token.is_sharp() {
            let sharp = if staff.sharp_marker_lit(token) { LIT } else { INK };
            painter.text(
                at(x - 15.0, y),
                egui::Align2::CENTER_CENTER,
                "#",
                egui::FontId::proportional(12.0),
                sharp,
            );
        }
        label(&painter, at(x, y + 20.0), token.name());
    }
}

fn label(painter: &egui::Painter, pos: egui::Pos2, text: &str) {
    painter.text(
        pos,
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(10.0),
        INK,
    );
}
