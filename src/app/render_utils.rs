use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) const LOW_CONGESTION: Color32 = Color32::from_rgb(66, 153, 225);
pub(super) const HIGH_CONGESTION: Color32 = Color32::from_rgb(239, 68, 68);
pub(super) const ROUTE_COLOR: Color32 = Color32::from_rgb(16, 185, 129);
pub(super) const NODE_FILL: Color32 = Color32::from_rgb(102, 126, 234);
pub(super) const NODE_BORDER: Color32 = Color32::from_rgb(118, 75, 162);
pub(super) const HOVER_FILL: Color32 = Color32::from_rgb(245, 158, 11);
pub(super) const HOVER_BORDER: Color32 = Color32::from_rgb(217, 119, 6);

pub(super) const EDGE_WIDTH: f32 = 3.0;
pub(super) const ROUTE_EDGE_WIDTH: f32 = 5.0;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)).round() as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)).round() as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)).round() as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)).round() as u8,
    )
}

fn normalize_weight(weight: f64, min: f64, max: f64) -> Option<f32> {
    let span = max - min;
    if !span.is_finite() || span.abs() < f64::EPSILON || !weight.is_finite() {
        return None;
    }

    Some(((weight - min) / span).clamp(0.0, 1.0) as f32)
}

/// Linear low-to-high congestion gradient. A flat range yields the low color.
pub(super) fn congestion_color(weight: f64, min: f64, max: f64) -> Color32 {
    match normalize_weight(weight, min, max) {
        Some(t) => blend_color(LOW_CONGESTION, HIGH_CONGESTION, t),
        None => LOW_CONGESTION,
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

pub(super) fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}
