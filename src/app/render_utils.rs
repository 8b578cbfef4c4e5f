use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, pos2};

/// `world = (screen - viewport_center - pan) / zoom`; drawing uses the inverse.
pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Scales a color's alpha; filtered-out nodes render at 0.2 opacity so they
/// keep their place in the layout without competing for attention.
pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity) as u8,
    )
}

pub(super) fn darken(color: Color32, factor: f32) -> Color32 {
    blend_color(color, Color32::from_rgba_unmultiplied(0, 0, 0, color.a()), factor)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [pos2(x, rect.top()), pos2(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [pos2(rect.left(), y), pos2(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Point on the quadratic Bezier (start, control, end) at parameter `t`.
pub(super) fn quad_point(start: Pos2, control: Pos2, end: Pos2, t: f32) -> Pos2 {
    let inverse = 1.0 - t;
    let x = inverse * inverse * start.x + 2.0 * inverse * t * control.x + t * t * end.x;
    let y = inverse * inverse * start.y + 2.0 * inverse * t * control.y + t * t * end.y;
    pos2(x, y)
}

/// Tangent direction at the end of the quadratic Bezier: the derivative at
/// t = 1 points from the control point to the endpoint.
pub(super) fn quad_end_tangent(control: Pos2, end: Pos2) -> Vec2 {
    let tangent = end - control;
    if tangent.length_sq() <= f32::EPSILON {
        Vec2::X
    } else {
        tangent.normalized()
    }
}

/// Samples a quadratic Bezier into a polyline, for dashed/dotted curves.
pub(super) fn flatten_quad(start: Pos2, control: Pos2, end: Pos2, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|step| quad_point(start, control, end, step as f32 / segments as f32))
        .collect()
}

pub(super) fn circle_points(center: Pos2, radius: f32, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|step| {
            let angle = (step as f32 / segments as f32) * std::f32::consts::TAU;
            pos2(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    #[test]
    fn transform_round_trips() {
        let rect = viewport();
        let pan = vec2(35.0, -12.0);
        let zoom = 1.7;
        let world = vec2(123.0, -456.0);

        let screen = world_to_screen(rect, pan, zoom, world);
        let back = screen_to_world(rect, pan, zoom, screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn world_origin_maps_to_center_plus_pan() {
        let rect = viewport();
        let pan = vec2(10.0, 20.0);
        let screen = world_to_screen(rect, pan, 0.8, Vec2::ZERO);
        assert_eq!(screen, rect.center() + pan);
    }

    #[test]
    fn quad_point_hits_endpoints_and_midpoint() {
        let start = pos2(0.0, 0.0);
        let control = pos2(50.0, 100.0);
        let end = pos2(100.0, 0.0);

        assert_eq!(quad_point(start, control, end, 0.0), start);
        assert_eq!(quad_point(start, control, end, 1.0), end);
        let mid = quad_point(start, control, end, 0.5);
        assert!((mid.x - 50.0).abs() < 1e-4);
        assert!((mid.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn end_tangent_points_from_control_to_end() {
        let tangent = quad_end_tangent(pos2(50.0, 100.0), pos2(100.0, 0.0));
        let expected = (pos2(100.0, 0.0) - pos2(50.0, 100.0)).normalized();
        assert!((tangent - expected).length() < 1e-5);
        // Degenerate control == end still yields a usable direction.
        assert_eq!(quad_end_tangent(pos2(1.0, 1.0), pos2(1.0, 1.0)), Vec2::X);
    }

    #[test]
    fn opacity_scales_alpha() {
        let dimmed = with_opacity(Color32::from_rgb(200, 100, 50), 0.2);
        assert_eq!(dimmed.a(), 51);
        let unchanged = with_opacity(Color32::from_rgb(200, 100, 50), 1.0);
        assert_eq!(unchanged, Color32::from_rgb(200, 100, 50));
    }
}
