use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke};
use nalgebra::{Rotation2, Vector2};
use simcore::{Arena, CarState};

use crate::trace::Trace;

// Car footprint (scene pixels)
const CAR_LENGTH: f64 = 44.0;
const CAR_WIDTH: f64 = 22.0;
const WHEEL_LENGTH: f64 = 10.0;
const WHEEL_WIDTH: f64 = 4.5;
const AXLE_OFFSET: f64 = 0.32 * CAR_LENGTH;
const SHADOW_OFFSET: (f64, f64) = (4.0, 6.0);

const GRASS: Color32 = Color32::from_rgb(58, 110, 52);
const ASPHALT: Color32 = Color32::from_rgb(62, 64, 70);
const LANE_MARK: Color32 = Color32::from_rgb(225, 225, 210);
const BODY: Color32 = Color32::from_rgb(205, 48, 44);
const GLASS: Color32 = Color32::from_rgb(40, 60, 90);
const TYRE: Color32 = Color32::from_rgb(20, 20, 22);

/// Maps scene pixels onto a screen rect, letterboxed to keep the arena's
/// aspect ratio. Scene and screen share the y-down convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    origin: Pos2,
    scale: f32,
}

impl Viewport {
    /// `None` while the surface has no area to draw on.
    pub fn fit(rect: Rect, arena: &Arena) -> Option<Self> {
        if !(rect.width() > 0.0 && rect.height() > 0.0) {
            return None;
        }
        let scale = (rect.width() as f64 / arena.width).min(rect.height() as f64 / arena.height) as f32;
        if !(scale.is_finite() && scale > 0.0) {
            return None;
        }
        let size = egui::vec2(arena.width as f32, arena.height as f32) * scale;
        Some(Viewport {
            origin: rect.center() - size / 2.0,
            scale,
        })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_screen(&self, p: Vector2<f64>) -> Pos2 {
        egui::pos2(
            self.origin.x + p.x as f32 * self.scale,
            self.origin.y + p.y as f32 * self.scale,
        )
    }

    fn rect(&self, min: (f64, f64), max: (f64, f64)) -> Rect {
        Rect::from_min_max(
            self.to_screen(Vector2::new(min.0, min.1)),
            self.to_screen(Vector2::new(max.0, max.1)),
        )
    }
}

pub struct Scene<'a> {
    pub state: &'a CarState,
    pub arena: &'a Arena,
    pub wheel_visual_angle: f64,
    pub trail: Option<&'a Trace>,
}

/// Corners of a `length` x `width` rectangle centered on `center`, rotated
/// by `rot`. Listed front-right, front-left, rear-left, rear-right.
fn oriented_box(center: Vector2<f64>, rot: Rotation2<f64>, length: f64, width: f64) -> [Vector2<f64>; 4] {
    let (hl, hw) = (length * 0.5, width * 0.5);
    [[hl, hw], [hl, -hw], [-hl, -hw], [-hl, hw]].map(|[bx, by]| center + rot * Vector2::new(bx, by))
}

fn polygon(viewport: &Viewport, corners: &[Vector2<f64>]) -> Vec<Pos2> {
    corners.iter().map(|p| viewport.to_screen(*p)).collect()
}

pub fn draw_scene(painter: &Painter, viewport: &Viewport, scene: &Scene) {
    draw_track(painter, viewport, scene.arena);

    if let Some(trace) = scene.trail {
        if trace.len() > 1 {
            let points: Vec<Pos2> = trace
                .path()
                .map(|(x, y)| viewport.to_screen(Vector2::new(x, y)))
                .collect();
            painter.add(Shape::line(
                points,
                Stroke::new(2.0, Color32::from_rgba_unmultiplied(120, 190, 255, 140)),
            ));
        }
    }

    draw_car(painter, viewport, scene.state, scene.wheel_visual_angle);
}

fn draw_track(painter: &Painter, viewport: &Viewport, arena: &Arena) {
    painter.rect_filled(viewport.rect((0.0, 0.0), (arena.width, arena.height)), 4.0, GRASS);

    let drivable = viewport.rect((arena.min_x(), arena.min_y()), (arena.max_x(), arena.max_y()));
    painter.rect_filled(drivable, 12.0 * viewport.scale(), ASPHALT);

    // infield island with a dashed lane line halfway to the edge
    let (cx, cy) = arena.center();
    let (iw, ih) = ((arena.max_x() - arena.min_x()) * 0.3, (arena.max_y() - arena.min_y()) * 0.3);
    painter.rect_filled(viewport.rect((cx - iw, cy - ih), (cx + iw, cy + ih)), 30.0 * viewport.scale(), GRASS);

    let (lx, ly) = ((cx - arena.min_x() + iw) * 0.5, (cy - arena.min_y() + ih) * 0.5);
    let lane: Vec<Pos2> = [(-lx, -ly), (lx, -ly), (lx, ly), (-lx, ly), (-lx, -ly)]
        .into_iter()
        .map(|(dx, dy)| viewport.to_screen(Vector2::new(cx + dx, cy + dy)))
        .collect();
    let dash = 14.0 * viewport.scale();
    painter.extend(Shape::dashed_line(&lane, Stroke::new(2.0, LANE_MARK), dash, dash));

    painter.add(Shape::closed_line(
        polygon(
            viewport,
            &[
                Vector2::new(arena.min_x(), arena.min_y()),
                Vector2::new(arena.max_x(), arena.min_y()),
                Vector2::new(arena.max_x(), arena.max_y()),
                Vector2::new(arena.min_x(), arena.max_y()),
            ],
        ),
        Stroke::new(1.5, LANE_MARK),
    ));
}

fn draw_car(painter: &Painter, viewport: &Viewport, state: &CarState, wheel_visual_angle: f64) {
    let center = Vector2::new(state.x, state.y);
    let rot = Rotation2::new(state.heading);
    let body = oriented_box(center, rot, CAR_LENGTH, CAR_WIDTH);

    let offset = Vector2::new(SHADOW_OFFSET.0, SHADOW_OFFSET.1);
    let shadow: Vec<Vector2<f64>> = body.iter().map(|p| p + offset).collect();
    painter.add(Shape::convex_polygon(
        polygon(viewport, &shadow),
        Color32::from_black_alpha(70),
        Stroke::NONE,
    ));

    let front_rot = rot * Rotation2::new(state.steering * wheel_visual_angle);
    for (along, side) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
        let hub = center + rot * Vector2::new(along * AXLE_OFFSET, side * CAR_WIDTH * 0.5);
        let wheel_rot = if along > 0.0 { front_rot } else { rot };
        let wheel = oriented_box(hub, wheel_rot, WHEEL_LENGTH, WHEEL_WIDTH);
        painter.add(Shape::convex_polygon(polygon(viewport, &wheel), TYRE, Stroke::NONE));
    }

    painter.add(Shape::convex_polygon(
        polygon(viewport, &body),
        BODY,
        Stroke::new(1.5, Color32::from_rgb(90, 20, 18)),
    ));
    let windshield = oriented_box(
        center + rot * Vector2::new(CAR_LENGTH * 0.12, 0.0),
        rot,
        CAR_LENGTH * 0.2,
        CAR_WIDTH * 0.75,
    );
    painter.add(Shape::convex_polygon(polygon(viewport, &windshield), GLASS, Stroke::NONE));

    // heading indicator
    let nose = center + rot * Vector2::new(CAR_LENGTH * 0.85, 0.0);
    painter.line_segment(
        [viewport.to_screen(center), viewport.to_screen(nose)],
        Stroke::new(2.0, Color32::YELLOW),
    );
}
