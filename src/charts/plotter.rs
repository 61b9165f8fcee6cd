//! Chart Plotter Module
//! Renders one categorical breakdown as bars, pie, or treemap.

use egui::{Align2, Color32, FontId, Pos2, Rect, RichText, Stroke};
use egui_plot::{Bar, BarChart, Plot};

use crate::stats::CategoryCount;

/// Height of the plotting area inside a chart card.
const CHART_HEIGHT: f32 = 260.0;

/// Color palette for categories
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(99, 110, 250),  // Indigo
    Color32::from_rgb(239, 85, 59),   // Red
    Color32::from_rgb(0, 204, 150),   // Green
    Color32::from_rgb(171, 99, 250),  // Purple
    Color32::from_rgb(255, 161, 90),  // Orange
    Color32::from_rgb(25, 211, 243),  // Cyan
    Color32::from_rgb(255, 102, 146), // Pink
    Color32::from_rgb(182, 232, 128), // Lime
    Color32::from_rgb(255, 151, 255), // Magenta
    Color32::from_rgb(254, 203, 82),  // Yellow
];

/// Chart type selected in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bars,
    Pie,
    Treemap,
}

impl Default for ChartKind {
    fn default() -> Self {
        ChartKind::Bars
    }
}

impl ChartKind {
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bars => "Bars",
            ChartKind::Pie => "Pie",
            ChartKind::Treemap => "Treemap",
        }
    }
}

/// Draws one categorical breakdown in the selected style.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn category_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw a breakdown with the selected chart type.
    pub fn draw_breakdown(ui: &mut egui::Ui, id: &str, counts: &[CategoryCount], kind: ChartKind) {
        if counts.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No data").size(14.0).color(Color32::GRAY));
            });
            return;
        }

        match kind {
            ChartKind::Bars => Self::draw_bar_chart(ui, id, counts),
            ChartKind::Pie => Self::draw_pie_chart(ui, counts),
            ChartKind::Treemap => Self::draw_treemap(ui, counts),
        }
    }

    /// Horizontal bar chart, largest category on top.
    fn draw_bar_chart(ui: &mut egui::Ui, id: &str, counts: &[CategoryCount]) {
        // Bottom-up layout: reverse so the largest bar ends up on top.
        let axis_labels: Vec<String> = counts.iter().rev().map(|c| c.label.clone()).collect();
        let bars: Vec<Bar> = counts
            .iter()
            .rev()
            .enumerate()
            .map(|(i, c)| {
                Bar::new(i as f64, f64::from(c.count))
                    .width(0.6)
                    .name(&c.label)
            })
            .collect();
        Plot::new(format!("bars_{}", id))
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(0.0)
            .x_axis_label("Count")
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 0.05 || idx < 0.0 {
                    return String::new();
                }
                axis_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal().color(PALETTE[0]));
            });
    }

    /// Pie chart with percentage labels and a wrapped legend.
    fn draw_pie_chart(ui: &mut egui::Ui, counts: &[CategoryCount]) {
        let total: f64 = counts.iter().map(|c| f64::from(c.count)).sum();
        if total <= 0.0 {
            return;
        }

        let desired = egui::vec2(ui.available_width(), CHART_HEIGHT);
        let (response, painter) = ui.allocate_painter(desired, egui::Sense::hover());
        let rect = response.rect;
        let center = rect.center();
        let radius = rect.height().min(rect.width()) * 0.5 - 8.0;

        // Start at 12 o'clock, clockwise.
        let mut angle = -std::f64::consts::FRAC_PI_2;
        for (i, c) in counts.iter().enumerate() {
            let fraction = f64::from(c.count) / total;
            let sweep = fraction * std::f64::consts::TAU;
            Self::fill_sector(
                &painter,
                center,
                radius,
                angle,
                angle + sweep,
                Self::category_color(i),
            );

            if fraction >= 0.05 {
                let mid = angle + sweep / 2.0;
                let pos = center
                    + egui::vec2(
                        mid.cos() as f32 * radius * 0.62,
                        mid.sin() as f32 * radius * 0.62,
                    );
                painter.text(
                    pos,
                    Align2::CENTER_CENTER,
                    format!("{:.0}%", fraction * 100.0),
                    FontId::proportional(11.0),
                    Color32::WHITE,
                );
            }

            angle += sweep;
        }

        Self::draw_legend(ui, counts);
    }

    /// Fill one circle sector, split into fans of at most 90 degrees so
    /// every polygon stays convex.
    fn fill_sector(
        painter: &egui::Painter,
        center: Pos2,
        radius: f32,
        start: f64,
        end: f64,
        color: Color32,
    ) {
        let mut a0 = start;
        while a0 < end - 1e-6 {
            let a1 = (a0 + std::f64::consts::FRAC_PI_2).min(end);
            let steps = (((a1 - a0) / 0.05).ceil() as usize).max(2);
            let mut points = Vec::with_capacity(steps + 2);
            points.push(center);
            for s in 0..=steps {
                let a = a0 + (a1 - a0) * s as f64 / steps as f64;
                points.push(center + egui::vec2(a.cos() as f32 * radius, a.sin() as f32 * radius));
            }
            painter.add(egui::Shape::convex_polygon(points, color, Stroke::NONE));
            a0 = a1;
        }
    }

    /// Treemap: weight-balanced binary subdivision of the plot area.
    fn draw_treemap(ui: &mut egui::Ui, counts: &[CategoryCount]) {
        let desired = egui::vec2(ui.available_width(), CHART_HEIGHT);
        let (response, painter) = ui.allocate_painter(desired, egui::Sense::hover());
        let rect = response.rect.shrink(1.0);

        let items: Vec<(usize, f64)> = counts
            .iter()
            .enumerate()
            .filter(|(_, c)| c.count > 0)
            .map(|(i, c)| (i, f64::from(c.count)))
            .collect();

        let mut tiles: Vec<(usize, Rect)> = Vec::with_capacity(items.len());
        Self::subdivide(&items, rect, &mut tiles);

        let gap_color = ui.visuals().extreme_bg_color;
        for (idx, tile) in tiles {
            painter.rect_filled(tile, 0.0, Self::category_color(idx));
            painter.rect_stroke(tile, 0.0, Stroke::new(1.0, gap_color));

            let c = &counts[idx];
            if tile.width() > 56.0 && tile.height() > 26.0 {
                let clipped = painter.with_clip_rect(tile);
                clipped.text(
                    tile.center(),
                    Align2::CENTER_CENTER,
                    format!("{}\n{}", c.label, c.count),
                    FontId::proportional(11.0),
                    Color32::WHITE,
                );
            }
        }
    }

    /// Recursively split `rect` between the two weight-balanced halves of
    /// `items`, cutting across the longer side.
    fn subdivide(items: &[(usize, f64)], rect: Rect, out: &mut Vec<(usize, Rect)>) {
        match items {
            [] => {}
            [(idx, _)] => out.push((*idx, rect)),
            _ => {
                let total: f64 = items.iter().map(|(_, w)| w).sum();
                let mut acc = 0.0;
                let mut split = items.len() - 1;
                for (i, (_, w)) in items.iter().enumerate() {
                    acc += w;
                    if acc >= total / 2.0 {
                        split = (i + 1).min(items.len() - 1);
                        break;
                    }
                }

                let left_weight: f64 = items[..split].iter().map(|(_, w)| w).sum();
                let fraction = (left_weight / total) as f32;
                let (first, second) = if rect.width() >= rect.height() {
                    let x = rect.left() + rect.width() * fraction;
                    (
                        Rect::from_min_max(rect.min, egui::pos2(x, rect.bottom())),
                        Rect::from_min_max(egui::pos2(x, rect.top()), rect.max),
                    )
                } else {
                    let y = rect.top() + rect.height() * fraction;
                    (
                        Rect::from_min_max(rect.min, egui::pos2(rect.right(), y)),
                        Rect::from_min_max(egui::pos2(rect.left(), y), rect.max),
                    )
                };

                Self::subdivide(&items[..split], first, out);
                Self::subdivide(&items[split..], second, out);
            }
        }
    }

    /// Wrapped color legend under a painted chart.
    fn draw_legend(ui: &mut egui::Ui, counts: &[CategoryCount]) {
        ui.add_space(6.0);
        ui.horizontal_wrapped(|ui| {
            for (i, c) in counts.iter().enumerate() {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 2.0, Self::category_color(i));
                ui.label(RichText::new(format!("{} ({})", c.label, c.count)).size(11.0));
                ui.add_space(8.0);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_area(tiles: &[(usize, Rect)], idx: usize) -> f32 {
        tiles
            .iter()
            .filter(|(i, _)| *i == idx)
            .map(|(_, r)| r.width() * r.height())
            .sum()
    }

    #[test]
    fn treemap_tiles_cover_the_area_proportionally() {
        let rect = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(200.0, 100.0));
        let items = vec![(0usize, 6.0), (1, 3.0), (2, 1.0)];

        let mut tiles = Vec::new();
        ChartPlotter::subdivide(&items, rect, &mut tiles);

        assert_eq!(tiles.len(), 3);
        let total_area: f32 = tiles.iter().map(|(_, r)| r.width() * r.height()).sum();
        assert!((total_area - 20_000.0).abs() < 1.0);
        assert!((tile_area(&tiles, 0) - 12_000.0).abs() < 1.0);
        assert!((tile_area(&tiles, 2) - 2_000.0).abs() < 1.0);
    }

    #[test]
    fn treemap_handles_a_single_category() {
        let rect = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(100.0, 100.0));
        let mut tiles = Vec::new();
        ChartPlotter::subdivide(&[(0, 5.0)], rect, &mut tiles);
        assert_eq!(tiles, vec![(0, rect)]);
    }

    #[test]
    fn chart_kind_labels() {
        assert_eq!(ChartKind::default(), ChartKind::Bars);
        assert_eq!(ChartKind::Treemap.label(), "Treemap");
    }
}
