use std::f32::consts::TAU;

use eframe::egui::{Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::ColorMap;
use crate::data::summary::ProportionSummary;
use crate::state::{ChartKind, Comparison};

// ---------------------------------------------------------------------------
// Before / after outcome chart
// ---------------------------------------------------------------------------

/// Raw and filtered outcome proportions side by side.
pub fn comparison_chart(ui: &mut Ui, comparison: &Comparison, kind: ChartKind) {
    // Colour by raw labels so both halves agree.
    let colors = ColorMap::new(comparison.raw.labels());

    ui.columns(2, |cols: &mut [Ui]| {
        let halves = [("Raw data", &comparison.raw), ("Filtered data", &comparison.filtered)];
        for (ui, (title, summary)) in cols.iter_mut().zip(halves) {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.strong(title);
            });
            if summary.is_empty() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.label("No rows to summarise.");
                });
                continue;
            }
            match kind {
                ChartKind::Bar => bar_chart(ui, title, summary, &colors),
                ChartKind::Pie => pie_chart(ui, summary, &colors),
            }
        }
    });
}

fn bar_chart(ui: &mut Ui, id: &str, summary: &ProportionSummary, colors: &ColorMap) {
    Plot::new(id)
        .legend(Legend::default())
        .y_axis_label("%")
        .include_y(0.0)
        .include_y(100.0)
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .height(260.0)
        .show(ui, |plot_ui| {
            for (i, p) in summary.entries.iter().enumerate() {
                let bar = Bar::new(i as f64, p.percent)
                    .name(&p.label)
                    .fill(colors.color_for(&p.label))
                    .width(0.6);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(&p.label));
            }
        });
}

fn pie_chart(ui: &mut Ui, summary: &ProportionSummary, colors: &ColorMap) {
    let side = ui.available_width().min(260.0);
    let (response, painter) = ui.allocate_painter(Vec2::splat(side), Sense::hover());
    let center = response.rect.center();
    let radius = side * 0.42;

    let mut start = -TAU / 4.0;
    for p in &summary.entries {
        let sweep = (p.percent / 100.0) as f32 * TAU;
        let fill = colors.color_for(&p.label);

        // Sectors are drawn in pieces of at most a quarter turn to stay convex.
        let pieces = (sweep / (TAU / 4.0)).ceil().max(1.0) as usize;
        for k in 0..pieces {
            let a0 = start + sweep * k as f32 / pieces as f32;
            let a1 = start + sweep * (k + 1) as f32 / pieces as f32;
            let mut points = vec![center];
            let steps = 16;
            for s in 0..=steps {
                let a = a0 + (a1 - a0) * s as f32 / steps as f32;
                points.push(center + radius * Vec2::angled(a));
            }
            painter.add(Shape::convex_polygon(points, fill, Stroke::NONE));
        }

        let mid = start + sweep / 2.0;
        let at: Pos2 = center + radius * 0.65 * Vec2::angled(mid);
        painter.text(
            at,
            Align2::CENTER_CENTER,
            format!("{}\n{:.2}%", p.label, p.percent),
            FontId::proportional(12.0),
            Color32::WHITE,
        );
        start += sweep;
    }
}
