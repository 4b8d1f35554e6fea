//! Rendering of a single chart with its side buttons.

use egui::Ui;
use egui_plot::{Legend, Line, Plot};

use crate::data::layout::AxisLimits;
use crate::data::session::LiveChart;

/// What the user asked for while the chart was drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartAction {
    AddChannel,
    Edit,
    ResetZoom,
    Clear,
    Remove,
    /// The user panned or zoomed; new x and y ranges.
    ViewChanged { x: AxisLimits, y: AxisLimits },
}

const BUTTON_STRIP_WIDTH: f32 = 36.0;

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    (lo - pad, hi + pad)
}

/// Draw `chart` at the given height and collect requested actions.
pub fn render_chart(ui: &mut Ui, chart: &LiveChart, height: f32) -> Vec<ChartAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        let plot_width = (ui.available_width() - BUTTON_STRIP_WIDTH).max(100.0);
        ui.vertical(|ui| {
            ui.set_width(plot_width);
            if !chart.title.is_empty() {
                ui.vertical_centered(|ui| ui.strong(&chart.title));
            }
            if let Some(a) = render_plot(ui, chart, plot_width, height) {
                actions.push(a);
            }
        });

        ui.vertical(|ui| {
            use egui_phosphor::regular as icons;
            if ui.button(icons::PLUS).on_hover_text("Add channel").clicked() {
                actions.push(ChartAction::AddChannel);
            }
            if ui
                .button(icons::PENCIL_SIMPLE)
                .on_hover_text("Edit title, labels and lines")
                .clicked()
            {
                actions.push(ChartAction::Edit);
            }
            if ui
                .button(icons::ARROWS_COUNTER_CLOCKWISE)
                .on_hover_text("Reset zoom")
                .clicked()
            {
                actions.push(ChartAction::ResetZoom);
            }
            if ui.button(icons::BROOM).on_hover_text("Clear chart").clicked() {
                actions.push(ChartAction::Clear);
            }
            if ui.button(icons::TRASH).on_hover_text("Delete chart").clicked() {
                actions.push(ChartAction::Remove);
            }
        });
    });

    actions
}

fn render_plot(ui: &mut Ui, chart: &LiveChart, width: f32, height: f32) -> Option<ChartAction> {
    let data_bounds = chart.data_bounds();
    let x_limits = chart.x_limits;
    let y_limits = chart.y_limits;

    let plot = Plot::new(("chart", chart.id()))
        .width(width)
        .height(height)
        .legend(Legend::default())
        .show_grid(chart.grid_enabled)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone());

    let plot_resp = plot.show(ui, |plot_ui| {
        let resp = plot_ui.response();
        let scroll = resp.ctx.input(|i| i.smooth_scroll_delta);
        let zooming = resp.hovered() && (scroll.x != 0.0 || scroll.y != 0.0);
        let user_moved = resp.dragged() || resp.drag_stopped() || zooming;

        if !user_moved {
            match (x_limits, data_bounds) {
                (Some(l), _) => plot_ui.set_plot_bounds_x(l.min..=l.max),
                (None, Some((x0, x1, _, _))) => plot_ui.set_plot_bounds_x(x0..=x1),
                (None, None) => {}
            }
            match (y_limits, data_bounds) {
                (Some(l), _) => plot_ui.set_plot_bounds_y(l.min..=l.max),
                (None, Some((_, _, y0, y1))) => {
                    let (lo, hi) = padded(y0, y1);
                    plot_ui.set_plot_bounds_y(lo..=hi);
                }
                (None, None) => {}
            }
        }

        for line in chart.lines.iter().filter(|l| l.descriptor.visible) {
            plot_ui.line(
                Line::new(line.descriptor.label.clone(), line.points())
                    .color(line.descriptor.color32())
                    .width(1.5),
            );
        }

        user_moved
    });

    if !plot_resp.inner {
        return None;
    }
    let b = plot_resp.transform.bounds();
    let xr = b.range_x();
    let yr = b.range_y();
    let x = AxisLimits::new(*xr.start(), *xr.end());
    let y = AxisLimits::new(*yr.start(), *yr.end());
    (x.is_valid() && y.is_valid()).then_some(ChartAction::ViewChanged { x, y })
}
