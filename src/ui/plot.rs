use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Before / after plot (central panel)
// ---------------------------------------------------------------------------

/// Render original and processed traces of the selected file.
pub fn comparison_plot(ui: &mut Ui, state: &AppState) {
    let Some((_, processed)) = state.current_preview() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Select files and press Process Files to preview the result");
        });
        return;
    };

    let original = &processed.original;
    let corrected = &processed.corrected;

    Plot::new("comparison_plot")
        .legend(Legend::default())
        .x_axis_label("Wavelength")
        .y_axis_label("Intensity")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let raw: PlotPoints = original
                .x
                .iter()
                .zip(&original.y)
                .map(|(&x, &y)| [x, y])
                .collect();
            plot_ui.line(Line::new(raw).name("Original").color(Color32::RED).width(1.5));

            let fixed: PlotPoints = corrected
                .x
                .iter()
                .zip(&corrected.y)
                .map(|(&x, &y)| [x, y])
                .collect();
            plot_ui.line(
                Line::new(fixed)
                    .name("Processed")
                    .color(Color32::from_rgb(30, 90, 220))
                    .width(1.5),
            );

            let spikes: PlotPoints = processed
                .spike_indices()
                .into_iter()
                .map(|i| [original.x[i], original.y[i]])
                .collect();
            plot_ui.points(
                Points::new(spikes)
                    .name(format!("Spikes ({})", processed.spike_count()))
                    .color(Color32::GOLD)
                    .radius(3.5),
            );
        });
}
