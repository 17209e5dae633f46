use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use spark_remove::data::model::{MIN_THRESHOLD, MIN_WINDOW_SIZE};

use crate::state::AppState;

/// Spin-box caps; the library itself only enforces the lower bounds.
const MAX_WINDOW_SIZE: usize = 100;
const MAX_THRESHOLD: f64 = 10.0;

// ---------------------------------------------------------------------------
// Left side panel – files, parameters, status
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Files");
    ui.separator();

    if state.file_paths.is_empty() {
        ui.label("No files selected.");
    } else {
        ScrollArea::vertical()
            .id_salt("file_list")
            .max_height(180.0)
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                for path in &state.file_paths {
                    ui.label(path.display().to_string());
                }
            });
    }
    ui.add_space(6.0);

    // ---- Parameters ----
    ui.strong("Parameters");
    egui::Grid::new("params").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Window Size:");
        ui.add(
            egui::DragValue::new(&mut state.params.window_size)
                .range(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE),
        );
        ui.end_row();

        ui.label("Threshold Multiplier:");
        ui.add(
            egui::DragValue::new(&mut state.params.threshold_multiplier)
                .range(MIN_THRESHOLD..=MAX_THRESHOLD)
                .speed(0.1),
        );
        ui.end_row();
    });
    ui.checkbox(&mut state.options.render_plot, "Save comparison chart");
    ui.add_space(6.0);

    // ---- Actions ----
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Select Files").clicked() {
            open_file_dialog(state);
        }
        if ui.button("Clear List").clicked() {
            state.clear();
        }
        let can_run = !state.file_paths.is_empty();
        if ui
            .add_enabled(can_run, egui::Button::new("Process Files"))
            .clicked()
        {
            state.process();
        }
    });
    ui.separator();

    // ---- Status ----
    ui.strong("Status");
    ScrollArea::vertical()
        .id_salt("status_list")
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui: &mut Ui| {
            for line in &state.status_lines {
                let mut text = RichText::new(&line.text);
                if line.failed {
                    text = text.color(Color32::RED);
                }
                ui.label(text);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Select Files…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Clear List").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("{} file(s) queued", state.file_paths.len()));

        if !state.previews.is_empty() {
            ui.separator();
            let current = state.selected_preview;
            let selected_text = state
                .current_preview()
                .map(|(path, _)| file_name(path))
                .unwrap_or_default();
            egui::ComboBox::from_id_salt("preview")
                .selected_text(selected_text)
                .show_ui(ui, |ui: &mut Ui| {
                    for (i, (path, _)) in state.previews.iter().enumerate() {
                        if ui.selectable_label(current == i, file_name(path)).clicked() {
                            state.selected_preview = i;
                        }
                    }
                });
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Select Data Files")
        .add_filter("Data Files", &["csv", "asc"])
        .add_filter("CSV Files", &["csv"])
        .add_filter("ASC Files", &["asc"])
        .pick_files();

    if let Some(files) = files {
        if !files.is_empty() {
            state.set_files(files);
        }
    }
}
