//! UI panel builders.
//!
//! Each section edits a parameter struct in place and reports what changed;
//! a resolution change is reported separately since it reallocates the grid.

use egui::{Checkbox, CollapsingHeader, ComboBox, Context, DragValue, SidePanel, Slider, Ui};
use isosurface_core::colormap::COLORMAP_NAMES;
use isosurface_core::metaball::MAX_METABALLS;
use isosurface_core::{
    ColoringParams, ColormapAxis, ImplicitSurface, LightingParams, MetaballParams, SurfaceParams,
};

/// What a panel edit touched this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamsResponse {
    /// The grid resolution was edited.
    pub resolution_changed: bool,
    /// Any parameter was edited, including the resolution.
    pub changed: bool,
}

impl ParamsResponse {
    fn changed(changed: bool) -> Self {
        Self {
            resolution_changed: false,
            changed,
        }
    }

    fn merge(&mut self, other: Self) {
        self.resolution_changed |= other.resolution_changed;
        self.changed |= other.changed;
    }
}

/// Builds the main left panel.
pub fn build_left_panel(ctx: &Context, title: &str, build_contents: impl FnOnce(&mut Ui)) {
    SidePanel::left("isosurface_main_panel")
        .default_width(305.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading(title);
            ui.separator();
            build_contents(ui);
        });
}

fn resolution_slider(ui: &mut Ui, resolution: &mut u32, max: u32, step: u32) -> ParamsResponse {
    let changed = ui
        .add(
            Slider::new(resolution, 8..=max)
                .step_by(f64::from(step))
                .text("Resolution"),
        )
        .changed();
    ParamsResponse {
        resolution_changed: changed,
        changed,
    }
}

/// Surface selection, grid and animation controls of the implicit viewer.
pub fn build_surface_section(ui: &mut Ui, params: &mut SurfaceParams) -> ParamsResponse {
    let mut response = ParamsResponse::default();

    CollapsingHeader::new("Surface")
        .default_open(true)
        .show(ui, |ui| {
            ComboBox::from_label("Surface type")
                .selected_text(params.surface.name())
                .show_ui(ui, |ui| {
                    for surface in ImplicitSurface::ALL {
                        if ui
                            .selectable_value(&mut params.surface, surface, surface.name())
                            .changed()
                        {
                            response.changed = true;
                        }
                    }
                });

            response.merge(resolution_slider(ui, &mut params.resolution, 152, 8));

            let edited = ui
                .add(Slider::new(&mut params.scale, 0.1..=5.0).step_by(0.1).text("Scale"))
                .changed()
                | ui
                    .add(Slider::new(&mut params.isolevel, 0.0..=2.0).step_by(0.01).text("Isolevel"))
                    .changed()
                | ui
                    .add(Slider::new(&mut params.animate_speed, 0.0..=5.0).step_by(0.1).text("Animate speed"))
                    .changed()
                | ui
                    .add(Slider::new(&mut params.rotation_speed, 0.0..=5.0).step_by(0.1).text("Rotation speed"))
                    .changed();
            response.changed |= edited;

            ui.label(format!("Domain half-extent: {:.2}", params.half_extent()));
        });

    response
}

/// Ball count, grid and simulation controls of the metaball viewer.
pub fn build_metaball_section(ui: &mut Ui, params: &mut MetaballParams) -> ParamsResponse {
    let mut response = ParamsResponse::default();

    CollapsingHeader::new("Metaballs")
        .default_open(true)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Count:");
                if ui
                    .add(DragValue::new(&mut params.metaball_count).range(1..=MAX_METABALLS))
                    .changed()
                {
                    response.changed = true;
                }
            });

            response.merge(resolution_slider(ui, &mut params.resolution, 156, 4));

            let edited = ui
                .add(Slider::new(&mut params.scale, 0.1..=2.0).step_by(0.1).text("Scale"))
                .changed()
                | ui
                    .add(Slider::new(&mut params.isolevel, 0.1..=50.0).step_by(0.1).text("Isolevel"))
                    .changed()
                | ui
                    .add(Slider::new(&mut params.animate_speed, 0.0..=5.0).step_by(0.1).text("Animate speed"))
                    .changed();
            response.changed |= edited;
        });

    response
}

/// Colormap, axis and reverse flag.
pub fn build_coloring_section(ui: &mut Ui, coloring: &mut ColoringParams) -> ParamsResponse {
    let mut changed = false;

    CollapsingHeader::new("Coloring")
        .default_open(true)
        .show(ui, |ui| {
            ComboBox::from_label("Colormap")
                .selected_text(coloring.colormap.as_str())
                .show_ui(ui, |ui| {
                    for name in COLORMAP_NAMES {
                        if ui
                            .selectable_label(coloring.colormap == name, name)
                            .clicked()
                            && coloring.colormap != name
                        {
                            coloring.colormap = name.to_string();
                            changed = true;
                        }
                    }
                });

            ComboBox::from_label("Direction")
                .selected_text(coloring.axis.name())
                .show_ui(ui, |ui| {
                    for axis in ColormapAxis::ALL {
                        if ui
                            .selectable_value(&mut coloring.axis, axis, axis.name())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });

            if ui
                .add(Checkbox::new(&mut coloring.reverse, "Reverse"))
                .changed()
            {
                changed = true;
            }
        });

    ParamsResponse::changed(changed)
}

/// Blinn-Phong material controls.
pub fn build_lighting_section(ui: &mut Ui, lighting: &mut LightingParams) -> ParamsResponse {
    let mut changed = false;

    CollapsingHeader::new("Lighting")
        .default_open(false)
        .show(ui, |ui| {
            changed |= ui
                .add(Slider::new(&mut lighting.ambient, 0.0..=1.0).step_by(0.02).text("Ambient"))
                .changed();
            changed |= ui
                .add(Slider::new(&mut lighting.diffuse, 0.0..=1.0).step_by(0.02).text("Diffuse"))
                .changed();
            changed |= ui
                .add(Slider::new(&mut lighting.specular, 0.0..=1.0).step_by(0.02).text("Specular"))
                .changed();
            changed |= ui
                .add(Slider::new(&mut lighting.shininess, 0.0..=300.0).step_by(1.0).text("Shininess"))
                .changed();

            ui.horizontal(|ui| {
                ui.label("Specular color:");
                let mut rgb = lighting.specular_color.to_array();
                if ui.color_edit_button_rgb(&mut rgb).changed() {
                    lighting.specular_color = rgb.into();
                    changed = true;
                }
            });
        });

    ParamsResponse::changed(changed)
}

/// The whole control panel of the implicit-surface viewer.
pub fn surface_panel(ctx: &Context, params: &mut SurfaceParams) -> ParamsResponse {
    let mut response = ParamsResponse::default();
    build_left_panel(ctx, "Implicit surface", |ui| {
        response.merge(build_surface_section(ui, params));
        response.merge(build_coloring_section(ui, &mut params.coloring));
        response.merge(build_lighting_section(ui, &mut params.lighting));
    });
    response
}

/// The whole control panel of the metaball viewer.
pub fn metaball_panel(ctx: &Context, params: &mut MetaballParams) -> ParamsResponse {
    let mut response = ParamsResponse::default();
    build_left_panel(ctx, "Metaballs", |ui| {
        response.merge(build_metaball_section(ui, params));
        response.merge(build_coloring_section(ui, &mut params.coloring));
        response.merge(build_lighting_section(ui, &mut params.lighting));
    });
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_once(build: impl FnMut(&Context)) {
        let ctx = Context::default();
        let _ = ctx.run(egui::RawInput::default(), build);
    }

    #[test]
    fn test_surface_panel_without_input_changes_nothing() {
        let mut params = SurfaceParams::default();
        let before = params.clone();
        let mut response = None;
        run_once(|ctx| response = Some(surface_panel(ctx, &mut params)));
        assert_eq!(response, Some(ParamsResponse::default()));
        assert_eq!(params, before);
    }

    #[test]
    fn test_metaball_panel_without_input_changes_nothing() {
        let mut params = MetaballParams::default();
        let mut response = None;
        run_once(|ctx| response = Some(metaball_panel(ctx, &mut params)));
        assert_eq!(response, Some(ParamsResponse::default()));
        assert_eq!(params.resolution, 96);
    }

    #[test]
    fn test_merge_keeps_resolution_flag() {
        let mut response = ParamsResponse::changed(true);
        response.merge(ParamsResponse {
            resolution_changed: true,
            changed: true,
        });
        assert!(response.resolution_changed && response.changed);
    }
}
