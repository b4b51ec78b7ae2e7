// egui control panel: depth text fields, scene selector and buffer stats.

use egui::epaint::Shadow;
use super::error::Result;
use super::input::{parse_depth, DepthSettings};
use super::scene::SceneKind;

/// Numbers shown under the depth fields.
pub struct PanelStats {
    pub vertex_count: usize,
    pub draw_count: usize,
    pub resolution: (u32, u32),
}

/// What the user changed in the panel this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelOutcome {
    pub depths_changed: bool,
    pub scene: SceneKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthField {
    TwoD,
    ThreeD,
}

/// Commit edited depth text to `depths`.
/// On a parse error the previous depth is kept and the error returned.
/// Ok(true) means the stored depth changed and the scene needs rebuilding.
pub fn commit_depth_text(depths: &mut DepthSettings, field: DepthField, text: &str) -> Result<bool> {
    let depth = parse_depth(text)?;
    Ok(match field {
        DepthField::TwoD => depths.set_2d(depth),
        DepthField::ThreeD => depths.set_3d(depth),
    })
}

/// Editable text backing the two depth fields.
struct PanelState {
    depth_2d_text: String,
    depth_3d_text: String,
    error: Option<String>,
}

impl PanelState {
    fn depth_row(
        &mut self,
        ui: &mut egui::Ui,
        depths: &mut DepthSettings,
        field: DepthField,
    ) -> bool {
        let (label, text) = match field {
            DepthField::TwoD => ("2D depth", &mut self.depth_2d_text),
            DepthField::ThreeD => ("3D depth", &mut self.depth_3d_text),
        };

        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label(label);
            let response = ui.add(egui::TextEdit::singleline(&mut *text).desired_width(40.0));
            if response.changed() {
                match commit_depth_text(depths, field, text.as_str()) {
                    Ok(c) => {
                        changed = c;
                        self.error = None;
                    }
                    Err(e) => {
                        log::warn!("{label}: {e}");
                        self.error = Some(e.to_string());
                    }
                }
            }
            // Show the clamped value once editing stops.
            if response.lost_focus() {
                *text = match field {
                    DepthField::TwoD => depths.depth_2d(),
                    DepthField::ThreeD => depths.depth_3d(),
                }
                .to_string();
            }
        });
        changed
    }
}

pub struct ControlPanel {
    pub visible: bool,
    state: PanelState,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl ControlPanel {
    pub fn new(
        window: &winit::window::Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        depths: &DepthSettings,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        // Light panel over the white clear colour
        let mut visuals = egui::Visuals::light();
        visuals.window_shadow = Shadow::NONE;
        egui_ctx.set_visuals(visuals);

        let mut style = (*egui_ctx.style()).clone();
        style.override_font_id = Some(egui::FontId::monospace(13.0));
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            None,  // no depth
            1,     // msaa samples
            false, // no dithering
        );

        Self {
            visible: true,
            state: PanelState {
                depth_2d_text: depths.depth_2d().to_string(),
                depth_3d_text: depths.depth_3d().to_string(),
                error: None,
            },
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Refresh the field text after depths changed elsewhere (keyboard shortcuts).
    pub fn sync_depths(&mut self, depths: &DepthSettings) {
        self.state.depth_2d_text = depths.depth_2d().to_string();
        self.state.depth_3d_text = depths.depth_3d().to_string();
        self.state.error = None;
    }

    /// Show `message` under the depth fields until the next edit or resync.
    pub fn show_error(&mut self, message: String) {
        self.state.error = Some(message);
    }

    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Run one egui frame and draw it on top of `view`.
    /// Depth edits are written into `depths`; pass a copy and adopt it only
    /// once the scene for it has been built.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &winit::window::Window,
        view: &wgpu::TextureView,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        depths: &mut DepthSettings,
        scene: SceneKind,
        stats: &PanelStats,
    ) -> PanelOutcome {
        let raw_input = self.egui_state.take_egui_input(window);
        let mut outcome = PanelOutcome { depths_changed: false, scene };
        let visible = self.visible;
        let state = &mut self.state;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if !visible {
                return;
            }
            egui::Area::new(egui::Id::new("control_panel"))
                .fixed_pos(egui::pos2(10.0, 10.0))
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .fill(egui::Color32::from_rgba_premultiplied(235, 235, 235, 230))
                        .inner_margin(egui::Margin::same(8.0))
                        .rounding(4.0)
                        .show(ui, |ui: &mut egui::Ui| {
                            ui.horizontal(|ui| {
                                ui.selectable_value(&mut outcome.scene, SceneKind::Gasket, "Gasket");
                                ui.selectable_value(&mut outcome.scene, SceneKind::Shapes, "Shapes");
                            });

                            if outcome.scene == SceneKind::Gasket {
                                outcome.depths_changed |= state.depth_row(ui, depths, DepthField::TwoD);
                                outcome.depths_changed |= state.depth_row(ui, depths, DepthField::ThreeD);
                                if let Some(error) = &state.error {
                                    ui.colored_label(egui::Color32::DARK_RED, error.as_str());
                                }
                            }

                            ui.separator();
                            ui.label(format!("Vertices: {}", stats.vertex_count));
                            ui.label(format!("Draw calls: {}", stats.draw_count));
                            ui.label(format!(
                                "Resolution: {} x {}",
                                stats.resolution.0, stats.resolution.1
                            ));
                            ui.small("Arrows: depth  Tab: scene  F1: panel");
                        });
                });
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::GasketError;

    #[test]
    fn valid_text_updates_the_selected_depth() {
        let mut depths = DepthSettings::new(4, 2, 8);
        assert_eq!(commit_depth_text(&mut depths, DepthField::ThreeD, "3"), Ok(true));
        assert_eq!(depths.depth_3d(), 3);
        assert_eq!(depths.depth_2d(), 4);
        assert_eq!(commit_depth_text(&mut depths, DepthField::ThreeD, "3"), Ok(false));
    }

    #[test]
    fn invalid_text_keeps_previous_depth() {
        let mut depths = DepthSettings::new(4, 2, 8);
        assert!(matches!(
            commit_depth_text(&mut depths, DepthField::TwoD, ""),
            Err(GasketError::UnparsableDepth { .. })
        ));
        assert_eq!(
            commit_depth_text(&mut depths, DepthField::TwoD, "-1"),
            Err(GasketError::InvalidDepth { depth: -1 })
        );
        assert_eq!(depths.depth_2d(), 4);
    }

    #[test]
    fn oversized_text_is_clamped() {
        let mut depths = DepthSettings::new(4, 2, 8);
        assert_eq!(commit_depth_text(&mut depths, DepthField::TwoD, "20"), Ok(true));
        assert_eq!(depths.depth_2d(), 8);
    }
}
