use crate::{
    app::SnowflakeState,
    error::RenderError,
    koch::{Depth, Point, Snowflake},
};
use eframe::egui::{self, containers::*, *};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::{
    mem::{size_of, swap},
    sync::Arc,
};

const CENTER_COLOR: [f32; 3] = [0.7, 0.7, 1.0];
const EDGE_COLOR: [f32; 3] = [0.0, 0.0, 1.0];

/// Koch snowflake drawn as a gradient-filled triangle fan (`FILL`) or as a
/// plain line loop.
#[derive(Debug, Default)]
pub struct KochSnowFlake<const FILL: bool> {
    gl: OnceCell<Arc<Mutex<Context<FILL>>>>,
}

impl<const FILL: bool> super::View for KochSnowFlake<FILL> {
    fn name(&self) -> &'static str {
        if FILL {
            "Filled Snowflake"
        } else {
            "Outline Snowflake"
        }
    }

    fn ui(&mut self, ui: &mut Ui, state: &mut SnowflakeState) {
        let painter = Painter::new(
            ui.ctx().clone(),
            ui.layer_id(),
            ui.available_rect_before_wrap(),
        );
        let rect = painter.clip_rect();
        ui.expand_to_include_rect(rect);
        painter.rect_filled(rect, 0.0, Color32::WHITE);

        Frame::popup(ui.style())
            .stroke(Stroke::none())
            .show(ui, |ui| {
                ui.set_max_width(250.0);
                CollapsingHeader::new("Settings").show(ui, |ui| options_ui(ui, state));
            });

        let gl = match self.gl.get() {
            Some(gl) => gl.clone(),
            None => {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "OpenGL context unavailable",
                    TextStyle::Heading.resolve(ui.style()),
                    Color32::RED,
                );
                return;
            }
        };
        let snowflake = state.snowflake();
        let ratio = rect.height() / rect.width();
        let scale = state.config().scale();

        let callback = egui::PaintCallback {
            rect,
            callback: std::sync::Arc::new(move |_info, render_ctx| {
                if let Some(painter) = render_ctx.downcast_ref::<egui_glow::Painter>() {
                    gl.lock().paint(painter.gl(), &snowflake, ratio, scale);
                } else {
                    tracing::error!("Can't do custom painting because we are not using a glow context");
                }
            }),
        };
        painter.add(callback);
    }
}

impl<const FILL: bool> KochSnowFlake<FILL> {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let view = Self::default();
        match Context::new(&cc.gl) {
            Ok(context) => {
                let _ = view.gl.set(Arc::new(Mutex::new(context)));
            }
            Err(err) => tracing::error!(%err, "failed to set up snowflake renderer"),
        }
        view
    }
}

fn options_ui(ui: &mut Ui, state: &mut SnowflakeState) {
    let current = state.config().depth;
    ui.label(format!("Vertex count: {}", current.vertex_count()));
    ui.label("Keys 0-5 select depth, Esc quits");
    ui.horizontal(|ui| {
        let mut depth = current.get();
        ui.label("Depth :");
        ui.add(
            DragValue::new(&mut depth)
                .speed(1.0)
                .clamp_range(0..=Depth::MAX.get()),
        );
        if let Ok(depth) = Depth::new(depth) {
            state.set_depth(depth);
        }
        if ui.button("+").clicked() {
            state.step_depth(true);
        }
        if ui.button("-").clicked() {
            state.step_depth(false);
        }
    });
    if ui.button("reset").clicked() {
        state.set_depth(Depth::DEFAULT);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
struct Vertex {
    pos: [f32; 2],
    color: [f32; 3],
}

#[derive(Debug)]
struct Context<const FILL: bool> {
    program: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    count: i32,
    uploaded: Option<Arc<Snowflake>>,
}

const VERTEX_SHADER: &str = r#"
layout (location = 0) in vec2 in_pos;
layout (location = 1) in vec3 in_color;
uniform float uni_ratio;
uniform float uni_scale;
out vec3 v_color;
void main() {
    gl_Position = vec4(in_pos * uni_scale, 0.0, 1.0);
    gl_Position.x *= uni_ratio;
    v_color = in_color;
}
"#;

const FRAGMENT_SHADER: &str = r#"
precision mediump float;
in vec3 v_color;
out vec4 out_color;
void main() {
    out_color = vec4(v_color, 1.0);
}
"#;

impl<const FILL: bool> Context<FILL> {
    fn new(gl: &glow::Context) -> Result<Self, RenderError> {
        use glow::HasContext as _;

        let shader_version = if cfg!(target_arch = "wasm32") {
            // in/out
            "#version 300 es"
        } else {
            // location
            "#version 330"
        };

        unsafe {
            let program = gl.create_program()?;

            let shader_sources = [
                (glow::VERTEX_SHADER, VERTEX_SHADER),
                (glow::FRAGMENT_SHADER, FRAGMENT_SHADER),
            ];

            let mut shaders = Vec::with_capacity(shader_sources.len());
            for (shader_type, shader_source) in shader_sources {
                let shader = gl.create_shader(shader_type)?;
                gl.shader_source(shader, &format!("{}\n{}", shader_version, shader_source));
                gl.compile_shader(shader);
                if !gl.get_shader_compile_status(shader) {
                    return Err(RenderError::ShaderCompile(gl.get_shader_info_log(shader)));
                }
                gl.attach_shader(program, shader);
                shaders.push(shader);
            }

            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                return Err(RenderError::ProgramLink(gl.get_program_info_log(program)));
            }

            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }

            Ok(Self {
                program,
                vao: gl.create_vertex_array()?,
                vbo: gl.create_buffer()?,
                count: 0,
                uploaded: None,
            })
        }
    }

    fn mode() -> u32 {
        if FILL {
            glow::TRIANGLE_FAN
        } else {
            glow::LINE_LOOP
        }
    }

    /// Fan: origin followed by the closed outline, shaded center to edge.
    /// Loop: the outline without its closing duplicate.
    fn vertex_data(snowflake: &Snowflake) -> Vec<Vertex> {
        let edge = |p: &Point| Vertex {
            pos: p.to_f32(),
            color: EDGE_COLOR,
        };
        if FILL {
            let fan = snowflake.fan_vertices(Point::default());
            let mut vertices = Vec::with_capacity(fan.len());
            vertices.push(Vertex {
                pos: fan[0].to_f32(),
                color: CENTER_COLOR,
            });
            vertices.extend(fan[1..].iter().map(edge));
            vertices
        } else {
            snowflake.vertices().iter().map(edge).collect()
        }
    }

    unsafe fn update_vertices(&mut self, gl: &glow::Context, snowflake: &Arc<Snowflake>) {
        use glow::HasContext as _;

        let mut vao = match gl.create_vertex_array() {
            Ok(vao) => vao,
            Err(err) => {
                tracing::error!(%err, "failed to create vertex array");
                return;
            }
        };
        let mut vbo = match gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(err) => {
                tracing::error!(%err, "failed to create vertex buffer");
                gl.delete_vertex_array(vao);
                return;
            }
        };

        let vertices = Self::vertex_data(snowflake);
        let verts_slice = std::slice::from_raw_parts(
            vertices.as_ptr() as *const u8,
            vertices.len() * size_of::<Vertex>(),
        );

        gl.bind_vertex_array(Some(vao));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, verts_slice, glow::DYNAMIC_DRAW);

        let stride = size_of::<Vertex>() as i32;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(
            1,
            3,
            glow::FLOAT,
            false,
            stride,
            2 * size_of::<f32>() as i32,
        );
        swap(&mut self.vao, &mut vao);
        swap(&mut self.vbo, &mut vbo);
        gl.delete_vertex_array(vao);
        gl.delete_buffer(vbo);

        self.count = vertices.len() as i32;
        self.uploaded = Some(snowflake.clone());
        tracing::debug!(
            depth = snowflake.depth().get(),
            count = self.count,
            "uploaded snowflake vertices"
        );
    }

    fn paint(&mut self, gl: &glow::Context, snowflake: &Arc<Snowflake>, ratio: f32, scale: f32) {
        use glow::HasContext as _;
        let stale = match &self.uploaded {
            Some(uploaded) => !Arc::ptr_eq(uploaded, snowflake),
            None => true,
        };
        if stale {
            unsafe { self.update_vertices(gl, snowflake) };
        }
        unsafe {
            gl.use_program(Some(self.program));
            gl.bind_vertex_array(Some(self.vao));
            gl.uniform_1_f32(
                gl.get_uniform_location(self.program, "uni_ratio").as_ref(),
                ratio,
            );
            gl.uniform_1_f32(
                gl.get_uniform_location(self.program, "uni_scale").as_ref(),
                scale,
            );
            gl.draw_arrays(Self::mode(), 0, self.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snowflake(depth: u32) -> Snowflake {
        Snowflake::new(Depth::new(depth).unwrap(), 0.9)
    }

    #[test]
    fn fan_has_center_and_closed_outline() {
        let snowflake = snowflake(2);
        let data = Context::<true>::vertex_data(&snowflake);
        assert_eq!(data.len(), snowflake.vertex_count() + 2);
        assert_eq!(data[0].pos, [0.0, 0.0]);
        assert_eq!(data[0].color, CENTER_COLOR);
        assert_eq!(data[1].pos, data[data.len() - 1].pos);
        assert!(data[1..].iter().all(|v| v.color == EDGE_COLOR));
    }

    #[test]
    fn loop_skips_closing_vertex() {
        let snowflake = snowflake(3);
        let data = Context::<false>::vertex_data(&snowflake);
        assert_eq!(data.len(), 3 * 4usize.pow(3));
        assert_ne!(data[0].pos, data[data.len() - 1].pos);
    }

    #[test]
    fn draw_modes() {
        assert_eq!(Context::<true>::mode(), glow::TRIANGLE_FAN);
        assert_eq!(Context::<false>::mode(), glow::LINE_LOOP);
    }
}
