use js_sys::Float32Array;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject, WebglLoseContext,
};

use crate::bodies::DecorativeBody;
use crate::config::Rgb;
use crate::error::{Result, SceneError};
use crate::particles::ParticleField;
use crate::scene::{FrameView, Rasterizer};
use crate::viewport::ViewportState;

const POINTS_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
uniform mat4 u_view_projection;
uniform mat4 u_model;
uniform float u_size;
uniform float u_scale;
out vec3 v_color;
void main() {
    gl_Position = u_view_projection * u_model * vec4(a_position, 1.0);
    // size attenuation: world-space size shrinks with depth
    gl_PointSize = u_size * u_scale / gl_Position.w;
    v_color = a_color;
}
"#;

const POINTS_FS: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
out vec4 out_color;
void main() {
    vec2 c = gl_PointCoord - vec2(0.5);
    if (dot(c, c) > 0.25) discard;
    out_color = vec4(v_color, 0.8);
}
"#;

const LINES_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
uniform mat4 u_view_projection;
uniform mat4 u_model;
void main() {
    gl_Position = u_view_projection * u_model * vec4(a_position, 1.0);
}
"#;

const LINES_FS: &str = r#"#version 300 es
precision mediump float;
uniform vec3 u_color;
out vec4 out_color;
void main() {
    out_color = vec4(u_color, 0.6);
}
"#;

struct PointsPass {
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    positions: WebGlBuffer,
    colors: WebGlBuffer,
    count: i32,
    u_view_projection: Option<WebGlUniformLocation>,
    u_model: Option<WebGlUniformLocation>,
    u_size: Option<WebGlUniformLocation>,
    u_scale: Option<WebGlUniformLocation>,
}

struct LineMesh {
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    count: i32,
}

struct LinesPass {
    program: WebGlProgram,
    meshes: Vec<LineMesh>,
    u_view_projection: Option<WebGlUniformLocation>,
    u_model: Option<WebGlUniformLocation>,
    u_color: Option<WebGlUniformLocation>,
}

/// WebGL2 backend: one point cloud draw plus one `LINES` draw per body.
pub struct WebGlRasterizer {
    gl: GL,
    canvas: HtmlCanvasElement,
    points: PointsPass,
    lines: LinesPass,
    particle_size: f32,
    buffer_size: (u32, u32),
}

impl WebGlRasterizer {
    pub fn new(
        gl: GL,
        canvas: HtmlCanvasElement,
        particles: &ParticleField,
        bodies: &[DecorativeBody],
        particle_size: f32,
    ) -> Result<Self> {
        let points = build_points(&gl, particles)?;
        let lines = build_lines(&gl, bodies)?;

        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        let buffer_size = (canvas.width(), canvas.height());
        Ok(Self {
            gl,
            canvas,
            points,
            lines,
            particle_size,
            buffer_size,
        })
    }
}

impl Rasterizer for WebGlRasterizer {
    fn resize(&mut self, viewport: &ViewportState) {
        let (w, h) = viewport.drawing_buffer();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.buffer_size = (w, h);
    }

    fn upload_particle_colors(&mut self, colors: &[Rgb]) {
        let flat: Vec<f32> = colors.iter().flatten().copied().collect();
        let data = Float32Array::from(flat.as_slice());
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.points.colors));
        self.gl
            .buffer_sub_data_with_i32_and_array_buffer_view(GL::ARRAY_BUFFER, 0, &data);
        self.gl.bind_buffer(GL::ARRAY_BUFFER, None);
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<()> {
        let gl = &self.gl;
        if gl.is_context_lost() {
            return Err(SceneError::Unsupported("WebGL context lost".into()));
        }

        let (w, h) = self.buffer_size;
        gl.viewport(0, 0, w as i32, h as i32);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        let view_projection = frame.view_projection.to_cols_array();

        let lines = &self.lines;
        gl.use_program(Some(&lines.program));
        gl.uniform_matrix4fv_with_f32_array(lines.u_view_projection.as_ref(), false, &view_projection);
        gl.uniform3fv_with_f32_array(lines.u_color.as_ref(), &frame.body_color);
        for body in frame.bodies {
            let Some(mesh) = lines.meshes.get(body.index) else {
                continue;
            };
            gl.uniform_matrix4fv_with_f32_array(
                lines.u_model.as_ref(),
                false,
                &body.model_matrix().to_cols_array(),
            );
            gl.bind_vertex_array(Some(&mesh.vao));
            gl.draw_arrays(GL::LINES, 0, mesh.count);
        }

        let points = &self.points;
        gl.use_program(Some(&points.program));
        gl.uniform_matrix4fv_with_f32_array(points.u_view_projection.as_ref(), false, &view_projection);
        gl.uniform_matrix4fv_with_f32_array(
            points.u_model.as_ref(),
            false,
            &frame.particle_model.to_cols_array(),
        );
        gl.uniform1f(points.u_size.as_ref(), self.particle_size);
        gl.uniform1f(points.u_scale.as_ref(), h as f32 * 0.5);
        gl.bind_vertex_array(Some(&points.vao));
        gl.draw_arrays(GL::POINTS, 0, points.count);

        gl.bind_vertex_array(None);
        Ok(())
    }

    fn release(&mut self) {
        let gl = &self.gl;
        gl.delete_vertex_array(Some(&self.points.vao));
        gl.delete_buffer(Some(&self.points.positions));
        gl.delete_buffer(Some(&self.points.colors));
        gl.delete_program(Some(&self.points.program));
        for mesh in self.lines.meshes.drain(..) {
            gl.delete_vertex_array(Some(&mesh.vao));
            gl.delete_buffer(Some(&mesh.buffer));
        }
        gl.delete_program(Some(&self.lines.program));

        if let Ok(Some(ext)) = gl.get_extension("WEBGL_lose_context") {
            ext.unchecked_into::<WebglLoseContext>().lose_context();
        }
    }
}

fn build_points(gl: &GL, particles: &ParticleField) -> Result<PointsPass> {
    let program = link_program(gl, POINTS_VS, POINTS_FS)?;
    let vao = gl.create_vertex_array().ok_or(SceneError::Buffer("vertex array"))?;
    gl.bind_vertex_array(Some(&vao));

    let flat: Vec<f32> = particles.positions().iter().flatten().copied().collect();
    let positions = upload_attribute(gl, 0, &flat, GL::STATIC_DRAW)?;
    let flat: Vec<f32> = particles.colors().iter().flatten().copied().collect();
    let colors = upload_attribute(gl, 1, &flat, GL::DYNAMIC_DRAW)?;
    gl.bind_vertex_array(None);

    Ok(PointsPass {
        u_view_projection: gl.get_uniform_location(&program, "u_view_projection"),
        u_model: gl.get_uniform_location(&program, "u_model"),
        u_size: gl.get_uniform_location(&program, "u_size"),
        u_scale: gl.get_uniform_location(&program, "u_scale"),
        program,
        vao,
        positions,
        colors,
        count: particles.len() as i32,
    })
}

fn build_lines(gl: &GL, bodies: &[DecorativeBody]) -> Result<LinesPass> {
    let program = link_program(gl, LINES_VS, LINES_FS)?;
    let mut meshes = Vec::with_capacity(bodies.len());
    for body in bodies {
        let vao = gl.create_vertex_array().ok_or(SceneError::Buffer("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));
        let verts = body.shape.line_vertices();
        let buffer = upload_attribute(gl, 0, &verts, GL::STATIC_DRAW)?;
        meshes.push(LineMesh {
            vao,
            buffer,
            count: (verts.len() / 3) as i32,
        });
    }
    gl.bind_vertex_array(None);

    Ok(LinesPass {
        u_view_projection: gl.get_uniform_location(&program, "u_view_projection"),
        u_model: gl.get_uniform_location(&program, "u_model"),
        u_color: gl.get_uniform_location(&program, "u_color"),
        program,
        meshes,
    })
}

/// Create a buffer of `vec3`s bound to attribute `location` of the current VAO.
fn upload_attribute(gl: &GL, location: u32, data: &[f32], usage: u32) -> Result<WebGlBuffer> {
    let buffer = gl.create_buffer().ok_or(SceneError::Buffer("buffer"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(data), usage);
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, 3, GL::FLOAT, false, 0, 0);
    Ok(buffer)
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl.create_shader(kind).ok_or(SceneError::Buffer("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(SceneError::Shader(log))
    }
}

fn link_program(gl: &GL, vs: &str, fs: &str) -> Result<WebGlProgram> {
    let vs = compile_shader(gl, GL::VERTEX_SHADER, vs)?;
    let fs = compile_shader(gl, GL::FRAGMENT_SHADER, fs)?;
    let program = gl.create_program().ok_or(SceneError::Buffer("program"))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    // Shaders are no longer needed once linked.
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(SceneError::Program(log))
    }
}
