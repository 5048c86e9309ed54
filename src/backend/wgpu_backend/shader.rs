//! Scene shader: Phong lighting from one point light plus an ambient term,
//! shading either a sampled texture or a flat object color.

pub const SCENE_SHADER: &str = r#"
struct DrawUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    view_position: vec4<f32>,
    object_color: vec4<f32>,
    light_position: vec4<f32>,
    light_color: vec4<f32>,
    ambient_light: vec4<f32>,
    material_ambient: vec4<f32>,
    material_diffuse: vec4<f32>,
    material_specular: vec4<f32>,
    uv_scale: vec2<f32>,
    use_texture: u32,
    use_material: u32,
};

@group(0) @binding(0) var<uniform> draw: DrawUniforms;
@group(1) @binding(0) var object_texture: texture_2d<f32>;
@group(1) @binding(1) var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = draw.model * vec4<f32>(input.position, 1.0);
    out.world_position = world.xyz;
    out.normal = (draw.normal_matrix * vec4<f32>(input.normal, 0.0)).xyz;
    out.uv = input.uv * draw.uv_scale;
    out.clip_position = draw.projection * draw.view * world;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let sampled = textureSample(object_texture, object_sampler, input.uv);
    let base = select(draw.object_color, sampled, draw.use_texture != 0u);

    var ambient_color = draw.ambient_light.rgb;
    var ambient_strength = draw.ambient_light.w;
    var diffuse_color = vec3<f32>(1.0);
    var specular_color = vec3<f32>(0.5);
    var shininess = 32.0;
    if (draw.use_material != 0u) {
        ambient_color = draw.material_ambient.rgb * draw.ambient_light.rgb;
        ambient_strength = draw.material_ambient.w * draw.ambient_light.w;
        diffuse_color = draw.material_diffuse.rgb;
        specular_color = draw.material_specular.rgb;
        shininess = max(draw.material_specular.w, 1.0);
    }

    let n = normalize(input.normal);
    let light_dir = normalize(draw.light_position.xyz - input.world_position);
    let view_dir = normalize(draw.view_position.xyz - input.world_position);
    let reflect_dir = reflect(-light_dir, n);
    let light = draw.light_color.rgb * draw.light_color.w;

    let ambient = ambient_strength * ambient_color;
    let diffuse = max(dot(n, light_dir), 0.0) * diffuse_color * light;
    let specular = pow(max(dot(view_dir, reflect_dir), 0.0), shininess) * specular_color * light;

    return vec4<f32>((ambient + diffuse + specular) * base.rgb, base.a);
}
"#;
