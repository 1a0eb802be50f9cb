/// Particle script loader.
///
/// Scripts are XML documents parsed by an external collaborator into a
/// [`ScriptNode`] tree. The loader walks that tree and fills a
/// [`ParticleSystemCreator`]:
///
/// ```text
/// <particle_system coord_related="false" life="-1">
///   <particle>
///     <size x="8" y="8"/>
///     <life min="1" max="2"/>
///     <speed min="40" max="60"/>
///     <force_affector acceleration_x="0" acceleration_y="-30"/>
///     <color_interval_affector>
///       <interval lived_time="0" color="1,1,1,1"/>
///       <interval lived_time="1" color="1,0,0,0"/>
///     </color_interval_affector>
///   </particle>
///   <box_emitter size_x="10" size_y="2" rate="20" angle_min="80" angle_max="100"/>
///   <material tex="spark.png" tex_filter="nearest" blend="add"/>
/// </particle_system>
/// ```
///
/// Affectors whose parameters are all zero are skipped, as is a color
/// affector fading to its own start color.

use glam::Vec2;
use crate::error::{Error, Result};
use crate::math::Color;
use crate::renderer::TextureFilter;
use super::affector::Affector;
use super::creator::{ParticleMaterialSetup, ParticleSystemCreator};
use super::emitter::Emitter;
use super::particle_system::ParticleSystemSetup;

const SOURCE: &str = "eri::ParticleScript";

/// One element of a parsed script document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<ScriptNode>,
}

impl ScriptNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: ScriptNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Children named `name`, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ScriptNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    // ===== Typed attributes =====

    fn f32_attr(&self, key: &str) -> Result<Option<f32>> {
        self.attr(key)
            .map(|value| {
                value.trim().parse::<f32>().map_err(|_| self.malformed(key, value))
            })
            .transpose()
    }

    /// Overwrite `target` when the attribute is present
    fn read_f32(&self, key: &str, target: &mut f32) -> Result<bool> {
        match self.f32_attr(key)? {
            Some(value) => {
                *target = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read_bool(&self, key: &str, target: &mut bool) -> Result<()> {
        if let Some(value) = self.attr(key) {
            *target = match value.trim() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(self.malformed(key, value)),
            };
        }
        Ok(())
    }

    /// `"r,g,b"` or `"r,g,b,a"` with components in [0, 1]
    fn read_color(&self, key: &str, target: &mut Color) -> Result<()> {
        let Some(value) = self.attr(key) else {
            return Ok(());
        };
        let parts = value
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|_| self.malformed(key, value))?;
        *target = match parts[..] {
            [r, g, b] => Color::new(r, g, b, 1.0),
            [r, g, b, a] => Color::new(r, g, b, a),
            _ => return Err(self.malformed(key, value)),
        };
        Ok(())
    }

    fn malformed(&self, key: &str, value: &str) -> Error {
        crate::engine_warn!(SOURCE, "Malformed attribute {}.{}='{}'", self.name, key, value);
        Error::Script(format!("malformed attribute {}.{}='{}'", self.name, key, value))
    }
}

/// Build a creator from a parsed script
///
/// `document` holds the top-level elements; `script_path` is the script's own
/// path, against whose directory the material texture is resolved. Fails
/// when the `particle_system` root or an emitter node is missing.
pub fn load_particle_script(document: &[ScriptNode], script_path: &str) -> Result<ParticleSystemCreator> {
    let Some(root) = document.iter().find(|node| node.name == "particle_system") else {
        crate::engine_warn!(SOURCE, "No particle_system node in '{}'", script_path);
        return Err(Error::Script(format!("no particle_system node in '{}'", script_path)));
    };

    let mut setup = ParticleSystemSetup::default();
    root.read_bool("coord_related", &mut setup.is_coord_relative)?;
    root.read_f32("life", &mut setup.custom_life)?;

    let mut emitter = None;
    let mut affectors = Vec::new();
    let mut material = ParticleMaterialSetup::default();

    for node in &root.children {
        match node.name.as_str() {
            "particle" => load_particle(node, &mut setup, &mut affectors)?,
            "box_emitter" => emitter = Some(load_box_emitter(node)?),
            "circle_emitter" => emitter = Some(load_circle_emitter(node)?),
            "material" => material = load_material(node, script_path)?,
            other => crate::engine_trace!(SOURCE, "Ignoring '{}' node", other),
        }
    }

    let Some(emitter) = emitter else {
        crate::engine_warn!(SOURCE, "No emitter in '{}'", script_path);
        return Err(Error::Script(format!("no emitter in '{}'", script_path)));
    };

    crate::engine_debug!(
        SOURCE,
        "Loaded '{}': {} affector(s), texture '{}'",
        script_path, affectors.len(), material.tex_path
    );

    let mut creator = ParticleSystemCreator::new(setup, emitter);
    creator.affectors = affectors;
    creator.material_setup = material;
    Ok(creator)
}

fn load_particle(node: &ScriptNode, setup: &mut ParticleSystemSetup, affectors: &mut Vec<Affector>) -> Result<()> {
    for child in &node.children {
        match child.name.as_str() {
            "size" => {
                child.read_f32("x", &mut setup.particle_size.x)?;
                child.read_f32("y", &mut setup.particle_size.y)?;
            }
            "life" => read_range(child, &mut setup.life_min, &mut setup.life_max)?,
            "speed" => read_range(child, &mut setup.speed_min, &mut setup.speed_max)?,
            "rotate" => read_range(child, &mut setup.rotate_min, &mut setup.rotate_max)?,
            "scale" => read_range(child, &mut setup.scale_min, &mut setup.scale_max)?,
            "rotate_affector" => {
                let (mut speed, mut acceleration) = (0.0, 0.0);
                child.read_f32("speed", &mut speed)?;
                child.read_f32("acceleration", &mut acceleration)?;
                if speed != 0.0 || acceleration != 0.0 {
                    affectors.push(with_period(child, Affector::rotate(speed, acceleration))?);
                }
            }
            "force_affector" => {
                let mut acceleration = Vec2::ZERO;
                child.read_f32("acceleration_x", &mut acceleration.x)?;
                child.read_f32("acceleration_y", &mut acceleration.y)?;
                if acceleration != Vec2::ZERO {
                    affectors.push(with_period(child, Affector::force(acceleration))?);
                }
            }
            "acceleration_affector" => {
                let mut acceleration = 0.0;
                child.read_f32("acceleration", &mut acceleration)?;
                if acceleration != 0.0 {
                    affectors.push(with_period(child, Affector::acceleration(acceleration))?);
                }
            }
            "scale_affector" => {
                let mut speed = Vec2::ZERO;
                child.read_f32("speed_x", &mut speed.x)?;
                child.read_f32("speed_y", &mut speed.y)?;
                if speed != Vec2::ZERO {
                    affectors.push(with_period(child, Affector::scale(speed))?);
                }
            }
            "color_affector" => {
                let (mut start, mut end) = (Color::WHITE, Color::WHITE);
                child.read_color("start", &mut start)?;
                child.read_color("end", &mut end)?;
                if start != end {
                    affectors.push(Affector::color(start, end));
                }
            }
            "color_interval_affector" => {
                let mut affector = Affector::color_interval();
                let mut has_interval = false;
                for interval in child.children_named("interval") {
                    let mut lived_time = 0.0;
                    let mut color = Color::WHITE;
                    interval.read_f32("lived_time", &mut lived_time)?;
                    interval.read_color("color", &mut color)?;
                    affector.add_interval(lived_time, color);
                    has_interval = true;
                }
                if has_interval {
                    affectors.push(affector);
                }
            }
            other => crate::engine_trace!(SOURCE, "Ignoring particle '{}' node", other),
        }
    }
    Ok(())
}

fn read_range(node: &ScriptNode, min: &mut f32, max: &mut f32) -> Result<()> {
    node.read_f32("min", min)?;
    node.read_f32("max", max)?;
    Ok(())
}

fn with_period(node: &ScriptNode, affector: Affector) -> Result<Affector> {
    Ok(match node.f32_attr("period")? {
        Some(period) => affector.with_period(period),
        None => affector,
    })
}

fn read_emit_params(node: &ScriptNode) -> Result<(f32, f32, f32)> {
    let (mut rate, mut angle_min, mut angle_max) = (1.0, 0.0, 0.0);
    node.read_f32("rate", &mut rate)?;
    node.read_f32("angle_min", &mut angle_min)?;
    node.read_f32("angle_max", &mut angle_max)?;
    Ok((rate, angle_min, angle_max))
}

fn load_box_emitter(node: &ScriptNode) -> Result<Emitter> {
    let mut size = Vec2::ZERO;
    node.read_f32("size_x", &mut size.x)?;
    node.read_f32("size_y", &mut size.y)?;
    let (rate, angle_min, angle_max) = read_emit_params(node)?;
    Ok(Emitter::new_box(size * 0.5, rate, angle_min, angle_max))
}

fn load_circle_emitter(node: &ScriptNode) -> Result<Emitter> {
    let mut radius = 1.0;
    node.read_f32("radius", &mut radius)?;
    let (rate, angle_min, angle_max) = read_emit_params(node)?;
    Ok(Emitter::new_circle(radius, rate, angle_min, angle_max))
}

fn load_material(node: &ScriptNode, script_path: &str) -> Result<ParticleMaterialSetup> {
    let mut material = ParticleMaterialSetup::default();

    if let Some(tex) = node.attr("tex").filter(|tex| !tex.is_empty()) {
        material.tex_path = resolve_relative(script_path, tex);
        if node.attr("tex_filter") == Some("nearest") {
            material.tex_filter = TextureFilter::Nearest;
        }
        node.read_f32("tex_u", &mut material.uv_start.x)?;
        node.read_f32("tex_v", &mut material.uv_start.y)?;
        node.read_f32("tex_w", &mut material.uv_size.x)?;
        node.read_f32("tex_h", &mut material.uv_size.y)?;
    }

    node.read_bool("depth_write", &mut material.depth_write)?;
    if node.attr("blend") == Some("add") {
        material.blend_add = true;
    }
    Ok(material)
}

/// `file` next to `script_path` (either separator)
fn resolve_relative(script_path: &str, file: &str) -> String {
    match script_path.rfind(['/', '\\']) {
        Some(at) => format!("{}/{}", &script_path[..at], file),
        None => file.to_string(),
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
