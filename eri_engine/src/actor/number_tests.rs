use std::sync::Arc;
use glam::Vec2;
use crate::renderer::{TextureFilter, VertexData};
use crate::resource::{Texture, TextureId};
use crate::scene::{ActorKind, SceneNode};
use super::*;

fn number_node(force_sign: bool) -> SceneNode {
    let mut node = SceneNode::new(ActorKind::Number(Number::new(Vec2::new(10.0, 20.0), force_sign)));
    let atlas = Arc::new(Texture::new(TextureId(7), 130, 20, false));
    node.assign_material(Some(atlas), TextureFilter::Nearest, TextureFilter::Nearest, 0);
    node.set_digit_tex_unit(10, 20);
    node
}

fn first_u_per_glyph(node: &SceneNode) -> Vec<f32> {
    match &node.render_data().vertices {
        VertexData::PosTex(v) => v.chunks(6).map(|g| g[0].tex_coord[0]).collect(),
        _ => panic!("number geometry must be PosTex"),
    }
}

#[test]
fn test_nothing_built_before_value() {
    let node = number_node(false);
    assert_eq!(node.render_data().vertex_count, 0);
    assert_eq!(node.number().unwrap().text(), "");
}

#[test]
fn test_text_formats() {
    let mut node = number_node(false);
    node.set_number(-42);
    assert_eq!(node.number().unwrap().text(), "-42");
    node.set_number_float(3.14159);
    assert_eq!(node.number().unwrap().text(), "3.14");

    let mut signed = number_node(true);
    signed.set_number(7);
    assert_eq!(signed.number().unwrap().text(), "+7");
    signed.set_number(0);
    assert_eq!(signed.number().unwrap().text(), "0");
    signed.set_number_float(1.5);
    assert_eq!(signed.number().unwrap().text(), "+1.50");
}

#[test]
fn test_six_vertices_per_glyph() {
    let mut node = number_node(false);
    node.set_number(1234);
    assert_eq!(node.render_data().vertex_count, 24);
}

#[test]
fn test_glyph_cells() {
    let mut node = number_node(true);
    node.set_number_float(-0.5);
    // "-0.50" -> cells 11, 0, 12, 5, 0
    let unit = 10.0 / 130.0;
    let expected: Vec<f32> = [11.0, 0.0, 12.0, 5.0, 0.0].iter().map(|c| c * unit).collect();
    let got = first_u_per_glyph(&node);
    assert_eq!(got.len(), expected.len());
    for (g, e) in got.iter().zip(&expected) {
        assert!((g - e).abs() < 1e-6);
    }
}

#[test]
fn test_row_is_centred_with_spacing() {
    let mut node = number_node(false);
    node.set_spacing(2.0);
    node.set_number(55);

    let VertexData::PosTex(v) = &node.render_data().vertices else { unreachable!() };
    // centres at -6 and +6, glyph half width 5
    assert_eq!(v[0].position[0], -11.0);
    assert_eq!(v[11].position[0], 11.0);
}

#[test]
fn test_hit_area_tracks_glyph_count() {
    let mut node = number_node(false);
    node.set_number(7);
    assert!(node.is_in_area(Vec2::new(4.0, 0.0)));
    assert!(!node.is_in_area(Vec2::new(12.0, 0.0)));

    node.set_number(777);
    assert!(node.is_in_area(Vec2::new(12.0, 0.0)));
    assert!(!node.is_in_area(Vec2::new(0.0, 11.0)));
}

#[test]
fn test_non_finite_values_keep_only_atlas_glyphs() {
    let mut node = number_node(false);
    node.set_number_float(f32::NAN);
    assert_eq!(node.number().unwrap().text(), "NaN");
    assert_eq!(node.render_data().vertex_count, 0);

    node.set_number_float(f32::NEG_INFINITY);
    assert_eq!(node.render_data().vertex_count, 6);
    let u = first_u_per_glyph(&node);
    assert!((u[0] - 11.0 * 10.0 / 130.0).abs() < 1e-6);
}
