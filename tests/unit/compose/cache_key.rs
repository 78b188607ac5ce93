use std::sync::Arc;

use super::*;
use crate::render::raster::Raster;
use crate::style::presets::StylePreset;

fn basic() -> TextLayer {
    TextLayer {
        text: "Hello".to_owned(),
        style_preset: StylePreset::Neon,
        font_size: 48.0,
        transform: Transform::default(),
    }
}

fn advanced() -> AdvancedTextLayer {
    AdvancedTextLayer {
        text: "Hello\nWorld".to_owned(),
        font_family: "Impact".to_owned(),
        font_size: 48.0,
        line_spacing: 1.2,
        alignment: Alignment::Center,
        effects: TextEffects::default(),
        transform: Transform::default(),
    }
}

#[test]
fn identical_layers_share_a_key() {
    assert_eq!(text_layer_key(&basic()), text_layer_key(&basic()));
    assert_eq!(
        advanced_text_layer_key(&advanced()),
        advanced_text_layer_key(&advanced())
    );
}

#[test]
fn every_basic_field_changes_the_key() {
    let base = text_layer_key(&basic());
    let variants: Vec<Box<dyn Fn(&mut TextLayer)>> = vec![
        Box::new(|l| l.text.push('!')),
        Box::new(|l| l.style_preset = StylePreset::Brush),
        Box::new(|l| l.font_size = 49.0),
        Box::new(|l| l.transform.x = 0.4),
        Box::new(|l| l.transform.y = 0.4),
        Box::new(|l| l.transform.scale = 1.5),
        Box::new(|l| l.transform.rotation = 10.0),
    ];
    for (i, mutate) in variants.iter().enumerate() {
        let mut l = basic();
        mutate(&mut l);
        assert_ne!(text_layer_key(&l), base, "variant {i}");
    }
}

#[test]
fn every_advanced_field_changes_the_key() {
    let base = advanced_text_layer_key(&advanced());
    let variants: Vec<Box<dyn Fn(&mut AdvancedTextLayer)>> = vec![
        Box::new(|l| l.text = "Hello World".to_owned()),
        Box::new(|l| l.font_family = "Georgia".to_owned()),
        Box::new(|l| l.font_size = 47.5),
        Box::new(|l| l.line_spacing = 1.5),
        Box::new(|l| l.alignment = Alignment::Justify),
        Box::new(|l| l.effects.fill_color = Color::BLACK),
        Box::new(|l| l.effects.outline.enabled = true),
        Box::new(|l| l.effects.outline.width = 4.0),
        Box::new(|l| l.effects.gradient.enabled = true),
        Box::new(|l| l.effects.gradient.kind = GradientKind::Radial),
        Box::new(|l| l.effects.gradient.angle = 45.0),
        Box::new(|l| l.effects.gradient.stops[0].position = 0.2),
        Box::new(|l| l.effects.pattern.enabled = true),
        Box::new(|l| l.effects.pattern.scale = 0.5),
        Box::new(|l| l.effects.pattern.image = Some(Arc::new(Raster::new(2, 2)))),
        Box::new(|l| l.transform.rotation = 90.0),
    ];
    for (i, mutate) in variants.iter().enumerate() {
        let mut l = advanced();
        mutate(&mut l);
        assert_ne!(advanced_text_layer_key(&l), base, "variant {i}");
    }
}

#[test]
fn basic_and_advanced_keys_do_not_collide() {
    let b = basic();
    let a = AdvancedTextLayer {
        text: b.text.clone(),
        ..advanced()
    };
    assert_ne!(text_layer_key(&b), advanced_text_layer_key(&a));
}
