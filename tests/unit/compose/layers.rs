use super::*;

fn solid(rgba: [u8; 4]) -> Arc<Raster> {
    Arc::new(Raster::filled(2, 1, rgba))
}

#[test]
fn one_layer_per_kind() {
    let mut m = LayerManager::new();
    assert!(m.is_empty());
    m.add(Layer::new(LayerKind::Text, solid([255, 0, 0, 255])))
        .unwrap();
    m.add(Layer::new(LayerKind::Text, solid([0, 255, 0, 255])))
        .unwrap();
    assert_eq!(m.len(), 1);
    assert_eq!(
        m.get(LayerKind::Text).unwrap().surface.pixel(0, 0),
        Some([0, 255, 0, 255])
    );
    assert!(m.remove(LayerKind::Text).is_some());
    assert!(m.get(LayerKind::Text).is_none());
}

#[test]
fn composite_orders_background_text_mask() {
    let mut m = LayerManager::new();
    // insertion order must not matter
    let mut text = Raster::new(2, 1);
    text.data[..4].copy_from_slice(&[255, 255, 255, 255]);
    m.add(Layer::new(LayerKind::Text, Arc::new(text))).unwrap();
    let mut mask = Raster::new(2, 1);
    mask.data[4..].copy_from_slice(&[0, 0, 0, 255]);
    m.add(Layer::new(LayerKind::Mask, Arc::new(mask))).unwrap();
    m.add(Layer::new(LayerKind::Background, solid([0, 0, 255, 255])))
        .unwrap();

    let mut target = Raster::filled(2, 1, [9, 9, 9, 255]);
    m.composite(&mut target).unwrap();
    assert_eq!(target.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(target.pixel(1, 0), Some([0, 0, 0, 0]), "cut out by mask");
}

#[test]
fn mask_ignores_blend_override() {
    let mut m = LayerManager::new();
    m.add(Layer::new(LayerKind::Background, solid([0, 0, 255, 255])))
        .unwrap();
    m.add(
        Layer::new(LayerKind::Mask, solid([0, 0, 0, 255])).with_blend_mode(BlendMode::Screen),
    )
    .unwrap();
    let mut target = Raster::new(2, 1);
    m.composite(&mut target).unwrap();
    assert_eq!(target.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn text_blend_override_applies() {
    let mut m = LayerManager::new();
    m.add(Layer::new(LayerKind::Background, solid([200, 200, 200, 255])))
        .unwrap();
    m.add(
        Layer::new(LayerKind::Text, solid([128, 128, 128, 255]))
            .with_blend_mode(BlendMode::Multiply),
    )
    .unwrap();
    let mut target = Raster::new(2, 1);
    m.composite(&mut target).unwrap();
    let px = target.pixel(0, 0).unwrap();
    assert!((i32::from(px[0]) - 100).abs() <= 2, "{px:?}");
}

#[test]
fn cutout_blend_is_reserved_for_masks() {
    let mut m = LayerManager::new();
    let err = m.add(
        Layer::new(LayerKind::Text, solid([0, 0, 0, 255]))
            .with_blend_mode(BlendMode::DestinationOut),
    );
    assert!(err.is_err());
}

#[test]
fn empty_stack_clears_target_and_size_mismatch_fails() {
    let m = LayerManager::new();
    let mut target = Raster::filled(2, 1, [1, 2, 3, 255]);
    m.composite(&mut target).unwrap();
    assert_eq!(target.pixel(0, 0), Some([0, 0, 0, 0]));

    let mut m = LayerManager::new();
    m.add(Layer::new(LayerKind::Background, Arc::new(Raster::new(3, 3))))
        .unwrap();
    assert!(m.composite(&mut target).is_err());
}

#[test]
fn add_files_each_layer_under_its_own_kind() {
    let mut m = LayerManager::new();
    m.add(
        Layer::new(LayerKind::Mask, solid([0, 0, 0, 255]))
            .with_blend_mode(BlendMode::DestinationOut),
    )
    .unwrap();
    m.add(Layer::new(LayerKind::Background, solid([1, 2, 3, 255])))
        .unwrap();
    assert_eq!(m.len(), 2);
    assert!(m.get(LayerKind::Text).is_none());
    assert_eq!(
        m.get(LayerKind::Mask).unwrap().blend_mode,
        Some(BlendMode::DestinationOut)
    );
    assert_eq!(
        m.get(LayerKind::Background).unwrap().surface.pixel(1, 0),
        Some([1, 2, 3, 255])
    );
}
