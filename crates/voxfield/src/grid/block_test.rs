use super::*;

const BG: f32 = 1.5;

#[test]
fn dense_filled_reads_back() {
  let block = VoxelBlock::dense_filled(0.25);
  for idx in 0..BLOCK_VOLUME {
    assert_eq!(block.get(idx, BG), 0.25);
  }
}

#[test]
fn interior_reads_negative_background() {
  let block = VoxelBlock::Interior;
  assert_eq!(block.get(0, BG), -BG);
  assert_eq!(block.get(BLOCK_VOLUME - 1, BG), -BG);
}

#[test]
fn classify_outside_and_inside() {
  assert_eq!(
    VoxelBlock::dense_filled(BG).classify(BG),
    BlockClass::AllOutside
  );
  assert_eq!(
    VoxelBlock::dense_filled(-BG).classify(BG),
    BlockClass::AllInside
  );
  assert_eq!(VoxelBlock::Interior.classify(BG), BlockClass::AllInside);
}

#[test]
fn classify_mixed() {
  let mut block = VoxelBlock::dense_filled(BG);
  if let VoxelBlock::Dense(values) = &mut block {
    values[7] = 0.1;
  }
  assert_eq!(block.classify(BG), BlockClass::Mixed);
  assert!(block.has_band_values(BG));
}

#[test]
fn clamped_values_are_not_band_values() {
  assert!(!VoxelBlock::dense_filled(BG).has_band_values(BG));
  assert!(!VoxelBlock::dense_filled(-BG).has_band_values(BG));
  assert!(!VoxelBlock::Interior.has_band_values(BG));
}
