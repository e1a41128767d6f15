use super::*;

#[test]
fn over_opaque_replaces_and_transparent_keeps() {
    assert_eq!(over([1, 2, 3, 255], [9, 9, 9, 255]), [9, 9, 9, 255]);
    assert_eq!(over([1, 2, 3, 255], [0, 0, 0, 0]), [1, 2, 3, 255]);
}

#[test]
fn over_half_alpha_blends() {
    let out = over([200, 200, 200, 255], [64, 0, 0, 128]);
    assert_eq!(out[3], 255);
    assert!(out[0] > 64 && out[0] < 200);
    assert!(out[1] < 200);
}

#[test]
fn crossfade_endpoints() {
    let a = [255, 0, 0, 255];
    let b = [0, 0, 255, 255];
    assert_eq!(crossfade(a, b, 0.0), a);
    assert_eq!(crossfade(a, b, 1.0), b);
    let mid = crossfade(a, b, 0.5);
    assert!(mid[0] > 100 && mid[2] > 100);
}

#[test]
fn crossfade_into_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(crossfade_into(&mut dst, &[0u8; 8], &[0u8; 4], 0.5).is_err());
}

#[test]
fn wipe_left_to_right_splits_frame() {
    let width = 4;
    let height = 1;
    let a = [10u8, 10, 10, 255].repeat(4);
    let b = [200u8, 200, 200, 255].repeat(4);
    let mut dst = vec![0u8; 16];
    wipe_into(
        &mut dst,
        &a,
        &b,
        WipeParams {
            width,
            height,
            t: 0.5,
            dir: WipeDir::LeftToRight,
            soft_edge: 0.0,
        },
    )
    .unwrap();
    assert_eq!(&dst[0..4], &[200, 200, 200, 255]);
    assert_eq!(&dst[12..16], &[10, 10, 10, 255]);
}

#[test]
fn over_region_clips_to_destination() {
    let mut dst = [0u8, 0, 0, 255].repeat(4);
    let src = [255u8, 255, 255, 255].repeat(4);
    over_region(&mut dst, 2, 2, &src, 2, 2, 1, 1).unwrap();
    assert_eq!(&dst[0..4], &[0, 0, 0, 255]);
    assert_eq!(&dst[12..16], &[255, 255, 255, 255]);
}
