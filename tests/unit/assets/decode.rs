use super::*;

fn write_png(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    img.save(path).unwrap();
}

#[test]
fn background_covers_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.png");
    write_png(&path, 40, 10, [10, 200, 30, 255]);

    let canvas = Canvas {
        width: 16,
        height: 8,
    };
    let bg = load_background(&path, canvas, [0, 0, 0, 255]).unwrap();
    assert_eq!((bg.width, bg.height), (16, 8));
    assert_eq!(bg.rgba8_premul.len(), canvas.rgba8_len());
    assert_eq!(&bg.rgba8_premul[0..4], &[10, 200, 30, 255]);
}

#[test]
fn transparent_background_is_flattened_over_backdrop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clear.png");
    write_png(&path, 4, 4, [255, 255, 255, 0]);

    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let bg = load_background(&path, canvas, [30, 34, 48, 255]).unwrap();
    assert!(bg.rgba8_premul.chunks_exact(4).all(|px| px == [30, 34, 48, 255]));
}

#[test]
fn undecodable_file_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not an image").unwrap();
    let err = load_background(
        &path,
        Canvas {
            width: 2,
            height: 2,
        },
        [0, 0, 0, 255],
    )
    .unwrap_err();
    assert!(matches!(err, ReelError::Decode(_)));
}

#[test]
fn solid_fills_every_pixel() {
    let img = PreparedImage::solid(
        Canvas {
            width: 3,
            height: 2,
        },
        [30, 34, 48, 255],
    );
    assert_eq!(img.rgba8_premul.len(), 24);
    assert!(img.rgba8_premul.chunks_exact(4).all(|px| px == [30, 34, 48, 255]));
}

#[test]
fn hex_colours_parse() {
    assert_eq!(parse_hex_color("#1e2230").unwrap(), [0x1e, 0x22, 0x30, 255]);
    assert_eq!(parse_hex_color("00000080").unwrap(), [0, 0, 0, 0x80]);
    assert!(parse_hex_color("#12").is_err());
    assert!(parse_hex_color("#gggggg").is_err());
}
