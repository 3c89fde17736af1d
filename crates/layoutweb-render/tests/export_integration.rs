use kurbo::{Point, Rect, Size};
use layoutweb_core::storage::{MemoryStore, load_project, save_project};
use layoutweb_core::{Canvas, ElementKind, ElementPatch, ImageFormat, ImageSource};
use layoutweb_render::{
    DefaultImageDecoder, FontBook, MarkupExporter, RasterOptions, Rasterizer, image_assets,
};

fn red_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, 10, 10);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[255, 0, 0, 255].repeat(100)).unwrap();
    }
    bytes
}

fn sample_layout() -> Canvas {
    let mut canvas = Canvas::new();
    canvas.set_viewport_size(640.0, 480.0);
    canvas.create(ElementKind::Triangle, Some(Point::new(20.0, 20.0)));
    let title = canvas.create(ElementKind::Text, Some(Point::new(200.0, 20.0)));
    canvas.update(
        &[title],
        &ElementPatch {
            content: Some("Welcome <home>".into()),
            ..ElementPatch::default()
        },
        true,
    );
    canvas.create_image(ImageSource::from_bytes(&red_png(), ImageFormat::Png), Size::new(10.0, 10.0));
    let missing = canvas.create_image(ImageSource::new("does-not-exist.png"), Size::new(300.0, 200.0));
    canvas.update(&[missing], &ElementPatch::geometry(Rect::new(500.0, 20.0, 600.0, 120.0)), true);
    canvas
}

#[test]
fn test_markup_and_raster_export() {
    let canvas = sample_layout();
    let elements = canvas.elements();

    let markup = MarkupExporter::new(canvas.viewport_size).unwrap().export(elements);
    assert!(markup.html.contains("class=\"element-4\""));
    assert!(markup.html.contains("Welcome &lt;home&gt;"));
    assert!(markup.html.contains("images/image-1.png"));
    assert!(markup.html.contains("images/image-2.png"));
    assert!(markup.css.contains(".element-1 polygon {"));
    assert_eq!(markup.assets.len(), 2);
    assert_eq!(markup.assets, image_assets(elements));

    let fonts = FontBook::empty();
    let options = RasterOptions::for_viewport(canvas.viewport_size).unwrap();
    let png = Rasterizer::new(&fonts, options)
        .render_png_blocking(elements, &DefaultImageDecoder::new())
        .unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (640, 480));

    // The 10x10 red image sits at the viewport center
    let center = decoded.get_pixel(320, 240).0;
    assert!(center[0] > 250 && center[1] < 5 && center[2] < 5);
    // The unreadable one becomes a placeholder block
    assert_eq!(decoded.get_pixel(510, 30).0, [0xf0, 0xf0, 0xf0, 255]);
    // Untouched background stays white
    assert_eq!(decoded.get_pixel(635, 475).0, [255, 255, 255, 255]);
}

#[test]
fn test_saved_project_exports_identically() {
    let canvas = sample_layout();
    let store = MemoryStore::new();
    pollster::block_on(save_project(&store, &canvas)).unwrap();

    let mut restored = Canvas::new();
    restored.set_viewport_size(640.0, 480.0);
    pollster::block_on(load_project(&store, &mut restored)).unwrap();

    let exporter = MarkupExporter::new(Size::new(640.0, 480.0)).unwrap();
    assert_eq!(
        exporter.export(canvas.elements()),
        exporter.export(restored.elements())
    );
}
