use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use threadkit_camtools::{
    GCodeGenerator, GenerationParameters, HoleDrillingGenerator, LineGeometryCache, NailLayout,
    ThreadArtGenerator,
};
use threadkit_core::{format_length, Edge, MeasurementSystem, PixelScale};
use threadkit_settings::{MachineSettings, ThreadArtConfig};

#[test]
fn test_single_edge_sequence() {
    let layout = NailLayout::generate(300, 800).unwrap();
    let cache = LineGeometryCache::build(layout.nails(), 800).unwrap();
    let scale = PixelScale::from_radius(609.6, 800).unwrap();
    let generator = GCodeGenerator::new(MachineSettings::default(), layout.nails().to_vec(), scale);

    let lines = generator
        .generate_lines(&[Edge::new(0, 5)], &cache)
        .unwrap();

    let from = layout.get(0).unwrap();
    let to = layout.get(5).unwrap();
    let mm = |px: i32| format_length(scale.to_mm(f64::from(px)), MeasurementSystem::Metric);
    let length = cache.line_between(0, 5).unwrap().len();
    let comment = format!(
        "; Edge 1: nail 0 (X{} Y{}) -> nail 5 (X{} Y{}), {} mm",
        mm(from.x),
        mm(from.y),
        mm(to.x),
        mm(to.y),
        format_length(scale.line_length_mm(length), MeasurementSystem::Metric)
    );

    assert_eq!(
        lines,
        vec![
            "G28 X5 Y0 A0".to_string(),
            "G01 A0.00 F3000 ; Move to nail 0".to_string(),
            "M0 ; Pause to attach thread".to_string(),
            comment,
            "G01 A4.50 F3000 ; Move to nail 5".to_string(),
            "G01 X-10.00 F2000 ; Retract needle".to_string(),
            "G01 A5.50 F200 ; Wrap nail 5".to_string(),
            "G01 X0.00 F2000 ; Engage needle".to_string(),
        ]
    );

    // Nail 0 sits on the +X axis of an 800 px canvas at 0.762 mm per pixel
    assert!(lines[3].starts_with("; Edge 1: nail 0 (X608.838 Y304.800)"));
}

#[test]
fn test_edge_lengths_add_up_to_thread_length() {
    let source = GrayImage::from_pixel(60, 60, Luma([0]));
    let mut bytes = Vec::new();
    source
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();

    let params = GenerationParameters {
        nails_quantity: 90,
        canvas_size_px: 160,
        max_paths: 40,
        minimum_difference: 8,
        render_preview: false,
        ..GenerationParameters::new(bytes)
    };
    let result = ThreadArtGenerator::new(params).unwrap().generate().unwrap();
    let gcode = result.gcode.unwrap();

    let lengths: Vec<f64> = gcode
        .iter()
        .filter(|l| l.starts_with("; Edge "))
        .map(|l| {
            let tail = l.rsplit(", ").next().unwrap();
            tail.trim_end_matches(" mm").parse::<f64>().unwrap()
        })
        .collect();

    assert_eq!(lengths.len(), 40);
    let total: f64 = lengths.iter().sum();
    // Each comment is rounded to 3 decimals
    assert!((total - result.thread_length_mm).abs() < 40.0 * 0.0005 + 1e-9);
}

#[test]
fn test_imperial_comments() {
    let layout = NailLayout::generate(20, 100).unwrap();
    let cache = LineGeometryCache::build(layout.nails(), 100).unwrap();
    let scale = PixelScale::from_radius(254.0, 100).unwrap();
    let machine = MachineSettings {
        display_units: MeasurementSystem::Imperial,
        ..Default::default()
    };
    let generator = GCodeGenerator::new(machine, layout.nails().to_vec(), scale);

    let program = generator
        .generate_program(&[Edge::new(0, 10)], &cache, 254.0)
        .unwrap();
    assert!(program.contains("; Thread length: 10.000 in\n"));
    assert!(program.contains(" in\nG01 A9.50 F3000 ; Move to nail 10\n"));
}

#[test]
fn test_drilling_program_covers_every_nail() {
    let config = ThreadArtConfig::default();
    let generator = HoleDrillingGenerator::new(
        config.drilling.clone(),
        &config.machine,
        config.generation.nails_quantity as usize,
    )
    .unwrap();

    let lines = generator.generate();
    assert_eq!(lines.len(), 1 + 3 * 300);
    assert_eq!(lines[0], "G28 Y0 A0");
    assert_eq!(lines[898], "G01 A299 F200 ; Move to nail 299");
    assert_eq!(lines[899], "G01 Y-3.20 F170 ; Drill hole at nail 299");
    assert_eq!(lines[900], "G01 Y-0.50 F1000 ; Retract drill");
}
