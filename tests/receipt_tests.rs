mod common;

use std::fs;
use std::sync::Arc;

use common::{jpeg_bytes, png_bytes, FakeRenderer};
use rendiciones_server::receipt::{Generator, GeneratorError, ReceiptGenerator, ReceiptRequest};

fn generator(dir: &std::path::Path, renderer: Arc<FakeRenderer>) -> ReceiptGenerator {
    ReceiptGenerator::new(dir, "Control de Gastos Trast", "CLP", renderer)
}

fn request(description: &str, image: Vec<u8>) -> ReceiptRequest {
    ReceiptRequest {
        driver: "Juan Pérez".to_string(),
        date: "05/06/2024".to_string(),
        amount: 15000,
        description: description.to_string(),
        image,
    }
}

#[test]
fn test_generate_writes_named_receipt() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FakeRenderer::default());
    let generator = generator(dir.path(), renderer.clone());

    let receipt = generator
        .generate(request("Combustible", jpeg_bytes(120, 80)))
        .unwrap();

    assert_eq!(receipt.filename, "Juan Pérez_05-06-2024.pdf");
    assert_eq!(receipt.path, dir.path().join("Juan Pérez_05-06-2024.pdf"));
    assert_eq!(receipt.link(), receipt.path.display().to_string());
    assert!(receipt.path.is_file());
}

#[test]
fn test_layout_contains_title_fields_and_amount() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FakeRenderer::default());
    let generator = generator(dir.path(), renderer.clone());

    generator
        .generate(request("Peaje \"Ruta 68\"", png_bytes(40, 40)))
        .unwrap();

    let source = renderer.last_source();
    assert!(source.contains(r#"titulo: "Control de Gastos Trast""#));
    assert!(source.contains(r#"conductor: "Juan Pérez""#));
    assert!(source.contains(r#"fecha: "05/06/2024""#));
    assert!(source.contains(r#"monto: "$15,000 CLP""#));
    assert!(source.contains(r#"descripcion: "Peaje \"Ruta 68\"""#));
    assert!(source.contains("#strong[Descripción:]"));
    assert!(source.contains(r#"paper: "us-letter""#));
}

#[test]
fn test_small_image_keeps_native_size() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FakeRenderer::default());
    let generator = generator(dir.path(), renderer.clone());

    generator
        .generate(request("Combustible", png_bytes(100, 50)))
        .unwrap();

    let source = renderer.last_source();
    assert!(source.contains("ancho: 100.00pt"));
    assert!(source.contains("alto: 50.00pt"));
}

#[test]
fn test_large_image_is_scaled_to_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FakeRenderer::default());
    let generator = generator(dir.path(), renderer.clone());

    generator
        .generate(request("Combustible", png_bytes(1584, 792)))
        .unwrap();

    // 1584pt wide is four times the 396pt width bound.
    let source = renderer.last_source();
    assert!(source.contains("ancho: 396.00pt"));
    assert!(source.contains("alto: 198.00pt"));
}

#[test]
fn test_transient_image_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FakeRenderer::default());
    let generator = generator(dir.path(), renderer.clone());

    generator
        .generate(request("Combustible", jpeg_bytes(20, 20)))
        .unwrap();

    let neighbours = renderer.neighbours.lock().clone();
    let transient: Vec<_> = neighbours
        .iter()
        .filter(|p| p.file_name().map_or(false, |n| n.to_string_lossy().starts_with("temp_image")))
        .collect();
    assert_eq!(transient.len(), 1);
    assert!(transient[0].to_string_lossy().ends_with(".jpg"));
    assert!(!transient[0].exists());

    // Nothing but the receipt lands in the receipts directory.
    let files: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
    assert_eq!(files.len(), 1);
}

#[test]
fn test_same_driver_and_date_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FakeRenderer::default());
    let generator = generator(dir.path(), renderer.clone());

    let first = generator
        .generate(request("Almuerzo", png_bytes(10, 10)))
        .unwrap();
    let second = generator
        .generate(request("Estacionamiento", png_bytes(10, 10)))
        .unwrap();

    assert_eq!(first.path, second.path);
    let content = fs::read_to_string(&second.path).unwrap();
    assert!(content.contains("Estacionamiento"));
    assert!(!content.contains("Almuerzo"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_renderer_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FakeRenderer::failing());
    let generator = generator(dir.path(), renderer.clone());

    let result = generator.generate(request("Combustible", png_bytes(10, 10)));

    assert!(matches!(result, Err(GeneratorError::RendererExit { code: 1, .. })));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_unsupported_image_is_rejected_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FakeRenderer::default());
    let generator = generator(dir.path(), renderer.clone());

    let result = generator.generate(request("Combustible", b"GIF89a-not-allowed".to_vec()));

    assert!(matches!(result, Err(GeneratorError::UnsupportedImage)));
    assert_eq!(renderer.render_count(), 0);
}

#[test]
fn test_truncated_image_fails_to_decode() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(FakeRenderer::default());
    let generator = generator(dir.path(), renderer.clone());

    let mut bytes = png_bytes(10, 10);
    bytes.truncate(12);
    let result = generator.generate(request("Combustible", bytes));

    assert!(matches!(result, Err(GeneratorError::Image(_))));
    assert_eq!(renderer.render_count(), 0);
}
