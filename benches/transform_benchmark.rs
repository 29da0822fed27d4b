//! Benchmarks for redoc package transformation.
//!
//! Run with: cargo bench
//!
//! These benchmarks measure formatting throughput at various document sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use redoc::xml::XmlDocument;
use redoc::{PackageTransformer, StylesPolicyApplier};
use std::io::Cursor;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn styles_xml(extra_styles: usize) -> String {
    let mut content = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{W_NS}">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/></w:style>"#
    );

    for i in 0..extra_styles {
        content.push_str(&format!(
            r#"
  <w:style w:type="character" w:styleId="Custom{i}"><w:name w:val="Custom {i}"/><w:rPr><w:i/></w:rPr></w:style>"#
        ));
    }

    content.push_str("\n</w:styles>");
    content
}

/// Creates a synthetic DOCX document with the given number of paragraphs.
fn create_test_docx(paragraph_count: usize) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
    )
    .unwrap();

    zip.start_file("word/styles.xml", options).unwrap();
    zip.write_all(styles_xml(50).as_bytes()).unwrap();

    let mut content = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}">
  <w:body>"#
    );

    for i in 0..paragraph_count {
        content.push_str(&format!(
            r#"
    <w:p>
      <w:r>
        <w:t>This is paragraph {} with some test content for benchmarking purposes.</w:t>
      </w:r>
    </w:p>"#,
            i
        ));
    }

    content.push_str(
        r#"
  </w:body>
</w:document>"#,
    );

    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(content.as_bytes()).unwrap();

    zip.finish().unwrap();
    buffer
}

/// Benchmark whole-package transformation at various sizes.
fn bench_package_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("package_transform");
    let transformer = PackageTransformer::new();

    for para_count in [10, 100, 500, 1000].iter() {
        let data = create_test_docx(*para_count);
        let size = data.len() as u64;

        group.throughput(Throughput::Bytes(size));
        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &data,
            |b, data| {
                b.iter(|| {
                    let _ = transformer.transform(black_box(data));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the styles policy on an already parsed part.
fn bench_styles_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("styles_policy");
    let applier = StylesPolicyApplier::new();

    for style_count in [10, 100, 500].iter() {
        let xml = styles_xml(*style_count);
        let parsed = XmlDocument::parse(&xml).unwrap();

        group.bench_with_input(
            BenchmarkId::new("styles", style_count),
            &parsed,
            |b, parsed| {
                b.iter(|| {
                    let mut doc = parsed.clone();
                    black_box(applier.apply(&mut doc.root));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the XML tree round trip alone.
fn bench_xml_round_trip(c: &mut Criterion) {
    let xml = styles_xml(200);

    c.bench_function("xml_round_trip", |b| {
        b.iter(|| {
            let doc = XmlDocument::parse(black_box(&xml)).unwrap();
            black_box(doc.to_xml().unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_package_transform,
    bench_styles_policy,
    bench_xml_round_trip
);
criterion_main!(benches);
