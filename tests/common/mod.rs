//! Shared helpers for integration tests

use editorial_scan::PipelineConfig;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use mockito::{Matcher, Mock, ServerGuard};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Host used in document references throughout the tests
pub const DOC_HOST: &str = "docs.example.com";

/// A target page carrying the marker
#[allow(dead_code)]
pub const EDITORIAL_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Stock photo</title></head>
<body><h1>Crowd at the parade</h1><p class="license">Editorial Use Only</p></body></html>"#;

/// A target page without the marker
#[allow(dead_code)]
pub const COMMERCIAL_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Stock photo</title></head>
<body><h1>Sunset</h1><p class="license">Royalty free, commercial use allowed</p></body></html>"#;

/// Content of one fixture page
#[derive(Default)]
pub struct FixturePage {
    /// Targets of link annotations
    pub links: Vec<String>,
    /// Lines of text, each drawn separately
    pub lines: Vec<String>,
    /// Lines of text sharing one text object, moved down with `Td`
    pub paragraph: Vec<String>,
}

/// Build a PDF whose pages carry the given link annotations and text lines
#[allow(dead_code)]
pub fn build_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        for (i, line) in page.lines.iter().enumerate() {
            let y = 750 - 20 * i as i64;
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 10i64.into()]));
            operations.push(Operation::new("Td", vec![50i64.into(), y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(format!("{line} "))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        if !page.paragraph.is_empty() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 10i64.into()]));
            operations.push(Operation::new("Td", vec![50i64.into(), 400i64.into()]));
            for (i, line) in page.paragraph.iter().enumerate() {
                if i > 0 {
                    operations.push(Operation::new("Td", vec![0i64.into(), (-14i64).into()]));
                }
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(line.as_str())],
                ));
            }
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let mut annots: Vec<Object> = Vec::new();
        for (i, uri) in page.links.iter().enumerate() {
            let y = 100 + 20 * i as i64;
            let annot_id = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![50i64.into(), y.into(), 250i64.into(), (y + 15).into()],
                "A" => dictionary! {
                    "S" => "URI",
                    "URI" => Object::string_literal(uri.as_str()),
                },
            });
            annots.push(annot_id.into());
        }

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0i64.into(), 0i64.into(), 595i64.into(), 842i64.into()],
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        kids.push(doc.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Write a fixture PDF into `dir`
#[allow(dead_code)]
pub fn write_pdf(dir: &Path, name: &str, pages: &[FixturePage]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).unwrap();
    path
}

/// Reference URL for a document id
#[allow(dead_code)]
pub fn doc_reference(id: &str) -> String {
    format!("https://{DOC_HOST}/document/d/{id}/edit")
}

/// Config pointing every request at the mock server
#[allow(dead_code)]
pub fn config_for(server: &ServerGuard, work_dir: &Path) -> PipelineConfig {
    PipelineConfig::builder()
        .document_host(DOC_HOST)
        .export_base_url(server.url())
        .fetch_timeout(Duration::from_secs(5))
        .classify_timeout(Duration::from_secs(5))
        .work_dir(work_dir)
        .build()
}

/// Serve `html` at `path`
#[allow(dead_code)]
pub async fn mock_page(server: &mut ServerGuard, path: &str, html: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(html)
        .create_async()
        .await
}

/// Serve `pdf` as the export of document `id`
#[allow(dead_code)]
pub async fn mock_export(server: &mut ServerGuard, id: &str, pdf: Vec<u8>) -> Mock {
    server
        .mock("GET", format!("/document/d/{id}/export").as_str())
        .match_query(Matcher::UrlEncoded("format".into(), "pdf".into()))
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(pdf)
        .create_async()
        .await
}

/// PDF files left in `dir`
#[allow(dead_code)]
pub fn pdf_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "pdf"))
        .collect()
}

/// A local address nothing listens on
#[allow(dead_code)]
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
