//! End-to-end tests over real PDF files generated with lopdf

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_to_text::{
    BatchJob, DocumentOpener, ErrorKind, ExtractConfig, ExtractionMode, FailurePolicy,
    JobController, JobEvent, PageSource, PdfOpener, SingleJob,
};
use tempfile::TempDir;

/// Write a PDF with one page per operation list, all using Courier as `F1`
fn write_pdf(path: &Path, pages: &[Vec<Operation>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content {
            operations: operations.clone(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn text_page(text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 24.into()]),
        Operation::new("Td", vec![100.into(), 600.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Three rows in three columns, the middle cell of the last row left empty
fn table_page() -> Vec<Operation> {
    let cells: &[(i64, i64, &str)] = &[
        (72, 700, "Item"),
        (200, 700, "Qty"),
        (320, 700, "Price"),
        (72, 680, "Apple"),
        (200, 680, "3"),
        (320, 680, "1.20"),
        (72, 660, "Pear"),
        (320, 660, "0.80"),
    ];

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
    ];
    for (x, y, text) in cells {
        operations.push(Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), (*x).into(), (*y).into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
    }
    operations.push(Operation::new("ET", vec![]));
    operations
}

#[test]
fn test_pdf_text_and_page_count() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hello.pdf");
    write_pdf(&path, &[text_page("Hello World!"), text_page("Second page")]);

    let document = PdfOpener::default().open(&path).unwrap();
    assert_eq!(document.page_count(), 2);

    let text = document.page_text(0).unwrap().unwrap();
    assert!(text.contains("Hello World!"), "got {:?}", text);
    assert!(document.page_tables(0).unwrap().is_empty());
}

#[test]
fn test_pdf_table_detection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prices.pdf");
    write_pdf(&path, &[table_page()]);

    let document = PdfOpener::default().open(&path).unwrap();
    let tables = document.page_tables(0).unwrap();

    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].rows.len(), 3);
    assert_eq!(tables[0].rows[0], vec![Some("Item".into()), Some("Qty".into()), Some("Price".into())]);
    assert_eq!(tables[0].rows[2], vec![Some("Pear".into()), None, Some("0.80".into())]);
}

#[test]
fn test_garbage_file_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("junk.pdf");
    std::fs::write(&path, b"this is not a pdf").unwrap();

    let err = PdfOpener::default().open(&path).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::OpenFailure);
}

#[tokio::test]
async fn test_single_job_over_pdf() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.pdf");
    write_pdf(&path, &[text_page("Hello World!"), table_page()]);

    let mut controller = JobController::from_config(ExtractConfig::default());
    controller
        .submit_single(SingleJob::new(&path, ExtractionMode::TablesOnly))
        .unwrap();

    let mut progress = Vec::new();
    let content = controller
        .take_single()
        .unwrap()
        .wait(|p| progress.push(p))
        .await
        .unwrap();

    assert_eq!(progress, vec![50, 100]);
    assert_eq!(
        content,
        "Page 2 - Table 1:\nItem,Qty,Price\nApple,3,1.20\nPear,,0.80\n\n"
    );
}

#[tokio::test]
async fn test_batch_continue_over_pdfs() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_pdf(&src.path().join("a.pdf"), &[text_page("Alpha")]);
    std::fs::write(src.path().join("b.pdf"), b"broken").unwrap();
    write_pdf(&src.path().join("c.PDF"), &[text_page("Gamma")]);
    std::fs::write(src.path().join("notes.txt"), b"ignored").unwrap();

    let mut controller = JobController::from_config(ExtractConfig::default());
    let job = BatchJob::new(src.path(), ExtractionMode::TextOnly, out.path())
        .with_failure_policy(FailurePolicy::Continue);
    let handle = controller.submit_batch(job).unwrap();

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }

    assert_eq!(
        &events[..3],
        &[JobEvent::Progress(33), JobEvent::Progress(66), JobEvent::Progress(100)]
    );
    let Some(JobEvent::Finished(report)) = events.last() else {
        panic!("expected finished, got {:?}", events.last());
    };
    assert_eq!(report.written, vec![out.path().join("a.txt"), out.path().join("c.txt")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].kind, ErrorKind::OpenFailure);

    let alpha = std::fs::read_to_string(out.path().join("a.txt")).unwrap();
    assert!(alpha.starts_with("--- Page 1 Text ---\n"));
    assert!(alpha.contains("Alpha"));
    assert!(!out.path().join("b.txt").exists());
}
