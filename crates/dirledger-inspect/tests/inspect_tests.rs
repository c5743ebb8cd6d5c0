use std::fs::{self, File};
use std::io::Write;
use std::time::Duration;

use dirledger_core::{LedgerConfig, ScannedTree, TreeNode};
use dirledger_inspect::{
    DocumentInspector, FileInspector, IndexError, MetadataIndexBuilder, PageOrientation,
};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn write_docx(path: &std::path::Path, pages: u32) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    writer
        .start_file("docProps/app.xml", SimpleFileOptions::default())
        .unwrap();
    write!(writer, "<Properties><Pages>{pages}</Pages><Characters>40</Characters></Properties>")
        .unwrap();
    writer.finish().unwrap();
}

/// Tree mirroring the files written under `root`.
fn tree_for(temp: &TempDir) -> ScannedTree {
    let root = TreeNode::folder(
        "root",
        vec![
            TreeNode::folder(
                "docs",
                vec![
                    TreeNode::file("broken.pdf"),
                    TreeNode::file("memo.docx"),
                    TreeNode::file("readme.txt"),
                ],
            ),
            TreeNode::file("summary.docx"),
        ],
    );
    ScannedTree::new(root, temp.path().to_path_buf(), Duration::ZERO, Vec::new())
}

#[test]
fn test_index_real_documents() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("docs")).unwrap();
    fs::write(temp.path().join("docs/broken.pdf"), "not a pdf").unwrap();
    fs::write(temp.path().join("docs/readme.txt"), "text").unwrap();
    write_docx(&temp.path().join("docs/memo.docx"), 4);
    write_docx(&temp.path().join("summary.docx"), 11);

    let builder = MetadataIndexBuilder::new(LedgerConfig::new(temp.path()));
    let outcome = builder.build(&tree_for(&temp)).unwrap();

    let keys: Vec<&str> = outcome.index.iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec!["docs/broken.pdf", "docs/memo.docx", "docs/readme.txt", "summary.docx"]
    );
    assert_eq!(outcome.inspected, 3);

    let broken = outcome.index.get("docs/broken.pdf").unwrap();
    assert_eq!(broken.pages, Some(0));
    assert!(matches!(
        broken.page_orientation,
        Some(PageOrientation::Unreadable(_))
    ));

    let memo = outcome.index.get("docs/memo.docx").unwrap();
    assert_eq!(memo.pages, Some(4));
    assert_eq!(memo.char_count, Some(40));
    assert_eq!(outcome.index.get("summary.docx").unwrap().pages, Some(11));
    assert!(outcome.index.get("docs/readme.txt").unwrap().is_empty());
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn test_single_worker_matches_pool() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("docs")).unwrap();
    fs::write(temp.path().join("docs/broken.pdf"), "x").unwrap();
    fs::write(temp.path().join("docs/readme.txt"), "x").unwrap();
    write_docx(&temp.path().join("docs/memo.docx"), 2);
    write_docx(&temp.path().join("summary.docx"), 3);

    let pooled = MetadataIndexBuilder::new(LedgerConfig::new(temp.path()))
        .build(&tree_for(&temp))
        .unwrap();

    let config = LedgerConfig::builder()
        .root(temp.path())
        .workers(1usize)
        .build()
        .unwrap();
    let serial = MetadataIndexBuilder::new(config)
        .build(&tree_for(&temp))
        .unwrap();

    assert_eq!(pooled.index, serial.index);
}

#[test]
fn test_cancel_before_build() {
    let temp = TempDir::new().unwrap();
    write_docx(&temp.path().join("summary.docx"), 1);

    let builder = MetadataIndexBuilder::new(LedgerConfig::new(temp.path()));
    builder.cancel_token().cancel();

    assert!(matches!(
        builder.build(&tree_for(&temp)),
        Err(IndexError::Cancelled)
    ));
}

#[test]
fn test_inspector_never_errors() {
    let inspector = FileInspector::new();
    let outcome = inspector.inspect(std::path::Path::new("/missing/file.docx"));
    assert!(outcome.is_failure());
    assert_eq!(outcome.into_record().pages, Some(0));
}
