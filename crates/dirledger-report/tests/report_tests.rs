use dirledger_core::{LedgerConfig, MetadataIndex, MetadataRecord, PageOrientation, TreeNode};
use dirledger_report::sink::{GridUpdate, JsonSink, TextSink};
use dirledger_report::{
    FlatReport, Flattener, PresentationClass, ScratchDocument, classify, render,
};
use proptest::prelude::*;

fn config() -> LedgerConfig {
    LedgerConfig::new("/data")
}

fn flatten(root: &TreeNode, index: &MetadataIndex) -> FlatReport {
    let config = config();
    Flattener::new(&config).flatten(root, index)
}

/// Compact row notation: `[A]1` header, `--1` separator, `a.txt@2` file.
fn shape(report: &FlatReport) -> Vec<String> {
    report
        .rows
        .iter()
        .map(|r| {
            if r.is_separator {
                format!("--{}", r.level)
            } else if r.is_folder_header {
                format!("[{}]{}", r.label, r.level)
            } else {
                format!("{}@{}", r.label, r.level)
            }
        })
        .collect()
}

fn scenario_tree() -> TreeNode {
    TreeNode::folder(
        "root",
        vec![
            TreeNode::folder("A", vec![TreeNode::file("a.txt"), TreeNode::file("b.pdf")]),
            TreeNode::folder("Z", vec![]),
            TreeNode::file("r.docx"),
        ],
    )
}

#[test]
fn test_scenario_row_order() {
    let report = flatten(&scenario_tree(), &MetadataIndex::new());

    assert_eq!(
        shape(&report),
        vec!["[A]1", "a.txt@2", "b.pdf@2", "[Z]1", "--1", "r.docx@1"]
    );
    assert_eq!(report.stats.folder_count, 2);
    assert_eq!(report.stats.max_level, 1);
    assert_eq!(report.stats.files_by_extension.get(".txt"), Some(&1));
    assert_eq!(report.stats.files_by_extension.get(".pdf"), Some(&1));
    assert_eq!(report.stats.files_by_extension.get(".docx"), Some(&1));
}

#[test]
fn test_empty_tree() {
    let report = flatten(&TreeNode::folder("root", vec![]), &MetadataIndex::new());
    assert!(report.is_empty());
    assert_eq!(report.stats.folder_count, 0);
    assert_eq!(report.stats.max_level, 0);
    assert!(report.stats.files_by_extension.is_empty());
}

#[test]
fn test_no_separator_without_both_kinds() {
    let root = TreeNode::folder(
        "root",
        vec![
            TreeNode::folder("only-folders", vec![TreeNode::folder("inner", vec![])]),
            TreeNode::folder("only-files", vec![TreeNode::file("x.pdf")]),
        ],
    );
    let report = flatten(&root, &MetadataIndex::new());

    assert!(report.rows.iter().all(|r| !r.is_separator));
    assert_eq!(
        shape(&report),
        vec!["[only-folders]1", "[inner]2", "[only-files]1", "x.pdf@2"]
    );
}

#[test]
fn test_pages_gated_by_extension() {
    let mut index = MetadataIndex::new();
    index.insert("A/a.txt", MetadataRecord::with_pages(5));
    index.insert(
        "A/b.pdf",
        MetadataRecord {
            pages: Some(12),
            page_orientation: Some(PageOrientation::Landscape),
            text_orientation: None,
            char_count: None,
        },
    );

    let report = flatten(&scenario_tree(), &index);
    let txt = &report.rows[1];
    let pdf = &report.rows[2];

    assert_eq!(txt.label, "a.txt");
    assert_eq!(txt.pages, "");
    assert_eq!(pdf.pages, "12");
    assert_eq!(pdf.page_size, "landscape");
    // Absent record renders as empty cells.
    assert_eq!(report.rows[5].pages, "");
    assert_eq!(report.rows[5].page_size, "");
}

#[test]
fn test_render_json_summary() {
    let mut index = MetadataIndex::new();
    index.insert("A/b.pdf", MetadataRecord::with_pages(3));
    let report = flatten(&scenario_tree(), &index);

    let mut sink = JsonSink::new(Vec::new());
    let rendered = render(&mut sink, report, &index).unwrap();

    assert_eq!(rendered.summary.total_items, 6);
    assert_eq!(rendered.summary.folders, 2);
    assert_eq!(rendered.summary.metadata_index_snapshot, index);

    let value: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
    assert_eq!(value["rows"].as_array().unwrap().len(), 6);
    assert_eq!(value["rows"][4]["class"], "separator");
}

#[test]
fn test_render_text_keeps_order() {
    let report = flatten(&scenario_tree(), &MetadataIndex::new());
    let mut sink = TextSink::new(Vec::new());
    render(&mut sink, report, &MetadataIndex::new()).unwrap();

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let names: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with('│') && !l.contains('─') && !l.contains('═'))
        .skip(1)
        .map(|l| l.trim_matches('│').split_whitespace().next().unwrap_or(""))
        .collect();
    assert_eq!(names, vec!["A", "a.txt", "b.pdf", "Z", "", "r.docx"]);
}

#[test]
fn test_grid_colors_only_headers_and_separators() {
    let root = TreeNode::folder(
        "root",
        vec![
            TreeNode::folder("A", vec![TreeNode::file("x.zip")]),
            TreeNode::file("r.txt"),
        ],
    );
    let report = flatten(&root, &MetadataIndex::new());
    let update = GridUpdate::build("Hierarchy_t", &report);

    let classes: Vec<PresentationClass> = report.rows.iter().map(|r| classify(r).class).collect();
    assert_eq!(
        classes,
        vec![
            PresentationClass::FolderHeader,
            PresentationClass::Archive,
            PresentationClass::Separator,
            PresentationClass::File,
        ]
    );
    let colored: Vec<&String> = update.formats.iter().flat_map(|f| &f.ranges).collect();
    assert_eq!(colored, vec!["A2:F2", "A4:F4", "A3:F3", "A1:F1"]);
}

#[test]
fn test_scratch_roundtrip_then_flatten() {
    let mut index = MetadataIndex::new();
    index.insert("A/b.pdf", MetadataRecord::with_pages(7));
    let doc = ScratchDocument::from_tree(&scenario_tree(), &index);

    let json = serde_json::to_string(&doc).unwrap();
    let back: ScratchDocument = serde_json::from_str(&json).unwrap();
    let (root, index_back) = back.into_parts(config().collation);

    assert_eq!(root, scenario_tree());
    assert_eq!(flatten(&root, &index_back), flatten(&scenario_tree(), &index));
}

fn arb_tree() -> impl Strategy<Value = TreeNode> {
    let file = "[a-c]{1,3}\\.(pdf|txt|db|zip)".prop_map(TreeNode::file);
    let leaf = prop_oneof![file, "[A-C]{1,2}".prop_map(|n| TreeNode::folder(n, vec![]))];
    leaf.prop_recursive(4, 48, 6, move |inner| {
        ("[A-C]{1,2}", prop::collection::vec(inner, 0..6)).prop_map(|(name, mut children)| {
            dirledger_core::order_children(&mut children, dirledger_core::Collation::Alphabetic);
            TreeNode::folder(name, children)
        })
    })
}

proptest! {
    #[test]
    fn prop_header_rows_equal_folders(tree in arb_tree()) {
        let root = TreeNode::folder("root", vec![tree]);
        let report = flatten(&root, &MetadataIndex::new());
        let headers = report.rows.iter().filter(|r| r.is_folder_header).count();

        prop_assert_eq!(headers, root.folder_count() - 1);
        prop_assert_eq!(report.stats.folder_count as usize, headers);
    }

    #[test]
    fn prop_flatten_is_idempotent(tree in arb_tree()) {
        let root = TreeNode::folder("root", vec![tree, TreeNode::file("r.pdf")]);
        prop_assert_eq!(
            flatten(&root, &MetadataIndex::new()),
            flatten(&root, &MetadataIndex::new())
        );
    }

    #[test]
    fn prop_separator_count(tree in arb_tree()) {
        let root = TreeNode::folder("root", vec![tree]);
        let report = flatten(&root, &MetadataIndex::new());

        let mut expected = 0;
        let mut stack = vec![&root];
        while let Some(node) = stack.pop() {
            if node.subfolders().next().is_some() && node.files().next().is_some() {
                expected += 1;
            }
            stack.extend(node.subfolders());
        }
        let separators = report.rows.iter().filter(|r| r.is_separator).count();
        prop_assert_eq!(separators, expected);
    }
}
