//! Traversal and walk integration tests

use marktree::{from_str, WalkFlow};

const STYLE: &str = "<style>This is root\
<LineStyle id=\"0\"><color>red</color><width>1</width></LineStyle>\
<PolyStyle><color>blue</color></PolyStyle>\
</style>";

#[test]
fn test_traverse_paths_in_document_order() {
    let doc = from_str("<kml><Document><name>x</name></Document></kml>").unwrap();
    let mut paths = Vec::new();
    let completed = doc.traverse(|path, _| {
        paths.push(path.to_string());
        true
    });
    assert!(completed);
    assert_eq!(paths, ["kml", "kml/Document", "kml/Document/name"]);
}

#[test]
fn test_traverse_early_exit_reports_incomplete() {
    let doc = from_str(STYLE).unwrap();
    let mut visits = 0;
    let completed = doc.traverse(|_, node| {
        visits += 1;
        node.name.local != "LineStyle"
    });
    assert!(!completed);
    // style, the anonymous text node, then LineStyle
    assert_eq!(visits, 3);
}

#[test]
fn test_traverse_path_elides_anonymous_nodes() {
    let doc = from_str(STYLE).unwrap();
    let mut anon_paths = Vec::new();
    doc.traverse(|path, node| {
        if node.is_anonymous() {
            anon_paths.push(path.to_string());
        }
        true
    });
    assert_eq!(anon_paths, ["style"]);
}

#[test]
fn test_walk_flow_and_position_metadata() {
    let mut doc = from_str(STYLE).unwrap();
    let mut seen = Vec::new();
    doc.walk(|info, node| {
        seen.push((info.path.join("/"), info.index, info.rindex));
        if node.name.local == "color" {
            return WalkFlow::SkipLevel;
        }
        if node.name.local == "PolyStyle" {
            return WalkFlow::Terminate;
        }
        WalkFlow::Continue
    });
    assert_eq!(
        seen,
        [
            ("style".to_string(), 0, 0),
            ("style/".to_string(), 0, -3),
            ("style/LineStyle".to_string(), 1, -2),
            // SkipLevel here: width and color's children never appear
            ("style/LineStyle/color".to_string(), 0, -2),
            ("style/PolyStyle".to_string(), 2, -1),
        ]
    );
}

#[test]
fn test_skip_level_spares_the_level_above() {
    let mut doc = from_str("<r><a><x/><y/></a><b/></r>").unwrap();
    let mut seen = Vec::new();
    doc.walk(|_, node| {
        seen.push(node.name.local.clone());
        if node.name.local == "x" {
            WalkFlow::SkipLevel
        } else {
            WalkFlow::Continue
        }
    });
    assert_eq!(seen, ["r", "a", "x", "b"]);
}

#[test]
fn test_terminate_propagates_from_any_depth() {
    let mut doc = from_str("<r><a><x><deep/></x></a><b/></r>").unwrap();
    let mut seen = Vec::new();
    doc.walk(|_, node| {
        seen.push(node.name.local.clone());
        if node.name.local == "deep" {
            WalkFlow::Terminate
        } else {
            WalkFlow::Continue
        }
    });
    assert_eq!(seen, ["r", "a", "x", "deep"]);
}

#[test]
fn test_walk_rewrites_survive_serialization() {
    let mut doc = from_str("<doc><keep>a</keep><drop>b</drop></doc>").unwrap();
    doc.walk(|_, node| {
        node.children.retain(|c| c.name.local != "drop");
        WalkFlow::Continue
    });
    assert_eq!(doc.to_xml(false).unwrap(), "<doc><keep>a</keep></doc>");
}

#[test]
fn test_walk_renames_nodes() {
    let mut doc = from_str("<a><b>x</b></a>").unwrap();
    doc.walk(|_, node| {
        if node.name.local == "b" {
            node.name.local = "c".to_string();
        }
        WalkFlow::Continue
    });
    assert_eq!(doc.to_xml(false).unwrap(), "<a><c>x</c></a>");
}

#[test]
fn test_walk_fold_counts_nodes() {
    let mut doc = from_str(STYLE).unwrap();
    let count = doc.walk_fold(0u32, |_, _, acc| (WalkFlow::Continue, acc + 1));
    // style + anonymous text + LineStyle + color + width + PolyStyle + color
    assert_eq!(count, 7);
}

#[test]
fn test_walk_fold_collects_text_until_terminate() {
    let mut doc = from_str("<a><b>one</b><c>two</c><d>three</d></a>").unwrap();
    let collected = doc.walk_fold(String::new(), |_, node, mut acc| {
        if !node.text.is_empty() {
            acc.push_str(&node.text);
        }
        if node.name.local == "c" {
            (WalkFlow::Terminate, acc)
        } else {
            (WalkFlow::Continue, acc)
        }
    });
    assert_eq!(collected, "onetwo");
}

#[test]
fn test_walk_fold_skip_level_keeps_accumulator() {
    let mut doc = from_str("<r><a><x/><y/></a><b/></r>").unwrap();
    let names = doc.walk_fold(Vec::new(), |_, node, mut acc| {
        acc.push(node.name.local.clone());
        if node.name.local == "a" {
            (WalkFlow::SkipLevel, acc)
        } else {
            (WalkFlow::Continue, acc)
        }
    });
    assert_eq!(names, ["r", "a"]);
}

#[test]
fn test_walk_fold_moves_ownership_through() {
    // the accumulator is moved, not cloned: a Vec keeps its contents
    let mut doc = from_str("<a><b/><c/></a>").unwrap();
    let ids = doc.walk_fold(vec![0usize], |info, _, mut acc| {
        acc.push(info.index);
        (WalkFlow::Continue, acc)
    });
    assert_eq!(ids, [0, 0, 0, 1]);
}
