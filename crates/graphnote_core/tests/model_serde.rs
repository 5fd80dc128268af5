use graphnote_core::{
    project, Area, Content, ContentStatus, Link, LinkType, ProjectionQuery, WorkspaceSnapshot,
};
use serde_json::json;

#[test]
fn snapshot_deserializes_with_defaults() {
    let area_id = "7f0c3a52-5e1b-4b57-9a43-3f3c1d0e8a11";
    let a_id = "0d4f1a3e-8a5c-4c1e-9e5b-1f2a3b4c5d6e";
    let b_id = "1e5a2b4f-9b6d-4d2f-8f6c-2a3b4c5d6e7f";
    let raw = json!({
        "areas": [{
            "id": area_id,
            "name": "Research",
            "content_ids": [a_id, b_id],
            "created_at": 1,
            "updated_at": 1
        }],
        "contents": [
            {"id": a_id, "area_id": area_id, "title": "A", "emoji": "📘", "created_at": 1, "updated_at": 1},
            {"id": b_id, "area_id": area_id, "title": "B", "status": "open", "created_at": 1, "updated_at": 1}
        ],
        "links": [{
            "id": "2f6b3c5a-ac7e-4e3a-9a7d-3b4c5d6e7f80",
            "from_content_id": b_id,
            "to_content_id": a_id,
            "type": "parent",
            "line_style": "solid",
            "created_at": 1
        }]
    });

    let snapshot: WorkspaceSnapshot = serde_json::from_value(raw).unwrap();
    assert_eq!(snapshot.contents[0].status, ContentStatus::Closed);
    assert_eq!(snapshot.contents[1].status, ContentStatus::Open);
    assert!(snapshot.contents[0].tags.is_empty());
    assert_eq!(snapshot.links[0].link_type, LinkType::Parent);
    assert!(snapshot.links[0].style.line_style.is_some());
    assert!(snapshot.graph_frames.is_empty());
    assert_eq!(snapshot.hierarchy_level_configs, None);
}

#[test]
fn link_serializes_type_and_flattened_style() {
    let from = Content::new(None, "from");
    let to = Content::new(None, "to");
    let mut link = Link::new(from.id, to.id, LinkType::Manual).unwrap();
    link.style.color = Some("#123456".to_string());

    let value = serde_json::to_value(&link).unwrap();
    assert_eq!(value["type"], "manual");
    assert_eq!(value["color"], "#123456");
    assert!(value.get("style").is_none());
}

#[test]
fn projection_serializes_snake_case_and_skips_empty_fields() {
    let area = Area::new("Lab");
    let content = Content::new(Some(area.id), "note");
    let snapshot = WorkspaceSnapshot {
        areas: vec![area],
        contents: vec![content],
        ..WorkspaceSnapshot::default()
    };

    let flat = serde_json::to_value(project(&snapshot, &ProjectionQuery::default())).unwrap();
    let node = &flat["nodes"][0];
    assert_eq!(node["node_type"], "content");
    assert!(node.get("hierarchy_depth").is_none());
    assert!(node.get("in_cycle").is_none());

    let leveled =
        serde_json::to_value(project(&snapshot, &ProjectionQuery::hierarchy(None, 8))).unwrap();
    let node = &leveled["nodes"][0];
    assert_eq!(node["hierarchy_depth"], 0);
    assert_eq!(node["level_name"], "Level 1");
    assert_eq!(node["is_inherited_style"], false);

    let areas = serde_json::to_value(project(&snapshot, &ProjectionQuery::areas())).unwrap();
    assert_eq!(areas["nodes"][0]["node_type"], "area");
    assert_eq!(areas["nodes"][0]["content_count"], 1);
}

#[test]
fn query_deserializes_partial_input() {
    let query: ProjectionQuery = serde_json::from_value(json!({
        "layer": "children",
        "children_parent_id": "0d4f1a3e-8a5c-4c1e-9e5b-1f2a3b4c5d6e",
        "max_hierarchy_levels": 3
    }))
    .unwrap();
    assert!(query.show_parent_edges);
    assert!(!query.hierarchy_enabled);
    assert_eq!(query.max_hierarchy_levels, 3);
    assert!(query.selected_tags.is_empty());
}
