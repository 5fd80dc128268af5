use graphnote_core::model::content::normalize_tags;
use graphnote_core::model::frame::{ShapeAnnotation, ShapeKind, TextAnnotation};
use graphnote_core::{
    project, Area, Content, GraphFrame, LayerMode, Link, LinkType, NodeType, Position,
    ProjectionQuery, WorkspaceSnapshot,
};
use uuid::Uuid;

fn tagged(area: &Area, title: &str, tags: &[&str]) -> Content {
    let mut content = Content::new(Some(area.id), title);
    content.tags = normalize_tags(tags);
    content
}

fn frame(layer: LayerMode, title: &str) -> GraphFrame {
    GraphFrame::new(layer, title, Position::new(10.0, 20.0), 300.0, 200.0)
}

fn node_ids(projection: &graphnote_core::GraphProjection) -> Vec<String> {
    projection.nodes.iter().map(|node| node.id.clone()).collect()
}

#[test]
fn tag_filter_requires_every_selected_tag() {
    let area = Area::new("Lab");
    let both = tagged(&area, "both", &["rust", "graph"]);
    let rust_only = tagged(&area, "rust", &["Rust"]);
    let none = tagged(&area, "none", &[]);
    let link = Link::new(both.id, rust_only.id, LinkType::Manual).unwrap();
    let snapshot = WorkspaceSnapshot {
        areas: vec![area],
        contents: vec![both.clone(), rust_only.clone(), none],
        links: vec![link],
        ..WorkspaceSnapshot::default()
    };

    let rust = project(&snapshot, &ProjectionQuery::default().with_tags([" RUST "]));
    assert_eq!(
        node_ids(&rust),
        vec![both.id.to_string(), rust_only.id.to_string()]
    );
    assert_eq!(rust.edges.len(), 1);

    let rust_and_graph = project(
        &snapshot,
        &ProjectionQuery::default().with_tags(["rust", "graph"]),
    );
    assert_eq!(node_ids(&rust_and_graph), vec![both.id.to_string()]);
    assert!(rust_and_graph.edges.is_empty());
}

#[test]
fn empty_or_blank_tag_selection_is_a_no_op() {
    let area = Area::new("Lab");
    let content = tagged(&area, "plain", &[]);
    let snapshot = WorkspaceSnapshot {
        areas: vec![area],
        contents: vec![content],
        ..WorkspaceSnapshot::default()
    };
    let unfiltered = project(&snapshot, &ProjectionQuery::default());
    let blank = project(&snapshot, &ProjectionQuery::default().with_tags(["  "]));
    assert_eq!(unfiltered, blank);
    assert_eq!(unfiltered.nodes.len(), 1);
}

#[test]
fn tag_filter_keeps_area_and_frame_nodes() {
    let area = Area::new("Lab");
    let snapshot = WorkspaceSnapshot {
        areas: vec![area],
        graph_frames: vec![frame(LayerMode::Areas, "group")],
        ..WorkspaceSnapshot::default()
    };
    let projection = project(&snapshot, &ProjectionQuery::areas().with_tags(["missing"]));
    assert_eq!(projection.nodes.len(), 2);
    assert_eq!(projection.nodes[0].node_type, NodeType::Frame);
    assert_eq!(projection.nodes[1].node_type, NodeType::Area);
}

#[test]
fn frames_only_show_in_their_layer_and_scope() {
    let area = Area::new("Lab");
    let other = Area::new("Other");
    let parent = Content::new(Some(area.id), "parent");
    let child = Content::new(Some(area.id), "child");

    let areas_frame = frame(LayerMode::Areas, "areas");
    let global_contents_frame = frame(LayerMode::Contents, "all contents");
    let area_contents_frame = frame(LayerMode::Contents, "lab contents").in_area(area.id);
    let children_frame = frame(LayerMode::Children, "under parent").under_parent(parent.id);

    let snapshot = WorkspaceSnapshot {
        areas: vec![area.clone(), other.clone()],
        contents: vec![parent.clone(), child.clone()],
        links: vec![Link::parent(child.id, parent.id).unwrap()],
        graph_frames: vec![
            areas_frame.clone(),
            global_contents_frame.clone(),
            area_contents_frame.clone(),
            children_frame.clone(),
        ],
        ..WorkspaceSnapshot::default()
    };

    let frames_in = |query: &ProjectionQuery| -> Vec<String> {
        project(&snapshot, query)
            .nodes
            .into_iter()
            .filter(|node| node.node_type == NodeType::Frame)
            .map(|node| node.id)
            .collect()
    };

    assert_eq!(
        frames_in(&ProjectionQuery::areas()),
        vec![areas_frame.id.to_string()]
    );
    assert_eq!(
        frames_in(&ProjectionQuery::contents(None)),
        vec![global_contents_frame.id.to_string()]
    );
    assert_eq!(
        frames_in(&ProjectionQuery::contents(Some(area.id))),
        vec![area_contents_frame.id.to_string()]
    );
    assert!(frames_in(&ProjectionQuery::contents(Some(other.id))).is_empty());
    assert!(frames_in(&ProjectionQuery::hierarchy(Some(other.id), 8)).is_empty());
    assert_eq!(
        frames_in(&ProjectionQuery::children(Some(parent.id), 8)),
        vec![children_frame.id.to_string()]
    );
    assert!(frames_in(&ProjectionQuery::children(Some(child.id), 8)).is_empty());
    assert!(frames_in(&ProjectionQuery::children(None, 8)).is_empty());
}

#[test]
fn frames_are_prepended_and_never_linked() {
    let area = Area::new("Lab");
    let a = Content::new(Some(area.id), "a");
    let b = Content::new(Some(area.id), "b");
    let snapshot = WorkspaceSnapshot {
        areas: vec![area],
        contents: vec![a.clone(), b.clone()],
        links: vec![Link::new(a.id, b.id, LinkType::Manual).unwrap()],
        graph_frames: vec![frame(LayerMode::Contents, "box")],
        ..WorkspaceSnapshot::default()
    };

    let projection = project(&snapshot, &ProjectionQuery::default());
    assert_eq!(projection.nodes[0].node_type, NodeType::Frame);
    let frame_id = projection.nodes[0].id.clone();
    assert!(projection
        .edges
        .iter()
        .all(|edge| edge.source != frame_id && edge.target != frame_id));

    let data = projection.nodes[0].frame.as_ref().unwrap();
    assert_eq!(data.width, 300.0);
    assert_eq!(data.height, 200.0);
    assert_eq!(projection.nodes[0].position, Some(Position::new(10.0, 20.0)));
}

#[test]
fn frame_annotations_are_filtered_to_the_current_layer() {
    let mut boxed = frame(LayerMode::Contents, "notes");
    boxed.text_annotations = vec![
        TextAnnotation {
            id: Uuid::new_v4(),
            text: "here".to_string(),
            position: Position::new(1.0, 1.0),
            font_size: None,
            color: None,
            created_in_layer: LayerMode::Contents,
        },
        TextAnnotation {
            id: Uuid::new_v4(),
            text: "elsewhere".to_string(),
            position: Position::new(2.0, 2.0),
            font_size: Some(14.0),
            color: None,
            created_in_layer: LayerMode::Areas,
        },
    ];
    boxed.shape_annotations = vec![ShapeAnnotation {
        id: Uuid::new_v4(),
        shape: ShapeKind::Ellipse,
        position: Position::new(0.0, 0.0),
        width: 10.0,
        height: 10.0,
        stroke_color: None,
        fill_color: None,
        created_in_layer: LayerMode::Children,
    }];
    let snapshot = WorkspaceSnapshot {
        graph_frames: vec![boxed],
        ..WorkspaceSnapshot::default()
    };

    let projection = project(&snapshot, &ProjectionQuery::default());
    let data = projection.nodes[0].frame.as_ref().unwrap();
    assert_eq!(data.text_annotations.len(), 1);
    assert_eq!(data.text_annotations[0].text, "here");
    assert!(data.shape_annotations.is_empty());
}

#[test]
fn tag_filter_matches_tags_stored_without_normalization() {
    let area_id = "7f0c3a52-5e1b-4b57-9a43-3f3c1d0e8a11";
    let rust_id = "0d4f1a3e-8a5c-4c1e-9e5b-1f2a3b4c5d6e";
    let raw = serde_json::json!({
        "areas": [{"id": area_id, "name": "Lab", "created_at": 1, "updated_at": 1}],
        "contents": [
            {"id": rust_id, "area_id": area_id, "title": "rust", "tags": [" Rust ", "Graph"], "created_at": 1, "updated_at": 1},
            {"id": "1e5a2b4f-9b6d-4d2f-8f6c-2a3b4c5d6e7f", "area_id": area_id, "title": "other", "tags": ["Go"], "created_at": 1, "updated_at": 1}
        ]
    });
    let snapshot: WorkspaceSnapshot = serde_json::from_value(raw).unwrap();

    let unfiltered = project(&snapshot, &ProjectionQuery::default());
    assert_eq!(unfiltered.nodes.len(), 2);

    let rust = project(&snapshot, &ProjectionQuery::default().with_tags(["Rust"]));
    assert_eq!(node_ids(&rust), vec![rust_id.to_string()]);

    let both = project(
        &snapshot,
        &ProjectionQuery::default().with_tags(["rust", "GRAPH"]),
    );
    assert_eq!(node_ids(&both), vec![rust_id.to_string()]);
}
