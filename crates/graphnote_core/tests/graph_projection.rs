use graphnote_core::graph::projection::{
    build_area_graph, build_children_graph, build_flat_graph, build_hierarchy_graph,
    HierarchyOptions,
};
use graphnote_core::graph::visual::{DEFAULT_CONTENT_COLOR, PARENT_EDGE_COLOR};
use graphnote_core::model::hierarchy::palette_color;
use graphnote_core::{
    project, Area, AreaScope, ArrowMode, Content, ContentStatus, HierarchyLevelConfig, LineStyle,
    Link, LinkType, NodeType, ProjectionQuery, WorkspaceSnapshot,
};

struct Research {
    snapshot: WorkspaceSnapshot,
    area: Area,
    a: Content,
    b: Content,
    c: Content,
}

fn research() -> Research {
    let mut area = Area::new("Research");
    let mut a = Content::new(Some(area.id), "A");
    a.emoji = Some("📘".to_string());
    let b = Content::new(Some(area.id), "B");
    let c = Content::new(Some(area.id), "C");
    area.content_ids = vec![a.id, b.id, c.id];

    let snapshot = WorkspaceSnapshot {
        areas: vec![area.clone()],
        contents: vec![a.clone(), b.clone(), c.clone()],
        links: vec![
            Link::parent(b.id, a.id).unwrap(),
            Link::parent(c.id, b.id).unwrap(),
        ],
        ..WorkspaceSnapshot::default()
    };
    Research {
        snapshot,
        area,
        a,
        b,
        c,
    }
}

fn ids(projection: &graphnote_core::GraphProjection) -> Vec<String> {
    projection.nodes.iter().map(|node| node.id.clone()).collect()
}

#[test]
fn hierarchy_graph_caps_depth_and_inherits_emoji() {
    let data = research();
    let projection =
        build_hierarchy_graph(&data.snapshot, None, 2, HierarchyOptions::default());

    assert_eq!(ids(&projection), vec![data.a.id.to_string(), data.b.id.to_string()]);
    assert!(!projection.contains_node(&data.c.id.to_string()));

    let a = projection.node(&data.a.id.to_string()).unwrap();
    assert_eq!(a.hierarchy_depth, Some(0));
    assert_eq!(a.is_inherited_style, Some(false));
    assert_eq!(a.level_name.as_deref(), Some("Level 1"));

    let b = projection.node(&data.b.id.to_string()).unwrap();
    assert_eq!(b.hierarchy_depth, Some(1));
    assert_eq!(b.emoji.as_deref(), Some("📘"));
    assert_eq!(b.is_inherited_style, Some(true));
    assert_eq!(b.color, palette_color(1));

    assert_eq!(projection.edges.len(), 1);
    let edge = &projection.edges[0];
    assert_eq!(edge.link_type, LinkType::Parent);
    assert_eq!(edge.source, data.b.id.to_string());
    assert_eq!(edge.target, data.a.id.to_string());
    assert_eq!(edge.color.as_deref(), Some(PARENT_EDGE_COLOR));
    assert_eq!(edge.line_style, Some(LineStyle::Dashed));
}

#[test]
fn children_graph_counts_depth_from_chosen_parent() {
    let data = research();
    let projection =
        build_children_graph(&data.snapshot, Some(data.a.id), 2, HierarchyOptions::default());

    assert_eq!(ids(&projection), vec![data.a.id.to_string(), data.b.id.to_string()]);
    assert_eq!(projection.edges.len(), 1);
    assert_eq!(projection.edges[0].source, data.b.id.to_string());
    assert_eq!(projection.edges[0].target, data.a.id.to_string());

    let rooted_at_b =
        build_children_graph(&data.snapshot, Some(data.b.id), 2, HierarchyOptions::default());
    assert_eq!(ids(&rooted_at_b), vec![data.b.id.to_string(), data.c.id.to_string()]);
    let b = rooted_at_b.node(&data.b.id.to_string()).unwrap();
    assert_eq!(b.hierarchy_depth, Some(0));
    // Nothing above the chosen parent is consulted for inheritance.
    assert_eq!(b.emoji, None);
    assert_eq!(b.is_inherited_style, Some(false));
}

#[test]
fn children_graph_rooted_on_a_loop_keeps_a_tree() {
    let a = Content::new(None, "a");
    let b = Content::new(None, "b");
    let snapshot = WorkspaceSnapshot {
        contents: vec![a.clone(), b.clone()],
        links: vec![
            Link::parent(a.id, b.id).unwrap(),
            Link::parent(b.id, a.id).unwrap(),
        ],
        ..WorkspaceSnapshot::default()
    };

    let projection = build_children_graph(&snapshot, Some(a.id), 8, HierarchyOptions::default());
    assert_eq!(ids(&projection), vec![a.id.to_string(), b.id.to_string()]);
    assert_eq!(projection.edges.len(), 1);
    assert_eq!(projection.edges[0].source, b.id.to_string());
    assert_eq!(projection.edges[0].target, a.id.to_string());
}

#[test]
fn children_graph_without_or_with_unknown_parent_is_empty() {
    let data = research();
    assert!(build_children_graph(&data.snapshot, None, 8, HierarchyOptions::default()).is_empty());
    assert!(build_children_graph(
        &data.snapshot,
        Some(uuid::Uuid::new_v4()),
        8,
        HierarchyOptions::default()
    )
    .is_empty());
}

#[test]
fn parent_edges_can_be_hidden() {
    let data = research();
    let projection = build_hierarchy_graph(
        &data.snapshot,
        None,
        8,
        HierarchyOptions {
            show_parent_edges: false,
        },
    );
    assert_eq!(projection.nodes.len(), 3);
    assert!(projection.edges.is_empty());
}

#[test]
fn area_graph_rolls_up_content_counts() {
    let mut x = Area::new("X");
    let y = Area::new("Y");
    let contents: Vec<Content> = (0..5)
        .map(|index| Content::new(Some(x.id), format!("x{index}")))
        .collect();
    x.content_ids = contents.iter().map(|content| content.id).collect();
    let snapshot = WorkspaceSnapshot {
        areas: vec![x.clone(), y.clone()],
        contents,
        ..WorkspaceSnapshot::default()
    };

    let projection = build_area_graph(&snapshot);
    assert_eq!(projection.nodes.len(), 2);
    assert!(projection.edges.is_empty());
    assert_eq!(projection.nodes[0].node_type, NodeType::Area);
    assert_eq!(projection.nodes[0].content_count, Some(5));
    assert_eq!(projection.nodes[1].content_count, Some(0));
}

#[test]
fn flat_graph_skips_open_contents_and_uses_own_color() {
    let area = Area::new("Inbox");
    let mut styled = Content::new(Some(area.id), "styled");
    styled.node_color = Some("#ff8800".to_string());
    let plain = Content::new(Some(area.id), "plain");
    let mut open = Content::new(Some(area.id), "draft");
    open.status = ContentStatus::Open;
    let stray = Content::new(Some(uuid::Uuid::new_v4()), "stray");
    let orphan = Content::new(None, "orphan");

    let manual = Link::new(styled.id, plain.id, LinkType::Manual).unwrap();
    let to_open = Link::new(styled.id, open.id, LinkType::Manual).unwrap();
    let auto = Link::auto(plain.id, orphan.id, "project").unwrap();
    let snapshot = WorkspaceSnapshot {
        areas: vec![area.clone()],
        contents: vec![styled.clone(), plain.clone(), open, stray, orphan.clone()],
        links: vec![manual.clone(), to_open, auto.clone()],
        ..WorkspaceSnapshot::default()
    };

    let all = build_flat_graph(&snapshot, None);
    assert_eq!(
        ids(&all),
        vec![
            styled.id.to_string(),
            plain.id.to_string(),
            orphan.id.to_string()
        ]
    );
    assert_eq!(all.nodes[0].color, "#ff8800");
    assert_eq!(all.nodes[1].color, DEFAULT_CONTENT_COLOR);
    assert_eq!(all.edges.len(), 2);
    assert_eq!(all.edges[0].link_id, manual.id);
    assert_eq!(all.edges[1].link_id, auto.id);
    assert_eq!(all.edges[1].arrow_mode, Some(ArrowMode::Both));

    let scoped = build_flat_graph(&snapshot, Some(area.id));
    assert_eq!(ids(&scoped), vec![styled.id.to_string(), plain.id.to_string()]);
    assert_eq!(scoped.edges.len(), 1);
}

#[test]
fn parent_cycle_degrades_to_flagged_roots() {
    let contents: Vec<Content> = (0..4)
        .map(|index| Content::new(None, format!("loop{index}")))
        .collect();
    let mut links: Vec<Link> = (0..4)
        .map(|index| Link::parent(contents[index].id, contents[(index + 1) % 4].id).unwrap())
        .collect();
    let tail = Content::new(None, "tail");
    links.push(Link::parent(tail.id, contents[0].id).unwrap());
    let mut all = contents.clone();
    all.push(tail.clone());
    let snapshot = WorkspaceSnapshot {
        contents: all,
        links,
        ..WorkspaceSnapshot::default()
    };

    let projection = build_hierarchy_graph(&snapshot, None, 8, HierarchyOptions::default());
    assert_eq!(projection.nodes.len(), 5);
    for content in &contents {
        let node = projection.node(&content.id.to_string()).unwrap();
        assert_eq!(node.hierarchy_depth, Some(0));
        assert!(node.in_cycle);
    }
    let tail_node = projection.node(&tail.id.to_string()).unwrap();
    assert_eq!(tail_node.hierarchy_depth, Some(1));
    assert!(!tail_node.in_cycle);
}

#[test]
fn hierarchy_depth_is_parent_depth_plus_one() {
    let data = research();
    let projection = build_hierarchy_graph(&data.snapshot, None, 8, HierarchyOptions::default());
    for link in &data.snapshot.links {
        let child = projection.node(&link.from_content_id.to_string()).unwrap();
        let parent = projection.node(&link.to_content_id.to_string()).unwrap();
        assert_eq!(
            child.hierarchy_depth.unwrap(),
            parent.hierarchy_depth.unwrap() + 1
        );
    }
}

#[test]
fn unstyled_chain_falls_back_to_level_color() {
    let mut data = research();
    data.snapshot.contents[0].emoji = None;
    let projection = build_hierarchy_graph(&data.snapshot, None, 8, HierarchyOptions::default());
    for (depth, node) in projection.nodes.iter().enumerate() {
        assert_eq!(node.color, palette_color(depth));
        assert_eq!(node.emoji, None);
        assert_eq!(node.is_inherited_style, Some(false));
    }
}

#[test]
fn area_scoped_level_excludes_other_areas() {
    let mut data = research();
    let other_area = Area::new("Elsewhere");
    let mut levels = HierarchyLevelConfig::default_table();
    levels[1].name = "Topic".to_string();
    levels[1].area_scope = AreaScope::Specific;
    levels[1].area_ids = vec![other_area.id];
    data.snapshot.areas.push(other_area);
    data.snapshot.hierarchy_level_configs = Some(levels);

    let projection = build_hierarchy_graph(&data.snapshot, None, 8, HierarchyOptions::default());
    assert_eq!(
        ids(&projection),
        vec![data.a.id.to_string(), data.c.id.to_string()]
    );
    // B is excluded, so neither parent edge survives.
    assert!(projection.edges.is_empty());

    let mut in_scope = research();
    let mut levels = HierarchyLevelConfig::default_table();
    levels[1].name = "Topic".to_string();
    levels[1].area_scope = AreaScope::Specific;
    levels[1].area_ids = vec![in_scope.area.id];
    in_scope.snapshot.hierarchy_level_configs = Some(levels);
    let projection =
        build_hierarchy_graph(&in_scope.snapshot, None, 8, HierarchyOptions::default());
    let b = projection.node(&in_scope.b.id.to_string()).unwrap();
    assert_eq!(b.level_name.as_deref(), Some("Topic"));
}

#[test]
fn missing_level_row_falls_back_to_numbered_level() {
    let mut data = research();
    data.snapshot.hierarchy_level_configs = Some(vec![HierarchyLevelConfig {
        depth: 0,
        name: "Root".to_string(),
        color: "#000000".to_string(),
        area_scope: AreaScope::All,
        area_ids: Vec::new(),
    }]);
    let projection = build_hierarchy_graph(&data.snapshot, None, 8, HierarchyOptions::default());
    assert_eq!(projection.nodes[0].level_name.as_deref(), Some("Root"));
    assert_eq!(projection.nodes[2].level_name.as_deref(), Some("Level 3"));
    assert_eq!(projection.nodes[2].color, palette_color(2));
}

#[test]
fn project_is_idempotent() {
    let data = research();
    let query = ProjectionQuery::hierarchy(Some(data.area.id), 3).with_tags(Vec::<String>::new());
    let first = project(&data.snapshot, &query);
    let second = project(&data.snapshot, &query);
    assert_eq!(first, second);
    assert_eq!(first.nodes.len(), 3);
}

#[test]
fn project_clamps_requested_levels() {
    let data = research();
    let zero = project(&data.snapshot, &ProjectionQuery::hierarchy(None, 0));
    assert_eq!(ids(&zero), vec![data.a.id.to_string()]);
    let huge = project(&data.snapshot, &ProjectionQuery::hierarchy(None, 100));
    assert_eq!(huge.nodes.len(), 3);
}
