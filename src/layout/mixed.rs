//! Rings behind redundancy boxes on a parallel backbone.
//!
//! Four layers: gateway, the two virtual switches, the boxes, then one device
//! grid per box. Each box owns an equal-width column slot of the canvas and
//! its grid is sized by the optimizer, filled in snake order and chained so
//! consecutive ring members sit next to each other.

use crate::config::OptimizerConfig;
use crate::topology::{DeviceKind, Node, TopologySnapshot};

use super::grouping::{SideClassifier, group_leaves_by_owner};
use super::optimizer::optimize_grid;
use super::routing::{GridBounds, RouteRequest};
use super::{Channel, LayoutSession, LineStyle, PlacedNode, SWITCH_A_ID, SWITCH_B_ID};

pub(super) fn place(
    snapshot: &TopologySnapshot,
    session: &mut LayoutSession<'_>,
    classifier: &dyn SideClassifier,
) {
    let config = session.config();
    let mixed = &config.mixed;
    let width = (mixed.viewport_width * mixed.viewport_fill).floor();
    let center = width / 2.0;
    let switch_offset = width * mixed.switch_offset_ratio;

    let gateway = snapshot.nodes.iter().find(|node| node.is_gateway());
    let boxes: Vec<&Node> = snapshot
        .nodes
        .iter()
        .filter(|node| node.kind == DeviceKind::RedundancyBox)
        .collect();
    let leaves: Vec<&Node> = snapshot
        .nodes
        .iter()
        .filter(|node| !node.is_gateway() && node.kind != DeviceKind::RedundancyBox)
        .collect();

    if let Some(gateway) = gateway {
        session.place(PlacedNode::from_node(gateway, center, mixed.gateway_y, 1.0));
    }
    session.place(PlacedNode::virtual_switch(
        SWITCH_A_ID,
        "Switch A",
        center - switch_offset,
        mixed.switch_y,
    ));
    session.place(PlacedNode::virtual_switch(
        SWITCH_B_ID,
        "Switch B",
        center + switch_offset,
        mixed.switch_y,
    ));
    if let Some(gateway) = gateway {
        session.link_network(&gateway.id, SWITCH_A_ID, Channel::NetworkA, 0.0);
        session.link_network(&gateway.id, SWITCH_B_ID, Channel::NetworkB, 0.0);
    }

    let box_count = boxes.len();
    for (idx, owner) in boxes.iter().enumerate() {
        let x = if box_count == 2 {
            if idx == 0 {
                center - switch_offset
            } else {
                center + switch_offset
            }
        } else {
            width / (box_count + 1) as f32 * (idx + 1) as f32
        };
        if !session.place(PlacedNode::from_node(owner, x, mixed.box_y, 1.0)) {
            continue;
        }
        session.link_network(&owner.id, SWITCH_A_ID, Channel::NetworkA, -mixed.uplink_offset);
        session.link_network(&owner.id, SWITCH_B_ID, Channel::NetworkB, mixed.uplink_offset);
    }

    let grouping = group_leaves_by_owner(&leaves, &boxes, classifier);
    let slot_width = width / box_count.max(1) as f32;
    let available = slot_width - 2.0 * mixed.edge_margin;

    let mut max_rows = 0;
    let mut max_row_spacing: f32 = 0.0;
    for (slot, bucket) in grouping.buckets.iter().enumerate() {
        if bucket.members.is_empty() {
            log::warn!("redundancy box {} has no ring devices", bucket.owner_id);
            continue;
        }
        let grid = GroupGrid::new(bucket.members.len(), available, &config.optimizer);
        log::debug!(
            "{}: {} devices in {}x{} at scale {:.2} (score {:.0})",
            bucket.owner_id,
            bucket.members.len(),
            grid.columns,
            grid.rows,
            grid.scale,
            grid.score
        );
        max_rows = max_rows.max(grid.rows);
        max_row_spacing = max_row_spacing.max(grid.row_spacing);

        let slot_left = slot as f32 * slot_width;
        let start_x = slot_left
            + mixed.edge_margin
            + grid.centering(available, mixed.centering_share)
            + grid.device_width / 2.0;

        let mut chain: Vec<&str> = Vec::with_capacity(bucket.members.len());
        for (idx, member) in bucket.members.iter().enumerate() {
            let (row, col) = grid.snake_cell(idx);
            let x = start_x + col as f32 * grid.column_spacing;
            let y = mixed.leaf_y + row as f32 * grid.row_spacing;
            if session.place(PlacedNode::from_node(member, x, y, grid.scale)) {
                chain.push(&member.id);
            }
        }

        for pair in chain.windows(2) {
            session.route(
                pair[0],
                pair[1],
                RouteRequest::link(Channel::Ring, LineStyle::Solid, 0.0),
            );
        }

        let placed: Vec<&PlacedNode> = chain.iter().filter_map(|id| session.placed(id)).collect();
        let Some(bounds) = GridBounds::around(&placed, grid.device_width, grid.device_height)
        else {
            continue;
        };
        let bounds = bounds.with_corridor_limit(slot_left + slot_width);
        if let (Some(first), Some(last)) = (chain.first(), chain.last()) {
            session.route(&bucket.owner_id, first, RouteRequest::ring_entry(bounds));
            session.route(last, &bucket.owner_id, RouteRequest::ring_exit(bounds));
        }
    }

    let height = mixed.leaf_y + max_rows as f32 * max_row_spacing + mixed.bottom_padding;
    session.resize(width, height);
}

/// Shrinks a grid that would overflow its slot, as the fallback grid does in
/// narrow slots. Below `min_scale` columns are dropped instead, so the grid
/// grows rows rather than becoming unreadable.
fn fit_to_slot(
    columns: usize,
    scale: f32,
    available: f32,
    optimizer: &OptimizerConfig,
) -> (usize, f32) {
    let unit = optimizer.unit_width();
    let mut columns = columns.max(1);
    if unit <= 0.0 || available <= 0.0 {
        return (columns, scale);
    }
    if available / (columns as f32 * unit) < optimizer.min_scale {
        let legible = (available / (unit * optimizer.min_scale)).floor() as usize;
        columns = legible.clamp(1, columns);
    }
    (columns, scale.min(available / (columns as f32 * unit)))
}

/// Scaled geometry of one ring group's grid.
struct GroupGrid {
    columns: usize,
    rows: usize,
    scale: f32,
    score: f32,
    device_width: f32,
    device_height: f32,
    gap_x: f32,
    column_spacing: f32,
    row_spacing: f32,
}

impl GroupGrid {
    fn new(count: usize, available: f32, optimizer: &OptimizerConfig) -> Self {
        let best = optimize_grid(count, available, optimizer);
        let (columns, scale) = fit_to_slot(best.columns, best.scale, available, optimizer);
        let device_width = optimizer.device_width * scale;
        let device_height = optimizer.device_height * scale;
        let gap_x = optimizer.gap_x * scale;
        Self {
            columns,
            rows: count.div_ceil(columns),
            scale,
            score: best.score,
            device_width,
            device_height,
            gap_x,
            column_spacing: device_width + gap_x,
            row_spacing: device_height + optimizer.gap_y * scale,
        }
    }

    fn width(&self) -> f32 {
        self.columns as f32 * self.column_spacing - self.gap_x
    }

    /// Groups lean toward the slot edge: only part of the spare width is used
    /// to push them inward.
    fn centering(&self, available: f32, share: f32) -> f32 {
        ((available - self.width()) * share).max(0.0)
    }

    /// Even rows run left to right, odd rows right to left.
    fn snake_cell(&self, idx: usize) -> (usize, usize) {
        let row = idx / self.columns;
        let col = idx % self.columns;
        if row % 2 == 1 {
            (row, self.columns - 1 - col)
        } else {
            (row, col)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::grouping::NamingConventionClassifier;
    use crate::layout::{Architecture, Layout, PathKind};
    use crate::topology::{
        GATEWAY_ID, RedundancyKind, SyntheticKind, SyntheticOptions, synthetic_topology,
    };

    fn run(snapshot: &TopologySnapshot, config: &LayoutConfig) -> Layout {
        let classifier = NamingConventionClassifier::new(&config.classifier);
        let mut session = LayoutSession::new(config);
        place(snapshot, &mut session, &classifier);
        session.finish(Architecture::Mixed)
    }

    fn mixed(count: usize) -> TopologySnapshot {
        synthetic_topology(&SyntheticOptions {
            kind: SyntheticKind::Mixed,
            node_count: count,
        })
    }

    /// Boxes with neutral names, so every device is balanced round-robin:
    /// `d{n}` lands in box `(n - 1) % boxes.len()`.
    fn neutral_boxes(boxes: &[&str], per_box: usize) -> TopologySnapshot {
        let mut snapshot = TopologySnapshot::new(RedundancyKind::Prp);
        snapshot
            .nodes
            .push(Node::new(GATEWAY_ID, "Gateway", DeviceKind::Gateway));
        for name in boxes {
            snapshot.nodes.push(Node::new(
                name.to_lowercase(),
                *name,
                DeviceKind::RedundancyBox,
            ));
        }
        for n in 1..=boxes.len() * per_box {
            snapshot
                .nodes
                .push(Node::new(format!("d{n}"), format!("D{n}"), DeviceKind::Ied));
        }
        snapshot
    }

    fn footprint(node: &PlacedNode, optimizer: &OptimizerConfig) -> (f32, f32, f32, f32) {
        let half_w = optimizer.device_width * node.scale / 2.0;
        let half_h = optimizer.device_height * node.scale / 2.0;
        (node.x - half_w, node.x + half_w, node.y - half_h, node.y + half_h)
    }

    #[test]
    fn layers_and_box_alignment() {
        let layout = run(&mixed(8), &LayoutConfig::default());
        // floor(1920 * 0.98)
        assert_eq!(layout.width, 1881.0);
        let gateway = layout.node(GATEWAY_ID).unwrap();
        assert_eq!((gateway.x, gateway.y), (940.5, 50.0));
        let switch_a = layout.node(SWITCH_A_ID).unwrap();
        let box_a = layout.node("redbox-a").unwrap();
        assert_eq!(switch_a.y, 160.0);
        assert_eq!(box_a.y, 280.0);
        assert_eq!(box_a.x, switch_a.x);
        let box_b = layout.node("redbox-b").unwrap();
        assert_eq!(box_b.x, layout.node(SWITCH_B_ID).unwrap().x);
    }

    #[test]
    fn boxes_uplink_to_both_switches() {
        let layout = run(&mixed(4), &LayoutConfig::default());
        for owner in ["redbox-a", "redbox-b"] {
            let a: Vec<_> = layout.paths_between(owner, SWITCH_A_ID).collect();
            let b: Vec<_> = layout.paths_between(owner, SWITCH_B_ID).collect();
            assert_eq!(a.len(), 1);
            assert_eq!(b.len(), 1);
            assert_eq!(b[0].style, LineStyle::Dashed);
        }
    }

    #[test]
    fn rings_are_snake_ordered_chains() {
        // 40 devices split 20/20; 18 columns is the only legible count.
        let layout = run(&mixed(40), &LayoutConfig::default());
        let first = layout.node("ringa-ied01").unwrap();
        let row_end = layout.node("ringa-ied18").unwrap();
        let turn = layout.node("ringa-ied19").unwrap();
        assert_eq!(first.y, 400.0);
        assert!(row_end.x > first.x);
        assert!(turn.y > row_end.y);
        assert!((turn.x - row_end.x).abs() < 1e-3);

        let chain = layout
            .paths
            .iter()
            .filter(|p| p.channel == Channel::Ring && p.from.starts_with("ringa-"))
            .count();
        assert_eq!(chain, 19);
        assert!(first.scale < 1.0 && first.scale >= 0.35);
    }

    #[test]
    fn exit_route_clears_the_grid() {
        let layout = run(&mixed(60), &LayoutConfig::default());
        for (owner, prefix) in [("redbox-a", "ringa-"), ("redbox-b", "ringb-")] {
            let max_x = layout
                .nodes
                .iter()
                .filter(|n| n.id.starts_with(prefix))
                .map(|n| n.x)
                .fold(f32::MIN, f32::max);
            let exit = layout
                .paths
                .iter()
                .find(|p| p.to == owner && p.kind == PathKind::Orthogonal)
                .unwrap();
            assert!(exit.id.contains("-orthogonal-"));
            let excursion = exit.points.iter().map(|p| p.0).fold(f32::MIN, f32::max);
            assert!(excursion > max_x, "{owner}: {excursion} <= {max_x}");
            let entry = layout
                .paths
                .iter()
                .find(|p| p.from == owner && p.kind == PathKind::Orthogonal)
                .unwrap();
            assert_eq!(entry.channel, Channel::RingEntry);
        }
    }

    #[test]
    fn height_follows_tallest_group() {
        let layout = run(&mixed(40), &LayoutConfig::default());
        let scale = layout.node("ringa-ied01").unwrap().scale;
        let row_spacing = (80.0 + 30.0) * scale;
        assert!((layout.height - (400.0 + 2.0 * row_spacing + 100.0)).abs() < 1e-2);
    }

    #[test]
    fn empty_box_is_skipped() {
        let mut snapshot = mixed(3);
        snapshot.nodes.retain(|n| !n.id.starts_with("ringb-"));
        let layout = run(&snapshot, &LayoutConfig::default());
        assert!(layout.node("redbox-b").is_some());
        let box_b_ring = layout
            .paths
            .iter()
            .filter(|p| p.connects("redbox-b", "ringa-ied01"))
            .count();
        assert_eq!(box_b_ring, 0);
    }

    #[test]
    fn single_member_ring_still_closes() {
        let layout = run(&mixed(2), &LayoutConfig::default());
        let kinds: Vec<_> = layout
            .paths
            .iter()
            .filter(|p| p.connects("redbox-a", "ringa-ied01"))
            .map(|p| p.kind)
            .collect();
        assert_eq!(kinds, vec![PathKind::Orthogonal, PathKind::Orthogonal]);
    }

    #[test]
    fn three_boxes_split_canvas_into_slots() {
        let mut snapshot = mixed(6);
        snapshot.nodes.push(Node::new(
            "redbox-c",
            "RedBox_C",
            DeviceKind::RedundancyBox,
        ));
        let layout = run(&snapshot, &LayoutConfig::default());
        let boxes: Vec<f32> = ["redbox-a", "redbox-b", "redbox-c"]
            .iter()
            .map(|id| layout.node(id).unwrap().x)
            .collect();
        let quarter = layout.width / 4.0;
        assert_eq!(boxes, vec![quarter, quarter * 2.0, quarter * 3.0]);
        let third = layout.width / 3.0;
        for node in layout.nodes.iter().filter(|n| n.id.starts_with("ringa-")) {
            assert!(node.x < third);
        }
    }

    #[test]
    fn ring_members_never_overlap_across_slots() {
        let config = LayoutConfig::default();
        let layout = run(&neutral_boxes(&["North", "South", "West"], 10), &config);
        let members: Vec<&PlacedNode> =
            layout.nodes.iter().filter(|n| n.id.starts_with('d')).collect();
        assert_eq!(members.len(), 30);
        for (i, a) in members.iter().enumerate() {
            let (al, ar, at, ab) = footprint(a, &config.optimizer);
            for b in &members[i + 1..] {
                let (bl, br, bt, bb) = footprint(b, &config.optimizer);
                let overlaps = al < br && bl < ar && at < bb && bt < ab;
                assert!(!overlaps, "{} at {} overlaps {} at {}", a.id, a.x, b.id, b.x);
            }
        }
    }

    #[test]
    fn full_groups_and_exits_stay_in_their_slot() {
        let config = LayoutConfig::default();
        let owners = ["North", "South", "West"];
        let layout = run(&neutral_boxes(&owners, 12), &config);
        let slot_width = layout.width / 3.0;

        for (slot, owner) in owners.iter().enumerate() {
            let owner_id = owner.to_lowercase();
            let slot_left = slot as f32 * slot_width;
            let slot_right = slot_left + slot_width;

            let members: Vec<&PlacedNode> = (1..=36)
                .filter(|n| (n - 1) % 3 == slot)
                .map(|n| layout.node(&format!("d{n}")).unwrap())
                .collect();
            assert_eq!(members.len(), 12);
            let mut grid_right = f32::MIN;
            for node in &members {
                let (left, right, _, _) = footprint(node, &config.optimizer);
                assert!(left >= slot_left && right <= slot_right, "{} leaves its slot", node.id);
                grid_right = grid_right.max(right);
            }
            // Twelve devices no longer fit one row of a narrow slot.
            assert!(members.iter().any(|n| n.y > members[0].y));

            let exit = layout
                .paths
                .iter()
                .find(|p| p.to == owner_id && p.kind == PathKind::Orthogonal)
                .unwrap();
            let excursion = exit.points.iter().map(|p| p.0).fold(f32::MIN, f32::max);
            assert!(excursion > grid_right, "{owner_id}: exit cuts through its grid");
            assert!(
                exit.points.iter().all(|p| p.0 > slot_left && p.0 <= slot_right),
                "{owner_id}: exit corridor leaves its slot"
            );
        }
    }
}
