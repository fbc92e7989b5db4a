//! Seamless redundancy: every device on one circle, gateway at twelve o'clock.

use std::f32::consts::PI;

use crate::topology::TopologySnapshot;

use super::{Channel, LayoutSession, LineStyle, PlacedNode, routing::RouteRequest};

pub(super) fn place(snapshot: &TopologySnapshot, session: &mut LayoutSession<'_>) {
    let config = &session.config().ring;
    session.resize(config.canvas_width, config.canvas_height);

    let total = snapshot.nodes.len();
    if total == 0 {
        return;
    }
    let radius = (config.base_radius + total as f32 * config.radius_step).min(config.max_radius);
    let step = 2.0 * PI / total as f32;

    let gateway = snapshot.nodes.iter().position(|node| node.is_gateway());
    if let Some(idx) = gateway {
        let node = &snapshot.nodes[idx];
        session.place(PlacedNode::from_node(
            node,
            config.center_x,
            config.center_y - radius,
            1.0,
        ));
    }

    // Clockwise from just past the top.
    let others = snapshot
        .nodes
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != gateway)
        .map(|(_, node)| node);
    for (i, node) in others.enumerate() {
        let angle = -PI / 2.0 + step * (i + 1) as f32;
        session.place(PlacedNode::from_node(
            node,
            config.center_x + radius * angle.cos(),
            config.center_y + radius * angle.sin(),
            1.0,
        ));
    }

    // Adjacency is trusted as declared; cycle completeness is the caller's.
    for connection in &snapshot.connections {
        session.route(
            &connection.from,
            &connection.to,
            RouteRequest::link(Channel::Ring, LineStyle::Solid, 0.0),
        );
    }
}
