//! Parallel redundancy: gateway on top, one virtual switch per network, and
//! every other device in a centred wrapping grid below them.

use crate::topology::{Node, TopologySnapshot};

use super::{Channel, LayoutSession, PlacedNode, SWITCH_A_ID, SWITCH_B_ID};

pub(super) fn place(snapshot: &TopologySnapshot, session: &mut LayoutSession<'_>) {
    let config = &session.config().dual_star;
    let width = config.canvas_width;

    let gateway = snapshot.nodes.iter().find(|node| node.is_gateway());
    let leaves: Vec<&Node> = snapshot
        .nodes
        .iter()
        .filter(|node| !node.is_gateway())
        .collect();

    let per_row = (((width - config.side_margin) / config.slot_width).floor() as usize).max(1);
    let rows = leaves.len().div_ceil(per_row);
    let needed = config.leaf_start_y + rows as f32 * config.row_height + config.bottom_padding;
    session.resize(width, needed.max(config.min_height));

    if let Some(gateway) = gateway {
        session.place(PlacedNode::from_node(gateway, width / 2.0, config.gateway_y, 1.0));
    }
    session.place(PlacedNode::virtual_switch(
        SWITCH_A_ID,
        "Switch A",
        width * config.switch_a_ratio,
        config.switch_y,
    ));
    session.place(PlacedNode::virtual_switch(
        SWITCH_B_ID,
        "Switch B",
        width * config.switch_b_ratio,
        config.switch_y,
    ));
    if let Some(gateway) = gateway {
        session.link_network(SWITCH_A_ID, &gateway.id, Channel::NetworkA, 0.0);
        session.link_network(SWITCH_B_ID, &gateway.id, Channel::NetworkB, 0.0);
    }

    for (idx, leaf) in leaves.iter().enumerate() {
        let row = idx / per_row;
        let col = idx % per_row;
        let in_row = if row + 1 == rows {
            match leaves.len() % per_row {
                0 => per_row,
                rest => rest,
            }
        } else {
            per_row
        };
        let row_width = in_row as f32 * config.slot_width;
        let x = (width - row_width) / 2.0 + config.slot_width / 2.0 + col as f32 * config.slot_width;
        let y = config.leaf_start_y + row as f32 * config.row_height;
        if !session.place(PlacedNode::from_node(leaf, x, y, 1.0)) {
            continue;
        }

        if leaf.attachment.on_a() {
            session.link_network(&leaf.id, SWITCH_A_ID, Channel::NetworkA, 0.0);
        }
        if leaf.attachment.on_b() {
            session.link_network(&leaf.id, SWITCH_B_ID, Channel::NetworkB, 0.0);
        }
    }

    if config.show_logical_links {
        for connection in &snapshot.connections {
            link_declared(session, &connection.from, &connection.to);
        }
    }
}

// A link touching a switch is one cable on that switch's network; anything
// else is a logical relationship carried on both networks.
fn link_declared(session: &mut LayoutSession<'_>, from: &str, to: &str) {
    let touches = |id: &str| from == id || to == id;
    if touches(SWITCH_A_ID) {
        session.link_network(from, to, Channel::NetworkA, 0.0);
    } else if touches(SWITCH_B_ID) {
        session.link_network(from, to, Channel::NetworkB, 0.0);
    } else {
        session.link_dual(from, to);
    }
}
