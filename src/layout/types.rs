use serde::Serialize;

use crate::topology::{Attachment, DeviceKind, Node, NodeStatus};

/// Id of the virtual switch for network A created by dual-star and mixed passes.
pub const SWITCH_A_ID: &str = "switch-a";
/// Id of the virtual switch for network B.
pub const SWITCH_B_ID: &str = "switch-b";

/// Which placement policy a pass ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Architecture {
    /// Parallel redundancy: every device dual-homed to two switches.
    DualStar,
    /// Seamless redundancy: one physical ring.
    Ring,
    /// Rings behind redundancy boxes on a parallel backbone.
    Mixed,
}

impl Architecture {
    pub fn label(self) -> &'static str {
        match self {
            Self::DualStar => "PRP",
            Self::Ring => "HSR",
            Self::Mixed => "PRP+HSR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: String,
    pub name: String,
    pub kind: DeviceKind,
    pub status: NodeStatus,
    pub attachment: Attachment,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    /// Created by the engine rather than present in the snapshot.
    pub synthetic: bool,
}

impl PlacedNode {
    pub fn from_node(node: &Node, x: f32, y: f32, scale: f32) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind,
            status: node.status,
            attachment: node.attachment,
            x,
            y,
            scale,
            synthetic: false,
        }
    }

    pub fn virtual_switch(id: &str, name: &str, x: f32, y: f32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: DeviceKind::Switch,
            status: NodeStatus::Online,
            attachment: Attachment::Both,
            x,
            y,
            scale: 1.0,
            synthetic: true,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathKind {
    /// Quadratic curve; geometry is `[start, control, end]`.
    Curve,
    /// Axis-aligned polyline; geometry is every corner in order.
    Orthogonal,
}

/// Logical network a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    NetworkA,
    NetworkB,
    Ring,
    RingEntry,
}

impl Channel {
    pub fn class_name(self) -> &'static str {
        match self {
            Self::NetworkA => "network-a",
            Self::NetworkB => "network-b",
            Self::Ring | Self::RingEntry => "hsr-ring",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// What a connection means, which decides how it is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionKind {
    /// One physical link, drawn as a single curve.
    Link,
    /// A box entering its ring grid at the first member.
    RingEntry,
    /// The last ring member returning to its box around the grid.
    RingExit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedPath {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: PathKind,
    pub channel: Channel,
    pub style: LineStyle,
    pub points: Vec<(f32, f32)>,
}

impl RoutedPath {
    pub fn control_point(&self) -> Option<(f32, f32)> {
        match self.kind {
            PathKind::Curve if self.points.len() == 3 => Some(self.points[1]),
            _ => None,
        }
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// Emitted once per completed pass for status badges and similar observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNotice {
    pub architecture: Architecture,
    pub label: &'static str,
    pub node_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub architecture: Architecture,
    pub nodes: Vec<PlacedNode>,
    pub paths: Vec<RoutedPath>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn paths_between<'a>(
        &'a self,
        a: &'a str,
        b: &'a str,
    ) -> impl Iterator<Item = &'a RoutedPath> + 'a {
        self.paths.iter().filter(move |path| path.connects(a, b))
    }

    /// Applies a status refresh in place. Positions and routes are untouched.
    pub fn update_status(&mut self, id: &str, status: NodeStatus) -> bool {
        match self.nodes.iter_mut().find(|node| node.id == id) {
            Some(node) => {
                node.status = status;
                true
            }
            None => false,
        }
    }

    pub fn notice(&self) -> LayoutNotice {
        LayoutNotice {
            architecture: self.architecture,
            label: self.architecture.label(),
            node_count: self.nodes.iter().filter(|node| !node.synthetic).count(),
        }
    }
}
