use crate::config::RoutingConfig;

use super::{Channel, ConnectionKind, LineStyle, PathKind, PlacedNode, RoutedPath};

/// Footprint of a placed device grid, edges included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    /// Rightmost x an outer corridor may use before it runs into whatever
    /// sits beside the grid.
    pub corridor_limit: Option<f32>,
}

impl GridBounds {
    /// Bounds of `nodes` treating each as a `width` x `height` box around its
    /// centre. `None` for an empty slice.
    pub fn around(nodes: &[&PlacedNode], width: f32, height: f32) -> Option<Self> {
        let first = nodes.first()?;
        let mut bounds = GridBounds {
            left: first.x,
            right: first.x,
            top: first.y,
            bottom: first.y,
            corridor_limit: None,
        };
        for node in nodes.iter().skip(1) {
            bounds.left = bounds.left.min(node.x);
            bounds.right = bounds.right.max(node.x);
            bounds.top = bounds.top.min(node.y);
            bounds.bottom = bounds.bottom.max(node.y);
        }
        bounds.left -= width / 2.0;
        bounds.right += width / 2.0;
        bounds.top -= height / 2.0;
        bounds.bottom += height / 2.0;
        Some(bounds)
    }

    pub fn with_corridor_limit(mut self, limit: f32) -> Self {
        self.corridor_limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub kind: ConnectionKind,
    pub channel: Channel,
    pub style: LineStyle,
    /// Perpendicular bow of a curve; ignored by orthogonal routes.
    pub offset: f32,
    /// Grid the orthogonal routes must stay clear of.
    pub grid: Option<GridBounds>,
}

impl RouteRequest {
    pub fn link(channel: Channel, style: LineStyle, offset: f32) -> Self {
        Self {
            kind: ConnectionKind::Link,
            channel,
            style,
            offset,
            grid: None,
        }
    }

    pub fn ring_entry(grid: GridBounds) -> Self {
        Self {
            kind: ConnectionKind::RingEntry,
            channel: Channel::RingEntry,
            style: LineStyle::Solid,
            offset: 0.0,
            grid: Some(grid),
        }
    }

    pub fn ring_exit(grid: GridBounds) -> Self {
        Self {
            kind: ConnectionKind::RingExit,
            ..Self::ring_entry(grid)
        }
    }
}

pub fn route(
    id: String,
    from: &PlacedNode,
    to: &PlacedNode,
    request: &RouteRequest,
    config: &RoutingConfig,
) -> RoutedPath {
    let (kind, points) = match (request.kind, request.grid) {
        (ConnectionKind::RingEntry, Some(grid)) => (
            PathKind::Orthogonal,
            entry_points(from.position(), to.position(), &grid, config),
        ),
        (ConnectionKind::RingExit, Some(grid)) => (
            PathKind::Orthogonal,
            exit_points(from.position(), to.position(), &grid, config),
        ),
        _ => (
            PathKind::Curve,
            curve_points(from.position(), to.position(), request.offset),
        ),
    };
    RoutedPath {
        id,
        from: from.id.clone(),
        to: to.id.clone(),
        kind,
        channel: request.channel,
        style: request.style,
        points,
    }
}

/// `[start, control, end]` of a quadratic curve whose control point sits
/// `offset` away from the midpoint, perpendicular to the chord.
pub fn curve_points(from: (f32, f32), to: (f32, f32), offset: f32) -> Vec<(f32, f32)> {
    let mid_x = (from.0 + to.0) / 2.0;
    let mid_y = (from.1 + to.1) / 2.0;
    let nx = to.1 - from.1;
    let ny = from.0 - to.0;
    let len = (nx * nx + ny * ny).sqrt();
    let control = if len > f32::EPSILON {
        (mid_x + nx / len * offset, mid_y + ny / len * offset)
    } else {
        (mid_x, mid_y)
    };
    vec![from, control, to]
}

/// Box to first ring member: out to the lane left of the box, down into the
/// corridor above the grid, across to the member's column, down to it.
pub fn entry_points(
    owner: (f32, f32),
    first: (f32, f32),
    grid: &GridBounds,
    config: &RoutingConfig,
) -> Vec<(f32, f32)> {
    let lane_x = owner.0 - config.lane_offset;
    let mut corridor_y = grid.top - config.vertical_clearance / 2.0;
    if corridor_y <= owner.1 {
        corridor_y = (owner.1 + grid.top) / 2.0;
    }
    vec![
        owner,
        (lane_x, owner.1),
        (lane_x, corridor_y),
        (first.0, corridor_y),
        first,
    ]
}

/// Last ring member back to its box: down below the grid, out past its outer
/// edge, up that outer corridor to just under the box, then in to the lane
/// right of the box. No segment crosses the grid's footprint.
pub fn exit_points(
    last: (f32, f32),
    owner: (f32, f32),
    grid: &GridBounds,
    config: &RoutingConfig,
) -> Vec<(f32, f32)> {
    let lane_x = owner.0 + config.lane_offset;
    let below_y = grid.bottom + config.vertical_clearance / 2.0;
    let mut outer_x = grid.right + config.outer_margin;
    if let Some(limit) = grid.corridor_limit {
        if limit > grid.right {
            outer_x = outer_x.min(limit);
        }
    }
    let return_y = owner.1 + config.vertical_clearance / 2.0;
    vec![
        last,
        (last.0, below_y),
        (outer_x, below_y),
        (outer_x, return_y),
        (lane_x, return_y),
        (lane_x, owner.1),
    ]
}
