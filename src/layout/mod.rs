mod dual_star;
pub mod grouping;
mod mixed;
pub mod optimizer;
mod ring;
pub mod routing;
pub(crate) mod types;
pub use types::*;

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::topology::{RedundancyKind, TopologySnapshot};
use grouping::{NamingConventionClassifier, SideClassifier};
use routing::RouteRequest;

/// Picks the placement policy for a snapshot. Any redundancy box means rings
/// behind a parallel backbone, whatever the declared type says.
pub fn detect_architecture(snapshot: &TopologySnapshot) -> Architecture {
    if snapshot.has_redundancy_box() {
        Architecture::Mixed
    } else if snapshot.kind == RedundancyKind::Hsr {
        Architecture::Ring
    } else {
        Architecture::DualStar
    }
}

/// Caller overrides for one pass.
#[derive(Default, Clone, Copy)]
pub struct LayoutOptions<'a> {
    /// Skips detection and runs this policy.
    pub architecture: Option<Architecture>,
    /// Replaces the naming-convention classifier used to group ring devices.
    pub classifier: Option<&'a dyn SideClassifier>,
}

pub fn compute_layout(snapshot: &TopologySnapshot, config: &LayoutConfig) -> Layout {
    compute_layout_with(snapshot, config, &LayoutOptions::default(), None)
}

/// Runs one full layout pass. Never fails: missing references and empty
/// groups degrade the result instead. `observer` hears about the finished
/// pass exactly once.
pub fn compute_layout_with(
    snapshot: &TopologySnapshot,
    config: &LayoutConfig,
    options: &LayoutOptions<'_>,
    observer: Option<&mut dyn FnMut(&LayoutNotice)>,
) -> Layout {
    let requested = options
        .architecture
        .unwrap_or_else(|| detect_architecture(snapshot));
    let default_classifier;
    let classifier: &dyn SideClassifier = match options.classifier {
        Some(classifier) => classifier,
        None => {
            default_classifier = NamingConventionClassifier::new(&config.classifier);
            &default_classifier
        }
    };

    let mut session = LayoutSession::new(config);
    let architecture = match requested {
        Architecture::Ring => {
            ring::place(snapshot, &mut session);
            Architecture::Ring
        }
        Architecture::Mixed if snapshot.has_redundancy_box() => {
            mixed::place(snapshot, &mut session, classifier);
            Architecture::Mixed
        }
        Architecture::Mixed => {
            log::info!("no redundancy boxes in snapshot, using dual-star placement");
            dual_star::place(snapshot, &mut session);
            Architecture::DualStar
        }
        Architecture::DualStar => {
            dual_star::place(snapshot, &mut session);
            Architecture::DualStar
        }
    };

    let layout = session.finish(architecture);
    log::debug!(
        "{} layout: {} nodes, {} paths, {}x{}",
        architecture.label(),
        layout.nodes.len(),
        layout.paths.len(),
        layout.width,
        layout.height
    );
    if let Some(observer) = observer {
        observer(&layout.notice());
    }
    layout
}

/// Working state of one layout pass: the placed-node table, the routed paths
/// and the path id counter. Built fresh per pass and consumed by `finish`.
pub struct LayoutSession<'c> {
    config: &'c LayoutConfig,
    nodes: Vec<PlacedNode>,
    index: HashMap<String, usize>,
    paths: Vec<RoutedPath>,
    path_counter: usize,
    width: f32,
    height: f32,
}

impl<'c> LayoutSession<'c> {
    pub fn new(config: &'c LayoutConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            index: HashMap::new(),
            paths: Vec::new(),
            path_counter: 0,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn config(&self) -> &'c LayoutConfig {
        self.config
    }

    /// Adds a node unless its id is already taken; the first placement wins.
    pub fn place(&mut self, node: PlacedNode) -> bool {
        if self.index.contains_key(&node.id) {
            log::warn!("node {} placed twice, keeping first position", node.id);
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn placed(&self, id: &str) -> Option<&PlacedNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Routes between two placed nodes. A missing endpoint drops the
    /// connection and returns `false`.
    pub fn route(&mut self, from: &str, to: &str, request: RouteRequest) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (self.index.get(from), self.index.get(to)) else {
            log::warn!("dropping connection {from} -> {to}: endpoint not placed");
            return false;
        };
        self.path_counter += 1;
        let class = request.channel.class_name();
        let id = match request.kind {
            ConnectionKind::Link => format!("{class}-{}", self.path_counter),
            ConnectionKind::RingEntry | ConnectionKind::RingExit => {
                format!("{class}-orthogonal-{}", self.path_counter)
            }
        };
        let path = routing::route(
            id,
            &self.nodes[from_idx],
            &self.nodes[to_idx],
            &request,
            &self.config.routing,
        );
        self.paths.push(path);
        true
    }

    /// One physical link on the network the switch belongs to. Network A is
    /// solid, network B dashed.
    pub fn link_network(&mut self, from: &str, to: &str, channel: Channel, offset: f32) -> bool {
        let style = match channel {
            Channel::NetworkB => LineStyle::Dashed,
            _ => LineStyle::Solid,
        };
        self.route(from, to, RouteRequest::link(channel, style, offset))
    }

    /// One relationship carried on both networks: two curves bowed apart.
    pub fn link_dual(&mut self, from: &str, to: &str) -> bool {
        let offset = self.config.routing.dual_offset;
        self.link_network(from, to, Channel::NetworkA, -offset)
            && self.link_network(from, to, Channel::NetworkB, offset)
    }

    pub fn finish(self, architecture: Architecture) -> Layout {
        Layout {
            architecture,
            nodes: self.nodes,
            paths: self.paths,
            width: self.width,
            height: self.height,
        }
    }
}
