use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TopologyError};

static TOKEN_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_\-]+").unwrap());

/// Id given to the gateway by the backend when it has no explicit kind tag.
pub const GATEWAY_ID: &str = "gateway";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Gateway,
    Switch,
    RedundancyBox,
    ProtectionRelay,
    Meter,
    Controller,
    Ied,
}

impl DeviceKind {
    /// Backend kind tags vary in case and separators: `RedBox`, `red_box`
    /// and `Redundancy Box` are the same kind.
    pub fn from_token(token: &str) -> Self {
        let token = TOKEN_SEPARATORS.replace_all(token.trim(), "");
        match token.to_ascii_lowercase().as_str() {
            "gateway" => Self::Gateway,
            "switch" => Self::Switch,
            "redbox" | "redundancybox" => Self::RedundancyBox,
            "protectionrelay" | "relay" => Self::ProtectionRelay,
            "meter" => Self::Meter,
            "controller" => Self::Controller,
            _ => Self::Ied,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "Gateway",
            Self::Switch => "Switch",
            Self::RedundancyBox => "RedBox",
            Self::ProtectionRelay => "ProtectionRelay",
            Self::Meter => "Meter",
            Self::Controller => "Controller",
            Self::Ied => "IED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Online,
    Warning,
    Error,
    Offline,
}

impl NodeStatus {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "warning" => Self::Warning,
            "error" => Self::Error,
            "offline" => Self::Offline,
            _ => Self::Online,
        }
    }
}

/// Which of the two parallel networks a device is wired into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Attachment {
    NetworkA,
    NetworkB,
    #[default]
    Both,
}

impl Attachment {
    /// Accepts `A`, `B`, `AB` and `Both`, optionally prefixed with
    /// `LAN`/`Network`/`PRP`. Anything else is treated as dual-attached.
    pub fn from_token(token: &str) -> Self {
        let token = TOKEN_SEPARATORS
            .replace_all(token.trim(), "")
            .to_ascii_uppercase();
        let side = ["NETWORK", "LAN", "PRP"]
            .iter()
            .find_map(|prefix| token.strip_prefix(*prefix))
            .unwrap_or(token.as_str());
        match side {
            "A" => Self::NetworkA,
            "B" => Self::NetworkB,
            "" | "AB" | "BA" | "BOTH" | "DUAL" => Self::Both,
            _ => {
                log::warn!("unrecognised connection {token:?}, assuming both networks");
                Self::Both
            }
        }
    }

    pub fn on_a(self) -> bool {
        matches!(self, Self::NetworkA | Self::Both)
    }

    pub fn on_b(self) -> bool {
        matches!(self, Self::NetworkB | Self::Both)
    }
}

/// Redundancy protocol declared by the snapshot's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RedundancyKind {
    Hsr,
    #[default]
    Prp,
}

impl RedundancyKind {
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("hsr") {
            Self::Hsr
        } else {
            Self::Prp
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hsr => "HSR",
            Self::Prp => "PRP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: DeviceKind,
    pub status: NodeStatus,
    pub attachment: Attachment,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            status: NodeStatus::Online,
            attachment: Attachment::Both,
        }
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = attachment;
        self
    }

    pub fn is_gateway(&self) -> bool {
        self.kind == DeviceKind::Gateway || self.id == GATEWAY_ID
    }

    /// Name used by naming-convention heuristics: the display name, or the id
    /// when the backend sent none.
    pub fn label_token(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Declared adjacency between two devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub kind: String,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: "GOOSE".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    pub kind: RedundancyKind,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

impl TopologySnapshot {
    pub fn new(kind: RedundancyKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn has_redundancy_box(&self) -> bool {
        self.nodes
            .iter()
            .any(|node| node.kind == DeviceKind::RedundancyBox)
    }
}

// Wire shape of the backend's `/topology` document. Everything is optional;
// fields the engine does not use (ip, GOOSE counters, statistics) are ignored.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    nodes: Vec<NodeFile>,
    #[serde(default)]
    connections: Vec<ConnectionFile>,
}

#[derive(Debug, Deserialize)]
struct NodeFile {
    id: String,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    status: Option<String>,
    connection: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConnectionFile {
    from: String,
    to: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl From<SnapshotFile> for TopologySnapshot {
    fn from(file: SnapshotFile) -> Self {
        let nodes = file
            .nodes
            .into_iter()
            .map(|raw| Node {
                name: raw.name.unwrap_or_else(|| raw.id.clone()),
                kind: raw
                    .kind
                    .as_deref()
                    .map(DeviceKind::from_token)
                    .unwrap_or(DeviceKind::Ied),
                status: raw
                    .status
                    .as_deref()
                    .map(NodeStatus::from_token)
                    .unwrap_or_default(),
                attachment: raw
                    .connection
                    .as_deref()
                    .map(Attachment::from_token)
                    .unwrap_or_default(),
                id: raw.id,
            })
            .collect();
        let connections = file
            .connections
            .into_iter()
            .map(|raw| Connection {
                from: raw.from,
                to: raw.to,
                kind: raw.kind.unwrap_or_else(|| "GOOSE".to_string()),
            })
            .collect();
        TopologySnapshot {
            kind: file
                .kind
                .as_deref()
                .map(RedundancyKind::from_token)
                .unwrap_or_default(),
            nodes,
            connections,
        }
    }
}

/// Parses a backend topology document. Strict JSON first, then JSON5 for
/// hand-written fixtures with comments or trailing commas.
pub fn parse_topology(input: &str) -> Result<TopologySnapshot> {
    let file: SnapshotFile = match serde_json::from_str(input) {
        Ok(file) => file,
        Err(strict) => json5::from_str(input)
            .map_err(|_| TopologyError::Parse(strict.to_string()))?,
    };
    Ok(file.into())
}

/// Kind of placeholder topology to synthesise when no live snapshot exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntheticKind {
    #[default]
    Prp,
    Hsr,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticOptions {
    pub kind: SyntheticKind,
    pub node_count: usize,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            kind: SyntheticKind::Prp,
            node_count: 4,
        }
    }
}

const SYNTHETIC_IED_KINDS: [DeviceKind; 3] = [
    DeviceKind::ProtectionRelay,
    DeviceKind::Controller,
    DeviceKind::Meter,
];

/// Deterministic placeholder topology. Never merged with live data.
pub fn synthetic_topology(options: &SyntheticOptions) -> TopologySnapshot {
    match options.kind {
        SyntheticKind::Mixed => synthetic_mixed(options.node_count),
        SyntheticKind::Prp | SyntheticKind::Hsr => synthetic_flat(options),
    }
}

fn synthetic_status(idx: usize) -> NodeStatus {
    if idx % 5 == 0 {
        NodeStatus::Warning
    } else {
        NodeStatus::Online
    }
}

fn synthetic_flat(options: &SyntheticOptions) -> TopologySnapshot {
    let hsr = options.kind == SyntheticKind::Hsr;
    let mut snapshot = TopologySnapshot::new(if hsr {
        RedundancyKind::Hsr
    } else {
        RedundancyKind::Prp
    });

    for idx in 0..options.node_count {
        snapshot.nodes.push(
            Node::new(
                format!("IED{}", idx + 1),
                format!("IED_{}", idx + 1),
                SYNTHETIC_IED_KINDS[idx % SYNTHETIC_IED_KINDS.len()],
            )
            .with_status(synthetic_status(idx)),
        );
    }

    if hsr {
        let count = snapshot.nodes.len();
        for idx in 0..count {
            let from = snapshot.nodes[idx].id.clone();
            let to = snapshot.nodes[(idx + 1) % count].id.clone();
            snapshot.connections.push(Connection::new(from, to));
        }
    }

    snapshot
        .nodes
        .push(Node::new(GATEWAY_ID, "Gateway", DeviceKind::Gateway));

    if !hsr {
        snapshot.nodes.push(
            Node::new("meter-san-a", "Meter (SAN-A)", DeviceKind::Meter)
                .with_attachment(Attachment::NetworkA),
        );
        snapshot.nodes.push(
            Node::new("meter-san-b", "Meter (SAN-B)", DeviceKind::Meter)
                .with_attachment(Attachment::NetworkB),
        );
        snapshot.nodes.push(Node::new(
            "redbox-1",
            "HSR Ring RedBox",
            DeviceKind::RedundancyBox,
        ));
    }

    snapshot
}

fn synthetic_mixed(node_count: usize) -> TopologySnapshot {
    let mut snapshot = TopologySnapshot::new(RedundancyKind::Prp);
    snapshot
        .nodes
        .push(Node::new(GATEWAY_ID, "Gateway", DeviceKind::Gateway));
    snapshot.nodes.push(Node::new(
        "redbox-a",
        "RedBox_A",
        DeviceKind::RedundancyBox,
    ));
    snapshot.nodes.push(Node::new(
        "redbox-b",
        "RedBox_B",
        DeviceKind::RedundancyBox,
    ));

    let ring_a = node_count.div_ceil(2);
    for idx in 0..node_count {
        let (ring, ordinal) = if idx < ring_a {
            ("A", idx + 1)
        } else {
            ("B", idx + 1 - ring_a)
        };
        snapshot.nodes.push(
            Node::new(
                format!("ring{}-ied{:02}", ring.to_ascii_lowercase(), ordinal),
                format!("Ring{}_IED{:02}", ring, ordinal),
                SYNTHETIC_IED_KINDS[idx % SYNTHETIC_IED_KINDS.len()],
            )
            .with_status(synthetic_status(idx)),
        );
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_document() {
        let input = r#"{
            "type": "HSR",
            "timestamp": "2025-01-01T00:00:00Z",
            "nodes": [
                {"id": "gateway", "name": "Gateway", "type": "GATEWAY", "ip": "192.168.1.1"},
                {"id": "ied-1", "name": "IED-1", "type": "ProtectionRelay", "status": "warning"},
                {"id": "ied-2", "type": "Meter", "connection": "B"}
            ],
            "connections": [{"from": "ied-1", "to": "ied-2", "type": "GOOSE", "network": "hsr-ring"}]
        }"#;
        let snapshot = parse_topology(input).unwrap();
        assert_eq!(snapshot.kind, RedundancyKind::Hsr);
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.nodes[0].kind, DeviceKind::Gateway);
        assert_eq!(snapshot.nodes[1].status, NodeStatus::Warning);
        assert_eq!(snapshot.nodes[2].name, "ied-2");
        assert_eq!(snapshot.nodes[2].attachment, Attachment::NetworkB);
        assert_eq!(snapshot.connections.len(), 1);
    }

    #[test]
    fn falls_back_to_json5() {
        let input = r#"{
            // hand-written fixture
            "type": 'PRP',
            nodes: [{id: 'a', "type": 'RedBox',},],
        }"#;
        let snapshot = parse_topology(input).unwrap();
        assert_eq!(snapshot.kind, RedundancyKind::Prp);
        assert!(snapshot.has_redundancy_box());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_topology("not a topology"),
            Err(TopologyError::Parse(_))
        ));
    }

    #[test]
    fn device_kind_tokens_ignore_separators() {
        assert_eq!(DeviceKind::from_token("GATEWAY"), DeviceKind::Gateway);
        assert_eq!(DeviceKind::from_token("red_box"), DeviceKind::RedundancyBox);
        assert_eq!(
            DeviceKind::from_token("Redundancy Box"),
            DeviceKind::RedundancyBox
        );
        assert_eq!(
            DeviceKind::from_token("protection-relay"),
            DeviceKind::ProtectionRelay
        );
        assert_eq!(DeviceKind::from_token("Merging Unit"), DeviceKind::Ied);
    }

    #[test]
    fn attachment_tokens() {
        assert_eq!(Attachment::from_token("A"), Attachment::NetworkA);
        assert_eq!(Attachment::from_token("b"), Attachment::NetworkB);
        assert_eq!(Attachment::from_token("AB"), Attachment::Both);
        assert_eq!(Attachment::from_token(""), Attachment::Both);
        assert_eq!(Attachment::from_token("Both"), Attachment::Both);
        assert_eq!(Attachment::from_token("LAN-A"), Attachment::NetworkA);
        assert_eq!(Attachment::from_token("network b"), Attachment::NetworkB);
        assert_eq!(Attachment::from_token("N/A"), Attachment::Both);
        assert_eq!(Attachment::from_token("Bay 3"), Attachment::Both);
    }

    #[test]
    fn synthetic_hsr_declares_a_ring() {
        let snapshot = synthetic_topology(&SyntheticOptions {
            kind: SyntheticKind::Hsr,
            node_count: 5,
        });
        assert_eq!(snapshot.kind, RedundancyKind::Hsr);
        assert_eq!(snapshot.nodes.len(), 6);
        assert_eq!(snapshot.connections.len(), 5);
        assert_eq!(snapshot.connections[4].to, "IED1");
        assert!(!snapshot.has_redundancy_box());
    }

    #[test]
    fn synthetic_prp_carries_single_attached_meters() {
        let snapshot = synthetic_topology(&SyntheticOptions::default());
        let san_a = snapshot.node("meter-san-a").unwrap();
        assert_eq!(san_a.attachment, Attachment::NetworkA);
        assert!(snapshot.has_redundancy_box());
        assert_eq!(snapshot.nodes[0].status, NodeStatus::Warning);
        assert_eq!(snapshot.nodes[1].kind, DeviceKind::Controller);
    }

    #[test]
    fn synthetic_mixed_splits_rings() {
        let snapshot = synthetic_topology(&SyntheticOptions {
            kind: SyntheticKind::Mixed,
            node_count: 7,
        });
        let ring_a = snapshot
            .nodes
            .iter()
            .filter(|n| n.name.starts_with("RingA"))
            .count();
        assert_eq!(ring_a, 4);
        assert_eq!(snapshot.nodes.len(), 10);
    }
}
