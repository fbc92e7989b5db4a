use serde::{Deserialize, Serialize};

use crate::layout::Channel;
use crate::topology::NodeStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub node_fill: String,
    pub node_border: String,
    pub virtual_node_fill: String,
    pub text_color: String,
    pub network_a_color: String,
    pub network_b_color: String,
    pub ring_color: String,
    pub ring_entry_color: String,
    pub status_online: String,
    pub status_warning: String,
    pub status_error: String,
    pub status_offline: String,
}

impl Theme {
    /// Dark palette used by the operator console.
    pub fn control_room() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            background: "#0f172a".to_string(),
            node_fill: "rgba(30, 30, 50, 0.8)".to_string(),
            node_border: "rgba(255, 255, 255, 0.2)".to_string(),
            virtual_node_fill: "rgba(51, 65, 85, 0.8)".to_string(),
            text_color: "#ffffff".to_string(),
            network_a_color: "#10b981".to_string(),
            network_b_color: "#3b82f6".to_string(),
            ring_color: "#f59e0b".to_string(),
            ring_entry_color: "#fb923c".to_string(),
            status_online: "#10b981".to_string(),
            status_warning: "#f59e0b".to_string(),
            status_error: "#ef4444".to_string(),
            status_offline: "#6b7280".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            virtual_node_fill: "#EEF2F8".to_string(),
            text_color: "#1C2430".to_string(),
            ..Self::control_room()
        }
    }

    pub fn channel_color(&self, channel: Channel) -> &str {
        match channel {
            Channel::NetworkA => &self.network_a_color,
            Channel::NetworkB => &self.network_b_color,
            Channel::Ring => &self.ring_color,
            Channel::RingEntry => &self.ring_entry_color,
        }
    }

    pub fn status_color(&self, status: NodeStatus) -> &str {
        match status {
            NodeStatus::Online => &self.status_online,
            NodeStatus::Warning => &self.status_warning,
            NodeStatus::Error => &self.status_error,
            NodeStatus::Offline => &self.status_offline,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::control_room()
    }
}
