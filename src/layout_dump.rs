use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render-sink hand-off: everything a drawing front end needs, nothing it
/// has to recompute.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub architecture: String,
    pub label: String,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub paths: Vec<PathDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub status: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    #[serde(rename = "virtual")]
    pub synthetic: bool,
}

#[derive(Debug, Serialize)]
pub struct PathDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: String,
    pub class: String,
    pub dashed: bool,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                name: node.name.clone(),
                kind: node.kind.as_str().to_string(),
                status: format!("{:?}", node.status).to_lowercase(),
                x: node.x,
                y: node.y,
                scale: node.scale,
                synthetic: node.synthetic,
            })
            .collect();

        let paths = layout
            .paths
            .iter()
            .map(|path| PathDump {
                id: path.id.clone(),
                from: path.from.clone(),
                to: path.to.clone(),
                kind: format!("{:?}", path.kind).to_lowercase(),
                class: path.channel.class_name().to_string(),
                dashed: path.style == crate::layout::LineStyle::Dashed,
                points: path.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            architecture: format!("{:?}", layout.architecture),
            label: layout.architecture.label().to_string(),
            width: layout.width,
            height: layout.height,
            nodes,
            paths,
        }
    }
}

/// Writes the dump to `path`, or to stdout when no path is given.
pub fn write_layout_dump(path: Option<&Path>, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, &dump)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}
