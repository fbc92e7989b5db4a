use crate::config::load_config;
use crate::layout::{Architecture, LayoutOptions, compute_layout_with};
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::source::{FileSource, SnapshotOrigin, TopologySource, load_or_synthetic};
use crate::topology::{SyntheticKind, SyntheticOptions};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "stopo",
    version,
    about = "Lay out and route PRP/HSR substation network topologies"
)]
pub struct Args {
    /// Topology snapshot (JSON) or '-' for stdin. Falls back to a synthetic
    /// topology when absent or unreadable.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme and layout overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width for the mixed layout
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Synthetic topology kind used when no snapshot is available
    #[arg(long = "topology", value_enum, default_value = "prp")]
    pub topology: TopologyArg,

    /// Synthetic device count
    #[arg(long = "nodes", default_value_t = 4)]
    pub nodes: usize,

    /// Placement policy; `auto` detects it from the snapshot
    #[arg(long = "layout", value_enum, default_value = "auto")]
    pub layout: LayoutArg,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TopologyArg {
    Prp,
    Hsr,
    Mixed,
}

impl From<TopologyArg> for SyntheticKind {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Prp => SyntheticKind::Prp,
            TopologyArg::Hsr => SyntheticKind::Hsr,
            TopologyArg::Mixed => SyntheticKind::Mixed,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LayoutArg {
    Auto,
    DualStar,
    Ring,
    Mixed,
}

impl LayoutArg {
    fn forced(self) -> Option<Architecture> {
        match self {
            LayoutArg::Auto => None,
            LayoutArg::DualStar => Some(Architecture::DualStar),
            LayoutArg::Ring => Some(Architecture::Ring),
            LayoutArg::Mixed => Some(Architecture::Mixed),
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.layout.mixed.viewport_width = width;
        config.render.width = width;
    }

    let fallback = SyntheticOptions {
        kind: args.topology.into(),
        node_count: args.nodes,
    };
    let source = args.input.as_ref().map(FileSource::new);
    let loaded = load_or_synthetic(
        source.as_ref().map(|s| s as &dyn TopologySource),
        &fallback,
    );
    if loaded.origin == SnapshotOrigin::Synthetic {
        log::info!(
            "rendering synthetic {:?} topology with {} devices",
            fallback.kind,
            fallback.node_count
        );
    }

    let options = LayoutOptions {
        architecture: args.layout.forced(),
        ..Default::default()
    };
    let mut announce = |notice: &crate::layout::LayoutNotice| {
        log::info!("{} topology, {} nodes", notice.label, notice.node_count);
    };
    let layout = compute_layout_with(
        &loaded.snapshot,
        &config.layout,
        &options,
        Some(&mut announce),
    );
    config.render.height = layout.height;

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.layout);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = args
                .output
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            let svg = render_svg(&layout, &config.theme, &config.layout);
            write_output_png(&svg, output, &config.render, &config.theme)?;
        }
        OutputFormat::Json => {
            write_layout_dump(args.output.as_deref(), &layout)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_flag_set() {
        let args = Args::try_parse_from([
            "stopo",
            "-i",
            "snap.json",
            "--topology",
            "mixed",
            "--nodes",
            "60",
            "--layout",
            "dual-star",
            "-e",
            "json",
            "-w",
            "2560",
        ])
        .unwrap();
        assert_eq!(args.nodes, 60);
        assert!(matches!(args.topology, TopologyArg::Mixed));
        assert_eq!(args.layout.forced(), Some(Architecture::DualStar));
        assert!(matches!(args.output_format, OutputFormat::Json));
        assert_eq!(args.width, Some(2560.0));
    }

    #[test]
    fn defaults_are_auto_prp() {
        let args = Args::try_parse_from(["stopo"]).unwrap();
        assert!(args.input.is_none());
        assert_eq!(args.layout.forced(), None);
        assert_eq!(SyntheticKind::from(args.topology), SyntheticKind::Prp);
        assert_eq!(args.nodes, 4);
    }
}
