use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::{Layout, LineStyle, PathKind, PlacedNode, RoutedPath};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const STROKE_WIDTH: f32 = 2.0;
const STATUS_DOT_RADIUS: f32 = 5.0;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    // Paths first so nodes sit on top of their endpoints.
    for path in &layout.paths {
        path_svg(&mut svg, path, theme);
    }
    for node in &layout.nodes {
        node_svg(&mut svg, node, theme, config);
    }

    svg.push_str("</svg>");
    svg
}

fn path_svg(svg: &mut String, path: &RoutedPath, theme: &Theme) {
    let d = match path.kind {
        PathKind::Curve => curve_to_path(&path.points),
        PathKind::Orthogonal => points_to_path(&path.points),
    };
    let dash = match path.style {
        LineStyle::Dashed => " stroke-dasharray=\"5,5\"",
        LineStyle::Solid => "",
    };
    svg.push_str(&format!(
        "<path id=\"{}\" class=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{STROKE_WIDTH}\"{dash}/>",
        escape_xml(&path.id),
        path.channel.class_name(),
        d,
        theme.channel_color(path.channel),
    ));
}

fn node_svg(svg: &mut String, node: &PlacedNode, theme: &Theme, config: &LayoutConfig) {
    let width = config.optimizer.device_width * node.scale;
    let height = config.optimizer.device_height * node.scale;
    let x = node.x - width / 2.0;
    let y = node.y - height / 2.0;
    let fill = if node.synthetic {
        &theme.virtual_node_fill
    } else {
        &theme.node_fill
    };
    let font_size = theme.font_size * node.scale.max(0.6);

    svg.push_str(&format!(
        "<g class=\"node {}\" data-id=\"{}\">",
        node.kind.as_str(),
        escape_xml(&node.id)
    ));
    svg.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"8\" ry=\"8\" fill=\"{fill}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
        theme.node_border
    ));
    if !node.synthetic {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
            x + width - 8.0 * node.scale,
            y + 8.0 * node.scale,
            STATUS_DOT_RADIUS * node.scale,
            theme.status_color(node.status)
        ));
    }
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{font_size:.1}\" fill=\"{}\">{}</text>",
        node.x,
        node.y + font_size / 3.0,
        theme.font_family,
        theme.text_color,
        escape_xml(&node.name)
    ));
    svg.push_str("</g>");
}

fn curve_to_path(points: &[(f32, f32)]) -> String {
    match points {
        [start, control, end] => format!(
            "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            start.0, start.1, control.0, control.1, end.0, end.1
        ),
        _ => points_to_path(points),
    }
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().to_string())
        .unwrap_or_else(|| "Inter".to_string());
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &RenderConfig,
    _theme: &Theme,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
