use crate::graph::{GraphLink, GraphNode, NodeKind};
use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn section(title: &str) {
    if !is_quiet() {
        println!();
    }
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn empty(label: &str) {
    println!("{} {}", Icons::EMPTY, label.style(theme().dim.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// One line per node: icon, name, then id or URL
pub fn node_line(node: &GraphNode) -> String {
    match &node.kind {
        NodeKind::Article { art_id } => {
            let id = art_id.map(|id| format!("#{}", id)).unwrap_or_default();
            format!("{} {} {}", Icons::ARTICLE, node.name.style(theme().inner.clone()), id.style(theme().dim.clone()))
        }
        NodeKind::External { art_url } => {
            format!("{} {} {}", Icons::GLOBE, node.name.style(theme().external.clone()), art_url.style(theme().dim.clone()))
        }
    }
}

pub fn link_line(link: &GraphLink) -> String {
    format!("{} {} {} {}", Icons::LINK, link.source, Icons::RIGHT, link.target)
}
