//! Graphviz DOT visualization of the declaration graph.
//!
//! Uses the `std::fmt::Write` trait for clean string formatting into a
//! pre-allocated buffer.

use std::fmt::Write;

use crate::graph::{GcFlags, Project, UsageKind};
use crate::prune::is_live;

/// Generate a Graphviz DOT representation of the marked graph.
///
/// - declarations are nodes, grouped into one cluster per file
/// - live declarations are lightgreen, dead ones lightcoral
/// - checker usages are solid edges, grep usages dashed
/// - entrypoint files get a bold border
///
/// `flag` is the reachability flag liveness is judged by.
pub fn generate_dot(project: &Project, flag: GcFlags) -> String {
    // ~80 bytes/node + ~50 bytes/edge + header/footer
    let estimated_capacity = project.declaration_count() * 80 + project.usage_count() * 50 + 150;
    let mut dot = String::with_capacity(estimated_capacity);

    if let Err(e) = write_dot_content(&mut dot, project, flag) {
        tracing::error!("Failed to generate DOT string: {}", e);
        return "digraph deadsnip {\n}\n".to_string();
    }
    dot
}

fn write_dot_content(dot: &mut String, project: &Project, flag: GcFlags) -> std::fmt::Result {
    writeln!(dot, "digraph deadsnip {{")?;
    writeln!(dot, "  rankdir=LR;")?;
    writeln!(
        dot,
        "  node [shape=box, style=filled, fontname=\"JetBrains Mono\"];"
    )?;
    writeln!(dot)?;

    // 1. NODES, one cluster per file
    for (file_id, file) in project.files() {
        writeln!(dot, "  subgraph cluster_{} {{", file_id.index())?;
        writeln!(dot, "    label=\"{}\";", escape(file.filename()))?;
        if file.is_entrypoint() {
            writeln!(dot, "    style=bold;")?;
        }
        writeln!(dot, "    \"f{}\" [label=\"(file)\", shape=note, fillcolor=white];", file_id.index())?;
        for &decl_id in file.declarations() {
            let decl = project.declaration(decl_id);
            let color = if is_live(decl.flags(), flag) {
                "lightgreen"
            } else {
                "lightcoral"
            };
            writeln!(
                dot,
                "    \"d{}\" [label=\"{}\", fillcolor={}];",
                decl_id.index(),
                escape(decl.name().unwrap_or("<statement>")),
                color
            )?;
        }
        writeln!(dot, "  }}")?;
    }

    writeln!(dot)?;

    // 2. EDGES: containing declaration (or file) -> target
    for (_, usage) in project.usages() {
        let from = match usage.containing_declaration() {
            Some(d) => format!("d{}", d.index()),
            None => format!("f{}", usage.file().index()),
        };
        let style = match usage.kind() {
            UsageKind::Checker => "solid",
            UsageKind::Grep => "dashed",
        };
        writeln!(
            dot,
            "  \"{}\" -> \"d{}\" [style={}];",
            from,
            usage.target().index(),
            style
        )?;
    }

    writeln!(dot, "}}")?;
    Ok(())
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
