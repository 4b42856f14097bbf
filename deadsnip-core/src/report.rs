//! Output formatting - plaintext and JSON.

use std::fmt::Write;

use serde_json::{json, Value};

use crate::builder::AnalysisResult;

/// Render the analysis as plain text.
pub fn render_plain(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if let Err(e) = write_plain(&mut out, result) {
        tracing::error!("Failed to render plain report: {}", e);
        return format!("{} dead declaration(s)\n", result.dead.len());
    }
    out
}

fn write_plain(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    if result.dead.is_empty() {
        writeln!(out, "No dead code found.")?;
        return Ok(());
    }

    writeln!(
        out,
        "DEAD DECLARATIONS ({} of {}, {:.1}%):",
        result.dead.len(),
        result.total_declarations,
        result.dead_percentage()
    )?;
    for item in &result.dead {
        writeln!(out, "- {}", item)?;
    }

    let dead_files = result.dead_files();
    if !dead_files.is_empty() {
        writeln!(out)?;
        writeln!(out, "DEAD FILES ({}):", dead_files.len())?;
        for file in dead_files {
            writeln!(out, "- {}", file)?;
        }
    }

    if !result.cycles.is_empty() {
        writeln!(out)?;
        writeln!(out, "DEAD CYCLES ({}):", result.cycles.len())?;
        for cycle in &result.cycles {
            writeln!(out, "- {}", cycle.names.join(" <-> "))?;
        }
    }
    Ok(())
}

/// Prints the analysis in plain text format.
pub fn print_plain(result: &AnalysisResult) {
    print!("{}", render_plain(result));
}

/// JSON document for the analysis.
pub fn to_json(result: &AnalysisResult) -> Value {
    json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "root": result.root.display().to_string(),
        "total_declarations": result.total_declarations,
        "dead": result.dead,
        "dead_files": result.dead_files(),
        "cycles": result.cycles.iter().map(|c| &c.names).collect::<Vec<_>>(),
    })
}

/// Prints the analysis in JSON format.
///
/// Falls back to a minimal document if pretty-printing fails.
pub fn print_json(result: &AnalysisResult) {
    match serde_json::to_string_pretty(&to_json(result)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::warn!("JSON serialization failed: {}", e);
            println!("{{\"dead_count\": {}}}", result.dead.len());
        }
    }
}

/// Prints the outcome of a fix run.
#[cfg(feature = "fix")]
pub fn print_fix_summary(result: &crate::fix::FixResult) {
    let mode = if result.dry_run { "DRY-RUN" } else { "FIX" };
    println!();
    println!("=== {} Summary ===", mode);
    println!("Files edited: {}", result.files_edited.len());
    println!("Files removed: {}", result.files_removed.len());
    println!("Lines removed: {}", result.lines_removed);

    if !result.errors.is_empty() {
        println!("Errors: {}", result.errors.len());
        for err in &result.errors {
            eprintln!("  - {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Deadsnip;
    use crate::logging::RunLog;
    use crate::manifest::Manifest;
    use crate::progress::Checkpoint;

    fn analyze(json: &str) -> AnalysisResult {
        let manifest = Manifest::from_json(json).unwrap();
        Deadsnip::new("/proj")
            .analyze_manifest(&manifest, &RunLog::disabled(), &mut Checkpoint::disabled())
            .unwrap()
    }

    const WITH_DEAD: &str = r#"{ "files": [
        { "filename": "main.ts", "entrypoint": true },
        { "filename": "gone.ts", "declarations": [
            { "name": "a", "span": { "start": 0, "end": 5 } },
            { "name": "b", "span": { "start": 6, "end": 9 } } ] } ],
      "usages": [
        { "kind": "checker", "file": "gone.ts", "location": 1, "target": { "file": "gone.ts", "declaration": 1 } },
        { "kind": "checker", "file": "gone.ts", "location": 7, "target": { "file": "gone.ts", "declaration": 0 } } ] }"#;

    #[test]
    fn test_plain_no_dead_code() {
        let result = analyze(r#"{ "files": [ { "filename": "main.ts", "entrypoint": true } ] }"#);
        assert_eq!(render_plain(&result), "No dead code found.\n");
    }

    #[test]
    fn test_plain_lists_items_files_and_cycles() {
        let out = render_plain(&analyze(WITH_DEAD));
        assert!(out.contains("DEAD DECLARATIONS (2 of 2, 100.0%):"));
        assert!(out.contains("- gone.ts@0..5 a (unreferenced)"));
        assert!(out.contains("DEAD FILES (1):\n- gone.ts"));
        assert!(out.contains("a <-> b"));
    }

    #[test]
    fn test_json_shape() {
        let value = to_json(&analyze(WITH_DEAD));
        assert!(value["generated_at"].is_string());
        assert_eq!(value["dead"].as_array().unwrap().len(), 2);
        assert_eq!(value["dead"][0]["kind"], "unreferenced");
        assert_eq!(value["dead"][0]["span"]["start"], 0);
        assert_eq!(value["dead_files"][0], "gone.ts");
        assert_eq!(value["cycles"][0][1], "b");
    }
}
