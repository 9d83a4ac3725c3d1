//! CLI Inspect Command
//!
//! Lists discovered bundles and every category's extensions in the order the
//! bootstrap would register them.

use anyhow::Result;
use plexus_core::ExtensionDefinition;
use plexus_extensions::{BundleCatalog, ExtensionSorter};

use crate::terminal_output::{note_info, render_table, styled, Column, BOLD, DIM};

pub fn run(catalog: &BundleCatalog, sorter: &ExtensionSorter) -> Result<()> {
    if catalog.list().is_empty() {
        note_info(&format!("No bundles found in {}", catalog.bundles_dir().display()));
        return Ok(());
    }
    print!("{}", render(catalog, sorter));
    Ok(())
}

pub fn render(catalog: &BundleCatalog, sorter: &ExtensionSorter) -> String {
    let mut out = String::new();

    out.push_str(&styled(BOLD, "Bundles"));
    out.push('\n');
    let columns = [
        Column::left("Name"),
        Column::left("Version"),
        Column::left("State"),
        Column::left("Path").max_width(48),
    ];
    let rows: Vec<Vec<String>> = catalog
        .list()
        .iter()
        .map(|bundle| {
            let state = if bundle.enabled { "enabled".to_string() } else { styled(DIM, "disabled") };
            vec![
                bundle.manifest.name.clone(),
                bundle.manifest.version.clone().unwrap_or_else(|| "-".into()),
                state,
                bundle.path_string(),
            ]
        })
        .collect();
    out.push_str(&render_table(&columns, &rows));

    for (category, definitions) in catalog.extensions_by_category() {
        out.push('\n');
        out.push_str(&styled(BOLD, &category));
        out.push('\n');
        let columns = [
            Column::right("#"),
            Column::left("Key"),
            Column::right("Priority"),
            Column::left("Implementation").max_width(40),
            Column::left("Depends"),
        ];
        let rows: Vec<Vec<String>> = sorter
            .ranked(&definitions)
            .into_iter()
            .enumerate()
            .map(|(index, (priority, definition))| extension_row(index, priority, definition))
            .collect();
        out.push_str(&render_table(&columns, &rows));
    }

    out
}

fn extension_row(index: usize, priority: f64, definition: &ExtensionDefinition) -> Vec<String> {
    vec![
        index.to_string(),
        definition.key.clone().unwrap_or_else(|| "-".into()),
        priority.to_string(),
        definition.implementation.clone().unwrap_or_else(|| "-".into()),
        definition.depends.join(", "),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal_output::strip_ansi;
    use plexus_core::PrioritySpec;

    fn catalog_with(extensions: serde_json::Value) -> BundleCatalog {
        let manifest = serde_json::from_value(serde_json::json!({
            "name": "core",
            "version": "1.2.0",
            "extensions": extensions,
        }))
        .unwrap();
        let mut catalog = BundleCatalog::new("bundles");
        catalog.add(manifest, "bundles/core").unwrap();
        catalog
    }

    #[test]
    fn lists_extensions_in_priority_order() {
        let catalog = catalog_with(serde_json::json!({
            "views": [
                { "key": "table" },
                { "key": "plot", "priority": "high", "implementation": "plot-view" },
                { "key": "raw", "priority": "low", "depends": ["formatters[]"] },
            ],
        }));
        let out = strip_ansi(&render(&catalog, &ExtensionSorter::default()));

        let plot = out.find("plot-view").unwrap();
        let table = out.find("table").unwrap();
        let raw = out.find("formatters[]").unwrap();
        assert!(plot < table && table < raw);
        assert!(out.contains("1.2.0"));
        assert!(out.contains("-1000"));
    }

    #[test]
    fn row_shows_placeholders_for_missing_fields() {
        let definition = ExtensionDefinition {
            priority: Some(PrioritySpec::Number(2.5)),
            ..ExtensionDefinition::new("views")
        };
        assert_eq!(extension_row(3, 2.5, &definition), ["3", "-", "2.5", "-", ""]);
    }
}
