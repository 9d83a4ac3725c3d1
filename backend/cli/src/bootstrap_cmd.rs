//! CLI Bootstrap Command
//!
//! Runs the full extension pipeline over the enabled bundles and reports the
//! resulting services. Only in-process implementations can be loaded here, so
//! bundles that name external modules come up as metadata-only extensions.

use std::sync::Arc;

use anyhow::{Context, Result};
use plexus_extensions::{Bootstrap, Bootstrapped, BundleCatalog, PriorityResolver, StaticLoader};

use crate::terminal_output::{note_success, render_table, styled, Column, BOLD};

pub async fn run(catalog: &BundleCatalog, priorities: PriorityResolver, suffix: &str) -> Result<()> {
    let bootstrapped = bootstrap(catalog, StaticLoader::new(), priorities, suffix).await?;
    print!("{}", render(&bootstrapped)?);
    note_success(&format!(
        "Bootstrapped {} service(s) across {} categorie(s)",
        bootstrapped.services.len(),
        bootstrapped.categories().len()
    ));
    Ok(())
}

pub async fn bootstrap(
    catalog: &BundleCatalog,
    loader: StaticLoader,
    priorities: PriorityResolver,
    suffix: &str,
) -> Result<Bootstrapped> {
    Bootstrap::new(Arc::new(loader))
        .with_priorities(priorities)
        .with_collection_suffix(suffix)
        .run(catalog.extensions_by_category())
        .await
        .context("Extension bootstrap failed")
}

pub fn render(bootstrapped: &Bootstrapped) -> Result<String> {
    let mut out = String::new();
    let columns = [Column::left("Service"), Column::left("Loaded"), Column::left("Kind")];
    for (category, names) in bootstrapped.categories() {
        let collection = bootstrapped.collection_name(category);
        let list = bootstrapped.collection(category)?;
        out.push_str(&styled(BOLD, &format!("{collection} ({} extension(s))", list.len())));
        out.push('\n');
        let rows: Vec<Vec<String>> = names
            .iter()
            .zip(list.iter())
            .map(|(name, extension)| {
                let kind = match &extension.resolved.implementation {
                    Some(implementation) => implementation.kind().to_string(),
                    None => "metadata".to_string(),
                };
                vec![name.clone(), extension.resolved.is_loaded().to_string(), kind]
            })
            .collect();
        out.push_str(&render_table(&columns, &rows));
        out.push('\n');
    }
    Ok(out)
}
