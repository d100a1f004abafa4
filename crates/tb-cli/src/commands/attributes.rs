//! Attributes command implementation

use anyhow::{Context, Result};
use tb_build::resolve_attributes;

use crate::cli::{GlobalArgs, ModelArgs};
use crate::commands::common::{build_context, model_block};

/// Execute the attributes command
pub async fn execute(args: &ModelArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = build_context(global)?;
    let block = model_block(&ctx, global, &args.model)?;
    let attrs = resolve_attributes(&ctx, &block).context("Failed to resolve model attributes")?;

    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let rows = [
        ("file_path", attrs.file_path.clone()),
        ("project_folder", attrs.project_folder_name.clone()),
        ("project_name", attrs.project_name.clone()),
        ("profile_name", attrs.profile_name.clone()),
        ("model_name", attrs.model_name.clone()),
        ("table_name", attrs.table_name.clone()),
        ("database", optional(&attrs.database)),
        ("source_name", attrs.source_name.clone()),
        ("snapshot", attrs.snapshot.to_string()),
        ("target_path", attrs.target_path.clone()),
        ("full_path", attrs.full_path.display().to_string()),
        ("sources_path", attrs.sources_full_path.display().to_string()),
        ("profiles_path", attrs.profiles_full_path.display().to_string()),
        (
            "profile_type",
            attrs
                .profile
                .as_ref()
                .and_then(|p| p.type_name())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ];

    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in rows {
        println!("{:<width$}  {}", key, value, width = width);
    }

    Ok(())
}
