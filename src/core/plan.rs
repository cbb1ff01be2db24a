use crate::core::transform;
use crate::domain::model::{TableDescriptor, WriteMode};
use crate::utils::error::{MigrationError, Result};

/// Tables in foreign-key dependency order. Names are upserted so reruns merge.
pub fn default_plan() -> Vec<TableDescriptor> {
    vec![
        TableDescriptor {
            source_table: "cat_name_options",
            destination_table: "cat_name_options",
            transform: transform::transform_cat_name_options,
            write_mode: WriteMode::Upsert,
        },
        TableDescriptor {
            source_table: "cat_app_users",
            destination_table: "cat_app_users",
            transform: transform::transform_cat_app_users,
            write_mode: WriteMode::Insert,
        },
        TableDescriptor {
            source_table: "cat_name_ratings",
            destination_table: "cat_name_ratings",
            transform: transform::transform_cat_name_ratings,
            write_mode: WriteMode::Insert,
        },
        TableDescriptor {
            source_table: "tournament_selections",
            destination_table: "tournament_selections",
            transform: transform::transform_tournament_selections,
            write_mode: WriteMode::Insert,
        },
    ]
}

/// Subset of the default plan by source table name. Plan order is kept
/// regardless of the order `names` are given in.
pub fn select_tables(names: &[String]) -> Result<Vec<TableDescriptor>> {
    let plan = default_plan();
    if names.is_empty() {
        return Ok(plan);
    }

    if let Some(unknown) = names
        .iter()
        .find(|n| !plan.iter().any(|d| d.source_table == n.as_str()))
    {
        let known: Vec<&str> = plan.iter().map(|d| d.source_table).collect();
        return Err(MigrationError::InvalidConfigValueError {
            field: "migration.tables".to_string(),
            value: unknown.clone(),
            reason: format!("Unknown table. Known tables: {}", known.join(", ")),
        });
    }

    Ok(plan
        .into_iter()
        .filter(|d| names.iter().any(|n| n == d.source_table))
        .collect())
}
