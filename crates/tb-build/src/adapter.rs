//! Resolving a block's profile target into a warehouse adapter

use crate::attributes::resolve_attributes;
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::profile::load_profile;
use tb_core::Block;
use tb_db::{
    adapter_for, AdapterConfiguration, AdapterOptions, ConnectionConfig, DbError, ProfileTarget,
    WarehouseAdapter,
};

/// Adapter, credentials and canonical configuration for one invocation
pub struct ResolvedAdapter {
    pub adapter: &'static dyn WarehouseAdapter,
    pub connection: ConnectionConfig,
    pub configuration: AdapterConfiguration,
    pub profile: ProfileTarget,
}

impl std::fmt::Debug for ResolvedAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedAdapter")
            .field("warehouse", &self.adapter.warehouse())
            .field("connection", &self.connection)
            .field("configuration", &self.configuration)
            .finish()
    }
}

/// Profile target of a block: `profile_target` when given, otherwise the
/// block's `dbt_profile_target`, otherwise the profile default.
pub fn get_profile(
    ctx: &BuildContext,
    block: &Block,
    profile_target: Option<&str>,
) -> BuildResult<Option<ProfileTarget>> {
    let attrs = resolve_attributes(ctx, block)?;
    let target = profile_target.or(block.configuration.profile_target());
    load_profile(
        &attrs.profile_name,
        &attrs.profiles_full_path,
        target,
        &ctx.global_variables,
    )
}

/// Map the block's profile target onto its warehouse adapter.
///
/// A missing profile or target, an unknown warehouse type and a missing
/// required field are all configuration errors naming the profiles file.
pub fn resolve_adapter(
    ctx: &BuildContext,
    block: &Block,
    profile_target: Option<&str>,
    options: &AdapterOptions,
) -> BuildResult<ResolvedAdapter> {
    let attrs = resolve_attributes(ctx, block)?;
    let target = profile_target.or(block.configuration.profile_target());

    let profile = load_profile(
        &attrs.profile_name,
        &attrs.profiles_full_path,
        target,
        &ctx.global_variables,
    )?
    .ok_or_else(|| {
        BuildError::configuration(
            format!(
                "No profile target named '{}' in profile '{}'",
                target.unwrap_or("<default>"),
                attrs.profile_name
            ),
            &attrs.profiles_full_path,
        )
    })?;

    let as_configuration_error = |e: DbError| match e {
        DbError::UnknownWarehouse(found) => BuildError::configuration(
            format!(
                "No configuration matching profile type '{}'. Change your target or add dbt_profile_target to your global variables",
                found
            ),
            &attrs.profiles_full_path,
        ),
        other => BuildError::configuration(other.to_string(), &attrs.profiles_full_path),
    };

    let warehouse = profile.warehouse_type().map_err(as_configuration_error)?;
    let adapter = adapter_for(warehouse);
    let connection = adapter
        .build_connection_config(&profile)
        .map_err(as_configuration_error)?;
    let configuration = adapter.canonical_configuration(&profile, options);

    log::debug!(
        "Resolved {} adapter for block '{}' (database: {:?}, schema: {:?})",
        warehouse,
        block.uuid,
        configuration.database,
        configuration.schema
    );

    Ok(ResolvedAdapter {
        adapter,
        connection,
        configuration,
        profile,
    })
}
