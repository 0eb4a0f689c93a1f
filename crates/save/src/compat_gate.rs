//! Version-gated merge of an incoming save (cloud sync, file import) into the
//! live session.
//!
//! Despite the name, [`is_game_data_compatible`] is not a pure query: once
//! the version check passes it migrates `incoming` and merges it into `live`.
//! The whole merge is synchronous, so no other mutator of the live save can
//! observe a half-merged state.

use bevy::prelude::*;
use simulation::{GameConfig, SavedGame};

use crate::tile_migrate::migrate_saved_game;

/// Merge `incoming` into `live` if both carry the same compatibility tag.
///
/// - Different or missing `options.version` on either side: returns `false`
///   and touches neither save.
/// - Same version: migrates `incoming` in place, overwrites `live.current`
///   with it, overlays theme colors (incoming wins, live entries without an
///   incoming counterpart are kept, and the merged table is written back to
///   `incoming`), then overwrites every other option with incoming's.
///   Returns `true`.
///
/// Migration runs before `live` is touched, so `live` is either unchanged or
/// fully merged.
pub fn is_game_data_compatible(
    live: &mut SavedGame,
    incoming: &mut SavedGame,
    config: &GameConfig,
) -> bool {
    let tags_match = match (live.options.version, incoming.options.version) {
        (Some(live_version), Some(incoming_version)) => live_version == incoming_version,
        _ => false,
    };
    if !tags_match {
        info!(
            "Incoming save has version {:?}, live save has version {:?}; not merging",
            incoming.options.version, live.options.version
        );
        return false;
    }

    migrate_saved_game(incoming, config);

    live.current.assign_from(incoming.current.clone());

    let mut theme_colors = std::mem::take(&mut live.options.theme_colors);
    theme_colors.extend(incoming.options.theme_colors.clone());
    incoming.options.theme_colors = theme_colors;
    live.options = incoming.options.clone();

    true
}
