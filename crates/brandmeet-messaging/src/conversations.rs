// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation aggregation.
//!
//! The backend stores a flat `messages` table; conversations only exist as
//! a view-side grouping by counterpart. Counterpart profiles are resolved
//! in bulk: one `in`-list query per profile table regardless of how many
//! conversations the user has.

use std::collections::HashMap;

use tracing::debug;

use brandmeet_core::BrandmeetError;
use brandmeet_core::traits::TableBackend;
use brandmeet_core::types::{Conversation, Counterpart, Profile, UserId};

/// Groups every message involving `current` into per-counterpart
/// conversations, most recently active first.
///
/// `None` means no signed-in identity; the result is empty without any
/// backend traffic. A counterpart with no row in either profile table is
/// kept as [`Counterpart::Unknown`] so its messages stay reachable.
pub async fn fetch_conversations(
    tables: &dyn TableBackend,
    current: Option<UserId>,
) -> Result<Vec<Conversation>, BrandmeetError> {
    let Some(current) = current else {
        return Ok(Vec::new());
    };

    let rows = tables.messages_for(current).await?;

    // Distinct counterpart ids, in order of first appearance.
    let mut counterpart_ids: Vec<UserId> = Vec::new();
    for row in &rows {
        let other = row.counterpart_of(current);
        if !counterpart_ids.contains(&other) {
            counterpart_ids.push(other);
        }
    }

    let profiles = resolve_profiles(tables, &counterpart_ids).await?;
    debug!(
        messages = rows.len(),
        counterparts = counterpart_ids.len(),
        resolved = profiles.len(),
        "aggregated message rows"
    );

    let mut grouped: HashMap<UserId, Conversation> = HashMap::new();
    for row in rows {
        let other = row.counterpart_of(current);
        grouped
            .entry(other)
            .or_insert_with(|| {
                let counterpart = match profiles.get(&other) {
                    Some(profile) => Counterpart::Known(profile.clone()),
                    None => Counterpart::Unknown { user_id: other },
                };
                Conversation::new(counterpart)
            })
            .push(row);
    }

    let mut conversations: Vec<Conversation> = grouped.into_values().collect();
    // Descending by last activity; a conversation with no timestamp sorts
    // to the end.
    conversations.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
    Ok(conversations)
}

/// Bulk counterpart resolution: one query per profile table. When a user
/// somehow owns rows in both tables the brand row wins, matching the
/// sign-in gate.
async fn resolve_profiles(
    tables: &dyn TableBackend,
    users: &[UserId],
) -> Result<HashMap<UserId, Profile>, BrandmeetError> {
    let mut profiles: HashMap<UserId, Profile> = HashMap::new();
    for creator in tables.creators_by_users(users).await? {
        profiles.insert(creator.user_id, Profile::Creator(creator));
    }
    for brand in tables.brands_by_users(users).await? {
        profiles.insert(brand.user_id, Profile::Brand(brand));
    }
    Ok(profiles)
}
