//! Frame-sequence detection over unordered asset lists.
//!
//! **Why**: Artists upload folders full of numbered frames
//! (`render.0001.png`, `render.0002.png`...). Detection infers which assets
//! form an ordered animation purely from naming, with tolerance for missing
//! frames, and leaves everything else untouched.
//!
//! **Used by**: Asset browser (grouping a folder view), player widget
//! (input `SequenceGroup`), preview widget
//!
//! # Algorithm
//!
//! 1. Non-image assets go straight to leftovers.
//! 2. Match each display name against two shapes, in order:
//!    pure numeric (`0042.png`) then prefixed numeric (`shot_0042.png`).
//!    Digit runs shorter than 2 never count as frame numbers.
//! 3. Group by (prefix, lowercased extension, digit-run width, folder).
//!    Padding is part of the key: `001` and `0001` encode different naming
//!    conventions and never merge.
//! 4. Sort each group by frame number; first occurrence wins on duplicate
//!    numbers, later ones become leftovers.
//! 5. Keep groups with at least 3 distinct frames that are dense enough:
//!    `actual >= span * min_density` or `actual >= dense_floor`. Sparse
//!    numeric coincidences (files numbered 1, 50, 999) dissolve entirely.
//!
//! Pure and deterministic: input order in, stable output order out. Groups
//! appear in first-encounter order and equal inputs always regroup equally.

use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::AssetDescriptor;

/// Minimum distinct frames for a group to qualify as a sequence. One or two
/// numbered files are indistinguishable from coincidentally named singles.
pub const MIN_SEQUENCE_LEN: usize = 3;

/// Entire stem is digits: `0042.png`.
static PURE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2,})\.([A-Za-z0-9]+)$").unwrap());

/// Literal prefix (optionally ending in `_`, `.` or `-`) then digits:
/// `shot_0042.png`, `img.0042.tif`. Non-greedy prefix so the digit run
/// directly before the extension is the frame number.
static PREFIXED_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?[_.\-]?)(\d{2,})\.([A-Za-z0-9]+)$").unwrap());

/// Outcome of matching one display name against the sequence naming shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    Numbered {
        prefix: String,
        frame: u64,
        padding: usize,
        extension: String,
    },
    NoMatch,
}

/// Match a display name against the two naming shapes, pure numeric first.
///
/// Frame numbers wider than a `u64` do not occur in practice; such names
/// simply fail to match.
pub fn match_name(name: &str) -> NameMatch {
    let caps = PURE_NUMERIC
        .captures(name)
        .map(|c| (String::new(), c))
        .or_else(|| {
            PREFIXED_NUMERIC
                .captures(name)
                .map(|c| (c[1].to_string(), c))
        });

    let Some((prefix, caps)) = caps else {
        return NameMatch::NoMatch;
    };

    // Digits and extension are the last two capture groups in both shapes.
    let digits = caps.get(caps.len() - 2).map(|m| m.as_str()).unwrap_or("");
    let extension = caps.get(caps.len() - 1).map(|m| m.as_str()).unwrap_or("");

    match digits.parse::<u64>() {
        Ok(frame) => NameMatch::Numbered {
            prefix,
            frame,
            padding: digits.len(),
            extension: extension.to_string(),
        },
        Err(_) => NameMatch::NoMatch,
    }
}

/// Acceptance thresholds for the gap-tolerance heuristic.
///
/// The defaults mirror long-standing practice (half the span present, or at
/// least ten frames regardless), but they are heuristics, not law; tune them
/// against real asset sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectOptions {
    /// Minimum fraction of the frame span that must actually be present.
    pub min_density: f64,
    /// Member count at which a group is accepted regardless of density.
    pub dense_floor: usize,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            min_density: 0.5,
            dense_floor: 10,
        }
    }
}

/// An accepted sequence: ordered members, uniform extension and padding.
///
/// Immutable once constructed. Members are strictly ascending by frame
/// number, each number appears once, and there are always at least
/// [`MIN_SEQUENCE_LEN`] of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceGroup {
    base_name: String,
    extension: String,
    padding: usize,
    start_frame: u64,
    end_frame: u64,
    members: Vec<AssetDescriptor>,
}

impl SequenceGroup {
    /// Common literal prefix shared by all members (may be empty).
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Lowercased file-type suffix, uniform across the group.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Digit width of the frame-number field (4 for `0007`).
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Lowest inferred frame number.
    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    /// Highest inferred frame number.
    pub fn end_frame(&self) -> u64 {
        self.end_frame
    }

    /// Members actually present; less than `end - start + 1` when frames
    /// are missing.
    pub fn frame_count(&self) -> usize {
        self.members.len()
    }

    /// Members in strictly ascending frame-number order.
    pub fn members(&self) -> &[AssetDescriptor] {
        &self.members
    }

    /// Lowest-numbered member, used for static previews.
    pub fn thumbnail(&self) -> &AssetDescriptor {
        &self.members[0]
    }

    /// Human-readable pattern like `shot_###.png`.
    pub fn pattern(&self) -> String {
        format!("{}{}.{}", self.base_name, "#".repeat(self.padding), self.extension)
    }
}

/// Result of a detection pass: every input asset lands in exactly one of
/// `sequences[*].members` or `leftovers`.
#[derive(Debug, Default)]
pub struct Detection {
    pub sequences: Vec<SequenceGroup>,
    pub leftovers: Vec<AssetDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    prefix: String,
    extension: String,
    padding: usize,
    folder_id: Option<Uuid>,
}

/// Detect sequences with default thresholds. Pure, no I/O; safe to call
/// repeatedly on anything the registry hands over.
pub fn detect(assets: Vec<AssetDescriptor>) -> Detection {
    detect_with(assets, &DetectOptions::default())
}

/// Detect sequences with explicit acceptance thresholds.
pub fn detect_with(assets: Vec<AssetDescriptor>, options: &DetectOptions) -> Detection {
    let mut leftovers = Vec::new();
    let mut groups: IndexMap<GroupKey, Vec<(u64, AssetDescriptor)>> = IndexMap::new();

    for asset in assets {
        if !asset.is_image() {
            leftovers.push(asset);
            continue;
        }

        match match_name(&asset.display_name) {
            NameMatch::Numbered {
                prefix,
                frame,
                padding,
                extension,
            } => {
                // Folder boundary always splits: cross-folder numeric runs
                // never merge.
                let key = GroupKey {
                    prefix,
                    extension: extension.to_lowercase(),
                    padding,
                    folder_id: asset.folder_id,
                };
                groups.entry(key).or_default().push((frame, asset));
            }
            NameMatch::NoMatch => leftovers.push(asset),
        }
    }

    let mut sequences = Vec::new();

    for (key, mut entries) in groups {
        // Stable sort: among duplicate frame numbers the first-encountered
        // entry stays first, so "keep first" below is input-order faithful.
        entries.sort_by_key(|(frame, _)| *frame);

        let mut members: Vec<(u64, AssetDescriptor)> = Vec::with_capacity(entries.len());
        let mut duplicates = Vec::new();
        for (frame, asset) in entries {
            if members.last().is_some_and(|(last, _)| *last == frame) {
                duplicates.push(asset);
            } else {
                members.push((frame, asset));
            }
        }

        // Duplicate numbering breaks the one-member-per-index invariant;
        // the extras are leftovers whether or not the group survives.
        leftovers.append(&mut duplicates);

        if members.len() < MIN_SEQUENCE_LEN {
            leftovers.extend(members.into_iter().map(|(_, a)| a));
            continue;
        }

        let start_frame = members[0].0;
        let end_frame = members[members.len() - 1].0;
        let span = end_frame - start_frame + 1;
        let actual = members.len();

        let dense = actual as f64 >= span as f64 * options.min_density;
        if !dense && actual < options.dense_floor {
            debug!(
                "dissolving sparse group {}*.{}: {} of {} frames present",
                key.prefix, key.extension, actual, span
            );
            leftovers.extend(members.into_iter().map(|(_, a)| a));
            continue;
        }

        sequences.push(SequenceGroup {
            base_name: key.prefix,
            extension: key.extension,
            padding: key.padding,
            start_frame,
            end_frame,
            members: members.into_iter().map(|(_, a)| a).collect(),
        });
    }

    Detection {
        sequences,
        leftovers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn image(name: &str) -> AssetDescriptor {
        AssetDescriptor::from_path(Path::new(&format!("/assets/{}", name)), None)
    }

    fn image_in(name: &str, folder: Uuid) -> AssetDescriptor {
        AssetDescriptor::from_path(Path::new(&format!("/assets/{}", name)), Some(folder))
    }

    #[test]
    fn test_match_name_shapes() {
        assert_eq!(
            match_name("0042.png"),
            NameMatch::Numbered {
                prefix: String::new(),
                frame: 42,
                padding: 4,
                extension: "png".into()
            }
        );
        assert_eq!(
            match_name("shot_001.PNG"),
            NameMatch::Numbered {
                prefix: "shot_".into(),
                frame: 1,
                padding: 3,
                extension: "PNG".into()
            }
        );
        assert_eq!(
            match_name("img.0001.tif"),
            NameMatch::Numbered {
                prefix: "img.".into(),
                frame: 1,
                padding: 4,
                extension: "tif".into()
            }
        );
        // Digit run directly before the extension, earlier runs belong to the prefix.
        assert_eq!(
            match_name("v2_shot_0010.png"),
            NameMatch::Numbered {
                prefix: "v2_shot_".into(),
                frame: 10,
                padding: 4,
                extension: "png".into()
            }
        );
        // Single digit is not a frame number.
        assert_eq!(match_name("shot_1.png"), NameMatch::NoMatch);
        assert_eq!(match_name("notes.txt.bak"), NameMatch::NoMatch);
        assert_eq!(match_name("portrait.png"), NameMatch::NoMatch);
    }

    #[test]
    fn test_full_run_detected() {
        let assets: Vec<_> = (1..=100).map(|i| image(&format!("shot_{:03}.png", i))).collect();
        let det = detect(assets);

        assert_eq!(det.sequences.len(), 1);
        assert!(det.leftovers.is_empty());

        let seq = &det.sequences[0];
        assert_eq!(seq.base_name(), "shot_");
        assert_eq!(seq.extension(), "png");
        assert_eq!(seq.padding(), 3);
        assert_eq!(seq.start_frame(), 1);
        assert_eq!(seq.end_frame(), 100);
        assert_eq!(seq.frame_count(), 100);
        assert_eq!(seq.thumbnail().display_name, "shot_001.png");
        assert_eq!(seq.pattern(), "shot_###.png");
    }

    #[test]
    fn test_sparse_group_dissolves() {
        // 3 of 99 frames present: fails both density and floor.
        let det = detect(vec![
            image("shot_001.png"),
            image("shot_050.png"),
            image("shot_099.png"),
        ]);
        assert!(det.sequences.is_empty());
        assert_eq!(det.leftovers.len(), 3);
    }

    #[test]
    fn test_non_numeric_names_are_leftovers() {
        let det = detect(vec![image("a.png"), image("b.png")]);
        assert!(det.sequences.is_empty());
        assert_eq!(det.leftovers.len(), 2);
    }

    #[test]
    fn test_padding_splits_groups() {
        let mut assets = Vec::new();
        for i in 1..=5 {
            assets.push(image(&format!("img.{:04}.tif", i)));
            assets.push(image(&format!("img.{:02}.tif", i)));
        }
        let det = detect(assets);

        assert_eq!(det.sequences.len(), 2);
        assert!(det.leftovers.is_empty());
        let paddings: Vec<_> = det.sequences.iter().map(|s| s.padding()).collect();
        assert!(paddings.contains(&4));
        assert!(paddings.contains(&2));
    }

    #[test]
    fn test_folder_boundary_splits() {
        let folder_a = Uuid::new_v4();
        let folder_b = Uuid::new_v4();
        let mut assets = Vec::new();
        for i in 1..=3 {
            assets.push(image_in(&format!("shot_{:03}.png", i), folder_a));
        }
        for i in 4..=6 {
            assets.push(image_in(&format!("shot_{:03}.png", i), folder_b));
        }
        let det = detect(assets);

        // 3 frames per folder, never merged across the boundary.
        assert_eq!(det.sequences.len(), 2);
        assert!(det.sequences.iter().all(|s| s.frame_count() == 3));
    }

    #[test]
    fn test_non_images_are_unconditional_leftovers() {
        let mut assets: Vec<_> = (1..=4).map(|i| image(&format!("take_{:02}.jpg", i))).collect();
        assets.push(image("take_notes.txt"));
        let det = detect(assets);

        assert_eq!(det.sequences.len(), 1);
        assert_eq!(det.leftovers.len(), 1);
        assert_eq!(det.leftovers[0].display_name, "take_notes.txt");
    }

    #[test]
    fn test_duplicate_frame_keeps_first() {
        let first_dup = image("shot_002.png");
        let first_id = first_dup.id;
        let det = detect(vec![
            image("shot_001.png"),
            first_dup,
            image("shot_002.png"),
            image("shot_003.png"),
        ]);

        assert_eq!(det.sequences.len(), 1);
        let seq = &det.sequences[0];
        assert_eq!(seq.frame_count(), 3);
        assert_eq!(seq.members()[1].id, first_id);
        // The later duplicate is a leftover, not silently dropped.
        assert_eq!(det.leftovers.len(), 1);
    }

    #[test]
    fn test_dedup_below_minimum_dissolves() {
        // Three files but only two distinct frame numbers.
        let det = detect(vec![
            image("shot_001.png"),
            image("shot_001.png"),
            image("shot_002.png"),
        ]);
        assert!(det.sequences.is_empty());
        assert_eq!(det.leftovers.len(), 3);
    }

    #[test]
    fn test_dense_floor_accepts_sparse_but_long() {
        // 10 frames over a span of 91: density fails, floor accepts.
        let assets: Vec<_> = (1..=10).map(|i| image(&format!("fx_{:04}.png", i * 10))).collect();
        let det = detect(assets.clone());
        assert_eq!(det.sequences.len(), 1);
        assert_eq!(det.sequences[0].frame_count(), 10);

        // Raising the floor dissolves the same input.
        let strict = DetectOptions {
            dense_floor: 20,
            ..Default::default()
        };
        let det = detect_with(assets, &strict);
        assert!(det.sequences.is_empty());
        assert_eq!(det.leftovers.len(), 10);
    }

    #[test]
    fn test_extension_case_normalized_path_preserved() {
        let assets: Vec<_> = (1..=3).map(|i| image(&format!("cap_{:02}.PNG", i))).collect();
        let det = detect(assets);

        assert_eq!(det.sequences.len(), 1);
        let seq = &det.sequences[0];
        assert_eq!(seq.extension(), "png");
        assert!(seq.members()[0].path.to_string_lossy().ends_with("cap_01.PNG"));
    }

    #[test]
    fn test_empty_input() {
        let det = detect(Vec::new());
        assert!(det.sequences.is_empty());
        assert!(det.leftovers.is_empty());
    }

    #[test]
    fn test_partition_no_asset_lost_or_duplicated() {
        let mut assets = Vec::new();
        for i in 1..=20 {
            assets.push(image(&format!("shot_{:03}.png", i)));
        }
        assets.push(image("shot_005.png")); // duplicate number
        assets.push(image("loose.png"));
        assets.push(image("readme.txt"));
        for i in [1u64, 50, 999] {
            assets.push(image(&format!("sparse_{:04}.png", i)));
        }
        let total = assets.len();
        let mut ids: Vec<_> = assets.iter().map(|a| a.id).collect();
        ids.sort();

        let det = detect(assets);
        let mut seen: Vec<_> = det
            .sequences
            .iter()
            .flat_map(|s| s.members().iter().map(|a| a.id))
            .chain(det.leftovers.iter().map(|a| a.id))
            .collect();
        assert_eq!(seen.len(), total);
        seen.sort();
        assert_eq!(seen, ids);

        // Accepted members are strictly ascending with no duplicate numbers.
        for seq in &det.sequences {
            let names: Vec<_> = seq.members().iter().map(|a| a.display_name.clone()).collect();
            let mut sorted = names.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(names, sorted);
            assert!(seq.frame_count() >= MIN_SEQUENCE_LEN);
        }
    }

    #[test]
    fn test_redetection_is_idempotent() {
        let mut assets = Vec::new();
        for i in 1..=12 {
            assets.push(image(&format!("shot_{:03}.png", i)));
        }
        assets.push(image("loose.png"));

        let first = detect(assets);
        let summary = |d: &Detection| {
            (
                d.sequences
                    .iter()
                    .map(|s| (s.pattern(), s.start_frame(), s.end_frame(), s.frame_count()))
                    .collect::<Vec<_>>(),
                d.leftovers.len(),
            )
        };
        let first_summary = summary(&first);

        // Feed everything back in: members flattened plus leftovers.
        let again: Vec<_> = first
            .sequences
            .into_iter()
            .flat_map(|s| s.members.into_iter())
            .chain(first.leftovers)
            .collect();
        let second = detect(again);
        assert_eq!(summary(&second), first_summary);
    }

    #[test]
    fn test_descriptors_from_registry_json() {
        // Descriptors arrive from the registry as JSON; detection works on
        // them unchanged.
        let payload = r#"[
            {"id":"7f1a2b3c-0000-4000-8000-000000000001","display_name":"roto_01.png",
             "mime_type":"image/png","folder_id":null,"path":"/a/roto_01.png","thumbnail_path":null},
            {"id":"7f1a2b3c-0000-4000-8000-000000000002","display_name":"roto_02.png",
             "mime_type":"image/png","folder_id":null,"path":"/a/roto_02.png","thumbnail_path":"/t/roto_02.jpg"},
            {"id":"7f1a2b3c-0000-4000-8000-000000000003","display_name":"roto_03.png",
             "mime_type":"image/png","folder_id":null,"path":"/a/roto_03.png","thumbnail_path":null}
        ]"#;
        let assets: Vec<AssetDescriptor> = serde_json::from_str(payload).unwrap();
        let det = detect(assets);
        assert_eq!(det.sequences.len(), 1);
        assert_eq!(det.sequences[0].frame_count(), 3);
    }
}
