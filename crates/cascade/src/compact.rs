//! Longhand/Shorthand Compaction
//!
//! Collapses redundant longhand/shorthand pairs in the winning-value map
//! without losing information when values disagree.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Shorthand properties and the longhands they expand into
static SHORTHANDS: &[(&str, &[&str])] = &[
    (
        "margin",
        &["margin-top", "margin-right", "margin-bottom", "margin-left"],
    ),
    (
        "padding",
        &["padding-top", "padding-right", "padding-bottom", "padding-left"],
    ),
    ("inset", &["top", "right", "bottom", "left"]),
    (
        "border-width",
        &[
            "border-top-width",
            "border-right-width",
            "border-bottom-width",
            "border-left-width",
        ],
    ),
    (
        "border-style",
        &[
            "border-top-style",
            "border-right-style",
            "border-bottom-style",
            "border-left-style",
        ],
    ),
    (
        "border-color",
        &[
            "border-top-color",
            "border-right-color",
            "border-bottom-color",
            "border-left-color",
        ],
    ),
    (
        "border-radius",
        &[
            "border-top-left-radius",
            "border-top-right-radius",
            "border-bottom-right-radius",
            "border-bottom-left-radius",
        ],
    ),
    ("overflow", &["overflow-x", "overflow-y"]),
    ("gap", &["row-gap", "column-gap"]),
];

/// Longhands of a shorthand property, if `property` is a shorthand
pub fn longhands_of(property: &str) -> Option<&'static [&'static str]> {
    SHORTHANDS
        .iter()
        .find(|(shorthand, _)| *shorthand == property)
        .map(|(_, longhands)| *longhands)
}

/// The shorthand a longhand belongs to, if `property` is a longhand
pub fn shorthand_of(property: &str) -> Option<&'static str> {
    SHORTHANDS
        .iter()
        .find(|(_, longhands)| longhands.contains(&property))
        .map(|(shorthand, _)| *shorthand)
}

/// Result of a compaction pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compaction {
    /// Property names to surface
    pub pick: Vec<String>,
    /// Property names folded away into a shorthand
    pub omit: Vec<String>,
}

/// Decide which property names to surface and which to fold away.
///
/// Properties that are neither shorthand nor longhand are always picked.
/// Each shorthand group is decided once per batch; repeat longhands of a
/// visited group are skipped. When a shorthand is absent but every longhand
/// is present with one common value, the shorthand is synthesized into
/// `styles` (the one side effect of this pass). Property names are visited
/// in sorted order so results are deterministic for any map state.
pub fn compact_css(styles: &mut FxHashMap<String, String>) -> Compaction {
    let mut compaction = Compaction::default();
    let mut decided: FxHashSet<&'static str> = FxHashSet::default();

    let mut names: Vec<String> = styles.keys().cloned().collect();
    names.sort_unstable();

    for name in names {
        if let Some(&(shorthand, longhands)) = SHORTHANDS
            .iter()
            .find(|(shorthand, _)| *shorthand == name)
        {
            if decided.insert(shorthand) {
                decide_group(shorthand, longhands, styles, &mut compaction);
            }
        } else if let Some(shorthand) = shorthand_of(&name) {
            if decided.insert(shorthand) {
                let longhands = longhands_of(shorthand).unwrap_or(&[]);
                decide_group(shorthand, longhands, styles, &mut compaction);
            }
        } else {
            compaction.pick.push(name);
        }
    }

    compaction
}

/// Apply the compaction policy to one shorthand group
fn decide_group(
    shorthand: &str,
    longhands: &[&str],
    styles: &mut FxHashMap<String, String>,
    compaction: &mut Compaction,
) {
    let present: SmallVec<[&str; 4]> = longhands
        .iter()
        .copied()
        .filter(|longhand| styles.contains_key(*longhand))
        .collect();

    match styles.get(shorthand).cloned() {
        Some(shorthand_value) => {
            if present.is_empty() {
                compaction.pick.push(shorthand.to_string());
            } else if present
                .iter()
                .all(|longhand| styles[*longhand] == shorthand_value)
            {
                // redundant longhands fold into the shorthand
                compaction.pick.push(shorthand.to_string());
                extend(&mut compaction.omit, &present);
            } else if present.len() < longhands.len() {
                // ambiguous: partial longhands disagreeing, keep both sides
                compaction.pick.push(shorthand.to_string());
                extend(&mut compaction.pick, &present);
            } else {
                // fully overridden shorthand adds nothing
                compaction.omit.push(shorthand.to_string());
                extend(&mut compaction.pick, &present);
            }
        }
        None => {
            if present.is_empty() {
                return;
            }
            let first = styles[present[0]].clone();
            let all_agree = present.iter().all(|longhand| styles[*longhand] == first);
            if all_agree && present.len() == longhands.len() {
                styles.insert(shorthand.to_string(), first);
                compaction.pick.push(shorthand.to_string());
                extend(&mut compaction.omit, &present);
            } else if all_agree {
                extend(&mut compaction.pick, &present);
            } else {
                compaction.pick.push(shorthand.to_string());
                extend(&mut compaction.pick, &present);
            }
        }
    }
}

fn extend(target: &mut Vec<String>, names: &[&str]) {
    target.extend(names.iter().map(|name| name.to_string()));
}
