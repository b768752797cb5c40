//! Combo product catalog.
//!
//! Maps a sold FSN to the component FSNs it bundles. A combo customer gets
//! one batch of keys per component (e.g. an OS + Office bundle yields a
//! Windows key and an Office key). The table is a code constant because the
//! bundle definitions change with releases, not with data.

/// Sold FSN -> ordered component FSNs.
const COMBOS: &[(&str, &[&str])] = &[
    ("WIN11-PP21", &["WIN11HOME", "PP2016"]),
    ("OFF21-WIN11-COMBO", &["OFFG9MREFCXD658G", "WIN11HOME"]),
    ("OFF24-WIN11-COMBO", &["OFFICE2024-WIN", "WIN11HOME"]),
    ("M365-WIN11-COMBO", &["M365PERSONAL", "WIN11HOME"]),
];

/// Customer-facing names for combo FSNs (component FSNs use product metadata).
const COMBO_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("WIN11-PP21", "Windows 11 Home + PowerPoint 2016"),
    ("OFF21-WIN11-COMBO", "Office 2021 + Windows 11 Combo"),
    ("OFF24-WIN11-COMBO", "Office 2024 + Windows 11 Combo"),
    ("M365-WIN11-COMBO", "Microsoft 365 Personal + Windows 11 Combo"),
];

/// Resolve a sold FSN to its ordered component list.
///
/// Non-combo and unknown FSNs resolve to themselves. Unknown is deliberately
/// not an error: the product catalog evolves independently of this table and
/// a plain product must keep redeeming without an entry here.
pub fn resolve_components(fsn: &str) -> Vec<String> {
    match COMBOS.iter().find(|(combo, _)| *combo == fsn) {
        Some((_, components)) => components.iter().map(|c| c.to_string()).collect(),
        None => vec![fsn.to_string()],
    }
}

pub fn combo_display_name(fsn: &str) -> Option<&'static str> {
    COMBO_DISPLAY_NAMES
        .iter()
        .find(|(combo, _)| *combo == fsn)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_resolves_to_ordered_components() {
        assert_eq!(
            resolve_components("WIN11-PP21"),
            vec!["WIN11HOME".to_string(), "PP2016".to_string()]
        );
    }

    #[test]
    fn plain_fsn_resolves_to_itself() {
        assert_eq!(resolve_components("WIN11HOME"), vec!["WIN11HOME".to_string()]);
    }

    #[test]
    fn unknown_fsn_is_treated_as_non_combo() {
        assert_eq!(
            resolve_components("BRAND-NEW-SKU"),
            vec!["BRAND-NEW-SKU".to_string()]
        );
        assert_eq!(combo_display_name("BRAND-NEW-SKU"), None);
    }

    #[test]
    fn display_names_cover_every_combo() {
        for (fsn, _) in COMBOS {
            assert!(combo_display_name(fsn).is_some(), "missing name for {fsn}");
        }
    }
}
