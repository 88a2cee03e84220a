//! Section labels compared between the two sides.

/// Labels checked as case-insensitive prefixes of each item's text.
pub const SECTION_LABELS: &[&str] = &[
    "Expected Outcome",
    "Scope",
    "Applicants",
    "Eligibility",
    "Expected Impact",
    "Budget",
    "Objectives",
    "Activities",
    "Type of Action",
    "Specific Challenge",
];

/// Catalogue labels that start at least one of `texts`, in catalogue order.
pub(crate) fn labels_present<'a, I>(texts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let lowered: Vec<String> = texts.into_iter().map(str::to_lowercase).collect();
    SECTION_LABELS
        .iter()
        .filter(|label| {
            let needle = label.to_lowercase();
            lowered.iter().any(|text| text.starts_with(&needle))
        })
        .map(|label| (*label).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_prefix_labels_in_catalogue_order() {
        let found = labels_present(["scope: reduce", "EXPECTED OUTCOMES: more", "Budget tbd"]);
        assert_eq!(found, vec!["Expected Outcome", "Scope", "Budget"]);
    }

    #[test]
    fn label_must_be_a_prefix() {
        assert!(labels_present(["The scope is wide"]).is_empty());
    }
}
