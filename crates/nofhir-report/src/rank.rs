use std::cmp::Reverse;

use nofhir_model::Finding;

/// Display order for one section: errors first, emission order kept within a
/// severity. An empty list becomes the single "no issues" placeholder.
pub fn rank(findings: &[Finding]) -> Vec<Finding> {
    if findings.is_empty() {
        return vec![Finding::all_clear()];
    }
    let mut ranked = findings.to_vec();
    // sort_by_key is stable.
    ranked.sort_by_key(|finding| Reverse(finding.severity().rank()));
    ranked
}
