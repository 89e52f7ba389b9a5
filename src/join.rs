use crate::types::{AttainmentRecord, County};
use std::collections::HashMap;

/// Merge education records into counties by FIPS code.
///
/// Records are keyed into a lookup table first, so the merge is one pass
/// over each input instead of a nested scan. When several records carry the
/// same FIPS the last one keyed wins; when several counties carry the same
/// id only the first receives the record. Records with no matching county
/// are dropped, counties with no matching record keep `education: None`,
/// and county order is untouched. Returns the number of matches.
pub fn merge_education(counties: &mut [County], records: Vec<AttainmentRecord>) -> usize {
    let mut by_fips: HashMap<u32, AttainmentRecord> = HashMap::with_capacity(records.len());
    for record in records {
        by_fips.insert(record.fips, record);
    }

    let mut matched = 0;
    for county in counties.iter_mut() {
        if let Some(record) = by_fips.remove(&county.fips) {
            county.education = Some(record);
            matched += 1;
        }
    }

    matched
}
