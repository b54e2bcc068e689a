//! Referring-doctor grouping and output document rendering.

use std::collections::BTreeMap;

use crate::spec::{
    EnumCellValue, MedsheetError, Result, SpecDoctorGroup, SpecGroupedSheet, SpecOutputCell,
    SpecOutputDocument, SpecParsedSheet,
};
use crate::util::{derive_document_name, derive_group_identity};

/// Partition records by `group_field` with stable group-by semantics.
///
/// Groups appear in first-occurrence order and records keep input order.
/// Records with a blank key are dropped and counted; the group column is
/// removed from every kept record. A sheet without records groups to
/// nothing, whatever its columns.
///
/// # Errors
///
/// [`MedsheetError::MissingGroupField`] if the sheet has records and
/// `group_field` is not a column.
pub fn group_records(sheet: &SpecParsedSheet, group_field: &str) -> Result<SpecGroupedSheet> {
    let Some(n_idx_group) = sheet.column_index(group_field) else {
        if sheet.records.is_empty() {
            return Ok(SpecGroupedSheet {
                sheet_name: sheet.sheet_name.clone(),
                columns: sheet.columns.clone(),
                ..Default::default()
            });
        }
        return Err(MedsheetError::MissingGroupField {
            field: group_field.to_string(),
            sheet: sheet.sheet_name.clone(),
        });
    };

    let mut l_groups: Vec<SpecDoctorGroup> = Vec::new();
    let mut dict_group_pos = BTreeMap::new();
    let mut cnt_dropped_null_key = 0usize;

    for record in &sheet.records {
        let key = record.get(n_idx_group).cloned().unwrap_or_default();
        let Some(key_identity) = derive_group_identity(&key) else {
            cnt_dropped_null_key += 1;
            continue;
        };

        let l_values: Vec<EnumCellValue> = record
            .iter()
            .enumerate()
            .filter(|(n_idx_col, _)| *n_idx_col != n_idx_group)
            .map(|(_, value)| value.clone())
            .collect();

        let n_pos = *dict_group_pos.entry(key_identity).or_insert_with(|| {
            l_groups.push(SpecDoctorGroup {
                key,
                records: Vec::new(),
            });
            l_groups.len() - 1
        });
        l_groups[n_pos].records.push(l_values);
    }

    l_groups.retain(|group| !group.records.is_empty());

    let columns = sheet
        .columns
        .iter()
        .enumerate()
        .filter(|(n_idx_col, _)| *n_idx_col != n_idx_group)
        .map(|(_, c_col)| c_col.clone())
        .collect();

    Ok(SpecGroupedSheet {
        sheet_name: sheet.sheet_name.clone(),
        columns,
        groups: l_groups,
        cnt_dropped_null_key,
    })
}

/// Render grouped records as an output document.
///
/// Per group: one emphasized header row holding the key, one row per
/// record, then one empty separator row.
pub fn render_grouped_sheet(grouped: &SpecGroupedSheet) -> SpecOutputDocument {
    let n_rows = grouped
        .groups
        .iter()
        .map(|group| group.records.len() + 2)
        .sum();
    let mut rows = Vec::with_capacity(n_rows);

    for group in &grouped.groups {
        rows.push(vec![SpecOutputCell::emphasized(group.key.clone())]);
        for record in &group.records {
            rows.push(record.iter().cloned().map(SpecOutputCell::plain).collect());
        }
        rows.push(Vec::new());
    }

    SpecOutputDocument {
        name: derive_document_name(&grouped.sheet_name),
        sheet_title: grouped.sheet_name.clone(),
        rows,
    }
}

/// Group a parsed sheet by `group_field` and render one output document.
///
/// An empty sheet yields a document with zero sections.
///
/// # Errors
///
/// [`MedsheetError::MissingGroupField`] if `group_field` is not a column.
pub fn consolidate(sheet: &SpecParsedSheet, group_field: &str) -> Result<SpecOutputDocument> {
    let grouped = group_records(sheet, group_field)?;
    Ok(render_grouped_sheet(&grouped))
}
