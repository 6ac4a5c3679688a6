use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::dataset::{Sheet, Workbook};
use crate::quiz::{ExampleRecord, Level, QuizError};

/// Spellings a sheet name may take, after normalization, to be picked for a level.
const LEVEL_PREFIXES: [&str; 4] = ["LEVEL", "LV", "NO", "レベル"];

/// The record lists behind level 1 and level 2. Cloning shares the records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPools {
    pub level1: Arc<[ExampleRecord]>,
    pub level2: Arc<[ExampleRecord]>,
}

impl DataPools {
    pub fn new(level1: Arc<[ExampleRecord]>, level2: Arc<[ExampleRecord]>) -> Self {
        Self { level1, level2 }
    }

    /// Both levels draw from the same records.
    pub fn shared(records: Arc<[ExampleRecord]>) -> Self {
        Self {
            level1: records.clone(),
            level2: records,
        }
    }

    pub fn pool(&self, level: Level) -> &[ExampleRecord] {
        match level {
            Level::One => &self.level1,
            Level::Two => &self.level2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// At least one level was found by sheet name and has rows.
    Matched(DataPools),
    /// Both levels draw from the first sheet with rows: the workbook has a single
    /// sheet, or the sheets named after a level are all empty.
    Shared(DataPools),
    /// No sheet name matched among several sheets. The user may assign them or
    /// go with `fallback`, the first sheet with rows shared by both levels.
    NeedsSelection {
        fallback: DataPools,
        sheet_names: Vec<String>,
    },
    /// No sheet has any rows.
    Empty,
}

impl Resolution {
    /// The pools a chat starts with before any manual sheet choice.
    pub fn pools(&self) -> Option<&DataPools> {
        match self {
            Resolution::Matched(pools)
            | Resolution::Shared(pools)
            | Resolution::NeedsSelection {
                fallback: pools, ..
            } => Some(pools),
            Resolution::Empty => None,
        }
    }
}

/// NFKC-folds `name` and keeps only its alphanumerics, uppercased.
///
/// Full-width and half-width forms end up identical, so `"ＮＯ．１"`, `"No.1"` and
/// `" no 1 "` all normalize to `"NO1"`.
pub fn normalize_sheet_name(name: &str) -> String {
    name.nfkc()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

/// The level a sheet stands for, judged by its name alone.
pub fn sheet_level(name: &str) -> Option<Level> {
    let normalized = normalize_sheet_name(name);
    Level::ALL.into_iter().find(|level| {
        let number = level.number().to_string();
        LEVEL_PREFIXES
            .iter()
            .any(|prefix| normalized.strip_prefix(prefix) == Some(number.as_str()))
    })
}

/// Decides which sheets back level 1 and level 2.
pub fn resolve_pools(workbook: &Workbook) -> Resolution {
    let find = |level: Level| {
        workbook
            .sheets
            .iter()
            .find(|sheet| sheet_level(&sheet.name) == Some(level))
    };
    let (level1, level2) = (find(Level::One), find(Level::Two));
    let named = level1.is_some() || level2.is_some();

    let records = |sheet: Option<&Sheet>| {
        sheet
            .map(|sheet| sheet.records.clone())
            .unwrap_or_else(|| Arc::from(Vec::new()))
    };
    let matched = DataPools::new(records(level1), records(level2));
    if !matched.level1.is_empty() || !matched.level2.is_empty() {
        return Resolution::Matched(matched);
    }

    let Some(first) = workbook.sheets.iter().find(|sheet| !sheet.records.is_empty()) else {
        return Resolution::Empty;
    };
    let fallback = DataPools::shared(first.records.clone());
    if named || workbook.sheets.len() == 1 {
        log::debug!("Level sheets hold no rows, falling back to sheet {:?}", first.name);
        return Resolution::Shared(fallback);
    }
    Resolution::NeedsSelection {
        fallback,
        sheet_names: workbook
            .sheets
            .iter()
            .map(|sheet| sheet.name.clone())
            .collect(),
    }
}

/// Builds pools from sheets the user picked by position.
pub fn select_pools(
    workbook: &Workbook,
    level1_sheet: usize,
    level2_sheet: usize,
) -> Result<DataPools, QuizError> {
    let records = |index: usize| {
        workbook
            .sheets
            .get(index)
            .map(|sheet| sheet.records.clone())
            .ok_or(QuizError::UnknownSheet(index))
    };
    let pools = DataPools::new(records(level1_sheet)?, records(level2_sheet)?);

    if pools.level1.is_empty() && pools.level2.is_empty() {
        return Err(QuizError::EmptySelection);
    }
    Ok(pools)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, rows: usize) -> Sheet {
        let records = (0..rows)
            .map(|i| ExampleRecord::new(format!("{name} {i}"), "problem", "suffering", ""))
            .collect::<Vec<_>>();
        Sheet::new(name, records)
    }

    fn workbook(sheets: Vec<Sheet>) -> Workbook {
        Workbook { sheets }
    }

    #[test]
    fn level_one_spellings() {
        for name in [
            "Level1",
            " level 1 ",
            "No.1",
            "NO1",
            "ＮＯ．１",
            "Ｌｅｖｅｌ１",
            "レベル１",
            "レベル 1",
            "No・1",
        ] {
            assert_eq!(sheet_level(name), Some(Level::One), "{name:?}");
        }
    }

    #[test]
    fn level_two_and_unrelated_names() {
        assert_eq!(sheet_level("Level2"), Some(Level::Two));
        assert_eq!(sheet_level("ｎｏ．２"), Some(Level::Two));
        assert_eq!(sheet_level("Level12"), None);
        assert_eq!(sheet_level("Sheet1"), None);
        assert_eq!(sheet_level("問題と苦しみ"), None);
    }

    #[test]
    fn normalization_folds_width_and_case() {
        assert_eq!(normalize_sheet_name("ＮＯ．１"), "NO1");
        assert_eq!(normalize_sheet_name(" no 1 "), "NO1");
    }

    #[test]
    fn named_sheets_map_to_their_levels() {
        let book = workbook(vec![sheet("Other", 1), sheet("No2", 3), sheet("No1", 2)]);
        let Resolution::Matched(pools) = resolve_pools(&book) else {
            panic!("expected a match");
        };
        assert_eq!(pools.level1.len(), 2);
        assert_eq!(pools.level2.len(), 3);
        assert_eq!(pools.pool(Level::One)[0].event_text, "No1 0");
    }

    #[test]
    fn a_single_matched_level_leaves_the_other_empty() {
        let book = workbook(vec![sheet("レベル1", 2), sheet("Other", 4)]);
        let resolution = resolve_pools(&book);
        let pools = resolution.pools().unwrap();
        assert_eq!(pools.level1.len(), 2);
        assert!(pools.level2.is_empty());
    }

    #[test]
    fn first_matching_sheet_wins() {
        let book = workbook(vec![sheet("Level1", 1), sheet("No.1", 5)]);
        let pools = resolve_pools(&book).pools().cloned().unwrap();
        assert_eq!(pools.level1.len(), 1);
    }

    #[test]
    fn single_unnamed_sheet_backs_both_levels() {
        let book = workbook(vec![sheet("Sheet1", 4)]);
        let Resolution::Shared(pools) = resolve_pools(&book) else {
            panic!("expected the single sheet fallback");
        };
        assert!(Arc::ptr_eq(&pools.level1, &pools.level2));
        assert_eq!(pools.level1.len(), 4);
    }

    #[test]
    fn empty_level_sheets_fall_back_to_the_first_sheet() {
        let book = workbook(vec![sheet("Sheet1", 5), sheet("Level1", 0), sheet("Level2", 0)]);
        let Resolution::Shared(pools) = resolve_pools(&book) else {
            panic!("expected the first sheet fallback");
        };
        assert_eq!(pools.level1.len(), 5);
        assert_eq!(pools.level2.len(), 5);
        assert_eq!(pools.pool(Level::Two)[0].event_text, "Sheet1 0");
    }

    #[test]
    fn fallback_skips_leading_empty_sheets() {
        let book = workbook(vec![sheet("No1", 0), sheet("Notes", 0), sheet("Data", 2)]);
        let pools = resolve_pools(&book).pools().cloned().unwrap();
        assert_eq!(pools.level1.len(), 2);
        assert!(Arc::ptr_eq(&pools.level1, &pools.level2));
    }

    #[test]
    fn several_unnamed_sheets_offer_a_selection_and_a_default() {
        let book = workbook(vec![sheet("Data", 5), sheet("Other", 3)]);
        let resolution = resolve_pools(&book);
        let Resolution::NeedsSelection {
            fallback,
            sheet_names,
        } = &resolution
        else {
            panic!("expected a sheet selection");
        };
        assert_eq!(sheet_names, &["Data".to_string(), "Other".to_string()]);
        assert_eq!(fallback.level1.len(), 5);
        assert_eq!(fallback.level2.len(), 5);
        assert_eq!(resolution.pools(), Some(fallback));
    }

    #[test]
    fn workbooks_without_rows_are_empty() {
        assert_eq!(resolve_pools(&workbook(vec![])), Resolution::Empty);
        let book = workbook(vec![sheet("Level1", 0), sheet("A", 0)]);
        assert_eq!(resolve_pools(&book), Resolution::Empty);
        assert_eq!(resolve_pools(&book).pools(), None);
    }

    #[test]
    fn manual_selection_overrides_names() {
        let book = workbook(vec![sheet("Level1", 1), sheet("B", 2), sheet("C", 3)]);
        let pools = select_pools(&book, 2, 1).unwrap();
        assert_eq!(pools.level1.len(), 3);
        assert_eq!(pools.level2.len(), 2);
    }

    #[test]
    fn manual_selection_rejects_bad_input() {
        let book = workbook(vec![sheet("A", 0), sheet("B", 0), sheet("C", 1)]);
        assert_eq!(select_pools(&book, 0, 5), Err(QuizError::UnknownSheet(5)));
        assert_eq!(select_pools(&book, 0, 1), Err(QuizError::EmptySelection));
        assert!(select_pools(&book, 0, 2).is_ok());
    }
}
