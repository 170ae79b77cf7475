use std::fmt;

/// A one-based (row, column) spreadsheet coordinate, displayed in A1 notation, e.g. `D7`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RowCol(pub usize, pub usize);

impl RowCol {
    pub fn new(row: usize, col: usize) -> Self {
        Self(row, col)
    }

    pub fn row(&self) -> usize {
        self.0
    }

    pub fn col(&self) -> usize {
        self.1
    }
}

impl fmt::Display for RowCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.1), self.0)
    }
}

/// Converts a one-based column index to its letters: 1 -> A, 26 -> Z, 27 -> AA.
pub fn column_letters(col: usize) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quotes a tab name for use in an A1 range when it contains anything but letters, digits and
/// underscores. Embedded single quotes are doubled.
pub fn quote_tab(tab: &str) -> String {
    if !tab.is_empty() && tab.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        tab.to_string()
    } else {
        format!("'{}'", tab.replace('\'', "''"))
    }
}

/// The A1 range covering columns `1..=width` of a single one-based `row`, e.g. `Expenses!A5:D5`.
pub fn row_range(tab: &str, row: usize, width: usize) -> String {
    format!(
        "{}!{}:{}",
        quote_tab(tab),
        RowCol::new(row, 1),
        RowCol::new(row, width.max(1))
    )
}

/// The A1 range covering every row of a tab.
pub fn whole_tab(tab: &str) -> String {
    format!("{}!A:ZZ", quote_tab(tab))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_col_display() {
        assert_eq!(RowCol::new(1, 1).to_string(), "A1");
        assert_eq!(RowCol::new(5, 4).to_string(), "D5");
        assert_eq!(RowCol::new(42, 28).to_string(), "AB42");
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(52), "AZ");
        assert_eq!(column_letters(53), "BA");
        assert_eq!(column_letters(702), "ZZ");
        assert_eq!(column_letters(703), "AAA");
    }

    #[test]
    fn test_quote_tab() {
        assert_eq!(quote_tab("Expenses"), "Expenses");
        assert_eq!(quote_tab("Despesas_Semanas"), "Despesas_Semanas");
        assert_eq!(quote_tab("Weekly Expenses"), "'Weekly Expenses'");
        assert_eq!(quote_tab("Bob's"), "'Bob''s'");
    }

    #[test]
    fn test_row_range() {
        assert_eq!(row_range("Expenses", 5, 4), "Expenses!A5:D5");
        assert_eq!(row_range("My Tab", 12, 4), "'My Tab'!A12:D12");
    }

    #[test]
    fn test_whole_tab() {
        assert_eq!(whole_tab("Projects"), "Projects!A:ZZ");
    }
}
