//! Plain-text output helpers.

/// Print `label value` rows with the values aligned.
pub fn print_rows<L: AsRef<str>, V: AsRef<str>>(rows: &[(L, V)]) {
    print!("{}", format_rows(rows));
}

pub fn format_rows<L: AsRef<str>, V: AsRef<str>>(rows: &[(L, V)]) -> String {
    let width = rows
        .iter()
        .map(|(label, _)| label.as_ref().len())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|(label, value)| {
            format!("{:<width$}  {}\n", label.as_ref(), value.as_ref(), width = width)
        })
        .collect()
}
