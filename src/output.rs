//! Tab-separated output of collected rows

use std::io::{self, Write};

use crate::data::Row;

const SEPARATOR: char = '\t';

/// Quote fields the way common CSV readers expect: separator, quotes, line
/// breaks or leading whitespace.
fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
        || field.starts_with(' ')
}

fn write_field<W: Write>(w: &mut W, field: &str) -> io::Result<()> {
    if needs_quotes(field) {
        write!(w, "\"{}\"", field.replace('"', "\"\""))
    } else {
        w.write_all(field.as_bytes())
    }
}

/// Writes one `label<TAB>value` line per row and flushes the writer
pub fn write_rows<W: Write>(mut w: W, rows: &[Row]) -> io::Result<()> {
    for row in rows {
        write_field(&mut w, row.label())?;
        write!(w, "{}", SEPARATOR)?;
        write_field(&mut w, row.value())?;
        writeln!(w)?;
    }
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(rows: &[Row]) -> String {
        let mut buf = Vec::new();
        write_rows(&mut buf, rows).expect("Writing to a Vec should succeed");
        String::from_utf8(buf).expect("Output should be UTF-8")
    }

    #[test]
    fn test_rows_are_tab_separated_lines() {
        let rows = vec![
            Row::new("17.10.2026 06:40", "26"),
            Row::new("18.10.2026 07:12", "27"),
        ];
        assert_eq!(
            render(&rows),
            "17.10.2026 06:40\t26\n18.10.2026 07:12\t27\n"
        );
    }

    #[test]
    fn test_no_rows_writes_nothing() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_fields_with_special_characters_are_quoted() {
        let rows = vec![
            Row::new("a\tb", "1"),
            Row::new("say \"hi\"", "2"),
            Row::new(" padded", "3"),
        ];
        assert_eq!(
            render(&rows),
            "\"a\tb\"\t1\n\"say \"\"hi\"\"\"\t2\n\" padded\"\t3\n"
        );
    }
}
