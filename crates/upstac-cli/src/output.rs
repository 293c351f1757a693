use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as left-aligned columns under a dashed header.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    for line in render_table(headers, &rows) {
        println!("{line}");
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.len());
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pad_row(&widths, headers.iter().copied()));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(pad_row(&widths, row.iter().map(String::as_str)));
    }
    lines
}

fn pad_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let padded: Vec<String> = cells
        .enumerate()
        .map(|(i, cell)| {
            let w = widths.get(i).copied().unwrap_or(0);
            format!("{cell:w$}")
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let lines = render_table(
            &["ID", "STATUS"],
            &[
                vec!["1".into(), "INITIATED".into()],
                vec!["12".into(), "COMPLETED".into()],
            ],
        );
        assert_eq!(lines[0], "ID  STATUS");
        assert_eq!(lines[1], "--  ---------");
        assert_eq!(lines[2], "1   INITIATED");
        assert_eq!(lines[3], "12  COMPLETED");
    }
}
