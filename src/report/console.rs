use crate::Result;
use crate::stats::{BucketCounters, BucketKey, Dimension, Direction, column_label};
use core::fmt::Write;
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use terminal_size::{Width, terminal_size};

const LOG_TARGET: &str = "    report";

pub fn generate<W: Write>(columns: &[(Direction, Dimension)], buckets: &BTreeMap<BucketKey, BucketCounters>, use_colors: bool, writer: &mut W) -> Result<()> {
    let labels: Vec<String> = columns.iter().map(|&(direction, dimension)| column_label(direction, dimension)).collect();

    // Column widths: each column at least as wide as its label, the
    // period column at least as wide as the widest bucket label.
    let when_width = buckets.keys().map(|key| key.label().len()).chain(core::iter::once(4)).max().unwrap_or(4);
    let widths: Vec<usize> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            buckets
                .values()
                .map(|counters| {
                    let (direction, dimension) = columns[i];
                    digits(counters.get(direction, dimension))
                })
                .chain(core::iter::once(label.len()))
                .max()
                .unwrap_or(label.len())
        })
        .collect();

    let total_width = when_width + widths.iter().map(|w| w + 2).sum::<usize>();
    if total_width > get_terminal_width() {
        log::debug!(target: LOG_TARGET, "Table is {total_width} columns wide, wider than the terminal");
    }

    // Header
    let mut header = format!("{:<when_width$}", "when");
    for (label, width) in labels.iter().zip(&widths) {
        write!(header, "  {label:>width$}")?;
    }
    if use_colors {
        writeln!(writer, "{}", header.bold())?;
    } else {
        writeln!(writer, "{header}")?;
    }

    // One row per bucket, in chronological order
    let mut totals = BucketCounters::default();
    for (key, counters) in buckets {
        write!(writer, "{:<when_width$}", key.label())?;
        for (&(direction, dimension), width) in columns.iter().zip(&widths) {
            let count = counters.get(direction, dimension);
            write!(writer, "  {count:>width$}")?;
            totals.add(direction, dimension, count);
        }
        writeln!(writer)?;
    }

    // Totals row
    if !buckets.is_empty() {
        let mut footer = format!("{:<when_width$}", "total");
        for (&(direction, dimension), width) in columns.iter().zip(&widths) {
            write!(footer, "  {:>width$}", totals.get(direction, dimension))?;
        }
        if use_colors {
            writeln!(writer, "{}", footer.bold())?;
        } else {
            writeln!(writer, "{footer}")?;
        }
    }

    Ok(())
}

/// Get the terminal width, defaulting to 80 if not detectable
fn get_terminal_width() -> usize {
    terminal_size().map_or(80, |(Width(w), _)| w as usize)
}

const fn digits(mut n: u64) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}
