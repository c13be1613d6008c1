use crate::Result;
use crate::stats::{BucketCounters, BucketKey, Dimension, Direction, column_label};
use core::fmt::Write;
use std::borrow::Cow;
use std::collections::BTreeMap;

pub fn generate<W: Write>(columns: &[(Direction, Dimension)], buckets: &BTreeMap<BucketKey, BucketCounters>, writer: &mut W) -> Result<()> {
    // Header row
    write!(writer, "when")?;
    for &(direction, dimension) in columns {
        write!(writer, ",{}", escape_csv(&column_label(direction, dimension)))?;
    }
    writeln!(writer)?;

    // One row per bucket, in chronological order
    for (key, counters) in buckets {
        write!(writer, "{}", escape_csv(key.label()))?;
        for &(direction, dimension) in columns {
            write!(writer, ",{}", counters.get(direction, dimension))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Escape a value for RFC compliant CSV output.
///
/// Wraps the value in double quotes if it contains commas, newlines, or double quotes.
/// Internal double quotes are doubled per the RFC.
fn escape_csv(s: &str) -> Cow<'_, str> {
    if s.contains('"') {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else if s.contains(',') || s.contains('\n') || s.contains('\r') {
        Cow::Owned(format!("\"{s}\""))
    } else {
        Cow::Borrowed(s)
    }
}
