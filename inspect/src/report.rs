//! Plain-text reports over a loaded library.

use crate::config::Report;
use shelf_engine::{Library, Record};
use std::io::{self, Write};

/// Write the requested report.
pub fn write_report<W: Write>(library: &Library, report: Report, mut out: W) -> io::Result<()> {
    match report {
        Report::Library => write_library(library, &mut out),
        Report::Catalog => write_catalog(library, &mut out),
        Report::Ratings => write_ratings(library, &mut out),
        Report::Stats => write_stats(library, &mut out),
        Report::All => {
            write_library(library, &mut out)?;
            write_catalog(library, &mut out)?;
            write_ratings(library, &mut out)?;
            write_stats(library, &mut out)
        }
    }
}

fn write_records<'a, W: Write>(
    records: impl Iterator<Item = &'a Record>,
    out: &mut W,
) -> io::Result<()> {
    for record in records {
        writeln!(out, "{}", record)?;
    }
    Ok(())
}

fn write_library<W: Write>(library: &Library, out: &mut W) -> io::Result<()> {
    let store = library.store();
    if store.is_empty() {
        return writeln!(out, "Library is empty");
    }
    writeln!(out, "Library contains {} records:", store.len())?;
    write_records(store.iter_by_title(), out)
}

fn write_catalog<W: Write>(library: &Library, out: &mut W) -> io::Result<()> {
    let catalog = library.catalog();
    if catalog.is_empty() {
        return writeln!(out, "Catalog is empty");
    }
    writeln!(out, "Catalog contains {} collections:", catalog.len())?;
    for collection in catalog.iter() {
        write!(out, "{}", collection.view(library.store()))?;
    }
    Ok(())
}

fn write_ratings<W: Write>(library: &Library, out: &mut W) -> io::Result<()> {
    if library.store().is_empty() {
        return writeln!(out, "Library is empty");
    }
    writeln!(out, "Records by rating:")?;
    write_records(library.records_by_rating().into_iter(), out)
}

fn write_stats<W: Write>(library: &Library, out: &mut W) -> io::Result<()> {
    let census = library.membership_census();
    write!(out, "{}", census.summary(library.store().len()))?;

    let allocation = library.allocation();
    writeln!(out, "Memory allocations:")?;
    writeln!(out, "Records: {}", allocation.records)?;
    writeln!(out, "Collections: {}", allocation.collections)
}
